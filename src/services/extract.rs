//! Latest-item extraction from mirror markup.
//!
//! Every structural element these functions look for may disappear when a
//! mirror changes its layout. A missing element yields `Ok(None)` ("no item"),
//! never an error; `Err` only comes from an unparsable selector.

use scraper::{ElementRef, Html, Selector};

use crate::error::{AppError, Result};
use crate::models::{Item, MirrorLink, Source};
use crate::services::RawPage;
use crate::utils::url::resolve;

// Nitter profile timeline
const TIMELINE: &str = "div.timeline";
const TIMELINE_ITEM: &str = "div.timeline-item";
const PINNED: &str = "div.pinned";
const TWEET_CONTENT: &str = "div.tweet-content.media-body";
const TWEET_LINK: &str = "a.tweet-link";
const IMAGE: &str = "img";

// Bibliogram profile grid and post page
const SIZED_LINK: &str = "a.sized-link";
const POST_DESCRIPTION: &str = ".structured-text.description";
const SIZED_IMAGE: &str = ".sized-image";
const SIZED_VIDEO: &str = ".sized-video";

/// Extract the newest non-pinned tweet from a Nitter profile page.
pub fn extract_tweet(page: &RawPage) -> Result<Option<Item>> {
    let document = Html::parse_document(&page.body);

    let timeline_sel = parse_selector(TIMELINE)?;
    let item_sel = parse_selector(TIMELINE_ITEM)?;
    let pinned_sel = parse_selector(PINNED)?;
    let content_sel = parse_selector(TWEET_CONTENT)?;
    let link_sel = parse_selector(TWEET_LINK)?;
    let image_sel = parse_selector(IMAGE)?;

    let Some(timeline) = document.select(&timeline_sel).next() else {
        log::debug!("Nitter page at {} has no timeline", page.domain);
        return Ok(None);
    };

    let Some(entry) = timeline
        .select(&item_sel)
        .find(|entry| entry.select(&pinned_sel).next().is_none())
    else {
        log::debug!("Nitter timeline at {} has no unpinned tweet", page.domain);
        return Ok(None);
    };

    let Some(content) = entry.select(&content_sel).next() else {
        return Ok(None);
    };
    let Some(permalink) = entry
        .select(&link_sel)
        .next()
        .and_then(|anchor| anchor.value().attr("href"))
    else {
        log::debug!("Newest tweet at {} has no permalink", page.domain);
        return Ok(None);
    };

    // The first image of an entry is the author's avatar.
    let medias = entry
        .select(&image_sel)
        .skip(1)
        .filter_map(|img| img.value().attr("src"))
        .map(|src| resolve(&page.domain, src))
        .collect();

    Ok(Some(Item::new(
        text_of(content),
        medias,
        MirrorLink::new(Source::Twitter, &page.domain, permalink),
    )))
}

/// Find the relative link of the newest post in a Bibliogram profile grid.
pub fn find_latest_post_link(page: &RawPage) -> Result<Option<String>> {
    let document = Html::parse_document(&page.body);
    let link_sel = parse_selector(SIZED_LINK)?;

    let link = document
        .select(&link_sel)
        .next()
        .and_then(|anchor| anchor.value().attr("href"))
        .map(str::to_string);

    if link.is_none() {
        log::debug!("Bibliogram page at {} has no post thumbnail", page.domain);
    }
    Ok(link)
}

/// Extract a post from its Bibliogram detail page, reached through `link`.
///
/// A post carries either images or videos, so videos are only collected
/// when no image is present.
pub fn extract_post(detail: &RawPage, link: &str) -> Result<Option<Item>> {
    let document = Html::parse_document(&detail.body);

    let description_sel = parse_selector(POST_DESCRIPTION)?;
    let image_sel = parse_selector(SIZED_IMAGE)?;
    let video_sel = parse_selector(SIZED_VIDEO)?;

    let Some(description) = document.select(&description_sel).next() else {
        log::debug!("Bibliogram post {link} has no description");
        return Ok(None);
    };

    let mut medias = media_sources(&document, &image_sel, &detail.domain);
    if medias.is_empty() {
        medias = media_sources(&document, &video_sel, &detail.domain);
    }

    Ok(Some(Item::new(
        text_of(description),
        medias,
        MirrorLink::new(Source::Instagram, &detail.domain, link),
    )))
}

fn media_sources(document: &Html, selector: &Selector, domain: &str) -> Vec<String> {
    document
        .select(selector)
        .filter_map(|element| element.value().attr("src"))
        .map(|src| resolve(domain, src))
        .collect()
}

fn text_of(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

fn parse_selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
}
