//! Normalized latest-item records.

use crate::models::Source;
use crate::utils::url::resolve;

/// A pair of equivalent URLs: the mirror front-end and the original platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MirrorLink {
    Twitter {
        mirror_url: String,
        canonical_url: String,
    },
    Instagram {
        mirror_url: String,
        canonical_url: String,
    },
}

impl MirrorLink {
    /// Build both URLs from the same relative path.
    pub fn new(source: Source, domain: &str, path: &str) -> Self {
        let mirror_url = resolve(domain, path);
        let canonical_url = format!("{}{}", source.canonical_domain(), path);
        match source {
            Source::Twitter => MirrorLink::Twitter {
                mirror_url,
                canonical_url,
            },
            Source::Instagram => MirrorLink::Instagram {
                mirror_url,
                canonical_url,
            },
        }
    }

    pub fn source(&self) -> Source {
        match self {
            MirrorLink::Twitter { .. } => Source::Twitter,
            MirrorLink::Instagram { .. } => Source::Instagram,
        }
    }

    pub fn mirror_url(&self) -> &str {
        match self {
            MirrorLink::Twitter { mirror_url, .. } | MirrorLink::Instagram { mirror_url, .. } => {
                mirror_url
            }
        }
    }

    pub fn canonical_url(&self) -> &str {
        match self {
            MirrorLink::Twitter { canonical_url, .. }
            | MirrorLink::Instagram { canonical_url, .. } => canonical_url,
        }
    }
}

/// The newest item of an account, produced fresh on every fetch.
///
/// `medias` is either `None` or a non-empty list of absolute URLs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Item {
    Tweet {
        description: String,
        medias: Option<Vec<String>>,
        link: MirrorLink,
    },
    Post {
        description: String,
        medias: Option<Vec<String>>,
        link: MirrorLink,
    },
}

impl Item {
    /// Create an item for the link's source. An empty media list becomes `None`.
    pub fn new(description: impl Into<String>, medias: Vec<String>, link: MirrorLink) -> Self {
        let description = description.into();
        let medias = if medias.is_empty() {
            None
        } else {
            Some(medias)
        };

        match link.source() {
            Source::Twitter => Item::Tweet {
                description,
                medias,
                link,
            },
            Source::Instagram => Item::Post {
                description,
                medias,
                link,
            },
        }
    }

    pub fn source(&self) -> Source {
        match self {
            Item::Tweet { .. } => Source::Twitter,
            Item::Post { .. } => Source::Instagram,
        }
    }

    pub fn description(&self) -> &str {
        match self {
            Item::Tweet { description, .. } | Item::Post { description, .. } => description,
        }
    }

    pub fn medias(&self) -> Option<&[String]> {
        match self {
            Item::Tweet { medias, .. } | Item::Post { medias, .. } => medias.as_deref(),
        }
    }

    pub fn link(&self) -> &MirrorLink {
        match self {
            Item::Tweet { link, .. } | Item::Post { link, .. } => link,
        }
    }

    /// First media URL, which decides how the item is delivered.
    pub fn first_media(&self) -> Option<&str> {
        self.medias()
            .and_then(|medias| medias.first())
            .map(String::as_str)
    }

    /// Change-detection equality: two items of the same variant are the same
    /// item when their link, description or media list is equal.
    ///
    /// This is looser than `==`, which requires every field to match.
    pub fn is_same(&self, other: &Item) -> bool {
        self.source() == other.source()
            && (self.link() == other.link()
                || self.description() == other.description()
                || self.medias() == other.medias())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tweet(description: &str, medias: &[&str], path: &str) -> Item {
        Item::new(
            description,
            medias.iter().map(|m| m.to_string()).collect(),
            MirrorLink::new(Source::Twitter, "https://nitter.net", path),
        )
    }

    #[test]
    fn test_link_from_relative_path() {
        let link = MirrorLink::new(Source::Twitter, "https://nitter.net", "/jack/status/20#m");
        assert_eq!(link.mirror_url(), "https://nitter.net/jack/status/20#m");
        assert_eq!(link.canonical_url(), "https://twitter.com/jack/status/20#m");

        let link = MirrorLink::new(Source::Instagram, "https://bibliogram.art", "/p/CdE1");
        assert_eq!(link.mirror_url(), "https://bibliogram.art/p/CdE1");
        assert_eq!(link.canonical_url(), "https://instagram.com/p/CdE1");
    }

    #[test]
    fn test_empty_medias_become_none() {
        let item = tweet("hello", &[], "/u/1");
        assert_eq!(item.medias(), None);
        assert_eq!(item.first_media(), None);
    }

    #[test]
    fn test_variant_follows_link() {
        let post = Item::new(
            "caption",
            vec![],
            MirrorLink::new(Source::Instagram, "https://bibliogram.art", "/p/x"),
        );
        assert!(matches!(post, Item::Post { .. }));
        assert_eq!(post.source(), Source::Instagram);
    }

    #[test]
    fn test_is_same_when_any_field_matches() {
        let original = tweet("hello", &["https://nitter.net/pic/a.jpg"], "/u/1");

        // same description only
        assert!(original.is_same(&tweet("hello", &[], "/u/2")));
        // same link only
        assert!(original.is_same(&tweet("edited", &[], "/u/1")));
        // same media only
        assert!(original.is_same(&tweet("other", &["https://nitter.net/pic/a.jpg"], "/u/3")));
        // nothing shared
        assert!(!original.is_same(&tweet("other", &[], "/u/3")));
    }

    #[test]
    fn test_is_same_never_crosses_variants() {
        let t = tweet("hello", &[], "/p/1");
        let p = Item::new(
            "hello",
            vec![],
            MirrorLink::new(Source::Instagram, "https://nitter.net", "/p/1"),
        );
        assert!(!t.is_same(&p));
    }
}
