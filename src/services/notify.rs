//! Delivery of new items to a chat.

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{Item, TemplateConfig};

/// A messaging channel able to post text, photos and videos.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_text(&self, chat_id: &str, text: &str) -> Result<()>;

    async fn send_photo(&self, chat_id: &str, url: &str, caption: &str) -> Result<()>;

    async fn send_video(&self, chat_id: &str, url: &str, caption: &str) -> Result<()>;
}

/// How an item is posted, decided by its first media URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryKind {
    Text,
    Photo,
    Video,
}

impl DeliveryKind {
    pub fn for_item(item: &Item) -> Self {
        match item.first_media() {
            None => DeliveryKind::Text,
            Some(url) if url.contains("video") => DeliveryKind::Video,
            Some(_) => DeliveryKind::Photo,
        }
    }
}

/// Renders captions and posts items through a `Notifier`.
pub struct Dispatcher {
    notifier: Box<dyn Notifier>,
    chat_id: String,
    templates: TemplateConfig,
}

impl Dispatcher {
    pub fn new(
        notifier: Box<dyn Notifier>,
        chat_id: impl Into<String>,
        templates: TemplateConfig,
    ) -> Self {
        Self {
            notifier,
            chat_id: chat_id.into(),
            templates,
        }
    }

    /// Render the caption for an item from its source's template.
    pub fn caption(&self, item: &Item) -> String {
        let link = item.link();
        match item {
            Item::Tweet { description, .. } => format_caption(
                &self.templates.twitter,
                &[
                    ("CHAT_ID", self.chat_id.as_str()),
                    ("TWITTER_LINK", link.canonical_url()),
                    ("NITTER_LINK", link.mirror_url()),
                    ("TWEET_DESCRIPTION", description.as_str()),
                ],
            ),
            Item::Post { description, .. } => format_caption(
                &self.templates.instagram,
                &[
                    ("CHAT_ID", self.chat_id.as_str()),
                    ("INSTAGRAM_LINK", link.canonical_url()),
                    ("BIBLIOGRAM_LINK", link.mirror_url()),
                    ("POST_DESCRIPTION", description.as_str()),
                ],
            ),
        }
    }

    /// Post an item and return how it was sent.
    pub async fn dispatch(&self, item: &Item) -> Result<DeliveryKind> {
        let caption = self.caption(item);
        let kind = DeliveryKind::for_item(item);

        match (kind, item.first_media()) {
            (DeliveryKind::Video, Some(url)) => {
                self.notifier.send_video(&self.chat_id, url, &caption).await?
            }
            (DeliveryKind::Photo, Some(url)) => {
                self.notifier.send_photo(&self.chat_id, url, &caption).await?
            }
            _ => self.notifier.send_text(&self.chat_id, &caption).await?,
        }

        log::info!("{}: sent {:?} to {}", item.source(), kind, self.chat_id);
        Ok(kind)
    }
}

/// Replace every `{NAME}` placeholder with its value.
pub fn format_caption(template: &str, vars: &[(&str, &str)]) -> String {
    vars.iter().fold(template.to_string(), |text, (name, value)| {
        text.replace(&format!("{{{name}}}"), value)
    })
}
