//! Last-seen state persistence.
//!
//! The state is one JSON document with a slot per source:
//!
//! ```text
//! {
//!   "tweet": null | {"description", "medias", "twitter_url": {"nitter", "twitter"}},
//!   "post":  null | {"description", "medias", "insta_url": {"bibliogram", "instagram"}}
//! }
//! ```
//!
//! A slot that does not match its shape reads as empty.

pub mod local;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::Result;
use crate::models::{Item, MirrorLink, Source};

pub use local::LocalStateStore;

/// Last-seen item per source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersistedState {
    pub last_tweet: Option<Item>,
    pub last_post: Option<Item>,
}

impl PersistedState {
    pub fn get(&self, source: Source) -> Option<&Item> {
        match source {
            Source::Twitter => self.last_tweet.as_ref(),
            Source::Instagram => self.last_post.as_ref(),
        }
    }

    pub fn set(&mut self, source: Source, item: Item) {
        match source {
            Source::Twitter => self.last_tweet = Some(item),
            Source::Instagram => self.last_post = Some(item),
        }
    }

    /// Build the state from a parsed document, dropping malformed slots.
    pub fn from_document(document: &Value) -> Self {
        Self {
            last_tweet: slot_item(document, Source::Twitter),
            last_post: slot_item(document, Source::Instagram),
        }
    }

    /// The full document, always carrying both keys.
    pub fn to_document(&self) -> Value {
        let mut document = Map::new();
        for source in Source::ALL {
            let slot = self.get(source).map_or(Value::Null, slot_value);
            document.insert(source.slot_key().to_string(), slot);
        }
        Value::Object(document)
    }
}

fn slot_item(document: &Value, source: Source) -> Option<Item> {
    let slot = document.get(source.slot_key())?;
    if slot.is_null() {
        return None;
    }

    let item = match source {
        Source::Twitter => serde_json::from_value::<TweetRecord>(slot.clone())
            .map(Item::from)
            .ok(),
        Source::Instagram => serde_json::from_value::<PostRecord>(slot.clone())
            .map(Item::from)
            .ok(),
    };
    if item.is_none() {
        log::warn!("Ignoring malformed '{}' slot in state", source.slot_key());
    }
    item
}

fn slot_value(item: &Item) -> Value {
    let record = match item.source() {
        Source::Twitter => serde_json::to_value(TweetRecord::from(item)),
        Source::Instagram => serde_json::to_value(PostRecord::from(item)),
    };
    // records only hold strings, so serialization cannot fail
    record.unwrap_or(Value::Null)
}

/// Stored Nitter/Twitter URL pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TwitterUrlRecord {
    pub nitter: String,
    pub twitter: String,
}

/// Stored Bibliogram/Instagram URL pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstaUrlRecord {
    pub bibliogram: String,
    pub instagram: String,
}

/// Stored form of a tweet slot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TweetRecord {
    pub description: String,
    pub medias: Option<Vec<String>>,
    pub twitter_url: TwitterUrlRecord,
}

/// Stored form of a post slot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostRecord {
    pub description: String,
    pub medias: Option<Vec<String>>,
    pub insta_url: InstaUrlRecord,
}

impl From<&Item> for TweetRecord {
    fn from(item: &Item) -> Self {
        Self {
            description: item.description().to_string(),
            medias: item.medias().map(<[String]>::to_vec),
            twitter_url: TwitterUrlRecord {
                nitter: item.link().mirror_url().to_string(),
                twitter: item.link().canonical_url().to_string(),
            },
        }
    }
}

impl From<&Item> for PostRecord {
    fn from(item: &Item) -> Self {
        Self {
            description: item.description().to_string(),
            medias: item.medias().map(<[String]>::to_vec),
            insta_url: InstaUrlRecord {
                bibliogram: item.link().mirror_url().to_string(),
                instagram: item.link().canonical_url().to_string(),
            },
        }
    }
}

impl From<TweetRecord> for Item {
    fn from(record: TweetRecord) -> Self {
        Item::new(
            record.description,
            record.medias.unwrap_or_default(),
            MirrorLink::Twitter {
                mirror_url: record.twitter_url.nitter,
                canonical_url: record.twitter_url.twitter,
            },
        )
    }
}

impl From<PostRecord> for Item {
    fn from(record: PostRecord) -> Self {
        Item::new(
            record.description,
            record.medias.unwrap_or_default(),
            MirrorLink::Instagram {
                mirror_url: record.insta_url.bibliogram,
                canonical_url: record.insta_url.instagram,
            },
        )
    }
}

/// Trait for last-seen state backends.
///
/// `set` is a read-modify-write of the whole document and is not safe
/// against a concurrent `set` or `read`.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Load the whole state. A missing backing document reads as empty.
    async fn read(&self) -> Result<PersistedState>;

    /// Stored item for a source.
    async fn get(&self, source: Source) -> Result<Option<Item>> {
        Ok(self.read().await?.get(source).cloned())
    }

    /// Overwrite one slot, keeping the other as currently stored.
    async fn set(&self, source: Source, item: &Item) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn tweet(medias: &[&str]) -> Item {
        Item::new(
            "hello",
            medias.iter().map(|m| m.to_string()).collect(),
            MirrorLink::new(Source::Twitter, "https://nitter.net", "/u/status/1#m"),
        )
    }

    fn post(medias: &[&str]) -> Item {
        Item::new(
            "caption",
            medias.iter().map(|m| m.to_string()).collect(),
            MirrorLink::new(Source::Instagram, "https://bibliogram.art", "/p/A1"),
        )
    }

    #[test]
    fn test_document_shape() {
        let state = PersistedState {
            last_tweet: Some(tweet(&["https://nitter.net/pic/a.jpg"])),
            last_post: None,
        };

        assert_eq!(
            state.to_document(),
            json!({
                "tweet": {
                    "description": "hello",
                    "medias": ["https://nitter.net/pic/a.jpg"],
                    "twitter_url": {
                        "nitter": "https://nitter.net/u/status/1#m",
                        "twitter": "https://twitter.com/u/status/1#m"
                    }
                },
                "post": null
            })
        );
    }

    #[test]
    fn test_restored_items_are_same() {
        let cases = [
            tweet(&[]),
            tweet(&["https://nitter.net/pic/a.jpg", "https://nitter.net/pic/b.jpg"]),
            post(&[]),
            post(&["https://bibliogram.art/videoproxy/v1.mp4"]),
        ];

        for item in cases {
            let mut state = PersistedState::default();
            state.set(item.source(), item.clone());

            let restored = PersistedState::from_document(&state.to_document());
            let back = restored.get(item.source()).unwrap();
            assert!(back.is_same(&item));
            assert_eq!(back, &item);
        }
    }

    #[test]
    fn test_malformed_slot_reads_as_empty() {
        let document = json!({
            "tweet": {"description": "no links here"},
            "post": {
                "description": "ok",
                "medias": null,
                "insta_url": {"bibliogram": "https://b/p/1", "instagram": "https://instagram.com/p/1"}
            }
        });

        let state = PersistedState::from_document(&document);
        assert!(state.last_tweet.is_none());
        assert_eq!(state.last_post.unwrap().description(), "ok");
    }

    #[test]
    fn test_slot_shapes_are_not_interchangeable() {
        let document = json!({
            "tweet": {
                "description": "a post in the wrong slot",
                "medias": null,
                "insta_url": {"bibliogram": "https://b/p/1", "instagram": "https://instagram.com/p/1"}
            },
            "post": 42
        });

        assert_eq!(
            PersistedState::from_document(&document),
            PersistedState::default()
        );
    }

    #[test]
    fn test_empty_stored_medias_become_none() {
        let document = json!({
            "tweet": {
                "description": "x",
                "medias": [],
                "twitter_url": {"nitter": "https://nitter.net/u/1", "twitter": "https://twitter.com/u/1"}
            }
        });
        let state = PersistedState::from_document(&document);
        assert!(state.last_tweet.unwrap().medias().is_none());
    }
}
