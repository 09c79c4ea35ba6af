//! Watched platforms.

use std::fmt;

/// A platform whose newest item is relayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Source {
    Twitter,
    Instagram,
}

impl Source {
    /// Both sources in the order a cycle processes them.
    pub const ALL: [Source; 2] = [Source::Twitter, Source::Instagram];

    /// Key of this source's slot in the persisted state document.
    pub fn slot_key(self) -> &'static str {
        match self {
            Source::Twitter => "tweet",
            Source::Instagram => "post",
        }
    }

    /// Domain of the original platform, used to build canonical links.
    pub fn canonical_domain(self) -> &'static str {
        match self {
            Source::Twitter => "https://twitter.com",
            Source::Instagram => "https://instagram.com",
        }
    }

    /// Path of an account's profile page on a mirror.
    pub fn profile_path(self, handle: &str) -> String {
        match self {
            Source::Twitter => format!("/{handle}"),
            Source::Instagram => format!("/u/{handle}"),
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Twitter => f.write_str("Twitter"),
            Source::Instagram => f.write_str("Instagram"),
        }
    }
}
