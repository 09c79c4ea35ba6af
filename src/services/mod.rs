//! Service layer for the relay.
//!
//! This module contains the business logic for:
//! - Mirror rotation (`MirrorClient`)
//! - Latest-item extraction (`extract`)
//! - Per-source reading (`FeedReader`)
//! - Delivery (`Dispatcher`, `TelegramNotifier`)

pub mod extract;
mod feeds;
pub(crate) mod mirror;
mod notify;
mod telegram;

pub use feeds::FeedReader;
pub use mirror::{FetchResponse, HttpFetcher, MirrorClient, PageFetcher, RawPage};
pub use notify::{DeliveryKind, Dispatcher, Notifier, format_caption};
pub use telegram::TelegramNotifier;

#[cfg(test)]
pub(crate) use mirror::fake::FakeFetcher;
#[cfg(test)]
pub(crate) use notify::fake::FakeNotifier;
