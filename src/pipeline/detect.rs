// src/pipeline/detect.rs

//! Change detection over both sources.
//!
//! For each enabled source the newest item is fetched, compared with the
//! last-seen item and, when it is new, delivered and stored. A failure on
//! one source is recorded in the cycle report and never stops the other.

use chrono::{DateTime, Utc};

use crate::error::{AppError, Result};
use crate::models::{AccountSource, Config, Item, Source};
use crate::services::{DeliveryKind, Dispatcher, FeedReader, MirrorClient, TelegramNotifier};
use crate::storage::{LocalStateStore, StateStore};

/// What happened to one source during a cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceOutcome {
    /// No handle configured, nothing fetched
    Disabled,
    /// Page fetched but no item could be extracted
    NoItem,
    /// Newest item matches the stored one
    Unchanged,
    /// A new item was delivered and stored
    Delivered { item: Item, kind: DeliveryKind },
}

/// Summary of one poll cycle.
#[derive(Debug)]
pub struct CycleReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub results: Vec<(Source, Result<SourceOutcome>)>,
}

impl CycleReport {
    pub fn outcome(&self, source: Source) -> Option<&Result<SourceOutcome>> {
        self.results
            .iter()
            .find(|(s, _)| *s == source)
            .map(|(_, result)| result)
    }

    /// Items delivered during the cycle, in processing order.
    pub fn delivered(&self) -> Vec<&Item> {
        self.results
            .iter()
            .filter_map(|(_, result)| match result {
                Ok(SourceOutcome::Delivered { item, .. }) => Some(item),
                _ => None,
            })
            .collect()
    }

    pub fn failures(&self) -> Vec<(Source, &AppError)> {
        self.results
            .iter()
            .filter_map(|(source, result)| result.as_ref().err().map(|e| (*source, e)))
            .collect()
    }

    /// First failure the poll loop cannot carry on after.
    pub fn first_unrecoverable(&self) -> Option<(Source, &AppError)> {
        self.failures().into_iter().find(|(_, e)| !e.is_recoverable())
    }
}

/// Orchestrates fetch, comparison, delivery and persistence.
pub struct ChangeDetector {
    reader: FeedReader,
    store: Box<dyn StateStore>,
    dispatcher: Dispatcher,
    twitter: AccountSource,
    instagram: AccountSource,
}

impl ChangeDetector {
    pub fn new(
        reader: FeedReader,
        store: Box<dyn StateStore>,
        dispatcher: Dispatcher,
        twitter: AccountSource,
        instagram: AccountSource,
    ) -> Self {
        Self {
            reader,
            store,
            dispatcher,
            twitter,
            instagram,
        }
    }

    /// Wire the HTTP mirror client, the state file and the Telegram bot.
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate_delivery()?;
        let chat_id = config.telegram.chat_id.clone().unwrap_or_default();

        let reader = FeedReader::new(MirrorClient::from_config(&config.http)?);
        let store = LocalStateStore::new(&config.state.path);
        let notifier = TelegramNotifier::from_config(&config.http, &config.telegram)?;
        let dispatcher = Dispatcher::new(Box::new(notifier), chat_id, config.templates.clone());

        Ok(Self::new(
            reader,
            Box::new(store),
            dispatcher,
            config.twitter.clone(),
            config.instagram.clone(),
        ))
    }

    fn account(&self, source: Source) -> &AccountSource {
        match source {
            Source::Twitter => &self.twitter,
            Source::Instagram => &self.instagram,
        }
    }

    /// Run one cycle: Twitter first, then Instagram, strictly one after the other.
    pub async fn run_cycle(&self) -> CycleReport {
        let started_at = Utc::now();
        let mut results = Vec::with_capacity(Source::ALL.len());

        for source in Source::ALL {
            let result = self.process_source(source).await;
            match &result {
                Ok(SourceOutcome::Disabled) => log::debug!("{source}: disabled"),
                Ok(SourceOutcome::NoItem) => log::info!("{source}: no item found"),
                Ok(SourceOutcome::Unchanged) => log::info!("{source}: nothing new"),
                Ok(SourceOutcome::Delivered { item, .. }) => {
                    log::info!("{source}: new item {}", item.link().canonical_url())
                }
                Err(e) => log::warn!("{source}: skipped this cycle: {e}"),
            }
            results.push((source, result));
        }

        CycleReport {
            started_at,
            finished_at: Utc::now(),
            results,
        }
    }

    /// Fetch, compare and, on change, deliver then store.
    ///
    /// The slot is only overwritten once delivery succeeded, so a failed
    /// delivery is retried on the next cycle.
    pub async fn process_source(&self, source: Source) -> Result<SourceOutcome> {
        let account = self.account(source);
        let Some(handle) = account.handle() else {
            return Ok(SourceOutcome::Disabled);
        };

        let Some(item) = self.reader.latest(source, handle, &account.mirrors).await? else {
            return Ok(SourceOutcome::NoItem);
        };

        let stored = self.store.get(source).await?;
        if stored.is_some_and(|last| last.is_same(&item)) {
            return Ok(SourceOutcome::Unchanged);
        }

        let kind = self.dispatcher.dispatch(&item).await?;
        self.store.set(source, &item).await?;
        Ok(SourceOutcome::Delivered { item, kind })
    }
}
