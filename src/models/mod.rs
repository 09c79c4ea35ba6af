// src/models/mod.rs

//! Domain models for the relay.
//!
//! This module contains the value types produced by the extractors and the
//! configuration tree loaded from `config.toml`.

mod config;
mod item;
mod source;

// Re-export all public types
pub use config::{
    AccountSource, Config, HttpConfig, LoggingConfig, PollConfig, StateConfig, TelegramConfig,
    TemplateConfig,
};
pub use item::{Item, MirrorLink};
pub use source::Source;
