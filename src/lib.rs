// src/lib.rs

//! nfbot Notification Relay Library

pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;
