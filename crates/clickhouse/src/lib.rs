//! Session store access for the dashboard engine.

pub mod cache;
pub mod client;
pub mod config;
pub mod health;
pub mod query;
pub mod schema;
pub mod source;

pub use cache::SnapshotCache;
pub use client::*;
pub use config::*;
pub use source::{FetchScope, JsonFileSource, SessionSource};
