//! # Webplay Common Library
//!
//! Shared code for the web player resolution engine including:
//! - Media data model (entity kinds, media references, democratic queues)
//! - Transcode policy and transcode table configuration
//! - Database access (settings overrides, catalog snapshot)
//! - Common error type

pub mod config;
#[cfg(feature = "sqlx")]
pub mod db;
pub mod error;
pub mod media;

pub use config::{PlayerConfig, TranscodeMode, TranscodePolicy};
pub use error::{Error, Result};
pub use media::{CatalogSnapshot, EntityKind, MediaReference};
