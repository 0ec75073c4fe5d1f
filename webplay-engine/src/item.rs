//! Playlist items
//!
//! A playlist is an ordered slice of [`PlayableItem`]s. Items are read from
//! JSON by the CLI, so their kind tags are snake_case.

use serde::{Deserialize, Serialize};
use std::path::Path;
use webplay_common::Result;

/// What a playlist entry refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Song,
    PodcastEpisode,
    Video,
    LiveStream,
    Radio,
    Broadcast,
    SongPreview,
    Democratic,
}

/// One entry in a playlist
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayableItem {
    /// Stream URL, parsed into a descriptor during resolution
    pub url: String,
    kind: ItemKind,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub author: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Stream codec, only meaningful for live streams
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub codec: Option<String>,
}

impl PlayableItem {
    pub fn new(kind: ItemKind, url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            kind,
            title: String::new(),
            author: String::new(),
            image_url: None,
            codec: None,
        }
    }

    /// Kind is fixed at construction
    pub fn kind(&self) -> ItemKind {
        self.kind
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }

    pub fn with_image_url(mut self, image_url: impl Into<String>) -> Self {
        self.image_url = Some(image_url.into());
        self
    }

    pub fn with_codec(mut self, codec: impl Into<String>) -> Self {
        self.codec = Some(codec.into());
        self
    }
}

/// Read a playlist from a JSON array of items
pub fn load_playlist(path: &Path) -> Result<Vec<PlayableItem>> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}
