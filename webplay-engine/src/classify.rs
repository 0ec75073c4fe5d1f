//! Playlist classification
//!
//! Two independent predicates over the whole playlist. Neither looks at
//! resolved formats, only at item kinds.

use serde::Serialize;
use webplay_common::TranscodePolicy;

use crate::item::{ItemKind, PlayableItem};

/// Derived playlist kind, recomputed per request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaylistKind {
    Radio,
    Video,
    Other,
}

impl std::fmt::Display for PlaylistKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlaylistKind::Radio => write!(f, "radio"),
            PlaylistKind::Video => write!(f, "video"),
            PlaylistKind::Other => write!(f, "other"),
        }
    }
}

/// A single radio station played through the flash player
pub fn is_radio(playlist: &[PlayableItem], policy: &TranscodePolicy) -> bool {
    matches!(playlist, [item] if item.kind() == ItemKind::Radio) && policy.webplayer_flash_enabled
}

/// Only the first item decides
pub fn is_video(playlist: &[PlayableItem]) -> bool {
    playlist
        .first()
        .is_some_and(|item| item.kind() == ItemKind::Video)
}

pub fn classify(playlist: &[PlayableItem], policy: &TranscodePolicy) -> PlaylistKind {
    if is_radio(playlist, policy) {
        PlaylistKind::Radio
    } else if is_video(playlist) {
        PlaylistKind::Video
    } else {
        PlaylistKind::Other
    }
}
