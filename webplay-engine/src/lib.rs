//! # Webplay Engine (webplay-engine)
//!
//! Playback-format resolution for the browser player.
//!
//! **Purpose:** For each queued item, decide the format actually streamed,
//! whether the server transcodes it, and the format token the player is
//! told to expect. Classify playlists and build the player directives.
//!
//! **Flow:** URL descriptor → media lookup → transcode policy → type
//! resolution → classification / directives. Everything is synchronous and
//! reads only the immutable [`PlaybackContext`].

pub mod capability;
pub mod classify;
pub mod context;
pub mod directive;
pub mod format;
pub mod item;
pub mod lookup;
pub mod transcode;
pub mod url;

pub use classify::{classify, is_radio, is_video, PlaylistKind};
pub use context::PlaybackContext;
pub use directive::{
    build_directives, build_item_payload, build_script, render_directives, supplied_types,
    Directive, DirectiveMode, MediaPayload,
};
pub use format::{resolve_types, FormatPair};
pub use item::{ItemKind, PlayableItem};
