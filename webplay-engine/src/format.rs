//! Type resolution
//!
//! Computes the `(real, player)` format pair for one playlist item. The
//! real format is what goes over the wire; the player format is the token
//! the browser player is told to expect, which differs for some
//! container/codec combinations.

use serde::Serialize;
use tracing::debug;

use crate::context::PlaybackContext;
use crate::item::{ItemKind, PlayableItem};
use crate::lookup::resolve_media;
use crate::transcode::decide;
use crate::url::url_extension;

/// Real format assumed when nothing better is known
pub const DEFAULT_REAL_FORMAT: &str = "mp3";

/// Wire format and player token for one item
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormatPair {
    pub real: String,
    pub player: String,
}

/// Player tokens per (entity types, real format); anything else plays as `real`
const PLAYER_FORMATS: &[(&[&str], &str, &str)] = &[
    (&["song", "podcast_episode"], "ogg", "oga"),
    (&["song", "podcast_episode"], "opus", "oga"),
    (&["song", "podcast_episode"], "mp4", "m4a"),
    (&["video"], "ogg", "ogv"),
    (&["video"], "webm", "webmv"),
    (&["video"], "mp4", "m4v"),
];

/// Player token override for a resolved media object
pub fn player_format(entity_type: &str, real: &str) -> Option<&'static str> {
    PLAYER_FORMATS
        .iter()
        .find(|(types, format, _)| *format == real && types.contains(&entity_type))
        .map(|(_, _, player)| *player)
}

/// Resolve the format pair of one item
///
/// `forced_format` is a client-requested transcode target, empty for none.
pub fn resolve_types(ctx: &PlaybackContext, item: &PlayableItem, forced_format: &str) -> FormatPair {
    let mut types = FormatPair {
        real: DEFAULT_REAL_FORMAT.to_string(),
        player: String::new(),
    };

    let descriptor = ctx.parser.parse(&item.url);

    if let Some(media) = resolve_media(&descriptor, ctx.store) {
        types.real = media.native_format.clone();
        let decision = decide(ctx, &media, &media.native_format, &types, &descriptor, forced_format);
        if decision.will_transcode {
            types.real = decision.real;
        }
        if let Some(player) = player_format(&descriptor.entity_type, &types.real) {
            types.player = player.to_string();
        }
    } else if item.kind() == ItemKind::LiveStream {
        if let Some(codec) = item.codec.as_deref() {
            types.real = codec.to_string();
        }
        if types.real == "ogg" || types.real == "opus" {
            types.player = "oga".to_string();
        }
    } else if let Some(ext) = url_extension(&item.url) {
        types.real = ext;
    }

    if types.player.is_empty() {
        types.player = types.real.clone();
    }

    debug!("Resolved {} as {}/{}", item.url, types.real, types.player);
    types
}
