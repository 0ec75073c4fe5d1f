//! Player directives
//!
//! Decision and rendering are separate steps: [`build_directives`] turns a
//! playlist into typed [`Directive`]s, [`render_directives`] serializes them
//! into the callback script the browser player evaluates.
//!
//! Media is looked up twice per item, once while resolving types and once
//! while building the payload. Both lookups read the same store; if the
//! store changed in between, the payload reflects the second read.

use serde::Serialize;
use tracing::debug;
use webplay_common::media::{EntityKind, SongDetails};
use webplay_common::Result;

use crate::context::PlaybackContext;
use crate::format::resolve_types;
use crate::item::{ItemKind, PlayableItem};
use crate::lookup::resolve_media;
use crate::url::append_query_pair;

/// How non-broadcast items are queued on the player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DirectiveMode {
    /// Append to the player queue
    #[default]
    Add,
    /// Insert after the current track
    PlayNext,
}

/// One control instruction for the browser player
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Directive {
    Add { payload: MediaPayload },
    PlayNext { payload: MediaPayload },
    StartBroadcast { url: String },
}

impl Directive {
    /// Render as a script statement, e.g. `addMedia({...});`
    pub fn render(&self, callback_prefix: &str) -> Result<String> {
        Ok(match self {
            Directive::Add { payload } => {
                format!("{}addMedia({});", callback_prefix, serde_json::to_string(payload)?)
            }
            Directive::PlayNext { payload } => {
                format!("{}playNext({});", callback_prefix, serde_json::to_string(payload)?)
            }
            Directive::StartBroadcast { url } => {
                format!(
                    "{}startBroadcastListening('{}');",
                    callback_prefix,
                    escape_single_quoted(url)
                )
            }
        })
    }
}

fn escape_single_quoted(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

/// Song-only payload fields
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct SongPayload {
    pub artist_id: u64,
    pub album_id: u64,
    pub replaygain_track_gain: Option<f64>,
    pub replaygain_track_peak: Option<f64>,
    pub replaygain_album_gain: Option<f64>,
    pub replaygain_album_peak: Option<f64>,
}

impl From<&SongDetails> for SongPayload {
    fn from(details: &SongDetails) -> Self {
        Self {
            artist_id: details.artist_id,
            album_id: details.album_id,
            replaygain_track_gain: details.replaygain_track_gain,
            replaygain_track_peak: details.replaygain_track_peak,
            replaygain_album_gain: details.replaygain_album_gain,
            replaygain_album_peak: details.replaygain_album_peak,
        }
    }
}

/// Per-item parameters handed to the player
///
/// Field order is the serialized key order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MediaPayload {
    pub title: String,
    pub artist: String,
    #[serde(flatten)]
    pub song: Option<SongPayload>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
    pub filetype: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub poster: Option<String>,
}

/// Build the player parameters for one item
pub fn build_item_payload(
    ctx: &PlaybackContext,
    item: &PlayableItem,
    forced_format: &str,
) -> MediaPayload {
    let types = resolve_types(ctx, item, forced_format);
    let descriptor = ctx.parser.parse(&item.url);
    let mut url = descriptor.base_url.clone();

    let mut payload = MediaPayload {
        title: item.title.clone(),
        artist: item.author.clone(),
        song: None,
        media_id: None,
        media_type: None,
        filetype: String::new(),
        url: String::new(),
        poster: None,
    };

    if let Some(media) = resolve_media(&descriptor, ctx.store) {
        if descriptor.entity_type == EntityKind::Song.as_tag() {
            payload.song = Some(media.song.as_ref().map(SongPayload::from).unwrap_or_default());
        }
        payload.media_id = Some(media.id);
        payload.media_type = Some(descriptor.entity_type.clone()).filter(|tag| !tag.is_empty());

        if media.native_format != types.real {
            url = append_query_pair(&url, "transcode_to", &types.real);
        }
    }

    payload.filetype = types.player;
    payload.url = url;
    payload.poster = item.image_url.clone().filter(|poster| !poster.is_empty());
    payload
}

/// Turn a playlist into player directives
///
/// The first broadcast item ends the sequence: it becomes a
/// `StartBroadcast` directive and later items are ignored.
pub fn build_directives(
    ctx: &PlaybackContext,
    playlist: &[PlayableItem],
    mode: DirectiveMode,
) -> Vec<Directive> {
    let mut directives = Vec::with_capacity(playlist.len());

    for item in playlist {
        if item.kind() == ItemKind::Broadcast {
            directives.push(Directive::StartBroadcast {
                url: item.url.clone(),
            });
            if directives.len() < playlist.len() {
                debug!(
                    "Broadcast ends the directive sequence, {} item(s) dropped",
                    playlist.len() - directives.len()
                );
            }
            break;
        }

        let payload = build_item_payload(ctx, item, "");
        directives.push(match mode {
            DirectiveMode::Add => Directive::Add { payload },
            DirectiveMode::PlayNext => Directive::PlayNext { payload },
        });
    }

    directives
}

/// Concatenate rendered directives, each prefixed with `callback_prefix`
pub fn render_directives(directives: &[Directive], callback_prefix: &str) -> Result<String> {
    directives
        .iter()
        .map(|directive| directive.render(callback_prefix))
        .collect()
}

/// Build and render in one step
pub fn build_script(
    ctx: &PlaybackContext,
    playlist: &[PlayableItem],
    mode: DirectiveMode,
    callback_prefix: &str,
) -> Result<String> {
    render_directives(&build_directives(ctx, playlist, mode), callback_prefix)
}

/// Distinct player tokens the playlist needs, in first-seen order
///
/// Broadcasts are relayed as mp3, so they are resolved with mp3 forced.
pub fn supplied_types(ctx: &PlaybackContext, playlist: &[PlayableItem]) -> Vec<String> {
    let mut supplied: Vec<String> = Vec::new();

    for item in playlist {
        let forced_format = if item.kind() == ItemKind::Broadcast { "mp3" } else { "" };
        let types = resolve_types(ctx, item, forced_format);
        if !supplied.contains(&types.player) {
            supplied.push(types.player);
        }
    }

    supplied
}
