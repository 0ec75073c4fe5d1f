//! Media data model shared by the catalog loader and the resolution engine
//!
//! A [`MediaReference`] is the read-only view of one stored media object:
//! its id, its normalized native format and, for songs, the metadata the
//! web player needs (artist/album ids and replay gain).

use serde::{Deserialize, Serialize};

/// Kind of stored entity a URL can point at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Song,
    Video,
    PodcastEpisode,
    LiveStream,
    SongPreview,
}

/// Entity kinds that can be instantiated directly from a URL `type` tag.
///
/// `song_preview` is deliberately absent: previews have their own lookup
/// branch, tried only after the media kinds.
const MEDIA_REGISTRY: &[(&str, EntityKind)] = &[
    ("song", EntityKind::Song),
    ("video", EntityKind::Video),
    ("podcast_episode", EntityKind::PodcastEpisode),
    ("live_stream", EntityKind::LiveStream),
];

impl EntityKind {
    /// Look up a media kind in the registry by its URL tag
    pub fn from_media_tag(tag: &str) -> Option<Self> {
        MEDIA_REGISTRY
            .iter()
            .find(|(name, _)| *name == tag)
            .map(|(_, kind)| *kind)
    }

    /// Parse any entity tag, including `song_preview`
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "song_preview" => Some(EntityKind::SongPreview),
            other => Self::from_media_tag(other),
        }
    }

    /// Tag used in URLs, payloads and database tables
    pub fn as_tag(&self) -> &'static str {
        match self {
            EntityKind::Song => "song",
            EntityKind::Video => "video",
            EntityKind::PodcastEpisode => "podcast_episode",
            EntityKind::LiveStream => "live_stream",
            EntityKind::SongPreview => "song_preview",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_tag())
    }
}

/// Whether `tag` names an entity kind that can be loaded directly by id
pub fn is_media_entity_kind(tag: &str) -> bool {
    EntityKind::from_media_tag(tag).is_some()
}

/// Song-only metadata surfaced to the web player
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SongDetails {
    pub artist_id: u64,
    pub album_id: u64,
    pub replaygain_track_gain: Option<f64>,
    pub replaygain_track_peak: Option<f64>,
    pub replaygain_album_gain: Option<f64>,
    pub replaygain_album_peak: Option<f64>,
}

/// A resolved backing media object
///
/// Built fresh for every lookup and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaReference {
    pub id: u64,
    pub kind: EntityKind,
    /// Lowercase extension/codec token ("mp3", "flac", "mp4", ...)
    pub native_format: String,
    pub song: Option<SongDetails>,
}

impl MediaReference {
    /// Create a media reference, normalizing the stored format token
    pub fn new(kind: EntityKind, id: u64, native_format: &str) -> Self {
        Self {
            id,
            kind,
            native_format: normalize_format(native_format),
            song: None,
        }
    }

    /// Attach song metadata
    pub fn with_song_details(mut self, details: SongDetails) -> Self {
        self.song = Some(details);
        self
    }
}

/// Normalize a stored format token: trimmed, lowercase
pub fn normalize_format(format: &str) -> String {
    format.trim().to_ascii_lowercase()
}

/// Democratic playback queue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemocraticQueue {
    /// Zero when the queue is not active
    pub id: u64,
    pub next_song_id: Option<u64>,
}

impl DemocraticQueue {
    pub fn is_active(&self) -> bool {
        self.id != 0
    }
}

/// Immutable snapshot of the stored catalog
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogSnapshot {
    pub media: Vec<MediaReference>,
    pub queues: Vec<DemocraticQueue>,
}
