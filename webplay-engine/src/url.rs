//! Stream URL descriptors
//!
//! Play URLs carry the entity they stream in their query string:
//! `.../play/index.php?type=song&oid=42&uid=1` or, for democratic queues,
//! `...?demo_id=3`. Parsing is best effort: a URL without a query yields a
//! descriptor with empty fields, never an error.

use tracing::debug;
use url::{form_urlencoded, ParseError, Url};

/// Parsed view of an item URL
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UrlDescriptor {
    /// Entity tag ("song", "video", "song_preview", ...), empty if absent
    pub entity_type: String,
    /// Entity id; zero and non-numeric ids are treated as absent
    pub entity_id: Option<u64>,
    /// Democratic queue id
    pub queue_id: Option<u64>,
    /// URL the player should fetch
    pub base_url: String,
}

/// Turns an opaque item URL into a descriptor
pub trait UrlParser: Send + Sync {
    fn parse(&self, url: &str) -> UrlDescriptor;
}

/// Query-string parser for server play URLs
#[derive(Debug, Clone, Copy, Default)]
pub struct StreamUrlParser;

impl UrlParser for StreamUrlParser {
    fn parse(&self, url: &str) -> UrlDescriptor {
        let mut descriptor = UrlDescriptor {
            base_url: url.to_string(),
            ..UrlDescriptor::default()
        };

        let Some(parsed) = parse_lenient(url) else {
            return descriptor;
        };

        for (key, value) in parsed.query_pairs() {
            match key.as_ref() {
                "type" => descriptor.entity_type = value.into_owned(),
                "oid" | "id" => descriptor.entity_id = value.parse().ok().filter(|id| *id != 0),
                "demo_id" => descriptor.queue_id = value.parse().ok(),
                // Legacy marker from older video URLs
                "video" if is_truthy(&value) => descriptor.entity_type = "video".to_string(),
                _ => {}
            }
        }

        descriptor
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(value, "1" | "true" | "yes" | "on")
}

/// Base for item URLs given relative to the server root
const RELATIVE_BASE: &str = "http://localhost/";

/// Parse absolute URLs as-is and relative ones against [`RELATIVE_BASE`]
fn parse_lenient(raw: &str) -> Option<Url> {
    match Url::parse(raw) {
        Ok(url) => Some(url),
        Err(ParseError::RelativeUrlWithoutBase) => {
            Url::parse(RELATIVE_BASE).and_then(|base| base.join(raw)).ok()
        }
        Err(err) => {
            debug!("Unparseable item URL {:?}: {}", raw, err);
            None
        }
    }
}

/// Append one form-encoded query parameter to an item URL
///
/// Relative or unparseable URLs keep their text and get the encoded pair
/// appended after `?` or `&`.
pub fn append_query_pair(url: &str, key: &str, value: &str) -> String {
    if let Ok(mut parsed) = Url::parse(url) {
        if !parsed.cannot_be_a_base() {
            parsed.query_pairs_mut().append_pair(key, value);
            return parsed.into();
        }
    }

    let pair = form_urlencoded::Serializer::new(String::new())
        .append_pair(key, value)
        .finish();
    let has_query = url.split('#').next().unwrap_or_default().contains('?');
    let separator = if has_query { '&' } else { '?' };
    format!("{}{}{}", url, separator, pair)
}

/// File extension of the URL path, ignoring query string and fragment
///
/// The host is never mistaken for a file name:
/// `http://radio.example.com` has no extension.
pub fn url_extension(url: &str) -> Option<String> {
    let parsed = parse_lenient(url)?;
    let file_name = parsed.path_segments()?.next_back()?;

    match file_name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => Some(ext.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(url: &str) -> UrlDescriptor {
        StreamUrlParser.parse(url)
    }

    #[test]
    fn test_parse_song_url() {
        let url = "http://music.local/play/index.php?ssid=abc&type=song&oid=42&uid=1&name=x.mp3";
        let descriptor = parse(url);
        assert_eq!(descriptor.entity_type, "song");
        assert_eq!(descriptor.entity_id, Some(42));
        assert_eq!(descriptor.queue_id, None);
        assert_eq!(descriptor.base_url, url);
    }

    #[test]
    fn test_parse_democratic_url() {
        let descriptor = parse("http://music.local/play/index.php?demo_id=3&uid=1");
        assert_eq!(descriptor.entity_type, "");
        assert_eq!(descriptor.entity_id, None);
        assert_eq!(descriptor.queue_id, Some(3));
    }

    #[test]
    fn test_zero_and_garbage_ids_are_absent() {
        assert_eq!(parse("http://h/p?type=song&oid=0").entity_id, None);
        assert_eq!(parse("http://h/p?type=song&oid=abc").entity_id, None);
        assert_eq!(parse("http://h/p?type=song&oid=").entity_id, None);
    }

    #[test]
    fn test_legacy_video_marker() {
        let descriptor = parse("http://h/p?video=true&oid=5");
        assert_eq!(descriptor.entity_type, "video");
        assert_eq!(descriptor.entity_id, Some(5));

        assert_eq!(parse("http://h/p?video=0&oid=5").entity_type, "");
    }

    #[test]
    fn test_query_values_are_decoded() {
        let descriptor = parse("http://h/p?type=podcast%5Fepisode&oid=%37");
        assert_eq!(descriptor.entity_type, "podcast_episode");
        assert_eq!(descriptor.entity_id, Some(7));
    }

    #[test]
    fn test_relative_url_query() {
        let descriptor = parse("/play/index.php?type=song&oid=3");
        assert_eq!(descriptor.entity_type, "song");
        assert_eq!(descriptor.entity_id, Some(3));
        assert_eq!(descriptor.base_url, "/play/index.php?type=song&oid=3");
    }

    #[test]
    fn test_url_without_query_yields_empty_descriptor() {
        let descriptor = parse("http://radio.example.com/stream.ogg");
        assert_eq!(descriptor.entity_type, "");
        assert_eq!(descriptor.entity_id, None);
        assert_eq!(descriptor.queue_id, None);
        assert_eq!(descriptor.base_url, "http://radio.example.com/stream.ogg");

        assert_eq!(parse(""), UrlDescriptor::default());
    }

    #[test]
    fn test_fragment_is_not_part_of_query() {
        let descriptor = parse("http://h/p?type=video&oid=9#t=10");
        assert_eq!(descriptor.entity_type, "video");
        assert_eq!(descriptor.entity_id, Some(9));
    }

    #[test]
    fn test_append_query_pair_encodes_value() {
        assert_eq!(
            append_query_pair("http://h/play?type=song&oid=2", "transcode_to", "ogg"),
            "http://h/play?type=song&oid=2&transcode_to=ogg"
        );
        assert_eq!(
            append_query_pair("http://h/play?type=song&oid=2", "transcode_to", "x&uid=0"),
            "http://h/play?type=song&oid=2&transcode_to=x%26uid%3D0"
        );
        assert_eq!(
            append_query_pair("http://h/stream.flac", "transcode_to", "mp3"),
            "http://h/stream.flac?transcode_to=mp3"
        );
    }

    #[test]
    fn test_append_query_pair_relative_url() {
        assert_eq!(
            append_query_pair("/play?oid=2", "transcode_to", "a b"),
            "/play?oid=2&transcode_to=a+b"
        );
        assert_eq!(
            append_query_pair("clip.webm", "transcode_to", "mp3"),
            "clip.webm?transcode_to=mp3"
        );
    }

    #[test]
    fn test_url_extension() {
        assert_eq!(url_extension("http://radio.example.com/live/stream.aac").as_deref(), Some("aac"));
        assert_eq!(url_extension("http://h/files/track.flac?token=a.b").as_deref(), Some("flac"));
        assert_eq!(url_extension("http://h/files/track.opus#frag").as_deref(), Some("opus"));
        assert_eq!(url_extension("relative/clip.webm").as_deref(), Some("webm"));
    }

    #[test]
    fn test_url_without_extension() {
        assert_eq!(url_extension("http://radio.example.com"), None);
        assert_eq!(url_extension("http://radio.example.com/"), None);
        assert_eq!(url_extension("http://h/stream"), None);
        assert_eq!(url_extension("http://h/.hidden"), None);
        assert_eq!(url_extension("http://h/trailing."), None);
        assert_eq!(url_extension(""), None);
    }
}
