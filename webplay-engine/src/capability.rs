//! Delivery capabilities and transcode settings
//!
//! Two collaborator seams consulted by the transcode policy evaluator, and
//! [`TranscodeTable`], the config-backed implementation of both.

use tracing::debug;
use webplay_common::config::{FormatRule, TranscodeConfig};
use webplay_common::media::{normalize_format, EntityKind, MediaReference};

/// Usage context of the browser player
pub const WEBPLAYER_CONTEXT: &str = "webplayer";

/// How a native format may be delivered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DeliveryTypes {
    pub native: bool,
    pub transcode: bool,
}

impl From<FormatRule> for DeliveryTypes {
    fn from(rule: FormatRule) -> Self {
        match rule {
            FormatRule::None => DeliveryTypes { native: true, transcode: false },
            FormatRule::Allowed => DeliveryTypes { native: true, transcode: true },
            FormatRule::Required => DeliveryTypes { native: false, transcode: true },
        }
    }
}

/// Delivery-capability table
pub trait DeliveryCapabilities: Send + Sync {
    fn supported_delivery_types(&self, format: &str, context: &str) -> DeliveryTypes;
}

/// Settings for one transcode job
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscodeSettings {
    /// Output format put on the wire
    pub format: String,
    pub command: String,
}

/// Transcode-settings provider
///
/// `requested` names an exact target; `None` asks for the configured default.
/// Returns `None` when no transcode is possible.
pub trait TranscodeSettingsProvider: Send + Sync {
    fn transcode_settings(
        &self,
        media: &MediaReference,
        requested: Option<&str>,
        context: &str,
    ) -> Option<TranscodeSettings>;
}

/// Config-backed delivery rules and transcode targets
#[derive(Debug, Clone, Default)]
pub struct TranscodeTable {
    config: TranscodeConfig,
}

impl TranscodeTable {
    pub fn new(config: TranscodeConfig) -> Self {
        Self { config }
    }

    /// Player-context override first, then the global rule
    fn rule_for(&self, format: &str, context: &str) -> FormatRule {
        self.config
            .player
            .get(context)
            .and_then(|rules| rules.get(format))
            .or_else(|| self.config.formats.get(format))
            .copied()
            .unwrap_or_default()
    }

    /// Whether clients may request `format` as a target
    fn is_requestable(&self, format: &str) -> bool {
        self.config
            .targets
            .iter()
            .any(|target| normalize_format(target) == format)
    }

    /// Target order: requested, player target, kind target (non-songs), global target
    ///
    /// A requested format outside the configured targets yields `None`.
    fn target_for(&self, kind: EntityKind, requested: Option<&str>, context: &str) -> Option<String> {
        if let Some(format) = requested.filter(|f| !f.is_empty()) {
            let format = normalize_format(format);
            if !self.is_requestable(&format) {
                debug!("Requested transcode target {:?} is not configured", format);
                return None;
            }
            return Some(format);
        }
        if let Some(format) = self.config.player_targets.get(context) {
            return Some(normalize_format(format));
        }
        if kind != EntityKind::Song {
            if let Some(format) = self.config.kind_targets.get(kind.as_tag()) {
                return Some(normalize_format(format));
            }
        }
        Some(normalize_format(&self.config.encode_target))
    }
}

impl DeliveryCapabilities for TranscodeTable {
    fn supported_delivery_types(&self, format: &str, context: &str) -> DeliveryTypes {
        self.rule_for(format, context).into()
    }
}

impl TranscodeSettingsProvider for TranscodeTable {
    fn transcode_settings(
        &self,
        media: &MediaReference,
        requested: Option<&str>,
        context: &str,
    ) -> Option<TranscodeSettings> {
        let format = self.target_for(media.kind, requested, context)?;
        if format.is_empty() {
            debug!("No transcode target for {} {}", media.kind, media.id);
            return None;
        }

        let command = self
            .config
            .commands
            .get(&media.native_format)
            .or(self.config.command.as_ref())
            .filter(|cmd| !cmd.is_empty());
        let Some(command) = command else {
            debug!("No transcode command for source format {}", media.native_format);
            return None;
        };

        Some(TranscodeSettings {
            format,
            command: command.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn table() -> TranscodeTable {
        let mut config = TranscodeConfig {
            command: Some("ffmpeg".to_string()),
            ..TranscodeConfig::default()
        };
        config.formats.insert("flac".to_string(), FormatRule::Allowed);
        config.formats.insert("m4a".to_string(), FormatRule::Required);
        config.player.insert(
            WEBPLAYER_CONTEXT.to_string(),
            BTreeMap::from([("flac".to_string(), FormatRule::Required)]),
        );
        config.kind_targets.insert("video".to_string(), "WebM".to_string());
        config.commands.insert("wma".to_string(), "wma-decode".to_string());
        TranscodeTable::new(config)
    }

    #[test]
    fn test_unlisted_format_is_native_only() {
        let types = table().supported_delivery_types("mp3", WEBPLAYER_CONTEXT);
        assert_eq!(types, DeliveryTypes { native: true, transcode: false });
    }

    #[test]
    fn test_global_rules() {
        let table = table();
        assert_eq!(
            table.supported_delivery_types("flac", "api"),
            DeliveryTypes { native: true, transcode: true }
        );
        assert_eq!(
            table.supported_delivery_types("m4a", WEBPLAYER_CONTEXT),
            DeliveryTypes { native: false, transcode: true }
        );
    }

    #[test]
    fn test_player_override_wins() {
        assert_eq!(
            table().supported_delivery_types("flac", WEBPLAYER_CONTEXT),
            DeliveryTypes { native: false, transcode: true }
        );
    }

    #[test]
    fn test_requested_target_is_honored() {
        let song = MediaReference::new(EntityKind::Song, 1, "flac");
        let settings = table()
            .transcode_settings(&song, Some("OGG"), WEBPLAYER_CONTEXT)
            .unwrap();
        assert_eq!(settings.format, "ogg");
        assert_eq!(settings.command, "ffmpeg");
    }

    #[test]
    fn test_unconfigured_requested_target_is_refused() {
        let table = table();
        let song = MediaReference::new(EntityKind::Song, 1, "flac");
        assert!(table.transcode_settings(&song, Some("wav"), WEBPLAYER_CONTEXT).is_none());
        assert!(table
            .transcode_settings(&song, Some("ogg&uid=0"), WEBPLAYER_CONTEXT)
            .is_none());

        let mut config = table.config;
        config.targets = vec!["WAV".to_string()];
        let table = TranscodeTable::new(config);
        assert!(table.transcode_settings(&song, Some("wav"), WEBPLAYER_CONTEXT).is_some());
        assert!(table.transcode_settings(&song, Some("ogg"), WEBPLAYER_CONTEXT).is_none());
    }

    #[test]
    fn test_default_targets() {
        let table = table();
        let song = MediaReference::new(EntityKind::Song, 1, "flac");
        let video = MediaReference::new(EntityKind::Video, 1, "avi");

        let song_settings = table.transcode_settings(&song, None, WEBPLAYER_CONTEXT).unwrap();
        assert_eq!(song_settings.format, "mp3");

        let video_settings = table.transcode_settings(&video, None, WEBPLAYER_CONTEXT).unwrap();
        assert_eq!(video_settings.format, "webm");
    }

    #[test]
    fn test_player_target_beats_kind_target() {
        let mut config = table().config;
        config
            .player_targets
            .insert(WEBPLAYER_CONTEXT.to_string(), "opus".to_string());
        let table = TranscodeTable::new(config);

        let video = MediaReference::new(EntityKind::Video, 1, "avi");
        let settings = table.transcode_settings(&video, None, WEBPLAYER_CONTEXT).unwrap();
        assert_eq!(settings.format, "opus");
    }

    #[test]
    fn test_source_specific_command() {
        let wma = MediaReference::new(EntityKind::Song, 2, "wma");
        let settings = table().transcode_settings(&wma, None, WEBPLAYER_CONTEXT).unwrap();
        assert_eq!(settings.command, "wma-decode");
    }

    #[test]
    fn test_no_command_means_no_settings() {
        let table = TranscodeTable::default();
        let song = MediaReference::new(EntityKind::Song, 1, "flac");
        assert!(table.transcode_settings(&song, Some("ogg"), WEBPLAYER_CONTEXT).is_none());
    }

    #[test]
    fn test_empty_target_means_no_settings() {
        let config = TranscodeConfig {
            encode_target: String::new(),
            command: Some("ffmpeg".to_string()),
            ..TranscodeConfig::default()
        };
        let song = MediaReference::new(EntityKind::Song, 1, "flac");
        let settings = TranscodeTable::new(config).transcode_settings(&song, None, WEBPLAYER_CONTEXT);
        assert!(settings.is_none());
    }
}
