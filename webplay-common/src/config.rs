//! Configuration loading and config file resolution
//!
//! The transcode policy is process-wide and read-only while requests are
//! served: it is loaded once at startup (TOML file, then optional settings
//! table overrides) and handed to the engine as an explicit struct.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{info, warn};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "WEBPLAY_CONFIG";

/// Config file name looked up in the platform config directories
pub const CONFIG_FILE_NAME: &str = "webplay.toml";

/// Server transcode mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TranscodeMode {
    /// Never transcode, even when the native format cannot be delivered
    Never,
    /// Transcode only when required or explicitly requested
    #[default]
    Default,
    /// Transcode everything
    Always,
}

impl FromStr for TranscodeMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "never" => Ok(TranscodeMode::Never),
            "default" => Ok(TranscodeMode::Default),
            "always" => Ok(TranscodeMode::Always),
            other => Err(Error::InvalidInput(format!("Unknown transcode mode: {}", other))),
        }
    }
}

impl std::fmt::Display for TranscodeMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TranscodeMode::Never => write!(f, "never"),
            TranscodeMode::Default => write!(f, "default"),
            TranscodeMode::Always => write!(f, "always"),
        }
    }
}

/// Transcode policy consulted by the resolution engine
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscodePolicy {
    pub transcode_mode: TranscodeMode,
    /// Flash fallback player enabled in the web player
    pub webplayer_flash_enabled: bool,
    /// Clients may force a transcode target format
    pub transcode_player_customize: bool,
}

/// Per-format delivery rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormatRule {
    /// Native delivery only
    #[default]
    None,
    /// Native delivery, transcoding permitted
    Allowed,
    /// Must be transcoded
    Required,
}

impl FromStr for FormatRule {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "allowed" => Ok(FormatRule::Allowed),
            "required" => Ok(FormatRule::Required),
            "none" | "" => Ok(FormatRule::None),
            other => match parse_flag(other) {
                Some(true) => Ok(FormatRule::Allowed),
                Some(false) => Ok(FormatRule::None),
                None => Err(Error::InvalidInput(format!("Unknown format rule: {}", other))),
            },
        }
    }
}

/// Requestable transcode targets when none are configured
pub const DEFAULT_TARGETS: &[&str] = &["mp3", "ogg", "opus", "m4a", "flac", "webm"];

/// Transcode table: which formats can be delivered how, and to what
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscodeConfig {
    /// Global rule per native format
    pub formats: BTreeMap<String, FormatRule>,
    /// Rule overrides per player context, then per native format
    pub player: BTreeMap<String, BTreeMap<String, FormatRule>>,
    /// Fallback transcode target
    pub encode_target: String,
    /// Formats a client may request as a transcode target
    pub targets: Vec<String>,
    /// Target per entity kind, for kinds other than songs
    pub kind_targets: BTreeMap<String, String>,
    /// Target per player context
    pub player_targets: BTreeMap<String, String>,
    /// Global transcode command
    pub command: Option<String>,
    /// Transcode command per source format
    pub commands: BTreeMap<String, String>,
}

impl Default for TranscodeConfig {
    fn default() -> Self {
        Self {
            formats: BTreeMap::new(),
            player: BTreeMap::new(),
            encode_target: "mp3".to_string(),
            targets: DEFAULT_TARGETS.iter().map(|t| t.to_string()).collect(),
            kind_targets: BTreeMap::new(),
            player_targets: BTreeMap::new(),
            command: None,
            commands: BTreeMap::new(),
        }
    }
}

/// Root of `webplay.toml`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub policy: TranscodePolicy,
    pub transcode: TranscodeConfig,
}

impl PlayerConfig {
    /// Parse a configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Read and parse a configuration file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }
}

/// Parse a loose boolean flag ("1", "true", "yes", "on" / "0", "false", ...)
pub fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

/// Where a config file path came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Named on the command line
    CommandLine(PathBuf),
    /// Named by [`CONFIG_ENV_VAR`]
    Environment(PathBuf),
    /// Found in a platform config directory
    Discovered(PathBuf),
    /// Nothing found: compiled defaults
    Defaults,
}

/// Config file resolution in priority order:
/// 1. Command-line argument (highest priority)
/// 2. Environment variable
/// 3. Platform config file
/// 4. Compiled defaults (fallback)
pub fn resolve_config_source(cli_arg: Option<&Path>) -> ConfigSource {
    if let Some(path) = cli_arg {
        return ConfigSource::CommandLine(path.to_path_buf());
    }

    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.is_empty() {
            return ConfigSource::Environment(PathBuf::from(path));
        }
    }

    match find_config_file() {
        Some(path) => ConfigSource::Discovered(path),
        None => ConfigSource::Defaults,
    }
}

/// Look for the config file in the platform config directories
fn find_config_file() -> Option<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("webplay").join(CONFIG_FILE_NAME));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/webplay").join(CONFIG_FILE_NAME);
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}

/// Load the player configuration
///
/// An explicitly named file (command line or environment) must exist and
/// parse. A missing discovered file is not an error: the compiled defaults
/// are used and a warning is logged.
pub fn load_config(cli_arg: Option<&Path>) -> Result<PlayerConfig> {
    match resolve_config_source(cli_arg) {
        ConfigSource::CommandLine(path) | ConfigSource::Environment(path) => {
            if !path.exists() {
                return Err(Error::Config(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            info!("Loading configuration from {}", path.display());
            PlayerConfig::from_file(&path)
        }
        ConfigSource::Discovered(path) => {
            info!("Loading configuration from {}", path.display());
            PlayerConfig::from_file(&path)
        }
        ConfigSource::Defaults => {
            warn!("No config file found, using compiled defaults");
            Ok(PlayerConfig::default())
        }
    }
}
