//! Settings database access
//!
//! Key/value settings table. Values stored here override the transcode
//! policy read from the config file, so an administrator can change policy
//! without editing files. Overrides are applied once, at load time.

use crate::config::{parse_flag, TranscodeMode, TranscodePolicy};
use crate::{Error, Result};
use sqlx::{Pool, Sqlite};
use std::str::FromStr;
use tracing::info;

/// Settings key for the transcode mode (never/default/always)
pub const SETTING_TRANSCODE: &str = "transcode";
/// Settings key for the flash web player flag
pub const SETTING_WEBPLAYER_FLASH: &str = "webplayer_flash";
/// Settings key for client-side transcode customization
pub const SETTING_PLAYER_CUSTOMIZE: &str = "transcode_player_customize";

/// Apply settings table overrides on top of a file-loaded policy
pub async fn apply_policy_overrides(
    db: &Pool<Sqlite>,
    policy: TranscodePolicy,
) -> Result<TranscodePolicy> {
    let mut policy = policy;

    if let Some(mode) = get_setting::<TranscodeMode>(db, SETTING_TRANSCODE).await? {
        info!("Transcode mode overridden by settings table: {}", mode);
        policy.transcode_mode = mode;
    }

    if let Some(flash) = get_flag(db, SETTING_WEBPLAYER_FLASH).await? {
        policy.webplayer_flash_enabled = flash;
    }

    if let Some(customize) = get_flag(db, SETTING_PLAYER_CUSTOMIZE).await? {
        policy.transcode_player_customize = customize;
    }

    Ok(policy)
}

/// Read a loose boolean setting
async fn get_flag(db: &Pool<Sqlite>, key: &str) -> Result<Option<bool>> {
    match get_setting::<String>(db, key).await? {
        Some(value) => parse_flag(&value).map(Some).ok_or_else(|| {
            Error::Config(format!("Failed to parse setting '{}' value: {}", key, value))
        }),
        None => Ok(None),
    }
}

/// Generic setting getter
///
/// Returns `None` for missing keys and NULL values.
pub async fn get_setting<T: FromStr>(db: &Pool<Sqlite>, key: &str) -> Result<Option<T>> {
    let value: Option<Option<String>> =
        sqlx::query_scalar("SELECT value FROM settings WHERE key = ?")
            .bind(key)
            .fetch_optional(db)
            .await?;

    match value.flatten() {
        Some(s) => match s.parse::<T>() {
            Ok(parsed) => Ok(Some(parsed)),
            Err(_) => Err(Error::Config(format!(
                "Failed to parse setting '{}' value: {}",
                key, s
            ))),
        },
        None => Ok(None),
    }
}

/// Generic setting setter
///
/// Inserts or updates setting in database.
pub async fn set_setting<T: ToString>(db: &Pool<Sqlite>, key: &str, value: T) -> Result<()> {
    let value_str = value.to_string();

    sqlx::query(
        r#"
        INSERT INTO settings (key, value)
        VALUES (?, ?)
        ON CONFLICT(key) DO UPDATE SET value = excluded.value
        "#,
    )
    .bind(key)
    .bind(value_str)
    .execute(db)
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_settings_table;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn setup_test_db() -> Pool<Sqlite> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();

        create_settings_table(&pool).await.unwrap();

        pool
    }

    #[tokio::test]
    async fn test_setting_get_set() {
        let db = setup_test_db().await;

        assert_eq!(get_setting::<String>(&db, "missing").await.unwrap(), None);

        set_setting(&db, "volume", 0.75).await.unwrap();
        assert_eq!(get_setting::<f64>(&db, "volume").await.unwrap(), Some(0.75));

        set_setting(&db, "volume", 0.5).await.unwrap();
        assert_eq!(get_setting::<f64>(&db, "volume").await.unwrap(), Some(0.5));
    }

    #[tokio::test]
    async fn test_unparseable_setting_is_config_error() {
        let db = setup_test_db().await;
        set_setting(&db, "volume", "loud").await.unwrap();

        let result = get_setting::<f64>(&db, "volume").await;
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[tokio::test]
    async fn test_no_overrides_keeps_policy() {
        let db = setup_test_db().await;
        let policy = TranscodePolicy {
            transcode_mode: TranscodeMode::Always,
            webplayer_flash_enabled: true,
            transcode_player_customize: false,
        };

        let applied = apply_policy_overrides(&db, policy.clone()).await.unwrap();
        assert_eq!(applied, policy);
    }

    #[tokio::test]
    async fn test_overrides_replace_policy_fields() {
        let db = setup_test_db().await;
        set_setting(&db, SETTING_TRANSCODE, "never").await.unwrap();
        set_setting(&db, SETTING_WEBPLAYER_FLASH, "1").await.unwrap();
        set_setting(&db, SETTING_PLAYER_CUSTOMIZE, "true").await.unwrap();

        let applied = apply_policy_overrides(&db, TranscodePolicy::default())
            .await
            .unwrap();
        assert_eq!(applied.transcode_mode, TranscodeMode::Never);
        assert!(applied.webplayer_flash_enabled);
        assert!(applied.transcode_player_customize);
    }

    #[tokio::test]
    async fn test_invalid_override_is_rejected() {
        let db = setup_test_db().await;
        set_setting(&db, SETTING_WEBPLAYER_FLASH, "perhaps").await.unwrap();

        let result = apply_policy_overrides(&db, TranscodePolicy::default()).await;
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
