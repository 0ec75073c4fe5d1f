//! End-to-end resolution from a catalog database on disk
//!
//! Builds a database with `init_database`, reopens it read-only the way the
//! resolver binary does, and resolves through the loaded snapshot.

use tempfile::TempDir;
use webplay_common::db::{
    apply_policy_overrides, connect_readonly, init_database, insert_media, insert_queue,
    load_catalog, set_setting, SETTING_PLAYER_CUSTOMIZE, SETTING_TRANSCODE,
};
use webplay_common::media::{DemocraticQueue, EntityKind, MediaReference, SongDetails};
use webplay_common::{PlayerConfig, TranscodeMode};
use webplay_engine::capability::TranscodeTable;
use webplay_engine::lookup::MemoryStore;
use webplay_engine::{build_item_payload, resolve_types, ItemKind, PlayableItem, PlaybackContext};

const CONFIG: &str = r#"
[transcode]
command = "ffmpeg"

[transcode.formats]
flac = "allowed"
"#;

async fn seed(dir: &TempDir) -> std::path::PathBuf {
    let db_path = dir.path().join("catalog.db");
    let pool = init_database(&db_path).await.unwrap();

    insert_media(
        &pool,
        &MediaReference::new(EntityKind::Song, 2, "FLAC").with_song_details(SongDetails {
            artist_id: 3,
            album_id: 4,
            replaygain_album_gain: Some(-1.25),
            ..SongDetails::default()
        }),
    )
    .await
    .unwrap();
    insert_queue(&pool, &DemocraticQueue { id: 1, next_song_id: Some(2) })
        .await
        .unwrap();
    set_setting(&pool, SETTING_PLAYER_CUSTOMIZE, "1").await.unwrap();

    pool.close().await;
    db_path
}

#[tokio::test]
async fn test_resolve_from_database() {
    let dir = TempDir::new().unwrap();
    let db_path = seed(&dir).await;

    let config = PlayerConfig::from_toml_str(CONFIG).unwrap();
    let pool = connect_readonly(&db_path).await.unwrap();
    let policy = apply_policy_overrides(&pool, config.policy.clone()).await.unwrap();
    let snapshot = load_catalog(&pool).await.unwrap();
    pool.close().await;

    assert!(policy.transcode_player_customize);
    assert_eq!(policy.transcode_mode, TranscodeMode::Default);

    let store = MemoryStore::from_snapshot(snapshot);
    let table = TranscodeTable::new(config.transcode);
    let ctx = PlaybackContext::new(&policy, &store, &table);

    let song = PlayableItem::new(
        ItemKind::Song,
        "http://music.local/play/index.php?type=song&oid=2&uid=1",
    );
    let types = resolve_types(&ctx, &song, "");
    assert_eq!((types.real.as_str(), types.player.as_str()), ("flac", "flac"));

    let forced = resolve_types(&ctx, &song, "opus");
    assert_eq!((forced.real.as_str(), forced.player.as_str()), ("opus", "oga"));

    let payload = build_item_payload(&ctx, &song, "");
    assert_eq!(payload.song.as_ref().unwrap().replaygain_album_gain, Some(-1.25));

    let queued = PlayableItem::new(ItemKind::Democratic, "http://music.local/play/stream?demo_id=1");
    assert_eq!(resolve_types(&ctx, &queued, "").real, "flac");
}

#[tokio::test]
async fn test_settings_table_overrides_mode() {
    let dir = TempDir::new().unwrap();
    let db_path = seed(&dir).await;

    {
        let pool = init_database(&db_path).await.unwrap();
        set_setting(&pool, SETTING_TRANSCODE, TranscodeMode::Never).await.unwrap();
        pool.close().await;
    }

    let config = PlayerConfig::from_toml_str(CONFIG).unwrap();
    let pool = connect_readonly(&db_path).await.unwrap();
    let policy = apply_policy_overrides(&pool, config.policy.clone()).await.unwrap();
    let snapshot = load_catalog(&pool).await.unwrap();
    pool.close().await;

    assert_eq!(policy.transcode_mode, TranscodeMode::Never);

    let store = MemoryStore::from_snapshot(snapshot);
    let table = TranscodeTable::new(config.transcode);
    let ctx = PlaybackContext::new(&policy, &store, &table);

    let song = PlayableItem::new(
        ItemKind::Song,
        "http://music.local/play/index.php?type=song&oid=2&uid=1",
    );
    assert_eq!(resolve_types(&ctx, &song, "opus").real, "flac");
}

#[tokio::test]
async fn test_missing_database_is_not_found() {
    let dir = TempDir::new().unwrap();
    let result = connect_readonly(&dir.path().join("absent.db")).await;
    assert!(matches!(result, Err(webplay_common::Error::NotFound(_))));
}
