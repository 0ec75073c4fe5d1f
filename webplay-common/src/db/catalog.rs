//! Catalog snapshot loading
//!
//! The resolution engine is synchronous, so the stored catalog is read once
//! into an immutable [`CatalogSnapshot`] that lookups then clone from.

use crate::media::{CatalogSnapshot, DemocraticQueue, EntityKind, MediaReference, SongDetails};
use crate::Result;
use sqlx::{Pool, Row, Sqlite};
use tracing::{debug, warn};

/// Load every media row and democratic queue
///
/// Rows with an unknown kind tag are skipped with a warning.
pub async fn load_catalog(db: &Pool<Sqlite>) -> Result<CatalogSnapshot> {
    let rows = sqlx::query(
        r#"
        SELECT kind, id, file_type, artist_id, album_id,
               replaygain_track_gain, replaygain_track_peak,
               replaygain_album_gain, replaygain_album_peak
        FROM media
        ORDER BY kind, id
        "#,
    )
    .fetch_all(db)
    .await?;

    let mut media = Vec::with_capacity(rows.len());
    for row in rows {
        let tag: String = row.get("kind");
        let raw_id: i64 = row.get("id");
        let Ok(id) = u64::try_from(raw_id) else {
            warn!("Skipping {} row with negative id {}", tag, raw_id);
            continue;
        };
        let Some(kind) = EntityKind::from_tag(&tag) else {
            warn!("Skipping media {} with unknown kind '{}'", id, tag);
            continue;
        };

        let mut reference = MediaReference::new(kind, id, &row.get::<String, _>("file_type"));
        if kind == EntityKind::Song {
            reference = reference.with_song_details(SongDetails {
                artist_id: non_negative(row.get("artist_id")),
                album_id: non_negative(row.get("album_id")),
                replaygain_track_gain: row.get("replaygain_track_gain"),
                replaygain_track_peak: row.get("replaygain_track_peak"),
                replaygain_album_gain: row.get("replaygain_album_gain"),
                replaygain_album_peak: row.get("replaygain_album_peak"),
            });
        }
        media.push(reference);
    }

    let queue_rows = sqlx::query("SELECT id, next_song_id FROM democratic ORDER BY id")
        .fetch_all(db)
        .await?;

    let mut queues = Vec::with_capacity(queue_rows.len());
    for row in queue_rows {
        let raw_id: i64 = row.get("id");
        let Ok(id) = u64::try_from(raw_id) else {
            warn!("Skipping democratic queue with negative id {}", raw_id);
            continue;
        };
        queues.push(DemocraticQueue {
            id,
            next_song_id: row
                .get::<Option<i64>, _>("next_song_id")
                .and_then(|id| u64::try_from(id).ok())
                .filter(|id| *id > 0),
        });
    }

    debug!(
        "Loaded catalog snapshot: {} media, {} queues",
        media.len(),
        queues.len()
    );

    Ok(CatalogSnapshot { media, queues })
}

/// Nullable id column as u64, zero when NULL or negative
fn non_negative(value: Option<i64>) -> u64 {
    value.and_then(|v| u64::try_from(v).ok()).unwrap_or(0)
}

/// Insert or replace one media row
pub async fn insert_media(db: &Pool<Sqlite>, media: &MediaReference) -> Result<()> {
    let song = media.song.as_ref();

    sqlx::query(
        r#"
        INSERT OR REPLACE INTO media (
            kind, id, file_type, artist_id, album_id,
            replaygain_track_gain, replaygain_track_peak,
            replaygain_album_gain, replaygain_album_peak
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(media.kind.as_tag())
    .bind(media.id as i64)
    .bind(&media.native_format)
    .bind(song.map(|s| s.artist_id as i64))
    .bind(song.map(|s| s.album_id as i64))
    .bind(song.and_then(|s| s.replaygain_track_gain))
    .bind(song.and_then(|s| s.replaygain_track_peak))
    .bind(song.and_then(|s| s.replaygain_album_gain))
    .bind(song.and_then(|s| s.replaygain_album_peak))
    .execute(db)
    .await?;

    Ok(())
}

/// Insert or replace one democratic queue
pub async fn insert_queue(db: &Pool<Sqlite>, queue: &DemocraticQueue) -> Result<()> {
    sqlx::query("INSERT OR REPLACE INTO democratic (id, next_song_id) VALUES (?, ?)")
        .bind(queue.id as i64)
        .bind(queue.next_song_id.map(|id| id as i64))
        .execute(db)
        .await?;

    Ok(())
}
