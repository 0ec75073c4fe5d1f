//! Media lookup
//!
//! Resolves a URL descriptor into the media object it streams. Resolution
//! order is fixed and the first applicable branch is final:
//! 1. direct media id (entity tag found in the media registry)
//! 2. song preview id
//! 3. democratic queue id (the queue's next song)
//!
//! Every miss degrades to `None`; callers fall back to URL/codec sniffing.

use std::collections::HashMap;
use tracing::debug;
use webplay_common::media::{CatalogSnapshot, DemocraticQueue, EntityKind, MediaReference};

use crate::url::UrlDescriptor;

/// Storage-backed entity constructors
///
/// Implementations return a freshly built reference on every call.
pub trait MediaStore: Send + Sync {
    fn load_media(&self, kind: EntityKind, id: u64) -> Option<MediaReference>;
    fn load_song_preview(&self, id: u64) -> Option<MediaReference>;
    fn load_queue(&self, id: u64) -> Option<DemocraticQueue>;
}

/// In-memory store built from a catalog snapshot
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    media: HashMap<(EntityKind, u64), MediaReference>,
    queues: HashMap<u64, DemocraticQueue>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: CatalogSnapshot) -> Self {
        let mut store = Self::new();
        for media in snapshot.media {
            store.insert_media(media);
        }
        for queue in snapshot.queues {
            store.insert_queue(queue);
        }
        store
    }

    pub fn insert_media(&mut self, media: MediaReference) {
        self.media.insert((media.kind, media.id), media);
    }

    pub fn insert_queue(&mut self, queue: DemocraticQueue) {
        self.queues.insert(queue.id, queue);
    }

    pub fn len(&self) -> usize {
        self.media.len()
    }

    pub fn is_empty(&self) -> bool {
        self.media.is_empty()
    }
}

impl MediaStore for MemoryStore {
    fn load_media(&self, kind: EntityKind, id: u64) -> Option<MediaReference> {
        self.media.get(&(kind, id)).cloned()
    }

    fn load_song_preview(&self, id: u64) -> Option<MediaReference> {
        self.load_media(EntityKind::SongPreview, id)
    }

    fn load_queue(&self, id: u64) -> Option<DemocraticQueue> {
        self.queues.get(&id).cloned()
    }
}

/// Resolve a descriptor into its backing media object
pub fn resolve_media(descriptor: &UrlDescriptor, store: &dyn MediaStore) -> Option<MediaReference> {
    if let Some(id) = descriptor.entity_id {
        if let Some(kind) = EntityKind::from_media_tag(&descriptor.entity_type) {
            let media = store.load_media(kind, id);
            if media.is_none() {
                debug!("No {} with id {}", kind, id);
            }
            return media;
        }

        if descriptor.entity_type == EntityKind::SongPreview.as_tag() {
            let media = store.load_song_preview(id);
            if media.is_none() {
                debug!("No song preview with id {}", id);
            }
            return media;
        }
    }

    let queue_id = descriptor.queue_id?;
    let Some(queue) = store.load_queue(queue_id).filter(DemocraticQueue::is_active) else {
        debug!("Democratic queue {} is not active", queue_id);
        return None;
    };
    let Some(song_id) = queue.next_song_id else {
        debug!("Democratic queue {} has no next song", queue_id);
        return None;
    };

    store.load_media(EntityKind::Song, song_id)
}
