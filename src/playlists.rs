//! The playlist list screen's data layer.
//!
//! Every mutation is written to the [`PlaylistStore`] first; the in-memory
//! list is only touched once the transaction committed, then the observer
//! gets exactly one [`PlaylistEvent`].

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::mpsc::UnboundedSender;

use crate::analytics::{self, Analytics};
use crate::error::{Error, Result};
use crate::service::{Playlist, Video};
use crate::storage::{MemberVideo, Mutation, PlaylistRecord, PlaylistStore};

/// Row-level change notifications for the playlist list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaylistEvent {
    /// Whole list re-read from the store
    Reloaded,
    Inserted(usize),
    Updated(usize),
    Removed(usize),
}

pub struct PlaylistList<S> {
    store: S,
    analytics: Arc<dyn Analytics>,
    playlists: Vec<Playlist>,
    loaded: bool,
    observer: Option<UnboundedSender<PlaylistEvent>>,
}

impl<S: PlaylistStore> PlaylistList<S> {
    pub fn new(store: S, analytics: Arc<dyn Analytics>) -> Self {
        Self {
            store,
            analytics,
            playlists: Vec::new(),
            loaded: false,
            observer: None,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Register the screen that wants change notifications.
    pub fn set_observer(&mut self, observer: UnboundedSender<PlaylistEvent>) {
        self.observer = Some(observer);
    }

    /// Unregister on teardown.
    pub fn remove_observer(&mut self) {
        self.observer = None;
    }

    fn notify(&self, event: PlaylistEvent) {
        if let Some(ref tx) = self.observer {
            let _ = tx.send(event);
        }
    }

    fn ensure_loaded(&self) -> Result<()> {
        if self.loaded {
            Ok(())
        } else {
            Err(Error::NotLoaded)
        }
    }

    /// Read every playlist from the store, sorted by `order`.
    ///
    /// Safe to call again at any time to resynchronize with the store.
    pub fn load(&mut self) -> Result<&[Playlist]> {
        let playlists = self.store.playlists().map_err(|e| {
            tracing::warn!(backend = self.store.backend_name(), "failed to load playlists: {:#}", e);
            Error::store_unavailable(&e)
        })?;
        tracing::debug!(count = playlists.len(), "playlists loaded");
        self.playlists = playlists;
        self.loaded = true;
        self.notify(PlaylistEvent::Reloaded);
        Ok(&self.playlists)
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn playlists(&self) -> &[Playlist] {
        &self.playlists
    }

    pub fn len(&self) -> usize {
        self.playlists.len()
    }

    /// True when the blank "add your first playlist" state should show
    pub fn is_empty(&self) -> bool {
        self.playlists.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Playlist> {
        self.playlists.get(index)
    }

    pub fn index_of(&self, playlist_id: &str) -> Option<usize> {
        self.playlists.iter().position(|p| p.id == playlist_id)
    }

    /// Create a playlist at the end of the list.
    pub fn add(&mut self, title: &str) -> Result<Playlist> {
        self.ensure_loaded()?;
        let title = title.trim();
        if title.is_empty() {
            return Err(Error::InvalidTitle);
        }

        let playlist = Playlist {
            id: new_playlist_id(),
            title: title.to_string(),
            order: self.playlists.len() as u32,
            videos: Vec::new(),
        };
        let record = PlaylistRecord {
            id: playlist.id.clone(),
            title: playlist.title.clone(),
            order: playlist.order,
        };
        self.store
            .transact(vec![Mutation::PutPlaylist(record)])
            .map_err(|e| {
                tracing::warn!("failed to add playlist {:?}: {:#}", title, e);
                Error::write_failed(&e)
            })?;

        tracing::info!(id = %playlist.id, order = playlist.order, "playlist added");
        self.analytics
            .record_event(analytics::PLAYLIST_ADDED, &[("title", playlist.title.as_str())]);

        self.playlists.push(playlist.clone());
        self.notify(PlaylistEvent::Inserted(self.playlists.len() - 1));
        Ok(playlist)
    }

    /// Delete a playlist with all of its videos and close the gap in `order`.
    ///
    /// Member deletion, record deletion and the reindex of every remaining
    /// playlist commit as one transaction. On failure neither the store nor
    /// the in-memory list changes.
    pub fn delete(&mut self, playlist_id: &str) -> Result<()> {
        self.ensure_loaded()?;
        let failed = |reason: String| Error::DeleteFailed {
            id: playlist_id.to_string(),
            reason,
        };

        let current = self.store.playlists().map_err(|e| failed(format!("{e:#}")))?;
        if !current.iter().any(|p| p.id == playlist_id) {
            return Err(failed("no such playlist".to_string()));
        }

        let mut mutations = vec![
            Mutation::DeleteVideosOf(playlist_id.to_string()),
            Mutation::DeletePlaylist(playlist_id.to_string()),
        ];
        mutations.extend(
            current
                .iter()
                .filter(|p| p.id != playlist_id)
                .enumerate()
                .map(|(order, p)| Mutation::SetOrder {
                    playlist_id: p.id.clone(),
                    order: order as u32,
                }),
        );

        self.store.transact(mutations).map_err(|e| {
            tracing::warn!(id = playlist_id, "failed to delete playlist: {:#}", e);
            failed(format!("{e:#}"))
        })?;
        tracing::info!(id = playlist_id, remaining = current.len() - 1, "playlist deleted");

        let index = self.index_of(playlist_id);
        self.playlists = match self.store.playlists() {
            Ok(playlists) => playlists,
            Err(e) => {
                // Committed; rebuild the mirror from the snapshot the batch was derived from
                tracing::warn!(id = playlist_id, "re-reading playlists after delete failed: {:#}", e);
                let mut remaining: Vec<Playlist> =
                    current.into_iter().filter(|p| p.id != playlist_id).collect();
                for (order, playlist) in remaining.iter_mut().enumerate() {
                    playlist.order = order as u32;
                }
                remaining
            }
        };
        self.notify(match index {
            Some(i) => PlaylistEvent::Removed(i),
            None => PlaylistEvent::Reloaded,
        });
        Ok(())
    }

    /// Replace the row whose id matches, e.g. after its most recent video
    /// changed on another screen. Returns the refreshed row index.
    pub fn update_member(&mut self, playlist: Playlist) -> Option<usize> {
        let index = self.index_of(&playlist.id)?;
        self.playlists[index] = playlist;
        self.notify(PlaylistEvent::Updated(index));
        Some(index)
    }

    /// Append a video to a playlist. Videos already in the playlist are skipped.
    pub fn add_video(&mut self, playlist_id: &str, video: Video) -> Result<usize> {
        self.ensure_loaded()?;
        let index = self
            .index_of(playlist_id)
            .ok_or_else(|| Error::UnknownPlaylist(playlist_id.to_string()))?;
        if self.playlists[index].videos.iter().any(|v| v.id == video.id) {
            return Ok(index);
        }

        let member = MemberVideo {
            order: self.playlists[index].videos.len() as u32,
            playlist_id: playlist_id.to_string(),
            video: video.clone(),
            added_at_ms: Utc::now().timestamp_millis(),
        };
        self.store
            .transact(vec![Mutation::PutVideo(member)])
            .map_err(|e| Error::write_failed(&e))?;

        let stored = match self.store.playlists() {
            Ok(playlists) => playlists.into_iter().find(|p| p.id == playlist_id),
            Err(e) => {
                tracing::warn!(id = playlist_id, "re-reading playlist after adding video failed: {:#}", e);
                None
            }
        };
        let refreshed = stored.unwrap_or_else(|| {
            let mut row = self.playlists[index].clone();
            row.videos.push(video);
            row
        });
        Ok(self.update_member(refreshed).unwrap_or(index))
    }

    /// Videos recently added to any playlist, newest first.
    pub fn recent_videos(&self, limit: usize) -> Result<Vec<Video>> {
        self.store
            .recent_videos(limit)
            .map_err(|e| Error::store_unavailable(&e))
    }

    /// Drop every playlist and video, then reload.
    pub fn clear_all(&mut self) -> Result<()> {
        self.store
            .transact(vec![Mutation::Clear])
            .map_err(|e| Error::write_failed(&e))?;
        tracing::info!("all playlists cleared");
        self.load()?;
        Ok(())
    }
}

fn new_playlist_id() -> String {
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    let now = Utc::now();
    format!(
        "pl-{:x}{:x}-{}",
        now.timestamp(),
        now.timestamp_subsec_nanos(),
        COUNTER.fetch_add(1, Ordering::Relaxed)
    )
}
