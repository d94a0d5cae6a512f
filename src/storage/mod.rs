//! Storage abstraction for playlists and their member videos.
//!
//! - [`LocalStore`]: redb database file (default, fully offline)
//!
//! `PlaylistList` holds a `PlaylistStore` and every playlist write goes
//! through [`PlaylistStore::transact`] as one batch.

pub mod local;

use anyhow::Result;

use crate::service::{Playlist, Video};

pub use local::LocalStore;

/// A playlist row as written to the store (members are stored separately).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistRecord {
    pub id: String,
    pub title: String,
    pub order: u32,
}

/// A video stored as a member of a playlist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberVideo {
    pub video: Video,
    pub playlist_id: String,
    /// Position within the playlist
    pub order: u32,
    pub added_at_ms: i64,
}

/// One write inside a [`PlaylistStore::transact`] batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    /// Insert or overwrite a playlist record
    PutPlaylist(PlaylistRecord),
    /// Move an existing playlist; fails if the playlist does not exist
    SetOrder { playlist_id: String, order: u32 },
    /// Remove a playlist record; fails if the playlist does not exist
    DeletePlaylist(String),
    /// Remove every video whose playlist id matches
    DeleteVideosOf(String),
    /// Append a member video
    PutVideo(MemberVideo),
    /// Remove all playlists and videos
    Clear,
}

/// Core storage trait for playlist data.
///
/// Calls are synchronous: the store is only touched from the UI context,
/// one transaction at a time.
pub trait PlaylistStore {
    /// Human-readable backend name (e.g., "local").
    fn backend_name(&self) -> &str;

    /// All playlists sorted ascending by `order`, members sorted by member order.
    fn playlists(&self) -> Result<Vec<Playlist>>;

    /// Most recently added member videos, newest first, one entry per video id.
    fn recent_videos(&self, limit: usize) -> Result<Vec<Video>>;

    /// Apply every mutation or none of them.
    fn transact(&self, mutations: Vec<Mutation>) -> Result<()>;
}
