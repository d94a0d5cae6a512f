//! Local storage backend: one redb file holding playlists and member videos.
//!
//! Two tables, values are JSON bytes:
//!   playlists:        playlist_id → {title, order, created_at_ms}
//!   playlist_videos:  row_id      → {video, playlist_id, order, added_at_ms}
//!
//! A whole [`Mutation`] batch runs inside a single write transaction, so a
//! failing step aborts everything before it.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use chrono::Utc;
use redb::{Database, ReadableTable, TableDefinition, WriteTransaction};
use serde::{Deserialize, Serialize};

use super::{MemberVideo, Mutation, PlaylistRecord, PlaylistStore};
use crate::service::{Playlist, Video};

const PLAYLISTS: TableDefinition<&str, &[u8]> = TableDefinition::new("playlists");
const VIDEOS: TableDefinition<u64, &[u8]> = TableDefinition::new("playlist_videos");

#[derive(Debug, Serialize, Deserialize)]
struct StoredPlaylist {
    id: String,
    title: String,
    order: u32,
    created_at_ms: i64,
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredVideo {
    video_id: String,
    title: String,
    channel: String,
    duration_seconds: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    thumbnail_url: Option<String>,
    playlist_id: String,
    order: u32,
    added_at_ms: i64,
}

impl StoredVideo {
    fn from_member(member: &MemberVideo) -> Self {
        Self {
            video_id: member.video.id.clone(),
            title: member.video.title.clone(),
            channel: member.video.channel.clone(),
            duration_seconds: member.video.duration_seconds,
            thumbnail_url: member.video.thumbnail_url.clone(),
            playlist_id: member.playlist_id.clone(),
            order: member.order,
            added_at_ms: member.added_at_ms,
        }
    }

    fn to_video(&self) -> Video {
        Video {
            id: self.video_id.clone(),
            title: self.title.clone(),
            channel: self.channel.clone(),
            duration_seconds: self.duration_seconds,
            thumbnail_url: self.thumbnail_url.clone(),
        }
    }
}

pub struct LocalStore {
    db: Database,
}

impl LocalStore {
    /// Open or create the database file and make sure both tables exist.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let db = Database::create(path)
            .with_context(|| format!("failed to open playlist database at {}", path.display()))?;
        let txn = db.begin_write()?;
        {
            txn.open_table(PLAYLISTS)?;
            txn.open_table(VIDEOS)?;
        }
        txn.commit()?;
        Ok(Self { db })
    }

    fn apply(txn: &WriteTransaction, mutations: Vec<Mutation>) -> Result<()> {
        let mut playlists = txn.open_table(PLAYLISTS)?;
        let mut videos = txn.open_table(VIDEOS)?;
        let now_ms = Utc::now().timestamp_millis();

        for mutation in mutations {
            match mutation {
                Mutation::PutPlaylist(PlaylistRecord { id, title, order }) => {
                    let stored = StoredPlaylist {
                        id: id.clone(),
                        title,
                        order,
                        created_at_ms: now_ms,
                    };
                    let json = serde_json::to_vec(&stored)?;
                    playlists.insert(id.as_str(), json.as_slice())?;
                }
                Mutation::SetOrder { playlist_id, order } => {
                    let mut stored: StoredPlaylist = {
                        let guard = playlists
                            .get(playlist_id.as_str())?
                            .ok_or_else(|| anyhow!("no playlist with id {}", playlist_id))?;
                        serde_json::from_slice(guard.value())?
                    };
                    stored.order = order;
                    let json = serde_json::to_vec(&stored)?;
                    playlists.insert(playlist_id.as_str(), json.as_slice())?;
                }
                Mutation::DeletePlaylist(id) => {
                    if playlists.remove(id.as_str())?.is_none() {
                        bail!("no playlist with id {}", id);
                    }
                }
                Mutation::DeleteVideosOf(id) => {
                    let mut doomed = Vec::new();
                    for item in videos.iter()? {
                        let (key, val) = item?;
                        if let Ok(stored) = serde_json::from_slice::<StoredVideo>(val.value()) {
                            if stored.playlist_id == id {
                                doomed.push(key.value());
                            }
                        }
                    }
                    for key in doomed {
                        videos.remove(key)?;
                    }
                }
                Mutation::PutVideo(member) => {
                    let key = videos.last()?.map(|(k, _)| k.value() + 1).unwrap_or(0);
                    let json = serde_json::to_vec(&StoredVideo::from_member(&member))?;
                    videos.insert(key, json.as_slice())?;
                }
                Mutation::Clear => {
                    let playlist_keys: Vec<String> = playlists
                        .iter()?
                        .map(|r| r.map(|(k, _)| k.value().to_string()))
                        .collect::<std::result::Result<_, _>>()?;
                    for key in playlist_keys {
                        playlists.remove(key.as_str())?;
                    }
                    let video_keys: Vec<u64> = videos
                        .iter()?
                        .map(|r| r.map(|(k, _)| k.value()))
                        .collect::<std::result::Result<_, _>>()?;
                    for key in video_keys {
                        videos.remove(key)?;
                    }
                }
            }
        }
        Ok(())
    }

    fn stored_videos(&self) -> Result<Vec<(u64, StoredVideo)>> {
        let rtxn = self.db.begin_read()?;
        let table = rtxn.open_table(VIDEOS)?;
        let mut out = Vec::new();
        for item in table.iter()? {
            let (key, val) = item?;
            if let Ok(stored) = serde_json::from_slice::<StoredVideo>(val.value()) {
                out.push((key.value(), stored));
            }
        }
        Ok(out)
    }
}

impl PlaylistStore for LocalStore {
    fn backend_name(&self) -> &str {
        "local"
    }

    fn playlists(&self) -> Result<Vec<Playlist>> {
        let rtxn = self.db.begin_read()?;
        let playlist_table = rtxn.open_table(PLAYLISTS)?;
        let video_table = rtxn.open_table(VIDEOS)?;

        let mut members: HashMap<String, Vec<StoredVideo>> = HashMap::new();
        for item in video_table.iter()? {
            let (_, val) = item?;
            if let Ok(stored) = serde_json::from_slice::<StoredVideo>(val.value()) {
                members.entry(stored.playlist_id.clone()).or_default().push(stored);
            }
        }

        let mut playlists = Vec::new();
        for item in playlist_table.iter()? {
            let (_, val) = item?;
            let stored: StoredPlaylist = serde_json::from_slice(val.value())
                .context("corrupt playlist record")?;
            let mut videos = members.remove(&stored.id).unwrap_or_default();
            videos.sort_by_key(|v| v.order);
            playlists.push(Playlist {
                id: stored.id,
                title: stored.title,
                order: stored.order,
                videos: videos.iter().map(StoredVideo::to_video).collect(),
            });
        }
        playlists.sort_by_key(|p| p.order);
        Ok(playlists)
    }

    fn recent_videos(&self, limit: usize) -> Result<Vec<Video>> {
        let mut stored = self.stored_videos()?;
        // Newest first; row ids break ties between same-millisecond inserts
        stored.sort_by(|(ka, a), (kb, b)| b.added_at_ms.cmp(&a.added_at_ms).then(kb.cmp(ka)));

        let mut seen = HashSet::new();
        Ok(stored
            .iter()
            .filter(|(_, v)| seen.insert(v.video_id.clone()))
            .take(limit)
            .map(|(_, v)| v.to_video())
            .collect())
    }

    fn transact(&self, mutations: Vec<Mutation>) -> Result<()> {
        let count = mutations.len();
        let txn = self.db.begin_write()?;
        if let Err(e) = Self::apply(&txn, mutations) {
            txn.abort()?;
            return Err(e);
        }
        txn.commit().context("failed to commit playlist transaction")?;
        tracing::debug!(mutations = count, "playlist transaction committed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_store() -> (tempfile::TempDir, LocalStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::open(&dir.path().join("groov.redb")).unwrap();
        (dir, store)
    }

    fn record(id: &str, title: &str, order: u32) -> PlaylistRecord {
        PlaylistRecord {
            id: id.to_string(),
            title: title.to_string(),
            order,
        }
    }

    fn member(video_id: &str, playlist_id: &str, order: u32, added_at_ms: i64) -> MemberVideo {
        MemberVideo {
            video: Video {
                id: video_id.to_string(),
                title: format!("Video {}", video_id),
                channel: "Channel".to_string(),
                duration_seconds: 120,
                thumbnail_url: None,
            },
            playlist_id: playlist_id.to_string(),
            order,
            added_at_ms,
        }
    }

    #[test]
    fn test_empty_store() {
        let (_dir, store) = open_store();
        assert_eq!(store.backend_name(), "local");
        assert!(store.playlists().unwrap().is_empty());
        assert!(store.recent_videos(10).unwrap().is_empty());
    }

    #[test]
    fn test_playlists_sorted_by_order_with_members() {
        let (_dir, store) = open_store();
        store
            .transact(vec![
                Mutation::PutPlaylist(record("b", "Second", 1)),
                Mutation::PutPlaylist(record("a", "First", 0)),
                Mutation::PutVideo(member("v2", "a", 1, 20)),
                Mutation::PutVideo(member("v1", "a", 0, 10)),
            ])
            .unwrap();

        let playlists = store.playlists().unwrap();
        assert_eq!(playlists.len(), 2);
        assert_eq!(playlists[0].title, "First");
        assert_eq!(playlists[1].title, "Second");
        let ids: Vec<&str> = playlists[0].videos.iter().map(|v| v.id.as_str()).collect();
        assert_eq!(ids, vec!["v1", "v2"]);
        assert!(playlists[1].videos.is_empty());
    }

    #[test]
    fn test_failed_batch_leaves_store_untouched() {
        let (_dir, store) = open_store();
        store
            .transact(vec![
                Mutation::PutPlaylist(record("a", "A", 0)),
                Mutation::PutPlaylist(record("b", "B", 1)),
                Mutation::PutVideo(member("v1", "a", 0, 10)),
            ])
            .unwrap();

        // Last step targets a playlist that does not exist
        let result = store.transact(vec![
            Mutation::DeleteVideosOf("a".to_string()),
            Mutation::DeletePlaylist("a".to_string()),
            Mutation::SetOrder { playlist_id: "b".to_string(), order: 0 },
            Mutation::SetOrder { playlist_id: "missing".to_string(), order: 1 },
        ]);
        assert!(result.is_err());

        let playlists = store.playlists().unwrap();
        assert_eq!(playlists.len(), 2);
        assert_eq!(playlists[0].id, "a");
        assert_eq!(playlists[0].videos.len(), 1);
        assert_eq!(playlists[1].order, 1);
    }

    #[test]
    fn test_delete_missing_playlist_fails() {
        let (_dir, store) = open_store();
        assert!(store
            .transact(vec![Mutation::DeletePlaylist("nope".to_string())])
            .is_err());
    }

    #[test]
    fn test_delete_videos_of_only_touches_that_playlist() {
        let (_dir, store) = open_store();
        store
            .transact(vec![
                Mutation::PutPlaylist(record("a", "A", 0)),
                Mutation::PutPlaylist(record("b", "B", 1)),
                Mutation::PutVideo(member("v1", "a", 0, 10)),
                Mutation::PutVideo(member("v2", "b", 0, 20)),
                Mutation::PutVideo(member("v3", "a", 1, 30)),
            ])
            .unwrap();

        store
            .transact(vec![Mutation::DeleteVideosOf("a".to_string())])
            .unwrap();

        let playlists = store.playlists().unwrap();
        assert!(playlists[0].videos.is_empty());
        assert_eq!(playlists[1].videos.len(), 1);
        assert_eq!(playlists[1].videos[0].id, "v2");
    }

    #[test]
    fn test_recent_videos_newest_first_and_unique() {
        let (_dir, store) = open_store();
        store
            .transact(vec![
                Mutation::PutPlaylist(record("a", "A", 0)),
                Mutation::PutPlaylist(record("b", "B", 1)),
                Mutation::PutVideo(member("v1", "a", 0, 10)),
                Mutation::PutVideo(member("v2", "a", 1, 20)),
                Mutation::PutVideo(member("v1", "b", 0, 30)),
                Mutation::PutVideo(member("v3", "b", 1, 40)),
            ])
            .unwrap();

        let recent = store.recent_videos(10).unwrap();
        let ids: Vec<&str> = recent.iter().map(|v| v.id.as_str()).collect();
        assert_eq!(ids, vec!["v3", "v1", "v2"]);

        assert_eq!(store.recent_videos(2).unwrap().len(), 2);
    }

    #[test]
    fn test_clear_removes_everything() {
        let (_dir, store) = open_store();
        store
            .transact(vec![
                Mutation::PutPlaylist(record("a", "A", 0)),
                Mutation::PutVideo(member("v1", "a", 0, 10)),
            ])
            .unwrap();

        store.transact(vec![Mutation::Clear]).unwrap();
        assert!(store.playlists().unwrap().is_empty());
        assert!(store.recent_videos(10).unwrap().is_empty());
    }

    #[test]
    fn test_reopen_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("groov.redb");
        {
            let store = LocalStore::open(&path).unwrap();
            store
                .transact(vec![Mutation::PutPlaylist(record("a", "Kept", 0))])
                .unwrap();
        }
        let store = LocalStore::open(&path).unwrap();
        let playlists = store.playlists().unwrap();
        assert_eq!(playlists.len(), 1);
        assert_eq!(playlists[0].title, "Kept");
    }

    #[test]
    fn test_unicode_titles() {
        let (_dir, store) = open_store();
        store
            .transact(vec![Mutation::PutPlaylist(record("a", "운동 플레이리스트", 0))])
            .unwrap();
        assert_eq!(store.playlists().unwrap()[0].title, "운동 플레이리스트");
    }
}
