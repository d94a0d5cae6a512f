pub mod youtube;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A video returned by the search API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Video {
    /// YouTube video ID
    pub id: String,
    pub title: String,
    /// Channel name (author)
    pub channel: String,
    pub duration_seconds: u32,
    pub thumbnail_url: Option<String>,
}

impl Video {
    /// Duration formatted as `m:ss` or `h:mm:ss`
    pub fn duration_label(&self) -> String {
        let secs = self.duration_seconds;
        if secs >= 3600 {
            format!("{}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
        } else {
            format!("{}:{:02}", secs / 60, secs % 60)
        }
    }
}

/// One bounded batch of search results
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VideoPage {
    pub items: Vec<Video>,
    pub has_next_page: bool,
}

/// A user-created playlist
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Playlist {
    pub id: String,
    pub title: String,
    /// Manual display position, contiguous from 0 among stored playlists
    pub order: u32,
    /// Member videos in member order
    pub videos: Vec<Video>,
}

impl Playlist {
    /// The most recently appended member, shown as the row's thumbnail
    pub fn recent_video(&self) -> Option<&Video> {
        self.videos.last()
    }
}

/// The video search collaborator.
///
/// Methods take `&self` so one client can be shared behind an `Arc` by every
/// in-flight fetch task.
#[async_trait]
pub trait VideoSearchApi: Send + Sync {
    /// Keyword completions for what the user has typed so far
    async fn search_suggestions(&self, keyword: &str) -> Result<Vec<String>>;

    /// One page of video results; `page` is 1-based
    async fn search_videos(&self, query: &str, page: u32) -> Result<VideoPage>;
}

pub use youtube::YouTubeClient;
