use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use tokio::sync::mpsc::{self, UnboundedReceiver};

use crate::analytics::TracingAnalytics;
use crate::config::Config;
use crate::error::Error;
use crate::playlists::{PlaylistEvent, PlaylistList};
use crate::search::{RequestKind, SearchController, SearchEvent, SearchResponse};
use crate::service::{Video, VideoPage, VideoSearchApi, YouTubeClient};
use crate::storage::LocalStore;

pub struct App {
    pub config: Config,
    pub playlists: PlaylistList<LocalStore>,
    pub search: SearchController<dyn VideoSearchApi>,

    /// Video picked from the result list, waiting for `save <n>`
    pub pending_video: Option<Video>,

    playlist_event_rx: UnboundedReceiver<PlaylistEvent>,
    search_event_rx: UnboundedReceiver<SearchEvent>,

    // Lines waiting to be printed by the command loop
    output: Vec<String>,
}

impl App {
    pub async fn new(config: Config) -> Result<Self> {
        let db_path = config.storage.resolve_db_path()?;
        let store = LocalStore::open(&db_path)
            .map_err(|e| Error::store_unavailable(&e))
            .with_context(|| format!("Failed to open playlist store at {}", db_path.display()))?;
        let (api, unavailable): (Arc<dyn VideoSearchApi>, Option<String>) =
            match YouTubeClient::new(&config.youtube).await {
                Ok(client) => (Arc::new(client), None),
                Err(e) => {
                    tracing::warn!("video search disabled: {:#}", e);
                    let reason = format!("{:#}", e);
                    (Arc::new(SearchUnavailable::new(reason.clone())), Some(reason))
                }
            };

        let mut app = Self::with_parts(config, store, api)?;
        if let Some(reason) = unavailable {
            app.say(format!("Search unavailable, playlists still work: {}", reason));
        }
        Ok(app)
    }

    /// Assemble the app from an opened store and a search API, then load
    /// the playlists.
    pub fn with_parts(
        config: Config,
        store: LocalStore,
        api: Arc<dyn VideoSearchApi>,
    ) -> std::result::Result<Self, Error> {
        let mut playlists = PlaylistList::new(store, Arc::new(TracingAnalytics));
        let (playlist_tx, playlist_event_rx) = mpsc::unbounded_channel();
        playlists.set_observer(playlist_tx);

        let mut search = SearchController::new(api);
        let (search_tx, search_event_rx) = mpsc::unbounded_channel();
        search.set_observer(search_tx);

        let mut app = Self {
            config,
            playlists,
            search,
            pending_video: None,
            playlist_event_rx,
            search_event_rx,
            output: Vec::new(),
        };

        app.playlists.load()?;
        app.refresh_recently_added();
        // The initial load is not news to the user
        while app.playlist_event_rx.try_recv().is_ok() {}
        Ok(app)
    }

    pub fn say(&mut self, line: impl Into<String>) {
        self.output.push(line.into());
    }

    pub fn say_lines(&mut self, lines: Vec<String>) {
        self.output.extend(lines);
    }

    pub fn set_status_error(&mut self, error: &Error) {
        tracing::warn!("{}", error);
        self.say(format!("error: {}", error));
    }

    pub fn take_output(&mut self) -> Vec<String> {
        std::mem::take(&mut self.output)
    }

    /// Feed the search screen the newest videos saved to any playlist.
    pub fn refresh_recently_added(&mut self) {
        match self.playlists.recent_videos(self.config.search.recent_limit) {
            Ok(videos) => self.search.set_recently_added(videos),
            Err(e) => self.set_status_error(&e),
        }
    }

    /// Apply a finished search fetch and report what changed.
    pub fn apply_search_response(&mut self, response: SearchResponse) {
        if self.search.apply(response) {
            self.process_events();
        }
    }

    /// Turn pending observer notifications into status lines.
    pub fn process_events(&mut self) {
        let mut playlists_changed = false;
        while let Ok(event) = self.playlist_event_rx.try_recv() {
            playlists_changed = true;
            let line = match event {
                PlaylistEvent::Reloaded => format!("{} playlists loaded", self.playlists.len()),
                PlaylistEvent::Inserted(i) => match self.playlists.get(i) {
                    Some(p) => format!("Created playlist {} \"{}\"", i + 1, p.title),
                    None => continue,
                },
                PlaylistEvent::Updated(i) => match self.playlists.get(i) {
                    Some(p) => format!("Playlist \"{}\" now has {} videos", p.title, p.videos.len()),
                    None => continue,
                },
                PlaylistEvent::Removed(i) => format!("Removed playlist {}", i + 1),
            };
            self.say(line);
        }
        if playlists_changed {
            self.refresh_recently_added();
        }

        while let Ok(event) = self.search_event_rx.try_recv() {
            match event {
                SearchEvent::SuggestionsUpdated => {
                    let count = self.search.state().suggestions.len();
                    if count > 0 {
                        self.say(format!("{} suggestions, `show` to list", count));
                    }
                }
                SearchEvent::VideoListUpdated {
                    can_request_next_page,
                } => {
                    let count = self.search.state().searched.len();
                    let more = if can_request_next_page { ", `more` for next page" } else { "" };
                    self.say(format!("{} results{}", count, more));
                }
                SearchEvent::Failed { kind, error } => {
                    let what = match kind {
                        RequestKind::Suggestions => "suggestions",
                        RequestKind::FirstPage => "search",
                        RequestKind::NextPage => "next page",
                    };
                    self.say(format!("{} failed: {}", what, error));
                }
            }
        }
    }
}

/// Stands in for the search client when it could not start; every fetch
/// fails with the startup error.
struct SearchUnavailable {
    reason: String,
}

impl SearchUnavailable {
    fn new(reason: String) -> Self {
        Self { reason }
    }
}

#[async_trait]
impl VideoSearchApi for SearchUnavailable {
    async fn search_suggestions(&self, _keyword: &str) -> Result<Vec<String>> {
        Err(anyhow!("search unavailable: {}", self.reason))
    }

    async fn search_videos(&self, _query: &str, _page: u32) -> Result<VideoPage> {
        Err(anyhow!("search unavailable: {}", self.reason))
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// Answers every query immediately with two videos on a single page
    struct InstantApi;

    #[async_trait]
    impl VideoSearchApi for InstantApi {
        async fn search_suggestions(&self, keyword: &str) -> anyhow::Result<Vec<String>> {
            Ok(vec![format!("{} live", keyword)])
        }

        async fn search_videos(&self, query: &str, _page: u32) -> anyhow::Result<VideoPage> {
            let items = (0..2)
                .map(|i| Video {
                    id: format!("{}-{}", query, i),
                    title: format!("{} #{}", query, i),
                    channel: "Channel".to_string(),
                    duration_seconds: 200,
                    thumbnail_url: None,
                })
                .collect();
            Ok(VideoPage {
                items,
                has_next_page: false,
            })
        }
    }

    pub(crate) fn test_app(dir: &tempfile::TempDir) -> App {
        let store = LocalStore::open(&dir.path().join("groov.redb")).unwrap();
        App::with_parts(Config::default(), store, Arc::new(InstantApi)).unwrap()
    }
}
