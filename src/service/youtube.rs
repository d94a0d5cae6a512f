use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use lru::LruCache;
use reqwest::Client as HttpClient;
use serde_json::Value;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Mutex;
use std::time::Duration;
use tokio::process::Command;

use super::{Video, VideoPage, VideoSearchApi};
use crate::config::YouTubeConfig;

/// YouTube client: yt-dlp for video search, the suggest endpoint for keywords
pub struct YouTubeClient {
    http: HttpClient,
    ytdlp_path: PathBuf,
    suggest_url: String,
    page_size: u32,
    max_results: u32,
    /// Keyword -> suggestions; typing backspace re-asks for recent prefixes
    suggestions: Mutex<LruCache<String, Vec<String>>>,
}

impl YouTubeClient {
    /// Create a new YouTube client
    ///
    /// This will error if yt-dlp is not found in PATH or at the configured path.
    pub async fn new(config: &YouTubeConfig) -> Result<Self> {
        let path = config.ytdlp_path.as_str();

        let check = Command::new(path)
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await;

        match check {
            Ok(status) if status.success() => {}
            Ok(_) => {
                return Err(anyhow!(
                    "yt-dlp found but returned error. Please ensure yt-dlp is properly installed."
                ))
            }
            Err(_) => {
                return Err(anyhow!(
                    "yt-dlp not found at '{}'. Video search requires yt-dlp to be installed.\n\
                     Install via: nix-shell -p yt-dlp, brew install yt-dlp, or pip install yt-dlp",
                    path
                ))
            }
        }

        let http = HttpClient::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs.max(1)))
            .build()
            .context("Failed to build HTTP client")?;

        // Never fewer than 8 entries
        let cap = NonZeroUsize::new(config.suggestion_cache_size.max(8)).unwrap_or(NonZeroUsize::MIN);

        Ok(Self {
            http,
            ytdlp_path: PathBuf::from(path),
            suggest_url: config.suggest_url.clone(),
            page_size: config.page_size.max(1),
            max_results: config.max_results,
            suggestions: Mutex::new(LruCache::new(cap)),
        })
    }

    // === yt-dlp Helper Methods ===

    /// Execute yt-dlp and return JSON output as parsed values
    async fn run_ytdlp_json(&self, args: &[&str]) -> Result<Vec<Value>> {
        let output = Command::new(&self.ytdlp_path)
            .args(args)
            .args(["--no-warnings"])
            .output()
            .await
            .context("Failed to run yt-dlp")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(anyhow!("yt-dlp failed: {}", stderr.trim()));
        }

        let stdout = String::from_utf8(output.stdout)?;
        Ok(stdout
            .lines()
            .filter_map(|line| serde_json::from_str(line).ok())
            .collect())
    }

    /// 1-based inclusive result range covered by `page`
    fn page_range(&self, page: u32) -> (u32, u32) {
        let page = page.max(1);
        let start = (page - 1) * self.page_size + 1;
        let end = page * self.page_size;
        (start, end)
    }

    /// Parse a yt-dlp JSON entry into a Video
    fn parse_video(json: &Value) -> Option<Video> {
        let id = json.get("id")?.as_str()?.to_string();
        let title = json.get("title")?.as_str()?.to_string();

        let channel = json
            .get("channel")
            .or_else(|| json.get("uploader"))
            .and_then(|v| v.as_str())
            .unwrap_or("Unknown")
            .to_string();

        let duration_seconds = json
            .get("duration")
            .and_then(|v| v.as_f64())
            .map(|d| d as u32)
            .unwrap_or(0);

        Some(Video {
            id,
            title,
            channel,
            duration_seconds,
            thumbnail_url: Self::extract_thumbnail(json),
        })
    }

    /// Extract best thumbnail URL from JSON
    fn extract_thumbnail(json: &Value) -> Option<String> {
        json.get("thumbnail")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
            .or_else(|| {
                json.get("thumbnails")
                    .and_then(|t| t.as_array())
                    .and_then(|arr| arr.last())
                    .and_then(|t| t.get("url"))
                    .and_then(|v| v.as_str())
                    .map(|s| s.to_string())
            })
    }

    /// Parse the suggest endpoint body: `["keyword", ["s1", "s2", ...], ...]`
    fn parse_suggestions(json: &Value) -> Result<Vec<String>> {
        let list = json
            .get(1)
            .and_then(|v| v.as_array())
            .ok_or_else(|| anyhow!("unexpected suggestion response shape"))?;
        Ok(list
            .iter()
            .filter_map(|v| v.as_str())
            .map(|s| s.to_string())
            .collect())
    }

    fn cached_suggestions(&self, key: &str) -> Option<Vec<String>> {
        let mut cache = self.suggestions.lock().ok()?;
        cache.get(key).cloned()
    }
}

#[async_trait]
impl VideoSearchApi for YouTubeClient {
    async fn search_suggestions(&self, keyword: &str) -> Result<Vec<String>> {
        let key = keyword.trim().to_lowercase();
        if let Some(hit) = self.cached_suggestions(&key) {
            tracing::debug!(keyword, "suggestions served from cache");
            return Ok(hit);
        }

        let resp = self
            .http
            .get(&self.suggest_url)
            .query(&[("client", "firefox"), ("ds", "yt"), ("q", keyword)])
            .send()
            .await
            .context("Network error while fetching suggestions")?;

        if !resp.status().is_success() {
            return Err(anyhow!("Suggestion request failed with status: {}", resp.status()));
        }

        let json: Value = resp
            .json()
            .await
            .context("Failed to decode suggestion response")?;
        let suggestions = Self::parse_suggestions(&json)?;

        if let Ok(mut cache) = self.suggestions.lock() {
            cache.put(key, suggestions.clone());
        }
        Ok(suggestions)
    }

    async fn search_videos(&self, query: &str, page: u32) -> Result<VideoPage> {
        let (start, end) = self.page_range(page);
        if self.max_results > 0 && start > self.max_results {
            return Ok(VideoPage::default());
        }

        let items_arg = format!("{}:{}", start, end);
        let search = format!("ytsearch{}:{}", end, query);
        let results = self
            .run_ytdlp_json(&["--flat-playlist", "-j", "--playlist-items", &items_arg, &search])
            .await?;

        let items: Vec<Video> = results.iter().filter_map(Self::parse_video).collect();
        let full_page = items.len() as u32 >= self.page_size;
        let under_cap = self.max_results == 0 || end < self.max_results;

        tracing::debug!(query, page, count = items.len(), "video page fetched");

        Ok(VideoPage {
            items,
            has_next_page: full_page && under_cap,
        })
    }
}
