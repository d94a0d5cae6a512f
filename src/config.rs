use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

const CONFIG_FILE_NAME: &str = "config.toml";
const APP_DIR: &str = "groov";

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub youtube: YouTubeConfig,
    pub search: SearchConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

/// Video search API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct YouTubeConfig {
    /// yt-dlp executable (name in PATH or absolute path)
    pub ytdlp_path: String,
    /// Keyword suggestion endpoint
    pub suggest_url: String,
    /// Videos per page
    pub page_size: u32,
    /// Stop offering further pages past this many results (0 = no cap)
    pub max_results: u32,
    /// Keywords kept in the suggestion LRU cache
    pub suggestion_cache_size: usize,
    /// HTTP timeout for suggestion requests
    pub request_timeout_secs: u64,
}

impl Default for YouTubeConfig {
    fn default() -> Self {
        Self {
            ytdlp_path: "yt-dlp".to_string(),
            suggest_url: "https://suggestqueries.google.com/complete/search".to_string(),
            page_size: 20,
            max_results: 200,
            suggestion_cache_size: 64,
            request_timeout_secs: 10,
        }
    }
}

/// Search screen settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Recently added videos shown while the query is empty
    pub recent_limit: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self { recent_limit: 30 }
    }
}

/// Playlist database location
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Database file (empty = default data dir)
    pub db_path: Option<String>,
}

impl StorageConfig {
    pub fn resolve_db_path(&self) -> Result<PathBuf> {
        if let Some(ref custom) = self.db_path {
            return Ok(PathBuf::from(custom));
        }
        Ok(data_dir()?.join("groov.redb"))
    }
}

/// Log output settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter when RUST_LOG is unset
    pub filter: String,
    /// Log directory (empty = `<data dir>/logs`)
    pub directory: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "groov=debug,warn".to_string(),
            directory: None,
        }
    }
}

impl LoggingConfig {
    pub fn resolve_directory(&self) -> Result<PathBuf> {
        if let Some(ref custom) = self.directory {
            return Ok(PathBuf::from(custom));
        }
        Ok(data_dir()?.join("logs"))
    }
}

/// `<data dir>/groov`, created on demand
pub fn data_dir() -> Result<PathBuf> {
    let dir = dirs::data_dir()
        .context("Failed to get data directory")?
        .join(APP_DIR);
    fs::create_dir_all(&dir).context("Failed to create data directory")?;
    Ok(dir)
}

impl Config {
    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get config directory")?
            .join(APP_DIR);

        fs::create_dir_all(&config_dir).context("Failed to create config directory")?;

        Ok(config_dir.join(CONFIG_FILE_NAME))
    }

    /// Load configuration from file, or create default if not exists
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;

        if path.exists() {
            let contents = fs::read_to_string(&path).context("Failed to read config file")?;

            let config: Config = toml::from_str(&contents).context("Failed to parse config file")?;

            Ok(config)
        } else {
            let config = Config::default();
            config.save()?;
            Ok(config)
        }
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(&path, contents).context("Failed to write config file")?;

        Ok(())
    }
}
