use thiserror::Error;

/// Errors surfaced by the search and playlist screens.
///
/// Collaborators (yt-dlp, the suggest endpoint, redb) report `anyhow` errors;
/// they are flattened into these variants at the component boundary so the
/// UI layer can match on the kind and still show the full message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Transport or API failure during a suggestion or page fetch.
    #[error("network error: {0}")]
    Network(String),

    /// The playlist store could not be opened or read.
    #[error("playlist store unavailable: {0}")]
    StoreUnavailable(String),

    /// Deleting a playlist (and reindexing the rest) did not commit.
    #[error("failed to delete playlist {id}: {reason}")]
    DeleteFailed { id: String, reason: String },

    /// Any other write transaction that did not commit.
    #[error("store write failed: {0}")]
    WriteFailed(String),

    #[error("no playlist with id {0}")]
    UnknownPlaylist(String),

    #[error("playlists have not been loaded")]
    NotLoaded,

    #[error("playlist title must not be empty")]
    InvalidTitle,
}

impl Error {
    /// Flatten an `anyhow` chain into a network error, keeping every cause.
    pub fn network(err: &anyhow::Error) -> Self {
        Error::Network(format!("{err:#}"))
    }

    pub fn store_unavailable(err: &anyhow::Error) -> Self {
        Error::StoreUnavailable(format!("{err:#}"))
    }

    pub fn write_failed(err: &anyhow::Error) -> Self {
        Error::WriteFailed(format!("{err:#}"))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
