//! Video search and playlist management core for the groov player.

pub mod analytics;
pub mod app;
pub mod config;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod playlists;
pub mod search;
pub mod service;
pub mod storage;
pub mod ui;

pub use error::{Error, Result};
