//! Plain-text views for the terminal front end.

pub mod help;
pub mod playlists;
pub mod search;

pub use help::render_help;
pub use playlists::render_playlists_view;
pub use search::{render_search_view, video_line};
