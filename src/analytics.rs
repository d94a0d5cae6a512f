//! Fire-and-forget usage events.

/// Event emitted when the user creates a playlist.
pub const PLAYLIST_ADDED: &str = "playlist_added";

/// Telemetry sink. Implementations must not block or fail the caller.
pub trait Analytics: Send + Sync {
    fn record_event(&self, name: &str, properties: &[(&str, &str)]);
}

/// Writes events to the log under the `groov::analytics` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingAnalytics;

impl Analytics for TracingAnalytics {
    fn record_event(&self, name: &str, properties: &[(&str, &str)]) {
        tracing::info!(target: "groov::analytics", event = name, ?properties, "analytics event");
    }
}
