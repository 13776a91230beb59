//! Managed-side notification surface.
//!
//! The bridge exposes exactly one replaceable [`NotificationSink`]. All
//! methods default to no-ops so implementations override only what they
//! consume. Delivery guarantees live in the session layer: callbacks are
//! serialized, never concurrent, and stop synchronously once the session is
//! released.

use crate::model::{
    PeerSnapshot, ServerSettingsSnapshot, SessionStatsSnapshot, TorrentFileSnapshot,
    TorrentSnapshot,
};
use remora_rpc_core::{ConnectionState, IndexRange, RpcError};

/// Callbacks delivered by the bridge, one at a time, in event order.
///
/// Implementations must not call back into the owning
/// [`crate::session::Session`] command methods from inside a callback if
/// they then block on the result; commands are enqueued and safe, blocking
/// on delivery is not.
pub trait NotificationSink: Send + Sync {
    /// Connection lifecycle transition.
    fn connection_state_changed(&self, state: ConnectionState) {
        let _ = state;
    }

    /// Error classification changed. `detailed_message` carries
    /// transport-level detail for connection errors and is empty otherwise.
    fn error_changed(&self, error: RpcError, message: &str, detailed_message: &str) {
        let _ = (error, message, detailed_message);
    }

    /// The session is about to tear the connection down.
    fn about_to_disconnect(&self) {}

    /// Incremental torrent list update.
    fn torrents_updated(
        &self,
        removed_ids: &[i32],
        changed: Vec<TorrentSnapshot>,
        added: Vec<TorrentSnapshot>,
    ) {
        let _ = (removed_ids, changed, added);
    }

    /// File list update for one torrent.
    fn torrent_files_updated(&self, torrent_id: i32, changed: Vec<TorrentFileSnapshot>) {
        let _ = (torrent_id, changed);
    }

    /// Incremental peer list update for one torrent.
    fn torrent_peers_updated(
        &self,
        torrent_id: i32,
        removed_ranges: &[IndexRange],
        changed: Vec<PeerSnapshot>,
        added: Vec<PeerSnapshot>,
    ) {
        let _ = (torrent_id, removed_ranges, changed, added);
    }

    /// Server settings snapshot changed.
    fn server_settings_changed(&self, settings: ServerSettingsSnapshot) {
        let _ = settings;
    }

    /// Session statistics update.
    fn server_stats_updated(
        &self,
        download_speed: i64,
        upload_speed: i64,
        current: SessionStatsSnapshot,
        total: SessionStatsSnapshot,
    ) {
        let _ = (download_speed, upload_speed, current, total);
    }

    /// A torrent was added to the server.
    fn torrent_added(&self, id: i32, hash: &str, name: &str) {
        let _ = (id, hash, name);
    }

    /// A torrent finished downloading.
    fn torrent_finished(&self, id: i32, hash: &str, name: &str) {
        let _ = (id, hash, name);
    }

    /// An add request named a torrent the server already has.
    fn torrent_add_duplicate(&self) {}

    /// An add request failed on the server side.
    fn torrent_add_error(&self) {}

    /// A file rename requested through the session completed.
    fn torrent_file_renamed(&self, torrent_id: i32, file_path: &str, new_name: &str) {
        let _ = (torrent_id, file_path, new_name);
    }

    /// Result of a download directory free space query.
    fn download_dir_free_space_checked(&self, bytes: i64) {
        let _ = bytes;
    }

    /// Result of a free space query for an arbitrary path.
    fn free_space_checked(&self, path: &str, success: bool, bytes: i64) {
        let _ = (path, success, bytes);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct OnlyErrors {
        seen: std::sync::Mutex<Vec<(RpcError, String)>>,
    }

    impl NotificationSink for OnlyErrors {
        fn error_changed(&self, error: RpcError, message: &str, _detailed_message: &str) {
            self.seen
                .lock()
                .expect("lock poisoned")
                .push((error, message.to_owned()));
        }
    }

    #[test]
    fn default_methods_let_implementations_pick_their_events() {
        let sink = OnlyErrors {
            seen: std::sync::Mutex::new(Vec::new()),
        };
        sink.connection_state_changed(ConnectionState::Connected);
        sink.about_to_disconnect();
        sink.torrent_add_duplicate();
        sink.error_changed(RpcError::TimedOut, "request timed out", "");

        let seen = sink.seen.lock().expect("lock poisoned");
        assert_eq!(
            *seen,
            vec![(RpcError::TimedOut, "request timed out".to_owned())]
        );
    }
}
