//! Entry contract with the excluded native RPC client.
//!
//! Everything in this module is expressed in the *native* representation:
//! UTF-16 text, raw byte buffers, millisecond times of day, epoch seconds,
//! and plain integers where the managed side sees enumerations. The bridge
//! crate owns all conversion; implementations of [`NativeSession`] (the real
//! client or a test double) only move these values across.
//!
//! The native shared library is assumed to be loaded and linked before any
//! session is constructed; no discovery happens in this layer.

use anyhow::Result;
use async_trait::async_trait;

use crate::error::{BridgeError, BridgeResult};

/// Native text payload: UTF-16 code units, unvalidated.
///
/// Conversion to managed text is fallible (unpaired surrogates), conversion
/// from managed text is total.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawText(pub Vec<u16>);

impl From<&str> for RawText {
    fn from(text: &str) -> Self {
        Self(text.encode_utf16().collect())
    }
}

impl From<String> for RawText {
    fn from(text: String) -> Self {
        Self::from(text.as_str())
    }
}

/// Native byte buffer. Crosses the boundary with exact length and content.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawBuffer(pub Vec<u8>);

/// Inclusive index range used by incremental peer updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexRange {
    /// First removed index.
    pub first: u32,
    /// Last removed index, inclusive.
    pub last: u32,
}

/// Consume-once handle over a native record sequence.
///
/// The native side fills the buffer once; the bulk transfer takes the
/// records out exactly once and the buffer is invalidated. A second take is
/// detected and reported instead of being left undefined.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordBuffer<T> {
    records: Option<Vec<T>>,
}

impl<T> RecordBuffer<T> {
    /// Wrap a native record sequence for one transfer.
    #[must_use]
    pub fn new(records: Vec<T>) -> Self {
        Self {
            records: Some(records),
        }
    }

    /// Move the records out, invalidating the buffer.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::TransferInvariant`] if the buffer was already
    /// consumed.
    pub fn take(&mut self) -> BridgeResult<Vec<T>> {
        self.records.take().ok_or(BridgeError::TransferInvariant {
            context: "record buffer already consumed",
        })
    }

    /// Whether the buffer has been consumed.
    #[must_use]
    pub fn is_consumed(&self) -> bool {
        self.records.is_none()
    }
}

impl<T> Default for RecordBuffer<T> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

/// Native torrent record, captured field-for-field at observation time.
///
/// Timestamps are epoch seconds with `-1` meaning unset; `eta_seconds` uses
/// `-1` for unknown. Enum-valued fields carry the native integer.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawTorrentRecord {
    /// Server-assigned torrent id.
    pub id: i32,
    /// Info hash in hexadecimal.
    pub hash: RawText,
    /// Display name.
    pub name: RawText,
    /// Native `TorrentStatus` value.
    pub status: i32,
    /// Native `RpcError` value for the torrent-level error.
    pub error: i32,
    /// Human-readable error text.
    pub error_string: RawText,
    /// Completed fraction in `0.0..=1.0`.
    pub percent_done: f64,
    /// Hash-check progress in `0.0..=1.0`.
    pub recheck_progress: f64,
    /// Total payload size in bytes.
    pub total_size: i64,
    /// Bytes downloaded and verified.
    pub completed_size: i64,
    /// Bytes remaining until the wanted set is complete.
    pub left_until_done: i64,
    /// Total size of the wanted set in bytes.
    pub size_when_done: i64,
    /// Current download rate, bytes per second.
    pub download_speed: i64,
    /// Current upload rate, bytes per second.
    pub upload_speed: i64,
    /// Estimated seconds to completion, `-1` when unknown.
    pub eta_seconds: i64,
    /// Share ratio.
    pub ratio: f64,
    /// Native `RatioLimitMode` value.
    pub ratio_limit_mode: i32,
    /// Ratio limit used when the mode is `Single`.
    pub ratio_limit: f64,
    /// Native `IdleSeedingLimitMode` value.
    pub idle_seeding_limit_mode: i32,
    /// Idle limit in minutes used when the mode is `Single`.
    pub idle_seeding_limit_minutes: i32,
    /// Peers this client downloads from.
    pub seeders: i32,
    /// Peers this client uploads to.
    pub leechers: i32,
    /// Per-torrent peer cap.
    pub peers_limit: i32,
    /// Whether session-wide limits apply to this torrent.
    pub honor_session_limits: bool,
    /// Native `BandwidthPriority` value.
    pub bandwidth_priority: i32,
    /// Epoch seconds when the torrent was added, `-1` when unset.
    pub added_date_epoch: i64,
    /// Epoch seconds when the torrent finished, `-1` when unset.
    pub done_date_epoch: i64,
    /// Epoch seconds of the last peer activity, `-1` when unset.
    pub activity_date_epoch: i64,
    /// Download directory path.
    pub download_directory: RawText,
    /// Tracker records captured with the torrent.
    pub trackers: Vec<RawTrackerRecord>,
}

/// Native file record within a torrent.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawFileRecord {
    /// File index within the torrent payload.
    pub id: i32,
    /// Path relative to the torrent root.
    pub path: RawText,
    /// Total size in bytes.
    pub size: i64,
    /// Bytes downloaded so far.
    pub completed_size: i64,
    /// Whether the file is selected for download.
    pub wanted: bool,
    /// Native `FilePriority` value.
    pub priority: i32,
}

/// Native peer record.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawPeerRecord {
    /// Remote address.
    pub address: RawText,
    /// Peer client identification string.
    pub client: RawText,
    /// Transmission-style peer flag string.
    pub flags: RawText,
    /// Download rate from this peer, bytes per second.
    pub download_speed: i64,
    /// Upload rate to this peer, bytes per second.
    pub upload_speed: i64,
    /// Peer's completed fraction in `0.0..=1.0`.
    pub progress: f64,
}

/// Native tracker record.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawTrackerRecord {
    /// Server-assigned tracker id.
    pub id: i32,
    /// Announce URL.
    pub announce: RawText,
    /// Tracker tier.
    pub tier: i32,
    /// Native `TrackerStatus` value.
    pub status: i32,
    /// Last announce error text, empty when none.
    pub error_message: RawText,
    /// Peer count reported by the tracker.
    pub peers: i32,
    /// Epoch seconds of the next scheduled announce, `-1` when unset.
    pub next_update_epoch: i64,
}

/// Native server settings record. Times of day are milliseconds since
/// midnight, enum-valued fields carry the native integer.
#[derive(Debug, Clone, PartialEq, Default)]
#[allow(clippy::struct_excessive_bools)]
pub struct RawServerSettingsRecord {
    /// Default download directory.
    pub download_directory: RawText,
    /// Whether added torrents start immediately.
    pub start_added_torrents: bool,
    /// Whether removed torrent files are trashed instead of deleted.
    pub trash_torrent_files: bool,
    /// Whether incomplete files carry a `.part` suffix.
    pub rename_incomplete_files: bool,
    /// Whether the incomplete directory is used.
    pub incomplete_directory_enabled: bool,
    /// Incomplete directory path.
    pub incomplete_directory: RawText,
    /// Whether a session-wide ratio limit applies.
    pub ratio_limited: bool,
    /// Session-wide ratio limit.
    pub ratio_limit: f64,
    /// Whether a session-wide idle seeding limit applies.
    pub idle_seeding_limited: bool,
    /// Session-wide idle seeding limit in minutes.
    pub idle_seeding_limit_minutes: i32,
    /// Whether the download queue is enabled.
    pub download_queue_enabled: bool,
    /// Download queue size.
    pub download_queue_size: i32,
    /// Whether the seed queue is enabled.
    pub seed_queue_enabled: bool,
    /// Seed queue size.
    pub seed_queue_size: i32,
    /// Whether the download speed limit applies.
    pub download_speed_limited: bool,
    /// Download speed limit in kilobytes per second.
    pub download_speed_limit: i32,
    /// Whether the upload speed limit applies.
    pub upload_speed_limited: bool,
    /// Upload speed limit in kilobytes per second.
    pub upload_speed_limit: i32,
    /// Whether alternative speed limits are active.
    pub alternative_speed_limits_enabled: bool,
    /// Alternative download speed limit in kilobytes per second.
    pub alternative_download_speed_limit: i32,
    /// Alternative upload speed limit in kilobytes per second.
    pub alternative_upload_speed_limit: i32,
    /// Whether the alternative limits follow a schedule.
    pub alternative_speed_limits_scheduled: bool,
    /// Schedule start, milliseconds since midnight.
    pub alternative_speed_limits_begin_time_msecs: i32,
    /// Schedule end, milliseconds since midnight.
    pub alternative_speed_limits_end_time_msecs: i32,
    /// Native `AlternativeSpeedLimitsDays` bitmask value.
    pub alternative_speed_limits_days: i32,
    /// Listening port for peer connections.
    pub peer_port: i32,
    /// Whether a random peer port is chosen at startup.
    pub random_port_enabled: bool,
    /// Whether port forwarding via NAT port mapping is requested.
    pub port_forwarding_enabled: bool,
    /// Native `EncryptionMode` value.
    pub encryption_mode: i32,
    /// Whether the `uTP` transport is enabled.
    pub utp_enabled: bool,
    /// Whether peer exchange is enabled.
    pub pex_enabled: bool,
    /// Whether the distributed hash table is enabled.
    pub dht_enabled: bool,
    /// Whether local peer discovery is enabled.
    pub lpd_enabled: bool,
    /// Peer cap per torrent.
    pub maximum_peers_per_torrent: i32,
    /// Peer cap across the session.
    pub maximum_peers_globally: i32,
}

/// Native session statistics record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RawSessionStatsRecord {
    /// Bytes downloaded.
    pub downloaded_bytes: i64,
    /// Bytes uploaded.
    pub uploaded_bytes: i64,
    /// Files added.
    pub files_added: i32,
    /// Number of sessions covered by the record.
    pub session_count: i32,
    /// Seconds the session has been active.
    pub seconds_active: i64,
}

/// One server settings mutation, in native representation.
///
/// The session handle converts managed arguments before forwarding, so
/// native implementations never see managed types.
#[derive(Debug, Clone, PartialEq)]
pub enum RawSettingsMutation {
    /// Set the default download directory.
    DownloadDirectory(RawText),
    /// Toggle starting added torrents immediately.
    StartAddedTorrents(bool),
    /// Toggle trashing removed torrent files.
    TrashTorrentFiles(bool),
    /// Toggle the `.part` suffix on incomplete files.
    RenameIncompleteFiles(bool),
    /// Toggle the incomplete directory.
    IncompleteDirectoryEnabled(bool),
    /// Set the incomplete directory path.
    IncompleteDirectory(RawText),
    /// Toggle the session-wide ratio limit.
    RatioLimited(bool),
    /// Set the session-wide ratio limit.
    RatioLimit(f64),
    /// Toggle the session-wide idle seeding limit.
    IdleSeedingLimited(bool),
    /// Set the session-wide idle seeding limit in minutes.
    IdleSeedingLimit(i32),
    /// Toggle the download queue.
    DownloadQueueEnabled(bool),
    /// Set the download queue size.
    DownloadQueueSize(i32),
    /// Toggle the seed queue.
    SeedQueueEnabled(bool),
    /// Set the seed queue size.
    SeedQueueSize(i32),
    /// Toggle the download speed limit.
    DownloadSpeedLimited(bool),
    /// Set the download speed limit in kilobytes per second.
    DownloadSpeedLimit(i32),
    /// Toggle the upload speed limit.
    UploadSpeedLimited(bool),
    /// Set the upload speed limit in kilobytes per second.
    UploadSpeedLimit(i32),
    /// Toggle alternative speed limits.
    AlternativeSpeedLimitsEnabled(bool),
    /// Set the alternative download speed limit in kilobytes per second.
    AlternativeDownloadSpeedLimit(i32),
    /// Set the alternative upload speed limit in kilobytes per second.
    AlternativeUploadSpeedLimit(i32),
    /// Toggle the alternative speed limit schedule.
    AlternativeSpeedLimitsScheduled(bool),
    /// Set the schedule start, milliseconds since midnight.
    AlternativeSpeedLimitsBeginTime(i32),
    /// Set the schedule end, milliseconds since midnight.
    AlternativeSpeedLimitsEndTime(i32),
    /// Set the schedule day bitmask.
    AlternativeSpeedLimitsDays(i32),
    /// Set the peer port.
    PeerPort(i32),
    /// Toggle random peer port selection.
    RandomPortEnabled(bool),
    /// Toggle port forwarding.
    PortForwardingEnabled(bool),
    /// Set the encryption mode.
    EncryptionMode(i32),
    /// Toggle the `uTP` transport.
    UtpEnabled(bool),
    /// Toggle peer exchange.
    PexEnabled(bool),
    /// Toggle the distributed hash table.
    DhtEnabled(bool),
    /// Toggle local peer discovery.
    LpdEnabled(bool),
    /// Set the per-torrent peer cap.
    MaximumPeersPerTorrent(i32),
    /// Set the session-wide peer cap.
    MaximumPeersGlobally(i32),
}

/// Notification emitted by the native session, in native representation.
///
/// Event order within one session reflects the order the native side
/// observed the underlying state changes; the bridge preserves it.
#[derive(Debug, PartialEq)]
pub enum RawEvent {
    /// The session is about to tear the connection down.
    AboutToDisconnect,
    /// Connection lifecycle transition. Carries a native `ConnectionState`.
    ConnectionStateChanged {
        /// Native `ConnectionState` value.
        state: i32,
    },
    /// Error classification changed. Carries a native `RpcError`.
    ErrorChanged {
        /// Native `RpcError` value.
        error: i32,
        /// Human-readable error text.
        message: RawText,
        /// Transport-level detail for connection errors; empty otherwise.
        detailed_message: RawText,
    },
    /// Incremental torrent list update.
    TorrentsUpdated {
        /// Ids of removed torrents, in removal order.
        removed_ids: Vec<i32>,
        /// Records of torrents whose fields changed.
        changed: RecordBuffer<RawTorrentRecord>,
        /// Records of newly added torrents.
        added: RecordBuffer<RawTorrentRecord>,
    },
    /// File list update for one torrent.
    TorrentFilesUpdated {
        /// Owning torrent id.
        torrent_id: i32,
        /// Changed file records.
        changed: RecordBuffer<RawFileRecord>,
    },
    /// Incremental peer list update for one torrent.
    TorrentPeersUpdated {
        /// Owning torrent id.
        torrent_id: i32,
        /// Removed peer index ranges, in removal order.
        removed_ranges: Vec<IndexRange>,
        /// Records of peers whose fields changed.
        changed: RecordBuffer<RawPeerRecord>,
        /// Records of newly connected peers.
        added: RecordBuffer<RawPeerRecord>,
    },
    /// Server settings snapshot changed.
    ServerSettingsChanged {
        /// Full settings record.
        settings: Box<RawServerSettingsRecord>,
    },
    /// Session statistics update.
    ServerStatsUpdated {
        /// Session-wide download rate, bytes per second.
        download_speed: i64,
        /// Session-wide upload rate, bytes per second.
        upload_speed: i64,
        /// Statistics for the current session.
        current: RawSessionStatsRecord,
        /// Statistics accumulated across sessions.
        total: RawSessionStatsRecord,
    },
    /// A torrent was added to the server.
    TorrentAdded {
        /// Server-assigned torrent id.
        id: i32,
        /// Info hash in hexadecimal.
        hash: RawText,
        /// Display name.
        name: RawText,
    },
    /// A torrent finished downloading.
    TorrentFinished {
        /// Server-assigned torrent id.
        id: i32,
        /// Info hash in hexadecimal.
        hash: RawText,
        /// Display name.
        name: RawText,
    },
    /// An add request named a torrent the server already has.
    TorrentAddDuplicate,
    /// An add request failed on the server side.
    TorrentAddError,
    /// A file rename requested through the session completed.
    TorrentFileRenamed {
        /// Owning torrent id.
        torrent_id: i32,
        /// Path of the renamed file within the torrent.
        file_path: RawText,
        /// The new name.
        new_name: RawText,
    },
    /// Result of a download directory free space query.
    DownloadDirFreeSpaceChecked {
        /// Free bytes in the download directory.
        bytes: i64,
    },
    /// Result of a free space query for an arbitrary path.
    FreeSpaceChecked {
        /// Queried path.
        path: RawText,
        /// Whether the query succeeded.
        success: bool,
        /// Free bytes when successful.
        bytes: i64,
    },
}

/// Operations the excluded native RPC client must expose to the bridge.
///
/// Command methods are fire-and-forget from the bridge's point of view;
/// failures the native side detects later are reported through
/// [`RawEvent::ErrorChanged`]. `poll_events` drains notifications in
/// observation order.
#[async_trait]
#[allow(clippy::missing_errors_doc)]
pub trait NativeSession: Send {
    /// Open the connection to the configured server.
    async fn connect(&mut self) -> Result<()>;
    /// Close the connection.
    async fn disconnect(&mut self) -> Result<()>;
    /// Suspend or resume periodic data updates.
    async fn set_update_disabled(&mut self, disabled: bool) -> Result<()>;
    /// Start the given torrents.
    async fn start_torrents(&mut self, ids: &[i32]) -> Result<()>;
    /// Start the given torrents, bypassing the queue.
    async fn start_torrents_now(&mut self, ids: &[i32]) -> Result<()>;
    /// Pause the given torrents.
    async fn pause_torrents(&mut self, ids: &[i32]) -> Result<()>;
    /// Remove the given torrents, optionally deleting their data.
    async fn remove_torrents(&mut self, ids: &[i32], delete_files: bool) -> Result<()>;
    /// Queue a hash check for the given torrents.
    async fn verify_torrents(&mut self, ids: &[i32]) -> Result<()>;
    /// Force a tracker reannounce for the given torrents.
    async fn reannounce_torrents(&mut self, ids: &[i32]) -> Result<()>;
    /// Add a torrent from a magnet link or URL.
    async fn add_torrent_link(
        &mut self,
        link: RawText,
        download_directory: RawText,
        bandwidth_priority: i32,
        start: bool,
    ) -> Result<()>;
    /// Add a torrent from metainfo bytes with initial file selection.
    #[allow(clippy::too_many_arguments)]
    async fn add_torrent_file(
        &mut self,
        metainfo: RawBuffer,
        download_directory: RawText,
        unwanted_files: &[i32],
        high_priority_files: &[i32],
        low_priority_files: &[i32],
        bandwidth_priority: i32,
        start: bool,
    ) -> Result<()>;
    /// Move the given torrents to a new location.
    async fn set_torrents_location(
        &mut self,
        ids: &[i32],
        location: RawText,
        move_files: bool,
    ) -> Result<()>;
    /// Rename a file within a torrent.
    async fn rename_torrent_file(
        &mut self,
        torrent_id: i32,
        file_path: RawText,
        new_name: RawText,
    ) -> Result<()>;
    /// Query free space for a path; the result arrives as an event.
    async fn request_free_space(&mut self, path: RawText) -> Result<()>;
    /// Query free space in the download directory; the result arrives as
    /// an event.
    async fn request_download_dir_free_space(&mut self) -> Result<()>;
    /// Apply one server settings mutation.
    async fn set_session_setting(&mut self, mutation: RawSettingsMutation) -> Result<()>;
    /// Drain pending notifications in observation order.
    async fn poll_events(&mut self) -> Result<Vec<RawEvent>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_text_from_str_is_total() {
        let text = RawText::from("snowman \u{2603} and friends");
        assert_eq!(
            text.0,
            "snowman \u{2603} and friends"
                .encode_utf16()
                .collect::<Vec<u16>>()
        );
        assert_eq!(RawText::from(""), RawText(Vec::new()));
    }

    #[test]
    fn record_buffer_is_consume_once() {
        let mut buffer = RecordBuffer::new(vec![1, 2, 3]);
        assert!(!buffer.is_consumed());

        let records = buffer.take().expect("first take succeeds");
        assert_eq!(records, vec![1, 2, 3]);
        assert!(buffer.is_consumed());

        match buffer.take() {
            Err(BridgeError::TransferInvariant { context }) => {
                assert_eq!(context, "record buffer already consumed");
            }
            other => panic!("expected transfer invariant violation, got {other:?}"),
        }
    }

    #[test]
    fn empty_record_buffer_transfers_cleanly() {
        let mut buffer: RecordBuffer<RawPeerRecord> = RecordBuffer::default();
        let records = buffer.take().expect("empty take succeeds");
        assert!(records.is_empty());
    }
}
