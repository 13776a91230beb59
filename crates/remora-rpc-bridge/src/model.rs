//! Immutable entity snapshots exposed to managed code.
//!
//! Every type here is projected once, owns its data independently of the
//! native object it was copied from, and stays valid after the native side
//! mutates or destroys that object. None of them exposes a mutator; all
//! mutation goes through [`crate::session::Session`] commands. Fields are
//! crate-private so the only way to obtain a snapshot is through the
//! projection layer.

use chrono::{DateTime, Utc};
use serde::Serialize;

use remora_rpc_core::{
    AlternativeSpeedLimitsDays, BandwidthPriority, EncryptionMode, FilePriority,
    IdleSeedingLimitMode, RatioLimitMode, RpcError, TimeOfDay, TorrentStatus, TrackerStatus,
};

/// Immutable snapshot of one torrent, captured at projection time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TorrentSnapshot {
    pub(crate) id: i32,
    pub(crate) hash: String,
    pub(crate) name: String,
    pub(crate) status: TorrentStatus,
    pub(crate) error: RpcError,
    pub(crate) error_string: String,
    pub(crate) percent_done: f64,
    pub(crate) recheck_progress: f64,
    pub(crate) total_size: i64,
    pub(crate) completed_size: i64,
    pub(crate) left_until_done: i64,
    pub(crate) size_when_done: i64,
    pub(crate) download_speed: i64,
    pub(crate) upload_speed: i64,
    pub(crate) eta_seconds: Option<i64>,
    pub(crate) ratio: f64,
    pub(crate) ratio_limit_mode: RatioLimitMode,
    pub(crate) ratio_limit: f64,
    pub(crate) idle_seeding_limit_mode: IdleSeedingLimitMode,
    pub(crate) idle_seeding_limit_minutes: i32,
    pub(crate) seeders: i32,
    pub(crate) leechers: i32,
    pub(crate) peers_limit: i32,
    pub(crate) honor_session_limits: bool,
    pub(crate) bandwidth_priority: BandwidthPriority,
    pub(crate) added_date: Option<DateTime<Utc>>,
    pub(crate) done_date: Option<DateTime<Utc>>,
    pub(crate) activity_date: Option<DateTime<Utc>>,
    pub(crate) download_directory: String,
    pub(crate) trackers: Vec<TrackerSnapshot>,
}

impl TorrentSnapshot {
    /// Server-assigned torrent id.
    #[must_use]
    pub fn id(&self) -> i32 {
        self.id
    }

    /// Info hash in hexadecimal.
    #[must_use]
    pub fn hash(&self) -> &str {
        &self.hash
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Lifecycle status at capture time.
    #[must_use]
    pub fn status(&self) -> TorrentStatus {
        self.status
    }

    /// Torrent-level error classification.
    #[must_use]
    pub fn error(&self) -> RpcError {
        self.error
    }

    /// Human-readable error text, empty when none.
    #[must_use]
    pub fn error_string(&self) -> &str {
        &self.error_string
    }

    /// Completed fraction in `0.0..=1.0`.
    #[must_use]
    pub fn percent_done(&self) -> f64 {
        self.percent_done
    }

    /// Hash-check progress in `0.0..=1.0`.
    #[must_use]
    pub fn recheck_progress(&self) -> f64 {
        self.recheck_progress
    }

    /// Total payload size in bytes.
    #[must_use]
    pub fn total_size(&self) -> i64 {
        self.total_size
    }

    /// Bytes downloaded and verified.
    #[must_use]
    pub fn completed_size(&self) -> i64 {
        self.completed_size
    }

    /// Bytes remaining until the wanted set is complete.
    #[must_use]
    pub fn left_until_done(&self) -> i64 {
        self.left_until_done
    }

    /// Total size of the wanted set in bytes.
    #[must_use]
    pub fn size_when_done(&self) -> i64 {
        self.size_when_done
    }

    /// Download rate at capture time, bytes per second.
    #[must_use]
    pub fn download_speed(&self) -> i64 {
        self.download_speed
    }

    /// Upload rate at capture time, bytes per second.
    #[must_use]
    pub fn upload_speed(&self) -> i64 {
        self.upload_speed
    }

    /// Estimated seconds to completion, when known.
    #[must_use]
    pub fn eta_seconds(&self) -> Option<i64> {
        self.eta_seconds
    }

    /// Share ratio.
    #[must_use]
    pub fn ratio(&self) -> f64 {
        self.ratio
    }

    /// How the ratio limit is resolved.
    #[must_use]
    pub fn ratio_limit_mode(&self) -> RatioLimitMode {
        self.ratio_limit_mode
    }

    /// Ratio limit used when the mode is [`RatioLimitMode::Single`].
    #[must_use]
    pub fn ratio_limit(&self) -> f64 {
        self.ratio_limit
    }

    /// How the idle seeding limit is resolved.
    #[must_use]
    pub fn idle_seeding_limit_mode(&self) -> IdleSeedingLimitMode {
        self.idle_seeding_limit_mode
    }

    /// Idle limit in minutes used when the mode is
    /// [`IdleSeedingLimitMode::Single`].
    #[must_use]
    pub fn idle_seeding_limit_minutes(&self) -> i32 {
        self.idle_seeding_limit_minutes
    }

    /// Peers this client downloads from.
    #[must_use]
    pub fn seeders(&self) -> i32 {
        self.seeders
    }

    /// Peers this client uploads to.
    #[must_use]
    pub fn leechers(&self) -> i32 {
        self.leechers
    }

    /// Per-torrent peer cap.
    #[must_use]
    pub fn peers_limit(&self) -> i32 {
        self.peers_limit
    }

    /// Whether session-wide limits apply to this torrent.
    #[must_use]
    pub fn honor_session_limits(&self) -> bool {
        self.honor_session_limits
    }

    /// Bandwidth priority.
    #[must_use]
    pub fn bandwidth_priority(&self) -> BandwidthPriority {
        self.bandwidth_priority
    }

    /// When the torrent was added, when known.
    #[must_use]
    pub fn added_date(&self) -> Option<DateTime<Utc>> {
        self.added_date
    }

    /// When the torrent finished, when known.
    #[must_use]
    pub fn done_date(&self) -> Option<DateTime<Utc>> {
        self.done_date
    }

    /// Last peer activity, when known.
    #[must_use]
    pub fn activity_date(&self) -> Option<DateTime<Utc>> {
        self.activity_date
    }

    /// Download directory path.
    #[must_use]
    pub fn download_directory(&self) -> &str {
        &self.download_directory
    }

    /// Tracker snapshots captured with the torrent.
    #[must_use]
    pub fn trackers(&self) -> &[TrackerSnapshot] {
        &self.trackers
    }
}

/// Immutable snapshot of one file within a torrent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TorrentFileSnapshot {
    pub(crate) id: i32,
    pub(crate) path: String,
    pub(crate) size: i64,
    pub(crate) completed_size: i64,
    pub(crate) wanted: bool,
    pub(crate) priority: FilePriority,
}

impl TorrentFileSnapshot {
    /// File index within the torrent payload.
    #[must_use]
    pub fn id(&self) -> i32 {
        self.id
    }

    /// Path relative to the torrent root.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Total size in bytes.
    #[must_use]
    pub fn size(&self) -> i64 {
        self.size
    }

    /// Bytes downloaded so far.
    #[must_use]
    pub fn completed_size(&self) -> i64 {
        self.completed_size
    }

    /// Whether the file is selected for download.
    #[must_use]
    pub fn wanted(&self) -> bool {
        self.wanted
    }

    /// Download priority.
    #[must_use]
    pub fn priority(&self) -> FilePriority {
        self.priority
    }
}

/// Immutable snapshot of one connected peer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeerSnapshot {
    pub(crate) address: String,
    pub(crate) client: String,
    pub(crate) flags: String,
    pub(crate) download_speed: i64,
    pub(crate) upload_speed: i64,
    pub(crate) progress: f64,
}

impl PeerSnapshot {
    /// Remote address.
    #[must_use]
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Peer client identification string.
    #[must_use]
    pub fn client(&self) -> &str {
        &self.client
    }

    /// Transmission-style peer flag string.
    #[must_use]
    pub fn flags(&self) -> &str {
        &self.flags
    }

    /// Download rate from this peer, bytes per second.
    #[must_use]
    pub fn download_speed(&self) -> i64 {
        self.download_speed
    }

    /// Upload rate to this peer, bytes per second.
    #[must_use]
    pub fn upload_speed(&self) -> i64 {
        self.upload_speed
    }

    /// Peer's completed fraction in `0.0..=1.0`.
    #[must_use]
    pub fn progress(&self) -> f64 {
        self.progress
    }
}

/// Immutable snapshot of one tracker entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackerSnapshot {
    pub(crate) id: i32,
    pub(crate) announce: String,
    pub(crate) tier: i32,
    pub(crate) status: TrackerStatus,
    pub(crate) error_message: String,
    pub(crate) peers: i32,
    pub(crate) next_update: Option<DateTime<Utc>>,
}

impl TrackerSnapshot {
    /// Server-assigned tracker id.
    #[must_use]
    pub fn id(&self) -> i32 {
        self.id
    }

    /// Announce URL.
    #[must_use]
    pub fn announce(&self) -> &str {
        &self.announce
    }

    /// Tracker tier.
    #[must_use]
    pub fn tier(&self) -> i32 {
        self.tier
    }

    /// Announce state at capture time.
    #[must_use]
    pub fn status(&self) -> TrackerStatus {
        self.status
    }

    /// Last announce error text, empty when none.
    #[must_use]
    pub fn error_message(&self) -> &str {
        &self.error_message
    }

    /// Peer count reported by the tracker.
    #[must_use]
    pub fn peers(&self) -> i32 {
        self.peers
    }

    /// Next scheduled announce, when known.
    #[must_use]
    pub fn next_update(&self) -> Option<DateTime<Utc>> {
        self.next_update
    }
}

/// Immutable snapshot of the server settings.
///
/// Mutation happens exclusively through the settings commands on
/// [`crate::session::Session`]; a fresh snapshot arrives through the sink
/// after the server acknowledges a change.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct ServerSettingsSnapshot {
    pub(crate) download_directory: String,
    pub(crate) start_added_torrents: bool,
    pub(crate) trash_torrent_files: bool,
    pub(crate) rename_incomplete_files: bool,
    pub(crate) incomplete_directory_enabled: bool,
    pub(crate) incomplete_directory: String,
    pub(crate) ratio_limited: bool,
    pub(crate) ratio_limit: f64,
    pub(crate) idle_seeding_limited: bool,
    pub(crate) idle_seeding_limit_minutes: i32,
    pub(crate) download_queue_enabled: bool,
    pub(crate) download_queue_size: i32,
    pub(crate) seed_queue_enabled: bool,
    pub(crate) seed_queue_size: i32,
    pub(crate) download_speed_limited: bool,
    pub(crate) download_speed_limit: i32,
    pub(crate) upload_speed_limited: bool,
    pub(crate) upload_speed_limit: i32,
    pub(crate) alternative_speed_limits_enabled: bool,
    pub(crate) alternative_download_speed_limit: i32,
    pub(crate) alternative_upload_speed_limit: i32,
    pub(crate) alternative_speed_limits_scheduled: bool,
    pub(crate) alternative_speed_limits_begin_time: TimeOfDay,
    pub(crate) alternative_speed_limits_end_time: TimeOfDay,
    pub(crate) alternative_speed_limits_days: AlternativeSpeedLimitsDays,
    pub(crate) peer_port: i32,
    pub(crate) random_port_enabled: bool,
    pub(crate) port_forwarding_enabled: bool,
    pub(crate) encryption_mode: EncryptionMode,
    pub(crate) utp_enabled: bool,
    pub(crate) pex_enabled: bool,
    pub(crate) dht_enabled: bool,
    pub(crate) lpd_enabled: bool,
    pub(crate) maximum_peers_per_torrent: i32,
    pub(crate) maximum_peers_globally: i32,
}

impl ServerSettingsSnapshot {
    /// Default download directory.
    #[must_use]
    pub fn download_directory(&self) -> &str {
        &self.download_directory
    }

    /// Whether added torrents start immediately.
    #[must_use]
    pub fn start_added_torrents(&self) -> bool {
        self.start_added_torrents
    }

    /// Whether removed torrent files are trashed instead of deleted.
    #[must_use]
    pub fn trash_torrent_files(&self) -> bool {
        self.trash_torrent_files
    }

    /// Whether incomplete files carry a `.part` suffix.
    #[must_use]
    pub fn rename_incomplete_files(&self) -> bool {
        self.rename_incomplete_files
    }

    /// Whether the incomplete directory is used.
    #[must_use]
    pub fn incomplete_directory_enabled(&self) -> bool {
        self.incomplete_directory_enabled
    }

    /// Incomplete directory path.
    #[must_use]
    pub fn incomplete_directory(&self) -> &str {
        &self.incomplete_directory
    }

    /// Whether a session-wide ratio limit applies.
    #[must_use]
    pub fn ratio_limited(&self) -> bool {
        self.ratio_limited
    }

    /// Session-wide ratio limit.
    #[must_use]
    pub fn ratio_limit(&self) -> f64 {
        self.ratio_limit
    }

    /// Whether a session-wide idle seeding limit applies.
    #[must_use]
    pub fn idle_seeding_limited(&self) -> bool {
        self.idle_seeding_limited
    }

    /// Session-wide idle seeding limit in minutes.
    #[must_use]
    pub fn idle_seeding_limit_minutes(&self) -> i32 {
        self.idle_seeding_limit_minutes
    }

    /// Whether the download queue is enabled.
    #[must_use]
    pub fn download_queue_enabled(&self) -> bool {
        self.download_queue_enabled
    }

    /// Download queue size.
    #[must_use]
    pub fn download_queue_size(&self) -> i32 {
        self.download_queue_size
    }

    /// Whether the seed queue is enabled.
    #[must_use]
    pub fn seed_queue_enabled(&self) -> bool {
        self.seed_queue_enabled
    }

    /// Seed queue size.
    #[must_use]
    pub fn seed_queue_size(&self) -> i32 {
        self.seed_queue_size
    }

    /// Whether the download speed limit applies.
    #[must_use]
    pub fn download_speed_limited(&self) -> bool {
        self.download_speed_limited
    }

    /// Download speed limit in kilobytes per second.
    #[must_use]
    pub fn download_speed_limit(&self) -> i32 {
        self.download_speed_limit
    }

    /// Whether the upload speed limit applies.
    #[must_use]
    pub fn upload_speed_limited(&self) -> bool {
        self.upload_speed_limited
    }

    /// Upload speed limit in kilobytes per second.
    #[must_use]
    pub fn upload_speed_limit(&self) -> i32 {
        self.upload_speed_limit
    }

    /// Whether alternative speed limits are active.
    #[must_use]
    pub fn alternative_speed_limits_enabled(&self) -> bool {
        self.alternative_speed_limits_enabled
    }

    /// Alternative download speed limit in kilobytes per second.
    #[must_use]
    pub fn alternative_download_speed_limit(&self) -> i32 {
        self.alternative_download_speed_limit
    }

    /// Alternative upload speed limit in kilobytes per second.
    #[must_use]
    pub fn alternative_upload_speed_limit(&self) -> i32 {
        self.alternative_upload_speed_limit
    }

    /// Whether the alternative limits follow a schedule.
    #[must_use]
    pub fn alternative_speed_limits_scheduled(&self) -> bool {
        self.alternative_speed_limits_scheduled
    }

    /// Schedule start.
    #[must_use]
    pub fn alternative_speed_limits_begin_time(&self) -> TimeOfDay {
        self.alternative_speed_limits_begin_time
    }

    /// Schedule end.
    #[must_use]
    pub fn alternative_speed_limits_end_time(&self) -> TimeOfDay {
        self.alternative_speed_limits_end_time
    }

    /// Schedule day selection.
    #[must_use]
    pub fn alternative_speed_limits_days(&self) -> AlternativeSpeedLimitsDays {
        self.alternative_speed_limits_days
    }

    /// Listening port for peer connections.
    #[must_use]
    pub fn peer_port(&self) -> i32 {
        self.peer_port
    }

    /// Whether a random peer port is chosen at startup.
    #[must_use]
    pub fn random_port_enabled(&self) -> bool {
        self.random_port_enabled
    }

    /// Whether port forwarding via NAT port mapping is requested.
    #[must_use]
    pub fn port_forwarding_enabled(&self) -> bool {
        self.port_forwarding_enabled
    }

    /// Peer connection encryption requirement.
    #[must_use]
    pub fn encryption_mode(&self) -> EncryptionMode {
        self.encryption_mode
    }

    /// Whether the `uTP` transport is enabled.
    #[must_use]
    pub fn utp_enabled(&self) -> bool {
        self.utp_enabled
    }

    /// Whether peer exchange is enabled.
    #[must_use]
    pub fn pex_enabled(&self) -> bool {
        self.pex_enabled
    }

    /// Whether the distributed hash table is enabled.
    #[must_use]
    pub fn dht_enabled(&self) -> bool {
        self.dht_enabled
    }

    /// Whether local peer discovery is enabled.
    #[must_use]
    pub fn lpd_enabled(&self) -> bool {
        self.lpd_enabled
    }

    /// Peer cap per torrent.
    #[must_use]
    pub fn maximum_peers_per_torrent(&self) -> i32 {
        self.maximum_peers_per_torrent
    }

    /// Peer cap across the session.
    #[must_use]
    pub fn maximum_peers_globally(&self) -> i32 {
        self.maximum_peers_globally
    }
}

/// Immutable snapshot of session statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SessionStatsSnapshot {
    pub(crate) downloaded_bytes: i64,
    pub(crate) uploaded_bytes: i64,
    pub(crate) files_added: i32,
    pub(crate) session_count: i32,
    pub(crate) seconds_active: i64,
}

impl SessionStatsSnapshot {
    /// Bytes downloaded.
    #[must_use]
    pub fn downloaded_bytes(&self) -> i64 {
        self.downloaded_bytes
    }

    /// Bytes uploaded.
    #[must_use]
    pub fn uploaded_bytes(&self) -> i64 {
        self.uploaded_bytes
    }

    /// Files added.
    #[must_use]
    pub fn files_added(&self) -> i32 {
        self.files_added
    }

    /// Number of sessions covered by the snapshot.
    #[must_use]
    pub fn session_count(&self) -> i32 {
        self.session_count
    }

    /// Seconds the session has been active.
    #[must_use]
    pub fn seconds_active(&self) -> i64 {
        self.seconds_active
    }
}
