//! Commands queued from the session handle to the native worker.
//!
//! Managed arguments are converted to native representation before a
//! command is enqueued, so the worker only moves values across. Commands
//! are fire-and-forget; failures the native side detects later come back
//! through the notification sink as an error change.

use remora_rpc_core::{
    AlternativeSpeedLimitsDays, EncryptionMode, RawBuffer, RawSettingsMutation, RawText, TimeOfDay,
};

use crate::adapt;
use crate::enummap;

/// One queued native operation, already in native representation.
#[derive(Debug, PartialEq)]
pub(crate) enum SessionCommand {
    Connect,
    Disconnect,
    SetUpdateDisabled(bool),
    StartTorrents(Vec<i32>),
    StartTorrentsNow(Vec<i32>),
    PauseTorrents(Vec<i32>),
    RemoveTorrents {
        ids: Vec<i32>,
        delete_files: bool,
    },
    VerifyTorrents(Vec<i32>),
    ReannounceTorrents(Vec<i32>),
    AddTorrentLink {
        link: RawText,
        download_directory: RawText,
        bandwidth_priority: i32,
        start: bool,
    },
    AddTorrentFile {
        metainfo: RawBuffer,
        download_directory: RawText,
        unwanted_files: Vec<i32>,
        high_priority_files: Vec<i32>,
        low_priority_files: Vec<i32>,
        bandwidth_priority: i32,
        start: bool,
    },
    SetTorrentsLocation {
        ids: Vec<i32>,
        location: RawText,
        move_files: bool,
    },
    RenameTorrentFile {
        torrent_id: i32,
        file_path: RawText,
        new_name: RawText,
    },
    RequestFreeSpace(RawText),
    RequestDownloadDirFreeSpace,
    SetSessionSetting(RawSettingsMutation),
}

impl SessionCommand {
    /// Operation name used in worker logs.
    pub(crate) fn operation(&self) -> &'static str {
        match self {
            Self::Connect => "connect",
            Self::Disconnect => "disconnect",
            Self::SetUpdateDisabled(_) => "set_update_disabled",
            Self::StartTorrents(_) => "start_torrents",
            Self::StartTorrentsNow(_) => "start_torrents_now",
            Self::PauseTorrents(_) => "pause_torrents",
            Self::RemoveTorrents { .. } => "remove_torrents",
            Self::VerifyTorrents(_) => "verify_torrents",
            Self::ReannounceTorrents(_) => "reannounce_torrents",
            Self::AddTorrentLink { .. } => "add_torrent_link",
            Self::AddTorrentFile { .. } => "add_torrent_file",
            Self::SetTorrentsLocation { .. } => "set_torrents_location",
            Self::RenameTorrentFile { .. } => "rename_torrent_file",
            Self::RequestFreeSpace(_) => "request_free_space",
            Self::RequestDownloadDirFreeSpace => "request_download_dir_free_space",
            Self::SetSessionSetting(_) => "set_session_setting",
        }
    }
}

/// One server settings change, in managed representation.
///
/// Each variant corresponds to one mutation the server accepts. The
/// conversion to native representation is total; typed arguments cannot
/// produce an unmapped value.
#[derive(Debug, Clone, PartialEq)]
pub enum ServerSettingsUpdate {
    /// Set the default download directory.
    DownloadDirectory(String),
    /// Toggle starting added torrents immediately.
    StartAddedTorrents(bool),
    /// Toggle trashing removed torrent files.
    TrashTorrentFiles(bool),
    /// Toggle the `.part` suffix on incomplete files.
    RenameIncompleteFiles(bool),
    /// Toggle the incomplete directory.
    IncompleteDirectoryEnabled(bool),
    /// Set the incomplete directory path.
    IncompleteDirectory(String),
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
    /// Set the schedule start.
    AlternativeSpeedLimitsBeginTime(TimeOfDay),
    /// Set the schedule end.
    AlternativeSpeedLimitsEndTime(TimeOfDay),
    /// Set the schedule day selection.
    AlternativeSpeedLimitsDays(AlternativeSpeedLimitsDays),
    /// Set the peer port.
    PeerPort(i32),
    /// Toggle random peer port selection.
    RandomPortEnabled(bool),
    /// Toggle port forwarding.
    PortForwardingEnabled(bool),
    /// Set the encryption mode.
    EncryptionMode(EncryptionMode),
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

impl ServerSettingsUpdate {
    /// Convert to the native mutation representation.
    #[must_use]
    pub(crate) fn into_native(self) -> RawSettingsMutation {
        match self {
            Self::DownloadDirectory(path) => {
                RawSettingsMutation::DownloadDirectory(adapt::text_from_managed(&path))
            }
            Self::StartAddedTorrents(value) => RawSettingsMutation::StartAddedTorrents(value),
            Self::TrashTorrentFiles(value) => RawSettingsMutation::TrashTorrentFiles(value),
            Self::RenameIncompleteFiles(value) => RawSettingsMutation::RenameIncompleteFiles(value),
            Self::IncompleteDirectoryEnabled(value) => {
                RawSettingsMutation::IncompleteDirectoryEnabled(value)
            }
            Self::IncompleteDirectory(path) => {
                RawSettingsMutation::IncompleteDirectory(adapt::text_from_managed(&path))
            }
            Self::RatioLimited(value) => RawSettingsMutation::RatioLimited(value),
            Self::RatioLimit(value) => RawSettingsMutation::RatioLimit(value),
            Self::IdleSeedingLimited(value) => RawSettingsMutation::IdleSeedingLimited(value),
            Self::IdleSeedingLimit(value) => RawSettingsMutation::IdleSeedingLimit(value),
            Self::DownloadQueueEnabled(value) => RawSettingsMutation::DownloadQueueEnabled(value),
            Self::DownloadQueueSize(value) => RawSettingsMutation::DownloadQueueSize(value),
            Self::SeedQueueEnabled(value) => RawSettingsMutation::SeedQueueEnabled(value),
            Self::SeedQueueSize(value) => RawSettingsMutation::SeedQueueSize(value),
            Self::DownloadSpeedLimited(value) => RawSettingsMutation::DownloadSpeedLimited(value),
            Self::DownloadSpeedLimit(value) => RawSettingsMutation::DownloadSpeedLimit(value),
            Self::UploadSpeedLimited(value) => RawSettingsMutation::UploadSpeedLimited(value),
            Self::UploadSpeedLimit(value) => RawSettingsMutation::UploadSpeedLimit(value),
            Self::AlternativeSpeedLimitsEnabled(value) => {
                RawSettingsMutation::AlternativeSpeedLimitsEnabled(value)
            }
            Self::AlternativeDownloadSpeedLimit(value) => {
                RawSettingsMutation::AlternativeDownloadSpeedLimit(value)
            }
            Self::AlternativeUploadSpeedLimit(value) => {
                RawSettingsMutation::AlternativeUploadSpeedLimit(value)
            }
            Self::AlternativeSpeedLimitsScheduled(value) => {
                RawSettingsMutation::AlternativeSpeedLimitsScheduled(value)
            }
            Self::AlternativeSpeedLimitsBeginTime(time) => {
                RawSettingsMutation::AlternativeSpeedLimitsBeginTime(
                    adapt::time_of_day_from_managed(time),
                )
            }
            Self::AlternativeSpeedLimitsEndTime(time) => {
                RawSettingsMutation::AlternativeSpeedLimitsEndTime(adapt::time_of_day_from_managed(
                    time,
                ))
            }
            Self::AlternativeSpeedLimitsDays(days) => {
                RawSettingsMutation::AlternativeSpeedLimitsDays(days.mask())
            }
            Self::PeerPort(value) => RawSettingsMutation::PeerPort(value),
            Self::RandomPortEnabled(value) => RawSettingsMutation::RandomPortEnabled(value),
            Self::PortForwardingEnabled(value) => RawSettingsMutation::PortForwardingEnabled(value),
            Self::EncryptionMode(mode) => {
                RawSettingsMutation::EncryptionMode(enummap::ENCRYPTION_MODE.encode(mode))
            }
            Self::UtpEnabled(value) => RawSettingsMutation::UtpEnabled(value),
            Self::PexEnabled(value) => RawSettingsMutation::PexEnabled(value),
            Self::DhtEnabled(value) => RawSettingsMutation::DhtEnabled(value),
            Self::LpdEnabled(value) => RawSettingsMutation::LpdEnabled(value),
            Self::MaximumPeersPerTorrent(value) => {
                RawSettingsMutation::MaximumPeersPerTorrent(value)
            }
            Self::MaximumPeersGlobally(value) => RawSettingsMutation::MaximumPeersGlobally(value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn managed_arguments_convert_to_native_representation() {
        assert_eq!(
            ServerSettingsUpdate::DownloadDirectory("/srv/downloads".to_owned()).into_native(),
            RawSettingsMutation::DownloadDirectory(RawText::from("/srv/downloads"))
        );
        let begin = TimeOfDay::new(22, 0).expect("valid time");
        assert_eq!(
            ServerSettingsUpdate::AlternativeSpeedLimitsBeginTime(begin).into_native(),
            RawSettingsMutation::AlternativeSpeedLimitsBeginTime(22 * 60 * 60_000)
        );
        assert_eq!(
            ServerSettingsUpdate::AlternativeSpeedLimitsDays(AlternativeSpeedLimitsDays::WEEKDAYS)
                .into_native(),
            RawSettingsMutation::AlternativeSpeedLimitsDays(62)
        );
        let monday_and_tuesday =
            AlternativeSpeedLimitsDays::from_mask(6).expect("day bits are valid");
        assert_eq!(
            ServerSettingsUpdate::AlternativeSpeedLimitsDays(monday_and_tuesday).into_native(),
            RawSettingsMutation::AlternativeSpeedLimitsDays(6)
        );
        assert_eq!(
            ServerSettingsUpdate::EncryptionMode(EncryptionMode::Required).into_native(),
            RawSettingsMutation::EncryptionMode(2)
        );
        assert_eq!(
            ServerSettingsUpdate::PeerPort(51_413).into_native(),
            RawSettingsMutation::PeerPort(51_413)
        );
    }

    #[test]
    fn commands_report_their_operation_name() {
        assert_eq!(SessionCommand::Connect.operation(), "connect");
        assert_eq!(
            SessionCommand::RemoveTorrents {
                ids: vec![1],
                delete_files: true,
            }
            .operation(),
            "remove_torrents"
        );
    }
}
