//! Native record builders with plausible defaults.
//!
//! Every builder produces a record whose enum-valued fields decode
//! cleanly, so tests only override the fields they are about.

use remora_rpc_core::{
    RawFileRecord, RawPeerRecord, RawServerSettingsRecord, RawSessionStatsRecord,
    RawTorrentRecord, RawText, RawTrackerRecord,
};

/// A downloading torrent with one active tracker.
#[must_use]
pub fn torrent_record(id: i32, name: &str) -> RawTorrentRecord {
    RawTorrentRecord {
        id,
        hash: RawText::from("a94a8fe5ccb19ba61c4c0873d391e987982fbbd3"),
        name: RawText::from(name),
        status: 1,
        error: 0,
        error_string: RawText::default(),
        percent_done: 0.5,
        recheck_progress: 0.0,
        total_size: 1_000_000_000,
        completed_size: 500_000_000,
        left_until_done: 500_000_000,
        size_when_done: 1_000_000_000,
        download_speed: 1_048_576,
        upload_speed: 262_144,
        eta_seconds: 477,
        ratio: 0.2,
        ratio_limit_mode: 0,
        ratio_limit: 2.0,
        idle_seeding_limit_mode: 0,
        idle_seeding_limit_minutes: 30,
        seeders: 12,
        leechers: 3,
        peers_limit: 60,
        honor_session_limits: true,
        bandwidth_priority: 0,
        added_date_epoch: 1_700_000_000,
        done_date_epoch: -1,
        activity_date_epoch: 1_700_000_100,
        download_directory: RawText::from("/srv/downloads"),
        trackers: vec![tracker_record(0)],
    }
}

/// An active tracker entry.
#[must_use]
pub fn tracker_record(id: i32) -> RawTrackerRecord {
    RawTrackerRecord {
        id,
        announce: RawText::from("https://tracker.example.org/announce"),
        tier: 0,
        status: 1,
        error_message: RawText::default(),
        peers: 42,
        next_update_epoch: 1_700_000_300,
    }
}

/// A wanted file at normal priority.
#[must_use]
pub fn file_record(id: i32, path: &str) -> RawFileRecord {
    RawFileRecord {
        id,
        path: RawText::from(path),
        size: 700_000_000,
        completed_size: 350_000_000,
        wanted: true,
        priority: 0,
    }
}

/// A connected peer mid-download.
#[must_use]
pub fn peer_record(address: &str) -> RawPeerRecord {
    RawPeerRecord {
        address: RawText::from(address),
        client: RawText::from("Transmission 4.0.5"),
        flags: RawText::from("UEI"),
        download_speed: 2_048,
        upload_speed: 512,
        progress: 0.75,
    }
}

/// Server settings with an overnight alternative speed limit schedule.
#[must_use]
pub fn server_settings_record() -> RawServerSettingsRecord {
    RawServerSettingsRecord {
        download_directory: RawText::from("/srv/downloads"),
        start_added_torrents: true,
        trash_torrent_files: false,
        rename_incomplete_files: true,
        incomplete_directory_enabled: false,
        incomplete_directory: RawText::from("/srv/incomplete"),
        ratio_limited: true,
        ratio_limit: 2.0,
        idle_seeding_limited: false,
        idle_seeding_limit_minutes: 30,
        download_queue_enabled: true,
        download_queue_size: 5,
        seed_queue_enabled: false,
        seed_queue_size: 10,
        download_speed_limited: false,
        download_speed_limit: 10_240,
        upload_speed_limited: true,
        upload_speed_limit: 1_024,
        alternative_speed_limits_enabled: false,
        alternative_download_speed_limit: 2_048,
        alternative_upload_speed_limit: 512,
        alternative_speed_limits_scheduled: true,
        alternative_speed_limits_begin_time_msecs: 22 * 60 * 60_000,
        alternative_speed_limits_end_time_msecs: 6 * 60 * 60_000 + 30 * 60_000,
        alternative_speed_limits_days: 127,
        peer_port: 51_413,
        random_port_enabled: false,
        port_forwarding_enabled: true,
        encryption_mode: 1,
        utp_enabled: true,
        pex_enabled: true,
        dht_enabled: true,
        lpd_enabled: false,
        maximum_peers_per_torrent: 60,
        maximum_peers_globally: 200,
    }
}

/// Session statistics after a short run.
#[must_use]
pub fn session_stats_record() -> RawSessionStatsRecord {
    RawSessionStatsRecord {
        downloaded_bytes: 5_000_000_000,
        uploaded_bytes: 1_250_000_000,
        files_added: 17,
        session_count: 3,
        seconds_active: 86_400,
    }
}
