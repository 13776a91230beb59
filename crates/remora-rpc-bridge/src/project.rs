//! Projection from native records to managed snapshots.
//!
//! Each projector copies every field of a native record into an owned
//! snapshot, running the value adapters and enumeration tables along the
//! way. A projected snapshot never aliases native memory; native mutation
//! or destruction after the projection cannot touch it.

use remora_rpc_core::{
    AlternativeSpeedLimitsDays, BridgeError, BridgeResult, RawFileRecord, RawPeerRecord,
    RawServerSettingsRecord, RawSessionStatsRecord, RawTorrentRecord, RawTrackerRecord,
};

use crate::adapt;
use crate::enummap;
use crate::model::{
    PeerSnapshot, ServerSettingsSnapshot, SessionStatsSnapshot, TorrentFileSnapshot,
    TorrentSnapshot, TrackerSnapshot,
};

/// Project a torrent record, including its tracker records.
///
/// # Errors
///
/// Returns an error for invalid text or an unmapped value in one of the
/// closed enumerations; status fields fall back to their sentinel instead.
pub fn project_torrent(record: RawTorrentRecord) -> BridgeResult<TorrentSnapshot> {
    let trackers = record
        .trackers
        .into_iter()
        .map(project_tracker)
        .collect::<BridgeResult<Vec<_>>>()?;
    Ok(TorrentSnapshot {
        id: record.id,
        hash: adapt::text_to_managed(&record.hash)?,
        name: adapt::text_to_managed(&record.name)?,
        status: enummap::TORRENT_STATUS.decode(record.status)?,
        error: enummap::RPC_ERROR.decode(record.error)?,
        error_string: adapt::text_to_managed(&record.error_string)?,
        percent_done: record.percent_done,
        recheck_progress: record.recheck_progress,
        total_size: record.total_size,
        completed_size: record.completed_size,
        left_until_done: record.left_until_done,
        size_when_done: record.size_when_done,
        download_speed: record.download_speed,
        upload_speed: record.upload_speed,
        eta_seconds: (record.eta_seconds >= 0).then_some(record.eta_seconds),
        ratio: record.ratio,
        ratio_limit_mode: enummap::RATIO_LIMIT_MODE.decode(record.ratio_limit_mode)?,
        ratio_limit: record.ratio_limit,
        idle_seeding_limit_mode: enummap::IDLE_SEEDING_LIMIT_MODE
            .decode(record.idle_seeding_limit_mode)?,
        idle_seeding_limit_minutes: record.idle_seeding_limit_minutes,
        seeders: record.seeders,
        leechers: record.leechers,
        peers_limit: record.peers_limit,
        honor_session_limits: record.honor_session_limits,
        bandwidth_priority: enummap::BANDWIDTH_PRIORITY.decode(record.bandwidth_priority)?,
        added_date: adapt::timestamp_to_managed(record.added_date_epoch),
        done_date: adapt::timestamp_to_managed(record.done_date_epoch),
        activity_date: adapt::timestamp_to_managed(record.activity_date_epoch),
        download_directory: adapt::text_to_managed(&record.download_directory)?,
        trackers,
    })
}

/// Project a file record.
///
/// # Errors
///
/// Returns an error for invalid text or an unmapped priority value.
pub fn project_file(record: RawFileRecord) -> BridgeResult<TorrentFileSnapshot> {
    let RawFileRecord {
        id,
        path,
        size,
        completed_size,
        wanted,
        priority,
    } = record;
    Ok(TorrentFileSnapshot {
        id,
        path: adapt::text_to_managed(&path)?,
        size,
        completed_size,
        wanted,
        priority: enummap::FILE_PRIORITY.decode(priority)?,
    })
}

/// Project a peer record.
///
/// # Errors
///
/// Returns an error for invalid text.
pub fn project_peer(record: RawPeerRecord) -> BridgeResult<PeerSnapshot> {
    let RawPeerRecord {
        address,
        client,
        flags,
        download_speed,
        upload_speed,
        progress,
    } = record;
    Ok(PeerSnapshot {
        address: adapt::text_to_managed(&address)?,
        client: adapt::text_to_managed(&client)?,
        flags: adapt::text_to_managed(&flags)?,
        download_speed,
        upload_speed,
        progress,
    })
}

/// Project a tracker record. Unknown announce states become
/// [`remora_rpc_core::TrackerStatus::Unknown`].
///
/// # Errors
///
/// Returns an error for invalid text.
pub fn project_tracker(record: RawTrackerRecord) -> BridgeResult<TrackerSnapshot> {
    let RawTrackerRecord {
        id,
        announce,
        tier,
        status,
        error_message,
        peers,
        next_update_epoch,
    } = record;
    Ok(TrackerSnapshot {
        id,
        announce: adapt::text_to_managed(&announce)?,
        tier,
        status: enummap::TRACKER_STATUS.decode(status)?,
        error_message: adapt::text_to_managed(&error_message)?,
        peers,
        next_update: adapt::timestamp_to_managed(next_update_epoch),
    })
}

/// Project a server settings record.
///
/// # Errors
///
/// Returns an error for invalid text, an out-of-range time of day, or an
/// unmapped encryption mode or schedule day bitmask.
pub fn project_server_settings(
    record: &RawServerSettingsRecord,
) -> BridgeResult<ServerSettingsSnapshot> {
    Ok(ServerSettingsSnapshot {
        download_directory: adapt::text_to_managed(&record.download_directory)?,
        start_added_torrents: record.start_added_torrents,
        trash_torrent_files: record.trash_torrent_files,
        rename_incomplete_files: record.rename_incomplete_files,
        incomplete_directory_enabled: record.incomplete_directory_enabled,
        incomplete_directory: adapt::text_to_managed(&record.incomplete_directory)?,
        ratio_limited: record.ratio_limited,
        ratio_limit: record.ratio_limit,
        idle_seeding_limited: record.idle_seeding_limited,
        idle_seeding_limit_minutes: record.idle_seeding_limit_minutes,
        download_queue_enabled: record.download_queue_enabled,
        download_queue_size: record.download_queue_size,
        seed_queue_enabled: record.seed_queue_enabled,
        seed_queue_size: record.seed_queue_size,
        download_speed_limited: record.download_speed_limited,
        download_speed_limit: record.download_speed_limit,
        upload_speed_limited: record.upload_speed_limited,
        upload_speed_limit: record.upload_speed_limit,
        alternative_speed_limits_enabled: record.alternative_speed_limits_enabled,
        alternative_download_speed_limit: record.alternative_download_speed_limit,
        alternative_upload_speed_limit: record.alternative_upload_speed_limit,
        alternative_speed_limits_scheduled: record.alternative_speed_limits_scheduled,
        alternative_speed_limits_begin_time: adapt::time_of_day_to_managed(
            record.alternative_speed_limits_begin_time_msecs,
        )?,
        alternative_speed_limits_end_time: adapt::time_of_day_to_managed(
            record.alternative_speed_limits_end_time_msecs,
        )?,
        alternative_speed_limits_days: AlternativeSpeedLimitsDays::from_mask(
            record.alternative_speed_limits_days,
        )
        .ok_or(BridgeError::Encoding {
            context: "alternative speed limit schedule set bits outside the seven days",
        })?,
        peer_port: record.peer_port,
        random_port_enabled: record.random_port_enabled,
        port_forwarding_enabled: record.port_forwarding_enabled,
        encryption_mode: enummap::ENCRYPTION_MODE.decode(record.encryption_mode)?,
        utp_enabled: record.utp_enabled,
        pex_enabled: record.pex_enabled,
        dht_enabled: record.dht_enabled,
        lpd_enabled: record.lpd_enabled,
        maximum_peers_per_torrent: record.maximum_peers_per_torrent,
        maximum_peers_globally: record.maximum_peers_globally,
    })
}

/// Project a session statistics record. Total.
#[must_use]
pub fn project_session_stats(record: RawSessionStatsRecord) -> SessionStatsSnapshot {
    SessionStatsSnapshot {
        downloaded_bytes: record.downloaded_bytes,
        uploaded_bytes: record.uploaded_bytes,
        files_added: record.files_added,
        session_count: record.session_count,
        seconds_active: record.seconds_active,
    }
}

#[cfg(test)]
mod tests {
    use remora_rpc_core::{
        BandwidthPriority, BridgeError, RawText, RpcError, TorrentStatus, TrackerStatus,
    };

    use super::*;

    fn torrent_record() -> RawTorrentRecord {
        RawTorrentRecord {
            id: 7,
            hash: RawText::from("a94a8fe5ccb19ba61c4c0873d391e987982fbbd3"),
            name: RawText::from("Fedora-Workstation-Live.iso"),
            status: 1,
            error: 0,
            error_string: RawText::default(),
            percent_done: 0.25,
            total_size: 2_000_000_000,
            completed_size: 500_000_000,
            left_until_done: 1_500_000_000,
            size_when_done: 2_000_000_000,
            download_speed: 1_048_576,
            eta_seconds: 1_431,
            bandwidth_priority: -1,
            added_date_epoch: 1_700_000_000,
            done_date_epoch: -1,
            activity_date_epoch: 1_700_000_100,
            download_directory: RawText::from("/srv/downloads"),
            trackers: vec![RawTrackerRecord {
                id: 0,
                announce: RawText::from("https://tracker.example.org/announce"),
                tier: 0,
                status: 1,
                error_message: RawText::default(),
                peers: 42,
                next_update_epoch: 1_700_000_300,
            }],
            ..RawTorrentRecord::default()
        }
    }

    #[test]
    fn torrent_projection_copies_every_field() {
        let snapshot = project_torrent(torrent_record()).expect("projection succeeds");
        assert_eq!(snapshot.id(), 7);
        assert_eq!(snapshot.name(), "Fedora-Workstation-Live.iso");
        assert_eq!(snapshot.status(), TorrentStatus::Downloading);
        assert_eq!(snapshot.error(), RpcError::NoError);
        assert_eq!(snapshot.eta_seconds(), Some(1_431));
        assert_eq!(snapshot.bandwidth_priority(), BandwidthPriority::Low);
        assert!(snapshot.done_date().is_none());
        assert_eq!(
            snapshot.added_date().expect("added date set").timestamp(),
            1_700_000_000
        );
        assert_eq!(snapshot.trackers().len(), 1);
        assert_eq!(snapshot.trackers()[0].status(), TrackerStatus::Active);
    }

    #[test]
    fn snapshot_outlives_the_native_record() {
        let record = torrent_record();
        let snapshot = project_torrent(record.clone()).expect("projection succeeds");
        // The record the snapshot was projected from is gone; the snapshot
        // still owns all of its data.
        drop(record);
        assert_eq!(snapshot.hash(), "a94a8fe5ccb19ba61c4c0873d391e987982fbbd3");
    }

    #[test]
    fn negative_eta_means_unknown() {
        let mut record = torrent_record();
        record.eta_seconds = -1;
        let snapshot = project_torrent(record).expect("projection succeeds");
        assert!(snapshot.eta_seconds().is_none());
    }

    #[test]
    fn unknown_torrent_status_projects_to_the_sentinel() {
        let mut record = torrent_record();
        record.status = 77;
        let snapshot = project_torrent(record).expect("sentinel policy");
        assert_eq!(snapshot.status(), TorrentStatus::Unknown);
    }

    #[test]
    fn unmapped_closed_enum_fails_the_projection() {
        let mut record = torrent_record();
        record.bandwidth_priority = 9;
        match project_torrent(record) {
            Err(BridgeError::UnmappedEnumValue { enumeration, value }) => {
                assert_eq!(enumeration, "BandwidthPriority");
                assert_eq!(value, 9);
            }
            other => panic!("expected unmapped enum error, got {other:?}"),
        }
    }

    #[test]
    fn file_and_peer_projection() {
        let file = project_file(RawFileRecord {
            id: 2,
            path: RawText::from("iso/disc1.iso"),
            size: 700_000_000,
            completed_size: 700_000_000,
            wanted: true,
            priority: 1,
        })
        .expect("projection succeeds");
        assert_eq!(file.path(), "iso/disc1.iso");
        assert_eq!(
            file.priority(),
            remora_rpc_core::FilePriority::High
        );

        let peer = project_peer(RawPeerRecord {
            address: RawText::from("203.0.113.9:51413"),
            client: RawText::from("Transmission 4.0.5"),
            flags: RawText::from("UEI"),
            download_speed: 2_048,
            upload_speed: 512,
            progress: 0.9,
        })
        .expect("projection succeeds");
        assert_eq!(peer.address(), "203.0.113.9:51413");
        assert_eq!(peer.client(), "Transmission 4.0.5");
    }

    #[test]
    fn settings_projection_converts_schedule_times() {
        let record = RawServerSettingsRecord {
            download_directory: RawText::from("/srv/downloads"),
            alternative_speed_limits_begin_time_msecs: 22 * 60 * 60_000,
            alternative_speed_limits_end_time_msecs: 6 * 60 * 60_000 + 30 * 60_000,
            alternative_speed_limits_days: 127,
            encryption_mode: 1,
            peer_port: 51_413,
            ..RawServerSettingsRecord::default()
        };
        let snapshot = project_server_settings(&record).expect("projection succeeds");
        assert_eq!(snapshot.alternative_speed_limits_begin_time().hour(), 22);
        assert_eq!(snapshot.alternative_speed_limits_end_time().minute(), 30);
        assert_eq!(
            snapshot.alternative_speed_limits_days(),
            AlternativeSpeedLimitsDays::ALL
        );
        assert_eq!(
            snapshot.encryption_mode(),
            remora_rpc_core::EncryptionMode::Preferred
        );
        assert_eq!(snapshot.peer_port(), 51_413);
    }

    #[test]
    fn settings_projection_keeps_unusual_day_masks() {
        // Monday | Tuesday, a combination with no named constant.
        let record = RawServerSettingsRecord {
            alternative_speed_limits_days: 6,
            ..RawServerSettingsRecord::default()
        };
        let snapshot = project_server_settings(&record).expect("projection succeeds");
        assert_eq!(snapshot.alternative_speed_limits_days().mask(), 6);
        assert!(
            snapshot
                .alternative_speed_limits_days()
                .contains(AlternativeSpeedLimitsDays::MONDAY)
        );

        let record = RawServerSettingsRecord {
            alternative_speed_limits_days: 1 << 9,
            ..RawServerSettingsRecord::default()
        };
        match project_server_settings(&record) {
            Err(BridgeError::Encoding { context }) => {
                assert!(context.contains("schedule"));
            }
            other => panic!("expected encoding error, got {other:?}"),
        }
    }

    #[test]
    fn stats_projection_is_field_for_field() {
        let stats = project_session_stats(RawSessionStatsRecord {
            downloaded_bytes: 10,
            uploaded_bytes: 20,
            files_added: 3,
            session_count: 4,
            seconds_active: 5,
        });
        assert_eq!(stats.downloaded_bytes(), 10);
        assert_eq!(stats.uploaded_bytes(), 20);
        assert_eq!(stats.files_added(), 3);
        assert_eq!(stats.session_count(), 4);
        assert_eq!(stats.seconds_active(), 5);
    }
}
