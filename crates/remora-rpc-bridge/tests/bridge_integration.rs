//! End-to-end bridge behaviour against a scripted native session.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::time::{sleep, timeout};

use remora_rpc_bridge::{
    NotificationSink, ServerSettingsUpdate, ServerSettingsSnapshot, Session, SessionOptions,
    SessionStatsSnapshot, TorrentSnapshot,
};
use remora_rpc_core::{
    BandwidthPriority, BridgeError, ConnectionState, RawEvent, RawSettingsMutation, RawText,
    RecordBuffer, RpcError, TimeOfDay, TorrentStatus,
};
use remora_test_support::{NativeCall, ScriptedNativeSession, fixtures};

fn fast_options() -> SessionOptions {
    SessionOptions {
        poll_interval: Duration::from_millis(10),
    }
}

async fn wait_until(what: &str, condition: impl Fn() -> bool) {
    timeout(Duration::from_secs(2), async {
        while !condition() {
            sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .unwrap_or_else(|_| panic!("timed out waiting for {what}"));
}

#[derive(Debug, Clone, PartialEq)]
enum Observed {
    ConnectionState(ConnectionState),
    Error(RpcError, String, String),
    TorrentsUpdated {
        removed_ids: Vec<i32>,
        changed: Vec<TorrentSnapshot>,
        added: Vec<TorrentSnapshot>,
    },
    SettingsChanged(ServerSettingsSnapshot),
    StatsUpdated {
        download_speed: i64,
        upload_speed: i64,
        current: SessionStatsSnapshot,
        total: SessionStatsSnapshot,
    },
    TorrentAdded(i32, String, String),
    TorrentFinished(i32, String, String),
    TorrentAddDuplicate,
    TorrentAddError,
    TorrentFileRenamed(i32, String, String),
    DownloadDirFreeSpace(i64),
    FreeSpaceChecked(String, bool, i64),
}

#[derive(Default)]
struct RecordingSink {
    observed: Mutex<Vec<Observed>>,
}

impl RecordingSink {
    fn observed(&self) -> MutexGuard<'_, Vec<Observed>> {
        self.observed.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn len(&self) -> usize {
        self.observed().len()
    }
}

impl NotificationSink for RecordingSink {
    fn connection_state_changed(&self, state: ConnectionState) {
        self.observed().push(Observed::ConnectionState(state));
    }

    fn error_changed(&self, error: RpcError, message: &str, detailed_message: &str) {
        self.observed().push(Observed::Error(
            error,
            message.to_owned(),
            detailed_message.to_owned(),
        ));
    }

    fn torrents_updated(
        &self,
        removed_ids: &[i32],
        changed: Vec<TorrentSnapshot>,
        added: Vec<TorrentSnapshot>,
    ) {
        self.observed().push(Observed::TorrentsUpdated {
            removed_ids: removed_ids.to_vec(),
            changed,
            added,
        });
    }

    fn server_settings_changed(&self, settings: ServerSettingsSnapshot) {
        self.observed().push(Observed::SettingsChanged(settings));
    }

    fn server_stats_updated(
        &self,
        download_speed: i64,
        upload_speed: i64,
        current: SessionStatsSnapshot,
        total: SessionStatsSnapshot,
    ) {
        self.observed().push(Observed::StatsUpdated {
            download_speed,
            upload_speed,
            current,
            total,
        });
    }

    fn torrent_added(&self, id: i32, hash: &str, name: &str) {
        self.observed()
            .push(Observed::TorrentAdded(id, hash.to_owned(), name.to_owned()));
    }

    fn torrent_finished(&self, id: i32, hash: &str, name: &str) {
        self.observed().push(Observed::TorrentFinished(
            id,
            hash.to_owned(),
            name.to_owned(),
        ));
    }

    fn torrent_add_duplicate(&self) {
        self.observed().push(Observed::TorrentAddDuplicate);
    }

    fn torrent_add_error(&self) {
        self.observed().push(Observed::TorrentAddError);
    }

    fn torrent_file_renamed(&self, torrent_id: i32, file_path: &str, new_name: &str) {
        self.observed().push(Observed::TorrentFileRenamed(
            torrent_id,
            file_path.to_owned(),
            new_name.to_owned(),
        ));
    }

    fn download_dir_free_space_checked(&self, bytes: i64) {
        self.observed().push(Observed::DownloadDirFreeSpace(bytes));
    }

    fn free_space_checked(&self, path: &str, success: bool, bytes: i64) {
        self.observed()
            .push(Observed::FreeSpaceChecked(path.to_owned(), success, bytes));
    }
}

#[tokio::test]
async fn notifications_arrive_projected_and_in_order() {
    let (native, script) = ScriptedNativeSession::new();
    let session = Session::new(Box::new(native), &fast_options()).expect("session starts");
    let sink = Arc::new(RecordingSink::default());
    session.set_notification_sink(Arc::clone(&sink) as Arc<dyn NotificationSink>);
    session.connect().await.expect("connect enqueued");

    script.push_events(vec![
        RawEvent::ConnectionStateChanged { state: 2 },
        RawEvent::TorrentsUpdated {
            removed_ids: vec![4],
            changed: RecordBuffer::default(),
            added: RecordBuffer::new(vec![
                fixtures::torrent_record(7, "distro.iso"),
                fixtures::torrent_record(8, "dataset.tar"),
                fixtures::torrent_record(9, "soundtrack.flac"),
            ]),
        },
        RawEvent::ServerSettingsChanged {
            settings: Box::new(fixtures::server_settings_record()),
        },
        RawEvent::ServerStatsUpdated {
            download_speed: 1_000,
            upload_speed: 500,
            current: fixtures::session_stats_record(),
            total: fixtures::session_stats_record(),
        },
        RawEvent::TorrentFinished {
            id: 7,
            hash: RawText::from("a94a8fe5ccb19ba61c4c0873d391e987982fbbd3"),
            name: RawText::from("distro.iso"),
        },
        RawEvent::FreeSpaceChecked {
            path: RawText::from("/srv/downloads"),
            success: true,
            bytes: 9_000_000_000,
        },
    ]);

    wait_until("all notifications", || sink.len() == 6).await;
    let observed = sink.observed().clone();

    assert_eq!(
        observed[0],
        Observed::ConnectionState(ConnectionState::Connected)
    );
    match &observed[1] {
        Observed::TorrentsUpdated {
            removed_ids,
            changed,
            added,
        } => {
            assert_eq!(removed_ids, &[4]);
            assert!(changed.is_empty());
            assert_eq!(added.len(), 3);
            let names: Vec<(i32, &str)> = added
                .iter()
                .map(|torrent| (torrent.id(), torrent.name()))
                .collect();
            assert_eq!(
                names,
                vec![
                    (7, "distro.iso"),
                    (8, "dataset.tar"),
                    (9, "soundtrack.flac"),
                ]
            );
            assert_eq!(added[0].status(), TorrentStatus::Downloading);
        }
        other => panic!("unexpected notification {other:?}"),
    }
    match &observed[2] {
        Observed::SettingsChanged(settings) => {
            assert_eq!(settings.peer_port(), 51_413);
            assert_eq!(settings.alternative_speed_limits_begin_time().hour(), 22);
        }
        other => panic!("unexpected notification {other:?}"),
    }
    match &observed[3] {
        Observed::StatsUpdated {
            download_speed,
            current,
            ..
        } => {
            assert_eq!(*download_speed, 1_000);
            assert_eq!(current.files_added(), 17);
        }
        other => panic!("unexpected notification {other:?}"),
    }
    assert!(matches!(
        &observed[4],
        Observed::TorrentFinished(7, _, name) if name == "distro.iso"
    ));
    assert_eq!(
        observed[5],
        Observed::FreeSpaceChecked("/srv/downloads".to_owned(), true, 9_000_000_000)
    );
}

#[tokio::test]
async fn commands_reach_the_native_session_in_native_representation() {
    let (native, script) = ScriptedNativeSession::new();
    let session = Session::new(Box::new(native), &fast_options()).expect("session starts");

    session.connect().await.expect("connect enqueued");
    session
        .add_torrent_link(
            "magnet:?xt=urn:btih:abc",
            "/srv/downloads",
            BandwidthPriority::High,
            true,
        )
        .await
        .expect("add enqueued");
    session
        .update_server_settings(ServerSettingsUpdate::AlternativeSpeedLimitsBeginTime(
            TimeOfDay::new(22, 0).expect("valid time"),
        ))
        .await
        .expect("settings update enqueued");
    session
        .remove_torrents(vec![3, 9], true)
        .await
        .expect("remove enqueued");
    session
        .request_download_dir_free_space()
        .await
        .expect("free space query enqueued");

    wait_until("all commands", || script.call_count() == 5).await;
    assert_eq!(
        script.calls(),
        vec![
            NativeCall::Connect,
            NativeCall::AddTorrentLink {
                link: RawText::from("magnet:?xt=urn:btih:abc"),
                download_directory: RawText::from("/srv/downloads"),
                bandwidth_priority: 1,
                start: true,
            },
            NativeCall::SetSessionSetting(RawSettingsMutation::AlternativeSpeedLimitsBeginTime(
                22 * 60 * 60_000,
            )),
            NativeCall::RemoveTorrents {
                ids: vec![3, 9],
                delete_files: true,
            },
            NativeCall::RequestDownloadDirFreeSpace,
        ]
    );
}

#[tokio::test]
async fn add_and_rename_results_come_back_through_the_sink() {
    let (native, script) = ScriptedNativeSession::new();
    let session = Session::new(Box::new(native), &fast_options()).expect("session starts");
    let sink = Arc::new(RecordingSink::default());
    session.set_notification_sink(Arc::clone(&sink) as Arc<dyn NotificationSink>);

    script.push_events(vec![
        RawEvent::ErrorChanged {
            error: 2,
            message: RawText::from("connection failed"),
            detailed_message: RawText::from("TLS handshake refused by peer"),
        },
        RawEvent::TorrentAddDuplicate,
        RawEvent::TorrentAddError,
        RawEvent::TorrentFileRenamed {
            torrent_id: 7,
            file_path: RawText::from("iso/disc1.iso"),
            new_name: RawText::from("disc_one.iso"),
        },
        RawEvent::DownloadDirFreeSpaceChecked {
            bytes: 4_000_000_000,
        },
    ]);

    wait_until("all notifications", || sink.len() == 5).await;
    assert_eq!(
        *sink.observed(),
        vec![
            Observed::Error(
                RpcError::ConnectionError,
                "connection failed".to_owned(),
                "TLS handshake refused by peer".to_owned(),
            ),
            Observed::TorrentAddDuplicate,
            Observed::TorrentAddError,
            Observed::TorrentFileRenamed(7, "iso/disc1.iso".to_owned(), "disc_one.iso".to_owned()),
            Observed::DownloadDirFreeSpace(4_000_000_000),
        ]
    );
}

#[tokio::test]
async fn a_failed_projection_drops_only_that_notification() {
    let (native, script) = ScriptedNativeSession::new();
    let session = Session::new(Box::new(native), &fast_options()).expect("session starts");
    let sink = Arc::new(RecordingSink::default());
    session.set_notification_sink(Arc::clone(&sink) as Arc<dyn NotificationSink>);

    script.push_events(vec![
        // 99 is not a known RpcError value and the table fails fast.
        RawEvent::ErrorChanged {
            error: 99,
            message: RawText::from("bogus"),
            detailed_message: RawText::from(""),
        },
        RawEvent::TorrentAdded {
            id: 1,
            hash: RawText::from("feed"),
            name: RawText::from("kept.iso"),
        },
    ]);

    wait_until("surviving notification", || sink.len() == 1).await;
    assert!(matches!(
        &sink.observed()[0],
        Observed::TorrentAdded(1, _, name) if name == "kept.iso"
    ));
}

#[tokio::test]
async fn a_failed_native_command_does_not_stop_the_worker() {
    let (native, script) = ScriptedNativeSession::new();
    let session = Session::new(Box::new(native), &fast_options()).expect("session starts");

    script.fail_next_command();
    session.connect().await.expect("connect enqueued");
    session.disconnect().await.expect("disconnect enqueued");

    wait_until("follow-up command", || {
        script.calls().contains(&NativeCall::Disconnect)
    })
    .await;
    // The failed connect was never recorded.
    assert_eq!(script.calls(), vec![NativeCall::Disconnect]);
}

#[tokio::test]
async fn release_stops_delivery_and_commands() {
    let (native, script) = ScriptedNativeSession::new();
    let session = Session::new(Box::new(native), &fast_options()).expect("session starts");
    let sink = Arc::new(RecordingSink::default());
    session.set_notification_sink(Arc::clone(&sink) as Arc<dyn NotificationSink>);

    session.release();

    script.push_events(vec![RawEvent::ConnectionStateChanged { state: 2 }]);
    sleep(Duration::from_millis(100)).await;
    assert_eq!(sink.len(), 0);

    match session.connect().await {
        Err(BridgeError::TransferInvariant { context }) => {
            assert_eq!(context, "session handle used after release");
        }
        other => panic!("expected lifecycle violation, got {other:?}"),
    }
}

#[tokio::test]
async fn replacing_the_sink_routes_later_notifications_to_the_new_one() {
    let (native, script) = ScriptedNativeSession::new();
    let session = Session::new(Box::new(native), &fast_options()).expect("session starts");

    let first = Arc::new(RecordingSink::default());
    session.set_notification_sink(Arc::clone(&first) as Arc<dyn NotificationSink>);
    script.push_events(vec![RawEvent::ConnectionStateChanged { state: 1 }]);
    wait_until("first sink notification", || first.len() == 1).await;

    let second = Arc::new(RecordingSink::default());
    session.set_notification_sink(Arc::clone(&second) as Arc<dyn NotificationSink>);
    script.push_events(vec![RawEvent::ConnectionStateChanged { state: 2 }]);
    wait_until("second sink notification", || second.len() == 1).await;

    assert_eq!(
        *first.observed(),
        vec![Observed::ConnectionState(ConnectionState::Connecting)]
    );
    assert_eq!(
        *second.observed(),
        vec![Observed::ConnectionState(ConnectionState::Connected)]
    );
}

struct OverlapDetector {
    in_callback: AtomicBool,
    overlapped: AtomicBool,
    seen: std::sync::atomic::AtomicUsize,
}

impl NotificationSink for OverlapDetector {
    fn about_to_disconnect(&self) {
        if self.in_callback.swap(true, Ordering::SeqCst) {
            self.overlapped.store(true, Ordering::SeqCst);
        }
        std::thread::sleep(Duration::from_millis(2));
        self.in_callback.store(false, Ordering::SeqCst);
        self.seen.fetch_add(1, Ordering::SeqCst);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn callbacks_never_overlap() {
    let (native, script) = ScriptedNativeSession::new();
    let session = Session::new(Box::new(native), &fast_options()).expect("session starts");
    let sink = Arc::new(OverlapDetector {
        in_callback: AtomicBool::new(false),
        overlapped: AtomicBool::new(false),
        seen: std::sync::atomic::AtomicUsize::new(0),
    });
    session.set_notification_sink(Arc::clone(&sink) as Arc<dyn NotificationSink>);

    for _ in 0..5 {
        script.push_events(vec![
            RawEvent::AboutToDisconnect,
            RawEvent::AboutToDisconnect,
        ]);
    }

    wait_until("all deliveries", || {
        sink.seen.load(Ordering::SeqCst) == 10
    })
    .await;
    assert!(!sink.overlapped.load(Ordering::SeqCst));
}
