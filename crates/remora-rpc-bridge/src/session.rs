#![allow(clippy::redundant_closure_for_method_calls)]

//! The one mutable handle over the native RPC client.
//!
//! A [`Session`] owns a background worker that drives the native client
//! and delivers notifications to the installed sink. Command methods
//! enqueue and return; failures the native side reports later surface
//! through the sink as an error change. Releasing the session revokes
//! delivery synchronously: once [`Session::release`] returns, no callback
//! is running and none will start.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::mpsc;

use remora_rpc_core::{
    BandwidthPriority, BridgeError, BridgeResult, NativeSession, RawBuffer,
};

use crate::adapt;
use crate::command::{ServerSettingsUpdate, SessionCommand};
use crate::enummap;
use crate::registry;
use crate::sink::NotificationSink;
use crate::worker;

const COMMAND_QUEUE_DEPTH: usize = 64;

/// Construction options for a [`Session`].
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Interval between native notification drains.
    pub poll_interval: Duration,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(200),
        }
    }
}

/// State shared between the session handle and its worker.
pub(crate) struct SessionShared {
    revoked: AtomicBool,
    /// Sink slot and delivery gate in one: the worker holds this lock for
    /// the duration of every callback, so whoever acquires it after
    /// revoking has waited out any in-flight delivery.
    sink: Mutex<Option<Arc<dyn NotificationSink>>>,
}

impl SessionShared {
    fn new() -> Self {
        Self {
            revoked: AtomicBool::new(false),
            sink: Mutex::new(None),
        }
    }

    fn slot(&self) -> MutexGuard<'_, Option<Arc<dyn NotificationSink>>> {
        self.sink.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn is_revoked(&self) -> bool {
        self.revoked.load(Ordering::Acquire)
    }

    /// Deliver one callback under the delivery gate.
    ///
    /// Holding the lock across the call serializes callbacks and lets
    /// [`SessionShared::revoke`] block until an in-flight one returns.
    pub(crate) fn deliver(&self, callback: impl FnOnce(&dyn NotificationSink)) {
        let slot = self.slot();
        if self.is_revoked() {
            return;
        }
        if let Some(sink) = slot.as_ref() {
            callback(sink.as_ref());
        }
    }

    fn install(&self, sink: Arc<dyn NotificationSink>) {
        let mut slot = self.slot();
        if !self.is_revoked() {
            *slot = Some(sink);
        }
    }

    fn clear(&self) {
        *self.slot() = None;
    }

    fn revoke(&self) {
        self.revoked.store(true, Ordering::Release);
        // Acquiring the slot waits out an in-flight callback; dropping the
        // sink here guarantees nothing can start one afterwards.
        *self.slot() = None;
    }
}

/// Handle over one native RPC client session.
pub struct Session {
    commands: mpsc::Sender<SessionCommand>,
    shared: Arc<SessionShared>,
}

impl Session {
    /// Validate the binding registry and start the session worker.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::RegistryValidation`] when the builtin
    /// registration set is inconsistent; no worker is started in that case.
    pub fn new(native: Box<dyn NativeSession>, options: &SessionOptions) -> BridgeResult<Self> {
        registry::validate_builtin()?;
        let (tx, rx) = mpsc::channel(COMMAND_QUEUE_DEPTH);
        let shared = Arc::new(SessionShared::new());
        worker::spawn(native, rx, Arc::clone(&shared), options.poll_interval);
        Ok(Self {
            commands: tx,
            shared,
        })
    }

    /// Install the notification sink, replacing any previous one.
    ///
    /// Callbacks already in flight complete against the old sink; the next
    /// delivery uses the new one.
    pub fn set_notification_sink(&self, sink: Arc<dyn NotificationSink>) {
        self.shared.install(sink);
    }

    /// Remove the notification sink. Deliveries become no-ops until a new
    /// sink is installed.
    pub fn clear_notification_sink(&self) {
        self.shared.clear();
    }

    /// Revoke the session.
    ///
    /// Blocks until any in-flight callback returns. Afterwards no callback
    /// runs, no new one starts, and every command method fails.
    pub fn release(&self) {
        self.shared.revoke();
    }

    /// Whether the session has been released.
    #[must_use]
    pub fn is_released(&self) -> bool {
        self.shared.is_revoked()
    }

    /// Open the connection to the configured server.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::TransferInvariant`] when the session has been
    /// released and [`BridgeError::CommandFailed`] when the worker is gone.
    pub async fn connect(&self) -> BridgeResult<()> {
        self.enqueue(SessionCommand::Connect).await
    }

    /// Close the connection.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::TransferInvariant`] when the session has been
    /// released and [`BridgeError::CommandFailed`] when the worker is gone.
    pub async fn disconnect(&self) -> BridgeResult<()> {
        self.enqueue(SessionCommand::Disconnect).await
    }

    /// Suspend or resume periodic data updates.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::TransferInvariant`] when the session has been
    /// released and [`BridgeError::CommandFailed`] when the worker is gone.
    pub async fn set_update_disabled(&self, disabled: bool) -> BridgeResult<()> {
        self.enqueue(SessionCommand::SetUpdateDisabled(disabled))
            .await
    }

    /// Start the given torrents.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::TransferInvariant`] when the session has been
    /// released and [`BridgeError::CommandFailed`] when the worker is gone.
    pub async fn start_torrents(&self, ids: Vec<i32>) -> BridgeResult<()> {
        self.enqueue(SessionCommand::StartTorrents(ids)).await
    }

    /// Start the given torrents, bypassing the queue.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::TransferInvariant`] when the session has been
    /// released and [`BridgeError::CommandFailed`] when the worker is gone.
    pub async fn start_torrents_now(&self, ids: Vec<i32>) -> BridgeResult<()> {
        self.enqueue(SessionCommand::StartTorrentsNow(ids)).await
    }

    /// Pause the given torrents.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::TransferInvariant`] when the session has been
    /// released and [`BridgeError::CommandFailed`] when the worker is gone.
    pub async fn pause_torrents(&self, ids: Vec<i32>) -> BridgeResult<()> {
        self.enqueue(SessionCommand::PauseTorrents(ids)).await
    }

    /// Remove the given torrents, optionally deleting their data.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::TransferInvariant`] when the session has been
    /// released and [`BridgeError::CommandFailed`] when the worker is gone.
    pub async fn remove_torrents(&self, ids: Vec<i32>, delete_files: bool) -> BridgeResult<()> {
        self.enqueue(SessionCommand::RemoveTorrents { ids, delete_files })
            .await
    }

    /// Queue a hash check for the given torrents.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::TransferInvariant`] when the session has been
    /// released and [`BridgeError::CommandFailed`] when the worker is gone.
    pub async fn verify_torrents(&self, ids: Vec<i32>) -> BridgeResult<()> {
        self.enqueue(SessionCommand::VerifyTorrents(ids)).await
    }

    /// Force a tracker reannounce for the given torrents.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::TransferInvariant`] when the session has been
    /// released and [`BridgeError::CommandFailed`] when the worker is gone.
    pub async fn reannounce_torrents(&self, ids: Vec<i32>) -> BridgeResult<()> {
        self.enqueue(SessionCommand::ReannounceTorrents(ids)).await
    }

    /// Add a torrent from a magnet link or URL.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::TransferInvariant`] when the session has been
    /// released and [`BridgeError::CommandFailed`] when the worker is gone.
    pub async fn add_torrent_link(
        &self,
        link: &str,
        download_directory: &str,
        bandwidth_priority: BandwidthPriority,
        start: bool,
    ) -> BridgeResult<()> {
        self.enqueue(SessionCommand::AddTorrentLink {
            link: adapt::text_from_managed(link),
            download_directory: adapt::text_from_managed(download_directory),
            bandwidth_priority: enummap::BANDWIDTH_PRIORITY.encode(bandwidth_priority),
            start,
        })
        .await
    }

    /// Add a torrent from metainfo bytes with initial file selection.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::TransferInvariant`] when the session has been
    /// released and [`BridgeError::CommandFailed`] when the worker is gone.
    #[allow(clippy::too_many_arguments)]
    pub async fn add_torrent_file(
        &self,
        metainfo: Vec<u8>,
        download_directory: &str,
        unwanted_files: Vec<i32>,
        high_priority_files: Vec<i32>,
        low_priority_files: Vec<i32>,
        bandwidth_priority: BandwidthPriority,
        start: bool,
    ) -> BridgeResult<()> {
        self.enqueue(SessionCommand::AddTorrentFile {
            metainfo: RawBuffer(metainfo),
            download_directory: adapt::text_from_managed(download_directory),
            unwanted_files,
            high_priority_files,
            low_priority_files,
            bandwidth_priority: enummap::BANDWIDTH_PRIORITY.encode(bandwidth_priority),
            start,
        })
        .await
    }

    /// Move the given torrents to a new location.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::TransferInvariant`] when the session has been
    /// released and [`BridgeError::CommandFailed`] when the worker is gone.
    pub async fn set_torrents_location(
        &self,
        ids: Vec<i32>,
        location: &str,
        move_files: bool,
    ) -> BridgeResult<()> {
        self.enqueue(SessionCommand::SetTorrentsLocation {
            ids,
            location: adapt::text_from_managed(location),
            move_files,
        })
        .await
    }

    /// Rename a file within a torrent.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::TransferInvariant`] when the session has been
    /// released and [`BridgeError::CommandFailed`] when the worker is gone.
    pub async fn rename_torrent_file(
        &self,
        torrent_id: i32,
        file_path: &str,
        new_name: &str,
    ) -> BridgeResult<()> {
        self.enqueue(SessionCommand::RenameTorrentFile {
            torrent_id,
            file_path: adapt::text_from_managed(file_path),
            new_name: adapt::text_from_managed(new_name),
        })
        .await
    }

    /// Query free space for a path; the result arrives through the sink.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::TransferInvariant`] when the session has been
    /// released and [`BridgeError::CommandFailed`] when the worker is gone.
    pub async fn request_free_space(&self, path: &str) -> BridgeResult<()> {
        self.enqueue(SessionCommand::RequestFreeSpace(adapt::text_from_managed(
            path,
        )))
        .await
    }

    /// Query free space in the download directory; the result arrives
    /// through the sink.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::TransferInvariant`] when the session has been
    /// released and [`BridgeError::CommandFailed`] when the worker is gone.
    pub async fn request_download_dir_free_space(&self) -> BridgeResult<()> {
        self.enqueue(SessionCommand::RequestDownloadDirFreeSpace).await
    }

    /// Apply one server settings change.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::TransferInvariant`] when the session has been
    /// released and [`BridgeError::CommandFailed`] when the worker is gone.
    pub async fn update_server_settings(&self, update: ServerSettingsUpdate) -> BridgeResult<()> {
        self.enqueue(SessionCommand::SetSessionSetting(update.into_native()))
            .await
    }

    async fn enqueue(&self, command: SessionCommand) -> BridgeResult<()> {
        let operation = command.operation();
        if self.shared.is_revoked() {
            return Err(BridgeError::TransferInvariant {
                context: "session handle used after release",
            });
        }
        self.commands
            .send(command)
            .await
            .map_err(|_| BridgeError::CommandFailed {
                operation,
                source: "session worker is gone".into(),
            })
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.shared.revoke();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use anyhow::Result;
    use async_trait::async_trait;
    use remora_rpc_core::{RawEvent, RawSettingsMutation, RawText};

    use super::*;

    #[derive(Default)]
    struct IdleNativeSession;

    #[async_trait]
    impl NativeSession for IdleNativeSession {
        async fn connect(&mut self) -> Result<()> {
            Ok(())
        }
        async fn disconnect(&mut self) -> Result<()> {
            Ok(())
        }
        async fn set_update_disabled(&mut self, _disabled: bool) -> Result<()> {
            Ok(())
        }
        async fn start_torrents(&mut self, _ids: &[i32]) -> Result<()> {
            Ok(())
        }
        async fn start_torrents_now(&mut self, _ids: &[i32]) -> Result<()> {
            Ok(())
        }
        async fn pause_torrents(&mut self, _ids: &[i32]) -> Result<()> {
            Ok(())
        }
        async fn remove_torrents(&mut self, _ids: &[i32], _delete_files: bool) -> Result<()> {
            Ok(())
        }
        async fn verify_torrents(&mut self, _ids: &[i32]) -> Result<()> {
            Ok(())
        }
        async fn reannounce_torrents(&mut self, _ids: &[i32]) -> Result<()> {
            Ok(())
        }
        async fn add_torrent_link(
            &mut self,
            _link: RawText,
            _download_directory: RawText,
            _bandwidth_priority: i32,
            _start: bool,
        ) -> Result<()> {
            Ok(())
        }
        async fn add_torrent_file(
            &mut self,
            _metainfo: RawBuffer,
            _download_directory: RawText,
            _unwanted_files: &[i32],
            _high_priority_files: &[i32],
            _low_priority_files: &[i32],
            _bandwidth_priority: i32,
            _start: bool,
        ) -> Result<()> {
            Ok(())
        }
        async fn set_torrents_location(
            &mut self,
            _ids: &[i32],
            _location: RawText,
            _move_files: bool,
        ) -> Result<()> {
            Ok(())
        }
        async fn rename_torrent_file(
            &mut self,
            _torrent_id: i32,
            _file_path: RawText,
            _new_name: RawText,
        ) -> Result<()> {
            Ok(())
        }
        async fn request_free_space(&mut self, _path: RawText) -> Result<()> {
            Ok(())
        }
        async fn request_download_dir_free_space(&mut self) -> Result<()> {
            Ok(())
        }
        async fn set_session_setting(&mut self, _mutation: RawSettingsMutation) -> Result<()> {
            Ok(())
        }
        async fn poll_events(&mut self) -> Result<Vec<RawEvent>> {
            Ok(Vec::new())
        }
    }

    struct CountingSink {
        delivered: AtomicUsize,
    }

    impl NotificationSink for CountingSink {
        fn about_to_disconnect(&self) {
            self.delivered.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[tokio::test]
    async fn commands_fail_after_release() {
        let session = Session::new(
            Box::new(IdleNativeSession),
            &SessionOptions::default(),
        )
        .expect("session starts");
        session.connect().await.expect("command accepted");

        session.release();
        assert!(session.is_released());
        match session.connect().await {
            Err(BridgeError::TransferInvariant { context }) => {
                assert_eq!(context, "session handle used after release");
            }
            other => panic!("expected lifecycle violation, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn delivery_stops_once_revoked() {
        let shared = SessionShared::new();
        let sink = Arc::new(CountingSink {
            delivered: AtomicUsize::new(0),
        });
        shared.install(Arc::clone(&sink) as Arc<dyn NotificationSink>);

        shared.deliver(|sink| sink.about_to_disconnect());
        assert_eq!(sink.delivered.load(Ordering::SeqCst), 1);

        shared.revoke();
        shared.deliver(|sink| sink.about_to_disconnect());
        assert_eq!(sink.delivered.load(Ordering::SeqCst), 1);
    }

    struct GatedSink {
        entered: std::sync::mpsc::Sender<()>,
        gate: Mutex<std::sync::mpsc::Receiver<()>>,
        delivered: AtomicUsize,
    }

    impl NotificationSink for GatedSink {
        fn about_to_disconnect(&self) {
            self.entered.send(()).expect("test thread is waiting");
            self.gate
                .lock()
                .expect("gate lock")
                .recv()
                .expect("gate opens");
            self.delivered.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn revoke_waits_out_an_in_flight_callback_and_suppresses_pending_ones() {
        let shared = Arc::new(SessionShared::new());
        let (entered_tx, entered_rx) = std::sync::mpsc::channel();
        let (gate_tx, gate_rx) = std::sync::mpsc::channel();
        let sink = Arc::new(GatedSink {
            entered: entered_tx,
            gate: Mutex::new(gate_rx),
            delivered: AtomicUsize::new(0),
        });
        shared.install(Arc::clone(&sink) as Arc<dyn NotificationSink>);

        let delivery = {
            let shared = Arc::clone(&shared);
            std::thread::spawn(move || {
                shared.deliver(|sink| sink.about_to_disconnect());
                // A second event is already queued behind the first.
                shared.deliver(|sink| sink.about_to_disconnect());
            })
        };
        entered_rx.recv().expect("first callback started");

        let revoker = {
            let shared = Arc::clone(&shared);
            std::thread::spawn(move || shared.revoke())
        };
        // The callback is blocked on the gate, so revoke must not return.
        std::thread::sleep(Duration::from_millis(100));
        assert!(!revoker.is_finished());

        gate_tx.send(()).expect("callback is waiting on the gate");
        revoker.join().expect("revoke returns");
        delivery.join().expect("delivery thread ends");

        // The in-flight callback completed; the pending one never ran.
        assert_eq!(sink.delivered.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn sink_installed_after_revoke_is_dropped() {
        let shared = SessionShared::new();
        shared.revoke();

        let sink = Arc::new(CountingSink {
            delivered: AtomicUsize::new(0),
        });
        shared.install(Arc::clone(&sink) as Arc<dyn NotificationSink>);
        shared.deliver(|sink| sink.about_to_disconnect());
        assert_eq!(sink.delivered.load(Ordering::SeqCst), 0);
    }
}
