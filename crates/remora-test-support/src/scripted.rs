//! Scriptable [`NativeSession`] double.
//!
//! Records every command in native representation and serves scripted
//! notification batches from a queue, one batch per `poll_events` call.
//! The [`ScriptController`] stays with the test while the session itself
//! is handed to the bridge.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use anyhow::{Result, bail};
use async_trait::async_trait;

use remora_rpc_core::{
    NativeSession, RawBuffer, RawEvent, RawSettingsMutation, RawText,
};

/// One recorded native call, field-for-field as the bridge issued it.
#[derive(Debug, Clone, PartialEq)]
#[allow(missing_docs)]
pub enum NativeCall {
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

#[derive(Default)]
struct ScriptState {
    calls: Vec<NativeCall>,
    batches: VecDeque<Vec<RawEvent>>,
    fail_next_command: bool,
}

fn locked(state: &Mutex<ScriptState>) -> MutexGuard<'_, ScriptState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Test-side handle over a [`ScriptedNativeSession`].
#[derive(Clone)]
pub struct ScriptController {
    state: Arc<Mutex<ScriptState>>,
}

impl ScriptController {
    /// Queue one notification batch; the next `poll_events` call drains it.
    pub fn push_events(&self, events: Vec<RawEvent>) {
        locked(&self.state).batches.push_back(events);
    }

    /// Make the next command fail with a synthetic native error.
    pub fn fail_next_command(&self) {
        locked(&self.state).fail_next_command = true;
    }

    /// Snapshot of all calls recorded so far, in issue order.
    #[must_use]
    pub fn calls(&self) -> Vec<NativeCall> {
        locked(&self.state).calls.clone()
    }

    /// Number of calls recorded so far.
    #[must_use]
    pub fn call_count(&self) -> usize {
        locked(&self.state).calls.len()
    }
}

/// Scriptable native session double.
#[derive(Default)]
pub struct ScriptedNativeSession {
    state: Arc<Mutex<ScriptState>>,
}

impl ScriptedNativeSession {
    /// Create a session double and its controller.
    #[must_use]
    pub fn new() -> (Self, ScriptController) {
        let session = Self::default();
        let controller = ScriptController {
            state: Arc::clone(&session.state),
        };
        (session, controller)
    }

    fn record(&self, call: NativeCall) -> Result<()> {
        let mut state = locked(&self.state);
        if state.fail_next_command {
            state.fail_next_command = false;
            bail!("scripted native failure");
        }
        state.calls.push(call);
        Ok(())
    }
}

#[async_trait]
impl NativeSession for ScriptedNativeSession {
    async fn connect(&mut self) -> Result<()> {
        self.record(NativeCall::Connect)
    }

    async fn disconnect(&mut self) -> Result<()> {
        self.record(NativeCall::Disconnect)
    }

    async fn set_update_disabled(&mut self, disabled: bool) -> Result<()> {
        self.record(NativeCall::SetUpdateDisabled(disabled))
    }

    async fn start_torrents(&mut self, ids: &[i32]) -> Result<()> {
        self.record(NativeCall::StartTorrents(ids.to_vec()))
    }

    async fn start_torrents_now(&mut self, ids: &[i32]) -> Result<()> {
        self.record(NativeCall::StartTorrentsNow(ids.to_vec()))
    }

    async fn pause_torrents(&mut self, ids: &[i32]) -> Result<()> {
        self.record(NativeCall::PauseTorrents(ids.to_vec()))
    }

    async fn remove_torrents(&mut self, ids: &[i32], delete_files: bool) -> Result<()> {
        self.record(NativeCall::RemoveTorrents {
            ids: ids.to_vec(),
            delete_files,
        })
    }

    async fn verify_torrents(&mut self, ids: &[i32]) -> Result<()> {
        self.record(NativeCall::VerifyTorrents(ids.to_vec()))
    }

    async fn reannounce_torrents(&mut self, ids: &[i32]) -> Result<()> {
        self.record(NativeCall::ReannounceTorrents(ids.to_vec()))
    }

    async fn add_torrent_link(
        &mut self,
        link: RawText,
        download_directory: RawText,
        bandwidth_priority: i32,
        start: bool,
    ) -> Result<()> {
        self.record(NativeCall::AddTorrentLink {
            link,
            download_directory,
            bandwidth_priority,
            start,
        })
    }

    async fn add_torrent_file(
        &mut self,
        metainfo: RawBuffer,
        download_directory: RawText,
        unwanted_files: &[i32],
        high_priority_files: &[i32],
        low_priority_files: &[i32],
        bandwidth_priority: i32,
        start: bool,
    ) -> Result<()> {
        self.record(NativeCall::AddTorrentFile {
            metainfo,
            download_directory,
            unwanted_files: unwanted_files.to_vec(),
            high_priority_files: high_priority_files.to_vec(),
            low_priority_files: low_priority_files.to_vec(),
            bandwidth_priority,
            start,
        })
    }

    async fn set_torrents_location(
        &mut self,
        ids: &[i32],
        location: RawText,
        move_files: bool,
    ) -> Result<()> {
        self.record(NativeCall::SetTorrentsLocation {
            ids: ids.to_vec(),
            location,
            move_files,
        })
    }

    async fn rename_torrent_file(
        &mut self,
        torrent_id: i32,
        file_path: RawText,
        new_name: RawText,
    ) -> Result<()> {
        self.record(NativeCall::RenameTorrentFile {
            torrent_id,
            file_path,
            new_name,
        })
    }

    async fn request_free_space(&mut self, path: RawText) -> Result<()> {
        self.record(NativeCall::RequestFreeSpace(path))
    }

    async fn request_download_dir_free_space(&mut self) -> Result<()> {
        self.record(NativeCall::RequestDownloadDirFreeSpace)
    }

    async fn set_session_setting(&mut self, mutation: RawSettingsMutation) -> Result<()> {
        self.record(NativeCall::SetSessionSetting(mutation))
    }

    async fn poll_events(&mut self) -> Result<Vec<RawEvent>> {
        Ok(locked(&self.state)
            .batches
            .pop_front()
            .unwrap_or_default())
    }
}
