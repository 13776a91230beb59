#![allow(clippy::redundant_pub_crate, clippy::redundant_closure_for_method_calls)]

//! Background task driving the native session.
//!
//! One worker per session: it executes queued commands against the native
//! client and drains native notifications on a fixed interval, projecting
//! each into managed form and delivering it through the shared sink slot.
//! Running both on a single task is what serializes callback delivery.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use remora_rpc_core::{BridgeResult, NativeSession, RawEvent};

use crate::adapt;
use crate::command::SessionCommand;
use crate::enummap;
use crate::project;
use crate::session::SessionShared;
use crate::transfer::transfer_records;

pub(crate) fn spawn(
    native: Box<dyn NativeSession>,
    mut commands: mpsc::Receiver<SessionCommand>,
    shared: Arc<SessionShared>,
    poll_interval: Duration,
) {
    tokio::spawn(async move {
        let mut worker = Worker { native, shared };
        let mut poll = tokio::time::interval(poll_interval);
        loop {
            if worker.shared.is_revoked() {
                break;
            }
            tokio::select! {
                command = commands.recv() => {
                    match command {
                        Some(command) => {
                            let operation = command.operation();
                            if let Err(err) = worker.handle(command).await {
                                warn!(error = %err, operation, "native command failed");
                            }
                        }
                        None => break,
                    }
                }
                _ = poll.tick() => {
                    if let Err(err) = worker.drain_notifications().await {
                        warn!(error = %err, "native notification polling failed");
                    }
                }
            }
        }
        if let Err(err) = worker.drain_notifications().await {
            debug!(error = %err, "native notification polling failed during shutdown");
        }
    });
}

struct Worker {
    native: Box<dyn NativeSession>,
    shared: Arc<SessionShared>,
}

impl Worker {
    async fn handle(&mut self, command: SessionCommand) -> Result<()> {
        match command {
            SessionCommand::Connect => self.native.connect().await?,
            SessionCommand::Disconnect => self.native.disconnect().await?,
            SessionCommand::SetUpdateDisabled(disabled) => {
                self.native.set_update_disabled(disabled).await?;
            }
            SessionCommand::StartTorrents(ids) => self.native.start_torrents(&ids).await?,
            SessionCommand::StartTorrentsNow(ids) => self.native.start_torrents_now(&ids).await?,
            SessionCommand::PauseTorrents(ids) => self.native.pause_torrents(&ids).await?,
            SessionCommand::RemoveTorrents { ids, delete_files } => {
                self.native.remove_torrents(&ids, delete_files).await?;
            }
            SessionCommand::VerifyTorrents(ids) => self.native.verify_torrents(&ids).await?,
            SessionCommand::ReannounceTorrents(ids) => {
                self.native.reannounce_torrents(&ids).await?;
            }
            SessionCommand::AddTorrentLink {
                link,
                download_directory,
                bandwidth_priority,
                start,
            } => {
                self.native
                    .add_torrent_link(link, download_directory, bandwidth_priority, start)
                    .await?;
            }
            SessionCommand::AddTorrentFile {
                metainfo,
                download_directory,
                unwanted_files,
                high_priority_files,
                low_priority_files,
                bandwidth_priority,
                start,
            } => {
                self.native
                    .add_torrent_file(
                        metainfo,
                        download_directory,
                        &unwanted_files,
                        &high_priority_files,
                        &low_priority_files,
                        bandwidth_priority,
                        start,
                    )
                    .await?;
            }
            SessionCommand::SetTorrentsLocation {
                ids,
                location,
                move_files,
            } => {
                self.native
                    .set_torrents_location(&ids, location, move_files)
                    .await?;
            }
            SessionCommand::RenameTorrentFile {
                torrent_id,
                file_path,
                new_name,
            } => {
                self.native
                    .rename_torrent_file(torrent_id, file_path, new_name)
                    .await?;
            }
            SessionCommand::RequestFreeSpace(path) => {
                self.native.request_free_space(path).await?;
            }
            SessionCommand::RequestDownloadDirFreeSpace => {
                self.native.request_download_dir_free_space().await?;
            }
            SessionCommand::SetSessionSetting(mutation) => {
                self.native.set_session_setting(mutation).await?;
            }
        }
        Ok(())
    }

    async fn drain_notifications(&mut self) -> Result<()> {
        for event in self.native.poll_events().await? {
            self.dispatch(event);
        }
        Ok(())
    }

    /// Project one event and deliver it. A projection failure drops the
    /// event with a warning; later events still go out.
    fn dispatch(&self, event: RawEvent) {
        let kind = event_name(&event);
        if let Err(err) = self.deliver(event) {
            warn!(error = %err, event = kind, "dropping notification after projection failure");
        }
    }

    fn deliver(&self, event: RawEvent) -> BridgeResult<()> {
        match event {
            RawEvent::AboutToDisconnect => {
                self.shared.deliver(|sink| sink.about_to_disconnect());
            }
            RawEvent::ConnectionStateChanged { state } => {
                let state = enummap::CONNECTION_STATE.decode(state)?;
                self.shared
                    .deliver(|sink| sink.connection_state_changed(state));
            }
            RawEvent::ErrorChanged {
                error,
                message,
                detailed_message,
            } => {
                let error = enummap::RPC_ERROR.decode(error)?;
                let message = adapt::text_to_managed(&message)?;
                let detailed_message = adapt::text_to_managed(&detailed_message)?;
                self.shared
                    .deliver(|sink| sink.error_changed(error, &message, &detailed_message));
            }
            RawEvent::TorrentsUpdated {
                removed_ids,
                mut changed,
                mut added,
            } => {
                let changed = transfer_records(&mut changed, project::project_torrent)?;
                let added = transfer_records(&mut added, project::project_torrent)?;
                self.shared
                    .deliver(|sink| sink.torrents_updated(&removed_ids, changed, added));
            }
            RawEvent::TorrentFilesUpdated {
                torrent_id,
                mut changed,
            } => {
                let changed = transfer_records(&mut changed, project::project_file)?;
                self.shared
                    .deliver(|sink| sink.torrent_files_updated(torrent_id, changed));
            }
            RawEvent::TorrentPeersUpdated {
                torrent_id,
                removed_ranges,
                mut changed,
                mut added,
            } => {
                let changed = transfer_records(&mut changed, project::project_peer)?;
                let added = transfer_records(&mut added, project::project_peer)?;
                self.shared.deliver(|sink| {
                    sink.torrent_peers_updated(torrent_id, &removed_ranges, changed, added);
                });
            }
            RawEvent::ServerSettingsChanged { settings } => {
                let settings = project::project_server_settings(&settings)?;
                self.shared
                    .deliver(|sink| sink.server_settings_changed(settings));
            }
            RawEvent::ServerStatsUpdated {
                download_speed,
                upload_speed,
                current,
                total,
            } => {
                let current = project::project_session_stats(current);
                let total = project::project_session_stats(total);
                self.shared.deliver(|sink| {
                    sink.server_stats_updated(download_speed, upload_speed, current, total);
                });
            }
            RawEvent::TorrentAdded { id, hash, name } => {
                let hash = adapt::text_to_managed(&hash)?;
                let name = adapt::text_to_managed(&name)?;
                self.shared
                    .deliver(|sink| sink.torrent_added(id, &hash, &name));
            }
            RawEvent::TorrentFinished { id, hash, name } => {
                let hash = adapt::text_to_managed(&hash)?;
                let name = adapt::text_to_managed(&name)?;
                self.shared
                    .deliver(|sink| sink.torrent_finished(id, &hash, &name));
            }
            RawEvent::TorrentAddDuplicate => {
                self.shared.deliver(|sink| sink.torrent_add_duplicate());
            }
            RawEvent::TorrentAddError => {
                self.shared.deliver(|sink| sink.torrent_add_error());
            }
            RawEvent::TorrentFileRenamed {
                torrent_id,
                file_path,
                new_name,
            } => {
                let file_path = adapt::text_to_managed(&file_path)?;
                let new_name = adapt::text_to_managed(&new_name)?;
                self.shared.deliver(|sink| {
                    sink.torrent_file_renamed(torrent_id, &file_path, &new_name);
                });
            }
            RawEvent::DownloadDirFreeSpaceChecked { bytes } => {
                self.shared
                    .deliver(|sink| sink.download_dir_free_space_checked(bytes));
            }
            RawEvent::FreeSpaceChecked {
                path,
                success,
                bytes,
            } => {
                let path = adapt::text_to_managed(&path)?;
                self.shared
                    .deliver(|sink| sink.free_space_checked(&path, success, bytes));
            }
        }
        Ok(())
    }
}

fn event_name(event: &RawEvent) -> &'static str {
    match event {
        RawEvent::AboutToDisconnect => "about_to_disconnect",
        RawEvent::ConnectionStateChanged { .. } => "connection_state_changed",
        RawEvent::ErrorChanged { .. } => "error_changed",
        RawEvent::TorrentsUpdated { .. } => "torrents_updated",
        RawEvent::TorrentFilesUpdated { .. } => "torrent_files_updated",
        RawEvent::TorrentPeersUpdated { .. } => "torrent_peers_updated",
        RawEvent::ServerSettingsChanged { .. } => "server_settings_changed",
        RawEvent::ServerStatsUpdated { .. } => "server_stats_updated",
        RawEvent::TorrentAdded { .. } => "torrent_added",
        RawEvent::TorrentFinished { .. } => "torrent_finished",
        RawEvent::TorrentAddDuplicate => "torrent_add_duplicate",
        RawEvent::TorrentAddError => "torrent_add_error",
        RawEvent::TorrentFileRenamed { .. } => "torrent_file_renamed",
        RawEvent::DownloadDirFreeSpaceChecked { .. } => "download_dir_free_space_checked",
        RawEvent::FreeSpaceChecked { .. } => "free_space_checked",
    }
}
