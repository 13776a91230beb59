#![deny(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]

//! Bridge exposing the native torrent RPC client to managed callers.
//!
//! The bridge owns every conversion across the boundary: value adapters,
//! enumeration tables, bulk record transfer, snapshot projection, and the
//! virtualized notification surface. Managed code interacts with exactly
//! two kinds of objects: immutable snapshots and the one mutable
//! [`Session`] handle.

/// Value adapters for text, bytes, and time.
pub mod adapt;
/// Queued commands and the managed settings update surface.
pub mod command;
/// Enumeration tables with per-table unknown-value policies.
pub mod enummap;
/// Immutable entity snapshots.
pub mod model;
/// Projection from native records to snapshots.
pub mod project;
/// Binding registry validated at session construction.
pub mod registry;
/// The mutable session handle.
pub mod session;
/// The managed notification surface.
pub mod sink;
/// Bulk record transfer with consume-once semantics.
pub mod transfer;
mod worker;

pub use command::ServerSettingsUpdate;
pub use model::{
    PeerSnapshot, ServerSettingsSnapshot, SessionStatsSnapshot, TorrentFileSnapshot,
    TorrentSnapshot, TrackerSnapshot,
};
pub use session::{Session, SessionOptions};
pub use sink::NotificationSink;
