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

//! Boundary contract between the native torrent RPC client and the managed
//! bridge: raw native types, the native session trait, managed enumerations,
//! managed value types, and the shared error taxonomy.

/// Managed enumerations mirroring the native constants.
pub mod enums;
/// Error taxonomy shared across the boundary.
pub mod error;
/// Native-side representations and the native session contract.
pub mod native;
/// Managed value types copied across the boundary.
pub mod value;

pub use enums::{
    AlternativeSpeedLimitsDays, BandwidthPriority, ConnectionState, EncryptionMode, FilePriority,
    IdleSeedingLimitMode, RatioLimitMode, RpcError, TorrentStatus, TrackerStatus,
};
pub use error::{BridgeError, BridgeResult};
pub use native::{
    IndexRange, NativeSession, RawBuffer, RawEvent, RawFileRecord, RawPeerRecord,
    RawServerSettingsRecord, RawSessionStatsRecord, RawSettingsMutation, RawText,
    RawTorrentRecord, RawTrackerRecord, RecordBuffer,
};
pub use value::TimeOfDay;
