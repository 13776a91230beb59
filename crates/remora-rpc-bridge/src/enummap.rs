//! Bidirectional tables between native integers and managed enumerations.
//!
//! Each enumeration declares exactly one table. The unknown-value policy is
//! chosen per table and documented on the table constant: status-like
//! enumerations the server side historically extends map unknown integers
//! to their designated sentinel variant, everything else fails fast with
//! [`BridgeError::UnmappedEnumValue`]. No table ever coerces silently.

use std::fmt::Debug;

use remora_rpc_core::{
    BandwidthPriority, BridgeError, BridgeResult, ConnectionState, EncryptionMode, FilePriority,
    IdleSeedingLimitMode, RatioLimitMode, RpcError, TorrentStatus, TrackerStatus,
};

/// Behaviour when the native side reports an integer outside the table.
#[derive(Debug, Clone, Copy)]
pub enum UnknownPolicy<T: 'static> {
    /// Reject with [`BridgeError::UnmappedEnumValue`].
    Fail,
    /// Map to the designated sentinel variant.
    Sentinel(T),
}

/// Bidirectional total mapping for one enumeration.
#[derive(Debug)]
pub struct EnumTable<T: Copy + Eq + Debug + 'static> {
    name: &'static str,
    entries: &'static [(i32, T)],
    variant_count: usize,
    unknown: UnknownPolicy<T>,
}

impl<T: Copy + Eq + Debug + 'static> EnumTable<T> {
    const fn new(
        name: &'static str,
        entries: &'static [(i32, T)],
        variant_count: usize,
        unknown: UnknownPolicy<T>,
    ) -> Self {
        Self {
            name,
            entries,
            variant_count,
            unknown,
        }
    }

    /// Enumeration name as registered in the binding registry.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Map a native integer to the managed value.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::UnmappedEnumValue`] for integers outside the
    /// table when the policy is [`UnknownPolicy::Fail`].
    pub fn decode(&self, raw: i32) -> BridgeResult<T> {
        if let Some((_, value)) = self.entries.iter().find(|(entry, _)| *entry == raw) {
            return Ok(*value);
        }
        match self.unknown {
            UnknownPolicy::Sentinel(sentinel) => Ok(sentinel),
            UnknownPolicy::Fail => Err(BridgeError::UnmappedEnumValue {
                enumeration: self.name,
                value: raw,
            }),
        }
    }

    /// Map a managed value back to its native integer.
    ///
    /// # Panics
    ///
    /// Panics if the value is missing from the table; table entries are
    /// validated at initialization.
    #[must_use]
    pub fn encode(&self, value: T) -> i32 {
        self.entries
            .iter()
            .find(|(_, entry)| *entry == value)
            .map(|(raw, _)| *raw)
            .expect("enum table entries are validated at initialization")
    }

    /// Structural validation run by the binding registry at init time.
    pub(crate) fn validate(&self) -> Result<(), String> {
        if self.entries.len() != self.variant_count {
            return Err(format!(
                "table covers {} of {} variants",
                self.entries.len(),
                self.variant_count
            ));
        }
        for (index, (raw, value)) in self.entries.iter().enumerate() {
            for (other_raw, other_value) in &self.entries[index + 1..] {
                if raw == other_raw {
                    return Err(format!("duplicate native value {raw}"));
                }
                if value == other_value {
                    return Err(format!("variant {value:?} mapped twice"));
                }
            }
        }
        Ok(())
    }
}

/// Type-erased view used by the binding registry.
pub(crate) trait AnyEnumTable: Sync {
    fn table_name(&self) -> &'static str;
    fn check(&self) -> Result<(), String>;
}

impl<T: Copy + Eq + Debug + Sync + 'static> AnyEnumTable for EnumTable<T> {
    fn table_name(&self) -> &'static str {
        self.name
    }

    fn check(&self) -> Result<(), String> {
        self.validate()
    }
}

/// Connection lifecycle. Unknown values fail fast.
pub static CONNECTION_STATE: EnumTable<ConnectionState> = EnumTable::new(
    "ConnectionState",
    &[
        (0, ConnectionState::Disconnected),
        (1, ConnectionState::Connecting),
        (2, ConnectionState::Connected),
    ],
    3,
    UnknownPolicy::Fail,
);

/// RPC error classification. Unknown values fail fast.
pub static RPC_ERROR: EnumTable<RpcError> = EnumTable::new(
    "RpcError",
    &[
        (0, RpcError::NoError),
        (1, RpcError::TimedOut),
        (2, RpcError::ConnectionError),
        (3, RpcError::AuthenticationError),
        (4, RpcError::ParseError),
        (5, RpcError::ServerIsTooNew),
        (6, RpcError::ServerIsTooOld),
    ],
    7,
    UnknownPolicy::Fail,
);

/// Torrent status. Servers grow new states between releases, so unknown
/// values map to [`TorrentStatus::Unknown`].
pub static TORRENT_STATUS: EnumTable<TorrentStatus> = EnumTable::new(
    "TorrentStatus",
    &[
        (0, TorrentStatus::Paused),
        (1, TorrentStatus::Downloading),
        (2, TorrentStatus::Seeding),
        (3, TorrentStatus::StalledDownloading),
        (4, TorrentStatus::StalledSeeding),
        (5, TorrentStatus::QueuedForDownloading),
        (6, TorrentStatus::QueuedForSeeding),
        (7, TorrentStatus::Checking),
        (8, TorrentStatus::QueuedForChecking),
        (9, TorrentStatus::Errored),
        (-1, TorrentStatus::Unknown),
    ],
    11,
    UnknownPolicy::Sentinel(TorrentStatus::Unknown),
);

/// Torrent bandwidth priority. Unknown values fail fast.
pub static BANDWIDTH_PRIORITY: EnumTable<BandwidthPriority> = EnumTable::new(
    "BandwidthPriority",
    &[
        (-1, BandwidthPriority::Low),
        (0, BandwidthPriority::Normal),
        (1, BandwidthPriority::High),
    ],
    3,
    UnknownPolicy::Fail,
);

/// File download priority. Unknown values fail fast.
pub static FILE_PRIORITY: EnumTable<FilePriority> = EnumTable::new(
    "FilePriority",
    &[
        (-1, FilePriority::Low),
        (0, FilePriority::Normal),
        (1, FilePriority::High),
    ],
    3,
    UnknownPolicy::Fail,
);

/// Ratio limit resolution mode. Unknown values fail fast.
pub static RATIO_LIMIT_MODE: EnumTable<RatioLimitMode> = EnumTable::new(
    "RatioLimitMode",
    &[
        (0, RatioLimitMode::Global),
        (1, RatioLimitMode::Single),
        (2, RatioLimitMode::Unlimited),
    ],
    3,
    UnknownPolicy::Fail,
);

/// Idle seeding limit resolution mode. Unknown values fail fast.
pub static IDLE_SEEDING_LIMIT_MODE: EnumTable<IdleSeedingLimitMode> = EnumTable::new(
    "IdleSeedingLimitMode",
    &[
        (0, IdleSeedingLimitMode::Global),
        (1, IdleSeedingLimitMode::Single),
        (2, IdleSeedingLimitMode::Unlimited),
    ],
    3,
    UnknownPolicy::Fail,
);

/// Tracker announce state. Servers grow new states between releases, so
/// unknown values map to [`TrackerStatus::Unknown`].
pub static TRACKER_STATUS: EnumTable<TrackerStatus> = EnumTable::new(
    "TrackerStatus",
    &[
        (0, TrackerStatus::Inactive),
        (1, TrackerStatus::Active),
        (2, TrackerStatus::Queued),
        (3, TrackerStatus::Updating),
        (4, TrackerStatus::Error),
        (-1, TrackerStatus::Unknown),
    ],
    6,
    UnknownPolicy::Sentinel(TrackerStatus::Unknown),
);

/// Peer encryption requirement. Unknown values fail fast.
pub static ENCRYPTION_MODE: EnumTable<EncryptionMode> = EnumTable::new(
    "EncryptionMode",
    &[
        (0, EncryptionMode::Allowed),
        (1, EncryptionMode::Preferred),
        (2, EncryptionMode::Required),
    ],
    3,
    UnknownPolicy::Fail,
);


#[cfg(test)]
mod tests {
    use super::*;

    fn assert_round_trips<T: Copy + Eq + Debug>(table: &EnumTable<T>) {
        table.validate().expect("table is structurally valid");
        for (raw, value) in table.entries {
            let decoded = table.decode(*raw).expect("declared value decodes");
            assert_eq!(decoded, *value, "{}: decode({raw})", table.name());
            assert_eq!(
                table.encode(*value),
                *raw,
                "{}: encode({value:?})",
                table.name()
            );
        }
    }

    #[test]
    fn every_declared_integer_round_trips() {
        assert_round_trips(&CONNECTION_STATE);
        assert_round_trips(&RPC_ERROR);
        assert_round_trips(&TORRENT_STATUS);
        assert_round_trips(&BANDWIDTH_PRIORITY);
        assert_round_trips(&FILE_PRIORITY);
        assert_round_trips(&RATIO_LIMIT_MODE);
        assert_round_trips(&IDLE_SEEDING_LIMIT_MODE);
        assert_round_trips(&TRACKER_STATUS);
        assert_round_trips(&ENCRYPTION_MODE);
    }

    #[test]
    fn fail_fast_tables_reject_unknown_integers() {
        match CONNECTION_STATE.decode(99) {
            Err(BridgeError::UnmappedEnumValue { enumeration, value }) => {
                assert_eq!(enumeration, "ConnectionState");
                assert_eq!(value, 99);
            }
            other => panic!("expected unmapped enum error, got {other:?}"),
        }
    }

    #[test]
    fn sentinel_tables_map_unknown_integers_to_the_sentinel() {
        assert_eq!(
            TORRENT_STATUS.decode(250).expect("sentinel policy"),
            TorrentStatus::Unknown
        );
        assert_eq!(
            TRACKER_STATUS.decode(17).expect("sentinel policy"),
            TrackerStatus::Unknown
        );
    }

    #[test]
    fn structural_validation_catches_broken_tables() {
        static DUPLICATE_RAW: EnumTable<ConnectionState> = EnumTable::new(
            "BrokenDuplicateRaw",
            &[
                (0, ConnectionState::Disconnected),
                (0, ConnectionState::Connecting),
                (2, ConnectionState::Connected),
            ],
            3,
            UnknownPolicy::Fail,
        );
        assert!(DUPLICATE_RAW.validate().is_err());

        static MISSING_VARIANT: EnumTable<ConnectionState> = EnumTable::new(
            "BrokenMissingVariant",
            &[(0, ConnectionState::Disconnected)],
            3,
            UnknownPolicy::Fail,
        );
        assert!(MISSING_VARIANT.validate().is_err());
    }
}
