//! Managed representations of the native enumerations.
//!
//! The native integer is the single source of truth: every discriminant
//! below matches the value the native RPC client uses on the wire, and the
//! enum tables in the bridge crate round-trip those integers exactly.
//! `TorrentStatus` and `TrackerStatus` carry a designated `Unknown` sentinel
//! because the server side historically grows new states between releases;
//! all other enumerations map with the fail-fast policy.

use serde::{Deserialize, Serialize};

/// Connection lifecycle of the RPC session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(i32)]
pub enum ConnectionState {
    /// No server connection is active.
    Disconnected = 0,
    /// A connection attempt is in progress.
    Connecting = 1,
    /// The session is connected and exchanging data.
    Connected = 2,
}

/// Error classification reported alongside connection state changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(i32)]
pub enum RpcError {
    /// No error condition is active.
    NoError = 0,
    /// The server did not answer within the configured timeout.
    TimedOut = 1,
    /// The transport-level connection failed.
    ConnectionError = 2,
    /// The server rejected the configured credentials.
    AuthenticationError = 3,
    /// The server response could not be parsed.
    ParseError = 4,
    /// The server speaks a newer protocol revision than this client.
    ServerIsTooNew = 5,
    /// The server speaks an older protocol revision than this client.
    ServerIsTooOld = 6,
}

/// Per-torrent lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(i32)]
pub enum TorrentStatus {
    /// Transfer is paused.
    Paused = 0,
    /// Payload data is being downloaded.
    Downloading = 1,
    /// Payload is complete and being seeded.
    Seeding = 2,
    /// Downloading but no peer traffic is flowing.
    StalledDownloading = 3,
    /// Seeding but no peer traffic is flowing.
    StalledSeeding = 4,
    /// Waiting in the download queue.
    QueuedForDownloading = 5,
    /// Waiting in the seed queue.
    QueuedForSeeding = 6,
    /// Local data is being hash-checked.
    Checking = 7,
    /// Waiting in the hash-check queue.
    QueuedForChecking = 8,
    /// The torrent stopped with an error.
    Errored = 9,
    /// Sentinel for statuses added by newer servers. Encodes as `-1`.
    Unknown = -1,
}

/// Bandwidth priority assigned to a whole torrent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(i32)]
pub enum BandwidthPriority {
    /// Deprioritized relative to other torrents.
    Low = -1,
    /// Default scheduling weight.
    Normal = 0,
    /// Prioritized relative to other torrents.
    High = 1,
}

/// Download priority of an individual file within a torrent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(i32)]
pub enum FilePriority {
    /// Deprioritized relative to sibling files.
    Low = -1,
    /// Default scheduling weight.
    Normal = 0,
    /// Prioritized relative to sibling files.
    High = 1,
}

/// How the per-torrent share ratio limit is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(i32)]
pub enum RatioLimitMode {
    /// Follow the session-wide ratio limit.
    Global = 0,
    /// Use the torrent's own ratio limit value.
    Single = 1,
    /// Seed regardless of ratio.
    Unlimited = 2,
}

/// How the per-torrent idle seeding limit is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(i32)]
pub enum IdleSeedingLimitMode {
    /// Follow the session-wide idle limit.
    Global = 0,
    /// Use the torrent's own idle limit value.
    Single = 1,
    /// Seed regardless of idle time.
    Unlimited = 2,
}

/// Announce state of a single tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(i32)]
pub enum TrackerStatus {
    /// Tracker is configured but not announcing.
    Inactive = 0,
    /// Last announce succeeded.
    Active = 1,
    /// Announce is queued.
    Queued = 2,
    /// Announce is in flight.
    Updating = 3,
    /// Last announce failed.
    Error = 4,
    /// Sentinel for states added by newer servers. Encodes as `-1`.
    Unknown = -1,
}

/// Peer connection encryption requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(i32)]
pub enum EncryptionMode {
    /// Accept plaintext and encrypted peers.
    Allowed = 0,
    /// Prefer encrypted peers when available.
    Preferred = 1,
    /// Refuse plaintext peers.
    Required = 2,
}

/// Day selection for the alternative speed limit schedule.
///
/// The native value is a free bitmask with Sunday at bit 0. Servers may
/// store any day combination, so the managed type preserves the mask
/// instead of enumerating named schedules; the common schedules are
/// provided as constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AlternativeSpeedLimitsDays(i32);

impl AlternativeSpeedLimitsDays {
    /// Sundays only.
    pub const SUNDAY: Self = Self(1);
    /// Mondays only.
    pub const MONDAY: Self = Self(2);
    /// Tuesdays only.
    pub const TUESDAY: Self = Self(4);
    /// Wednesdays only.
    pub const WEDNESDAY: Self = Self(8);
    /// Thursdays only.
    pub const THURSDAY: Self = Self(16);
    /// Fridays only.
    pub const FRIDAY: Self = Self(32);
    /// Saturdays only.
    pub const SATURDAY: Self = Self(64);
    /// Monday through Friday.
    pub const WEEKDAYS: Self = Self(62);
    /// Saturday and Sunday.
    pub const WEEKENDS: Self = Self(65);
    /// Every day of the week.
    pub const ALL: Self = Self(127);

    /// Build from the native bitmask. Returns `None` when bits outside
    /// the seven day bits are set.
    #[must_use]
    pub fn from_mask(mask: i32) -> Option<Self> {
        (mask & !Self::ALL.0 == 0 && mask >= 0).then_some(Self(mask))
    }

    /// The native bitmask value.
    #[must_use]
    pub fn mask(self) -> i32 {
        self.0
    }

    /// Whether every day in `days` is selected.
    #[must_use]
    pub fn contains(self, days: Self) -> bool {
        self.0 & days.0 == days.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discriminants_match_native_constants() {
        assert_eq!(ConnectionState::Connected as i32, 2);
        assert_eq!(RpcError::ServerIsTooOld as i32, 6);
        assert_eq!(TorrentStatus::Errored as i32, 9);
        assert_eq!(TorrentStatus::Unknown as i32, -1);
        assert_eq!(BandwidthPriority::Low as i32, -1);
        assert_eq!(FilePriority::High as i32, 1);
        assert_eq!(TrackerStatus::Error as i32, 4);
        assert_eq!(AlternativeSpeedLimitsDays::WEEKDAYS.mask(), 62);
        assert_eq!(AlternativeSpeedLimitsDays::ALL.mask(), 127);
    }

    #[test]
    fn day_masks_accept_any_day_combination() {
        let monday_and_tuesday =
            AlternativeSpeedLimitsDays::from_mask(6).expect("day bits are valid");
        assert_eq!(monday_and_tuesday.mask(), 6);
        assert!(monday_and_tuesday.contains(AlternativeSpeedLimitsDays::MONDAY));
        assert!(!monday_and_tuesday.contains(AlternativeSpeedLimitsDays::SUNDAY));

        assert!(AlternativeSpeedLimitsDays::from_mask(128).is_none());
        assert!(AlternativeSpeedLimitsDays::from_mask(-1).is_none());
    }

    #[test]
    fn enums_serialize_as_snake_case() {
        let json = serde_json::to_string(&ConnectionState::Connecting).expect("serialize");
        assert_eq!(json, "\"connecting\"");
    }
}
