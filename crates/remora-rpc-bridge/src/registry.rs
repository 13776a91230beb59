//! Binding registry: the declarative map of everything crossing the
//! boundary, validated once at session construction.
//!
//! Every native type the bridge touches is registered with exactly one
//! rule. The exclusion list names native types that must never cross; a
//! type that is both bound and excluded is a registration bug and fails
//! validation. Each binding also names the types reachable from it across
//! the boundary, and every one of those must carry a registration of its
//! own. Validation also runs the structural checks on every enumeration
//! table, so a session cannot come up over a table with duplicate or
//! missing entries.

use once_cell::sync::Lazy;

use remora_rpc_core::{BridgeError, BridgeResult};

use crate::enummap::{self, AnyEnumTable};

/// How one native type crosses the boundary.
pub(crate) enum BindingRule {
    /// Projected field-for-field into an immutable managed snapshot.
    ImmutableSnapshot,
    /// Bulk-transferred record sequence with consume-once move semantics.
    MoveRecord,
    /// Integer mapped through the named enumeration table.
    Enumeration(&'static dyn AnyEnumTable),
    /// Converted by a value adapter pair.
    ValueAdapter,
    /// Native callback surface virtualized into the notification sink.
    Virtualized,
    /// The one mutable handle; all mutation goes through it.
    SessionHandle,
}

/// One registered native type.
pub(crate) struct TypeBinding {
    pub(crate) type_name: &'static str,
    pub(crate) rule: BindingRule,
    /// Types reachable from this one across the boundary. Each must be
    /// registered itself; exclusions do not satisfy a reference.
    pub(crate) references: &'static [&'static str],
}

/// The full registration set for one native library surface.
pub(crate) struct BindingRegistry {
    bindings: Vec<TypeBinding>,
    exclusions: Vec<&'static str>,
}

impl BindingRegistry {
    pub(crate) fn new(bindings: Vec<TypeBinding>, exclusions: Vec<&'static str>) -> Self {
        Self {
            bindings,
            exclusions,
        }
    }

    /// Validate the registration set.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::RegistryValidation`] naming the first
    /// offending type: a duplicate registration, a type that is both bound
    /// and excluded, a reachable type with no registration of its own, an
    /// enumeration bound to a table declared under a different name, or an
    /// enumeration whose table fails its structural check.
    pub(crate) fn validate(&self) -> BridgeResult<()> {
        for (index, binding) in self.bindings.iter().enumerate() {
            if self.bindings[index + 1..]
                .iter()
                .any(|other| other.type_name == binding.type_name)
            {
                return Err(BridgeError::RegistryValidation {
                    type_name: binding.type_name,
                    reason: "registered more than once".to_owned(),
                });
            }
            if self.exclusions.contains(&binding.type_name) {
                return Err(BridgeError::RegistryValidation {
                    type_name: binding.type_name,
                    reason: "bound and excluded at the same time".to_owned(),
                });
            }
            for reference in binding.references {
                if !self
                    .bindings
                    .iter()
                    .any(|other| other.type_name == *reference)
                {
                    return Err(BridgeError::RegistryValidation {
                        type_name: binding.type_name,
                        reason: format!("references unregistered type `{reference}`"),
                    });
                }
            }
            if let BindingRule::Enumeration(table) = &binding.rule {
                if table.table_name() != binding.type_name {
                    return Err(BridgeError::RegistryValidation {
                        type_name: binding.type_name,
                        reason: format!("bound to enum table `{}`", table.table_name()),
                    });
                }
                table.check().map_err(|reason| BridgeError::RegistryValidation {
                    type_name: binding.type_name,
                    reason,
                })?;
            }
        }
        Ok(())
    }

    pub(crate) fn type_names(&self) -> impl Iterator<Item = &'static str> {
        self.bindings.iter().map(|binding| binding.type_name)
    }
}

/// Registration set for the torrent RPC client surface.
pub(crate) static BUILTIN: Lazy<BindingRegistry> = Lazy::new(builtin_registry);

/// Validate the builtin registration set. Runs at session construction.
///
/// # Errors
///
/// Returns [`BridgeError::RegistryValidation`] for the first offending
/// registration.
pub fn validate_builtin() -> BridgeResult<()> {
    BUILTIN.validate()
}

/// Names of all registered native types, in registration order.
#[must_use]
pub fn registered_types() -> Vec<&'static str> {
    BUILTIN.type_names().collect()
}

#[allow(clippy::too_many_lines)]
fn builtin_registry() -> BindingRegistry {
    let bindings = vec![
        TypeBinding {
            type_name: "Torrent",
            rule: BindingRule::ImmutableSnapshot,
            references: &[
                "TorrentStatus",
                "RpcError",
                "RatioLimitMode",
                "IdleSeedingLimitMode",
                "BandwidthPriority",
                "Tracker",
                "NativeText",
            ],
        },
        TypeBinding {
            type_name: "TorrentFile",
            rule: BindingRule::ImmutableSnapshot,
            references: &["FilePriority", "NativeText"],
        },
        TypeBinding {
            type_name: "Peer",
            rule: BindingRule::ImmutableSnapshot,
            references: &["NativeText"],
        },
        TypeBinding {
            type_name: "Tracker",
            rule: BindingRule::ImmutableSnapshot,
            references: &["TrackerStatus", "NativeText"],
        },
        TypeBinding {
            type_name: "ServerSettingsData",
            rule: BindingRule::ImmutableSnapshot,
            references: &[
                "EncryptionMode",
                "AlternativeSpeedLimitsDays",
                "NativeTimeOfDay",
                "NativeText",
            ],
        },
        TypeBinding {
            type_name: "SessionStats",
            rule: BindingRule::ImmutableSnapshot,
            references: &[],
        },
        TypeBinding {
            type_name: "TorrentRecordVector",
            rule: BindingRule::MoveRecord,
            references: &["Torrent"],
        },
        TypeBinding {
            type_name: "FileRecordVector",
            rule: BindingRule::MoveRecord,
            references: &["TorrentFile"],
        },
        TypeBinding {
            type_name: "PeerRecordVector",
            rule: BindingRule::MoveRecord,
            references: &["Peer"],
        },
        TypeBinding {
            type_name: "ConnectionState",
            rule: BindingRule::Enumeration(&enummap::CONNECTION_STATE),
            references: &[],
        },
        TypeBinding {
            type_name: "RpcError",
            rule: BindingRule::Enumeration(&enummap::RPC_ERROR),
            references: &[],
        },
        TypeBinding {
            type_name: "TorrentStatus",
            rule: BindingRule::Enumeration(&enummap::TORRENT_STATUS),
            references: &[],
        },
        TypeBinding {
            type_name: "BandwidthPriority",
            rule: BindingRule::Enumeration(&enummap::BANDWIDTH_PRIORITY),
            references: &[],
        },
        TypeBinding {
            type_name: "FilePriority",
            rule: BindingRule::Enumeration(&enummap::FILE_PRIORITY),
            references: &[],
        },
        TypeBinding {
            type_name: "RatioLimitMode",
            rule: BindingRule::Enumeration(&enummap::RATIO_LIMIT_MODE),
            references: &[],
        },
        TypeBinding {
            type_name: "IdleSeedingLimitMode",
            rule: BindingRule::Enumeration(&enummap::IDLE_SEEDING_LIMIT_MODE),
            references: &[],
        },
        TypeBinding {
            type_name: "TrackerStatus",
            rule: BindingRule::Enumeration(&enummap::TRACKER_STATUS),
            references: &[],
        },
        TypeBinding {
            type_name: "EncryptionMode",
            rule: BindingRule::Enumeration(&enummap::ENCRYPTION_MODE),
            references: &[],
        },
        // A free day bitmask, not a closed enumeration; crosses through
        // the mask-preserving value conversion.
        TypeBinding {
            type_name: "AlternativeSpeedLimitsDays",
            rule: BindingRule::ValueAdapter,
            references: &[],
        },
        TypeBinding {
            type_name: "NativeText",
            rule: BindingRule::ValueAdapter,
            references: &[],
        },
        TypeBinding {
            type_name: "NativeByteArray",
            rule: BindingRule::ValueAdapter,
            references: &[],
        },
        TypeBinding {
            type_name: "NativeTimeOfDay",
            rule: BindingRule::ValueAdapter,
            references: &[],
        },
        TypeBinding {
            type_name: "NotificationSurface",
            rule: BindingRule::Virtualized,
            references: &[
                "ConnectionState",
                "RpcError",
                "Torrent",
                "TorrentFile",
                "Peer",
                "ServerSettingsData",
                "SessionStats",
                "NativeText",
            ],
        },
        TypeBinding {
            type_name: "Session",
            rule: BindingRule::SessionHandle,
            references: &[
                "NotificationSurface",
                "BandwidthPriority",
                "NativeText",
                "NativeByteArray",
                "NativeTimeOfDay",
                "EncryptionMode",
                "AlternativeSpeedLimitsDays",
            ],
        },
    ];
    // Native runtime machinery that must never leak across the boundary.
    let exclusions = vec![
        "NativeVariant",
        "NativeEventLoop",
        "NativeTimer",
        "NativeThread",
        "NativeJsonValue",
        "NativeUrl",
        "NativeMetaObject",
    ];
    BindingRegistry::new(bindings, exclusions)
}
