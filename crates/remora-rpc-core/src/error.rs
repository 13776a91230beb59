//! Error taxonomy for the boundary layer.
//!
//! Adapter and enum-mapping failures surface to the immediate caller;
//! lifetime violations are detected explicitly instead of being left to the
//! native side. Registry validation failures are fatal at initialization.

use std::error::Error;

use thiserror::Error;

/// Primary error type for boundary crossings.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// A value adapter could not represent its input on the other side of
    /// the boundary. Covers text that is not valid UTF-16 as well as
    /// out-of-range time-of-day values.
    #[error("value conversion failed at the boundary")]
    Encoding {
        /// Static description of the failing conversion.
        context: &'static str,
    },
    /// The native side reported an integer outside the declared set of an
    /// enumeration that maps with the fail-fast policy.
    #[error("unmapped native enum value")]
    UnmappedEnumValue {
        /// Enumeration name as registered in the binding registry.
        enumeration: &'static str,
        /// Offending native integer.
        value: i32,
    },
    /// A consumed record buffer was reused, or a session handle was used
    /// after release.
    #[error("boundary lifetime invariant violated")]
    TransferInvariant {
        /// Static description of the violated invariant.
        context: &'static str,
    },
    /// The binding registry failed load-time validation. No session may be
    /// constructed after this error.
    #[error("binding registry validation failed")]
    RegistryValidation {
        /// Type whose registration is missing or inconsistent.
        type_name: &'static str,
        /// Human-readable validation failure.
        reason: String,
    },
    /// A command issued through the session handle could not be handed to
    /// the session worker.
    #[error("session command failed")]
    CommandFailed {
        /// Operation identifier.
        operation: &'static str,
        /// Underlying failure.
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
}

/// Convenience alias for boundary operation results.
pub type BridgeResult<T> = Result<T, BridgeError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn messages_stay_constant_and_context_lives_in_fields() {
        let cases: Vec<(BridgeError, &str, bool)> = vec![
            (
                BridgeError::Encoding {
                    context: "utf-16 text contained an unpaired surrogate",
                },
                "value conversion failed at the boundary",
                false,
            ),
            (
                BridgeError::UnmappedEnumValue {
                    enumeration: "ConnectionState",
                    value: 42,
                },
                "unmapped native enum value",
                false,
            ),
            (
                BridgeError::TransferInvariant {
                    context: "record buffer already consumed",
                },
                "boundary lifetime invariant violated",
                false,
            ),
            (
                BridgeError::RegistryValidation {
                    type_name: "TorrentSnapshot",
                    reason: "field `status` references unregistered type".to_string(),
                },
                "binding registry validation failed",
                false,
            ),
            (
                BridgeError::CommandFailed {
                    operation: "connect",
                    source: Box::new(io::Error::other("native refused")),
                },
                "session command failed",
                true,
            ),
        ];

        for (err, message, has_source) in cases {
            assert_eq!(err.to_string(), message);
            assert_eq!(err.source().is_some(), has_source);
        }
    }
}
