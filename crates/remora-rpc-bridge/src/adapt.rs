//! Value adapters for primitive-like types crossing the boundary.
//!
//! Text is UTF-16 on the native side and `String` on the managed side;
//! the native-to-managed direction is the only fallible one. Byte buffers
//! cross with exact length and content. Times of day arrive as milliseconds
//! since midnight and are floored to whole minutes, the documented lossy
//! edge of the time conversion. Absolute timestamps are epoch seconds with
//! negative values meaning "unset".

use chrono::{DateTime, Utc};

use remora_rpc_core::{BridgeError, BridgeResult, RawBuffer, RawText, TimeOfDay};

const MSECS_PER_MINUTE: i32 = 60_000;
const MSECS_PER_DAY: i32 = 24 * 60 * MSECS_PER_MINUTE;

/// Convert native UTF-16 text to a managed string.
///
/// # Errors
///
/// Returns [`BridgeError::Encoding`] when the code units contain an
/// unpaired surrogate. Nothing is truncated on failure.
pub fn text_to_managed(text: &RawText) -> BridgeResult<String> {
    String::from_utf16(&text.0).map_err(|_| BridgeError::Encoding {
        context: "utf-16 text contained an unpaired surrogate",
    })
}

/// Convert a managed string to native UTF-16 text. Total.
#[must_use]
pub fn text_from_managed(text: &str) -> RawText {
    RawText::from(text)
}

/// Move a native byte buffer into managed ownership.
#[must_use]
pub fn bytes_to_managed(buffer: RawBuffer) -> Vec<u8> {
    buffer.0
}

/// Move managed bytes into a native buffer.
#[must_use]
pub fn bytes_from_managed(bytes: Vec<u8>) -> RawBuffer {
    RawBuffer(bytes)
}

/// Convert native milliseconds since midnight to a [`TimeOfDay`].
///
/// Sub-minute precision is discarded by flooring.
///
/// # Errors
///
/// Returns [`BridgeError::Encoding`] when the value is negative or a day
/// or more.
pub fn time_of_day_to_managed(msecs_since_midnight: i32) -> BridgeResult<TimeOfDay> {
    if !(0..MSECS_PER_DAY).contains(&msecs_since_midnight) {
        return Err(BridgeError::Encoding {
            context: "time-of-day milliseconds out of range",
        });
    }
    let minutes = u16::try_from(msecs_since_midnight / MSECS_PER_MINUTE).map_err(|_| {
        BridgeError::Encoding {
            context: "time-of-day milliseconds out of range",
        }
    })?;
    TimeOfDay::from_minutes_since_midnight(minutes).ok_or(BridgeError::Encoding {
        context: "time-of-day milliseconds out of range",
    })
}

/// Convert a [`TimeOfDay`] to native milliseconds since midnight. Total.
#[must_use]
pub fn time_of_day_from_managed(time: TimeOfDay) -> i32 {
    i32::from(time.minutes_since_midnight()) * MSECS_PER_MINUTE
}

/// Convert native epoch seconds to a managed timestamp.
///
/// Negative values are the native "unset" sentinel and map to `None`.
#[must_use]
pub fn timestamp_to_managed(epoch_seconds: i64) -> Option<DateTime<Utc>> {
    if epoch_seconds < 0 {
        return None;
    }
    DateTime::from_timestamp(epoch_seconds, 0)
}
