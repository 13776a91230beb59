//! Bulk record transfer out of native buffers.
//!
//! A native record buffer is consumed exactly once per update. The transfer
//! moves every record out in sequence order, runs the projection on each,
//! and leaves the buffer invalidated. A repeated consume attempt surfaces as
//! [`remora_rpc_core::BridgeError::TransferInvariant`] instead of silently
//! yielding stale or duplicate records.

use remora_rpc_core::{BridgeResult, RecordBuffer};

/// Consume a record buffer and project every record, preserving order.
///
/// The buffer is invalidated even when a projection fails partway; partial
/// results are never handed out.
///
/// # Errors
///
/// Returns the invariant violation from [`RecordBuffer::take`] when the
/// buffer was already consumed, or the first projection error.
pub fn transfer_records<T, U>(
    buffer: &mut RecordBuffer<T>,
    project: impl Fn(T) -> BridgeResult<U>,
) -> BridgeResult<Vec<U>> {
    let records = buffer.take()?;
    let mut projected = Vec::with_capacity(records.len());
    for record in records {
        projected.push(project(record)?);
    }
    Ok(projected)
}

#[cfg(test)]
mod tests {
    use remora_rpc_core::BridgeError;

    use super::*;

    #[test]
    fn records_come_out_in_sequence_order() {
        let mut buffer = RecordBuffer::new(vec![3, 1, 2]);
        let out = transfer_records(&mut buffer, |n| Ok(n * 10)).expect("transfer succeeds");
        assert_eq!(out, vec![30, 10, 20]);
        assert!(buffer.is_consumed());
    }

    #[test]
    fn second_transfer_reports_the_violation() {
        let mut buffer = RecordBuffer::new(vec![1]);
        transfer_records(&mut buffer, Ok).expect("first transfer succeeds");

        match transfer_records(&mut buffer, Ok) {
            Err(BridgeError::TransferInvariant { context }) => {
                assert_eq!(context, "record buffer already consumed");
            }
            other => panic!("expected transfer invariant violation, got {other:?}"),
        }
    }

    #[test]
    fn projection_failure_invalidates_the_buffer() {
        let mut buffer = RecordBuffer::new(vec![1, 2, 3]);
        let result = transfer_records(&mut buffer, |n| {
            if n == 2 {
                Err(BridgeError::Encoding {
                    context: "synthetic",
                })
            } else {
                Ok(n)
            }
        });
        assert!(result.is_err());
        assert!(buffer.is_consumed());
    }

    #[test]
    fn empty_buffer_transfers_to_an_empty_sequence() {
        let mut buffer: RecordBuffer<u8> = RecordBuffer::default();
        let out = transfer_records(&mut buffer, Ok).expect("empty transfer succeeds");
        assert!(out.is_empty());
    }
}
