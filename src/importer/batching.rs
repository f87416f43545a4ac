//! Batch partitioning, per-batch concurrent dispatch, and result merging.
//!
//! Each batch produces its own outcome list; lists are merged into the
//! [`ImportResult`] one batch at a time, so no shared state is mutated by
//! concurrently running records.

use super::ContentImporter;
use crate::types::ImportResult;
use futures::future::join_all;
use serde_json::Value;

/// Outcome of one record: its original input index and `Err(message)` on failure
pub(super) type RecordOutcome = (usize, std::result::Result<(), String>);

/// Split `records` into order-preserving batches of at most `batch_size`
///
/// Each batch is paired with the input index of its first record.
pub(super) fn partition(records: Vec<Value>, batch_size: usize) -> Vec<(usize, Vec<Value>)> {
    let batch_size = batch_size.max(1);
    let mut batches = Vec::with_capacity(records.len().div_ceil(batch_size));
    let mut offset = 0;
    let mut records = records.into_iter().peekable();

    while records.peek().is_some() {
        let batch: Vec<Value> = records.by_ref().take(batch_size).collect();
        let len = batch.len();
        batches.push((offset, batch));
        offset += len;
    }

    batches
}

/// Fold one batch's outcomes into the running result
pub(super) fn merge_outcomes(result: &mut ImportResult, outcomes: Vec<RecordOutcome>) {
    for (index, outcome) in outcomes {
        match outcome {
            Ok(()) => result.record_success(),
            Err(message) => result.record_failure(index, message),
        }
    }
}

impl ContentImporter {
    /// Dispatch every record of one batch concurrently and wait for all of them
    pub(super) async fn run_batch(
        &self,
        content_type_id: &str,
        offset: usize,
        batch: Vec<Value>,
    ) -> Vec<RecordOutcome> {
        let records = batch.into_iter().enumerate().map(|(position, record)| {
            let index = offset + position;
            async move { (index, self.import_record(content_type_id, index, record).await) }
        });
        join_all(records).await
    }
}
