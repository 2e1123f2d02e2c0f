/*!
Pending settlement batches

Correlation table standing in for the suspended half of the randomness
protocol: each outstanding request id maps to the ordered lottery ids it
covers. A batch is created when the request is issued and consumed exactly
once by the matching fulfillment; a secondary index keeps already-batched
lotteries out of later upkeep scans.
*/

use crate::error::{RaffleError, Result, StateError};
use crate::types::{LotteryId, RequestId, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// One outstanding randomness request and the lotteries it will settle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingBatch {
    /// Correlation id returned by the randomness collaborator
    pub request_id: RequestId,
    /// Included lotteries, ascending id order; fulfillment words arrive in
    /// this order
    pub lottery_ids: Vec<LotteryId>,
    /// When the request was issued
    pub requested_at: Timestamp,
}

/// Table of not-yet-fulfilled batches
#[derive(Debug, Default)]
pub struct PendingTable {
    batches: HashMap<RequestId, PendingBatch>,
    batched: HashSet<LotteryId>,
}

impl PendingTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// True if the lottery is already part of an open batch
    pub fn contains_lottery(&self, id: LotteryId) -> bool {
        self.batched.contains(&id)
    }

    /// Look up an open batch without consuming it
    pub fn get(&self, request_id: RequestId) -> Option<&PendingBatch> {
        self.batches.get(&request_id)
    }

    /// Record a freshly issued request.
    ///
    /// A duplicate correlation id is a misbehaving randomness collaborator;
    /// accepting it would displace the earlier batch while leaving its
    /// lotteries marked as batched, stranding them forever. Rejected before
    /// anything is touched.
    pub fn insert(&mut self, batch: PendingBatch) -> Result<()> {
        if self.batches.contains_key(&batch.request_id) {
            return Err(RaffleError::internal(format!(
                "randomness collaborator reused request id {}",
                batch.request_id
            )));
        }
        self.batched.extend(batch.lottery_ids.iter().copied());
        self.batches.insert(batch.request_id, batch);
        Ok(())
    }

    /// Consume a batch exactly once.
    ///
    /// A second call with the same request id fails, which is what guards
    /// the engine against replayed or duplicated fulfillments.
    pub fn consume(&mut self, request_id: RequestId) -> Result<PendingBatch> {
        let batch = self
            .batches
            .remove(&request_id)
            .ok_or(StateError::UnknownOrConsumedRequest(request_id))?;
        for id in &batch.lottery_ids {
            self.batched.remove(id);
        }
        Ok(batch)
    }

    /// Number of open batches
    pub fn len(&self) -> usize {
        self.batches.len()
    }

    /// True when no batch is awaiting fulfillment
    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RaffleError;

    fn batch(request_id: RequestId, lottery_ids: Vec<LotteryId>) -> PendingBatch {
        PendingBatch {
            request_id,
            lottery_ids,
            requested_at: 1_000,
        }
    }

    #[test]
    fn test_membership_index_tracks_batches() {
        let mut table = PendingTable::new();
        table.insert(batch(1, vec![3, 4])).unwrap();

        assert!(table.contains_lottery(3));
        assert!(table.contains_lottery(4));
        assert!(!table.contains_lottery(5));

        table.consume(1).unwrap();
        assert!(!table.contains_lottery(3));
        assert!(table.is_empty());
    }

    #[test]
    fn test_consume_is_exactly_once() {
        let mut table = PendingTable::new();
        table.insert(batch(9, vec![0])).unwrap();

        assert_eq!(table.consume(9).unwrap().lottery_ids, vec![0]);
        match table.consume(9) {
            Err(RaffleError::State(StateError::UnknownOrConsumedRequest(9))) => {}
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_independent_batches_do_not_interfere() {
        let mut table = PendingTable::new();
        table.insert(batch(1, vec![0, 1])).unwrap();
        table.insert(batch(2, vec![2])).unwrap();

        table.consume(1).unwrap();
        assert!(table.contains_lottery(2));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_duplicate_request_id_is_rejected() {
        let mut table = PendingTable::new();
        table.insert(batch(1, vec![0])).unwrap();

        // The reused id must not displace the first batch or touch the index
        assert!(table.insert(batch(1, vec![1])).is_err());
        assert_eq!(table.get(1).unwrap().lottery_ids, vec![0]);
        assert!(!table.contains_lottery(1));
        assert_eq!(table.len(), 1);
    }
}
