/*!
Lottery registry

Owned arena of lottery records keyed by a monotonically increasing id.
The registry is the single owner of every record; other components hold ids
into it, never copies. A `BTreeMap` keeps iteration in ascending id order,
which the batching path relies on.
*/

use crate::error::{Result, StateError};
use crate::types::{Lottery, LotteryId};
use std::collections::BTreeMap;

/// Durable store of lottery records
#[derive(Debug, Default)]
pub struct Registry {
    records: BTreeMap<LotteryId, Lottery>,
    next_id: LotteryId,
}

impl Registry {
    /// Create an empty registry; the first allocated id is 0
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the next id and store the record built by `make`.
    ///
    /// Ids are never reused, including for records that settle.
    pub fn insert_with(&mut self, make: impl FnOnce(LotteryId) -> Lottery) -> LotteryId {
        let id = self.next_id;
        self.next_id += 1;
        let record = make(id);
        debug_assert_eq!(record.id, id);
        self.records.insert(id, record);
        id
    }

    /// Immutable access to a record
    pub fn get(&self, id: LotteryId) -> Result<&Lottery> {
        self.records
            .get(&id)
            .ok_or_else(|| StateError::LotteryNotFound(id).into())
    }

    /// Mutable access to a record
    pub fn get_mut(&mut self, id: LotteryId) -> Result<&mut Lottery> {
        self.records
            .get_mut(&id)
            .ok_or_else(|| StateError::LotteryNotFound(id).into())
    }

    /// All records in ascending id order
    pub fn iter(&self) -> impl Iterator<Item = &Lottery> {
        self.records.values()
    }

    /// Number of records ever created
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when no lottery has been created yet
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RaffleError;
    use crate::types::{AccountId, AssetRef};

    fn make_lottery(id: LotteryId) -> Lottery {
        Lottery {
            id,
            starter: "alice".into(),
            asset: AssetRef::new(AccountId::new("nft"), id),
            ticket_price: 10,
            active: true,
            players: vec![],
            balance: 0,
            beneficiary: "alice".into(),
            winner: None,
            end_time: 1_000,
        }
    }

    #[test]
    fn test_ids_are_monotonic() {
        let mut registry = Registry::new();
        let a = registry.insert_with(make_lottery);
        let b = registry.insert_with(make_lottery);
        assert_eq!((a, b), (0, 1));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_missing_record_errors() {
        let registry = Registry::new();
        match registry.get(7) {
            Err(RaffleError::State(StateError::LotteryNotFound(7))) => {}
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_iteration_is_ascending() {
        let mut registry = Registry::new();
        for _ in 0..5 {
            registry.insert_with(make_lottery);
        }
        let ids: Vec<_> = registry.iter().map(|l| l.id).collect();
        assert_eq!(ids, vec![0, 1, 2, 3, 4]);
    }
}
