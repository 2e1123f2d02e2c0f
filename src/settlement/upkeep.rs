/*!
Upkeep scan

Read-only detection of due work for the external keeper. A lottery is a
candidate when it is active, past its end time and not already sitting in an
open randomness batch. The scan has no side effects and may run arbitrarily
often.
*/

use super::pending::PendingTable;
use crate::registry::Registry;
use crate::types::{LotteryId, Timestamp};
use serde::{Deserialize, Serialize};

/// Result of an upkeep scan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpkeepStatus {
    /// True when at least one lottery needs settlement
    pub due: bool,
    /// Candidate lottery ids, ascending
    pub candidates: Vec<LotteryId>,
}

/// Collect every lottery currently awaiting a draw, in ascending id order
pub fn scan_due(registry: &Registry, pending: &PendingTable, now: Timestamp) -> UpkeepStatus {
    let candidates: Vec<LotteryId> = registry
        .iter()
        .filter(|lottery| lottery.is_due(now) && !pending.contains_lottery(lottery.id))
        .map(|lottery| lottery.id)
        .collect();

    UpkeepStatus {
        due: !candidates.is_empty(),
        candidates,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::new_lottery;
    use crate::settlement::pending::PendingBatch;
    use crate::types::{AccountId, AssetRef};

    fn registry_with_end_times(end_times: &[Timestamp]) -> Registry {
        let mut registry = Registry::new();
        for end_time in end_times {
            registry.insert_with(|id| {
                new_lottery(
                    id,
                    "alice".into(),
                    AssetRef::new(AccountId::new("nft"), id),
                    10,
                    "alice".into(),
                    *end_time,
                )
            });
        }
        registry
    }

    #[test]
    fn test_scan_picks_expired_only() {
        let registry = registry_with_end_times(&[1_000, 2_000, 3_000]);
        let pending = PendingTable::new();

        let status = scan_due(&registry, &pending, 2_000);
        assert!(status.due);
        assert_eq!(status.candidates, vec![0, 1]);
    }

    #[test]
    fn test_scan_skips_batched_and_settled() {
        let mut registry = registry_with_end_times(&[1_000, 1_000, 1_000]);
        registry.get_mut(2).unwrap().active = false;

        let mut pending = PendingTable::new();
        pending
            .insert(PendingBatch {
                request_id: 1,
                lottery_ids: vec![0],
                requested_at: 1_500,
            })
            .unwrap();

        let status = scan_due(&registry, &pending, 2_000);
        assert_eq!(status.candidates, vec![1]);
    }

    #[test]
    fn test_scan_reports_nothing_due() {
        let registry = registry_with_end_times(&[5_000]);
        let status = scan_due(&registry, &PendingTable::new(), 1_000);
        assert!(!status.due);
        assert!(status.candidates.is_empty());
    }
}
