/*!
Engine events

One event per observable state transition, broadcast to subscribers over a
`tokio::sync::broadcast` channel owned by the engine. Slow or absent
subscribers never block an operation; lagging receivers simply miss events.
*/

use crate::types::{AccountId, LotteryId, RequestId};
use serde::{Deserialize, Serialize};

/// Events emitted by the engine on every state transition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineEvent {
    /// A lottery was created and its asset taken into escrow
    LotteryStarted {
        /// Newly allocated lottery id
        lottery_id: LotteryId,
    },

    /// A ticket was sold
    TicketPurchased {
        /// Lottery the ticket belongs to
        lottery_id: LotteryId,
        /// Buying principal
        buyer: AccountId,
    },

    /// A batch of due lotteries was submitted for randomness
    BatchRequested {
        /// Correlation id returned by the randomness collaborator
        request_id: RequestId,
        /// Lotteries included in the batch, ascending id order
        lottery_ids: Vec<LotteryId>,
    },

    /// A lottery reached its terminal state
    LotterySettled {
        /// Settled lottery id
        lottery_id: LotteryId,
        /// Drawn winner, `None` when the lottery had no players
        winner: Option<AccountId>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serialization() {
        let event = EngineEvent::BatchRequested {
            request_id: 3,
            lottery_ids: vec![1, 2],
        };
        let json = serde_json::to_string(&event).unwrap();
        let back: EngineEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(event, back);
    }
}
