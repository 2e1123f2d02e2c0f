/*!
Settlement of expired lotteries

Consumes a randomness fulfillment and drives each covered lottery to its
terminal state: draw the winner, zero the pot, split the proceeds between
beneficiary and fee ledger, and hand the asset to the winner (or back to the
starter when nobody played).

The record mutation here is pure and infallible; the engine facade performs
the external asset and fund transfers afterwards, so one rejecting recipient
in a batch can never block the other lotteries. A failed external transfer
is captured as a [`DeferredTransfer`] for operator retry.
*/

use crate::fees::fee_split;
use crate::types::{AccountId, Amount, AssetRef, Lottery, LotteryId};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub mod pending;
pub mod upkeep;

pub use pending::{PendingBatch, PendingTable};
pub use upkeep::{scan_due, UpkeepStatus};

/// What a deferred external transfer was supposed to move
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeferredKind {
    /// Custody transfer of the raffled asset
    Asset(AssetRef),
    /// Currency payout
    Funds(Amount),
}

/// An external transfer that failed during batch settlement.
///
/// The owed amount or asset is exactly what was never delivered; internal
/// accounting already treats the lottery as settled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeferredTransfer {
    /// Lottery the transfer belongs to
    pub lottery_id: LotteryId,
    /// Intended recipient
    pub recipient: AccountId,
    /// What should have moved
    pub kind: DeferredKind,
}

/// Instructions produced by finalizing one lottery record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettlementPlan {
    /// Settled lottery
    pub lottery_id: LotteryId,
    /// Drawn winner, `None` for a zero-player lottery
    pub winner: Option<AccountId>,
    /// Fee share credited to the ledger
    pub fee: Amount,
    /// Net proceeds owed to the beneficiary
    pub net: Amount,
    /// The custodied asset to release
    pub asset: AssetRef,
    /// Winner, or the starter when there was no winner
    pub asset_recipient: AccountId,
    /// Principal owed the net proceeds
    pub beneficiary: AccountId,
}

/// Per-lottery result reported back to the fulfillment caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementOutcome {
    /// Settled lottery
    pub lottery_id: LotteryId,
    /// Drawn winner
    pub winner: Option<AccountId>,
    /// Fee share taken
    pub fee: Amount,
    /// Net proceeds for the beneficiary
    pub net: Amount,
    /// Number of external transfers that failed and were deferred
    pub deferred: usize,
}

/// Pick the winning index for one random word: `word mod players.len()`.
///
/// Uniform words give a uniform winner distribution over the player list.
pub fn winner_index(word: u64, player_count: usize) -> Option<usize> {
    if player_count == 0 {
        None
    } else {
        Some((word % player_count as u64) as usize)
    }
}

/// Drive one record to its terminal state and say what must move where.
///
/// Mutates the record only: winner set exactly once, pot zeroed, `active`
/// cleared. Never touches anything external, so it cannot fail and cannot
/// leave a half-settled record.
pub fn finalize_record(lottery: &mut Lottery, word: u64, fee_percent: u8) -> SettlementPlan {
    debug_assert!(lottery.active, "finalize called on a settled record");

    let winner = winner_index(word, lottery.players.len()).map(|i| lottery.players[i].clone());
    let (fee, net) = fee_split(lottery.balance, fee_percent);

    lottery.winner = winner.clone();
    lottery.balance = 0;
    lottery.active = false;

    let asset_recipient = winner.clone().unwrap_or_else(|| lottery.starter.clone());
    debug!(
        lottery_id = lottery.id,
        winner = winner.as_ref().map(|w| w.0.as_str()),
        fee = %fee,
        net = %net,
        "record finalized"
    );

    SettlementPlan {
        lottery_id: lottery.id,
        winner,
        fee,
        net,
        asset: lottery.asset.clone(),
        asset_recipient,
        beneficiary: lottery.beneficiary.clone(),
    }
}
