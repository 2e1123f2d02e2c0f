/*!
Platform fee accounting

A single accumulator of fee owed to the operator, plus the split arithmetic
applied at settlement. The ledger only records amounts; moving the money is
the engine's job and always happens after the ledger has been updated.
*/

use crate::types::Amount;
use serde::{Deserialize, Serialize};

/// Default platform fee, percent of the gross pot
pub const DEFAULT_FEE_PERCENT: u8 = 5;

/// Split `balance` into `(fee, net)` for the given percentage.
///
/// The fee rounds down, so the beneficiary gets every remainder unit and
/// `fee + net == balance` always holds. Computed from the quotient and
/// remainder of `balance / 100` so the intermediate product cannot overflow
/// anywhere in the `Amount` domain:
/// `floor(balance * pct / 100) == (balance / 100) * pct + (balance % 100) * pct / 100`.
pub fn fee_split(balance: Amount, fee_percent: u8) -> (Amount, Amount) {
    let pct = Amount::from(fee_percent);
    let fee = (balance / 100) * pct + (balance % 100) * pct / 100;
    (fee, balance - fee)
}

/// Accumulator of platform fee owed to the operator
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct FeeLedger {
    accrued: Amount,
}

impl FeeLedger {
    /// Create an empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a settlement's fee share
    pub fn credit(&mut self, amount: Amount) {
        self.accrued += amount;
    }

    /// Current accrued fee
    pub fn balance(&self) -> Amount {
        self.accrued
    }

    /// Zero the ledger and return what was accrued.
    ///
    /// Callers must zero through here before performing the external payout.
    pub fn take_all(&mut self) -> Amount {
        std::mem::take(&mut self.accrued)
    }
}
