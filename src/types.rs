/*!
Core types for rafflehouse operations

Type-safe definitions for lottery records, principals, asset references and
the identifiers shared between the engine and its external collaborators.
*/

use serde::{Deserialize, Serialize};

/// Monotonically increasing lottery identifier, never reused.
pub type LotteryId = u64;

/// Correlation id for a randomness request, supplied by the randomness collaborator.
pub type RequestId = u64;

/// Absolute timestamp in seconds since the Unix epoch.
pub type Timestamp = u64;

/// Currency amount in the smallest unit.
pub type Amount = u128;

/// Principal identity for starters, buyers, beneficiaries and operators.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccountId(pub String);

impl AccountId {
    /// Create an account id from anything string-like
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl std::fmt::Display for AccountId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for AccountId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for AccountId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Reference to one unique asset held in escrow: the collection contract it
/// lives in plus its id within that collection. Opaque to the engine core.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssetRef {
    /// The contract or collection the asset belongs to
    pub collection: AccountId,
    /// Asset id within the collection
    pub token_id: u64,
}

impl AssetRef {
    /// Create a new asset reference
    pub fn new(collection: impl Into<AccountId>, token_id: u64) -> Self {
        Self {
            collection: collection.into(),
            token_id,
        }
    }
}

impl std::fmt::Display for AssetRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}#{}", self.collection, self.token_id)
    }
}

/// A single lottery record, exclusively owned by the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lottery {
    /// Monotonic identifier assigned at creation
    pub id: LotteryId,

    /// Principal who supplied the asset
    pub starter: AccountId,

    /// The custodied asset being raffled
    pub asset: AssetRef,

    /// Fixed per-ticket price, immutable after creation, always positive
    pub ticket_price: Amount,

    /// True from creation until settlement
    pub active: bool,

    /// One entry per ticket purchased, in arrival order; duplicates allowed
    pub players: Vec<AccountId>,

    /// Accumulated ticket revenue; equals `players.len() * ticket_price`
    /// while active, zero forever once settled
    pub balance: Amount,

    /// Principal receiving net proceeds at settlement
    pub beneficiary: AccountId,

    /// Winning player, set exactly once at settlement; stays `None` when the
    /// lottery settles with zero players
    pub winner: Option<AccountId>,

    /// Absolute close time, immutable after creation
    pub end_time: Timestamp,
}

/// Derived lifecycle state of a lottery.
///
/// Transitions are strictly forward: Open -> PendingSettlement -> Settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LotteryStatus {
    /// Tickets are on sale
    Open,
    /// Past end time, awaiting the random draw
    PendingSettlement,
    /// Terminal: winner drawn, funds and asset moved
    Settled,
}

impl Lottery {
    /// Derived lifecycle status at the supplied time
    pub fn status(&self, now: Timestamp) -> LotteryStatus {
        if !self.active {
            LotteryStatus::Settled
        } else if now >= self.end_time {
            LotteryStatus::PendingSettlement
        } else {
            LotteryStatus::Open
        }
    }

    /// True while tickets can still be sold
    pub fn is_open(&self, now: Timestamp) -> bool {
        self.status(now) == LotteryStatus::Open
    }

    /// True when the lottery has expired but not yet settled
    pub fn is_due(&self, now: Timestamp) -> bool {
        self.status(now) == LotteryStatus::PendingSettlement
    }

    /// Number of tickets sold
    pub fn ticket_count(&self) -> usize {
        self.players.len()
    }
}

impl std::fmt::Display for LotteryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LotteryStatus::Open => write!(f, "open"),
            LotteryStatus::PendingSettlement => write!(f, "pending_settlement"),
            LotteryStatus::Settled => write!(f, "settled"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_lottery() -> Lottery {
        Lottery {
            id: 1,
            starter: "alice".into(),
            asset: AssetRef::new(AccountId::new("nft"), 7),
            ticket_price: 100,
            active: true,
            players: vec![],
            balance: 0,
            beneficiary: "alice".into(),
            winner: None,
            end_time: 2_000,
        }
    }

    #[test]
    fn test_status_transitions_forward() {
        let mut lottery = sample_lottery();
        assert_eq!(lottery.status(1_000), LotteryStatus::Open);
        assert_eq!(lottery.status(2_000), LotteryStatus::PendingSettlement);

        lottery.active = false;
        assert_eq!(lottery.status(2_000), LotteryStatus::Settled);
        // Settled wins over any time comparison
        assert_eq!(lottery.status(0), LotteryStatus::Settled);
    }

    #[test]
    fn test_is_due_exactly_at_end_time() {
        let lottery = sample_lottery();
        assert!(!lottery.is_due(1_999));
        assert!(lottery.is_due(2_000));
    }

    #[test]
    fn test_serde_round_trip() {
        let lottery = sample_lottery();
        let json = serde_json::to_string(&lottery).unwrap();
        let back: Lottery = serde_json::from_str(&json).unwrap();
        assert_eq!(lottery, back);
    }

    #[test]
    fn test_asset_ref_display() {
        let asset = AssetRef::new(AccountId::new("punks"), 42);
        assert_eq!(asset.to_string(), "punks#42");
    }
}
