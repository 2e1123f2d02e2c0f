/*!
External collaborator seams

The engine never owns a chain, a wallet or an entropy source. Each external
system it depends on sits behind an async trait here:

- `AssetCustody` — the contract holding the raffled assets
- `RandomnessSource` — the async request half of the randomness protocol
  (the fulfill half arrives as an inbound call on the engine itself)
- `FundsLedger` — outbound currency payouts
- `Clock` — the externally supplied current time

In-memory doubles for all four live in [`mock`].
*/

use crate::error::Result;
use crate::types::{AccountId, Amount, AssetRef, RequestId, Timestamp};
use async_trait::async_trait;

pub mod mock;

pub use mock::{ManualClock, MockAssetCustody, MockFundsLedger, MockRandomnessSource};

/// Asset-ownership contract backing the custodied items.
///
/// Failures surface as [`crate::error::CollaboratorError::AssetTransfer`];
/// a missing authorization check result maps to
/// [`crate::error::AuthorizationError::NotAssetAuthority`] at the call site.
#[async_trait]
pub trait AssetCustody: Send + Sync {
    /// Current owner of the asset
    async fn owner_of(&self, asset: &AssetRef) -> Result<AccountId>;

    /// Whether `caller` may move the asset (owner or approved)
    async fn is_authorized(&self, caller: &AccountId, asset: &AssetRef) -> Result<bool>;

    /// Move the asset between principals
    async fn transfer(&self, from: &AccountId, to: &AccountId, asset: &AssetRef) -> Result<()>;
}

/// Randomness provider, request half of the async request/fulfill protocol.
///
/// `request` must return immediately with a correlation id; the matching
/// words arrive later through `RaffleEngine::fulfill_randomness`, pushed by
/// the provider's own infrastructure with arbitrary delay.
#[async_trait]
pub trait RandomnessSource: Send + Sync {
    /// Issue one batched request for `num_words` random words
    async fn request(&self, num_words: usize) -> Result<RequestId>;
}

/// Outbound currency rail for beneficiary payouts and fee withdrawal.
#[async_trait]
pub trait FundsLedger: Send + Sync {
    /// Pay `amount` out to `to`
    async fn credit(&self, to: &AccountId, amount: Amount) -> Result<()>;
}

/// Source of the current time. All time-based behavior in the engine derives
/// from comparing stored end times against this value; there are no timers.
pub trait Clock: Send + Sync {
    /// Current time in seconds since the Unix epoch
    fn now(&self) -> Timestamp;
}

/// Production clock backed by the system time
#[derive(Debug, Default, Clone)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        chrono::Utc::now().timestamp().max(0) as Timestamp
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_clock_is_sane() {
        // 2020-01-01 as a floor
        assert!(SystemClock.now() > 1_577_836_800);
    }
}
