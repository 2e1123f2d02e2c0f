/*!
In-memory collaborator doubles

Deterministic stand-ins for the asset contract, the randomness provider and
the payout rail, plus a manually advanced clock. Used by the crate's own
tests and usable by downstream integration tests; none of them perform I/O.
*/

use super::{AssetCustody, Clock, FundsLedger, RandomnessSource};
use crate::error::{CollaboratorError, Result};
use crate::types::{AccountId, Amount, AssetRef, RequestId, Timestamp};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// Manually advanced clock for tests
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicU64,
}

impl ManualClock {
    /// Create a clock fixed at `now`
    pub fn new(now: Timestamp) -> Self {
        Self {
            now: AtomicU64::new(now),
        }
    }

    /// Jump to an absolute time
    pub fn set(&self, now: Timestamp) {
        self.now.store(now, Ordering::SeqCst);
    }

    /// Advance by `delta` seconds
    pub fn advance(&self, delta: Timestamp) {
        self.now.fetch_add(delta, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        self.now.load(Ordering::SeqCst)
    }
}

/// In-memory asset contract tracking ownership and approvals
#[derive(Debug, Default)]
pub struct MockAssetCustody {
    inner: Mutex<CustodyState>,
}

#[derive(Debug, Default)]
struct CustodyState {
    owners: HashMap<AssetRef, AccountId>,
    approvals: HashMap<AssetRef, AccountId>,
    // Transfers to these recipients fail, simulating a rejecting receiver
    rejecting: Vec<AccountId>,
}

impl MockAssetCustody {
    /// Create an empty contract
    pub fn new() -> Self {
        Self::default()
    }

    /// Mint an asset directly to `owner`
    pub fn mint(&self, asset: AssetRef, owner: AccountId) {
        self.inner.lock().owners.insert(asset, owner);
    }

    /// Approve `operator` to move `asset`
    pub fn approve(&self, asset: AssetRef, operator: AccountId) {
        self.inner.lock().approvals.insert(asset, operator);
    }

    /// Make every transfer towards `recipient` fail
    pub fn reject_transfers_to(&self, recipient: AccountId) {
        self.inner.lock().rejecting.push(recipient);
    }

    /// Stop rejecting transfers towards `recipient`
    pub fn accept_transfers_to(&self, recipient: &AccountId) {
        self.inner.lock().rejecting.retain(|r| r != recipient);
    }
}

#[async_trait]
impl AssetCustody for MockAssetCustody {
    async fn owner_of(&self, asset: &AssetRef) -> Result<AccountId> {
        self.inner
            .lock()
            .owners
            .get(asset)
            .cloned()
            .ok_or_else(|| CollaboratorError::AssetTransfer(format!("unknown asset {asset}")).into())
    }

    async fn is_authorized(&self, caller: &AccountId, asset: &AssetRef) -> Result<bool> {
        let state = self.inner.lock();
        let owns = state.owners.get(asset) == Some(caller);
        let approved = state.approvals.get(asset) == Some(caller);
        Ok(owns || approved)
    }

    async fn transfer(&self, from: &AccountId, to: &AccountId, asset: &AssetRef) -> Result<()> {
        let mut state = self.inner.lock();
        if state.rejecting.contains(to) {
            return Err(
                CollaboratorError::AssetTransfer(format!("{to} rejected asset {asset}")).into(),
            );
        }
        match state.owners.get(asset) {
            Some(owner) if owner == from => {
                state.owners.insert(asset.clone(), to.clone());
                state.approvals.remove(asset);
                Ok(())
            }
            Some(owner) => Err(CollaboratorError::AssetTransfer(format!(
                "asset {asset} owned by {owner}, not {from}"
            ))
            .into()),
            None => Err(CollaboratorError::AssetTransfer(format!("unknown asset {asset}")).into()),
        }
    }
}

/// Randomness provider double handing out sequential request ids
#[derive(Debug, Default)]
pub struct MockRandomnessSource {
    next_request_id: AtomicU64,
    requests: Mutex<Vec<(RequestId, usize)>>,
    fail: Mutex<bool>,
}

impl MockRandomnessSource {
    /// Create a provider whose first request id is 1
    pub fn new() -> Self {
        Self {
            next_request_id: AtomicU64::new(1),
            requests: Mutex::new(Vec::new()),
            fail: Mutex::new(false),
        }
    }

    /// Make subsequent requests fail
    pub fn set_failing(&self, failing: bool) {
        *self.fail.lock() = failing;
    }

    /// All `(request_id, num_words)` pairs issued so far
    pub fn requests(&self) -> Vec<(RequestId, usize)> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl RandomnessSource for MockRandomnessSource {
    async fn request(&self, num_words: usize) -> Result<RequestId> {
        if *self.fail.lock() {
            return Err(CollaboratorError::RandomnessRequest("provider offline".into()).into());
        }
        let request_id = self.next_request_id.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().push((request_id, num_words));
        Ok(request_id)
    }
}

/// Payout rail double keeping per-account balances
#[derive(Debug, Default)]
pub struct MockFundsLedger {
    balances: Mutex<HashMap<AccountId, Amount>>,
    rejecting: Mutex<Vec<AccountId>>,
}

impl MockFundsLedger {
    /// Create an empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every payout towards `recipient` fail
    pub fn reject_payments_to(&self, recipient: AccountId) {
        self.rejecting.lock().push(recipient);
    }

    /// Stop rejecting payouts towards `recipient`
    pub fn accept_payments_to(&self, recipient: &AccountId) {
        self.rejecting.lock().retain(|r| r != recipient);
    }

    /// Total credited to `account` so far
    pub fn balance_of(&self, account: &AccountId) -> Amount {
        self.balances.lock().get(account).copied().unwrap_or(0)
    }
}

#[async_trait]
impl FundsLedger for MockFundsLedger {
    async fn credit(&self, to: &AccountId, amount: Amount) -> Result<()> {
        if self.rejecting.lock().contains(to) {
            return Err(CollaboratorError::FundsTransfer(format!("{to} rejected payment")).into());
        }
        *self.balances.lock().entry(to.clone()).or_insert(0) += amount;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock() {
        let clock = ManualClock::new(100);
        assert_eq!(clock.now(), 100);
        clock.advance(50);
        assert_eq!(clock.now(), 150);
        clock.set(10);
        assert_eq!(clock.now(), 10);
    }

    #[tokio::test]
    async fn test_custody_ownership_and_approval() {
        let custody = MockAssetCustody::new();
        let asset = AssetRef::new(AccountId::new("nft"), 0);
        custody.mint(asset.clone(), "alice".into());

        assert!(custody.is_authorized(&"alice".into(), &asset).await.unwrap());
        assert!(!custody.is_authorized(&"bob".into(), &asset).await.unwrap());

        custody.approve(asset.clone(), "bob".into());
        assert!(custody.is_authorized(&"bob".into(), &asset).await.unwrap());
    }

    #[tokio::test]
    async fn test_custody_transfer_clears_approval() {
        let custody = MockAssetCustody::new();
        let asset = AssetRef::new(AccountId::new("nft"), 1);
        custody.mint(asset.clone(), "alice".into());
        custody.approve(asset.clone(), "escrow".into());

        custody
            .transfer(&"alice".into(), &"escrow".into(), &asset)
            .await
            .unwrap();
        assert_eq!(custody.owner_of(&asset).await.unwrap(), AccountId::new("escrow"));
        assert!(!custody.is_authorized(&"alice".into(), &asset).await.unwrap());
    }

    #[tokio::test]
    async fn test_randomness_source_sequences_ids() {
        let randomness = MockRandomnessSource::new();
        assert_eq!(randomness.request(3).await.unwrap(), 1);
        assert_eq!(randomness.request(1).await.unwrap(), 2);
        assert_eq!(randomness.requests(), vec![(1, 3), (2, 1)]);
    }

    #[tokio::test]
    async fn test_funds_ledger_rejection() {
        let ledger = MockFundsLedger::new();
        ledger.reject_payments_to("eve".into());

        assert!(ledger.credit(&"eve".into(), 10).await.is_err());
        ledger.credit(&"bob".into(), 10).await.unwrap();
        assert_eq!(ledger.balance_of(&"bob".into()), 10);
    }
}
