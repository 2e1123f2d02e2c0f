/*!
Core raffle engine

Orchestrates the full lottery lifecycle: custody intake at creation, ticket
sales, keeper-driven batching of expired lotteries into randomness requests,
and settlement when the fulfillment arrives.

Every public operation takes the state lock for its whole span, which gives
the strictly sequential, atomic-per-call execution model: validation runs
before any mutation, so an error return never leaves partial state behind.
Fund-moving paths update internal ledgers strictly before calling out to a
collaborator.
*/

use crate::collaborators::{AssetCustody, Clock, FundsLedger, RandomnessSource};
use crate::error::{AuthorizationError, Result, StateError, ValidationError};
use crate::events::EngineEvent;
use crate::fees::FeeLedger;
use crate::lifecycle;
use crate::registry::Registry;
use crate::settlement::{
    self, DeferredKind, DeferredTransfer, PendingBatch, PendingTable, SettlementOutcome,
    UpkeepStatus,
};
use crate::types::{AccountId, Amount, AssetRef, Lottery, LotteryId, RequestId, Timestamp};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use tracing::{error, info, instrument, warn};

pub mod config;

pub use config::EngineConfig;

/// Shared mutable engine state, touched only under the facade's lock
struct EngineState {
    registry: Registry,
    fees: FeeLedger,
    pending: PendingTable,
    deferred: Vec<DeferredTransfer>,
}

/// Main raffle engine instance
pub struct RaffleEngine {
    config: EngineConfig,
    state: RwLock<EngineState>,
    custody: Arc<dyn AssetCustody>,
    randomness: Arc<dyn RandomnessSource>,
    ledger: Arc<dyn FundsLedger>,
    clock: Arc<dyn Clock>,
    events: broadcast::Sender<EngineEvent>,
}

impl RaffleEngine {
    /// Create an engine wired to its external collaborators
    pub fn new(
        config: EngineConfig,
        custody: Arc<dyn AssetCustody>,
        randomness: Arc<dyn RandomnessSource>,
        ledger: Arc<dyn FundsLedger>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        config.validate()?;
        let (events, _) = broadcast::channel(config.event_capacity);

        info!(
            operator = %config.operator,
            escrow = %config.escrow_account,
            fee_percent = config.fee_percent,
            "raffle engine initialized"
        );

        Ok(Self {
            config,
            state: RwLock::new(EngineState {
                registry: Registry::new(),
                fees: FeeLedger::new(),
                pending: PendingTable::new(),
                deferred: Vec::new(),
            }),
            custody,
            randomness,
            ledger,
            clock,
            events,
        })
    }

    /// Subscribe to engine events
    pub fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.events.subscribe()
    }

    /// Start a lottery over `asset`, pulling it into escrow.
    ///
    /// `caller` must hold transfer authority over the asset; the ticket price
    /// must be positive and `end_time` strictly in the future.
    #[instrument(skip(self), fields(caller = %caller, asset = %asset))]
    pub async fn start_lottery(
        &self,
        caller: AccountId,
        asset: AssetRef,
        ticket_price: Amount,
        beneficiary: AccountId,
        end_time: Timestamp,
    ) -> Result<LotteryId> {
        let now = self.clock.now();
        lifecycle::validate_creation(ticket_price, end_time, now)?;

        if !self.custody.is_authorized(&caller, &asset).await? {
            return Err(AuthorizationError::NotAssetAuthority.into());
        }

        // Custody moves first; the record only exists once the asset is ours
        self.custody
            .transfer(&caller, &self.config.escrow_account, &asset)
            .await?;

        let mut state = self.state.write().await;
        let lottery_id = state.registry.insert_with(|id| {
            lifecycle::new_lottery(
                id,
                caller.clone(),
                asset.clone(),
                ticket_price,
                beneficiary.clone(),
                end_time,
            )
        });

        info!(lottery_id, end_time, "lottery started");
        self.emit(EngineEvent::LotteryStarted { lottery_id });
        Ok(lottery_id)
    }

    /// Buy one ticket for `lottery_id`.
    ///
    /// Fails once `now >= end_time` regardless of the stored `active` flag,
    /// and rejects any payment other than the exact ticket price.
    #[instrument(skip(self), fields(caller = %caller))]
    pub async fn buy_ticket(
        &self,
        caller: AccountId,
        lottery_id: LotteryId,
        payment: Amount,
    ) -> Result<()> {
        let now = self.clock.now();
        let mut state = self.state.write().await;
        let lottery = state.registry.get_mut(lottery_id)?;
        lifecycle::record_purchase(lottery, caller.clone(), payment, now)?;

        self.emit(EngineEvent::TicketPurchased {
            lottery_id,
            buyer: caller,
        });
        Ok(())
    }

    /// Read-only scan for lotteries awaiting settlement.
    ///
    /// Safe to call arbitrarily often; never mutates anything.
    pub async fn check_upkeep(&self) -> UpkeepStatus {
        let now = self.clock.now();
        let state = self.state.read().await;
        settlement::scan_due(&state.registry, &state.pending, now)
    }

    /// Batch every due lottery into one randomness request.
    ///
    /// One request covers all simultaneously expired lotteries, amortizing
    /// the fixed cost of a randomness round. Fails with `NoPendingLotteries`
    /// when nothing is due, leaving no state behind.
    #[instrument(skip(self))]
    pub async fn request_words_pending_lotteries(&self) -> Result<RequestId> {
        let now = self.clock.now();
        let mut state = self.state.write().await;

        let status = settlement::scan_due(&state.registry, &state.pending, now);
        if !status.due {
            return Err(StateError::NoPendingLotteries.into());
        }

        let request_id = self.randomness.request(status.candidates.len()).await?;
        state.pending.insert(PendingBatch {
            request_id,
            lottery_ids: status.candidates.clone(),
            requested_at: now,
        })?;

        info!(
            request_id,
            lotteries = status.candidates.len(),
            "randomness requested for pending batch"
        );
        self.emit(EngineEvent::BatchRequested {
            request_id,
            lottery_ids: status.candidates,
        });
        Ok(request_id)
    }

    /// Inbound randomness fulfillment, one word per lottery in batch order.
    ///
    /// Callable only by the configured randomness authority. The batch is
    /// consumed before anything moves, so a replayed `request_id` fails with
    /// `UnknownOrConsumedRequest` and cannot double-transfer funds or assets.
    /// Each lottery settles in isolation: a rejecting recipient defers that
    /// one transfer instead of blocking the rest of the batch.
    #[instrument(skip(self, words), fields(caller = %caller))]
    pub async fn fulfill_randomness(
        &self,
        caller: AccountId,
        request_id: RequestId,
        words: Vec<u64>,
    ) -> Result<Vec<SettlementOutcome>> {
        if caller != self.config.randomness_authority {
            return Err(AuthorizationError::NotRandomnessAuthority.into());
        }

        let mut state = self.state.write().await;

        // Shape check before the batch is consumed, so a malformed
        // fulfillment can be corrected and resubmitted
        let batch_len = state
            .pending
            .get(request_id)
            .ok_or(StateError::UnknownOrConsumedRequest(request_id))?
            .lottery_ids
            .len();
        if words.len() != batch_len {
            return Err(ValidationError::WordCountMismatch {
                expected: batch_len,
                got: words.len(),
            }
            .into());
        }

        let batch = state.pending.consume(request_id)?;
        let mut outcomes = Vec::with_capacity(batch.lottery_ids.len());

        for (lottery_id, word) in batch.lottery_ids.iter().copied().zip(words) {
            let lottery = state.registry.get_mut(lottery_id)?;
            let plan = settlement::finalize_record(lottery, word, self.config.fee_percent);

            // Internal ledgers settle before any external transfer
            state.fees.credit(plan.fee);

            let mut deferred = 0;
            if let Err(e) = self
                .custody
                .transfer(&self.config.escrow_account, &plan.asset_recipient, &plan.asset)
                .await
            {
                error!(lottery_id, error = %e, "asset release failed, deferring");
                state.deferred.push(DeferredTransfer {
                    lottery_id,
                    recipient: plan.asset_recipient.clone(),
                    kind: DeferredKind::Asset(plan.asset.clone()),
                });
                deferred += 1;
            }

            if plan.net > 0 {
                if let Err(e) = self.ledger.credit(&plan.beneficiary, plan.net).await {
                    error!(lottery_id, error = %e, "beneficiary payout failed, deferring");
                    state.deferred.push(DeferredTransfer {
                        lottery_id,
                        recipient: plan.beneficiary.clone(),
                        kind: DeferredKind::Funds(plan.net),
                    });
                    deferred += 1;
                }
            }

            info!(
                lottery_id,
                winner = plan.winner.as_ref().map(|w| w.0.as_str()),
                fee = %plan.fee,
                net = %plan.net,
                "lottery settled"
            );
            self.emit(EngineEvent::LotterySettled {
                lottery_id,
                winner: plan.winner.clone(),
            });
            outcomes.push(SettlementOutcome {
                lottery_id,
                winner: plan.winner,
                fee: plan.fee,
                net: plan.net,
                deferred,
            });
        }

        Ok(outcomes)
    }

    /// Pay the accrued platform fee out to the operator.
    ///
    /// The ledger is zeroed before the external payout so a reentrant call
    /// can never observe a still-spendable balance; if the payout itself
    /// fails the accrual is restored and the error propagated.
    #[instrument(skip(self), fields(caller = %caller))]
    pub async fn withdraw_fee_gains(&self, caller: AccountId) -> Result<Amount> {
        if caller != self.config.operator {
            return Err(AuthorizationError::NotOperator.into());
        }

        let mut state = self.state.write().await;
        let amount = state.fees.take_all();
        if amount == 0 {
            return Ok(0);
        }

        if let Err(e) = self.ledger.credit(&self.config.operator, amount).await {
            state.fees.credit(amount);
            return Err(e);
        }

        info!(amount = %amount, "fee gains withdrawn");
        Ok(amount)
    }

    /// Re-attempt transfers deferred during batch settlement.
    ///
    /// Operator only. Returns the number delivered; still-failing transfers
    /// stay recorded.
    #[instrument(skip(self), fields(caller = %caller))]
    pub async fn retry_deferred_transfers(&self, caller: AccountId) -> Result<usize> {
        if caller != self.config.operator {
            return Err(AuthorizationError::NotOperator.into());
        }

        let mut state = self.state.write().await;
        let attempts = std::mem::take(&mut state.deferred);
        let total = attempts.len();
        let mut delivered = 0;

        for transfer in attempts {
            let result = match &transfer.kind {
                DeferredKind::Asset(asset) => {
                    self.custody
                        .transfer(&self.config.escrow_account, &transfer.recipient, asset)
                        .await
                }
                DeferredKind::Funds(amount) => {
                    self.ledger.credit(&transfer.recipient, *amount).await
                }
            };
            match result {
                Ok(()) => delivered += 1,
                Err(e) => {
                    warn!(
                        lottery_id = transfer.lottery_id,
                        recipient = %transfer.recipient,
                        error = %e,
                        "deferred transfer still failing"
                    );
                    state.deferred.push(transfer);
                }
            }
        }

        info!(delivered, total, "deferred transfer retry pass complete");
        Ok(delivered)
    }

    /// Full record for one lottery
    pub async fn get_lottery(&self, lottery_id: LotteryId) -> Result<Lottery> {
        let state = self.state.read().await;
        state.registry.get(lottery_id).cloned()
    }

    /// Platform fee accrued and not yet withdrawn
    pub async fn fee_balance(&self) -> Amount {
        self.state.read().await.fees.balance()
    }

    /// Transfers still owed after failed settlement deliveries
    pub async fn deferred_transfers(&self) -> Vec<DeferredTransfer> {
        self.state.read().await.deferred.clone()
    }

    /// Counters over the whole engine state
    pub async fn stats(&self) -> EngineStats {
        let now = self.clock.now();
        let state = self.state.read().await;

        let mut open = 0;
        let mut pending_settlement = 0;
        let mut settled = 0;
        for lottery in state.registry.iter() {
            match lottery.status(now) {
                crate::types::LotteryStatus::Open => open += 1,
                crate::types::LotteryStatus::PendingSettlement => pending_settlement += 1,
                crate::types::LotteryStatus::Settled => settled += 1,
            }
        }

        EngineStats {
            lotteries: state.registry.len(),
            open,
            pending_settlement,
            settled,
            open_batches: state.pending.len(),
            deferred_transfers: state.deferred.len(),
            fee_accrued: state.fees.balance(),
        }
    }

    // Private helper methods

    /// Best-effort event broadcast; nobody listening is fine
    fn emit(&self, event: EngineEvent) {
        let _ = self.events.send(event);
    }
}

/// Engine-wide counters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineStats {
    /// Lotteries ever created
    pub lotteries: usize,
    /// Currently open for ticket sales
    pub open: usize,
    /// Expired, awaiting a draw
    pub pending_settlement: usize,
    /// Terminal
    pub settled: usize,
    /// Randomness batches awaiting fulfillment
    pub open_batches: usize,
    /// External transfers owed after failed deliveries
    pub deferred_transfers: usize,
    /// Fee accrued and not yet withdrawn
    pub fee_accrued: Amount,
}
