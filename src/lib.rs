/*!
# Rafflehouse - Raffle Escrow & Settlement Engine

Escrow engine for fixed-price asset raffles: takes custody of a unique asset,
sells tickets for a bounded time window, and settles at expiry with a winner
drawn from an external randomness source, paying net proceeds to a designated
beneficiary and skimming a platform fee.

## Architecture

```text
┌──────────────┐   start/buy    ┌──────────────┐
│ Participants │ ─────────────> │ Lifecycle    │──┐
└──────────────┘                └──────────────┘  │ writes
                                                  ▼
┌──────────────┐  check_upkeep  ┌──────────────┐  ┌──────────────┐
│ Keeper       │ ─────────────> │ UpkeepTrigger│─>│ Registry     │
│ (external)   │  request_words └──────────────┘  │ + FeeLedger  │
└──────────────┘       │                          └──────────────┘
                       ▼                                 ▲
                ┌──────────────┐   fulfill        ┌──────────────┐
                │ Randomness   │ ───────────────> │ Settlement   │
                │ collaborator │  (async, later)  │ Engine       │
                └──────────────┘                  └──────────────┘
```

External collaborators (asset contract, randomness provider, payout rail,
clock) sit behind the traits in [`collaborators`]; in-memory doubles live in
[`collaborators::mock`].

## Quick Start

```rust,no_run
use std::sync::Arc;
use rafflehouse::{AccountId, AssetRef, EngineConfig, RaffleEngine};
use rafflehouse::collaborators::{
    ManualClock, MockAssetCustody, MockFundsLedger, MockRandomnessSource,
};

#[tokio::main]
async fn main() -> rafflehouse::Result<()> {
    rafflehouse::init();

    let custody = Arc::new(MockAssetCustody::new());
    let engine = RaffleEngine::new(
        EngineConfig::builder().fee_percent(5).build(),
        custody.clone(),
        Arc::new(MockRandomnessSource::new()),
        Arc::new(MockFundsLedger::new()),
        Arc::new(ManualClock::new(1_000)),
    )?;

    let asset = AssetRef::new(AccountId::new("punks"), 7);
    custody.mint(asset.clone(), "alice".into());
    let id = engine
        .start_lottery("alice".into(), asset, 100, "alice".into(), 2_000)
        .await?;
    engine.buy_ticket("bob".into(), id, 100).await?;
    Ok(())
}
```
*/

#![warn(missing_docs, rust_2018_idioms)]

// Re-export key types and functions for convenience
pub use engine::{EngineConfig, EngineStats, RaffleEngine};
pub use error::{RaffleError, Result};
pub use events::EngineEvent;
pub use settlement::{DeferredTransfer, SettlementOutcome, UpkeepStatus};
pub use types::*;

// Core modules
pub mod collaborators;
pub mod engine;
pub mod error;
pub mod events;
pub mod fees;
pub mod lifecycle;
pub mod registry;
pub mod settlement;
pub mod types;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize rafflehouse with default tracing configuration
pub fn init() {
    init_with_tracing("info")
}

/// Initialize rafflehouse with a custom tracing filter
pub fn init_with_tracing(filter: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("rafflehouse initialized with tracing filter: {}", filter);
}

/// Get the library version
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Get the library name
pub fn name() -> &'static str {
    env!("CARGO_PKG_NAME")
}
