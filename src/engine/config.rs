/*!
Engine configuration

Principal wiring and the platform fee rate, validated before the engine
starts. A builder mirrors how deployments assemble the config field by field.
*/

use crate::error::{RaffleError, Result};
use crate::fees::DEFAULT_FEE_PERCENT;
use crate::types::AccountId;
use serde::{Deserialize, Serialize};

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Principal allowed to withdraw accrued fees and retry deferred transfers
    pub operator: AccountId,

    /// Principal under which the engine holds custodied assets
    pub escrow_account: AccountId,

    /// The only principal allowed to deliver randomness fulfillments
    pub randomness_authority: AccountId,

    /// Platform fee as a percentage of the gross pot, at most 100
    pub fee_percent: u8,

    /// Capacity of the event broadcast channel
    pub event_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            operator: AccountId::new("operator"),
            escrow_account: AccountId::new("rafflehouse-escrow"),
            randomness_authority: AccountId::new("vrf-coordinator"),
            fee_percent: DEFAULT_FEE_PERCENT,
            event_capacity: 256,
        }
    }
}

impl EngineConfig {
    /// Start building a config from the defaults
    pub fn builder() -> EngineConfigBuilder {
        EngineConfigBuilder {
            config: Self::default(),
        }
    }

    /// Check internal consistency
    pub fn validate(&self) -> Result<()> {
        if self.fee_percent > 100 {
            return Err(RaffleError::config(format!(
                "fee_percent must be at most 100, got {}",
                self.fee_percent
            )));
        }
        if self.event_capacity == 0 {
            return Err(RaffleError::config("event_capacity must be positive"));
        }
        if self.operator == self.escrow_account {
            return Err(RaffleError::config(
                "operator and escrow account must be distinct principals",
            ));
        }
        Ok(())
    }
}

/// Builder for [`EngineConfig`]
#[derive(Debug, Clone)]
pub struct EngineConfigBuilder {
    config: EngineConfig,
}

impl EngineConfigBuilder {
    /// Set the fee operator
    pub fn operator(mut self, operator: impl Into<AccountId>) -> Self {
        self.config.operator = operator.into();
        self
    }

    /// Set the escrow principal
    pub fn escrow_account(mut self, escrow: impl Into<AccountId>) -> Self {
        self.config.escrow_account = escrow.into();
        self
    }

    /// Set the trusted randomness collaborator
    pub fn randomness_authority(mut self, authority: impl Into<AccountId>) -> Self {
        self.config.randomness_authority = authority.into();
        self
    }

    /// Set the platform fee percentage
    pub fn fee_percent(mut self, percent: u8) -> Self {
        self.config.fee_percent = percent;
        self
    }

    /// Set the event channel capacity
    pub fn event_capacity(mut self, capacity: usize) -> Self {
        self.config.event_capacity = capacity;
        self
    }

    /// Finish building
    pub fn build(self) -> EngineConfig {
        self.config
    }
}
