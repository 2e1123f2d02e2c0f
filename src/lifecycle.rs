/*!
Lottery lifecycle

Creation and ticket purchase: validation first, record mutation second.
The engine facade handles the surrounding custody transfer and locking;
everything in this module is synchronous and touches only the record itself,
so a returned error can never leave partial state behind.
*/

use crate::error::{Result, StateError, ValidationError};
use crate::types::{AccountId, Amount, AssetRef, Lottery, LotteryId, Timestamp};
use tracing::debug;

/// Check the creation preconditions that do not involve the asset contract.
///
/// Custody authorization is checked separately by the engine before the asset
/// is pulled into escrow.
pub fn validate_creation(ticket_price: Amount, end_time: Timestamp, now: Timestamp) -> Result<()> {
    if ticket_price == 0 {
        return Err(ValidationError::InvalidTicketPrice.into());
    }
    if end_time <= now {
        return Err(ValidationError::InvalidEndTime { end_time, now }.into());
    }
    Ok(())
}

/// Build a fresh Open record. Called with an id the registry just allocated.
pub fn new_lottery(
    id: LotteryId,
    starter: AccountId,
    asset: AssetRef,
    ticket_price: Amount,
    beneficiary: AccountId,
    end_time: Timestamp,
) -> Lottery {
    Lottery {
        id,
        starter,
        asset,
        ticket_price,
        active: true,
        players: Vec::new(),
        balance: 0,
        beneficiary,
        winner: None,
        end_time,
    }
}

/// Append a ticket purchase to an open lottery.
///
/// Expiry is derived from time, not from the `active` flag: a lottery past
/// its end time refuses tickets even if settlement has not flipped the flag
/// yet. Payment must match the ticket price exactly.
pub fn record_purchase(
    lottery: &mut Lottery,
    buyer: AccountId,
    payment: Amount,
    now: Timestamp,
) -> Result<()> {
    if !lottery.active || now >= lottery.end_time {
        return Err(StateError::LotteryEnded(lottery.id).into());
    }
    if payment != lottery.ticket_price {
        return Err(ValidationError::IncorrectPaymentAmount {
            expected: lottery.ticket_price,
            got: payment,
        }
        .into());
    }

    lottery.players.push(buyer);
    lottery.balance += payment;
    debug!(
        lottery_id = lottery.id,
        tickets = lottery.players.len(),
        balance = %lottery.balance,
        "ticket recorded"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RaffleError;
    use proptest::prelude::*;

    fn open_lottery() -> Lottery {
        new_lottery(
            0,
            "alice".into(),
            AssetRef::new(AccountId::new("nft"), 0),
            100,
            "alice".into(),
            2_000,
        )
    }

    #[test]
    fn test_validate_creation() {
        assert!(validate_creation(1, 2_000, 1_000).is_ok());

        match validate_creation(0, 2_000, 1_000) {
            Err(RaffleError::Validation(ValidationError::InvalidTicketPrice)) => {}
            other => panic!("unexpected: {other:?}"),
        }
        // end_time == now is already in the past
        match validate_creation(1, 1_000, 1_000) {
            Err(RaffleError::Validation(ValidationError::InvalidEndTime { .. })) => {}
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_new_lottery_starts_empty() {
        let lottery = open_lottery();
        assert!(lottery.active);
        assert!(lottery.players.is_empty());
        assert_eq!(lottery.balance, 0);
        assert_eq!(lottery.winner, None);
    }

    #[test]
    fn test_purchase_appends_in_order() {
        let mut lottery = open_lottery();
        record_purchase(&mut lottery, "a".into(), 100, 1_000).unwrap();
        record_purchase(&mut lottery, "b".into(), 100, 1_001).unwrap();
        record_purchase(&mut lottery, "a".into(), 100, 1_002).unwrap();

        let players: Vec<_> = lottery.players.iter().map(|p| p.0.as_str()).collect();
        assert_eq!(players, vec!["a", "b", "a"]);
        assert_eq!(lottery.balance, 300);
    }

    #[test]
    fn test_purchase_rejects_wrong_payment() {
        let mut lottery = open_lottery();
        match record_purchase(&mut lottery, "a".into(), 120, 1_000) {
            Err(RaffleError::Validation(ValidationError::IncorrectPaymentAmount {
                expected: 100,
                got: 120,
            })) => {}
            other => panic!("unexpected: {other:?}"),
        }
        // Nothing mutated
        assert!(lottery.players.is_empty());
        assert_eq!(lottery.balance, 0);
    }

    #[test]
    fn test_purchase_rejects_expired_even_while_active() {
        let mut lottery = open_lottery();
        assert!(lottery.active);
        match record_purchase(&mut lottery, "a".into(), 100, 2_000) {
            Err(RaffleError::State(StateError::LotteryEnded(0))) => {}
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_purchase_rejects_settled() {
        let mut lottery = open_lottery();
        lottery.active = false;
        assert!(record_purchase(&mut lottery, "a".into(), 100, 1_000).is_err());
    }

    proptest! {
        // balance == players.len() * ticket_price after any purchase sequence
        #[test]
        fn prop_balance_tracks_ticket_count(payments in proptest::collection::vec(50u128..150, 0..40)) {
            let mut lottery = open_lottery();
            for (i, payment) in payments.iter().enumerate() {
                let _ = record_purchase(&mut lottery, AccountId::new(format!("p{i}")), *payment, 1_000);
            }
            prop_assert_eq!(
                lottery.balance,
                lottery.players.len() as u128 * lottery.ticket_price
            );
        }
    }
}
