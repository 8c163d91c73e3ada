//! Moving a computed fee out of the payer's balance and into the fee pool.

use tracing::info;

use crate::ante::error::AdmissionError;
use crate::ante::ProcessingContext;
use crate::config_models::chain_params::MIN_COIN_RESERVE;
use crate::config_models::chain_params::RESERVE_FLOOR_ACTIVATION_HEIGHT;
use crate::models::account::Address;
use crate::models::coin::Coin;
use crate::state::StateAccess;

/// Deduct `fee` from `payer` and credit the protocol fee collector.
///
/// `base_equivalent` is the fee's worth in base-currency units: equal to
/// the face amount when the fee is paid in the base coin, or the
/// bonding-curve sale value otherwise. Every check below is a hard
/// precondition; the first failure aborts with nothing mutated.
///
/// Above [`RESERVE_FLOOR_ACTIVATION_HEIGHT`] two extra rules bind for
/// non-base coins: the coin's reserve may not drop below
/// [`MIN_COIN_RESERVE`], and a successful deduction performs sell-side
/// bookkeeping on the curve (reserve down by the base equivalent, volume
/// down by the face amount; the base coin only loses volume). Below the
/// activation height the coin record is left untouched.
pub fn deduct_fee(
    state: &mut dyn StateAccess,
    ctx: &ProcessingContext,
    payer: &Address,
    fee: &Coin,
    base_equivalent: u128,
) -> Result<(), AdmissionError> {
    let info = state
        .coins()
        .get_coin(&fee.denom)
        .ok_or_else(|| AdmissionError::UnknownCoin(fee.denom.clone()))?;
    let is_base = state.coins().is_base_coin(&fee.denom);
    let floor_active = ctx.block_height > RESERVE_FLOOR_ACTIVATION_HEIGHT;

    if floor_active && !is_base && info.reserve.saturating_sub(fee.amount) < MIN_COIN_RESERVE {
        return Err(AdmissionError::ReserveFloor {
            denom: fee.denom.clone(),
            amount: fee.amount,
            floor: MIN_COIN_RESERVE,
        });
    }

    if !Coin::is_valid_denom(&fee.denom) {
        return Err(AdmissionError::InvalidFeeDenom(fee.denom.clone()));
    }

    let total = state.ledger().total_balance(payer, &fee.denom);
    if total < fee.amount {
        return Err(AdmissionError::InsufficientFunds {
            denom: fee.denom.clone(),
            required: fee.amount,
            available: total,
        });
    }
    let spendable = state
        .ledger()
        .spendable_balance(payer, &fee.denom, ctx.block_time);
    if spendable < fee.amount {
        return Err(AdmissionError::InsufficientFunds {
            denom: fee.denom.clone(),
            required: fee.amount,
            available: spendable,
        });
    }

    state
        .ledger()
        .send_to_fee_collector(payer, fee)
        .map_err(|_| AdmissionError::InsufficientFunds {
            denom: fee.denom.clone(),
            required: fee.amount,
            available: spendable,
        })?;

    // Fees re-enter supply accounting as transferable supply.
    let supply = state.supply_keeper().supply().inflate(fee);
    state.supply_keeper().set_supply(supply);

    if floor_active {
        let new_volume = info.volume.saturating_sub(fee.amount);
        let new_reserve = if is_base {
            info.reserve
        } else {
            info.reserve.saturating_sub(base_equivalent)
        };
        state.coins().update_coin(&fee.denom, new_reserve, new_volume);
    }

    info!(
        %payer,
        fee = %fee,
        base_equivalent,
        height = ctx.block_height,
        "fee deducted"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::models::account::Address;
    use crate::models::coin::CoinPriceInfo;
    use crate::state::memory::MemoryChainState;
    use crate::state::memory::VestingLock;
    use crate::state::CoinRegistry;
    use crate::state::SupplyKeeper;

    use super::*;

    const PAST_ACTIVATION: u64 = RESERVE_FLOOR_ACTIVATION_HEIGHT + 1;

    fn payer() -> Address {
        Address::from_bytes([8; 20])
    }

    fn state_with_coin(reserve: u128, volume: u128) -> MemoryChainState {
        let mut state = MemoryChainState::new("ulgn");
        state.coins.register(
            "reef",
            CoinPriceInfo {
                reserve,
                volume,
                crr: 50,
            },
        );
        state
    }

    #[test]
    fn unknown_denomination_is_fatal() {
        let mut state = MemoryChainState::new("ulgn");
        let ctx = ProcessingContext::new(1, 0);
        let err = deduct_fee(&mut state, &ctx, &payer(), &Coin::new("ghost", 10), 10).unwrap_err();
        assert_eq!(err, AdmissionError::UnknownCoin("ghost".to_string()));
    }

    #[test]
    fn reserve_floor_binds_only_past_activation_and_only_for_non_base_coins() {
        let fee = Coin::new("reef", 500);

        // Past activation, the floor rejects before any transfer.
        let mut state = state_with_coin(MIN_COIN_RESERVE + 100, 10_000);
        state.ledger.credit(payer(), fee.clone());
        let ctx = ProcessingContext::new(PAST_ACTIVATION, 0);
        let err = deduct_fee(&mut state, &ctx, &payer(), &fee, 200).unwrap_err();
        assert!(matches!(err, AdmissionError::ReserveFloor { .. }));
        assert_eq!(state.ledger.fee_collector_balance("reef"), 0);

        // Below activation the same deduction goes through.
        let mut state = state_with_coin(MIN_COIN_RESERVE + 100, 10_000);
        state.ledger.credit(payer(), fee.clone());
        let ctx = ProcessingContext::new(RESERVE_FLOOR_ACTIVATION_HEIGHT, 0);
        deduct_fee(&mut state, &ctx, &payer(), &fee, 200).unwrap();

        // The base coin has no reserve floor.
        let mut state = MemoryChainState::new("ulgn");
        state.ledger.credit(payer(), Coin::new("ulgn", 500));
        let ctx = ProcessingContext::new(PAST_ACTIVATION, 0);
        deduct_fee(&mut state, &ctx, &payer(), &Coin::new("ulgn", 500), 500).unwrap();
    }

    #[test]
    fn both_total_and_spendable_balances_must_cover_the_fee() {
        let mut state = MemoryChainState::new("ulgn");
        let ctx = ProcessingContext::new(1, 100);
        let fee = Coin::new("ulgn", 1_000);

        let err = deduct_fee(&mut state, &ctx, &payer(), &fee, 1_000).unwrap_err();
        assert_eq!(
            err,
            AdmissionError::InsufficientFunds {
                denom: "ulgn".to_string(),
                required: 1_000,
                available: 0,
            }
        );

        // Enough in total, but most of it still vesting.
        state.ledger.credit(payer(), Coin::new("ulgn", 1_200));
        state.ledger.lock(
            payer(),
            "ulgn",
            VestingLock {
                unlock_time: 500,
                amount: 1_000,
            },
        );
        let err = deduct_fee(&mut state, &ctx, &payer(), &fee, 1_000).unwrap_err();
        assert_eq!(
            err,
            AdmissionError::InsufficientFunds {
                denom: "ulgn".to_string(),
                required: 1_000,
                available: 200,
            }
        );
    }

    #[test]
    fn supply_inflates_by_the_collected_fee() {
        let mut state = MemoryChainState::new("ulgn");
        state.ledger.credit(payer(), Coin::new("ulgn", 700));
        let ctx = ProcessingContext::new(1, 0);
        deduct_fee(&mut state, &ctx, &payer(), &Coin::new("ulgn", 700), 700).unwrap();
        assert_eq!(state.supply.supply().amount_of("ulgn"), 700);
        assert_eq!(state.ledger.fee_collector_balance("ulgn"), 700);
    }

    #[test]
    fn base_coin_deduction_reduces_volume_but_never_reserve() {
        let mut state = MemoryChainState::new("ulgn");
        state.coins.update_coin("ulgn", 0, 10_000);
        state.ledger.credit(payer(), Coin::new("ulgn", 600));
        let ctx = ProcessingContext::new(PAST_ACTIVATION, 0);
        deduct_fee(&mut state, &ctx, &payer(), &Coin::new("ulgn", 600), 600).unwrap();
        let coin = state.coins.get_coin("ulgn").unwrap();
        assert_eq!(coin.volume, 10_000 - 600);
        assert_eq!(coin.reserve, 0);
    }

    #[test]
    fn curve_bookkeeping_applies_only_past_activation() {
        let fee = Coin::new("reef", 300);

        let mut state = state_with_coin(MIN_COIN_RESERVE + 10_000, 50_000);
        state.ledger.credit(payer(), fee.clone());
        let ctx = ProcessingContext::new(PAST_ACTIVATION, 0);
        deduct_fee(&mut state, &ctx, &payer(), &fee, 450).unwrap();
        let coin = state.coins.get_coin("reef").unwrap();
        assert_eq!(coin.reserve, MIN_COIN_RESERVE + 10_000 - 450);
        assert_eq!(coin.volume, 50_000 - 300);

        let mut state = state_with_coin(MIN_COIN_RESERVE + 10_000, 50_000);
        state.ledger.credit(payer(), fee.clone());
        let ctx = ProcessingContext::new(10, 0);
        deduct_fee(&mut state, &ctx, &payer(), &fee, 450).unwrap();
        let coin = state.coins.get_coin("reef").unwrap();
        assert_eq!(coin.reserve, MIN_COIN_RESERVE + 10_000);
        assert_eq!(coin.volume, 50_000);
    }
}
