//! The fee/commission decorator: computes what the transaction owes in
//! base currency, collects it in whatever coin the payer declared, and
//! rewrites the recorded gas so downstream accounting matches the bill.

use tracing::debug;

use crate::ante::commission::required_commission;
use crate::ante::deduct::deduct_fee;
use crate::ante::error::AdmissionError;
use crate::ante::gas_meter::GasKind;
use crate::ante::gas_meter::GasMeter;
use crate::ante::ChainStep;
use crate::ante::Next;
use crate::ante::ProcessingContext;
use crate::bonding_curve::sale_amount;
use crate::config_models::chain_params::DELEGATE_GAS_MULTIPLIER;
use crate::models::coin::Coin;
use crate::models::transaction::AdmissionTx;
use crate::models::transaction::Msg;
use crate::state::StateAccess;

/// Computes, verifies and collects the commission.
///
/// Skipped entirely at genesis (height 0). Requires the fee capability and
/// the legacy gas-rewrite capability; a transaction exposing neither is
/// rejected before any computation.
///
/// With an empty declared fee the commission is collected directly in the
/// native bonded denomination. With a declared fee, the first fee coin is
/// taken at face value when it *is* the native denomination and is
/// otherwise valued through the bonding-curve sale formula; a converted
/// value below the required commission is an insufficient-funds rejection.
///
/// After deduction the transaction's recorded gas want is overwritten with
/// the base-currency charge (ten times that for a delegation) and a fresh
/// bounded meter of exactly that size is installed with the charge already
/// consumed: the transaction is billed exactly the gas it paid for, always
/// precisely at its own limit.
#[derive(Debug, Clone, Copy)]
pub struct FeeDecorator;

impl<T: AdmissionTx> ChainStep<T> for FeeDecorator {
    fn run(
        &self,
        state: &mut dyn StateAccess,
        ctx: &mut ProcessingContext,
        tx: &mut T,
        next: Next<'_, T>,
    ) -> Result<(), AdmissionError> {
        if ctx.block_height == 0 {
            return next.call(state, ctx, tx);
        }
        let fee_coins = tx
            .fee_declared()
            .ok_or(AdmissionError::MissingCapability("fee"))?
            .to_vec();
        if !tx.supports_gas_rewrite() {
            return Err(AdmissionError::MissingCapability("fee mutation"));
        }
        let payer = tx
            .fee_payer()
            .ok_or(AdmissionError::MissingCapability("fee"))?;
        state
            .accounts()
            .get(&payer)
            .ok_or(AdmissionError::UnknownAccount(payer))?;

        let commission = required_commission(tx);
        let bond_denom = state.coins().bond_denom().to_string();

        let (fee_coin, base_fee) = match fee_coins.first() {
            None => {
                if commission == 0 {
                    return next.call(state, ctx, tx);
                }
                (Coin::new(bond_denom, commission), commission)
            }
            Some(declared) => {
                let base_fee = if declared.denom == bond_denom {
                    declared.amount
                } else {
                    let info = state
                        .coins()
                        .get_coin(&declared.denom)
                        .ok_or_else(|| AdmissionError::UnknownCoin(declared.denom.clone()))?;
                    if info.reserve < commission {
                        return Err(AdmissionError::InsufficientCoinReserve {
                            denom: declared.denom.clone(),
                            reserve: info.reserve,
                            commission,
                        });
                    }
                    sale_amount(info.volume, info.reserve, info.crr, declared.amount)
                };
                if base_fee < commission {
                    return Err(AdmissionError::InsufficientFunds {
                        denom: bond_denom,
                        required: commission,
                        available: base_fee,
                    });
                }
                (declared.clone(), base_fee)
            }
        };

        deduct_fee(state, ctx, &payer, &fee_coin, base_fee)?;

        let charge = if matches!(tx.msgs().first(), Some(Msg::Delegate { .. })) {
            base_fee.saturating_mul(DELEGATE_GAS_MULTIPLIER)
        } else {
            base_fee
        };
        let gas = u64::try_from(charge).map_err(|_| AdmissionError::CommissionOverflow(charge))?;
        tx.rewrite_gas(gas);
        ctx.gas_meter = GasMeter::bounded(gas);
        // Consumed == limit by construction; this cannot fail.
        ctx.gas_meter.consume(gas, GasKind::Commission)?;
        debug!(
            %payer,
            commission,
            base_fee,
            gas,
            "commission collected and gas rewritten"
        );

        next.call(state, ctx, tx)
    }
}

#[cfg(test)]
mod tests {
    use crate::ante::AdmissionChain;
    use crate::models::account::Address;
    use crate::models::account::PublicKey;
    use crate::models::coin::CoinPriceInfo;
    use crate::models::transaction::StdFee;
    use crate::models::transaction::StdSignature;
    use crate::models::transaction::StdTx;
    use crate::state::memory::MemoryChainState;
    use crate::state::AccountStore;

    use super::*;

    fn signer() -> PublicKey {
        PublicKey::new([5; 32])
    }

    fn tx_with(msg: Msg, fee_amount: Vec<Coin>) -> StdTx {
        StdTx {
            msgs: vec![msg],
            fee: StdFee {
                amount: fee_amount,
                gas: 1,
            },
            signatures: vec![StdSignature {
                public_key: signer(),
                signature: vec![],
            }],
            memo: String::new(),
        }
    }

    fn funded_state(amount: u128) -> MemoryChainState {
        let mut state = MemoryChainState::new("ulgn");
        state.accounts.create(signer().address());
        state
            .ledger
            .credit(signer().address(), Coin::new("ulgn", amount));
        state
    }

    fn run_fee(
        state: &mut MemoryChainState,
        ctx: &mut ProcessingContext,
        tx: &mut StdTx,
    ) -> Result<(), AdmissionError> {
        let chain = AdmissionChain::new(vec![Box::new(FeeDecorator) as Box<dyn ChainStep<StdTx>>]);
        chain.handle(state, ctx, tx).map(|_| ())
    }

    #[test]
    fn genesis_skips_the_decorator_entirely() {
        let mut state = MemoryChainState::new("ulgn");
        let mut ctx = ProcessingContext::new(0, 0);
        let mut tx = tx_with(Msg::SetOnline, vec![]);
        run_fee(&mut state, &mut ctx, &mut tx).unwrap();
        assert_eq!(state.ledger.fee_collector_balance("ulgn"), 0);
    }

    #[test]
    fn an_unknown_payer_is_fatal() {
        let mut state = MemoryChainState::new("ulgn");
        let mut ctx = ProcessingContext::new(5, 0);
        let mut tx = tx_with(Msg::SetOnline, vec![]);
        let err = run_fee(&mut state, &mut ctx, &mut tx).unwrap_err();
        assert_eq!(err, AdmissionError::UnknownAccount(signer().address()));
    }

    #[test]
    fn empty_fee_is_collected_in_the_native_denomination() {
        let mut tx = tx_with(Msg::SetOnline, vec![]);
        let commission = required_commission(&tx);
        let mut state = funded_state(commission);
        let mut ctx = ProcessingContext::new(5, 0);
        run_fee(&mut state, &mut ctx, &mut tx).unwrap();

        assert_eq!(state.ledger.fee_collector_balance("ulgn"), commission);
        assert_eq!(tx.fee.gas, u64::try_from(commission).unwrap());
        assert_eq!(ctx.gas_meter.gas_consumed(), tx.fee.gas);
        assert_eq!(ctx.gas_meter.gas_limit(), tx.fee.gas);
    }

    #[test]
    fn native_fee_is_taken_at_face_value_without_conversion() {
        let mut tx = tx_with(Msg::SetOnline, vec![Coin::new("ulgn", 0)]);
        let commission = required_commission(&tx);
        tx.fee.amount = vec![Coin::new("ulgn", commission)];
        let mut state = funded_state(commission);
        let mut ctx = ProcessingContext::new(5, 0);
        run_fee(&mut state, &mut ctx, &mut tx).unwrap();
        assert_eq!(state.ledger.fee_collector_balance("ulgn"), commission);
    }

    #[test]
    fn a_curve_coin_fee_is_valued_through_the_sale_formula() {
        let info = CoinPriceInfo {
            reserve: 10u128.pow(24),
            volume: 10u128.pow(24),
            crr: 100,
        };
        let mut tx = tx_with(Msg::SetOnline, vec![Coin::new("reef", 0)]);
        let commission = required_commission(&tx);
        // Linear curve: face value converts one to one.
        tx.fee.amount = vec![Coin::new("reef", commission)];

        let mut state = MemoryChainState::new("ulgn");
        state.accounts.create(signer().address());
        state.coins.register("reef", info);
        state
            .ledger
            .credit(signer().address(), Coin::new("reef", commission));
        let mut ctx = ProcessingContext::new(5, 0);
        run_fee(&mut state, &mut ctx, &mut tx).unwrap();

        let expected = sale_amount(info.volume, info.reserve, info.crr, commission);
        assert_eq!(ctx.gas_meter.gas_consumed(), u64::try_from(expected).unwrap());
        assert_eq!(state.ledger.fee_collector_balance("reef"), commission);
    }

    #[test]
    fn an_exhausted_reserve_is_rejected_before_conversion() {
        let mut tx = tx_with(Msg::SetOnline, vec![Coin::new("reef", 10)]);
        let commission = required_commission(&tx);
        let mut state = MemoryChainState::new("ulgn");
        state.accounts.create(signer().address());
        state.coins.register(
            "reef",
            CoinPriceInfo {
                reserve: commission - 1,
                volume: 10u128.pow(24),
                crr: 50,
            },
        );
        let mut ctx = ProcessingContext::new(5, 0);
        let err = run_fee(&mut state, &mut ctx, &mut tx).unwrap_err();
        assert!(matches!(err, AdmissionError::InsufficientCoinReserve { .. }));
    }

    #[test]
    fn a_fee_converting_below_the_commission_is_insufficient_funds() {
        let mut tx = tx_with(Msg::SetOnline, vec![Coin::new("reef", 1)]);
        let commission = required_commission(&tx);
        let mut state = MemoryChainState::new("ulgn");
        state.accounts.create(signer().address());
        state.coins.register(
            "reef",
            CoinPriceInfo {
                reserve: commission * 2,
                volume: 10u128.pow(24),
                crr: 100,
            },
        );
        let mut ctx = ProcessingContext::new(5, 0);
        let err = run_fee(&mut state, &mut ctx, &mut tx).unwrap_err();
        assert!(matches!(err, AdmissionError::InsufficientFunds { .. }));
        assert_eq!(state.ledger.fee_collector_balance("reef"), 0);
    }

    #[test]
    fn delegations_are_billed_ten_times_their_commission_in_gas() {
        let delegate = Msg::Delegate {
            validator: Address::default(),
            stake: Coin::new("ulgn", 1),
        };
        let mut tx = tx_with(delegate, vec![]);
        let commission = required_commission(&tx);
        let mut state = funded_state(commission);
        let mut ctx = ProcessingContext::new(5, 0);
        run_fee(&mut state, &mut ctx, &mut tx).unwrap();

        let expected = u64::try_from(commission * DELEGATE_GAS_MULTIPLIER).unwrap();
        assert_eq!(tx.fee.gas, expected);
        assert_eq!(ctx.gas_meter.gas_consumed(), expected);
        // The deduction itself is the commission, not the inflated gas.
        assert_eq!(state.ledger.fee_collector_balance("ulgn"), commission);
    }
}
