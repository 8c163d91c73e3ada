//! Cheap, mostly stateless checks that run ahead of everything expensive.

use itertools::Itertools;

use crate::ante::error::AdmissionError;
use crate::ante::gas_meter::GasKind;
use crate::ante::ChainStep;
use crate::ante::Next;
use crate::ante::ProcessingContext;
use crate::models::coin::Coin;
use crate::models::transaction::AdmissionTx;
use crate::state::StateAccess;

/// Hard cap of one message per transaction. Runs first, so no later step
/// ever sees a multi-message transaction.
#[derive(Debug, Clone, Copy)]
pub struct MsgCountGuard;

impl<T: AdmissionTx> ChainStep<T> for MsgCountGuard {
    fn run(
        &self,
        state: &mut dyn StateAccess,
        ctx: &mut ProcessingContext,
        tx: &mut T,
        next: Next<'_, T>,
    ) -> Result<(), AdmissionError> {
        let count = tx.msgs().len();
        if count > 1 {
            return Err(AdmissionError::TooManyMessages(count));
        }
        next.call(state, ctx, tx)
    }
}

/// Stateless shape validation: at least one message, at least one
/// signature, and a well-formed declared fee (valid, unique denominations).
#[derive(Debug, Clone, Copy)]
pub struct ShapeGuard;

impl<T: AdmissionTx> ChainStep<T> for ShapeGuard {
    fn run(
        &self,
        state: &mut dyn StateAccess,
        ctx: &mut ProcessingContext,
        tx: &mut T,
        next: Next<'_, T>,
    ) -> Result<(), AdmissionError> {
        if tx.msgs().is_empty() {
            return Err(AdmissionError::NoMessages);
        }
        if tx.signatures().is_empty() {
            return Err(AdmissionError::NoSignatures);
        }
        if let Some(fee_coins) = tx.fee_declared() {
            for coin in fee_coins {
                if !Coin::is_valid_denom(&coin.denom) {
                    return Err(AdmissionError::InvalidFeeDenom(coin.denom.clone()));
                }
            }
            if let Some(duplicate) = fee_coins
                .iter()
                .map(|coin| &coin.denom)
                .duplicates()
                .next()
            {
                return Err(AdmissionError::DuplicateFeeDenom(duplicate.clone()));
            }
        }
        next.call(state, ctx, tx)
    }
}

/// Bounds the memo length.
#[derive(Debug, Clone, Copy)]
pub struct MemoGuard {
    max_memo_characters: usize,
}

impl MemoGuard {
    pub fn new(max_memo_characters: usize) -> Self {
        Self {
            max_memo_characters,
        }
    }
}

impl<T: AdmissionTx> ChainStep<T> for MemoGuard {
    fn run(
        &self,
        state: &mut dyn StateAccess,
        ctx: &mut ProcessingContext,
        tx: &mut T,
        next: Next<'_, T>,
    ) -> Result<(), AdmissionError> {
        let len = tx.memo().len();
        if len > self.max_memo_characters {
            return Err(AdmissionError::MemoTooLong {
                len,
                max: self.max_memo_characters,
            });
        }
        next.call(state, ctx, tx)
    }
}

/// Constant per-byte gas pre-charge over the encoded transaction.
///
/// On the bounded meter this is untracked and therefore free; the infinite
/// meter used for genesis and simulation records it.
#[derive(Debug, Clone, Copy)]
pub struct TxSizeGasCharge {
    cost_per_byte: u64,
}

impl TxSizeGasCharge {
    pub fn new(cost_per_byte: u64) -> Self {
        Self { cost_per_byte }
    }
}

impl<T: AdmissionTx> ChainStep<T> for TxSizeGasCharge {
    fn run(
        &self,
        state: &mut dyn StateAccess,
        ctx: &mut ProcessingContext,
        tx: &mut T,
        next: Next<'_, T>,
    ) -> Result<(), AdmissionError> {
        let amount = self.cost_per_byte.saturating_mul(tx.encoded_len());
        ctx.gas_meter.consume(amount, GasKind::TxSize)?;
        next.call(state, ctx, tx)
    }
}
