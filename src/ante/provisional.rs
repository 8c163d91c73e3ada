//! The provisional-account protocol for first-time check redeemers.
//!
//! A redeem-check transaction may be signed by an account that has never
//! been persisted, but signature verification needs a stored account
//! number, and a check is always signed against account number 0, the
//! canonical new-account convention. The pre-step below breaks the cycle:
//! it materializes the account, remembers the real number it was assigned,
//! and forces the stored number to 0 so verification can succeed. After
//! verification, the post-step restores the real number.
//!
//! Per signer and pipeline invocation the account moves
//! `Unknown → Provisional(number = 0) → Verified & Restored`, and the
//! transition must complete within a single chain execution. If the chain
//! short-circuits between the two steps (a failed fee payment, a bad
//! signature), the account persists with number 0. That is documented,
//! accepted behavior: correcting it would change consensus-visible
//! account numbering, so it is left exactly as is.

use tracing::debug;
use tracing::warn;

use crate::ante::error::AdmissionError;
use crate::ante::ChainStep;
use crate::ante::Next;
use crate::ante::ProcessingContext;
use crate::models::account::Address;
use crate::models::transaction::AdmissionTx;
use crate::models::transaction::Msg;
use crate::state::StateAccess;

/// The handoff from pre-step to post-step: which account to fix up, and
/// the number it must get back. Lives in the [`ProcessingContext`] for at
/// most one chain execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PendingNumberRestore {
    pub address: Address,
    pub real_number: u64,
}

/// Pre-step: materialize a provisional account for an unknown redeem-check
/// signer. Skipped entirely on recheck passes.
#[derive(Debug, Clone, Copy)]
pub struct ProvisionalAccountSetup;

impl<T: AdmissionTx> ChainStep<T> for ProvisionalAccountSetup {
    fn run(
        &self,
        state: &mut dyn StateAccess,
        ctx: &mut ProcessingContext,
        tx: &mut T,
        next: Next<'_, T>,
    ) -> Result<(), AdmissionError> {
        if ctx.recheck {
            return next.call(state, ctx, tx);
        }
        if let [Msg::RedeemCheck { .. }] = tx.msgs() {
            if let Some(address) = tx.fee_payer() {
                if state.accounts().get(&address).is_none() {
                    let mut account = state.accounts().create(address);
                    ctx.pending_restore = Some(PendingNumberRestore {
                        address,
                        real_number: account.number,
                    });
                    account.number = 0;
                    state.accounts().set(account);
                    debug!(%address, "created provisional account with number 0");
                }
            }
        }
        next.call(state, ctx, tx)
    }
}

/// Post-step: restore the real account number once verification has
/// passed. Skipped on recheck passes.
#[derive(Debug, Clone, Copy)]
pub struct ProvisionalAccountRestore;

impl<T: AdmissionTx> ChainStep<T> for ProvisionalAccountRestore {
    fn run(
        &self,
        state: &mut dyn StateAccess,
        ctx: &mut ProcessingContext,
        tx: &mut T,
        next: Next<'_, T>,
    ) -> Result<(), AdmissionError> {
        if ctx.recheck {
            return next.call(state, ctx, tx);
        }
        if let Some(pending) = ctx.pending_restore.take() {
            let Some(mut account) = state.accounts().get(&pending.address) else {
                // The account this very pipeline created is gone; that is a
                // logic bug, not anything an attacker controls.
                warn!(
                    address = %pending.address,
                    "provisional account vanished before number restore"
                );
                return Err(AdmissionError::Internal(format!(
                    "provisional account {} missing at restore time",
                    pending.address
                )));
            };
            account.number = pending.real_number;
            state.accounts().set(account);
            debug!(
                address = %pending.address,
                number = pending.real_number,
                "restored provisional account number"
            );
        }
        next.call(state, ctx, tx)
    }
}
