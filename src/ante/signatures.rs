//! Signer resolution, key binding and signature verification.

use tracing::debug;

use crate::ante::error::AdmissionError;
use crate::ante::gas_meter::GasKind;
use crate::ante::ChainStep;
use crate::ante::Next;
use crate::ante::ProcessingContext;
use crate::models::transaction::AdmissionTx;
use crate::models::transaction::SignDoc;
use crate::state::StateAccess;

/// Binds each signer's declared public key to their stored account.
///
/// The first transaction an account ever signs is the chain's only chance
/// to learn its key; afterwards a differing key is rejected outright.
#[derive(Debug, Clone, Copy)]
pub struct PublicKeyBinding;

impl<T: AdmissionTx> ChainStep<T> for PublicKeyBinding {
    fn run(
        &self,
        state: &mut dyn StateAccess,
        ctx: &mut ProcessingContext,
        tx: &mut T,
        next: Next<'_, T>,
    ) -> Result<(), AdmissionError> {
        for sig in tx.signatures() {
            let address = sig.public_key.address();
            let mut account = state
                .accounts()
                .get(&address)
                .ok_or(AdmissionError::UnknownAccount(address))?;
            match account.public_key {
                None => {
                    account.public_key = Some(sig.public_key);
                    state.accounts().set(account);
                    debug!(%address, "bound public key on first use");
                }
                Some(bound) if bound != sig.public_key => {
                    return Err(AdmissionError::PublicKeyMismatch(address));
                }
                Some(_) => {}
            }
        }
        next.call(state, ctx, tx)
    }
}

/// Bounds the number of signatures per transaction.
#[derive(Debug, Clone, Copy)]
pub struct SignatureCountGuard {
    tx_sig_limit: usize,
}

impl SignatureCountGuard {
    pub fn new(tx_sig_limit: usize) -> Self {
        Self { tx_sig_limit }
    }
}

impl<T: AdmissionTx> ChainStep<T> for SignatureCountGuard {
    fn run(
        &self,
        state: &mut dyn StateAccess,
        ctx: &mut ProcessingContext,
        tx: &mut T,
        next: Next<'_, T>,
    ) -> Result<(), AdmissionError> {
        let got = tx.signatures().len();
        if got > self.tx_sig_limit {
            return Err(AdmissionError::TooManySignatures {
                got,
                max: self.tx_sig_limit,
            });
        }
        next.call(state, ctx, tx)
    }
}

/// Constant per-signature gas pre-charge, untracked on the bounded meter.
#[derive(Debug, Clone, Copy)]
pub struct SignatureGasCharge {
    cost_per_signature: u64,
}

impl SignatureGasCharge {
    pub fn new(cost_per_signature: u64) -> Self {
        Self { cost_per_signature }
    }
}

impl<T: AdmissionTx> ChainStep<T> for SignatureGasCharge {
    fn run(
        &self,
        state: &mut dyn StateAccess,
        ctx: &mut ProcessingContext,
        tx: &mut T,
        next: Next<'_, T>,
    ) -> Result<(), AdmissionError> {
        let amount = self
            .cost_per_signature
            .saturating_mul(tx.signatures().len() as u64);
        ctx.gas_meter
            .consume(amount, GasKind::SignatureVerification)?;
        next.call(state, ctx, tx)
    }
}

/// Verifies every signature against the sign doc built from *stored*
/// account state. Skipped in pure simulation.
#[derive(Debug, Clone, Copy)]
pub struct SignatureVerify;

impl<T: AdmissionTx> ChainStep<T> for SignatureVerify {
    fn run(
        &self,
        state: &mut dyn StateAccess,
        ctx: &mut ProcessingContext,
        tx: &mut T,
        next: Next<'_, T>,
    ) -> Result<(), AdmissionError> {
        if ctx.simulate {
            return next.call(state, ctx, tx);
        }
        for sig in tx.signatures() {
            let address = sig.public_key.address();
            let account = state
                .accounts()
                .get(&address)
                .ok_or(AdmissionError::UnknownAccount(address))?;
            let bound = account
                .public_key
                .ok_or(AdmissionError::MissingPublicKey(address))?;
            let doc = SignDoc {
                account_number: account.number,
                sequence: account.sequence,
                fee_amount: tx.fee_declared().unwrap_or_default().to_vec(),
                msgs: tx.msgs().to_vec(),
                memo: tx.memo().to_string(),
            };
            if !state.verifier().verify(&doc, &bound, &sig.signature) {
                return Err(AdmissionError::SignatureInvalid(address));
            }
        }
        next.call(state, ctx, tx)
    }
}

/// Bumps each signer's stored sequence number once the transaction has
/// passed verification, closing the door on replay.
#[derive(Debug, Clone, Copy)]
pub struct SequenceIncrement;

impl<T: AdmissionTx> ChainStep<T> for SequenceIncrement {
    fn run(
        &self,
        state: &mut dyn StateAccess,
        ctx: &mut ProcessingContext,
        tx: &mut T,
        next: Next<'_, T>,
    ) -> Result<(), AdmissionError> {
        for sig in tx.signatures() {
            let address = sig.public_key.address();
            let mut account = state
                .accounts()
                .get(&address)
                .ok_or_else(|| {
                    AdmissionError::Internal(format!(
                        "signer {address} vanished before sequence increment"
                    ))
                })?;
            account.sequence += 1;
            state.accounts().set(account);
        }
        next.call(state, ctx, tx)
    }
}
