//! The transaction admission pipeline.
//!
//! Every submitted transaction passes through an ordered chain of steps
//! before its messages may execute. Each step can inspect and mutate the
//! per-transaction [`ProcessingContext`], short-circuit with an
//! [`AdmissionError`](error::AdmissionError), or delegate to the remainder
//! of the chain; the first failure aborts everything after it. The step
//! order is part of the protocol contract and is wired in
//! [`AdmissionChain::standard`].

use tracing::debug;

use crate::ante::error::AdmissionError;
use crate::ante::gas_meter::GasMeter;
use crate::ante::provisional::PendingNumberRestore;
use crate::config_models::chain_params::ChainParams;
use crate::models::transaction::AdmissionTx;
use crate::state::StateAccess;

pub mod commission;
pub mod deduct;
pub mod error;
pub mod fee;
pub mod gas_meter;
pub mod guards;
pub mod provisional;
pub mod signatures;

/// Per-transaction processing state, owned by one pipeline invocation and
/// discarded afterwards.
///
/// This is the explicit replacement for an ambient context with a
/// string-keyed scratch space: everything a step may need to hand to a
/// later step has a named field.
#[derive(Debug, Clone, Copy)]
pub struct ProcessingContext {
    pub block_height: u64,
    /// Block timestamp in seconds, the as-of time for vesting-aware
    /// balance checks.
    pub block_time: u64,
    /// Mempool re-validation pass, as opposed to first admission.
    pub recheck: bool,
    /// Pure simulation: nothing will be committed.
    pub simulate: bool,
    pub gas_meter: GasMeter,
    /// Set by the provisional-account pre-step, cleared by the post-step
    /// within the same chain execution.
    pub(crate) pending_restore: Option<PendingNumberRestore>,
}

impl ProcessingContext {
    pub fn new(block_height: u64, block_time: u64) -> Self {
        Self {
            block_height,
            block_time,
            recheck: false,
            simulate: false,
            gas_meter: GasMeter::infinite(),
            pending_restore: None,
        }
    }
}

/// What a successful admission reports back to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdmissionOutcome {
    pub gas_wanted: u64,
    pub gas_used: u64,
}

/// One stage of the admission chain.
///
/// `next` is the continuation formed by the remaining steps. A step may
/// return without calling it (short-circuit), call it and pass the result
/// through, or call it and post-process.
pub trait ChainStep<T: AdmissionTx> {
    fn run(
        &self,
        state: &mut dyn StateAccess,
        ctx: &mut ProcessingContext,
        tx: &mut T,
        next: Next<'_, T>,
    ) -> Result<(), AdmissionError>;
}

/// The remainder of the chain, handed to each step as a continuation.
pub struct Next<'a, T> {
    steps: &'a [Box<dyn ChainStep<T>>],
}

impl<T: AdmissionTx> Next<'_, T> {
    /// Run the remaining steps in order. An empty remainder succeeds.
    pub fn call(
        self,
        state: &mut dyn StateAccess,
        ctx: &mut ProcessingContext,
        tx: &mut T,
    ) -> Result<(), AdmissionError> {
        match self.steps.split_first() {
            Some((step, rest)) => step.run(state, ctx, tx, Next { steps: rest }),
            None => Ok(()),
        }
    }
}

impl<T> std::fmt::Debug for Next<'_, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Next({} steps)", self.steps.len())
    }
}

/// An ordered admission chain, composed once and reused across
/// transactions.
pub struct AdmissionChain<T> {
    steps: Vec<Box<dyn ChainStep<T>>>,
}

impl<T: AdmissionTx> AdmissionChain<T> {
    pub fn new(steps: Vec<Box<dyn ChainStep<T>>>) -> Self {
        Self { steps }
    }

    /// The protocol's fixed step order. Later steps depend on state
    /// established by earlier ones: fee deduction runs after public keys
    /// are bound but before cryptographic verification, so a failed fee
    /// payment short-circuits ahead of the expensive work.
    pub fn standard(params: ChainParams) -> Self
    where
        T: 'static,
    {
        Self::new(vec![
            Box::new(guards::MsgCountGuard),
            Box::new(guards::ShapeGuard),
            Box::new(guards::MemoGuard::new(params.max_memo_characters)),
            Box::new(guards::TxSizeGasCharge::new(params.tx_size_cost_per_byte)),
            Box::new(provisional::ProvisionalAccountSetup),
            Box::new(signatures::PublicKeyBinding),
            Box::new(signatures::SignatureCountGuard::new(params.tx_sig_limit)),
            Box::new(fee::FeeDecorator),
            Box::new(signatures::SignatureGasCharge::new(params.sig_verify_cost)),
            Box::new(signatures::SignatureVerify),
            Box::new(provisional::ProvisionalAccountRestore),
            Box::new(signatures::SequenceIncrement),
        ])
    }

    /// Run the whole chain over one transaction.
    ///
    /// Establishes the gas meter first: infinite during genesis processing
    /// (height 0) and pure simulation, bounded by the declared gas want
    /// otherwise. Out-of-gas surfaces as an ordinary
    /// [`AdmissionError::OutOfGas`]; nothing in the chain panics for
    /// control flow.
    pub fn handle(
        &self,
        state: &mut dyn StateAccess,
        ctx: &mut ProcessingContext,
        tx: &mut T,
    ) -> Result<AdmissionOutcome, AdmissionError> {
        ctx.gas_meter = if ctx.block_height == 0 || ctx.simulate {
            GasMeter::infinite()
        } else {
            let declared = tx
                .gas_declared()
                .ok_or(AdmissionError::MissingCapability("gas"))?;
            GasMeter::bounded(declared)
        };
        Next { steps: &self.steps }.call(state, ctx, tx)?;
        debug!(
            height = ctx.block_height,
            gas_used = ctx.gas_meter.gas_consumed(),
            "transaction admitted"
        );
        Ok(AdmissionOutcome {
            gas_wanted: ctx.gas_meter.gas_limit(),
            gas_used: ctx.gas_meter.gas_consumed(),
        })
    }
}

impl<T> std::fmt::Debug for AdmissionChain<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AdmissionChain({} steps)", self.steps.len())
    }
}
