use thiserror::Error;

use crate::ante::gas_meter::OutOfGas;
use crate::models::account::Address;

/// The reasons a transaction can be refused admission.
///
/// Every economic variant carries the amounts and denominations a client
/// needs to correct and resubmit; malformed-transaction variants are
/// terminal for the transaction as submitted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdmissionError {
    #[error("transactions are limited to one message, got {0}")]
    TooManyMessages(usize),
    #[error("transaction contains no messages")]
    NoMessages,
    #[error("transaction carries no signatures")]
    NoSignatures,
    #[error("memo is {len} bytes, limit is {max}")]
    MemoTooLong { len: usize, max: usize },
    #[error("malformed fee denomination {0:?}")]
    InvalidFeeDenom(String),
    #[error("duplicate fee denomination {0}")]
    DuplicateFeeDenom(String),
    #[error("transaction does not expose the {0} capability")]
    MissingCapability(&'static str),
    #[error("too many signatures: {got}, limit is {max}")]
    TooManySignatures { got: usize, max: usize },

    #[error("unknown account {0}")]
    UnknownAccount(Address),
    #[error("public key does not match the one bound to account {0}")]
    PublicKeyMismatch(Address),
    #[error("account {0} has no bound public key")]
    MissingPublicKey(Address),
    #[error("signature verification failed for {0}")]
    SignatureInvalid(Address),

    #[error("unknown coin {0}")]
    UnknownCoin(String),
    #[error("coin {denom} reserve {reserve} cannot cover a commission of {commission}")]
    InsufficientCoinReserve {
        denom: String,
        reserve: u128,
        commission: u128,
    },
    #[error("deducting {amount}{denom} would leave the reserve below the floor of {floor}")]
    ReserveFloor {
        denom: String,
        amount: u128,
        floor: u128,
    },
    #[error("insufficient funds: required {required}{denom}, available {available}{denom}")]
    InsufficientFunds {
        denom: String,
        required: u128,
        available: u128,
    },
    #[error("commission of {0} does not fit the 64-bit gas field")]
    CommissionOverflow(u128),

    #[error(transparent)]
    OutOfGas(#[from] OutOfGas),

    /// A logic-bug signal, not a user error. Production deployments should
    /// alert on this.
    #[error("internal admission inconsistency: {0}")]
    Internal(String),
}

/// Coarse classification of a rejection, mirroring how the surrounding
/// node treats it: malformed transactions must never enter a block,
/// economic rejections may succeed on resubmission, resource exhaustion is
/// reported with gas figures, internal errors indicate a bug.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectionCategory {
    Malformed,
    Economic,
    ResourceExhaustion,
    Internal,
}

impl AdmissionError {
    pub fn category(&self) -> RejectionCategory {
        match self {
            Self::TooManyMessages(_)
            | Self::NoMessages
            | Self::NoSignatures
            | Self::MemoTooLong { .. }
            | Self::InvalidFeeDenom(_)
            | Self::DuplicateFeeDenom(_)
            | Self::MissingCapability(_)
            | Self::TooManySignatures { .. }
            | Self::PublicKeyMismatch(_)
            | Self::MissingPublicKey(_)
            | Self::SignatureInvalid(_) => RejectionCategory::Malformed,
            Self::UnknownAccount(_)
            | Self::UnknownCoin(_)
            | Self::InsufficientCoinReserve { .. }
            | Self::ReserveFloor { .. }
            | Self::InsufficientFunds { .. }
            | Self::CommissionOverflow(_) => RejectionCategory::Economic,
            Self::OutOfGas(_) => RejectionCategory::ResourceExhaustion,
            Self::Internal(_) => RejectionCategory::Internal,
        }
    }
}
