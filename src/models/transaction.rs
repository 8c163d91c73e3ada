use serde::Deserialize;
use serde::Serialize;
use strum::Display;

use crate::models::account::Address;
use crate::models::account::PublicKey;
use crate::models::coin::Coin;

/// One recipient of a [`Msg::MultiSend`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiSendOutput {
    pub recipient: Address,
    pub amount: Coin,
}

/// A pre-signed check redeemable by a recipient who may have never held an
/// on-chain account. The check itself carries the fee exogenously, which is
/// why redeeming one is commission-free in the admission pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Check {
    pub nonce: u64,
    pub amount: Coin,
}

/// The closed set of chain messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Msg {
    Send {
        recipient: Address,
        amount: Coin,
    },
    MultiSend {
        outputs: Vec<MultiSendOutput>,
    },
    Buy {
        coin_to_buy: String,
        amount: u128,
        max_spend: Coin,
    },
    Sell {
        coin_to_sell: String,
        amount: u128,
        min_receive: Coin,
    },
    SellAll {
        coin_to_sell: String,
        min_receive: Coin,
    },
    CreateCoin {
        ticker: String,
        initial_volume: u128,
        initial_reserve: u128,
        crr: u32,
    },
    DeclareCandidate {
        stake: Coin,
    },
    EditCandidate {
        reward_address: Address,
    },
    Delegate {
        validator: Address,
        stake: Coin,
    },
    Unbond {
        validator: Address,
        stake: Coin,
    },
    SetOnline,
    SetOffline,
    RedeemCheck {
        check: Check,
    },
}

impl Msg {
    pub fn kind(&self) -> MsgKind {
        match self {
            Msg::Send { .. } => MsgKind::Send,
            Msg::MultiSend { .. } => MsgKind::MultiSend,
            Msg::Buy { .. } => MsgKind::Buy,
            Msg::Sell { .. } => MsgKind::Sell,
            Msg::SellAll { .. } => MsgKind::SellAll,
            Msg::CreateCoin { .. } => MsgKind::CreateCoin,
            Msg::DeclareCandidate { .. } => MsgKind::DeclareCandidate,
            Msg::EditCandidate { .. } => MsgKind::EditCandidate,
            Msg::Delegate { .. } => MsgKind::Delegate,
            Msg::Unbond { .. } => MsgKind::Unbond,
            Msg::SetOnline => MsgKind::SetOnline,
            Msg::SetOffline => MsgKind::SetOffline,
            Msg::RedeemCheck { .. } => MsgKind::RedeemCheck,
        }
    }
}

/// Message-type tag, used by the commission schedule and for log output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "kebab-case")]
pub enum MsgKind {
    Send,
    MultiSend,
    Buy,
    Sell,
    SellAll,
    CreateCoin,
    DeclareCandidate,
    EditCandidate,
    Delegate,
    Unbond,
    SetOnline,
    SetOffline,
    RedeemCheck,
}

/// The declared fee of a standard transaction: zero or more fee coins plus a
/// declared gas want. The admission pipeline may rewrite `gas` after fee
/// deduction so that replay and observability see the gas the transaction
/// was actually billed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct StdFee {
    pub amount: Vec<Coin>,
    pub gas: u64,
}

/// One signer's signature over the transaction's [`SignDoc`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StdSignature {
    pub public_key: PublicKey,
    pub signature: Vec<u8>,
}

/// The canonical bytes a signer commits to.
///
/// The account number and sequence are the *stored* values at verification
/// time; a brand-new signer signs against account number 0, the canonical
/// new-account convention the provisional-account protocol exists to
/// satisfy. The declared gas want is deliberately not part of the sign doc,
/// since the pipeline rewrites it after fee deduction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignDoc {
    pub account_number: u64,
    pub sequence: u64,
    pub fee_amount: Vec<Coin>,
    pub msgs: Vec<Msg>,
    pub memo: String,
}

impl SignDoc {
    pub fn encode(&self) -> Vec<u8> {
        bincode::serialize(self).expect("a sign doc always has a bincode encoding")
    }
}

/// A standard transaction, carrying every capability the admission pipeline
/// can ask for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StdTx {
    pub msgs: Vec<Msg>,
    pub fee: StdFee,
    pub signatures: Vec<StdSignature>,
    pub memo: String,
}

/// What the admission pipeline requires of a transaction.
///
/// The pipeline is polymorphic over *capabilities*, not concrete types:
/// the gas and fee accessors are fallible, and a transaction lacking a
/// capability a step needs is rejected at run time with a structured
/// capability error rather than failing to compile. [`StdTx`] exposes all
/// of them.
pub trait AdmissionTx {
    fn msgs(&self) -> &[Msg];

    fn memo(&self) -> &str;

    fn signatures(&self) -> &[StdSignature];

    /// Length in bytes of the canonical encoding, input to the per-byte
    /// commission surcharge and the per-byte gas pre-charge.
    fn encoded_len(&self) -> u64;

    /// Declared gas want, if the transaction exposes the gas capability.
    fn gas_declared(&self) -> Option<u64>;

    /// Declared fee coins, if the transaction exposes the fee capability.
    fn fee_declared(&self) -> Option<&[Coin]>;

    /// The account paying the fee: the first signer.
    fn fee_payer(&self) -> Option<Address>;

    /// Whether [`AdmissionTx::rewrite_gas`] is supported. Transactions
    /// without this legacy mutation hook cannot pass the fee decorator.
    fn supports_gas_rewrite(&self) -> bool;

    /// Retroactively overwrite the recorded gas want with the amount the
    /// transaction was billed.
    fn rewrite_gas(&mut self, gas: u64);
}

impl AdmissionTx for StdTx {
    fn msgs(&self) -> &[Msg] {
        &self.msgs
    }

    fn memo(&self) -> &str {
        &self.memo
    }

    fn signatures(&self) -> &[StdSignature] {
        &self.signatures
    }

    fn encoded_len(&self) -> u64 {
        bincode::serialized_size(self).expect("a transaction always has a bincode encoding")
    }

    fn gas_declared(&self) -> Option<u64> {
        Some(self.fee.gas)
    }

    fn fee_declared(&self) -> Option<&[Coin]> {
        Some(&self.fee.amount)
    }

    fn fee_payer(&self) -> Option<Address> {
        self.signatures.first().map(|sig| sig.public_key.address())
    }

    fn supports_gas_rewrite(&self) -> bool {
        true
    }

    fn rewrite_gas(&mut self, gas: u64) {
        self.fee.gas = gas;
    }
}
