//! The commission schedule: what each message type costs, before the payer's
//! fee coin is taken into account.
//!
//! Scheduled amounts are in display units of 0.001 base coin; the final
//! commission additionally includes a per-byte surcharge over the encoded
//! transaction and is converted to smallest base-coin units at the end.

use crate::config_models::chain_params::COMMISSION_UNIT;
use crate::models::transaction::AdmissionTx;
use crate::models::transaction::Msg;

/// Display units charged per byte of encoded transaction.
pub const COMMISSION_PER_BYTE: u128 = 2;

/// Display units added per multi-send recipient beyond the first.
pub const MULTISEND_EXTRA_OUTPUT_SURCHARGE: u128 = 5;

/// The static message-type → commission mapping.
#[derive(Debug, Clone, Copy)]
pub struct CommissionSchedule;

impl CommissionSchedule {
    /// Scheduled surcharge for one message, in display units.
    ///
    /// Creating a coin is priced by ticker length, scarcity-priced the way
    /// short tickers are everywhere else. Redeeming a check is free here;
    /// the check itself carries the fee.
    pub fn message_surcharge(msg: &Msg) -> u128 {
        match msg {
            Msg::Send { .. } => 10,
            Msg::MultiSend { outputs } => {
                10 + MULTISEND_EXTRA_OUTPUT_SURCHARGE * outputs.len().saturating_sub(1) as u128
            }
            Msg::Buy { .. } | Msg::Sell { .. } | Msg::SellAll { .. } => 100,
            Msg::CreateCoin { ticker, .. } => match ticker.len() {
                3 => 1_000_000,
                4 => 100_000,
                5 => 10_000,
                6 => 1_000,
                _ => 100,
            },
            Msg::DeclareCandidate { .. } | Msg::EditCandidate { .. } => 10_000,
            Msg::Delegate { .. } | Msg::Unbond { .. } => 200,
            Msg::SetOnline | Msg::SetOffline => 100,
            Msg::RedeemCheck { .. } => 0,
        }
    }
}

/// The commission a transaction owes, in smallest base-coin units.
///
/// Per-byte surcharge first, then the scheduled message surcharge; a
/// redeem-check message resets the running total to zero before the unit
/// conversion, since its fee is handled exogenously by the check.
pub fn required_commission<T: AdmissionTx + ?Sized>(tx: &T) -> u128 {
    let mut units = COMMISSION_PER_BYTE * u128::from(tx.encoded_len());
    if let Some(msg) = tx.msgs().first() {
        units += CommissionSchedule::message_surcharge(msg);
        if matches!(msg, Msg::RedeemCheck { .. }) {
            units = 0;
        }
    }
    units * COMMISSION_UNIT
}
