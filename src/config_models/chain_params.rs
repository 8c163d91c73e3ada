use serde::Deserialize;
use serde::Serialize;

/// Decimal places of the base coin. One whole base coin is 10^18 of its
/// smallest units.
pub const BASE_COIN_DECIMALS: u32 = 18;

/// The commission schedule is written in display units of 0.001 base coin;
/// multiplying by this constant converts a scheduled amount into smallest
/// base-coin units.
pub const COMMISSION_UNIT: u128 = 10u128.pow(15);

/// Block height at which the minimum-reserve rule for fee deduction in
/// non-base coins activates. A protocol constant, not a parameter: changing
/// it is a consensus break.
pub const RESERVE_FLOOR_ACTIVATION_HEIGHT: u64 = 812_000;

/// Minimum reserve a non-base coin must retain after a fee deduction,
/// evaluated above [`RESERVE_FLOOR_ACTIVATION_HEIGHT`]. 1000 whole base
/// coins.
pub const MIN_COIN_RESERVE: u128 = 1_000 * 10u128.pow(BASE_COIN_DECIMALS);

/// Delegations are billed ten times their commission in gas, reflecting the
/// heavier downstream cost of stake bookkeeping.
pub const DELEGATE_GAS_MULTIPLIER: u128 = 10;

/// Tunable admission parameters.
///
/// These govern transaction *shape* limits and the constant gas pre-charges;
/// the economically binding constants above are deliberately not in here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainParams {
    /// Upper bound on memo length, in bytes.
    pub max_memo_characters: usize,
    /// Upper bound on the number of signatures per transaction.
    pub tx_sig_limit: usize,
    /// Gas pre-charged per byte of encoded transaction.
    pub tx_size_cost_per_byte: u64,
    /// Gas pre-charged per signature ahead of cryptographic verification.
    pub sig_verify_cost: u64,
}

impl Default for ChainParams {
    fn default() -> Self {
        Self {
            max_memo_characters: 256,
            tx_sig_limit: 7,
            tx_size_cost_per_byte: 10,
            sig_verify_cost: 1_000,
        }
    }
}
