//! Deterministic bonding-curve pricing.
//!
//! Every user-created coin is priced against the base currency by a
//! constant-reserve-ratio curve. The only operation the admission pipeline
//! needs is the sale direction: how many base-currency units selling a given
//! amount of the coin releases from its reserve,
//!
//! ```text
//! sale = reserve * (1 - (1 - amount / volume)^(100 / crr))
//! ```
//!
//! The formula is evaluated in fixed-point big-integer arithmetic (scale
//! 10^18) with floor rounding at every division and a floor integer
//! nth-root, so the result is bit-for-bit reproducible across platforms.
//! No floating point is involved anywhere: this function is the economic
//! pricing oracle for fee conversion and must agree between all nodes.

use num_bigint::BigUint;
use num_traits::One;
use num_traits::Pow;
use num_traits::ToPrimitive;
use num_traits::Zero;

/// Lowest constant reserve ratio a coin may be registered with, in percent.
pub const CRR_MIN: u32 = 10;

/// A coin at 100 percent reserve is priced linearly.
pub const CRR_MAX: u32 = 100;

/// Fixed-point scale for the intermediate ratio arithmetic.
const SCALE: u128 = 10u128.pow(18);

/// Base-currency units released by selling `amount` of a coin with the
/// given `volume`, `reserve` and constant reserve ratio `crr` (percent).
///
/// Selling the entire volume drains the entire reserve; selling more than
/// the volume is clamped to it. A `crr` at or above [`CRR_MAX`] degenerates
/// to the linear price `reserve * amount / volume`.
pub fn sale_amount(volume: u128, reserve: u128, crr: u32, amount: u128) -> u128 {
    if amount == 0 || volume == 0 || reserve == 0 {
        return 0;
    }
    let amount = amount.min(volume);
    if amount == volume {
        return reserve;
    }
    if crr >= CRR_MAX {
        let linear = BigUint::from(reserve) * BigUint::from(amount) / BigUint::from(volume);
        return linear.to_u128().unwrap_or(reserve);
    }

    let scale = BigUint::from(SCALE);
    // kept_ratio = (1 - amount/volume), scaled.
    let kept_ratio = &scale - BigUint::from(amount) * &scale / BigUint::from(volume);
    // kept_ratio^(100/crr), scaled: the crr-th root of kept_ratio^100,
    // rebased so the root comes out at the same scale.
    let raised = Pow::pow(&kept_ratio, CRR_MAX) / Pow::pow(&scale, CRR_MAX - crr);
    let kept_scaled = nth_root(&raised, crr);
    let kept = (BigUint::from(reserve) * kept_scaled / scale)
        .to_u128()
        .unwrap_or(reserve);
    reserve.saturating_sub(kept)
}

/// Floor integer n-th root by Newton iteration.
///
/// The iteration starts above the root and decreases strictly until it
/// crosses it, at which point the previous iterate is the floor root.
fn nth_root(value: &BigUint, n: u32) -> BigUint {
    if n <= 1 || value.is_zero() || value.is_one() {
        return value.clone();
    }
    let mut x = BigUint::one() << (value.bits() / u64::from(n) + 1);
    loop {
        let prev = x;
        x = (&prev * (n - 1) + value / Pow::pow(&prev, n - 1)) / n;
        if x >= prev {
            return prev;
        }
    }
}
