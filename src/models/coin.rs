use std::collections::BTreeMap;
use std::fmt::Display;

use serde::Deserialize;
use serde::Serialize;
use tracing::warn;

/// An amount of some coin, in that coin's smallest indivisible units.
///
/// Amounts are unsigned by construction; "non-negative" is a type-level
/// guarantee rather than a runtime check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coin {
    pub denom: String,
    pub amount: u128,
}

impl Coin {
    pub fn new(denom: impl Into<String>, amount: u128) -> Self {
        Self {
            denom: denom.into(),
            amount,
        }
    }

    /// A well-formed denomination is 3 to 10 lowercase ASCII letters.
    pub fn is_valid_denom(denom: &str) -> bool {
        (3..=10).contains(&denom.len()) && denom.bytes().all(|b| b.is_ascii_lowercase())
    }
}

impl Display for Coin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.amount, self.denom)
    }
}

/// Bonding-curve price parameters of a registered coin, as reported by the
/// [`CoinRegistry`](crate::state::CoinRegistry). Read-only conversion input
/// for the admission pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoinPriceInfo {
    /// Base-currency units locked behind the coin.
    pub reserve: u128,
    /// Circulating volume of the coin itself.
    pub volume: u128,
    /// Constant reserve ratio, in percent (10..=100).
    pub crr: u32,
}

/// Recorded total supply, per denomination.
///
/// Collected fees re-enter supply accounting as newly recognized
/// transferable supply rather than being burned, hence [`Supply::inflate`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Supply {
    amounts: BTreeMap<String, u128>,
}

impl Supply {
    pub fn amount_of(&self, denom: &str) -> u128 {
        self.amounts.get(denom).copied().unwrap_or_default()
    }

    /// Returns a supply with `coin` added to its denomination's total.
    ///
    /// A total that would overflow is clamped to the maximum and logged;
    /// a supply figure that drifts from the collected fees is a bug in
    /// the surrounding bookkeeping, not something to silently absorb.
    pub fn inflate(mut self, coin: &Coin) -> Self {
        let total = self.amounts.entry(coin.denom.clone()).or_default();
        *total = total.checked_add(coin.amount).unwrap_or_else(|| {
            warn!(
                denom = %coin.denom,
                amount = coin.amount,
                "supply total overflowed while inflating, clamping"
            );
            u128::MAX
        });
        self
    }
}
