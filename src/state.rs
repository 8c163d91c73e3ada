//! The interface boundary to the rest of the node.
//!
//! The admission pipeline never touches persistent storage, ledger
//! bookkeeping or signature algebra directly; it goes through the
//! object-safe traits in this module, bundled behind [`StateAccess`] so a
//! single `&mut dyn StateAccess` threads through the chain. Consistency of
//! the stores across concurrent invocations is the collaborators'
//! responsibility, as is rolling back writes from aborted pipelines; each
//! pipeline invocation assumes exclusive, synchronous access.

use thiserror::Error;

use crate::models::account::Account;
use crate::models::account::Address;
use crate::models::account::PublicKey;
use crate::models::coin::Coin;
use crate::models::coin::CoinPriceInfo;
use crate::models::coin::Supply;
use crate::models::transaction::SignDoc;

pub mod memory;

/// Persistent account records.
pub trait AccountStore {
    fn get(&self, address: &Address) -> Option<Account>;

    /// Create and persist a fresh account under `address`, assigning it the
    /// next account number.
    fn create(&mut self, address: Address) -> Account;

    fn set(&mut self, account: Account);
}

/// A fee-collector transfer that did not go through. The balance checks
/// ahead of the transfer make this unexpected, but it is not assumed
/// infallible.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("fee transfer failed: {0}")]
pub struct TransferError(pub String);

/// Balance queries and the one transfer primitive the pipeline performs.
pub trait Ledger {
    /// Move `fee` from `from` to the protocol fee-collector account.
    fn send_to_fee_collector(&mut self, from: &Address, fee: &Coin) -> Result<(), TransferError>;

    /// The account's full balance in `denom`, vesting locks included.
    fn total_balance(&self, address: &Address, denom: &str) -> u128;

    /// The portion of the balance spendable at `as_of` (seconds), i.e. the
    /// total minus still-locked vesting tranches.
    fn spendable_balance(&self, address: &Address, denom: &str, as_of: u64) -> u128;
}

/// Total-supply bookkeeping.
pub trait SupplyKeeper {
    fn supply(&self) -> Supply;

    fn set_supply(&mut self, supply: Supply);
}

/// The registry of bonding-curve coins.
pub trait CoinRegistry {
    fn get_coin(&self, denom: &str) -> Option<CoinPriceInfo>;

    /// Overwrite a coin's reserve and volume in one step.
    fn update_coin(&mut self, denom: &str, reserve: u128, volume: u128);

    fn is_base_coin(&self, denom: &str) -> bool;

    /// Denomination of the native bonded/staking coin.
    fn bond_denom(&self) -> &str;
}

/// Cryptographic verification of a signer's commitment to a [`SignDoc`].
pub trait SignatureVerifier {
    fn verify(&self, doc: &SignDoc, public_key: &PublicKey, signature: &[u8]) -> bool;
}

/// Everything the chain needs from the outside world, in one bundle.
pub trait StateAccess {
    fn accounts(&mut self) -> &mut dyn AccountStore;

    fn ledger(&mut self) -> &mut dyn Ledger;

    fn supply_keeper(&mut self) -> &mut dyn SupplyKeeper;

    fn coins(&mut self) -> &mut dyn CoinRegistry;

    fn verifier(&self) -> &dyn SignatureVerifier;
}
