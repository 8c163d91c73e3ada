//! In-memory reference implementations of the [`StateAccess`] collaborators.
//!
//! These back the test suites of this crate and double as executable
//! documentation of the collaborator contracts. They are deliberately
//! simple: `BTreeMap`s, no interior mutability, no persistence.

use std::collections::BTreeMap;

use sha3::Digest;
use sha3::Sha3_256;

use crate::models::account::Account;
use crate::models::account::Address;
use crate::models::account::PublicKey;
use crate::models::coin::Coin;
use crate::models::coin::CoinPriceInfo;
use crate::models::coin::Supply;
use crate::models::transaction::SignDoc;
use crate::state::AccountStore;
use crate::state::CoinRegistry;
use crate::state::Ledger;
use crate::state::SignatureVerifier;
use crate::state::StateAccess;
use crate::state::SupplyKeeper;
use crate::state::TransferError;

/// Account store over a `BTreeMap`, handing out sequential account numbers.
#[derive(Debug, Clone, Default)]
pub struct MemoryAccounts {
    accounts: BTreeMap<Address, Account>,
    next_number: u64,
}

impl MemoryAccounts {
    /// Start numbering at `first` instead of zero, to make assigned numbers
    /// distinguishable from the provisional zero in tests.
    pub fn starting_at(first: u64) -> Self {
        Self {
            accounts: BTreeMap::new(),
            next_number: first,
        }
    }
}

impl AccountStore for MemoryAccounts {
    fn get(&self, address: &Address) -> Option<Account> {
        self.accounts.get(address).copied()
    }

    fn create(&mut self, address: Address) -> Account {
        let account = Account::new(address, self.next_number);
        self.next_number += 1;
        self.accounts.insert(address, account);
        account
    }

    fn set(&mut self, account: Account) {
        self.accounts.insert(account.address, account);
    }
}

/// A vesting tranche: `amount` unlocks at `unlock_time`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VestingLock {
    pub unlock_time: u64,
    pub amount: u128,
}

/// Ledger over `BTreeMap`s, with optional vesting locks per balance.
#[derive(Debug, Clone, Default)]
pub struct MemoryLedger {
    balances: BTreeMap<(Address, String), u128>,
    locks: BTreeMap<(Address, String), Vec<VestingLock>>,
    fee_collector: BTreeMap<String, u128>,
}

impl MemoryLedger {
    pub fn credit(&mut self, address: Address, coin: Coin) {
        *self.balances.entry((address, coin.denom)).or_default() += coin.amount;
    }

    pub fn lock(&mut self, address: Address, denom: &str, lock: VestingLock) {
        self.locks
            .entry((address, denom.to_string()))
            .or_default()
            .push(lock);
    }

    pub fn fee_collector_balance(&self, denom: &str) -> u128 {
        self.fee_collector.get(denom).copied().unwrap_or_default()
    }
}

impl Ledger for MemoryLedger {
    fn send_to_fee_collector(&mut self, from: &Address, fee: &Coin) -> Result<(), TransferError> {
        let key = (*from, fee.denom.clone());
        let balance = self.balances.entry(key).or_default();
        if *balance < fee.amount {
            return Err(TransferError(format!(
                "{from} holds {balance}{}, cannot cover {fee}",
                fee.denom
            )));
        }
        *balance -= fee.amount;
        *self.fee_collector.entry(fee.denom.clone()).or_default() += fee.amount;
        Ok(())
    }

    fn total_balance(&self, address: &Address, denom: &str) -> u128 {
        self.balances
            .get(&(*address, denom.to_string()))
            .copied()
            .unwrap_or_default()
    }

    fn spendable_balance(&self, address: &Address, denom: &str, as_of: u64) -> u128 {
        let locked: u128 = self
            .locks
            .get(&(*address, denom.to_string()))
            .map(|locks| {
                locks
                    .iter()
                    .filter(|lock| lock.unlock_time > as_of)
                    .map(|lock| lock.amount)
                    .sum()
            })
            .unwrap_or_default();
        self.total_balance(address, denom).saturating_sub(locked)
    }
}

/// Supply keeper holding a single [`Supply`] value.
#[derive(Debug, Clone, Default)]
pub struct MemorySupply {
    supply: Supply,
}

impl SupplyKeeper for MemorySupply {
    fn supply(&self) -> Supply {
        self.supply.clone()
    }

    fn set_supply(&mut self, supply: Supply) {
        self.supply = supply;
    }
}

/// Coin registry with a fixed base denomination.
#[derive(Debug, Clone)]
pub struct MemoryCoins {
    bond_denom: String,
    coins: BTreeMap<String, CoinPriceInfo>,
}

impl MemoryCoins {
    pub fn new(bond_denom: impl Into<String>) -> Self {
        let bond_denom = bond_denom.into();
        let mut coins = BTreeMap::new();
        // The base coin is a real registry entry so that bookkeeping
        // writes against it stick; its curve parameters are never used
        // for conversion.
        coins.insert(
            bond_denom.clone(),
            CoinPriceInfo {
                reserve: 0,
                volume: 0,
                crr: 100,
            },
        );
        Self { bond_denom, coins }
    }

    pub fn register(&mut self, denom: impl Into<String>, info: CoinPriceInfo) {
        self.coins.insert(denom.into(), info);
    }
}

impl CoinRegistry for MemoryCoins {
    fn get_coin(&self, denom: &str) -> Option<CoinPriceInfo> {
        self.coins.get(denom).copied()
    }

    fn update_coin(&mut self, denom: &str, reserve: u128, volume: u128) {
        if let Some(info) = self.coins.get_mut(denom) {
            info.reserve = reserve;
            info.volume = volume;
        }
    }

    fn is_base_coin(&self, denom: &str) -> bool {
        denom == self.bond_denom
    }

    fn bond_denom(&self) -> &str {
        &self.bond_denom
    }
}

/// Deterministic stand-in for real signature verification: the "signature"
/// over a sign doc is the SHA3-256 of the doc bytes concatenated with the
/// public key. Faithful to the real contract in every respect the pipeline
/// cares about, including sensitivity to the account number in the doc.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha3MacVerifier;

impl Sha3MacVerifier {
    /// Produce the signature [`Sha3MacVerifier::verify`] accepts.
    pub fn sign(doc: &SignDoc, public_key: &PublicKey) -> Vec<u8> {
        let mut hasher = Sha3_256::new();
        hasher.update(doc.encode());
        hasher.update(public_key.as_bytes());
        hasher.finalize().to_vec()
    }
}

impl SignatureVerifier for Sha3MacVerifier {
    fn verify(&self, doc: &SignDoc, public_key: &PublicKey, signature: &[u8]) -> bool {
        Self::sign(doc, public_key) == signature
    }
}

/// All five collaborators in one value, for driving a chain end to end.
#[derive(Debug, Clone)]
pub struct MemoryChainState {
    pub accounts: MemoryAccounts,
    pub ledger: MemoryLedger,
    pub supply: MemorySupply,
    pub coins: MemoryCoins,
    pub verifier: Sha3MacVerifier,
}

impl MemoryChainState {
    pub fn new(bond_denom: impl Into<String>) -> Self {
        Self {
            accounts: MemoryAccounts::default(),
            ledger: MemoryLedger::default(),
            supply: MemorySupply::default(),
            coins: MemoryCoins::new(bond_denom),
            verifier: Sha3MacVerifier,
        }
    }
}

impl StateAccess for MemoryChainState {
    fn accounts(&mut self) -> &mut dyn AccountStore {
        &mut self.accounts
    }

    fn ledger(&mut self) -> &mut dyn Ledger {
        &mut self.ledger
    }

    fn supply_keeper(&mut self) -> &mut dyn SupplyKeeper {
        &mut self.supply
    }

    fn coins(&mut self) -> &mut dyn CoinRegistry {
        &mut self.coins
    }

    fn verifier(&self) -> &dyn SignatureVerifier {
        &self.verifier
    }
}
