use std::fmt::Display;

use bech32::ToBase32;
use bech32::Variant;
use serde::Deserialize;
use serde::Serialize;
use sha3::Digest;
use sha3::Sha3_256;

/// Human-readable part of the bech32 rendering of [`Address`].
pub const ADDRESS_HRP: &str = "lgn";

/// A 32-byte account public key.
///
/// Only identity and address derivation are in scope here; the signature
/// algebra itself lives behind
/// [`SignatureVerifier`](crate::state::SignatureVerifier).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PublicKey([u8; 32]);

impl PublicKey {
    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// The address this key controls: the first 20 bytes of the SHA3-256
    /// digest of the key bytes.
    pub fn address(&self) -> Address {
        let digest = Sha3_256::digest(self.0);
        let mut bytes = [0u8; Address::LENGTH];
        bytes.copy_from_slice(&digest[..Address::LENGTH]);
        Address::from_bytes(bytes)
    }
}

/// A 20-byte account identifier, rendered as bech32 with the `lgn` prefix.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct Address([u8; Self::LENGTH]);

impl Address {
    pub const LENGTH: usize = 20;

    pub fn from_bytes(bytes: [u8; Self::LENGTH]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; Self::LENGTH] {
        &self.0
    }
}

impl Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let encoded = bech32::encode(ADDRESS_HRP, self.0.to_base32(), Variant::Bech32)
            .map_err(|_| std::fmt::Error)?;
        write!(f, "{encoded}")
    }
}

/// An on-chain account, as stored by the
/// [`AccountStore`](crate::state::AccountStore) collaborator.
///
/// The admission pipeline reads and writes the `number` field during the
/// provisional-account protocol, binds `public_key` on a signer's first
/// transaction, and bumps `sequence` after successful verification. A
/// freshly created account that has never signed anything carries
/// `public_key: None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub address: Address,
    pub number: u64,
    pub sequence: u64,
    pub public_key: Option<PublicKey>,
}

impl Account {
    pub fn new(address: Address, number: u64) -> Self {
        Self {
            address,
            number,
            sequence: 0,
            public_key: None,
        }
    }
}
