//! Transaction admission core for the Lagoon chain.
//!
//! Everything a submitted transaction goes through before its messages may
//! execute lives here: the ordered decorator chain ([`ante`]), the
//! commission computation and fee deduction driven by the bonding-curve
//! price formula ([`bonding_curve`]), and the provisional-account protocol
//! that lets a never-before-seen signer redeem a check.
//!
//! The crate deliberately ends at the [`state`] trait boundary: persistent
//! storage, the ledger's transfer primitives, consensus, networking and
//! signature cryptography are collaborators of this core, not part of it.

pub mod ante;
pub mod bonding_curve;
pub mod config_models;
pub mod models;
pub mod state;
