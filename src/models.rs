pub mod account;
pub mod coin;
pub mod transaction;
