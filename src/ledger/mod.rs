//! Ledger module containing fee structure management and payment processing

pub mod fee_ledger;
pub mod payment;
pub mod structure;

pub use fee_ledger::*;
pub use payment::*;
pub use structure::*;
