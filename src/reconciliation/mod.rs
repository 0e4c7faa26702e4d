//! Fee reconciliation: due/paid/balance and monthly apportionment
//!
//! Everything here is a pure reduction over rows that were already fetched;
//! the storage-facing orchestration lives in [`crate::ledger::FeeLedger`].

pub mod monthly;

pub use monthly::*;

use bigdecimal::BigDecimal;

use crate::types::*;

/// Sum the payments that count toward a fee structure
///
/// Pending, failed, and soft-deleted payments are skipped, as are payments
/// recorded against a different structure.
pub fn total_paid<'a, I>(structure_id: &str, payments: I) -> BigDecimal
where
    I: IntoIterator<Item = &'a FeePayment>,
{
    payments
        .into_iter()
        .filter(|p| p.fee_structure_id == structure_id && p.counts_toward_paid())
        .map(|p| &p.amount_paid)
        .sum()
}

/// Compute due/paid/balance for one student against one fee structure
///
/// The outstanding amount is clamped at zero; overpayment shows up only as
/// `total_paid > total_due`.
pub fn summarize_fee(structure: &FeeStructure, payments: &[FeePayment]) -> FeeSummary {
    let total_due = structure.amount.clone();
    let total_paid = total_paid(&structure.id, payments);
    let due_amount = outstanding(&total_due, &total_paid);

    FeeSummary {
        total_due,
        total_paid,
        due_amount,
    }
}

/// `max(0, due - paid)`
pub fn outstanding(total_due: &BigDecimal, total_paid: &BigDecimal) -> BigDecimal {
    let remaining = total_due - total_paid;
    if remaining < BigDecimal::from(0) {
        BigDecimal::from(0)
    } else {
        remaining
    }
}
