//! # School Fees Core
//!
//! Tenant-scoped fee ledger reconciliation and attendance calculations for a
//! multi-tenant school-management system.
//!
//! ## Features
//!
//! - **Fee reconciliation**: total due, total paid, and clamped outstanding balance per student
//! - **Monthly breakdown**: apportion a yearly fee across the months of an academic year
//!   and attribute each payment to its calendar month
//! - **Attendance**: percentage with half days counted as half and late days in full
//! - **Class reports**: outstanding fees for every student in a class
//! - **Storage abstraction**: database-agnostic design with trait-based storage
//!
//! ## Quick Start
//!
//! ```rust
//! use school_fees_core::utils::MemoryStorage;
//! use school_fees_core::FeeLedger;
//!
//! // Any `SchoolStorage` implementation works; the in-memory one suits tests
//! let storage = MemoryStorage::new();
//! let ledger = FeeLedger::new(storage);
//! assert_eq!(ledger.config().fees.currency_scale, 2);
//! ```

pub mod attendance;
pub mod config;
pub mod ledger;
pub mod reconciliation;
pub mod traits;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use attendance::{attendance_percentage, AttendanceSummary};
pub use config::{load_config, ApportionmentPolicy, LedgerConfig};
pub use ledger::*;
pub use reconciliation::{build_monthly_breakdown, month_span, summarize_fee};
pub use traits::*;
pub use types::*;

// Re-export payment patterns for convenience
pub use ledger::payment::patterns;
