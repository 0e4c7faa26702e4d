//! Core types and data structures for the school fee ledger

use bigdecimal::BigDecimal;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Lifecycle status of a fee structure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeeStructureStatus {
    /// Currently billed to students of the class
    Active,
    /// Retired; kept for history but never resolved for a class
    Inactive,
}

/// Settlement status of a recorded payment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Money received; counts toward paid totals
    Completed,
    /// Awaiting confirmation from the gateway or cashier
    Pending,
    /// Rejected or bounced
    Failed,
}

/// Attendance mark for a single school day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    /// Attended the full day
    Present,
    /// Did not attend
    Absent,
    /// Arrived late; counts as a full day attended
    Late,
    /// Attended part of the day; counts as half a day
    HalfDay,
}

/// Total amount due for a class within an academic year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeeStructure {
    pub id: String,
    pub tenant_id: String,
    pub class_id: String,
    pub academic_year_id: String,
    /// Total due for the whole academic year
    pub amount: BigDecimal,
    pub status: FeeStructureStatus,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl FeeStructure {
    /// Create a new active fee structure
    pub fn new(
        id: String,
        tenant_id: String,
        class_id: String,
        academic_year_id: String,
        amount: BigDecimal,
    ) -> Self {
        let now = chrono::Utc::now().naive_utc();
        Self {
            id,
            tenant_id,
            class_id,
            academic_year_id,
            amount,
            status: FeeStructureStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == FeeStructureStatus::Active
    }
}

/// A single payment transaction against a fee structure for a student
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeePayment {
    pub id: String,
    pub tenant_id: String,
    pub student_id: String,
    pub fee_structure_id: String,
    pub amount_paid: BigDecimal,
    pub payment_date: NaiveDate,
    pub status: PaymentStatus,
    /// Soft-delete flag; deleted rows stay in storage for audit
    pub is_deleted: bool,
    /// Receipt number, cheque number, gateway reference, etc.
    pub reference: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl FeePayment {
    /// Create a new completed payment
    pub fn new(
        id: String,
        tenant_id: String,
        student_id: String,
        fee_structure_id: String,
        amount_paid: BigDecimal,
        payment_date: NaiveDate,
    ) -> Self {
        let now = chrono::Utc::now().naive_utc();
        Self {
            id,
            tenant_id,
            student_id,
            fee_structure_id,
            amount_paid,
            payment_date,
            status: PaymentStatus::Completed,
            is_deleted: false,
            reference: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether this payment contributes to paid totals
    pub fn counts_toward_paid(&self) -> bool {
        self.status == PaymentStatus::Completed && !self.is_deleted
    }
}

/// Date range over which fee structures and attendance are scoped
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcademicYear {
    pub id: String,
    pub tenant_id: String,
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub is_current: bool,
}

impl AcademicYear {
    pub fn new(
        id: String,
        tenant_id: String,
        name: String,
        start_date: NaiveDate,
        end_date: NaiveDate,
        is_current: bool,
    ) -> Self {
        Self {
            id,
            tenant_id,
            name,
            start_date,
            end_date,
            is_current,
        }
    }

    /// Whether a date falls inside the year, both ends inclusive
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start_date && date <= self.end_date
    }
}

/// A student enrolled in one class of a tenant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    pub id: String,
    pub tenant_id: String,
    /// Class used to resolve the student's fee structure
    pub class_id: String,
    pub name: String,
}

impl Student {
    pub fn new(id: String, tenant_id: String, class_id: String, name: String) -> Self {
        Self {
            id,
            tenant_id,
            class_id,
            name,
        }
    }
}

/// One day's attendance mark for a student
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub id: String,
    pub tenant_id: String,
    pub student_id: String,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
}

impl AttendanceRecord {
    pub fn new(
        id: String,
        tenant_id: String,
        student_id: String,
        date: NaiveDate,
        status: AttendanceStatus,
    ) -> Self {
        Self {
            id,
            tenant_id,
            student_id,
            date,
            status,
        }
    }
}

/// Due/paid/balance for one student against one fee structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeeSummary {
    pub total_due: BigDecimal,
    pub total_paid: BigDecimal,
    /// Outstanding amount, never negative
    pub due_amount: BigDecimal,
}

impl FeeSummary {
    pub fn zero() -> Self {
        Self {
            total_due: BigDecimal::from(0),
            total_paid: BigDecimal::from(0),
            due_amount: BigDecimal::from(0),
        }
    }
}

/// Inclusive calendar boundaries of one month
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl MonthRange {
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

/// One row of the monthly fee ledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyFeeRecord {
    /// Position within the academic year, starting at 0
    pub index: u32,
    /// Calendar month, 1-12
    pub month: u32,
    pub year: i32,
    pub month_name: String,
    pub total_due: BigDecimal,
    pub total_paid: BigDecimal,
    /// `total_due - total_paid`; negative when the month is overpaid
    pub balance: BigDecimal,
    pub payments: Vec<FeePayment>,
    pub range: MonthRange,
}

/// Month-by-month ledger for a student over an academic year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyBreakdown {
    pub academic_year_id: Option<String>,
    pub fee_structure_id: Option<String>,
    pub total_due: BigDecimal,
    pub monthly_due: BigDecimal,
    pub months: Vec<MonthlyFeeRecord>,
}

impl MonthlyBreakdown {
    /// Breakdown returned when no academic year can be resolved
    pub fn empty() -> Self {
        Self {
            academic_year_id: None,
            fee_structure_id: None,
            total_due: BigDecimal::from(0),
            monthly_due: BigDecimal::from(0),
            months: Vec::new(),
        }
    }

    pub fn total_paid(&self) -> BigDecimal {
        self.months.iter().map(|m| &m.total_paid).sum()
    }

    pub fn total_apportioned(&self) -> BigDecimal {
        self.months.iter().map(|m| &m.total_due).sum()
    }
}

/// Errors that can occur in the fee ledger
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Fee structure not found: {0}")]
    FeeStructureNotFound(String),
    #[error("Student not found: {0}")]
    StudentNotFound(String),
    #[error("Academic year not found: {0}")]
    AcademicYearNotFound(String),
    #[error("Payment not found: {0}")]
    PaymentNotFound(String),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Failed to parse config file {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for ledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_payment_counts_only_when_completed_and_live() {
        let mut payment = FeePayment::new(
            "p1".to_string(),
            "t1".to_string(),
            "s1".to_string(),
            "f1".to_string(),
            BigDecimal::from(100),
            date(2024, 4, 10),
        );
        assert!(payment.counts_toward_paid());

        payment.status = PaymentStatus::Pending;
        assert!(!payment.counts_toward_paid());

        payment.status = PaymentStatus::Completed;
        payment.is_deleted = true;
        assert!(!payment.counts_toward_paid());
    }

    #[test]
    fn test_academic_year_contains_is_inclusive() {
        let year = AcademicYear::new(
            "ay".to_string(),
            "t1".to_string(),
            "2024-25".to_string(),
            date(2024, 4, 1),
            date(2025, 3, 31),
            true,
        );
        assert!(year.contains(date(2024, 4, 1)));
        assert!(year.contains(date(2025, 3, 31)));
        assert!(!year.contains(date(2025, 4, 1)));
    }

    #[test]
    fn test_status_serializes_snake_case() {
        let json = serde_json::to_string(&AttendanceStatus::HalfDay).unwrap();
        assert_eq!(json, "\"half_day\"");
        let json = serde_json::to_string(&PaymentStatus::Completed).unwrap();
        assert_eq!(json, "\"completed\"");
    }
}
