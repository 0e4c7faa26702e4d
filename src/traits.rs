//! Traits for storage abstraction and extensibility

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use chrono::NaiveDate;

use crate::types::*;

/// Storage abstraction for the fee ledger
///
/// Every read is scoped by `tenant_id`; a row owned by another tenant must be
/// reported as absent, never returned. Implementations can sit on PostgreSQL,
/// a hosted database client, SQLite, in-memory maps, etc.
#[async_trait]
pub trait SchoolStorage: Send + Sync {
    /// Save a student
    async fn save_student(&mut self, student: &Student) -> LedgerResult<()>;

    /// Get a student by ID within a tenant
    async fn get_student(&self, tenant_id: &str, student_id: &str)
        -> LedgerResult<Option<Student>>;

    /// List students enrolled in a class
    async fn list_class_students(
        &self,
        tenant_id: &str,
        class_id: &str,
    ) -> LedgerResult<Vec<Student>>;

    /// Save an academic year
    async fn save_academic_year(&mut self, year: &AcademicYear) -> LedgerResult<()>;

    /// Get an academic year by ID within a tenant
    async fn get_academic_year(
        &self,
        tenant_id: &str,
        academic_year_id: &str,
    ) -> LedgerResult<Option<AcademicYear>>;

    /// Get the academic year flagged `is_current` for a tenant
    async fn get_current_academic_year(&self, tenant_id: &str)
        -> LedgerResult<Option<AcademicYear>>;

    /// Save a fee structure
    async fn save_fee_structure(&mut self, structure: &FeeStructure) -> LedgerResult<()>;

    /// Get a fee structure by ID within a tenant
    async fn get_fee_structure(
        &self,
        tenant_id: &str,
        fee_structure_id: &str,
    ) -> LedgerResult<Option<FeeStructure>>;

    /// List fee structures, optionally filtered by class and academic year
    async fn list_fee_structures(
        &self,
        tenant_id: &str,
        class_id: Option<&str>,
        academic_year_id: Option<&str>,
    ) -> LedgerResult<Vec<FeeStructure>>;

    /// Find the active fee structure billed to a class for an academic year
    async fn find_active_fee_structure(
        &self,
        tenant_id: &str,
        class_id: &str,
        academic_year_id: &str,
    ) -> LedgerResult<Option<FeeStructure>>;

    /// Update a fee structure
    async fn update_fee_structure(&mut self, structure: &FeeStructure) -> LedgerResult<()>;

    /// Save a payment
    async fn save_payment(&mut self, payment: &FeePayment) -> LedgerResult<()>;

    /// Get a payment by ID within a tenant, including soft-deleted rows
    async fn get_payment(&self, tenant_id: &str, payment_id: &str)
        -> LedgerResult<Option<FeePayment>>;

    /// Update a payment
    async fn update_payment(&mut self, payment: &FeePayment) -> LedgerResult<()>;

    /// List every payment a student made against one fee structure, whatever its status
    async fn list_student_payments(
        &self,
        tenant_id: &str,
        student_id: &str,
        fee_structure_id: &str,
    ) -> LedgerResult<Vec<FeePayment>>;

    /// List a student's completed, non-deleted payments dated within an inclusive range
    async fn list_completed_payments_between(
        &self,
        tenant_id: &str,
        student_id: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> LedgerResult<Vec<FeePayment>>;

    /// Save an attendance record
    async fn save_attendance(&mut self, record: &AttendanceRecord) -> LedgerResult<()>;

    /// List a student's attendance records, optionally bounded by date
    async fn list_attendance(
        &self,
        tenant_id: &str,
        student_id: &str,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> LedgerResult<Vec<AttendanceRecord>>;
}

/// Trait for implementing custom payment validation rules
pub trait PaymentValidator: Send + Sync {
    /// Validate a payment before saving
    fn validate_payment(&self, payment: &FeePayment) -> LedgerResult<()>;
}

/// Trait for implementing custom fee structure validation rules
pub trait FeeStructureValidator: Send + Sync {
    /// Validate a fee structure before saving
    fn validate_fee_structure(&self, structure: &FeeStructure) -> LedgerResult<()>;
}

/// Default payment validator with basic rules
pub struct DefaultPaymentValidator;

impl PaymentValidator for DefaultPaymentValidator {
    fn validate_payment(&self, payment: &FeePayment) -> LedgerResult<()> {
        if payment.id.trim().is_empty() {
            return Err(LedgerError::Validation(
                "Payment ID cannot be empty".to_string(),
            ));
        }

        if payment.tenant_id.trim().is_empty() {
            return Err(LedgerError::Validation(
                "Payment tenant cannot be empty".to_string(),
            ));
        }

        if payment.amount_paid <= BigDecimal::from(0) {
            return Err(LedgerError::Validation(
                "Payment amount must be positive".to_string(),
            ));
        }

        Ok(())
    }
}

/// Default fee structure validator with basic rules
pub struct DefaultFeeStructureValidator;

impl FeeStructureValidator for DefaultFeeStructureValidator {
    fn validate_fee_structure(&self, structure: &FeeStructure) -> LedgerResult<()> {
        if structure.id.trim().is_empty() {
            return Err(LedgerError::Validation(
                "Fee structure ID cannot be empty".to_string(),
            ));
        }

        if structure.amount < BigDecimal::from(0) {
            return Err(LedgerError::Validation(
                "Fee structure amount cannot be negative".to_string(),
            ));
        }

        Ok(())
    }
}
