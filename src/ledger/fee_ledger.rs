//! Main fee ledger orchestrator that coordinates structures, payments, and reports

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::attendance::{self, AttendanceSummary};
use crate::config::LedgerConfig;
use crate::ledger::{FeeStructureManager, PaymentManager};
use crate::reconciliation;
use crate::traits::*;
use crate::types::*;

/// Main fee ledger that answers every tenant-scoped fee and attendance question
pub struct FeeLedger<S: SchoolStorage> {
    storage: S,
    config: LedgerConfig,
    structure_manager: FeeStructureManager<S>,
    payment_manager: PaymentManager<S>,
}

impl<S: SchoolStorage + Clone> FeeLedger<S> {
    /// Create a new ledger with the given storage backend and default config
    pub fn new(storage: S) -> Self {
        Self::with_config(storage, LedgerConfig::default())
    }

    /// Create a new ledger with an explicit config
    pub fn with_config(storage: S, config: LedgerConfig) -> Self {
        Self {
            structure_manager: FeeStructureManager::new(storage.clone()),
            payment_manager: PaymentManager::new(storage.clone()),
            storage,
            config,
        }
    }

    /// Create a new ledger with custom validators
    pub fn with_validators(
        storage: S,
        config: LedgerConfig,
        structure_validator: Box<dyn FeeStructureValidator>,
        payment_validator: Box<dyn PaymentValidator>,
    ) -> Self {
        Self {
            structure_manager: FeeStructureManager::with_validator(
                storage.clone(),
                structure_validator,
            ),
            payment_manager: PaymentManager::with_validator(storage.clone(), payment_validator),
            storage,
            config,
        }
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    // Reference data
    /// Register a student
    pub async fn register_student(&mut self, student: Student) -> LedgerResult<Student> {
        self.storage.save_student(&student).await?;
        Ok(student)
    }

    /// Register an academic year
    pub async fn register_academic_year(&mut self, year: AcademicYear) -> LedgerResult<AcademicYear> {
        if year.end_date < year.start_date {
            return Err(LedgerError::Validation(format!(
                "Academic year '{}' ends before it starts",
                year.id
            )));
        }
        self.storage.save_academic_year(&year).await?;
        Ok(year)
    }

    /// Record one day's attendance mark
    pub async fn record_attendance(
        &mut self,
        record: AttendanceRecord,
    ) -> LedgerResult<AttendanceRecord> {
        if self
            .storage
            .get_student(&record.tenant_id, &record.student_id)
            .await?
            .is_none()
        {
            return Err(LedgerError::StudentNotFound(record.student_id.clone()));
        }
        self.storage.save_attendance(&record).await?;
        Ok(record)
    }

    // Fee structure operations
    /// Create a new fee structure
    pub async fn create_fee_structure(
        &mut self,
        id: String,
        tenant_id: String,
        class_id: String,
        academic_year_id: String,
        amount: BigDecimal,
    ) -> LedgerResult<FeeStructure> {
        self.structure_manager
            .create_fee_structure(id, tenant_id, class_id, academic_year_id, amount)
            .await
    }

    /// Get a fee structure by ID
    pub async fn get_fee_structure(
        &self,
        tenant_id: &str,
        fee_structure_id: &str,
    ) -> LedgerResult<Option<FeeStructure>> {
        self.structure_manager
            .get_fee_structure(tenant_id, fee_structure_id)
            .await
    }

    /// List fee structures
    pub async fn list_fee_structures(
        &self,
        tenant_id: &str,
        class_id: Option<&str>,
        academic_year_id: Option<&str>,
    ) -> LedgerResult<Vec<FeeStructure>> {
        self.structure_manager
            .list_fee_structures(tenant_id, class_id, academic_year_id)
            .await
    }

    /// Deactivate a fee structure
    pub async fn deactivate_fee_structure(
        &mut self,
        tenant_id: &str,
        fee_structure_id: &str,
    ) -> LedgerResult<FeeStructure> {
        self.structure_manager
            .deactivate_fee_structure(tenant_id, fee_structure_id)
            .await
    }

    // Payment operations
    /// Record a new payment
    pub async fn record_payment(&mut self, payment: FeePayment) -> LedgerResult<FeePayment> {
        self.payment_manager.record_payment(payment).await
    }

    /// Get a payment by ID
    pub async fn get_payment(
        &self,
        tenant_id: &str,
        payment_id: &str,
    ) -> LedgerResult<Option<FeePayment>> {
        self.payment_manager.get_payment(tenant_id, payment_id).await
    }

    /// List a student's payments against a fee structure
    pub async fn list_student_payments(
        &self,
        tenant_id: &str,
        student_id: &str,
        fee_structure_id: &str,
    ) -> LedgerResult<Vec<FeePayment>> {
        self.payment_manager
            .list_student_payments(tenant_id, student_id, fee_structure_id)
            .await
    }

    /// Change a payment's status
    pub async fn update_payment_status(
        &mut self,
        tenant_id: &str,
        payment_id: &str,
        status: PaymentStatus,
    ) -> LedgerResult<FeePayment> {
        self.payment_manager
            .update_payment_status(tenant_id, payment_id, status)
            .await
    }

    /// Soft-delete a payment
    pub async fn delete_payment(
        &mut self,
        tenant_id: &str,
        payment_id: &str,
    ) -> LedgerResult<FeePayment> {
        self.payment_manager
            .delete_payment(tenant_id, payment_id)
            .await
    }

    // Reconciliation
    /// Due/paid/balance for a student against one fee structure
    pub async fn fee_summary(
        &self,
        tenant_id: &str,
        student_id: &str,
        fee_structure_id: &str,
    ) -> LedgerResult<FeeSummary> {
        let structure = self
            .structure_manager
            .get_fee_structure_required(tenant_id, fee_structure_id)
            .await?;
        let payments = self
            .payment_manager
            .list_student_payments(tenant_id, student_id, fee_structure_id)
            .await?;

        let summary = reconciliation::summarize_fee(&structure, &payments);
        debug!(
            tenant = %tenant_id,
            student = %student_id,
            fee_structure = %fee_structure_id,
            total_due = %summary.total_due,
            total_paid = %summary.total_paid,
            due_amount = %summary.due_amount,
            "reconciled fee summary"
        );
        Ok(summary)
    }

    /// Resolve an explicit academic year, or the tenant's current one
    pub async fn resolve_academic_year(
        &self,
        tenant_id: &str,
        academic_year_id: Option<&str>,
    ) -> LedgerResult<Option<AcademicYear>> {
        match academic_year_id {
            Some(id) => self.storage.get_academic_year(tenant_id, id).await,
            None => self.storage.get_current_academic_year(tenant_id).await,
        }
    }

    /// Month-by-month fee ledger for a student
    ///
    /// With no resolvable academic year the breakdown is empty rather than an
    /// error; without a fee structure for the student's class every month is
    /// due zero.
    pub async fn monthly_breakdown(
        &self,
        tenant_id: &str,
        student_id: &str,
        academic_year_id: Option<&str>,
    ) -> LedgerResult<MonthlyBreakdown> {
        let Some(year) = self
            .resolve_academic_year(tenant_id, academic_year_id)
            .await?
        else {
            warn!(
                tenant = %tenant_id,
                student = %student_id,
                requested = ?academic_year_id,
                "no academic year resolved; returning empty breakdown"
            );
            return Ok(MonthlyBreakdown::empty());
        };

        let student = self
            .storage
            .get_student(tenant_id, student_id)
            .await?
            .ok_or_else(|| LedgerError::StudentNotFound(student_id.to_string()))?;

        let structure = self
            .structure_manager
            .find_active(tenant_id, &student.class_id, &year.id)
            .await?;
        if structure.is_none() {
            debug!(
                tenant = %tenant_id,
                class = %student.class_id,
                academic_year = %year.id,
                "no active fee structure for class"
            );
        }

        let payments = self
            .payment_manager
            .list_completed_between(tenant_id, student_id, year.start_date, year.end_date)
            .await?;

        reconciliation::build_monthly_breakdown(
            &year,
            structure.as_ref(),
            &payments,
            &self.config.fees,
        )
    }

    /// Attendance counts and percentage for a student
    ///
    /// Scoped to the requested academic year, or the current one when none is
    /// requested. An unknown requested year is `AcademicYearNotFound`; with no
    /// request and no current year every record is summarised.
    pub async fn attendance_summary(
        &self,
        tenant_id: &str,
        student_id: &str,
        academic_year_id: Option<&str>,
    ) -> LedgerResult<AttendanceSummary> {
        if self.storage.get_student(tenant_id, student_id).await?.is_none() {
            return Err(LedgerError::StudentNotFound(student_id.to_string()));
        }

        let year = self
            .resolve_academic_year(tenant_id, academic_year_id)
            .await?;
        if let (Some(requested), None) = (academic_year_id, &year) {
            return Err(LedgerError::AcademicYearNotFound(requested.to_string()));
        }
        let (start, end) = match &year {
            Some(y) => (Some(y.start_date), Some(y.end_date)),
            None => (None, None),
        };

        let records = self
            .storage
            .list_attendance(tenant_id, student_id, start, end)
            .await?;
        Ok(attendance::summarize_with_scale(
            &records,
            self.config.attendance.percentage_scale,
        ))
    }

    /// Outstanding fees for every student in a class
    pub async fn class_outstanding_report(
        &self,
        tenant_id: &str,
        class_id: &str,
        academic_year_id: Option<&str>,
    ) -> LedgerResult<ClassOutstandingReport> {
        let year = self
            .resolve_academic_year(tenant_id, academic_year_id)
            .await?
            .ok_or_else(|| {
                LedgerError::AcademicYearNotFound(
                    academic_year_id.unwrap_or("current").to_string(),
                )
            })?;

        let structure = self
            .structure_manager
            .find_active(tenant_id, class_id, &year.id)
            .await?;
        let students = self
            .storage
            .list_class_students(tenant_id, class_id)
            .await?;

        let mut rows = Vec::with_capacity(students.len());
        for student in students {
            let summary = match &structure {
                Some(structure) => {
                    let payments = self
                        .payment_manager
                        .list_student_payments(tenant_id, &student.id, &structure.id)
                        .await?;
                    reconciliation::summarize_fee(structure, &payments)
                }
                None => FeeSummary::zero(),
            };
            rows.push(StudentFeeRow {
                student_id: student.id,
                student_name: student.name,
                summary,
            });
        }

        let total_due: BigDecimal = rows.iter().map(|r| &r.summary.total_due).sum();
        let total_paid: BigDecimal = rows.iter().map(|r| &r.summary.total_paid).sum();
        let total_outstanding: BigDecimal = rows.iter().map(|r| &r.summary.due_amount).sum();

        Ok(ClassOutstandingReport {
            class_id: class_id.to_string(),
            academic_year_id: year.id,
            fee_structure_id: structure.map(|s| s.id),
            students: rows,
            total_due,
            total_paid,
            total_outstanding,
        })
    }
}

/// One student's line in a class report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentFeeRow {
    pub student_id: String,
    pub student_name: String,
    pub summary: FeeSummary,
}

/// Outstanding fees across a class for one academic year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassOutstandingReport {
    pub class_id: String,
    pub academic_year_id: String,
    pub fee_structure_id: Option<String>,
    pub students: Vec<StudentFeeRow>,
    pub total_due: BigDecimal,
    pub total_paid: BigDecimal,
    /// Sum of clamped per-student dues; overpayments do not offset other students
    pub total_outstanding: BigDecimal,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::memory_storage::MemoryStorage;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    async fn seeded_ledger() -> FeeLedger<MemoryStorage> {
        let mut ledger = FeeLedger::new(MemoryStorage::new());
        ledger
            .register_academic_year(AcademicYear::new(
                "ay2024".to_string(),
                "school_a".to_string(),
                "2024-25".to_string(),
                date(2024, 4, 1),
                date(2025, 3, 31),
                true,
            ))
            .await
            .unwrap();
        ledger
            .register_student(Student::new(
                "stu1".to_string(),
                "school_a".to_string(),
                "grade5".to_string(),
                "Asha Rao".to_string(),
            ))
            .await
            .unwrap();
        ledger
            .create_fee_structure(
                "fee_g5".to_string(),
                "school_a".to_string(),
                "grade5".to_string(),
                "ay2024".to_string(),
                BigDecimal::from(12000),
            )
            .await
            .unwrap();
        ledger
    }

    #[tokio::test]
    async fn test_fee_summary_basic() {
        let mut ledger = seeded_ledger().await;

        let payment = FeePayment::new(
            "pay1".to_string(),
            "school_a".to_string(),
            "stu1".to_string(),
            "fee_g5".to_string(),
            BigDecimal::from(4500),
            date(2024, 5, 2),
        );
        ledger.record_payment(payment).await.unwrap();

        let summary = ledger
            .fee_summary("school_a", "stu1", "fee_g5")
            .await
            .unwrap();
        assert_eq!(summary.total_due, BigDecimal::from(12000));
        assert_eq!(summary.total_paid, BigDecimal::from(4500));
        assert_eq!(summary.due_amount, BigDecimal::from(7500));
    }

    #[tokio::test]
    async fn test_fee_summary_other_tenant_is_not_found() {
        let ledger = seeded_ledger().await;
        let result = ledger.fee_summary("school_b", "stu1", "fee_g5").await;
        assert!(matches!(result, Err(LedgerError::FeeStructureNotFound(_))));
    }

    #[tokio::test]
    async fn test_monthly_breakdown_uses_current_year() {
        let ledger = seeded_ledger().await;
        let breakdown = ledger
            .monthly_breakdown("school_a", "stu1", None)
            .await
            .unwrap();
        assert_eq!(breakdown.academic_year_id.as_deref(), Some("ay2024"));
        assert_eq!(breakdown.fee_structure_id.as_deref(), Some("fee_g5"));
        assert_eq!(breakdown.months.len(), 12);
        assert_eq!(breakdown.monthly_due, BigDecimal::from(1000));
    }

    #[tokio::test]
    async fn test_monthly_breakdown_without_year_is_empty() {
        let ledger = FeeLedger::new(MemoryStorage::new());
        let breakdown = ledger
            .monthly_breakdown("school_a", "stu1", None)
            .await
            .unwrap();
        assert_eq!(breakdown, MonthlyBreakdown::empty());
    }

    #[tokio::test]
    async fn test_register_inverted_academic_year_fails() {
        let mut ledger = FeeLedger::new(MemoryStorage::new());
        let result = ledger
            .register_academic_year(AcademicYear::new(
                "bad".to_string(),
                "school_a".to_string(),
                "bad".to_string(),
                date(2025, 1, 1),
                date(2024, 1, 1),
                false,
            ))
            .await;
        assert!(matches!(result, Err(LedgerError::Validation(_))));
    }
}
