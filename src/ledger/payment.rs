//! Payment recording and management

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::traits::*;
use crate::types::*;
use crate::utils::validation::validate_positive_amount;

/// Payment manager for recording and correcting fee payments
///
/// Recording takes no lock and checks no idempotency key: two concurrent
/// submissions for the same student and structure are both stored, and the
/// balance is recomputed from whatever has committed at read time.
pub struct PaymentManager<S: SchoolStorage> {
    storage: S,
    validator: Box<dyn PaymentValidator>,
}

impl<S: SchoolStorage> PaymentManager<S> {
    /// Create a new payment manager
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            validator: Box::new(DefaultPaymentValidator),
        }
    }

    /// Create a new payment manager with custom validator
    pub fn with_validator(storage: S, validator: Box<dyn PaymentValidator>) -> Self {
        Self { storage, validator }
    }

    /// Record a new payment
    pub async fn record_payment(&mut self, mut payment: FeePayment) -> LedgerResult<FeePayment> {
        self.validator.validate_payment(&payment)?;

        let student = self
            .storage
            .get_student(&payment.tenant_id, &payment.student_id)
            .await?
            .ok_or_else(|| LedgerError::StudentNotFound(payment.student_id.clone()))?;

        let structure = self
            .storage
            .get_fee_structure(&payment.tenant_id, &payment.fee_structure_id)
            .await?
            .ok_or_else(|| LedgerError::FeeStructureNotFound(payment.fee_structure_id.clone()))?;

        // Accepted on purpose: siblings and transfers can pay against another class's fee
        if structure.class_id != student.class_id {
            warn!(
                student = %student.id,
                student_class = %student.class_id,
                structure_class = %structure.class_id,
                "payment recorded against another class's fee structure"
            );
        }

        if self
            .storage
            .get_payment(&payment.tenant_id, &payment.id)
            .await?
            .is_some()
        {
            return Err(LedgerError::Validation(format!(
                "Payment with ID '{}' already exists",
                payment.id
            )));
        }

        payment.updated_at = chrono::Utc::now().naive_utc();
        self.storage.save_payment(&payment).await?;
        info!(
            tenant = %payment.tenant_id,
            student = %payment.student_id,
            fee_structure = %payment.fee_structure_id,
            payment = %payment.id,
            amount = %payment.amount_paid,
            status = ?payment.status,
            "recorded fee payment"
        );

        Ok(payment)
    }

    /// Get a payment by ID
    pub async fn get_payment(
        &self,
        tenant_id: &str,
        payment_id: &str,
    ) -> LedgerResult<Option<FeePayment>> {
        self.storage.get_payment(tenant_id, payment_id).await
    }

    /// Get a payment by ID, returning an error if not found
    pub async fn get_payment_required(
        &self,
        tenant_id: &str,
        payment_id: &str,
    ) -> LedgerResult<FeePayment> {
        self.storage
            .get_payment(tenant_id, payment_id)
            .await?
            .ok_or_else(|| LedgerError::PaymentNotFound(payment_id.to_string()))
    }

    /// All payments a student made against a fee structure, whatever their status
    pub async fn list_student_payments(
        &self,
        tenant_id: &str,
        student_id: &str,
        fee_structure_id: &str,
    ) -> LedgerResult<Vec<FeePayment>> {
        self.storage
            .list_student_payments(tenant_id, student_id, fee_structure_id)
            .await
    }

    /// Completed, non-deleted payments dated within an inclusive range
    pub async fn list_completed_between(
        &self,
        tenant_id: &str,
        student_id: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> LedgerResult<Vec<FeePayment>> {
        self.storage
            .list_completed_payments_between(tenant_id, student_id, start_date, end_date)
            .await
    }

    /// Move a payment to a new status (e.g. a pending gateway payment settling)
    pub async fn update_payment_status(
        &mut self,
        tenant_id: &str,
        payment_id: &str,
        status: PaymentStatus,
    ) -> LedgerResult<FeePayment> {
        let mut payment = self.get_payment_required(tenant_id, payment_id).await?;

        if payment.is_deleted {
            return Err(LedgerError::Validation(format!(
                "Payment '{}' is deleted and cannot change status",
                payment_id
            )));
        }

        let previous = payment.status;
        payment.status = status;
        payment.updated_at = chrono::Utc::now().naive_utc();
        self.storage.update_payment(&payment).await?;
        info!(
            tenant = %tenant_id,
            payment = %payment_id,
            from = ?previous,
            to = ?status,
            "updated payment status"
        );

        Ok(payment)
    }

    /// Soft-delete a payment; deleting twice is a no-op
    pub async fn delete_payment(
        &mut self,
        tenant_id: &str,
        payment_id: &str,
    ) -> LedgerResult<FeePayment> {
        let mut payment = self.get_payment_required(tenant_id, payment_id).await?;

        if payment.is_deleted {
            debug!(tenant = %tenant_id, payment = %payment_id, "payment already deleted");
            return Ok(payment);
        }

        payment.is_deleted = true;
        payment.updated_at = chrono::Utc::now().naive_utc();
        self.storage.update_payment(&payment).await?;
        info!(tenant = %tenant_id, payment = %payment_id, "deleted fee payment");

        Ok(payment)
    }
}

/// Builder for fee payments
#[derive(Debug)]
pub struct PaymentBuilder {
    payment: FeePayment,
}

impl PaymentBuilder {
    /// Start a completed payment with a generated ID
    pub fn new(
        tenant_id: String,
        student_id: String,
        fee_structure_id: String,
        amount_paid: BigDecimal,
        payment_date: NaiveDate,
    ) -> Self {
        Self {
            payment: FeePayment::new(
                uuid::Uuid::new_v4().to_string(),
                tenant_id,
                student_id,
                fee_structure_id,
                amount_paid,
                payment_date,
            ),
        }
    }

    /// Use a caller-chosen ID instead of the generated one
    pub fn id(mut self, id: String) -> Self {
        self.payment.id = id;
        self
    }

    /// Set the receipt or gateway reference
    pub fn reference(mut self, reference: String) -> Self {
        self.payment.reference = Some(reference);
        self
    }

    pub fn status(mut self, status: PaymentStatus) -> Self {
        self.payment.status = status;
        self
    }

    /// Build the payment
    pub fn build(self) -> LedgerResult<FeePayment> {
        validate_positive_amount(&self.payment.amount_paid)?;
        Ok(self.payment)
    }
}

/// Common payment patterns
pub mod patterns {
    use super::*;

    /// A payment received in full at the counter
    pub fn completed_payment(
        tenant_id: &str,
        student_id: &str,
        fee_structure_id: &str,
        amount: BigDecimal,
        date: NaiveDate,
    ) -> LedgerResult<FeePayment> {
        PaymentBuilder::new(
            tenant_id.to_string(),
            student_id.to_string(),
            fee_structure_id.to_string(),
            amount,
            date,
        )
        .build()
    }

    /// A gateway payment awaiting settlement
    pub fn pending_payment(
        tenant_id: &str,
        student_id: &str,
        fee_structure_id: &str,
        amount: BigDecimal,
        date: NaiveDate,
        gateway_reference: String,
    ) -> LedgerResult<FeePayment> {
        PaymentBuilder::new(
            tenant_id.to_string(),
            student_id.to_string(),
            fee_structure_id.to_string(),
            amount,
            date,
        )
        .status(PaymentStatus::Pending)
        .reference(gateway_reference)
        .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_generates_unique_ids() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let a = patterns::completed_payment("t1", "s1", "f1", BigDecimal::from(10), date).unwrap();
        let b = patterns::completed_payment("t1", "s1", "f1", BigDecimal::from(10), date).unwrap();
        assert_ne!(a.id, b.id);
        assert_eq!(a.status, PaymentStatus::Completed);
        assert!(!a.is_deleted);
    }

    #[test]
    fn test_builder_rejects_non_positive_amount() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let result = PaymentBuilder::new(
            "t1".to_string(),
            "s1".to_string(),
            "f1".to_string(),
            BigDecimal::from(-5),
            date,
        )
        .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_pending_pattern_carries_reference() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let payment = patterns::pending_payment(
            "t1",
            "s1",
            "f1",
            BigDecimal::from(250),
            date,
            "gw_123".to_string(),
        )
        .unwrap();
        assert_eq!(payment.status, PaymentStatus::Pending);
        assert_eq!(payment.reference.as_deref(), Some("gw_123"));
        assert!(!payment.counts_toward_paid());
    }
}
