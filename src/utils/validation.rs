//! Validation utilities

use crate::traits::*;
use crate::types::*;
use bigdecimal::BigDecimal;

/// Validate that an amount is positive
pub fn validate_positive_amount(amount: &BigDecimal) -> LedgerResult<()> {
    if *amount <= BigDecimal::from(0) {
        Err(LedgerError::Validation(
            "Amount must be positive".to_string(),
        ))
    } else {
        Ok(())
    }
}

/// Validate that a record identifier is valid
pub fn validate_record_id(kind: &str, id: &str) -> LedgerResult<()> {
    if id.trim().is_empty() {
        return Err(LedgerError::Validation(format!("{} ID cannot be empty", kind)));
    }

    if id.len() > 64 {
        return Err(LedgerError::Validation(format!(
            "{} ID cannot exceed 64 characters",
            kind
        )));
    }

    // Alphanumeric, dashes, and underscores only (covers UUIDs)
    if !id
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(LedgerError::Validation(format!(
            "{} ID can only contain alphanumeric characters, dashes, and underscores",
            kind
        )));
    }

    Ok(())
}

/// Validate an optional payment reference
pub fn validate_reference(reference: Option<&str>) -> LedgerResult<()> {
    if let Some(reference) = reference {
        if reference.trim().is_empty() {
            return Err(LedgerError::Validation(
                "Payment reference cannot be blank when given".to_string(),
            ));
        }
        if reference.len() > 100 {
            return Err(LedgerError::Validation(
                "Payment reference cannot exceed 100 characters".to_string(),
            ));
        }
    }
    Ok(())
}

/// Enhanced payment validator with detailed checks
pub struct EnhancedPaymentValidator;

impl PaymentValidator for EnhancedPaymentValidator {
    fn validate_payment(&self, payment: &FeePayment) -> LedgerResult<()> {
        DefaultPaymentValidator.validate_payment(payment)?;

        validate_record_id("Payment", &payment.id)?;
        validate_record_id("Student", &payment.student_id)?;
        validate_record_id("Fee structure", &payment.fee_structure_id)?;
        validate_positive_amount(&payment.amount_paid)?;
        validate_reference(payment.reference.as_deref())?;

        if payment.is_deleted {
            return Err(LedgerError::Validation(
                "Cannot record a payment that is already deleted".to_string(),
            ));
        }

        Ok(())
    }
}

/// Enhanced fee structure validator with detailed checks
pub struct EnhancedFeeStructureValidator;

impl FeeStructureValidator for EnhancedFeeStructureValidator {
    fn validate_fee_structure(&self, structure: &FeeStructure) -> LedgerResult<()> {
        DefaultFeeStructureValidator.validate_fee_structure(structure)?;

        validate_record_id("Fee structure", &structure.id)?;
        validate_record_id("Class", &structure.class_id)?;
        validate_record_id("Academic year", &structure.academic_year_id)?;
        validate_positive_amount(&structure.amount)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn payment(id: &str, amount: i64) -> FeePayment {
        FeePayment::new(
            id.to_string(),
            "t1".to_string(),
            "s1".to_string(),
            "fee1".to_string(),
            BigDecimal::from(amount),
            NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
        )
    }

    #[test]
    fn test_record_id_rules() {
        assert!(validate_record_id("Payment", "pay_001-a").is_ok());
        assert!(validate_record_id("Payment", "   ").is_err());
        assert!(validate_record_id("Payment", "pay 001").is_err());
        assert!(validate_record_id("Payment", &"x".repeat(65)).is_err());
    }

    #[test]
    fn test_enhanced_payment_validator() {
        assert!(EnhancedPaymentValidator
            .validate_payment(&payment("p1", 500))
            .is_ok());

        let mut with_blank_reference = payment("p2", 500);
        with_blank_reference.reference = Some(" ".to_string());
        assert!(EnhancedPaymentValidator
            .validate_payment(&with_blank_reference)
            .is_err());

        let mut deleted = payment("p3", 500);
        deleted.is_deleted = true;
        assert!(EnhancedPaymentValidator.validate_payment(&deleted).is_err());
    }

    #[test]
    fn test_enhanced_fee_structure_validator_requires_positive_amount() {
        let structure = FeeStructure::new(
            "fee1".to_string(),
            "t1".to_string(),
            "class-1".to_string(),
            "ay-2024".to_string(),
            BigDecimal::from(0),
        );
        assert!(EnhancedFeeStructureValidator
            .validate_fee_structure(&structure)
            .is_err());
    }
}
