//! Fee structure management

use bigdecimal::BigDecimal;
use tracing::info;

use crate::traits::*;
use crate::types::*;

/// Manager for the fee structures billed to classes
pub struct FeeStructureManager<S: SchoolStorage> {
    pub(crate) storage: S,
    validator: Box<dyn FeeStructureValidator>,
}

impl<S: SchoolStorage> FeeStructureManager<S> {
    /// Create a new fee structure manager
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            validator: Box::new(DefaultFeeStructureValidator),
        }
    }

    /// Create a new fee structure manager with custom validator
    pub fn with_validator(storage: S, validator: Box<dyn FeeStructureValidator>) -> Self {
        Self { storage, validator }
    }

    /// Create a new active fee structure
    pub async fn create_fee_structure(
        &mut self,
        id: String,
        tenant_id: String,
        class_id: String,
        academic_year_id: String,
        amount: BigDecimal,
    ) -> LedgerResult<FeeStructure> {
        let structure = FeeStructure::new(id, tenant_id, class_id, academic_year_id, amount);

        self.validator.validate_fee_structure(&structure)?;

        if self
            .storage
            .get_fee_structure(&structure.tenant_id, &structure.id)
            .await?
            .is_some()
        {
            return Err(LedgerError::Validation(format!(
                "Fee structure with ID '{}' already exists",
                structure.id
            )));
        }

        if self
            .storage
            .get_academic_year(&structure.tenant_id, &structure.academic_year_id)
            .await?
            .is_none()
        {
            return Err(LedgerError::AcademicYearNotFound(
                structure.academic_year_id.clone(),
            ));
        }

        self.storage.save_fee_structure(&structure).await?;
        info!(
            tenant = %structure.tenant_id,
            fee_structure = %structure.id,
            class = %structure.class_id,
            amount = %structure.amount,
            "created fee structure"
        );

        Ok(structure)
    }

    /// Get a fee structure by ID
    pub async fn get_fee_structure(
        &self,
        tenant_id: &str,
        fee_structure_id: &str,
    ) -> LedgerResult<Option<FeeStructure>> {
        self.storage
            .get_fee_structure(tenant_id, fee_structure_id)
            .await
    }

    /// Get a fee structure by ID, returning an error if not found
    pub async fn get_fee_structure_required(
        &self,
        tenant_id: &str,
        fee_structure_id: &str,
    ) -> LedgerResult<FeeStructure> {
        self.storage
            .get_fee_structure(tenant_id, fee_structure_id)
            .await?
            .ok_or_else(|| LedgerError::FeeStructureNotFound(fee_structure_id.to_string()))
    }

    /// List fee structures, optionally narrowed to a class and/or academic year
    pub async fn list_fee_structures(
        &self,
        tenant_id: &str,
        class_id: Option<&str>,
        academic_year_id: Option<&str>,
    ) -> LedgerResult<Vec<FeeStructure>> {
        self.storage
            .list_fee_structures(tenant_id, class_id, academic_year_id)
            .await
    }

    /// Active fee structure for a class and academic year
    pub async fn find_active(
        &self,
        tenant_id: &str,
        class_id: &str,
        academic_year_id: &str,
    ) -> LedgerResult<Option<FeeStructure>> {
        self.storage
            .find_active_fee_structure(tenant_id, class_id, academic_year_id)
            .await
    }

    /// Retire a fee structure so it is no longer resolved for its class
    pub async fn deactivate_fee_structure(
        &mut self,
        tenant_id: &str,
        fee_structure_id: &str,
    ) -> LedgerResult<FeeStructure> {
        let mut structure = self
            .get_fee_structure_required(tenant_id, fee_structure_id)
            .await?;

        structure.status = FeeStructureStatus::Inactive;
        structure.updated_at = chrono::Utc::now().naive_utc();
        self.storage.update_fee_structure(&structure).await?;
        info!(tenant = %tenant_id, fee_structure = %fee_structure_id, "deactivated fee structure");

        Ok(structure)
    }
}
