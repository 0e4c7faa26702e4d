//! In-memory storage implementation for testing

use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::traits::*;
use crate::types::*;

/// In-memory storage implementation for testing and development
///
/// Clones share the same underlying maps, so a clone handed to each manager
/// sees every write made through the others.
#[derive(Debug, Clone)]
pub struct MemoryStorage {
    students: Arc<RwLock<HashMap<String, Student>>>,
    academic_years: Arc<RwLock<HashMap<String, AcademicYear>>>,
    fee_structures: Arc<RwLock<HashMap<String, FeeStructure>>>,
    payments: Arc<RwLock<HashMap<String, FeePayment>>>,
    attendance: Arc<RwLock<HashMap<String, AttendanceRecord>>>,
}

fn read<T>(lock: &RwLock<T>) -> LedgerResult<RwLockReadGuard<'_, T>> {
    lock.read()
        .map_err(|e| LedgerError::Storage(format!("lock poisoned: {}", e)))
}

fn write<T>(lock: &RwLock<T>) -> LedgerResult<RwLockWriteGuard<'_, T>> {
    lock.write()
        .map_err(|e| LedgerError::Storage(format!("lock poisoned: {}", e)))
}

fn within(date: NaiveDate, start: Option<NaiveDate>, end: Option<NaiveDate>) -> bool {
    if let Some(start) = start {
        if date < start {
            return false;
        }
    }
    if let Some(end) = end {
        if date > end {
            return false;
        }
    }
    true
}

impl MemoryStorage {
    /// Create a new memory storage instance
    pub fn new() -> Self {
        Self {
            students: Arc::new(RwLock::new(HashMap::new())),
            academic_years: Arc::new(RwLock::new(HashMap::new())),
            fee_structures: Arc::new(RwLock::new(HashMap::new())),
            payments: Arc::new(RwLock::new(HashMap::new())),
            attendance: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Clear all data (useful for testing)
    pub fn clear(&self) -> LedgerResult<()> {
        write(&self.students)?.clear();
        write(&self.academic_years)?.clear();
        write(&self.fee_structures)?.clear();
        write(&self.payments)?.clear();
        write(&self.attendance)?.clear();
        Ok(())
    }

    /// Number of payment rows held, soft-deleted ones included
    pub fn payment_count(&self) -> LedgerResult<usize> {
        Ok(read(&self.payments)?.len())
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SchoolStorage for MemoryStorage {
    async fn save_student(&mut self, student: &Student) -> LedgerResult<()> {
        write(&self.students)?.insert(student.id.clone(), student.clone());
        Ok(())
    }

    async fn get_student(
        &self,
        tenant_id: &str,
        student_id: &str,
    ) -> LedgerResult<Option<Student>> {
        Ok(read(&self.students)?
            .get(student_id)
            .filter(|s| s.tenant_id == tenant_id)
            .cloned())
    }

    async fn list_class_students(
        &self,
        tenant_id: &str,
        class_id: &str,
    ) -> LedgerResult<Vec<Student>> {
        let mut students: Vec<Student> = read(&self.students)?
            .values()
            .filter(|s| s.tenant_id == tenant_id && s.class_id == class_id)
            .cloned()
            .collect();
        students.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(students)
    }

    async fn save_academic_year(&mut self, year: &AcademicYear) -> LedgerResult<()> {
        write(&self.academic_years)?.insert(year.id.clone(), year.clone());
        Ok(())
    }

    async fn get_academic_year(
        &self,
        tenant_id: &str,
        academic_year_id: &str,
    ) -> LedgerResult<Option<AcademicYear>> {
        Ok(read(&self.academic_years)?
            .get(academic_year_id)
            .filter(|y| y.tenant_id == tenant_id)
            .cloned())
    }

    async fn get_current_academic_year(
        &self,
        tenant_id: &str,
    ) -> LedgerResult<Option<AcademicYear>> {
        Ok(read(&self.academic_years)?
            .values()
            .filter(|y| y.tenant_id == tenant_id && y.is_current)
            .min_by(|a, b| a.start_date.cmp(&b.start_date).then(a.id.cmp(&b.id)))
            .cloned())
    }

    async fn save_fee_structure(&mut self, structure: &FeeStructure) -> LedgerResult<()> {
        write(&self.fee_structures)?.insert(structure.id.clone(), structure.clone());
        Ok(())
    }

    async fn get_fee_structure(
        &self,
        tenant_id: &str,
        fee_structure_id: &str,
    ) -> LedgerResult<Option<FeeStructure>> {
        Ok(read(&self.fee_structures)?
            .get(fee_structure_id)
            .filter(|f| f.tenant_id == tenant_id)
            .cloned())
    }

    async fn list_fee_structures(
        &self,
        tenant_id: &str,
        class_id: Option<&str>,
        academic_year_id: Option<&str>,
    ) -> LedgerResult<Vec<FeeStructure>> {
        let mut structures: Vec<FeeStructure> = read(&self.fee_structures)?
            .values()
            .filter(|f| {
                f.tenant_id == tenant_id
                    && class_id.is_none_or(|c| f.class_id == c)
                    && academic_year_id.is_none_or(|y| f.academic_year_id == y)
            })
            .cloned()
            .collect();
        structures.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(structures)
    }

    async fn find_active_fee_structure(
        &self,
        tenant_id: &str,
        class_id: &str,
        academic_year_id: &str,
    ) -> LedgerResult<Option<FeeStructure>> {
        Ok(read(&self.fee_structures)?
            .values()
            .filter(|f| {
                f.tenant_id == tenant_id
                    && f.class_id == class_id
                    && f.academic_year_id == academic_year_id
                    && f.is_active()
            })
            .min_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)))
            .cloned())
    }

    async fn update_fee_structure(&mut self, structure: &FeeStructure) -> LedgerResult<()> {
        let mut structures = write(&self.fee_structures)?;
        if structures.contains_key(&structure.id) {
            structures.insert(structure.id.clone(), structure.clone());
            Ok(())
        } else {
            Err(LedgerError::FeeStructureNotFound(structure.id.clone()))
        }
    }

    async fn save_payment(&mut self, payment: &FeePayment) -> LedgerResult<()> {
        write(&self.payments)?.insert(payment.id.clone(), payment.clone());
        Ok(())
    }

    async fn get_payment(
        &self,
        tenant_id: &str,
        payment_id: &str,
    ) -> LedgerResult<Option<FeePayment>> {
        Ok(read(&self.payments)?
            .get(payment_id)
            .filter(|p| p.tenant_id == tenant_id)
            .cloned())
    }

    async fn update_payment(&mut self, payment: &FeePayment) -> LedgerResult<()> {
        let mut payments = write(&self.payments)?;
        if payments.contains_key(&payment.id) {
            payments.insert(payment.id.clone(), payment.clone());
            Ok(())
        } else {
            Err(LedgerError::PaymentNotFound(payment.id.clone()))
        }
    }

    async fn list_student_payments(
        &self,
        tenant_id: &str,
        student_id: &str,
        fee_structure_id: &str,
    ) -> LedgerResult<Vec<FeePayment>> {
        let mut payments: Vec<FeePayment> = read(&self.payments)?
            .values()
            .filter(|p| {
                p.tenant_id == tenant_id
                    && p.student_id == student_id
                    && p.fee_structure_id == fee_structure_id
            })
            .cloned()
            .collect();
        payments.sort_by(|a, b| a.payment_date.cmp(&b.payment_date).then(a.id.cmp(&b.id)));
        Ok(payments)
    }

    async fn list_completed_payments_between(
        &self,
        tenant_id: &str,
        student_id: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> LedgerResult<Vec<FeePayment>> {
        let mut payments: Vec<FeePayment> = read(&self.payments)?
            .values()
            .filter(|p| {
                p.tenant_id == tenant_id
                    && p.student_id == student_id
                    && p.counts_toward_paid()
                    && within(p.payment_date, Some(start_date), Some(end_date))
            })
            .cloned()
            .collect();
        payments.sort_by(|a, b| a.payment_date.cmp(&b.payment_date).then(a.id.cmp(&b.id)));
        Ok(payments)
    }

    async fn save_attendance(&mut self, record: &AttendanceRecord) -> LedgerResult<()> {
        write(&self.attendance)?.insert(record.id.clone(), record.clone());
        Ok(())
    }

    async fn list_attendance(
        &self,
        tenant_id: &str,
        student_id: &str,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> LedgerResult<Vec<AttendanceRecord>> {
        let mut records: Vec<AttendanceRecord> = read(&self.attendance)?
            .values()
            .filter(|r| {
                r.tenant_id == tenant_id
                    && r.student_id == student_id
                    && within(r.date, start_date, end_date)
            })
            .cloned()
            .collect();
        records.sort_by(|a, b| a.date.cmp(&b.date));
        Ok(records)
    }
}
