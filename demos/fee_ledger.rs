//! Fee ledger walkthrough: one class, one academic year, a few payments

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use school_fees_core::utils::MemoryStorage;
use school_fees_core::{
    patterns, AcademicYear, AttendanceRecord, AttendanceStatus, FeeLedger, LedgerConfig,
    PaymentStatus, Student,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => school_fees_core::load_config(std::path::Path::new(&path))?,
        None => LedgerConfig::default(),
    };

    let tenant = "greenwood";
    let mut ledger = FeeLedger::with_config(MemoryStorage::new(), config);

    // 1. Reference data
    ledger
        .register_academic_year(AcademicYear::new(
            "ay2024".to_string(),
            tenant.to_string(),
            "2024-25".to_string(),
            NaiveDate::from_ymd_opt(2024, 4, 1).ok_or("bad date")?,
            NaiveDate::from_ymd_opt(2025, 3, 31).ok_or("bad date")?,
            true,
        ))
        .await?;

    for (id, name) in [("stu_1", "Meera Iyer"), ("stu_2", "Kabir Shah")] {
        ledger
            .register_student(Student::new(
                id.to_string(),
                tenant.to_string(),
                "grade7".to_string(),
                name.to_string(),
            ))
            .await?;
    }

    let structure = ledger
        .create_fee_structure(
            "fee_g7_2024".to_string(),
            tenant.to_string(),
            "grade7".to_string(),
            "ay2024".to_string(),
            BigDecimal::from(12000),
        )
        .await?;
    println!("Fee structure {} for grade7: {}\n", structure.id, structure.amount);

    // 2. Payments
    let june = NaiveDate::from_ymd_opt(2024, 6, 15).ok_or("bad date")?;
    ledger
        .record_payment(patterns::completed_payment(
            tenant,
            "stu_1",
            &structure.id,
            BigDecimal::from(3000),
            june,
        )?)
        .await?;

    let gateway = ledger
        .record_payment(patterns::pending_payment(
            tenant,
            "stu_2",
            &structure.id,
            BigDecimal::from(6000),
            june,
            "gw_20240615_01".to_string(),
        )?)
        .await?;
    ledger
        .update_payment_status(tenant, &gateway.id, PaymentStatus::Completed)
        .await?;

    // 3. Reconciliation
    let summary = ledger.fee_summary(tenant, "stu_1", &structure.id).await?;
    println!(
        "stu_1: due {} / paid {} / outstanding {}\n",
        summary.total_due, summary.total_paid, summary.due_amount
    );

    let breakdown = ledger.monthly_breakdown(tenant, "stu_1", None).await?;
    println!("{:<10} {:>6} {:>10} {:>10} {:>10}", "Month", "Year", "Due", "Paid", "Balance");
    for month in &breakdown.months {
        println!(
            "{:<10} {:>6} {:>10} {:>10} {:>10}",
            month.month_name, month.year, month.total_due, month.total_paid, month.balance
        );
    }
    println!();

    let report = ledger
        .class_outstanding_report(tenant, "grade7", None)
        .await?;
    for row in &report.students {
        println!(
            "{:<12} outstanding {}",
            row.student_name, row.summary.due_amount
        );
    }
    println!("Class outstanding: {}\n", report.total_outstanding);

    // 4. Attendance
    let statuses = [
        AttendanceStatus::Present,
        AttendanceStatus::Present,
        AttendanceStatus::Late,
        AttendanceStatus::HalfDay,
    ];
    for (day, status) in statuses.into_iter().enumerate() {
        ledger
            .record_attendance(AttendanceRecord::new(
                format!("att_{}", day),
                tenant.to_string(),
                "stu_1".to_string(),
                NaiveDate::from_ymd_opt(2024, 7, day as u32 + 1).ok_or("bad date")?,
                status,
            ))
            .await?;
    }
    let attendance = ledger.attendance_summary(tenant, "stu_1", None).await?;
    println!(
        "stu_1 attendance: {}% over {} days",
        attendance.percentage, attendance.total_days
    );

    Ok(())
}
