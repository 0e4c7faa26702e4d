//! Attendance percentage calculation
//!
//! Present and late days count in full, half days count as half, absences
//! count as zero. Every marked day contributes to the denominator.

use bigdecimal::{BigDecimal, RoundingMode};
use serde::{Deserialize, Serialize};

use crate::types::*;

/// Default number of decimal places on a percentage
pub const DEFAULT_PERCENTAGE_SCALE: i64 = 2;

/// Per-status counts and the resulting percentage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceSummary {
    pub total_days: u32,
    pub present: u32,
    pub absent: u32,
    pub late: u32,
    pub half_day: u32,
    pub percentage: BigDecimal,
}

impl AttendanceSummary {
    fn from_counts(present: u32, absent: u32, late: u32, half_day: u32, scale: i64) -> Self {
        let total_days = present + absent + late + half_day;
        let percentage = if total_days == 0 {
            BigDecimal::from(0)
        } else {
            let attended = BigDecimal::from(present + late)
                + BigDecimal::from(half_day) / BigDecimal::from(2);
            (attended * BigDecimal::from(100) / BigDecimal::from(total_days))
                .with_scale_round(scale, RoundingMode::HalfUp)
        };

        Self {
            total_days,
            present,
            absent,
            late,
            half_day,
            percentage,
        }
    }
}

/// Summarise statuses with an explicit rounding scale
pub fn summarize_statuses<I>(statuses: I, scale: i64) -> AttendanceSummary
where
    I: IntoIterator<Item = AttendanceStatus>,
{
    let (mut present, mut absent, mut late, mut half_day) = (0u32, 0u32, 0u32, 0u32);
    for status in statuses {
        match status {
            AttendanceStatus::Present => present += 1,
            AttendanceStatus::Absent => absent += 1,
            AttendanceStatus::Late => late += 1,
            AttendanceStatus::HalfDay => half_day += 1,
        }
    }
    AttendanceSummary::from_counts(present, absent, late, half_day, scale)
}

/// Summarise attendance records with an explicit rounding scale
pub fn summarize_with_scale(records: &[AttendanceRecord], scale: i64) -> AttendanceSummary {
    summarize_statuses(records.iter().map(|r| r.status), scale)
}

/// Summarise attendance records, percentage rounded to two places
pub fn summarize(records: &[AttendanceRecord]) -> AttendanceSummary {
    summarize_with_scale(records, DEFAULT_PERCENTAGE_SCALE)
}

/// Attendance percentage over the marked days; 0 when nothing is marked
pub fn attendance_percentage(records: &[AttendanceRecord]) -> BigDecimal {
    summarize(records).percentage
}
