//! Monthly apportionment of a yearly fee across an academic year

use bigdecimal::{BigDecimal, RoundingMode};
use chrono::{Datelike, Months, NaiveDate};
use tracing::debug;

use crate::config::{ApportionmentPolicy, FeeSettings};
use crate::types::*;

/// Inclusive number of calendar months touched by `[start, end]`
///
/// Returns 0 when `end` precedes `start`.
pub fn month_span(start: NaiveDate, end: NaiveDate) -> u32 {
    if end < start {
        return 0;
    }
    let months = (end.year() - start.year()) * 12 + end.month() as i32 - start.month() as i32;
    (months + 1) as u32
}

/// Calendar boundaries of the month `offset` months after the month containing `anchor`
pub fn month_range(anchor: NaiveDate, offset: u32) -> LedgerResult<MonthRange> {
    let out_of_range = || {
        LedgerError::Validation(format!(
            "month {} after {} is outside the supported date range",
            offset, anchor
        ))
    };

    let first_of_anchor = anchor.with_day(1).ok_or_else(out_of_range)?;
    let start = first_of_anchor
        .checked_add_months(Months::new(offset))
        .ok_or_else(out_of_range)?;
    let end = start
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .ok_or_else(out_of_range)?;

    Ok(MonthRange { start, end })
}

/// Split `total` into `months` shares according to the policy
pub fn apportion(total: &BigDecimal, months: u32, settings: &FeeSettings) -> Vec<BigDecimal> {
    if months == 0 {
        return Vec::new();
    }

    let share = total.clone() / BigDecimal::from(months);
    match settings.apportionment {
        ApportionmentPolicy::Even => vec![share; months as usize],
        ApportionmentPolicy::LastMonthAbsorbs => {
            // Rounding down keeps the final month's remainder non-negative
            let rounded = share.with_scale_round(settings.currency_scale, RoundingMode::Down);
            let mut shares = vec![rounded.clone(); months as usize - 1];
            let allocated: BigDecimal = shares.iter().sum();
            shares.push(total - &allocated);
            shares
        }
    }
}

/// Build a month-by-month ledger for one academic year
///
/// `structure` is the fee structure billed to the student's class for the
/// year; without one every month is due zero. Payments outside the year or
/// that do not count toward paid totals are dropped. Each remaining payment
/// falls into exactly one month because the month ranges are disjoint.
pub fn build_monthly_breakdown(
    year: &AcademicYear,
    structure: Option<&FeeStructure>,
    payments: &[FeePayment],
    settings: &FeeSettings,
) -> LedgerResult<MonthlyBreakdown> {
    let month_count = month_span(year.start_date, year.end_date);
    let total_due = structure
        .map(|s| s.amount.clone())
        .unwrap_or_else(|| BigDecimal::from(0));
    let shares = apportion(&total_due, month_count, settings);
    let monthly_due = shares.first().cloned().unwrap_or_else(|| BigDecimal::from(0));

    let in_year: Vec<&FeePayment> = payments
        .iter()
        .filter(|p| p.counts_toward_paid() && year.contains(p.payment_date))
        .collect();

    let mut months = Vec::with_capacity(month_count as usize);
    for (index, due) in (0..month_count).zip(shares) {
        let range = month_range(year.start_date, index)?;
        let month_payments: Vec<FeePayment> = in_year
            .iter()
            .filter(|p| range.contains(p.payment_date))
            .map(|p| (*p).clone())
            .collect();
        let total_paid: BigDecimal = month_payments.iter().map(|p| &p.amount_paid).sum();
        let balance = &due - &total_paid;

        months.push(MonthlyFeeRecord {
            index,
            month: range.start.month(),
            year: range.start.year(),
            month_name: range.start.format("%B").to_string(),
            total_due: due,
            total_paid,
            balance,
            payments: month_payments,
            range,
        });
    }

    debug!(
        academic_year = %year.id,
        month_count,
        total_due = %total_due,
        payments = in_year.len(),
        "built monthly fee breakdown"
    );

    Ok(MonthlyBreakdown {
        academic_year_id: Some(year.id.clone()),
        fee_structure_id: structure.map(|s| s.id.clone()),
        total_due,
        monthly_due,
        months,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn year(start: NaiveDate, end: NaiveDate) -> AcademicYear {
        AcademicYear::new(
            "ay1".to_string(),
            "t1".to_string(),
            "2024-25".to_string(),
            start,
            end,
            true,
        )
    }

    fn structure(amount: i64) -> FeeStructure {
        FeeStructure::new(
            "fee1".to_string(),
            "t1".to_string(),
            "class1".to_string(),
            "ay1".to_string(),
            BigDecimal::from(amount),
        )
    }

    fn payment(id: &str, amount: i64, d: NaiveDate) -> FeePayment {
        FeePayment::new(
            id.to_string(),
            "t1".to_string(),
            "s1".to_string(),
            "fee1".to_string(),
            BigDecimal::from(amount),
            d,
        )
    }

    #[test]
    fn test_month_span() {
        assert_eq!(month_span(date(2024, 4, 1), date(2025, 3, 31)), 12);
        assert_eq!(month_span(date(2024, 4, 15), date(2024, 4, 20)), 1);
        assert_eq!(month_span(date(2024, 11, 30), date(2025, 1, 1)), 3);
        assert_eq!(month_span(date(2025, 1, 1), date(2024, 1, 1)), 0);
    }

    #[test]
    fn test_month_range_handles_february_and_year_rollover() {
        let feb = month_range(date(2023, 12, 15), 2).unwrap();
        assert_eq!(feb.start, date(2024, 2, 1));
        assert_eq!(feb.end, date(2024, 2, 29));

        let dec = month_range(date(2024, 4, 1), 8).unwrap();
        assert_eq!(dec.start, date(2024, 12, 1));
        assert_eq!(dec.end, date(2024, 12, 31));
    }

    #[test]
    fn test_even_split_of_twelve_thousand() {
        let breakdown = build_monthly_breakdown(
            &year(date(2024, 4, 1), date(2025, 3, 31)),
            Some(&structure(12000)),
            &[payment("p1", 3000, date(2024, 6, 10))],
            &FeeSettings::default(),
        )
        .unwrap();

        assert_eq!(breakdown.months.len(), 12);
        assert_eq!(breakdown.monthly_due, BigDecimal::from(1000));
        for month in &breakdown.months {
            assert_eq!(month.total_due, BigDecimal::from(1000));
            if month.index == 2 {
                assert_eq!(month.month_name, "June");
                assert_eq!(month.total_paid, BigDecimal::from(3000));
                assert_eq!(month.balance, BigDecimal::from(-2000));
                assert_eq!(month.payments.len(), 1);
            } else {
                assert_eq!(month.total_paid, BigDecimal::from(0));
                assert_eq!(month.balance, BigDecimal::from(1000));
            }
        }
    }

    #[test]
    fn test_months_are_chronological() {
        let breakdown = build_monthly_breakdown(
            &year(date(2024, 4, 1), date(2025, 3, 31)),
            Some(&structure(12000)),
            &[],
            &FeeSettings::default(),
        )
        .unwrap();

        let labels: Vec<(i32, u32)> = breakdown.months.iter().map(|m| (m.year, m.month)).collect();
        assert_eq!(labels.first(), Some(&(2024, 4)));
        assert_eq!(labels.last(), Some(&(2025, 3)));
        assert!(labels.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_missing_structure_yields_zero_due_months() {
        let breakdown = build_monthly_breakdown(
            &year(date(2024, 4, 1), date(2025, 3, 31)),
            None,
            &[payment("p1", 500, date(2024, 7, 1))],
            &FeeSettings::default(),
        )
        .unwrap();

        assert_eq!(breakdown.fee_structure_id, None);
        assert!(breakdown
            .months
            .iter()
            .all(|m| m.total_due == BigDecimal::from(0)));
        assert_eq!(breakdown.total_paid(), BigDecimal::from(500));
    }

    #[test]
    fn test_even_split_drift_stays_within_tolerance() {
        let breakdown = build_monthly_breakdown(
            &year(date(2024, 1, 1), date(2024, 3, 31)),
            Some(&structure(10000)),
            &[],
            &FeeSettings::default(),
        )
        .unwrap();

        let drift = (breakdown.total_apportioned() - BigDecimal::from(10000)).abs();
        assert!(drift < "0.01".parse::<BigDecimal>().unwrap());
    }

    #[test]
    fn test_last_month_absorbs_remainder_exactly() {
        let settings = FeeSettings {
            apportionment: ApportionmentPolicy::LastMonthAbsorbs,
            currency_scale: 2,
        };
        let breakdown = build_monthly_breakdown(
            &year(date(2024, 1, 1), date(2024, 3, 31)),
            Some(&structure(10000)),
            &[],
            &settings,
        )
        .unwrap();

        let dues: Vec<BigDecimal> = breakdown.months.iter().map(|m| m.total_due.clone()).collect();
        assert_eq!(dues[0], "3333.33".parse::<BigDecimal>().unwrap());
        assert_eq!(dues[1], "3333.33".parse::<BigDecimal>().unwrap());
        assert_eq!(dues[2], "3333.34".parse::<BigDecimal>().unwrap());
        assert_eq!(breakdown.total_apportioned(), BigDecimal::from(10000));
    }

    #[test]
    fn test_last_month_share_never_negative_for_small_totals() {
        let whole_units = FeeSettings {
            apportionment: ApportionmentPolicy::LastMonthAbsorbs,
            currency_scale: 0,
        };
        let shares = apportion(&BigDecimal::from(20), 12, &whole_units);
        assert_eq!(shares.len(), 12);
        assert!(shares[..11].iter().all(|s| *s == BigDecimal::from(1)));
        assert_eq!(shares[11], BigDecimal::from(9));

        let cents = FeeSettings {
            apportionment: ApportionmentPolicy::LastMonthAbsorbs,
            currency_scale: 2,
        };
        let total = "0.20".parse::<BigDecimal>().unwrap();
        let shares = apportion(&total, 12, &cents);
        assert!(shares.iter().all(|s| *s >= BigDecimal::from(0)));
        assert_eq!(shares[11], "0.09".parse::<BigDecimal>().unwrap());
        assert_eq!(shares.iter().sum::<BigDecimal>(), total);
    }

    #[test]
    fn test_each_in_year_payment_lands_in_one_month() {
        let payments = vec![
            payment("edge_start", 100, date(2024, 4, 1)),
            payment("month_end", 200, date(2024, 4, 30)),
            payment("next_month", 300, date(2024, 5, 1)),
            payment("edge_end", 400, date(2025, 3, 31)),
            payment("outside", 999, date(2025, 4, 1)),
        ];
        let breakdown = build_monthly_breakdown(
            &year(date(2024, 4, 1), date(2025, 3, 31)),
            Some(&structure(12000)),
            &payments,
            &FeeSettings::default(),
        )
        .unwrap();

        let attributed: usize = breakdown.months.iter().map(|m| m.payments.len()).sum();
        assert_eq!(attributed, 4);
        assert_eq!(breakdown.total_paid(), BigDecimal::from(1000));
        assert_eq!(breakdown.months[0].total_paid, BigDecimal::from(300));
        assert_eq!(breakdown.months[1].total_paid, BigDecimal::from(300));
        assert_eq!(breakdown.months[11].total_paid, BigDecimal::from(400));
    }

    #[test]
    fn test_inverted_year_produces_no_months() {
        let breakdown = build_monthly_breakdown(
            &year(date(2025, 3, 31), date(2024, 4, 1)),
            Some(&structure(12000)),
            &[],
            &FeeSettings::default(),
        )
        .unwrap();
        assert!(breakdown.months.is_empty());
        assert_eq!(breakdown.monthly_due, BigDecimal::from(0));
    }
}
