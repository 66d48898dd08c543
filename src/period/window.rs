use chrono::{DateTime, Datelike, Days, Months, NaiveDate, Utc};
use serde::Serialize;

use crate::error::{AppError, AppResult};

use super::kind::{PeriodKind, quarter_of};

/// The completed period immediately preceding the reference instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportingPeriod {
    pub kind: PeriodKind,
    #[serde(skip)]
    pub reference: DateTime<Utc>,
    pub window_start: NaiveDate,
    /// Exclusive: the first day of the period containing `reference`.
    pub window_end: NaiveDate,
    pub directory_label: String,
    pub display_label: String,
}

#[tracing::instrument(
    name = "period compute",
    fields(
        period.kind = %kind,
        period.directory_label,
        period.display_label,
    )
)]
pub fn compute_period(now: DateTime<Utc>, kind: PeriodKind) -> AppResult<ReportingPeriod> {
    let today = now.date_naive();
    let out_of_range = || AppError::Configuration(format!("{today} is outside the supported date range"));

    let window_start = match kind {
        PeriodKind::Weekly => {
            let this_monday = today
                .checked_sub_days(Days::new(u64::from(today.weekday().num_days_from_monday())))
                .ok_or_else(out_of_range)?;
            this_monday
                .checked_sub_days(Days::new(7))
                .ok_or_else(out_of_range)?
        }
        PeriodKind::Monthly => {
            let shifted = mid_month(today)
                .and_then(|d| d.checked_sub_months(Months::new(1)))
                .ok_or_else(out_of_range)?;
            NaiveDate::from_ymd_opt(shifted.year(), shifted.month(), 1).ok_or_else(out_of_range)?
        }
        PeriodKind::Quarterly => {
            // The quarter is taken from the shifted date, so January..March
            // lands in the previous year's fourth quarter.
            let shifted = mid_month(today)
                .and_then(|d| d.checked_sub_months(Months::new(3)))
                .ok_or_else(out_of_range)?;
            let first_month = (quarter_of(shifted.month()) - 1) * 3 + 1;
            NaiveDate::from_ymd_opt(shifted.year(), first_month, 1).ok_or_else(out_of_range)?
        }
        PeriodKind::Yearly => {
            NaiveDate::from_ymd_opt(today.year() - 1, 1, 1).ok_or_else(out_of_range)?
        }
    };

    let window_end = match kind {
        PeriodKind::Weekly => window_start.checked_add_days(Days::new(7)),
        PeriodKind::Monthly => window_start.checked_add_months(Months::new(1)),
        PeriodKind::Quarterly => window_start.checked_add_months(Months::new(3)),
        PeriodKind::Yearly => window_start.checked_add_months(Months::new(12)),
    }
    .ok_or_else(out_of_range)?;

    let period = ReportingPeriod {
        kind,
        reference: now,
        window_start,
        window_end,
        directory_label: directory_label(kind, window_start),
        display_label: display_label(kind, window_start),
    };

    let span = tracing::Span::current();
    span.record("period.directory_label", period.directory_label.as_str());
    span.record("period.display_label", period.display_label.as_str());

    Ok(period)
}

/// Anchoring on the 15th keeps month arithmetic away from month-length
/// clamping (the 31st minus one month).
fn mid_month(date: NaiveDate) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(date.year(), date.month(), 15)
}

fn directory_label(kind: PeriodKind, start: NaiveDate) -> String {
    match kind {
        PeriodKind::Weekly => {
            let week = start.iso_week();
            format!("{}-W{:02}", week.year(), week.week())
        }
        PeriodKind::Monthly => start.format("%Y-%m").to_string(),
        PeriodKind::Quarterly => format!("{}-Q{}", start.year(), quarter_of(start.month())),
        PeriodKind::Yearly => start.format("%Y").to_string(),
    }
}

fn display_label(kind: PeriodKind, start: NaiveDate) -> String {
    match kind {
        PeriodKind::Weekly => start.format("Week %V, %G").to_string(),
        PeriodKind::Monthly => start.format("%B %Y").to_string(),
        PeriodKind::Quarterly => format!("Quarter {}, {}", quarter_of(start.month()), start.year()),
        PeriodKind::Yearly => start.format("%Y").to_string(),
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_monthly_scenario() {
        let period = compute_period(at(2025, 7, 10), PeriodKind::Monthly).unwrap();
        assert_eq!(period.directory_label, "2025-06");
        assert_eq!(period.display_label, "June 2025");
        assert_eq!(period.window_start, date(2025, 6, 1));
        assert_eq!(period.window_end, date(2025, 7, 1));
    }

    #[test]
    fn test_monthly_ignores_day_of_month() {
        let first = compute_period(at(2025, 7, 1), PeriodKind::Monthly).unwrap();
        let last = compute_period(at(2025, 7, 31), PeriodKind::Monthly).unwrap();
        assert_eq!(first.window_start, last.window_start);
        assert_eq!(first.window_start, date(2025, 6, 1));

        let march_end = compute_period(at(2024, 3, 31), PeriodKind::Monthly).unwrap();
        assert_eq!(march_end.window_start, date(2024, 2, 1));
        assert_eq!(march_end.window_end, date(2024, 3, 1));
    }

    #[test]
    fn test_monthly_window_start_is_first_of_previous_month_for_every_day() {
        let mut day = date(2023, 1, 1);
        while day <= date(2026, 12, 31) {
            let now = Utc.from_utc_datetime(&day.and_hms_opt(23, 59, 59).unwrap());
            let period = compute_period(now, PeriodKind::Monthly).unwrap();

            let (year, month) = if day.month() == 1 {
                (day.year() - 1, 12)
            } else {
                (day.year(), day.month() - 1)
            };
            assert_eq!(period.window_start, date(year, month, 1), "run on {day}");
            assert!(period.window_end <= day, "run on {day}");

            day = day.succ_opt().unwrap();
        }
    }

    #[test]
    fn test_monthly_january_rolls_back_a_year() {
        let period = compute_period(at(2025, 1, 31), PeriodKind::Monthly).unwrap();
        assert_eq!(period.directory_label, "2024-12");
        assert_eq!(period.display_label, "December 2024");
    }

    #[test]
    fn test_quarterly_scenario() {
        let period = compute_period(at(2025, 11, 2), PeriodKind::Quarterly).unwrap();
        assert_eq!(period.display_label, "Quarter 3, 2025");
        assert_eq!(period.directory_label, "2025-Q3");
        assert_eq!(period.window_start, date(2025, 7, 1));
        assert_eq!(period.window_end, date(2025, 10, 1));
    }

    #[test]
    fn test_quarterly_first_quarter_reports_previous_fourth_quarter() {
        for month in 1..=3 {
            for day in [1, 15, 28] {
                let period = compute_period(at(2025, month, day), PeriodKind::Quarterly).unwrap();
                assert_eq!(period.display_label, "Quarter 4, 2024");
                assert_eq!(period.window_start, date(2024, 10, 1));
                assert_eq!(period.window_end, date(2025, 1, 1));
            }
        }
    }

    #[test]
    fn test_quarterly_follows_the_shifted_month() {
        // Mid-quarter runs shift into the middle of the previous quarter.
        let may = compute_period(at(2025, 5, 31), PeriodKind::Quarterly).unwrap();
        assert_eq!(may.display_label, "Quarter 1, 2025");

        let july = compute_period(at(2025, 7, 1), PeriodKind::Quarterly).unwrap();
        assert_eq!(july.display_label, "Quarter 2, 2025");
    }

    #[test]
    fn test_weekly_uses_previous_iso_week() {
        // Wednesday of ISO week 34.
        let period = compute_period(at(2025, 8, 20), PeriodKind::Weekly).unwrap();
        assert_eq!(period.window_start, date(2025, 8, 11));
        assert_eq!(period.window_end, date(2025, 8, 18));
        assert_eq!(period.directory_label, "2025-W33");
        assert_eq!(period.display_label, "Week 33, 2025");
    }

    #[test]
    fn test_weekly_on_monday_reports_the_week_before() {
        let period = compute_period(at(2025, 8, 18), PeriodKind::Weekly).unwrap();
        assert_eq!(period.window_start, date(2025, 8, 11));
    }

    #[test]
    fn test_weekly_across_year_boundary() {
        let period = compute_period(at(2025, 1, 1), PeriodKind::Weekly).unwrap();
        assert_eq!(period.window_start, date(2024, 12, 23));
        assert_eq!(period.directory_label, "2024-W52");
        assert_eq!(period.display_label, "Week 52, 2024");

        // 2024-12-30 opens ISO week 1 of 2025.
        let period = compute_period(at(2025, 1, 8), PeriodKind::Weekly).unwrap();
        assert_eq!(period.window_start, date(2024, 12, 30));
        assert_eq!(period.directory_label, "2025-W01");
        assert_eq!(period.display_label, "Week 01, 2025");
    }

    #[test]
    fn test_yearly() {
        let period = compute_period(at(2025, 3, 5), PeriodKind::Yearly).unwrap();
        assert_eq!(period.directory_label, "2024");
        assert_eq!(period.display_label, "2024");
        assert_eq!(period.window_start, date(2024, 1, 1));
        assert_eq!(period.window_end, date(2025, 1, 1));
    }

    #[test]
    fn test_directory_labels_sort_across_consecutive_periods() {
        let cases = [
            (PeriodKind::Weekly, Days::new(7), 0),
            (PeriodKind::Monthly, Days::new(0), 1),
            (PeriodKind::Quarterly, Days::new(0), 3),
            (PeriodKind::Yearly, Days::new(0), 12),
        ];

        for (kind, day_step, month_step) in cases {
            let mut now = date(2019, 11, 20);
            let mut previous: Option<String> = None;
            for _ in 0..120 {
                let period =
                    compute_period(Utc.from_utc_datetime(&now.and_hms_opt(8, 0, 0).unwrap()), kind)
                        .unwrap();
                if let Some(prev) = &previous {
                    assert!(
                        *prev < period.directory_label,
                        "{kind}: {prev} should sort before {}",
                        period.directory_label
                    );
                }
                previous = Some(period.directory_label);

                now = if month_step > 0 {
                    now.checked_add_months(Months::new(month_step)).unwrap()
                } else {
                    now.checked_add_days(day_step).unwrap()
                };
            }
        }
    }

    #[test]
    fn test_window_end_is_start_of_current_period() {
        for kind in PeriodKind::ALL {
            let now = at(2025, 11, 2);
            let period = compute_period(now, kind).unwrap();
            assert!(period.window_start < period.window_end);
            assert!(period.window_end <= now.date_naive());

            let period_opens = Utc.from_utc_datetime(&period.window_end.and_hms_opt(0, 0, 0).unwrap());
            let rerun = compute_period(period_opens, kind).unwrap();
            assert_eq!(rerun.window_start, period.window_start, "{kind}");
            assert_eq!(rerun.window_end, period.window_end, "{kind}");
            assert_eq!(rerun.directory_label, period.directory_label, "{kind}");
        }
    }
}
