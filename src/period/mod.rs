pub mod bucketizer;

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::errors::{PipelineError, Result};
use crate::types::PeriodType;

pub use bucketizer::bucketize;

/// inclusive calendar date range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// create a range, rejecting end before start
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if end < start {
            return Err(PipelineError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// whether the range contains the date
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// number of days covered, inclusive
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

/// calendar boundaries of the period unit containing the reference date
pub fn period_range(period: PeriodType, reference: NaiveDate) -> Result<DateRange> {
    let range = match period {
        PeriodType::Weekly => {
            // ISO week, monday through sunday
            let offset = reference.weekday().num_days_from_monday() as i64;
            let start = checked_date(reference.checked_sub_signed(Duration::days(offset)))?;
            let end = checked_date(start.checked_add_signed(Duration::days(6)))?;
            DateRange { start, end }
        }
        PeriodType::Monthly => month_range(reference.year(), reference.month())?,
        PeriodType::Quarterly => {
            // quarter-aligned 3-month block via floor division
            let quarter_start_month = ((reference.month() - 1) / 3) * 3 + 1;
            let start = checked_date(NaiveDate::from_ymd_opt(
                reference.year(),
                quarter_start_month,
                1,
            ))?;
            let end_month = month_range(reference.year(), quarter_start_month + 2)?;
            DateRange {
                start,
                end: end_month.end,
            }
        }
        PeriodType::Annually => {
            let start = checked_date(NaiveDate::from_ymd_opt(reference.year(), 1, 1))?;
            let end = checked_date(NaiveDate::from_ymd_opt(reference.year(), 12, 31))?;
            DateRange { start, end }
        }
    };

    Ok(range)
}

/// first day of the period unit following the one containing the reference
pub fn advance(period: PeriodType, reference: NaiveDate) -> Result<NaiveDate> {
    let current = period_range(period, reference)?;
    checked_date(current.end.succ_opt())
}

fn month_range(year: i32, month: u32) -> Result<DateRange> {
    let start = checked_date(NaiveDate::from_ymd_opt(year, month, 1))?;
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    let next_start = checked_date(NaiveDate::from_ymd_opt(next_year, next_month, 1))?;
    let end = checked_date(next_start.pred_opt())?;
    Ok(DateRange { start, end })
}

fn checked_date(date: Option<NaiveDate>) -> Result<NaiveDate> {
    date.ok_or_else(|| PipelineError::InvalidArgument {
        message: "date arithmetic out of range".to_string(),
    })
}
