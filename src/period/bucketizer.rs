use crate::errors::{PipelineError, Result};
use crate::types::PeriodType;

use super::{period_range, DateRange};

/// partition a range into ordered, contiguous, non-overlapping period
/// buckets whose union exactly covers the range
///
/// the cursor walks forward one period unit at a time; the first and last
/// buckets are clipped to the requested bounds
pub fn bucketize(period: PeriodType, range: DateRange) -> Result<Vec<DateRange>> {
    if range.end < range.start {
        return Err(PipelineError::InvalidRange {
            start: range.start,
            end: range.end,
        });
    }

    let mut buckets = Vec::new();
    let mut cursor = range.start;

    // cursor strictly increases each turn, so the walk always terminates
    while cursor <= range.end {
        let unit = period_range(period, cursor)?;
        buckets.push(DateRange {
            start: cursor,
            end: unit.end.min(range.end),
        });

        cursor = match unit.end.succ_opt() {
            Some(next) => next,
            None => break,
        };
    }

    Ok(buckets)
}
