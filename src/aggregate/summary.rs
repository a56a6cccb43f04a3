use serde::{Deserialize, Serialize};

use crate::decimal::Money;

use super::PeriodBucket;

/// grand totals folded over a bucket sequence for headline display
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct PipelineSummary {
    pub total_expected: Money,
    pub total_paid: Money,
    pub total_pending: Money,
    pub total_due: Money,
    pub total_pending_count: u32,
}

impl PipelineSummary {
    pub fn from_buckets(buckets: &[PeriodBucket]) -> Self {
        buckets.iter().fold(Self::default(), |mut acc, bucket| {
            acc.total_expected += bucket.expected_amount;
            acc.total_paid += bucket.paid_amount;
            acc.total_pending += bucket.pending_amount;
            acc.total_due += bucket.due_amount;
            acc.total_pending_count += bucket.pending_count;
            acc
        })
    }

    /// outstanding amount still expected but not yet received
    pub fn outstanding(&self) -> Money {
        (self.total_expected - self.total_paid).max(Money::ZERO)
    }
}
