use chrono::{Datelike, NaiveDate};
use hourglass_rs::SafeTimeProvider;
use serde::{Deserialize, Serialize};

use crate::errors::{PipelineError, Result};
use crate::period::{advance, period_range, DateRange};
use crate::types::{OwnerScope, PeriodType, TenantId};

/// explicit per-call query context: tenant, period granularity, anchor
/// month, and assignee scoping
///
/// replaces the ambient tenant/auth provider of the original dashboards;
/// every fetch and aggregation call receives one of these
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FilterContext {
    pub tenant_id: TenantId,
    pub period_type: PeriodType,
    pub anchor_month: u32,
    pub anchor_year: i32,
    pub owner_scope: OwnerScope,
}

impl FilterContext {
    /// create a context anchored at a specific month
    pub fn new(
        tenant_id: TenantId,
        period_type: PeriodType,
        anchor_month: u32,
        anchor_year: i32,
        owner_scope: OwnerScope,
    ) -> Result<Self> {
        if !(1..=12).contains(&anchor_month) {
            return Err(PipelineError::InvalidArgument {
                message: format!("anchor month out of range: {anchor_month}"),
            });
        }

        Ok(Self {
            tenant_id,
            period_type,
            anchor_month,
            anchor_year,
            owner_scope,
        })
    }

    /// create a context anchored at the time provider's current month
    pub fn current(
        tenant_id: TenantId,
        period_type: PeriodType,
        owner_scope: OwnerScope,
        time_provider: &SafeTimeProvider,
    ) -> Self {
        let today = time_provider.now().date_naive();
        Self {
            tenant_id,
            period_type,
            anchor_month: today.month(),
            anchor_year: today.year(),
            owner_scope,
        }
    }

    /// first day of the anchor month
    pub fn anchor_date(&self) -> Result<NaiveDate> {
        NaiveDate::from_ymd_opt(self.anchor_year, self.anchor_month, 1).ok_or_else(|| {
            PipelineError::InvalidArgument {
                message: format!(
                    "invalid anchor: {}-{}",
                    self.anchor_year, self.anchor_month
                ),
            }
        })
    }

    /// overall reporting range: the anchor period's start through the end
    /// of the period `periods - 1` units later
    pub fn horizon_range(&self, periods: u32) -> Result<DateRange> {
        if periods == 0 {
            return Err(PipelineError::InvalidArgument {
                message: "horizon must cover at least one period".to_string(),
            });
        }

        let anchor = self.anchor_date()?;
        let first = period_range(self.period_type, anchor)?;

        let mut cursor = anchor;
        for _ in 1..periods {
            cursor = advance(self.period_type, cursor)?;
        }
        let last = period_range(self.period_type, cursor)?;

        DateRange::new(first.start, last.end)
    }
}
