use hourglass_rs::SafeTimeProvider;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::aggregate::{aggregate, PeriodBucket, PipelineSummary};
use crate::config::{PipelineConfig, TargetConfig};
use crate::context::FilterContext;
use crate::decimal::{Money, Rate};
use crate::errors::{PipelineError, Result};
use crate::events::{Event, EventStore};
use crate::period::{period_range, DateRange};
use crate::records::PaymentRecord;
use crate::source::RecordSource;

/// one full pipeline refresh: fetch, validate, bucketize, aggregate,
/// summarize
///
/// a report is a pure function of its fetched snapshot; nothing is cached
/// between runs and rapid re-runs simply recompute
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineReport {
    pub context: FilterContext,
    pub range: DateRange,
    pub buckets: Vec<PeriodBucket>,
    pub summary: PipelineSummary,
    /// rows dropped at the validation boundary during this refresh
    pub skipped_rows: u32,
}

/// target-progress widget result for the current period
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TargetProgress {
    pub target: Money,
    pub achieved: Money,
    pub expected: Money,
    pub percent_achieved: Rate,
}

/// aggregation engine behind the payment-pipeline dashboard and its
/// sibling widgets
pub struct PipelineEngine<S: RecordSource> {
    source: S,
    config: PipelineConfig,
}

impl<S: RecordSource> PipelineEngine<S> {
    pub fn new(source: S, config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { source, config })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// payment-pipeline dashboard: full bucket sequence over the context's
    /// anchor horizon
    pub fn report(
        &self,
        context: &FilterContext,
        events: &mut EventStore,
    ) -> Result<PipelineReport> {
        let range = context.horizon_range(self.config.horizon_periods)?;
        self.report_over(*context, range, events)
    }

    /// incoming-payments widget: the same report re-anchored at the time
    /// provider's current period
    pub fn incoming(
        &self,
        context: &FilterContext,
        periods: u32,
        time_provider: &SafeTimeProvider,
        events: &mut EventStore,
    ) -> Result<PipelineReport> {
        let anchored = FilterContext::current(
            context.tenant_id,
            context.period_type,
            context.owner_scope,
            time_provider,
        );
        let range = anchored.horizon_range(periods)?;
        self.report_over(anchored, range, events)
    }

    /// target-progress widget: paid and expected sums for the current
    /// target period compared against the configured target
    pub fn target_progress(
        &self,
        context: &FilterContext,
        target: &TargetConfig,
        time_provider: &SafeTimeProvider,
        events: &mut EventStore,
    ) -> Result<TargetProgress> {
        target.validate()?;

        let anchored = FilterContext::current(
            context.tenant_id,
            target.period_type,
            context.owner_scope,
            time_provider,
        );
        let today = time_provider.now().date_naive();
        let range = period_range(target.period_type, today)?;

        let report = self.report_over(anchored, range, events)?;
        let achieved = report.summary.total_paid;
        let expected = report.summary.total_expected;
        let percent_achieved = Rate::ratio_of(achieved, target.amount);

        events.emit(Event::TargetEvaluated {
            tenant_id: context.tenant_id,
            target: target.amount,
            achieved,
            percent_achieved,
        });

        Ok(TargetProgress {
            target: target.amount,
            achieved,
            expected,
            percent_achieved,
        })
    }

    fn report_over(
        &self,
        context: FilterContext,
        range: DateRange,
        events: &mut EventStore,
    ) -> Result<PipelineReport> {
        let rows = self.source.fetch_rows(&context, &range)?;
        let fetched = rows.len();

        // invalid rows are skipped and surfaced, never retried
        let mut records = Vec::with_capacity(fetched);
        let mut skipped_rows = 0;
        for row in rows {
            match PaymentRecord::try_from(row) {
                Ok(record) => records.push(record),
                Err(error) => {
                    skipped_rows += 1;
                    warn!(%error, "skipping invalid payment row");
                    if let PipelineError::Validation { record_id, message } = error {
                        events.emit(Event::RecordSkipped {
                            record_id,
                            reason: message,
                        });
                    }
                }
            }
        }

        events.emit(Event::RecordsFetched {
            tenant_id: context.tenant_id,
            fetched,
            valid: records.len(),
        });

        let buckets = aggregate(
            &records,
            context.period_type,
            range,
            self.config.win_probability_threshold,
        )?;
        let summary = PipelineSummary::from_buckets(&buckets);

        events.emit(Event::ReportComputed {
            tenant_id: context.tenant_id,
            bucket_count: buckets.len(),
            total_expected: summary.total_expected,
        });
        info!(
            tenant_id = %context.tenant_id,
            period = %context.period_type,
            buckets = buckets.len(),
            skipped = skipped_rows,
            "pipeline report computed"
        );

        Ok(PipelineReport {
            context,
            range,
            buckets,
            summary,
            skipped_rows,
        })
    }
}
