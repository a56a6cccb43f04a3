pub mod aggregate;
pub mod config;
pub mod context;
pub mod dashboard;
pub mod decimal;
pub mod engine;
pub mod errors;
pub mod events;
pub mod period;
pub mod records;
pub mod source;
pub mod types;

// re-export key types
pub use decimal::{Money, Rate};
pub use errors::{PipelineError, Result};
pub use events::{Event, EventStore};
pub use aggregate::{aggregate, contributory_amount, qualifies, PeriodBucket, PipelineSummary};
pub use config::{PipelineConfig, TargetConfig};
pub use context::FilterContext;
pub use dashboard::{DashboardLayout, GridPosition, WidgetConfig, WidgetFilters, WidgetKind};
pub use engine::{PipelineEngine, PipelineReport, TargetProgress};
pub use period::{advance, bucketize, period_range, DateRange};
pub use records::{PaymentRecord, RawPaymentRow, RecordOrigin};
pub use source::{MemorySource, RecordSource};
pub use types::{
    AmountType, OwnerScope, PaymentStage, PeriodType, RecordId, TenantId, WidgetId,
};

// re-export external dependencies that users will need
pub use chrono;
pub use hourglass_rs::{SafeTimeProvider, TimeSource};
pub use rust_decimal::Decimal;
pub use uuid::Uuid;
