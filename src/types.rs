use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::PipelineError;

/// unique identifier for a tenant organization
pub type TenantId = Uuid;

/// unique identifier for a payment record
pub type RecordId = Uuid;

/// unique identifier for a dashboard widget instance
pub type WidgetId = Uuid;

/// reporting period granularity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PeriodType {
    Weekly,
    Monthly,
    Quarterly,
    Annually,
}

impl FromStr for PeriodType {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "weekly" => Ok(PeriodType::Weekly),
            "monthly" => Ok(PeriodType::Monthly),
            "quarterly" => Ok(PeriodType::Quarterly),
            "annually" => Ok(PeriodType::Annually),
            other => Err(PipelineError::InvalidArgument {
                message: format!("unknown period type: {other}"),
            }),
        }
    }
}

impl fmt::Display for PeriodType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PeriodType::Weekly => "weekly",
            PeriodType::Monthly => "monthly",
            PeriodType::Quarterly => "quarterly",
            PeriodType::Annually => "annually",
        };
        write!(f, "{name}")
    }
}

/// installment stage within the payment pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentStage {
    /// scheduled but not yet due
    Scheduled,
    /// explicitly marked due for collection
    Due,
    /// payment received in full
    Paid,
    /// installment cancelled with its parent
    Cancelled,
}

impl PaymentStage {
    /// terminal stages never count toward pending sums
    pub fn is_terminal(&self) -> bool {
        matches!(self, PaymentStage::Paid | PaymentStage::Cancelled)
    }
}

/// how an installment's amount_value resolves to money
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AmountType {
    /// amount_value is the final amount
    Fixed,
    /// amount_value is a percentage of the parent deal/contract value
    Percentage,
}

/// assignee scoping for a pipeline query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OwnerScope {
    /// every record visible to the tenant
    All,
    /// records assigned to one user
    User(Uuid),
    /// records assigned to any member of a department
    Department(Uuid),
    /// records assigned to any member of a branch
    Branch(Uuid),
}
