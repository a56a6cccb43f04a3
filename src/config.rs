use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};
use crate::errors::{PipelineError, Result};
use crate::types::PeriodType;

/// engine configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// number of consecutive period buckets a report covers
    pub horizon_periods: u32,
    /// minimum stage win probability for a deal payment to enter the
    /// forecast; business constant, not derived
    pub win_probability_threshold: Rate,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            horizon_periods: 6,
            win_probability_threshold: Rate::from_percentage(90),
        }
    }
}

impl PipelineConfig {
    pub fn new(horizon_periods: u32, win_probability_threshold: Rate) -> Result<Self> {
        let config = Self {
            horizon_periods,
            win_probability_threshold,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.horizon_periods == 0 {
            return Err(PipelineError::InvalidConfiguration {
                message: "horizon must cover at least one period".to_string(),
            });
        }

        if self.win_probability_threshold < Rate::ZERO
            || self.win_probability_threshold > Rate::ONE
        {
            return Err(PipelineError::InvalidConfiguration {
                message: format!(
                    "win probability threshold out of range: {}",
                    self.win_probability_threshold
                ),
            });
        }

        Ok(())
    }
}

/// sales target evaluated by the target-progress widget
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TargetConfig {
    pub amount: Money,
    pub period_type: PeriodType,
}

impl TargetConfig {
    pub fn new(amount: Money, period_type: PeriodType) -> Result<Self> {
        let config = Self {
            amount,
            period_type,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.amount.is_positive() || self.amount.is_zero() {
            return Err(PipelineError::InvalidConfiguration {
                message: format!("target amount must be positive: {}", self.amount),
            });
        }
        Ok(())
    }
}
