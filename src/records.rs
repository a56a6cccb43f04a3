use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::decimal::{Money, Rate};
use crate::errors::{PipelineError, Result};
use crate::types::{AmountType, PaymentStage, RecordId, TenantId};

/// provenance of a payment record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RecordOrigin {
    /// installment scheduled under a signed contract
    Contract {
        contract_id: Uuid,
        contract_value: Money,
    },
    /// forecast payment attached to an open deal
    Deal {
        deal_id: Uuid,
        deal_value: Money,
        win_probability: Rate,
        expected_close_date: Option<NaiveDate>,
    },
}

/// a validated contract- or deal-installment row, immutable within one
/// aggregation pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub id: RecordId,
    pub tenant_id: TenantId,
    pub assignee_id: Option<Uuid>,

    pub due_date: Option<NaiveDate>,
    pub amount_type: AmountType,
    pub amount_value: Decimal,
    pub calculated_amount: Option<Money>,
    pub received_amount: Option<Money>,
    pub stage: PaymentStage,

    pub origin: RecordOrigin,
}

impl PaymentRecord {
    /// the date that places this record in a bucket: the installment due
    /// date, or the parent deal's expected close date when no term exists
    pub fn schedule_date(&self) -> Option<NaiveDate> {
        self.due_date.or(match &self.origin {
            RecordOrigin::Deal {
                expected_close_date, ..
            } => *expected_close_date,
            RecordOrigin::Contract { .. } => None,
        })
    }

    /// value of the parent deal or contract
    pub fn parent_value(&self) -> Money {
        match &self.origin {
            RecordOrigin::Contract { contract_value, .. } => *contract_value,
            RecordOrigin::Deal { deal_value, .. } => *deal_value,
        }
    }

    /// win probability carried by the parent deal's pipeline stage
    pub fn win_probability(&self) -> Option<Rate> {
        match &self.origin {
            RecordOrigin::Deal {
                win_probability, ..
            } => Some(*win_probability),
            RecordOrigin::Contract { .. } => None,
        }
    }
}

/// raw row shape returned by the backend query layer, all fields optional
/// until validated at the fetch boundary
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawPaymentRow {
    pub id: Option<Uuid>,
    pub tenant_id: Option<Uuid>,
    pub assignee_id: Option<Uuid>,
    pub due_date: Option<NaiveDate>,
    pub amount_type: Option<String>,
    pub amount_value: Option<Decimal>,
    pub calculated_amount: Option<Decimal>,
    pub received_amount: Option<Decimal>,
    pub stage: Option<String>,
    pub contract_id: Option<Uuid>,
    pub contract_value: Option<Decimal>,
    pub deal_id: Option<Uuid>,
    pub deal_value: Option<Decimal>,
    pub win_probability: Option<Decimal>,
    pub expected_close_date: Option<NaiveDate>,
}

impl TryFrom<RawPaymentRow> for PaymentRecord {
    type Error = PipelineError;

    fn try_from(row: RawPaymentRow) -> Result<PaymentRecord> {
        let record_id = row.id.unwrap_or(Uuid::nil());

        let fail = |message: String| PipelineError::Validation { record_id, message };

        if row.id.is_none() {
            return Err(fail("missing record id".to_string()));
        }

        let tenant_id = row
            .tenant_id
            .ok_or_else(|| fail("missing tenant id".to_string()))?;

        let amount_type = match row.amount_type.as_deref() {
            Some("fixed") | None => AmountType::Fixed,
            Some("percentage") => AmountType::Percentage,
            Some(other) => return Err(fail(format!("unknown amount type: {other}"))),
        };

        let amount_value = row
            .amount_value
            .ok_or_else(|| fail("missing amount value".to_string()))?;
        if amount_value.is_sign_negative() {
            return Err(fail(format!("negative amount value: {amount_value}")));
        }
        if amount_type == AmountType::Percentage && amount_value > Decimal::from(100) {
            return Err(fail(format!("percentage above 100: {amount_value}")));
        }

        let received_amount = match row.received_amount {
            Some(d) if d.is_sign_negative() => {
                return Err(fail(format!("negative received amount: {d}")));
            }
            Some(d) => Some(Money::from_decimal(d)),
            None => None,
        };

        let stage = match row.stage.as_deref().map(str::to_ascii_lowercase).as_deref() {
            Some("scheduled") | None => PaymentStage::Scheduled,
            Some("due") => PaymentStage::Due,
            Some("paid") => PaymentStage::Paid,
            Some("cancelled") => PaymentStage::Cancelled,
            Some(other) => return Err(fail(format!("unknown stage: {other}"))),
        };

        let origin = match (row.contract_id, row.deal_id) {
            (Some(contract_id), _) => {
                let contract_value = row
                    .contract_value
                    .ok_or_else(|| fail("contract row missing contract value".to_string()))?;
                RecordOrigin::Contract {
                    contract_id,
                    contract_value: Money::from_decimal(contract_value),
                }
            }
            (None, Some(deal_id)) => {
                let deal_value = row
                    .deal_value
                    .ok_or_else(|| fail("deal row missing deal value".to_string()))?;
                let win_probability = row
                    .win_probability
                    .ok_or_else(|| fail("deal row missing win probability".to_string()))?;
                if win_probability.is_sign_negative() || win_probability > Decimal::from(100) {
                    return Err(fail(format!(
                        "win probability out of range: {win_probability}"
                    )));
                }
                RecordOrigin::Deal {
                    deal_id,
                    deal_value: Money::from_decimal(deal_value),
                    win_probability: Rate::from_decimal(win_probability / Decimal::from(100)),
                    expected_close_date: row.expected_close_date,
                }
            }
            (None, None) => {
                return Err(fail("record belongs to neither contract nor deal".to_string()));
            }
        };

        let record = PaymentRecord {
            id: record_id,
            tenant_id,
            assignee_id: row.assignee_id,
            due_date: row.due_date,
            amount_type,
            amount_value,
            calculated_amount: row.calculated_amount.map(Money::from_decimal),
            received_amount,
            stage,
            origin,
        };

        // a record that cannot be placed in any bucket is unusable
        if record.schedule_date().is_none() {
            return Err(fail(
                "no due date and no expected close date".to_string(),
            ));
        }

        Ok(record)
    }
}
