pub mod summary;

use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};
use crate::errors::Result;
use crate::period::{bucketize, DateRange};
use crate::records::PaymentRecord;
use crate::types::{AmountType, PaymentStage, PeriodType};

pub use summary::PipelineSummary;

/// one period bucket populated with classified sums, created fresh per
/// aggregation run and never persisted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodBucket {
    pub index: usize,
    pub range: DateRange,
    pub expected_amount: Money,
    pub paid_amount: Money,
    pub pending_amount: Money,
    pub due_amount: Money,
    pub pending_count: u32,
    pub records: Vec<PaymentRecord>,
}

impl PeriodBucket {
    fn new(index: usize, range: DateRange) -> Self {
        Self {
            index,
            range,
            expected_amount: Money::ZERO,
            paid_amount: Money::ZERO,
            pending_amount: Money::ZERO,
            due_amount: Money::ZERO,
            pending_count: 0,
            records: Vec::new(),
        }
    }

    fn absorb(&mut self, record: &PaymentRecord) {
        let amount = contributory_amount(record);
        self.expected_amount += amount;

        // paid reports cash actually recorded, not the forecast amount
        if let Some(received) = record.received_amount {
            self.paid_amount += received;
        }

        if is_pending(record) {
            self.pending_amount += amount;
            self.pending_count += 1;
        }

        if record.stage == PaymentStage::Due {
            self.due_amount += amount;
        }

        self.records.push(record.clone());
    }
}

/// the amount a record contributes to its bucket: a precomputed
/// calculated_amount wins, else the amount_value resolved against the
/// parent deal/contract value
pub fn contributory_amount(record: &PaymentRecord) -> Money {
    if let Some(calculated) = record.calculated_amount {
        return calculated;
    }

    match record.amount_type {
        AmountType::Percentage => record.parent_value().percentage(record.amount_value),
        AmountType::Fixed => Money::from_decimal(record.amount_value),
    }
}

/// contract records always qualify; deal records only above the stage
/// win-probability threshold
pub fn qualifies(record: &PaymentRecord, threshold: Rate) -> bool {
    match record.win_probability() {
        Some(probability) => probability >= threshold,
        None => true,
    }
}

/// pending means no terminal stage and no recorded payment
fn is_pending(record: &PaymentRecord) -> bool {
    !record.stage.is_terminal() && record.received_amount.is_none()
}

/// pure aggregation pass: partition qualifying records into period buckets
/// by schedule date and populate the classified sums
///
/// each record lands in at most one bucket; records dated outside the
/// range are excluded, matching the fetch predicate
pub fn aggregate(
    records: &[PaymentRecord],
    period: PeriodType,
    range: DateRange,
    threshold: Rate,
) -> Result<Vec<PeriodBucket>> {
    let ranges = bucketize(period, range)?;
    let mut buckets: Vec<PeriodBucket> = ranges
        .into_iter()
        .enumerate()
        .map(|(index, range)| PeriodBucket::new(index, range))
        .collect();

    for record in records {
        if !qualifies(record, threshold) {
            continue;
        }

        let Some(date) = record.schedule_date() else {
            continue;
        };

        if let Some(bucket) = buckets.iter_mut().find(|b| b.range.contains(date)) {
            bucket.absorb(record);
        }
    }

    Ok(buckets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    use crate::records::RecordOrigin;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn contract_record(due: NaiveDate, amount: Decimal, stage: PaymentStage) -> PaymentRecord {
        PaymentRecord {
            id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            assignee_id: None,
            due_date: Some(due),
            amount_type: AmountType::Fixed,
            amount_value: amount,
            calculated_amount: None,
            received_amount: None,
            stage,
            origin: RecordOrigin::Contract {
                contract_id: Uuid::new_v4(),
                contract_value: Money::from_major(10_000),
            },
        }
    }

    fn deal_record(close: NaiveDate, percentage: Decimal, probability: u32) -> PaymentRecord {
        PaymentRecord {
            id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            assignee_id: None,
            due_date: None,
            amount_type: AmountType::Percentage,
            amount_value: percentage,
            calculated_amount: None,
            received_amount: None,
            stage: PaymentStage::Scheduled,
            origin: RecordOrigin::Deal {
                deal_id: Uuid::new_v4(),
                deal_value: Money::from_major(1_000),
                win_probability: Rate::from_percentage(probability),
                expected_close_date: Some(close),
            },
        }
    }

    fn threshold() -> Rate {
        Rate::from_percentage(90)
    }

    #[test]
    fn test_monthly_scenario_january_2024() {
        // jan 5 and jan 20 land in the january bucket, feb 2 in february
        let records = vec![
            contract_record(d(2024, 1, 5), dec!(100), PaymentStage::Scheduled),
            contract_record(d(2024, 1, 20), dec!(200), PaymentStage::Scheduled),
            contract_record(d(2024, 2, 2), dec!(300), PaymentStage::Scheduled),
        ];
        let range = DateRange::new(d(2024, 1, 1), d(2024, 2, 29)).unwrap();

        let buckets =
            aggregate(&records, PeriodType::Monthly, range, threshold()).unwrap();

        assert_eq!(buckets.len(), 2);
        assert_eq!(buckets[0].expected_amount, Money::from_major(300));
        assert_eq!(buckets[0].records.len(), 2);
        assert_eq!(buckets[1].expected_amount, Money::from_major(300));
        assert_eq!(buckets[1].records.len(), 1);
    }

    #[test]
    fn test_percentage_amount_resolves_against_deal_value() {
        // 50% of a 1000 deal contributes 500
        let records = vec![deal_record(d(2024, 1, 10), dec!(50), 90)];
        let range = DateRange::new(d(2024, 1, 1), d(2024, 1, 31)).unwrap();

        let buckets =
            aggregate(&records, PeriodType::Monthly, range, threshold()).unwrap();

        assert_eq!(buckets[0].expected_amount, Money::from_major(500));
    }

    #[test]
    fn test_calculated_amount_wins_over_resolution() {
        let mut record = deal_record(d(2024, 1, 10), dec!(50), 90);
        record.calculated_amount = Some(Money::from_major(123));

        assert_eq!(contributory_amount(&record), Money::from_major(123));
    }

    #[test]
    fn test_deals_below_threshold_excluded() {
        let records = vec![
            deal_record(d(2024, 1, 10), dec!(50), 90),
            deal_record(d(2024, 1, 12), dec!(50), 60),
        ];
        let range = DateRange::new(d(2024, 1, 1), d(2024, 1, 31)).unwrap();

        let buckets =
            aggregate(&records, PeriodType::Monthly, range, threshold()).unwrap();

        assert_eq!(buckets[0].records.len(), 1);
        assert_eq!(buckets[0].expected_amount, Money::from_major(500));
    }

    #[test]
    fn test_classification_paid_pending_due() {
        let mut paid = contract_record(d(2024, 1, 5), dec!(100), PaymentStage::Paid);
        paid.received_amount = Some(Money::from_major(95));
        let due = contract_record(d(2024, 1, 10), dec!(200), PaymentStage::Due);
        let scheduled = contract_record(d(2024, 1, 15), dec!(300), PaymentStage::Scheduled);
        let cancelled = contract_record(d(2024, 1, 20), dec!(400), PaymentStage::Cancelled);

        let range = DateRange::new(d(2024, 1, 1), d(2024, 1, 31)).unwrap();
        let buckets = aggregate(
            &[paid, due, scheduled, cancelled],
            PeriodType::Monthly,
            range,
            threshold(),
        )
        .unwrap();

        let bucket = &buckets[0];
        assert_eq!(bucket.expected_amount, Money::from_major(1_000));
        // paid sums the recorded received amount
        assert_eq!(bucket.paid_amount, Money::from_major(95));
        // pending excludes the paid and cancelled records
        assert_eq!(bucket.pending_amount, Money::from_major(500));
        assert_eq!(bucket.pending_count, 2);
        // due sums only the explicit due stage
        assert_eq!(bucket.due_amount, Money::from_major(200));
    }

    #[test]
    fn test_partition_invariant_no_record_double_counted() {
        let records: Vec<PaymentRecord> = (1..=12)
            .map(|m| contract_record(d(2024, m, 15), dec!(100), PaymentStage::Scheduled))
            .collect();
        let range = DateRange::new(d(2024, 1, 1), d(2024, 12, 31)).unwrap();

        let buckets =
            aggregate(&records, PeriodType::Quarterly, range, threshold()).unwrap();

        let bucketed: usize = buckets.iter().map(|b| b.records.len()).sum();
        let total: Money = buckets
            .iter()
            .fold(Money::ZERO, |acc, b| acc + b.expected_amount);

        assert_eq!(bucketed, records.len());
        assert_eq!(total, Money::from_major(1_200));
    }

    #[test]
    fn test_aggregation_is_idempotent() {
        let records = vec![
            contract_record(d(2024, 1, 5), dec!(100), PaymentStage::Scheduled),
            deal_record(d(2024, 2, 10), dec!(25), 95),
        ];
        let range = DateRange::new(d(2024, 1, 1), d(2024, 3, 31)).unwrap();

        let first =
            aggregate(&records, PeriodType::Monthly, range, threshold()).unwrap();
        let second =
            aggregate(&records, PeriodType::Monthly, range, threshold()).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_records_outside_range_excluded() {
        let records = vec![
            contract_record(d(2023, 12, 31), dec!(100), PaymentStage::Scheduled),
            contract_record(d(2024, 1, 5), dec!(200), PaymentStage::Scheduled),
        ];
        let range = DateRange::new(d(2024, 1, 1), d(2024, 1, 31)).unwrap();

        let buckets =
            aggregate(&records, PeriodType::Monthly, range, threshold()).unwrap();

        assert_eq!(buckets[0].records.len(), 1);
        assert_eq!(buckets[0].expected_amount, Money::from_major(200));
    }
}
