use std::collections::HashMap;

use tracing::debug;
use uuid::Uuid;

use crate::context::FilterContext;
use crate::errors::Result;
use crate::period::DateRange;
use crate::records::RawPaymentRow;
use crate::types::OwnerScope;

/// boundary to the external row-level-secured store
///
/// implementations translate store failures into `Backend` errors and
/// row-level-security rejections into `PermissionDenied`
pub trait RecordSource {
    fn fetch_rows(&self, context: &FilterContext, range: &DateRange) -> Result<Vec<RawPaymentRow>>;
}

/// in-memory source applying the tenant, owner-scope, and date-range
/// predicates; reference semantics for the store-side filters and the
/// source used by tests
#[derive(Debug, Default)]
pub struct MemorySource {
    rows: Vec<RawPaymentRow>,
    department_members: HashMap<Uuid, Vec<Uuid>>,
    branch_members: HashMap<Uuid, Vec<Uuid>>,
}

impl MemorySource {
    pub fn new(rows: Vec<RawPaymentRow>) -> Self {
        Self {
            rows,
            department_members: HashMap::new(),
            branch_members: HashMap::new(),
        }
    }

    /// register the users belonging to a department
    pub fn with_department(mut self, department_id: Uuid, members: Vec<Uuid>) -> Self {
        self.department_members.insert(department_id, members);
        self
    }

    /// register the users belonging to a branch
    pub fn with_branch(mut self, branch_id: Uuid, members: Vec<Uuid>) -> Self {
        self.branch_members.insert(branch_id, members);
        self
    }

    pub fn push(&mut self, row: RawPaymentRow) {
        self.rows.push(row);
    }

    fn owner_matches(&self, scope: OwnerScope, assignee: Option<Uuid>) -> bool {
        match scope {
            OwnerScope::All => true,
            OwnerScope::User(user_id) => assignee == Some(user_id),
            OwnerScope::Department(department_id) => assignee.is_some_and(|a| {
                self.department_members
                    .get(&department_id)
                    .is_some_and(|members| members.contains(&a))
            }),
            OwnerScope::Branch(branch_id) => assignee.is_some_and(|a| {
                self.branch_members
                    .get(&branch_id)
                    .is_some_and(|members| members.contains(&a))
            }),
        }
    }
}

impl RecordSource for MemorySource {
    fn fetch_rows(&self, context: &FilterContext, range: &DateRange) -> Result<Vec<RawPaymentRow>> {
        let rows: Vec<RawPaymentRow> = self
            .rows
            .iter()
            .filter(|row| row.tenant_id == Some(context.tenant_id))
            .filter(|row| self.owner_matches(context.owner_scope, row.assignee_id))
            .filter(|row| {
                // undated rows flow through to boundary validation
                match row.due_date.or(row.expected_close_date) {
                    Some(date) => range.contains(date),
                    None => true,
                }
            })
            .cloned()
            .collect();

        debug!(
            tenant_id = %context.tenant_id,
            start = %range.start,
            end = %range.end,
            count = rows.len(),
            "fetched payment rows"
        );

        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    use crate::types::PeriodType;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn row(tenant: Uuid, assignee: Option<Uuid>, due: NaiveDate) -> RawPaymentRow {
        RawPaymentRow {
            id: Some(Uuid::new_v4()),
            tenant_id: Some(tenant),
            assignee_id: assignee,
            due_date: Some(due),
            amount_value: Some(dec!(100)),
            contract_id: Some(Uuid::new_v4()),
            contract_value: Some(dec!(1000)),
            ..Default::default()
        }
    }

    fn context(tenant: Uuid, scope: OwnerScope) -> FilterContext {
        FilterContext::new(tenant, PeriodType::Monthly, 1, 2024, scope).unwrap()
    }

    fn january() -> DateRange {
        DateRange::new(d(2024, 1, 1), d(2024, 1, 31)).unwrap()
    }

    #[test]
    fn test_tenant_isolation() {
        let tenant = Uuid::new_v4();
        let other = Uuid::new_v4();
        let source = MemorySource::new(vec![
            row(tenant, None, d(2024, 1, 10)),
            row(other, None, d(2024, 1, 10)),
        ]);

        let rows = source
            .fetch_rows(&context(tenant, OwnerScope::All), &january())
            .unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].tenant_id, Some(tenant));
    }

    #[test]
    fn test_date_range_predicate() {
        let tenant = Uuid::new_v4();
        let source = MemorySource::new(vec![
            row(tenant, None, d(2024, 1, 31)),
            row(tenant, None, d(2024, 2, 1)),
        ]);

        let rows = source
            .fetch_rows(&context(tenant, OwnerScope::All), &january())
            .unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].due_date, Some(d(2024, 1, 31)));
    }

    #[test]
    fn test_user_scope() {
        let tenant = Uuid::new_v4();
        let user = Uuid::new_v4();
        let source = MemorySource::new(vec![
            row(tenant, Some(user), d(2024, 1, 10)),
            row(tenant, Some(Uuid::new_v4()), d(2024, 1, 10)),
            row(tenant, None, d(2024, 1, 10)),
        ]);

        let rows = source
            .fetch_rows(&context(tenant, OwnerScope::User(user)), &january())
            .unwrap();

        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn test_department_scope_uses_membership() {
        let tenant = Uuid::new_v4();
        let department = Uuid::new_v4();
        let member = Uuid::new_v4();
        let outsider = Uuid::new_v4();

        let source = MemorySource::new(vec![
            row(tenant, Some(member), d(2024, 1, 10)),
            row(tenant, Some(outsider), d(2024, 1, 10)),
        ])
        .with_department(department, vec![member]);

        let rows = source
            .fetch_rows(
                &context(tenant, OwnerScope::Department(department)),
                &january(),
            )
            .unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].assignee_id, Some(member));
    }

    #[test]
    fn test_undated_rows_pass_through() {
        let tenant = Uuid::new_v4();
        let mut undated = row(tenant, None, d(2024, 1, 10));
        undated.due_date = None;

        let source = MemorySource::new(vec![undated]);
        let rows = source
            .fetch_rows(&context(tenant, OwnerScope::All), &january())
            .unwrap();

        // left for the validation boundary to reject and count
        assert_eq!(rows.len(), 1);
    }
}
