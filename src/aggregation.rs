//! Derived totals computed from the allocation and transaction snapshots.
//!
//! Everything here is a pure function of the two record lists and is rebuilt
//! from scratch whenever either list changes.

use crate::models::allocation::Allocation;
use crate::models::department::Department;
use crate::models::record::Record;
use crate::models::transaction::Transaction;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};

/// Sums saturate at the `Decimal` range instead of overflowing.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Totals {
    pub allocated: Decimal,
    pub used: Decimal,
}

impl Totals {
    fn add_allocated(&mut self, amount: Decimal) {
        self.allocated = self.allocated.saturating_add(amount);
    }

    fn add_used(&mut self, amount: Decimal) {
        self.used = self.used.saturating_add(amount);
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BudgetSummary {
    pub total_allocated: Decimal,
    pub total_used: Decimal,
    pub by_department: BTreeMap<Department, Totals>,
    pub by_plan: BTreeMap<String, Totals>,
    pub per_project_used: HashMap<String, Decimal>,
}

impl BudgetSummary {
    pub fn used_for_project(&self, project_name: &str) -> Decimal {
        self.per_project_used
            .get(project_name)
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    pub fn remaining_for(&self, allocation: &Allocation) -> Decimal {
        allocation
            .budget
            .saturating_sub(self.used_for_project(&allocation.project_name))
    }
}

/// Resolves a project name to the plan of the allocation that owns it.
///
/// Names are compared exactly (case-sensitive, untrimmed). When several
/// allocations share a project name the first one in snapshot order wins.
pub struct ProjectIndex<'a> {
    plans: HashMap<&'a str, &'a str>,
}

impl<'a> ProjectIndex<'a> {
    pub fn build(allocations: &'a [Record<Allocation>]) -> Self {
        let mut plans = HashMap::with_capacity(allocations.len());
        for record in allocations {
            plans
                .entry(record.data.project_name.as_str())
                .or_insert(record.data.plan.as_str());
        }
        Self { plans }
    }

    pub fn plan_for(&self, project_name: &str) -> Option<&'a str> {
        self.plans.get(project_name).copied()
    }
}

/// Single lookup form of [`ProjectIndex::plan_for`].
pub fn plan_for_project<'a>(allocations: &'a [Record<Allocation>], project_name: &str) -> Option<&'a str> {
    allocations
        .iter()
        .find(|r| r.data.project_name == project_name)
        .map(|r| r.data.plan.as_str())
}

pub fn aggregate(allocations: &[Record<Allocation>], transactions: &[Record<Transaction>]) -> BudgetSummary {
    let mut summary = BudgetSummary::default();

    for record in allocations {
        let allocation = &record.data;
        summary.total_allocated = summary.total_allocated.saturating_add(allocation.budget);
        summary
            .by_plan
            .entry(allocation.plan.clone())
            .or_default()
            .add_allocated(allocation.budget);
        summary
            .by_department
            .entry(allocation.department)
            .or_default()
            .add_allocated(allocation.budget);
    }

    let index = ProjectIndex::build(allocations);
    let mut orphaned = 0usize;

    for record in transactions {
        let transaction = &record.data;
        summary.total_used = summary.total_used.saturating_add(transaction.actual_used);
        summary
            .by_department
            .entry(transaction.department)
            .or_default()
            .add_used(transaction.actual_used);
        let project_used = summary
            .per_project_used
            .entry(transaction.project_name.clone())
            .or_insert(Decimal::ZERO);
        *project_used = project_used.saturating_add(transaction.actual_used);

        match index.plan_for(&transaction.project_name) {
            Some(plan) => summary
                .by_plan
                .entry(plan.to_string())
                .or_default()
                .add_used(transaction.actual_used),
            None => orphaned += 1,
        }
    }

    tracing::debug!(
        allocations = allocations.len(),
        transactions = transactions.len(),
        orphaned,
        "budget summary recomputed"
    );
    summary
}
