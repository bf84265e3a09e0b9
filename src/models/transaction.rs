use crate::models::department::Department;
use crate::models::expense_category::ExpenseCategory;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    /// Refers to `Allocation::project_name` by value; may match nothing.
    pub project_name: String,
    pub activity: String,
    pub department: Department,
    pub committed_budget: Decimal,
    pub actual_used: Decimal,
    pub expense_category: ExpenseCategory,
    /// Committed minus actual as computed when the record was saved.
    pub remaining: Decimal,
    pub timestamp: DateTime<Utc>,
}

impl Transaction {
    /// Builds a transaction, deriving `remaining` from the two amounts.
    pub fn new(
        project_name: String,
        activity: String,
        department: Department,
        committed_budget: Decimal,
        actual_used: Decimal,
        expense_category: ExpenseCategory,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            project_name,
            activity,
            department,
            committed_budget,
            actual_used,
            expense_category,
            remaining: committed_budget.saturating_sub(actual_used),
            timestamp,
        }
    }
}
