use crate::models::department::Department;
use rust_decimal::Decimal;

#[derive(Debug, Clone, PartialEq)]
pub struct Allocation {
    pub plan: String,
    pub output: String,
    pub main_activity: String,
    /// Join key for transactions; compared byte-for-byte.
    pub project_name: String,
    pub department: Department,
    pub budget: Decimal,
    pub project_code: String,
    pub budget_code: String,
}

