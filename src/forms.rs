//! Entry forms for allocations and transactions.
//!
//! Forms keep what the user typed verbatim and only turn it into a typed
//! payload on [`AllocationForm::validate`] / [`TransactionForm::validate`].

use crate::models::allocation::Allocation;
use crate::models::amount::{AmountError, MAX_AMOUNT_UNITS, format_amount, parse_amount, try_parse_amount};
use crate::models::department::Department;
use crate::models::expense_category::ExpenseCategory;
use crate::models::record::Record;
use crate::models::transaction::Transaction;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Amount,
    Select,
    ReadOnly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllocationField {
    Plan,
    Output,
    MainActivity,
    ProjectName,
    Department,
    Budget,
    ProjectCode,
    BudgetCode,
}

impl AllocationField {
    pub const ALL: [AllocationField; 8] = [
        AllocationField::Plan,
        AllocationField::Output,
        AllocationField::MainActivity,
        AllocationField::ProjectName,
        AllocationField::Department,
        AllocationField::Budget,
        AllocationField::ProjectCode,
        AllocationField::BudgetCode,
    ];

    pub fn label(self) -> &'static str {
        match self {
            AllocationField::Plan => "Plan",
            AllocationField::Output => "Output / project",
            AllocationField::MainActivity => "Main activity",
            AllocationField::ProjectName => "Project name",
            AllocationField::Department => "Department",
            AllocationField::Budget => "Budget",
            AllocationField::ProjectCode => "Project code",
            AllocationField::BudgetCode => "Budget code",
        }
    }

    pub fn kind(self) -> FieldKind {
        match self {
            AllocationField::Department => FieldKind::Select,
            AllocationField::Budget => FieldKind::Amount,
            _ => FieldKind::Text,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AllocationForm {
    pub plan: String,
    pub output: String,
    pub main_activity: String,
    pub project_name: String,
    pub department: Option<Department>,
    pub budget: String,
    pub project_code: String,
    pub budget_code: String,
    /// Set while an existing record is being edited.
    pub editing_id: Option<String>,
}

impl AllocationForm {
    pub fn from_record(record: &Record<Allocation>) -> Self {
        let a = &record.data;
        Self {
            plan: a.plan.clone(),
            output: a.output.clone(),
            main_activity: a.main_activity.clone(),
            project_name: a.project_name.clone(),
            department: Some(a.department),
            budget: format_amount(a.budget),
            project_code: a.project_code.clone(),
            budget_code: a.budget_code.clone(),
            editing_id: Some(record.id.clone()),
        }
    }

    pub fn title(&self) -> &'static str {
        if self.editing_id.is_some() {
            "Edit allocation"
        } else {
            "New allocation"
        }
    }

    pub fn text_mut(&mut self, field: AllocationField) -> Option<&mut String> {
        match field {
            AllocationField::Plan => Some(&mut self.plan),
            AllocationField::Output => Some(&mut self.output),
            AllocationField::MainActivity => Some(&mut self.main_activity),
            AllocationField::ProjectName => Some(&mut self.project_name),
            AllocationField::Budget => Some(&mut self.budget),
            AllocationField::ProjectCode => Some(&mut self.project_code),
            AllocationField::BudgetCode => Some(&mut self.budget_code),
            AllocationField::Department => None,
        }
    }

    pub fn display(&self, field: AllocationField) -> String {
        match field {
            AllocationField::Plan => self.plan.clone(),
            AllocationField::Output => self.output.clone(),
            AllocationField::MainActivity => self.main_activity.clone(),
            AllocationField::ProjectName => self.project_name.clone(),
            AllocationField::Department => select_display(self.department.map(|d| d.code())),
            AllocationField::Budget => self.budget.clone(),
            AllocationField::ProjectCode => self.project_code.clone(),
            AllocationField::BudgetCode => self.budget_code.clone(),
        }
    }

    pub fn cycle(&mut self, field: AllocationField, step: isize) {
        if field == AllocationField::Department {
            self.department = cycle_option(&Department::ALL, self.department, step);
        }
    }

    /// Reformats an amount field once the cursor leaves it.
    pub fn leave(&mut self, field: AllocationField) {
        if field == AllocationField::Budget {
            normalize_amount_field(&mut self.budget);
        }
    }

    pub fn validate(&self) -> Result<Allocation, String> {
        let plan = required(&self.plan, AllocationField::Plan.label())?;
        let output = required(&self.output, AllocationField::Output.label())?;
        let main_activity = required(&self.main_activity, AllocationField::MainActivity.label())?;
        let project_name = required(&self.project_name, AllocationField::ProjectName.label())?;
        let department = self.department.ok_or("Department is required")?;
        required(&self.budget, AllocationField::Budget.label())?;
        let budget = bounded_amount(&self.budget, AllocationField::Budget.label())?;
        if budget < Decimal::ZERO {
            return Err("Budget cannot be negative".to_string());
        }
        let project_code = required(&self.project_code, AllocationField::ProjectCode.label())?;
        let budget_code = required(&self.budget_code, AllocationField::BudgetCode.label())?;

        Ok(Allocation {
            plan,
            output,
            main_activity,
            project_name,
            department,
            budget,
            project_code,
            budget_code,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionField {
    ProjectName,
    Activity,
    Department,
    CommittedBudget,
    ActualUsed,
    ExpenseCategory,
    Remaining,
}

impl TransactionField {
    pub const ALL: [TransactionField; 7] = [
        TransactionField::ProjectName,
        TransactionField::Activity,
        TransactionField::Department,
        TransactionField::CommittedBudget,
        TransactionField::ActualUsed,
        TransactionField::ExpenseCategory,
        TransactionField::Remaining,
    ];

    pub fn label(self) -> &'static str {
        match self {
            TransactionField::ProjectName => "Project",
            TransactionField::Activity => "Activity",
            TransactionField::Department => "Department",
            TransactionField::CommittedBudget => "Committed",
            TransactionField::ActualUsed => "Actually used",
            TransactionField::ExpenseCategory => "Expense category",
            TransactionField::Remaining => "Remaining",
        }
    }

    pub fn kind(self) -> FieldKind {
        match self {
            TransactionField::ProjectName
            | TransactionField::Department
            | TransactionField::ExpenseCategory => FieldKind::Select,
            TransactionField::CommittedBudget | TransactionField::ActualUsed => FieldKind::Amount,
            TransactionField::Remaining => FieldKind::ReadOnly,
            TransactionField::Activity => FieldKind::Text,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EditingTransaction {
    pub id: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionForm {
    pub project_name: Option<String>,
    pub activity: String,
    pub department: Option<Department>,
    pub committed_budget: String,
    pub actual_used: String,
    pub expense_category: Option<ExpenseCategory>,
    pub editing: Option<EditingTransaction>,
}

impl TransactionForm {
    pub fn from_record(record: &Record<Transaction>) -> Self {
        let t = &record.data;
        Self {
            project_name: Some(t.project_name.clone()),
            activity: t.activity.clone(),
            department: Some(t.department),
            committed_budget: format_amount(t.committed_budget),
            actual_used: format_amount(t.actual_used),
            expense_category: Some(t.expense_category),
            editing: Some(EditingTransaction {
                id: record.id.clone(),
                created_at: t.timestamp,
            }),
        }
    }

    pub fn title(&self) -> &'static str {
        if self.editing.is_some() {
            "Edit budget control entry"
        } else {
            "New budget control entry"
        }
    }

    pub fn editing_id(&self) -> Option<&str> {
        self.editing.as_ref().map(|e| e.id.as_str())
    }

    /// Live committed-minus-actual shown while typing.
    pub fn remaining(&self) -> Decimal {
        parse_amount(&self.committed_budget).saturating_sub(parse_amount(&self.actual_used))
    }

    pub fn text_mut(&mut self, field: TransactionField) -> Option<&mut String> {
        match field {
            TransactionField::Activity => Some(&mut self.activity),
            TransactionField::CommittedBudget => Some(&mut self.committed_budget),
            TransactionField::ActualUsed => Some(&mut self.actual_used),
            _ => None,
        }
    }

    pub fn display(&self, field: TransactionField) -> String {
        match field {
            TransactionField::ProjectName => select_display(self.project_name.as_deref()),
            TransactionField::Activity => self.activity.clone(),
            TransactionField::Department => select_display(self.department.map(|d| d.code())),
            TransactionField::CommittedBudget => self.committed_budget.clone(),
            TransactionField::ActualUsed => self.actual_used.clone(),
            TransactionField::ExpenseCategory => {
                select_display(self.expense_category.map(|c| c.code()))
            }
            TransactionField::Remaining => format_amount(self.remaining()),
        }
    }

    /// Steps a selector. `projects` are the project names currently offered.
    pub fn cycle(&mut self, field: TransactionField, step: isize, projects: &[String]) {
        match field {
            TransactionField::ProjectName => {
                self.project_name = cycle_option(projects, self.project_name.clone(), step);
            }
            TransactionField::Department => {
                self.department = cycle_option(&Department::ALL, self.department, step);
            }
            TransactionField::ExpenseCategory => {
                self.expense_category = cycle_option(&ExpenseCategory::ALL, self.expense_category, step);
            }
            _ => {}
        }
    }

    pub fn leave(&mut self, field: TransactionField) {
        match field {
            TransactionField::CommittedBudget => normalize_amount_field(&mut self.committed_budget),
            TransactionField::ActualUsed => normalize_amount_field(&mut self.actual_used),
            _ => {}
        }
    }

    /// Builds the payload to store. A new entry is stamped with `now`; an
    /// edited one keeps its original creation time.
    pub fn validate(&self, now: DateTime<Utc>) -> Result<Transaction, String> {
        let project_name = match self.project_name.as_deref() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => return Err("Project is required".to_string()),
        };
        let activity = required(&self.activity, TransactionField::Activity.label())?;
        let department = self.department.ok_or("Department is required")?;
        required(&self.committed_budget, TransactionField::CommittedBudget.label())?;
        let committed_budget = bounded_amount(&self.committed_budget, TransactionField::CommittedBudget.label())?;
        required(&self.actual_used, TransactionField::ActualUsed.label())?;
        let actual_used = bounded_amount(&self.actual_used, TransactionField::ActualUsed.label())?;
        let expense_category = self.expense_category.ok_or("Expense category is required")?;

        let timestamp = self.editing.as_ref().map(|e| e.created_at).unwrap_or(now);
        Ok(Transaction::new(
            project_name,
            activity,
            department,
            committed_budget,
            actual_used,
            expense_category,
            timestamp,
        ))
    }
}

/// Rewrites a typed amount in display form. Unparseable text is cleared;
/// out-of-range text is left as typed so validation can report it.
pub fn normalize_amount_field(value: &mut String) {
    if value.trim().is_empty() {
        value.clear();
        return;
    }
    match try_parse_amount(value) {
        Ok(amount) => *value = format_amount(amount),
        Err(AmountError::TooLarge) => {}
        Err(AmountError::Malformed) => value.clear(),
    }
}

/// Malformed text still counts as 0; only out-of-range values are refused.
fn bounded_amount(value: &str, label: &str) -> Result<Decimal, String> {
    match try_parse_amount(value) {
        Err(AmountError::TooLarge) => Err(format!(
            "{} cannot exceed {}",
            label,
            format_amount(Decimal::from(MAX_AMOUNT_UNITS))
        )),
        Ok(amount) => Ok(amount),
        Err(AmountError::Malformed) => Ok(parse_amount(value)),
    }
}

fn required(value: &str, label: &str) -> Result<String, String> {
    if value.trim().is_empty() {
        return Err(format!("{} is required", label));
    }
    Ok(value.to_string())
}

fn select_display(value: Option<&str>) -> String {
    value.unwrap_or("-- select --").to_string()
}

fn cycle_option<T: Clone + PartialEq>(options: &[T], current: Option<T>, step: isize) -> Option<T> {
    if options.is_empty() {
        return current;
    }
    let len = options.len() as isize;
    let next = match current.and_then(|c| options.iter().position(|o| *o == c)) {
        Some(idx) => (idx as isize + step).rem_euclid(len),
        None if step < 0 => len - 1,
        None => 0,
    };
    Some(options[next as usize].clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn filled_allocation_form() -> AllocationForm {
        AllocationForm {
            plan: "Education".to_string(),
            output: "Schools".to_string(),
            main_activity: "Renovation".to_string(),
            project_name: "School roof".to_string(),
            department: Some(Department::Bs),
            budget: "1,250,000.50".to_string(),
            project_code: "P-77".to_string(),
            budget_code: "B-12".to_string(),
            editing_id: None,
        }
    }

    fn filled_transaction_form() -> TransactionForm {
        TransactionForm {
            project_name: Some("School roof".to_string()),
            activity: "Inspection trip".to_string(),
            department: Some(Department::Bs),
            committed_budget: "10,000".to_string(),
            actual_used: "7,500.25".to_string(),
            expense_category: Some(ExpenseCategory::OfficialTravel),
            editing: None,
        }
    }

    #[test]
    fn test_allocation_validate_strips_separators() {
        let allocation = filled_allocation_form().validate().unwrap();
        assert_eq!(allocation.budget, Decimal::new(125000050, 2));
        assert_eq!(allocation.department, Department::Bs);
        assert_eq!(allocation.project_name, "School roof");
    }

    #[test]
    fn test_allocation_validate_required_fields() {
        let mut form = filled_allocation_form();
        form.plan = "   ".to_string();
        assert_eq!(form.validate().unwrap_err(), "Plan is required");

        let mut form = filled_allocation_form();
        form.department = None;
        assert_eq!(form.validate().unwrap_err(), "Department is required");

        let mut form = filled_allocation_form();
        form.budget.clear();
        assert_eq!(form.validate().unwrap_err(), "Budget is required");
    }

    #[test]
    fn test_allocation_malformed_budget_is_zero() {
        let mut form = filled_allocation_form();
        form.budget = "lots".to_string();
        assert_eq!(form.validate().unwrap().budget, Decimal::ZERO);
    }

    #[test]
    fn test_allocation_negative_budget_rejected() {
        let mut form = filled_allocation_form();
        form.budget = "-5".to_string();
        assert_eq!(form.validate().unwrap_err(), "Budget cannot be negative");
    }

    #[test]
    fn test_allocation_budget_out_of_range_rejected() {
        let mut form = filled_allocation_form();
        form.budget = "50,000,000,000,000,000,000,000,000,000".to_string();
        form.leave(AllocationField::Budget);
        assert_eq!(form.budget, "50,000,000,000,000,000,000,000,000,000");
        assert_eq!(
            form.validate().unwrap_err(),
            "Budget cannot exceed 1,000,000,000,000,000.00"
        );
    }

    #[test]
    fn test_transaction_amounts_out_of_range() {
        let mut form = filled_transaction_form();
        form.committed_budget = "79,228,162,514,264,337,593,543,950,335".to_string();
        form.actual_used = "-1".to_string();
        // typing a huge number must not break the live remaining
        assert_eq!(form.remaining(), Decimal::ONE);
        assert_eq!(
            form.validate(Utc::now()).unwrap_err(),
            "Committed cannot exceed 1,000,000,000,000,000.00"
        );

        let mut form = filled_transaction_form();
        form.actual_used = "2,000,000,000,000,000".to_string();
        assert_eq!(
            form.validate(Utc::now()).unwrap_err(),
            "Actually used cannot exceed 1,000,000,000,000,000.00"
        );
    }

    #[test]
    fn test_allocation_edit_round_trip_is_exact() {
        let original = filled_allocation_form().validate().unwrap();
        let record = Record::new("a1", original.clone());

        let form = AllocationForm::from_record(&record);
        assert_eq!(form.editing_id.as_deref(), Some("a1"));
        assert_eq!(form.budget, "1,250,000.50");
        assert_eq!(form.title(), "Edit allocation");
        assert_eq!(form.validate().unwrap(), original);
    }

    #[test]
    fn test_transaction_remaining_is_live() {
        let mut form = filled_transaction_form();
        assert_eq!(form.remaining(), Decimal::new(249975, 2));
        assert_eq!(form.display(TransactionField::Remaining), "2,499.75");

        form.actual_used = "12000".to_string();
        assert_eq!(form.display(TransactionField::Remaining), "-2,000.00");
    }

    #[test]
    fn test_transaction_validate_new_uses_now() {
        let now = Utc.with_ymd_and_hms(2025, 5, 5, 10, 0, 0).unwrap();
        let tx = filled_transaction_form().validate(now).unwrap();

        assert_eq!(tx.timestamp, now);
        assert_eq!(tx.committed_budget, Decimal::new(10000, 0));
        assert_eq!(tx.remaining, Decimal::new(249975, 2));
    }

    #[test]
    fn test_transaction_edit_only_activity_keeps_other_fields() {
        let created = Utc.with_ymd_and_hms(2024, 12, 1, 9, 0, 0).unwrap();
        let original = filled_transaction_form().validate(created).unwrap();
        let record = Record::new("t1", original.clone());

        let mut form = TransactionForm::from_record(&record);
        form.activity = "Second inspection".to_string();
        let later = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let edited = form.validate(later).unwrap();

        assert_eq!(form.editing_id(), Some("t1"));
        assert_eq!(edited.activity, "Second inspection");
        assert_eq!(edited.actual_used, original.actual_used);
        assert_eq!(edited.committed_budget, original.committed_budget);
        assert_eq!(edited.remaining, original.remaining);
        assert_eq!(edited.timestamp, created);
        assert_eq!(edited.project_name, original.project_name);
    }

    #[test]
    fn test_transaction_requires_project() {
        let mut form = filled_transaction_form();
        form.project_name = None;
        assert_eq!(form.validate(Utc::now()).unwrap_err(), "Project is required");
    }

    #[test]
    fn test_cycle_selectors() {
        let projects = vec!["A".to_string(), "B".to_string()];
        let mut form = TransactionForm::default();

        form.cycle(TransactionField::ProjectName, 1, &projects);
        assert_eq!(form.project_name.as_deref(), Some("A"));
        form.cycle(TransactionField::ProjectName, 1, &projects);
        assert_eq!(form.project_name.as_deref(), Some("B"));
        form.cycle(TransactionField::ProjectName, 1, &projects);
        assert_eq!(form.project_name.as_deref(), Some("A"));

        form.cycle(TransactionField::Department, -1, &projects);
        assert_eq!(form.department, Some(Department::Sp));

        form.cycle(TransactionField::ExpenseCategory, 1, &projects);
        assert_eq!(form.expense_category, Some(ExpenseCategory::TrainingRegistration));
    }

    #[test]
    fn test_cycle_project_without_options_keeps_value() {
        let mut form = filled_transaction_form();
        form.cycle(TransactionField::ProjectName, 1, &[]);
        assert_eq!(form.project_name.as_deref(), Some("School roof"));
    }

    #[test]
    fn test_normalize_amount_field() {
        let mut value = "1234567.5".to_string();
        normalize_amount_field(&mut value);
        assert_eq!(value, "1,234,567.50");

        let mut value = "12abc".to_string();
        normalize_amount_field(&mut value);
        assert_eq!(value, "");

        let mut form = filled_allocation_form();
        form.budget = "2500".to_string();
        form.leave(AllocationField::Budget);
        assert_eq!(form.budget, "2,500.00");
    }
}
