//! Table rows and chart series derived from the snapshots and their summary.
//!
//! [`render_views`] always rebuilds everything; equal inputs give equal
//! [`Views`].

use crate::aggregation::{BudgetSummary, Totals};
use crate::models::allocation::Allocation;
use crate::models::amount::format_amount;
use crate::models::record::Record;
use crate::models::transaction::Transaction;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

pub const ALLOCATED_LABEL: &str = "Allocated";
pub const USED_LABEL: &str = "Used";

#[derive(Debug, Clone, PartialEq)]
pub struct PlanRow {
    pub id: String,
    pub plan: String,
    pub output: String,
    pub main_activity: String,
    pub project_name: String,
    pub department: String,
    pub project_code: String,
    pub budget_code: String,
    pub budget: Decimal,
    pub actual_used: Decimal,
    pub remaining: Decimal,
}

impl PlanRow {
    pub const HEADERS: [&'static str; 10] = [
        "Plan",
        "Output",
        "Main activity",
        "Project",
        "Department",
        "Project code",
        "Budget code",
        "Budget",
        "Used",
        "Remaining",
    ];

    pub fn cells(&self) -> [String; 10] {
        [
            self.plan.clone(),
            self.output.clone(),
            self.main_activity.clone(),
            self.project_name.clone(),
            self.department.clone(),
            self.project_code.clone(),
            self.budget_code.clone(),
            format_amount(self.budget),
            format_amount(self.actual_used),
            format_amount(self.remaining),
        ]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ControlRow {
    pub id: String,
    pub project_name: String,
    pub activity: String,
    pub department: String,
    pub committed_budget: Decimal,
    pub actual_used: Decimal,
    pub expense_category: String,
    /// As stored with the record.
    pub remaining: Decimal,
    pub timestamp: DateTime<Utc>,
}

impl ControlRow {
    pub const HEADERS: [&'static str; 8] = [
        "Project",
        "Activity",
        "Department",
        "Committed",
        "Used",
        "Category",
        "Remaining",
        "Recorded",
    ];

    pub fn cells(&self) -> [String; 8] {
        [
            self.project_name.clone(),
            self.activity.clone(),
            self.department.clone(),
            format_amount(self.committed_budget),
            format_amount(self.actual_used),
            self.expense_category.clone(),
            format_amount(self.remaining),
            self.timestamp.format("%Y-%m-%d %H:%M").to_string(),
        ]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub label: String,
    pub values: Vec<Decimal>,
}

/// Bar chart data: one value per label in every dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSeries {
    pub title: String,
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
}

impl ChartSeries {
    fn allocated_vs_used<'a>(title: &str, groups: impl Iterator<Item = (String, &'a Totals)>) -> Self {
        let mut labels = Vec::new();
        let mut allocated = Vec::new();
        let mut used = Vec::new();
        for (label, totals) in groups {
            labels.push(label);
            allocated.push(totals.allocated);
            used.push(totals.used);
        }
        Self {
            title: title.to_string(),
            labels,
            datasets: vec![
                Dataset {
                    label: ALLOCATED_LABEL.to_string(),
                    values: allocated,
                },
                Dataset {
                    label: USED_LABEL.to_string(),
                    values: used,
                },
            ],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Views {
    pub plan_rows: Vec<PlanRow>,
    pub control_rows: Vec<ControlRow>,
    pub total_chart: ChartSeries,
    pub department_chart: ChartSeries,
    pub plan_chart: ChartSeries,
}

pub fn render_views(
    allocations: &[Record<Allocation>],
    transactions: &[Record<Transaction>],
    summary: &BudgetSummary,
) -> Views {
    Views {
        plan_rows: plan_rows(allocations, summary),
        control_rows: control_rows(transactions),
        total_chart: total_chart(summary),
        department_chart: ChartSeries::allocated_vs_used(
            "Budget by department",
            summary
                .by_department
                .iter()
                .map(|(department, totals)| (department.code().to_string(), totals)),
        ),
        plan_chart: ChartSeries::allocated_vs_used(
            "Budget by plan",
            summary.by_plan.iter().map(|(plan, totals)| (plan.clone(), totals)),
        ),
    }
}

pub fn plan_rows(allocations: &[Record<Allocation>], summary: &BudgetSummary) -> Vec<PlanRow> {
    allocations
        .iter()
        .map(|record| {
            let a = &record.data;
            PlanRow {
                id: record.id.clone(),
                plan: a.plan.clone(),
                output: a.output.clone(),
                main_activity: a.main_activity.clone(),
                project_name: a.project_name.clone(),
                department: a.department.code().to_string(),
                project_code: a.project_code.clone(),
                budget_code: a.budget_code.clone(),
                budget: a.budget,
                actual_used: summary.used_for_project(&a.project_name),
                remaining: summary.remaining_for(a),
            }
        })
        .collect()
}

pub fn control_rows(transactions: &[Record<Transaction>]) -> Vec<ControlRow> {
    transactions
        .iter()
        .map(|record| {
            let t = &record.data;
            ControlRow {
                id: record.id.clone(),
                project_name: t.project_name.clone(),
                activity: t.activity.clone(),
                department: t.department.code().to_string(),
                committed_budget: t.committed_budget,
                actual_used: t.actual_used,
                expense_category: t.expense_category.code().to_string(),
                remaining: t.remaining,
                timestamp: t.timestamp,
            }
        })
        .collect()
}

fn total_chart(summary: &BudgetSummary) -> ChartSeries {
    ChartSeries {
        title: "Total budget".to_string(),
        labels: vec![ALLOCATED_LABEL.to_string(), USED_LABEL.to_string()],
        datasets: vec![Dataset {
            label: "Total budget".to_string(),
            values: vec![summary.total_allocated, summary.total_used],
        }],
    }
}

/// Distinct project names in snapshot order, for the transaction form.
pub fn project_options(allocations: &[Record<Allocation>]) -> Vec<String> {
    let mut options: Vec<String> = Vec::new();
    for record in allocations {
        if !options.contains(&record.data.project_name) {
            options.push(record.data.project_name.clone());
        }
    }
    options
}

pub fn summary_lines(summary: &BudgetSummary) -> Vec<String> {
    let mut lines = vec![
        format!("Total allocated: {}", format_amount(summary.total_allocated)),
        format!("Total used:      {}", format_amount(summary.total_used)),
        format!(
            "Remaining:       {}",
            format_amount(summary.total_allocated.saturating_sub(summary.total_used))
        ),
        String::new(),
        "By department:".to_string(),
    ];
    for (department, totals) in &summary.by_department {
        lines.push(format!(
            "  {:<8} {:>18} {:>18}",
            department.code(),
            format_amount(totals.allocated),
            format_amount(totals.used)
        ));
    }
    lines.push(String::new());
    lines.push("By plan:".to_string());
    for (plan, totals) in &summary.by_plan {
        lines.push(format!(
            "  {:<30} {:>18} {:>18}",
            plan,
            format_amount(totals.allocated),
            format_amount(totals.used)
        ));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregation::aggregate;
    use crate::models::department::Department;
    use crate::models::expense_category::ExpenseCategory;
    use chrono::TimeZone;

    fn allocation(id: &str, plan: &str, project_name: &str, department: Department, budget: i64) -> Record<Allocation> {
        Record::new(
            id,
            Allocation {
                plan: plan.to_string(),
                output: "Output".to_string(),
                main_activity: "Main".to_string(),
                project_name: project_name.to_string(),
                department,
                budget: Decimal::new(budget, 0),
                project_code: "PC".to_string(),
                budget_code: "BC".to_string(),
            },
        )
    }

    fn transaction(id: &str, project_name: &str, department: Department, actual_used: i64) -> Record<Transaction> {
        Record::new(
            id,
            Transaction::new(
                project_name.to_string(),
                "Activity".to_string(),
                department,
                Decimal::new(1000, 0),
                Decimal::new(actual_used, 0),
                ExpenseCategory::Telephone,
                Utc.with_ymd_and_hms(2025, 6, 1, 8, 0, 0).unwrap(),
            ),
        )
    }

    fn fixture() -> (Vec<Record<Allocation>>, Vec<Record<Transaction>>) {
        (
            vec![
                allocation("a1", "Health", "Clinic", Department::Mt, 1000),
                allocation("a2", "Education", "School", Department::Ps, 2000),
            ],
            vec![
                transaction("t1", "Clinic", Department::Mt, 300),
                transaction("t2", "Clinic", Department::Mt, 200),
                transaction("t3", "Orphan", Department::Sp, 50),
            ],
        )
    }

    #[test]
    fn test_plan_rows_join_usage() {
        let (allocations, transactions) = fixture();
        let summary = aggregate(&allocations, &transactions);
        let rows = plan_rows(&allocations, &summary);

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].id, "a1");
        assert_eq!(rows[0].actual_used, Decimal::new(500, 0));
        assert_eq!(rows[0].remaining, Decimal::new(500, 0));
        assert_eq!(rows[1].actual_used, Decimal::ZERO);
        assert_eq!(rows[1].remaining, Decimal::new(2000, 0));
        assert_eq!(rows[0].cells()[7], "1,000.00");
    }

    #[test]
    fn test_control_rows_show_stored_remaining() {
        let (_, mut transactions) = fixture();
        transactions[0].data.remaining = Decimal::new(12345, 0);
        let rows = control_rows(&transactions);

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].remaining, Decimal::new(12345, 0));
        assert_eq!(rows[0].cells()[6], "12,345.00");
        assert_eq!(rows[0].cells()[7], "2025-06-01 08:00");
        assert_eq!(rows[2].project_name, "Orphan");
    }

    #[test]
    fn test_chart_series() {
        let (allocations, transactions) = fixture();
        let summary = aggregate(&allocations, &transactions);
        let views = render_views(&allocations, &transactions, &summary);

        assert_eq!(views.total_chart.labels, vec!["Allocated", "Used"]);
        assert_eq!(
            views.total_chart.datasets[0].values,
            vec![Decimal::new(3000, 0), Decimal::new(550, 0)]
        );

        assert_eq!(views.department_chart.labels, vec!["พส.", "มธ.", "สป."]);
        assert_eq!(
            views.department_chart.datasets[0].values,
            vec![Decimal::new(2000, 0), Decimal::new(1000, 0), Decimal::ZERO]
        );
        assert_eq!(
            views.department_chart.datasets[1].values,
            vec![Decimal::ZERO, Decimal::new(500, 0), Decimal::new(50, 0)]
        );

        assert_eq!(views.plan_chart.labels, vec!["Education", "Health"]);
        assert_eq!(
            views.plan_chart.datasets[1].values,
            vec![Decimal::ZERO, Decimal::new(500, 0)]
        );
    }

    #[test]
    fn test_render_is_idempotent() {
        let (allocations, transactions) = fixture();
        let summary = aggregate(&allocations, &transactions);

        let first = render_views(&allocations, &transactions, &summary);
        let second = render_views(&allocations, &transactions, &aggregate(&allocations, &transactions));
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_views() {
        let views = render_views(&[], &[], &BudgetSummary::default());
        assert!(views.plan_rows.is_empty());
        assert!(views.control_rows.is_empty());
        assert!(views.department_chart.is_empty());
        assert!(views.plan_chart.is_empty());
        assert!(!views.total_chart.is_empty());
    }

    #[test]
    fn test_project_options_deduplicated_in_order() {
        let allocations = vec![
            allocation("a1", "P", "School", Department::Ps, 1),
            allocation("a2", "P", "Clinic", Department::Ps, 1),
            allocation("a3", "Q", "School", Department::Ps, 1),
        ];
        assert_eq!(project_options(&allocations), vec!["School", "Clinic"]);
    }

    #[test]
    fn test_summary_lines() {
        let (allocations, transactions) = fixture();
        let lines = summary_lines(&aggregate(&allocations, &transactions));

        assert_eq!(lines[0], "Total allocated: 3,000.00");
        assert_eq!(lines[2], "Remaining:       2,450.00");
        assert!(lines.iter().any(|l| l.contains("Health") && l.contains("500.00")));
        assert!(!lines.iter().any(|l| l.contains("Orphan")));
    }
}
