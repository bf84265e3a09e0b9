use crate::report::{ControlRow, PlanRow};
use rust_decimal::Decimal;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ReportKind {
    Plan,
    Control,
}

/// Plain two-decimal text with no grouping.
fn csv_amount(value: Decimal) -> String {
    format!("{:.2}", value.round_dp(2))
}

/// Writes the plan report as CSV. Amounts are plain decimals without
/// grouping so spreadsheets read them as numbers.
pub fn export_plan_rows(rows: &[PlanRow], path: &Path) -> Result<usize, String> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| format!("Failed to create file '{}': {}", path.display(), e))?;

    let mut header = vec!["Id"];
    header.extend(PlanRow::HEADERS);
    writer
        .write_record(&header)
        .map_err(|e| format!("Failed to write header: {}", e))?;

    for row in rows {
        writer
            .write_record([
                row.id.as_str(),
                row.plan.as_str(),
                row.output.as_str(),
                row.main_activity.as_str(),
                row.project_name.as_str(),
                row.department.as_str(),
                row.project_code.as_str(),
                row.budget_code.as_str(),
                csv_amount(row.budget).as_str(),
                csv_amount(row.actual_used).as_str(),
                csv_amount(row.remaining).as_str(),
            ])
            .map_err(|e| format!("Failed to write row {}: {}", row.id, e))?;
    }

    writer
        .flush()
        .map_err(|e| format!("Failed to flush '{}': {}", path.display(), e))?;
    Ok(rows.len())
}

pub fn export_control_rows(rows: &[ControlRow], path: &Path) -> Result<usize, String> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| format!("Failed to create file '{}': {}", path.display(), e))?;

    let mut header = vec!["Id"];
    header.extend(ControlRow::HEADERS);
    writer
        .write_record(&header)
        .map_err(|e| format!("Failed to write header: {}", e))?;

    for row in rows {
        writer
            .write_record([
                row.id.as_str(),
                row.project_name.as_str(),
                row.activity.as_str(),
                row.department.as_str(),
                csv_amount(row.committed_budget).as_str(),
                csv_amount(row.actual_used).as_str(),
                row.expense_category.as_str(),
                csv_amount(row.remaining).as_str(),
                row.timestamp.to_rfc3339().as_str(),
            ])
            .map_err(|e| format!("Failed to write row {}: {}", row.id, e))?;
    }

    writer
        .flush()
        .map_err(|e| format!("Failed to flush '{}': {}", path.display(), e))?;
    Ok(rows.len())
}
