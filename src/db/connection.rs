use crate::models::department::Department;
use crate::models::expense_category::ExpenseCategory;
use rusqlite::{Connection, Result};
use std::path::Path;

pub fn establish_connection(path: &Path) -> Result<Connection> {
    let conn = Connection::open(path)?;
    create_schema(&conn)?;
    Ok(conn)
}

#[cfg(test)]
pub fn establish_test_connection() -> Result<Connection> {
    let conn = Connection::open_in_memory()?;
    create_schema(&conn)?;
    Ok(conn)
}

fn create_schema(conn: &Connection) -> Result<()> {
    let departments = quoted_list(Department::ALL.iter().map(|d| d.code()));
    let categories = quoted_list(ExpenseCategory::ALL.iter().map(|c| c.code()));

    conn.execute(
        &format!(
            "CREATE TABLE IF NOT EXISTS allocations (
                id TEXT PRIMARY KEY,
                plan TEXT NOT NULL,
                output TEXT NOT NULL,
                main_activity TEXT NOT NULL,
                project_name TEXT NOT NULL,
                department TEXT NOT NULL CHECK (department IN ({departments})),
                budget TEXT NOT NULL,
                project_code TEXT NOT NULL,
                budget_code TEXT NOT NULL
            )"
        ),
        [],
    )?;
    conn.execute(
        &format!(
            "CREATE TABLE IF NOT EXISTS transactions (
                id TEXT PRIMARY KEY,
                project_name TEXT NOT NULL,
                activity TEXT NOT NULL,
                department TEXT NOT NULL CHECK (department IN ({departments})),
                committed_budget TEXT NOT NULL,
                actual_used TEXT NOT NULL,
                expense_category TEXT NOT NULL CHECK (expense_category IN ({categories})),
                remaining TEXT NOT NULL,
                timestamp TEXT NOT NULL
            )"
        ),
        [],
    )?;
    Ok(())
}

fn quoted_list<'a>(values: impl Iterator<Item = &'a str>) -> String {
    values
        .map(|v| format!("'{}'", v.replace('\'', "''")))
        .collect::<Vec<_>>()
        .join(", ")
}
