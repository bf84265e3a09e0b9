use crate::error::StoreError;
use crate::models::amount::parse_amount;
use crate::models::department::Department;
use crate::models::expense_category::ExpenseCategory;
use crate::models::record::Record;
use crate::models::transaction::Transaction;
use crate::store::Collection;
use chrono::{DateTime, Utc};
use rusqlite::Connection;

pub fn insert_transaction(conn: &Connection, id: &str, transaction: &Transaction) -> Result<(), StoreError> {
    conn.execute(
        "INSERT INTO transactions (id, project_name, activity, department, committed_budget, actual_used, expense_category, remaining, timestamp)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        rusqlite::params![
            id,
            &transaction.project_name,
            &transaction.activity,
            transaction.department.code(),
            transaction.committed_budget.to_string(),
            transaction.actual_used.to_string(),
            transaction.expense_category.code(),
            transaction.remaining.to_string(),
            transaction.timestamp.to_rfc3339(),
        ],
    )?;
    Ok(())
}

/// Overwrites every field of the record, creating it when the id is unknown.
pub fn replace_transaction(conn: &Connection, id: &str, transaction: &Transaction) -> Result<(), StoreError> {
    conn.execute(
        "INSERT INTO transactions (id, project_name, activity, department, committed_budget, actual_used, expense_category, remaining, timestamp)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
         ON CONFLICT(id) DO UPDATE SET
            project_name = excluded.project_name,
            activity = excluded.activity,
            department = excluded.department,
            committed_budget = excluded.committed_budget,
            actual_used = excluded.actual_used,
            expense_category = excluded.expense_category,
            remaining = excluded.remaining,
            timestamp = excluded.timestamp",
        rusqlite::params![
            id,
            &transaction.project_name,
            &transaction.activity,
            transaction.department.code(),
            transaction.committed_budget.to_string(),
            transaction.actual_used.to_string(),
            transaction.expense_category.code(),
            transaction.remaining.to_string(),
            transaction.timestamp.to_rfc3339(),
        ],
    )?;
    Ok(())
}

struct TransactionRow {
    id: String,
    project_name: String,
    activity: String,
    department: String,
    committed_budget: String,
    actual_used: String,
    expense_category: String,
    remaining: String,
    timestamp: String,
}

impl TransactionRow {
    fn corrupt(&self, reason: String) -> StoreError {
        StoreError::Corrupt {
            collection: Collection::Transactions,
            id: self.id.clone(),
            reason,
        }
    }

    fn into_record(self) -> Result<Record<Transaction>, StoreError> {
        let department = Department::from_code(&self.department)
            .ok_or_else(|| self.corrupt(format!("unknown department '{}'", self.department)))?;
        let expense_category = ExpenseCategory::from_code(&self.expense_category)
            .ok_or_else(|| self.corrupt(format!("unknown expense category '{}'", self.expense_category)))?;
        let timestamp = DateTime::parse_from_rfc3339(&self.timestamp)
            .map_err(|e| self.corrupt(format!("invalid timestamp '{}': {}", self.timestamp, e)))?
            .with_timezone(&Utc);

        // remaining is read back as stored, never recomputed
        Ok(Record::new(
            self.id,
            Transaction {
                project_name: self.project_name,
                activity: self.activity,
                department,
                committed_budget: parse_amount(&self.committed_budget),
                actual_used: parse_amount(&self.actual_used),
                expense_category,
                remaining: parse_amount(&self.remaining),
                timestamp,
            },
        ))
    }
}

pub fn get_all_transactions(conn: &Connection) -> Result<Vec<Record<Transaction>>, StoreError> {
    let mut stmt = conn.prepare(
        "SELECT id, project_name, activity, department, committed_budget, actual_used, expense_category, remaining, timestamp
         FROM transactions ORDER BY rowid ASC",
    )?;

    let rows = stmt.query_map([], |row| {
        Ok(TransactionRow {
            id: row.get(0)?,
            project_name: row.get(1)?,
            activity: row.get(2)?,
            department: row.get(3)?,
            committed_budget: row.get(4)?,
            actual_used: row.get(5)?,
            expense_category: row.get(6)?,
            remaining: row.get(7)?,
            timestamp: row.get(8)?,
        })
    })?;

    let mut transactions = Vec::new();
    for row in rows {
        match row?.into_record() {
            Ok(record) => transactions.push(record),
            Err(e) => tracing::warn!(error = %e, "skipping unreadable budget control row"),
        }
    }
    Ok(transactions)
}

pub fn delete_transaction(conn: &Connection, id: &str) -> Result<(), StoreError> {
    let rows_affected = conn.execute("DELETE FROM transactions WHERE id = ?1", [id])?;
    if rows_affected == 0 {
        return Err(StoreError::NotFound {
            collection: Collection::Transactions,
            id: id.to_string(),
        });
    }
    Ok(())
}
