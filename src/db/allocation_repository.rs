use crate::error::StoreError;
use crate::models::allocation::Allocation;
use crate::models::amount::parse_amount;
use crate::models::department::Department;
use crate::models::record::Record;
use crate::store::Collection;
use rusqlite::Connection;

pub fn insert_allocation(conn: &Connection, id: &str, allocation: &Allocation) -> Result<(), StoreError> {
    conn.execute(
        "INSERT INTO allocations (id, plan, output, main_activity, project_name, department, budget, project_code, budget_code)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        rusqlite::params![
            id,
            &allocation.plan,
            &allocation.output,
            &allocation.main_activity,
            &allocation.project_name,
            allocation.department.code(),
            allocation.budget.to_string(),
            &allocation.project_code,
            &allocation.budget_code,
        ],
    )?;
    Ok(())
}

/// Overwrites every field of the record, creating it when the id is unknown.
pub fn replace_allocation(conn: &Connection, id: &str, allocation: &Allocation) -> Result<(), StoreError> {
    conn.execute(
        "INSERT INTO allocations (id, plan, output, main_activity, project_name, department, budget, project_code, budget_code)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
         ON CONFLICT(id) DO UPDATE SET
            plan = excluded.plan,
            output = excluded.output,
            main_activity = excluded.main_activity,
            project_name = excluded.project_name,
            department = excluded.department,
            budget = excluded.budget,
            project_code = excluded.project_code,
            budget_code = excluded.budget_code",
        rusqlite::params![
            id,
            &allocation.plan,
            &allocation.output,
            &allocation.main_activity,
            &allocation.project_name,
            allocation.department.code(),
            allocation.budget.to_string(),
            &allocation.project_code,
            &allocation.budget_code,
        ],
    )?;
    Ok(())
}

struct AllocationRow {
    id: String,
    plan: String,
    output: String,
    main_activity: String,
    project_name: String,
    department: String,
    budget: String,
    project_code: String,
    budget_code: String,
}

impl AllocationRow {
    fn into_record(self) -> Result<Record<Allocation>, StoreError> {
        let Some(department) = Department::from_code(&self.department) else {
            return Err(StoreError::Corrupt {
                collection: Collection::Allocations,
                id: self.id,
                reason: format!("unknown department '{}'", self.department),
            });
        };
        Ok(Record::new(
            self.id,
            Allocation {
                plan: self.plan,
                output: self.output,
                main_activity: self.main_activity,
                project_name: self.project_name,
                department,
                budget: parse_amount(&self.budget),
                project_code: self.project_code,
                budget_code: self.budget_code,
            },
        ))
    }
}

pub fn get_all_allocations(conn: &Connection) -> Result<Vec<Record<Allocation>>, StoreError> {
    let mut stmt = conn.prepare(
        "SELECT id, plan, output, main_activity, project_name, department, budget, project_code, budget_code
         FROM allocations ORDER BY rowid ASC",
    )?;

    let rows = stmt.query_map([], |row| {
        Ok(AllocationRow {
            id: row.get(0)?,
            plan: row.get(1)?,
            output: row.get(2)?,
            main_activity: row.get(3)?,
            project_name: row.get(4)?,
            department: row.get(5)?,
            budget: row.get(6)?,
            project_code: row.get(7)?,
            budget_code: row.get(8)?,
        })
    })?;

    let mut allocations = Vec::new();
    for row in rows {
        match row?.into_record() {
            Ok(record) => allocations.push(record),
            Err(e) => tracing::warn!(error = %e, "skipping unreadable allocation row"),
        }
    }
    Ok(allocations)
}

pub fn delete_allocation(conn: &Connection, id: &str) -> Result<(), StoreError> {
    let rows_affected = conn.execute("DELETE FROM allocations WHERE id = ?1", [id])?;
    if rows_affected == 0 {
        return Err(StoreError::NotFound {
            collection: Collection::Allocations,
            id: id.to_string(),
        });
    }
    Ok(())
}
