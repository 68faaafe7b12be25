//! Rules that read the store.
//!
//! All functions take the connection of the surrounding write transaction so
//! the check and the mutation it guards commit or roll back together.

use std::collections::HashSet;

use sqlx::SqliteConnection;

use super::*;
use crate::models::Table;

/// Columns carrying a global uniqueness rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueField {
    MemberEmail,
    EmployeeEmail,
    ItemCode,
}

impl UniqueField {
    fn table(&self) -> Table {
        match self {
            UniqueField::MemberEmail => Table::Members,
            UniqueField::EmployeeEmail => Table::Employees,
            UniqueField::ItemCode => Table::Items,
        }
    }

    fn column(&self) -> &'static str {
        match self {
            UniqueField::MemberEmail | UniqueField::EmployeeEmail => "email",
            UniqueField::ItemCode => "code",
        }
    }

    fn rule(&self) -> &'static str {
        match self {
            UniqueField::MemberEmail => MEMBER_EMAIL_TAKEN,
            UniqueField::EmployeeEmail => EMPLOYEE_EMAIL_TAKEN,
            UniqueField::ItemCode => ITEM_CODE_TAKEN,
        }
    }
}

/// Fail when `value` is already used by another row. Absent values never
/// collide. `exclude_id` is the row being updated.
pub async fn ensure_unique(
    conn: &mut SqliteConnection,
    field: UniqueField,
    value: Option<&str>,
    exclude_id: Option<i64>,
) -> AppResult<()> {
    let Some(value) = value else {
        return Ok(());
    };

    let sql = format!(
        "SELECT EXISTS(SELECT 1 FROM {} WHERE {} = ? AND id != ?)",
        field.table(),
        field.column()
    );
    let taken: bool = sqlx::query_scalar(&sql)
        .bind(value)
        .bind(exclude_id.unwrap_or(-1))
        .fetch_one(&mut *conn)
        .await?;

    if taken {
        return Err(AppError::constraint(
            field.rule(),
            format!("{} {} '{}' is already in use", field.table().entity(), field.column(), value),
        ));
    }
    Ok(())
}

pub async fn exists(conn: &mut SqliteConnection, table: Table, id: i64) -> AppResult<bool> {
    let sql = format!("SELECT EXISTS(SELECT 1 FROM {} WHERE id = ?)", table);
    let found: bool = sqlx::query_scalar(&sql)
        .bind(id)
        .fetch_one(&mut *conn)
        .await?;
    Ok(found)
}

/// A referenced row must exist before a reference to it is written
pub async fn ensure_referenced(conn: &mut SqliteConnection, table: Table, id: i64) -> AppResult<()> {
    if !exists(conn, table, id).await? {
        return Err(AppError::ReferentialIntegrity(format!(
            "{} {} does not exist",
            table.entity(),
            id
        )));
    }
    Ok(())
}

/// The target row of an update or delete must exist
pub async fn ensure_found(conn: &mut SqliteConnection, table: Table, id: i64) -> AppResult<()> {
    if !exists(conn, table, id).await? {
        return Err(AppError::NotFound(format!(
            "{} with id {} not found",
            table.entity(),
            id
        )));
    }
    Ok(())
}

/// Refuse to delete a row still referenced through `dependent.column`
pub async fn ensure_unreferenced(
    conn: &mut SqliteConnection,
    target: Table,
    id: i64,
    dependent: Table,
    column: &str,
) -> AppResult<()> {
    let sql = format!("SELECT COUNT(*) FROM {} WHERE {} = ?", dependent, column);
    let count: i64 = sqlx::query_scalar(&sql)
        .bind(id)
        .fetch_one(&mut *conn)
        .await?;

    if count > 0 {
        return Err(AppError::ReferentialIntegrity(format!(
            "{} {} is referenced by {} row(s) of {}",
            target.entity(),
            id,
            count,
            dependent
        )));
    }
    Ok(())
}

/// A label can carry at most one open loan
pub async fn ensure_label_free(conn: &mut SqliteConnection, label_id: i64) -> AppResult<()> {
    let on_loan: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM loans WHERE label_id = ? AND returned_date IS NULL)",
    )
    .bind(label_id)
    .fetch_one(&mut *conn)
    .await?;

    if on_loan {
        return Err(AppError::constraint(
            LOAN_LABEL_ON_LOAN,
            format!("Label {} is already on loan", label_id),
        ));
    }
    Ok(())
}

/// Walk the manager chain upward from `manager_id`; reaching `position_id`
/// means the new edge would close a cycle.
pub async fn ensure_acyclic(
    conn: &mut SqliteConnection,
    position_id: i64,
    manager_id: i64,
) -> AppResult<()> {
    let mut visited = HashSet::new();
    let mut cursor = Some(manager_id);

    while let Some(current) = cursor {
        if current == position_id {
            return Err(AppError::CycleDetected {
                position_id,
                manager_id,
            });
        }
        if !visited.insert(current) {
            return Err(AppError::DataIntegrity(format!(
                "Stored position hierarchy already contains a cycle through position {}",
                current
            )));
        }

        cursor = sqlx::query_scalar::<_, Option<i64>>("SELECT manager_id FROM positions WHERE id = ?")
            .bind(current)
            .fetch_optional(&mut *conn)
            .await?
            .ok_or_else(|| {
                AppError::ReferentialIntegrity(format!("Position {} does not exist", current))
            })?;
    }

    Ok(())
}
