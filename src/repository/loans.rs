//! Loans repository for database operations

use chrono::NaiveDate;
use sqlx::{Pool, Row, Sqlite, SqliteConnection};

use crate::{
    db,
    error::{AppError, AppResult},
    models::{
        item::LabelStatus,
        loan::{ActiveLoan, CreateLoan, Loan},
        Table,
    },
    rules::{self, record, store},
};

#[derive(Clone)]
pub struct LoansRepository {
    pool: Pool<Sqlite>,
}

impl LoansRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    /// Get loan by ID
    pub async fn get_by_id(&self, id: i64) -> AppResult<Loan> {
        sqlx::query_as::<_, Loan>("SELECT * FROM loans WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Loan with id {} not found", id)))
    }

    /// Full loan history of a label, oldest first
    pub async fn get_label_loans(&self, label_id: i64) -> AppResult<Vec<Loan>> {
        let loans = sqlx::query_as::<_, Loan>("SELECT * FROM loans WHERE label_id = ? ORDER BY loan_date, id")
            .bind(label_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(loans)
    }

    /// Create a new loan (check a label out to a member)
    pub async fn create(&self, loan: &CreateLoan) -> AppResult<Loan> {
        let loan_date = loan.loan_date.unwrap_or_else(rules::today);
        record::loan_dates(loan_date, loan.returned_date)?;

        let mut tx = db::begin_write(&self.pool).await?;
        store::ensure_referenced(&mut tx, Table::Members, loan.member_id).await?;
        store::ensure_referenced(&mut tx, Table::Employees, loan.employee_id).await?;
        store::ensure_referenced(&mut tx, Table::Labels, loan.label_id).await?;

        if loan.returned_date.is_none() {
            store::ensure_label_free(&mut tx, loan.label_id).await?;
        }

        let created = sqlx::query_as::<_, Loan>(
            r#"
            INSERT INTO loans (member_id, employee_id, label_id, loan_date, due_date, returned_date)
            VALUES (?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(loan.member_id)
        .bind(loan.employee_id)
        .bind(loan.label_id)
        .bind(loan_date)
        .bind(loan.due_date)
        .bind(loan.returned_date)
        .fetch_one(&mut *tx)
        .await?;

        sync_label_status(&mut tx, loan.label_id).await?;

        tx.commit().await?;
        Ok(created)
    }

    /// Close an open loan
    pub async fn return_loan(&self, id: i64, returned_date: NaiveDate) -> AppResult<Loan> {
        let mut tx = db::begin_write(&self.pool).await?;

        let loan = sqlx::query_as::<_, Loan>("SELECT * FROM loans WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Loan with id {} not found", id)))?;

        if let Some(returned) = loan.returned_date {
            return Err(AppError::constraint(
                rules::LOAN_ALREADY_RETURNED,
                format!("Loan {} was already returned on {}", id, returned),
            ));
        }
        record::loan_dates(loan.loan_date, Some(returned_date))?;

        let updated = sqlx::query_as::<_, Loan>(
            "UPDATE loans SET returned_date = ? WHERE id = ? RETURNING *",
        )
        .bind(returned_date)
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        sync_label_status(&mut tx, loan.label_id).await?;

        tx.commit().await?;
        Ok(updated)
    }

    /// All loans without a returned date, enriched with item title and member
    /// name. Dangling references and stale label statuses are reported, not
    /// skipped.
    pub async fn get_active(&self) -> AppResult<Vec<ActiveLoan>> {
        let rows = sqlx::query(
            r#"
            SELECT l.id AS loan_id, l.label_id, l.member_id, l.loan_date, l.due_date,
                   lb.id AS found_label_id, lb.status AS label_status,
                   lb.item_id, i.title,
                   m.first_name, m.last_name
            FROM loans l
            LEFT JOIN labels lb ON lb.id = l.label_id
            LEFT JOIN items i ON i.id = lb.item_id
            LEFT JOIN members m ON m.id = l.member_id
            WHERE l.returned_date IS NULL
            ORDER BY l.id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let mut result = Vec::with_capacity(rows.len());
        for row in rows {
            let loan_id: i64 = row.try_get("loan_id")?;
            let label_id: i64 = row.try_get("label_id")?;
            let member_id: i64 = row.try_get("member_id")?;

            let found_label: Option<i64> = row.try_get("found_label_id")?;
            if found_label.is_none() {
                return Err(AppError::DataIntegrity(format!(
                    "Loan {} references missing label {}",
                    loan_id, label_id
                )));
            }

            let label_status: Option<String> = row.try_get("label_status")?;
            if label_status.as_deref() != Some(LabelStatus::OnLoan.as_str()) {
                return Err(AppError::DataIntegrity(format!(
                    "Label {} has open loan {} but is stored as '{}'",
                    label_id,
                    loan_id,
                    label_status.unwrap_or_default()
                )));
            }

            let item_title: String = row
                .try_get::<Option<String>, _>("title")?
                .ok_or_else(|| {
                    AppError::DataIntegrity(format!("Label {} belongs to no existing item", label_id))
                })?;

            let first_name: Option<String> = row.try_get("first_name")?;
            let last_name: Option<String> = row.try_get("last_name")?;
            let (member_first_name, member_last_name) = match (first_name, last_name) {
                (Some(first), Some(last)) => (first, last),
                _ => {
                    return Err(AppError::DataIntegrity(format!(
                        "Loan {} references missing member {}",
                        loan_id, member_id
                    )));
                }
            };

            result.push(ActiveLoan {
                loan_id,
                label_id,
                item_title,
                member_first_name,
                member_last_name,
                loan_date: row.try_get("loan_date")?,
                due_date: row.try_get("due_date")?,
            });
        }

        Ok(result)
    }
}

/// Rewrite the cached status of a label from its loan history
async fn sync_label_status(conn: &mut SqliteConnection, label_id: i64) -> AppResult<()> {
    sqlx::query(
        r#"
        UPDATE labels
        SET status = CASE
            WHEN EXISTS (SELECT 1 FROM loans WHERE label_id = labels.id AND returned_date IS NULL)
            THEN ? ELSE ?
        END
        WHERE id = ?
        "#,
    )
    .bind(LabelStatus::OnLoan.as_str())
    .bind(LabelStatus::Available.as_str())
    .bind(label_id)
    .execute(&mut *conn)
    .await?;
    Ok(())
}
