//! Positions and employees repository

use sqlx::{Pool, Sqlite};

use crate::{
    db,
    error::{AppError, AppResult},
    models::{
        position::{CreateEmployee, CreatePosition, Employee, Position, UpdateEmployee},
        Table,
    },
    rules::{
        self,
        record,
        store::{self, UniqueField},
    },
};

#[derive(Clone)]
pub struct StaffRepository {
    pool: Pool<Sqlite>,
}

impl StaffRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    // =========================================================================
    // POSITIONS
    // =========================================================================

    pub async fn get_position(&self, id: i64) -> AppResult<Position> {
        sqlx::query_as::<_, Position>("SELECT * FROM positions WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Position with id {} not found", id)))
    }

    pub async fn list_positions(&self) -> AppResult<Vec<Position>> {
        let positions = sqlx::query_as::<_, Position>("SELECT * FROM positions ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(positions)
    }

    /// Create a position, optionally reporting to an existing one
    pub async fn create_position(&self, position: &CreatePosition) -> AppResult<Position> {
        rules::check_fields("position", position)?;
        record::position_salary(&position.salary)?;

        let mut tx = db::begin_write(&self.pool).await?;
        if let Some(manager_id) = position.manager_id {
            store::ensure_referenced(&mut tx, Table::Positions, manager_id).await?;
        }

        let created = sqlx::query_as::<_, Position>(
            "INSERT INTO positions (title, salary, manager_id) VALUES (?, ?, ?) RETURNING *",
        )
        .bind(position.title.trim())
        .bind(position.salary.to_string())
        .bind(position.manager_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(created)
    }

    /// Set or clear the manager of a position. Fails with `CycleDetected` when
    /// the new manager is the position itself or one of its descendants.
    pub async fn set_manager(&self, id: i64, manager_id: Option<i64>) -> AppResult<Position> {
        let mut tx = db::begin_write(&self.pool).await?;
        store::ensure_found(&mut tx, Table::Positions, id).await?;

        if let Some(manager_id) = manager_id {
            store::ensure_referenced(&mut tx, Table::Positions, manager_id).await?;
            store::ensure_acyclic(&mut tx, id, manager_id).await?;
        }

        let updated = sqlx::query_as::<_, Position>(
            "UPDATE positions SET manager_id = ? WHERE id = ? RETURNING *",
        )
        .bind(manager_id)
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(updated)
    }

    /// Delete a position nobody holds and nobody reports to
    pub async fn delete_position(&self, id: i64) -> AppResult<()> {
        let mut tx = db::begin_write(&self.pool).await?;
        store::ensure_found(&mut tx, Table::Positions, id).await?;
        store::ensure_unreferenced(&mut tx, Table::Positions, id, Table::Employees, "position_id").await?;
        store::ensure_unreferenced(&mut tx, Table::Positions, id, Table::Positions, "manager_id").await?;

        sqlx::query("DELETE FROM positions WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    // =========================================================================
    // EMPLOYEES
    // =========================================================================

    fn check_employee(employee: &CreateEmployee) -> AppResult<()> {
        rules::check_fields("employee", employee)?;
        record::employee_birthdate(employee.birthdate, rules::today())?;
        record::employee_contract(employee.hired_date, employee.hired_until)
    }

    pub async fn get_employee(&self, id: i64) -> AppResult<Employee> {
        sqlx::query_as::<_, Employee>("SELECT * FROM employees WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Employee with id {} not found", id)))
    }

    pub async fn list_employees(&self) -> AppResult<Vec<Employee>> {
        let employees = sqlx::query_as::<_, Employee>("SELECT * FROM employees ORDER BY last_name, first_name, id")
            .fetch_all(&self.pool)
            .await?;
        Ok(employees)
    }

    pub async fn create_employee(&self, employee: &CreateEmployee) -> AppResult<Employee> {
        Self::check_employee(employee)?;

        let mut tx = db::begin_write(&self.pool).await?;
        store::ensure_referenced(&mut tx, Table::Positions, employee.position_id).await?;
        store::ensure_unique(&mut tx, UniqueField::EmployeeEmail, employee.email.as_deref(), None).await?;

        let created = sqlx::query_as::<_, Employee>(
            r#"
            INSERT INTO employees (
                position_id, first_name, last_name, birthdate, email, phone_number,
                contact_address, permanent_address, hired_date, hired_until, insurance
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(employee.position_id)
        .bind(employee.first_name.trim())
        .bind(employee.last_name.trim())
        .bind(employee.birthdate)
        .bind(&employee.email)
        .bind(employee.phone_number.trim())
        .bind(&employee.contact_address)
        .bind(&employee.permanent_address)
        .bind(employee.hired_date)
        .bind(employee.hired_until)
        .bind(employee.insurance)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(created)
    }

    /// Update an employee, including reassignment to another position
    pub async fn update_employee(&self, id: i64, changes: UpdateEmployee) -> AppResult<Employee> {
        let mut tx = db::begin_write(&self.pool).await?;

        let current = sqlx::query_as::<_, Employee>("SELECT * FROM employees WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Employee with id {} not found", id)))?;

        let candidate = changes.merge(current);
        Self::check_employee(&candidate)?;
        store::ensure_referenced(&mut tx, Table::Positions, candidate.position_id).await?;
        store::ensure_unique(&mut tx, UniqueField::EmployeeEmail, candidate.email.as_deref(), Some(id)).await?;

        let updated = sqlx::query_as::<_, Employee>(
            r#"
            UPDATE employees
            SET position_id = ?, first_name = ?, last_name = ?, birthdate = ?, email = ?,
                phone_number = ?, contact_address = ?, permanent_address = ?,
                hired_date = ?, hired_until = ?, insurance = ?
            WHERE id = ?
            RETURNING *
            "#,
        )
        .bind(candidate.position_id)
        .bind(candidate.first_name.trim())
        .bind(candidate.last_name.trim())
        .bind(candidate.birthdate)
        .bind(&candidate.email)
        .bind(candidate.phone_number.trim())
        .bind(&candidate.contact_address)
        .bind(&candidate.permanent_address)
        .bind(candidate.hired_date)
        .bind(candidate.hired_until)
        .bind(candidate.insurance)
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(updated)
    }

    /// Delete an employee who never handled a loan
    pub async fn delete_employee(&self, id: i64) -> AppResult<()> {
        let mut tx = db::begin_write(&self.pool).await?;
        store::ensure_found(&mut tx, Table::Employees, id).await?;
        store::ensure_unreferenced(&mut tx, Table::Employees, id, Table::Loans, "employee_id").await?;

        sqlx::query("DELETE FROM employees WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }
}
