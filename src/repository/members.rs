//! Members repository for database operations

use sqlx::{Pool, Sqlite};

use crate::{
    db,
    error::{AppError, AppResult},
    models::{
        member::{CreateMember, Member, UpdateMember},
        Table,
    },
    rules::{
        self,
        record,
        store::{self, UniqueField},
    },
};

#[derive(Clone)]
pub struct MembersRepository {
    pool: Pool<Sqlite>,
}

impl MembersRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    fn check(member: &CreateMember) -> AppResult<()> {
        rules::check_fields("member", member)?;
        record::member_add_date(member.add_date, rules::today())
    }

    /// Get member by ID
    pub async fn get_by_id(&self, id: i64) -> AppResult<Member> {
        sqlx::query_as::<_, Member>("SELECT * FROM members WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Member with id {} not found", id)))
    }

    pub async fn list(&self) -> AppResult<Vec<Member>> {
        let members = sqlx::query_as::<_, Member>("SELECT * FROM members ORDER BY last_name, first_name, id")
            .fetch_all(&self.pool)
            .await?;
        Ok(members)
    }

    /// Create a new member
    pub async fn create(&self, member: &CreateMember) -> AppResult<Member> {
        Self::check(member)?;

        let mut tx = db::begin_write(&self.pool).await?;
        store::ensure_unique(&mut tx, UniqueField::MemberEmail, member.email.as_deref(), None).await?;

        let created = sqlx::query_as::<_, Member>(
            r#"
            INSERT INTO members (first_name, last_name, email, phone_number, contact_address, add_date)
            VALUES (?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(member.first_name.trim())
        .bind(member.last_name.trim())
        .bind(&member.email)
        .bind(member.phone_number.trim())
        .bind(&member.contact_address)
        .bind(member.add_date)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(created)
    }

    /// Update a member; the merged record is re-checked against every rule
    pub async fn update(&self, id: i64, changes: UpdateMember) -> AppResult<Member> {
        let mut tx = db::begin_write(&self.pool).await?;

        let current = sqlx::query_as::<_, Member>("SELECT * FROM members WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Member with id {} not found", id)))?;

        let candidate = changes.merge(current);
        Self::check(&candidate)?;
        store::ensure_unique(&mut tx, UniqueField::MemberEmail, candidate.email.as_deref(), Some(id)).await?;

        let updated = sqlx::query_as::<_, Member>(
            r#"
            UPDATE members
            SET first_name = ?, last_name = ?, email = ?, phone_number = ?,
                contact_address = ?, add_date = ?
            WHERE id = ?
            RETURNING *
            "#,
        )
        .bind(candidate.first_name.trim())
        .bind(candidate.last_name.trim())
        .bind(&candidate.email)
        .bind(candidate.phone_number.trim())
        .bind(&candidate.contact_address)
        .bind(candidate.add_date)
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(updated)
    }

    /// Delete a member without loan history
    pub async fn delete(&self, id: i64) -> AppResult<()> {
        let mut tx = db::begin_write(&self.pool).await?;
        store::ensure_found(&mut tx, Table::Members, id).await?;
        store::ensure_unreferenced(&mut tx, Table::Members, id, Table::Loans, "member_id").await?;

        sqlx::query("DELETE FROM members WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }
}
