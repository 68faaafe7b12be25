//! Row counts across the whole schema

use indexmap::IndexMap;
use sqlx::{Pool, Row, Sqlite};

use crate::{
    error::{AppError, AppResult},
    models::Table,
};

#[derive(Clone)]
pub struct StatsRepository {
    pool: Pool<Sqlite>,
}

impl StatsRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    /// Count every table in one statement so all counts come from the same
    /// snapshot. Tables come back in `Table::ALL` order.
    pub async fn table_counts(&self) -> AppResult<IndexMap<Table, i64>> {
        let sql = Table::ALL
            .iter()
            .map(|t| format!("SELECT '{0}' AS name, COUNT(*) AS count FROM {0}", t.as_str()))
            .collect::<Vec<_>>()
            .join(" UNION ALL ");

        let mut tx = self.pool.begin().await?;
        let rows = sqlx::query(&sql).fetch_all(&mut *tx).await?;
        tx.commit().await?;

        let mut counts: IndexMap<Table, i64> = Table::ALL.into_iter().map(|t| (t, 0)).collect();
        for row in rows {
            let name: String = row.try_get("name")?;
            let table = Table::from_sql_name(&name)
                .ok_or_else(|| AppError::DataIntegrity(format!("Unexpected table '{}' in counts", name)))?;
            counts.insert(table, row.try_get("count")?);
        }

        Ok(counts)
    }
}
