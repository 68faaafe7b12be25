//! Statistics service

use crate::{error::AppResult, models::report::InventoryReport, repository::Repository};

#[derive(Clone)]
pub struct StatsService {
    repository: Repository,
}

impl StatsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Row counts per table with total and average
    pub async fn inventory(&self) -> AppResult<InventoryReport> {
        let counts = self.repository.stats.table_counts().await?;
        let report = InventoryReport::from_counts(counts);
        tracing::debug!(
            "Inventory: {} record(s), {:.2} per table",
            report.total_records,
            report.average_records_per_table
        );
        Ok(report)
    }
}
