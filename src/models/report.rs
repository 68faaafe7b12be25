//! Read-side rows: catalog listing, genre join and the inventory report

use indexmap::IndexMap;
use serde::Serialize;
use utoipa::ToSchema;

use super::Table;

/// Number of logical tables the inventory average is taken over
pub const TOTAL_TABLES: usize = 9;

/// One item with the last names of its authors, in link order
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct CatalogEntry {
    pub item_id: i64,
    pub title: String,
    pub authors: Vec<String>,
}

/// One (item, genre) pair
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ItemGenre {
    pub item_id: i64,
    pub title: String,
    pub genre_id: i64,
    pub genre_name: String,
}

/// Row counts for every table plus derived totals
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct InventoryReport {
    #[schema(value_type = Object)]
    pub tables: IndexMap<Table, i64>,
    pub total_records: i64,
    pub total_tables: usize,
    pub average_records_per_table: f64,
}

impl InventoryReport {
    pub fn from_counts(tables: IndexMap<Table, i64>) -> Self {
        let total_records: i64 = tables.values().sum();
        Self {
            average_records_per_table: total_records as f64 / TOTAL_TABLES as f64,
            total_records,
            total_tables: TOTAL_TABLES,
            tables,
        }
    }
}
