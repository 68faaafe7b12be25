//! Logical tables of the circulation schema

use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, ToSchema)]
pub enum Table {
    Authors,
    Genres,
    Members,
    Positions,
    Employees,
    Items,
    #[serde(rename = "Items_Authors")]
    ItemsAuthors,
    #[serde(rename = "Items_Genres")]
    ItemsGenres,
    Labels,
    Loans,
}

impl Table {
    /// Every table, in report order
    pub const ALL: [Table; 10] = [
        Table::Authors,
        Table::Genres,
        Table::Members,
        Table::Positions,
        Table::Employees,
        Table::Items,
        Table::ItemsAuthors,
        Table::ItemsGenres,
        Table::Labels,
        Table::Loans,
    ];

    /// SQL table name
    pub fn as_str(&self) -> &'static str {
        match self {
            Table::Authors => "authors",
            Table::Genres => "genres",
            Table::Members => "members",
            Table::Positions => "positions",
            Table::Employees => "employees",
            Table::Items => "items",
            Table::ItemsAuthors => "items_authors",
            Table::ItemsGenres => "items_genres",
            Table::Labels => "labels",
            Table::Loans => "loans",
        }
    }

    /// Singular entity name used in messages
    pub fn entity(&self) -> &'static str {
        match self {
            Table::Authors => "Author",
            Table::Genres => "Genre",
            Table::Members => "Member",
            Table::Positions => "Position",
            Table::Employees => "Employee",
            Table::Items => "Item",
            Table::ItemsAuthors => "Item-author link",
            Table::ItemsGenres => "Item-genre link",
            Table::Labels => "Label",
            Table::Loans => "Loan",
        }
    }

    pub fn from_sql_name(name: &str) -> Option<Table> {
        Table::ALL.into_iter().find(|t| t.as_str() == name)
    }
}

impl std::fmt::Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
