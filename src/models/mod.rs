//! Data models for the circulation catalog

pub mod author;
pub mod item;
pub mod loan;
pub mod member;
pub mod position;
pub mod report;
pub mod table;

// Re-export commonly used types
pub use author::{Author, Genre};
pub use item::{Item, ItemDetails, Label, LabelAvailability, LabelStatus};
pub use loan::{ActiveLoan, Loan};
pub use member::Member;
pub use position::{Employee, Position, PositionNode};
pub use report::{CatalogEntry, InventoryReport, ItemGenre};
pub use table::Table;
