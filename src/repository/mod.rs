//! Repository layer for database operations

pub mod authors;
pub mod items;
pub mod loans;
pub mod members;
pub mod staff;
pub mod stats;

use sqlx::{Pool, Sqlite};

/// Main repository struct holding one repository per aggregate
#[derive(Clone)]
pub struct Repository {
    pub authors: authors::AuthorsRepository,
    pub genres: authors::GenresRepository,
    pub members: members::MembersRepository,
    pub staff: staff::StaffRepository,
    pub items: items::ItemsRepository,
    pub loans: loans::LoansRepository,
    pub stats: stats::StatsRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self {
            authors: authors::AuthorsRepository::new(pool.clone()),
            genres: authors::GenresRepository::new(pool.clone()),
            members: members::MembersRepository::new(pool.clone()),
            staff: staff::StaffRepository::new(pool.clone()),
            items: items::ItemsRepository::new(pool.clone()),
            loans: loans::LoansRepository::new(pool.clone()),
            stats: stats::StatsRepository::new(pool),
        }
    }
}
