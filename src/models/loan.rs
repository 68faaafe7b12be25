//! Loan model and related types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Loan model from database. Loans are never deleted; a loan is closed by
/// setting `returned_date`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Loan {
    pub id: i64,
    pub member_id: i64,
    pub employee_id: i64,
    pub label_id: i64,
    pub loan_date: NaiveDate,
    pub due_date: NaiveDate,
    pub returned_date: Option<NaiveDate>,
}

impl Loan {
    pub fn is_open(&self) -> bool {
        self.returned_date.is_none()
    }
}

/// Create loan (checkout) request
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateLoan {
    pub member_id: i64,
    pub employee_id: i64,
    pub label_id: i64,
    /// Defaults to today
    pub loan_date: Option<NaiveDate>,
    pub due_date: NaiveDate,
    /// Set only when recording an already completed loan
    pub returned_date: Option<NaiveDate>,
}

/// Return request
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct ReturnLoan {
    /// Defaults to today
    pub returned_date: Option<NaiveDate>,
}

/// Open loan enriched for circulation desks
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ActiveLoan {
    pub loan_id: i64,
    pub label_id: i64,
    pub item_title: String,
    pub member_first_name: String,
    pub member_last_name: String,
    pub loan_date: NaiveDate,
    pub due_date: NaiveDate,
}

impl ActiveLoan {
    pub fn member_name(&self) -> String {
        format!("{} {}", self.member_first_name, self.member_last_name)
    }
}
