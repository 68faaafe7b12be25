//! Position (staff hierarchy) and employee models

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqliteRow, FromRow, Row};
use std::str::FromStr;
use utoipa::ToSchema;
use validator::Validate;

use crate::rules::not_blank;

/// Position model from database. `manager_id` points at the position this
/// one reports to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Position {
    pub id: i64,
    pub title: String,
    #[schema(value_type = String, example = "2500.00")]
    pub salary: Decimal,
    pub manager_id: Option<i64>,
}

// Salaries are stored as TEXT to keep exact decimals
impl<'r> FromRow<'r, SqliteRow> for Position {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let salary: String = row.try_get("salary")?;
        let salary = Decimal::from_str(&salary).map_err(|e| sqlx::Error::ColumnDecode {
            index: "salary".to_string(),
            source: Box::new(e),
        })?;

        Ok(Self {
            id: row.try_get("id")?,
            title: row.try_get("title")?,
            salary,
            manager_id: row.try_get("manager_id")?,
        })
    }
}

/// Create position request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreatePosition {
    #[validate(custom(function = "not_blank"), length(max = 100))]
    pub title: String,
    #[schema(value_type = String, example = "2500.00")]
    pub salary: Decimal,
    pub manager_id: Option<i64>,
}

/// Set or clear the manager of a position
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SetManager {
    pub manager_id: Option<i64>,
}

/// A position with the positions reporting to it
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PositionNode {
    pub position: Position,
    pub reports: Vec<PositionNode>,
}

/// Full employee model from database
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Employee {
    pub id: i64,
    pub position_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub birthdate: NaiveDate,
    pub email: Option<String>,
    pub phone_number: String,
    pub contact_address: String,
    pub permanent_address: Option<String>,
    pub hired_date: NaiveDate,
    pub hired_until: Option<NaiveDate>,
    pub insurance: Option<bool>,
}

/// Create employee request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateEmployee {
    pub position_id: i64,
    #[validate(custom(function = "not_blank"), length(max = 100))]
    pub first_name: String,
    #[validate(custom(function = "not_blank"), length(max = 100))]
    pub last_name: String,
    pub birthdate: NaiveDate,
    /// Email address (optional, unique when set)
    #[validate(email, length(max = 255))]
    pub email: Option<String>,
    #[validate(custom(function = "not_blank"), length(max = 20))]
    pub phone_number: String,
    #[validate(custom(function = "not_blank"))]
    pub contact_address: String,
    pub permanent_address: Option<String>,
    pub hired_date: NaiveDate,
    pub hired_until: Option<NaiveDate>,
    pub insurance: Option<bool>,
}

/// Update employee request. Setting `position_id` reassigns the employee;
/// `null` clears a nullable field.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateEmployee {
    pub position_id: Option<i64>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub birthdate: Option<NaiveDate>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>)]
    pub email: Option<Option<String>>,
    pub phone_number: Option<String>,
    pub contact_address: Option<String>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>)]
    pub permanent_address: Option<Option<String>>,
    pub hired_date: Option<NaiveDate>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<NaiveDate>)]
    pub hired_until: Option<Option<NaiveDate>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<bool>)]
    pub insurance: Option<Option<bool>>,
}

impl UpdateEmployee {
    pub fn merge(self, current: Employee) -> CreateEmployee {
        CreateEmployee {
            position_id: self.position_id.unwrap_or(current.position_id),
            first_name: self.first_name.unwrap_or(current.first_name),
            last_name: self.last_name.unwrap_or(current.last_name),
            birthdate: self.birthdate.unwrap_or(current.birthdate),
            email: self.email.unwrap_or(current.email),
            phone_number: self.phone_number.unwrap_or(current.phone_number),
            contact_address: self.contact_address.unwrap_or(current.contact_address),
            permanent_address: self.permanent_address.unwrap_or(current.permanent_address),
            hired_date: self.hired_date.unwrap_or(current.hired_date),
            hired_until: self.hired_until.unwrap_or(current.hired_until),
            insurance: self.insurance.unwrap_or(current.insurance),
        }
    }
}
