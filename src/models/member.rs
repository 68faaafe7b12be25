//! Member (borrower) model and related types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::rules::not_blank;

/// Full member model from database
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Member {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone_number: String,
    pub contact_address: Option<String>,
    /// Enrollment date, never after today
    pub add_date: NaiveDate,
}

impl Member {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Create member request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateMember {
    #[validate(custom(function = "not_blank"), length(max = 100))]
    pub first_name: String,
    #[validate(custom(function = "not_blank"), length(max = 100))]
    pub last_name: String,
    /// Email address (optional, unique when set)
    #[validate(email, length(max = 255))]
    pub email: Option<String>,
    #[validate(custom(function = "not_blank"), length(max = 20))]
    pub phone_number: String,
    pub contact_address: Option<String>,
    pub add_date: NaiveDate,
}

/// Update member request. Absent fields keep their stored value; `null`
/// clears a nullable one.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateMember {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>)]
    pub email: Option<Option<String>>,
    pub phone_number: Option<String>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>)]
    pub contact_address: Option<Option<String>>,
    pub add_date: Option<NaiveDate>,
}

impl UpdateMember {
    /// Overlay the changes on the stored member, giving the candidate record
    pub fn merge(self, current: Member) -> CreateMember {
        CreateMember {
            first_name: self.first_name.unwrap_or(current.first_name),
            last_name: self.last_name.unwrap_or(current.last_name),
            email: self.email.unwrap_or(current.email),
            phone_number: self.phone_number.unwrap_or(current.phone_number),
            contact_address: self.contact_address.unwrap_or(current.contact_address),
            add_date: self.add_date.unwrap_or(current.add_date),
        }
    }
}
