//! Item (catalog work) and label (physical copy) models

use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqliteRow, FromRow, Row};
use std::{fmt, str::FromStr};
use thiserror::Error;
use utoipa::ToSchema;
use validator::Validate;

use super::{Author, Genre};
use crate::rules::not_blank;

/// Full item model from database
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Item {
    pub id: i64,
    pub title: String,
    #[serde(rename = "type")]
    pub item_type: Option<String>,
    pub publisher: Option<String>,
    pub language: Option<String>,
    /// Catalog code, unique when set
    pub code: Option<String>,
    pub pages: Option<i64>,
}

/// Item with its associations
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ItemDetails {
    pub item: Item,
    /// Authors in link order
    pub authors: Vec<Author>,
    pub genres: Vec<Genre>,
    pub labels: Vec<Label>,
}

/// Create item request
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct CreateItem {
    #[validate(custom(function = "not_blank"), length(max = 255))]
    pub title: String,
    #[serde(rename = "type")]
    #[validate(length(max = 50))]
    pub item_type: Option<String>,
    #[validate(length(max = 100))]
    pub publisher: Option<String>,
    #[validate(length(max = 50))]
    pub language: Option<String>,
    #[validate(length(min = 1, max = 20))]
    pub code: Option<String>,
    pub pages: Option<i64>,
}

/// Update item request. Absent fields keep their stored value; `null`
/// clears a nullable one.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateItem {
    pub title: Option<String>,
    #[serde(rename = "type", default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>)]
    pub item_type: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>)]
    pub publisher: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>)]
    pub language: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>)]
    pub code: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<i64>)]
    pub pages: Option<Option<i64>>,
}

impl UpdateItem {
    pub fn merge(self, current: Item) -> CreateItem {
        CreateItem {
            title: self.title.unwrap_or(current.title),
            item_type: self.item_type.unwrap_or(current.item_type),
            publisher: self.publisher.unwrap_or(current.publisher),
            language: self.language.unwrap_or(current.language),
            code: self.code.unwrap_or(current.code),
            pages: self.pages.unwrap_or(current.pages),
        }
    }
}

/// Circulation status of a label.
///
/// Loan history is the source of truth; the stored column mirrors it and is
/// rewritten with every loan change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
pub enum LabelStatus {
    #[default]
    Available,
    #[serde(rename = "On loan")]
    OnLoan,
}

impl LabelStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LabelStatus::Available => "Available",
            LabelStatus::OnLoan => "On loan",
        }
    }

    /// Status implied by the number of open loans
    pub fn from_open_loans(open_loans: i64) -> Self {
        if open_loans > 0 {
            LabelStatus::OnLoan
        } else {
            LabelStatus::Available
        }
    }
}

impl fmt::Display for LabelStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("unknown label status '{0}'")]
pub struct UnknownLabelStatus(pub String);

impl FromStr for LabelStatus {
    type Err = UnknownLabelStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Available" => Ok(LabelStatus::Available),
            "On loan" => Ok(LabelStatus::OnLoan),
            other => Err(UnknownLabelStatus(other.to_string())),
        }
    }
}

/// Label (physical, loanable copy of an item)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Label {
    pub id: i64,
    pub item_id: i64,
    pub status: LabelStatus,
}

impl<'r> FromRow<'r, SqliteRow> for Label {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let status: String = row.try_get("status")?;
        let status = status.parse().map_err(|e| sqlx::Error::ColumnDecode {
            index: "status".to_string(),
            source: Box::new(e),
        })?;

        Ok(Self {
            id: row.try_get("id")?,
            item_id: row.try_get("item_id")?,
            status,
        })
    }
}

/// Stored label status next to the status derived from loan history
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct LabelAvailability {
    pub label_id: i64,
    pub item_id: i64,
    pub stored_status: LabelStatus,
    pub open_loans: i64,
    pub available: bool,
}
