//! Error types for the circulation server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use sqlx::error::ErrorKind;
use thiserror::Error;

use crate::rules;

/// Numeric error codes carried in every error body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ErrorCode {
    Failure = 1,
    DbFailure = 3,
    NoSuchData = 20,
    ConstraintViolation = 30,
    ReferentialIntegrity = 31,
    CycleDetected = 32,
    DataIntegrity = 33,
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    /// A scalar, temporal or uniqueness rule failed
    #[error("Constraint violation [{rule}]: {message}")]
    ConstraintViolation { rule: String, message: String },

    /// The operation would orphan a row or reference a missing one
    #[error("Referential integrity error: {0}")]
    ReferentialIntegrity(String),

    #[error("Cycle detected: position {position_id} cannot report to position {manager_id}")]
    CycleDetected { position_id: i64, manager_id: i64 },

    /// A read found stored state that breaks an invariant
    #[error("Data integrity error: {0}")]
    DataIntegrity(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Storage unavailable: {0}")]
    StorageUnavailable(sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

impl AppError {
    pub fn constraint(rule: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::ConstraintViolation {
            rule: rule.into(),
            message: message.into(),
        }
    }

    /// Rule name for constraint violations, `None` for every other class
    pub fn rule(&self) -> Option<&str> {
        match self {
            AppError::ConstraintViolation { rule, .. } => Some(rule),
            _ => None,
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            let message = db_err.message().to_string();
            match db_err.kind() {
                ErrorKind::UniqueViolation => {
                    return AppError::ConstraintViolation {
                        rule: unique_rule(&message),
                        message,
                    };
                }
                ErrorKind::ForeignKeyViolation => return AppError::ReferentialIntegrity(message),
                ErrorKind::CheckViolation => {
                    return AppError::ConstraintViolation {
                        rule: check_rule(&message),
                        message,
                    };
                }
                ErrorKind::NotNullViolation => {
                    return AppError::ConstraintViolation {
                        rule: "required".to_string(),
                        message,
                    };
                }
                _ => {}
            }
        }
        // Stored value that no longer parses (salary text, label status)
        if let sqlx::Error::ColumnDecode { index, source } = &err {
            return AppError::DataIntegrity(format!("Column {} holds an invalid value: {}", index, source));
        }
        AppError::StorageUnavailable(err)
    }
}

/// Derive a rule name from a SQLite unique-constraint message such as
/// `UNIQUE constraint failed: members.email`.
fn unique_rule(message: &str) -> String {
    let target = message
        .rsplit(": ")
        .next()
        .and_then(|cols| cols.split(',').next())
        .map(str::trim)
        .unwrap_or_default();

    match target.split_once('.') {
        Some(("loans", "label_id")) => rules::LOAN_LABEL_ON_LOAN.to_string(),
        Some((table, column)) => {
            let entity = table.strip_suffix('s').unwrap_or(table);
            format!("{}.{}.taken", entity, column)
        }
        None => "unique".to_string(),
    }
}

fn check_rule(message: &str) -> String {
    if message.contains("chk_returned_after_loan") {
        rules::LOAN_RETURNED_BEFORE_LOAN.to_string()
    } else {
        "check".to_string()
    }
}

/// Error response body
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub code: u32,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule: Option<String>,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let rule = self.rule().map(str::to_string);
        let (status, code, message) = match &self {
            AppError::ConstraintViolation { message, .. } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorCode::ConstraintViolation,
                message.clone(),
            ),
            AppError::ReferentialIntegrity(msg) => (
                StatusCode::CONFLICT,
                ErrorCode::ReferentialIntegrity,
                msg.clone(),
            ),
            AppError::CycleDetected { .. } => (
                StatusCode::CONFLICT,
                ErrorCode::CycleDetected,
                self.to_string(),
            ),
            AppError::DataIntegrity(msg) => {
                tracing::error!("Data integrity error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::DataIntegrity,
                    msg.clone(),
                )
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, ErrorCode::NoSuchData, msg.clone()),
            AppError::StorageUnavailable(e) => {
                tracing::error!("Storage error: {:?}", e);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    ErrorCode::DbFailure,
                    "Storage unavailable".to_string(),
                )
            }
            AppError::Migration(e) => {
                tracing::error!("Migration error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::Failure,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse {
            code: code as u32,
            error: format!("{:?}", code),
            rule,
            message,
        });

        (status, body).into_response()
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
