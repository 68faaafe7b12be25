//! Integrity rules gating every write.
//!
//! Record rules ([`record`]) look only at the candidate; store rules
//! ([`store`]) also read the database and must run on the connection of the
//! write transaction they guard.

pub mod record;
pub mod store;

use chrono::{NaiveDate, Utc};
use validator::{Validate, ValidationError, ValidationErrors};

use crate::error::{AppError, AppResult};

pub const MEMBER_ADD_DATE_FUTURE: &str = "member.add_date.future";
pub const MEMBER_EMAIL_TAKEN: &str = "member.email.taken";
pub const EMPLOYEE_BIRTHDATE_NOT_PAST: &str = "employee.birthdate.not_past";
pub const EMPLOYEE_HIRED_UNTIL_BEFORE_HIRED: &str = "employee.hired_until.before_hired";
pub const EMPLOYEE_EMAIL_TAKEN: &str = "employee.email.taken";
pub const POSITION_SALARY_NEGATIVE: &str = "position.salary.negative";
pub const ITEM_CODE_TAKEN: &str = "item.code.taken";
pub const ITEM_PAGES_NEGATIVE: &str = "item.pages.negative";
pub const LOAN_RETURNED_BEFORE_LOAN: &str = "loan.returned_before_loan";
pub const LOAN_LABEL_ON_LOAN: &str = "loan.label_on_loan";
pub const LOAN_ALREADY_RETURNED: &str = "loan.already_returned";

/// Current date used by the temporal rules
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Validator hook for required text columns
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("required"));
    }
    Ok(())
}

/// Run the field-level checks of a payload, reporting the first failure as
/// `<entity>.<field>.<code>`.
pub fn check_fields<T: Validate>(entity: &str, payload: &T) -> AppResult<()> {
    payload
        .validate()
        .map_err(|errors| field_violation(entity, &errors))
}

fn field_violation(entity: &str, errors: &ValidationErrors) -> AppError {
    let mut failures = Vec::new();
    for (field, field_errors) in errors.field_errors() {
        for error in field_errors.iter() {
            failures.push((field.to_string(), error.code.to_string()));
        }
    }
    // field_errors() is a HashMap; sort so the reported rule is stable
    failures.sort();

    match failures.into_iter().next() {
        Some((field, code)) => AppError::constraint(
            format!("{}.{}.{}", entity, field, code),
            format!("{} {} is invalid ({})", entity, field, code),
        ),
        None => AppError::constraint(format!("{}.invalid", entity), errors.to_string()),
    }
}
