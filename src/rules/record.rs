//! Rules over a single candidate record

use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::*;

/// A member cannot be enrolled in the future
pub fn member_add_date(add_date: NaiveDate, today: NaiveDate) -> AppResult<()> {
    if add_date > today {
        return Err(AppError::constraint(
            MEMBER_ADD_DATE_FUTURE,
            format!("Enrollment date {} is after today ({})", add_date, today),
        ));
    }
    Ok(())
}

/// Birthdate must be strictly before today
pub fn employee_birthdate(birthdate: NaiveDate, today: NaiveDate) -> AppResult<()> {
    if birthdate >= today {
        return Err(AppError::constraint(
            EMPLOYEE_BIRTHDATE_NOT_PAST,
            format!("Birthdate {} must be before today ({})", birthdate, today),
        ));
    }
    Ok(())
}

pub fn employee_contract(hired_date: NaiveDate, hired_until: Option<NaiveDate>) -> AppResult<()> {
    match hired_until {
        Some(until) if until < hired_date => Err(AppError::constraint(
            EMPLOYEE_HIRED_UNTIL_BEFORE_HIRED,
            format!("Contract end {} is before hire date {}", until, hired_date),
        )),
        _ => Ok(()),
    }
}

/// Returned date, when set, must not precede the loan date. Late returns
/// (after the due date) are legal.
pub fn loan_dates(loan_date: NaiveDate, returned_date: Option<NaiveDate>) -> AppResult<()> {
    match returned_date {
        Some(returned) if returned < loan_date => Err(AppError::constraint(
            LOAN_RETURNED_BEFORE_LOAN,
            format!("Returned date {} is before loan date {}", returned, loan_date),
        )),
        _ => Ok(()),
    }
}

pub fn position_salary(salary: &Decimal) -> AppResult<()> {
    if *salary < Decimal::ZERO {
        return Err(AppError::constraint(
            POSITION_SALARY_NEGATIVE,
            format!("Salary {} is negative", salary),
        ));
    }
    Ok(())
}

pub fn item_pages(pages: Option<i64>) -> AppResult<()> {
    match pages {
        Some(p) if p < 0 => Err(AppError::constraint(
            ITEM_PAGES_NEGATIVE,
            format!("Page count {} is negative", p),
        )),
        _ => Ok(()),
    }
}
