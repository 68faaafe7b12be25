//! Loan management endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::loan::{ActiveLoan, CreateLoan, Loan, ReturnLoan},
    AppState,
};

/// Check a label out to a member
#[utoipa::path(
    post,
    path = "/loans",
    tag = "loans",
    request_body = CreateLoan,
    responses(
        (status = 201, description = "Loan created", body = Loan),
        (status = 409, description = "Member, employee or label does not exist", body = crate::error::ErrorResponse),
        (status = 422, description = "Label already on loan or dates out of order", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_loan(
    State(state): State<AppState>,
    Json(loan): Json<CreateLoan>,
) -> AppResult<(StatusCode, Json<Loan>)> {
    let created = state.services.loans.create_loan(loan).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    get,
    path = "/loans/{id}",
    tag = "loans",
    params(
        ("id" = i64, Path, description = "Loan ID")
    ),
    responses(
        (status = 200, description = "Loan details", body = Loan),
        (status = 404, description = "Loan not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_loan(State(state): State<AppState>, Path(id): Path<i64>) -> AppResult<Json<Loan>> {
    let loan = state.services.loans.get_loan(id).await?;
    Ok(Json(loan))
}

/// Return a borrowed label. An empty body returns it today.
#[utoipa::path(
    post,
    path = "/loans/{id}/return",
    tag = "loans",
    params(
        ("id" = i64, Path, description = "Loan ID")
    ),
    request_body = ReturnLoan,
    responses(
        (status = 200, description = "Loan closed", body = Loan),
        (status = 404, description = "Loan not found", body = crate::error::ErrorResponse),
        (status = 422, description = "Already returned or returned before loan date", body = crate::error::ErrorResponse)
    )
)]
pub async fn return_loan(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    request: Option<Json<ReturnLoan>>,
) -> AppResult<Json<Loan>> {
    let returned_date = request.and_then(|Json(r)| r.returned_date);
    let loan = state.services.loans.return_loan(id, returned_date).await?;
    Ok(Json(loan))
}

/// Every open loan with item title and member name
#[utoipa::path(
    get,
    path = "/loans/active",
    tag = "loans",
    responses(
        (status = 200, description = "Open loans", body = Vec<ActiveLoan>),
        (status = 500, description = "A loan references missing rows", body = crate::error::ErrorResponse)
    )
)]
pub async fn active_loans(State(state): State<AppState>) -> AppResult<Json<Vec<ActiveLoan>>> {
    let loans = state.services.loans.active_loans().await?;
    Ok(Json(loans))
}
