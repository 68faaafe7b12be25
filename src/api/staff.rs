//! Position and employee endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::position::{
        CreateEmployee, CreatePosition, Employee, Position, PositionNode, SetManager, UpdateEmployee,
    },
    AppState,
};

/// Create a position
#[utoipa::path(
    post,
    path = "/positions",
    tag = "staff",
    request_body = CreatePosition,
    responses(
        (status = 201, description = "Position created", body = Position),
        (status = 409, description = "Manager position does not exist", body = crate::error::ErrorResponse),
        (status = 422, description = "Blank title or negative salary", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_position(
    State(state): State<AppState>,
    Json(position): Json<CreatePosition>,
) -> AppResult<(StatusCode, Json<Position>)> {
    let created = state.services.staff.create_position(position).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    get,
    path = "/positions/{id}",
    tag = "staff",
    params(
        ("id" = i64, Path, description = "Position ID")
    ),
    responses(
        (status = 200, description = "Position details", body = Position),
        (status = 404, description = "Position not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_position(State(state): State<AppState>, Path(id): Path<i64>) -> AppResult<Json<Position>> {
    let position = state.services.staff.get_position(id).await?;
    Ok(Json(position))
}

/// Position forest: roots have no manager, reports are ordered by id
#[utoipa::path(
    get,
    path = "/positions/hierarchy",
    tag = "staff",
    responses(
        (status = 200, description = "Position hierarchy", body = Vec<PositionNode>),
        (status = 500, description = "Stored hierarchy is inconsistent", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_hierarchy(State(state): State<AppState>) -> AppResult<Json<Vec<PositionNode>>> {
    let forest = state.services.staff.hierarchy().await?;
    Ok(Json(forest))
}

/// Set or clear the manager of a position
#[utoipa::path(
    put,
    path = "/positions/{id}/manager",
    tag = "staff",
    params(
        ("id" = i64, Path, description = "Position ID")
    ),
    request_body = SetManager,
    responses(
        (status = 200, description = "Manager updated", body = Position),
        (status = 404, description = "Position not found", body = crate::error::ErrorResponse),
        (status = 409, description = "Missing manager or cycle", body = crate::error::ErrorResponse)
    )
)]
pub async fn set_manager(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<SetManager>,
) -> AppResult<Json<Position>> {
    let updated = state.services.staff.set_manager(id, request.manager_id).await?;
    Ok(Json(updated))
}

#[utoipa::path(
    delete,
    path = "/positions/{id}",
    tag = "staff",
    params(
        ("id" = i64, Path, description = "Position ID")
    ),
    responses(
        (status = 204, description = "Position deleted"),
        (status = 404, description = "Position not found", body = crate::error::ErrorResponse),
        (status = 409, description = "Position is held or managed", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_position(State(state): State<AppState>, Path(id): Path<i64>) -> AppResult<StatusCode> {
    state.services.staff.delete_position(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// List employees
#[utoipa::path(
    get,
    path = "/employees",
    tag = "staff",
    responses(
        (status = 200, description = "Employees ordered by name", body = Vec<Employee>)
    )
)]
pub async fn list_employees(State(state): State<AppState>) -> AppResult<Json<Vec<Employee>>> {
    let employees = state.services.staff.list_employees().await?;
    Ok(Json(employees))
}

/// Hire an employee into a position
#[utoipa::path(
    post,
    path = "/employees",
    tag = "staff",
    request_body = CreateEmployee,
    responses(
        (status = 201, description = "Employee created", body = Employee),
        (status = 409, description = "Position does not exist", body = crate::error::ErrorResponse),
        (status = 422, description = "A field or date rule failed", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_employee(
    State(state): State<AppState>,
    Json(employee): Json<CreateEmployee>,
) -> AppResult<(StatusCode, Json<Employee>)> {
    let created = state.services.staff.create_employee(employee).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    get,
    path = "/employees/{id}",
    tag = "staff",
    params(
        ("id" = i64, Path, description = "Employee ID")
    ),
    responses(
        (status = 200, description = "Employee details", body = Employee),
        (status = 404, description = "Employee not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_employee(State(state): State<AppState>, Path(id): Path<i64>) -> AppResult<Json<Employee>> {
    let employee = state.services.staff.get_employee(id).await?;
    Ok(Json(employee))
}

#[utoipa::path(
    put,
    path = "/employees/{id}",
    tag = "staff",
    params(
        ("id" = i64, Path, description = "Employee ID")
    ),
    request_body = UpdateEmployee,
    responses(
        (status = 200, description = "Employee updated", body = Employee),
        (status = 404, description = "Employee not found", body = crate::error::ErrorResponse),
        (status = 409, description = "Position does not exist", body = crate::error::ErrorResponse),
        (status = 422, description = "A field or date rule failed", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_employee(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(changes): Json<UpdateEmployee>,
) -> AppResult<Json<Employee>> {
    let updated = state.services.staff.update_employee(id, changes).await?;
    Ok(Json(updated))
}

#[utoipa::path(
    delete,
    path = "/employees/{id}",
    tag = "staff",
    params(
        ("id" = i64, Path, description = "Employee ID")
    ),
    responses(
        (status = 204, description = "Employee deleted"),
        (status = 404, description = "Employee not found", body = crate::error::ErrorResponse),
        (status = 409, description = "Employee handled loans", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_employee(State(state): State<AppState>, Path(id): Path<i64>) -> AppResult<StatusCode> {
    state.services.staff.delete_employee(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
