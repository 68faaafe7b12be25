//! Catalog item, link and label endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::{
        item::{CreateItem, Item, ItemDetails, Label, LabelAvailability, UpdateItem},
        loan::Loan,
    },
    AppState,
};

/// Create a catalog item
#[utoipa::path(
    post,
    path = "/items",
    tag = "items",
    request_body = CreateItem,
    responses(
        (status = 201, description = "Item created", body = Item),
        (status = 422, description = "Blank title, negative pages or code in use", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_item(
    State(state): State<AppState>,
    Json(item): Json<CreateItem>,
) -> AppResult<(StatusCode, Json<Item>)> {
    let created = state.services.catalog.create_item(item).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Get an item with its authors, genres and labels
#[utoipa::path(
    get,
    path = "/items/{id}",
    tag = "items",
    params(
        ("id" = i64, Path, description = "Item ID")
    ),
    responses(
        (status = 200, description = "Item details", body = ItemDetails),
        (status = 404, description = "Item not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_item(State(state): State<AppState>, Path(id): Path<i64>) -> AppResult<Json<ItemDetails>> {
    let item = state.services.catalog.get_item_details(id).await?;
    Ok(Json(item))
}

#[utoipa::path(
    put,
    path = "/items/{id}",
    tag = "items",
    params(
        ("id" = i64, Path, description = "Item ID")
    ),
    request_body = UpdateItem,
    responses(
        (status = 200, description = "Item updated", body = Item),
        (status = 404, description = "Item not found", body = crate::error::ErrorResponse),
        (status = 422, description = "Blank title, negative pages or code in use", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_item(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(changes): Json<UpdateItem>,
) -> AppResult<Json<Item>> {
    let updated = state.services.catalog.update_item(id, changes).await?;
    Ok(Json(updated))
}

/// Delete an item together with its labels
#[utoipa::path(
    delete,
    path = "/items/{id}",
    tag = "items",
    params(
        ("id" = i64, Path, description = "Item ID")
    ),
    responses(
        (status = 204, description = "Item deleted"),
        (status = 404, description = "Item not found", body = crate::error::ErrorResponse),
        (status = 409, description = "A label of the item has loans", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_item(State(state): State<AppState>, Path(id): Path<i64>) -> AppResult<StatusCode> {
    state.services.catalog.delete_item(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Link an author to an item (idempotent)
#[utoipa::path(
    put,
    path = "/items/{id}/authors/{author_id}",
    tag = "items",
    params(
        ("id" = i64, Path, description = "Item ID"),
        ("author_id" = i64, Path, description = "Author ID")
    ),
    responses(
        (status = 204, description = "Author linked"),
        (status = 409, description = "Item or author does not exist", body = crate::error::ErrorResponse)
    )
)]
pub async fn link_author(
    State(state): State<AppState>,
    Path((id, author_id)): Path<(i64, i64)>,
) -> AppResult<StatusCode> {
    state.services.catalog.link_author(id, author_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    delete,
    path = "/items/{id}/authors/{author_id}",
    tag = "items",
    params(
        ("id" = i64, Path, description = "Item ID"),
        ("author_id" = i64, Path, description = "Author ID")
    ),
    responses(
        (status = 204, description = "Link removed or absent")
    )
)]
pub async fn unlink_author(
    State(state): State<AppState>,
    Path((id, author_id)): Path<(i64, i64)>,
) -> AppResult<StatusCode> {
    state.services.catalog.unlink_author(id, author_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Link a genre to an item (idempotent)
#[utoipa::path(
    put,
    path = "/items/{id}/genres/{genre_id}",
    tag = "items",
    params(
        ("id" = i64, Path, description = "Item ID"),
        ("genre_id" = i64, Path, description = "Genre ID")
    ),
    responses(
        (status = 204, description = "Genre linked"),
        (status = 409, description = "Item or genre does not exist", body = crate::error::ErrorResponse)
    )
)]
pub async fn link_genre(
    State(state): State<AppState>,
    Path((id, genre_id)): Path<(i64, i64)>,
) -> AppResult<StatusCode> {
    state.services.catalog.link_genre(id, genre_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    delete,
    path = "/items/{id}/genres/{genre_id}",
    tag = "items",
    params(
        ("id" = i64, Path, description = "Item ID"),
        ("genre_id" = i64, Path, description = "Genre ID")
    ),
    responses(
        (status = 204, description = "Link removed or absent")
    )
)]
pub async fn unlink_genre(
    State(state): State<AppState>,
    Path((id, genre_id)): Path<(i64, i64)>,
) -> AppResult<StatusCode> {
    state.services.catalog.unlink_genre(id, genre_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Register a new label (physical copy) for an item
#[utoipa::path(
    post,
    path = "/items/{id}/labels",
    tag = "labels",
    params(
        ("id" = i64, Path, description = "Item ID")
    ),
    responses(
        (status = 201, description = "Label created", body = Label),
        (status = 409, description = "Item does not exist", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_label(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<(StatusCode, Json<Label>)> {
    let label = state.services.catalog.create_label(id).await?;
    Ok((StatusCode::CREATED, Json(label)))
}

#[utoipa::path(
    get,
    path = "/labels/{id}",
    tag = "labels",
    params(
        ("id" = i64, Path, description = "Label ID")
    ),
    responses(
        (status = 200, description = "Label details", body = Label),
        (status = 404, description = "Label not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_label(State(state): State<AppState>, Path(id): Path<i64>) -> AppResult<Json<Label>> {
    let label = state.services.catalog.get_label(id).await?;
    Ok(Json(label))
}

/// Retire a label that never circulated
#[utoipa::path(
    delete,
    path = "/labels/{id}",
    tag = "labels",
    params(
        ("id" = i64, Path, description = "Label ID")
    ),
    responses(
        (status = 204, description = "Label retired"),
        (status = 404, description = "Label not found", body = crate::error::ErrorResponse),
        (status = 409, description = "Label has loan history", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_label(State(state): State<AppState>, Path(id): Path<i64>) -> AppResult<StatusCode> {
    state.services.catalog.delete_label(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Stored status of a label checked against its loan history
#[utoipa::path(
    get,
    path = "/labels/{id}/availability",
    tag = "labels",
    params(
        ("id" = i64, Path, description = "Label ID")
    ),
    responses(
        (status = 200, description = "Label availability", body = LabelAvailability),
        (status = 404, description = "Label not found", body = crate::error::ErrorResponse),
        (status = 500, description = "Stored status disagrees with loans", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_label_availability(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<LabelAvailability>> {
    let availability = state.services.catalog.label_availability(id).await?;
    Ok(Json(availability))
}

/// Loan history of a label, oldest first
#[utoipa::path(
    get,
    path = "/labels/{id}/loans",
    tag = "labels",
    params(
        ("id" = i64, Path, description = "Label ID")
    ),
    responses(
        (status = 200, description = "Loans of the label", body = Vec<Loan>),
        (status = 404, description = "Label not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_label_loans(State(state): State<AppState>, Path(id): Path<i64>) -> AppResult<Json<Vec<Loan>>> {
    let loans = state.services.loans.loan_history(id).await?;
    Ok(Json(loans))
}

/// Check every label's stored status against its loan history
#[utoipa::path(
    get,
    path = "/labels/audit",
    tag = "labels",
    responses(
        (status = 200, description = "All labels are consistent", body = Vec<LabelAvailability>),
        (status = 500, description = "A stored status disagrees with loans", body = crate::error::ErrorResponse)
    )
)]
pub async fn audit_labels(State(state): State<AppState>) -> AppResult<Json<Vec<LabelAvailability>>> {
    let labels = state.services.catalog.audit_label_statuses().await?;
    Ok(Json(labels))
}
