//! Catalog queries and statistics endpoints

use axum::{extract::State, Json};

use crate::{
    error::AppResult,
    models::report::{CatalogEntry, InventoryReport, ItemGenre},
    AppState,
};

/// Every item with the last names of its authors
#[utoipa::path(
    get,
    path = "/catalog",
    tag = "stats",
    responses(
        (status = 200, description = "Catalog listing ordered by item", body = Vec<CatalogEntry>),
        (status = 500, description = "A link references a missing author", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_catalog(State(state): State<AppState>) -> AppResult<Json<Vec<CatalogEntry>>> {
    let entries = state.services.catalog.catalog_listing().await?;
    Ok(Json(entries))
}

/// One row per (item, genre) pair
#[utoipa::path(
    get,
    path = "/catalog/genres",
    tag = "stats",
    responses(
        (status = 200, description = "Item and genre pairs", body = Vec<ItemGenre>),
        (status = 500, description = "A link references a missing row", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_item_genres(State(state): State<AppState>) -> AppResult<Json<Vec<ItemGenre>>> {
    let pairs = state.services.catalog.item_genres().await?;
    Ok(Json(pairs))
}

/// Row counts per table with total and average
#[utoipa::path(
    get,
    path = "/stats/inventory",
    tag = "stats",
    responses(
        (status = 200, description = "Inventory report", body = InventoryReport)
    )
)]
pub async fn get_inventory(State(state): State<AppState>) -> AppResult<Json<InventoryReport>> {
    let report = state.services.stats.inventory().await?;
    Ok(Json(report))
}
