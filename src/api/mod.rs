//! API handlers for the circulation REST endpoints

pub mod authors;
pub mod health;
pub mod items;
pub mod loans;
pub mod members;
pub mod openapi;
pub mod staff;
pub mod stats;

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::AppState;

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // API v1 routes
    let api_v1 = Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Authors & genres
        .route("/authors", get(authors::list_authors))
        .route("/authors", post(authors::create_author))
        .route("/authors/:id", get(authors::get_author))
        .route("/authors/:id", delete(authors::delete_author))
        .route("/genres", get(authors::list_genres))
        .route("/genres", post(authors::create_genre))
        .route("/genres/:id", get(authors::get_genre))
        .route("/genres/:id", delete(authors::delete_genre))
        // Members
        .route("/members", get(members::list_members))
        .route("/members", post(members::create_member))
        .route("/members/:id", get(members::get_member))
        .route("/members/:id", put(members::update_member))
        .route("/members/:id", delete(members::delete_member))
        // Positions
        .route("/positions", post(staff::create_position))
        .route("/positions/hierarchy", get(staff::get_hierarchy))
        .route("/positions/:id", get(staff::get_position))
        .route("/positions/:id", delete(staff::delete_position))
        .route("/positions/:id/manager", put(staff::set_manager))
        // Employees
        .route("/employees", get(staff::list_employees))
        .route("/employees", post(staff::create_employee))
        .route("/employees/:id", get(staff::get_employee))
        .route("/employees/:id", put(staff::update_employee))
        .route("/employees/:id", delete(staff::delete_employee))
        // Items (catalog)
        .route("/items", post(items::create_item))
        .route("/items/:id", get(items::get_item))
        .route("/items/:id", put(items::update_item))
        .route("/items/:id", delete(items::delete_item))
        .route("/items/:id/authors/:author_id", put(items::link_author))
        .route("/items/:id/authors/:author_id", delete(items::unlink_author))
        .route("/items/:id/genres/:genre_id", put(items::link_genre))
        .route("/items/:id/genres/:genre_id", delete(items::unlink_genre))
        .route("/items/:id/labels", post(items::create_label))
        // Labels
        .route("/labels/audit", get(items::audit_labels))
        .route("/labels/:id", get(items::get_label))
        .route("/labels/:id", delete(items::delete_label))
        .route("/labels/:id/availability", get(items::get_label_availability))
        .route("/labels/:id/loans", get(items::get_label_loans))
        // Loans
        .route("/loans", post(loans::create_loan))
        .route("/loans/active", get(loans::active_loans))
        .route("/loans/:id", get(loans::get_loan))
        .route("/loans/:id/return", post(loans::return_loan))
        // Queries & statistics
        .route("/catalog", get(stats::get_catalog))
        .route("/catalog/genres", get(stats::get_item_genres))
        .route("/stats/inventory", get(stats::get_inventory))
        .with_state(state);

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi::create_openapi_router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
