//! OpenAPI documentation

use axum::{routing::get, Json, Router};
use utoipa::OpenApi;

use crate::api::{authors, health, items, loans, members, staff, stats};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Circulation API",
        version = "0.1.0",
        description = "Library catalog, staff and circulation REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        // Authors & genres
        authors::list_authors,
        authors::get_author,
        authors::create_author,
        authors::delete_author,
        authors::list_genres,
        authors::get_genre,
        authors::create_genre,
        authors::delete_genre,
        // Members
        members::list_members,
        members::get_member,
        members::create_member,
        members::update_member,
        members::delete_member,
        // Staff
        staff::create_position,
        staff::get_position,
        staff::get_hierarchy,
        staff::set_manager,
        staff::delete_position,
        staff::list_employees,
        staff::create_employee,
        staff::get_employee,
        staff::update_employee,
        staff::delete_employee,
        // Items
        items::create_item,
        items::get_item,
        items::update_item,
        items::delete_item,
        items::link_author,
        items::unlink_author,
        items::link_genre,
        items::unlink_genre,
        // Labels
        items::create_label,
        items::get_label,
        items::delete_label,
        items::get_label_availability,
        items::get_label_loans,
        items::audit_labels,
        // Loans
        loans::create_loan,
        loans::get_loan,
        loans::return_loan,
        loans::active_loans,
        // Queries & stats
        stats::get_catalog,
        stats::get_item_genres,
        stats::get_inventory,
    ),
    components(
        schemas(
            // Authors & genres
            crate::models::author::Author,
            crate::models::author::CreateAuthor,
            crate::models::author::Genre,
            crate::models::author::CreateGenre,
            // Members
            crate::models::member::Member,
            crate::models::member::CreateMember,
            crate::models::member::UpdateMember,
            // Staff
            crate::models::position::Position,
            crate::models::position::CreatePosition,
            crate::models::position::SetManager,
            crate::models::position::PositionNode,
            crate::models::position::Employee,
            crate::models::position::CreateEmployee,
            crate::models::position::UpdateEmployee,
            // Items
            crate::models::item::Item,
            crate::models::item::ItemDetails,
            crate::models::item::CreateItem,
            crate::models::item::UpdateItem,
            crate::models::item::Label,
            crate::models::item::LabelStatus,
            crate::models::item::LabelAvailability,
            // Loans
            crate::models::loan::Loan,
            crate::models::loan::CreateLoan,
            crate::models::loan::ReturnLoan,
            crate::models::loan::ActiveLoan,
            // Queries & stats
            crate::models::report::CatalogEntry,
            crate::models::report::ItemGenre,
            crate::models::report::InventoryReport,
            crate::models::table::Table,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "authors", description = "Authors and genres"),
        (name = "members", description = "Library members"),
        (name = "staff", description = "Positions and employees"),
        (name = "items", description = "Catalog items and their links"),
        (name = "labels", description = "Physical copies"),
        (name = "loans", description = "Loan management"),
        (name = "stats", description = "Catalog queries and statistics")
    )
)]
pub struct ApiDoc;

/// Serve the OpenAPI document as JSON
pub fn create_openapi_router() -> Router {
    Router::new().route(
        "/api-docs/openapi.json",
        get(|| async { Json(ApiDoc::openapi()) }),
    )
}
