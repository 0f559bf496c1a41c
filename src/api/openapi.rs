//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{equipment, health, records, transactions};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Labtrack API",
        version = "1.0.0",
        description = "Laboratory Equipment Borrowing System REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Equipment
        equipment::list_equipment,
        equipment::get_equipment,
        equipment::create_equipment,
        equipment::update_equipment,
        equipment::delete_equipment,
        // Transactions
        transactions::list_transactions,
        transactions::get_transaction,
        transactions::get_student_transactions,
        transactions::create_transaction,
        transactions::approve_transaction,
        transactions::deny_transaction,
        transactions::complete_transaction,
        transactions::delete_transaction,
        transactions::sweep_transactions,
        // Archive
        records::list_records,
        records::list_fines,
    ),
    components(
        schemas(
            // Equipment
            crate::models::equipment::Equipment,
            crate::models::equipment::CreateEquipment,
            crate::models::equipment::UpdateEquipment,
            // Transactions
            crate::models::transaction::Transaction,
            crate::models::transaction::BorrowedItem,
            crate::models::transaction::BorrowLine,
            crate::models::transaction::CreateTransaction,
            crate::models::transaction::ItemReturn,
            crate::models::enums::TransactionStatus,
            transactions::CompleteRequest,
            transactions::CompleteResponse,
            transactions::SweepResponse,
            // Archive
            crate::models::record::Record,
            crate::models::fine::Fine,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "equipment", description = "Equipment inventory management"),
        (name = "transactions", description = "Borrow transaction lifecycle"),
        (name = "archive", description = "Completed records and fines")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
