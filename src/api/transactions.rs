//! Borrow transaction endpoints

use std::collections::HashMap;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{
        enums::TransactionStatus,
        transaction::{CreateTransaction, ItemReturn, Transaction},
    },
};

/// Status filter for listing transactions
#[derive(Deserialize, ToSchema)]
pub struct TransactionQuery {
    /// A status label, or `All` for every live transaction
    pub status: Option<String>,
}

/// Per-item return state for a complete call
#[derive(Deserialize, ToSchema)]
pub struct CompleteRequest {
    /// Item id -> new absolute return state
    pub returns: HashMap<Uuid, ItemReturn>,
}

/// Result of a complete call
#[derive(Serialize, ToSchema)]
pub struct CompleteResponse {
    /// Status the transaction ended up in
    pub status: TransactionStatus,
}

/// Result of a manual reconciliation sweep
#[derive(Serialize, ToSchema)]
pub struct SweepResponse {
    /// Number of transactions whose status or fine changed
    pub updated: u64,
}

/// List live transactions, optionally filtered by status
#[utoipa::path(
    get,
    path = "/transactions",
    tag = "transactions",
    params(
        ("status" = Option<String>, Query, description = "Status label or `All`")
    ),
    responses(
        (status = 200, description = "Live transactions", body = Vec<Transaction>),
        (status = 400, description = "Unknown status label")
    )
)]
pub async fn list_transactions(
    State(state): State<crate::AppState>,
    Query(query): Query<TransactionQuery>,
) -> AppResult<Json<Vec<Transaction>>> {
    let status = match query.status.as_deref() {
        None | Some("All") => None,
        Some(label) => Some(label.parse()?),
    };
    let transactions = state.services.transactions.get_by_status(status).await?;
    Ok(Json(transactions))
}

/// Get one transaction
#[utoipa::path(
    get,
    path = "/transactions/{id}",
    tag = "transactions",
    params(("id" = Uuid, Path, description = "Transaction ID")),
    responses(
        (status = 200, description = "Transaction details", body = Transaction),
        (status = 404, description = "Transaction not found")
    )
)]
pub async fn get_transaction(
    State(state): State<crate::AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Transaction>> {
    let transaction = state.services.transactions.get_by_id(id).await?;
    Ok(Json(transaction))
}

/// List a student's live transactions
#[utoipa::path(
    get,
    path = "/students/{id}/transactions",
    tag = "transactions",
    params(("id" = i32, Path, description = "Student ID")),
    responses(
        (status = 200, description = "Student's transactions", body = Vec<Transaction>),
        (status = 404, description = "Student not found")
    )
)]
pub async fn get_student_transactions(
    State(state): State<crate::AppState>,
    Path(student_id): Path<i32>,
) -> AppResult<Json<Vec<Transaction>>> {
    let transactions = state
        .services
        .transactions
        .get_by_student(student_id)
        .await?;
    Ok(Json(transactions))
}

/// Create a borrow transaction
#[utoipa::path(
    post,
    path = "/transactions",
    tag = "transactions",
    request_body = CreateTransaction,
    responses(
        (status = 201, description = "Transaction created", body = Transaction),
        (status = 404, description = "Student or equipment not found"),
        (status = 422, description = "Insufficient inventory")
    )
)]
pub async fn create_transaction(
    State(state): State<crate::AppState>,
    Json(input): Json<CreateTransaction>,
) -> AppResult<(StatusCode, Json<Transaction>)> {
    let transaction = state.services.transactions.create(input).await?;
    Ok((StatusCode::CREATED, Json(transaction)))
}

/// Approve a pending borrow request
#[utoipa::path(
    post,
    path = "/transactions/{id}/approve",
    tag = "transactions",
    params(("id" = Uuid, Path, description = "Transaction ID")),
    responses(
        (status = 200, description = "Request approved", body = Transaction),
        (status = 404, description = "Transaction not found"),
        (status = 409, description = "Not a pending request")
    )
)]
pub async fn approve_transaction(
    State(state): State<crate::AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Transaction>> {
    let transaction = state.services.transactions.approve(id).await?;
    Ok(Json(transaction))
}

/// Deny a pending borrow request
#[utoipa::path(
    post,
    path = "/transactions/{id}/deny",
    tag = "transactions",
    params(("id" = Uuid, Path, description = "Transaction ID")),
    responses(
        (status = 204, description = "Request denied and removed"),
        (status = 404, description = "Transaction not found"),
        (status = 409, description = "Not a pending request")
    )
)]
pub async fn deny_transaction(
    State(state): State<crate::AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state.services.transactions.deny(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Process returns for a transaction
#[utoipa::path(
    post,
    path = "/transactions/{id}/complete",
    tag = "transactions",
    params(("id" = Uuid, Path, description = "Transaction ID")),
    request_body = CompleteRequest,
    responses(
        (status = 200, description = "Returns processed", body = CompleteResponse),
        (status = 400, description = "Invalid return quantity"),
        (status = 404, description = "Transaction or item not found")
    )
)]
pub async fn complete_transaction(
    State(state): State<crate::AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<CompleteRequest>,
) -> AppResult<Json<CompleteResponse>> {
    let status = state
        .services
        .transactions
        .complete(id, &request.returns)
        .await?;
    Ok(Json(CompleteResponse { status }))
}

/// Remove a live transaction without archival
#[utoipa::path(
    delete,
    path = "/transactions/{id}",
    tag = "transactions",
    params(("id" = Uuid, Path, description = "Transaction ID")),
    responses(
        (status = 204, description = "Transaction removed"),
        (status = 404, description = "Transaction not found")
    )
)]
pub async fn delete_transaction(
    State(state): State<crate::AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state.services.transactions.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Trigger a reconciliation sweep now
#[utoipa::path(
    post,
    path = "/transactions/sweep",
    tag = "transactions",
    responses(
        (status = 200, description = "Sweep finished", body = SweepResponse)
    )
)]
pub async fn sweep_transactions(
    State(state): State<crate::AppState>,
) -> AppResult<Json<SweepResponse>> {
    let updated = state
        .services
        .reconciliation
        .sweep(chrono::Utc::now())
        .await?;
    Ok(Json(SweepResponse { updated }))
}
