//! Archive endpoints: completed records and levied fines

use axum::{extract::State, Json};

use crate::{
    error::AppResult,
    models::{fine::Fine, record::Record},
};

/// List archived borrow records
#[utoipa::path(
    get,
    path = "/records",
    tag = "archive",
    responses(
        (status = 200, description = "Archived records", body = Vec<Record>)
    )
)]
pub async fn list_records(
    State(state): State<crate::AppState>,
) -> AppResult<Json<Vec<Record>>> {
    let records = state.store.list_records().await?;
    Ok(Json(records))
}

/// List levied fines
#[utoipa::path(
    get,
    path = "/fines",
    tag = "archive",
    responses(
        (status = 200, description = "Levied fines", body = Vec<Fine>)
    )
)]
pub async fn list_fines(State(state): State<crate::AppState>) -> AppResult<Json<Vec<Fine>>> {
    let fines = state.store.list_fines().await?;
    Ok(Json(fines))
}
