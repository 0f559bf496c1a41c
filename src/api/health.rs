//! Liveness and readiness endpoints

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    /// `healthy`, `ready` or `unavailable`
    pub status: String,
    pub version: String,
}

fn health_body(status: &str) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Liveness probe; answers as long as the process is up
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is alive", body = HealthResponse)
    )
)]
pub async fn health_check() -> Json<HealthResponse> {
    health_body("healthy")
}

/// Readiness probe; verifies the storage backend answers before the service
/// advertises itself as ready to take lifecycle traffic.
#[utoipa::path(
    get,
    path = "/ready",
    tag = "health",
    responses(
        (status = 200, description = "Service is ready", body = HealthResponse),
        (status = 503, description = "Storage backend unavailable", body = HealthResponse)
    )
)]
pub async fn readiness_check(
    State(state): State<crate::AppState>,
) -> (StatusCode, Json<HealthResponse>) {
    match state.store.list_equipment().await {
        Ok(_) => (StatusCode::OK, health_body("ready")),
        Err(e) => {
            tracing::warn!("Readiness probe failed against the store: {}", e);
            (StatusCode::SERVICE_UNAVAILABLE, health_body("unavailable"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;

    use async_trait::async_trait;
    use uuid::Uuid;

    use crate::{
        config::AppConfig,
        error::{AppError, AppResult},
        models::{
            enums::TransactionStatus,
            equipment::{CreateEquipment, Equipment, UpdateEquipment},
            fine::Fine,
            notification::Notification,
            record::Record,
            transaction::Transaction,
            user::User,
        },
        services::{notify::NullSink, Services},
        store::{MemoryStore, Store, WriteBatch},
        AppState,
    };

    /// Store whose backend is unreachable; every call fails
    struct OfflineStore;

    impl OfflineStore {
        fn down<T>() -> AppResult<T> {
            Err(AppError::Internal("storage backend offline".to_string()))
        }
    }

    #[async_trait]
    impl Store for OfflineStore {
        async fn list_equipment(&self) -> AppResult<Vec<Equipment>> {
            Self::down()
        }
        async fn get_equipment(&self, _id: i32) -> AppResult<Option<Equipment>> {
            Self::down()
        }
        async fn get_equipment_batch(&self, _ids: &[i32]) -> AppResult<Vec<Equipment>> {
            Self::down()
        }
        async fn insert_equipment(&self, _data: &CreateEquipment) -> AppResult<Equipment> {
            Self::down()
        }
        async fn update_equipment_details(
            &self,
            _id: i32,
            _data: &UpdateEquipment,
        ) -> AppResult<Equipment> {
            Self::down()
        }
        async fn delete_equipment(&self, _id: i32) -> AppResult<()> {
            Self::down()
        }
        async fn get_user(&self, _id: i32) -> AppResult<Option<User>> {
            Self::down()
        }
        async fn get_transaction(&self, _id: Uuid) -> AppResult<Option<Transaction>> {
            Self::down()
        }
        async fn list_transactions(
            &self,
            _status: Option<TransactionStatus>,
        ) -> AppResult<Vec<Transaction>> {
            Self::down()
        }
        async fn list_transactions_by_student(
            &self,
            _student_id: i32,
        ) -> AppResult<Vec<Transaction>> {
            Self::down()
        }
        async fn list_sweepable_transactions(&self) -> AppResult<Vec<Transaction>> {
            Self::down()
        }
        async fn list_records(&self) -> AppResult<Vec<Record>> {
            Self::down()
        }
        async fn list_fines(&self) -> AppResult<Vec<Fine>> {
            Self::down()
        }
        async fn list_notifications(&self) -> AppResult<Vec<Notification>> {
            Self::down()
        }
        async fn commit(&self, _batch: WriteBatch) -> AppResult<()> {
            Self::down()
        }
    }

    fn state_over(store: Arc<dyn Store>) -> AppState {
        let services = Arc::new(Services::new(
            store.clone(),
            Arc::new(NullSink),
            Default::default(),
        ));
        AppState {
            config: Arc::new(AppConfig::default()),
            store,
            services,
        }
    }

    #[tokio::test]
    async fn ready_while_the_store_answers() {
        let state = state_over(Arc::new(MemoryStore::new()));
        let (status, body) = readiness_check(State(state)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.0.status, "ready");
    }

    #[tokio::test]
    async fn unavailable_when_the_store_is_down() {
        let state = state_over(Arc::new(OfflineStore));
        let (status, body) = readiness_check(State(state)).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body.0.status, "unavailable");
    }
}
