use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use crate::model::{CategoryFields, Service, ServiceCategory, ServiceFields};
use crate::server::AppState;
use crate::storage::{ShopStore, TableCounts};
use crate::Error;
use std::sync::Arc;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub kind: &'static str,
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);
pub type ApiResult<T> = Result<T, ApiError>;

fn api_error(status: StatusCode, kind: &'static str, error: impl Into<String>) -> ApiError {
    (status, Json(ErrorResponse { error: error.into(), kind }))
}

fn not_found(what: &str, id: i64) -> ApiError {
    api_error(StatusCode::NOT_FOUND, "not_found", format!("{} {} not found", what, id))
}

/// Map store errors to HTTP statuses; everything unexpected is a 500.
fn error_response(err: Error) -> ApiError {
    let message = err.to_string();
    match err {
        Error::Validation(_) => api_error(StatusCode::BAD_REQUEST, "validation", message),
        Error::ConstraintViolation(_) => {
            api_error(StatusCode::UNPROCESSABLE_ENTITY, "constraint_violation", message)
        }
        Error::CategoryInUse { .. } => api_error(StatusCode::CONFLICT, "category_in_use", message),
        Error::CategoryInactive { .. } => {
            api_error(StatusCode::CONFLICT, "category_inactive", message)
        }
        _ => {
            tracing::error!("Store failure: {}", message);
            api_error(StatusCode::INTERNAL_SERVER_ERROR, "internal", message)
        }
    }
}

/// Run a store call on the blocking pool so SQLite never stalls the runtime.
async fn with_store<T, F>(state: &Arc<AppState>, f: F) -> ApiResult<T>
where
    F: FnOnce(&ShopStore) -> crate::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let state = Arc::clone(state);
    tokio::task::spawn_blocking(move || {
        // Each store call is self-contained, so a panic elsewhere leaves no
        // half-applied state behind the lock.
        let store = state.store.lock().unwrap_or_else(|poisoned| {
            tracing::warn!("Store mutex poisoned by an earlier panic; recovering");
            poisoned.into_inner()
        });
        f(&store).map_err(error_response)
    })
    .await
    .map_err(|e| api_error(StatusCode::INTERNAL_SERVER_ERROR, "internal", e.to_string()))?
}

pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

pub async fn get_stats(State(state): State<Arc<AppState>>) -> ApiResult<Json<TableCounts>> {
    with_store(&state, |store| store.table_counts()).await.map(Json)
}

// ========== Services ==========

pub async fn list_services(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<Service>>> {
    with_store(&state, |store| store.list_active_services()).await.map(Json)
}

pub async fn get_service(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Service>> {
    with_store(&state, move |store| store.get_service(id))
        .await?
        .map(Json)
        .ok_or_else(|| not_found("service", id))
}

pub async fn create_service(
    State(state): State<Arc<AppState>>,
    Json(fields): Json<ServiceFields>,
) -> ApiResult<(StatusCode, Json<Service>)> {
    let created = with_store(&state, move |store| {
        let id = store.create_service(&fields)?;
        store.get_service(id)
    })
    .await?;

    created
        .map(|service| (StatusCode::CREATED, Json(service)))
        .ok_or_else(|| api_error(StatusCode::INTERNAL_SERVER_ERROR, "internal", "created service vanished"))
}

pub async fn update_service(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(fields): Json<ServiceFields>,
) -> ApiResult<Json<Service>> {
    with_store(&state, move |store| {
        if store.update_service(id, &fields)? {
            store.get_service(id)
        } else {
            Ok(None)
        }
    })
    .await?
    .map(Json)
    .ok_or_else(|| not_found("service", id))
}

pub async fn delete_service(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    if with_store(&state, move |store| store.soft_delete_service(id)).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found("service", id))
    }
}

pub async fn reactivate_service(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Service>> {
    with_store(&state, move |store| {
        if store.reactivate_service(id)? {
            store.get_service(id)
        } else {
            Ok(None)
        }
    })
    .await?
    .map(Json)
    .ok_or_else(|| not_found("inactive service", id))
}

// ========== Categories ==========

pub async fn list_categories(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<ServiceCategory>>> {
    with_store(&state, |store| store.list_active_categories()).await.map(Json)
}

pub async fn get_category(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> ApiResult<Json<ServiceCategory>> {
    with_store(&state, move |store| store.get_category(id))
        .await?
        .map(Json)
        .ok_or_else(|| not_found("category", id))
}

pub async fn create_category(
    State(state): State<Arc<AppState>>,
    Json(fields): Json<CategoryFields>,
) -> ApiResult<(StatusCode, Json<ServiceCategory>)> {
    let created = with_store(&state, move |store| {
        let id = store.create_category(&fields)?;
        store.get_category(id)
    })
    .await?;

    created
        .map(|category| (StatusCode::CREATED, Json(category)))
        .ok_or_else(|| api_error(StatusCode::INTERNAL_SERVER_ERROR, "internal", "created category vanished"))
}

pub async fn update_category(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(fields): Json<CategoryFields>,
) -> ApiResult<Json<ServiceCategory>> {
    with_store(&state, move |store| {
        if store.update_category(id, &fields)? {
            store.get_category(id)
        } else {
            Ok(None)
        }
    })
    .await?
    .map(Json)
    .ok_or_else(|| not_found("category", id))
}

pub async fn delete_category(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    if with_store(&state, move |store| store.soft_delete_category(id)).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found("category", id))
    }
}

pub async fn reactivate_category(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> ApiResult<Json<ServiceCategory>> {
    with_store(&state, move |store| {
        if store.reactivate_category(id)? {
            store.get_category(id)
        } else {
            Ok(None)
        }
    })
    .await?
    .map(Json)
    .ok_or_else(|| not_found("inactive category", id))
}
