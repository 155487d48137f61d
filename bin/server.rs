// AgroFlow - Web Server
// REST API with Axum over the Farm State Store

use agroflow::config::load_config;
use agroflow::logging::init_tracing;
use agroflow::schema::describe;
use agroflow::{
    summarize, Animal, AnimalStatus, Draft, FarmError, FarmStore, FinancialEntry, HealthRecord,
    LaborRecord, NewAnimal, NewFinancialEntry, NewHealthRecord, NewLaborRecord, Record,
    ValidationError,
};
use anyhow::Context;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{delete, get, put},
    Router,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};
use tower_http::cors::CorsLayer;
use tracing::{error, info};

/// Shared application state
#[derive(Clone)]
struct AppState {
    store: Arc<Mutex<FarmStore>>,
}

impl AppState {
    fn new(store: FarmStore) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
        }
    }

    /// A panicked handler cannot leave the store half-mutated (commits are
    /// all-or-nothing), so a poisoned lock is still safe to use.
    fn store(&self) -> MutexGuard<'_, FarmStore> {
        self.store.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// API Response wrapper
#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
            error: None,
        }
    }

    fn fail(data: T, error: impl Into<String>) -> Self {
        Self {
            success: false,
            data,
            error: Some(error.into()),
        }
    }
}

#[derive(Serialize)]
struct DeleteResponse {
    id: String,
    deleted: bool,
}

#[derive(Deserialize)]
struct StatusUpdate {
    status: AnimalStatus,
}

/// Map a store error onto a status code: rejected input is 422 and carries
/// the field errors, anything else is a 500.
fn error_response(e: FarmError) -> Response {
    match e {
        FarmError::Validation(errors) => {
            let message = describe(&errors);
            (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(ApiResponse::fail(errors, message)),
            )
                .into_response()
        }
        other => {
            error!(error = %other, "request failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::fail((), other.to_string())),
            )
                .into_response()
        }
    }
}

/// Bodies that do not deserialize (missing field, wrong type, bad date) get
/// the same envelope as drafts that fail validation.
fn rejection_response(rejection: JsonRejection) -> Response {
    let errors = vec![ValidationError::new("Request", "body", rejection.body_text())];
    let message = describe(&errors);
    (rejection.status(), Json(ApiResponse::fail(errors, message))).into_response()
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// GET /api/dashboard - Summary of the whole farm
async fn get_dashboard(State(state): State<AppState>) -> impl IntoResponse {
    let store = state.store();
    Json(ApiResponse::ok(summarize(store.data())))
}

/// GET /api/<collection> - Records in insertion order
async fn list_records<R: Record>(State(state): State<AppState>) -> impl IntoResponse {
    let store = state.store();
    Json(ApiResponse::ok(store.list::<R>().to_vec()))
}

/// POST /api/<collection> - Validate and append; responds with the stored record
async fn add_record<D>(
    State(state): State<AppState>,
    payload: Result<Json<D>, JsonRejection>,
) -> Response
where
    D: Draft + DeserializeOwned + Send + 'static,
{
    let Json(draft) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return rejection_response(rejection),
    };
    let mut store = state.store();

    match store.add(draft) {
        Ok(id) => {
            let created = store
                .list::<D::Record>()
                .iter()
                .find(|record| record.id() == id)
                .cloned();
            (StatusCode::CREATED, Json(ApiResponse::ok(created))).into_response()
        }
        Err(e) => error_response(e),
    }
}

/// DELETE /api/<collection>/:id - Unknown ids succeed with `deleted: false`
async fn delete_record<R: Record>(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Response {
    let mut store = state.store();

    match store.delete::<R>(&id) {
        Ok(deleted) => Json(ApiResponse::ok(DeleteResponse { id, deleted })).into_response(),
        Err(e) => error_response(e),
    }
}

/// PUT /api/animals/:id/status - Free-form status change
async fn update_animal_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<StatusUpdate>, JsonRejection>,
) -> Response {
    let Json(update) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return rejection_response(rejection),
    };
    let mut store = state.store();

    match store.set_animal_status(&id, update.status) {
        Ok(true) => {
            let animal = store.data().find_animal(&id).cloned();
            Json(ApiResponse::ok(animal)).into_response()
        }
        Ok(false) => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::fail((), format!("no animal with id {}", id))),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

// ============================================================================
// Router
// ============================================================================

fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/dashboard", get(get_dashboard))
        .route(
            "/animals",
            get(list_records::<Animal>).post(add_record::<NewAnimal>),
        )
        .route("/animals/:id", delete(delete_record::<Animal>))
        .route("/animals/:id/status", put(update_animal_status))
        .route(
            "/health-records",
            get(list_records::<HealthRecord>).post(add_record::<NewHealthRecord>),
        )
        .route("/health-records/:id", delete(delete_record::<HealthRecord>))
        .route(
            "/finances",
            get(list_records::<FinancialEntry>).post(add_record::<NewFinancialEntry>),
        )
        .route("/finances/:id", delete(delete_record::<FinancialEntry>))
        .route(
            "/labor",
            get(list_records::<LaborRecord>).post(add_record::<NewLaborRecord>),
        )
        .route("/labor/:id", delete(delete_record::<LaborRecord>))
        .with_state(state);

    Router::new()
        .nest("/api", api_routes)
        .layer(CorsLayer::permissive())
}

// ============================================================================
// Main Server
// ============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    println!("🌾 AgroFlow - Web Server");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let config = load_config()?;
    let storage = config.open_storage()?;
    println!("✓ Storage opened: {}", config.storage_location().display());

    let store = FarmStore::open(storage);
    let app = build_router(AppState::new(store));

    let addr = config.server_addr.clone();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!(%addr, "server listening");
    println!("\n🚀 Server running on http://{}", addr);
    println!("   API: http://{}/api/dashboard", addr);
    println!("\n   Press Ctrl+C to stop\n");

    axum::serve(listener, app)
        .await
        .context("Server stopped unexpectedly")?;

    Ok(())
}
