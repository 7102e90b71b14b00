use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use serde::Deserialize;
use serde_json::json;
use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::{debug, error, info, warn};

use crate::{
    engine::StudioHandle,
    error::{SessionError, StudioError, WorkspaceError},
    locale::Locale,
    metrics::StudioMetrics,
    workspace::{ArtifactId, ArtifactKind},
};

/// JSON control API over a running studio engine
pub struct HttpServer {
    handle: StudioHandle,
    metrics: Arc<StudioMetrics>,
    bind_addr: SocketAddr,
}

#[derive(Clone)]
struct AppState {
    handle: StudioHandle,
    metrics: Arc<StudioMetrics>,
}

#[derive(Debug, Deserialize)]
struct CreateArtifactBody {
    name: String,
    kind: ArtifactKind,
}

#[derive(Debug, Deserialize)]
struct ContentBody {
    content: String,
}

#[derive(Debug, Deserialize)]
struct NameBody {
    name: String,
}

#[derive(Debug, Deserialize)]
struct LocaleBody {
    locale: String,
}

#[derive(Debug, Deserialize)]
struct LookupBody {
    args: String,
}

/// Maps studio errors onto HTTP statuses
struct ApiError(StudioError);

impl From<StudioError> for ApiError {
    fn from(err: StudioError) -> Self {
        ApiError(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError(StudioError::InvalidRequest(rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            StudioError::Workspace(WorkspaceError::LastArtifact) => StatusCode::CONFLICT,
            StudioError::Workspace(WorkspaceError::ArtifactNotFound(_)) => StatusCode::NOT_FOUND,
            StudioError::Workspace(WorkspaceError::EmptyName) => StatusCode::BAD_REQUEST,
            StudioError::Session(SessionError::NoActiveArtifact) => StatusCode::CONFLICT,
            StudioError::Session(SessionError::EmptyQuery) => StatusCode::BAD_REQUEST,
            StudioError::Config(_) => StatusCode::BAD_REQUEST,
            StudioError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            StudioError::Gateway(_) => StatusCode::BAD_GATEWAY,
            StudioError::EngineStopped => StatusCode::SERVICE_UNAVAILABLE,
        };

        if status.is_server_error() {
            error!("Request failed: {}", self.0);
        } else {
            debug!("Request refused: {}", self.0);
        }

        (
            status,
            Json(json!({
                "status": "error",
                "message": self.0.to_string()
            })),
        )
            .into_response()
    }
}

type ApiResult<T> = Result<T, ApiError>;

impl HttpServer {
    pub fn new(handle: StudioHandle, metrics: Arc<StudioMetrics>, bind_addr: SocketAddr) -> Self {
        Self {
            handle,
            metrics,
            bind_addr,
        }
    }

    /// Build the API router
    pub fn router(handle: StudioHandle, metrics: Arc<StudioMetrics>) -> Router {
        let app_state = AppState { handle, metrics };

        Router::new()
            .route("/health", get(health_check))
            .route("/metrics", get(prometheus_metrics))
            .route("/workspace", get(workspace_view))
            .route("/artifacts", post(create_artifact))
            .route("/artifacts/{id}", axum::routing::delete(delete_artifact))
            .route("/artifacts/{id}/content", put(update_content))
            .route("/artifacts/{id}/name", put(rename_artifact))
            .route("/artifacts/{id}/activate", post(activate_artifact))
            .route("/analysis", get(analysis_session))
            .route("/analysis/validate", post(start_validation))
            .route("/analysis/explain", post(start_explanation))
            .route("/annotations", get(annotations))
            .route("/lookup", get(lookup_session).post(start_lookup))
            .route("/locale", put(set_locale))
            .with_state(app_state)
            .layer(CorsLayer::permissive())
    }

    /// Bind the configured address and serve until Ctrl-C
    pub async fn start(self) -> Result<(), Box<dyn std::error::Error>> {
        let listener = TcpListener::bind(self.bind_addr).await?;
        self.serve(listener).await
    }

    /// Serve on an already bound listener until Ctrl-C
    pub async fn serve(self, listener: TcpListener) -> Result<(), Box<dyn std::error::Error>> {
        let app = Self::router(self.handle, self.metrics);

        info!("Starting HTTP server on {}", listener.local_addr()?);

        let shutdown_signal = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("Failed to listen for ctrl-c: {}", e);
                std::future::pending::<()>().await;
            }
            info!("Shutdown signal received");
        };

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal)
            .await?;

        Ok(())
    }
}

/// Basic health check endpoint
async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({"status": "healthy"})))
}

/// Prometheus metrics endpoint
async fn prometheus_metrics(State(state): State<AppState>) -> Response {
    match state.metrics.export() {
        Ok(metrics) => (
            StatusCode::OK,
            [("Content-Type", "text/plain; charset=utf-8")],
            metrics,
        )
            .into_response(),
        Err(e) => {
            error!("Failed to export metrics: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to export metrics".to_string(),
            )
                .into_response()
        }
    }
}

async fn workspace_view(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.handle.view().await?))
}

async fn create_artifact(
    State(state): State<AppState>,
    body: Result<Json<CreateArtifactBody>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(body) = body?;
    let id = state.handle.create_artifact(body.name, body.kind).await?;
    Ok((StatusCode::CREATED, Json(json!({"id": id}))))
}

async fn delete_artifact(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    state.handle.delete_artifact(ArtifactId::new(id)).await?;
    Ok(Json(json!({"status": "deleted"})))
}

async fn update_content(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<ContentBody>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(body) = body?;
    state
        .handle
        .update_content(ArtifactId::new(id), body.content)
        .await?;
    Ok(Json(json!({"status": "updated"})))
}

async fn rename_artifact(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<NameBody>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(body) = body?;
    state
        .handle
        .rename_artifact(ArtifactId::new(id), body.name)
        .await?;
    Ok(Json(json!({"status": "renamed"})))
}

async fn activate_artifact(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let changed = state.handle.select(ArtifactId::new(id)).await?;
    Ok(Json(json!({"changed": changed})))
}

async fn analysis_session(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.handle.view().await?.analysis))
}

async fn start_validation(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let session = state.handle.validate().await?;
    Ok((StatusCode::ACCEPTED, Json(json!({"session": session}))))
}

async fn start_explanation(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let session = state.handle.explain().await?;
    Ok((StatusCode::ACCEPTED, Json(json!({"session": session}))))
}

async fn annotations(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.handle.annotations().await?))
}

async fn lookup_session(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.handle.view().await?.lookup))
}

async fn start_lookup(
    State(state): State<AppState>,
    body: Result<Json<LookupBody>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(body) = body?;
    let session = state.handle.lookup(body.args).await?;
    Ok((StatusCode::ACCEPTED, Json(json!({"session": session}))))
}

async fn set_locale(
    State(state): State<AppState>,
    body: Result<Json<LocaleBody>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(body) = body?;
    let locale: Locale = body.locale.parse().map_err(StudioError::from)?;
    state.handle.set_locale(locale).await?;
    Ok(Json(json!({"locale": locale})))
}
