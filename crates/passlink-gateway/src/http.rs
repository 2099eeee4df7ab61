//! Axum HTTP handlers for the gateway.
//!
//! Provides the share-link redemption endpoint, the credential indexer
//! endpoints and a health check.

use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::{SecondsFormat, Utc};
use passlink_credentials::{Credential, CredentialError, CredentialStore};
use passlink_telemetry::RequestContext;
use tower_http::trace::TraceLayer;
use tracing::Instrument;

use crate::redeem::{RedeemError, RedemptionService};

/// Shared application state for Axum handlers.
pub struct AppState {
    /// Redemption pipeline.
    pub service: RedemptionService,
    /// Credential store, also reachable through the service's resolver.
    pub credentials: Arc<dyn CredentialStore>,
}

impl AppState {
    /// Build state whose redemption service resolves against `credentials`.
    #[must_use]
    pub fn new(
        gate: Arc<dyn passlink_capabilities::ViewGate>,
        credentials: Arc<dyn CredentialStore>,
    ) -> Self {
        let resolver = passlink_credentials::CredentialResolver::new(Arc::clone(&credentials));
        Self {
            service: RedemptionService::new(gate, resolver),
            credentials,
        }
    }
}

/// Build the Axum router with all endpoints.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/auth/access-token", post(handle_access_token))
        .route("/api/student/{address}", get(handle_student_credentials))
        .route("/api/indexer", post(handle_indexer))
        .route("/health", get(handle_health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn error_response(status: StatusCode, error: &str, code: &str) -> Response {
    (
        status,
        Json(serde_json::json!({ "error": error, "code": code })),
    )
        .into_response()
}

impl IntoResponse for RedeemError {
    fn into_response(self) -> Response {
        error_response(self.status(), self.public_message(), self.code())
    }
}

/// POST /api/auth/access-token -- redeem a share token
async fn handle_access_token(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    let ctx = RequestContext::new("/api/auth/access-token");
    let span = ctx.span();

    async move {
        let request: Option<serde_json::Value> = serde_json::from_slice(&body).ok();
        let token = request
            .as_ref()
            .and_then(|v| v.get("token"))
            .and_then(serde_json::Value::as_str);

        let response = match state.service.redeem(token).await {
            Ok(redemption) => (
                StatusCode::OK,
                Json(serde_json::json!({
                    "valid": true,
                    "credential": redemption.credential,
                    "viewsLeft": redemption.views_left,
                    "ownerAddress": redemption.owner,
                })),
            )
                .into_response(),
            Err(e) => e.into_response(),
        };

        tracing::debug!(elapsed_ms = ctx.elapsed_ms(), "Request completed");
        response
    }
    .instrument(span)
    .await
}

/// GET /api/student/{address} -- credentials owned by an address
async fn handle_student_credentials(
    State(state): State<Arc<AppState>>,
    Path(address): Path<String>,
) -> Response {
    match state.credentials.credentials_by_owner(&address).await {
        Ok(credentials) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "address": address,
                "count": credentials.len(),
                "credentials": credentials,
                "syncedAt": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            })),
        )
            .into_response(),
        Err(e) => {
            tracing::error!(address = %address, error = %e, "Credential listing failed");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Indexer failed",
                "internal_error",
            )
        },
    }
}

/// POST /api/indexer -- add a credential
async fn handle_indexer(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    let Ok(credential) = serde_json::from_slice::<Credential>(&body) else {
        return error_response(
            StatusCode::BAD_REQUEST,
            "Invalid credential data",
            "invalid_credential",
        );
    };
    let id = credential.id.clone();

    match state.credentials.insert(credential).await {
        Ok(()) => {
            tracing::info!(id = %id, "Indexed credential");
            (
                StatusCode::OK,
                Json(serde_json::json!({
                    "success": true,
                    "message": "Indexed successfully",
                })),
            )
                .into_response()
        },
        Err(CredentialError::InvalidCredential(reason)) => {
            tracing::debug!(reason = %reason, "Rejected credential");
            error_response(
                StatusCode::BAD_REQUEST,
                "Invalid credential data",
                "invalid_credential",
            )
        },
        Err(e) => {
            tracing::error!(id = %id, error = %e, "Indexing failed");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to index credential",
                "internal_error",
            )
        },
    }
}

/// GET /health -- liveness and gate size
async fn handle_health(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let tracked = state.service.gate().tracked().await.ok();
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "trackedNonces": tracked,
    }))
}
