//! Gateway server: registration, live listing, and debug view over one registry

use crate::error::ApiError;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, Method},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use printboard_core::{
    DebugEntry, DebugResponse, Fingerprint, ListResponse, RegisterResponse, ServerConfig,
    DEBUG_PATH, FINGERPRINTS_PATH,
};
use printboard_identity::DerivationEngine;
use printboard_registry::RegistryStore;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

const REGISTER_FAILED: &str = "Failed to store fingerprint";
const LIST_FAILED: &str = "Failed to retrieve fingerprints";
const DEBUG_FAILED: &str = "Debug error";

#[derive(Clone)]
pub struct GatewayState {
    pub store: Arc<RegistryStore>,
    pub max_age_ms: i64,
    pub debug_max_age_ms: i64,
}

impl GatewayState {
    pub fn new(store: Arc<RegistryStore>, config: &ServerConfig) -> Self {
        Self {
            store,
            max_age_ms: config.max_age_ms,
            debug_max_age_ms: config.debug_max_age_ms,
        }
    }
}

pub fn build_router(state: GatewayState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route(
            FINGERPRINTS_PATH,
            get(list_handler)
                .post(register_handler)
                .options(preflight_handler),
        )
        .route(DEBUG_PATH, get(debug_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Open the registry described by `config`, bind, and serve until ctrl-c.
pub async fn start_gateway(config: ServerConfig) -> anyhow::Result<()> {
    let store = Arc::new(RegistryStore::open(config.data_dir.as_deref()).await);
    let state = GatewayState::new(store.clone(), &config);

    let bind_addr: SocketAddr = format!("{}:{}", config.bind.to_addr(), config.port).parse()?;
    let listener = TcpListener::bind(&bind_addr).await?;

    info!("Printboard Gateway v{} starting", env!("CARGO_PKG_VERSION"));
    info!("  Listening on: {}", listener.local_addr()?);
    info!("  Storage:      {}", store.backend_kind());
    info!("  Max age:      {}ms (debug {}ms)", config.max_age_ms, config.debug_max_age_ms);

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutting down");
        })
        .await?;
    Ok(())
}

/// Serve on an already-bound listener. Used by tests and embedders that
/// need the ephemeral port before the server starts.
pub async fn serve(listener: TcpListener, state: GatewayState) -> anyhow::Result<()> {
    axum::serve(listener, build_router(state)).await?;
    Ok(())
}

async fn preflight_handler() -> impl IntoResponse {
    Json(serde_json::json!({}))
}

/// Sweep, then return everything still inside the freshness window.
async fn list_handler(State(state): State<GatewayState>) -> Result<Json<ListResponse>, ApiError> {
    state
        .store
        .sweep(state.max_age_ms)
        .await
        .map_err(ApiError::store(LIST_FAILED))?;
    let fingerprints = state
        .store
        .list(state.max_age_ms)
        .await
        .map_err(ApiError::store(LIST_FAILED))?;

    Ok(Json(ListResponse {
        fingerprints,
        storage_type: state.store.backend_kind(),
    }))
}

async fn register_handler(
    State(state): State<GatewayState>,
    payload: Result<Json<Fingerprint>, JsonRejection>,
) -> Result<Json<RegisterResponse>, ApiError> {
    let Json(mut fingerprint) =
        payload.map_err(|e| ApiError::bad_request(REGISTER_FAILED, e.body_text()))?;

    // Display fields are a function of the id; never trust the caller's.
    let (moniker, emoji) = DerivationEngine::display_for(&fingerprint.id)
        .map_err(|e| ApiError::bad_request(REGISTER_FAILED, e.to_string()))?;
    fingerprint.moniker = moniker;
    fingerprint.emoji = emoji.to_string();

    let stored = state
        .store
        .upsert(fingerprint)
        .await
        .map_err(ApiError::store(REGISTER_FAILED))?;
    info!(id = %stored.short_id(), moniker = %stored.moniker, "fingerprint registered");

    state
        .store
        .sweep(state.max_age_ms)
        .await
        .map_err(ApiError::store(REGISTER_FAILED))?;
    let count = state
        .store
        .count()
        .await
        .map_err(ApiError::store(REGISTER_FAILED))?;

    Ok(Json(RegisterResponse {
        success: true,
        count,
        storage_type: state.store.backend_kind(),
    }))
}

/// Wider window, no sweep: shows entries a client view has already dropped.
async fn debug_handler(State(state): State<GatewayState>) -> Result<Json<DebugResponse>, ApiError> {
    let fingerprints = state
        .store
        .list(state.debug_max_age_ms)
        .await
        .map_err(ApiError::store(DEBUG_FAILED))?;
    let count = state
        .store
        .count()
        .await
        .map_err(ApiError::store(DEBUG_FAILED))?;

    Ok(Json(DebugResponse {
        count,
        storage_type: state.store.backend_kind(),
        fingerprints: fingerprints.iter().map(DebugEntry::from).collect(),
    }))
}

async fn health_handler(State(state): State<GatewayState>) -> impl IntoResponse {
    let count = state.store.count().await.unwrap_or_default();
    Json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "storageType": state.store.backend_kind(),
        "count": count,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use printboard_core::{BackendKind, Details, ErrorBody};
    use printboard_registry::ManualClock;
    use tower::ServiceExt;

    const NOW: i64 = 1_714_564_800_000;
    const ID: &str = "5cd5fce7-ca82-5619-8b38-931e9a20bbce";

    fn state_with_clock() -> (GatewayState, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(NOW));
        let store = Arc::new(RegistryStore::with_backend(None, clock.clone()));
        (GatewayState::new(store, &ServerConfig::default()), clock)
    }

    fn body_for(id: &str) -> String {
        serde_json::to_string(&Fingerprint {
            id: id.into(),
            moniker: "Forged Name".into(),
            emoji: "x".into(),
            timestamp: 1,
            details: Details {
                browser: "Firefox".into(),
                os: "Linux".into(),
                ..Default::default()
            },
        })
        .unwrap()
    }

    fn post(body: String) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(FINGERPRINTS_PATH)
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    fn get_req(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn register_then_list() {
        let (state, _clock) = state_with_clock();
        let app = build_router(state);

        let response = app.clone().oneshot(post(body_for(ID))).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let registered: RegisterResponse = json(response).await;
        assert!(registered.success);
        assert_eq!(registered.count, 1);
        assert_eq!(registered.storage_type, BackendKind::InMemory);

        let response = app.oneshot(get_req(FINGERPRINTS_PATH)).await.unwrap();
        let listed: ListResponse = json(response).await;
        assert_eq!(listed.fingerprints.len(), 1);
        let fp = &listed.fingerprints[0];
        assert_eq!(fp.id, ID);
        assert_eq!(fp.timestamp, NOW);
        let (moniker, emoji) = DerivationEngine::display_for(ID).unwrap();
        assert_eq!(fp.moniker, moniker);
        assert_eq!(fp.emoji, emoji);
    }

    #[tokio::test]
    async fn list_sweeps_stale_entries() {
        let (state, clock) = state_with_clock();
        let store = state.store.clone();
        let app = build_router(state);
        app.clone().oneshot(post(body_for(ID))).await.unwrap();

        clock.advance(200_000);
        let listed: ListResponse = json(app.oneshot(get_req(FINGERPRINTS_PATH)).await.unwrap()).await;
        assert!(listed.fingerprints.is_empty());
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn debug_uses_wider_window_without_sweeping() {
        let (state, clock) = state_with_clock();
        let app = build_router(state);
        app.clone().oneshot(post(body_for(ID))).await.unwrap();

        clock.advance(200_000);
        let debug: DebugResponse = json(app.clone().oneshot(get_req(DEBUG_PATH)).await.unwrap()).await;
        assert_eq!(debug.count, 1);
        assert_eq!(debug.fingerprints.len(), 1);
        let entry = &debug.fingerprints[0];
        assert_eq!(entry.id, "5cd5fce7...");
        assert_eq!(entry.timestamp, "2024-05-01T12:00:00.000Z");
        assert_eq!(entry.browser, "Firefox");

        let listed: ListResponse = json(app.oneshot(get_req(FINGERPRINTS_PATH)).await.unwrap()).await;
        assert!(listed.fingerprints.is_empty());
    }

    #[tokio::test]
    async fn id_spellings_collapse_to_one_entry() {
        let (state, _clock) = state_with_clock();
        let app = build_router(state);
        for id in [ID.to_uppercase(), ID.replace('-', ""), ID.to_string()] {
            let response = app.clone().oneshot(post(body_for(&id))).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK);
            let registered: RegisterResponse = json(response).await;
            assert_eq!(registered.count, 1, "{} registered as a new entry", id);
        }

        let listed: ListResponse = json(app.oneshot(get_req(FINGERPRINTS_PATH)).await.unwrap()).await;
        assert_eq!(listed.fingerprints.len(), 1);
        assert_eq!(listed.fingerprints[0].id, ID);
    }

    #[tokio::test]
    async fn malformed_id_is_400() {
        let (state, _clock) = state_with_clock();
        let app = build_router(state);
        let response = app.oneshot(post(body_for("not-a-uuid"))).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: ErrorBody = json(response).await;
        assert_eq!(body.error, REGISTER_FAILED);
    }

    #[tokio::test]
    async fn malformed_body_is_400() {
        let (state, _clock) = state_with_clock();
        let app = build_router(state);
        let response = app.oneshot(post("{\"id\":".into())).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn preflight_allows_any_origin() {
        let (state, _clock) = state_with_clock();
        let app = build_router(state);
        let request = Request::builder()
            .method("OPTIONS")
            .uri(FINGERPRINTS_PATH)
            .header("origin", "http://elsewhere.example")
            .header("access-control-request-method", "POST")
            .header("access-control-request-headers", "content-type")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let headers = response.headers();
        assert_eq!(headers.get("access-control-allow-origin").unwrap(), "*");
        let methods = headers
            .get("access-control-allow-methods")
            .unwrap()
            .to_str()
            .unwrap();
        assert!(methods.contains("POST"));
    }

    #[tokio::test]
    async fn plain_options_returns_empty_object() {
        let (state, _clock) = state_with_clock();
        let app = build_router(state);
        let request = Request::builder()
            .method("OPTIONS")
            .uri(FINGERPRINTS_PATH)
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body: serde_json::Value = json(response).await;
        assert_eq!(body, serde_json::json!({}));
    }

    #[tokio::test]
    async fn simple_requests_carry_cors_header() {
        let (state, _clock) = state_with_clock();
        let app = build_router(state);
        let request = Request::builder()
            .uri(FINGERPRINTS_PATH)
            .header("origin", "http://elsewhere.example")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.headers().get("access-control-allow-origin").unwrap(), "*");
    }
}
