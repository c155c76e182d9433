//! Tests for printboard-client: transport mapping, session lifecycle, cancellation

use axum::{http::StatusCode, routing::get, Json, Router};
use printboard_client::*;
use printboard_core::*;
use printboard_gateway::GatewayState;
use printboard_identity::DerivationEngine;
use printboard_registry::RegistryStore;
use printboard_signals::{CollectorOptions, Environment, Profile, ProfileEnvironment};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

fn profile() -> Profile {
    Profile {
        user_agent: Some("Mozilla/5.0 (Macintosh; Intel Mac OS X 14_4) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4 Safari/605.1.15".into()),
        language: Some("fr-FR".into()),
        platform: Some("MacIntel".into()),
        screen_width: Some(1512),
        screen_height: Some(982),
        color_depth: Some(30),
        timezone: Some("Europe/Paris".into()),
        touch_support: Some(false),
        cookies_enabled: Some(true),
        ..Default::default()
    }
}

fn env() -> Arc<dyn Environment> {
    Arc::new(ProfileEnvironment::new(profile()))
}

fn fast_options() -> SessionOptions {
    SessionOptions {
        refresh_interval: Duration::from_millis(150),
        list_interval: Duration::from_millis(100),
        initial_list_delay: Duration::from_millis(10),
        debug_interval: None,
        collector: CollectorOptions {
            audio_window: Duration::from_millis(1),
            ..Default::default()
        },
    }
}

fn engine() -> DerivationEngine {
    DerivationEngine::from_namespace_str(DEFAULT_NAMESPACE).unwrap()
}

async fn spawn_gateway() -> (SocketAddr, Arc<RegistryStore>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let store = Arc::new(RegistryStore::in_memory());
    let state = GatewayState::new(store.clone(), &ServerConfig::default());
    tokio::spawn(printboard_gateway::serve(listener, state));
    (addr, store)
}

async fn spawn_router(router: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, router).await });
    addr
}

fn client(addr: SocketAddr, timeout_ms: u64) -> SyncClient {
    SyncClient::new(format!("http://{}/", addr), Duration::from_millis(timeout_ms)).unwrap()
}

/// Wait until `pred` holds for the session's view.
async fn wait_for(handle: &SessionHandle, pred: impl Fn(&View) -> bool) -> View {
    let mut rx = handle.subscribe();
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            if pred(&rx.borrow_and_update()) {
                return rx.borrow().clone();
            }
            rx.changed().await.unwrap();
        }
    })
    .await
    .expect("view never reached the expected state")
}

// ===========================================================================
// Transport
// ===========================================================================

#[tokio::test]
async fn transport_register_list_debug() {
    let (addr, _store) = spawn_gateway().await;
    let client = client(addr, 2_000);
    assert_eq!(client.base_url(), format!("http://{}", addr));

    let fp = engine().derive(&SignalSet::default()).unwrap();
    let registered = client.register(&fp).await.unwrap();
    assert!(registered.success);
    assert_eq!(registered.count, 1);
    assert_eq!(registered.storage_type, BackendKind::InMemory);

    let listed = client.list().await.unwrap();
    assert_eq!(listed.fingerprints.len(), 1);
    assert_eq!(listed.fingerprints[0].id, fp.id);

    let debug = client.debug().await.unwrap();
    assert_eq!(debug.count, 1);
    assert_eq!(debug.fingerprints[0].id, fp.short_id());
}

#[tokio::test]
async fn server_error_maps_to_status_with_details() {
    let router = Router::new().route(
        FINGERPRINTS_PATH,
        get(|| async {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorBody::new("Failed to retrieve fingerprints", "disk on fire")),
            )
        }),
    );
    let addr = spawn_router(router).await;
    let err = client(addr, 2_000).list().await.unwrap_err();
    assert!(matches!(err, TransportError::Status { status: 500, ref details } if details == "disk on fire"));
    assert_eq!(err.to_string(), "HTTP error! status: 500, details: disk on fire");
}

#[tokio::test]
async fn slow_server_times_out() {
    let router = Router::new().route(
        FINGERPRINTS_PATH,
        get(|| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            "late"
        }),
    );
    let addr = spawn_router(router).await;
    let err = client(addr, 100).list().await.unwrap_err();
    assert!(matches!(err, TransportError::Timeout(100)), "got {:?}", err);
}

#[tokio::test]
async fn connection_refused_is_request_error() {
    let addr = {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap()
    };
    let err = client(addr, 1_000).list().await.unwrap_err();
    assert!(matches!(err, TransportError::Request(_)), "got {:?}", err);
}

// ===========================================================================
// Session
// ===========================================================================

#[tokio::test]
async fn session_registers_and_sees_itself() {
    let (addr, store) = spawn_gateway().await;
    let handle = SyncSession::new(client(addr, 1_000), engine(), fast_options()).spawn(env());

    let view = wait_for(&handle, |v| {
        v.last_fetch().is_some() && v.last_registered().is_some()
    })
    .await;
    let own = view.own().unwrap().clone();
    assert!(view.fingerprints().iter().any(|f| f.id == own.id));
    assert_eq!(view.storage_type(), Some(BackendKind::InMemory));
    assert!(view.advisory().is_none());
    assert_eq!(own.details.browser, "Safari");
    assert_eq!(own.details.os, "MacOS");

    let stored = store.list(LIST_MAX_AGE_MS).await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].id, own.id);

    handle.shutdown().await;
}

#[tokio::test]
async fn session_refreshes_server_timestamp() {
    let (addr, store) = spawn_gateway().await;
    let handle = SyncSession::new(client(addr, 1_000), engine(), fast_options()).spawn(env());

    wait_for(&handle, |v| v.last_registered().is_some()).await;
    let first = store.list(LIST_MAX_AGE_MS).await.unwrap()[0].timestamp;
    tokio::time::sleep(Duration::from_millis(400)).await;
    let later = store.list(LIST_MAX_AGE_MS).await.unwrap()[0].timestamp;
    assert!(later > first, "timestamp not refreshed: {} -> {}", first, later);
    assert_eq!(store.count().await.unwrap(), 1);

    handle.shutdown().await;
}

#[tokio::test]
async fn two_sessions_with_same_configuration_collapse() {
    let (addr, store) = spawn_gateway().await;
    let a = SyncSession::new(client(addr, 1_000), engine(), fast_options()).spawn(env());
    let b = SyncSession::new(client(addr, 1_000), engine(), fast_options()).spawn(env());
    wait_for(&a, |v| v.last_registered().is_some()).await;
    wait_for(&b, |v| v.last_registered().is_some()).await;
    assert_eq!(store.count().await.unwrap(), 1);
    assert_eq!(a.view().own().unwrap().id, b.view().own().unwrap().id);
    a.shutdown().await;
    b.shutdown().await;
}

#[tokio::test]
async fn unreachable_server_keeps_own_fingerprint_visible() {
    let addr = {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap()
    };
    let handle = SyncSession::new(client(addr, 500), engine(), fast_options()).spawn(env());

    let view = wait_for(&handle, |v| v.advisory().is_some()).await;
    assert_eq!(view.fingerprints().len(), 1);
    assert_eq!(view.fingerprints()[0].id, view.own().unwrap().id);
    assert_ne!(view.registration, RegistrationState::Registered);
    assert!(view.storage_type().is_none());

    handle.shutdown().await;
}

#[tokio::test]
async fn debug_timer_only_runs_when_enabled() {
    let (addr, _store) = spawn_gateway().await;

    let quiet = SyncSession::new(client(addr, 1_000), engine(), fast_options()).spawn(env());
    let view = wait_for(&quiet, |v| v.last_fetch().is_some()).await;
    assert!(view.debug().is_none());
    quiet.shutdown().await;

    let options = SessionOptions {
        debug_interval: Some(Duration::from_millis(100)),
        ..fast_options()
    };
    let chatty = SyncSession::new(client(addr, 1_000), engine(), options).spawn(env());
    let view = wait_for(&chatty, |v| v.debug().map_or(false, |d| d.count == 1)).await;
    assert_eq!(view.debug().unwrap().storage_type, BackendKind::InMemory);
    chatty.shutdown().await;
}

// ===========================================================================
// Cancellation
// ===========================================================================

/// Gateway stand-in that counts every request it sees.
async fn counting_server() -> (SocketAddr, Arc<AtomicUsize>) {
    let hits = Arc::new(AtomicUsize::new(0));
    let (h1, h2) = (hits.clone(), hits.clone());
    let router = Router::new().route(
        FINGERPRINTS_PATH,
        get(move || {
            let hits = h1.clone();
            async move {
                hits.fetch_add(1, Ordering::SeqCst);
                Json(ListResponse {
                    fingerprints: vec![],
                    storage_type: BackendKind::Durable,
                })
            }
        })
        .post(move || {
            let hits = h2.clone();
            async move {
                hits.fetch_add(1, Ordering::SeqCst);
                Json(RegisterResponse {
                    success: true,
                    count: 1,
                    storage_type: BackendKind::Durable,
                })
            }
        }),
    );
    (spawn_router(router).await, hits)
}

#[tokio::test]
async fn shutdown_stops_every_timer() {
    let (addr, hits) = counting_server().await;
    let handle = SyncSession::new(client(addr, 1_000), engine(), fast_options()).spawn(env());
    wait_for(&handle, |v| v.last_fetch().is_some() && v.last_registered().is_some()).await;
    assert!(!handle.is_finished());

    handle.shutdown().await;
    let after_shutdown = hits.load(Ordering::SeqCst);
    tokio::time::sleep(Duration::from_millis(500)).await;
    assert_eq!(hits.load(Ordering::SeqCst), after_shutdown);
}

#[tokio::test]
async fn dropping_the_handle_cancels_the_session() {
    let (addr, hits) = counting_server().await;
    let handle = SyncSession::new(client(addr, 1_000), engine(), fast_options()).spawn(env());
    wait_for(&handle, |v| v.last_fetch().is_some()).await;

    drop(handle);
    // let any request already on the wire land
    tokio::time::sleep(Duration::from_millis(100)).await;
    let settled = hits.load(Ordering::SeqCst);
    tokio::time::sleep(Duration::from_millis(500)).await;
    assert_eq!(hits.load(Ordering::SeqCst), settled);
}
