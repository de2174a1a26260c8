// system-tests/src/sample_sut.rs
// ============================================================================
// Module: Sample SUT
// Description: In-memory key-value service used as the system under test.
// Purpose: Give lifecycle tests observable state with a reinitializing reset.
// Dependencies: sut-control-core, axum, tokio
// ============================================================================

//! ## Overview
//! The sample SUT is a loopback HTTP service with a key-value store, a
//! health probe, and a reset hook that reinitializes the store. It
//! implements [`SutDriver`] for embedded launches and doubles as an
//! independently started instance for remote-handle tests.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use axum::extract::Path;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::routing::get;
use axum::routing::post;
use sut_control_core::SutDriver;
use sut_control_core::SutEndpoint;
use sut_control_core::SutError;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

// ============================================================================
// SECTION: Store
// ============================================================================

/// Shared key-value store backing one sample SUT instance.
type SharedStore = Arc<Mutex<BTreeMap<String, String>>>;

// ============================================================================
// SECTION: Sample SUT
// ============================================================================

/// Bound serving state for a running sample SUT.
struct BoundInstance {
    /// Address the instance is listening on.
    addr: SocketAddr,
    /// Background task serving requests.
    join: JoinHandle<()>,
}

/// In-memory key-value SUT with a reinitializing reset hook.
///
/// # Invariants
/// - `bound` is present exactly while the instance is serving.
/// - Reset restores an empty store without rebinding the listener.
#[derive(Default)]
pub struct SampleSut {
    /// Key-value store; cleared on reset.
    store: SharedStore,
    /// Serving state, present while running.
    bound: Mutex<Option<BoundInstance>>,
}

impl SampleSut {
    /// Creates a stopped sample SUT with an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the bound address while the instance is running.
    pub async fn bound_addr(&self) -> Option<SocketAddr> {
        self.bound.lock().await.as_ref().map(|instance| instance.addr)
    }
}

#[async_trait]
impl SutDriver for SampleSut {
    async fn start(&self) -> Result<SutEndpoint, SutError> {
        let mut bound = self.bound.lock().await;
        if bound.is_some() {
            return Err(SutError::Boot("sample sut is already running".to_string()));
        }
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .map_err(|err| SutError::Boot(format!("sample sut bind failed: {err}")))?;
        let addr = listener
            .local_addr()
            .map_err(|err| SutError::Boot(format!("sample sut address unavailable: {err}")))?;
        let app = build_app(Arc::clone(&self.store));
        let join = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        *bound = Some(BoundInstance {
            addr,
            join,
        });
        Ok(SutEndpoint::new(format!("http://{addr}")))
    }

    async fn is_ready(&self) -> bool {
        self.bound.lock().await.is_some()
    }

    async fn reset(&self) -> Result<(), SutError> {
        self.store.lock().await.clear();
        Ok(())
    }

    async fn stop(&self) -> Result<(), SutError> {
        if let Some(instance) = self.bound.lock().await.take() {
            instance.join.abort();
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Routes
// ============================================================================

/// Builds the sample SUT route table.
fn build_app(store: SharedStore) -> Router {
    Router::new()
        .route("/health", get(handle_health))
        .route("/reset", post(handle_reset))
        .route("/kv/{key}", get(handle_get_key).put(handle_put_key))
        .with_state(store)
}

/// Answers health probes.
async fn handle_health() -> StatusCode {
    StatusCode::OK
}

/// Reinitializes the store to its empty baseline.
async fn handle_reset(State(store): State<SharedStore>) -> StatusCode {
    store.lock().await.clear();
    StatusCode::NO_CONTENT
}

/// Returns the value stored under a key.
async fn handle_get_key(
    State(store): State<SharedStore>,
    Path(key): Path<String>,
) -> Response {
    match store.lock().await.get(&key) {
        Some(value) => (StatusCode::OK, value.clone()).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

/// Stores a value under a key.
async fn handle_put_key(
    State(store): State<SharedStore>,
    Path(key): Path<String>,
    body: String,
) -> StatusCode {
    store.lock().await.insert(key, body);
    StatusCode::NO_CONTENT
}
