// Mock endpoint - a local HTTP server that answers the client routes the monitor reads

use axum::extract::{Path, Request, State};
use axum::http::{header, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use parking_lot::RwLock;
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::data::{champion_details, rune_details, summoner_spells, MockScenario};
use crate::lcu::types::{basic_credential, ConnectionInfo};

pub const MOCK_USER: &str = "riot";
pub const MOCK_TOKEN: &str = "mock-token";

const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(2);

struct MockState {
  scenario: RwLock<MockScenario>,
  authorization: String,
  requests: AtomicUsize,
}

/// A running mock endpoint. Dropping it without `shutdown` leaves the
/// server task running until the runtime ends.
pub struct MockEndpoint {
  addr: SocketAddr,
  credential: String,
  state: Arc<MockState>,
  cancel: CancellationToken,
  handle: JoinHandle<()>,
}

impl MockEndpoint {
  /// Bind 127.0.0.1:`port` (0 for an ephemeral port) and serve the default scenario.
  pub async fn start(port: u16) -> std::io::Result<Self> {
    Self::start_with(port, MockScenario::default()).await
  }

  pub async fn start_with(port: u16, scenario: MockScenario) -> std::io::Result<Self> {
    let listener = TcpListener::bind(("127.0.0.1", port)).await?;
    let addr = listener.local_addr()?;
    let credential = basic_credential(MOCK_USER, MOCK_TOKEN);

    let state = Arc::new(MockState {
      scenario: RwLock::new(scenario),
      authorization: format!("Basic {}", credential),
      requests: AtomicUsize::new(0),
    });

    let app = router(Arc::clone(&state));
    let cancel = CancellationToken::new();
    let serve_cancel = cancel.clone();
    let handle = tokio::spawn(async move {
      let server = axum::serve(listener, app)
        .with_graceful_shutdown(async move { serve_cancel.cancelled().await });
      if let Err(e) = server.await {
        warn!(error = %e, "mock endpoint stopped with an error");
      }
    });

    info!(%addr, "mock endpoint listening");
    Ok(Self {
      addr,
      credential,
      state,
      cancel,
      handle,
    })
  }

  pub fn addr(&self) -> SocketAddr {
    self.addr
  }

  pub fn base_url(&self) -> String {
    format!("http://{}", self.addr)
  }

  /// Connection details the gateway needs to reach this endpoint.
  pub fn connection_info(&self) -> ConnectionInfo {
    ConnectionInfo::new(self.base_url(), self.credential.clone())
  }

  pub fn scenario(&self) -> MockScenario {
    self.state.scenario.read().clone()
  }

  pub fn set_scenario(&self, scenario: MockScenario) {
    *self.state.scenario.write() = scenario;
  }

  /// Edit the live scenario in place.
  pub fn update<F>(&self, edit: F)
  where
    F: FnOnce(&mut MockScenario),
  {
    edit(&mut self.state.scenario.write());
  }

  pub fn set_phase(&self, phase: &str) {
    self.update(|s| s.phase = phase.to_string());
  }

  /// Answer 503 everywhere. This models a client that is up but not
  /// serving; use `shutdown` to model one that is gone.
  pub fn set_offline(&self, offline: bool) {
    self.update(|s| s.offline = offline);
  }

  pub fn fail_summoner(&self, summoner_id: u64) {
    self.update(|s| {
      s.failing_summoners.insert(summoner_id);
    });
  }

  /// Delay the summoner lookup for `summoner_id` by the scenario's `slow_response`.
  pub fn slow_summoner(&self, summoner_id: u64) {
    self.update(|s| {
      s.slow_summoners.insert(summoner_id);
    });
  }

  /// Requests that passed the credential check.
  pub fn request_count(&self) -> usize {
    self.state.requests.load(Ordering::SeqCst)
  }

  /// Stop accepting requests and close the port.
  pub async fn shutdown(self) {
    self.cancel.cancel();
    let abort = self.handle.abort_handle();
    if tokio::time::timeout(SHUTDOWN_TIMEOUT, self.handle).await.is_err() {
      warn!("mock endpoint did not drain in time, aborting");
      abort.abort();
    }
    info!(addr = %self.addr, "mock endpoint stopped");
  }
}

fn router(state: Arc<MockState>) -> Router {
  Router::new()
    .route("/lol-gameflow/v1/session", get(gameflow_session))
    .route("/lol-gameflow/v1/gameflow-phase", get(gameflow_phase))
    .route("/lol-champ-select/v1/session", get(champ_select_session))
    .route("/lol-summoner/v1/current-summoner", get(current_summoner))
    .route("/lol-summoner/v1/summoners/{id}", get(summoner))
    .route("/lol-summoner/v1/summoner-spells", get(spells))
    .route("/lol-champions/v1/inventories/{id}/champions", get(champion))
    .route("/lol-perks/v1/perks/{id}", get(rune))
    .fallback(not_found)
    .layer(middleware::from_fn_with_state(Arc::clone(&state), guard))
    .with_state(state)
}

/// Answers 503 while offline and 401 without the expected credential.
async fn guard(State(state): State<Arc<MockState>>, request: Request, next: Next) -> Response {
  let offline = state.scenario.read().offline;
  if offline {
    return (StatusCode::SERVICE_UNAVAILABLE, Json(error_body("client offline"))).into_response();
  }

  let authorized = request
    .headers()
    .get(header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .is_some_and(|v| v == state.authorization);
  if !authorized {
    warn!(path = %request.uri().path(), "rejected request without valid credentials");
    return (StatusCode::UNAUTHORIZED, Json(error_body("invalid credentials"))).into_response();
  }

  state.requests.fetch_add(1, Ordering::SeqCst);
  debug!(path = %request.uri().path(), "mock request");
  next.run(request).await
}

fn error_body(message: &str) -> Value {
  json!({ "errorCode": "RPC_ERROR", "httpStatus": 0, "message": message })
}

async fn gameflow_session(State(state): State<Arc<MockState>>) -> Json<Value> {
  Json(state.scenario.read().gameflow_session())
}

async fn gameflow_phase(State(state): State<Arc<MockState>>) -> Json<Value> {
  Json(Value::String(state.scenario.read().phase.clone()))
}

async fn champ_select_session(State(state): State<Arc<MockState>>) -> Result<Json<Value>, StatusCode> {
  state
    .scenario
    .read()
    .champ_select_session()
    .map(Json)
    .ok_or(StatusCode::NOT_FOUND)
}

async fn current_summoner(State(state): State<Arc<MockState>>) -> Json<Value> {
  Json(state.scenario.read().current_summoner())
}

async fn summoner(
  State(state): State<Arc<MockState>>,
  Path(id): Path<u64>,
) -> Result<Json<Value>, StatusCode> {
  let delay = state.scenario.read().summoner_delay(id);
  if let Some(delay) = delay {
    tokio::time::sleep(delay).await;
  }
  state.scenario.read().summoner(id).map(Json).ok_or(StatusCode::NOT_FOUND)
}

async fn spells() -> Json<Value> {
  Json(summoner_spells())
}

async fn champion(Path(id): Path<i64>) -> Json<Value> {
  Json(champion_details(id))
}

async fn rune(Path(id): Path<i64>) -> Json<Value> {
  Json(rune_details(id))
}

async fn not_found() -> (StatusCode, Json<Value>) {
  (StatusCode::NOT_FOUND, Json(error_body("resource not found")))
}
