// Shared setup for integration tests: a mock endpoint wired to a real gateway and cache.
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use lcu_monitor_lib::cache::{BackoffPolicy, CacheSettings, PollingCache};
use lcu_monitor_lib::lcu::{
  ApiGateway, ConnectionInfo, ConnectionSource, FixedEndpoint, GameSnapshot, GatewaySettings, LocateError,
  SnapshotAssembler, SnapshotSource,
};
use lcu_monitor_lib::mock::{MockEndpoint, MockScenario};

pub struct Harness {
  pub endpoint: MockEndpoint,
  pub gateway: Arc<ApiGateway>,
  pub assembler: Arc<SnapshotAssembler>,
  pub cache: Arc<PollingCache>,
}

// No rate limit and short backoff so tests can drive cycles back to back.
pub fn fast_settings() -> CacheSettings {
  CacheSettings {
    min_refresh_interval: Duration::ZERO,
    backoff: BackoffPolicy::new(Duration::from_millis(200)),
    listener_timeout: Duration::from_secs(1),
  }
}

pub async fn harness(scenario: MockScenario) -> Harness {
  let endpoint = MockEndpoint::start_with(0, scenario)
    .await
    .expect("bind mock endpoint");
  let connection = endpoint.connection_info();
  harness_with(endpoint, connection)
}

// Same as `harness` but the gateway presents `connection` instead of the endpoint's own.
pub fn harness_with(endpoint: MockEndpoint, connection: ConnectionInfo) -> Harness {
  harness_with_source(endpoint, Arc::new(FixedEndpoint(connection)), GatewaySettings::default())
}

// Full control over discovery and request timeouts.
pub fn harness_with_source(
  endpoint: MockEndpoint,
  source: Arc<dyn ConnectionSource>,
  settings: GatewaySettings,
) -> Harness {
  let gateway = Arc::new(ApiGateway::with_settings(source, settings).expect("build HTTP client"));
  let assembler = Arc::new(SnapshotAssembler::new(Arc::clone(&gateway)));
  let snapshot_source: Arc<dyn SnapshotSource> = assembler.clone();
  let cache = Arc::new(PollingCache::new(snapshot_source, fast_settings()));
  Harness {
    endpoint,
    gateway,
    assembler,
    cache,
  }
}

// Hands out `stale` on the first discovery and `fresh` on every later one,
// like a client that restarted with a new token.
pub struct RestartedClient {
  stale: ConnectionInfo,
  fresh: ConnectionInfo,
  calls: AtomicUsize,
}

impl RestartedClient {
  pub fn new(stale: ConnectionInfo, fresh: ConnectionInfo) -> Arc<Self> {
    Arc::new(Self {
      stale,
      fresh,
      calls: AtomicUsize::new(0),
    })
  }

  pub fn calls(&self) -> usize {
    self.calls.load(Ordering::SeqCst)
  }
}

impl ConnectionSource for RestartedClient {
  fn locate(&self) -> Result<ConnectionInfo, LocateError> {
    if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
      Ok(self.stale.clone())
    } else {
      Ok(self.fresh.clone())
    }
  }
}

// Subscribe a listener that only counts its calls.
pub fn count_notifications(cache: &PollingCache) -> Arc<AtomicUsize> {
  let calls = Arc::new(AtomicUsize::new(0));
  let counter = Arc::clone(&calls);
  cache.subscribe(move |_| {
    counter.fetch_add(1, Ordering::SeqCst);
  });
  calls
}

// Poll the cache until `predicate` holds for its snapshot or `timeout` runs out.
pub async fn wait_for_snapshot<F>(cache: &PollingCache, timeout: Duration, predicate: F) -> Arc<GameSnapshot>
where
  F: Fn(&GameSnapshot) -> bool,
{
  let deadline = tokio::time::Instant::now() + timeout;
  loop {
    if let Some(snapshot) = cache.snapshot() {
      if predicate(&snapshot) {
        return snapshot;
      }
    }
    if tokio::time::Instant::now() >= deadline {
      panic!("snapshot did not reach the expected state in {:?}", timeout);
    }
    tokio::time::sleep(Duration::from_millis(10)).await;
  }
}
