// Polling cache - owns the current snapshot and the background poll loop

use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::backoff::BackoffPolicy;
use super::clock::{Clock, SystemClock};
use super::listeners::{ListenerHandle, ListenerRegistry};
use crate::lcu::{AssembleError, GameSnapshot, SnapshotSource};

/// Longest `stop()` waits for the loop before aborting it.
pub const STOP_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy)]
pub struct CacheSettings {
  /// Refreshes closer together than this are skipped.
  pub min_refresh_interval: Duration,
  pub backoff: BackoffPolicy,
  pub listener_timeout: Duration,
}

impl Default for CacheSettings {
  fn default() -> Self {
    Self {
      min_refresh_interval: Duration::from_secs(2),
      backoff: BackoffPolicy::default(),
      listener_timeout: Duration::from_secs(1),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
  Idle,
  Polling,
}

#[derive(Debug)]
pub enum RefreshOutcome {
  /// A new snapshot replaced the cached one and listeners were notified.
  Updated(Arc<GameSnapshot>),
  /// Skipped: the last successful refresh is too recent.
  RateLimited,
  /// The cached snapshot was kept.
  Failed(AssembleError),
  /// The loop was stopped while the cycle was in flight; the result was discarded.
  Cancelled,
}

/// What the UI layer renders as connectivity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionStatus {
  pub connected: bool,
  pub has_data: bool,
  pub last_update: Option<DateTime<Utc>>,
  pub consecutive_failures: u32,
  pub last_error: Option<String>,
}

#[derive(Debug, Default)]
struct Health {
  connected: bool,
  consecutive_failures: u32,
  last_error: Option<String>,
}

struct PollTask {
  cancel: CancellationToken,
  handle: JoinHandle<()>,
}

/// Holds the latest snapshot and runs the poll loop that refreshes it.
///
/// The loop is the only writer. Readers get an `Arc` to a complete snapshot
/// and never wait on the network.
pub struct PollingCache {
  source: Arc<dyn SnapshotSource>,
  clock: Arc<dyn Clock>,
  settings: CacheSettings,
  snapshot: RwLock<Option<Arc<GameSnapshot>>>,
  last_refresh: Mutex<Option<Instant>>,
  health: RwLock<Health>,
  listeners: ListenerRegistry,
  // Held for a whole cycle so a forced refresh never overlaps a tick.
  cycle: tokio::sync::Mutex<()>,
  task: Mutex<Option<PollTask>>,
}

impl PollingCache {
  pub fn new(source: Arc<dyn SnapshotSource>, settings: CacheSettings) -> Self {
    Self::with_clock(source, settings, Arc::new(SystemClock))
  }

  pub fn with_clock(
    source: Arc<dyn SnapshotSource>,
    settings: CacheSettings,
    clock: Arc<dyn Clock>,
  ) -> Self {
    Self {
      source,
      clock,
      settings,
      snapshot: RwLock::new(None),
      last_refresh: Mutex::new(None),
      health: RwLock::new(Health::default()),
      listeners: ListenerRegistry::new(),
      cycle: tokio::sync::Mutex::new(()),
      task: Mutex::new(None),
    }
  }

  pub fn settings(&self) -> &CacheSettings {
    &self.settings
  }

  /// Latest snapshot, or `None` before the first successful poll.
  pub fn snapshot(&self) -> Option<Arc<GameSnapshot>> {
    self.snapshot.read().clone()
  }

  pub fn is_connected(&self) -> bool {
    self.health.read().connected
  }

  pub fn connection_status(&self) -> ConnectionStatus {
    let snapshot = self.snapshot();
    let health = self.health.read();
    ConnectionStatus {
      connected: health.connected,
      has_data: snapshot.is_some(),
      last_update: snapshot.map(|s| s.captured_at),
      consecutive_failures: health.consecutive_failures,
      last_error: health.last_error.clone(),
    }
  }

  pub fn subscribe<F>(&self, listener: F) -> ListenerHandle
  where
    F: Fn(Arc<GameSnapshot>) + Send + Sync + 'static,
  {
    self.listeners.subscribe(listener)
  }

  pub fn unsubscribe(&self, handle: ListenerHandle) -> bool {
    self.listeners.unsubscribe(handle)
  }

  pub fn listener_count(&self) -> usize {
    self.listeners.len()
  }

  pub fn state(&self) -> PollState {
    match self.task.lock().as_ref() {
      Some(task) if !task.handle.is_finished() => PollState::Polling,
      _ => PollState::Idle,
    }
  }

  /// Start the poll loop. Does nothing if it is already running.
  pub fn start(self: &Arc<Self>, interval: Duration) {
    let mut task = self.task.lock();
    if let Some(running) = task.as_ref() {
      if !running.handle.is_finished() {
        debug!("poll loop already running");
        return;
      }
    }

    let cancel = CancellationToken::new();
    let cache = Arc::clone(self);
    let loop_cancel = cancel.clone();
    let handle = tokio::spawn(async move { cache.poll_loop(interval, loop_cancel).await });

    info!(?interval, "poll loop started");
    *task = Some(PollTask { cancel, handle });
  }

  /// Stop the poll loop and wait for it to finish, at most `STOP_TIMEOUT`.
  pub async fn stop(&self) {
    let Some(PollTask { cancel, handle }) = self.task.lock().take() else {
      return;
    };
    cancel.cancel();

    let abort = handle.abort_handle();
    match tokio::time::timeout(STOP_TIMEOUT, handle).await {
      Ok(_) => info!("poll loop stopped"),
      Err(_) => {
        warn!(timeout = ?STOP_TIMEOUT, "poll loop did not stop in time, aborting");
        abort.abort();
      }
    }
  }

  /// Stop polling and drop every listener.
  pub async fn shutdown(&self) {
    self.stop().await;
    self.listeners.clear();
  }

  /// Run one cycle now, outside the schedule. Still rate limited.
  pub async fn refresh_now(&self) -> RefreshOutcome {
    self.run_cycle(None).await
  }

  async fn poll_loop(self: Arc<Self>, interval: Duration, cancel: CancellationToken) {
    loop {
      if cancel.is_cancelled() {
        break;
      }

      let failures = match self.run_cycle(Some(&cancel)).await {
        RefreshOutcome::Cancelled => break,
        RefreshOutcome::Failed(_) => self.health.read().consecutive_failures,
        RefreshOutcome::Updated(_) | RefreshOutcome::RateLimited => 0,
      };

      let delay = self.settings.backoff.delay(interval, failures);
      if failures > 0 {
        debug!(?delay, failures, "backing off");
      }

      tokio::select! {
        _ = cancel.cancelled() => break,
        _ = tokio::time::sleep(delay) => {}
      }
    }
    debug!("poll loop exited");
  }

  async fn run_cycle(&self, cancel: Option<&CancellationToken>) -> RefreshOutcome {
    let _cycle = self.cycle.lock().await;

    if self.is_rate_limited() {
      debug!("refresh skipped, last refresh too recent");
      return RefreshOutcome::RateLimited;
    }

    let result = self.source.assemble().await;
    if cancel.is_some_and(CancellationToken::is_cancelled) {
      return RefreshOutcome::Cancelled;
    }

    match result {
      Ok(snapshot) => {
        let snapshot = Arc::new(snapshot);
        *self.snapshot.write() = Some(Arc::clone(&snapshot));
        *self.last_refresh.lock() = Some(self.clock.now());
        self.record_success();

        debug!(
          phase = %snapshot.phase,
          blue = snapshot.teams.blue.len(),
          red = snapshot.teams.red.len(),
          "snapshot updated"
        );
        self
          .listeners
          .notify(Arc::clone(&snapshot), self.settings.listener_timeout)
          .await;
        RefreshOutcome::Updated(snapshot)
      }
      Err(e) => {
        self.record_failure(&e);
        RefreshOutcome::Failed(e)
      }
    }
  }

  fn is_rate_limited(&self) -> bool {
    match *self.last_refresh.lock() {
      Some(last) => self.clock.now().saturating_duration_since(last) < self.settings.min_refresh_interval,
      None => false,
    }
  }

  fn record_success(&self) {
    let mut health = self.health.write();
    if !health.connected {
      info!("League client data available");
    }
    *health = Health {
      connected: true,
      consecutive_failures: 0,
      last_error: None,
    };
  }

  fn record_failure(&self, error: &AssembleError) {
    let mut health = self.health.write();
    health.consecutive_failures = health.consecutive_failures.saturating_add(1);
    health.last_error = Some(error.to_string());

    if error.is_connectivity() {
      if health.connected || health.consecutive_failures == 1 {
        info!(error = %error, "League client unavailable, keeping last snapshot");
      } else {
        debug!(error = %error, failures = health.consecutive_failures, "League client still unavailable");
      }
      health.connected = false;
    } else {
      warn!(error = %error, failures = health.consecutive_failures, "poll failed, keeping last snapshot");
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::cache::clock::ManualClock;
  use crate::lcu::{ApiError, GamePhase, NamedId, PhaseTimer, PlayerRecord, TeamSide, Teams};
  use async_trait::async_trait;
  use std::collections::VecDeque;
  use std::sync::atomic::{AtomicUsize, Ordering};

  /// Replays scripted results; repeats the last one when the script runs out.
  struct ScriptedSource {
    script: Mutex<VecDeque<Result<GamePhase, &'static str>>>,
    calls: AtomicUsize,
  }

  impl ScriptedSource {
    fn new(script: Vec<Result<GamePhase, &'static str>>) -> Arc<Self> {
      Arc::new(Self {
        script: Mutex::new(script.into()),
        calls: AtomicUsize::new(0),
      })
    }

    fn calls(&self) -> usize {
      self.calls.load(Ordering::SeqCst)
    }
  }

  #[async_trait]
  impl SnapshotSource for ScriptedSource {
    async fn assemble(&self) -> Result<GameSnapshot, AssembleError> {
      self.calls.fetch_add(1, Ordering::SeqCst);
      let next = {
        let mut script = self.script.lock();
        if script.len() > 1 {
          script.pop_front()
        } else {
          script.front().cloned()
        }
      };
      match next {
        Some(Ok(phase)) => Ok(GameSnapshot::outside_champ_select(phase)),
        Some(Err(_)) | None => Err(AssembleError::Api(ApiError::Disconnected)),
      }
    }
  }

  /// Every field of snapshot `n` is derived from `n`.
  struct GenerationSource {
    generation: AtomicUsize,
  }

  #[async_trait]
  impl SnapshotSource for GenerationSource {
    async fn assemble(&self) -> Result<GameSnapshot, AssembleError> {
      let n = self.generation.fetch_add(1, Ordering::SeqCst) as i64;
      let player = |cell_id: i64, side| PlayerRecord {
        summoner_name: format!("gen-{}", n),
        champion: NamedId::new(n, format!("champ-{}", n)),
        abilities: [NamedId::new(n, "a"), NamedId::new(n, "b")],
        runes: Vec::new(),
        team_side: side,
        cell_id,
      };
      tokio::task::yield_now().await;
      Ok(GameSnapshot {
        phase: GamePhase::ChampSelect,
        teams: Teams {
          blue: (0..5).map(|c| player(c, TeamSide::Blue)).collect(),
          red: (5..10).map(|c| player(c, TeamSide::Red)).collect(),
        },
        local_player_cell_id: n,
        timer: PhaseTimer {
          remaining_seconds: n as f64,
          total_seconds: n as f64,
          is_infinite: false,
        },
        captured_at: Utc::now(),
      })
    }
  }

  /// Tracks how many `assemble` calls run at once.
  #[derive(Default)]
  struct InFlightSource {
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    calls: AtomicUsize,
  }

  #[async_trait]
  impl SnapshotSource for InFlightSource {
    async fn assemble(&self) -> Result<GameSnapshot, AssembleError> {
      self.calls.fetch_add(1, Ordering::SeqCst);
      let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
      self.max_in_flight.fetch_max(now, Ordering::SeqCst);
      tokio::time::sleep(Duration::from_millis(20)).await;
      self.in_flight.fetch_sub(1, Ordering::SeqCst);
      Ok(GameSnapshot::outside_champ_select(GamePhase::Lobby))
    }
  }

  fn settings(min_refresh_interval: Duration) -> CacheSettings {
    CacheSettings {
      min_refresh_interval,
      backoff: BackoffPolicy::new(Duration::from_millis(200)),
      listener_timeout: Duration::from_secs(1),
    }
  }

  #[tokio::test]
  async fn test_no_data_before_first_refresh() {
    let cache = PollingCache::new(ScriptedSource::new(vec![Ok(GamePhase::Lobby)]), settings(Duration::ZERO));
    assert!(cache.snapshot().is_none());
    let status = cache.connection_status();
    assert!(!status.connected);
    assert!(!status.has_data);
    assert_eq!(status.last_update, None);
  }

  /// Test: two forced refreshes inside the minimum interval
  ///
  /// Expected: the second is a no-op and the cached snapshot is untouched.
  #[tokio::test]
  async fn test_refresh_now_is_rate_limited() {
    let clock = Arc::new(ManualClock::new());
    let source = ScriptedSource::new(vec![Ok(GamePhase::Lobby), Ok(GamePhase::Matchmaking)]);
    let cache = PollingCache::with_clock(source.clone(), settings(Duration::from_secs(3)), clock.clone());

    let first = match cache.refresh_now().await {
      RefreshOutcome::Updated(snapshot) => snapshot,
      other => panic!("expected update, got {:?}", other),
    };

    clock.advance(Duration::from_secs(1));
    assert!(matches!(cache.refresh_now().await, RefreshOutcome::RateLimited));
    assert_eq!(source.calls(), 1);
    let cached = cache.snapshot().unwrap();
    assert!(Arc::ptr_eq(&cached, &first));
    assert_eq!(cached.captured_at, first.captured_at);

    clock.advance(Duration::from_secs(2));
    match cache.refresh_now().await {
      RefreshOutcome::Updated(snapshot) => assert_eq!(snapshot.phase, GamePhase::Matchmaking),
      other => panic!("expected update, got {:?}", other),
    }
  }

  #[tokio::test]
  async fn test_listeners_notified_on_every_success_even_without_change() {
    let clock = Arc::new(ManualClock::new());
    let source = ScriptedSource::new(vec![Ok(GamePhase::Lobby)]);
    let cache = PollingCache::with_clock(source, settings(Duration::from_secs(1)), clock.clone());

    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    cache.subscribe(move |_| {
      counter.fetch_add(1, Ordering::SeqCst);
    });

    for _ in 0..3 {
      assert!(matches!(cache.refresh_now().await, RefreshOutcome::Updated(_)));
      clock.advance(Duration::from_secs(1));
    }
    assert_eq!(calls.load(Ordering::SeqCst), 3);
  }

  /// Test: the client disappears after one good poll
  ///
  /// Expected: the last good snapshot stays cached, the cache reports
  /// disconnected and no listener sees the failures.
  #[tokio::test]
  async fn test_failures_keep_last_snapshot_and_skip_listeners() {
    let clock = Arc::new(ManualClock::new());
    let source = ScriptedSource::new(vec![Ok(GamePhase::Lobby), Err("gone")]);
    let cache = PollingCache::with_clock(source, settings(Duration::from_secs(1)), clock.clone());

    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    cache.subscribe(move |_| {
      counter.fetch_add(1, Ordering::SeqCst);
    });

    assert!(matches!(cache.refresh_now().await, RefreshOutcome::Updated(_)));
    assert!(cache.is_connected());
    let good = cache.snapshot().unwrap();

    for _ in 0..3 {
      clock.advance(Duration::from_secs(1));
      assert!(matches!(cache.refresh_now().await, RefreshOutcome::Failed(_)));
    }

    assert!(Arc::ptr_eq(&cache.snapshot().unwrap(), &good));
    let status = cache.connection_status();
    assert!(!status.connected);
    assert!(status.has_data);
    assert_eq!(status.consecutive_failures, 3);
    assert!(status.last_error.is_some());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
  }

  #[tokio::test]
  async fn test_start_is_idempotent_and_stop_returns_to_idle() {
    let source = ScriptedSource::new(vec![Ok(GamePhase::Lobby)]);
    let cache = Arc::new(PollingCache::new(source.clone(), settings(Duration::ZERO)));
    assert_eq!(cache.state(), PollState::Idle);

    cache.start(Duration::from_millis(20));
    cache.start(Duration::from_millis(20));
    assert_eq!(cache.state(), PollState::Polling);

    tokio::time::sleep(Duration::from_millis(120)).await;
    cache.stop().await;
    assert_eq!(cache.state(), PollState::Idle);

    let calls = source.calls();
    assert!(calls >= 2, "expected several polls, got {calls}");
    tokio::time::sleep(Duration::from_millis(80)).await;
    assert_eq!(source.calls(), calls);
    assert_eq!(cache.snapshot().map(|s| s.phase), Some(GamePhase::Lobby));

    // stopping twice is harmless
    cache.stop().await;
  }

  #[tokio::test]
  async fn test_poll_loop_backs_off_while_disconnected() {
    let source = ScriptedSource::new(vec![Err("gone")]);
    let cache = Arc::new(PollingCache::new(source.clone(), settings(Duration::ZERO)));

    cache.start(Duration::from_millis(40));
    tokio::time::sleep(Duration::from_millis(300)).await;
    cache.stop().await;

    // Without backoff this would be about 8 attempts; with doubling it is
    // 0, 80, 160 (+200 capped) ms.
    let calls = source.calls();
    assert!((2..=5).contains(&calls), "unexpected attempt count {calls}");
    assert!(!cache.is_connected());
    assert!(cache.snapshot().is_none());
  }

  /// Test: readers racing the poll loop
  ///
  /// Expected: every snapshot a reader sees comes from a single poll.
  #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
  async fn test_readers_never_see_mixed_snapshots() {
    let source = Arc::new(GenerationSource {
      generation: AtomicUsize::new(0),
    });
    let cache = Arc::new(PollingCache::new(source, settings(Duration::ZERO)));
    cache.start(Duration::from_millis(1));

    let readers: Vec<_> = (0..4)
      .map(|_| {
        let cache = Arc::clone(&cache);
        tokio::spawn(async move {
          let mut seen = 0;
          for _ in 0..2000 {
            if let Some(snapshot) = cache.snapshot() {
              let n = snapshot.local_player_cell_id;
              assert_eq!(snapshot.timer.remaining_seconds, n as f64);
              for player in snapshot.players() {
                assert_eq!(player.champion.id, n);
                assert_eq!(player.summoner_name, format!("gen-{}", n));
              }
              seen += 1;
            }
            tokio::task::yield_now().await;
          }
          seen
        })
      })
      .collect();

    for reader in readers {
      reader.await.unwrap();
    }
    cache.stop().await;
  }

  /// Test: forced refreshes from several tasks while the loop is polling
  ///
  /// Expected: cycles queue up behind each other; the source never runs
  /// two assemblies at once.
  #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
  async fn test_cycles_never_overlap() {
    let source = Arc::new(InFlightSource::default());
    let cache = Arc::new(PollingCache::new(source.clone(), settings(Duration::ZERO)));
    cache.start(Duration::from_millis(1));

    let refreshers: Vec<_> = (0..8)
      .map(|_| {
        let cache = Arc::clone(&cache);
        tokio::spawn(async move {
          for _ in 0..3 {
            let outcome = cache.refresh_now().await;
            assert!(matches!(outcome, RefreshOutcome::Updated(_)), "unexpected {:?}", outcome);
          }
        })
      })
      .collect();

    for refresher in refreshers {
      refresher.await.unwrap();
    }
    cache.stop().await;

    assert!(source.calls.load(Ordering::SeqCst) >= 24);
    assert_eq!(source.max_in_flight.load(Ordering::SeqCst), 1);
  }

  #[tokio::test]
  async fn test_shutdown_clears_listeners() {
    let cache = Arc::new(PollingCache::new(
      ScriptedSource::new(vec![Ok(GamePhase::Lobby)]),
      settings(Duration::ZERO),
    ));
    let handle = cache.subscribe(|_| {});
    cache.subscribe(|_| {});
    assert!(cache.unsubscribe(handle));
    assert_eq!(cache.listener_count(), 1);

    cache.start(Duration::from_millis(10));
    cache.shutdown().await;
    assert_eq!(cache.listener_count(), 0);
    assert_eq!(cache.state(), PollState::Idle);
  }
}
