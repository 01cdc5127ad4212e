use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use parking_lot::Mutex;
use tracing::info;

use lcu_monitor_lib::config::{AppConfig, CONFIG_PATH};
use lcu_monitor_lib::cooldown::PlayerCooldowns;
use lcu_monitor_lib::lcu::{
  ApiGateway, ConnectionLocator, ConnectionSource, FixedEndpoint, GameSnapshot, SnapshotAssembler, TeamSide,
};
use lcu_monitor_lib::mock::{MockEndpoint, MockScenario};
use lcu_monitor_lib::{logging, PollingCache};

#[derive(Parser)]
#[command(name = "lcu-monitor", about = "League client champion select monitor")]
struct Args {
  /// Config file (defaults apply when it does not exist)
  #[arg(long, default_value = CONFIG_PATH)]
  config: PathBuf,

  /// Read from a local mock endpoint instead of a running client
  #[arg(long)]
  mock: bool,

  /// Port for the mock endpoint
  #[arg(long)]
  mock_port: Option<u16>,

  /// Poll interval in seconds
  #[arg(long)]
  interval: Option<f64>,

  #[command(subcommand)]
  command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
  /// Poll the client and print champion select as it changes (default)
  Watch,
  /// Only serve mock client data until interrupted
  MockServer {
    #[arg(long)]
    port: Option<u16>,
  },
}

#[tokio::main]
async fn main() -> Result<()> {
  let args = Args::parse();

  let mut config = AppConfig::load(&args.config)?;
  if args.mock {
    config.mock.enabled = true;
  }
  if let Some(port) = args.mock_port {
    config.mock.port = port;
  }
  if let Some(interval) = args.interval {
    config.polling.interval_secs = interval;
  }
  config.validate()?;

  logging::init(&config.logging)?;

  match args.command.unwrap_or(Command::Watch) {
    Command::Watch => watch(config).await,
    Command::MockServer { port } => serve_mock(port.unwrap_or(config.mock.port)).await,
  }
}

async fn watch(config: AppConfig) -> Result<()> {
  let mock = if config.mock.enabled {
    Some(
      MockEndpoint::start_with(config.mock.port, MockScenario::random())
        .await
        .with_context(|| format!("failed to start mock endpoint on port {}", config.mock.port))?,
    )
  } else {
    None
  };

  let source: Arc<dyn ConnectionSource> = match &mock {
    Some(endpoint) => Arc::new(FixedEndpoint(endpoint.connection_info())),
    None => Arc::new(ConnectionLocator::new(
      config.client.process_name.clone(),
      config.client.install_dirs.clone(),
    )),
  };

  let gateway = ApiGateway::with_settings(source, config.gateway_settings())
    .context("failed to build HTTP client")?;
  let assembler = Arc::new(SnapshotAssembler::new(Arc::new(gateway)));
  let cache = Arc::new(PollingCache::new(assembler, config.cache_settings()));

  // Listeners fire on every poll; only print when the picks change.
  let last_seen: Mutex<Option<String>> = Mutex::new(None);
  cache.subscribe(move |snapshot| {
    let key = selection_key(&snapshot);
    let mut last = last_seen.lock();
    if last.as_deref() != Some(key.as_str()) {
      println!("{}", render(&snapshot));
      *last = Some(key);
    }
  });

  cache.start(config.poll_interval());
  info!("watching League client, press Ctrl+C to stop");

  tokio::signal::ctrl_c().await.context("failed to listen for Ctrl+C")?;
  info!("shutting down");

  let status = cache.connection_status();
  cache.shutdown().await;
  if let Some(endpoint) = mock {
    endpoint.shutdown().await;
  }
  info!(
    connected = status.connected,
    failures = status.consecutive_failures,
    "monitor stopped"
  );
  Ok(())
}

async fn serve_mock(port: u16) -> Result<()> {
  let endpoint = MockEndpoint::start_with(port, MockScenario::random())
    .await
    .with_context(|| format!("failed to start mock endpoint on port {}", port))?;
  info!(base_url = %endpoint.base_url(), "mock endpoint ready, press Ctrl+C to stop");

  tokio::signal::ctrl_c().await.context("failed to listen for Ctrl+C")?;
  endpoint.shutdown().await;
  Ok(())
}

fn selection_key(snapshot: &GameSnapshot) -> String {
  let mut key = snapshot.phase.to_string();
  for player in snapshot.players() {
    key.push_str(&format!(
      "|{}:{}:{}:{}",
      player.cell_id, player.champion.id, player.abilities[0].id, player.abilities[1].id
    ));
  }
  key
}

fn render(snapshot: &GameSnapshot) -> String {
  if !snapshot.is_champion_select() {
    return format!("Phase: {}", snapshot.phase);
  }

  let mut lines = vec![format!(
    "Phase: {} | {:.0}s left",
    snapshot.phase, snapshot.timer.remaining_seconds
  )];
  for side in [TeamSide::Blue, TeamSide::Red] {
    let label = match side {
      TeamSide::Blue => "BLUE",
      TeamSide::Red => "RED",
    };
    lines.push(format!("{} TEAM", label));
    for player in snapshot.team(side) {
      let marker = if player.cell_id == snapshot.local_player_cell_id { "*" } else { " " };
      let runes: Vec<&str> = player.runes.iter().map(|r| r.name.as_str()).collect();
      lines.push(format!(
        "{} {} [{}]",
        marker,
        PlayerCooldowns::for_player(player, snapshot.captured_at).summary_line(),
        runes.join(", ")
      ));
    }
  }
  lines.join("\n")
}
