// Snapshot assembly - composes the gameflow and champ select endpoints into one GameSnapshot

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, warn};

use super::error::{ApiError, AssembleError, PlayerError};
use super::gateway::ApiGateway;
use super::static_data;
use super::types::{
  GamePhase, GameSnapshot, NamedId, PhaseTimer, PlayerRecord, Rune, TeamSide, Teams, MAX_TEAM_SIZE,
};

pub const GAMEFLOW_SESSION: &str = "/lol-gameflow/v1/session";
pub const CHAMP_SELECT_SESSION: &str = "/lol-champ-select/v1/session";

/// Only the primary page of a rune setup is shown.
pub const PRIMARY_RUNE_LIMIT: usize = 6;

/// Produces complete snapshots for the cache.
#[async_trait]
pub trait SnapshotSource: Send + Sync {
  async fn assemble(&self) -> Result<GameSnapshot, AssembleError>;
}

pub struct SnapshotAssembler {
  gateway: Arc<ApiGateway>,
}

impl SnapshotAssembler {
  pub fn new(gateway: Arc<ApiGateway>) -> Self {
    Self { gateway }
  }

  pub fn gateway(&self) -> &Arc<ApiGateway> {
    &self.gateway
  }

  async fn assemble_snapshot(&self) -> Result<GameSnapshot, AssembleError> {
    self.gateway.ensure_connected()?;

    let gameflow = self.gateway.get(GAMEFLOW_SESSION).await?;
    let phase = gameflow
      .get("phase")
      .and_then(Value::as_str)
      .map(GamePhase::from_lcu)
      .unwrap_or(GamePhase::None);

    if phase != GamePhase::ChampSelect {
      return Ok(GameSnapshot::outside_champ_select(phase));
    }

    let session = match self.gateway.get(CHAMP_SELECT_SESSION).await {
      Ok(session) => session,
      Err(ApiError::Http { status, .. }) => {
        return Err(AssembleError::IncompleteState(format!(
          "gameflow reports ChampSelect but the champ select session returned HTTP {}",
          status
        )));
      }
      Err(e) => return Err(e.into()),
    };

    let blue = self
      .resolve_roster(roster(&session, "myTeam"), TeamSide::Blue, 0)
      .await?;
    let red = self
      .resolve_roster(roster(&session, "theirTeam"), TeamSide::Red, MAX_TEAM_SIZE as i64)
      .await?;
    let teams = dedupe_cell_ids(Teams { blue, red });

    Ok(GameSnapshot {
      phase,
      teams,
      local_player_cell_id: session
        .get("localPlayerCellId")
        .and_then(Value::as_i64)
        .unwrap_or(0),
      timer: parse_timer(session.get("timer")),
      captured_at: Utc::now(),
    })
  }

  async fn resolve_roster(
    &self,
    entries: &[Value],
    side: TeamSide,
    first_cell_id: i64,
  ) -> Result<Vec<PlayerRecord>, AssembleError> {
    let mut players = Vec::with_capacity(entries.len().min(MAX_TEAM_SIZE));

    for (index, entry) in entries.iter().enumerate() {
      if players.len() == MAX_TEAM_SIZE {
        warn!(?side, roster_len = entries.len(), "roster longer than a team, truncating");
        break;
      }

      let fallback_cell_id = first_cell_id + index as i64;
      match self.resolve_player(entry, side, fallback_cell_id).await {
        Ok(player) => players.push(player),
        // Losing the client mid-roster is a failed cycle, not a missing player.
        Err(PlayerError::Summoner { source, .. }) if source.is_client_lost() => {
          return Err(source.into());
        }
        Err(e) => {
          warn!(?side, cell_id = fallback_cell_id, error = %e, "dropping roster entry");
        }
      }
    }

    Ok(players)
  }

  async fn resolve_player(
    &self,
    entry: &Value,
    side: TeamSide,
    fallback_cell_id: i64,
  ) -> Result<PlayerRecord, PlayerError> {
    let summoner_id = entry
      .get("summonerId")
      .and_then(Value::as_u64)
      .filter(|id| *id != 0)
      .ok_or(PlayerError::MissingSummonerId)?;

    let summoner = self
      .gateway
      .get(&format!("/lol-summoner/v1/summoners/{}", summoner_id))
      .await
      .map_err(|source| PlayerError::Summoner {
        id: summoner_id,
        source,
      })?;

    let champion_id = int_field(entry, "championId");
    let champion = self.resolve_champion(champion_id).await;

    let abilities = [
      resolve_summoner_spell(int_field(entry, "spell1Id")),
      resolve_summoner_spell(int_field(entry, "spell2Id")),
    ];

    let perk_ids: Vec<i64> = entry
      .get("perkIds")
      .and_then(Value::as_array)
      .map(|ids| ids.iter().filter_map(Value::as_i64).collect())
      .unwrap_or_default();
    let runes = self.resolve_runes(&perk_ids).await;

    Ok(PlayerRecord {
      summoner_name: summoner_display_name(&summoner, summoner_id),
      champion,
      abilities,
      runes,
      team_side: side,
      cell_id: entry
        .get("cellId")
        .and_then(Value::as_i64)
        .unwrap_or(fallback_cell_id),
    })
  }

  async fn resolve_champion(&self, champion_id: i64) -> NamedId {
    if champion_id <= 0 {
      return NamedId::new(0, "Not selected");
    }
    if let Some(name) = static_data::champion_name(champion_id) {
      return NamedId::new(champion_id, name);
    }

    let path = format!("/lol-champions/v1/inventories/{}/champions", champion_id);
    match self.gateway.get(&path).await {
      Ok(detail) => match champion_name_from_detail(&detail, champion_id) {
        Some(name) => NamedId::new(champion_id, name),
        None => NamedId::new(champion_id, static_data::champion_placeholder(champion_id)),
      },
      Err(e) => {
        debug!(champion_id, error = %e, "champion lookup failed, using placeholder");
        NamedId::new(champion_id, static_data::champion_placeholder(champion_id))
      }
    }
  }

  async fn resolve_runes(&self, perk_ids: &[i64]) -> Vec<Rune> {
    let mut runes = Vec::with_capacity(perk_ids.len().min(PRIMARY_RUNE_LIMIT));
    for &rune_id in perk_ids.iter().take(PRIMARY_RUNE_LIMIT) {
      let path = format!("/lol-perks/v1/perks/{}", rune_id);
      let rune = match self.gateway.get(&path).await {
        Ok(detail) => Rune {
          id: rune_id,
          name: detail
            .get("name")
            .and_then(Value::as_str)
            .filter(|n| !n.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| fallback_rune_name(rune_id)),
          icon_ref: detail
            .get("iconPath")
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_string(),
        },
        Err(e) => {
          debug!(rune_id, error = %e, "rune lookup failed, using static name");
          Rune {
            id: rune_id,
            name: fallback_rune_name(rune_id),
            icon_ref: String::new(),
          }
        }
      };
      runes.push(rune);
    }
    runes
  }
}

#[async_trait]
impl SnapshotSource for SnapshotAssembler {
  async fn assemble(&self) -> Result<GameSnapshot, AssembleError> {
    self.assemble_snapshot().await
  }
}

fn roster<'a>(session: &'a Value, key: &str) -> &'a [Value] {
  session
    .get(key)
    .and_then(Value::as_array)
    .map(Vec::as_slice)
    .unwrap_or(&[])
}

fn int_field(value: &Value, key: &str) -> i64 {
  value.get(key).and_then(Value::as_i64).unwrap_or(0)
}

fn resolve_summoner_spell(spell_id: i64) -> NamedId {
  match static_data::summoner_spell_name(spell_id) {
    Some(name) => NamedId::new(spell_id, name),
    None => NamedId::new(spell_id, static_data::summoner_spell_placeholder(spell_id)),
  }
}

fn fallback_rune_name(rune_id: i64) -> String {
  static_data::rune_name(rune_id)
    .map(str::to_string)
    .unwrap_or_else(|| static_data::rune_placeholder(rune_id))
}

fn champion_name_from_detail(detail: &Value, champion_id: i64) -> Option<String> {
  let champion = match detail {
    Value::Array(items) => items
      .iter()
      .find(|c| c.get("id").and_then(Value::as_i64) == Some(champion_id))?,
    other => other,
  };
  champion
    .get("name")
    .and_then(Value::as_str)
    .filter(|n| !n.is_empty())
    .map(str::to_string)
}

/// Best available name for a summoner record.
///
/// Newer clients leave `displayName` empty and carry a Riot ID instead.
pub fn summoner_display_name(summoner: &Value, summoner_id: u64) -> String {
  let field = |key: &str| {
    summoner
      .get(key)
      .and_then(Value::as_str)
      .filter(|s| !s.is_empty())
  };

  if let Some(display_name) = field("displayName") {
    return display_name.to_string();
  }
  match (field("gameName"), field("tagLine").or_else(|| field("gameTag"))) {
    (Some(name), Some(tag)) => format!("{}#{}", name, tag),
    (Some(name), None) => name.to_string(),
    _ => field("summonerName")
      .or_else(|| field("name"))
      .map(str::to_string)
      .unwrap_or_else(|| format!("Summoner {}", summoner_id)),
  }
}

/// The real client reports milliseconds; older payloads carry
/// `phaseTimeRemaining` in seconds.
pub fn parse_timer(timer: Option<&Value>) -> PhaseTimer {
  let Some(timer) = timer else {
    return PhaseTimer::default();
  };
  let number = |key: &str| timer.get(key).and_then(Value::as_f64);
  let is_infinite = timer
    .get("isInfinite")
    .and_then(Value::as_bool)
    .unwrap_or(false);

  if let Some(remaining) = number("phaseTimeRemaining") {
    return PhaseTimer {
      remaining_seconds: remaining.max(0.0),
      total_seconds: number("totalTimeInPhase").unwrap_or(0.0).max(0.0),
      is_infinite,
    };
  }

  PhaseTimer {
    remaining_seconds: (number("adjustedTimeLeftInPhase").unwrap_or(0.0) / 1000.0).max(0.0),
    total_seconds: (number("totalTimeInPhase").unwrap_or(0.0) / 1000.0).max(0.0),
    is_infinite,
  }
}

fn dedupe_cell_ids(teams: Teams) -> Teams {
  let mut seen = HashSet::new();
  let mut keep = |player: &PlayerRecord| {
    let fresh = seen.insert(player.cell_id);
    if !fresh {
      warn!(cell_id = player.cell_id, "duplicate cell id, dropping player");
    }
    fresh
  };
  let blue: Vec<PlayerRecord> = teams.blue.into_iter().filter(|p| keep(p)).collect();
  let red: Vec<PlayerRecord> = teams.red.into_iter().filter(|p| keep(p)).collect();
  Teams { blue, red }
}
