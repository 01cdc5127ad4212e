// Types shared by the LCU connection, snapshot assembly and the cache

use base64::{engine::general_purpose, Engine};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

/// Maximum number of players on one side of champion select.
pub const MAX_TEAM_SIZE: usize = 5;

/// Where and how to reach the local client API.
///
/// Built once per successful discovery and replaced wholesale on reconnect.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionInfo {
  pub base_url: String,
  /// Value of the `Authorization: Basic ...` header, already base64 encoded.
  pub credential: String,
}

impl ConnectionInfo {
  pub fn new(base_url: impl Into<String>, credential: impl Into<String>) -> Self {
    Self {
      base_url: base_url.into(),
      credential: credential.into(),
    }
  }

  /// Connection details for the real client: `https://127.0.0.1:<port>` with
  /// the `riot:<token>` basic credential.
  pub fn from_port_token(port: u16, token: &str) -> Self {
    Self {
      base_url: format!("https://127.0.0.1:{}", port),
      credential: basic_credential("riot", token),
    }
  }

  pub fn authorization_header(&self) -> String {
    format!("Basic {}", self.credential)
  }
}

impl fmt::Debug for ConnectionInfo {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("ConnectionInfo")
      .field("base_url", &self.base_url)
      .field("credential", &"<redacted>")
      .finish()
  }
}

pub fn basic_credential(user: &str, password: &str) -> String {
  general_purpose::STANDARD.encode(format!("{}:{}", user, password))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GamePhase {
  None,
  Lobby,
  Matchmaking,
  ChampSelect,
  GameStart,
  InProgress,
  WaitingForStats,
  PreEnd,
  End,
  Unknown,
}

impl GamePhase {
  /// Map the phase string reported by `/lol-gameflow/v1/session`.
  pub fn from_lcu(phase: &str) -> Self {
    match phase {
      "None" => Self::None,
      "Lobby" => Self::Lobby,
      "Matchmaking" => Self::Matchmaking,
      "ChampSelect" => Self::ChampSelect,
      "GameStart" => Self::GameStart,
      "InProgress" => Self::InProgress,
      "WaitingForStats" => Self::WaitingForStats,
      "PreEndOfGame" => Self::PreEnd,
      "EndOfGame" => Self::End,
      _ => Self::Unknown,
    }
  }

  pub fn as_lcu(&self) -> &'static str {
    match self {
      Self::None => "None",
      Self::Lobby => "Lobby",
      Self::Matchmaking => "Matchmaking",
      Self::ChampSelect => "ChampSelect",
      Self::GameStart => "GameStart",
      Self::InProgress => "InProgress",
      Self::WaitingForStats => "WaitingForStats",
      Self::PreEnd => "PreEndOfGame",
      Self::End => "EndOfGame",
      Self::Unknown => "Unknown",
    }
  }
}

impl fmt::Display for GamePhase {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_lcu())
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TeamSide {
  Blue,
  Red,
}

/// An id resolved to a display name (champion or summoner ability).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NamedId {
  pub id: i64,
  pub name: String,
}

impl NamedId {
  pub fn new(id: i64, name: impl Into<String>) -> Self {
    Self {
      id,
      name: name.into(),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Rune {
  pub id: i64,
  pub name: String,
  pub icon_ref: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerRecord {
  pub summoner_name: String,
  pub champion: NamedId,
  pub abilities: [NamedId; 2],
  pub runes: Vec<Rune>,
  pub team_side: TeamSide,
  pub cell_id: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Teams {
  pub blue: Vec<PlayerRecord>,
  pub red: Vec<PlayerRecord>,
}

impl Teams {
  pub fn side(&self, side: TeamSide) -> &[PlayerRecord] {
    match side {
      TeamSide::Blue => &self.blue,
      TeamSide::Red => &self.red,
    }
  }

  pub fn len(&self) -> usize {
    self.blue.len() + self.red.len()
  }

  pub fn is_empty(&self) -> bool {
    self.blue.is_empty() && self.red.is_empty()
  }

  /// Blue players first, then red, each in display order.
  pub fn iter(&self) -> impl Iterator<Item = &PlayerRecord> {
    self.blue.iter().chain(self.red.iter())
  }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseTimer {
  pub remaining_seconds: f64,
  pub total_seconds: f64,
  pub is_infinite: bool,
}

/// One consistent, immutable view of the client state.
///
/// Teams are only populated while `phase` is `ChampSelect`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSnapshot {
  pub phase: GamePhase,
  pub teams: Teams,
  pub local_player_cell_id: i64,
  pub timer: PhaseTimer,
  pub captured_at: DateTime<Utc>,
}

impl GameSnapshot {
  /// Snapshot for any phase outside champion select.
  pub fn outside_champ_select(phase: GamePhase) -> Self {
    Self {
      phase,
      teams: Teams::default(),
      local_player_cell_id: 0,
      timer: PhaseTimer::default(),
      captured_at: Utc::now(),
    }
  }

  pub fn is_champion_select(&self) -> bool {
    self.phase == GamePhase::ChampSelect
  }

  pub fn players(&self) -> impl Iterator<Item = &PlayerRecord> {
    self.teams.iter()
  }

  pub fn team(&self, side: TeamSide) -> &[PlayerRecord] {
    self.teams.side(side)
  }

  pub fn player_by_cell_id(&self, cell_id: i64) -> Option<&PlayerRecord> {
    self.players().find(|p| p.cell_id == cell_id)
  }

  pub fn player_by_summoner_name(&self, summoner_name: &str) -> Option<&PlayerRecord> {
    self.players().find(|p| p.summoner_name == summoner_name)
  }

  pub fn local_player(&self) -> Option<&PlayerRecord> {
    self.player_by_cell_id(self.local_player_cell_id)
  }
}
