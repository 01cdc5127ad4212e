// Summoner ability cooldown projection

use chrono::{DateTime, Duration as ChronoDuration, Local, Utc};
use serde::Serialize;
use std::time::Duration;

use crate::lcu::static_data::{ability_cooldown, DEFAULT_COOLDOWN_SECS};
use crate::lcu::PlayerRecord;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CooldownProjection {
  pub ability: String,
  pub cooldown_seconds: u32,
  pub ready_at: DateTime<Utc>,
  /// Time left until `ready_at`, zero once it has passed.
  pub remaining: Duration,
}

impl CooldownProjection {
  pub fn is_ready(&self) -> bool {
    self.remaining.is_zero()
  }

  /// `ready_at` in local time, `HH:MM:SS`.
  pub fn ready_at_local(&self) -> String {
    self.ready_at.with_timezone(&Local).format("%H:%M:%S").to_string()
  }
}

/// Project when `ability` comes off cooldown if it was used at `reference_start`.
pub fn project(ability: &str, reference_start: DateTime<Utc>) -> CooldownProjection {
  project_at(ability, reference_start, Utc::now())
}

/// Same as [`project`] with an explicit "now".
pub fn project_at(
  ability: &str,
  reference_start: DateTime<Utc>,
  now: DateTime<Utc>,
) -> CooldownProjection {
  let cooldown_seconds = ability_cooldown(ability).unwrap_or(DEFAULT_COOLDOWN_SECS);
  let ready_at = reference_start + ChronoDuration::seconds(i64::from(cooldown_seconds));
  let remaining = (ready_at - now).to_std().unwrap_or(Duration::ZERO);

  CooldownProjection {
    ability: ability.to_string(),
    cooldown_seconds,
    ready_at,
    remaining,
  }
}

/// Both abilities of one player, projected from the same start time.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerCooldowns {
  pub summoner_name: String,
  pub champion: String,
  pub abilities: Vec<CooldownProjection>,
  pub runes: Vec<String>,
}

impl PlayerCooldowns {
  pub fn for_player(player: &PlayerRecord, reference_start: DateTime<Utc>) -> Self {
    Self::for_player_at(player, reference_start, Utc::now())
  }

  pub fn for_player_at(player: &PlayerRecord, reference_start: DateTime<Utc>, now: DateTime<Utc>) -> Self {
    Self {
      summoner_name: player.summoner_name.clone(),
      champion: player.champion.name.clone(),
      abilities: player
        .abilities
        .iter()
        .map(|ability| project_at(&ability.name, reference_start, now))
        .collect(),
      runes: player.runes.iter().map(|r| r.name.clone()).collect(),
    }
  }

  /// One line of plain text, e.g. for pasting into chat.
  pub fn summary_line(&self) -> String {
    let mut parts = vec![format!("{} ({})", self.summoner_name, self.champion)];
    for ability in &self.abilities {
      parts.push(format!("{} ready at {}", ability.ability, ability.ready_at_local()));
    }
    parts.join(" | ")
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::lcu::{NamedId, Rune, TeamSide};
  use chrono::TimeZone;

  fn at(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
  }

  #[test]
  fn test_flash_ready_after_300_seconds() {
    let start = at(0);
    let projection = project_at("Flash", start, at(100));
    assert_eq!(projection.cooldown_seconds, 300);
    assert_eq!(projection.ready_at, start + ChronoDuration::seconds(300));
    assert_eq!(projection.remaining, Duration::from_secs(200));
    assert!(!projection.is_ready());
  }

  #[test]
  fn test_remaining_never_negative() {
    let projection = project_at("Ignite", at(0), at(1_000));
    assert_eq!(projection.cooldown_seconds, 180);
    assert_eq!(projection.remaining, Duration::ZERO);
    assert!(projection.is_ready());
  }

  #[test]
  fn test_unknown_ability_uses_default_cooldown() {
    let projection = project_at("Snowball", at(0), at(0));
    assert_eq!(projection.cooldown_seconds, DEFAULT_COOLDOWN_SECS);
    assert_eq!(projection.ready_at, at(i64::from(DEFAULT_COOLDOWN_SECS)));
  }

  #[test]
  fn test_project_against_wall_clock() {
    let start = Utc::now();
    let projection = project("Flash", start);
    assert_eq!(projection.ready_at, start + ChronoDuration::seconds(300));
    let expected = (projection.ready_at - Utc::now()).to_std().unwrap_or(Duration::ZERO);
    // `project` read the clock a moment before the line above
    assert!(projection.remaining >= expected);
    assert!(projection.remaining - expected < Duration::from_secs(1));
  }

  #[test]
  fn test_player_summary() {
    let player = PlayerRecord {
      summoner_name: "Faker".to_string(),
      champion: NamedId::new(7, "LeBlanc"),
      abilities: [NamedId::new(4, "Flash"), NamedId::new(12, "Teleport")],
      runes: vec![Rune {
        id: 8112,
        name: "Electrocute".to_string(),
        icon_ref: String::new(),
      }],
      team_side: TeamSide::Red,
      cell_id: 7,
    };

    let cooldowns = PlayerCooldowns::for_player_at(&player, at(0), at(0));
    assert_eq!(cooldowns.abilities.len(), 2);
    assert_eq!(cooldowns.abilities[1].cooldown_seconds, 360);
    assert_eq!(cooldowns.runes, vec!["Electrocute".to_string()]);

    let line = cooldowns.summary_line();
    assert!(line.starts_with("Faker (LeBlanc) | Flash ready at "));
    assert!(line.contains(" | Teleport ready at "));
  }
}
