// Synthetic client data served by the mock endpoint

use rand::seq::SliceRandom;
use rand::Rng;
use serde_json::{json, Value};
use std::collections::HashSet;
use std::time::Duration;

pub(crate) const MOCK_CHAMPIONS: &[(i64, &str, &str)] = &[
  (1, "Annie", "the Dark Child"),
  (2, "Olaf", "the Berserker"),
  (3, "Galio", "the Colossus"),
  (4, "Twisted Fate", "the Card Master"),
  (5, "Xin Zhao", "the Seneschal of Demacia"),
  (6, "Urgot", "the Dreadnought"),
  (7, "LeBlanc", "the Deceiver"),
  (8, "Vladimir", "the Crimson Reaper"),
  (9, "Fiddlesticks", "the Ancient Fear"),
  (10, "Kayle", "the Righteous"),
  (11, "Master Yi", "the Wuju Bladesman"),
  (12, "Alistar", "the Minotaur"),
  (13, "Ryze", "the Rune Mage"),
  (14, "Sion", "The Undead Juggernaut"),
  (15, "Sivir", "the Battle Mistress"),
  (16, "Soraka", "the Starchild"),
  (17, "Teemo", "the Swift Scout"),
  (18, "Tristana", "the Yordle Gunner"),
  (19, "Warwick", "the Uncaged Wrath of Zaun"),
  (20, "Nunu & Willump", "the Boy and His Yeti"),
  // Not in the static name table, only resolvable through the endpoint
  (9001, "Training Dummy", "the Target of Practice"),
];

pub(crate) const MOCK_SUMMONER_SPELLS: &[(i64, &str, u32)] = &[
  (1, "Cleanse", 210),
  (3, "Exhaust", 210),
  (4, "Flash", 300),
  (6, "Ghost", 210),
  (7, "Heal", 240),
  (11, "Smite", 90),
  (12, "Teleport", 360),
  (14, "Ignite", 180),
  (21, "Barrier", 180),
];

pub(crate) const MOCK_RUNES: &[(i64, &str, &str)] = &[
  (8005, "Press the Attack", "/lol-game-data/assets/v1/perk-images/Styles/Precision/PressTheAttack/PressTheAttack.png"),
  (8008, "Lethal Tempo", "/lol-game-data/assets/v1/perk-images/Styles/Precision/LethalTempo/LethalTempoTemp.png"),
  (8021, "Fleet Footwork", "/lol-game-data/assets/v1/perk-images/Styles/Precision/FleetFootwork/FleetFootwork.png"),
  (8112, "Electrocute", "/lol-game-data/assets/v1/perk-images/Styles/Domination/Electrocute/Electrocute.png"),
  (8124, "Predator", "/lol-game-data/assets/v1/perk-images/Styles/Domination/Predator/Predator.png"),
  (8128, "Dark Harvest", "/lol-game-data/assets/v1/perk-images/Styles/Domination/DarkHarvest/DarkHarvest.png"),
  (8229, "Arcane Comet", "/lol-game-data/assets/v1/perk-images/Styles/Sorcery/ArcaneComet/ArcaneComet.png"),
  (8230, "Phase Rush", "/lol-game-data/assets/v1/perk-images/Styles/Sorcery/PhaseRush/PhaseRush.png"),
  (8437, "Grasp of the Undying", "/lol-game-data/assets/v1/perk-images/Styles/Resolve/GraspOfTheUndying/GraspOfTheUndying.png"),
  (8465, "Guardian", "/lol-game-data/assets/v1/perk-images/Styles/Resolve/Guardian/Guardian.png"),
];

pub(crate) const MOCK_SUMMONER_NAMES: &[&str] = &[
  "FakerGod", "UziCarry", "TheShyTop", "RookieMid", "JackeyLove",
  "MingSupport", "NingJungle", "TianJungle", "DoinbMid", "LwxADC",
  "CrispSupport", "ZoomTop", "YagaoMid", "LokenADC", "LvMaoSupport",
  "KnightMid", "369Top", "KarsaJungle", "JiumengADC", "MissingSupport",
];

#[derive(Debug, Clone, PartialEq)]
pub struct MockPlayer {
  /// 0 mimics a hidden or bot entry.
  pub summoner_id: u64,
  pub display_name: String,
  pub champion_id: i64,
  pub spell1_id: i64,
  pub spell2_id: i64,
  pub perk_ids: Vec<i64>,
  pub cell_id: i64,
}

impl MockPlayer {
  fn roster_entry(&self, team: u32) -> Value {
    json!({
      "summonerId": self.summoner_id,
      "championId": self.champion_id,
      "spell1Id": self.spell1_id,
      "spell2Id": self.spell2_id,
      "perkIds": self.perk_ids,
      "cellId": self.cell_id,
      "team": team,
    })
  }
}

/// Everything the mock endpoint reports, adjustable while it runs.
#[derive(Debug, Clone, PartialEq)]
pub struct MockScenario {
  /// Gameflow phase string, as the client spells it (`ChampSelect`, `Lobby`, ...).
  pub phase: String,
  pub my_team: Vec<MockPlayer>,
  pub their_team: Vec<MockPlayer>,
  pub local_player_cell_id: i64,
  pub time_left_ms: u64,
  pub total_time_ms: u64,
  pub is_infinite: bool,
  /// Summoner lookups for these ids answer 404.
  pub failing_summoners: HashSet<u64>,
  /// Summoner lookups for these ids answer only after `slow_response`.
  pub slow_summoners: HashSet<u64>,
  pub slow_response: Duration,
  /// When set every route answers 503. The client still counts as
  /// reachable; shut the endpoint down to make it unreachable.
  pub offline: bool,
}

impl Default for MockScenario {
  fn default() -> Self {
    Self::champ_select()
  }
}

impl MockScenario {
  /// A full 5v5 champion select with fixed, fully resolvable players.
  pub fn champ_select() -> Self {
    let spell_pairs = [(4, 14), (4, 12), (4, 11), (4, 7), (4, 3)];
    let player = |index: usize, summoner_base: u64, cell_offset: i64| {
      let (spell1_id, spell2_id) = spell_pairs[index % spell_pairs.len()];
      MockPlayer {
        summoner_id: summoner_base + index as u64,
        display_name: MOCK_SUMMONER_NAMES[(cell_offset as usize + index) % MOCK_SUMMONER_NAMES.len()]
          .to_string(),
        champion_id: MOCK_CHAMPIONS[cell_offset as usize + index].0,
        spell1_id,
        spell2_id,
        perk_ids: MOCK_RUNES
          .iter()
          .cycle()
          .skip(index)
          .take(6)
          .map(|r| r.0)
          .collect(),
        cell_id: cell_offset + index as i64,
      }
    };

    Self {
      phase: "ChampSelect".to_string(),
      my_team: (0..5).map(|i| player(i, 1000, 0)).collect(),
      their_team: (0..5).map(|i| player(i, 2000, 5)).collect(),
      local_player_cell_id: 0,
      time_left_ms: 27_000,
      total_time_ms: 30_000,
      is_infinite: false,
      failing_summoners: HashSet::new(),
      slow_summoners: HashSet::new(),
      slow_response: Duration::from_secs(1),
      offline: false,
    }
  }

  /// Any phase outside champion select; rosters are empty.
  pub fn in_phase(phase: &str) -> Self {
    Self {
      phase: phase.to_string(),
      my_team: Vec::new(),
      their_team: Vec::new(),
      ..Self::champ_select()
    }
  }

  /// Random picks for manual runs of the standalone mock server.
  pub fn random() -> Self {
    let mut rng = rand::thread_rng();
    let mut names: Vec<&str> = MOCK_SUMMONER_NAMES.to_vec();
    names.shuffle(&mut rng);
    let mut names = names.into_iter();

    let mut team = |summoner_base: u64, cell_offset: i64| -> Vec<MockPlayer> {
      (0..5)
        .map(|i| {
          let champion = MOCK_CHAMPIONS[rng.gen_range(0..20)];
          let spells: Vec<_> = MOCK_SUMMONER_SPELLS.choose_multiple(&mut rng, 2).collect();
          let runes: Vec<i64> = MOCK_RUNES
            .choose_multiple(&mut rng, 6)
            .map(|r| r.0)
            .collect();
          MockPlayer {
            summoner_id: summoner_base + i as u64,
            display_name: names.next().unwrap_or("Summoner").to_string(),
            champion_id: champion.0,
            spell1_id: spells[0].0,
            spell2_id: spells[1].0,
            perk_ids: runes,
            cell_id: cell_offset + i as i64,
          }
        })
        .collect()
    };
    let my_team = team(1000, 0);
    let their_team = team(2000, 5);

    Self {
      my_team,
      their_team,
      time_left_ms: rng.gen_range(10_000..90_000),
      ..Self::champ_select()
    }
  }

  pub fn is_champ_select(&self) -> bool {
    self.phase == "ChampSelect"
  }

  fn players(&self) -> impl Iterator<Item = &MockPlayer> {
    self.my_team.iter().chain(self.their_team.iter())
  }

  pub(crate) fn gameflow_session(&self) -> Value {
    json!({
      "phase": self.phase,
      "gameData": {
        "queue": {
          "id": 420,
          "mapId": 11,
          "gameMode": "CLASSIC",
          "gameType": "MATCHED_GAME"
        }
      }
    })
  }

  /// `None` outside champion select, where the real client answers 404.
  pub(crate) fn champ_select_session(&self) -> Option<Value> {
    if !self.is_champ_select() {
      return None;
    }
    Some(json!({
      "myTeam": self.my_team.iter().map(|p| p.roster_entry(100)).collect::<Vec<_>>(),
      "theirTeam": self.their_team.iter().map(|p| p.roster_entry(200)).collect::<Vec<_>>(),
      "localPlayerCellId": self.local_player_cell_id,
      "timer": {
        "adjustedTimeLeftInPhase": self.time_left_ms,
        "totalTimeInPhase": self.total_time_ms,
        "isInfinite": self.is_infinite,
        "phase": "BAN_PICK"
      },
      "phase": "BAN_PICK"
    }))
  }

  pub(crate) fn summoner_delay(&self, summoner_id: u64) -> Option<Duration> {
    self
      .slow_summoners
      .contains(&summoner_id)
      .then_some(self.slow_response)
  }

  pub(crate) fn summoner(&self, summoner_id: u64) -> Option<Value> {
    if self.failing_summoners.contains(&summoner_id) {
      return None;
    }
    let display_name = self
      .players()
      .find(|p| p.summoner_id == summoner_id)
      .map(|p| p.display_name.clone())
      .unwrap_or_else(|| {
        MOCK_SUMMONER_NAMES[(summoner_id % MOCK_SUMMONER_NAMES.len() as u64) as usize].to_string()
      });

    Some(json!({
      "accountId": summoner_id,
      "displayName": display_name,
      "gameName": display_name,
      "tagLine": "MOCK",
      "internalName": format!("summoner_{}", summoner_id),
      "nameChangeFlag": false,
      "privacy": "PUBLIC",
      "profileIconId": summoner_id % 100,
      "puuid": format!("mock-puuid-{}", summoner_id),
      "summonerId": summoner_id,
      "summonerLevel": 30 + summoner_id % 470,
      "unnamed": false
    }))
  }

  pub(crate) fn current_summoner(&self) -> Value {
    let summoner_id = self
      .players()
      .find(|p| p.cell_id == self.local_player_cell_id)
      .map(|p| p.summoner_id)
      .unwrap_or(1000);
    self
      .summoner(summoner_id)
      .unwrap_or_else(|| json!({"summonerId": summoner_id, "displayName": ""}))
  }
}

pub(crate) fn champion_details(champion_id: i64) -> Value {
  let (name, title) = MOCK_CHAMPIONS
    .iter()
    .find(|c| c.0 == champion_id)
    .map(|c| (c.1.to_string(), c.2.to_string()))
    .unwrap_or_else(|| (format!("Champion {}", champion_id), "Unknown".to_string()));

  json!({
    "id": champion_id,
    "name": name,
    "alias": name.replace(' ', ""),
    "title": title,
    "squarePortraitPath": format!("/lol-game-data/assets/v1/champion-icons/{}.png", champion_id),
    "roles": ["fighter", "assassin"]
  })
}

pub(crate) fn rune_details(rune_id: i64) -> Value {
  let (name, icon) = MOCK_RUNES
    .iter()
    .find(|r| r.0 == rune_id)
    .map(|r| (r.1.to_string(), r.2.to_string()))
    .unwrap_or_else(|| (format!("Rune {}", rune_id), String::new()));

  json!({
    "id": rune_id,
    "name": name,
    "iconPath": icon,
    "shortDesc": format!("{} short description", name),
    "longDesc": format!("{} long description", name),
    "endOfGameStatDescs": []
  })
}

pub(crate) fn summoner_spells() -> Value {
  let spells: Vec<Value> = MOCK_SUMMONER_SPELLS
    .iter()
    .map(|(id, name, cooldown)| json!({"id": id, "name": name, "cooldown": cooldown}))
    .collect();
  json!({ "summonerSpells": spells })
}
