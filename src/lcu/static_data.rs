// Static lookup tables for champion, summoner ability and rune names

use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Cooldown used for abilities missing from the table.
pub const DEFAULT_COOLDOWN_SECS: u32 = 300;

static CHAMPION_NAMES: Lazy<HashMap<i64, &'static str>> = Lazy::new(|| {
  HashMap::from([
    (1, "Annie"), (2, "Olaf"), (3, "Galio"), (4, "Twisted Fate"), (5, "Xin Zhao"),
    (6, "Urgot"), (7, "LeBlanc"), (8, "Vladimir"), (9, "Fiddlesticks"), (10, "Kayle"),
    (11, "Master Yi"), (12, "Alistar"), (13, "Ryze"), (14, "Sion"), (15, "Sivir"),
    (16, "Soraka"), (17, "Teemo"), (18, "Tristana"), (19, "Warwick"), (20, "Nunu & Willump"),
    (21, "Miss Fortune"), (22, "Ashe"), (23, "Tryndamere"), (24, "Jax"), (25, "Morgana"),
    (26, "Zilean"), (27, "Singed"), (28, "Evelynn"), (29, "Twitch"), (30, "Karthus"),
    (31, "Cho'Gath"), (32, "Amumu"), (33, "Rammus"), (34, "Anivia"), (35, "Shaco"),
    (36, "Dr. Mundo"), (37, "Sona"), (38, "Kassadin"), (39, "Irelia"), (40, "Janna"),
    (41, "Gangplank"), (42, "Corki"), (43, "Karma"), (44, "Taric"), (45, "Veigar"),
    (48, "Trundle"), (50, "Swain"), (51, "Caitlyn"), (53, "Blitzcrank"), (54, "Malphite"),
    (55, "Katarina"), (56, "Nocturne"), (57, "Maokai"), (58, "Renekton"), (59, "Jarvan IV"),
    (60, "Elise"), (61, "Orianna"), (62, "Wukong"), (63, "Brand"), (64, "Lee Sin"),
    (67, "Vayne"), (68, "Rumble"), (69, "Cassiopeia"), (72, "Skarner"), (74, "Heimerdinger"),
    (75, "Nasus"), (76, "Nidalee"), (77, "Udyr"), (78, "Poppy"), (79, "Gragas"),
    (80, "Pantheon"), (81, "Ezreal"), (82, "Mordekaiser"), (83, "Yorick"), (84, "Akali"),
    (85, "Kennen"), (86, "Garen"), (89, "Leona"), (90, "Malzahar"), (91, "Talon"),
    (92, "Riven"), (96, "Kog'Maw"), (98, "Shen"), (99, "Lux"), (101, "Xerath"),
    (102, "Shyvana"), (103, "Ahri"), (104, "Graves"), (105, "Fizz"), (106, "Volibear"),
    (107, "Rengar"), (110, "Varus"), (111, "Nautilus"), (112, "Viktor"), (113, "Sejuani"),
    (114, "Fiora"), (115, "Ziggs"), (117, "Lulu"), (119, "Draven"), (120, "Hecarim"),
    (121, "Kha'Zix"), (122, "Darius"), (126, "Jayce"), (127, "Lissandra"), (131, "Diana"),
    (133, "Quinn"), (134, "Syndra"), (136, "Aurelion Sol"), (141, "Kayn"), (142, "Zoe"),
    (143, "Zyra"), (145, "Kai'Sa"), (147, "Seraphine"), (150, "Gnar"), (154, "Zac"),
    (157, "Yasuo"), (161, "Vel'Koz"), (163, "Taliyah"), (164, "Camille"), (166, "Akshan"),
    (200, "Bel'Veth"), (201, "Braum"), (202, "Jhin"), (203, "Kindred"), (221, "Zeri"),
    (222, "Jinx"), (223, "Tahm Kench"), (234, "Viego"), (235, "Senna"), (236, "Lucian"),
    (238, "Zed"), (240, "Kled"), (245, "Ekko"), (246, "Qiyana"), (254, "Vi"),
    (266, "Aatrox"), (267, "Nami"), (268, "Azir"), (350, "Yuumi"), (360, "Samira"),
    (412, "Thresh"), (420, "Illaoi"), (421, "Rek'Sai"), (427, "Ivern"), (429, "Kalista"),
    (432, "Bard"), (497, "Rakan"), (498, "Xayah"), (516, "Ornn"), (517, "Sylas"),
    (518, "Neeko"), (523, "Aphelios"), (526, "Rell"), (555, "Pyke"), (711, "Vex"),
    (777, "Yone"), (875, "Sett"), (876, "Lillia"), (887, "Gwen"), (888, "Renata Glasc"),
    (895, "Nilah"), (897, "K'Sante"), (901, "Smolder"), (902, "Milio"), (910, "Hwei"),
    (950, "Naafiri"),
  ])
});

static SUMMONER_SPELL_NAMES: Lazy<HashMap<i64, &'static str>> = Lazy::new(|| {
  HashMap::from([
    (1, "Cleanse"),
    (3, "Exhaust"),
    (4, "Flash"),
    (6, "Ghost"),
    (7, "Heal"),
    (11, "Smite"),
    (12, "Teleport"),
    (13, "Clarity"),
    (14, "Ignite"),
    (21, "Barrier"),
    (30, "To the King!"),
    (31, "Poro Toss"),
    (32, "Mark"),
    (39, "Mark"),
  ])
});

static RUNE_NAMES: Lazy<HashMap<i64, &'static str>> = Lazy::new(|| {
  HashMap::from([
    (8005, "Press the Attack"),
    (8008, "Lethal Tempo"),
    (8010, "Conqueror"),
    (8021, "Fleet Footwork"),
    (8112, "Electrocute"),
    (8124, "Predator"),
    (8128, "Dark Harvest"),
    (9923, "Hail of Blades"),
    (8214, "Summon Aery"),
    (8229, "Arcane Comet"),
    (8230, "Phase Rush"),
    (8437, "Grasp of the Undying"),
    (8439, "Aftershock"),
    (8465, "Guardian"),
    (8351, "Glacial Augment"),
    (8360, "Unsealed Spellbook"),
    (8369, "First Strike"),
  ])
});

// Keyed by lowercase ability name
static ABILITY_COOLDOWNS: Lazy<HashMap<&'static str, u32>> = Lazy::new(|| {
  HashMap::from([
    ("flash", 300),
    ("ignite", 180),
    ("heal", 240),
    ("teleport", 360),
    ("ghost", 210),
    ("smite", 90),
    ("barrier", 180),
    ("cleanse", 210),
    ("clarity", 240),
    ("exhaust", 210),
  ])
});

pub fn champion_name(id: i64) -> Option<&'static str> {
  CHAMPION_NAMES.get(&id).copied()
}

pub fn summoner_spell_name(id: i64) -> Option<&'static str> {
  SUMMONER_SPELL_NAMES.get(&id).copied()
}

pub fn rune_name(id: i64) -> Option<&'static str> {
  RUNE_NAMES.get(&id).copied()
}

pub fn champion_placeholder(id: i64) -> String {
  format!("Champion {}", id)
}

pub fn summoner_spell_placeholder(id: i64) -> String {
  format!("Spell {}", id)
}

pub fn rune_placeholder(id: i64) -> String {
  format!("Rune {}", id)
}

/// Cooldown in seconds for a summoner ability, by display name.
pub fn ability_cooldown(name: &str) -> Option<u32> {
  ABILITY_COOLDOWNS
    .get(name.trim().to_lowercase().as_str())
    .copied()
}
