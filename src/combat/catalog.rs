//! Enemy catalog: level-indexed enemy lookup.
//!
//! ## Lookup rule
//!
//! `by_level(level)` prefers an exact level match, then the highest-level
//! enemy at or below `level`, and finally falls back to the lowest-level
//! enemy when `level` is below every entry. A catalog is never empty, so
//! lookup always succeeds.
//!
//! ## Sources
//!
//! - `standard()`: the built-in table
//! - `from_filenames()`: derive entries from portrait file names such as
//!   `001_duck.png`, scaling health and reward with level
//! - `from_json()`: a JSON array of `EnemySpec`

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::enemy::EnemySpec;
use super::error::CatalogError;

/// Built-in enemies: `(level, name, health, reward)`.
const STANDARD: [(u32, &str, u64, u64); 28] = [
    (1, "Duck", 10, 5),
    (2, "Slime", 15, 8),
    (3, "Goblin", 20, 12),
    (4, "Wolf", 25, 15),
    (5, "Skeleton", 30, 20),
    (6, "Orc", 40, 25),
    (7, "Spider Queen", 50, 30),
    (8, "Dark Knight", 60, 35),
    (9, "Troll", 75, 40),
    (10, "Baby Dragon", 100, 50),
    (11, "Bandit", 120, 55),
    (12, "Zombie", 140, 60),
    (13, "Harpy", 160, 65),
    (14, "Minotaur", 180, 70),
    (15, "Elemental", 200, 80),
    (16, "Vampire", 230, 90),
    (17, "Werewolf", 260, 100),
    (18, "Necromancer", 290, 110),
    (19, "Chimera", 320, 120),
    (20, "Dragon", 400, 150),
    (30, "Hydra", 600, 250),
    (40, "Phoenix", 900, 400),
    (50, "Kraken", 1500, 600),
    (60, "Titan", 2500, 900),
    (70, "Leviathan", 4000, 1300),
    (80, "Behemoth", 6000, 1800),
    (90, "Ancient Dragon", 9000, 2500),
    (100, "Demon Lord", 15000, 5000),
];

/// Directory portraits are served from.
const IMAGE_DIR: &str = "img/enemy";

/// Health for a generated enemy: `floor(10 * 1.3^(level - 1))`, saturating.
#[must_use]
pub fn scaled_health(level: u32) -> u64 {
    scale(10.0, 1.3, level)
}

/// Reward for a generated enemy: `floor(5 * 1.25^(level - 1))`, saturating.
#[must_use]
pub fn scaled_reward(level: u32) -> u64 {
    scale(5.0, 1.25, level)
}

fn scale(base: f64, growth: f64, level: u32) -> u64 {
    let exponent = f64::from(level) - 1.0;
    // Float-to-int `as` saturates, so huge levels clamp to u64::MAX.
    (base * growth.powf(exponent)).floor() as u64
}

/// Parse a portrait file name like `001_duck.png` (or a path ending in one).
///
/// The level is the first run of three digits followed by `_`, wherever it
/// sits in the name, so `1001_duck.png` is level 1. Everything between that
/// underscore and `.png` is the name: each `_`-separated word is capitalized
/// and empty words are kept, so `001_a__b.png` becomes `"A  B"`.
#[must_use]
pub fn enemy_from_filename(path: &str) -> Option<EnemySpec> {
    let filename = path.rsplit('/').next().unwrap_or(path);
    let stem = filename.strip_suffix(".png")?;

    // ASCII digits and `_` never fall inside a multi-byte char, so these
    // offsets are char boundaries.
    let bytes = stem.as_bytes();
    let start = (0..bytes.len().saturating_sub(4))
        .find(|&i| bytes[i..i + 3].iter().all(u8::is_ascii_digit) && bytes[i + 3] == b'_')?;
    let level: u32 = stem[start..start + 3].parse().ok()?;
    let raw_name = &stem[start + 4..];

    let name = raw_name
        .split('_')
        .map(|word| {
            let mut chars = word.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().chain(chars).collect()
            })
        })
        .collect::<Vec<_>>()
        .join(" ");

    Some(
        EnemySpec::new(level, name, scaled_health(level), scaled_reward(level))
            .with_image(format!("{IMAGE_DIR}/{filename}")),
    )
}

/// Level-indexed enemy table, sorted by level.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<EnemySpec>", into = "Vec<EnemySpec>")]
pub struct EnemyCatalog {
    enemies: Vec<EnemySpec>,
}

impl EnemyCatalog {
    /// Build a catalog. Entries are sorted by level; ties keep input order.
    pub fn new(mut enemies: Vec<EnemySpec>) -> Result<Self, CatalogError> {
        if enemies.is_empty() {
            return Err(CatalogError::Empty);
        }
        enemies.sort_by_key(|e| e.level);
        Ok(Self { enemies })
    }

    /// The built-in enemy table.
    #[must_use]
    pub fn standard() -> Self {
        let enemies = STANDARD
            .iter()
            .map(|&(level, name, health, reward)| {
                let file = name.to_lowercase().replace(' ', "_");
                EnemySpec::new(level, name, health, reward)
                    .with_image(format!("{IMAGE_DIR}/{level:03}_{file}.png"))
            })
            .collect();
        Self { enemies }
    }

    /// Build from portrait file names. Names that don't parse are skipped.
    pub fn from_filenames<I, S>(names: I) -> Result<Self, CatalogError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let enemies: Vec<EnemySpec> = names
            .into_iter()
            .filter_map(|name| {
                let parsed = enemy_from_filename(name.as_ref());
                if parsed.is_none() {
                    debug!(file = name.as_ref(), "skipping non-enemy file");
                }
                parsed
            })
            .collect();
        Self::new(enemies)
    }

    /// Parse a JSON array of enemies.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let enemies: Vec<EnemySpec> =
            serde_json::from_str(json).map_err(|e| CatalogError::Json(e.to_string()))?;
        Self::new(enemies)
    }

    /// Number of enemies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.enemies.len()
    }

    /// Always false; catalogs are never empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.enemies.is_empty()
    }

    /// All enemies, by level.
    #[must_use]
    pub fn enemies(&self) -> &[EnemySpec] {
        &self.enemies
    }

    /// Enemy for `level`: exact match, else nearest lower, else the lowest.
    #[must_use]
    pub fn by_level(&self, level: u32) -> &EnemySpec {
        if let Some(exact) = self.enemies.iter().find(|e| e.level == level) {
            return exact;
        }
        self.enemies
            .iter()
            .rev()
            .find(|e| e.level <= level)
            .unwrap_or(&self.enemies[0])
    }

    /// Case-insensitive lookup by name.
    #[must_use]
    pub fn by_name(&self, name: &str) -> Option<&EnemySpec> {
        self.enemies.iter().find(|e| e.name.eq_ignore_ascii_case(name))
    }

    /// Enemies with `min <= level <= max`.
    pub fn in_range(&self, min: u32, max: u32) -> impl Iterator<Item = &EnemySpec> + '_ {
        self.enemies
            .iter()
            .filter(move |e| (min..=max).contains(&e.level))
    }

    /// Boss enemies (every tenth level).
    pub fn bosses(&self) -> impl Iterator<Item = &EnemySpec> + '_ {
        self.enemies.iter().filter(|e| e.is_boss())
    }
}

impl Default for EnemyCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

impl TryFrom<Vec<EnemySpec>> for EnemyCatalog {
    type Error = CatalogError;

    fn try_from(enemies: Vec<EnemySpec>) -> Result<Self, Self::Error> {
        Self::new(enemies)
    }
}

impl From<EnemyCatalog> for Vec<EnemySpec> {
    fn from(catalog: EnemyCatalog) -> Self {
        catalog.enemies
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_catalog() {
        let catalog = EnemyCatalog::standard();
        assert_eq!(catalog.len(), 28);
        assert!(!catalog.is_empty());

        let duck = catalog.by_level(1);
        assert_eq!(duck.name, "Duck");
        assert_eq!(duck.health, 10);
        assert_eq!(duck.reward, 5);
        assert_eq!(duck.image.as_deref(), Some("img/enemy/001_duck.png"));

        let queen = catalog.by_name("spider queen").unwrap();
        assert_eq!(queen.image.as_deref(), Some("img/enemy/007_spider_queen.png"));
    }

    #[test]
    fn test_by_level_rules() {
        let catalog = EnemyCatalog::standard();
        // Exact.
        assert_eq!(catalog.by_level(30).name, "Hydra");
        // Nearest lower.
        assert_eq!(catalog.by_level(25).name, "Dragon");
        assert_eq!(catalog.by_level(500).name, "Demon Lord");
        // Below everything: lowest entry.
        assert_eq!(catalog.by_level(0).name, "Duck");
    }

    #[test]
    fn test_by_level_fallback_to_lowest() {
        let catalog = EnemyCatalog::new(vec![
            EnemySpec::new(10, "Boss", 100, 50),
            EnemySpec::new(5, "Mid", 30, 10),
        ])
        .unwrap();
        assert_eq!(catalog.enemies()[0].name, "Mid");
        assert_eq!(catalog.by_level(1).name, "Mid");
        assert_eq!(catalog.by_level(7).name, "Mid");
        assert_eq!(catalog.by_level(12).name, "Boss");
    }

    #[test]
    fn test_empty_catalog_rejected() {
        assert_eq!(EnemyCatalog::new(Vec::new()).unwrap_err(), CatalogError::Empty);
        assert_eq!(
            EnemyCatalog::from_filenames(["readme.txt"]).unwrap_err(),
            CatalogError::Empty
        );
    }

    #[test]
    fn test_enemy_from_filename() {
        let duck = enemy_from_filename("001_duck.png").unwrap();
        assert_eq!(duck.level, 1);
        assert_eq!(duck.name, "Duck");
        assert_eq!(duck.health, 10);
        assert_eq!(duck.reward, 5);
        assert_eq!(duck.image.as_deref(), Some("img/enemy/001_duck.png"));

        let dragon = enemy_from_filename("assets/img/enemy/010_baby_dragon.png").unwrap();
        assert_eq!(dragon.level, 10);
        assert_eq!(dragon.name, "Baby Dragon");
        assert_eq!(dragon.image.as_deref(), Some("img/enemy/010_baby_dragon.png"));

        assert!(enemy_from_filename("1_duck.png").is_none());
        assert!(enemy_from_filename("001_duck.jpg").is_none());
        assert!(enemy_from_filename("001_.png").is_none());
        assert!(enemy_from_filename("abc_duck.png").is_none());
        assert!(enemy_from_filename("duck.png").is_none());
    }

    #[test]
    fn test_enemy_from_filename_loose_forms() {
        let wolf = enemy_from_filename("1004_wolf.png").unwrap();
        assert_eq!(wolf.level, 4);
        assert_eq!(wolf.name, "Wolf");
        assert_eq!(wolf.image.as_deref(), Some("img/enemy/1004_wolf.png"));

        let boss = enemy_from_filename("boss-020_lich_king.png").unwrap();
        assert_eq!(boss.level, 20);
        assert_eq!(boss.name, "Lich King");

        assert_eq!(enemy_from_filename("003_dark__elf.png").unwrap().name, "Dark  Elf");
        assert_eq!(enemy_from_filename("003__.png").unwrap().name, " ");
    }

    #[test]
    fn test_scaling() {
        assert_eq!(scaled_health(1), 10);
        assert_eq!(scaled_health(2), 13);
        assert_eq!(scaled_health(8), 62);
        assert_eq!(scaled_reward(8), 23);
        assert_eq!(scaled_health(999), u64::MAX);
    }

    #[test]
    fn test_from_filenames_sorts_and_skips() {
        let catalog =
            EnemyCatalog::from_filenames(["020_dragon.png", "notes.md", "001_duck.png"]).unwrap();
        let levels: Vec<_> = catalog.enemies().iter().map(|e| e.level).collect();
        assert_eq!(levels, vec![1, 20]);
    }

    #[test]
    fn test_queries() {
        let catalog = EnemyCatalog::standard();
        assert_eq!(catalog.in_range(18, 30).count(), 4);
        let bosses: Vec<_> = catalog.bosses().map(|e| e.level).collect();
        assert_eq!(bosses, vec![10, 20, 30, 40, 50, 60, 70, 80, 90, 100]);
        assert!(catalog.by_name("nobody").is_none());
    }

    #[test]
    fn test_json() {
        let json = r#"[{"level":3,"name":"Goblin","health":20,"reward":12},
                       {"level":1,"name":"Duck","imgsrc":"duck.png","health":10,"reward":5}]"#;
        let catalog = EnemyCatalog::from_json(json).unwrap();
        assert_eq!(catalog.by_level(2).name, "Duck");
        assert_eq!(catalog.by_level(1).image.as_deref(), Some("duck.png"));

        assert!(matches!(EnemyCatalog::from_json("[]"), Err(CatalogError::Empty)));
        assert!(matches!(EnemyCatalog::from_json("{"), Err(CatalogError::Json(_))));

        let back: EnemyCatalog = serde_json::from_str(&serde_json::to_string(&catalog).unwrap()).unwrap();
        assert_eq!(back, catalog);
    }
}
