//! Level → wave → spawn-group tables
//!
//! Tables are read-only once loaded. The built-in campaign has five levels;
//! hosts may supply their own as JSON in the same shape.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::sim::archetype::EnemyKind;

/// `count` enemies of one archetype, `delay_ms` apart
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpawnGroup {
    /// Archetype key; unknown keys fall back to the default archetype
    #[serde(rename = "type")]
    pub enemy: String,
    pub count: u32,
    /// Milliseconds between consecutive spawns of this group
    #[serde(rename = "delay", default)]
    pub delay_ms: u32,
}

impl SpawnGroup {
    pub fn new(enemy: &str, count: u32, delay_ms: u32) -> Self {
        Self {
            enemy: enemy.to_string(),
            count,
            delay_ms,
        }
    }

    pub fn kind(&self) -> EnemyKind {
        EnemyKind::lookup(&self.enemy)
    }

    pub fn delay_secs(&self) -> f32 {
        self.delay_ms as f32 / 1000.0
    }
}

/// One batch of spawn groups. Groups run concurrently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wave {
    pub enemies: Vec<SpawnGroup>,
}

impl Wave {
    pub fn total_enemies(&self) -> u32 {
        self.enemies.iter().map(|g| g.count).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Level {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub name_sinhala: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub difficulty: String,
    /// Theme selector handed to the renderer (CSS colour)
    #[serde(rename = "backgroundColor", default = "default_background")]
    pub background: String,
    pub waves: Vec<Wave>,
}

fn default_background() -> String {
    "#1a1a2e".to_string()
}

impl Level {
    pub fn wave(&self, number: usize) -> Option<&Wave> {
        number.checked_sub(1).and_then(|i| self.waves.get(i))
    }

    pub fn wave_count(&self) -> usize {
        self.waves.len()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TableShape {
    Bare(Vec<Level>),
    Wrapped { levels: Vec<Level> },
}

/// Validated, ordered set of levels
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LevelTable {
    levels: Vec<Level>,
}

impl LevelTable {
    /// Validate and wrap `levels`, ordered by id
    pub fn new(mut levels: Vec<Level>) -> Result<Self, ConfigError> {
        if levels.is_empty() {
            return Err(ConfigError::NoLevels);
        }
        levels.sort_by_key(|l| l.id);

        for pair in levels.windows(2) {
            if pair[0].id == pair[1].id {
                return Err(ConfigError::DuplicateLevel { level: pair[0].id });
            }
        }

        for level in &levels {
            if level.waves.is_empty() {
                return Err(ConfigError::EmptyLevel { level: level.id });
            }
            for (i, wave) in level.waves.iter().enumerate() {
                if wave.total_enemies() == 0 {
                    return Err(ConfigError::EmptyWave {
                        level: level.id,
                        wave: i + 1,
                    });
                }
            }
        }

        Ok(Self { levels })
    }

    /// Parse a JSON array of levels, or an object with a `levels` array
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let levels = match serde_json::from_str::<TableShape>(json)? {
            TableShape::Bare(levels) => levels,
            TableShape::Wrapped { levels } => levels,
        };
        let table = Self::new(levels)?;
        log::info!("Loaded {} levels from JSON", table.len());
        Ok(table)
    }

    pub fn get(&self, id: u32) -> Option<&Level> {
        self.levels.iter().find(|l| l.id == id)
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Level> {
        self.levels.iter()
    }

    /// Id of the level after `id`, if any
    pub fn next_after(&self, id: u32) -> Option<u32> {
        self.levels.iter().map(|l| l.id).find(|&next| next > id)
    }

    /// The five-level campaign
    pub fn builtin() -> Self {
        let levels = vec![
            level(1, "Sigiriya", "සීගිරිය", "The ancient rock fortress", "easy", "#1a1a2e", vec![
                wave(&[("yaksha", 3, 500)]),
                wave(&[("yaksha", 5, 400)]),
                wave(&[("yaksha", 4, 300), ("vegaraksha", 2, 800)]),
                wave(&[("yaksha", 6, 300), ("dunuhara", 2, 1000)]),
                wave(&[("yaksha", 5, 250), ("vegaraksha", 3, 600), ("dunuhara", 2, 1200)]),
            ]),
            level(2, "Anuradhapura", "අනුරාධපුරය", "The sacred city", "medium", "#1a2e1a", vec![
                wave(&[("yaksha", 5, 400), ("dunuhara", 2, 600)]),
                wave(&[("vegaraksha", 4, 500), ("yaksha", 3, 300)]),
                wave(&[("dunuhara", 4, 800), ("vegaraksha", 3, 400)]),
                wave(&[("maharaksha", 1, 0), ("yaksha", 5, 400)]),
                wave(&[("maharaksha", 2, 1000), ("dunuhara", 3, 600), ("vegaraksha", 4, 400)]),
            ]),
            level(3, "Polonnaruwa", "පොළොන්නරුව", "The medieval capital", "medium", "#2e1a1a", vec![
                wave(&[("dunuhara", 4, 500), ("yaksha", 4, 300)]),
                wave(&[("vegaraksha", 5, 400), ("dunuhara", 3, 700)]),
                wave(&[("maharaksha", 2, 1500), ("yaksha", 6, 300)]),
                wave(&[("dunuhara", 5, 600), ("vegaraksha", 4, 400), ("maharaksha", 1, 0)]),
                wave(&[("maharaksha", 3, 2000), ("dunuhara", 4, 500), ("vegaraksha", 5, 300)]),
            ]),
            level(4, "Kandy", "මහනුවර", "The hill capital", "hard", "#1a1a1a", vec![
                wave(&[("vegaraksha", 6, 300), ("dunuhara", 4, 500)]),
                wave(&[("maharaksha", 2, 1000), ("dunuhara", 5, 400), ("yaksha", 5, 250)]),
                wave(&[("vegaraksha", 8, 250), ("maharaksha", 2, 1500)]),
                wave(&[("dunuhara", 6, 400), ("maharaksha", 3, 1000), ("vegaraksha", 4, 300)]),
                wave(&[
                    ("maharaksha", 4, 1500),
                    ("dunuhara", 6, 400),
                    ("vegaraksha", 6, 300),
                    ("yaksha", 8, 200),
                ]),
            ]),
            level(5, "Ravana Cave", "රාවණ ගුහාව", "The final battle", "boss", "#2e1a2e", vec![
                wave(&[("yaksha", 8, 200), ("dunuhara", 4, 400)]),
                wave(&[("vegaraksha", 6, 300), ("maharaksha", 2, 1000), ("dunuhara", 4, 500)]),
                wave(&[("maharaksha", 4, 1000), ("vegaraksha", 8, 250)]),
                wave(&[("dunuhara", 6, 400), ("yaksha", 10, 200), ("maharaksha", 3, 1200)]),
                wave(&[("ravana", 1, 0), ("dunuhara", 4, 2000), ("vegaraksha", 4, 3000)]),
            ]),
        ];
        Self { levels }
    }
}

impl Default for LevelTable {
    fn default() -> Self {
        Self::builtin()
    }
}

fn wave(groups: &[(&str, u32, u32)]) -> Wave {
    Wave {
        enemies: groups
            .iter()
            .map(|&(enemy, count, delay)| SpawnGroup::new(enemy, count, delay))
            .collect(),
    }
}

fn level(
    id: u32,
    name: &str,
    name_sinhala: &str,
    description: &str,
    difficulty: &str,
    background: &str,
    waves: Vec<Wave>,
) -> Level {
    Level {
        id,
        name: name.to_string(),
        name_sinhala: name_sinhala.to_string(),
        description: description.to_string(),
        difficulty: difficulty.to_string(),
        background: background.to_string(),
        waves,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_campaign_is_valid() {
        let table = LevelTable::builtin();
        assert_eq!(table.len(), 5);
        assert!(LevelTable::new(table.iter().cloned().collect()).is_ok());

        let first = table.get(1).expect("level 1");
        assert_eq!(first.wave(1).map(Wave::total_enemies), Some(3));
        assert_eq!(first.wave(0), None);
        assert_eq!(table.next_after(4), Some(5));
        assert_eq!(table.next_after(5), None);

        let boss_wave = table.get(5).and_then(|l| l.wave(5)).expect("boss wave");
        assert_eq!(boss_wave.enemies[0].kind(), EnemyKind::Ravana);
    }

    #[test]
    fn test_parses_both_json_shapes() {
        let bare = r##"[{"id": 7, "name": "Test", "backgroundColor": "#000000",
            "waves": [{"enemies": [{"type": "dunuhara", "count": 2, "delay": 250}]}]}]"##;
        let table = LevelTable::from_json(bare).expect("bare array");
        let group = &table.get(7).expect("level 7").waves[0].enemies[0];
        assert_eq!(group.kind(), EnemyKind::Dunuhara);
        assert_eq!(group.delay_secs(), 0.25);

        let wrapped = r#"{"levels": [{"id": 1, "name": "W",
            "waves": [{"enemies": [{"type": "yaksha", "count": 1}]}]}]}"#;
        let table = LevelTable::from_json(wrapped).expect("wrapped");
        assert_eq!(table.get(1).map(|l| l.background.as_str()), Some("#1a1a2e"));
    }

    #[test]
    fn test_rejects_bad_tables() {
        assert!(matches!(LevelTable::from_json("{nope"), Err(ConfigError::Parse(_))));
        assert_eq!(LevelTable::from_json("[]"), Err(ConfigError::NoLevels));

        let no_waves = r#"[{"id": 2, "name": "Empty", "waves": []}]"#;
        assert_eq!(LevelTable::from_json(no_waves), Err(ConfigError::EmptyLevel { level: 2 }));

        let zero = r#"[{"id": 3, "name": "Z", "waves": [
            {"enemies": [{"type": "yaksha", "count": 1}]},
            {"enemies": [{"type": "yaksha", "count": 0}]}]}]"#;
        assert_eq!(
            LevelTable::from_json(zero),
            Err(ConfigError::EmptyWave { level: 3, wave: 2 })
        );

        let dup = r#"[
            {"id": 1, "name": "A", "waves": [{"enemies": [{"type": "yaksha", "count": 1}]}]},
            {"id": 1, "name": "B", "waves": [{"enemies": [{"type": "yaksha", "count": 1}]}]}]"#;
        assert_eq!(LevelTable::from_json(dup), Err(ConfigError::DuplicateLevel { level: 1 }));
    }

    #[test]
    fn test_unknown_archetype_falls_back() {
        let group = SpawnGroup::new("asura", 1, 0);
        assert_eq!(group.kind(), EnemyKind::Yaksha);
    }
}
