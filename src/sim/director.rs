//! Wave/level director
//!
//! Owns progression through a level's waves and the deferred spawn queue.
//! The director never touches entity collections: due actions are handed
//! back to the orchestrator, which performs the spawns and reports each one
//! through [`WaveDirector::record_spawn`].

use serde::{Deserialize, Serialize};

use super::schedule::{EventQueue, ScheduledAction};
use crate::consts::{FIRST_WAVE_DELAY, NEXT_WAVE_DELAY};
use crate::levels::{Level, Wave};

/// Director state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DirectorState {
    /// No wave running; waiting for a scheduled wave start
    #[default]
    Idle,
    /// Wave started, spawns still outstanding
    Spawning,
    /// Every spawn issued; waiting for the field to clear
    WaveActive,
    /// Wave cleared, next wave scheduled
    WaveComplete,
    /// Last wave cleared
    LevelComplete,
}

/// Result of a successful completion check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaveOutcome {
    /// `cleared` finished; `next` starts after the inter-wave delay
    WaveCleared { cleared: usize, next: usize },
    /// The final wave finished
    LevelCleared { cleared: usize },
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WaveDirector {
    level_id: u32,
    waves: Vec<Wave>,
    /// Current wave, 1-based; 0 before any level starts
    wave: usize,
    spawned: u32,
    expected: u32,
    state: DirectorState,
    queue: EventQueue,
}

impl WaveDirector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load `level` and schedule its first wave
    pub fn start_level(&mut self, level: &Level) {
        self.queue.invalidate();
        self.level_id = level.id;
        self.waves = level.waves.clone();
        self.wave = 1;
        self.spawned = 0;
        self.expected = 0;
        self.state = DirectorState::Idle;
        self.queue
            .schedule(FIRST_WAVE_DELAY, ScheduledAction::StartWave { wave: 1 });
        log::info!(
            "Level {} loaded with {} waves",
            level.id,
            level.wave_count()
        );
    }

    /// Make every pending spawn and wave start inert
    pub fn cancel(&mut self) {
        self.queue.invalidate();
        self.queue.clear();
        if self.state != DirectorState::LevelComplete {
            self.state = DirectorState::Idle;
        }
    }

    /// Advance scheduled time and return actions that belong to the
    /// current wave
    pub fn advance(&mut self, dt: f32) -> Vec<ScheduledAction> {
        let current = self.wave;
        self.queue
            .advance(dt)
            .into_iter()
            .filter(|action| match *action {
                ScheduledAction::StartWave { wave } | ScheduledAction::Spawn { wave, .. } => {
                    wave == current
                }
            })
            .collect()
    }

    pub fn is_wave_active(&self) -> bool {
        matches!(self.state, DirectorState::Spawning | DirectorState::WaveActive)
    }

    /// Schedule every spawn of the current wave.
    ///
    /// Returns `false` without side effects when a wave is already running
    /// or the level has no such wave.
    pub fn spawn_wave(&mut self) -> bool {
        if self.is_wave_active() || self.state == DirectorState::LevelComplete {
            return false;
        }
        let Some(def) = self.current_wave() else {
            return false;
        };

        let wave = self.wave;
        let expected = def.total_enemies();
        let mut plan = Vec::with_capacity(expected as usize);
        for group in &def.enemies {
            let kind = group.kind();
            for i in 0..group.count {
                plan.push((i as f32 * group.delay_secs(), kind));
            }
        }

        for (delay, kind) in plan {
            self.queue.schedule(delay, ScheduledAction::Spawn { wave, kind });
        }
        self.expected = expected;
        self.spawned = 0;
        self.state = if expected == 0 {
            DirectorState::WaveActive
        } else {
            DirectorState::Spawning
        };

        log::info!(
            "Wave {}/{} started: {} enemies",
            wave,
            self.waves.len(),
            expected
        );
        true
    }

    /// Count one issued spawn, including spawns dropped by the enemy cap
    pub fn record_spawn(&mut self) {
        if self.state != DirectorState::Spawning {
            return;
        }
        self.spawned += 1;
        if self.spawned >= self.expected {
            self.state = DirectorState::WaveActive;
        }
    }

    /// Evaluate wave completion given the number of live enemies.
    ///
    /// Nothing happens until every expected spawn has been issued.
    pub fn check_completion(&mut self, live_enemies: usize) -> Option<WaveOutcome> {
        if self.state != DirectorState::WaveActive
            || self.spawned < self.expected
            || live_enemies > 0
        {
            return None;
        }

        let cleared = self.wave;
        if cleared < self.waves.len() {
            self.wave += 1;
            self.state = DirectorState::WaveComplete;
            self.queue.schedule(
                NEXT_WAVE_DELAY,
                ScheduledAction::StartWave { wave: self.wave },
            );
            log::info!("Wave {} cleared, wave {} incoming", cleared, self.wave);
            Some(WaveOutcome::WaveCleared {
                cleared,
                next: self.wave,
            })
        } else {
            self.state = DirectorState::LevelComplete;
            log::info!("Level {} cleared", self.level_id);
            Some(WaveOutcome::LevelCleared { cleared })
        }
    }

    pub fn current_wave(&self) -> Option<&Wave> {
        self.wave.checked_sub(1).and_then(|i| self.waves.get(i))
    }

    pub fn state(&self) -> DirectorState {
        self.state
    }

    pub fn level_id(&self) -> u32 {
        self.level_id
    }

    /// Current wave number (1-based)
    pub fn wave(&self) -> usize {
        self.wave
    }

    pub fn total_waves(&self) -> usize {
        self.waves.len()
    }

    pub fn spawned(&self) -> u32 {
        self.spawned
    }

    pub fn expected(&self) -> u32 {
        self.expected
    }

    /// Live scheduled events (wave starts and spawns)
    pub fn pending_events(&self) -> usize {
        self.queue.pending_len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::levels::{LevelTable, SpawnGroup};
    use crate::sim::archetype::EnemyKind;

    fn two_wave_level() -> Level {
        Level {
            id: 9,
            name: "Test".into(),
            name_sinhala: String::new(),
            description: String::new(),
            difficulty: "easy".into(),
            background: "#000000".into(),
            waves: vec![
                Wave {
                    enemies: vec![SpawnGroup::new("yaksha", 2, 500), SpawnGroup::new("dunuhara", 1, 0)],
                },
                Wave {
                    enemies: vec![SpawnGroup::new("maharaksha", 1, 0)],
                },
            ],
        }
    }

    /// Run the director like the orchestrator would, counting every spawn
    fn pump(director: &mut WaveDirector, dt: f32) -> Vec<ScheduledAction> {
        let actions = director.advance(dt);
        for action in &actions {
            match action {
                ScheduledAction::StartWave { .. } => {
                    director.spawn_wave();
                }
                ScheduledAction::Spawn { .. } => director.record_spawn(),
            }
        }
        actions
    }

    #[test]
    fn test_first_wave_waits_for_delay() {
        let mut d = WaveDirector::new();
        d.start_level(&two_wave_level());
        assert_eq!(d.state(), DirectorState::Idle);
        assert!(pump(&mut d, 0.5).is_empty());
        let actions = pump(&mut d, 0.5);
        assert_eq!(actions, vec![ScheduledAction::StartWave { wave: 1 }]);
        assert_eq!(d.state(), DirectorState::Spawning);
        assert_eq!(d.expected(), 3);
    }

    #[test]
    fn test_groups_run_concurrently() {
        let mut d = WaveDirector::new();
        d.start_level(&two_wave_level());
        pump(&mut d, FIRST_WAVE_DELAY);
        // Delay-zero spawns of both groups are due immediately
        let now = pump(&mut d, 0.0);
        assert_eq!(
            now,
            vec![
                ScheduledAction::Spawn { wave: 1, kind: EnemyKind::Yaksha },
                ScheduledAction::Spawn { wave: 1, kind: EnemyKind::Dunuhara },
            ]
        );
        assert_eq!(d.spawned(), 2);
        pump(&mut d, 0.5);
        assert_eq!(d.spawned(), 3);
        assert_eq!(d.state(), DirectorState::WaveActive);
    }

    #[test]
    fn test_completion_waits_for_all_spawns() {
        let mut d = WaveDirector::new();
        d.start_level(&two_wave_level());
        pump(&mut d, FIRST_WAVE_DELAY);
        pump(&mut d, 0.0);
        assert_eq!(d.spawned(), 2);
        // Everything spawned so far is dead, but one spawn is outstanding
        assert_eq!(d.check_completion(0), None);

        pump(&mut d, 0.5);
        assert_eq!(d.check_completion(1), None);
        assert_eq!(
            d.check_completion(0),
            Some(WaveOutcome::WaveCleared { cleared: 1, next: 2 })
        );
        assert_eq!(d.state(), DirectorState::WaveComplete);
        assert_eq!(d.pending_events(), 1);
    }

    #[test]
    fn test_last_wave_completes_level() {
        let mut d = WaveDirector::new();
        d.start_level(&two_wave_level());
        pump(&mut d, FIRST_WAVE_DELAY);
        pump(&mut d, 0.5);
        d.check_completion(0);

        pump(&mut d, NEXT_WAVE_DELAY);
        pump(&mut d, 0.0);
        assert_eq!(d.wave(), 2);
        assert_eq!(d.state(), DirectorState::WaveActive);
        assert_eq!(
            d.check_completion(0),
            Some(WaveOutcome::LevelCleared { cleared: 2 })
        );
        assert_eq!(d.check_completion(0), None);
        assert!(!d.spawn_wave());
    }

    #[test]
    fn test_spawn_wave_is_guarded() {
        let mut d = WaveDirector::new();
        d.start_level(&two_wave_level());
        assert!(d.spawn_wave());
        let pending = d.pending_events();
        assert!(!d.spawn_wave());
        assert_eq!(d.pending_events(), pending);
    }

    #[test]
    fn test_cancel_drops_pending_spawns() {
        let mut d = WaveDirector::new();
        d.start_level(&two_wave_level());
        pump(&mut d, FIRST_WAVE_DELAY);
        d.cancel();
        assert_eq!(d.pending_events(), 0);
        assert!(pump(&mut d, 5.0).is_empty());
    }

    #[test]
    fn test_restart_ignores_previous_session() {
        let level = LevelTable::builtin().get(1).cloned().expect("level 1");
        let mut d = WaveDirector::new();
        d.start_level(&level);
        pump(&mut d, FIRST_WAVE_DELAY);
        d.start_level(&level);
        assert_eq!(d.spawned(), 0);
        // Only the fresh StartWave survives
        assert_eq!(d.pending_events(), 1);
        assert!(pump(&mut d, 0.9).is_empty());
        assert_eq!(pump(&mut d, 0.2), vec![ScheduledAction::StartWave { wave: 1 }]);
    }
}
