//! Game state definitions
//!
//! `GameState` is the single owner of every entity collection, the wave
//! director and the session counters. Entities never reach back into it;
//! the tick loop and collision resolver pass them what they need.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::archetype::EnemyKind;
use super::director::WaveDirector;
use super::enemy::Enemy;
use super::pickup::{Particle, PowerUp, PowerUpKind};
use super::player::Player;
use super::population::Population;
use super::projectile::Projectile;
use crate::consts::*;
use crate::error::SessionError;
use crate::levels::{Level, LevelTable};
use crate::progress::Progress;
use crate::settings::Tuning;
use crate::Playfield;

/// Current game phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GamePhase {
    /// Level select / title screen
    #[default]
    Menu,
    /// Active gameplay
    Playing,
    /// Paused; no simulated time passes
    Paused,
    /// Every wave of the level cleared
    LevelComplete,
    /// No lives left
    GameOver,
}

impl GamePhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::LevelComplete | Self::GameOver)
    }
}

/// End-of-session statistics
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SessionStats {
    pub level: u32,
    pub score: u64,
    pub kills: u32,
    pub shots_fired: u32,
    pub shots_hit: u32,
    /// Simulated seconds spent playing
    pub elapsed: f32,
}

impl SessionStats {
    /// Hits per shot fired in `[0, 1]`, zero when nothing was fired
    pub fn accuracy(&self) -> f32 {
        if self.shots_fired == 0 {
            0.0
        } else {
            (self.shots_hit as f32 / self.shots_fired as f32).min(1.0)
        }
    }
}

/// Discrete events for audio/UI consumers, drained once per frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum GameEvent {
    Shoot,
    Hit { enemy_id: u32 },
    Explosion { pos: Vec2, color: u32 },
    PowerUpPickup { kind: PowerUpKind },
    WaveStart { wave: usize },
    WaveCleared { wave: usize },
    LevelComplete { stats: SessionStats },
    GameOver { stats: SessionStats },
    PlayerHurt { health: f32 },
    ShieldBroken,
    PlayerRespawn { lives: u32 },
    Reload,
    Special { hits: usize },
}

/// Plain values for an external HUD
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Hud {
    pub health: f32,
    pub max_health: f32,
    pub lives: u32,
    pub score: u64,
    pub ammo: u32,
    pub max_ammo: u32,
    pub reloading: bool,
    pub reload_fraction: f32,
    /// 0..=100
    pub special_percent: f32,
    pub level: u32,
    pub wave: usize,
    pub total_waves: usize,
}

/// Read-only view handed to the renderer after each tick
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderSnapshot<'a> {
    pub phase: GamePhase,
    pub playfield: Playfield,
    /// Level background colour
    pub theme: &'a str,
    pub player: &'a Player,
    pub enemies: &'a Population<Enemy>,
    pub player_bullets: &'a Population<Projectile>,
    pub enemy_bullets: &'a Population<Projectile>,
    pub powerups: &'a Population<PowerUp>,
    pub particles: &'a Population<Particle>,
    pub hud: Hud,
}

const DEFAULT_THEME: &str = "#1a1a2e";

/// Complete game state
#[derive(Debug, Clone)]
pub struct GameState {
    pub playfield: Playfield,
    pub phase: GamePhase,
    /// Level being played (or last played)
    pub level_id: u32,
    pub lives: u32,
    pub score: u64,
    pub stats: SessionStats,
    pub player: Player,
    pub enemies: Population<Enemy>,
    pub player_bullets: Population<Projectile>,
    pub enemy_bullets: Population<Projectile>,
    pub powerups: Population<PowerUp>,
    /// Visual particles (not gameplay-affecting)
    pub particles: Population<Particle>,
    pub director: WaveDirector,
    pub tuning: Tuning,
    levels: LevelTable,
    pub(crate) rng: Pcg32,
    pub(crate) events: Vec<GameEvent>,
    next_id: u32,
}

impl GameState {
    /// Create a game sitting at the menu
    pub fn new(levels: LevelTable, tuning: Tuning, playfield: Playfield, seed: u64) -> Self {
        Self {
            playfield,
            phase: GamePhase::Menu,
            level_id: 0,
            lives: STARTING_LIVES,
            score: 0,
            stats: SessionStats::default(),
            player: Player::new(playfield.center()),
            enemies: Population::with_cap(MAX_ENEMIES),
            player_bullets: Population::with_cap(MAX_PLAYER_BULLETS),
            enemy_bullets: Population::with_cap(MAX_ENEMY_BULLETS),
            powerups: Population::with_cap(tuning.max_powerups),
            particles: Population::with_cap(MAX_PARTICLES),
            director: WaveDirector::new(),
            tuning,
            levels,
            rng: Pcg32::seed_from_u64(seed),
            events: Vec::new(),
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1).max(1);
        id
    }

    pub fn current_level(&self) -> Option<&Level> {
        self.levels.get(self.level_id)
    }

    /// Start `level_id` if it exists and is unlocked
    pub fn start_level(&mut self, level_id: u32, progress: &Progress) -> Result<(), SessionError> {
        let level = self
            .levels
            .get(level_id)
            .cloned()
            .ok_or(SessionError::UnknownLevel(level_id))?;
        if !progress.is_unlocked(level_id) {
            return Err(SessionError::LevelLocked(level_id));
        }
        self.begin(&level);
        Ok(())
    }

    /// Replay the current level from its first wave
    pub fn restart_level(&mut self) -> Result<(), SessionError> {
        let level = self
            .current_level()
            .cloned()
            .ok_or(SessionError::UnknownLevel(self.level_id))?;
        self.begin(&level);
        Ok(())
    }

    fn begin(&mut self, level: &Level) {
        self.clear_field();
        self.level_id = level.id;
        self.lives = STARTING_LIVES;
        self.score = 0;
        self.stats = SessionStats {
            level: level.id,
            ..SessionStats::default()
        };
        self.player = Player::new(self.playfield.center());
        self.director.start_level(level);
        self.phase = GamePhase::Playing;
        log::info!("Starting level {} ({})", level.id, level.name);
    }

    /// Abandon the session and return to the menu
    pub fn quit(&mut self) {
        self.director.cancel();
        self.clear_field();
        self.phase = GamePhase::Menu;
        log::info!("Returned to menu");
    }

    fn clear_field(&mut self) {
        self.enemies.clear();
        self.player_bullets.clear();
        self.enemy_bullets.clear();
        self.powerups = Population::with_cap(self.tuning.max_powerups);
        self.particles.clear();
        self.events.clear();
    }

    /// Flip between playing and paused. Other phases are unaffected.
    pub fn toggle_pause(&mut self) {
        self.phase = match self.phase {
            GamePhase::Playing => GamePhase::Paused,
            GamePhase::Paused => GamePhase::Playing,
            other => other,
        };
    }

    /// Resize the playfield (host canvas resized)
    pub fn set_playfield(&mut self, playfield: Playfield) {
        self.playfield = playfield;
        self.player.spawn_point = playfield.center();
    }

    /// Start the director's current wave. No-op unless playing.
    pub fn spawn_wave(&mut self) -> bool {
        if self.phase != GamePhase::Playing {
            return false;
        }
        if !self.director.spawn_wave() {
            return false;
        }
        self.events.push(GameEvent::WaveStart {
            wave: self.director.wave(),
        });
        true
    }

    /// Spawn `kind` just outside a random playfield edge
    pub fn spawn_enemy(&mut self, kind: EnemyKind) -> Option<u32> {
        let pos = self.random_edge_position();
        self.spawn_enemy_at(kind, pos)
    }

    /// Spawn `kind` at `pos`. Returns `None` when the enemy cap is reached.
    pub fn spawn_enemy_at(&mut self, kind: EnemyKind, pos: Vec2) -> Option<u32> {
        if self.enemies.is_full() {
            return None;
        }
        let id = self.next_entity_id();
        self.enemies.try_push(Enemy::new(id, kind, pos)).then_some(id)
    }

    fn random_edge_position(&mut self) -> Vec2 {
        let Playfield { width, height } = self.playfield;
        let pad = SPAWN_PADDING;
        match self.rng.random_range(0..4) {
            0 => Vec2::new(self.rng.random::<f32>() * width, -pad),
            1 => Vec2::new(width + pad, self.rng.random::<f32>() * height),
            2 => Vec2::new(self.rng.random::<f32>() * width, height + pad),
            _ => Vec2::new(-pad, self.rng.random::<f32>() * height),
        }
    }

    /// Drop a random power-up at `pos`, subject to the power-up cap
    pub fn spawn_powerup(&mut self, pos: Vec2) -> bool {
        let kind = PowerUpKind::random(&mut self.rng);
        let phase = self.rng.random::<f32>() * std::f32::consts::TAU;
        self.powerups.try_push(PowerUp::new(pos, kind, phase))
    }

    /// Score, explosion and loot roll for a kill
    pub fn register_kill(&mut self, pos: Vec2, color: u32, points: u64) {
        self.score += points;
        self.stats.kills += 1;
        self.events.push(GameEvent::Explosion { pos, color });
        for spark in Particle::explosion(pos, color, &mut self.rng) {
            self.particles.push_evicting(spark);
        }
        if self.rng.random_bool(self.tuning.powerup_drop_chance.clamp(0.0, 1.0)) {
            self.spawn_powerup(pos);
        }
    }

    /// Apply a collected power-up to the player
    pub fn apply_powerup(&mut self, kind: PowerUpKind, pos: Vec2) {
        match kind {
            PowerUpKind::Health => self.player.heal(HEAL_AMOUNT),
            PowerUpKind::Speed => self.player.apply_speed_boost(),
            PowerUpKind::Shield => self.player.apply_shield(),
            PowerUpKind::Power => self.player.apply_damage_boost(),
        }
        for p in Particle::pickup_burst(pos, kind.color()) {
            self.particles.push_evicting(p);
        }
        self.events.push(GameEvent::PowerUpPickup { kind });
        log::debug!("Picked up {:?}", kind);
    }

    /// Fire the special ability: fixed damage to every live enemy.
    ///
    /// Returns `false` when the charge is not full.
    pub fn use_special(&mut self) -> bool {
        if !self.player.use_special() {
            return false;
        }

        let mut hits = 0;
        let mut kills = Vec::new();
        for enemy in self.enemies.iter_mut().filter(|e| e.is_alive()) {
            hits += 1;
            if enemy.take_damage(SPECIAL_DAMAGE) {
                kills.push((enemy.pos, enemy.color, enemy.points));
            }
        }
        for (pos, color, points) in kills {
            self.register_kill(pos, color, points);
        }

        self.events.push(GameEvent::Special { hits });
        log::debug!("Special ability hit {} enemies", hits);
        true
    }

    /// The player just died: spend a life, then respawn or end the session
    pub fn handle_player_death(&mut self) {
        self.lives = self.lives.saturating_sub(1);
        if self.lives > 0 {
            self.player.respawn();
            self.events.push(GameEvent::PlayerRespawn { lives: self.lives });
            log::info!("Player respawned, {} lives left", self.lives);
        } else {
            self.finish(GamePhase::GameOver);
        }
    }

    /// Enter a terminal phase and report final statistics
    pub fn finish(&mut self, phase: GamePhase) {
        if !phase.is_terminal() || self.phase.is_terminal() {
            return;
        }
        self.director.cancel();
        self.phase = phase;

        let stats = self.session_stats();
        match phase {
            GamePhase::LevelComplete => {
                log::info!(
                    "Level {} complete: score {}, {} kills, {:.0}% accuracy",
                    stats.level,
                    stats.score,
                    stats.kills,
                    stats.accuracy() * 100.0
                );
                self.events.push(GameEvent::LevelComplete { stats });
            }
            _ => {
                log::info!("Game over on level {}: score {}", stats.level, stats.score);
                self.events.push(GameEvent::GameOver { stats });
            }
        }
    }

    /// Record a completed level in `progress`: best score and next unlock
    pub fn record_completion(&self, progress: &mut Progress) -> bool {
        if self.phase != GamePhase::LevelComplete {
            return false;
        }
        progress.complete_level(self.level_id, self.score, self.levels.next_after(self.level_id))
    }

    pub fn session_stats(&self) -> SessionStats {
        SessionStats {
            level: self.level_id,
            score: self.score,
            ..self.stats
        }
    }

    /// Events since the last drain, oldest first
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    /// Background selector for the renderer
    pub fn theme(&self) -> &str {
        self.current_level()
            .map(|l| l.background.as_str())
            .unwrap_or(DEFAULT_THEME)
    }

    pub fn hud(&self) -> Hud {
        Hud {
            health: self.player.health,
            max_health: self.player.max_health,
            lives: self.lives,
            score: self.score,
            ammo: self.player.ammo,
            max_ammo: self.player.max_ammo,
            reloading: self.player.is_reloading,
            reload_fraction: self.player.reload_fraction(),
            special_percent: self.player.special_charge / MAX_SPECIAL_CHARGE * 100.0,
            level: self.level_id,
            wave: self.director.wave(),
            total_waves: self.director.total_waves(),
        }
    }

    pub fn snapshot(&self) -> RenderSnapshot<'_> {
        RenderSnapshot {
            phase: self.phase,
            playfield: self.playfield,
            theme: self.theme(),
            player: &self.player,
            enemies: &self.enemies,
            player_bullets: &self.player_bullets,
            enemy_bullets: &self.enemy_bullets,
            powerups: &self.powerups,
            particles: &self.particles,
            hud: self.hud(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Difficulty;

    fn game() -> GameState {
        GameState::new(
            LevelTable::builtin(),
            Tuning::default(),
            Playfield::default(),
            12345,
        )
    }

    fn playing() -> GameState {
        let mut state = game();
        state.start_level(1, &Progress::new()).expect("level 1");
        state
    }

    #[test]
    fn test_start_level_checks_table_and_unlocks() {
        let mut state = game();
        let progress = Progress::new();
        assert_eq!(state.start_level(42, &progress), Err(SessionError::UnknownLevel(42)));
        assert_eq!(state.start_level(2, &progress), Err(SessionError::LevelLocked(2)));
        assert_eq!(state.phase, GamePhase::Menu);

        assert!(state.start_level(1, &progress).is_ok());
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.lives, STARTING_LIVES);
        assert_eq!(state.theme(), "#1a1a2e");
    }

    #[test]
    fn test_enemy_cap_drops_spawns() {
        let mut state = playing();
        for _ in 0..MAX_ENEMIES {
            assert!(state.spawn_enemy(EnemyKind::Yaksha).is_some());
        }
        assert_eq!(state.spawn_enemy(EnemyKind::Yaksha), None);
        assert_eq!(state.enemies.len(), MAX_ENEMIES);
    }

    #[test]
    fn test_spawns_land_outside_the_edge() {
        let mut state = playing();
        for _ in 0..20 {
            state.spawn_enemy(EnemyKind::Vegaraksha);
        }
        let field = state.playfield;
        for enemy in &state.enemies {
            let p = enemy.pos;
            assert!(p.x < 0.0 || p.x > field.width || p.y < 0.0 || p.y > field.height);
            assert!(field.contains_padded(enemy.pos, SPAWN_PADDING + 1.0));
        }
    }

    #[test]
    fn test_spawn_wave_requires_playing() {
        let mut state = game();
        assert!(!state.spawn_wave());

        let mut state = playing();
        state.toggle_pause();
        assert!(!state.spawn_wave());
        state.toggle_pause();
        assert!(state.spawn_wave());
        assert!(!state.spawn_wave());
        assert_eq!(state.drain_events(), vec![GameEvent::WaveStart { wave: 1 }]);
    }

    #[test]
    fn test_kill_awards_score_and_particles() {
        let mut state = playing();
        state.tuning.powerup_drop_chance = 1.0;
        state.register_kill(Vec2::new(300.0, 300.0), 0xFF0000, 150);
        assert_eq!(state.score, 150);
        assert_eq!(state.stats.kills, 1);
        assert_eq!(state.particles.len(), 15);
        assert_eq!(state.powerups.len(), 1);
        assert!(matches!(state.events()[0], GameEvent::Explosion { .. }));
    }

    fn always_drops(difficulty: Difficulty) -> GameState {
        let tuning = Tuning {
            powerup_drop_chance: 1.0,
            ..difficulty.tuning()
        };
        let mut state = GameState::new(LevelTable::builtin(), tuning, Playfield::default(), 99);
        state.start_level(1, &Progress::new()).expect("level 1");
        state
    }

    #[test]
    fn test_powerup_drops_stop_at_cap() {
        let mut state = always_drops(Difficulty::Medium);
        let cap = state.tuning.max_powerups;
        for i in 0..cap + 5 {
            state.register_kill(Vec2::new(50.0 * i as f32, 300.0), 0, 10);
        }
        assert_eq!(state.powerups.len(), cap);
        assert_eq!(cap, MAX_POWERUPS);
        assert_eq!(state.stats.kills as usize, cap + 5);
    }

    #[test]
    fn test_hard_session_caps_powerups_at_four() {
        let mut state = always_drops(Difficulty::Hard);
        for _ in 0..10 {
            state.register_kill(Vec2::new(300.0, 300.0), 0, 10);
        }
        assert_eq!(state.powerups.len(), 4);

        // The cap survives a restart
        state.restart_level().expect("restart");
        for _ in 0..10 {
            state.register_kill(Vec2::new(300.0, 300.0), 0, 10);
        }
        assert_eq!(state.powerups.len(), 4);
    }

    #[test]
    fn test_resize_moves_respawn_point() {
        let mut state = playing();
        state.set_playfield(Playfield::new(1000.0, 800.0));
        state.handle_player_death();
        assert_eq!(state.player.pos, Vec2::new(500.0, 400.0));
    }

    #[test]
    fn test_particles_evict_oldest() {
        let mut state = playing();
        state.tuning.powerup_drop_chance = 0.0;
        for _ in 0..10 {
            state.register_kill(Vec2::ZERO, 0, 1);
        }
        assert_eq!(state.particles.len(), MAX_PARTICLES);
    }

    #[test]
    fn test_health_pickup_is_clamped() {
        let mut state = playing();
        state.player.health = 70.0;
        state.apply_powerup(PowerUpKind::Health, state.player.pos);
        assert_eq!(state.player.health, 100.0);
    }

    #[test]
    fn test_special_damages_every_enemy() {
        let mut state = playing();
        state.tuning.powerup_drop_chance = 0.0;
        state.spawn_enemy_at(EnemyKind::Vegaraksha, Vec2::new(100.0, 100.0));
        state.spawn_enemy_at(EnemyKind::Maharaksha, Vec2::new(200.0, 100.0));

        assert!(!state.use_special());
        state.player.charge_special(MAX_SPECIAL_CHARGE);
        assert!(state.use_special());

        let alive: Vec<_> = state.enemies.iter().filter(|e| e.is_alive()).collect();
        assert_eq!(alive.len(), 1);
        assert_eq!(alive[0].health, 100.0);
        assert_eq!(state.score, EnemyKind::Vegaraksha.stats().points);
        assert_eq!(state.player.special_charge, 0.0);
    }

    #[test]
    fn test_last_life_ends_session() {
        let mut state = playing();
        state.handle_player_death();
        state.handle_player_death();
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.lives, 1);
        state.handle_player_death();
        assert_eq!(state.phase, GamePhase::GameOver);
        assert_eq!(state.director.pending_events(), 0);
        let events = state.drain_events();
        assert!(matches!(events.last(), Some(GameEvent::GameOver { .. })));
    }

    #[test]
    fn test_completion_unlocks_next_level() {
        let mut state = playing();
        let mut progress = Progress::new();
        assert!(!state.record_completion(&mut progress));
        state.score = 777;
        state.finish(GamePhase::LevelComplete);
        assert!(state.record_completion(&mut progress));
        assert!(progress.is_unlocked(2));
        assert_eq!(progress.best_score(1), Some(777));
    }

    #[test]
    fn test_accuracy_handles_no_shots() {
        let mut stats = SessionStats::default();
        assert_eq!(stats.accuracy(), 0.0);
        stats.shots_fired = 4;
        stats.shots_hit = 3;
        assert_eq!(stats.accuracy(), 0.75);
    }

    #[test]
    fn test_snapshot_serializes() {
        let mut state = playing();
        state.spawn_enemy(EnemyKind::Ravana);
        let json = serde_json::to_string(&state.snapshot()).expect("snapshot json");
        assert!(json.contains("\"theme\":\"#1a1a2e\""));
        assert!(json.contains("\"enemies\":[{"));
        assert!(json.contains("\"powerups\":[]"));
    }
}
