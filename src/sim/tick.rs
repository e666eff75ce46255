//! Per-frame simulation tick
//!
//! Core game loop: scheduled spawns, entity updates, collision passes,
//! end-of-tick culling, then the wave completion check.

use glam::Vec2;

use super::collision;
use super::director::WaveOutcome;
use super::schedule::ScheduledAction;
use super::state::{GameEvent, GamePhase, GameState};
use crate::consts::*;
use crate::sanitize_dt;

/// Input state sampled for one frame
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    /// Pointer position in playfield coordinates
    pub aim: Vec2,
    /// Fire button held
    pub fire: bool,
    /// Reload key pressed
    pub reload: bool,
    /// Special ability key pressed
    pub special: bool,
    /// Pause toggle
    pub pause: bool,
}

impl TickInput {
    /// Raw movement direction, each component -1, 0 or 1 (y grows downward)
    pub fn movement_axis(&self) -> Vec2 {
        let x = (self.right as i8 - self.left as i8) as f32;
        let y = (self.down as i8 - self.up as i8) as f32;
        Vec2::new(x, y)
    }
}

/// Advance the game by one frame of `dt` seconds
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    if input.pause {
        state.toggle_pause();
    }

    // Menus, pause and terminal screens do not advance simulated time
    if state.phase != GamePhase::Playing {
        return;
    }

    let dt = {
        let sane = sanitize_dt(dt);
        if sane != dt {
            log::warn!("Frame delta {} out of range, using {}", dt, sane);
        }
        sane
    };
    state.stats.elapsed += dt;

    run_scheduled(state, dt);
    update_player(state, input, dt);
    update_entities(state, dt);

    collision::resolve(state);

    cull(state);

    if state.phase == GamePhase::Playing {
        check_wave_completion(state);
    }
}

/// Perform every spawn and wave start that has come due
fn run_scheduled(state: &mut GameState, dt: f32) {
    let mut due = state.director.advance(dt);
    // Wave starts schedule zero-delay spawns, which come due in the same frame
    while !due.is_empty() {
        for action in due {
            match action {
                ScheduledAction::StartWave { .. } => {
                    state.spawn_wave();
                }
                ScheduledAction::Spawn { kind, .. } => {
                    if state.spawn_enemy(kind).is_none() {
                        log::debug!("Enemy cap reached, dropping {} spawn", kind.key());
                    }
                    state.director.record_spawn();
                }
            }
        }
        due = state.director.advance(0.0);
    }
}

fn update_player(state: &mut GameState, input: &TickInput, dt: f32) {
    let field = state.playfield;
    let player = &mut state.player;
    if !player.is_alive() {
        return;
    }

    player.update(dt, input.movement_axis(), input.aim, &field);
    player.charge_special(SPECIAL_CHARGE_RATE * dt);

    // A shot with no room in the bullet pool is never taken
    if input.fire && !state.player_bullets.is_full() {
        let was_reloading = player.is_reloading;
        if let Some(shot) = player.shoot(input.aim) {
            state.stats.shots_fired += 1;
            state.player_bullets.try_push(shot);
            state.events.push(GameEvent::Shoot);
            if player.is_reloading && !was_reloading {
                state.events.push(GameEvent::Reload);
            }
        }
    }

    if input.reload && player.reload() {
        state.events.push(GameEvent::Reload);
    }

    if input.special {
        state.use_special();
    }
}

fn update_entities(state: &mut GameState, dt: f32) {
    let target = state.player.is_alive().then_some(state.player.pos);
    for enemy in state.enemies.iter_mut() {
        enemy.update(
            dt,
            target,
            &state.playfield,
            &mut state.enemy_bullets,
            &mut state.rng,
        );
    }

    for bullet in state.player_bullets.iter_mut() {
        bullet.update(dt);
    }
    for bullet in state.enemy_bullets.iter_mut() {
        bullet.update(dt);
    }
    for powerup in state.powerups.iter_mut() {
        powerup.update(dt);
    }
    for particle in state.particles.iter_mut() {
        particle.update(dt);
    }
}

/// Drop everything that died, left the field or was used up this tick
fn cull(state: &mut GameState) {
    let field = state.playfield;
    state.enemies.retain(|e| e.is_alive());
    state.player_bullets.retain(|b| b.is_live(&field));
    state.enemy_bullets.retain(|b| b.is_live(&field));
    state.powerups.retain(|p| p.active);
    state.particles.retain(|p| p.is_alive());
}

fn check_wave_completion(state: &mut GameState) {
    match state.director.check_completion(state.enemies.len()) {
        Some(WaveOutcome::WaveCleared { cleared, .. }) => {
            state.events.push(GameEvent::WaveCleared { wave: cleared });
        }
        Some(WaveOutcome::LevelCleared { cleared }) => {
            state.events.push(GameEvent::WaveCleared { wave: cleared });
            state.finish(GamePhase::LevelComplete);
        }
        None => {}
    }
}
