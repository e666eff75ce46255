//! Collision detection and combat resolution
//!
//! Every collidable entity is a circle. The resolver runs four passes per
//! tick; entities deactivated or killed during a pass stay in their
//! collections until the end-of-tick cull.

use glam::Vec2;

use super::enemy::Enemy;
use super::pickup::PowerUp;
use super::player::{DamageOutcome, Player};
use super::projectile::Projectile;
use super::state::{GameEvent, GameState};

/// Anything that takes part in circle-overlap tests
pub trait Collider {
    fn position(&self) -> Vec2;
    fn radius(&self) -> f32;

    fn overlaps(&self, other: &impl Collider) -> bool
    where
        Self: Sized,
    {
        circles_overlap(self.position(), self.radius(), other.position(), other.radius())
    }
}

/// Strict overlap: circles that exactly touch do not collide
#[inline]
pub fn circles_overlap(a: Vec2, ra: f32, b: Vec2, rb: f32) -> bool {
    a.distance(b) < ra + rb
}

impl Collider for Projectile {
    fn position(&self) -> Vec2 {
        self.pos
    }
    fn radius(&self) -> f32 {
        self.radius
    }
}

impl Collider for Enemy {
    fn position(&self) -> Vec2 {
        self.pos
    }
    fn radius(&self) -> f32 {
        self.radius
    }
}

impl Collider for Player {
    fn position(&self) -> Vec2 {
        self.pos
    }
    fn radius(&self) -> f32 {
        self.radius
    }
}

impl Collider for PowerUp {
    fn position(&self) -> Vec2 {
        self.pos
    }
    fn radius(&self) -> f32 {
        self.radius
    }
}

/// Run all four collision passes
pub fn resolve(state: &mut GameState) {
    player_bullets_vs_enemies(state);

    let mut player_died = enemy_bullets_vs_player(state);
    player_died |= enemies_vs_player(state);
    if player_died {
        state.handle_player_death();
    }

    powerups_vs_player(state);
}

fn player_bullets_vs_enemies(state: &mut GameState) {
    let mut kills = Vec::new();

    for bullet in state.player_bullets.iter_mut().filter(|b| b.active) {
        let Some(enemy) = state
            .enemies
            .iter_mut()
            .find(|e| e.is_alive() && bullet.overlaps(&**e))
        else {
            continue;
        };

        bullet.active = false;
        state.stats.shots_hit += 1;
        state.events.push(GameEvent::Hit { enemy_id: enemy.id });
        if enemy.take_damage(bullet.damage) {
            kills.push((enemy.pos, enemy.color, enemy.points));
        }
    }

    for (pos, color, points) in kills {
        state.register_kill(pos, color, points);
    }
}

/// Returns `true` if the player died this pass
fn enemy_bullets_vs_player(state: &mut GameState) -> bool {
    let player = &mut state.player;
    if !player.is_alive() || player.is_invincible() {
        return false;
    }

    for bullet in state.enemy_bullets.iter_mut().filter(|b| b.active) {
        if player.is_invincible() {
            break;
        }
        if !bullet.overlaps(&*player) {
            continue;
        }
        bullet.active = false;
        let outcome = player.take_damage(bullet.damage);
        if report_damage(&mut state.events, player, outcome) {
            return true;
        }
    }
    false
}

/// Contact damage and knockback. Returns `true` if the player died.
fn enemies_vs_player(state: &mut GameState) -> bool {
    let player = &mut state.player;
    if !player.is_alive() || player.is_invincible() {
        return false;
    }

    let mut died = false;
    for enemy in state.enemies.iter_mut().filter(|e| e.is_alive()) {
        if !enemy.overlaps(&*player) {
            continue;
        }
        let outcome = player.take_damage(enemy.contact_damage);
        enemy.knockback_from(player.pos);
        if report_damage(&mut state.events, player, outcome) {
            died = true;
            break;
        }
        // A landed hit starts the grace window for the rest of the pass
        if player.is_invincible() {
            break;
        }
    }
    died
}

fn powerups_vs_player(state: &mut GameState) {
    if !state.player.is_alive() {
        return;
    }

    let mut collected = Vec::new();
    for powerup in state.powerups.iter_mut().filter(|p| p.active) {
        if powerup.overlaps(&state.player) {
            powerup.active = false;
            collected.push((powerup.kind, powerup.pos));
        }
    }

    for (kind, pos) in collected {
        state.apply_powerup(kind, pos);
    }
}

/// Emit feedback for a damage outcome; `true` means the player just died
fn report_damage(events: &mut Vec<GameEvent>, player: &Player, outcome: DamageOutcome) -> bool {
    match outcome {
        DamageOutcome::Ignored => false,
        DamageOutcome::Absorbed => {
            events.push(GameEvent::ShieldBroken);
            false
        }
        DamageOutcome::Hurt => {
            events.push(GameEvent::PlayerHurt {
                health: player.health,
            });
            false
        }
        DamageOutcome::Killed => {
            events.push(GameEvent::PlayerHurt { health: 0.0 });
            true
        }
    }
}
