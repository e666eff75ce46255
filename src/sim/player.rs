//! The player character
//!
//! Movement, shooting with an ammo/reload cycle, the charged special ability,
//! timed buffs and the damage-intake rules (invincibility windows and the
//! one-hit shield).

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::projectile::{Owner, Projectile};
use crate::consts::*;
use crate::{Playfield, angle_to, polar_to_cartesian};

/// What a single `take_damage` call did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageOutcome {
    /// Dead, invincible, or a non-positive amount: nothing changed
    Ignored,
    /// The shield took the hit and is now gone
    Absorbed,
    /// Health dropped but the player survives
    Hurt,
    /// This call drove health to zero
    Killed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    pub spawn_point: Vec2,
    pub radius: f32,
    /// Aim angle (radians)
    pub angle: f32,

    pub health: f32,
    pub max_health: f32,

    pub speed: f32,
    pub base_speed: f32,
    pub damage: f32,
    pub base_damage: f32,

    pub ammo: u32,
    pub max_ammo: u32,
    /// Minimum seconds between shots
    pub fire_rate: f32,
    /// Seconds until the next shot is allowed
    pub fire_cooldown: f32,
    pub reload_time: f32,
    pub reload_progress: f32,
    pub is_reloading: bool,

    /// 0..=100
    pub special_charge: f32,

    pub speed_boost_timer: f32,
    pub damage_boost_timer: f32,
    pub shield_timer: f32,
    pub has_shield: bool,
    pub invincible_timer: f32,

    alive: bool,
}

impl Player {
    pub fn new(spawn_point: Vec2) -> Self {
        Self {
            pos: spawn_point,
            spawn_point,
            radius: PLAYER_SIZE / 2.0,
            angle: 0.0,
            health: PLAYER_MAX_HEALTH,
            max_health: PLAYER_MAX_HEALTH,
            speed: PLAYER_SPEED,
            base_speed: PLAYER_SPEED,
            damage: PLAYER_DAMAGE,
            base_damage: PLAYER_DAMAGE,
            ammo: PLAYER_MAX_AMMO,
            max_ammo: PLAYER_MAX_AMMO,
            fire_rate: PLAYER_FIRE_RATE,
            fire_cooldown: 0.0,
            reload_time: PLAYER_RELOAD_TIME,
            reload_progress: 0.0,
            is_reloading: false,
            special_charge: 0.0,
            speed_boost_timer: 0.0,
            damage_boost_timer: 0.0,
            shield_timer: 0.0,
            has_shield: false,
            invincible_timer: 0.0,
            alive: true,
        }
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.alive
    }

    #[inline]
    pub fn is_invincible(&self) -> bool {
        self.invincible_timer > 0.0
    }

    /// Advance timers and move.
    ///
    /// `axis` is the raw directional input (each component -1, 0 or 1);
    /// `aim` is the pointer position in playfield coordinates.
    pub fn update(&mut self, dt: f32, axis: Vec2, aim: Vec2, field: &Playfield) {
        if !self.alive {
            return;
        }

        self.move_by(axis, dt, field);
        if aim != self.pos {
            self.angle = angle_to(self.pos, aim);
        }

        if self.fire_cooldown > 0.0 {
            self.fire_cooldown = (self.fire_cooldown - dt).max(0.0);
        }

        if self.is_reloading {
            self.reload_progress += dt;
            if self.reload_progress >= self.reload_time {
                self.ammo = self.max_ammo;
                self.is_reloading = false;
                self.reload_progress = 0.0;
            }
        }

        self.update_buffs(dt);

        if self.invincible_timer > 0.0 {
            self.invincible_timer = (self.invincible_timer - dt).max(0.0);
        }
    }

    fn move_by(&mut self, axis: Vec2, dt: f32, field: &Playfield) {
        let mut dir = Vec2::new(unit_sign(axis.x), unit_sign(axis.y));
        if dir.x != 0.0 && dir.y != 0.0 {
            dir *= std::f32::consts::FRAC_1_SQRT_2;
        }
        self.pos += dir * self.speed * dt;

        let pad = self.radius;
        self.pos.x = self.pos.x.clamp(pad, (field.width - pad).max(pad));
        self.pos.y = self
            .pos
            .y
            .clamp(pad + HUD_TOP_MARGIN, (field.height - pad).max(pad + HUD_TOP_MARGIN));
    }

    fn update_buffs(&mut self, dt: f32) {
        if self.speed_boost_timer > 0.0 {
            self.speed_boost_timer -= dt;
            if self.speed_boost_timer <= 0.0 {
                self.speed_boost_timer = 0.0;
                self.speed = self.base_speed;
            }
        }

        if self.damage_boost_timer > 0.0 {
            self.damage_boost_timer -= dt;
            if self.damage_boost_timer <= 0.0 {
                self.damage_boost_timer = 0.0;
                self.damage = self.base_damage;
            }
        }

        if self.shield_timer > 0.0 {
            self.shield_timer -= dt;
            if self.shield_timer <= 0.0 {
                self.shield_timer = 0.0;
                self.has_shield = false;
            }
        }
    }

    pub fn can_shoot(&self) -> bool {
        self.alive && !self.is_reloading && self.ammo > 0 && self.fire_cooldown <= 0.0
    }

    /// Fire toward `target`. Emptying the magazine starts a reload.
    pub fn shoot(&mut self, target: Vec2) -> Option<Projectile> {
        if !self.can_shoot() {
            return None;
        }
        self.fire_cooldown = self.fire_rate;
        self.ammo -= 1;
        if self.ammo == 0 {
            self.reload();
        }

        let angle = angle_to(self.pos, target);
        let muzzle = self.pos + polar_to_cartesian(self.radius + PLAYER_MUZZLE_OFFSET, angle);
        Some(
            Projectile::new(
                muzzle,
                angle,
                PLAYER_BULLET_SPEED,
                PLAYER_BULLET_RADIUS,
                self.damage,
                Owner::Player,
            )
            .with_color(PLAYER_BULLET_COLOR),
        )
    }

    /// Start a reload. Refused while reloading or with a full magazine.
    pub fn reload(&mut self) -> bool {
        if self.is_reloading || self.ammo == self.max_ammo {
            return false;
        }
        self.is_reloading = true;
        self.reload_progress = 0.0;
        true
    }

    /// Reload completion in `[0, 1]`
    pub fn reload_fraction(&self) -> f32 {
        if self.is_reloading && self.reload_time > 0.0 {
            (self.reload_progress / self.reload_time).min(1.0)
        } else {
            0.0
        }
    }

    pub fn take_damage(&mut self, amount: f32) -> DamageOutcome {
        if !self.alive || self.is_invincible() || !(amount > 0.0) {
            return DamageOutcome::Ignored;
        }

        if self.has_shield {
            self.has_shield = false;
            self.shield_timer = 0.0;
            self.invincible_timer = SHIELD_BREAK_GRACE;
            return DamageOutcome::Absorbed;
        }

        self.health = (self.health - amount).clamp(0.0, self.max_health);
        self.invincible_timer = HIT_GRACE;

        if self.health <= 0.0 {
            self.alive = false;
            DamageOutcome::Killed
        } else {
            DamageOutcome::Hurt
        }
    }

    pub fn heal(&mut self, amount: f32) {
        if self.alive && amount > 0.0 {
            self.health = (self.health + amount).min(self.max_health);
        }
    }

    pub fn apply_speed_boost(&mut self) {
        self.speed_boost_timer = SPEED_BOOST_DURATION;
        self.speed = self.base_speed * SPEED_BOOST_MULTIPLIER;
    }

    pub fn apply_damage_boost(&mut self) {
        self.damage_boost_timer = DAMAGE_BOOST_DURATION;
        self.damage = self.base_damage * DAMAGE_BOOST_MULTIPLIER;
    }

    pub fn apply_shield(&mut self) {
        self.has_shield = true;
        self.shield_timer = SHIELD_DURATION;
    }

    pub fn charge_special(&mut self, amount: f32) {
        if self.alive {
            self.special_charge = (self.special_charge + amount).min(MAX_SPECIAL_CHARGE);
        }
    }

    pub fn special_ready(&self) -> bool {
        self.alive && self.special_charge >= MAX_SPECIAL_CHARGE
    }

    /// Spend a full special charge
    pub fn use_special(&mut self) -> bool {
        if !self.special_ready() {
            return false;
        }
        self.special_charge = 0.0;
        true
    }

    /// Back to the spawn point with full health and ammo, buffs cleared,
    /// and a respawn grace period.
    pub fn respawn(&mut self) {
        self.pos = self.spawn_point;
        self.health = self.max_health;
        self.ammo = self.max_ammo;
        self.is_reloading = false;
        self.reload_progress = 0.0;
        self.fire_cooldown = 0.0;
        self.alive = true;
        self.invincible_timer = RESPAWN_GRACE;
        self.has_shield = false;
        self.shield_timer = 0.0;
        self.speed_boost_timer = 0.0;
        self.damage_boost_timer = 0.0;
        self.speed = self.base_speed;
        self.damage = self.base_damage;
    }
}

/// -1, 0 or 1; unlike `f32::signum`, zero stays zero
#[inline]
fn unit_sign(v: f32) -> f32 {
    if v > 0.0 {
        1.0
    } else if v < 0.0 {
        -1.0
    } else {
        0.0
    }
}
