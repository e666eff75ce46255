//! Ravana War - a top-down arcade shooter
//!
//! Core modules:
//! - `sim`: Per-frame simulation (entities, collisions, wave director, game loop)
//! - `levels`: Static level/wave/spawn tables
//! - `settings`: Persisted preferences and difficulty tuning
//! - `progress`: Persisted level unlocks and best scores

pub mod error;
pub mod levels;
pub mod progress;
pub mod settings;
pub mod sim;

pub use error::{ConfigError, SessionError};
pub use levels::LevelTable;
pub use progress::Progress;
pub use settings::{Difficulty, Settings, Tuning};

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Game configuration constants
pub mod consts {
    /// Largest frame delta accepted as-is (seconds)
    pub const MAX_FRAME_DT: f32 = 0.1;
    /// Delta substituted for invalid or oversized frame deltas
    pub const FALLBACK_DT: f32 = 0.016;

    /// Default playfield (canvas) size
    pub const DEFAULT_PLAYFIELD_WIDTH: f32 = 1280.0;
    pub const DEFAULT_PLAYFIELD_HEIGHT: f32 = 720.0;
    /// Projectiles are culled once this far outside the playfield
    pub const PROJECTILE_BOUNDS_PADDING: f32 = 50.0;
    /// Enemies spawn this far outside the playfield edge
    pub const SPAWN_PADDING: f32 = 100.0;
    /// Enemies may roam this far outside the playfield
    pub const ENEMY_BOUNDS_MARGIN: f32 = 100.0;
    /// Band at the top of the playfield reserved for the HUD
    pub const HUD_TOP_MARGIN: f32 = 60.0;

    /// Population caps
    pub const MAX_ENEMIES: usize = 60;
    pub const MAX_PLAYER_BULLETS: usize = 120;
    pub const MAX_ENEMY_BULLETS: usize = 200;
    pub const MAX_PARTICLES: usize = 100;
    pub const MAX_POWERUPS: usize = 8;

    /// Session rules
    pub const STARTING_LIVES: u32 = 3;
    /// Delay before the first wave of a level (seconds)
    pub const FIRST_WAVE_DELAY: f32 = 1.0;
    /// Delay between a cleared wave and the next one (seconds)
    pub const NEXT_WAVE_DELAY: f32 = 2.0;

    /// Power-ups
    pub const POWERUP_DROP_CHANCE: f64 = 0.2;
    pub const POWERUP_RADIUS: f32 = 15.0;
    pub const HEAL_AMOUNT: f32 = 30.0;

    /// Player defaults
    pub const PLAYER_SIZE: f32 = 50.0;
    pub const PLAYER_MAX_HEALTH: f32 = 100.0;
    pub const PLAYER_SPEED: f32 = 250.0;
    pub const PLAYER_MAX_AMMO: u32 = 30;
    pub const PLAYER_DAMAGE: f32 = 25.0;
    /// Minimum seconds between shots
    pub const PLAYER_FIRE_RATE: f32 = 0.15;
    pub const PLAYER_RELOAD_TIME: f32 = 1.5;
    pub const PLAYER_BULLET_SPEED: f32 = 500.0;
    pub const PLAYER_BULLET_RADIUS: f32 = 5.0;
    /// Muzzle distance beyond the player's radius
    pub const PLAYER_MUZZLE_OFFSET: f32 = 12.0;
    pub const PLAYER_BULLET_COLOR: u32 = 0xFFD700;

    /// Invincibility windows (seconds)
    pub const HIT_GRACE: f32 = 1.5;
    pub const SHIELD_BREAK_GRACE: f32 = 0.5;
    pub const RESPAWN_GRACE: f32 = 3.0;

    /// Buffs
    pub const SPEED_BOOST_DURATION: f32 = 10.0;
    pub const SPEED_BOOST_MULTIPLIER: f32 = 1.5;
    pub const DAMAGE_BOOST_DURATION: f32 = 10.0;
    pub const DAMAGE_BOOST_MULTIPLIER: f32 = 2.0;
    pub const SHIELD_DURATION: f32 = 15.0;

    /// Special ability
    pub const MAX_SPECIAL_CHARGE: f32 = 100.0;
    /// Charge gained per second of play
    pub const SPECIAL_CHARGE_RATE: f32 = 0.5;
    pub const SPECIAL_DAMAGE: f32 = 50.0;

    /// Enemy combat
    pub const ENEMY_BULLET_SPEED: f32 = 300.0;
    pub const ENEMY_FAN_BULLET_SPEED: f32 = 250.0;
    pub const ENEMY_BULLET_RADIUS: f32 = 5.0;
    pub const ENEMY_MUZZLE_OFFSET: f32 = 5.0;
    pub const ENEMY_FIRE_RANGE: f32 = 500.0;
    pub const ENEMY_SPREAD: f32 = 0.2;
    pub const BOSS_SPREAD: f32 = 0.1;
    /// Angular step between fan projectiles (radians)
    pub const FAN_STEP: f32 = 0.2;
    pub const FAN_DAMAGE_FACTOR: f32 = 0.5;
    pub const KNOCKBACK_DISTANCE: f32 = 30.0;
    /// Seconds an enemy spends materialising after spawn
    pub const ENEMY_SPAWN_TIME: f32 = 0.5;
    /// Hit flash decay per second
    pub const HIT_FLASH_DECAY: f32 = 5.0;
}

/// Rectangular play area (canvas coordinates, y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Playfield {
    pub width: f32,
    pub height: f32,
}

impl Default for Playfield {
    fn default() -> Self {
        Self {
            width: consts::DEFAULT_PLAYFIELD_WIDTH,
            height: consts::DEFAULT_PLAYFIELD_HEIGHT,
        }
    }
}

impl Playfield {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width: width.max(1.0),
            height: height.max(1.0),
        }
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.height / 2.0)
    }

    /// Whether `pos` lies strictly inside the playfield grown by `padding`
    pub fn contains_padded(&self, pos: Vec2, padding: f32) -> bool {
        pos.x > -padding
            && pos.x < self.width + padding
            && pos.y > -padding
            && pos.y < self.height + padding
    }

    /// Clamp `pos` into the playfield grown by `margin` on every side
    pub fn clamp_padded(&self, pos: Vec2, margin: f32) -> Vec2 {
        Vec2::new(
            pos.x.clamp(-margin, self.width + margin),
            pos.y.clamp(-margin, self.height + margin),
        )
    }
}

/// Replace an unusable frame delta with the fallback step.
///
/// Zero, negative, NaN and oversized deltas (tab resume) all map to
/// [`consts::FALLBACK_DT`].
#[inline]
pub fn sanitize_dt(dt: f32) -> f32 {
    if dt.is_finite() && dt > 0.0 && dt <= consts::MAX_FRAME_DT {
        dt
    } else {
        consts::FALLBACK_DT
    }
}

/// Convert polar (r, theta) to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(r: f32, theta: f32) -> Vec2 {
    Vec2::new(r * theta.cos(), r * theta.sin())
}

/// Angle of the vector pointing from `from` to `to`
#[inline]
pub fn angle_to(from: Vec2, to: Vec2) -> f32 {
    let d = to - from;
    d.y.atan2(d.x)
}
