//! Power-ups and cosmetic particles

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::consts::POWERUP_RADIUS;
use crate::polar_to_cartesian;

/// Power-up types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PowerUpKind {
    /// Restores health
    Health,
    /// Temporary movement speed boost
    Speed,
    /// One-hit shield
    Shield,
    /// Temporary damage boost
    Power,
}

impl PowerUpKind {
    pub const ALL: [PowerUpKind; 4] = [
        PowerUpKind::Health,
        PowerUpKind::Speed,
        PowerUpKind::Shield,
        PowerUpKind::Power,
    ];

    pub fn color(self) -> u32 {
        match self {
            Self::Health => 0xE74C3C,
            Self::Speed => 0x3498DB,
            Self::Shield => 0x2ECC71,
            Self::Power => 0xF39C12,
        }
    }

    /// Uniform pick across all kinds
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::ALL[rng.random_range(0..Self::ALL.len())]
    }
}

/// Amplitude of the idle bob (pixels)
const BOB_AMPLITUDE: f32 = 5.0;
/// Bob phase advance per second
const BOB_RATE: f32 = 3.0;

/// A collectible lying on the playfield
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerUp {
    pub pos: Vec2,
    pub kind: PowerUpKind,
    pub radius: f32,
    pub active: bool,
    pub bob_phase: f32,
}

impl PowerUp {
    pub fn new(pos: Vec2, kind: PowerUpKind, bob_phase: f32) -> Self {
        Self {
            pos,
            kind,
            radius: POWERUP_RADIUS,
            active: true,
            bob_phase,
        }
    }

    pub fn update(&mut self, dt: f32) {
        self.bob_phase += dt * BOB_RATE;
    }

    /// Where the renderer should draw it; collision uses `pos`
    pub fn display_pos(&self) -> Vec2 {
        self.pos + Vec2::new(0.0, self.bob_phase.sin() * BOB_AMPLITUDE)
    }
}

const EXPLOSION_PARTICLES: usize = 15;
const EXPLOSION_MIN_SPEED: f32 = 100.0;
const EXPLOSION_SPEED_RANGE: f32 = 100.0;
const EXPLOSION_DRAG: f32 = 0.98;
const BURST_PARTICLES: usize = 8;
const BURST_SPEED: f32 = 50.0;
const BURST_LIFT: f32 = 50.0;
const BURST_GRAVITY: f32 = 100.0;
/// Alpha lost per second
const FADE_RATE: f32 = 2.0;
/// Drag factors are expressed per 60 Hz frame
const DRAG_REFERENCE_HZ: f32 = 60.0;

/// A cosmetic particle. Never affects gameplay.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub color: u32,
    /// 1.0 at birth, dead at 0
    pub alpha: f32,
    /// Downward acceleration (px/s²)
    pub gravity: f32,
    /// Velocity retained per 60 Hz frame; 1.0 for none
    pub drag: f32,
}

impl Particle {
    pub fn update(&mut self, dt: f32) {
        self.pos += self.vel * dt;
        self.vel.y += self.gravity * dt;
        if self.drag < 1.0 {
            self.vel *= self.drag.powf(dt * DRAG_REFERENCE_HZ);
        }
        self.alpha -= dt * FADE_RATE;
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.alpha > 0.0
    }

    /// Ring of fast, dragged sparks for a kill
    pub fn explosion<R: Rng + ?Sized>(pos: Vec2, color: u32, rng: &mut R) -> Vec<Particle> {
        (0..EXPLOSION_PARTICLES)
            .map(|i| {
                let angle = std::f32::consts::TAU / EXPLOSION_PARTICLES as f32 * i as f32;
                let speed = EXPLOSION_MIN_SPEED + rng.random::<f32>() * EXPLOSION_SPEED_RANGE;
                Particle {
                    pos,
                    vel: polar_to_cartesian(speed, angle),
                    radius: 3.0 + rng.random::<f32>() * 3.0,
                    color,
                    alpha: 1.0,
                    gravity: 0.0,
                    drag: EXPLOSION_DRAG,
                }
            })
            .collect()
    }

    /// Small upward fountain for a collected power-up
    pub fn pickup_burst(pos: Vec2, color: u32) -> Vec<Particle> {
        (0..BURST_PARTICLES)
            .map(|i| {
                let angle = std::f32::consts::TAU / BURST_PARTICLES as f32 * i as f32;
                Particle {
                    pos,
                    vel: polar_to_cartesian(BURST_SPEED, angle) - Vec2::new(0.0, BURST_LIFT),
                    radius: 4.0,
                    color,
                    alpha: 1.0,
                    gravity: BURST_GRAVITY,
                    drag: 1.0,
                }
            })
            .collect()
    }
}
