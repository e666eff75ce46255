//! Projectiles fired by the player and by ranged enemies

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::PROJECTILE_BOUNDS_PADDING;
use crate::{Playfield, polar_to_cartesian};

/// Who fired a projectile; decides which collection holds it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Owner {
    Player,
    Enemy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub damage: f32,
    pub owner: Owner,
    /// 0xRRGGBB
    pub color: u32,
    /// Cleared on hit; inactive projectiles are culled at end of tick
    pub active: bool,
}

impl Projectile {
    /// Projectile travelling along `angle` at `speed`
    pub fn new(pos: Vec2, angle: f32, speed: f32, radius: f32, damage: f32, owner: Owner) -> Self {
        Self {
            pos,
            vel: polar_to_cartesian(speed, angle),
            radius,
            damage,
            owner,
            color: 0xFFFFFF,
            active: true,
        }
    }

    pub fn with_color(mut self, color: u32) -> Self {
        self.color = color;
        self
    }

    pub fn update(&mut self, dt: f32) {
        if self.active {
            self.pos += self.vel * dt;
        }
    }

    /// Still inside the padded playfield
    pub fn in_bounds(&self, field: &Playfield) -> bool {
        field.contains_padded(self.pos, PROJECTILE_BOUNDS_PADDING)
    }

    /// Survives end-of-tick culling
    pub fn is_live(&self, field: &Playfield) -> bool {
        self.active && self.in_bounds(field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_moves_along_angle() {
        let mut p = Projectile::new(Vec2::new(100.0, 100.0), 0.0, 500.0, 5.0, 10.0, Owner::Player);
        p.update(0.1);
        assert!((p.pos.x - 150.0).abs() < 1e-3);
        assert!((p.pos.y - 100.0).abs() < 1e-3);
    }

    #[test]
    fn test_culled_outside_padding() {
        let field = Playfield::new(800.0, 600.0);
        let mut p = Projectile::new(Vec2::new(790.0, 300.0), 0.0, 500.0, 5.0, 10.0, Owner::Enemy);
        assert!(p.is_live(&field));
        p.update(0.2);
        assert!(!p.in_bounds(&field));
        assert!(!p.is_live(&field));
    }

    #[test]
    fn test_inactive_projectile_stays_put() {
        let mut p = Projectile::new(Vec2::ZERO, 0.0, 500.0, 5.0, 10.0, Owner::Player);
        p.active = false;
        p.update(1.0);
        assert_eq!(p.pos, Vec2::ZERO);
    }
}
