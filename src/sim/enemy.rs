//! Enemy entity: steering, ranged attacks and damage intake

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::archetype::{Behavior, BossPhase, ERRATIC_PERIOD, EnemyKind, Role, select_behavior};
use super::population::Population;
use super::projectile::{Owner, Projectile};
use crate::consts::*;
use crate::{Playfield, angle_to, polar_to_cartesian};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub id: u32,
    pub kind: EnemyKind,
    pub pos: Vec2,
    /// Facing angle (radians), toward the player
    pub angle: f32,
    pub health: f32,
    pub max_health: f32,
    pub speed: f32,
    pub base_speed: f32,
    pub contact_damage: f32,
    pub ranged_damage: f32,
    pub radius: f32,
    pub points: u64,
    pub color: u32,
    pub behavior: Behavior,
    /// Seconds until the next ranged attack may fire
    pub fire_cooldown: f32,
    /// 1.0 right after a hit, decays to 0
    pub hit_flash: f32,
    /// Remaining spawn-in time; inert while positive
    pub spawn_timer: f32,
    /// Current boss phase, `None` for regular archetypes
    pub boss_phase: Option<BossPhase>,
    behavior_timer: f32,
    alive: bool,
}

impl Enemy {
    /// Fresh enemy at full health. Stats come from the archetype table.
    pub fn new(id: u32, kind: EnemyKind, pos: Vec2) -> Self {
        let stats = kind.stats();
        Self {
            id,
            kind,
            pos,
            angle: 0.0,
            health: stats.health,
            max_health: stats.health,
            speed: stats.speed,
            base_speed: stats.speed,
            contact_damage: stats.contact_damage,
            ranged_damage: stats.ranged_damage,
            radius: stats.size / 2.0,
            points: stats.points,
            color: stats.color,
            behavior: Behavior::Chase,
            fire_cooldown: 0.0,
            hit_flash: 0.0,
            spawn_timer: ENEMY_SPAWN_TIME,
            boss_phase: (stats.role == Role::Boss).then_some(BossPhase::One),
            behavior_timer: 0.0,
            alive: true,
        }
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.alive
    }

    #[inline]
    pub fn is_boss(&self) -> bool {
        self.boss_phase.is_some()
    }

    #[inline]
    pub fn is_spawning(&self) -> bool {
        self.spawn_timer > 0.0
    }

    /// Remaining health in `[0, 1]`
    pub fn health_fraction(&self) -> f32 {
        if self.max_health > 0.0 {
            self.health / self.max_health
        } else {
            0.0
        }
    }

    /// Advance one tick.
    ///
    /// `target` is the player's position; without one the enemy holds still
    /// this tick. Ranged shots go straight into `bullets` and are dropped
    /// when that collection is full.
    pub fn update<R: Rng + ?Sized>(
        &mut self,
        dt: f32,
        target: Option<Vec2>,
        field: &Playfield,
        bullets: &mut Population<Projectile>,
        rng: &mut R,
    ) {
        if !self.alive {
            return;
        }
        if self.hit_flash > 0.0 {
            self.hit_flash = (self.hit_flash - dt * HIT_FLASH_DECAY).max(0.0);
        }
        if self.spawn_timer > 0.0 {
            self.spawn_timer -= dt;
            return;
        }
        let Some(target) = target else {
            log::warn!("Enemy {} has no player to track, skipping tick", self.id);
            return;
        };

        let offset = target - self.pos;
        let distance = offset.length();
        let to_target = if distance > 0.0 {
            self.angle = angle_to(self.pos, target);
            offset / distance
        } else {
            Vec2::ZERO
        };

        self.choose_behavior(dt, distance);

        let step = self.behavior.steer(to_target, self.angle) * self.speed * dt;
        self.pos = field.clamp_padded(self.pos + step, ENEMY_BOUNDS_MARGIN);

        self.update_shooting(dt, target, distance, bullets, rng);
    }

    fn choose_behavior(&mut self, dt: f32, distance: f32) {
        let stats = self.kind.stats();

        let fraction = self.health_fraction();
        if let Some(phase) = self.boss_phase.as_mut() {
            let next = BossPhase::from_health_fraction(fraction);
            if next != *phase {
                log::info!("{} enters phase {:?}", stats.name, next);
                *phase = next;
            }
            self.speed = self.base_speed * next.effects().speed_multiplier;
        }

        self.behavior_timer += dt;
        let toggle_due = self.behavior_timer > ERRATIC_PERIOD;
        if toggle_due {
            self.behavior_timer = 0.0;
        }

        self.behavior = select_behavior(stats.role, self.behavior, distance, self.boss_phase, toggle_due);
    }

    fn update_shooting<R: Rng + ?Sized>(
        &mut self,
        dt: f32,
        target: Vec2,
        distance: f32,
        bullets: &mut Population<Projectile>,
        rng: &mut R,
    ) {
        let Some(fire_rate) = self.kind.stats().fire_rate else {
            return;
        };
        if self.fire_cooldown > 0.0 {
            self.fire_cooldown -= dt;
        }
        if self.fire_cooldown <= 0.0 && distance < ENEMY_FIRE_RANGE {
            self.fire(target, bullets, rng);
            let multiplier = self.boss_phase.map_or(1.0, |p| p.effects().fire_rate_multiplier);
            self.fire_cooldown = fire_rate * multiplier;
        }
    }

    /// Fire at `target`: one aimed shot plus the phase's fan.
    ///
    /// Returns how many projectiles made it into `bullets`.
    pub fn fire<R: Rng + ?Sized>(
        &self,
        target: Vec2,
        bullets: &mut Population<Projectile>,
        rng: &mut R,
    ) -> usize {
        let spread = if self.is_boss() { BOSS_SPREAD } else { ENEMY_SPREAD };
        let aim = angle_to(self.pos, target) + (rng.random::<f32>() - 0.5) * spread;

        let mut fired = 0;
        if bullets.try_push(self.projectile(aim, ENEMY_BULLET_SPEED, self.ranged_damage)) {
            fired += 1;
        }

        let fan = self.boss_phase.map_or(0, |p| p.effects().fan_count);
        for i in 1..=(fan / 2) {
            for side in [-1.0, 1.0] {
                let angle = aim + side * i as f32 * FAN_STEP;
                let shot = self.projectile(
                    angle,
                    ENEMY_FAN_BULLET_SPEED,
                    self.ranged_damage * FAN_DAMAGE_FACTOR,
                );
                if bullets.try_push(shot) {
                    fired += 1;
                }
            }
        }
        fired
    }

    fn projectile(&self, angle: f32, speed: f32, damage: f32) -> Projectile {
        let muzzle = self.pos + polar_to_cartesian(self.radius + ENEMY_MUZZLE_OFFSET, angle);
        Projectile::new(muzzle, angle, speed, ENEMY_BULLET_RADIUS, damage, Owner::Enemy)
            .with_color(self.color)
    }

    /// Apply damage. Returns `true` only for the call that kills.
    pub fn take_damage(&mut self, amount: f32) -> bool {
        if !self.alive || !(amount > 0.0) {
            return false;
        }
        self.health = (self.health - amount).clamp(0.0, self.max_health);
        self.hit_flash = 1.0;
        if self.health <= 0.0 {
            self.alive = false;
            return true;
        }
        false
    }

    /// Push directly away from `origin` by a fixed distance
    pub fn knockback_from(&mut self, origin: Vec2) {
        let away = self.pos - origin;
        let distance = away.length();
        if distance > 0.0 {
            self.pos += away / distance * KNOCKBACK_DISTANCE;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn ready(kind: EnemyKind, pos: Vec2) -> Enemy {
        let mut enemy = Enemy::new(1, kind, pos);
        enemy.spawn_timer = 0.0;
        enemy
    }

    #[test]
    fn test_damage_is_clamped_and_lethal_once() {
        let mut enemy = Enemy::new(1, EnemyKind::Yaksha, Vec2::ZERO);
        assert!(!enemy.take_damage(30.0));
        assert_eq!(enemy.health, 20.0);
        assert!(enemy.hit_flash > 0.0);
        assert!(enemy.take_damage(100.0));
        assert_eq!(enemy.health, 0.0);
        assert!(!enemy.is_alive());
        assert!(!enemy.take_damage(10.0));
        assert_eq!(enemy.health, 0.0);
    }

    #[test]
    fn test_chaser_moves_toward_target() {
        let field = Playfield::new(800.0, 600.0);
        let mut bullets = Population::with_cap(10);
        let mut rng = Pcg32::seed_from_u64(7);
        let mut enemy = ready(EnemyKind::Yaksha, Vec2::new(100.0, 300.0));
        let target = Vec2::new(400.0, 300.0);

        enemy.update(0.1, Some(target), &field, &mut bullets, &mut rng);
        assert!((enemy.pos.x - 108.0).abs() < 1e-3);
        assert!(enemy.angle.abs() < 1e-6);
        assert!(bullets.is_empty());
    }

    #[test]
    fn test_spawning_enemy_holds_still() {
        let field = Playfield::default();
        let mut bullets = Population::with_cap(10);
        let mut rng = Pcg32::seed_from_u64(7);
        let mut enemy = Enemy::new(1, EnemyKind::Yaksha, Vec2::new(100.0, 100.0));
        enemy.update(0.1, Some(Vec2::new(500.0, 500.0)), &field, &mut bullets, &mut rng);
        assert_eq!(enemy.pos, Vec2::new(100.0, 100.0));
    }

    #[test]
    fn test_missing_target_skips_tick() {
        let field = Playfield::default();
        let mut bullets = Population::with_cap(10);
        let mut rng = Pcg32::seed_from_u64(7);
        let mut enemy = ready(EnemyKind::Dunuhara, Vec2::new(100.0, 100.0));
        enemy.update(0.1, None, &field, &mut bullets, &mut rng);
        assert_eq!(enemy.pos, Vec2::new(100.0, 100.0));
        assert!(bullets.is_empty());
    }

    #[test]
    fn test_zero_distance_does_not_produce_nan() {
        let field = Playfield::default();
        let mut bullets = Population::with_cap(10);
        let mut rng = Pcg32::seed_from_u64(7);
        let mut enemy = ready(EnemyKind::Yaksha, Vec2::new(200.0, 200.0));
        enemy.update(0.1, Some(Vec2::new(200.0, 200.0)), &field, &mut bullets, &mut rng);
        assert!(enemy.pos.is_finite());
        assert!(enemy.angle.is_finite());
    }

    #[test]
    fn test_position_clamped_to_margin() {
        let field = Playfield::new(800.0, 600.0);
        let mut bullets = Population::with_cap(10);
        let mut rng = Pcg32::seed_from_u64(7);
        // Archer pressed against the left margin retreats from a nearby player
        let mut enemy = ready(EnemyKind::Dunuhara, Vec2::new(-90.0, 300.0));
        for _ in 0..5 {
            enemy.update(0.1, Some(Vec2::new(-20.0, 300.0)), &field, &mut bullets, &mut rng);
        }
        assert_eq!(enemy.behavior, Behavior::Retreat);
        assert_eq!(enemy.pos.x, -ENEMY_BOUNDS_MARGIN);
    }

    #[test]
    fn test_archer_fires_in_range_and_respects_cooldown() {
        let field = Playfield::default();
        let mut bullets = Population::with_cap(10);
        let mut rng = Pcg32::seed_from_u64(3);
        let mut enemy = ready(EnemyKind::Dunuhara, Vec2::new(300.0, 300.0));
        let target = Vec2::new(600.0, 300.0);

        enemy.update(0.016, Some(target), &field, &mut bullets, &mut rng);
        assert_eq!(bullets.len(), 1);
        assert!(bullets.iter().all(|b| b.owner == Owner::Enemy));
        assert!((enemy.fire_cooldown - 2.0).abs() < 1e-6);

        enemy.update(0.5, Some(target), &field, &mut bullets, &mut rng);
        assert_eq!(bullets.len(), 1);
    }

    #[test]
    fn test_archer_holds_fire_out_of_range() {
        let field = Playfield::new(2000.0, 2000.0);
        let mut bullets = Population::with_cap(10);
        let mut rng = Pcg32::seed_from_u64(3);
        let mut enemy = ready(EnemyKind::Dunuhara, Vec2::new(100.0, 100.0));
        enemy.update(0.016, Some(Vec2::new(1500.0, 1500.0)), &field, &mut bullets, &mut rng);
        assert!(bullets.is_empty());
    }

    #[test]
    fn test_shots_beyond_cap_are_dropped() {
        let mut bullets = Population::with_cap(2);
        let mut rng = Pcg32::seed_from_u64(3);
        let mut boss = ready(EnemyKind::Ravana, Vec2::new(300.0, 300.0));
        boss.boss_phase = Some(BossPhase::Three);
        let fired = boss.fire(Vec2::new(500.0, 300.0), &mut bullets, &mut rng);
        assert_eq!(fired, 2);
        assert_eq!(bullets.len(), 2);
    }

    #[test]
    fn test_boss_fan_is_symmetric_and_weaker() {
        let mut bullets = Population::with_cap(20);
        let mut rng = Pcg32::seed_from_u64(11);
        let mut boss = ready(EnemyKind::Ravana, Vec2::new(300.0, 300.0));
        boss.boss_phase = Some(BossPhase::Two);
        let fired = boss.fire(Vec2::new(600.0, 300.0), &mut bullets, &mut rng);
        assert_eq!(fired, 3);

        let shots: Vec<&Projectile> = bullets.iter().collect();
        assert_eq!(shots[0].damage, boss.ranged_damage);
        assert_eq!(shots[1].damage, boss.ranged_damage * FAN_DAMAGE_FACTOR);
        let aim = shots[0].vel.y.atan2(shots[0].vel.x);
        let left = shots[1].vel.y.atan2(shots[1].vel.x) - aim;
        let right = shots[2].vel.y.atan2(shots[2].vel.x) - aim;
        assert!((left + right).abs() < 1e-4);
    }

    #[test]
    fn test_boss_phase_follows_health() {
        let field = Playfield::default();
        let mut bullets = Population::with_cap(50);
        let mut rng = Pcg32::seed_from_u64(5);
        let mut boss = ready(EnemyKind::Ravana, Vec2::new(100.0, 100.0));
        let target = Vec2::new(900.0, 600.0);

        boss.update(0.016, Some(target), &field, &mut bullets, &mut rng);
        assert_eq!(boss.boss_phase, Some(BossPhase::One));
        assert_eq!(boss.speed, boss.base_speed);

        boss.take_damage(boss.max_health * 0.5);
        boss.update(0.016, Some(target), &field, &mut bullets, &mut rng);
        assert_eq!(boss.boss_phase, Some(BossPhase::Two));
        assert_eq!(boss.behavior, Behavior::Strafe);
        assert_eq!(boss.speed, boss.base_speed * 1.5);

        boss.take_damage(boss.max_health * 0.3);
        boss.update(0.016, Some(target), &field, &mut bullets, &mut rng);
        assert_eq!(boss.boss_phase, Some(BossPhase::Three));
        assert_eq!(boss.behavior, Behavior::Chase);
        assert_eq!(boss.speed, boss.base_speed * 2.0);
    }

    #[test]
    fn test_knockback_pushes_away() {
        let mut enemy = Enemy::new(1, EnemyKind::Maharaksha, Vec2::new(110.0, 100.0));
        enemy.knockback_from(Vec2::new(100.0, 100.0));
        assert!((enemy.pos.x - 140.0).abs() < 1e-4);
        assert_eq!(enemy.pos.y, 100.0);

        let mut stacked = Enemy::new(2, EnemyKind::Yaksha, Vec2::new(50.0, 50.0));
        stacked.knockback_from(Vec2::new(50.0, 50.0));
        assert_eq!(stacked.pos, Vec2::new(50.0, 50.0));
    }
}
