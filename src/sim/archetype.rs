//! Enemy archetype catalog
//!
//! Static stat blocks per enemy type, the steering behaviours they switch
//! between, and the boss phase table.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::polar_to_cartesian;

/// Enemy archetype key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnemyKind {
    /// Basic melee demon
    #[default]
    Yaksha,
    /// Demon archer, keeps its distance and shoots
    Dunuhara,
    /// Speed demon, alternates dashing and circling
    Vegaraksha,
    /// Giant demon, slow tank
    Maharaksha,
    /// King Ravana, multi-phase boss
    Ravana,
}

/// How an archetype picks its steering behaviour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Melee,
    Kiting,
    Erratic,
    Heavy,
    Boss,
}

/// Static stat block for one archetype
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Archetype {
    pub name: &'static str,
    pub role: Role,
    pub health: f32,
    pub speed: f32,
    /// Damage of each ranged projectile
    pub ranged_damage: f32,
    /// Damage dealt on body contact with the player
    pub contact_damage: f32,
    /// Diameter
    pub size: f32,
    pub points: u64,
    /// Seconds between ranged attacks, `None` for melee-only archetypes
    pub fire_rate: Option<f32>,
    pub color: u32,
}

const ARCHETYPES: [Archetype; 5] = [
    Archetype {
        name: "Yaksha",
        role: Role::Melee,
        health: 50.0,
        speed: 80.0,
        ranged_damage: 10.0,
        contact_damage: 15.0,
        size: 35.0,
        points: 100,
        fire_rate: None,
        color: 0xE74C3C,
    },
    Archetype {
        name: "Demon Archer",
        role: Role::Kiting,
        health: 40.0,
        speed: 60.0,
        ranged_damage: 15.0,
        contact_damage: 10.0,
        size: 32.0,
        points: 150,
        fire_rate: Some(2.0),
        color: 0x9B59B6,
    },
    Archetype {
        name: "Speed Demon",
        role: Role::Erratic,
        health: 30.0,
        speed: 180.0,
        ranged_damage: 8.0,
        contact_damage: 20.0,
        size: 28.0,
        points: 120,
        fire_rate: None,
        color: 0x3498DB,
    },
    Archetype {
        name: "Giant Demon",
        role: Role::Heavy,
        health: 150.0,
        speed: 40.0,
        ranged_damage: 25.0,
        contact_damage: 30.0,
        size: 55.0,
        points: 300,
        fire_rate: None,
        color: 0x2C3E50,
    },
    Archetype {
        name: "King Ravana",
        role: Role::Boss,
        health: 500.0,
        speed: 50.0,
        ranged_damage: 30.0,
        contact_damage: 40.0,
        size: 70.0,
        points: 1000,
        fire_rate: Some(1.0),
        color: 0x8E44AD,
    },
];

impl EnemyKind {
    pub const ALL: [EnemyKind; 5] = [
        EnemyKind::Yaksha,
        EnemyKind::Dunuhara,
        EnemyKind::Vegaraksha,
        EnemyKind::Maharaksha,
        EnemyKind::Ravana,
    ];

    /// Configuration key used in level tables
    pub fn key(&self) -> &'static str {
        match self {
            Self::Yaksha => "yaksha",
            Self::Dunuhara => "dunuhara",
            Self::Vegaraksha => "vegaraksha",
            Self::Maharaksha => "maharaksha",
            Self::Ravana => "ravana",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.key().eq_ignore_ascii_case(key))
    }

    /// Resolve a configuration key, falling back to the default archetype
    pub fn lookup(key: &str) -> Self {
        Self::from_key(key).unwrap_or_else(|| {
            log::warn!("Unknown enemy archetype '{}', using {}", key, Self::default().key());
            Self::default()
        })
    }

    pub fn stats(&self) -> &'static Archetype {
        &ARCHETYPES[*self as usize]
    }
}

/// Steering behaviour selected each tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Behavior {
    #[default]
    Chase,
    Retreat,
    Strafe,
    Circle,
}

/// Kiting archetypes back off inside this distance
pub const KITE_NEAR: f32 = 200.0;
/// Kiting archetypes close in beyond this distance
pub const KITE_FAR: f32 = 400.0;
/// Erratic archetypes swap behaviour this often (seconds)
pub const ERRATIC_PERIOD: f32 = 2.0;
/// Phase-one bosses retreat inside this distance
pub const BOSS_KEEP_AWAY: f32 = 300.0;

const STRAFE_APPROACH: f32 = 0.3;
const CIRCLE_TANGENT: f32 = 0.8;
const CIRCLE_APPROACH: f32 = 0.2;

impl Behavior {
    /// Unscaled movement vector for this behaviour.
    ///
    /// `to_player` must be a unit vector (or zero when the enemy sits on the
    /// player); `facing` is the enemy's current facing angle.
    pub fn steer(self, to_player: Vec2, facing: f32) -> Vec2 {
        match self {
            Self::Chase => to_player,
            Self::Retreat => -to_player,
            Self::Strafe => to_player.perp() + to_player * STRAFE_APPROACH,
            Self::Circle => {
                let tangent = polar_to_cartesian(1.0, facing + std::f32::consts::FRAC_PI_2);
                tangent * CIRCLE_TANGENT + to_player * CIRCLE_APPROACH
            }
        }
    }
}

/// Boss phase derived from remaining health
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BossPhase {
    /// Above 60% health
    One,
    /// 30% to 60% health
    Two,
    /// Below 30% health
    Three,
}

/// What a boss phase changes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhaseEffects {
    pub speed_multiplier: f32,
    /// Multiplies the archetype's seconds-between-shots
    pub fire_rate_multiplier: f32,
    /// Extra projectiles fanned symmetrically around the aimed shot
    pub fan_count: u32,
}

impl BossPhase {
    /// Phase for a health fraction in `[0, 1]`
    pub fn from_health_fraction(fraction: f32) -> Self {
        if fraction > 0.6 {
            Self::One
        } else if fraction >= 0.3 {
            Self::Two
        } else {
            Self::Three
        }
    }

    pub fn effects(self) -> PhaseEffects {
        match self {
            Self::One => PhaseEffects {
                speed_multiplier: 1.0,
                fire_rate_multiplier: 1.0,
                fan_count: 0,
            },
            Self::Two => PhaseEffects {
                speed_multiplier: 1.5,
                fire_rate_multiplier: 0.8,
                fan_count: 2,
            },
            Self::Three => PhaseEffects {
                speed_multiplier: 2.0,
                fire_rate_multiplier: 0.6,
                fan_count: 4,
            },
        }
    }
}

/// Pick the behaviour for this tick.
///
/// `toggle_due` is only consulted by erratic archetypes, whose period timer
/// lives on the enemy.
pub fn select_behavior(
    role: Role,
    current: Behavior,
    distance: f32,
    phase: Option<BossPhase>,
    toggle_due: bool,
) -> Behavior {
    match role {
        Role::Melee | Role::Heavy => Behavior::Chase,
        Role::Kiting => {
            if distance < KITE_NEAR {
                Behavior::Retreat
            } else if distance > KITE_FAR {
                Behavior::Chase
            } else {
                Behavior::Strafe
            }
        }
        Role::Erratic => {
            if !toggle_due {
                current
            } else if current == Behavior::Chase {
                Behavior::Circle
            } else {
                Behavior::Chase
            }
        }
        Role::Boss => match phase.unwrap_or(BossPhase::One) {
            BossPhase::One if distance < BOSS_KEEP_AWAY => Behavior::Retreat,
            BossPhase::One => Behavior::Chase,
            BossPhase::Two => Behavior::Strafe,
            BossPhase::Three => Behavior::Chase,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_falls_back_to_default() {
        assert_eq!(EnemyKind::lookup("dunuhara"), EnemyKind::Dunuhara);
        assert_eq!(EnemyKind::lookup("RAVANA"), EnemyKind::Ravana);
        assert_eq!(EnemyKind::lookup("naga"), EnemyKind::Yaksha);
    }

    #[test]
    fn test_stats_table_matches_kinds() {
        for kind in EnemyKind::ALL {
            let stats = kind.stats();
            assert!(stats.health > 0.0);
            assert_eq!(stats.fire_rate.is_some(), matches!(stats.role, Role::Kiting | Role::Boss));
        }
        assert_eq!(EnemyKind::Ravana.stats().role, Role::Boss);
    }

    #[test]
    fn test_boss_phase_bands() {
        assert_eq!(BossPhase::from_health_fraction(1.0), BossPhase::One);
        assert_eq!(BossPhase::from_health_fraction(0.61), BossPhase::One);
        assert_eq!(BossPhase::from_health_fraction(0.6), BossPhase::Two);
        assert_eq!(BossPhase::from_health_fraction(0.3), BossPhase::Two);
        assert_eq!(BossPhase::from_health_fraction(0.29), BossPhase::Three);
        assert_eq!(BossPhase::from_health_fraction(0.0), BossPhase::Three);
    }

    #[test]
    fn test_later_phases_escalate() {
        let one = BossPhase::One.effects();
        let two = BossPhase::Two.effects();
        let three = BossPhase::Three.effects();
        assert!(two.speed_multiplier > one.speed_multiplier);
        assert!(three.speed_multiplier > two.speed_multiplier);
        assert!(three.fire_rate_multiplier < one.fire_rate_multiplier);
        assert!(three.fan_count > two.fan_count);
        assert_eq!(two.fan_count % 2, 0);
    }

    #[test]
    fn test_kiting_thresholds() {
        let pick = |d| select_behavior(Role::Kiting, Behavior::Chase, d, None, false);
        assert_eq!(pick(150.0), Behavior::Retreat);
        assert_eq!(pick(300.0), Behavior::Strafe);
        assert_eq!(pick(450.0), Behavior::Chase);
    }

    #[test]
    fn test_erratic_toggles_only_when_due() {
        let hold = select_behavior(Role::Erratic, Behavior::Chase, 100.0, None, false);
        assert_eq!(hold, Behavior::Chase);
        let flip = select_behavior(Role::Erratic, Behavior::Chase, 100.0, None, true);
        assert_eq!(flip, Behavior::Circle);
        let back = select_behavior(Role::Erratic, Behavior::Circle, 100.0, None, true);
        assert_eq!(back, Behavior::Chase);
    }

    #[test]
    fn test_strafe_is_mostly_perpendicular() {
        let dir = Vec2::X;
        let v = Behavior::Strafe.steer(dir, 0.0);
        assert!((v.x - 0.3).abs() < 1e-6);
        assert!((v.y.abs() - 1.0).abs() < 1e-6);
        assert_eq!(Behavior::Retreat.steer(dir, 0.0), -dir);
    }
}
