//! Simulation module
//!
//! All gameplay logic lives here. No rendering, audio or DOM access:
//! - Variable timestep, sanitized once per frame
//! - Seeded RNG owned by the game state
//! - Discrete events for external consumers

pub mod archetype;
pub mod collision;
pub mod director;
pub mod enemy;
pub mod pickup;
pub mod player;
pub mod population;
pub mod projectile;
pub mod schedule;
pub mod state;
pub mod tick;

pub use archetype::{Archetype, Behavior, BossPhase, EnemyKind, PhaseEffects, Role};
pub use collision::{Collider, circles_overlap};
pub use director::{DirectorState, WaveDirector, WaveOutcome};
pub use enemy::Enemy;
pub use pickup::{Particle, PowerUp, PowerUpKind};
pub use player::{DamageOutcome, Player};
pub use population::Population;
pub use projectile::{Owner, Projectile};
pub use schedule::{EventQueue, ScheduledAction};
pub use state::{GameEvent, GamePhase, GameState, Hud, RenderSnapshot, SessionStats};
pub use tick::{TickInput, tick};
