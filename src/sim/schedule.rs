//! Deferred event queue keyed by session generation
//!
//! Delays are measured in simulated seconds, so a paused game (no ticks)
//! freezes every pending event. Each event remembers the generation it was
//! scheduled under; bumping the generation makes all earlier events inert.

use serde::{Deserialize, Serialize};

use super::archetype::EnemyKind;

/// Work the director asks the orchestrator to do later
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScheduledAction {
    /// Begin spawning the given wave (1-based)
    StartWave { wave: usize },
    /// Spawn one enemy that belongs to `wave`
    Spawn { wave: usize, kind: EnemyKind },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Pending {
    due: f32,
    seq: u64,
    generation: u64,
    action: ScheduledAction,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventQueue {
    clock: f32,
    generation: u64,
    seq: u64,
    pending: Vec<Pending>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `action` to come due `delay` seconds from now
    pub fn schedule(&mut self, delay: f32, action: ScheduledAction) {
        let delay = if delay.is_finite() { delay.max(0.0) } else { 0.0 };
        self.seq += 1;
        self.pending.push(Pending {
            due: self.clock + delay,
            seq: self.seq,
            generation: self.generation,
            action,
        });
    }

    /// Start a new generation. Everything scheduled so far will be dropped
    /// when it comes due.
    pub fn invalidate(&mut self) {
        self.generation += 1;
    }

    /// Advance the clock and return actions now due, oldest first
    pub fn advance(&mut self, dt: f32) -> Vec<ScheduledAction> {
        if dt.is_finite() && dt > 0.0 {
            self.clock += dt;
        }

        let clock = self.clock;
        let (mut due, rest): (Vec<Pending>, Vec<Pending>) =
            self.pending.drain(..).partition(|p| p.due <= clock);
        self.pending = rest;

        due.sort_by(|a, b| a.due.total_cmp(&b.due).then(a.seq.cmp(&b.seq)));

        let generation = self.generation;
        due.into_iter()
            .filter_map(|p| {
                if p.generation == generation {
                    Some(p.action)
                } else {
                    log::warn!(
                        "Discarding stale {:?} from generation {} (current {})",
                        p.action,
                        p.generation,
                        generation
                    );
                    None
                }
            })
            .collect()
    }

    /// Events scheduled under the current generation and not yet due
    pub fn pending_len(&self) -> usize {
        self.pending
            .iter()
            .filter(|p| p.generation == self.generation)
            .count()
    }

    /// Drop every pending event outright
    pub fn clear(&mut self) {
        self.pending.clear();
    }
}
