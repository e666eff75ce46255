//! Capped entity collections
//!
//! Every entity list the orchestrator owns has a fixed maximum size. New
//! spawns are either dropped once the cap is reached or, for purely cosmetic
//! entities, make room by evicting the oldest entry.

use std::collections::VecDeque;
use std::collections::vec_deque::{Iter, IterMut};

use serde::{Serialize, Serializer};

/// A ring buffer with a population cap, oldest entries first
#[derive(Debug, Clone)]
pub struct Population<T> {
    items: VecDeque<T>,
    cap: usize,
}

impl<T> Population<T> {
    pub fn with_cap(cap: usize) -> Self {
        Self {
            items: VecDeque::with_capacity(cap.min(256)),
            cap,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.items.len() >= self.cap
    }

    /// Add `item` unless the cap is reached. Returns whether it was added.
    pub fn try_push(&mut self, item: T) -> bool {
        if self.is_full() {
            return false;
        }
        self.items.push_back(item);
        true
    }

    /// Add `item`, evicting the oldest entry when at capacity
    pub fn push_evicting(&mut self, item: T) -> Option<T> {
        if self.cap == 0 {
            return Some(item);
        }
        let evicted = if self.is_full() {
            self.items.pop_front()
        } else {
            None
        };
        self.items.push_back(item);
        evicted
    }

    pub fn retain(&mut self, f: impl FnMut(&T) -> bool) {
        self.items.retain(f);
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn iter(&self) -> Iter<'_, T> {
        self.items.iter()
    }

    pub fn iter_mut(&mut self) -> IterMut<'_, T> {
        self.items.iter_mut()
    }
}

/// Serializes as a plain sequence, oldest first
impl<T: Serialize> Serialize for Population<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(&self.items)
    }
}

impl<'a, T> IntoIterator for &'a Population<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl<'a, T> IntoIterator for &'a mut Population<T> {
    type Item = &'a mut T;
    type IntoIter = IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contents(pop: &Population<i32>) -> Vec<i32> {
        pop.iter().copied().collect()
    }

    #[test]
    fn test_try_push_drops_at_cap() {
        let mut pop = Population::with_cap(2);
        assert!(pop.try_push(1));
        assert!(pop.try_push(2));
        assert!(!pop.try_push(3));
        assert_eq!(contents(&pop), vec![1, 2]);
    }

    #[test]
    fn test_push_evicting_removes_oldest() {
        let mut pop = Population::with_cap(2);
        assert_eq!(pop.push_evicting(1), None);
        assert_eq!(pop.push_evicting(2), None);
        assert_eq!(pop.push_evicting(3), Some(1));
        assert_eq!(pop.push_evicting(4), Some(2));
        assert_eq!(contents(&pop), vec![3, 4]);
    }

    #[test]
    fn test_retain_keeps_order_after_wrap() {
        let mut pop = Population::with_cap(3);
        for i in 1..=5 {
            pop.push_evicting(i);
        }
        pop.retain(|&i| i != 4);
        assert_eq!(contents(&pop), vec![3, 5]);
    }

    #[test]
    fn test_serializes_as_sequence() {
        let mut pop = Population::with_cap(2);
        for i in 1..=3 {
            pop.push_evicting(i);
        }
        assert_eq!(serde_json::to_string(&pop).expect("serialize"), "[2,3]");
    }

    #[test]
    fn test_zero_cap_holds_nothing() {
        let mut pop = Population::with_cap(0);
        assert!(!pop.try_push(1));
        assert_eq!(pop.push_evicting(1), Some(1));
        assert!(pop.is_empty());
    }
}
