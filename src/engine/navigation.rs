//! Bounded memory of navigations that already wrote an audit event.

use std::collections::{HashSet, VecDeque};

use crate::relationship::UserId;

type NavigationKey = (UserId, UserId, String);

/// Remembers the most recent `capacity` navigations, oldest evicted first.
#[derive(Debug)]
pub(crate) struct NavigationMemory {
    capacity: usize,
    order: VecDeque<NavigationKey>,
    seen: HashSet<NavigationKey>,
}

impl NavigationMemory {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            capacity,
            order: VecDeque::new(),
            seen: HashSet::new(),
        }
    }

    /// Claims a navigation. Returns `false` if it was already claimed.
    pub(crate) fn claim(&mut self, viewer: UserId, subject: UserId, navigation_id: &str) -> bool {
        if self.capacity == 0 {
            return true;
        }

        let key = (viewer, subject, navigation_id.to_string());
        if self.seen.contains(&key) {
            return false;
        }

        while self.order.len() >= self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.seen.remove(&oldest);
            }
        }
        self.order.push_back(key.clone());
        self.seen.insert(key);
        true
    }

    /// Forgets a claim whose audit write failed, so a retry can record it.
    pub(crate) fn release(&mut self, viewer: UserId, subject: UserId, navigation_id: &str) {
        let key = (viewer, subject, navigation_id.to_string());
        if self.seen.remove(&key) {
            self.order.retain(|k| k != &key);
        }
    }
}
