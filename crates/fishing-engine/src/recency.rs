use std::collections::{HashMap, VecDeque};

use crate::UserId;

/// Number of catches remembered per user.
pub const RECENCY_CAPACITY: usize = 10;

/// The last [`RECENCY_CAPACITY`] item names a user caught, most recent last.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecencyWindow {
    entries: VecDeque<String>,
}

impl RecencyWindow {
    pub fn push(&mut self, item: impl Into<String>) {
        if self.entries.len() == RECENCY_CAPACITY {
            self.entries.pop_front();
        }
        self.entries.push_back(item.into());
    }

    pub fn contains(&self, item: &str) -> bool {
        self.entries.iter().any(|entry| entry == item)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Recency windows keyed by user, created on first catch.
#[derive(Debug, Default)]
pub struct RecentCatches {
    windows: HashMap<UserId, RecencyWindow>,
}

impl RecentCatches {
    pub fn push(&mut self, user: UserId, item: impl Into<String>) {
        self.windows.entry(user).or_default().push(item);
    }

    pub fn contains(&self, user: UserId, item: &str) -> bool {
        self.windows
            .get(&user)
            .map_or(false, |window| window.contains(item))
    }

    pub fn window(&self, user: UserId) -> Option<&RecencyWindow> {
        self.windows.get(&user)
    }
}
