//! Fixed-capacity, insertion-ordered history buffer.

use std::collections::VecDeque;

/// Number of analyses kept in a user's history.
pub const HISTORY_CAP: usize = 20;

/// Keeps the most recent `capacity` entries. Pushing onto a full buffer
/// evicts the oldest entry first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundedHistory<T> {
    items: VecDeque<T>,
    capacity: usize,
}

impl<T> BoundedHistory<T> {
    /// A zero capacity is raised to 1 so that the newest entry always survives.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            items: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Push entries listed oldest first. Returns everything evicted, oldest first.
    pub fn push_all(&mut self, items: impl IntoIterator<Item = T>) -> Vec<T> {
        items.into_iter().filter_map(|item| self.push(item)).collect()
    }

    /// Append the newest entry. Returns the evicted entry, if any.
    pub fn push(&mut self, item: T) -> Option<T> {
        let evicted = if self.items.len() == self.capacity {
            self.items.pop_front()
        } else {
            None
        };
        self.items.push_back(item);
        evicted
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }

    pub fn newest_first(&self) -> impl Iterator<Item = &T> {
        self.items.iter().rev()
    }

    pub fn newest(&self) -> Option<&T> {
        self.items.back()
    }

    pub fn oldest(&self) -> Option<&T> {
        self.items.front()
    }
}

impl<T> Default for BoundedHistory<T> {
    fn default() -> Self {
        Self::new(HISTORY_CAP)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_below_capacity_keeps_everything() {
        let mut history = BoundedHistory::new(3);
        assert_eq!(history.push(1), None);
        assert_eq!(history.push(2), None);
        assert_eq!(history.len(), 2);
        assert_eq!(history.iter().copied().collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn test_full_buffer_evicts_oldest() {
        let mut history = BoundedHistory::new(3);
        for i in 1..=3 {
            history.push(i);
        }
        assert_eq!(history.push(4), Some(1));
        assert_eq!(history.push(5), Some(2));
        assert_eq!(history.iter().copied().collect::<Vec<_>>(), vec![3, 4, 5]);
        assert_eq!(history.len(), 3);
    }

    #[test]
    fn test_newest_first() {
        let mut history = BoundedHistory::new(5);
        assert!(history.push_all(vec!["a", "b", "c"]).is_empty());
        assert_eq!(history.newest_first().copied().collect::<Vec<_>>(), vec!["c", "b", "a"]);
        assert_eq!(history.newest(), Some(&"c"));
        assert_eq!(history.oldest(), Some(&"a"));
    }

    #[test]
    fn test_push_all_reports_every_eviction() {
        let mut history = BoundedHistory::new(HISTORY_CAP);
        assert_eq!(history.push_all(1..=25), vec![1, 2, 3, 4, 5]);
        assert_eq!(history.len(), 20);
        assert_eq!(history.oldest(), Some(&6));
        assert_eq!(history.newest(), Some(&25));
    }

    #[test]
    fn test_zero_capacity_raised_to_one() {
        let mut history = BoundedHistory::new(0);
        assert_eq!(history.capacity(), 1);
        history.push("first");
        assert_eq!(history.push("second"), Some("first"));
        assert_eq!(history.newest(), Some(&"second"));
    }

    #[test]
    fn test_default_capacity() {
        let history: BoundedHistory<u8> = BoundedHistory::default();
        assert_eq!(history.capacity(), HISTORY_CAP);
        assert!(history.is_empty());
    }
}
