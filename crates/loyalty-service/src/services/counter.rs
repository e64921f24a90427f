//! Bounded per-user, per-channel message counter
//!
//! Counts live only in memory and start from zero on every process start.
//! When full, the entry updated longest ago is evicted to make room.

use std::collections::{BTreeMap, HashMap};

use loyalty_core::Snowflake;

type CounterKey = (Snowflake, Snowflake);

#[derive(Debug, Clone, Copy)]
struct Entry {
    count: u32,
    touched: u64,
}

/// Counts messages per (user, channel) and reports every `threshold`-th one
#[derive(Debug)]
pub struct MessageCounter {
    threshold: u32,
    capacity: usize,
    entries: HashMap<CounterKey, Entry>,
    /// touch tick -> key, oldest first
    recency: BTreeMap<u64, CounterKey>,
    tick: u64,
}

impl MessageCounter {
    /// Zero `threshold` or `capacity` is treated as 1.
    #[must_use]
    pub fn new(threshold: u32, capacity: usize) -> Self {
        Self {
            threshold: threshold.max(1),
            capacity: capacity.max(1),
            entries: HashMap::new(),
            recency: BTreeMap::new(),
            tick: 0,
        }
    }

    /// Record one message; returns true when it completes a milestone
    ///
    /// The count restarts from zero after each milestone, so milestones fall
    /// on the threshold-th, 2×threshold-th, ... message.
    pub fn record(&mut self, user_id: Snowflake, channel_id: Snowflake) -> bool {
        let key = (user_id, channel_id);
        self.tick += 1;
        let tick = self.tick;

        let previous = self.entries.get(&key).copied();
        if previous.is_none() && self.entries.len() >= self.capacity {
            self.evict_oldest();
        }

        let mut entry = previous.unwrap_or(Entry { count: 0, touched: 0 });
        if previous.is_some() {
            self.recency.remove(&entry.touched);
        }

        entry.count += 1;
        entry.touched = tick;
        let milestone = entry.count >= self.threshold;
        if milestone {
            entry.count = 0;
        }

        self.entries.insert(key, entry);
        self.recency.insert(tick, key);
        milestone
    }

    /// Current count toward the next milestone
    #[must_use]
    pub fn count(&self, user_id: Snowflake, channel_id: Snowflake) -> u32 {
        self.entries
            .get(&(user_id, channel_id))
            .map_or(0, |e| e.count)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    fn evict_oldest(&mut self) {
        if let Some((_, key)) = self.recency.pop_first() {
            self.entries.remove(&key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const USER: Snowflake = Snowflake::new(1);
    const CHANNEL: Snowflake = Snowflake::new(100);

    #[test]
    fn test_milestones_every_threshold_messages() {
        let mut counter = MessageCounter::new(5, 16);

        let hits: Vec<usize> = (1..=10)
            .filter(|_| counter.record(USER, CHANNEL))
            .collect();
        assert_eq!(hits, vec![5, 10]);
        assert_eq!(counter.count(USER, CHANNEL), 0);
    }

    #[test]
    fn test_counts_are_per_user_and_channel() {
        let mut counter = MessageCounter::new(2, 16);
        let other_user = Snowflake::new(2);
        let other_channel = Snowflake::new(200);

        assert!(!counter.record(USER, CHANNEL));
        assert!(!counter.record(other_user, CHANNEL));
        assert!(!counter.record(USER, other_channel));
        assert!(counter.record(USER, CHANNEL));
        assert_eq!(counter.count(other_user, CHANNEL), 1);
        assert_eq!(counter.count(USER, other_channel), 1);
    }

    #[test]
    fn test_eviction_drops_least_recently_updated() {
        let mut counter = MessageCounter::new(10, 2);
        let a = Snowflake::new(1);
        let b = Snowflake::new(2);
        let c = Snowflake::new(3);

        counter.record(a, CHANNEL);
        counter.record(b, CHANNEL);
        counter.record(a, CHANNEL);
        counter.record(c, CHANNEL);

        assert_eq!(counter.len(), 2);
        assert_eq!(counter.count(a, CHANNEL), 2);
        assert_eq!(counter.count(b, CHANNEL), 0);
        assert_eq!(counter.count(c, CHANNEL), 1);
    }

    #[test]
    fn test_new_counter_starts_empty() {
        let counter = MessageCounter::new(5, 10);
        assert!(counter.is_empty());
        assert_eq!(counter.count(USER, CHANNEL), 0);
        assert_eq!(counter.threshold(), 5);
    }
}
