//! Driver feed: reverse-chronological list of event explanations.

use std::collections::VecDeque;
use uuid::Uuid;
use volsim_domain::entities::FeedEntry;
use volsim_domain::value_objects::SentimentTally;

/// Default number of entries kept in the feed.
pub const DEFAULT_FEED_CAPACITY: usize = 50;

/// Bounded, most-recent-first feed of [`FeedEntry`] values.
#[derive(Debug, Clone)]
pub struct DriverFeed {
    entries: VecDeque<FeedEntry>,
    capacity: usize,
}

impl DriverFeed {
    /// Creates an empty feed holding at most `capacity` entries.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity.min(DEFAULT_FEED_CAPACITY)),
            capacity,
        }
    }

    /// Prepends an entry; when full, the oldest entry is removed and
    /// returned.
    pub fn push(&mut self, entry: FeedEntry) -> Option<FeedEntry> {
        self.entries.push_front(entry);
        if self.entries.len() > self.capacity {
            self.entries.pop_back()
        } else {
            None
        }
    }

    /// Entries, newest first.
    pub fn iter(&self) -> impl Iterator<Item = &FeedEntry> {
        self.entries.iter()
    }

    /// Most recent entry.
    #[must_use]
    pub fn latest(&self) -> Option<&FeedEntry> {
        self.entries.front()
    }

    #[must_use]
    pub fn get(&self, id: Uuid) -> Option<&FeedEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// Sentiment balance over the retained entries.
    #[must_use]
    pub fn tally(&self) -> SentimentTally {
        SentimentTally::from_entries(&self.entries)
    }

    /// Owned copy, newest first.
    #[must_use]
    pub fn to_vec(&self) -> Vec<FeedEntry> {
        self.entries.iter().cloned().collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl Default for DriverFeed {
    fn default() -> Self {
        Self::new(DEFAULT_FEED_CAPACITY)
    }
}
