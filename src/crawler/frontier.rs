//! Frontier queue and visited set for link discovery
//!
//! Only the sequential crawl loop touches these, so there is no locking.

use crate::url::NormalizedUrl;
use std::collections::{HashSet, VecDeque};

/// FIFO work queue plus the set of URLs already dequeued
#[derive(Debug, Default)]
pub struct Frontier {
    queue: VecDeque<NormalizedUrl>,
    queued: HashSet<NormalizedUrl>,
    visited: HashSet<NormalizedUrl>,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a frontier holding the seeds in order, duplicates dropped
    pub fn with_seeds<I>(seeds: I) -> Self
    where
        I: IntoIterator<Item = NormalizedUrl>,
    {
        let mut frontier = Self::new();
        for seed in seeds {
            frontier.enqueue_if_new(seed);
        }
        frontier
    }

    /// Adds a URL unless it was already visited or is waiting in the queue
    ///
    /// Returns true if the URL was added.
    pub fn enqueue_if_new(&mut self, url: NormalizedUrl) -> bool {
        if self.visited.contains(&url) || self.queued.contains(&url) {
            return false;
        }
        self.queued.insert(url.clone());
        self.queue.push_back(url);
        true
    }

    /// Takes the oldest queued URL
    pub fn dequeue(&mut self) -> Option<NormalizedUrl> {
        let url = self.queue.pop_front()?;
        self.queued.remove(&url);
        Some(url)
    }

    /// Records a URL as visited
    ///
    /// Returns false if it had already been visited.
    pub fn mark_visited(&mut self, url: &NormalizedUrl) -> bool {
        self.visited.insert(url.clone())
    }

    pub fn is_visited(&self, url: &NormalizedUrl) -> bool {
        self.visited.contains(url)
    }

    /// Number of URLs visited so far
    pub fn visited_len(&self) -> usize {
        self.visited.len()
    }

    /// Number of URLs waiting in the queue
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
