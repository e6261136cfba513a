use std::collections::VecDeque;

use serde::Serialize;
use tracing::info;

use super::domain::{Category, GeneratedOutfit, ItemUrl, WardrobeItem};

/// Counter value at which an item's owner is asked what to do with it.
pub const DEFAULT_REJECTION_THRESHOLD: u32 = 3;

/// Pending "keep, delete, or donate" question about one item.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DispositionPrompt {
    pub slot: Category,
    pub item: WardrobeItem,
    pub rejection_count: u32,
}

/// Decides which items a reject touches and queues disposition prompts.
///
/// Counters themselves live in the item store; the tracker only sees the
/// value each counter held immediately before it was incremented.
#[derive(Debug, Clone)]
pub struct RejectionTracker {
    threshold: u32,
    queue: VecDeque<DispositionPrompt>,
}

impl RejectionTracker {
    pub fn new(threshold: u32) -> Self {
        Self {
            threshold: threshold.max(1),
            queue: VecDeque::new(),
        }
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    /// Items in unlocked, occupied slots, in slot order.
    pub fn rejection_targets(outfit: &GeneratedOutfit) -> Vec<(Category, &WardrobeItem)> {
        Category::ordered()
            .into_iter()
            .filter(|slot| !outfit.is_locked(*slot))
            .filter_map(|slot| outfit.item(slot).map(|scored| (slot, &scored.item)))
            .collect()
    }

    /// True when incrementing `prior` lands exactly on the threshold.
    pub fn reaches_threshold(&self, prior: u32) -> bool {
        prior.saturating_add(1) == self.threshold
    }

    /// Queues a prompt for an item whose counter just reached the threshold.
    pub fn enqueue(&mut self, slot: Category, item: WardrobeItem, rejection_count: u32) {
        if self.queue.iter().any(|prompt| prompt.item.url == item.url) {
            return;
        }
        info!(item = %item.url, slot = %slot, rejection_count, "disposition prompt queued");
        self.queue.push_back(DispositionPrompt {
            slot,
            item,
            rejection_count,
        });
    }

    pub fn current_prompt(&self) -> Option<&DispositionPrompt> {
        self.queue.front()
    }

    /// Dequeues the prompt at the front once the user answered Keep or Delete.
    pub fn complete_current(&mut self) -> Option<DispositionPrompt> {
        self.queue.pop_front()
    }

    pub fn has_pending(&self) -> bool {
        !self.queue.is_empty()
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Drops any prompt about an item that no longer exists.
    pub fn discard(&mut self, url: &ItemUrl) {
        self.queue.retain(|prompt| &prompt.item.url != url);
    }

    pub fn clear(&mut self) {
        self.queue.clear();
    }
}

impl Default for RejectionTracker {
    fn default() -> Self {
        Self::new(DEFAULT_REJECTION_THRESHOLD)
    }
}
