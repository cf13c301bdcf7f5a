//! Bounded topic-aware message queues
//!
//! One [`TopicQueue`] sits behind every publisher peer link (outbound) and
//! every subscriber (inbound). The high-water mark bounds the number of
//! queued messages; in conflate mode the queue instead keeps only the newest
//! message per topic and never reports itself full.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::Notify;

/// Anything queued by topic
pub(crate) trait Topical {
    fn topic(&self) -> &[u8];
}

pub(crate) struct TopicQueue<T> {
    items: Mutex<VecDeque<T>>,
    capacity: Option<usize>,
    conflate: bool,
    readable: Notify,
    /// Signalled whenever an item leaves; shared by all queues of one socket
    space: Arc<Notify>,
}

impl<T: Topical> TopicQueue<T> {
    pub fn new(capacity: Option<usize>, conflate: bool, space: Arc<Notify>) -> Self {
        Self {
            items: Mutex::new(VecDeque::new()),
            capacity,
            conflate,
            readable: Notify::new(),
            space,
        }
    }

    pub fn len(&self) -> usize {
        self.items.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.lock().is_empty()
    }

    /// Whether a push would be accepted right now
    pub fn has_room(&self) -> bool {
        self.conflate || self.capacity.map_or(true, |cap| self.len() < cap)
    }

    /// Enqueue `item`; returns false if the queue is at its high-water mark
    pub fn push(&self, item: T) -> bool {
        {
            let mut items = self.items.lock();
            if self.conflate {
                items.retain(|queued| queued.topic() != item.topic());
            } else if self.capacity.is_some_and(|cap| items.len() >= cap) {
                return false;
            }
            items.push_back(item);
        }
        self.readable.notify_waiters();
        true
    }

    pub fn try_pop(&self) -> Option<T> {
        let item = self.items.lock().pop_front();
        if item.is_some() {
            self.space.notify_waiters();
        }
        item
    }

    /// Wait until an item is queued (does not take it)
    pub async fn readable(&self) {
        loop {
            let notified = self.readable.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            if !self.is_empty() {
                return;
            }
            notified.await;
        }
    }

    /// Wait for and take the next item; cancel-safe
    pub async fn pop(&self) -> T {
        loop {
            let notified = self.readable.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            if let Some(item) = self.try_pop() {
                return item;
            }
            notified.await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[derive(Debug, PartialEq)]
    struct Item(&'static str, u32);

    impl Topical for Item {
        fn topic(&self) -> &[u8] {
            self.0.as_bytes()
        }
    }

    fn queue(capacity: Option<usize>, conflate: bool) -> TopicQueue<Item> {
        TopicQueue::new(capacity, conflate, Arc::new(Notify::new()))
    }

    #[test]
    fn test_high_water_mark_rejects_overflow() {
        let q = queue(Some(2), false);
        assert!(q.push(Item("a", 1)));
        assert!(q.push(Item("a", 2)));
        assert!(!q.has_room());
        assert!(!q.push(Item("a", 3)));
        assert_eq!(q.try_pop(), Some(Item("a", 1)));
        assert!(q.has_room());
    }

    #[test]
    fn test_conflate_keeps_newest_per_topic() {
        let q = queue(Some(1), true);
        assert!(q.push(Item("camera", 1)));
        assert!(q.push(Item("imu", 1)));
        assert!(q.push(Item("camera", 2)));
        assert!(q.has_room());
        assert_eq!(q.len(), 2);
        assert_eq!(q.try_pop(), Some(Item("imu", 1)));
        assert_eq!(q.try_pop(), Some(Item("camera", 2)));
        assert_eq!(q.try_pop(), None);
    }

    #[test]
    fn test_unbounded() {
        let q = queue(None, false);
        for i in 0..10_000 {
            assert!(q.push(Item("t", i)));
        }
        assert_eq!(q.len(), 10_000);
    }

    #[tokio::test]
    async fn test_pop_wakes_on_push() {
        let q = Arc::new(queue(None, false));
        let consumer = {
            let q = Arc::clone(&q);
            tokio::spawn(async move { q.pop().await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        q.push(Item("lidar", 7));
        let item = tokio::time::timeout(Duration::from_secs(1), consumer)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(item, Item("lidar", 7));
    }
}
