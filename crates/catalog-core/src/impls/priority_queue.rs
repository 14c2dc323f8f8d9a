//! PriorityDispatchQueue - 優先度つき blocking キュー
//!
//! # 実装詳細
//! - BinaryHeap を (priority, seq) の逆順で並べて min-heap として使う
//! - seq は push 時に単調増加カウンタから採番する（同一優先度内の FIFO 保証）
//! - 比較はキーのみ。payload（接続ハンドルなど）は比較しない
//! - pop は Notify で待ち、timeout で None を返す（shutdown のポーリング用）

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::time::Duration;

use tokio::sync::{Mutex, Notify};
use tokio::time::Instant;

use crate::domain::Priority;

/// A dequeued item together with its ordering key.
#[derive(Debug)]
pub struct Queued<T> {
    pub priority: Priority,
    pub seq: u64,
    pub item: T,
}

struct Entry<T> {
    priority: Priority,
    seq: u64,
    item: T,
}

impl<T> Entry<T> {
    fn key(&self) -> (Priority, u64) {
        (self.priority, self.seq)
    }
}

impl<T> PartialEq for Entry<T> {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl<T> Eq for Entry<T> {}

impl<T> PartialOrd for Entry<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Entry<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering: smaller (priority, seq) is popped first
        other.key().cmp(&self.key())
    }
}

struct QueueState<T> {
    heap: BinaryHeap<Entry<T>>,
    next_seq: u64,
}

/// Thread-safe priority queue shared by the listener and the workers.
///
/// Unbounded: `push` always succeeds and never waits beyond the internal lock.
pub struct PriorityDispatchQueue<T> {
    state: Mutex<QueueState<T>>,
    notify: Notify,
}

impl<T: Send> PriorityDispatchQueue<T> {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(QueueState {
                heap: BinaryHeap::new(),
                next_seq: 0,
            }),
            notify: Notify::new(),
        }
    }

    /// Enqueue `item`, returning the sequence number it was assigned.
    pub async fn push(&self, priority: Priority, item: T) -> u64 {
        let seq = {
            let mut state = self.state.lock().await;
            let seq = state.next_seq;
            state.next_seq += 1;
            state.heap.push(Entry {
                priority,
                seq,
                item,
            });
            seq
        };

        // Notify outside the lock
        self.notify.notify_one();
        seq
    }

    /// Wait up to `timeout` for the highest-priority, earliest-arrived item.
    pub async fn pop(&self, timeout: Duration) -> Option<Queued<T>> {
        let deadline = Instant::now() + timeout;
        loop {
            // 先に登録しておかないと、確認と待機の間の push を取りこぼす
            let notified = self.notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if let Some(entry) = self.state.lock().await.heap.pop() {
                return Some(Queued {
                    priority: entry.priority,
                    seq: entry.seq,
                    item: entry.item,
                });
            }

            tokio::select! {
                _ = &mut notified => {},
                _ = tokio::time::sleep_until(deadline) => return None,
            }
        }
    }

    pub async fn len(&self) -> usize {
        self.state.lock().await.heap.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Remove everything still waiting. Used at shutdown.
    pub async fn drain(&self) -> Vec<Queued<T>> {
        let mut state = self.state.lock().await;
        let mut out = Vec::with_capacity(state.heap.len());
        while let Some(entry) = state.heap.pop() {
            out.push(Queued {
                priority: entry.priority,
                seq: entry.seq,
                item: entry.item,
            });
        }
        out
    }
}

impl<T: Send> Default for PriorityDispatchQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    const SHORT: Duration = Duration::from_millis(50);

    async fn pop_all(queue: &PriorityDispatchQueue<&'static str>) -> Vec<&'static str> {
        let mut out = Vec::new();
        while let Some(q) = queue.pop(SHORT).await {
            out.push(q.item);
        }
        out
    }

    #[tokio::test]
    async fn fifo_within_same_priority() {
        let queue = PriorityDispatchQueue::new();
        queue.push(Priority::Low, "q1").await;
        queue.push(Priority::Low, "q2").await;
        queue.push(Priority::Low, "q3").await;

        assert_eq!(pop_all(&queue).await, vec!["q1", "q2", "q3"]);
    }

    #[tokio::test]
    async fn high_priority_overtakes_earlier_low() {
        let queue = PriorityDispatchQueue::new();
        queue.push(Priority::Low, "query-z").await;
        queue.push(Priority::Low, "query-y").await;
        queue.push(Priority::High, "insert-w").await;
        queue.push(Priority::High, "insert-v").await;

        assert_eq!(
            pop_all(&queue).await,
            vec!["insert-w", "insert-v", "query-z", "query-y"]
        );
    }

    #[tokio::test]
    async fn sequence_numbers_are_monotonic() {
        let queue = PriorityDispatchQueue::new();
        let a = queue.push(Priority::Low, "a").await;
        let b = queue.push(Priority::High, "b").await;
        let c = queue.push(Priority::Low, "c").await;
        assert!(a < b && b < c);

        let first = queue.pop(SHORT).await.unwrap();
        assert_eq!((first.priority, first.seq), (Priority::High, b));
    }

    #[tokio::test]
    async fn pop_times_out_on_empty_queue() {
        let queue: PriorityDispatchQueue<()> = PriorityDispatchQueue::new();
        let start = Instant::now();
        assert!(queue.pop(Duration::from_millis(200)).await.is_none());
        assert!(start.elapsed() >= Duration::from_millis(200));
    }

    #[tokio::test]
    async fn push_wakes_waiting_pop() {
        let queue: Arc<PriorityDispatchQueue<&'static str>> = Arc::new(PriorityDispatchQueue::new());

        let waiter = tokio::spawn({
            let queue = Arc::clone(&queue);
            async move { queue.pop(Duration::from_secs(5)).await.map(|q| q.item) }
        });

        tokio::time::sleep(Duration::from_millis(100)).await;
        queue.push(Priority::Low, "late").await;

        assert_eq!(waiter.await.unwrap(), Some("late"));
    }

    #[tokio::test]
    async fn every_item_reaches_exactly_one_waiter() {
        let queue: Arc<PriorityDispatchQueue<u32>> = Arc::new(PriorityDispatchQueue::new());
        let mut waiters = Vec::new();
        for _ in 0..4 {
            let queue = Arc::clone(&queue);
            waiters.push(tokio::spawn(async move {
                queue.pop(Duration::from_secs(2)).await.map(|q| q.item)
            }));
        }

        for i in 0..4u32 {
            queue.push(Priority::Low, i).await;
        }

        let mut got: Vec<u32> = Vec::new();
        for w in waiters {
            got.push(w.await.unwrap().expect("each waiter gets one item"));
        }
        got.sort_unstable();
        assert_eq!(got, vec![0, 1, 2, 3]);
        assert!(queue.is_empty().await);
    }

    #[tokio::test]
    async fn drain_returns_in_dequeue_order() {
        let queue = PriorityDispatchQueue::new();
        queue.push(Priority::Low, "q").await;
        queue.push(Priority::High, "i").await;

        let drained: Vec<_> = queue.drain().await.into_iter().map(|q| q.item).collect();
        assert_eq!(drained, vec!["i", "q"]);
        assert_eq!(queue.len().await, 0);
    }
}
