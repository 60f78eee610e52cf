//! The bounded, signal-carrying event FIFO (ยง3.3, ยง4.1).

pub mod pool;

// Layer 1: Standard library
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

// Layer 2: Third-party
use tokio::sync::{Mutex, Notify};
use tokio::time::timeout;

// Layer 3: Internal
use crate::error::FrameworkException;
use crate::event::Event;

pub use pool::{
    connect_error_queue, connect_log_queue, connect_queue, QueueGroup, QueuePool,
};

struct Inner {
    events: Mutex<VecDeque<Event>>,
    content_ready: Notify,
    max_size: usize,
}

/// A named bounded FIFO of events, shared between exactly one producer side
/// and exactly one consumer side (ยง3.3, ยง9 "Shared resources").
///
/// Blocking `put`/`get` suspend on a `tokio::sync::Notify` content-ready
/// signal rather than raising control-flow exceptions (ยง9 "Exception control
/// flow"); the non-blocking `try_put`/`try_get` forms return an explicit
/// `Result` instead.
#[derive(Clone)]
pub struct Queue {
    name: String,
    inner: Arc<Inner>,
}

impl Queue {
    /// Create an empty queue with the given name and capacity.
    pub fn new(name: impl Into<String>, max_size: usize) -> Self {
        Self {
            name: name.into(),
            inner: Arc::new(Inner {
                events: Mutex::new(VecDeque::new()),
                content_ready: Notify::new(),
                max_size,
            }),
        }
    }

    /// The queue's name, as registered in its owning `QueuePool`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The configured capacity.
    pub fn max_size(&self) -> usize {
        self.inner.max_size
    }

    /// Current number of queued events.
    pub async fn qsize(&self) -> usize {
        self.inner.events.lock().await.len()
    }

    /// Non-blocking predicate: true if `get` would return immediately.
    pub async fn has_content(&self) -> bool {
        !self.inner.events.lock().await.is_empty()
    }

    /// Append `event`. If the queue is at capacity, waits (up to `timeout`,
    /// if given) for space; with no `timeout`, waits indefinitely. Fails with
    /// `QueueFull` once the wait is exhausted (ยง4.1). `max_size == 0` means
    /// unbounded: there is never a wait.
    pub async fn put(&self, event: Event, wait: Option<Duration>) -> Result<(), FrameworkException> {
        loop {
            {
                let mut events = self.inner.events.lock().await;
                if self.inner.max_size == 0 || events.len() < self.inner.max_size {
                    events.push_back(event);
                    self.inner.content_ready.notify_waiters();
                    return Ok(());
                }
            }

            match wait {
                Some(d) => {
                    if timeout(d, self.wait_for_space()).await.is_err() {
                        return Err(FrameworkException::QueueFull {
                            name: self.name.clone(),
                            max_size: self.inner.max_size,
                        });
                    }
                }
                None => self.wait_for_space().await,
            }
        }
    }

    /// Non-blocking `put`: fails immediately with `QueueFull` rather than
    /// waiting (ยง9 "Exception control flow").
    pub async fn try_put(&self, event: Event) -> Result<(), FrameworkException> {
        let mut events = self.inner.events.lock().await;
        if self.inner.max_size != 0 && events.len() >= self.inner.max_size {
            return Err(FrameworkException::QueueFull {
                name: self.name.clone(),
                max_size: self.inner.max_size,
            });
        }
        events.push_back(event);
        self.inner.content_ready.notify_waiters();
        Ok(())
    }

    /// Pop the oldest event. If empty, waits (up to `timeout`, if given) for
    /// content; with no `timeout`, waits indefinitely. Fails with
    /// `QueueEmpty` once the wait is exhausted (ยง4.1).
    pub async fn get(&self, wait: Option<Duration>) -> Result<Event, FrameworkException> {
        loop {
            {
                let mut events = self.inner.events.lock().await;
                if let Some(event) = events.pop_front() {
                    return Ok(event);
                }
            }

            match wait {
                Some(d) => {
                    if timeout(d, self.wait_for_content()).await.is_err() {
                        return Err(FrameworkException::QueueEmpty {
                            name: self.name.clone(),
                        });
                    }
                }
                None => self.wait_for_content().await,
            }
        }
    }

    /// Non-blocking `get`: fails immediately with `QueueEmpty` rather than
    /// waiting (ยง9 "Exception control flow").
    pub async fn try_get(&self) -> Result<Event, FrameworkException> {
        let mut events = self.inner.events.lock().await;
        events.pop_front().ok_or_else(|| FrameworkException::QueueEmpty {
            name: self.name.clone(),
        })
    }

    /// Re-insert `event` at the head, bypassing the capacity check (ยง4.1).
    /// Used exclusively by the rescue/backpressure path (ยง4.5.3).
    pub async fn rescue(&self, event: Event) {
        let mut events = self.inner.events.lock().await;
        events.push_front(event);
        self.inner.content_ready.notify_waiters();
    }

    async fn wait_for_content(&self) {
        let notified = self.inner.content_ready.notified();
        if self.inner.events.lock().await.is_empty() {
            notified.await;
        }
    }

    async fn wait_for_space(&self) {
        if self.inner.max_size == 0 {
            return;
        }
        let notified = self.inner.content_ready.notified();
        if self.inner.events.lock().await.len() >= self.inner.max_size {
            notified.await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Variant;

    fn sample(text: &str) -> Event {
        Event::new(Variant::Plain(text.into()))
    }

    #[tokio::test]
    async fn test_put_get_fifo_order() {
        let queue = Queue::new("q", 10);
        queue.put(sample("a"), None).await.unwrap();
        queue.put(sample("b"), None).await.unwrap();

        let first = queue.get(None).await.unwrap();
        let second = queue.get(None).await.unwrap();
        assert_eq!(first.data(), &Variant::Plain("a".into()));
        assert_eq!(second.data(), &Variant::Plain("b".into()));
    }

    #[tokio::test]
    async fn test_try_put_full_fails() {
        let queue = Queue::new("q", 1);
        queue.try_put(sample("a")).await.unwrap();
        let err = queue.try_put(sample("b")).await.unwrap_err();
        assert!(matches!(err, FrameworkException::QueueFull { .. }));
    }

    #[tokio::test]
    async fn test_try_get_empty_fails() {
        let queue = Queue::new("q", 1);
        let err = queue.try_get().await.unwrap_err();
        assert!(matches!(err, FrameworkException::QueueEmpty { .. }));
    }

    #[tokio::test]
    async fn test_rescue_reinserts_at_head_bypassing_capacity() {
        let queue = Queue::new("q", 1);
        queue.try_put(sample("a")).await.unwrap();
        queue.rescue(sample("rescued")).await;
        assert_eq!(queue.qsize().await, 2);

        let first = queue.get(None).await.unwrap();
        assert_eq!(first.data(), &Variant::Plain("rescued".into()));
    }

    #[tokio::test]
    async fn test_blocking_get_waits_for_content() {
        let queue = Queue::new("q", 10);
        let reader = queue.clone();

        let handle = tokio::spawn(async move { reader.get(None).await.unwrap() });
        tokio::task::yield_now().await;
        queue.put(sample("late"), None).await.unwrap();

        let event = handle.await.unwrap();
        assert_eq!(event.data(), &Variant::Plain("late".into()));
    }

    #[tokio::test]
    async fn test_get_timeout_fails_with_queue_empty() {
        let queue = Queue::new("q", 10);
        let err = queue.get(Some(Duration::from_millis(20))).await.unwrap_err();
        assert!(matches!(err, FrameworkException::QueueEmpty { .. }));
    }

    #[tokio::test]
    async fn test_zero_max_size_is_unbounded() {
        let queue = Queue::new("q", 0);
        for i in 0..50 {
            queue.try_put(sample(&i.to_string())).await.unwrap();
        }
        assert_eq!(queue.qsize().await, 50);

        let put = queue.put(sample("more"), Some(Duration::from_millis(20))).await;
        assert!(put.is_ok());
    }

    #[tokio::test]
    async fn test_has_content_and_qsize() {
        let queue = Queue::new("q", 10);
        assert!(!queue.has_content().await);
        queue.try_put(sample("x")).await.unwrap();
        assert!(queue.has_content().await);
        assert_eq!(queue.qsize().await, 1);
    }
}
