//! Supervised cooperative task group for actor consumer loops (ยง3.3, ยง4.3).
//!
//! A `RestartPool` schedules a cooperative `tokio` task per inbound queue of an
//! actor. A task that returns `Ok(())` is done and is not restarted. A task that
//! returns `Err` is restarted after an exponential backoff delay ([`RestartBackoff`])
//! unless the caller asked for no restart, the owning actor has stopped (the
//! shared `running` flag), or the sliding-window restart limit has been exceeded
//! — in which case the pool gives up on that task and records a
//! [`RestartPoolEventKind::LimitExceeded`] event instead.
//!
//! # Examples
//!
//! ```rust
//! use conflux_rt::monitoring::{NoopMonitor, RestartPoolEvent};
//! use conflux_rt::restart_pool::RestartPool;
//! use std::sync::atomic::AtomicBool;
//! use std::sync::Arc;
//!
//! # async fn example() {
//! let pool = RestartPool::new("validator", NoopMonitor::<RestartPoolEvent>::new());
//! let running = Arc::new(AtomicBool::new(true));
//!
//! pool.spawn("consumer-inbound", false, running, || async { Ok(()) })
//!     .await;
//!
//! pool.kill().await;
//! # }
//! ```

mod backoff;

pub use backoff::RestartBackoff;

// Layer 1: Standard library imports
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

// Layer 2: Third-party crate imports
use chrono::Utc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

// Layer 3: Internal module imports
use crate::error::FrameworkException;
use crate::monitoring::{Monitor, RestartPoolEvent, RestartPoolEventKind};

/// A boxed, re-runnable unit of work. Unlike a bare `Future`, which is consumed
/// the moment it is polled to completion, a task must be able to run again
/// after a restart — so the pool is handed a factory that produces a fresh
/// future on every attempt.
type TaskFuture = Pin<Box<dyn Future<Output = Result<(), FrameworkException>> + Send>>;

const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(100);
const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(60);
const DEFAULT_MAX_RESTARTS: u32 = 5;
const DEFAULT_RESTART_WINDOW: Duration = Duration::from_secs(60);

/// A supervised group of cooperative tasks belonging to one actor.
///
/// # Type Parameters
///
/// - `M`: monitor type recording [`RestartPoolEvent`]s for this actor's tasks.
pub struct RestartPool<M: Monitor<RestartPoolEvent>> {
    actor_name: String,
    monitor: M,
    base_delay: Duration,
    max_delay: Duration,
    max_restarts: u32,
    restart_window: Duration,
    handles: Mutex<Vec<JoinHandle<()>>>,
}

impl<M> RestartPool<M>
where
    M: Monitor<RestartPoolEvent> + Clone + Send + Sync + 'static,
{
    /// Creates a restart pool for the named actor with default backoff
    /// configuration (100ms base delay, 60s cap, 5 restarts per 60s window).
    pub fn new(actor_name: impl Into<String>, monitor: M) -> Self {
        Self::with_config(
            actor_name,
            monitor,
            DEFAULT_BASE_DELAY,
            DEFAULT_MAX_DELAY,
            DEFAULT_MAX_RESTARTS,
            DEFAULT_RESTART_WINDOW,
        )
    }

    /// Creates a restart pool with explicit backoff configuration.
    pub fn with_config(
        actor_name: impl Into<String>,
        monitor: M,
        base_delay: Duration,
        max_delay: Duration,
        max_restarts: u32,
        restart_window: Duration,
    ) -> Self {
        Self {
            actor_name: actor_name.into(),
            monitor,
            base_delay,
            max_delay,
            max_restarts,
            restart_window,
            handles: Mutex::new(Vec::new()),
        }
    }

    /// Number of tasks currently tracked by this pool (running or exited but
    /// not yet reaped by [`RestartPool::kill`]).
    pub async fn active_count(&self) -> usize {
        self.handles.lock().await.len()
    }

    /// Schedules `task_fn` as a supervised cooperative task.
    ///
    /// `task_fn` is called once per attempt; it must return a fresh future
    /// each time since a future cannot be polled again after completion. The
    /// task stops for good when it returns `Ok(())`, when `restart` is
    /// `false` and it returns `Err`, when `running` goes false, or when the
    /// sliding-window restart limit is exceeded.
    pub async fn spawn<F, Fut>(
        &self,
        task_name: impl Into<String>,
        restart: bool,
        running: Arc<AtomicBool>,
        task_fn: F,
    ) where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), FrameworkException>> + Send + 'static,
    {
        let task_name = task_name.into();
        let actor_name = self.actor_name.clone();
        let monitor = self.monitor.clone();
        let mut backoff = RestartBackoff::with_delays(
            self.max_restarts,
            self.restart_window,
            self.base_delay,
            self.max_delay,
        );
        let restart_window = self.restart_window;

        record(&monitor, &actor_name, RestartPoolEventKind::Spawned, &task_name, None).await;

        let handle = tokio::spawn(async move {
            loop {
                if !running.load(Ordering::SeqCst) {
                    return;
                }

                let outcome = task_fn().await;

                match outcome {
                    Ok(()) => return,
                    Err(err) => {
                        if !restart || !running.load(Ordering::SeqCst) {
                            return;
                        }

                        if backoff.is_limit_exceeded() {
                            record(
                                &monitor,
                                &actor_name,
                                RestartPoolEventKind::LimitExceeded {
                                    restart_count: backoff.restart_count(),
                                    window: restart_window,
                                },
                                &task_name,
                                Some(err.to_string()),
                            )
                            .await;
                            return;
                        }

                        backoff.record_restart();
                        let delay = backoff.calculate_delay();

                        record(
                            &monitor,
                            &actor_name,
                            RestartPoolEventKind::Restarted {
                                restart_count: backoff.restart_count(),
                                delay,
                            },
                            &task_name,
                            Some(err.to_string()),
                        )
                        .await;

                        tokio::time::sleep(delay).await;
                    }
                }
            }
        });

        self.handles.lock().await.push(handle);
    }

    /// Cancels every tracked task and waits for them to exit.
    pub async fn kill(&self) {
        let mut handles = self.handles.lock().await;
        for handle in handles.iter() {
            handle.abort();
        }
        for handle in handles.drain(..) {
            let _ = handle.await;
        }
        drop(handles);

        record(
            &self.monitor,
            &self.actor_name,
            RestartPoolEventKind::Killed,
            "*",
            None,
        )
        .await;
    }
}

async fn record<M: Monitor<RestartPoolEvent>>(
    monitor: &M,
    actor_name: &str,
    event_kind: RestartPoolEventKind,
    task_name: &str,
    error: Option<String>,
) {
    let mut metadata = HashMap::new();
    metadata.insert("task".to_string(), task_name.to_string());
    if let Some(error) = error {
        metadata.insert("error".to_string(), error);
    }

    let _ = monitor
        .record(RestartPoolEvent {
            timestamp: Utc::now(),
            actor_name: actor_name.to_string(),
            event_kind,
            metadata,
        })
        .await;
}
