//! The engine that drives an [`Actor`] implementation: queues, restart
//! supervision, and the consumer loop (ยง3.5, ยง4.5).
//!
//! `ActorRuntime` is the concrete, generic-over-monitor-type owner of
//! everything ยง3.5 lists as belonging to an actor — `name`, `size`, its
//! `QueuePool`, its `RestartPool`, and its `Monitor<ActorEvent>` logger. The
//! [`Actor`] trait itself stays free of all of that so collaborators only
//! ever implement business logic.

// Layer 1: Standard library imports
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

// Layer 2: Third-party crate imports
use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

// Layer 3: Internal module imports
use super::context::ActorContext;
use super::lifecycle::ActorLifecycle;
use super::traits::Actor;
use crate::director::DirectorConfig;
use crate::error::FrameworkException;
use crate::event::{Event, VariantKind};
use crate::monitoring::{ActorEvent, ActorEventKind, Monitor, RestartPoolEvent};
use crate::queue::{Queue, QueueGroup, QueuePool};
use crate::restart_pool::RestartPool;

/// How long a consumer task waits on its queue's content-ready signal before
/// re-checking the running flag (ยง5 "Timeouts": "a small positive value...
/// so that stopped actors exit promptly even when their queues stay empty").
const CONSUMER_WAKEUP: Duration = Duration::from_millis(250);

/// Backoff applied after a `QueueFull` backpressure rescue, before the
/// consumer loop tries to drain its origin queue again (ยง4.5.3 step 4).
const BACKPRESSURE_PAUSE: Duration = Duration::from_millis(20);

/// Base delay for the per-event rescue backoff (ยง4.5.3 step 5): the actual
/// pause is `rescue_base_delay * rescue_count`, capped at `rescue_max_delay`.
const RESCUE_BASE_DELAY: Duration = Duration::from_millis(50);

/// Cap applied to the per-event rescue backoff delay.
const RESCUE_MAX_DELAY: Duration = Duration::from_secs(5);

/// The consumer-loop and rescue-backoff delays an [`ActorRuntime`] runs with.
///
/// Defaults match this module's historical fixed constants. A [`Director`]
/// composes its [`DirectorConfig`] into a registered actor by building
/// `Timings::from(&config)` and passing it to [`ActorRuntime::with_timings`]
/// before registration — `ActorRuntime::new` alone still gets the defaults,
/// so existing call sites are unaffected.
///
/// [`Director`]: crate::director::Director
#[derive(Debug, Clone, Copy)]
pub struct Timings {
    /// How long a consumer task waits on its queue's content-ready signal
    /// before re-checking the running flag.
    pub consumer_wakeup: Duration,

    /// Backoff applied after a `QueueFull` backpressure rescue.
    pub backpressure_pause: Duration,

    /// Base delay for the per-event rescue backoff; the actual pause is
    /// `rescue_base_delay * rescue_count`, capped at `rescue_max_delay`.
    pub rescue_base_delay: Duration,

    /// Cap on the per-event rescue backoff delay.
    pub rescue_max_delay: Duration,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            consumer_wakeup: CONSUMER_WAKEUP,
            backpressure_pause: BACKPRESSURE_PAUSE,
            rescue_base_delay: RESCUE_BASE_DELAY,
            rescue_max_delay: RESCUE_MAX_DELAY,
        }
    }
}

impl From<&DirectorConfig> for Timings {
    fn from(config: &DirectorConfig) -> Self {
        Self {
            consumer_wakeup: config.consumer_timeout,
            backpressure_pause: BACKPRESSURE_PAUSE,
            rescue_base_delay: config.rescue_base_delay,
            rescue_max_delay: config.rescue_max_delay,
        }
    }
}

/// Object-safe facade a [`crate::director::Director`] uses to drive an
/// `ActorRuntime<MA, MR>` without knowing its concrete monitor types — the
/// second deliberate `dyn` exception alongside the registry's actor-name
/// lookup itself (ยง9 open question 2).
#[async_trait]
pub trait RuntimeHandle: Send + Sync {
    /// This actor's name.
    fn name(&self) -> &str;

    /// The actor's queue pool, for composition-time wiring.
    fn pool(&self) -> &QueuePool;

    /// Run `pre_hook`, mark the actor running, and spawn a consumer task for
    /// every already-registered inbound queue (ยง4.5.1 `start`).
    async fn start(&self) -> Result<(), FrameworkException>;

    /// Clear the running flag, run `post_hook`, and let consumer tasks drain
    /// out cooperatively (ยง4.5.1 `stop`).
    async fn stop(&self) -> Result<(), FrameworkException>;

    /// True once `start()` has run and `stop()` has not.
    fn is_running(&self) -> bool;
}

/// Concrete actor engine: one [`Actor`] implementation plus the queue pool,
/// restart pool, and monitor that drive it (ยง3.5).
///
/// # Type Parameters
///
/// - `MA`: monitor recording this actor's [`ActorEvent`]s.
/// - `MR`: monitor recording its [`RestartPool`]'s [`RestartPoolEvent`]s.
///   Kept distinct from `MA` because `Monitor<E>` is parameterized per event
///   type (ยง1) — a single monitor instance cannot implement `Monitor` for two
///   different `E` at once.
pub struct ActorRuntime<MA, MR>
where
    MA: Monitor<ActorEvent> + Clone + Send + Sync + 'static,
    MR: Monitor<RestartPoolEvent> + Clone + Send + Sync + 'static,
{
    name: String,
    pool: Arc<QueuePool>,
    restart_pool: RestartPool<MR>,
    monitor: MA,
    actor: Arc<Mutex<Box<dyn Actor>>>,
    lifecycle: Mutex<ActorLifecycle>,
    running: Arc<AtomicBool>,
    timings: Timings,
}

impl<MA, MR> ActorRuntime<MA, MR>
where
    MA: Monitor<ActorEvent> + Clone + Send + Sync + 'static,
    MR: Monitor<RestartPoolEvent> + Clone + Send + Sync + 'static,
{
    /// Wrap `actor` with a queue pool of `size` capacity and the given
    /// monitors.
    pub fn new(actor: Box<dyn Actor>, size: usize, monitor: MA, restart_monitor: MR) -> Self {
        let name = actor.name().to_string();
        Self {
            restart_pool: RestartPool::new(name.clone(), restart_monitor),
            pool: Arc::new(QueuePool::new(size)),
            monitor,
            actor: Arc::new(Mutex::new(actor)),
            lifecycle: Mutex::new(ActorLifecycle::new()),
            running: Arc::new(AtomicBool::new(false)),
            timings: Timings::default(),
            name,
        }
    }

    /// Override this runtime's consumer-loop and rescue-backoff delays,
    /// typically with `Timings::from(&director_config)` (ยง1 ambient stack).
    #[must_use]
    pub fn with_timings(mut self, timings: Timings) -> Self {
        self.timings = timings;
        self
    }

    /// Bind `queue` (or a fresh default-size one) as inbound under `name`,
    /// spawning its consumer task immediately if the actor is already
    /// running (ยง4.5.1 `register_consumer`).
    pub async fn register_consumer(
        &self,
        name: impl Into<String>,
        queue: Option<Queue>,
    ) -> Result<Queue, FrameworkException> {
        let name = name.into();
        let queue = self.pool.add(QueueGroup::Inbound, name.clone(), queue)?;

        if self.running.load(Ordering::SeqCst) {
            self.spawn_consumer(name, queue.clone()).await;
        }
        Ok(queue)
    }

    async fn spawn_consumer(&self, queue_name: String, queue: Queue) {
        let actor = Arc::clone(&self.actor);
        let monitor = self.monitor.clone();
        let actor_name = self.name.clone();
        let pool = Arc::clone(&self.pool);
        let running = Arc::clone(&self.running);
        let timings = self.timings;

        self.restart_pool
            .spawn(format!("consume:{queue_name}"), true, Arc::clone(&running), move || {
                let actor = Arc::clone(&actor);
                let monitor = monitor.clone();
                let actor_name = actor_name.clone();
                let pool = Arc::clone(&pool);
                let running = Arc::clone(&running);
                let queue_name = queue_name.clone();
                let queue = queue.clone();

                async move {
                    consumer_loop(actor, monitor, actor_name, pool, running, queue_name, queue, timings).await
                }
            })
            .await;
    }
}

#[async_trait]
impl<MA, MR> RuntimeHandle for ActorRuntime<MA, MR>
where
    MA: Monitor<ActorEvent> + Clone + Send + Sync + 'static,
    MR: Monitor<RestartPoolEvent> + Clone + Send + Sync + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn pool(&self) -> &QueuePool {
        &self.pool
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    async fn start(&self) -> Result<(), FrameworkException> {
        self.actor.lock().await.pre_hook().await?;

        self.lifecycle.lock().await.start();
        self.running.store(true, Ordering::SeqCst);
        record_actor_event(&self.monitor, &self.name, ActorEventKind::Started).await;

        for entry in self.pool.all(QueueGroup::Inbound) {
            self.spawn_consumer(entry.name().to_string(), entry).await;
        }
        Ok(())
    }

    async fn stop(&self) -> Result<(), FrameworkException> {
        self.running.store(false, Ordering::SeqCst);
        self.lifecycle.lock().await.stop();

        let hook_result = self.actor.lock().await.post_hook().await;
        self.restart_pool.kill().await;
        record_actor_event(&self.monitor, &self.name, ActorEventKind::Stopped).await;

        hook_result
    }
}

/// The per-inbound-queue consumer loop (ยง4.5.2). Runs until `running` clears,
/// at which point it returns `Ok(())` — a clean exit the owning
/// [`RestartPool`] does not restart.
async fn consumer_loop<MA: Monitor<ActorEvent> + Clone + Send + Sync + 'static>(
    actor: Arc<Mutex<Box<dyn Actor>>>,
    monitor: MA,
    actor_name: String,
    pool: Arc<QueuePool>,
    running: Arc<AtomicBool>,
    origin_name: String,
    origin_queue: Queue,
    timings: Timings,
) -> Result<(), FrameworkException> {
    while running.load(Ordering::SeqCst) {
        match origin_queue.get(Some(timings.consumer_wakeup)).await {
            Ok(event) => {
                do_consume(
                    Arc::clone(&actor),
                    monitor.clone(),
                    actor_name.clone(),
                    Arc::clone(&pool),
                    origin_name.clone(),
                    origin_queue.clone(),
                    event,
                    timings,
                )
                .await;

                while let Ok(event) = origin_queue.try_get().await {
                    if !running.load(Ordering::SeqCst) {
                        origin_queue.rescue(event).await;
                        break;
                    }
                    do_consume(
                        Arc::clone(&actor),
                        monitor.clone(),
                        actor_name.clone(),
                        Arc::clone(&pool),
                        origin_name.clone(),
                        origin_queue.clone(),
                        event,
                        timings,
                    )
                    .await;
                }
            }
            Err(_) => continue, // QueueEmpty wakeup: re-check the running flag.
        }
    }
    Ok(())
}

/// `do_consume` semantics (ยง4.5.3): required-attribute check, input typing,
/// `consume`, then backpressure-as-rescue or failure-as-rescue-or-send_error.
async fn do_consume<MA: Monitor<ActorEvent>>(
    actor: Arc<Mutex<Box<dyn Actor>>>,
    monitor: MA,
    actor_name: String,
    pool: Arc<QueuePool>,
    origin_name: String,
    origin_queue: Queue,
    event: Event,
    timings: Timings,
) {
    let mut guard = actor.lock().await;

    for attr in guard.required_event_attributes() {
        if event.get_attribute(attr).is_some() {
            continue;
        }
        let exc = FrameworkException::InvalidActorInput {
            actor: actor_name.clone(),
            event_id: event.event_id(),
            reason: format!("missing required attribute '{attr}'"),
        };
        record_actor_event(
            &monitor,
            &actor_name,
            ActorEventKind::InputRejected {
                event_id: event.event_id(),
                reason: exc.to_string(),
            },
        )
        .await;

        let mut rejected = event;
        rejected.attach_error(&exc);
        let ctx = ActorContext::new(&actor_name, &pool, guard.output());
        let _ = ctx.send_error(&rejected).await;
        return;
    }

    let input_kinds: Vec<VariantKind> = guard.input().to_vec();
    let mut event = event;
    if !input_kinds.contains(&event.data().kind()) {
        let target = input_kinds.first().copied().unwrap_or(VariantKind::Plain);
        match event.convert(target) {
            Ok(converted) => event = converted,
            Err(exc) => {
                record_actor_event(
                    &monitor,
                    &actor_name,
                    ActorEventKind::InputRejected {
                        event_id: event.event_id(),
                        reason: exc.to_string(),
                    },
                )
                .await;

                let mut rejected = event;
                rejected.attach_error(&exc);
                let ctx = ActorContext::new(&actor_name, &pool, guard.output());
                let _ = ctx.send_error(&rejected).await;
                return;
            }
        }
    }

    let rescue_enabled = guard.rescue();
    let max_rescue = guard.max_rescue();
    let output_kinds: Vec<VariantKind> = guard.output().to_vec();
    let retry_event = event.clone();

    let started = Instant::now();
    let outcome = {
        let ctx = ActorContext::new(&actor_name, &pool, &output_kinds);
        guard.consume(event, &origin_name, &ctx).await
    };
    drop(guard);

    match outcome {
        Ok(()) => {
            record_actor_event(
                &monitor,
                &actor_name,
                ActorEventKind::Consumed {
                    event_id: retry_event.event_id(),
                    duration_micros: started.elapsed().as_micros() as u64,
                },
            )
            .await;
        }
        Err(exc) if exc.is_transient() => {
            // Step 4: downstream backpressure. Rescue onto the origin queue
            // rather than counting this as a processing failure.
            let event_id = retry_event.event_id();
            let rescue_count = retry_event.rescue_count();
            origin_queue.rescue(retry_event).await;
            record_actor_event(
                &monitor,
                &actor_name,
                ActorEventKind::Rescued {
                    event_id,
                    rescue_count,
                },
            )
            .await;
            tokio::time::sleep(timings.backpressure_pause).await;
        }
        Err(exc) => {
            if rescue_enabled && retry_event.rescue_count() < max_rescue {
                let mut ev = retry_event;
                let rescue_count = ev.increment_rescue_count();
                record_actor_event(
                    &monitor,
                    &actor_name,
                    ActorEventKind::Rescued {
                        event_id: ev.event_id(),
                        rescue_count,
                    },
                )
                .await;
                let delay = (timings.rescue_base_delay * rescue_count).min(timings.rescue_max_delay);
                tokio::time::sleep(delay).await;
                origin_queue.rescue(ev).await;
            } else {
                record_actor_event(
                    &monitor,
                    &actor_name,
                    ActorEventKind::RescueExhausted {
                        event_id: retry_event.event_id(),
                    },
                )
                .await;
                let mut ev = retry_event;
                ev.attach_error(&exc);
                let ctx = ActorContext::new(&actor_name, &pool, &output_kinds);
                let _ = ctx.send_error(&ev).await;
            }
        }
    }
}

async fn record_actor_event<MA: Monitor<ActorEvent>>(
    monitor: &MA,
    actor_name: &str,
    event_kind: ActorEventKind,
) {
    let _ = monitor
        .record(ActorEvent {
            timestamp: Utc::now(),
            actor_name: actor_name.to_string(),
            event_kind,
            metadata: HashMap::new(),
        })
        .await;
}
