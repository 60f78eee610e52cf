//! # conflux-rt — an event-processing pipeline runtime
//!
//! A framework for constructing event-processing pipelines as a directed
//! graph of independently running actors that exchange typed events through
//! bounded, named queues. Applications assemble long-running services —
//! HTTP front-ends, schedulers, validators, format converters, routers — by
//! wiring reusable actors rather than writing bespoke concurrency.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use conflux_rt::prelude::*;
//! use async_trait::async_trait;
//!
//! struct Echo { name: String }
//!
//! #[async_trait]
//! impl Actor for Echo {
//!     fn name(&self) -> &str { &self.name }
//!
//!     async fn consume(
//!         &mut self,
//!         event: Event,
//!         _origin: &str,
//!         ctx: &ActorContext<'_>,
//!     ) -> Result<(), FrameworkException> {
//!         ctx.send_event(&event, None, true).await
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), FrameworkException> {
//!     let director = Director::new(DirectorConfig::default(), NoopMonitor::new());
//!     let echo = ActorRuntime::new(
//!         Box::new(Echo { name: "echo".to_string() }),
//!         16,
//!         NoopMonitor::new(),
//!         NoopMonitor::new(),
//!     );
//!     director.register_actor(std::sync::Arc::new(echo))?;
//!     director.start(false).await
//! }
//! ```
//!
//! # Core Components
//!
//! - [`event`] — `Event` identity, payload variants (Plain/Tree/Mapping/Form), and the
//!   widening-only conversion rule.
//! - [`queue`] — bounded FIFO `Queue`s with blocking put/get, plus per-actor `QueuePool`
//!   groupings (inbound/outbound/error/logs).
//! - [`actor`] — the thin, user-overridable `Actor` contract and the `ActorRuntime` engine
//!   that drives its consumer loop.
//! - [`restart_pool`] — the supervised cooperative task group behind an actor's consumer
//!   tasks, restarting failed tasks with backoff.
//! - [`director`] — the composition root: actor registry, queue wiring, start/stop,
//!   signal-triggered shutdown.
//! - [`monitoring`] — the generic `Monitor<E>` observability sink every component above
//!   records structured events through.
//! - [`error`] — `FrameworkException`, the root error taxonomy with HTTP-status mapping.
//!
//! # Design Principles
//!
//! - **Generic constraints over `dyn`.** Every seam except the Director's actor registry
//!   and its `RuntimeHandle` facade uses compile-time generics, not trait objects — those
//!   two are the deliberate, disclosed exceptions a runtime-polymorphic composition root
//!   genuinely needs (see `DESIGN.md`).
//! - **Queue-driven control flow.** There is no global scheduler; an event's journey through
//!   the graph is entirely a sequence of queue puts and gets.
//! - **`chrono::DateTime<Utc>`** for every timestamp; a single `thiserror`-derived error
//!   enum for every fallible operation.

pub mod actor;
pub mod director;
pub mod error;
pub mod event;
pub mod monitoring;
pub mod prelude;
pub mod queue;
pub mod restart_pool;
pub mod util;

pub use actor::{
    Actor, ActorContext, ActorLifecycle, ActorRuntime, ActorState, Destinations, RuntimeHandle, Timings,
};
pub use director::{Director, DirectorConfig};
pub use error::FrameworkException;
pub use event::{Event, EventError, HttpOverlay, Variant, VariantKind};
pub use monitoring::{
    ActorEvent, ActorEventKind, DirectorEvent, DirectorEventKind, EventSeverity, InMemoryMonitor,
    Monitor, MonitoringConfig, MonitoringError, MonitoringEvent, MonitoringSnapshot, NoopMonitor,
    QueueEvent, QueueEventKind, RestartPoolEvent, RestartPoolEventKind,
};
pub use queue::{connect_error_queue, connect_log_queue, connect_queue, Queue, QueueGroup, QueuePool};
pub use restart_pool::{RestartBackoff, RestartPool};
pub use util::{ActorId, EventId};
