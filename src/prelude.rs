//! Convenient glob import for building a pipeline.
//!
//! ```rust
//! use conflux_rt::prelude::*;
//! ```
//!
//! # What's Included
//!
//! - [`Actor`], [`ActorContext`], [`Destinations`], [`ActorLifecycle`], [`ActorState`],
//!   [`ActorRuntime`], [`RuntimeHandle`], [`Timings`] — the actor contract and its driving engine.
//! - [`Director`], [`DirectorConfig`] — the composition root and its tunables.
//! - [`Event`], [`EventError`], [`Variant`], [`VariantKind`], [`HttpOverlay`] — the event data
//!   model and its format variants.
//! - [`Queue`], [`QueueGroup`], [`QueuePool`], [`connect_queue`], [`connect_error_queue`],
//!   [`connect_log_queue`] — the bounded FIFO substrate and its wiring helpers.
//! - [`RestartPool`], [`RestartBackoff`] — supervised cooperative task restart.
//! - [`Monitor`], [`MonitoringEvent`], [`EventSeverity`], [`InMemoryMonitor`], [`NoopMonitor`] —
//!   the observability trait pair and its two implementations.
//! - [`FrameworkException`] — the root error taxonomy.
//! - [`ActorId`], [`EventId`] — identity newtypes.

pub use crate::actor::{
    Actor, ActorContext, ActorLifecycle, ActorRuntime, ActorState, Destinations, RuntimeHandle, Timings,
};
pub use crate::director::{Director, DirectorConfig};
pub use crate::error::FrameworkException;
pub use crate::event::{Event, EventError, HttpOverlay, Variant, VariantKind};
pub use crate::monitoring::{
    ActorEvent, DirectorEvent, EventSeverity, InMemoryMonitor, Monitor, MonitoringEvent,
    NoopMonitor, RestartPoolEvent,
};
pub use crate::queue::{connect_error_queue, connect_log_queue, connect_queue, Queue, QueueGroup, QueuePool};
pub use crate::restart_pool::{RestartBackoff, RestartPool};
pub use crate::util::{ActorId, EventId};
