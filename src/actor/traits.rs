//! The `Actor` contract: what a collaborator overrides (ยง3.5, ยง6 "Actor contract").
//!
//! `Actor` is deliberately the *thin* part of an actor — just the
//! user-overridable business logic (name, declared input/output variants,
//! hooks, `consume`). The queue pool, restart pool, and monitoring handle
//! that drive it live in [`crate::actor::ActorRuntime`], not here.
//!
//! # Design Philosophy
//!
//! - **Object safety.** `Actor` is boxed as `Box<dyn Actor>` inside the owning
//!   `ActorRuntime` so the Director's registry can hold differently-typed
//!   actors under one `name → handle` map (ยง9 open question 2) — the one
//!   deliberate, disclosed exception to this codebase's "no `dyn` in public
//!   APIs" rule (ยง6.2 elsewhere still applies).
//! - **Declared typing, not inheritance.** `input`/`output` are data, not
//!   trait specialization, matching ยง3.5's "declared `input` and `output`
//!   event-variant tuples".
//!
//! # Examples
//!
//! ```rust
//! use conflux_rt::actor::{Actor, ActorContext};
//! use conflux_rt::error::FrameworkException;
//! use conflux_rt::event::{Event, VariantKind};
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
//! ```

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use async_trait::async_trait;

// Layer 3: Internal module imports
use super::context::ActorContext;
use crate::error::FrameworkException;
use crate::event::{Event, VariantKind};

const PLAIN_ONLY: &[VariantKind] = &[VariantKind::Plain];

/// The contract an actor implementation provides (ยง3.5, ยง6).
///
/// Only `name` and `consume` are required; every other method has a
/// reasonable default matching the originating implementation's optional
/// class-level declarations.
#[async_trait]
pub trait Actor: Send + Sync + 'static {
    /// Stable name used for queue wiring, error messages, and monitoring
    /// (ยง3.5, ยง4.4 `register_actor`).
    fn name(&self) -> &str;

    /// Declared input event-variant types, tried in order for the widening
    /// conversion at ยง4.5.3 step 2. Defaults to `[Plain]`.
    fn input(&self) -> &[VariantKind] {
        PLAIN_ONLY
    }

    /// Declared output event-variant types, checked by `send_event` when
    /// `check_output=true` (ยง4.5.4). Defaults to `[Plain]`.
    fn output(&self) -> &[VariantKind] {
        PLAIN_ONLY
    }

    /// Attribute names every inbound event must resolve via
    /// [`Event::get_attribute`] before `consume` runs (ยง4.5.3 step 1).
    /// Defaults to none.
    fn required_event_attributes(&self) -> &[&'static str] {
        &[]
    }

    /// `true`: `do_consume` runs inline on the consumer task, so a full
    /// downstream queue applies backpressure directly (ยง4.5.2). `false`:
    /// `do_consume` is spawned as a separate task per event. Defaults to
    /// `true`.
    fn blocking_consume(&self) -> bool {
        true
    }

    /// `true`: a failed `consume` is requeued on the origin queue (with
    /// backoff) up to `max_rescue` times before being routed to the error
    /// group (ยง4.5.3 step 5). Defaults to `true`.
    fn rescue(&self) -> bool {
        true
    }

    /// Ceiling on rescue attempts per event. Defaults to `3`.
    fn max_rescue(&self) -> u32 {
        3
    }

    /// Called once, before the actor is marked running (ยง4.5.1 `start`).
    async fn pre_hook(&mut self) -> Result<(), FrameworkException> {
        Ok(())
    }

    /// Called once, when `stop()` begins (ยง4.5.1 `stop`).
    async fn post_hook(&mut self) -> Result<(), FrameworkException> {
        Ok(())
    }

    /// Process one dequeued event. `origin` is the name of the inbound queue
    /// it arrived on; implementations typically call
    /// [`ActorContext::send_event`] or [`ActorContext::send_error`] on `ctx`
    /// before returning (ยง4.5.3 step 3, ยง6).
    async fn consume(
        &mut self,
        event: Event,
        origin: &str,
        ctx: &ActorContext<'_>,
    ) -> Result<(), FrameworkException>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::QueuePool;

    struct Passthrough {
        name: String,
        calls: u32,
    }

    #[async_trait]
    impl Actor for Passthrough {
        fn name(&self) -> &str {
            &self.name
        }

        async fn consume(
            &mut self,
            event: Event,
            _origin: &str,
            ctx: &ActorContext<'_>,
        ) -> Result<(), FrameworkException> {
            self.calls += 1;
            ctx.send_event(&event, None, false).await
        }
    }

    #[test]
    fn test_default_declarations() {
        let actor = Passthrough {
            name: "pt".into(),
            calls: 0,
        };
        assert_eq!(actor.input(), &[VariantKind::Plain]);
        assert_eq!(actor.output(), &[VariantKind::Plain]);
        assert!(actor.required_event_attributes().is_empty());
        assert!(actor.blocking_consume());
        assert!(actor.rescue());
        assert_eq!(actor.max_rescue(), 3);
    }

    #[tokio::test]
    async fn test_consume_invokes_send_event() {
        let mut actor = Passthrough {
            name: "pt".into(),
            calls: 0,
        };
        let pool = QueuePool::new(4);
        pool.add(crate::queue::QueueGroup::Outbound, "out", None)
            .unwrap();
        let ctx = ActorContext::new("pt", &pool, actor.output());

        let event = Event::new(crate::event::Variant::Plain("hi".into()));
        actor.consume(event, "in", &ctx).await.unwrap();

        assert_eq!(actor.calls, 1);
    }

    #[tokio::test]
    async fn test_default_hooks_succeed() {
        let mut actor = Passthrough {
            name: "pt".into(),
            calls: 0,
        };
        assert!(actor.pre_hook().await.is_ok());
        assert!(actor.post_hook().await.is_ok());
    }
}
