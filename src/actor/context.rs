//! `ActorContext`: the handle `consume` uses to emit events (ยง4.5.4).

// Layer 1: Standard library imports
use std::collections::HashMap;

// Layer 2: Third-party crate imports
// (none)

// Layer 3: Internal module imports
use crate::error::FrameworkException;
use crate::event::{Event, VariantKind};
use crate::queue::{Queue, QueueGroup, QueuePool};

/// The destination set for [`ActorContext::send_event`] (ยง4.5.4).
///
/// The originating implementation accepts "a queue, a sequence of queues, or
/// a mapping of queues" and raises `TypeError` for anything else; Rust has no
/// ambient dynamic-typing equivalent to accept "any other type", so the
/// three accepted shapes are modeled directly as enum variants instead.
pub enum Destinations {
    /// A single destination queue.
    One(Queue),
    /// An ordered set of destination queues.
    Many(Vec<Queue>),
    /// A named set of destination queues (name is informational only; all
    /// values receive the event).
    Named(HashMap<String, Queue>),
}

impl Destinations {
    fn into_queues(self) -> Vec<Queue> {
        match self {
            Destinations::One(q) => vec![q],
            Destinations::Many(qs) => qs,
            Destinations::Named(map) => map.into_values().collect(),
        }
    }
}

/// Per-consume handle giving an actor's `consume` method access to its
/// queue pool without exposing the rest of the owning [`super::ActorRuntime`]
/// (ยง3.5, ยง4.5.4).
pub struct ActorContext<'a> {
    actor_name: &'a str,
    pool: &'a QueuePool,
    output: &'a [VariantKind],
}

impl<'a> ActorContext<'a> {
    pub(crate) fn new(actor_name: &'a str, pool: &'a QueuePool, output: &'a [VariantKind]) -> Self {
        Self {
            actor_name,
            pool,
            output,
        }
    }

    /// Fan `event` out to `destinations` (the actor's outbound group by
    /// default). Every destination receives an independent clone — identity
    /// fields preserved, everything else deep-copied (ยง4.5.4, ยง8 invariant).
    ///
    /// # Errors
    /// `InvalidActorOutput` if `check_output` is `true` and `event`'s payload
    /// kind does not match any declared `output` variant.
    pub async fn send_event(
        &self,
        event: &Event,
        destinations: Option<Destinations>,
        check_output: bool,
    ) -> Result<(), FrameworkException> {
        if check_output && !self.output.contains(&event.data().kind()) {
            return Err(FrameworkException::InvalidActorOutput {
                actor: self.actor_name.to_string(),
                event_id: event.event_id(),
                reason: format!(
                    "payload kind {} does not match any declared output variant",
                    event.data().kind()
                ),
            });
        }

        let queues = match destinations {
            Some(d) => d.into_queues(),
            None => self.pool.all(QueueGroup::Outbound),
        };

        for queue in queues {
            queue.put(event.clone_for_destination(), None).await?;
        }
        Ok(())
    }

    /// Forward `event` to the actor's error group. `check_output` is always
    /// `false` on this path (ยง4.5.4).
    pub async fn send_error(&self, event: &Event) -> Result<(), FrameworkException> {
        for queue in self.pool.all(QueueGroup::Error) {
            queue.put(event.clone_for_destination(), None).await?;
        }
        Ok(())
    }

    /// The queue pool backing this context's actor.
    pub fn pool(&self) -> &QueuePool {
        self.pool
    }
}
