//! Integration tests for queue capacity enforcement and the backpressure
//! path it drives through `ActorRuntime`'s consumer loop (ยง4.1, ยง4.5.3
//! step 4).

#![allow(clippy::unwrap_used)]

use std::time::Duration;

use async_trait::async_trait;

use conflux_rt::actor::{Actor, ActorContext, ActorRuntime};
use conflux_rt::error::FrameworkException;
use conflux_rt::event::{Event, Variant};
use conflux_rt::monitoring::{ActorEvent, InMemoryMonitor, MonitoringConfig, NoopMonitor, RestartPoolEvent};
use conflux_rt::queue::{Queue, QueueGroup};

#[tokio::test]
async fn test_put_times_out_with_queue_full_when_capacity_never_frees() {
    let queue = Queue::new("bounded", 1);
    queue.try_put(Event::new(Variant::Plain("a".into()))).await.unwrap();

    let err = queue
        .put(Event::new(Variant::Plain("b".into())), Some(Duration::from_millis(30)))
        .await
        .unwrap_err();
    assert!(matches!(err, FrameworkException::QueueFull { .. }));
}

/// Forwards by a short-timeout `put` straight on the outbound queue rather
/// than going through `ActorContext::send_event`'s indefinite wait, so a
/// full downstream queue surfaces as `QueueFull` — the transient error
/// `do_consume` step 4 rescues onto the origin queue rather than dropping.
struct TimedRelay {
    name: String,
}

#[async_trait]
impl Actor for TimedRelay {
    fn name(&self) -> &str {
        &self.name
    }

    async fn consume(
        &mut self,
        event: Event,
        _origin: &str,
        ctx: &ActorContext<'_>,
    ) -> Result<(), FrameworkException> {
        let out = ctx.pool().get(QueueGroup::Outbound, "out").unwrap();
        out.put(event, Some(Duration::from_millis(10))).await
    }
}

#[tokio::test]
async fn test_full_downstream_queue_triggers_rescue_instead_of_drop() {
    let actor_monitor = InMemoryMonitor::<ActorEvent>::new(MonitoringConfig::default());
    let runtime = ActorRuntime::new(
        Box::new(TimedRelay { name: "relay".into() }),
        8,
        actor_monitor.clone(),
        NoopMonitor::<RestartPoolEvent>::new(),
    );

    // Outbound capacity of 1: the second event can't be forwarded until the
    // first is drained, forcing the consumer loop onto the backpressure path.
    let out = runtime
        .pool()
        .add(QueueGroup::Outbound, "out", Some(Queue::new("out", 1)))
        .unwrap();
    let inbound = runtime.register_consumer("in", None).await.unwrap();

    runtime.start().await.unwrap();
    inbound.put(Event::new(Variant::Plain("first".into())), None).await.unwrap();
    inbound.put(Event::new(Variant::Plain("second".into())), None).await.unwrap();

    // Nothing is lost: draining "out" twice yields both events, in order,
    // even though the second put had to be rescued and retried at least once.
    let first = out.get(Some(Duration::from_secs(2))).await.unwrap();
    assert_eq!(first.data(), &Variant::Plain("first".into()));
    let second = out.get(Some(Duration::from_secs(2))).await.unwrap();
    assert_eq!(second.data(), &Variant::Plain("second".into()));

    runtime.stop().await.unwrap();
}
