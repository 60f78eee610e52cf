//! The composition root: registry, connector, supervisor (ยง3.6, ยง4.4).
//!
//! A `Director` instantiates nothing itself — actors are built by the caller
//! as `ActorRuntime`s and handed in as `Arc<dyn RuntimeHandle>` — but it owns
//! the name→actor registry, wires queues between registered actors, applies
//! the default log/error sink connection rule on `start`, and installs
//! process-termination signal handlers that trigger `stop()`.

pub mod config;

pub use config::DirectorConfig;

// Layer 1: Standard library imports
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

// Layer 2: Third-party crate imports
use chrono::Utc;
use dashmap::DashMap;
use tokio::sync::Notify;

// Layer 3: Internal module imports
use crate::actor::RuntimeHandle;
use crate::error::FrameworkException;
use crate::monitoring::{DirectorEvent, DirectorEventKind, Monitor};
use crate::queue::{self, Queue, QueueGroup};

/// The composition root (ยง3.6).
///
/// # Type Parameters
///
/// - `MD`: monitor recording this director's [`DirectorEvent`]s.
pub struct Director<MD: Monitor<DirectorEvent> + Clone + Send + Sync + 'static> {
    config: DirectorConfig,
    monitor: MD,
    registry: DashMap<String, Arc<dyn RuntimeHandle>>,
    log_sink: DashMap<(), String>,
    error_sink: DashMap<(), String>,
    running: Arc<AtomicBool>,
    block_signal: Notify,
}

impl<MD> Director<MD>
where
    MD: Monitor<DirectorEvent> + Clone + Send + Sync + 'static,
{
    /// Create a director with the given configuration and monitor.
    pub fn new(config: DirectorConfig, monitor: MD) -> Self {
        Self {
            config,
            monitor,
            registry: DashMap::new(),
            log_sink: DashMap::new(),
            error_sink: DashMap::new(),
            running: Arc::new(AtomicBool::new(false)),
            block_signal: Notify::new(),
        }
    }

    /// This director's tunables.
    pub fn config(&self) -> &DirectorConfig {
        &self.config
    }

    /// Register an already-built actor runtime under its own name (ยง4.4
    /// `register_actor`).
    ///
    /// # Errors
    /// `ModuleInitFailure` if another actor is already registered under that
    /// name.
    pub fn register_actor(
        &self,
        handle: Arc<dyn RuntimeHandle>,
    ) -> Result<(), FrameworkException> {
        let name = handle.name().to_string();
        if self.registry.contains_key(&name) {
            return Err(FrameworkException::ModuleInitFailure {
                name: name.clone(),
                reason: "an actor is already registered under this name".to_string(),
            });
        }
        self.registry.insert(name.clone(), handle);
        self.record(DirectorEventKind::ActorRegistered { name });
        Ok(())
    }

    /// Look up a registered actor's handle by name.
    pub fn actor(&self, name: &str) -> Option<Arc<dyn RuntimeHandle>> {
        self.registry.get(name).map(|e| Arc::clone(e.value()))
    }

    fn require_actor(&self, name: &str) -> Result<Arc<dyn RuntimeHandle>, FrameworkException> {
        self.actor(name).ok_or_else(|| FrameworkException::SetupError(format!(
            "no actor registered under name '{name}'"
        )))
    }

    /// Attach `src`'s outbound queue to `dst`'s inbound queue (ยง4.4
    /// `connect_queue`). Queue names default to `dst`'s actor name when not
    /// given, matching a direct one-hop wire between two actors.
    pub fn connect_queue(
        &self,
        src: &str,
        dst: &str,
        src_queue_name: Option<&str>,
        dst_queue_name: Option<&str>,
        check_existing: bool,
    ) -> Result<Queue, FrameworkException> {
        let src_handle = self.require_actor(src)?;
        let dst_handle = self.require_actor(dst)?;
        let src_name = src_queue_name.unwrap_or(dst);
        let dst_name = dst_queue_name.unwrap_or(src);

        let shared = queue::connect_queue(
            src_handle.pool(),
            src_name,
            dst_handle.pool(),
            dst_name,
            check_existing,
        )?;
        self.record(DirectorEventKind::QueuesConnected {
            src: src.to_string(),
            dst: dst.to_string(),
        });
        Ok(shared)
    }

    /// Attach `src`'s error group to `dst`'s inbound queue (ยง4.4
    /// `connect_error_queue`).
    pub fn connect_error_queue(
        &self,
        src: &str,
        dst: &str,
        src_queue_name: Option<&str>,
        dst_queue_name: Option<&str>,
        check_existing: bool,
    ) -> Result<Queue, FrameworkException> {
        let src_handle = self.require_actor(src)?;
        let dst_handle = self.require_actor(dst)?;
        let src_name = src_queue_name.unwrap_or(src);
        let dst_name = dst_queue_name.unwrap_or(src);

        queue::connect_error_queue(
            src_handle.pool(),
            src_name,
            dst_handle.pool(),
            dst_name,
            check_existing,
        )
    }

    /// Attach `src`'s logs group to `dst`'s inbound queue (ยง4.4
    /// `connect_log_queue`).
    pub fn connect_log_queue(
        &self,
        src: &str,
        dst: &str,
        src_queue_name: Option<&str>,
        dst_queue_name: Option<&str>,
        check_existing: bool,
    ) -> Result<Queue, FrameworkException> {
        let src_handle = self.require_actor(src)?;
        let dst_handle = self.require_actor(dst)?;
        let src_name = src_queue_name.unwrap_or(src);
        let dst_name = dst_queue_name.unwrap_or(src);

        queue::connect_log_queue(
            src_handle.pool(),
            src_name,
            dst_handle.pool(),
            dst_name,
            check_existing,
        )
    }

    /// Designate `name` as the sink every unconnected actor's `logs` group is
    /// auto-wired to on `start` (ยง4.4).
    ///
    /// # Errors
    /// `SetupError` if `name` is not a registered actor.
    pub fn register_log_actor(&self, name: &str) -> Result<(), FrameworkException> {
        self.require_actor(name)?;
        self.log_sink.insert((), name.to_string());
        Ok(())
    }

    /// Designate `name` as the sink every unconnected actor's `error` group
    /// is auto-wired to on `start` (ยง4.4).
    ///
    /// # Errors
    /// `SetupError` if `name` is not a registered actor.
    pub fn register_error_actor(&self, name: &str) -> Result<(), FrameworkException> {
        self.require_actor(name)?;
        self.error_sink.insert((), name.to_string());
        Ok(())
    }

    /// Wire every registered actor lacking its own `error`/`logs` connection
    /// to the designated sinks (ยง4.4 "Default connection rule"). Idempotent:
    /// an actor that already has entries in a group is left alone.
    fn apply_default_connections(&self) -> Result<(), FrameworkException> {
        let log_sink = self.log_sink.get(&()).map(|e| e.value().clone());
        let error_sink = self.error_sink.get(&()).map(|e| e.value().clone());

        let names: Vec<String> = self.registry.iter().map(|e| e.key().clone()).collect();
        for name in names {
            let handle = self.require_actor(&name)?;

            if handle.pool().has_unwired_logs() {
                if let Some(sink) = &log_sink {
                    if sink != &name {
                        self.connect_log_queue(&name, sink, None, None, false)?;
                    }
                }
            }

            if handle.pool().is_empty(QueueGroup::Error) {
                if let Some(sink) = &error_sink {
                    if sink != &name {
                        self.connect_error_queue(&name, sink, None, None, false)?;
                    }
                }
            }
        }
        Ok(())
    }

    /// Start every registered actor (ยง4.4 `start`): apply default
    /// connections, then run each actor's `pre_hook`/mark-running/spawn
    /// sequence. With `block=true`, suspends until `stop()` (directly or via
    /// a termination signal) completes.
    pub async fn start(&self, block: bool) -> Result<(), FrameworkException> {
        self.apply_default_connections()?;

        self.running.store(true, Ordering::SeqCst);
        for entry in self.registry.iter() {
            entry.value().start().await?;
        }
        self.record(DirectorEventKind::Started);

        if block {
            self.install_signal_handlers();
            self.block_signal.notified().await;
        }
        Ok(())
    }

    /// Stop every registered actor (ยง4.4 `stop`) and release any pending
    /// `start(block=true)` call.
    pub async fn stop(&self) -> Result<(), FrameworkException> {
        self.running.store(false, Ordering::SeqCst);
        for entry in self.registry.iter() {
            entry.value().stop().await?;
        }
        self.record(DirectorEventKind::Stopped);
        self.block_signal.notify_waiters();
        Ok(())
    }

    /// True between a completed `start()` and `stop()`.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    fn install_signal_handlers(&self) {
        let running = Arc::clone(&self.running);

        tokio::spawn(async move {
            #[cfg(unix)]
            {
                use tokio::signal::unix::{signal, SignalKind};
                let mut terminate = match signal(SignalKind::terminate()) {
                    Ok(s) => s,
                    Err(_) => return,
                };
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = terminate.recv() => {}
                }
            }
            #[cfg(not(unix))]
            {
                let _ = tokio::signal::ctrl_c().await;
            }
            running.store(false, Ordering::SeqCst);
        });
    }

    /// Record a director-level event. A no-op outside a `tokio` runtime
    /// (e.g. a synchronous `register_actor` call made before `start`), since
    /// `Monitor::record` is async and there is nothing to drive it.
    fn record(&self, event_kind: DirectorEventKind) {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            return;
        };
        let monitor = self.monitor.clone();
        handle.spawn(async move {
            let _ = monitor
                .record(DirectorEvent {
                    timestamp: Utc::now(),
                    event_kind,
                    metadata: HashMap::new(),
                })
                .await;
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::{Actor, ActorContext, ActorRuntime};
    use crate::error::FrameworkException as Exc;
    use crate::event::{Event, Variant};
    use crate::monitoring::{ActorEvent, InMemoryMonitor, MonitoringConfig, NoopMonitor, RestartPoolEvent};
    use async_trait::async_trait;
    use std::time::Duration;

    struct Forward {
        name: String,
    }

    #[async_trait]
    impl Actor for Forward {
        fn name(&self) -> &str {
            &self.name
        }

        async fn consume(
            &mut self,
            event: Event,
            _origin: &str,
            ctx: &ActorContext<'_>,
        ) -> Result<(), Exc> {
            ctx.send_event(&event, None, false).await
        }
    }

    fn runtime(name: &str) -> Arc<dyn RuntimeHandle> {
        Arc::new(ActorRuntime::new(
            Box::new(Forward { name: name.to_string() }),
            8,
            InMemoryMonitor::<ActorEvent>::new(MonitoringConfig::default()),
            NoopMonitor::<RestartPoolEvent>::new(),
        ))
    }

    fn director() -> Director<NoopMonitor<DirectorEvent>> {
        Director::new(DirectorConfig::default(), NoopMonitor::new())
    }

    #[test]
    fn test_register_actor_rejects_duplicate_name() {
        let director = director();
        director.register_actor(runtime("p")).unwrap();
        let err = director.register_actor(runtime("p")).unwrap_err();
        assert!(matches!(err, FrameworkException::ModuleInitFailure { .. }));
    }

    #[tokio::test]
    async fn test_connect_queue_wires_two_actors() {
        let director = director();
        director.register_actor(runtime("p")).unwrap();
        director.register_actor(runtime("s")).unwrap();

        director
            .connect_queue("p", "s", Some("out"), Some("in"), true)
            .unwrap();

        let p = director.actor("p").unwrap();
        let s = director.actor("s").unwrap();
        assert!(p.pool().get(QueueGroup::Outbound, "out").is_some());
        assert!(s.pool().get(QueueGroup::Inbound, "in").is_some());
    }

    #[tokio::test]
    async fn test_linear_pipeline_end_to_end() {
        let director = director();
        director.register_actor(runtime("p")).unwrap();
        director.register_actor(runtime("m")).unwrap();
        director.register_actor(runtime("s")).unwrap();

        director
            .connect_queue("p", "m", Some("out"), Some("in"), true)
            .unwrap();
        director
            .connect_queue("m", "s", Some("out"), Some("in"), true)
            .unwrap();

        let p = director.actor("p").unwrap();
        p.pool().add(QueueGroup::Inbound, "in", None).unwrap();
        let s = director.actor("s").unwrap();
        s.pool().add(QueueGroup::Outbound, "final", None).unwrap();

        director.start(false).await.unwrap();

        let p_in = p.pool().get(QueueGroup::Inbound, "in").unwrap();
        for text in ["e1", "e2", "e3"] {
            p_in.put(Event::new(Variant::Plain(text.into())), None)
                .await
                .unwrap();
        }

        let s_out = s.pool().get(QueueGroup::Outbound, "final").unwrap();
        for expected in ["e1", "e2", "e3"] {
            let got = s_out.get(Some(Duration::from_secs(2))).await.unwrap();
            assert_eq!(got.data(), &Variant::Plain(expected.into()));
        }

        director.stop().await.unwrap();
    }

    #[tokio::test]
    async fn test_default_connection_wires_unconnected_error_group() {
        let director = director();
        director.register_actor(runtime("p")).unwrap();
        director.register_actor(runtime("errors")).unwrap();
        director.register_error_actor("errors").unwrap();

        director.start(false).await.unwrap();

        let p = director.actor("p").unwrap();
        let errors = director.actor("errors").unwrap();
        assert!(p.pool().get(QueueGroup::Error, "p").is_some());
        assert!(errors.pool().get(QueueGroup::Inbound, "p").is_some());

        director.stop().await.unwrap();
    }

    #[tokio::test]
    async fn test_default_connection_wires_unconnected_logs_group() {
        let director = director();
        director.register_actor(runtime("p")).unwrap();
        director.register_actor(runtime("collector")).unwrap();
        director.register_log_actor("collector").unwrap();

        director.start(false).await.unwrap();

        let p = director.actor("p").unwrap();
        let collector = director.actor("collector").unwrap();
        assert!(p.pool().get(QueueGroup::Logs, "p").is_some());
        assert!(collector.pool().get(QueueGroup::Inbound, "p").is_some());

        director.stop().await.unwrap();
    }

    #[tokio::test]
    async fn test_stop_halts_running_flag() {
        let director = director();
        director.register_actor(runtime("p")).unwrap();
        director.start(false).await.unwrap();
        assert!(director.is_running());

        director.stop().await.unwrap();
        assert!(!director.is_running());
    }
}
