//! Monitoring event types and configuration structures (ยง1 ambient stack, ADDED).

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::traits::{EventSeverity, MonitoringEvent};
use crate::util::EventId;

/// Configuration for monitoring behavior.
///
/// Controls how events are recorded, filtered, and stored in the monitor.
#[derive(Debug, Clone, Serialize)]
pub struct MonitoringConfig {
    /// Whether monitoring is enabled
    pub enabled: bool,

    /// Maximum number of events to keep in history
    pub max_history_size: usize,

    /// Minimum severity level to record (events below this are filtered)
    pub severity_filter: EventSeverity,

    /// Interval for snapshot generation (if using background snapshots)
    #[serde(with = "crate::util::duration_serde")]
    pub snapshot_interval: Duration,
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_history_size: 1000,
            severity_filter: EventSeverity::Info,
            snapshot_interval: Duration::from_secs(60),
        }
    }
}

/// Snapshot of monitoring state at a point in time.
///
/// Provides queryable access to monitoring counters and recent event history.
#[derive(Debug, Clone, Serialize)]
pub struct MonitoringSnapshot<E: MonitoringEvent> {
    /// Timestamp when snapshot was taken
    pub timestamp: DateTime<Utc>,

    /// Total number of events recorded
    pub total_events: u64,

    /// Number of trace-level events
    pub trace_count: u64,

    /// Number of debug-level events
    pub debug_count: u64,

    /// Number of info-level events
    pub info_count: u64,

    /// Number of warning-level events
    pub warning_count: u64,

    /// Number of error-level events
    pub error_count: u64,

    /// Number of critical-level events
    pub critical_count: u64,

    /// Recent events (up to max_history_size)
    pub recent_events: Vec<E>,
}

// ============================================================================
// Queue Events
// ============================================================================

/// Events related to `Queue` put/get discipline (ยง3.3, ยง4.1).
#[derive(Debug, Clone, Serialize)]
pub struct QueueEvent {
    /// Timestamp when event occurred (chrono DateTime<Utc>)
    pub timestamp: DateTime<Utc>,

    /// Name of the queue.
    pub queue_name: String,

    /// Specific queue event type
    pub event_kind: QueueEventKind,

    /// Additional event metadata
    pub metadata: HashMap<String, String>,
}

impl MonitoringEvent for QueueEvent {
    const EVENT_TYPE: &'static str = "queue";

    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    fn severity(&self) -> EventSeverity {
        match &self.event_kind {
            QueueEventKind::Put { .. } => EventSeverity::Trace,
            QueueEventKind::Get { .. } => EventSeverity::Trace,
            QueueEventKind::Rescued { .. } => EventSeverity::Warning,
            QueueEventKind::Full { .. } => EventSeverity::Warning,
            QueueEventKind::Empty => EventSeverity::Trace,
            QueueEventKind::Connected { .. } => EventSeverity::Info,
        }
    }
}

/// Specific types of queue events.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum QueueEventKind {
    /// An event was appended.
    Put {
        /// Identity of the appended event.
        event_id: EventId,
        /// Queue size immediately after the put.
        qsize: usize,
    },

    /// An event was popped.
    Get {
        /// Identity of the popped event.
        event_id: EventId,
        /// Queue size immediately after the get.
        qsize: usize,
    },

    /// An event was re-inserted at the head via the rescue path.
    Rescued {
        /// Identity of the rescued event.
        event_id: EventId,
        /// Current rescue counter on the event.
        rescue_count: u32,
    },

    /// A non-blocking or timed-out `put` found the queue full.
    Full {
        /// Configured capacity.
        max_size: usize,
    },

    /// A non-blocking or timed-out `get` found the queue empty.
    Empty,

    /// Two actors' queues were connected (ยง4.2).
    Connected {
        /// Name of the downstream queue the connection attached to.
        to: String,
    },
}

// ============================================================================
// Actor Events
// ============================================================================

/// Events related to actor lifecycle and consume cycles (ยง4.5).
#[derive(Debug, Clone, Serialize)]
pub struct ActorEvent {
    /// Timestamp when event occurred (chrono DateTime<Utc>)
    pub timestamp: DateTime<Utc>,

    /// Name of the actor.
    pub actor_name: String,

    /// Specific actor event type
    pub event_kind: ActorEventKind,

    /// Additional event metadata
    pub metadata: HashMap<String, String>,
}

impl MonitoringEvent for ActorEvent {
    const EVENT_TYPE: &'static str = "actor";

    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    fn severity(&self) -> EventSeverity {
        match &self.event_kind {
            ActorEventKind::Started => EventSeverity::Info,
            ActorEventKind::Consumed { .. } => EventSeverity::Trace,
            ActorEventKind::Rescued { .. } => EventSeverity::Warning,
            ActorEventKind::RescueExhausted { .. } => EventSeverity::Error,
            ActorEventKind::InputRejected { .. } => EventSeverity::Error,
            ActorEventKind::OutputRejected { .. } => EventSeverity::Error,
            ActorEventKind::Stopped => EventSeverity::Info,
        }
    }
}

/// Specific types of actor events.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum ActorEventKind {
    /// The actor's consumer loop started.
    Started,

    /// An event was successfully consumed.
    Consumed {
        /// Identity of the consumed event.
        event_id: EventId,
        /// Processing duration in microseconds.
        duration_micros: u64,
    },

    /// `consume` failed and the event was requeued on its origin (ยง4.5.3
    /// step 5).
    Rescued {
        /// Identity of the rescued event.
        event_id: EventId,
        /// Rescue counter after this attempt.
        rescue_count: u32,
    },

    /// The rescue counter reached `max_rescue`; the event was routed to the
    /// error group instead (ยง4.5.3 step 5).
    RescueExhausted {
        /// Identity of the event.
        event_id: EventId,
    },

    /// The required-attribute check or input conversion failed (ยง4.5.3
    /// steps 1-2).
    InputRejected {
        /// Identity of the rejected event.
        event_id: EventId,
        /// Human-readable reason.
        reason: String,
    },

    /// `send_event` produced output not matching any declared `output`
    /// variant (ยง4.5.4).
    OutputRejected {
        /// Identity of the offending event.
        event_id: EventId,
        /// Human-readable reason.
        reason: String,
    },

    /// The actor's consumer loop stopped.
    Stopped,
}

// ============================================================================
// Restart Pool Events
// ============================================================================

/// Events related to supervised task spawning and restart backoff (ยง4.3).
#[derive(Debug, Clone, Serialize)]
pub struct RestartPoolEvent {
    /// Timestamp when event occurred (chrono DateTime<Utc>)
    pub timestamp: DateTime<Utc>,

    /// Name of the owning actor.
    pub actor_name: String,

    /// Specific restart-pool event type
    pub event_kind: RestartPoolEventKind,

    /// Additional event metadata
    pub metadata: HashMap<String, String>,
}

impl MonitoringEvent for RestartPoolEvent {
    const EVENT_TYPE: &'static str = "restart_pool";

    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    fn severity(&self) -> EventSeverity {
        match &self.event_kind {
            RestartPoolEventKind::Spawned => EventSeverity::Debug,
            RestartPoolEventKind::Restarted { .. } => EventSeverity::Warning,
            RestartPoolEventKind::LimitExceeded { .. } => EventSeverity::Critical,
            RestartPoolEventKind::Killed => EventSeverity::Info,
        }
    }
}

/// Specific types of restart-pool events.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum RestartPoolEventKind {
    /// A cooperative task was spawned.
    Spawned,

    /// A failed task was restarted after backoff.
    Restarted {
        /// Restart count after this restart.
        restart_count: u32,
        /// Backoff delay applied before the restart.
        #[serde(with = "crate::util::duration_serde")]
        delay: Duration,
    },

    /// The restart pool's sliding-window restart limit was exceeded.
    LimitExceeded {
        /// Number of restarts attempted within the window.
        restart_count: u32,
        /// Window over which restarts were counted.
        #[serde(with = "crate::util::duration_serde")]
        window: Duration,
    },

    /// All tasks in the pool were cancelled.
    Killed,
}

// ============================================================================
// Director Events
// ============================================================================

/// Events related to composition-time wiring and runtime startup (ยง4.4).
#[derive(Debug, Clone, Serialize)]
pub struct DirectorEvent {
    /// Timestamp when event occurred (chrono DateTime<Utc>)
    pub timestamp: DateTime<Utc>,

    /// Specific director event type
    pub event_kind: DirectorEventKind,

    /// Additional event metadata
    pub metadata: HashMap<String, String>,
}

impl MonitoringEvent for DirectorEvent {
    const EVENT_TYPE: &'static str = "director";

    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    fn severity(&self) -> EventSeverity {
        match &self.event_kind {
            DirectorEventKind::ActorRegistered { .. } => EventSeverity::Info,
            DirectorEventKind::QueuesConnected { .. } => EventSeverity::Debug,
            DirectorEventKind::Started => EventSeverity::Info,
            DirectorEventKind::Stopped => EventSeverity::Info,
            DirectorEventKind::SetupFailed { .. } => EventSeverity::Critical,
        }
    }
}

/// Specific types of director events.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum DirectorEventKind {
    /// An actor was registered under a name (ยง4.4).
    ActorRegistered {
        /// Name the actor was registered under.
        name: String,
    },

    /// Two actors' queues were connected (ยง4.2).
    QueuesConnected {
        /// Source actor name.
        src: String,
        /// Destination actor name.
        dst: String,
    },

    /// The director started all registered actors.
    Started,

    /// The director stopped all registered actors.
    Stopped,

    /// Composition-time setup failed (duplicate registration, missing sink,
    /// etc) before `start` could proceed.
    SetupFailed {
        /// Human-readable reason.
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_monitoring_config_default() {
        let config = MonitoringConfig::default();
        assert!(config.enabled);
        assert_eq!(config.max_history_size, 1000);
        assert_eq!(config.severity_filter, EventSeverity::Info);
        assert_eq!(config.snapshot_interval, Duration::from_secs(60));
    }

    #[test]
    fn test_queue_event_severity() {
        let event = QueueEvent {
            timestamp: Utc::now(),
            queue_name: "inbound".to_string(),
            event_kind: QueueEventKind::Full { max_size: 10 },
            metadata: HashMap::new(),
        };

        assert_eq!(event.severity(), EventSeverity::Warning);
        assert_eq!(QueueEvent::EVENT_TYPE, "queue");
    }

    #[test]
    fn test_actor_event_severity() {
        let event = ActorEvent {
            timestamp: Utc::now(),
            actor_name: "validator".to_string(),
            event_kind: ActorEventKind::Started,
            metadata: HashMap::new(),
        };

        assert_eq!(event.severity(), EventSeverity::Info);
        assert_eq!(ActorEvent::EVENT_TYPE, "actor");
    }

    #[test]
    fn test_actor_event_rescue_exhausted_is_error() {
        let event = ActorEvent {
            timestamp: Utc::now(),
            actor_name: "validator".to_string(),
            event_kind: ActorEventKind::RescueExhausted {
                event_id: EventId::new(),
            },
            metadata: HashMap::new(),
        };

        assert_eq!(event.severity(), EventSeverity::Error);
    }

    #[test]
    fn test_restart_pool_event_limit_exceeded_is_critical() {
        let event = RestartPoolEvent {
            timestamp: Utc::now(),
            actor_name: "validator".to_string(),
            event_kind: RestartPoolEventKind::LimitExceeded {
                restart_count: 5,
                window: Duration::from_secs(60),
            },
            metadata: HashMap::new(),
        };

        assert_eq!(event.severity(), EventSeverity::Critical);
        assert_eq!(RestartPoolEvent::EVENT_TYPE, "restart_pool");
    }

    #[test]
    fn test_director_event_setup_failed_is_critical() {
        let event = DirectorEvent {
            timestamp: Utc::now(),
            event_kind: DirectorEventKind::SetupFailed {
                reason: "duplicate name".to_string(),
            },
            metadata: HashMap::new(),
        };

        assert_eq!(event.severity(), EventSeverity::Critical);
        assert_eq!(DirectorEvent::EVENT_TYPE, "director");
    }

    #[test]
    #[allow(clippy::expect_used)]
    fn test_queue_event_kind_serialization() {
        let kind = QueueEventKind::Put {
            event_id: EventId::new(),
            qsize: 3,
        };

        let json = serde_json::to_string(&kind).expect("Serialization should succeed");
        assert!(json.contains("Put"));
        assert!(json.contains("3"));
    }

    #[test]
    fn test_monitoring_snapshot_creation() {
        let snapshot = MonitoringSnapshot::<ActorEvent> {
            timestamp: Utc::now(),
            total_events: 100,
            trace_count: 10,
            debug_count: 20,
            info_count: 30,
            warning_count: 25,
            error_count: 10,
            critical_count: 5,
            recent_events: vec![],
        };

        assert_eq!(snapshot.total_events, 100);
        assert_eq!(snapshot.trace_count, 10);
        assert_eq!(snapshot.critical_count, 5);
    }

    #[test]
    #[allow(clippy::expect_used)]
    fn test_event_metadata() {
        let mut metadata = HashMap::new();
        metadata.insert("custom_key".to_string(), "custom_value".to_string());

        let event = DirectorEvent {
            timestamp: Utc::now(),
            event_kind: DirectorEventKind::Started,
            metadata,
        };

        assert_eq!(
            event.metadata.get("custom_key").expect("Key should exist"),
            "custom_value"
        );
    }
}
