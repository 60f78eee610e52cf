//! Actor lifecycle state machine (ยง4.5.1).
//!
//! States are strictly monotonic: `unstarted → running → stopped`. A stopped
//! actor is never reusable — there is no path back to `Running`.

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use chrono::{DateTime, Utc};

// Layer 3: Internal module imports
// (none)

/// An actor's position in its monotonic lifecycle (ยง4.5.1).
///
/// # Examples
///
/// ```rust
/// use conflux_rt::actor::ActorState;
///
/// assert_eq!(ActorState::default(), ActorState::Unstarted);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActorState {
    /// Constructed but `start()` has not yet run.
    Unstarted,
    /// `start()` has run; consumer tasks may be active.
    Running,
    /// `stop()` has run. Terminal — the actor is not reusable.
    Stopped,
}

impl Default for ActorState {
    fn default() -> Self {
        Self::Unstarted
    }
}

/// Tracks one actor's lifecycle state and the timestamp of its last
/// transition (ยง4.5.1).
#[derive(Debug, Clone)]
pub struct ActorLifecycle {
    state: ActorState,
    last_state_change: DateTime<Utc>,
}

impl ActorLifecycle {
    /// Create a tracker in the `Unstarted` state.
    pub fn new() -> Self {
        Self {
            state: ActorState::Unstarted,
            last_state_change: Utc::now(),
        }
    }

    /// Current state.
    pub fn state(&self) -> ActorState {
        self.state
    }

    /// Timestamp of the last transition.
    pub fn last_state_change(&self) -> DateTime<Utc> {
        self.last_state_change
    }

    /// `Unstarted → Running`. No-op if already running; a no-op rather than
    /// an error because `register_consumer` may call `start` semantics
    /// implicitly on an actor that is already up.
    pub fn start(&mut self) {
        if self.state == ActorState::Unstarted {
            self.state = ActorState::Running;
            self.last_state_change = Utc::now();
        }
    }

    /// `Running → Stopped`. A stopped actor cannot be restarted through this
    /// tracker (ยง4.5.1 "monotonic").
    pub fn stop(&mut self) {
        if self.state != ActorState::Stopped {
            self.state = ActorState::Stopped;
            self.last_state_change = Utc::now();
        }
    }

    /// True once `stop()` has run.
    pub fn is_stopped(&self) -> bool {
        self.state == ActorState::Stopped
    }

    /// True between `start()` and `stop()`.
    pub fn is_running(&self) -> bool {
        self.state == ActorState::Running
    }
}

impl Default for ActorLifecycle {
    fn default() -> Self {
        Self::new()
    }
}
