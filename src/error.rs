//! Root error taxonomy for the runtime (ยง4.6, ยง7).
//!
//! Every fallible operation in this crate — queue discipline, event conversion,
//! actor input/output typing, composition-time wiring — returns a
//! `FrameworkException`. HTTP-overlay collaborators consume `http_status()` to
//! translate an error into a wire status code (ยง4.6, `http_code_map`
//! from the originating implementation).

// Layer 1: Standard library
// (none)

// Layer 2: Third-party
use thiserror::Error;

// Layer 3: Internal
use crate::util::EventId;

/// Root error type for the event-processing runtime.
///
/// Follows this codebase's structured-error convention: one `thiserror` enum,
/// descriptive `#[error(...)]` messages, and helper predicates
/// (`is_transient`, `is_fatal`, `http_status`) rather than bare string errors.
#[derive(Error, Debug)]
pub enum FrameworkException {
    /// Queue discipline: `add` on a `QueuePool` group collided with an
    /// existing, different queue under the same name (ยง4.2, ยง4.4).
    #[error("queue '{name}' is already connected to a different counterpart")]
    QueueConnected {
        /// The colliding queue name.
        name: String,
    },

    /// `put` on a full, non-blocking (or timed-out) queue (ยง3.3, ยง4.1).
    #[error("queue '{name}' is full (max_size={max_size})")]
    QueueFull {
        /// Name of the queue that rejected the put.
        name: String,
        /// The queue's configured capacity.
        max_size: usize,
    },

    /// `get` on an empty, non-blocking (or timed-out) queue (ยง3.3, ยง4.1).
    #[error("queue '{name}' is empty")]
    QueueEmpty {
        /// Name of the queue that had nothing to dequeue.
        name: String,
    },

    /// An inbound event failed the actor's `REQUIRED_EVENT_ATTRIBUTES` check
    /// or could not be converted to a declared input variant (ยง4.5.3 step 1-2).
    #[error("actor '{actor}' rejected input event {event_id}: {reason}")]
    InvalidActorInput {
        /// Name of the actor that rejected the event.
        actor: String,
        /// Identity of the rejected event.
        event_id: EventId,
        /// Human-readable reason.
        reason: String,
    },

    /// An outbound event from `send_event` did not satisfy any declared
    /// `output` variant while `check_output=true` (ยง4.5.4).
    #[error("actor '{actor}' produced invalid output event {event_id}: {reason}")]
    InvalidActorOutput {
        /// Name of the actor that produced the event.
        actor: String,
        /// Identity of the offending event.
        event_id: EventId,
        /// Human-readable reason.
        reason: String,
    },

    /// A requested `Event::convert` is a narrowing conversion, or no
    /// documented conversion path exists between the two variants (ยง3.2).
    #[error("cannot convert event {event_id} from {from} to {to}")]
    InvalidEventConversion {
        /// Identity of the event that failed to convert.
        event_id: EventId,
        /// Source variant name.
        from: &'static str,
        /// Requested target variant name.
        to: &'static str,
    },

    /// An attempted mutation of `Event` violates an invariant from ยง3.1:
    /// reassigning `event_id`, or assigning a payload that cannot be
    /// reinterpreted in the event's declared variant.
    #[error("invalid mutation of event {event_id}: {reason}")]
    InvalidEventDataModification {
        /// Identity of the event.
        event_id: EventId,
        /// Human-readable reason.
        reason: String,
    },

    /// Composition-time failure registering an actor (duplicate name, ยง4.4).
    #[error("failed to initialize module '{name}': {reason}")]
    ModuleInitFailure {
        /// Name the registration was attempted under.
        name: String,
        /// Human-readable reason.
        reason: String,
    },

    /// Composition-time failure wiring queues or sinks that isn't a naming
    /// collision (missing sink actor, invalid group, etc).
    #[error("setup error: {0}")]
    SetupError(String),

    /// A resource was retrieved unmodified since the caller's last fetch
    /// (ยง4.6, from original_source's `ResourceNotModified`).
    #[error("resource '{name}' not modified")]
    ResourceNotModified {
        /// Name of the unmodified resource.
        name: String,
    },

    /// Authentication is missing or invalid; carries a `WWW-Authenticate`
    /// challenge via [`FrameworkException::www_authenticate`] (ยง4.6, from
    /// original_source's `UnauthorizedEvent`).
    #[error("unauthorized: {reason}")]
    Unauthorized {
        /// Human-readable reason.
        reason: String,
    },

    /// The caller is authenticated but not permitted to perform the operation
    /// (ยง4.6, from original_source's `ForbiddenEvent`).
    #[error("forbidden: {reason}")]
    Forbidden {
        /// Human-readable reason.
        reason: String,
    },

    /// The requested operation is not supported in the actor's current state
    /// (ยง4.6, from original_source's `EventCommandNotAllowed`).
    #[error("operation not allowed: {reason}")]
    MethodNotAllowed {
        /// Human-readable reason.
        reason: String,
    },

    /// A blocking actor operation exceeded its deadline (ยง4.6, from
    /// original_source's `ActorTimeout`).
    #[error("actor '{actor}' timed out after {elapsed_ms}ms")]
    ActorTimeout {
        /// Name of the actor that timed out.
        actor: String,
        /// Elapsed time before the timeout fired, in milliseconds.
        elapsed_ms: u64,
    },

    /// A resource that once existed is now permanently gone (ยง4.6, from
    /// original_source's `ResourceGone`).
    #[error("resource '{name}' is gone")]
    ResourceGone {
        /// Name of the gone resource.
        name: String,
    },

    /// The runtime cannot currently service the request (ยง4.6, from
    /// original_source's `ServiceUnavailable`).
    #[error("service unavailable: {reason}")]
    ServiceUnavailable {
        /// Human-readable reason.
        reason: String,
    },
}

impl FrameworkException {
    /// HTTP status code mapping for HTTP-overlay collaborators (ยง4.6).
    ///
    /// Mirrors the originating implementation's `http_code_map`; errors with
    /// no explicit mapping fall through to `500`. An event carrying no error
    /// at all maps to `200` by convention, handled by the HTTP collaborator
    /// directly rather than through this method.
    pub fn http_status(&self) -> u16 {
        match self {
            FrameworkException::QueueConnected { .. } => 409,
            FrameworkException::QueueFull { .. } => 429,
            FrameworkException::QueueEmpty { .. } => 404,
            FrameworkException::InvalidActorInput { .. } => 400,
            FrameworkException::InvalidActorOutput { .. } => 500,
            FrameworkException::InvalidEventConversion { .. } => 422,
            FrameworkException::InvalidEventDataModification { .. } => 422,
            FrameworkException::ModuleInitFailure { .. } => 500,
            FrameworkException::SetupError(_) => 500,
            FrameworkException::ResourceNotModified { .. } => 304,
            FrameworkException::Unauthorized { .. } => 401,
            FrameworkException::Forbidden { .. } => 403,
            FrameworkException::MethodNotAllowed { .. } => 405,
            FrameworkException::ActorTimeout { .. } => 408,
            FrameworkException::ResourceGone { .. } => 410,
            FrameworkException::ServiceUnavailable { .. } => 503,
        }
    }

    /// The `WWW-Authenticate` challenge value an HTTP overlay should carry
    /// whenever `http_status()` returns 401, matching original_source's
    /// `UnauthorizedEvent` header entry. `attach_error` sets it automatically.
    pub const WWW_AUTHENTICATE: &'static str = "Basic realm=\"pipeline\"";

    /// True if retrying the same operation later might succeed (backpressure,
    /// transient composition races). Used by the rescue path (ยง4.5.3 step 4-5)
    /// to distinguish backpressure requeue from error-queue dispatch.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            FrameworkException::QueueFull { .. } | FrameworkException::QueueEmpty { .. }
        )
    }

    /// True if the error indicates a composition-time problem that should
    /// prevent the director from starting, rather than a per-event failure.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            FrameworkException::ModuleInitFailure { .. } | FrameworkException::SetupError(_)
        )
    }
}
