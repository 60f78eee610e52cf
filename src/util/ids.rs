// Layer 1: Standard library imports
use std::fmt::{self, Display};

// Layer 2: Third-party crate imports
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// Layer 3: Internal module imports
// (none)

/// Unique identifier for actors registered with a `Director`.
///
/// # Example
/// ```rust
/// use conflux_rt::util::ActorId;
///
/// let id1 = ActorId::new();
/// let id2 = ActorId::new();
/// assert_ne!(id1, id2);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActorId(Uuid);

impl ActorId {
    /// Generate a new random `ActorId`.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create an `ActorId` from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ActorId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique, opaque, write-once identity of an `Event` (ยง3.1).
///
/// Distinct from `ActorId`: an `EventId` is assigned once at construction and
/// never reassigned. Attempting to change it is a caller bug reported via
/// `FrameworkException::InvalidEventDataModification`, not a type-level
/// impossibility, because events flow through dynamically-typed collaborator
/// code that may attempt it.
///
/// # Example
/// ```rust
/// use conflux_rt::util::EventId;
///
/// let id = EventId::new();
/// println!("event id: {id}");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventId(Uuid);

impl EventId {
    /// Generate a new random `EventId`.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create an `EventId` from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
