//! The `Event` type: identity, payload, error attachment, extensions (ยง3.1).

// Layer 1: Standard library
use std::collections::HashMap;

// Layer 2: Third-party
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

// Layer 3: Internal
use super::http::HttpOverlay;
use super::variant::Variant;
use crate::error::FrameworkException;
use crate::monitoring::EventSeverity;
use crate::util::EventId;

/// A lightweight, serializable description of an error attached to an event.
///
/// `Event::error` cannot hold a `FrameworkException` directly: events must
/// stay `Clone + Serialize` so they can be deep-copied on fan-out (ยง4.5.4) and
/// recorded through the monitoring path, neither of which `thiserror` enums
/// with owned diagnostic context are obligated to support. `EventError` is the
/// serializable projection collaborators actually need.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventError {
    /// Human-readable message (the `FrameworkException`'s `Display` output).
    pub message: String,
    /// HTTP status mapping, if the origin exception defines one (ยง4.6).
    pub http_status: u16,
}

impl From<&FrameworkException> for EventError {
    fn from(exc: &FrameworkException) -> Self {
        Self {
            message: exc.to_string(),
            http_status: exc.http_status(),
        }
    }
}

/// The unit of work flowing through the pipeline (ยง3.1).
///
/// `event_id` is set once at construction and never reassigned; attempts to
/// do so are rejected at the call site (there is no public setter) rather
/// than panicking, matching the data-model-error tier of ยง7.1.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    event_id: EventId,
    meta_id: EventId,
    service: String,
    created: DateTime<Utc>,
    data: Variant,
    error: Option<EventError>,
    extensions: HashMap<String, JsonValue>,
    http: Option<HttpOverlay>,
    rescue_count: u32,
}

impl Event {
    /// Construct a new event with a fresh identity and the literal service
    /// tag `"default"` (ยง3.1).
    pub fn new(data: Variant) -> Self {
        let event_id = EventId::new();
        Self {
            event_id,
            meta_id: event_id,
            service: "default".to_string(),
            created: Utc::now(),
            data,
            error: None,
            extensions: HashMap::new(),
            http: None,
            rescue_count: 0,
        }
    }

    /// Attach an explicit `meta_id`, overriding the default of reusing
    /// `event_id` (ยง3.1).
    pub fn with_meta_id(mut self, meta_id: EventId) -> Self {
        self.meta_id = meta_id;
        self
    }

    /// Set the routing `service` tag.
    pub fn with_service(mut self, service: impl Into<String>) -> Self {
        self.service = service.into();
        self
    }

    /// Attach an HTTP overlay (ยง3.2).
    pub fn with_http(mut self, http: HttpOverlay) -> Self {
        self.http = Some(http);
        self
    }

    /// The event's immutable identity (ยง3.1 invariant).
    pub fn event_id(&self) -> EventId {
        self.event_id
    }

    /// The causal-chain correlation key, equal to `event_id` unless
    /// explicitly supplied (ยง3.1 invariant).
    pub fn meta_id(&self) -> EventId {
        self.meta_id
    }

    /// The routing tag, `"default"` unless set.
    pub fn service(&self) -> &str {
        &self.service
    }

    /// Creation timestamp.
    pub fn created(&self) -> DateTime<Utc> {
        self.created
    }

    /// Read-only access to the current payload.
    pub fn data(&self) -> &Variant {
        &self.data
    }

    /// The currently attached error, if any.
    pub fn error(&self) -> Option<&EventError> {
        self.error.as_ref()
    }

    /// The HTTP overlay, if this event carries one.
    pub fn http(&self) -> Option<&HttpOverlay> {
        self.http.as_ref()
    }

    /// Mutable access to the HTTP overlay, if this event carries one.
    pub fn http_mut(&mut self) -> Option<&mut HttpOverlay> {
        self.http.as_mut()
    }

    /// Attach or replace the payload in place, without changing its variant
    /// kind. Changing variant kind must go through `Event::convert` (ยง3.2),
    /// since only that path enforces the widening-only rule.
    ///
    /// # Errors
    /// Returns `InvalidEventDataModification` if `new_data`'s variant kind
    /// differs from the event's current variant kind.
    pub fn set_data(&mut self, new_data: Variant) -> Result<(), FrameworkException> {
        if new_data.kind() != self.data.kind() {
            return Err(FrameworkException::InvalidEventDataModification {
                event_id: self.event_id,
                reason: format!(
                    "cannot replace {} payload with a {} value in place; use convert()",
                    self.data.kind(),
                    new_data.kind()
                ),
            });
        }
        self.data = new_data;
        Ok(())
    }

    /// Replace the payload with one of a different variant kind. Only
    /// `Event::convert` may do this, since only that path enforces the
    /// widening-only rule (ยง3.2); `set_data` is the public same-kind path.
    pub(crate) fn set_data_any_kind(&mut self, new_data: Variant) {
        self.data = new_data;
    }

    /// Attach an error descriptor. Never mutates `data`; on an HTTP-overlaid
    /// event it also updates the overlay's status line, and a 401 also sets
    /// the `WWW-Authenticate` challenge header (ยง3.1 invariant, ยง4.6).
    pub fn attach_error(&mut self, exc: &FrameworkException) {
        let descriptor = EventError::from(exc);
        if let Some(http) = self.http.as_mut() {
            http.status = Some(super::http::HttpStatus {
                code: descriptor.http_status,
                reason: exc.to_string(),
            });
            if descriptor.http_status == 401 {
                http.set_header("WWW-Authenticate", FrameworkException::WWW_AUTHENTICATE);
            }
        }
        self.error = Some(descriptor);
    }

    /// Read an attribute by a uniform accessor covering both first-class
    /// fields and the open `extensions` map, matching the originating
    /// implementation's permissive `hasattr` semantics (ยง9 open question).
    pub fn get_attribute(&self, name: &str) -> Option<JsonValue> {
        match name {
            "service" => Some(JsonValue::String(self.service.clone())),
            "event_id" => Some(JsonValue::String(self.event_id.to_string())),
            "meta_id" => Some(JsonValue::String(self.meta_id.to_string())),
            "headers" => self
                .http
                .as_ref()
                .map(|h| serde_json::to_value(&h.headers).unwrap_or(JsonValue::Null)),
            "status" => self
                .http
                .as_ref()
                .and_then(|h| h.status.as_ref())
                .map(|s| serde_json::to_value(s).unwrap_or(JsonValue::Null)),
            "environment" => self
                .http
                .as_ref()
                .map(|h| serde_json::to_value(&h.environment).unwrap_or(JsonValue::Null)),
            "pagination" => self
                .http
                .as_ref()
                .and_then(|h| h.pagination)
                .map(|p| serde_json::to_value(p).unwrap_or(JsonValue::Null)),
            other => self.extensions.get(other).cloned(),
        }
    }

    /// Set an opaque extension attribute (ยง9 Dynamic attributes).
    pub fn set_extension(&mut self, name: impl Into<String>, value: JsonValue) {
        self.extensions.insert(name.into(), value);
    }

    /// Per-event rescue counter (`__rescue_<actor_name>` in the originating
    /// implementation, collapsed to a single counter here since an event
    /// belongs to one in-flight rescue cycle at a time — ยง4.5.3 step 5).
    pub fn rescue_count(&self) -> u32 {
        self.rescue_count
    }

    /// Increment the rescue counter, returning the new value.
    pub fn increment_rescue_count(&mut self) -> u32 {
        self.rescue_count += 1;
        self.rescue_count
    }

    /// Produce an independent clone for one `send_event` fan-out destination
    /// (ยง4.5.4): identity fields are preserved, everything else is deep
    /// copied so downstream mutation never races with other destinations or
    /// the original.
    pub fn clone_for_destination(&self) -> Self {
        self.clone()
    }

    /// Construct a `Plain`-variant log event correlated with `source`
    /// (ยง3.1 Supplemental: LogEvent). `logs` queues only ever carry events
    /// built this way.
    pub fn log(level: EventSeverity, message: impl Into<String>, source: &Event) -> Self {
        let mut event = Event::new(Variant::Plain(message.into()))
            .with_meta_id(source.meta_id)
            .with_service(source.service.clone());
        event.set_extension(
            "level",
            JsonValue::String(format!("{level:?}").to_lowercase()),
        );
        event
    }
}
