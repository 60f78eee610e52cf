//! The HTTP overlay composed orthogonally onto any event variant (ยง3.2).

// Layer 1: Standard library
use std::collections::HashMap;

// Layer 2: Third-party
use serde::{Deserialize, Serialize};

// Layer 3: Internal
// (none)

/// Status line attached to an HTTP-overlaid event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpStatus {
    /// Numeric status code.
    pub code: u16,
    /// Reason phrase.
    pub reason: String,
}

impl HttpStatus {
    /// The implicit success status for an event carrying no attached error.
    pub fn ok() -> Self {
        Self {
            code: 200,
            reason: "OK".into(),
        }
    }
}

/// Pagination metadata (ยง3.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Pagination {
    /// Maximum number of items requested, if bounded.
    pub limit: Option<u64>,
    /// Offset into the full result set.
    pub offset: Option<u64>,
}

/// Request metadata orthogonal to the payload variant (ยง3.2, ยง3.6).
///
/// Carries `headers`, `status`, `environment`, `method`, and optional
/// `pagination` — the first-class fields called out by ยง9 Dynamic attributes,
/// as distinct from the fully open `extensions` map on `Event`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct HttpOverlay {
    /// Request/response headers.
    pub headers: HashMap<String, String>,
    /// Status line, present once a response has been produced.
    pub status: Option<HttpStatus>,
    /// Request environment (method, path, remote address, etc.).
    pub environment: HashMap<String, String>,
    /// HTTP method of the originating request, if known.
    pub method: Option<String>,
    /// Pagination parameters, if the request is paginated.
    pub pagination: Option<Pagination>,
}

impl HttpOverlay {
    /// An overlay with no metadata set yet.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Set a header, replacing any existing value under the same name.
    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.headers.insert(name.into(), value.into());
    }
}
