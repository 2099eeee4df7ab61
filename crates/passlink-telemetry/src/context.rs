//! Per-request context for log correlation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifies one inbound request across every log line it produces.
///
/// The span carries an empty `nonce` field that the handler fills in once
/// a token has been decoded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    /// Unique request identifier.
    pub request_id: Uuid,
    /// Route or component that accepted the request.
    pub route: String,
    /// When the request started.
    pub started_at: DateTime<Utc>,
}

impl RequestContext {
    /// Create a context for a request arriving on `route`.
    #[must_use]
    pub fn new(route: impl Into<String>) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            route: route.into(),
            started_at: Utc::now(),
        }
    }

    /// Milliseconds since the request started.
    #[must_use]
    pub fn elapsed_ms(&self) -> i64 {
        Utc::now()
            .signed_duration_since(self.started_at)
            .num_milliseconds()
    }

    /// First eight characters of the request id.
    #[must_use]
    pub fn short_id(&self) -> String {
        self.request_id.simple().to_string().chars().take(8).collect()
    }

    /// A span to instrument the request's future with.
    #[must_use]
    pub fn span(&self) -> tracing::Span {
        tracing::info_span!(
            "request",
            request_id = %self.short_id(),
            route = %self.route,
            nonce = tracing::field::Empty,
        )
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new("unknown")
    }
}
