//! Greeting use-case behind the `sayHello` callable.

use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;

/// Name used when the caller does not give one.
pub const DEFAULT_GREETING_NAME: &str = "User";

/// Validated greeting input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GreetingRequest {
    name: String,
}

impl GreetingRequest {
    /// Build a request, substituting [`DEFAULT_GREETING_NAME`] for an absent
    /// or empty name.
    #[must_use]
    pub fn new(name: Option<String>) -> Self {
        let name = name
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| DEFAULT_GREETING_NAME.to_owned());
        Self { name }
    }

    /// Name that will be greeted.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }
}

/// Greeting returned to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Greeting {
    /// Personalised welcome line.
    #[schema(example = "Hello, Fern! Welcome to LeafLine 🌿")]
    pub message: String,
    /// Invocation instant, ISO-8601 UTC with millisecond precision.
    #[schema(example = "2024-05-01T09:30:00.000Z")]
    pub timestamp: String,
    /// Always `true`.
    pub success: bool,
}

/// Format an instant the way clients expect (`2024-05-01T09:30:00.000Z`).
#[must_use]
pub fn iso_timestamp(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Stateless greeting service; only the clock is injected.
#[derive(Clone)]
pub struct GreetingService {
    clock: Arc<dyn Clock>,
}

impl GreetingService {
    /// Create a service reading time from `clock`.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    /// Produce the greeting for `request`.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use leafline::domain::{GreetingRequest, GreetingService};
    /// use mockable::DefaultClock;
    ///
    /// let service = GreetingService::new(Arc::new(DefaultClock));
    /// let greeting = service.greet(&GreetingRequest::new(None));
    /// assert!(greeting.message.contains("User"));
    /// ```
    pub fn greet(&self, request: &GreetingRequest) -> Greeting {
        let timestamp = iso_timestamp(self.clock.utc());
        info!(name = request.name(), timestamp = %timestamp, "sayHello called");
        Greeting {
            message: format!("Hello, {}! Welcome to LeafLine 🌿", request.name()),
            timestamp,
            success: true,
        }
    }
}
