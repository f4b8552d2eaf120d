//! Callable wire envelopes.
//!
//! Requests arrive as `{"data": {...}}` where `data` may be omitted or
//! `null`; successes answer `{"result": {...}}`. Failures use
//! [`ErrorEnvelope`](super::error::ErrorEnvelope).

use actix_web::web;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::error::json_error_handler;

/// Request envelope of a callable.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
pub struct CallableRequest<T> {
    /// Call arguments.
    #[serde(default)]
    pub data: Option<T>,
}

impl<T: Default> CallableRequest<T> {
    /// Arguments, defaulted when absent or `null`.
    pub fn into_data(self) -> T {
        self.data.unwrap_or_default()
    }
}

/// Success envelope of a callable.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CallableResponse<T> {
    /// Call result.
    pub result: T,
}

impl<T> CallableResponse<T> {
    /// Wrap `result` for the wire.
    pub fn json(result: T) -> web::Json<Self> {
        web::Json(Self { result })
    }
}

/// JSON extractor configuration shared by every route: malformed bodies
/// answer with an `INVALID_ARGUMENT` envelope.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(json_error_handler)
}
