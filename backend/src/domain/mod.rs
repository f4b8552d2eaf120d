//! Domain primitives, services and reactors.
//!
//! Purpose: hold the transport-agnostic behaviour of the callable handlers
//! and the document reactors. Inbound adapters validate raw payloads into the
//! typed requests and snapshots defined here; outbound adapters implement the
//! traits in [`ports`].
//!
//! Public surface:
//! - Error / ErrorCode: transport-agnostic failure payload.
//! - GreetingService, PlantCareService: request/response use-cases.
//! - UserEnrichmentReactor, PlantRegistrationReactor,
//!   MessageEngagementReactor: document event reactors.
//! - DeliveryPolicy, ReactionReport: how reactor results reach the dispatcher.

pub mod caller;
pub mod document;
pub mod error;
pub mod event;
pub mod greeting;
pub mod message_engagement;
pub mod plant_care;
pub mod plant_registration;
pub mod ports;
pub mod reaction;
pub mod trace_id;
pub mod user_enrichment;

pub use self::caller::{CallerIdentity, CallerIdentityValidationError};
pub use self::document::{
    is_present, Collection, DocumentFields, DocumentId, DocumentIdValidationError, DocumentPath,
    FieldWrite, FieldWrites,
};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::event::{
    DeliveryPolicy, DeliveryPolicyParseError, EventId, EventIdValidationError, ReactionReport,
    ReactorStep, StepOutcome, StepReport,
};
pub use self::greeting::{iso_timestamp, Greeting, GreetingRequest, GreetingService};
pub use self::message_engagement::{LikesChange, MessageEngagementReactor, LIKES_MILESTONE};
pub use self::plant_care::{
    require_caller, HealthScore, HealthScoreOutOfRange, PlantCareOutcome, PlantCareReport,
    PlantCareRequest, PlantCareService, PlantCareValidationError, Recommendation, SunlightLevel,
};
pub use self::plant_registration::{
    NewPlantSnapshot, PlantOwner, PlantRegistrationReactor,
};
pub use self::trace_id::{TraceId, TRACE_ID_HEADER};
pub use self::user_enrichment::{NewUserSnapshot, UserEnrichmentReactor};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use leafline::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<()> {
///     Err(Error::unauthenticated("sign in first"))
/// }
/// assert!(handler().is_err());
/// ```
pub type ApiResult<T> = Result<T, Error>;
