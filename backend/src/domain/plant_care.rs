//! Plant-care advice behind the `processPlantData` callable.
//!
//! Input is validated once into [`PlantCareRequest`]; the service then works
//! on typed fields only. Advice rules are independent: one watering rule and
//! one sunlight rule may both fire, and the two watering thresholds can never
//! fire together.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::json;
use tracing::info;
use utoipa::ToSchema;

use crate::domain::ports::HealthScoreSource;
use crate::domain::{CallerIdentity, Error};

/// Message returned for missing required fields.
pub const MISSING_FIELDS_MESSAGE: &str = "Plant name and watering frequency are required.";
/// Message returned when no caller identity accompanies the request.
pub const UNAUTHENTICATED_MESSAGE: &str = "User must be authenticated to process plant data.";
/// Message returned alongside a successful report.
pub const PROCESSED_MESSAGE: &str = "Plant data processed successfully!";

const DEFAULT_SUNLIGHT: &str = "medium";
const UNDERWATERED_BELOW: f64 = 2.0;
const OVERWATERED_ABOVE: f64 = 7.0;

/// Require an authenticated caller.
///
/// # Examples
/// ```
/// use leafline::domain::{require_caller, CallerIdentity, ErrorCode};
///
/// let err = require_caller(None).expect_err("anonymous callers are rejected");
/// assert_eq!(err.code(), ErrorCode::Unauthenticated);
/// let caller = CallerIdentity::new("uid-1").expect("valid uid");
/// assert!(require_caller(Some(caller)).is_ok());
/// ```
pub fn require_caller(caller: Option<CallerIdentity>) -> Result<CallerIdentity, Error> {
    caller.ok_or_else(|| Error::unauthenticated(UNAUTHENTICATED_MESSAGE))
}

/// Field-level validation failures for [`PlantCareRequest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PlantCareValidationError {
    /// `plantName` was absent or blank.
    #[error("plant name is required")]
    MissingPlantName,
    /// `wateringFrequency` was absent or zero.
    #[error("watering frequency is required")]
    MissingWateringFrequency,
    /// `wateringFrequency` was negative or not finite.
    #[error("watering frequency must be a positive number of times per week")]
    InvalidWateringFrequency,
}

impl PlantCareValidationError {
    const fn field(self) -> &'static str {
        match self {
            Self::MissingPlantName => "plantName",
            Self::MissingWateringFrequency | Self::InvalidWateringFrequency => {
                "wateringFrequency"
            }
        }
    }

    const fn code(self) -> &'static str {
        match self {
            Self::MissingPlantName | Self::MissingWateringFrequency => "missing",
            Self::InvalidWateringFrequency => "out_of_range",
        }
    }
}

impl From<PlantCareValidationError> for Error {
    fn from(value: PlantCareValidationError) -> Self {
        Self::invalid_argument(MISSING_FIELDS_MESSAGE).with_details(json!({
            "field": value.field(),
            "code": value.code(),
        }))
    }
}

/// Reported light exposure. Only `low` and `high` change the advice; any other
/// label is kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SunlightLevel {
    /// `low`
    Low,
    /// `medium`, the default.
    Medium,
    /// `high`
    High,
    /// Any other label supplied by the client.
    Other(String),
}

impl SunlightLevel {
    /// Label as echoed back to the client.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Low => "low",
            Self::Medium => DEFAULT_SUNLIGHT,
            Self::High => "high",
            Self::Other(label) => label.as_str(),
        }
    }
}

impl From<Option<String>> for SunlightLevel {
    fn from(value: Option<String>) -> Self {
        let Some(label) = value else {
            return Self::Medium;
        };
        match label.as_str() {
            "" | DEFAULT_SUNLIGHT => Self::Medium,
            "low" => Self::Low,
            "high" => Self::High,
            _ => Self::Other(label),
        }
    }
}

impl Serialize for SunlightLevel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Validated `processPlantData` input.
#[derive(Debug, Clone, PartialEq)]
pub struct PlantCareRequest {
    plant_name: String,
    watering_frequency: f64,
    sunlight_level: SunlightLevel,
}

impl PlantCareRequest {
    /// Validate raw fields.
    ///
    /// # Examples
    /// ```
    /// use leafline::domain::{PlantCareRequest, PlantCareValidationError};
    ///
    /// let request = PlantCareRequest::new(Some("Aloe".into()), Some(1.0), None)
    ///     .expect("valid request");
    /// assert_eq!(request.sunlight_level().as_str(), "medium");
    /// assert_eq!(
    ///     PlantCareRequest::new(None, Some(3.0), None),
    ///     Err(PlantCareValidationError::MissingPlantName),
    /// );
    /// ```
    pub fn new(
        plant_name: Option<String>,
        watering_frequency: Option<f64>,
        sunlight_level: Option<String>,
    ) -> Result<Self, PlantCareValidationError> {
        let plant_name = plant_name
            .filter(|name| !name.trim().is_empty())
            .ok_or(PlantCareValidationError::MissingPlantName)?;
        let watering_frequency = match watering_frequency {
            None => return Err(PlantCareValidationError::MissingWateringFrequency),
            Some(value) if value == 0.0 => {
                return Err(PlantCareValidationError::MissingWateringFrequency);
            }
            Some(value) if !value.is_finite() || value < 0.0 => {
                return Err(PlantCareValidationError::InvalidWateringFrequency);
            }
            Some(value) => value,
        };
        Ok(Self {
            plant_name,
            watering_frequency,
            sunlight_level: SunlightLevel::from(sunlight_level),
        })
    }

    /// Plant name as supplied.
    #[must_use]
    pub fn plant_name(&self) -> &str {
        self.plant_name.as_str()
    }

    /// Waterings per week.
    #[must_use]
    pub const fn watering_frequency(&self) -> f64 {
        self.watering_frequency
    }

    /// Light exposure, defaulted to medium.
    #[must_use]
    pub const fn sunlight_level(&self) -> &SunlightLevel {
        &self.sunlight_level
    }

    /// Advice for this plant, watering first, then sunlight.
    #[must_use]
    pub fn recommendations(&self) -> Vec<Recommendation> {
        let watering = if self.watering_frequency < UNDERWATERED_BELOW {
            Some(Recommendation::WaterMoreOften)
        } else if self.watering_frequency > OVERWATERED_ABOVE {
            Some(Recommendation::AvoidOverwatering)
        } else {
            None
        };
        let sunlight = match self.sunlight_level {
            SunlightLevel::Low => Some(Recommendation::MoreSunlight),
            SunlightLevel::High => Some(Recommendation::AvoidScorching),
            SunlightLevel::Medium | SunlightLevel::Other(_) => None,
        };
        watering.into_iter().chain(sunlight).collect()
    }
}

/// One piece of care advice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ToSchema)]
pub enum Recommendation {
    /// Watered less than twice a week.
    WaterMoreOften,
    /// Watered more than seven times a week.
    AvoidOverwatering,
    /// Kept in low light.
    MoreSunlight,
    /// Kept in strong direct light.
    AvoidScorching,
}

impl Recommendation {
    /// Advice text shown to the user.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::WaterMoreOften => "Consider watering more frequently for optimal growth",
            Self::AvoidOverwatering => "Be careful not to overwater - this could cause root rot",
            Self::MoreSunlight => "This plant may need more sunlight exposure",
            Self::AvoidScorching => "Ensure the plant doesn't get scorched by direct sun",
        }
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

impl Serialize for Recommendation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.message())
    }
}

/// Error raised for a score outside `[HealthScore::MIN, HealthScore::MAX]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("health score {0} outside {min}..={max}", min = HealthScore::MIN, max = HealthScore::MAX)]
pub struct HealthScoreOutOfRange(pub u8);

/// Stand-in plant health score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "u8", into = "u8")]
#[schema(value_type = u8)]
pub struct HealthScore(u8);

impl HealthScore {
    /// Lowest score, inclusive.
    pub const MIN: u8 = 70;
    /// Highest score, inclusive.
    pub const MAX: u8 = 100;
    /// The lowest score as a value.
    pub const MIN_SCORE: Self = Self(Self::MIN);

    /// Validate a raw score.
    pub const fn new(value: u8) -> Result<Self, HealthScoreOutOfRange> {
        if value < Self::MIN || value > Self::MAX {
            return Err(HealthScoreOutOfRange(value));
        }
        Ok(Self(value))
    }

    /// Raw score.
    #[must_use]
    pub const fn value(self) -> u8 {
        self.0
    }
}

impl From<HealthScore> for u8 {
    fn from(value: HealthScore) -> Self {
        value.0
    }
}

impl TryFrom<u8> for HealthScore {
    type Error = HealthScoreOutOfRange;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Processed plant data returned to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlantCareReport {
    /// Plant name as supplied.
    pub plant_name: String,
    /// Waterings per week as supplied.
    pub watering_frequency: f64,
    /// Light exposure, defaulted to `medium`.
    #[schema(value_type = String, example = "medium")]
    pub sunlight_level: SunlightLevel,
    /// Stand-in score in `[70, 100]`.
    #[schema(value_type = u8, minimum = 70, maximum = 100)]
    pub health_score: HealthScore,
    /// Advice, possibly empty.
    #[schema(value_type = Vec<String>)]
    pub recommendations: Vec<Recommendation>,
    /// Server-side processing instant.
    pub processed_at: DateTime<Utc>,
    /// Uid of the caller.
    pub processed_by: String,
}

/// Envelope around [`PlantCareReport`].
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct PlantCareOutcome {
    /// Always `true`.
    pub success: bool,
    /// Processed fields.
    pub data: PlantCareReport,
    /// Human-readable confirmation.
    #[schema(example = "Plant data processed successfully!")]
    pub message: String,
}

/// Plant-care advice service. Persists nothing.
#[derive(Clone)]
pub struct PlantCareService {
    scores: Arc<dyn HealthScoreSource>,
    clock: Arc<dyn Clock>,
}

impl PlantCareService {
    /// Create the service with its score source and clock.
    pub fn new(scores: Arc<dyn HealthScoreSource>, clock: Arc<dyn Clock>) -> Self {
        Self { scores, clock }
    }

    /// Build advice for `request` on behalf of `caller`.
    pub fn process(&self, caller: &CallerIdentity, request: PlantCareRequest) -> PlantCareOutcome {
        info!(
            plant_name = request.plant_name(),
            watering_frequency = request.watering_frequency(),
            sunlight_level = request.sunlight_level().as_str(),
            caller = caller.uid(),
            "processing plant data"
        );
        let recommendations = request.recommendations();
        let PlantCareRequest {
            plant_name,
            watering_frequency,
            sunlight_level,
        } = request;
        PlantCareOutcome {
            success: true,
            data: PlantCareReport {
                plant_name,
                watering_frequency,
                sunlight_level,
                health_score: self.scores.next_score(),
                recommendations,
                processed_at: self.clock.utc(),
                processed_by: caller.uid().to_owned(),
            },
            message: PROCESSED_MESSAGE.to_owned(),
        }
    }
}
