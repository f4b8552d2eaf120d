//! `processPlantData` callable.
//!
//! ```text
//! POST /processPlantData {"data":{"plantName":"Aloe","wateringFrequency":1,"sunlightLevel":"low"}}
//! Authorization: Bearer <token>
//! ```

use actix_web::{post, web};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use utoipa::ToSchema;

use crate::domain::plant_care::MISSING_FIELDS_MESSAGE;
use crate::domain::{
    Error, PlantCareOutcome, PlantCareRequest, PlantCareValidationError, require_caller,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::caller::CallerContext;
use crate::inbound::http::callable::{CallableRequest, CallableResponse};
use crate::inbound::http::error::ErrorEnvelope;
use crate::inbound::http::state::HttpState;

/// Arguments of `processPlantData`.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlantData {
    /// Plant name; required.
    #[schema(example = "Aloe")]
    pub plant_name: Option<String>,
    /// Waterings per week; required and positive.
    #[schema(example = 1.0)]
    pub watering_frequency: Option<f64>,
    /// `low`, `medium` (default) or `high`.
    #[schema(example = "low")]
    pub sunlight_level: Option<String>,
}

impl TryFrom<PlantData> for PlantCareRequest {
    type Error = PlantCareValidationError;

    fn try_from(value: PlantData) -> Result<Self, Self::Error> {
        Self::new(value.plant_name, value.watering_frequency, value.sunlight_level)
    }
}

fn parse_plant_data(raw: Value) -> Result<PlantData, Error> {
    if raw.is_null() {
        return Ok(PlantData::default());
    }
    serde_json::from_value(raw).map_err(|err| {
        Error::invalid_argument(MISSING_FIELDS_MESSAGE)
            .with_details(json!({"reason": err.to_string()}))
    })
}

/// Produce care advice for one plant. Requires an authenticated caller.
///
/// The caller check runs before the arguments are inspected, so anonymous
/// calls fail with `UNAUTHENTICATED` whatever their payload.
#[utoipa::path(
    post,
    path = "/processPlantData",
    request_body = CallableRequest<PlantData>,
    responses(
        (status = 200, description = "Care advice", body = CallableResponse<PlantCareOutcome>),
        (status = 400, description = "Missing or invalid arguments", body = ErrorEnvelope),
        (status = 401, description = "No or rejected identity token", body = ErrorEnvelope),
        (status = 503, description = "Identity provider unavailable", body = ErrorEnvelope)
    ),
    tags = ["callable"],
    operation_id = "processPlantData",
    security(("BearerToken" = []))
)]
#[post("/processPlantData")]
pub async fn process_plant_data(
    state: web::Data<HttpState>,
    caller: CallerContext,
    payload: web::Json<CallableRequest<Value>>,
) -> ApiResult<web::Json<CallableResponse<PlantCareOutcome>>> {
    let caller = require_caller(caller.into_identity())?;
    let data = parse_plant_data(payload.into_inner().data.unwrap_or(Value::Null))?;
    let request = PlantCareRequest::try_from(data)?;
    Ok(CallableResponse::json(state.plant_care.process(&caller, request)))
}
