use actix_web::{web, HttpResponse, Result as ActixResult};
use validator::Validate;

use crate::errors::AppError;
use crate::models::requests::FacilityQuery;
use crate::models::responses::FacilityListPayload;
use crate::repositories::FacilityFilter;
use crate::response::ApiResponse;
use crate::samples::{sample_facilities, FACILITIES_NOTE};
use crate::state::AppState;
use crate::validation::non_empty;

#[utoipa::path(
    get,
    path = "/health-facilities",
    tag = "Health Facilities",
    params(FacilityQuery),
    responses(
        (status = 200, description = "Filtered page of facilities", body = FacilityListPayload),
        (status = 400, description = "Invalid parameters"),
        (status = 404, description = "Dataset missing (strict fallback policy)")
    )
)]
pub async fn health_facilities(
    state: web::Data<AppState>,
    query: web::Query<FacilityQuery>,
) -> ActixResult<HttpResponse> {
    query.validate().map_err(|e| {
        AppError::Validation(format!("Validation failed: {}", e))
    })?;

    let filter = FacilityFilter {
        country: non_empty(&query.country).map(str::to_string),
        functionality: non_empty(&query.functionality).map(str::to_string),
        facility_type: non_empty(&query.facility_type).map(str::to_string),
    };

    match state.facilities.load().await {
        Ok(facilities) => Ok(ApiResponse::ok(filter.page(facilities, query.limit, query.offset))),
        Err(err) => state.config.fallback_policy.recover(err, FACILITIES_NOTE, || {
            filter.page(sample_facilities(), query.limit, query.offset)
        }),
    }
}
