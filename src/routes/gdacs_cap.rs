use actix_web::{web, HttpResponse, Result as ActixResult};

use crate::models::responses::ImpactZoneListPayload;
use crate::repositories::gdacs::CAP_SOURCE;
use crate::response::ApiResponse;
use crate::samples::{sample_impact_zones, CAP_NOTE};
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/gdacs-cap",
    tag = "Disasters",
    responses(
        (status = 200, description = "CAP impact zones (sample zones with a note when the feed is down)",
            body = ImpactZoneListPayload),
        (status = 500, description = "Feed unavailable (strict fallback policy)")
    )
)]
pub async fn impact_zones(state: web::Data<AppState>) -> ActixResult<HttpResponse> {
    match state.gdacs.impact_zones().await {
        Ok(assembly) => Ok(ApiResponse::ok(ImpactZoneListPayload {
            count: assembly.items.len(),
            impact_zones: assembly.items,
            source: CAP_SOURCE.to_string(),
            skipped: assembly.skipped,
        })),
        Err(err) => state.config.fallback_policy.recover(err, CAP_NOTE, || {
            let zones = sample_impact_zones();
            ImpactZoneListPayload {
                count: zones.len(),
                impact_zones: zones,
                source: "sample".to_string(),
                skipped: 0,
            }
        }),
    }
}
