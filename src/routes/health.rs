use actix_web::{web, HttpResponse};
use chrono::{SecondsFormat, Utc};

use crate::models::responses::{EnvCheck, HealthPayload};
use crate::response::ApiResponse;
use crate::state::AppState;

const ENDPOINTS: &[&str] = &[
    "/api/disasters - Get disaster events",
    "/api/disasters/sample - Get sample disaster events",
    "/api/gdacs-cap - Get CAP impact zones",
    "/api/health-facilities - Get health facilities data",
    "/api/ifrc-countries - Get IFRC countries",
    "/api/ifrc-documents - Get IFRC appeal documents",
    "/api/health - Health check",
];

#[utoipa::path(
    get,
    path = "/health",
    tag = "System",
    responses((status = 200, description = "Service is healthy", body = HealthPayload))
)]
pub async fn health(state: web::Data<AppState>) -> HttpResponse {
    ApiResponse::ok(HealthPayload {
        status: "ok".to_string(),
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        fallback_policy: state.config.fallback_policy.as_str().to_string(),
        env_check: EnvCheck {
            has_ifrc_token: state.ifrc.has_token(),
            ifrc_base_url: state.config.ifrc_base_url.clone(),
        },
        endpoints: ENDPOINTS.iter().map(|e| e.to_string()).collect(),
    })
}
