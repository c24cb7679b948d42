mod config;
mod errors;
mod fallback;
mod feeds;
mod fetcher;
mod geo;
mod models;
mod rate_limit;
mod repositories;
mod response;
mod routes;
mod samples;
mod state;
mod validation;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use env_logger::Env;
use std::sync::Arc;
use utoipa::openapi::Server;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::API_PREFIX;
use crate::fetcher::HttpFetcher;
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "DisasterMap API",
        description = "Aggregates live disaster alerts for a map front-end.\n\n\
            Data sources: GDACS RSS, CAP and flood-merge feeds, IFRC GO appeals, \
            a local health-facility dataset. Every upstream-backed endpoint can \
            degrade to bundled sample data (FALLBACK_POLICY=sample, the default) \
            or report the failure (FALLBACK_POLICY=strict).",
        version = "1.0.0"
    ),
    paths(
        routes::health::health,
        routes::disasters::disasters,
        routes::disasters::sample_disasters,
        routes::gdacs_cap::impact_zones,
        routes::facilities::health_facilities,
        routes::ifrc::countries,
        routes::ifrc::documents,
    ),
    components(schemas(
        models::DisasterQuery, models::SampleQuery, models::FacilityQuery, models::DocumentQuery,
        models::AlertLevel, models::DisasterType, models::PopulationData, models::DisasterEvent,
        models::ImpactZone, models::FacilityType, models::Functionality, models::HealthFacility,
        models::IfrcCountry, models::AppealRef, models::IfrcDocument,
        models::HealthPayload, models::EnvCheck,
        models::DisasterListPayload, models::ImpactZoneListPayload, models::FacilityListPayload,
        models::CountryListPayload, models::DocumentListPayload,
    )),
    tags(
        (name = "System", description = "Health and status"),
        (name = "Disasters", description = "GDACS events and CAP impact zones"),
        (name = "Health Facilities", description = "Local health-facility dataset"),
        (name = "IFRC", description = "IFRC GO countries and appeal documents"),
    )
)]
struct ApiDoc;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format_timestamp_secs()
        .init();
    let cfg = config::Config::from_env();

    let fetcher = HttpFetcher::new().map_err(|e| std::io::Error::other(e.to_string()))?;
    let state = web::Data::new(AppState::new(cfg.clone(), Arc::new(fetcher)));

    if !state.ifrc.has_token() {
        log::warn!("IFRC_GO_API_TOKEN not set; IFRC endpoints will not reach upstream");
    }
    log::info!(
        "Fallback policy: {}, flood data: {}",
        cfg.fallback_policy.as_str(),
        if cfg.capabilities.flood_data { "enabled" } else { "disabled" }
    );

    let bind = format!("{}:{}", cfg.host, cfg.port);
    log::info!("Starting DisasterMap API on {bind}");
    log::info!("Swagger UI: http://{bind}{API_PREFIX}/docs/");

    let mut openapi = ApiDoc::openapi();
    openapi.servers = Some(vec![Server::new(API_PREFIX)]);

    let openapi_url: &'static str = Box::leak(format!("{API_PREFIX}/openapi.json").into_boxed_str());
    let docs_path: &'static str = Box::leak(format!("{API_PREFIX}/docs/{{_:.*}}").into_boxed_str());

    HttpServer::new(move || {
        App::new()
            .wrap(
                Logger::new(r#"%a "%r" %s %b %Dms "%{User-Agent}i""#)
                    .exclude("/api/health"),
            )
            .wrap(Cors::permissive())
            .app_data(state.clone())
            .service(SwaggerUi::new(docs_path).url(openapi_url, openapi.clone()))
            .service(web::scope(API_PREFIX).configure(routes::configure_routes))
    })
    .bind(&bind)?
    .run()
    .await
}
