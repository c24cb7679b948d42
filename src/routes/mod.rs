pub mod disasters;
pub mod facilities;
pub mod gdacs_cap;
pub mod health;
pub mod ifrc;

use actix_web::{guard, web, HttpResponse};

/// Bare `OPTIONS` requests (no CORS preflight headers) still get a 200.
async fn options_ok() -> HttpResponse {
    HttpResponse::Ok().finish()
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/{tail:.*}")
            .guard(guard::Options())
            .to(options_ok),
    )
    .route("/health", web::get().to(health::health))
    .route("/disasters", web::get().to(disasters::disasters))
    .route("/disasters/sample", web::get().to(disasters::sample_disasters))
    .route("/gdacs-cap", web::get().to(gdacs_cap::impact_zones))
    .route("/health-facilities", web::get().to(facilities::health_facilities))
    .route("/ifrc-countries", web::get().to(ifrc::countries))
    .route("/ifrc-documents", web::get().to(ifrc::documents));
}
