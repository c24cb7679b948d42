use std::sync::Arc;

use crate::config::Config;
use crate::fetcher::Fetch;
use crate::rate_limit::SlidingWindowLimiter;
use crate::repositories::{FacilityRepository, GdacsRepository, IfrcClient};

/// Shared across workers through `web::Data`.
pub(crate) struct AppState {
    pub config: Config,
    pub gdacs: GdacsRepository,
    pub ifrc: IfrcClient,
    pub facilities: FacilityRepository,
}

impl AppState {
    pub fn new(config: Config, fetcher: Arc<dyn Fetch>) -> Self {
        let gdacs = GdacsRepository::new(fetcher.clone(), &config.gdacs_base_url, config.capabilities);
        let ifrc = IfrcClient::new(
            fetcher,
            &config.ifrc_base_url,
            config.ifrc_token.clone(),
            SlidingWindowLimiter::per_hour(config.ifrc_rate_limit),
        );
        let facilities = FacilityRepository::new(&config.health_facilities_path);
        Self {
            config,
            gdacs,
            ifrc,
            facilities,
        }
    }
}
