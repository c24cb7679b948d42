use std::env;

use crate::fallback::FallbackPolicy;

pub(crate) const API_PREFIX: &str = "/api";
pub(crate) const DEFAULT_GDACS_BASE_URL: &str = "https://www.gdacs.org";
pub(crate) const DEFAULT_IFRC_BASE_URL: &str = "https://goadmin.ifrc.org/api/v2";
const PLACEHOLDER_TOKEN: &str = "your_token_here";

/// Which upstream feeds the disasters pipeline may consult.
#[derive(Clone, Copy, Debug)]
pub(crate) struct FeedCapabilities {
    pub flood_data: bool,
    pub rss: bool,
}

impl Default for FeedCapabilities {
    fn default() -> Self {
        Self {
            flood_data: true,
            rss: true,
        }
    }
}

#[derive(Clone, Debug)]
pub(crate) struct Config {
    pub host: String,
    pub port: u16,
    pub gdacs_base_url: String,
    pub ifrc_base_url: String,
    pub ifrc_token: Option<String>,
    pub ifrc_rate_limit: usize,
    pub health_facilities_path: String,
    pub fallback_policy: FallbackPolicy,
    pub capabilities: FeedCapabilities,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 3003,
            gdacs_base_url: DEFAULT_GDACS_BASE_URL.into(),
            ifrc_base_url: DEFAULT_IFRC_BASE_URL.into(),
            ifrc_token: None,
            ifrc_rate_limit: 100,
            health_facilities_path: "health-facilities-data.json".into(),
            fallback_policy: FallbackPolicy::default(),
            capabilities: FeedCapabilities::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: env::var("API_HOST").unwrap_or(defaults.host),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            gdacs_base_url: env::var("GDACS_BASE_URL").unwrap_or(defaults.gdacs_base_url),
            ifrc_base_url: env::var("IFRC_GO_API_BASE_URL").unwrap_or(defaults.ifrc_base_url),
            ifrc_token: sanitize_token(env::var("IFRC_GO_API_TOKEN").ok()),
            ifrc_rate_limit: env::var("IFRC_RATE_LIMIT")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|&s| s > 0)
                .unwrap_or(defaults.ifrc_rate_limit),
            health_facilities_path: env::var("HEALTH_FACILITIES_PATH")
                .unwrap_or(defaults.health_facilities_path),
            fallback_policy: match env::var("FALLBACK_POLICY") {
                Ok(raw) => FallbackPolicy::parse(&raw).unwrap_or_else(|| {
                    log::warn!("Unknown FALLBACK_POLICY {raw:?}, using {}", defaults.fallback_policy.as_str());
                    defaults.fallback_policy
                }),
                Err(_) => defaults.fallback_policy,
            },
            capabilities: FeedCapabilities {
                flood_data: env::var("ENABLE_FLOOD_DATA")
                    .map(|v| !matches!(v.trim().to_ascii_lowercase().as_str(), "0" | "false" | "no"))
                    .unwrap_or(defaults.capabilities.flood_data),
                rss: defaults.capabilities.rss,
            },
        }
    }
}

/// Empty values and the `.env.example` placeholder count as "no token".
fn sanitize_token(token: Option<String>) -> Option<String> {
    token
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty() && t != PLACEHOLDER_TOKEN)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_token_is_treated_as_missing() {
        assert_eq!(sanitize_token(Some("your_token_here".into())), None);
        assert_eq!(sanitize_token(Some("   ".into())), None);
        assert_eq!(sanitize_token(None), None);
        assert_eq!(sanitize_token(Some(" abc123 ".into())), Some("abc123".into()));
    }
}
