use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema, IntoParams)]
pub struct DisasterQuery {
    #[serde(default = "default_source")]
    #[validate(custom(function = "crate::validation::validate_source_field"))]
    pub source: String,
    #[serde(rename = "alertLevel", default)]
    #[validate(custom(function = "crate::validation::validate_alert_level_field"))]
    pub alert_level: Option<String>,
    #[serde(default)]
    #[validate(custom(function = "crate::validation::validate_date_field"))]
    pub from: Option<String>,
    #[serde(default)]
    #[validate(custom(function = "crate::validation::validate_date_field"))]
    pub to: Option<String>,
}

fn default_source() -> String {
    "ALL".to_string()
}

#[derive(Debug, Deserialize, Validate, ToSchema, IntoParams)]
pub struct SampleQuery {
    #[serde(rename = "alertLevel", default)]
    #[validate(custom(function = "crate::validation::validate_alert_level_field"))]
    pub alert_level: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema, IntoParams)]
pub struct FacilityQuery {
    #[serde(default = "default_facility_limit")]
    #[validate(range(min = 1, max = 5000, message = "limit must be between 1 and 5000"))]
    pub limit: usize,
    #[serde(default)]
    pub offset: usize,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub functionality: Option<String>,
    #[serde(rename = "type", default)]
    pub facility_type: Option<String>,
}

fn default_facility_limit() -> usize {
    1000
}

#[derive(Debug, Deserialize, Validate, ToSchema, IntoParams)]
pub struct DocumentQuery {
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default = "default_page")]
    #[validate(range(min = 1, max = 10000, message = "page must be between 1 and 10000"))]
    pub page: u32,
    #[serde(default = "default_document_limit")]
    #[validate(range(min = 1, max = 100, message = "limit must be between 1 and 100"))]
    pub limit: u32,
    #[serde(default)]
    pub search: Option<String>,
}

fn default_page() -> u32 {
    1
}

fn default_document_limit() -> u32 {
    20
}
