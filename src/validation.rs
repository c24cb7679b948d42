use chrono::NaiveDate;
use validator::ValidationError;

use crate::errors::AppError;
use crate::models::AlertLevel;

pub const VALID_SOURCES: &[&str] = &["ALL", "RSS", "DFO", "GPM", "DFOMERGE"];

pub fn validate_source_field(source: &str) -> Result<(), ValidationError> {
    let normalized = source.trim().to_uppercase();
    if !VALID_SOURCES.contains(&normalized.as_str()) {
        return Err(ValidationError::new("source"));
    }
    Ok(())
}

/// Empty values are accepted: the front-end sends `alertLevel=` for "any".
pub fn validate_alert_level_field(level: &str) -> Result<(), ValidationError> {
    if level.trim().is_empty() || AlertLevel::parse(level).is_some() {
        return Ok(());
    }
    Err(ValidationError::new("alertLevel"))
}

pub fn validate_date_field(date: &str) -> Result<(), ValidationError> {
    if date.trim().is_empty() || parse_date(date).is_some() {
        return Ok(());
    }
    Err(ValidationError::new("date"))
}

pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}

/// Treats `Some("")` the same as an absent parameter.
pub fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

pub fn optional_alert_level(raw: &Option<String>) -> Option<AlertLevel> {
    non_empty(raw).and_then(AlertLevel::parse)
}

pub fn validate_date_range(from: Option<NaiveDate>, to: Option<NaiveDate>) -> Result<(), AppError> {
    if let (Some(from), Some(to)) = (from, to) {
        if from > to {
            return Err(AppError::Validation(format!(
                "Invalid date range: from ({from}) is after to ({to})"
            )));
        }
    }
    Ok(())
}
