use actix_web::{web, HttpResponse, Result as ActixResult};
use chrono::{NaiveDate, Utc};
use validator::Validate;

use crate::errors::AppError;
use crate::models::requests::{DisasterQuery, SampleQuery};
use crate::models::responses::{AlertLevel, DisasterEvent, DisasterListPayload};
use crate::repositories::{FloodFilter, SourceSelection};
use crate::response::ApiResponse;
use crate::samples::{sample_events, DEMO_NOTE, DISASTERS_NOTE};
use crate::state::AppState;
use crate::validation::{non_empty, optional_alert_level, parse_date, validate_date_range};

const SAMPLE_SOURCE: &str = "sample";

/// Alert level and inclusive date range, then newest first.
fn filter_and_sort(
    mut events: Vec<DisasterEvent>,
    alert_level: Option<AlertLevel>,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> Vec<DisasterEvent> {
    events.retain(|e| {
        if alert_level.is_some_and(|level| e.alert_level != level) {
            return false;
        }
        let Some(date) = parse_date(&e.date) else {
            return from.is_none() && to.is_none();
        };
        from.map_or(true, |f| date >= f) && to.map_or(true, |t| date <= t)
    });
    events.sort_by(|a, b| b.date.cmp(&a.date));
    events
}

fn payload(events: Vec<DisasterEvent>, source: &str, skipped: usize) -> DisasterListPayload {
    DisasterListPayload {
        count: events.len(),
        events,
        source: source.to_string(),
        skipped,
    }
}

#[utoipa::path(
    get,
    path = "/disasters",
    tag = "Disasters",
    params(DisasterQuery),
    responses(
        (status = 200, description = "Disaster events, newest first", body = DisasterListPayload),
        (status = 400, description = "Invalid parameters"),
        (status = 500, description = "All feeds failed (strict fallback policy)")
    )
)]
pub async fn disasters(
    state: web::Data<AppState>,
    query: web::Query<DisasterQuery>,
) -> ActixResult<HttpResponse> {
    query.validate().map_err(|e| {
        AppError::Validation(format!("Validation failed: {}", e))
    })?;

    let alert_level = optional_alert_level(&query.alert_level);
    let from = non_empty(&query.from).and_then(parse_date);
    let to = non_empty(&query.to).and_then(parse_date);
    validate_date_range(from, to)?;

    let selection = SourceSelection::parse(&query.source)
        .ok_or_else(|| AppError::Validation(format!("Unknown source: {}", query.source)))?;
    let filter = FloodFilter {
        alert_level: non_empty(&query.alert_level).unwrap_or_default().to_string(),
        from: non_empty(&query.from).unwrap_or_default().to_string(),
        to: non_empty(&query.to).unwrap_or_default().to_string(),
    };
    let today = Utc::now().date_naive();

    log::info!(
        "Fetching disasters: source={} alertLevel={:?} from={:?} to={:?}",
        query.source,
        alert_level,
        from,
        to
    );

    match state.gdacs.collect_events(selection, &filter, today).await {
        Ok(collected) => {
            let events = filter_and_sort(collected.assembly.items, alert_level, from, to);
            Ok(ApiResponse::ok(payload(events, &collected.source, collected.assembly.skipped)))
        }
        Err(err) => state.config.fallback_policy.recover(err, DISASTERS_NOTE, || {
            payload(
                filter_and_sort(sample_events(today), alert_level, from, to),
                SAMPLE_SOURCE,
                0,
            )
        }),
    }
}

#[utoipa::path(
    get,
    path = "/disasters/sample",
    tag = "Disasters",
    params(SampleQuery),
    responses(
        (status = 200, description = "Fixed demonstration events", body = DisasterListPayload),
        (status = 400, description = "Invalid parameters")
    )
)]
pub async fn sample_disasters(query: web::Query<SampleQuery>) -> ActixResult<HttpResponse> {
    query.validate().map_err(|e| {
        AppError::Validation(format!("Validation failed: {}", e))
    })?;

    let events = filter_and_sort(
        sample_events(Utc::now().date_naive()),
        optional_alert_level(&query.alert_level),
        None,
        None,
    );
    Ok(ApiResponse::with_note(payload(events, SAMPLE_SOURCE, 0), DEMO_NOTE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::samples::sample_events;

    fn day(s: &str) -> Option<NaiveDate> {
        parse_date(s)
    }

    #[test]
    fn filters_by_level_and_inclusive_range() {
        let today = NaiveDate::from_ymd_opt(2025, 10, 16).unwrap();
        let events = filter_and_sort(sample_events(today), Some(AlertLevel::Orange), None, None);
        assert_eq!(events.len(), 3);
        assert!(events.iter().all(|e| e.alert_level == AlertLevel::Orange));

        let events = filter_and_sort(sample_events(today), None, day("2025-10-14"), day("2025-10-15"));
        let dates: Vec<_> = events.iter().map(|e| e.date.as_str()).collect();
        assert_eq!(dates, ["2025-10-15", "2025-10-14"]);
    }

    #[test]
    fn newest_first() {
        let today = NaiveDate::from_ymd_opt(2025, 10, 16).unwrap();
        let events = filter_and_sort(sample_events(today), None, None, None);
        assert!(events.windows(2).all(|w| w[0].date >= w[1].date));
        assert_eq!(events.len(), 6);
    }
}
