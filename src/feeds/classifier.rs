use regex::Regex;
use std::sync::LazyLock;

use crate::feeds::parser::GdacsTags;
use crate::models::{AlertLevel, DisasterType};

static MAGNITUDE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)magnitude\s*(\d+\.?\d*)").expect("magnitude pattern"));
static CAP_MAGNITUDE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)magnitude[\s:]*(\d+\.?\d*)").expect("cap magnitude pattern"));
static DEPTH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)depth[\s:]*(\d+\.?\d*)\s*km").expect("depth pattern"));
static MILLIONS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*million").expect("million pattern"));
static THOUSANDS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d+(?:,\d+)*)\s*thousand").expect("thousand pattern"));
static AFFECTING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)affecting\s*(\d+(?:,\d+)*)").expect("affecting pattern"));

const RED_PHRASES: &[&str] = &["red alert", "red ", "severity: red", "alert level: red"];
const ORANGE_PHRASES: &[&str] = &[
    "orange alert",
    "orange ",
    "severity: orange",
    "alert level: orange",
];
const GREEN_PHRASES: &[&str] = &[
    "green alert",
    "green ",
    "severity: green",
    "alert level: green",
];

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Classification {
    pub alert_level: AlertLevel,
    pub disaster_type: DisasterType,
    /// Earthquake magnitude from the text (else the GDACS severity); for
    /// other types the GDACS severity read as an intensity.
    pub magnitude: Option<f64>,
}

/// Structured GDACS tags win over anything inferred from free text.
pub(crate) fn classify(title: &str, description: &str, tags: GdacsTags<'_>) -> Classification {
    let text = format!("{title} {description}");
    let lowered = text.to_lowercase();

    let disaster_type = tags
        .event_type
        .and_then(type_from_event_code)
        .unwrap_or_else(|| type_from_title(title));

    let stated_magnitude = extract_magnitude(&text);
    let alert_level = tags
        .alert_level
        .and_then(AlertLevel::parse)
        .or_else(|| alert_from_phrases(&lowered))
        .or_else(|| stated_magnitude.and_then(alert_from_magnitude))
        .unwrap_or_default();

    let magnitude = if disaster_type == DisasterType::Earthquake {
        stated_magnitude.or(tags.severity)
    } else {
        tags.severity
    };

    Classification {
        alert_level,
        disaster_type,
        magnitude: magnitude.filter(|m| *m > 0.0),
    }
}

fn alert_from_phrases(lowered: &str) -> Option<AlertLevel> {
    [
        (AlertLevel::Red, RED_PHRASES),
        (AlertLevel::Orange, ORANGE_PHRASES),
        (AlertLevel::Green, GREEN_PHRASES),
    ]
    .into_iter()
    .find(|(_, phrases)| phrases.iter().any(|p| lowered.contains(p)))
    .map(|(level, _)| level)
}

fn alert_from_magnitude(magnitude: f64) -> Option<AlertLevel> {
    if (6.0..10.0).contains(&magnitude) {
        Some(AlertLevel::Red)
    } else if (5.0..6.0).contains(&magnitude) {
        Some(AlertLevel::Orange)
    } else {
        None
    }
}

pub(crate) fn type_from_event_code(code: &str) -> Option<DisasterType> {
    match code.trim().to_ascii_uppercase().as_str() {
        "EQ" => Some(DisasterType::Earthquake),
        "FL" => Some(DisasterType::Flood),
        "TC" => Some(DisasterType::Cyclone),
        "WF" => Some(DisasterType::Wildfire),
        "VO" => Some(DisasterType::VolcanicActivity),
        "DR" => Some(DisasterType::Drought),
        "TS" => Some(DisasterType::Tsunami),
        _ => None,
    }
}

pub(crate) fn type_from_title(title: &str) -> DisasterType {
    let title = title.to_lowercase();
    let has = |words: &[&str]| words.iter().any(|w| title.contains(w));

    if has(&["earthquake"]) {
        DisasterType::Earthquake
    } else if has(&["flood"]) {
        DisasterType::Flood
    } else if has(&["cyclone", "hurricane", "typhoon"]) {
        DisasterType::Cyclone
    } else if has(&["fire"]) {
        DisasterType::Wildfire
    } else if has(&["volcano", "volcanic"]) {
        DisasterType::VolcanicActivity
    } else if has(&["drought"]) {
        DisasterType::Drought
    } else if has(&["tsunami"]) {
        DisasterType::Tsunami
    } else {
        DisasterType::Other
    }
}

fn first_number(re: &Regex, text: &str) -> Option<f64> {
    re.captures(text)?
        .get(1)?
        .as_str()
        .replace(',', "")
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

pub(crate) fn extract_magnitude(text: &str) -> Option<f64> {
    first_number(&MAGNITUDE, text)
}

/// CAP summaries write `Magnitude: 5.2M` as well as `Magnitude 5.2M`.
pub(crate) fn extract_cap_magnitude(text: &str) -> Option<f64> {
    first_number(&CAP_MAGNITUDE, text)
}

pub(crate) fn extract_depth_km(text: &str) -> Option<f64> {
    first_number(&DEPTH, text)
}

/// Population the feed states outright, e.g. "1.2 million", "250 thousand"
/// or "affecting 12,000".
pub(crate) fn explicit_population(text: &str) -> Option<u64> {
    let people = first_number(&MILLIONS, text)
        .map(|m| m * 1_000_000.0)
        .or_else(|| first_number(&THOUSANDS, text).map(|t| t * 1_000.0))
        .or_else(|| first_number(&AFFECTING, text))?;
    let people = people.round();
    (people > 0.0).then_some(people as u64)
}
