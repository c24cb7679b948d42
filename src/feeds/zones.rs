use crate::feeds::assembler::Assembly;
use crate::feeds::classifier::{explicit_population, extract_cap_magnitude, extract_depth_km};
use crate::feeds::parser::{FeedEntry, ResolvedArea};
use crate::models::{ImpactZone, ZoneGeometry};

pub(crate) const ZONE_SOURCE: &str = "GDACS-CAP";
const UNKNOWN: &str = "Unknown";

fn or_unknown(value: Option<&String>, fallback: &str) -> String {
    value
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .unwrap_or(fallback)
        .to_string()
}

/// Turns CAP-bearing entries into impact zones. Entries with no polygon,
/// circle or `geo:Point` are skipped and counted.
pub(crate) fn build_impact_zones(entries: &[FeedEntry]) -> Assembly<ImpactZone> {
    let mut assembly = Assembly::default();
    for (index, entry) in entries.iter().enumerate() {
        match impact_zone(entry, index) {
            Some(zone) => assembly.items.push(zone),
            None => {
                log::debug!("Skipping CAP entry {index} without usable geometry");
                assembly.skipped += 1;
            }
        }
    }
    assembly
}

fn impact_zone(entry: &FeedEntry, index: usize) -> Option<ImpactZone> {
    if matches!(entry, FeedEntry::GeoRss(_)) {
        return None;
    }

    let (geometry, center, radius) = match entry.resolve_area()? {
        ResolvedArea::Polygon { ring, center } => {
            (ZoneGeometry::Polygon { coordinates: vec![ring] }, center, None)
        }
        ResolvedArea::Circle { center, radius_km } => (
            ZoneGeometry::Circle {
                center: center.lon_lat(),
                radius: radius_km * 1000.0,
            },
            center,
            Some(radius_km),
        ),
        ResolvedArea::Point(_) => return None,
    };

    let info = entry.cap_info();
    let summary = entry.description().to_string();

    Some(ImpactZone {
        id: entry
            .id()
            .map(str::to_string)
            .unwrap_or_else(|| format!("gdacs_cap_{index}")),
        title: entry.title().unwrap_or("Unknown Event").to_string(),
        event_type: or_unknown(info.and_then(|i| i.event.as_ref()), UNKNOWN),
        severity: or_unknown(info.and_then(|i| i.severity.as_ref()), UNKNOWN),
        urgency: or_unknown(info.and_then(|i| i.urgency.as_ref()), UNKNOWN),
        certainty: or_unknown(info.and_then(|i| i.certainty.as_ref()), UNKNOWN),
        area_description: entry.area_description().unwrap_or("Unknown Area").to_string(),
        geometry,
        center_point: center.lon_lat(),
        radius,
        population_affected: explicit_population(&summary),
        magnitude: extract_cap_magnitude(&summary),
        depth: extract_depth_km(&summary),
        summary,
        updated: entry.published().unwrap_or_default().to_string(),
        source: ZONE_SOURCE.to_string(),
    })
}
