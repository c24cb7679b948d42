use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::feeds::classifier::{classify, explicit_population, Classification};
use crate::feeds::impact::{impact_description, radius_for};
use crate::feeds::parser::FeedEntry;
use crate::geo::Coordinate;
use crate::models::{DisasterEvent, PopulationData};
use crate::repositories::population::PopulationEstimator;

const DESCRIPTION_LIMIT: usize = 300;
pub(crate) const FEED_REPORTED_METHOD: &str = "feed_reported";

/// Items built from one upstream pass plus how many were dropped.
#[derive(Debug)]
pub(crate) struct Assembly<T> {
    pub items: Vec<T>,
    pub skipped: usize,
}

impl<T> Default for Assembly<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            skipped: 0,
        }
    }
}

impl<T> Assembly<T> {
    pub fn extend(&mut self, other: Assembly<T>) {
        self.items.extend(other.items);
        self.skipped += other.skipped;
    }
}

/// Everything known about an event before radius and population are derived.
#[derive(Clone, Debug)]
pub(crate) struct EventDraft {
    pub id: String,
    pub title: String,
    pub description: String,
    pub link: Option<String>,
    pub published: Option<String>,
    pub location: Coordinate,
    pub source: String,
    pub classification: Classification,
    pub reported_population: Option<u64>,
}

pub(crate) struct EventAssembler {
    estimator: PopulationEstimator,
    today: NaiveDate,
}

impl EventAssembler {
    pub fn new(estimator: PopulationEstimator, today: NaiveDate) -> Self {
        Self { estimator, today }
    }

    /// Feed entries that cannot be located are skipped and counted.
    pub fn from_entries(&self, entries: &[FeedEntry], id_prefix: &str, source: &str) -> Assembly<DisasterEvent> {
        let mut assembly = Assembly::default();
        for (index, entry) in entries.iter().enumerate() {
            let Some(area) = entry.resolve_area() else {
                log::debug!("Skipping unlocated feed item {index}");
                assembly.skipped += 1;
                continue;
            };

            let title = entry.title().unwrap_or("Unknown Event").to_string();
            let description = entry.description().to_string();
            let classification = classify(&title, &description, entry.gdacs_tags());
            let reported_population = explicit_population(&format!("{title} {description}"));

            assembly.items.push(self.finish(EventDraft {
                id: format!("{id_prefix}_{index}"),
                title,
                description,
                link: entry.link().map(str::to_string),
                published: entry.published().map(str::to_string),
                location: area.center(),
                source: source.to_string(),
                classification,
                reported_population,
            }));
        }
        assembly
    }

    pub fn finish(&self, draft: EventDraft) -> DisasterEvent {
        let Classification {
            alert_level,
            disaster_type,
            magnitude,
        } = draft.classification;

        let radius = radius_for(disaster_type, magnitude, draft.reported_population.unwrap_or(0));
        let population_data = match draft.reported_population {
            Some(reported) => reported_population_data(reported, radius),
            None => self.estimator.estimate(draft.location, radius),
        };
        let population = population_data.estimated_population;

        DisasterEvent {
            id: draft.id,
            title: draft.title,
            disaster_type,
            alert_level,
            latitude: draft.location.lat,
            longitude: draft.location.lon,
            magnitude,
            date: draft
                .published
                .as_deref()
                .and_then(parse_feed_date)
                .unwrap_or(self.today)
                .format("%Y-%m-%d")
                .to_string(),
            description: truncate(&draft.description, DESCRIPTION_LIMIT),
            source: draft.source,
            link: draft.link,
            affected_radius: radius,
            affected_population: population,
            impact_description: impact_description(disaster_type, magnitude, population),
            estimated_radius: radius,
            estimated_population: population,
            population_data: Some(population_data),
        }
    }
}

fn reported_population_data(population: u64, radius_km: f64) -> PopulationData {
    let area = std::f64::consts::PI * radius_km * radius_km;
    PopulationData {
        estimated_population: population,
        density: (population as f64 / area).round(),
        area: area.round(),
        method: FEED_REPORTED_METHOD,
    }
}

/// RFC 2822 (`pubDate`), RFC 3339 (`updated`), or a leading `YYYY-MM-DD`.
pub(crate) fn parse_feed_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(dt.date());
    }
    raw.get(..10)
        .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
}

pub(crate) fn truncate(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feeds::parser::{fixtures, parse_feed};
    use crate::models::{AlertLevel, DisasterType};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 10, 20).unwrap()
    }

    fn assembler() -> EventAssembler {
        EventAssembler::new(PopulationEstimator, today())
    }

    #[test]
    fn rss_feed_skips_unlocated_items() {
        let entries = parse_feed(fixtures::GDACS_RSS).unwrap().entries;
        let assembly = assembler().from_entries(&entries, "gdacs", "GDACS");

        assert_eq!(assembly.items.len(), 2);
        assert_eq!(assembly.skipped, 2);
        assert!(assembly
            .items
            .iter()
            .all(|e| !(e.latitude == 0.0 && e.longitude == 0.0)));
    }

    #[test]
    fn earthquake_event_is_fully_derived() {
        let entries = parse_feed(fixtures::GDACS_RSS).unwrap().entries;
        let events = assembler().from_entries(&entries, "gdacs", "GDACS").items;
        let quake = &events[0];

        assert_eq!(quake.id, "gdacs_0");
        assert_eq!(quake.disaster_type, DisasterType::Earthquake);
        assert_eq!(quake.alert_level, AlertLevel::Red);
        assert_eq!(quake.magnitude, Some(6.5));
        assert_eq!(quake.date, "2025-10-16");
        assert_eq!(quake.affected_radius, 100.0);
        assert_eq!(quake.estimated_radius, quake.affected_radius);

        let data = quake.population_data.as_ref().unwrap();
        assert_eq!(data.method, FEED_REPORTED_METHOD);
        assert_eq!(quake.affected_population, 2_500_000);
        assert_eq!(quake.impact_description, "2.5M people affected, Magnitude 6.5");
        assert_eq!(quake.link.as_deref(), Some("https://www.gdacs.org/report.aspx?eventid=1"));
    }

    #[test]
    fn tagged_cyclone_uses_estimator() {
        let entries = parse_feed(fixtures::GDACS_RSS).unwrap().entries;
        let events = assembler().from_entries(&entries, "gdacs", "GDACS").items;
        let storm = &events[1];

        assert_eq!(storm.id, "gdacs_1");
        assert_eq!(storm.disaster_type, DisasterType::Cyclone);
        assert_eq!(storm.alert_level, AlertLevel::Orange);
        assert_eq!(storm.magnitude, None);
        assert_eq!(storm.affected_radius, 75.0);
        let expected = PopulationEstimator.estimate(Coordinate { lat: 18.1, lon: -76.8 }, 75.0);
        assert_eq!(storm.population_data.as_ref(), Some(&expected));
        assert_eq!(storm.affected_population, expected.estimated_population);
    }

    #[test]
    fn volcano_severity_sets_radius_and_intensity() {
        let xml = r#"<rss xmlns:gdacs="http://www.gdacs.org">
  <channel>
    <item>
      <title>Green volcano alert for Kanlaon</title>
      <description>Eruption reported at 10.41, 123.13 on Negros island</description>
      <pubDate>Sat, 18 Oct 2025 06:00:00 GMT</pubDate>
      <gdacs:alertlevel>Green</gdacs:alertlevel>
      <gdacs:eventtype>VO</gdacs:eventtype>
      <gdacs:severity value="3">VEI 3</gdacs:severity>
    </item>
  </channel>
</rss>"#;
        let entries = parse_feed(xml).unwrap().entries;
        let assembly = assembler().from_entries(&entries, "gdacs", "GDACS");

        assert_eq!(assembly.skipped, 0);
        let volcano = &assembly.items[0];
        assert_eq!(volcano.disaster_type, DisasterType::VolcanicActivity);
        assert_eq!((volcano.latitude, volcano.longitude), (10.41, 123.13));
        assert_eq!(volcano.magnitude, Some(3.0));
        assert_eq!(volcano.affected_radius, 50.0);
        assert!(volcano.impact_description.ends_with("Intensity 3"));
    }

    #[test]
    fn missing_date_defaults_to_today() {
        let draft = EventDraft {
            id: "x_0".into(),
            title: "Drought".into(),
            description: String::new(),
            link: None,
            published: Some("sometime last week".into()),
            location: Coordinate { lat: 5.0, lon: 45.0 },
            source: "GDACS".into(),
            classification: Classification {
                alert_level: AlertLevel::Green,
                disaster_type: DisasterType::Drought,
                magnitude: None,
            },
            reported_population: None,
        };
        let event = assembler().finish(draft);
        assert_eq!(event.date, "2025-10-20");
        assert_eq!(event.affected_radius, 200.0);
    }

    #[test]
    fn feed_dates() {
        let d = |s| parse_feed_date(s).map(|d| d.to_string());
        assert_eq!(d("Thu, 16 Oct 2025 10:00:00 GMT").as_deref(), Some("2025-10-16"));
        assert_eq!(d("2025-10-16T08:00:00Z").as_deref(), Some("2025-10-16"));
        assert_eq!(d("2025-10-16 08:00:00").as_deref(), Some("2025-10-16"));
        assert_eq!(d("2025-10-16T08:00").as_deref(), Some("2025-10-16"));
        assert_eq!(d("16/10/2025"), None);
    }

    #[test]
    fn long_descriptions_are_cut() {
        let long = "é".repeat(310);
        let cut = truncate(&long, 300);
        assert_eq!(cut.chars().count(), 303);
        assert!(cut.ends_with("..."));
        assert_eq!(truncate("short", 300), "short");
    }
}
