//! Fixed datasets served when an upstream is unavailable and the fallback
//! policy allows degrading.

use chrono::{Days, NaiveDate, SecondsFormat, Utc};

use crate::feeds::impact::impact_description;
use crate::models::{
    AlertLevel, AppealRef, DisasterEvent, DisasterType, FacilityType, Functionality,
    HealthFacility, IfrcCountry, IfrcDocument, ImpactZone, ZoneGeometry,
};

pub(crate) const DISASTERS_NOTE: &str = "Using sample data - GDACS feeds temporarily unavailable";
pub(crate) const DEMO_NOTE: &str = "This is sample data for demonstration purposes";
pub(crate) const CAP_NOTE: &str = "Using sample data - GDACS CAP XML temporarily unavailable";
pub(crate) const FACILITIES_NOTE: &str =
    "Using sample data - health facilities dataset unavailable";
pub(crate) const IFRC_NOTE: &str = "Using sample data - IFRC API temporarily unavailable";

struct SampleEvent {
    title: &'static str,
    disaster_type: DisasterType,
    alert_level: AlertLevel,
    lat: f64,
    lon: f64,
    days_ago: u64,
    description: &'static str,
    source: &'static str,
    magnitude: Option<f64>,
    radius: f64,
    population: u64,
}

const SAMPLE_EVENTS: [SampleEvent; 6] = [
    SampleEvent {
        title: "Flood Alert - Bangladesh (Brahmaputra River)",
        disaster_type: DisasterType::Flood,
        alert_level: AlertLevel::Red,
        lat: 25.2677,
        lon: 89.9376,
        days_ago: 0,
        description: "Severe flooding along Brahmaputra River affecting multiple districts in northern Bangladesh.",
        source: "DFO",
        magnitude: Some(8.5),
        radius: 150.0,
        population: 10_000_000,
    },
    SampleEvent {
        title: "Earthquake M6.2 - Turkey (Eastern Anatolia)",
        disaster_type: DisasterType::Earthquake,
        alert_level: AlertLevel::Orange,
        lat: 38.7312,
        lon: 35.4826,
        days_ago: 1,
        description: "Moderate earthquake in Eastern Anatolia region with potential for aftershocks.",
        source: "RSS",
        magnitude: Some(6.2),
        radius: 100.0,
        population: 800_000,
    },
    SampleEvent {
        title: "Tropical Cyclone SARAH - Philippines",
        disaster_type: DisasterType::Cyclone,
        alert_level: AlertLevel::Red,
        lat: 14.7563,
        lon: 121.0583,
        days_ago: 0,
        description: "Category 3 tropical cyclone approaching Luzon with winds up to 185 km/h.",
        source: "RSS",
        magnitude: Some(3.0),
        radius: 200.0,
        population: 5_200_000,
    },
    SampleEvent {
        title: "Precipitation Alert - Horn of Africa",
        disaster_type: DisasterType::Precipitation,
        alert_level: AlertLevel::Orange,
        lat: 9.1450,
        lon: 40.4897,
        days_ago: 2,
        description: "Heavy precipitation events detected across Horn of Africa region.",
        source: "GPM",
        magnitude: Some(6.2),
        radius: 50.0,
        population: 300_000,
    },
    SampleEvent {
        title: "Volcanic Activity - Mount Merapi, Indonesia",
        disaster_type: DisasterType::VolcanicActivity,
        alert_level: AlertLevel::Green,
        lat: -7.5407,
        lon: 110.4456,
        days_ago: 3,
        description: "Increased volcanic activity detected at Mount Merapi with elevated monitoring.",
        source: "RSS",
        magnitude: None,
        radius: 25.0,
        population: 75_000,
    },
    SampleEvent {
        title: "Wildfire - California Central Valley",
        disaster_type: DisasterType::Wildfire,
        alert_level: AlertLevel::Orange,
        lat: 36.7378,
        lon: -119.7871,
        days_ago: 0,
        description: "Large wildfire burning across central California with evacuation warnings.",
        source: "RSS",
        magnitude: None,
        radius: 20.0,
        population: 180_000,
    },
];

/// Six representative events dated relative to `today`.
pub(crate) fn sample_events(today: NaiveDate) -> Vec<DisasterEvent> {
    SAMPLE_EVENTS
        .iter()
        .enumerate()
        .map(|(i, s)| DisasterEvent {
            id: format!("gdacs_sample_{}", i + 1),
            title: s.title.to_string(),
            disaster_type: s.disaster_type,
            alert_level: s.alert_level,
            latitude: s.lat,
            longitude: s.lon,
            magnitude: s.magnitude,
            date: today
                .checked_sub_days(Days::new(s.days_ago))
                .unwrap_or(today)
                .format("%Y-%m-%d")
                .to_string(),
            description: s.description.to_string(),
            source: s.source.to_string(),
            link: None,
            affected_radius: s.radius,
            affected_population: s.population,
            impact_description: impact_description(s.disaster_type, s.magnitude, s.population),
            estimated_radius: s.radius,
            estimated_population: s.population,
            population_data: None,
        })
        .collect()
}

pub(crate) fn sample_impact_zones() -> Vec<ImpactZone> {
    vec![ImpactZone {
        id: "sample_impact_1".into(),
        title: "Green earthquake alert (Magnitude 5.2M, Depth:10km) in Japan".into(),
        event_type: "Earthquake".into(),
        severity: "Minor".into(),
        urgency: "Past".into(),
        certainty: "Observed".into(),
        area_description: "Japan".into(),
        geometry: ZoneGeometry::Circle {
            center: [140.5, 38.5],
            radius: 50_000.0,
        },
        center_point: [140.5, 38.5],
        radius: Some(50.0),
        population_affected: Some(250_000),
        magnitude: Some(5.2),
        depth: Some(10.0),
        summary: "Green earthquake alert (Magnitude 5.2M, Depth:10km) in Japan. \
                  250 thousand people affected in 100km radius."
            .into(),
        updated: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        source: "GDACS-CAP".into(),
    }]
}

#[allow(clippy::too_many_arguments)]
fn facility(
    id: &str,
    name: &str,
    facility_type: FacilityType,
    country: &str,
    district: &str,
    (latitude, longitude): (f64, f64),
    functionality: Functionality,
    speciality: &str,
) -> HealthFacility {
    HealthFacility {
        id: id.into(),
        name: name.into(),
        facility_type,
        country: country.into(),
        district: Some(district.into()),
        latitude,
        longitude,
        functionality,
        speciality: Some(speciality.into()),
    }
}

pub(crate) fn sample_facilities() -> Vec<HealthFacility> {
    use FacilityType as T;
    use Functionality as F;
    vec![
        facility("hf_1", "Central Hospital Dhaka", T::Hospitals, "Bangladesh", "Dhaka",
            (23.7275, 90.4125), F::FullyFunctional, "Emergency Care"),
        facility("hf_2", "Community Health Center Chittagong", T::PrimaryHealthCareCentres,
            "Bangladesh", "Chittagong", (22.3569, 91.7832), F::PartiallyFunctional, "Primary Care"),
        facility("hf_3", "Emergency Ambulance Station Cox's Bazar", T::AmbulanceStations,
            "Bangladesh", "Cox's Bazar", (21.4272, 92.0058), F::FullyFunctional, "Emergency Response"),
        facility("hf_4", "Blood Bank Sylhet", T::BloodCentres, "Bangladesh", "Sylhet",
            (24.8949, 91.8687), F::NotFunctional, "Blood Services"),
        facility("hf_5", "Istanbul University Hospital", T::Hospitals, "Turkey", "Istanbul",
            (41.0082, 28.9784), F::FullyFunctional, "Trauma Center"),
        facility("hf_6", "Ankara Emergency Response Center", T::AmbulanceStations, "Turkey",
            "Ankara", (39.9334, 32.8597), F::PartiallyFunctional, "Emergency Response"),
        facility("hf_7", "Manila General Hospital", T::Hospitals, "Philippines", "Manila",
            (14.5995, 120.9842), F::FullyFunctional, "General Medicine"),
        facility("hf_8", "Cebu Medical Training Center", T::TrainingFacilities, "Philippines",
            "Cebu", (10.3157, 123.8854), F::FullyFunctional, "Medical Training"),
        facility("hf_9", "Jakarta Emergency Pharmacy", T::Pharmacies, "Indonesia", "Jakarta",
            (-6.2088, 106.8456), F::PartiallyFunctional, "Emergency Medications"),
        facility("hf_10", "Surabaya Specialized Clinic", T::SpecializedServices, "Indonesia",
            "Surabaya", (-7.2575, 112.7521), F::NotFunctional, "Specialized Care"),
    ]
}

pub(crate) fn sample_documents() -> Vec<IfrcDocument> {
    vec![
        IfrcDocument {
            id: "sample_1".into(),
            name: "Pakistan - Flood Emergency Appeal (MDRPK028)".into(),
            document_type: "Emergency Appeal".into(),
            country: "PK".into(),
            date: Some("2025-08-30".into()),
            description: "Emergency appeal for Pakistan flood response".into(),
            document_url: None,
            appeal: Some(AppealRef {
                code: Some("MDRPK028".into()),
                start_date: Some("2025-08-21".into()),
            }),
            appeal_name: Some("Pakistan - Floods".into()),
            country_name: Some("Pakistan".into()),
            disaster_type: Some("Flood".into()),
            created_at: Some("2025-08-30T00:00:00Z".into()),
        },
        IfrcDocument {
            id: "sample_2".into(),
            name: "Cape Verde - Flood DREF Operation (MDRCV005)".into(),
            document_type: "DREF Operation".into(),
            country: "CV".into(),
            date: Some("2025-08-28".into()),
            description: "DREF operation for Cape Verde floods".into(),
            document_url: None,
            appeal: Some(AppealRef {
                code: Some("MDRCV005".into()),
                start_date: Some("2025-08-20".into()),
            }),
            appeal_name: Some("Cape Verde - Floods".into()),
            country_name: Some("Cape Verde".into()),
            disaster_type: Some("Flood".into()),
            created_at: Some("2025-08-28T00:00:00Z".into()),
        },
    ]
}

pub(crate) fn sample_countries() -> Vec<IfrcCountry> {
    [
        ("BD", "BGD", "Bangladesh", "Bangladesh Red Crescent Society"),
        ("CV", "CPV", "Cape Verde", "Cabo Verde Red Cross"),
        ("ID", "IDN", "Indonesia", "Indonesian Red Cross Society"),
        ("PK", "PAK", "Pakistan", "Pakistan Red Crescent Society"),
        ("PH", "PHL", "Philippines", "Philippine Red Cross"),
        ("TR", "TUR", "Turkey", "Turkish Red Crescent Society"),
    ]
    .into_iter()
    .map(|(iso, iso3, name, society)| IfrcCountry {
        iso: Some(iso.into()),
        iso3: Some(iso3.into()),
        name: name.into(),
        society_name: Some(society.into()),
    })
    .collect()
}
