use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum AlertLevel {
    #[serde(rename = "RED")]
    Red,
    #[serde(rename = "ORANGE")]
    Orange,
    #[serde(rename = "GREEN")]
    Green,
}

impl AlertLevel {
    /// Case-insensitive parse of a level name; anything else is `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "RED" => Some(Self::Red),
            "ORANGE" => Some(Self::Orange),
            "GREEN" => Some(Self::Green),
            _ => None,
        }
    }

    /// Upstream values that are not a known level collapse to GREEN.
    pub fn normalize(raw: Option<&str>) -> Self {
        raw.and_then(Self::parse).unwrap_or(Self::Green)
    }
}

impl Default for AlertLevel {
    fn default() -> Self {
        Self::Green
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum DisasterType {
    Earthquake,
    Flood,
    Cyclone,
    Wildfire,
    #[serde(rename = "Volcanic Activity")]
    VolcanicActivity,
    Drought,
    Tsunami,
    Precipitation,
    Other,
}

/// Provenance of an affected-population figure.
#[derive(Clone, Debug, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PopulationData {
    pub estimated_population: u64,
    pub density: f64,
    pub area: f64,
    #[schema(value_type = String)]
    pub method: &'static str,
}

#[derive(Clone, Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DisasterEvent {
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub disaster_type: DisasterType,
    pub alert_level: AlertLevel,
    pub latitude: f64,
    pub longitude: f64,
    pub magnitude: Option<f64>,
    /// `YYYY-MM-DD`
    pub date: String,
    pub description: String,
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    pub affected_radius: f64,
    pub affected_population: u64,
    pub impact_description: String,
    pub estimated_radius: f64,
    pub estimated_population: u64,
    pub population_data: Option<PopulationData>,
}

/// CAP area geometry in GeoJSON-like form. Circle radius is in meters.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum ZoneGeometry {
    Polygon {
        coordinates: Vec<Vec<[f64; 2]>>,
    },
    Circle {
        center: [f64; 2],
        radius: f64,
    },
}

#[derive(Clone, Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImpactZone {
    pub id: String,
    pub title: String,
    pub event_type: String,
    pub severity: String,
    pub urgency: String,
    pub certainty: String,
    pub area_description: String,
    #[schema(value_type = Object)]
    pub geometry: ZoneGeometry,
    #[schema(value_type = Vec<f64>)]
    pub center_point: [f64; 2],
    /// km, only known for circular areas
    pub radius: Option<f64>,
    pub population_affected: Option<u64>,
    pub magnitude: Option<f64>,
    pub depth: Option<f64>,
    pub summary: String,
    pub updated: String,
    pub source: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum FacilityType {
    Hospitals,
    #[serde(rename = "Primary Health Care Centres")]
    PrimaryHealthCareCentres,
    #[serde(rename = "Ambulance Stations")]
    AmbulanceStations,
    #[serde(rename = "Blood Centres")]
    BloodCentres,
    Pharmacies,
    #[serde(rename = "Training Facilities")]
    TrainingFacilities,
    #[serde(rename = "Specialized Services")]
    SpecializedServices,
    #[serde(rename = "Residential Facilities")]
    ResidentialFacilities,
    #[serde(other)]
    Other,
}

impl FacilityType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hospitals => "Hospitals",
            Self::PrimaryHealthCareCentres => "Primary Health Care Centres",
            Self::AmbulanceStations => "Ambulance Stations",
            Self::BloodCentres => "Blood Centres",
            Self::Pharmacies => "Pharmacies",
            Self::TrainingFacilities => "Training Facilities",
            Self::SpecializedServices => "Specialized Services",
            Self::ResidentialFacilities => "Residential Facilities",
            Self::Other => "Other",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum Functionality {
    #[serde(rename = "Fully Functional")]
    FullyFunctional,
    #[serde(rename = "Partially Functional")]
    PartiallyFunctional,
    #[serde(rename = "Not Functional")]
    NotFunctional,
    #[serde(other)]
    Unknown,
}

impl Functionality {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FullyFunctional => "Fully Functional",
            Self::PartiallyFunctional => "Partially Functional",
            Self::NotFunctional => "Not Functional",
            Self::Unknown => "Unknown",
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthFacility {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub facility_type: FacilityType,
    pub country: String,
    #[serde(default)]
    pub district: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub functionality: Functionality,
    #[serde(default)]
    pub speciality: Option<String>,
}

#[derive(Clone, Debug, Serialize, ToSchema)]
pub struct IfrcCountry {
    pub iso: Option<String>,
    pub iso3: Option<String>,
    pub name: String,
    pub society_name: Option<String>,
}

#[derive(Clone, Debug, Serialize, ToSchema)]
pub struct AppealRef {
    pub code: Option<String>,
    pub start_date: Option<String>,
}

#[derive(Clone, Debug, Serialize, ToSchema)]
pub struct IfrcDocument {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub document_type: String,
    pub country: String,
    /// `YYYY-MM-DD` of `created_at`
    pub date: Option<String>,
    pub description: String,
    pub document_url: Option<String>,
    pub appeal: Option<AppealRef>,
    pub appeal_name: Option<String>,
    pub country_name: Option<String>,
    pub disaster_type: Option<String>,
    pub created_at: Option<String>,
}

// ── Payloads ──

#[derive(Serialize, ToSchema)]
pub struct HealthPayload {
    pub status: String,
    pub timestamp: String,
    pub fallback_policy: String,
    pub env_check: EnvCheck,
    pub endpoints: Vec<String>,
}

#[derive(Serialize, ToSchema)]
pub struct EnvCheck {
    pub has_ifrc_token: bool,
    pub ifrc_base_url: String,
}

#[derive(Serialize, ToSchema)]
pub struct DisasterListPayload {
    pub count: usize,
    pub events: Vec<DisasterEvent>,
    pub source: String,
    pub skipped: usize,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImpactZoneListPayload {
    pub count: usize,
    pub impact_zones: Vec<ImpactZone>,
    pub source: String,
    pub skipped: usize,
}

#[derive(Serialize, ToSchema)]
pub struct FacilityListPayload {
    pub count: usize,
    pub total: usize,
    pub facilities: Vec<HealthFacility>,
}

#[derive(Serialize, ToSchema)]
pub struct CountryListPayload {
    pub count: usize,
    pub countries: Vec<IfrcCountry>,
}

#[derive(Serialize, ToSchema)]
pub struct DocumentListPayload {
    pub count: usize,
    pub total: usize,
    pub results: Vec<IfrcDocument>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alert_level_normalizes_unknown_to_green() {
        assert_eq!(AlertLevel::normalize(Some("red")), AlertLevel::Red);
        assert_eq!(AlertLevel::normalize(Some(" Orange ")), AlertLevel::Orange);
        assert_eq!(AlertLevel::normalize(Some("purple")), AlertLevel::Green);
        assert_eq!(AlertLevel::normalize(None), AlertLevel::Green);
    }

    #[test]
    fn circle_geometry_serializes_with_type_tag() {
        let geometry = ZoneGeometry::Circle { center: [140.5, 38.5], radius: 50_000.0 };
        let json = serde_json::to_value(&geometry).unwrap();
        assert_eq!(json["type"], "Circle");
        assert_eq!(json["center"], serde_json::json!([140.5, 38.5]));
        assert_eq!(json["radius"], 50_000.0);
    }

    #[test]
    fn facility_enums_are_lenient() {
        let raw = r#"{
            "id": "hf_x", "name": "Field Post", "type": "Mobile Clinic",
            "country": "Chad", "latitude": 12.1, "longitude": 15.0,
            "functionality": "Closed"
        }"#;
        let facility: HealthFacility = serde_json::from_str(raw).unwrap();
        assert_eq!(facility.facility_type, FacilityType::Other);
        assert_eq!(facility.functionality, Functionality::Unknown);
        assert_eq!(facility.district, None);
    }

    #[test]
    fn disaster_type_uses_display_names() {
        let json = serde_json::to_value(DisasterType::VolcanicActivity).unwrap();
        assert_eq!(json, "Volcanic Activity");
        assert_eq!(DisasterType::VolcanicActivity.to_string(), "Volcanic Activity");
    }
}
