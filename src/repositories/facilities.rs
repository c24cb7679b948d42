use std::io::ErrorKind;
use std::path::PathBuf;

use crate::errors::AppError;
use crate::models::{FacilityListPayload, HealthFacility};

pub(crate) struct FacilityRepository {
    path: PathBuf,
}

impl FacilityRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub async fn load(&self) -> Result<Vec<HealthFacility>, AppError> {
        let raw = tokio::fs::read_to_string(&self.path).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => AppError::NotFound(format!(
                "Health facilities data not found at {}",
                self.path.display()
            )),
            _ => AppError::Parse(format!("cannot read {}: {e}", self.path.display())),
        })?;
        let facilities: Vec<HealthFacility> = serde_json::from_str(&raw)?;
        log::info!("Loaded {} health facilities", facilities.len());
        Ok(facilities)
    }
}

/// Case-insensitive exact-match filters; `None` matches everything.
#[derive(Clone, Debug, Default)]
pub(crate) struct FacilityFilter {
    pub country: Option<String>,
    pub functionality: Option<String>,
    pub facility_type: Option<String>,
}

impl FacilityFilter {
    fn matches(&self, facility: &HealthFacility) -> bool {
        let eq = |wanted: &Option<String>, actual: &str| {
            wanted
                .as_deref()
                .map_or(true, |w| w.trim().eq_ignore_ascii_case(actual))
        };
        eq(&self.country, &facility.country)
            && eq(&self.functionality, facility.functionality.as_str())
            && eq(&self.facility_type, facility.facility_type.as_str())
    }

    /// `total` is the filtered count; `count` the size of the returned page.
    pub fn page(&self, facilities: Vec<HealthFacility>, limit: usize, offset: usize) -> FacilityListPayload {
        let matching: Vec<HealthFacility> = facilities.into_iter().filter(|f| self.matches(f)).collect();
        let total = matching.len();
        let facilities: Vec<HealthFacility> = matching.into_iter().skip(offset).take(limit).collect();
        FacilityListPayload {
            count: facilities.len(),
            total,
            facilities,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::samples::sample_facilities;

    fn filter(country: Option<&str>, functionality: Option<&str>, facility_type: Option<&str>) -> FacilityFilter {
        FacilityFilter {
            country: country.map(str::to_string),
            functionality: functionality.map(str::to_string),
            facility_type: facility_type.map(str::to_string),
        }
    }

    #[test]
    fn filters_are_case_insensitive() {
        let page = filter(Some("bangladesh"), None, None).page(sample_facilities(), 1000, 0);
        assert_eq!(page.total, 4);

        let page = filter(None, Some("fully functional"), Some("HOSPITALS")).page(sample_facilities(), 1000, 0);
        let ids: Vec<_> = page.facilities.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, ["hf_1", "hf_5", "hf_7"]);
    }

    #[test]
    fn pagination_reports_filtered_total() {
        let page = FacilityFilter::default().page(sample_facilities(), 3, 8);
        assert_eq!(page.total, 10);
        assert_eq!(page.count, 2);
        assert_eq!(page.facilities[0].id, "hf_9");

        let page = FacilityFilter::default().page(sample_facilities(), 5, 50);
        assert_eq!(page.count, 0);
        assert_eq!(page.total, 10);
    }

    #[tokio::test]
    async fn missing_file_is_not_found() {
        let repo = FacilityRepository::new("/nonexistent/health-facilities-data.json");
        assert!(matches!(repo.load().await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn loads_json_file() {
        let path = std::env::temp_dir().join(format!("facilities-{}.json", std::process::id()));
        let json = serde_json::to_string(&sample_facilities()).unwrap();
        tokio::fs::write(&path, json).await.unwrap();

        let facilities = FacilityRepository::new(&path).load().await.unwrap();
        assert_eq!(facilities.len(), 10);
        assert_eq!(facilities[2].district.as_deref(), Some("Cox's Bazar"));

        tokio::fs::remove_file(&path).await.unwrap();
    }

    #[tokio::test]
    async fn malformed_file_is_a_parse_error() {
        let path = std::env::temp_dir().join(format!("facilities-bad-{}.json", std::process::id()));
        tokio::fs::write(&path, "{ not json").await.unwrap();

        let result = FacilityRepository::new(&path).load().await;
        assert!(matches!(result, Err(AppError::Parse(_))));

        tokio::fs::remove_file(&path).await.unwrap();
    }
}
