use chrono::NaiveDate;
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;

use crate::config::FeedCapabilities;
use crate::errors::AppError;
use crate::feeds::assembler::{Assembly, EventAssembler};
use crate::feeds::flood::{flood_events, parse_flood_csv, parse_flood_json, FloodFormat, FloodSource};
use crate::feeds::parser::parse_feed;
use crate::feeds::zones::build_impact_zones;
use crate::fetcher::{fetch_with_retry, Fetch, FetchRequest, RetryPolicy};
use crate::models::{DisasterEvent, ImpactZone};
use crate::repositories::population::PopulationEstimator;

const RSS_PATH: &str = "/xml/rss.xml";
const CAP_PATH: &str = "/xml/gdacs_cap.xml";
const FLOOD_PATH: &str = "/floodmerge/data_v2.aspx";

const RSS_TIMEOUT: Duration = Duration::from_secs(15);
const CAP_TIMEOUT: Duration = Duration::from_secs(15);
const FLOOD_TIMEOUT: Duration = Duration::from_secs(20);

pub(crate) const RSS_SOURCE: &str = "GDACS-RSS";
pub(crate) const CAP_SOURCE: &str = "GDACS CAP XML";

/// Which feeds a disasters request asks for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum SourceSelection {
    All,
    Rss,
    Flood(FloodSource),
}

impl SourceSelection {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "" | "ALL" => Some(Self::All),
            "RSS" => Some(Self::Rss),
            other => FloodSource::parse(other).map(Self::Flood),
        }
    }

    fn flood_sources(self) -> &'static [FloodSource] {
        match self {
            Self::All => &FloodSource::ALL,
            Self::Rss => &[],
            Self::Flood(FloodSource::Dfo) => &[FloodSource::Dfo],
            Self::Flood(FloodSource::Gpm) => &[FloodSource::Gpm],
            Self::Flood(FloodSource::DfoMerge) => &[FloodSource::DfoMerge],
        }
    }
}

/// Pass-through filters for the flood-merge service. Empty means unset.
#[derive(Clone, Debug, Default)]
pub(crate) struct FloodFilter {
    pub alert_level: String,
    pub from: String,
    pub to: String,
}

/// Events gathered for one request and the label of the feed(s) they came from.
#[derive(Debug)]
pub(crate) struct CollectedEvents {
    pub assembly: Assembly<DisasterEvent>,
    pub source: String,
}

pub(crate) struct GdacsRepository {
    fetcher: Arc<dyn Fetch>,
    base_url: String,
    capabilities: FeedCapabilities,
    retry: RetryPolicy,
    estimator: PopulationEstimator,
}

impl GdacsRepository {
    pub fn new(fetcher: Arc<dyn Fetch>, base_url: &str, capabilities: FeedCapabilities) -> Self {
        Self {
            fetcher,
            base_url: base_url.trim_end_matches('/').to_string(),
            capabilities,
            retry: RetryPolicy::default(),
            estimator: PopulationEstimator,
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    pub async fn rss_events(&self, today: NaiveDate) -> Result<Assembly<DisasterEvent>, AppError> {
        let request = FetchRequest::get(self.url(RSS_PATH), RSS_TIMEOUT);
        let body = self.fetcher.fetch(&request).await?;
        let parsed = parse_feed(&body)?;
        let mut assembly =
            EventAssembler::new(self.estimator, today).from_entries(&parsed.entries, "gdacs", RSS_SOURCE);
        assembly.skipped += parsed.skipped;
        log::info!(
            "Parsed {} events from GDACS RSS ({} skipped)",
            assembly.items.len(),
            assembly.skipped
        );
        Ok(assembly)
    }

    pub async fn impact_zones(&self) -> Result<Assembly<ImpactZone>, AppError> {
        let request = FetchRequest::get(self.url(CAP_PATH), CAP_TIMEOUT)
            .header("Accept", "application/xml, text/xml");
        let body = self.fetcher.fetch(&request).await?;
        let parsed = parse_feed(&body)?;
        let mut assembly = build_impact_zones(&parsed.entries);
        assembly.skipped += parsed.skipped;
        log::info!(
            "Built {} impact zones from GDACS CAP ({} skipped)",
            assembly.items.len(),
            assembly.skipped
        );
        Ok(assembly)
    }

    /// JSON first, CSV when JSON yields no records. A fetch error in either
    /// format fails the source.
    async fn flood_source(
        &self,
        source: FloodSource,
        filter: &FloodFilter,
        assembler: &EventAssembler,
    ) -> Result<Assembly<DisasterEvent>, AppError> {
        for format in [FloodFormat::Json, FloodFormat::Csv] {
            let request = FetchRequest::get(self.url(FLOOD_PATH), FLOOD_TIMEOUT)
                .query("source", source.code())
                .query("type", format.as_str())
                .query("alertlevel", &filter.alert_level)
                .query("from", &filter.from)
                .query("to", &filter.to)
                .header("Accept", format.accept())
                .header("Cache-Control", "no-cache");

            let body = fetch_with_retry(self.fetcher.as_ref(), &request, self.retry).await?;
            let records = match format {
                FloodFormat::Json => parse_flood_json(&body),
                FloodFormat::Csv => parse_flood_csv(&body),
            };
            if !records.is_empty() {
                log::info!(
                    "{} {}: {} records",
                    source.code(),
                    format.as_str(),
                    records.len()
                );
                return Ok(flood_events(assembler, records, source));
            }
        }
        Ok(Assembly::default())
    }

    /// Sources are fetched concurrently; results keep source order. Fails
    /// only when every source failed.
    pub async fn flood_events(
        &self,
        sources: &[FloodSource],
        filter: &FloodFilter,
        today: NaiveDate,
    ) -> Result<Assembly<DisasterEvent>, AppError> {
        let assembler = EventAssembler::new(self.estimator, today);
        let results = join_all(
            sources
                .iter()
                .map(|&source| self.flood_source(source, filter, &assembler)),
        )
        .await;

        let mut merged = Assembly::default();
        let mut last_error = None;
        let mut succeeded = 0;
        for (source, result) in sources.iter().zip(results) {
            match result {
                Ok(assembly) => {
                    succeeded += 1;
                    merged.extend(assembly);
                }
                Err(err) => {
                    log::warn!("Flood source {} failed: {err}", source.code());
                    last_error = Some(err);
                }
            }
        }

        match last_error {
            Some(err) if succeeded == 0 => Err(err),
            _ => Ok(merged),
        }
    }

    /// Flood data first (when enabled and requested), then RSS if that
    /// produced nothing. An error is returned only when every feed that was
    /// tried failed.
    pub async fn collect_events(
        &self,
        selection: SourceSelection,
        filter: &FloodFilter,
        today: NaiveDate,
    ) -> Result<CollectedEvents, AppError> {
        let mut collected = Assembly::default();
        let mut attempted = false;
        let mut last_error = None;

        let flood_sources = selection.flood_sources();
        if self.capabilities.flood_data && !flood_sources.is_empty() {
            attempted = true;
            match self.flood_events(flood_sources, filter, today).await {
                Ok(assembly) if !assembly.items.is_empty() => {
                    let label = flood_sources
                        .iter()
                        .map(|s| s.code())
                        .collect::<Vec<_>>()
                        .join(",");
                    return Ok(CollectedEvents {
                        assembly,
                        source: label,
                    });
                }
                Ok(assembly) => collected.extend(assembly),
                Err(err) => {
                    log::warn!("GDACS flood data failed, trying RSS: {err}");
                    last_error = Some(err);
                }
            }
        }

        if self.capabilities.rss {
            attempted = true;
            match self.rss_events(today).await {
                Ok(assembly) => {
                    collected.extend(assembly);
                    return Ok(CollectedEvents {
                        assembly: collected,
                        source: RSS_SOURCE.to_string(),
                    });
                }
                Err(err) => {
                    log::warn!("GDACS RSS failed: {err}");
                    last_error = Some(err);
                }
            }
        }

        // An empty result only stands when no feed failed to produce it.
        match last_error {
            _ if !attempted => Err(AppError::Config("no disaster feed is enabled".into())),
            Some(err) if collected.items.is_empty() => Err(err),
            _ => Ok(CollectedEvents {
                assembly: collected,
                source: String::from("GDACS"),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feeds::parser::fixtures;
    use crate::fetcher::testing::StubFetcher;
    use crate::models::DisasterType;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 10, 20).unwrap()
    }

    fn quick_retry() -> RetryPolicy {
        RetryPolicy {
            attempts: 2,
            step: Duration::from_millis(1),
        }
    }

    fn repository(stub: StubFetcher, capabilities: FeedCapabilities) -> (GdacsRepository, Arc<StubFetcher>) {
        let stub = Arc::new(stub);
        let repo = GdacsRepository::new(stub.clone(), "https://gdacs.test/", capabilities)
            .with_retry(quick_retry());
        (repo, stub)
    }

    const DFO_JSON: &str = r#"[{"areaid": "9", "sitename": "Indus", "alertlevel": "orange",
        "lat": "27.5", "lon": "68.2", "signal": "2.1", "date": "2025-10-19"}]"#;
    const GPM_CSV: &str = "areaid;sitename;alertlevel;lat;lon;signal\n31;Sahel;green;13.5;2.1;0.8\n";

    #[test]
    fn selection_parsing() {
        assert_eq!(SourceSelection::parse("all"), Some(SourceSelection::All));
        assert_eq!(SourceSelection::parse("Rss"), Some(SourceSelection::Rss));
        assert_eq!(
            SourceSelection::parse("gpm"),
            Some(SourceSelection::Flood(FloodSource::Gpm))
        );
        assert_eq!(SourceSelection::parse("usgs"), None);
    }

    #[tokio::test]
    async fn flood_sources_fall_back_from_json_to_csv() {
        let stub = StubFetcher::new()
            .respond("source=DFO&type=json", DFO_JSON)
            .respond("source=GPM&type=json", "<html>no data</html>")
            .respond("source=GPM&type=csv", GPM_CSV)
            .respond("source=DFOMERGE", "[]");
        let (repo, stub) = repository(stub, FeedCapabilities::default());

        let assembly = repo
            .flood_events(&FloodSource::ALL, &FloodFilter::default(), today())
            .await
            .unwrap();

        assert_eq!(assembly.items.len(), 2);
        assert_eq!(assembly.items[0].source, "DFO");
        assert_eq!(assembly.items[1].source, "GPM");
        assert_eq!(assembly.items[1].disaster_type, DisasterType::Precipitation);
        // DFO json, GPM json+csv, DFOMERGE json+csv
        assert_eq!(stub.call_count(), 5);
        assert!(stub.calls_to("floodmerge").iter().all(|r| r.timeout == FLOOD_TIMEOUT));
    }

    #[tokio::test]
    async fn one_failing_flood_source_does_not_fail_the_rest() {
        let stub = StubFetcher::new()
            .respond("source=DFO&type=json", DFO_JSON)
            .fail("source=GPM", "connection reset")
            .respond("source=DFOMERGE", "");
        let (repo, stub) = repository(stub, FeedCapabilities::default());

        let assembly = repo
            .flood_events(&FloodSource::ALL, &FloodFilter::default(), today())
            .await
            .unwrap();

        assert_eq!(assembly.items.len(), 1);
        // the failing source was retried once
        assert_eq!(
            stub.calls_to("floodmerge")
                .iter()
                .filter(|r| r.query_value("source") == Some("GPM"))
                .count(),
            2
        );
    }

    #[tokio::test]
    async fn all_flood_sources_failing_is_an_error() {
        let stub = StubFetcher::new().fail("floodmerge", "timeout");
        let (repo, _) = repository(stub, FeedCapabilities::default());

        let result = repo
            .flood_events(&FloodSource::ALL, &FloodFilter::default(), today())
            .await;
        assert!(matches!(result, Err(AppError::Network(_))));
    }

    #[tokio::test]
    async fn empty_flood_data_falls_through_to_rss() {
        let stub = StubFetcher::new()
            .respond("floodmerge", "[]")
            .respond("rss.xml", fixtures::GDACS_RSS);
        let (repo, _) = repository(stub, FeedCapabilities::default());

        let collected = repo
            .collect_events(SourceSelection::All, &FloodFilter::default(), today())
            .await
            .unwrap();

        assert_eq!(collected.source, RSS_SOURCE);
        assert_eq!(collected.assembly.items.len(), 2);
        assert_eq!(collected.assembly.skipped, 2);
    }

    #[tokio::test]
    async fn rss_selection_skips_flood_data() {
        let stub = StubFetcher::new().respond("rss.xml", fixtures::GDACS_RSS);
        let (repo, stub) = repository(stub, FeedCapabilities::default());

        let collected = repo
            .collect_events(SourceSelection::Rss, &FloodFilter::default(), today())
            .await
            .unwrap();

        assert_eq!(collected.assembly.items.len(), 2);
        assert!(stub.calls_to("floodmerge").is_empty());
    }

    #[tokio::test]
    async fn disabled_flood_capability_goes_straight_to_rss() {
        let stub = StubFetcher::new().respond("rss.xml", fixtures::GDACS_RSS);
        let capabilities = FeedCapabilities {
            flood_data: false,
            rss: true,
        };
        let (repo, stub) = repository(stub, capabilities);

        repo.collect_events(SourceSelection::All, &FloodFilter::default(), today())
            .await
            .unwrap();
        assert_eq!(stub.call_count(), 1);
    }

    #[tokio::test]
    async fn every_feed_failing_is_an_error() {
        let stub = StubFetcher::new()
            .fail("floodmerge", "timeout")
            .fail("rss.xml", "503");
        let (repo, _) = repository(stub, FeedCapabilities::default());

        let result = repo
            .collect_events(SourceSelection::All, &FloodFilter::default(), today())
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn empty_flood_data_with_rss_down_is_an_error() {
        let stub = StubFetcher::new()
            .respond("floodmerge", "[]")
            .fail("rss.xml", "503 Service Unavailable");
        let (repo, _) = repository(stub, FeedCapabilities::default());

        let result = repo
            .collect_events(SourceSelection::All, &FloodFilter::default(), today())
            .await;
        assert!(matches!(result, Err(AppError::Network(_))));
    }

    #[tokio::test]
    async fn empty_flood_data_alone_is_an_empty_result() {
        let stub = StubFetcher::new().respond("floodmerge", "[]");
        let capabilities = FeedCapabilities {
            flood_data: true,
            rss: false,
        };
        let (repo, _) = repository(stub, capabilities);

        let collected = repo
            .collect_events(SourceSelection::All, &FloodFilter::default(), today())
            .await
            .unwrap();
        assert!(collected.assembly.items.is_empty());
    }

    #[tokio::test]
    async fn cap_feed_is_requested_as_xml() {
        let stub = StubFetcher::new().respond("gdacs_cap.xml", fixtures::GDACS_CAP_ATOM);
        let (repo, stub) = repository(stub, FeedCapabilities::default());

        let zones = repo.impact_zones().await.unwrap();

        assert_eq!(zones.items.len(), 2);
        let request = &stub.calls_to("gdacs_cap.xml")[0];
        assert_eq!(request.url, "https://gdacs.test/xml/gdacs_cap.xml");
        assert_eq!(request.timeout, CAP_TIMEOUT);
        assert!(request.headers.iter().any(|(k, _)| k == "Accept"));
    }

    #[tokio::test]
    async fn malformed_rss_is_a_parse_error() {
        let stub = StubFetcher::new().respond("rss.xml", "<html>maintenance</html>");
        let (repo, _) = repository(stub, FeedCapabilities::default());
        assert!(matches!(repo.rss_events(today()).await, Err(AppError::Parse(_))));
    }
}
