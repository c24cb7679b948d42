use chrono::{DateTime, FixedOffset};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::cmp::Reverse;
use std::sync::Arc;
use std::time::Duration;

use crate::errors::AppError;
use crate::fetcher::{Fetch, FetchRequest};
use crate::models::{AppealRef, IfrcCountry, IfrcDocument};
use crate::rate_limit::SlidingWindowLimiter;

const IFRC_TIMEOUT: Duration = Duration::from_secs(10);
const COUNTRY_PAGE_SIZE: u32 = 300;
/// Each appeal costs one more request against the hourly budget.
const MAX_APPEALS_PER_REQUEST: usize = 5;

#[derive(Debug, Deserialize)]
struct Page<T> {
    #[serde(default = "Vec::new")]
    results: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct RawCountry {
    iso: Option<String>,
    iso3: Option<String>,
    name: Option<String>,
    society_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct NamedRef {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    iso: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawAppeal {
    id: Value,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    country: Option<NamedRef>,
    #[serde(default)]
    dtype: Option<NamedRef>,
    #[serde(default)]
    start_date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawDocument {
    id: Value,
    #[serde(default)]
    name: Option<String>,
    #[serde(rename = "type", default)]
    document_type: Option<Value>,
    #[serde(default)]
    iso: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    document_url: Option<String>,
    #[serde(default)]
    document: Option<String>,
    #[serde(default)]
    created_at: Option<String>,
}

/// `42` and `"42"` both become `"42"`; `{ "name": "DREF" }` becomes `"DREF"`.
fn value_label(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Object(map) => map.get("name").and_then(value_label),
        _ => None,
    }
}

fn created_at_key(doc: &IfrcDocument) -> Option<DateTime<FixedOffset>> {
    doc.created_at
        .as_deref()
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
}

#[derive(Clone, Debug, Default)]
pub(crate) struct DocumentParams {
    pub country: Option<String>,
    pub page: u32,
    pub limit: u32,
    pub search: Option<String>,
}

#[derive(Debug)]
pub(crate) struct DocumentPage {
    /// Matches before truncation to `limit`.
    pub total: usize,
    pub results: Vec<IfrcDocument>,
}

/// Offset of the first appeal on `page` (1-based).
fn appeal_offset(page: u32, limit: u32) -> Result<u64, AppError> {
    u64::from(page.max(1) - 1)
        .checked_mul(u64::from(limit))
        .ok_or_else(|| AppError::Validation(format!("page {page} is out of range")))
}

/// Filters by search term, sorts newest first, then truncates.
pub(crate) fn page_documents(mut documents: Vec<IfrcDocument>, search: Option<&str>, limit: usize) -> DocumentPage {
    if let Some(term) = search.map(str::to_lowercase).filter(|t| !t.is_empty()) {
        documents.retain(|d| {
            d.name.to_lowercase().contains(&term) || d.description.to_lowercase().contains(&term)
        });
    }
    documents.sort_by_key(|d| Reverse(created_at_key(d)));
    let total = documents.len();
    documents.truncate(limit);
    DocumentPage {
        total,
        results: documents,
    }
}

/// Token-authenticated IFRC GO client. Every request, including failed ones,
/// draws from the sliding-window budget.
pub(crate) struct IfrcClient {
    fetcher: Arc<dyn Fetch>,
    base_url: String,
    token: Option<String>,
    limiter: SlidingWindowLimiter,
}

impl IfrcClient {
    pub fn new(
        fetcher: Arc<dyn Fetch>,
        base_url: &str,
        token: Option<String>,
        limiter: SlidingWindowLimiter,
    ) -> Self {
        Self {
            fetcher,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            limiter,
        }
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, AppError> {
        let token = self
            .token
            .as_deref()
            .ok_or_else(|| AppError::Config("IFRC GO API token not configured".into()))?;
        self.limiter.try_acquire()?;
        log::debug!("IFRC GO {path}: {} calls left this hour", self.limiter.remaining());

        let mut request = FetchRequest::get(format!("{}{path}", self.base_url), IFRC_TIMEOUT)
            .header("Authorization", format!("Token {token}"))
            .header("Accept", "application/json");
        for (key, value) in query {
            request = request.query(key, value);
        }

        let body = self.fetcher.fetch(&request).await?;
        Ok(serde_json::from_str(&body)?)
    }

    pub async fn countries(&self) -> Result<Vec<IfrcCountry>, AppError> {
        let page: Page<RawCountry> = self
            .get_json(
                "/country/",
                &[
                    ("limit", COUNTRY_PAGE_SIZE.to_string()),
                    ("ordering", "name".to_string()),
                ],
            )
            .await?;

        let mut countries: Vec<IfrcCountry> = page
            .results
            .into_iter()
            .filter_map(|c| {
                Some(IfrcCountry {
                    name: c.name.filter(|n| !n.trim().is_empty())?,
                    iso: c.iso,
                    iso3: c.iso3,
                    society_name: c.society_name,
                })
            })
            .collect();
        countries.sort_by(|a, b| a.name.cmp(&b.name));
        log::info!("Retrieved {} countries from IFRC GO", countries.len());
        Ok(countries)
    }

    /// Recent appeals, then the documents of the first few of them. A failing
    /// appeal is logged and skipped.
    pub async fn documents(&self, params: &DocumentParams) -> Result<DocumentPage, AppError> {
        let limit = params.limit.max(1);
        let mut query = vec![
            ("limit", limit.to_string()),
            ("offset", appeal_offset(params.page, limit)?.to_string()),
            ("ordering", "-start_date".to_string()),
        ];
        if let Some(country) = params.country.as_deref().filter(|c| !c.trim().is_empty()) {
            query.push(("country", country.trim().to_string()));
        }
        let appeals: Page<RawAppeal> = self.get_json("/appeal/", &query).await?;

        let mut documents = Vec::new();
        for appeal in appeals.results.iter().take(MAX_APPEALS_PER_REQUEST) {
            let Some(appeal_id) = value_label(&appeal.id) else {
                continue;
            };
            let docs: Result<Page<RawDocument>, AppError> = self
                .get_json(
                    "/appeal_document/",
                    &[
                        ("appeal", appeal_id.clone()),
                        ("ordering", "-created_at".to_string()),
                    ],
                )
                .await;
            match docs {
                Ok(docs) => documents.extend(docs.results.into_iter().map(|d| merge_appeal(d, appeal))),
                Err(err) => log::error!("Error fetching documents for appeal {appeal_id}: {err}"),
            }
        }

        let result = page_documents(documents, params.search.as_deref(), limit as usize);
        log::info!(
            "Retrieved {} of {} IFRC documents",
            result.results.len(),
            result.total
        );
        Ok(result)
    }
}

fn merge_appeal(doc: RawDocument, appeal: &RawAppeal) -> IfrcDocument {
    let country = appeal.country.as_ref();
    IfrcDocument {
        id: value_label(&doc.id).unwrap_or_default(),
        name: doc.name.unwrap_or_else(|| "Untitled Document".into()),
        document_type: doc
            .document_type
            .as_ref()
            .and_then(value_label)
            .unwrap_or_else(|| "Unknown".into()),
        country: doc
            .iso
            .or_else(|| country.and_then(|c| c.iso.clone()))
            .unwrap_or_else(|| "Unknown".into()),
        date: doc.created_at.as_deref().and_then(|s| s.get(..10)).map(str::to_string),
        description: doc.description.unwrap_or_default(),
        document_url: doc.document_url.or(doc.document),
        appeal: Some(AppealRef {
            code: appeal.code.clone(),
            start_date: appeal.start_date.clone(),
        }),
        appeal_name: appeal.name.clone(),
        country_name: country.and_then(|c| c.name.clone()),
        disaster_type: appeal.dtype.as_ref().and_then(|d| d.name.clone()),
        created_at: doc.created_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetcher::testing::StubFetcher;

    const COUNTRIES: &str = r#"{"count": 3, "results": [
        {"iso": "PK", "iso3": "PAK", "name": "Pakistan", "society_name": "Pakistan Red Crescent Society"},
        {"iso": "AF", "iso3": "AFG", "name": "Afghanistan", "society_name": "Afghan Red Crescent Society"},
        {"iso": null, "iso3": null, "name": null, "society_name": null}
    ]}"#;

    const APPEALS: &str = r#"{"count": 2, "results": [
        {"id": 11, "name": "Pakistan - Floods", "code": "MDRPK028",
         "country": {"name": "Pakistan", "iso": "PK"}, "dtype": {"name": "Flood"},
         "start_date": "2025-08-21T00:00:00Z"},
        {"id": 12, "name": "Cape Verde - Floods", "code": "MDRCV005",
         "country": {"name": "Cape Verde", "iso": "CV"}, "dtype": {"name": "Flood"},
         "start_date": "2025-08-20T00:00:00Z"}
    ]}"#;

    const DOCS_11: &str = r#"{"results": [
        {"id": 101, "name": "Emergency Appeal", "description": "Initial appeal",
         "document_url": "https://ifrc.test/a.pdf", "created_at": "2025-08-22T10:00:00Z"},
        {"id": 102, "name": "Operation Update 1", "description": "First update",
         "document": "https://ifrc.test/b.pdf", "created_at": "2025-09-10T10:00:00Z"}
    ]}"#;

    const DOCS_12: &str = r#"{"results": [
        {"id": "201", "name": "DREF Operation", "type": {"name": "DREF"},
         "description": "Cape Verde floods", "created_at": "2025-08-28T08:00:00Z"}
    ]}"#;

    fn client(stub: StubFetcher, token: Option<&str>) -> (IfrcClient, Arc<StubFetcher>) {
        let stub = Arc::new(stub);
        let client = IfrcClient::new(
            stub.clone(),
            "https://ifrc.test/api/v2/",
            token.map(str::to_string),
            SlidingWindowLimiter::per_hour(100),
        );
        (client, stub)
    }

    fn params(limit: u32) -> DocumentParams {
        DocumentParams {
            page: 1,
            limit,
            ..DocumentParams::default()
        }
    }

    #[tokio::test]
    async fn countries_are_sorted_and_nameless_rows_dropped() {
        let (client, stub) = client(StubFetcher::new().respond("/country/", COUNTRIES), Some("t0k"));

        let countries = client.countries().await.unwrap();

        assert_eq!(countries.len(), 2);
        assert_eq!(countries[0].name, "Afghanistan");
        assert_eq!(countries[1].iso3.as_deref(), Some("PAK"));

        let request = &stub.calls_to("/country/")[0];
        assert_eq!(request.url, "https://ifrc.test/api/v2/country/");
        assert_eq!(request.query_value("limit"), Some("300"));
        assert!(request
            .headers
            .iter()
            .any(|(k, v)| k == "Authorization" && v == "Token t0k"));
    }

    #[tokio::test]
    async fn missing_token_is_a_config_error() {
        let (client, stub) = client(StubFetcher::new().respond("/country/", COUNTRIES), None);
        assert!(matches!(client.countries().await, Err(AppError::Config(_))));
        assert_eq!(stub.call_count(), 0);
    }

    #[tokio::test]
    async fn documents_merge_appeal_details_newest_first() {
        let stub = StubFetcher::new()
            .respond("/appeal/", APPEALS)
            .respond("appeal=11", DOCS_11)
            .respond("appeal=12", DOCS_12);
        let (client, stub) = client(stub, Some("t0k"));

        let page = client.documents(&params(20)).await.unwrap();

        assert_eq!(page.total, 3);
        let ids: Vec<_> = page.results.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, ["102", "201", "101"]);

        let update = &page.results[0];
        assert_eq!(update.appeal_name.as_deref(), Some("Pakistan - Floods"));
        assert_eq!(update.country, "PK");
        assert_eq!(update.country_name.as_deref(), Some("Pakistan"));
        assert_eq!(update.disaster_type.as_deref(), Some("Flood"));
        assert_eq!(update.document_url.as_deref(), Some("https://ifrc.test/b.pdf"));
        assert_eq!(update.date.as_deref(), Some("2025-09-10"));
        assert_eq!(page.results[1].document_type, "DREF");

        let appeal_call = &stub.calls_to("/appeal/")[0];
        assert_eq!(appeal_call.query_value("ordering"), Some("-start_date"));
        assert_eq!(appeal_call.query_value("offset"), Some("0"));
    }

    #[tokio::test]
    async fn failing_appeal_is_skipped() {
        let stub = StubFetcher::new()
            .respond("/appeal/", APPEALS)
            .fail("appeal=11", "500 Internal Server Error")
            .respond("appeal=12", DOCS_12);
        let (client, _) = client(stub, Some("t0k"));

        let page = client.documents(&params(20)).await.unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.results[0].appeal_name.as_deref(), Some("Cape Verde - Floods"));
    }

    #[tokio::test]
    async fn total_counts_matches_before_truncation() {
        let stub = StubFetcher::new()
            .respond("/appeal/", APPEALS)
            .respond("appeal=11", DOCS_11)
            .respond("appeal=12", DOCS_12);
        let (client, _) = client(stub, Some("t0k"));

        let page = client.documents(&params(1)).await.unwrap();
        assert_eq!(page.total, 3);
        assert_eq!(page.results.len(), 1);
    }

    #[tokio::test]
    async fn rate_limit_stops_further_calls() {
        let stub = Arc::new(StubFetcher::new().respond("/country/", COUNTRIES));
        let client = IfrcClient::new(
            stub.clone(),
            "https://ifrc.test/api/v2",
            Some("t0k".into()),
            SlidingWindowLimiter::per_hour(1),
        );

        client.countries().await.unwrap();
        assert!(matches!(client.countries().await, Err(AppError::RateLimit(_))));
        assert_eq!(stub.call_count(), 1);
    }

    #[tokio::test]
    async fn deep_pages_do_not_overflow_the_offset() {
        let stub = StubFetcher::new().respond("/appeal/", r#"{"results": []}"#);
        let (client, stub) = client(stub, Some("t0k"));

        let page = client
            .documents(&DocumentParams {
                page: 50_000_000,
                limit: 100,
                ..DocumentParams::default()
            })
            .await
            .unwrap();

        assert_eq!(page.total, 0);
        let appeal_call = &stub.calls_to("/appeal/")[0];
        assert_eq!(appeal_call.query_value("offset"), Some("4999999900"));
    }

    #[test]
    fn offsets() {
        assert_eq!(appeal_offset(1, 20).unwrap(), 0);
        assert_eq!(appeal_offset(0, 20).unwrap(), 0);
        assert_eq!(appeal_offset(3, 20).unwrap(), 40);
        assert_eq!(appeal_offset(u32::MAX, u32::MAX).unwrap(), 18_446_744_060_824_649_730);
    }

    #[test]
    fn search_is_case_insensitive_on_name_and_description() {
        let docs = crate::samples::sample_documents();
        let page = page_documents(docs.clone(), Some("CAPE verde"), 20);
        assert_eq!(page.total, 1);
        assert_eq!(page.results[0].id, "sample_2");

        let page = page_documents(docs, Some("appeal for pakistan"), 20);
        assert_eq!(page.results[0].id, "sample_1");
    }
}
