use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use crate::errors::AppError;

pub(crate) const USER_AGENT: &str = "DisasterMapApp/1.0";

/// One upstream GET.
#[derive(Clone, Debug)]
pub(crate) struct FetchRequest {
    pub url: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub timeout: Duration,
}

impl FetchRequest {
    pub fn get(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            url: url.into(),
            query: Vec::new(),
            headers: Vec::new(),
            timeout,
        }
    }

    pub fn query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    pub fn header(mut self, key: &str, value: impl Into<String>) -> Self {
        self.headers.push((key.to_string(), value.into()));
        self
    }
}

/// Source of raw upstream bodies. The HTTP implementation is the only one
/// used at runtime; tests substitute canned bodies.
#[async_trait]
pub(crate) trait Fetch: Send + Sync {
    async fn fetch(&self, request: &FetchRequest) -> Result<String, AppError>;
}

pub(crate) struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self, AppError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| AppError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Fetch for HttpFetcher {
    async fn fetch(&self, request: &FetchRequest) -> Result<String, AppError> {
        let mut builder = self
            .client
            .get(&request.url)
            .timeout(request.timeout)
            .query(&request.query);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        log::debug!("GET {}", request.url);
        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Network(format!(
                "{} returned {status}",
                request.url
            )));
        }
        Ok(response.text().await?)
    }
}

/// Linear backoff: the wait after attempt `n` is `n * step`.
#[derive(Clone, Copy, Debug)]
pub(crate) struct RetryPolicy {
    pub attempts: u32,
    pub step: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 2,
            step: Duration::from_millis(1000),
        }
    }
}

pub(crate) async fn fetch_with_retry(
    fetcher: &dyn Fetch,
    request: &FetchRequest,
    policy: RetryPolicy,
) -> Result<String, AppError> {
    let attempts = policy.attempts.max(1);
    let mut attempt = 1;
    loop {
        match fetcher.fetch(request).await {
            Ok(body) => return Ok(body),
            Err(err) if attempt >= attempts => return Err(err),
            Err(err) => {
                log::warn!(
                    "Attempt {attempt}/{attempts} failed for {}: {err}",
                    request.url
                );
                tokio::time::sleep(policy.step * attempt).await;
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::Mutex;

    impl FetchRequest {
        pub fn query_value(&self, key: &str) -> Option<&str> {
            self.query
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.as_str())
        }
    }

    /// Serves canned bodies by URL substring; anything unmatched is a
    /// network error. Every request is recorded.
    #[derive(Default)]
    pub(crate) struct StubFetcher {
        routes: Vec<(String, Result<String, String>)>,
        pub calls: Mutex<Vec<FetchRequest>>,
    }

    impl StubFetcher {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn respond(mut self, url_part: &str, body: &str) -> Self {
            self.routes.push((url_part.to_string(), Ok(body.to_string())));
            self
        }

        pub fn fail(mut self, url_part: &str, message: &str) -> Self {
            self.routes.push((url_part.to_string(), Err(message.to_string())));
            self
        }

        pub fn call_count(&self) -> usize {
            self.calls.lock().map(|c| c.len()).unwrap_or(0)
        }

        pub fn calls_to(&self, url_part: &str) -> Vec<FetchRequest> {
            self.calls
                .lock()
                .map(|c| c.iter().filter(|r| r.url.contains(url_part)).cloned().collect())
                .unwrap_or_default()
        }
    }

    #[async_trait]
    impl Fetch for StubFetcher {
        async fn fetch(&self, request: &FetchRequest) -> Result<String, AppError> {
            if let Ok(mut calls) = self.calls.lock() {
                calls.push(request.clone());
            }
            let full = format!(
                "{}?{}",
                request.url,
                request
                    .query
                    .iter()
                    .map(|(k, v)| format!("{k}={v}"))
                    .collect::<Vec<_>>()
                    .join("&")
            );
            match self.routes.iter().find(|(part, _)| full.contains(part.as_str())) {
                Some((_, Ok(body))) => Ok(body.clone()),
                Some((_, Err(message))) => Err(AppError::Network(message.clone())),
                None => Err(AppError::Network(format!("no route for {full}"))),
            }
        }
    }
}
