use actix_web::{HttpResponse, Result as ActixResult};
use serde::Serialize;

use crate::errors::AppError;
use crate::response::ApiResponse;

/// What a data handler does when its upstream fails.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) enum FallbackPolicy {
    /// Surface the failure as a 500.
    Strict,
    /// Answer 200 with a fixed sample dataset and a `note`.
    #[default]
    DegradeToSample,
}

impl FallbackPolicy {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "strict" => Some(Self::Strict),
            "sample" | "degrade" => Some(Self::DegradeToSample),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Strict => "strict",
            Self::DegradeToSample => "sample",
        }
    }

    /// Validation errors always propagate; upstream errors become a sample
    /// response unless the policy is strict.
    pub fn recover<T, F>(self, err: AppError, note: &str, sample: F) -> ActixResult<HttpResponse>
    where
        T: Serialize,
        F: FnOnce() -> T,
    {
        if self == Self::Strict || !err.is_upstream() {
            return Err(err.into());
        }
        log::warn!("{note}: {err}");
        Ok(ApiResponse::degraded(sample(), note, err.to_string()))
    }
}
