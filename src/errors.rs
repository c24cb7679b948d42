use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;
use std::fmt;

#[derive(Debug)]
pub(crate) enum AppError {
    Validation(String),
    NotFound(String),
    /// Timeout, connection failure or non-success status from an upstream.
    Network(String),
    /// Malformed XML/JSON or a document missing its expected nodes.
    Parse(String),
    Config(String),
    RateLimit(String),
}

impl AppError {
    /// Upstream-side failures are the ones a fallback policy may absorb.
    pub fn is_upstream(&self) -> bool {
        !matches!(self, Self::Validation(_))
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation(msg) => write!(f, "validation error: {msg}"),
            Self::NotFound(msg) => write!(f, "not found: {msg}"),
            Self::Network(msg) => write!(f, "network error: {msg}"),
            Self::Parse(msg) => write!(f, "parse error: {msg}"),
            Self::Config(msg) => write!(f, "configuration error: {msg}"),
            Self::RateLimit(msg) => write!(f, "rate limit exceeded: {msg}"),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            Self::Validation(msg) => HttpResponse::BadRequest().json(ErrorBody {
                success: false,
                error: msg,
            }),
            Self::NotFound(msg) => HttpResponse::NotFound().json(ErrorBody {
                success: false,
                error: msg,
            }),
            other => {
                log::error!("Upstream failure: {other}");
                HttpResponse::InternalServerError().json(ErrorBody {
                    success: false,
                    error: &other.to_string(),
                })
            }
        }
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        let msg = if err.is_timeout() {
            format!("request timed out: {err}")
        } else if let Some(status) = err.status() {
            format!("upstream returned {status}")
        } else {
            err.to_string()
        };
        Self::Network(msg)
    }
}

impl From<quick_xml::DeError> for AppError {
    fn from(err: quick_xml::DeError) -> Self {
        Self::Parse(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    success: bool,
    error: &'a str,
}
