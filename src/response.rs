use actix_web::HttpResponse;
use serde::Serialize;

/// `{ "success": true, ...payload }`, plus `note`/`error` when the payload
/// is sample data standing in for an unavailable upstream.
#[derive(Serialize)]
pub(crate) struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(flatten)]
    pub payload: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(payload: T) -> HttpResponse {
        HttpResponse::Ok().json(Self {
            success: true,
            payload,
            note: None,
            error: None,
        })
    }

    pub fn with_note(payload: T, note: impl Into<String>) -> HttpResponse {
        HttpResponse::Ok().json(Self {
            success: true,
            payload,
            note: Some(note.into()),
            error: None,
        })
    }

    pub fn degraded(payload: T, note: impl Into<String>, error: impl Into<String>) -> HttpResponse {
        HttpResponse::Ok().json(Self {
            success: true,
            payload,
            note: Some(note.into()),
            error: Some(error.into()),
        })
    }
}
