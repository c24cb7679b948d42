use actix_web::{web, HttpResponse, Result as ActixResult};
use validator::Validate;

use crate::errors::AppError;
use crate::models::requests::DocumentQuery;
use crate::models::responses::{CountryListPayload, DocumentListPayload};
use crate::repositories::ifrc::page_documents;
use crate::repositories::DocumentParams;
use crate::response::ApiResponse;
use crate::samples::{sample_countries, sample_documents, IFRC_NOTE};
use crate::state::AppState;
use crate::validation::non_empty;

#[utoipa::path(
    get,
    path = "/ifrc-countries",
    tag = "IFRC",
    responses(
        (status = 200, description = "Countries sorted by name", body = CountryListPayload),
        (status = 500, description = "IFRC GO unavailable (strict fallback policy)")
    )
)]
pub async fn countries(state: web::Data<AppState>) -> ActixResult<HttpResponse> {
    match state.ifrc.countries().await {
        Ok(countries) => Ok(ApiResponse::ok(CountryListPayload {
            count: countries.len(),
            countries,
        })),
        Err(err) => state.config.fallback_policy.recover(err, IFRC_NOTE, || {
            let countries = sample_countries();
            CountryListPayload {
                count: countries.len(),
                countries,
            }
        }),
    }
}

#[utoipa::path(
    get,
    path = "/ifrc-documents",
    tag = "IFRC",
    params(DocumentQuery),
    responses(
        (status = 200, description = "Appeal documents, newest first", body = DocumentListPayload),
        (status = 400, description = "Invalid parameters"),
        (status = 500, description = "IFRC GO unavailable (strict fallback policy)")
    )
)]
pub async fn documents(
    state: web::Data<AppState>,
    query: web::Query<DocumentQuery>,
) -> ActixResult<HttpResponse> {
    query.validate().map_err(|e| {
        AppError::Validation(format!("Validation failed: {}", e))
    })?;

    let params = DocumentParams {
        country: non_empty(&query.country).map(str::to_string),
        page: query.page,
        limit: query.limit,
        search: non_empty(&query.search).map(str::to_string),
    };

    match state.ifrc.documents(&params).await {
        Ok(page) => Ok(ApiResponse::ok(DocumentListPayload {
            count: page.results.len(),
            total: page.total,
            results: page.results,
        })),
        Err(err) => state.config.fallback_policy.recover(err, IFRC_NOTE, || {
            let page = page_documents(sample_documents(), params.search.as_deref(), params.limit as usize);
            DocumentListPayload {
                count: page.results.len(),
                total: page.total,
                results: page.results,
            }
        }),
    }
}
