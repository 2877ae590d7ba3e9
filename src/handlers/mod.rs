use actix_web::HttpResponse;

use crate::models::common::ApiResponse;
use crate::services::competition_service::CompetitionError;

pub mod admin;
pub mod backend_health_handler;
pub mod competition;

/// Translate a service error into the JSON envelope with a matching status.
pub fn error_response(error: &CompetitionError) -> HttpResponse {
    let body = ApiResponse::<()>::error(error.to_string());
    match error {
        CompetitionError::Validation(_)
        | CompetitionError::NotKnockout(_)
        | CompetitionError::InvalidBracket(_) => HttpResponse::BadRequest().json(body),
        CompetitionError::NotFound(_) => HttpResponse::NotFound().json(body),
        CompetitionError::Conflict(_) => HttpResponse::Conflict().json(body),
        CompetitionError::Forbidden(_) => HttpResponse::Forbidden().json(body),
        CompetitionError::Store(e) => {
            tracing::error!("Storage failure: {}", e);
            HttpResponse::InternalServerError().json(ApiResponse::<()>::error("Internal server error"))
        }
    }
}
