use actix_web::{web, HttpResponse, Result};
use uuid::Uuid;

use crate::handlers::error_response;
use crate::models::common::ApiResponse;
use crate::services::competition_service::CompetitionService;

#[tracing::instrument(name = "List competitions", skip(service))]
pub async fn list_competitions(service: web::Data<CompetitionService>) -> Result<HttpResponse> {
    match service.list_competitions().await {
        Ok(competitions) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            format!("Found {} competitions", competitions.len()),
            competitions,
        ))),
        Err(e) => Ok(error_response(&e)),
    }
}

#[tracing::instrument(name = "Get competition", skip(service), fields(competition_id = %competition_id))]
pub async fn get_competition(
    competition_id: Uuid,
    service: web::Data<CompetitionService>,
) -> Result<HttpResponse> {
    match service.get_competition_details(competition_id).await {
        Ok(details) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            "Competition retrieved successfully",
            details,
        ))),
        Err(e) => {
            tracing::warn!("Failed to get competition {}: {}", competition_id, e);
            Ok(error_response(&e))
        }
    }
}

#[tracing::instrument(name = "Get competition fixtures", skip(service), fields(competition_id = %competition_id))]
pub async fn get_competition_fixtures(
    competition_id: Uuid,
    service: web::Data<CompetitionService>,
) -> Result<HttpResponse> {
    match service.list_fixtures(competition_id).await {
        Ok(fixtures) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            format!("Found {} fixtures", fixtures.len()),
            fixtures,
        ))),
        Err(e) => Ok(error_response(&e)),
    }
}

/// Rounds, slots, legs and aggregate state of a cup bracket
#[tracing::instrument(name = "Get competition bracket", skip(service), fields(competition_id = %competition_id))]
pub async fn get_competition_bracket(
    competition_id: Uuid,
    service: web::Data<CompetitionService>,
) -> Result<HttpResponse> {
    match service.bracket(competition_id).await {
        Ok(bracket) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            "Bracket retrieved successfully",
            bracket,
        ))),
        Err(e) => Ok(error_response(&e)),
    }
}
