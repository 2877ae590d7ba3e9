use actix_web::{web, HttpResponse, Result};
use serde_json::json;
use uuid::Uuid;

use crate::handlers::error_response;
use crate::models::common::ApiResponse;
use crate::models::fixture::{ApproveFixtureRequest, RescheduleFixtureRequest};
use crate::models::user::Claims;
use crate::services::competition_service::CompetitionService;

// POST /admin/fixtures/{id}/approve
#[tracing::instrument(
    name = "Approve fixture",
    skip(request, service, claims),
    fields(fixture_id = %fixture_id, admin_user = %claims.username)
)]
pub async fn approve_fixture(
    fixture_id: Uuid,
    request: Option<web::Json<ApproveFixtureRequest>>,
    service: web::Data<CompetitionService>,
    claims: web::ReqData<Claims>,
) -> Result<HttpResponse> {
    let request = request.map(|r| r.into_inner()).unwrap_or_default();

    match service.approve_fixture(fixture_id, request).await {
        Ok(outcome) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            "Fixture approved",
            outcome,
        ))),
        Err(e) => {
            tracing::warn!("Approval of fixture {} refused: {}", fixture_id, e);
            Ok(error_response(&e))
        }
    }
}

// POST /admin/fixtures/{id}/reject
#[tracing::instrument(name = "Reject fixture results", skip(service), fields(fixture_id = %fixture_id))]
pub async fn reject_fixture(
    fixture_id: Uuid,
    service: web::Data<CompetitionService>,
) -> Result<HttpResponse> {
    match service.reject_fixture(fixture_id).await {
        Ok(rejected) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            format!("Rejected {} submissions", rejected),
            json!({ "rejected": rejected }),
        ))),
        Err(e) => Ok(error_response(&e)),
    }
}

// PATCH /admin/fixtures/{id}/schedule
#[tracing::instrument(
    name = "Reschedule fixture",
    skip(request, service),
    fields(fixture_id = %fixture_id, scheduled_for = %request.scheduled_for)
)]
pub async fn reschedule_fixture(
    fixture_id: Uuid,
    request: web::Json<RescheduleFixtureRequest>,
    service: web::Data<CompetitionService>,
) -> Result<HttpResponse> {
    match service.reschedule_fixture(fixture_id, request.into_inner()).await {
        Ok(fixture) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            "Fixture rescheduled",
            fixture,
        ))),
        Err(e) => Ok(error_response(&e)),
    }
}

// DELETE /admin/fixtures/{id}
#[tracing::instrument(name = "Delete fixture", skip(service), fields(fixture_id = %fixture_id))]
pub async fn delete_fixture(
    fixture_id: Uuid,
    service: web::Data<CompetitionService>,
) -> Result<HttpResponse> {
    match service.delete_fixture(fixture_id).await {
        Ok(()) => Ok(HttpResponse::Ok().json(ApiResponse::<()>::success_message("Fixture deleted"))),
        Err(e) => Ok(error_response(&e)),
    }
}
