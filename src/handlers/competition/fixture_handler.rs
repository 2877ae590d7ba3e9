use actix_web::{web, HttpResponse, Result};
use uuid::Uuid;

use crate::handlers::error_response;
use crate::models::common::ApiResponse;
use crate::models::fixture::SubmitResultRequest;
use crate::models::user::Claims;
use crate::services::competition_service::CompetitionService;

#[tracing::instrument(
    name = "Submit fixture result",
    skip(request, service, claims),
    fields(
        fixture_id = %fixture_id,
        user = %claims.username
    )
)]
pub async fn submit_result(
    fixture_id: Uuid,
    request: web::Json<SubmitResultRequest>,
    service: web::Data<CompetitionService>,
    claims: web::ReqData<Claims>,
) -> Result<HttpResponse> {
    match service
        .submit_result(&claims, fixture_id, request.into_inner())
        .await
    {
        Ok(submission) => Ok(HttpResponse::Created().json(ApiResponse::success(
            "Result submitted, awaiting approval",
            submission,
        ))),
        Err(e) => {
            tracing::warn!("Result submission for fixture {} refused: {}", fixture_id, e);
            Ok(error_response(&e))
        }
    }
}

#[tracing::instrument(name = "Get fixture results", skip(service), fields(fixture_id = %fixture_id))]
pub async fn get_results(
    fixture_id: Uuid,
    service: web::Data<CompetitionService>,
) -> Result<HttpResponse> {
    match service.list_results(fixture_id).await {
        Ok(results) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            format!("Found {} submissions", results.len()),
            results,
        ))),
        Err(e) => Ok(error_response(&e)),
    }
}
