// src/routes/competition.rs
use actix_web::{get, post, web, HttpResponse, Result};
use uuid::Uuid;

use crate::handlers::competition::{competition_handler, fixture_handler};
use crate::models::fixture::SubmitResultRequest;
use crate::models::user::Claims;
use crate::services::competition_service::CompetitionService;

#[get("/competitions")]
async fn list_competitions(service: web::Data<CompetitionService>) -> Result<HttpResponse> {
    competition_handler::list_competitions(service).await
}

/// Competition with its registered teams and bracket slots
#[get("/competitions/{competition_id}")]
async fn get_competition(
    path: web::Path<Uuid>,
    service: web::Data<CompetitionService>,
) -> Result<HttpResponse> {
    competition_handler::get_competition(path.into_inner(), service).await
}

#[get("/competitions/{competition_id}/fixtures")]
async fn get_competition_fixtures(
    path: web::Path<Uuid>,
    service: web::Data<CompetitionService>,
) -> Result<HttpResponse> {
    competition_handler::get_competition_fixtures(path.into_inner(), service).await
}

#[get("/competitions/{competition_id}/bracket")]
async fn get_competition_bracket(
    path: web::Path<Uuid>,
    service: web::Data<CompetitionService>,
) -> Result<HttpResponse> {
    competition_handler::get_competition_bracket(path.into_inner(), service).await
}

#[get("/fixtures/{fixture_id}/results")]
async fn get_fixture_results(
    path: web::Path<Uuid>,
    service: web::Data<CompetitionService>,
) -> Result<HttpResponse> {
    fixture_handler::get_results(path.into_inner(), service).await
}

/// A captain reports the score of a fixture their team plays
#[post("/fixtures/{fixture_id}/results")]
async fn submit_fixture_result(
    path: web::Path<Uuid>,
    request: web::Json<SubmitResultRequest>,
    service: web::Data<CompetitionService>,
    claims: web::ReqData<Claims>,
) -> Result<HttpResponse> {
    fixture_handler::submit_result(path.into_inner(), request, service, claims).await
}
