use actix_web::{web, HttpResponse, Result};
use uuid::Uuid;

use crate::handlers::error_response;
use crate::models::common::ApiResponse;
use crate::models::competition::{
    CreateCompetitionRequest, CreateTeamRequest, RegisterTeamRequest, SaveBracketRequest,
};
use crate::models::fixture::ResolveTieRequest;
use crate::models::user::Claims;
use crate::services::competition_service::CompetitionService;

// POST /admin/teams
#[tracing::instrument(name = "Create team", skip(request, service), fields(name = %request.name))]
pub async fn create_team(
    request: web::Json<CreateTeamRequest>,
    service: web::Data<CompetitionService>,
) -> Result<HttpResponse> {
    match service.create_team(request.into_inner()).await {
        Ok(team) => Ok(HttpResponse::Created().json(ApiResponse::success(
            "Team created successfully",
            team,
        ))),
        Err(e) => Ok(error_response(&e)),
    }
}

// GET /admin/teams
#[tracing::instrument(name = "List teams", skip(service))]
pub async fn get_teams(service: web::Data<CompetitionService>) -> Result<HttpResponse> {
    match service.list_teams().await {
        Ok(teams) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            format!("Found {} teams", teams.len()),
            teams,
        ))),
        Err(e) => Ok(error_response(&e)),
    }
}

// POST /admin/competitions
#[tracing::instrument(
    name = "Create competition",
    skip(request, service, claims),
    fields(
        name = %request.name,
        competition_type = %request.competition_type,
        team_count = request.team_count,
        admin_user = %claims.username
    )
)]
pub async fn create_competition(
    request: web::Json<CreateCompetitionRequest>,
    service: web::Data<CompetitionService>,
    claims: web::ReqData<Claims>,
) -> Result<HttpResponse> {
    match service.create_competition(request.into_inner()).await {
        Ok(competition) => Ok(HttpResponse::Created().json(ApiResponse::success(
            "Competition created successfully",
            competition,
        ))),
        Err(e) => {
            tracing::warn!("Competition creation refused: {}", e);
            Ok(error_response(&e))
        }
    }
}

// POST /admin/competitions/{id}/teams
#[tracing::instrument(
    name = "Register competition team",
    skip(request, service),
    fields(competition_id = %competition_id, team_id = %request.team_id)
)]
pub async fn register_team(
    competition_id: Uuid,
    request: web::Json<RegisterTeamRequest>,
    service: web::Data<CompetitionService>,
) -> Result<HttpResponse> {
    match service.register_team(competition_id, request.into_inner()).await {
        Ok(team) => Ok(HttpResponse::Created().json(ApiResponse::success(
            format!("Team '{}' registered", team.name),
            team,
        ))),
        Err(e) => Ok(error_response(&e)),
    }
}

// PUT /admin/competitions/{id}/bracket
#[tracing::instrument(
    name = "Save bracket",
    skip(request, service, claims),
    fields(competition_id = %competition_id, admin_user = %claims.username)
)]
pub async fn save_bracket(
    competition_id: Uuid,
    request: web::Json<SaveBracketRequest>,
    service: web::Data<CompetitionService>,
    claims: web::ReqData<Claims>,
) -> Result<HttpResponse> {
    match service.save_bracket(competition_id, request.into_inner()).await {
        Ok(fixtures) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            format!("Bracket saved with {} opening fixtures", fixtures.len()),
            fixtures,
        ))),
        Err(e) => {
            tracing::warn!("Saving bracket for {} failed: {}", competition_id, e);
            Ok(error_response(&e))
        }
    }
}

// POST /admin/competitions/{id}/bracket/randomize
#[tracing::instrument(
    name = "Randomize bracket",
    skip(service, claims),
    fields(competition_id = %competition_id, admin_user = %claims.username)
)]
pub async fn randomize_bracket(
    competition_id: Uuid,
    service: web::Data<CompetitionService>,
    claims: web::ReqData<Claims>,
) -> Result<HttpResponse> {
    match service.randomize_bracket(competition_id).await {
        Ok(draw) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            format!("Bracket drawn with {} opening fixtures", draw.fixtures.len()),
            draw,
        ))),
        Err(e) => {
            tracing::warn!("Drawing bracket for {} failed: {}", competition_id, e);
            Ok(error_response(&e))
        }
    }
}

// POST /admin/competitions/{id}/advance
#[tracing::instrument(
    name = "Advance bracket",
    skip(service, claims),
    fields(competition_id = %competition_id, admin_user = %claims.username)
)]
pub async fn advance_bracket(
    competition_id: Uuid,
    service: web::Data<CompetitionService>,
    claims: web::ReqData<Claims>,
) -> Result<HttpResponse> {
    match service.advance(competition_id).await {
        Ok(report) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            format!("{} fixtures created", report.created.len()),
            report,
        ))),
        Err(e) => Ok(error_response(&e)),
    }
}

// POST /admin/competitions/{id}/ties
#[tracing::instrument(
    name = "Resolve tie",
    skip(request, service, claims),
    fields(
        competition_id = %competition_id,
        round = request.round,
        slot_number = request.slot_number,
        admin_user = %claims.username
    )
)]
pub async fn resolve_tie(
    competition_id: Uuid,
    request: web::Json<ResolveTieRequest>,
    service: web::Data<CompetitionService>,
    claims: web::ReqData<Claims>,
) -> Result<HttpResponse> {
    match service
        .resolve_tie(competition_id, request.into_inner(), &claims.username)
        .await
    {
        Ok(report) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            "Tie resolved",
            report,
        ))),
        Err(e) => {
            tracing::warn!("Tie resolution for {} refused: {}", competition_id, e);
            Ok(error_response(&e))
        }
    }
}
