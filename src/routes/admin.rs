use actix_web::{web, HttpResponse, Result};
use uuid::Uuid;

use crate::handlers::admin::{competition_handler, fixture_handler};
use crate::middleware::auth::AuthMiddleware;
use crate::models::competition::{RegisterTeamRequest, SaveBracketRequest};
use crate::models::fixture::{ApproveFixtureRequest, RescheduleFixtureRequest, ResolveTieRequest};
use crate::models::user::Claims;
use crate::services::competition_service::CompetitionService;

pub fn init_admin_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin")
            .wrap(AuthMiddleware::admins())
            // Team management routes
            .service(
                web::resource("/teams")
                    .route(web::get().to(competition_handler::get_teams))
                    .route(web::post().to(competition_handler::create_team))
            )

            // Competition management routes
            .service(
                web::resource("/competitions")
                    .route(web::post().to(competition_handler::create_competition))
            )
            .service(
                web::resource("/competitions/{id}/teams")
                    .route(web::post().to(register_team))
            )
            .service(
                web::resource("/competitions/{id}/bracket")
                    .route(web::put().to(save_bracket))
            )
            .service(
                web::resource("/competitions/{id}/bracket/randomize")
                    .route(web::post().to(randomize_bracket))
            )
            .service(
                web::resource("/competitions/{id}/advance")
                    .route(web::post().to(advance_bracket))
            )
            .service(
                web::resource("/competitions/{id}/ties")
                    .route(web::post().to(resolve_tie))
            )

            // Fixture management routes
            .service(
                web::resource("/fixtures/{id}")
                    .route(web::delete().to(delete_fixture))
            )
            .service(
                web::resource("/fixtures/{id}/approve")
                    .route(web::post().to(approve_fixture))
            )
            .service(
                web::resource("/fixtures/{id}/reject")
                    .route(web::post().to(reject_fixture))
            )
            .service(
                web::resource("/fixtures/{id}/schedule")
                    .route(web::patch().to(reschedule_fixture))
            )
    );
}

async fn register_team(
    path: web::Path<Uuid>,
    request: web::Json<RegisterTeamRequest>,
    service: web::Data<CompetitionService>,
) -> Result<HttpResponse> {
    competition_handler::register_team(path.into_inner(), request, service).await
}

async fn save_bracket(
    path: web::Path<Uuid>,
    request: web::Json<SaveBracketRequest>,
    service: web::Data<CompetitionService>,
    claims: web::ReqData<Claims>,
) -> Result<HttpResponse> {
    competition_handler::save_bracket(path.into_inner(), request, service, claims).await
}

async fn randomize_bracket(
    path: web::Path<Uuid>,
    service: web::Data<CompetitionService>,
    claims: web::ReqData<Claims>,
) -> Result<HttpResponse> {
    competition_handler::randomize_bracket(path.into_inner(), service, claims).await
}

async fn advance_bracket(
    path: web::Path<Uuid>,
    service: web::Data<CompetitionService>,
    claims: web::ReqData<Claims>,
) -> Result<HttpResponse> {
    competition_handler::advance_bracket(path.into_inner(), service, claims).await
}

async fn resolve_tie(
    path: web::Path<Uuid>,
    request: web::Json<ResolveTieRequest>,
    service: web::Data<CompetitionService>,
    claims: web::ReqData<Claims>,
) -> Result<HttpResponse> {
    competition_handler::resolve_tie(path.into_inner(), request, service, claims).await
}

async fn approve_fixture(
    path: web::Path<Uuid>,
    request: Option<web::Json<ApproveFixtureRequest>>,
    service: web::Data<CompetitionService>,
    claims: web::ReqData<Claims>,
) -> Result<HttpResponse> {
    fixture_handler::approve_fixture(path.into_inner(), request, service, claims).await
}

async fn reject_fixture(
    path: web::Path<Uuid>,
    service: web::Data<CompetitionService>,
) -> Result<HttpResponse> {
    fixture_handler::reject_fixture(path.into_inner(), service).await
}

async fn reschedule_fixture(
    path: web::Path<Uuid>,
    request: web::Json<RescheduleFixtureRequest>,
    service: web::Data<CompetitionService>,
) -> Result<HttpResponse> {
    fixture_handler::reschedule_fixture(path.into_inner(), request, service).await
}

async fn delete_fixture(
    path: web::Path<Uuid>,
    service: web::Data<CompetitionService>,
) -> Result<HttpResponse> {
    fixture_handler::delete_fixture(path.into_inner(), service).await
}
