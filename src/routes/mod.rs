use actix_web::web;

pub mod admin;
pub mod backend_health;
pub mod competition;

use crate::middleware::auth::AuthMiddleware;

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(backend_health::backend_health);

    // Admin routes carry their own middleware and must be registered before
    // the catch-all authenticated scope
    admin::init_admin_routes(cfg);

    cfg.service(
        web::scope("")
            .wrap(AuthMiddleware::members())
            .service(competition::list_competitions)
            .service(competition::get_competition)
            .service(competition::get_competition_fixtures)
            .service(competition::get_competition_bracket)
            .service(competition::get_fixture_results)
            .service(competition::submit_fixture_result)
    );
}
