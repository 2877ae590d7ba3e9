use std::net::TcpListener;
use std::sync::Arc;
use secrecy::ExposeSecret;
use sqlx::postgres::PgPoolOptions;
use std::time::Duration;

use cup_league_backend::run;
use cup_league_backend::config::settings::{get_config, get_jwt_settings, get_redis_url};
use cup_league_backend::db::PgStore;
use cup_league_backend::services::{CompetitionEvents, CompetitionService, SchedulerService};
use cup_league_backend::telemetry::{get_subscriber, init_subscriber};

#[tokio::main]
async fn main() -> std::io::Result<()> {
    // Panic if we can't read the config
    let config = get_config().expect("Failed to read the config.");

    let subscriber = get_subscriber(
        "cup-league-backend".into(),
        config.application.log_level.clone(),
        std::io::stdout
    );
    init_subscriber(subscriber);

    // JWT
    let jwt_settings = get_jwt_settings(&config);

    // Redis is optional; without it bracket events are not broadcast
    let redis_client = match get_redis_url(&config) {
        Some(url) => match redis::Client::open(url.expose_secret()) {
            Ok(client) => {
                tracing::info!("Redis client created successfully");
                Some(Arc::new(client))
            }
            Err(e) => {
                tracing::error!("Failed to create Redis client: {}. Realtime events are disabled.", e);
                None
            }
        },
        None => {
            tracing::info!("No Redis configured, realtime events are disabled");
            None
        }
    };

    // Only try to establish connection when actually used
    let connection_pool = PgPoolOptions::new()
        .max_connections(32)
        .acquire_timeout(Duration::from_secs(10))
        .idle_timeout(Duration::from_secs(600))
        .max_lifetime(Duration::from_secs(1800))
        .connect_lazy(
            config.database.connection_string().expose_secret()
        )
        .expect("Failed to create Postgres connection pool");

    if let Err(e) = sqlx::migrate!("./migrations").run(&connection_pool).await {
        tracing::error!("❌ Failed to run database migrations: {}", e);
        std::process::exit(1);
    }

    let store = Arc::new(PgStore::new(connection_pool));
    let competition_service = Arc::new(CompetitionService::with_store(
        store,
        CompetitionEvents::new(redis_client),
    ));

    let address = format!("{}:{}", config.application.host, config.application.port);
    let listener = TcpListener::bind(&address)?;

    // The scheduler has to stay alive for the lifetime of the server
    let _scheduler_service = if config.knockout.sweep_enabled {
        let scheduler = match SchedulerService::new(competition_service.clone()).await {
            Ok(scheduler) => scheduler,
            Err(e) => {
                tracing::error!("❌ Failed to create scheduler service: {}", e);
                std::process::exit(1);
            }
        };
        if let Err(e) = scheduler.schedule_bracket_sweep(&config.knockout.sweep_cron).await {
            tracing::error!("❌ Invalid bracket sweep schedule '{}': {}", config.knockout.sweep_cron, e);
            std::process::exit(1);
        }
        if let Err(e) = scheduler.start().await {
            tracing::error!("❌ Failed to start scheduler: {}", e);
            std::process::exit(1);
        }
        Some(scheduler)
    } else {
        tracing::info!("Bracket sweep disabled");
        None
    };

    tracing::info!("Listening on {}", address);
    run(listener, competition_service, jwt_settings)?.await
}
