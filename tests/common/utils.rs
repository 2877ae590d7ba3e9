use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use once_cell::sync::Lazy;
use reqwest::Client;
use secrecy::ExposeSecret;
use std::net::TcpListener;
use std::sync::Arc;
use uuid::Uuid;

use cup_league_backend::run;
use cup_league_backend::config::jwt::JwtSettings;
use cup_league_backend::config::settings::{get_config, get_jwt_settings};
use cup_league_backend::db::MemoryStore;
use cup_league_backend::models::user::{Claims, UserRole, UserStatus};
use cup_league_backend::services::{CompetitionEvents, CompetitionService};
use cup_league_backend::telemetry::{get_subscriber, init_subscriber};

// Ensure that the `tracing` stack is only initialised once using `once_cell`
static TRACING: Lazy<()> = Lazy::new(|| {
    let default_filter_level = "info".to_string();
    let subscriber_name = "test".to_string();

    if std::env::var("TEST_LOG").is_ok() {
        let subscriber = get_subscriber(
            subscriber_name,
            default_filter_level,
            std::io::stdout
        );
        init_subscriber(subscriber);
    } else {
        let subscriber = get_subscriber(
            subscriber_name,
            default_filter_level,
            std::io::sink
        );
        init_subscriber(subscriber);
    }
});

pub struct TestApp {
    pub address: String,
    pub store: Arc<MemoryStore>,
    pub service: Arc<CompetitionService>,
    jwt_secret: String,
}

impl TestApp {
    fn token_for(&self, role: UserRole, status: UserStatus, team_id: Option<Uuid>) -> String {
        let claims = Claims {
            sub: Uuid::new_v4().to_string(),
            username: format!("{:?}{}", role, &Uuid::new_v4().to_string()[..8]).to_lowercase(),
            role,
            status,
            team_id,
            exp: (Utc::now() + Duration::hours(1)).timestamp() as usize,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )
        .expect("Failed to sign test token")
    }

    pub fn admin_token(&self) -> String {
        self.token_for(UserRole::Admin, UserStatus::Active, None)
    }

    pub fn inactive_admin_token(&self) -> String {
        self.token_for(UserRole::Admin, UserStatus::Inactive, None)
    }

    pub fn captain_token(&self, team_id: Uuid) -> String {
        self.token_for(UserRole::Captain, UserStatus::Active, Some(team_id))
    }

    pub fn player_token(&self) -> String {
        self.token_for(UserRole::Player, UserStatus::Active, None)
    }
}

/// Start the real server on a random port over an in-memory store.
pub async fn spawn_app() -> TestApp {
    // The first time `initialize` is invoked the code in `TRACING` is executed.
    // All other invocations will instead skip execution.
    Lazy::force(&TRACING);

    let listener = TcpListener::bind("127.0.0.1:0")
        .expect("Failed to bind random port");
    // Get port assigned by the OS
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    let jwt_settings = match get_config() {
        Ok(configuration) => get_jwt_settings(&configuration),
        Err(_) => JwtSettings::new("test-secret".to_string()),
    };
    let jwt_secret = jwt_settings.secret.expose_secret().to_string();

    let store = Arc::new(MemoryStore::new());
    let service = Arc::new(CompetitionService::with_store(
        store.clone(),
        CompetitionEvents::disabled(),
    ));

    let server = run(listener, service.clone(), jwt_settings)
        .expect("Failed to bind address");
    // Launch the server as a background task
    let _ = tokio::spawn(server);

    TestApp {
        address,
        store,
        service,
        jwt_secret,
    }
}

pub async fn make_authenticated_request(
    client: &Client,
    method: reqwest::Method,
    url: &str,
    token: &str,
    body: Option<serde_json::Value>,
) -> reqwest::Response {
    let mut request = client
        .request(method, url)
        .header("Authorization", format!("Bearer {}", token));

    if let Some(json_body) = body {
        request = request.json(&json_body);
    }

    request.send().await.expect("Failed to execute request.")
}
