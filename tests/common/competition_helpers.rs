use reqwest::Client;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::common::utils::{make_authenticated_request, TestApp};

pub fn parse_uuid(value: &Value) -> Uuid {
    Uuid::parse_str(value.as_str().expect("Expected a UUID string")).expect("Invalid UUID")
}

pub async fn create_team(app: &TestApp, client: &Client, token: &str) -> Uuid {
    let response = make_authenticated_request(
        client,
        reqwest::Method::POST,
        &format!("{}/admin/teams", app.address),
        token,
        Some(json!({ "name": format!("Team {}", &Uuid::new_v4().to_string()[..8]) })),
    ).await;
    assert_eq!(201, response.status().as_u16());

    let body: Value = response.json().await.expect("Failed to parse response");
    parse_uuid(&body["data"]["id"])
}

pub async fn create_cup(app: &TestApp, client: &Client, token: &str, team_count: i32) -> Uuid {
    let response = make_authenticated_request(
        client,
        reqwest::Method::POST,
        &format!("{}/admin/competitions", app.address),
        token,
        Some(json!({
            "name": format!("Cup {}", &Uuid::new_v4().to_string()[..8]),
            "competition_type": "cup",
            "team_count": team_count
        })),
    ).await;
    assert_eq!(201, response.status().as_u16());

    let body: Value = response.json().await.expect("Failed to parse response");
    parse_uuid(&body["data"]["id"])
}

/// A cup with `registered` teams signed up and no bracket yet.
pub async fn create_registered_cup(
    app: &TestApp,
    client: &Client,
    team_count: i32,
    registered: i32,
) -> (Uuid, Vec<Uuid>) {
    let token = app.admin_token();
    let competition_id = create_cup(app, client, &token, team_count).await;

    let mut teams = Vec::new();
    for _ in 0..registered {
        let team_id = create_team(app, client, &token).await;
        let response = make_authenticated_request(
            client,
            reqwest::Method::POST,
            &format!("{}/admin/competitions/{}/teams", app.address, competition_id),
            &token,
            Some(json!({ "team_id": team_id })),
        ).await;
        assert_eq!(201, response.status().as_u16());
        teams.push(team_id);
    }

    (competition_id, teams)
}

/// A cup with `team_count` registered teams placed in positions `1..=team_count`.
pub async fn create_seeded_cup(app: &TestApp, client: &Client, team_count: i32) -> (Uuid, Vec<Uuid>) {
    let token = app.admin_token();
    let (competition_id, teams) = create_registered_cup(app, client, team_count, team_count).await;

    let slots: Vec<Value> = teams
        .iter()
        .enumerate()
        .map(|(i, team_id)| json!({ "position": i + 1, "team_id": team_id }))
        .collect();
    let response = make_authenticated_request(
        client,
        reqwest::Method::PUT,
        &format!("{}/admin/competitions/{}/bracket", app.address, competition_id),
        &token,
        Some(json!({ "slots": slots })),
    ).await;
    assert_eq!(200, response.status().as_u16());

    (competition_id, teams)
}

pub async fn get_fixtures(app: &TestApp, client: &Client, competition_id: Uuid) -> Vec<Value> {
    let response = make_authenticated_request(
        client,
        reqwest::Method::GET,
        &format!("{}/competitions/{}/fixtures", app.address, competition_id),
        &app.player_token(),
        None,
    ).await;
    assert_eq!(200, response.status().as_u16());

    let body: Value = response.json().await.expect("Failed to parse response");
    body["data"].as_array().cloned().unwrap_or_default()
}

pub fn fixtures_in_round(fixtures: &[Value], round: i64) -> Vec<Value> {
    fixtures
        .iter()
        .filter(|f| f["round"].as_i64() == Some(round))
        .cloned()
        .collect()
}

pub async fn approve_fixture(
    app: &TestApp,
    client: &Client,
    fixture_id: Uuid,
    home_score: i32,
    away_score: i32,
) -> reqwest::Response {
    make_authenticated_request(
        client,
        reqwest::Method::POST,
        &format!("{}/admin/fixtures/{}/approve", app.address, fixture_id),
        &app.admin_token(),
        Some(json!({ "home_score": home_score, "away_score": away_score })),
    ).await
}

/// Approve every fixture of a round so that the first-listed team of each
/// slot's leg 1 wins 2-0 and then draws 1-1 away.
pub async fn play_round_home_side_wins(app: &TestApp, client: &Client, competition_id: Uuid, round: i64) {
    let fixtures = fixtures_in_round(&get_fixtures(app, client, competition_id).await, round);
    assert!(!fixtures.is_empty(), "round {} has no fixtures", round);

    for fixture in fixtures {
        let (home, away) = if fixture["leg"].as_i64() == Some(1) { (2, 0) } else { (1, 1) };
        let response = approve_fixture(app, client, parse_uuid(&fixture["id"]), home, away).await;
        assert_eq!(200, response.status().as_u16());
    }
}

pub async fn submit_result(
    app: &TestApp,
    client: &Client,
    fixture_id: Uuid,
    team_id: Uuid,
    home_score: i32,
    away_score: i32,
) -> reqwest::Response {
    make_authenticated_request(
        client,
        reqwest::Method::POST,
        &format!("{}/fixtures/{}/results", app.address, fixture_id),
        &app.captain_token(team_id),
        Some(json!({ "home_score": home_score, "away_score": away_score })),
    ).await
}

/// Approve without edited scores, relying on the captains' submissions.
pub async fn approve_submitted(app: &TestApp, client: &Client, fixture_id: Uuid) -> reqwest::Response {
    make_authenticated_request(
        client,
        reqwest::Method::POST,
        &format!("{}/admin/fixtures/{}/approve", app.address, fixture_id),
        &app.admin_token(),
        None,
    ).await
}
