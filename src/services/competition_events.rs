use chrono::{DateTime, Utc};
use redis::AsyncCommands;
use redis::Client as RedisClient;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::models::fixture::Fixture;

pub const COMPETITION_EVENTS_CHANNEL: &str = "competition_events";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CompetitionEventType {
    FixtureApproved,
    FixturesGenerated,
    ChampionDecided,
}

impl CompetitionEventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CompetitionEventType::FixtureApproved => "fixture_approved",
            CompetitionEventType::FixturesGenerated => "fixtures_generated",
            CompetitionEventType::ChampionDecided => "champion_decided",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompetitionEvent {
    pub event_type: CompetitionEventType,
    pub competition_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fixture_ids: Option<Vec<Uuid>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team_id: Option<Uuid>,
    pub timestamp: DateTime<Utc>,
}

/// Publishes bracket changes so connected clients can refetch.
///
/// Delivery is best-effort: a failed publish is logged and swallowed.
#[derive(Clone, Default)]
pub struct CompetitionEvents {
    redis_client: Option<Arc<RedisClient>>,
}

impl CompetitionEvents {
    pub fn new(redis_client: Option<Arc<RedisClient>>) -> Self {
        Self { redis_client }
    }

    pub fn disabled() -> Self {
        Self::default()
    }

    async fn publish(&self, event: CompetitionEvent) {
        let Some(redis_client) = &self.redis_client else {
            tracing::debug!(
                "Redis not configured, dropping {} event for competition {}",
                event.event_type.as_str(),
                event.competition_id
            );
            return;
        };

        if let Err(e) = publish_competition_event(redis_client, &event).await {
            tracing::warn!("⚠️ {}", e);
        }
    }

    pub async fn fixture_approved(&self, fixture: &Fixture) {
        self.publish(CompetitionEvent {
            event_type: CompetitionEventType::FixtureApproved,
            competition_id: fixture.competition_id,
            fixture_ids: Some(vec![fixture.id]),
            team_id: None,
            timestamp: Utc::now(),
        })
        .await
    }

    pub async fn fixtures_generated(&self, competition_id: Uuid, fixtures: &[Fixture]) {
        if fixtures.is_empty() {
            return;
        }
        self.publish(CompetitionEvent {
            event_type: CompetitionEventType::FixturesGenerated,
            competition_id,
            fixture_ids: Some(fixtures.iter().map(|f| f.id).collect()),
            team_id: None,
            timestamp: Utc::now(),
        })
        .await
    }

    pub async fn champion_decided(&self, competition_id: Uuid, team_id: Uuid) {
        self.publish(CompetitionEvent {
            event_type: CompetitionEventType::ChampionDecided,
            competition_id,
            fixture_ids: None,
            team_id: Some(team_id),
            timestamp: Utc::now(),
        })
        .await
    }
}

async fn publish_competition_event(
    redis_client: &Arc<RedisClient>,
    event: &CompetitionEvent,
) -> Result<(), String> {
    let mut conn = redis_client
        .get_multiplexed_async_connection()
        .await
        .map_err(|e| format!("Failed to get Redis connection: {}", e))?;

    let message = serde_json::to_string(event)
        .map_err(|e| format!("Failed to serialize competition event: {}", e))?;

    conn.publish::<_, _, ()>(COMPETITION_EVENTS_CHANNEL, message)
        .await
        .map_err(|e| format!("Failed to publish competition event: {}", e))?;

    tracing::info!(
        "Published {} event for competition {}",
        event.event_type.as_str(),
        event.competition_id
    );

    Ok(())
}
