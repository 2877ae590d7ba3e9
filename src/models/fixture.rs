// src/models/fixture.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use uuid::Uuid;

/// Placeholder kick-off for fixtures nobody has scheduled yet.
pub const UNSCHEDULED_AT: DateTime<Utc> = DateTime::<Utc>::UNIX_EPOCH;

#[derive(Debug, FromRow, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Fixture {
    pub id: Uuid,
    pub competition_id: Uuid,
    pub round: i32,
    pub slot_number: i32,
    pub leg: i32,
    pub home_team_id: Uuid,
    pub away_team_id: Uuid,
    pub home_score: Option<i32>,
    pub away_score: Option<i32>,
    pub approved: bool,
    pub scheduled_for: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Fixture {
    pub fn key(&self) -> FixtureKey {
        FixtureKey {
            competition_id: self.competition_id,
            round: self.round,
            slot_number: self.slot_number,
            leg: self.leg,
        }
    }

    pub fn is_scored(&self) -> bool {
        self.home_score.is_some() && self.away_score.is_some()
    }

    pub fn involves(&self, team_id: Uuid) -> bool {
        self.home_team_id == team_id || self.away_team_id == team_id
    }

    pub fn is_unscheduled(&self) -> bool {
        self.scheduled_for == UNSCHEDULED_AT
    }
}

/// Uniqueness key of a fixture inside a knockout bracket.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FixtureKey {
    pub competition_id: Uuid,
    pub round: i32,
    pub slot_number: i32,
    pub leg: i32,
}

impl fmt::Display for FixtureKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "competition {} round {} slot {} leg {}",
            self.competition_id, self.round, self.slot_number, self.leg
        )
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct NewFixture {
    pub competition_id: Uuid,
    pub round: i32,
    pub slot_number: i32,
    pub leg: i32,
    pub home_team_id: Uuid,
    pub away_team_id: Uuid,
    pub scheduled_for: DateTime<Utc>,
}

impl NewFixture {
    pub fn key(&self) -> FixtureKey {
        FixtureKey {
            competition_id: self.competition_id,
            round: self.round,
            slot_number: self.slot_number,
            leg: self.leg,
        }
    }
}

/// Result of inserting a fixture whose key may already be taken.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted(Fixture),
    /// Another writer created the row first; this is the canonical row.
    AlreadyExists(Fixture),
}

impl InsertOutcome {
    pub fn into_inserted(self) -> Option<Fixture> {
        match self {
            InsertOutcome::Inserted(f) => Some(f),
            InsertOutcome::AlreadyExists(_) => None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "varchar", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SubmissionStatus {
    Pending,
    Approved,
    Rejected,
}

impl SubmissionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionStatus::Pending => "pending",
            SubmissionStatus::Approved => "approved",
            SubmissionStatus::Rejected => "rejected",
        }
    }
}

/// A score reported by one of the two teams playing a fixture.
#[derive(Debug, FromRow, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ResultSubmission {
    pub id: Uuid,
    pub fixture_id: Uuid,
    pub team_id: Uuid,
    pub home_score: i32,
    pub away_score: i32,
    pub status: SubmissionStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, FromRow, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct TieResolution {
    pub competition_id: Uuid,
    pub round: i32,
    pub slot_number: i32,
    pub winner_team_id: Uuid,
    pub resolved_by: String,
    pub created_at: DateTime<Utc>,
}

// Request/Response DTOs
#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitResultRequest {
    pub home_score: i32,
    pub away_score: i32,
}

#[derive(Debug, Serialize, Deserialize, Default)]
pub struct ApproveFixtureRequest {
    /// Scores edited by the admin; when absent the team submissions are used.
    pub home_score: Option<i32>,
    pub away_score: Option<i32>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RescheduleFixtureRequest {
    pub scheduled_for: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ResolveTieRequest {
    pub round: i32,
    pub slot_number: i32,
    pub winner_team_id: Uuid,
}
