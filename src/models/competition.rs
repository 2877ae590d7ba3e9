// src/models/competition.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "varchar", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum CompetitionType {
    League,
    Champions,
    Cup,
}

impl CompetitionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CompetitionType::League => "league",
            CompetitionType::Champions => "champions",
            CompetitionType::Cup => "cup",
        }
    }

    /// Only cup competitions are played as a single-elimination bracket
    pub fn is_knockout(&self) -> bool {
        matches!(self, CompetitionType::Cup)
    }
}

impl fmt::Display for CompetitionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "varchar", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum CompetitionStatus {
    Active,
    Completed,
}

impl CompetitionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CompetitionStatus::Active => "active",
            CompetitionStatus::Completed => "completed",
        }
    }
}

#[derive(Debug, FromRow, Serialize, Deserialize, Clone)]
pub struct Competition {
    pub id: Uuid,
    pub name: String,
    pub competition_type: CompetitionType,
    pub team_count: i32,
    pub status: CompetitionStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, FromRow, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Team {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, FromRow, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct BracketSlotAssignment {
    pub competition_id: Uuid,
    pub position: i32,
    pub team_id: Uuid,
}

#[derive(Debug, Clone)]
pub struct NewCompetition {
    pub name: String,
    pub competition_type: CompetitionType,
    pub team_count: i32,
}

// Request/Response DTOs
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CreateCompetitionRequest {
    pub name: String,
    pub competition_type: CompetitionType,
    pub team_count: i32,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CreateTeamRequest {
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RegisterTeamRequest {
    pub team_id: Uuid,
}

/// Team placed at a bracket position. Positions `2k-1` and `2k` meet in round-1 slot `k`.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SlotAssignmentEntry {
    pub position: i32,
    pub team_id: Uuid,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SaveBracketRequest {
    pub slots: Vec<SlotAssignmentEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CompetitionDetails {
    pub competition: Competition,
    pub teams: Vec<Team>,
    pub bracket_slots: Vec<BracketSlotAssignment>,
}
