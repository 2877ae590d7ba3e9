use std::collections::HashSet;
use uuid::Uuid;

use crate::knockout::bracket::BracketShape;
use crate::models::competition::{
    BracketSlotAssignment, Competition, CompetitionType, CreateCompetitionRequest,
    SlotAssignmentEntry,
};
use crate::services::competition_service::CompetitionError;

pub const MAX_NAME_LENGTH: usize = 100;
pub const MAX_SCORE: i32 = 50;

fn invalid(message: impl Into<String>) -> CompetitionError {
    CompetitionError::Validation(message.into())
}

/// Centralized validation for competition operations
#[derive(Debug, Default, Clone, Copy)]
pub struct CompetitionValidator;

impl CompetitionValidator {
    pub fn new() -> Self {
        Self
    }

    pub fn validate_create_competition_request(
        &self,
        request: &CreateCompetitionRequest,
    ) -> Result<(), CompetitionError> {
        self.validate_name("Competition", &request.name)?;
        self.validate_team_count(request.competition_type, request.team_count)?;
        Ok(())
    }

    /// Names are trimmed, non-empty, bounded and carry some alphanumeric content.
    pub fn validate_name(&self, what: &str, name: &str) -> Result<(), CompetitionError> {
        let trimmed = name.trim();

        if trimmed.is_empty() {
            return Err(invalid(format!("{} name cannot be empty", what)));
        }

        if trimmed.chars().count() > MAX_NAME_LENGTH {
            return Err(invalid(format!(
                "{} name too long (maximum {} characters)",
                what, MAX_NAME_LENGTH
            )));
        }

        if trimmed.contains('\0') {
            return Err(invalid(format!("{} name contains invalid characters", what)));
        }

        if !trimmed.chars().any(|c| c.is_alphanumeric()) {
            return Err(invalid(format!(
                "{} name must contain alphanumeric characters",
                what
            )));
        }

        Ok(())
    }

    /// Allowed field sizes per competition type.
    ///
    /// Cups are brackets and need a power of two. Leagues play a double round
    /// robin and need an even field; champions groups are built from pots of four.
    pub fn validate_team_count(
        &self,
        competition_type: CompetitionType,
        team_count: i32,
    ) -> Result<(), CompetitionError> {
        match competition_type {
            CompetitionType::Cup => {
                BracketShape::new(team_count)?;
            }
            CompetitionType::League => {
                if !(4..=20).contains(&team_count) || team_count % 2 != 0 {
                    return Err(invalid(format!(
                        "League team count must be an even number between 4 and 20, got {}",
                        team_count
                    )));
                }
            }
            CompetitionType::Champions => {
                if !(8..=36).contains(&team_count) || team_count % 4 != 0 {
                    return Err(invalid(format!(
                        "Champions team count must be a multiple of 4 between 8 and 36, got {}",
                        team_count
                    )));
                }
            }
        }
        Ok(())
    }

    pub fn validate_scores(&self, home_score: i32, away_score: i32) -> Result<(), CompetitionError> {
        for (side, score) in [("Home", home_score), ("Away", away_score)] {
            if !(0..=MAX_SCORE).contains(&score) {
                return Err(invalid(format!(
                    "{} score must be between 0 and {}, got {}",
                    side, MAX_SCORE, score
                )));
            }
        }
        Ok(())
    }

    /// Check a full bracket assignment: every position `1..=team_count` filled
    /// exactly once, every team registered in the competition and placed once.
    pub fn validate_bracket_slots(
        &self,
        competition: &Competition,
        entries: &[SlotAssignmentEntry],
        registered_team_ids: &[Uuid],
    ) -> Result<Vec<BracketSlotAssignment>, CompetitionError> {
        let team_count = competition.team_count;

        if entries.len() as i32 != team_count {
            return Err(invalid(format!(
                "Bracket needs exactly {} slot assignments, got {}",
                team_count,
                entries.len()
            )));
        }

        let registered: HashSet<&Uuid> = registered_team_ids.iter().collect();
        let mut positions = HashSet::new();
        let mut teams = HashSet::new();

        for entry in entries {
            if !(1..=team_count).contains(&entry.position) {
                return Err(invalid(format!(
                    "Bracket position {} outside 1..={}",
                    entry.position, team_count
                )));
            }
            if !positions.insert(entry.position) {
                return Err(invalid(format!("Bracket position {} assigned twice", entry.position)));
            }
            if !teams.insert(entry.team_id) {
                return Err(invalid(format!("Team {} placed in the bracket twice", entry.team_id)));
            }
            if !registered.contains(&entry.team_id) {
                return Err(invalid(format!(
                    "Team {} is not registered in competition {}",
                    entry.team_id, competition.id
                )));
            }
        }

        let mut slots: Vec<BracketSlotAssignment> = entries
            .iter()
            .map(|entry| BracketSlotAssignment {
                competition_id: competition.id,
                position: entry.position,
                team_id: entry.team_id,
            })
            .collect();
        slots.sort_by_key(|s| s.position);
        Ok(slots)
    }
}
