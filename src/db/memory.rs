//! In-process store used by the test suite and for running without a database.
//!
//! A single `RwLock` guards all tables so check-and-insert is atomic, which is
//! what the unique index gives `PgStore`.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{CompetitionStore, FixtureStore, StoreError, StoreResult};
use crate::models::competition::{
    BracketSlotAssignment, Competition, CompetitionStatus, CompetitionType, NewCompetition, Team,
};
use crate::models::fixture::{
    Fixture, FixtureKey, InsertOutcome, NewFixture, ResultSubmission, SubmissionStatus,
    TieResolution,
};

#[derive(Debug, Default)]
struct Tables {
    competitions: HashMap<Uuid, Competition>,
    teams: HashMap<Uuid, Team>,
    competition_teams: Vec<(Uuid, Uuid)>,
    bracket_slots: HashMap<Uuid, Vec<BracketSlotAssignment>>,
    fixtures: HashMap<Uuid, Fixture>,
    fixture_keys: HashMap<FixtureKey, Uuid>,
    submissions: HashMap<(Uuid, Uuid), ResultSubmission>,
    tie_resolutions: HashMap<(Uuid, i32, i32), TieResolution>,
}

impl Tables {
    fn fixture_mut(&mut self, fixture_id: Uuid) -> StoreResult<&mut Fixture> {
        self.fixtures
            .get_mut(&fixture_id)
            .ok_or_else(|| StoreError::NotFound(format!("Fixture {}", fixture_id)))
    }

    fn insert(&mut self, fixture: NewFixture) -> InsertOutcome {
        let key = fixture.key();
        if let Some(existing) = self.fixture_keys.get(&key).and_then(|id| self.fixtures.get(id)) {
            return InsertOutcome::AlreadyExists(existing.clone());
        }

        let now = Utc::now();
        let row = Fixture {
            id: Uuid::new_v4(),
            competition_id: fixture.competition_id,
            round: fixture.round,
            slot_number: fixture.slot_number,
            leg: fixture.leg,
            home_team_id: fixture.home_team_id,
            away_team_id: fixture.away_team_id,
            home_score: None,
            away_score: None,
            approved: false,
            scheduled_for: fixture.scheduled_for,
            created_at: now,
            updated_at: now,
        };
        self.fixture_keys.insert(key, row.id);
        self.fixtures.insert(row.id, row.clone());
        InsertOutcome::Inserted(row)
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FixtureStore for MemoryStore {
    async fn list_fixtures(&self, competition_id: Uuid) -> StoreResult<Vec<Fixture>> {
        let tables = self.tables.read().await;
        let mut fixtures: Vec<Fixture> = tables
            .fixtures
            .values()
            .filter(|f| f.competition_id == competition_id)
            .cloned()
            .collect();
        fixtures.sort_by_key(|f| (f.round, f.slot_number, f.leg));
        Ok(fixtures)
    }

    async fn get_fixture(&self, fixture_id: Uuid) -> StoreResult<Option<Fixture>> {
        Ok(self.tables.read().await.fixtures.get(&fixture_id).cloned())
    }

    async fn insert_fixture(&self, fixture: NewFixture) -> StoreResult<InsertOutcome> {
        Ok(self.tables.write().await.insert(fixture))
    }

    async fn insert_fixtures(&self, fixtures: Vec<NewFixture>) -> StoreResult<Vec<InsertOutcome>> {
        let mut tables = self.tables.write().await;
        Ok(fixtures.into_iter().map(|f| tables.insert(f)).collect())
    }

    async fn update_approval(
        &self,
        fixture_id: Uuid,
        home_score: i32,
        away_score: i32,
        approved: bool,
    ) -> StoreResult<Fixture> {
        let mut tables = self.tables.write().await;
        let fixture = tables.fixture_mut(fixture_id)?;
        if fixture.approved {
            return Err(StoreError::Conflict(format!(
                "Fixture {} is already approved",
                fixture_id
            )));
        }
        fixture.home_score = Some(home_score);
        fixture.away_score = Some(away_score);
        fixture.approved = approved;
        fixture.updated_at = Utc::now();
        Ok(fixture.clone())
    }

    async fn reschedule_fixture(
        &self,
        fixture_id: Uuid,
        scheduled_for: DateTime<Utc>,
    ) -> StoreResult<Fixture> {
        let mut tables = self.tables.write().await;
        let fixture = tables.fixture_mut(fixture_id)?;
        fixture.scheduled_for = scheduled_for;
        fixture.updated_at = Utc::now();
        Ok(fixture.clone())
    }

    async fn delete_fixture(&self, fixture_id: Uuid) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        let fixture = tables.fixture_mut(fixture_id)?;
        if fixture.approved {
            return Err(StoreError::Conflict(format!(
                "Fixture {} is approved and cannot be deleted",
                fixture_id
            )));
        }
        let key = fixture.key();
        tables.fixtures.remove(&fixture_id);
        tables.fixture_keys.remove(&key);
        tables.submissions.retain(|(fixture, _), _| *fixture != fixture_id);
        Ok(())
    }

    async fn upsert_result_submission(
        &self,
        fixture_id: Uuid,
        team_id: Uuid,
        home_score: i32,
        away_score: i32,
    ) -> StoreResult<ResultSubmission> {
        let mut tables = self.tables.write().await;
        if !tables.fixtures.contains_key(&fixture_id) {
            return Err(StoreError::NotFound(format!("Fixture {}", fixture_id)));
        }

        let now = Utc::now();
        let submission = tables
            .submissions
            .entry((fixture_id, team_id))
            .and_modify(|s| {
                s.home_score = home_score;
                s.away_score = away_score;
                s.status = SubmissionStatus::Pending;
                s.updated_at = now;
            })
            .or_insert_with(|| ResultSubmission {
                id: Uuid::new_v4(),
                fixture_id,
                team_id,
                home_score,
                away_score,
                status: SubmissionStatus::Pending,
                created_at: now,
                updated_at: now,
            });
        Ok(submission.clone())
    }

    async fn list_result_submissions(&self, fixture_id: Uuid) -> StoreResult<Vec<ResultSubmission>> {
        let tables = self.tables.read().await;
        let mut submissions: Vec<ResultSubmission> = tables
            .submissions
            .values()
            .filter(|s| s.fixture_id == fixture_id)
            .cloned()
            .collect();
        submissions.sort_by_key(|s| s.created_at);
        Ok(submissions)
    }

    async fn set_result_submissions_status(
        &self,
        fixture_id: Uuid,
        status: SubmissionStatus,
    ) -> StoreResult<u64> {
        let mut tables = self.tables.write().await;
        let now = Utc::now();
        let mut updated = 0;
        for submission in tables.submissions.values_mut().filter(|s| s.fixture_id == fixture_id) {
            submission.status = status;
            submission.updated_at = now;
            updated += 1;
        }
        Ok(updated)
    }

    async fn record_tie_resolution(&self, resolution: TieResolution) -> StoreResult<TieResolution> {
        let mut tables = self.tables.write().await;
        let key = (resolution.competition_id, resolution.round, resolution.slot_number);
        tables.tie_resolutions.insert(key, resolution.clone());
        Ok(resolution)
    }

    async fn list_tie_resolutions(&self, competition_id: Uuid) -> StoreResult<Vec<TieResolution>> {
        let tables = self.tables.read().await;
        Ok(tables
            .tie_resolutions
            .values()
            .filter(|r| r.competition_id == competition_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl CompetitionStore for MemoryStore {
    async fn create_competition(&self, competition: NewCompetition) -> StoreResult<Competition> {
        let now = Utc::now();
        let row = Competition {
            id: Uuid::new_v4(),
            name: competition.name,
            competition_type: competition.competition_type,
            team_count: competition.team_count,
            status: CompetitionStatus::Active,
            created_at: now,
            updated_at: now,
        };
        self.tables.write().await.competitions.insert(row.id, row.clone());
        Ok(row)
    }

    async fn get_competition(&self, competition_id: Uuid) -> StoreResult<Option<Competition>> {
        Ok(self.tables.read().await.competitions.get(&competition_id).cloned())
    }

    async fn list_competitions(&self) -> StoreResult<Vec<Competition>> {
        let tables = self.tables.read().await;
        let mut competitions: Vec<Competition> = tables.competitions.values().cloned().collect();
        competitions.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(competitions)
    }

    async fn list_active_competitions(
        &self,
        competition_type: CompetitionType,
    ) -> StoreResult<Vec<Competition>> {
        let tables = self.tables.read().await;
        Ok(tables
            .competitions
            .values()
            .filter(|c| c.competition_type == competition_type && c.status == CompetitionStatus::Active)
            .cloned()
            .collect())
    }

    async fn set_competition_status(
        &self,
        competition_id: Uuid,
        status: CompetitionStatus,
    ) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        let competition = tables
            .competitions
            .get_mut(&competition_id)
            .ok_or_else(|| StoreError::NotFound(format!("Competition {}", competition_id)))?;
        competition.status = status;
        competition.updated_at = Utc::now();
        Ok(())
    }

    async fn create_team(&self, name: String) -> StoreResult<Team> {
        let mut tables = self.tables.write().await;
        if tables.teams.values().any(|t| t.name == name) {
            return Err(StoreError::Conflict(format!("Team name '{}' is already taken", name)));
        }
        let team = Team {
            id: Uuid::new_v4(),
            name,
            created_at: Utc::now(),
        };
        tables.teams.insert(team.id, team.clone());
        Ok(team)
    }

    async fn get_team(&self, team_id: Uuid) -> StoreResult<Option<Team>> {
        Ok(self.tables.read().await.teams.get(&team_id).cloned())
    }

    async fn list_teams(&self) -> StoreResult<Vec<Team>> {
        let tables = self.tables.read().await;
        let mut teams: Vec<Team> = tables.teams.values().cloned().collect();
        teams.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(teams)
    }

    async fn add_competition_team(&self, competition_id: Uuid, team_id: Uuid) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        if !tables.competitions.contains_key(&competition_id) {
            return Err(StoreError::NotFound(format!("Competition {}", competition_id)));
        }
        if !tables.teams.contains_key(&team_id) {
            return Err(StoreError::NotFound(format!("Team {}", team_id)));
        }
        if tables.competition_teams.contains(&(competition_id, team_id)) {
            return Err(StoreError::Conflict(format!(
                "Team {} is already registered in competition {}",
                team_id, competition_id
            )));
        }
        tables.competition_teams.push((competition_id, team_id));
        Ok(())
    }

    async fn list_competition_teams(&self, competition_id: Uuid) -> StoreResult<Vec<Team>> {
        let tables = self.tables.read().await;
        let mut teams: Vec<Team> = tables
            .competition_teams
            .iter()
            .filter(|(competition, _)| *competition == competition_id)
            .filter_map(|(_, team)| tables.teams.get(team).cloned())
            .collect();
        teams.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(teams)
    }

    async fn save_bracket_slots(
        &self,
        competition_id: Uuid,
        mut slots: Vec<BracketSlotAssignment>,
    ) -> StoreResult<()> {
        slots.sort_by_key(|s| s.position);
        self.tables.write().await.bracket_slots.insert(competition_id, slots);
        Ok(())
    }

    async fn list_bracket_slots(&self, competition_id: Uuid) -> StoreResult<Vec<BracketSlotAssignment>> {
        Ok(self
            .tables
            .read()
            .await
            .bracket_slots
            .get(&competition_id)
            .cloned()
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixture::UNSCHEDULED_AT;

    async fn store_with_fixture() -> (MemoryStore, Fixture) {
        let store = MemoryStore::new();
        let outcome = store
            .insert_fixture(NewFixture {
                competition_id: Uuid::new_v4(),
                round: 1,
                slot_number: 1,
                leg: 1,
                home_team_id: Uuid::new_v4(),
                away_team_id: Uuid::new_v4(),
                scheduled_for: UNSCHEDULED_AT,
            })
            .await
            .unwrap();
        match outcome {
            InsertOutcome::Inserted(fixture) => (store, fixture),
            other => panic!("Expected a fresh fixture, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_first_approval_wins() {
        let (store, fixture) = store_with_fixture().await;

        store.update_approval(fixture.id, 2, 0, true).await.unwrap();
        let second = store.update_approval(fixture.id, 0, 2, true).await;
        assert!(matches!(second, Err(StoreError::Conflict(_))));

        let stored = store.get_fixture(fixture.id).await.unwrap().unwrap();
        assert_eq!((stored.home_score, stored.away_score), (Some(2), Some(0)));
    }

    #[tokio::test]
    async fn test_pending_scores_can_be_overwritten_until_approved() {
        let (store, fixture) = store_with_fixture().await;

        store.update_approval(fixture.id, 1, 1, false).await.unwrap();
        let approved = store.update_approval(fixture.id, 3, 1, true).await.unwrap();
        assert_eq!((approved.home_score, approved.away_score), (Some(3), Some(1)));
        assert!(approved.approved);
    }

    #[tokio::test]
    async fn test_approved_fixtures_cannot_be_deleted() {
        let (store, fixture) = store_with_fixture().await;
        store.update_approval(fixture.id, 1, 0, true).await.unwrap();

        assert!(matches!(store.delete_fixture(fixture.id).await, Err(StoreError::Conflict(_))));
        assert!(matches!(store.delete_fixture(Uuid::new_v4()).await, Err(StoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_duplicate_key_reports_the_existing_row() {
        let (store, fixture) = store_with_fixture().await;
        let again = store
            .insert_fixture(NewFixture {
                competition_id: fixture.competition_id,
                round: 1,
                slot_number: 1,
                leg: 1,
                home_team_id: fixture.home_team_id,
                away_team_id: fixture.away_team_id,
                scheduled_for: UNSCHEDULED_AT,
            })
            .await
            .unwrap();
        assert_eq!(again, InsertOutcome::AlreadyExists(fixture));
    }
}
