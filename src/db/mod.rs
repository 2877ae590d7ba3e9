//! Storage boundary of the service.
//!
//! Everything the competition workflows persist goes through the two traits
//! below. `PgStore` backs them with PostgreSQL, `MemoryStore` keeps the same
//! guarantees in process for tests and local runs. Both enforce uniqueness of
//! `(competition_id, round, slot_number, leg)` and report a clash as
//! `InsertOutcome::AlreadyExists` instead of an error.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::models::competition::{
    BracketSlotAssignment, Competition, CompetitionStatus, CompetitionType, NewCompetition, Team,
};
use crate::models::fixture::{
    Fixture, InsertOutcome, NewFixture, ResultSubmission, SubmissionStatus, TieResolution,
};

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("{0} not found")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait FixtureStore: Send + Sync {
    /// All fixtures of a competition ordered by round, slot and leg.
    async fn list_fixtures(&self, competition_id: Uuid) -> StoreResult<Vec<Fixture>>;

    async fn get_fixture(&self, fixture_id: Uuid) -> StoreResult<Option<Fixture>>;

    async fn insert_fixture(&self, fixture: NewFixture) -> StoreResult<InsertOutcome>;

    /// Insert several fixtures in one transaction: either every row is written
    /// (or already existed) or none is.
    async fn insert_fixtures(&self, fixtures: Vec<NewFixture>) -> StoreResult<Vec<InsertOutcome>>;

    /// Record scores on a fixture that is not yet approved. Fails with
    /// `Conflict` once it is, so the first approval wins.
    async fn update_approval(
        &self,
        fixture_id: Uuid,
        home_score: i32,
        away_score: i32,
        approved: bool,
    ) -> StoreResult<Fixture>;

    async fn reschedule_fixture(
        &self,
        fixture_id: Uuid,
        scheduled_for: DateTime<Utc>,
    ) -> StoreResult<Fixture>;

    /// Fails with `Conflict` for approved fixtures.
    async fn delete_fixture(&self, fixture_id: Uuid) -> StoreResult<()>;

    /// One submission per team and fixture; a new one replaces the old scores
    /// and puts it back to pending.
    async fn upsert_result_submission(
        &self,
        fixture_id: Uuid,
        team_id: Uuid,
        home_score: i32,
        away_score: i32,
    ) -> StoreResult<ResultSubmission>;

    async fn list_result_submissions(&self, fixture_id: Uuid) -> StoreResult<Vec<ResultSubmission>>;

    async fn set_result_submissions_status(
        &self,
        fixture_id: Uuid,
        status: SubmissionStatus,
    ) -> StoreResult<u64>;

    /// Insert or replace the decision for `(competition, round, slot)`.
    async fn record_tie_resolution(&self, resolution: TieResolution) -> StoreResult<TieResolution>;

    async fn list_tie_resolutions(&self, competition_id: Uuid) -> StoreResult<Vec<TieResolution>>;
}

#[async_trait]
pub trait CompetitionStore: Send + Sync {
    async fn create_competition(&self, competition: NewCompetition) -> StoreResult<Competition>;

    async fn get_competition(&self, competition_id: Uuid) -> StoreResult<Option<Competition>>;

    async fn list_competitions(&self) -> StoreResult<Vec<Competition>>;

    async fn list_active_competitions(
        &self,
        competition_type: CompetitionType,
    ) -> StoreResult<Vec<Competition>>;

    async fn set_competition_status(
        &self,
        competition_id: Uuid,
        status: CompetitionStatus,
    ) -> StoreResult<()>;

    /// Fails with `Conflict` when the name is taken.
    async fn create_team(&self, name: String) -> StoreResult<Team>;

    async fn get_team(&self, team_id: Uuid) -> StoreResult<Option<Team>>;

    async fn list_teams(&self) -> StoreResult<Vec<Team>>;

    /// Fails with `Conflict` when the team is already registered.
    async fn add_competition_team(&self, competition_id: Uuid, team_id: Uuid) -> StoreResult<()>;

    async fn list_competition_teams(&self, competition_id: Uuid) -> StoreResult<Vec<Team>>;

    /// Replace the whole slot assignment of a competition.
    async fn save_bracket_slots(
        &self,
        competition_id: Uuid,
        slots: Vec<BracketSlotAssignment>,
    ) -> StoreResult<()>;

    async fn list_bracket_slots(&self, competition_id: Uuid) -> StoreResult<Vec<BracketSlotAssignment>>;
}
