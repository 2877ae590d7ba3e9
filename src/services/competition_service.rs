use std::sync::Arc;

use rand::seq::SliceRandom;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::db::{CompetitionStore, FixtureStore, StoreError};
use crate::knockout::aggregate::SlotVerdict;
use crate::knockout::bracket::{BracketError, BracketShape};
use crate::knockout::engine::{BracketView, KnockoutEngine, ProgressReport};
use crate::knockout::round::evaluate_round;
use crate::models::competition::{
    BracketSlotAssignment, Competition, CompetitionDetails, CompetitionStatus, CompetitionType,
    CreateCompetitionRequest, CreateTeamRequest, NewCompetition, RegisterTeamRequest,
    SaveBracketRequest, SlotAssignmentEntry, Team,
};
use crate::models::fixture::{
    ApproveFixtureRequest, Fixture, RescheduleFixtureRequest, ResolveTieRequest, ResultSubmission,
    SubmissionStatus, SubmitResultRequest, TieResolution,
};
use crate::models::user::Claims;
use crate::services::competition_events::CompetitionEvents;
use crate::services::validation::CompetitionValidator;

#[derive(Error, Debug)]
pub enum CompetitionError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Competition {0} is not a knockout competition")]
    NotKnockout(Uuid),

    #[error("Invalid bracket: {0}")]
    InvalidBracket(#[from] BracketError),

    #[error("Storage error: {0}")]
    Store(StoreError),
}

impl From<StoreError> for CompetitionError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(what) => CompetitionError::NotFound(what),
            StoreError::Conflict(reason) => CompetitionError::Conflict(reason),
            other => CompetitionError::Store(other),
        }
    }
}

pub type CompetitionResult<T> = Result<T, CompetitionError>;

#[derive(Debug, Clone, Serialize)]
pub struct ApprovalOutcome {
    pub fixture: Fixture,
    /// Present for knockout competitions.
    pub progress: Option<ProgressReport>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RandomizedBracket {
    pub slots: Vec<BracketSlotAssignment>,
    /// Round-1 fixtures.
    pub fixtures: Vec<Fixture>,
}

#[derive(Debug, Clone, Serialize, Default)]
pub struct SweepSummary {
    pub competitions: usize,
    pub fixtures_created: usize,
    pub champions_decided: usize,
    pub failures: usize,
}

/// Orchestrates the competition workflows around the knockout engine.
///
/// One instance is shared by the HTTP layer and the sweep job.
pub struct CompetitionService {
    competitions: Arc<dyn CompetitionStore>,
    fixtures: Arc<dyn FixtureStore>,
    engine: KnockoutEngine,
    validator: CompetitionValidator,
    events: CompetitionEvents,
}

impl CompetitionService {
    pub fn new(
        competitions: Arc<dyn CompetitionStore>,
        fixtures: Arc<dyn FixtureStore>,
        events: CompetitionEvents,
    ) -> Self {
        Self {
            competitions,
            engine: KnockoutEngine::new(fixtures.clone()),
            fixtures,
            validator: CompetitionValidator::new(),
            events,
        }
    }

    /// Build the service over a single store implementing both traits.
    pub fn with_store<S>(store: Arc<S>, events: CompetitionEvents) -> Self
    where
        S: CompetitionStore + FixtureStore + 'static,
    {
        Self::new(store.clone(), store, events)
    }

    async fn competition(&self, competition_id: Uuid) -> CompetitionResult<Competition> {
        self.competitions
            .get_competition(competition_id)
            .await?
            .ok_or_else(|| CompetitionError::NotFound(format!("Competition {}", competition_id)))
    }

    async fn fixture(&self, fixture_id: Uuid) -> CompetitionResult<Fixture> {
        self.fixtures
            .get_fixture(fixture_id)
            .await?
            .ok_or_else(|| CompetitionError::NotFound(format!("Fixture {}", fixture_id)))
    }

    fn knockout_shape(competition: &Competition) -> CompetitionResult<BracketShape> {
        if !competition.competition_type.is_knockout() {
            return Err(CompetitionError::NotKnockout(competition.id));
        }
        Ok(BracketShape::new(competition.team_count)?)
    }

    // ---- Teams ----

    pub async fn create_team(&self, request: CreateTeamRequest) -> CompetitionResult<Team> {
        self.validator.validate_name("Team", &request.name)?;
        let team = self.competitions.create_team(request.name.trim().to_string()).await?;
        tracing::info!("Created team '{}' ({})", team.name, team.id);
        Ok(team)
    }

    pub async fn list_teams(&self) -> CompetitionResult<Vec<Team>> {
        Ok(self.competitions.list_teams().await?)
    }

    // ---- Competitions ----

    pub async fn create_competition(
        &self,
        request: CreateCompetitionRequest,
    ) -> CompetitionResult<Competition> {
        self.validator.validate_create_competition_request(&request)?;

        let competition = self
            .competitions
            .create_competition(NewCompetition {
                name: request.name.trim().to_string(),
                competition_type: request.competition_type,
                team_count: request.team_count,
            })
            .await?;

        tracing::info!(
            "Created {} competition '{}' ({}) for {} teams",
            competition.competition_type,
            competition.name,
            competition.id,
            competition.team_count
        );
        Ok(competition)
    }

    pub async fn list_competitions(&self) -> CompetitionResult<Vec<Competition>> {
        Ok(self.competitions.list_competitions().await?)
    }

    pub async fn get_competition_details(
        &self,
        competition_id: Uuid,
    ) -> CompetitionResult<CompetitionDetails> {
        let competition = self.competition(competition_id).await?;
        let teams = self.competitions.list_competition_teams(competition_id).await?;
        let bracket_slots = self.competitions.list_bracket_slots(competition_id).await?;

        Ok(CompetitionDetails {
            competition,
            teams,
            bracket_slots,
        })
    }

    pub async fn register_team(
        &self,
        competition_id: Uuid,
        request: RegisterTeamRequest,
    ) -> CompetitionResult<Team> {
        let competition = self.competition(competition_id).await?;
        let team = self
            .competitions
            .get_team(request.team_id)
            .await?
            .ok_or_else(|| CompetitionError::NotFound(format!("Team {}", request.team_id)))?;

        let registered = self.competitions.list_competition_teams(competition_id).await?;
        if registered.iter().any(|t| t.id == team.id) {
            return Err(CompetitionError::Conflict(format!(
                "Team '{}' is already registered",
                team.name
            )));
        }
        if registered.len() as i32 >= competition.team_count {
            return Err(CompetitionError::Conflict(format!(
                "Competition '{}' is full ({} teams)",
                competition.name, competition.team_count
            )));
        }

        self.competitions.add_competition_team(competition_id, team.id).await?;
        tracing::info!("Registered team '{}' in competition '{}'", team.name, competition.name);
        Ok(team)
    }

    // ---- Bracket ----

    /// Save the slot assignment and create the round-1 fixtures.
    ///
    /// Saving the same assignment again only fills in missing fixtures. Once
    /// fixtures exist a different assignment is refused.
    pub async fn save_bracket(
        &self,
        competition_id: Uuid,
        request: SaveBracketRequest,
    ) -> CompetitionResult<Vec<Fixture>> {
        let competition = self.competition(competition_id).await?;
        let shape = Self::knockout_shape(&competition)?;

        let registered: Vec<Uuid> = self
            .competitions
            .list_competition_teams(competition_id)
            .await?
            .into_iter()
            .map(|t| t.id)
            .collect();
        let slots = self
            .validator
            .validate_bracket_slots(&competition, &request.slots, &registered)?;

        let existing_fixtures = self.fixtures.list_fixtures(competition_id).await?;
        if !existing_fixtures.is_empty() {
            let saved = self.competitions.list_bracket_slots(competition_id).await?;
            if saved != slots {
                return Err(CompetitionError::Conflict(
                    "Bracket already has fixtures; the slot assignment can no longer change".into(),
                ));
            }
        } else {
            self.competitions
                .save_bracket_slots(competition_id, slots.clone())
                .await?;
        }

        let created = self.engine.seed(competition_id, &shape, &slots).await?;
        self.events.fixtures_generated(competition_id, &created).await;

        Ok(self
            .fixtures
            .list_fixtures(competition_id)
            .await?
            .into_iter()
            .filter(|f| f.round == 1)
            .collect())
    }

    /// Draw the registered teams into random positions and seed round 1 from
    /// the draw. Fails like `save_bracket` once fixtures exist.
    pub async fn randomize_bracket(&self, competition_id: Uuid) -> CompetitionResult<RandomizedBracket> {
        let competition = self.competition(competition_id).await?;
        Self::knockout_shape(&competition)?;

        let mut team_ids: Vec<Uuid> = self
            .competitions
            .list_competition_teams(competition_id)
            .await?
            .into_iter()
            .map(|t| t.id)
            .collect();
        team_ids.shuffle(&mut rand::thread_rng());

        let slots = team_ids
            .into_iter()
            .enumerate()
            .map(|(i, team_id)| SlotAssignmentEntry {
                position: i as i32 + 1,
                team_id,
            })
            .collect();

        let fixtures = self.save_bracket(competition_id, SaveBracketRequest { slots }).await?;
        let slots = self.competitions.list_bracket_slots(competition_id).await?;
        tracing::info!("🎲 Drew {} teams into the bracket of '{}'", slots.len(), competition.name);

        Ok(RandomizedBracket { slots, fixtures })
    }

    pub async fn bracket(&self, competition_id: Uuid) -> CompetitionResult<BracketView> {
        let competition = self.competition(competition_id).await?;
        let shape = Self::knockout_shape(&competition)?;
        Ok(self.engine.bracket(competition_id, &shape).await?)
    }

    pub async fn list_fixtures(&self, competition_id: Uuid) -> CompetitionResult<Vec<Fixture>> {
        self.competition(competition_id).await?;
        Ok(self.fixtures.list_fixtures(competition_id).await?)
    }

    /// Run the engine for one competition and publish what changed.
    pub async fn advance(&self, competition_id: Uuid) -> CompetitionResult<ProgressReport> {
        let competition = self.competition(competition_id).await?;
        self.progress(&competition).await
    }

    async fn progress(&self, competition: &Competition) -> CompetitionResult<ProgressReport> {
        let shape = Self::knockout_shape(competition)?;
        let report = self.engine.progress(competition.id, &shape).await?;

        self.events.fixtures_generated(competition.id, &report.created).await;

        if let Some(champion) = report.champion {
            if competition.status != CompetitionStatus::Completed {
                self.competitions
                    .set_competition_status(competition.id, CompetitionStatus::Completed)
                    .await?;
                tracing::info!("🏆 Team {} won competition '{}'", champion, competition.name);
                self.events.champion_decided(competition.id, champion).await;
            }
        }

        Ok(report)
    }

    /// Record an administrator's winner for a level tie and re-run progression.
    pub async fn resolve_tie(
        &self,
        competition_id: Uuid,
        request: ResolveTieRequest,
        resolved_by: &str,
    ) -> CompetitionResult<ProgressReport> {
        let competition = self.competition(competition_id).await?;
        let shape = Self::knockout_shape(&competition)?;
        shape.check_round(request.round)?;

        if !(1..=shape.slots_in_round(request.round)).contains(&request.slot_number) {
            return Err(CompetitionError::Validation(format!(
                "Round {} has no slot {}",
                request.round, request.slot_number
            )));
        }

        let fixtures = self.fixtures.list_fixtures(competition_id).await?;
        let resolutions = self.fixtures.list_tie_resolutions(competition_id).await?;
        let summary = evaluate_round(&shape, request.round, &fixtures, &resolutions);
        let verdict = summary
            .slots
            .iter()
            .find(|s| s.slot_number == request.slot_number)
            .map(|s| s.verdict.clone());

        match verdict {
            Some(SlotVerdict::RequiresManualResolution { aggregate }) => {
                if request.winner_team_id != aggregate.home_team_id
                    && request.winner_team_id != aggregate.away_team_id
                {
                    return Err(CompetitionError::Validation(format!(
                        "Team {} does not play in round {} slot {}",
                        request.winner_team_id, request.round, request.slot_number
                    )));
                }
            }
            Some(SlotVerdict::Decided { .. }) => {
                return Err(CompetitionError::Conflict(format!(
                    "Round {} slot {} is already decided",
                    request.round, request.slot_number
                )));
            }
            _ => {
                return Err(CompetitionError::Conflict(format!(
                    "Round {} slot {} is not level on aggregate",
                    request.round, request.slot_number
                )));
            }
        }

        self.fixtures
            .record_tie_resolution(TieResolution {
                competition_id,
                round: request.round,
                slot_number: request.slot_number,
                winner_team_id: request.winner_team_id,
                resolved_by: resolved_by.to_string(),
                created_at: chrono::Utc::now(),
            })
            .await?;

        tracing::info!(
            "{} resolved round {} slot {} of competition {} in favour of {}",
            resolved_by,
            request.round,
            request.slot_number,
            competition_id,
            request.winner_team_id
        );

        self.progress(&competition).await
    }

    /// Re-run progression for every active cup. Failures are logged per
    /// competition and do not stop the sweep.
    pub async fn sweep_active_brackets(&self) -> CompetitionResult<SweepSummary> {
        let competitions = self
            .competitions
            .list_active_competitions(CompetitionType::Cup)
            .await?;
        let mut summary = SweepSummary {
            competitions: competitions.len(),
            ..Default::default()
        };

        for competition in &competitions {
            match self.progress(competition).await {
                Ok(report) => {
                    summary.fixtures_created += report.created.len();
                    if report.champion.is_some() {
                        summary.champions_decided += 1;
                    }
                }
                Err(e) => {
                    summary.failures += 1;
                    tracing::error!("❌ Sweep failed for competition {}: {}", competition.id, e);
                }
            }
        }

        Ok(summary)
    }

    // ---- Results ----

    /// A captain reports the score of a fixture their team plays.
    pub async fn submit_result(
        &self,
        claims: &Claims,
        fixture_id: Uuid,
        request: SubmitResultRequest,
    ) -> CompetitionResult<ResultSubmission> {
        self.validator.validate_scores(request.home_score, request.away_score)?;

        let team_id = claims.team_id.ok_or_else(|| {
            CompetitionError::Forbidden("Only team captains can submit results".into())
        })?;

        let fixture = self.fixture(fixture_id).await?;
        if !fixture.involves(team_id) {
            return Err(CompetitionError::Forbidden(format!(
                "Team {} does not play fixture {}",
                team_id, fixture_id
            )));
        }
        if fixture.approved {
            return Err(CompetitionError::Conflict(format!(
                "Fixture {} is already approved",
                fixture_id
            )));
        }

        let submission = self
            .fixtures
            .upsert_result_submission(fixture_id, team_id, request.home_score, request.away_score)
            .await?;

        tracing::info!(
            "{} submitted {}-{} for fixture {}",
            claims.username,
            request.home_score,
            request.away_score,
            fixture_id
        );
        Ok(submission)
    }

    pub async fn list_results(&self, fixture_id: Uuid) -> CompetitionResult<Vec<ResultSubmission>> {
        self.fixture(fixture_id).await?;
        Ok(self.fixtures.list_result_submissions(fixture_id).await?)
    }

    /// Scores to approve: the admin's edit, or else the pending submissions of
    /// both teams when they agree.
    async fn approval_scores(
        &self,
        fixture: &Fixture,
        request: &ApproveFixtureRequest,
    ) -> CompetitionResult<(i32, i32)> {
        match (request.home_score, request.away_score) {
            (Some(home), Some(away)) => {
                self.validator.validate_scores(home, away)?;
                Ok((home, away))
            }
            (None, None) => {
                let pending: Vec<ResultSubmission> = self
                    .fixtures
                    .list_result_submissions(fixture.id)
                    .await?
                    .into_iter()
                    .filter(|s| s.status == SubmissionStatus::Pending)
                    .collect();

                let from_team = |team_id: Uuid| {
                    pending.iter().find(|s| s.team_id == team_id).ok_or_else(|| {
                        CompetitionError::Validation(format!(
                            "Team {} has no pending result for fixture {}; provide home_score and away_score",
                            team_id, fixture.id
                        ))
                    })
                };
                let home = from_team(fixture.home_team_id)?;
                let away = from_team(fixture.away_team_id)?;

                if (home.home_score, home.away_score) != (away.home_score, away.away_score) {
                    return Err(CompetitionError::Validation(
                        "Team submissions disagree; provide home_score and away_score".into(),
                    ));
                }
                Ok((home.home_score, home.away_score))
            }
            _ => Err(CompetitionError::Validation(
                "Provide both home_score and away_score or neither".into(),
            )),
        }
    }

    /// Approve a fixture and, for cups, move the bracket forward.
    pub async fn approve_fixture(
        &self,
        fixture_id: Uuid,
        request: ApproveFixtureRequest,
    ) -> CompetitionResult<ApprovalOutcome> {
        let fixture = self.fixture(fixture_id).await?;
        if fixture.approved {
            return Err(CompetitionError::Conflict(format!(
                "Fixture {} is already approved",
                fixture_id
            )));
        }

        let (home_score, away_score) = self.approval_scores(&fixture, &request).await?;
        let fixture = self
            .fixtures
            .update_approval(fixture_id, home_score, away_score, true)
            .await?;
        self.fixtures
            .set_result_submissions_status(fixture_id, SubmissionStatus::Approved)
            .await?;

        tracing::info!(
            "✅ Approved fixture {} ({} round {} slot {} leg {}) at {}-{}",
            fixture.id,
            fixture.competition_id,
            fixture.round,
            fixture.slot_number,
            fixture.leg,
            home_score,
            away_score
        );
        self.events.fixture_approved(&fixture).await;

        let competition = self.competition(fixture.competition_id).await?;
        let progress = if competition.competition_type.is_knockout() {
            Some(self.progress(&competition).await?)
        } else {
            None
        };

        Ok(ApprovalOutcome { fixture, progress })
    }

    /// Reject the pending submissions of a fixture so the teams resubmit.
    pub async fn reject_fixture(&self, fixture_id: Uuid) -> CompetitionResult<u64> {
        let fixture = self.fixture(fixture_id).await?;
        if fixture.approved {
            return Err(CompetitionError::Conflict(format!(
                "Fixture {} is already approved",
                fixture_id
            )));
        }

        let rejected = self
            .fixtures
            .set_result_submissions_status(fixture_id, SubmissionStatus::Rejected)
            .await?;
        tracing::info!("Rejected {} submissions for fixture {}", rejected, fixture_id);
        Ok(rejected)
    }

    pub async fn reschedule_fixture(
        &self,
        fixture_id: Uuid,
        request: RescheduleFixtureRequest,
    ) -> CompetitionResult<Fixture> {
        let fixture = self.fixture(fixture_id).await?;
        if fixture.approved {
            return Err(CompetitionError::Conflict(format!(
                "Fixture {} is already approved",
                fixture_id
            )));
        }
        Ok(self
            .fixtures
            .reschedule_fixture(fixture_id, request.scheduled_for)
            .await?)
    }

    pub async fn delete_fixture(&self, fixture_id: Uuid) -> CompetitionResult<()> {
        self.fixtures.delete_fixture(fixture_id).await?;
        tracing::info!("Deleted fixture {}", fixture_id);
        Ok(())
    }
}
