use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::db::{FixtureStore, StoreResult};
use crate::knockout::aggregate::SlotVerdict;
use crate::knockout::bracket::BracketShape;
use crate::knockout::progression::{advance, plan_round};
use crate::knockout::round::{evaluate_round, RoundSummary};
use crate::models::competition::BracketSlotAssignment;
use crate::models::fixture::{Fixture, InsertOutcome, NewFixture, UNSCHEDULED_AT};

/// A slot the engine cannot decide on its own.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct UnresolvedSlot {
    pub round: i32,
    pub slot_number: i32,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProgressReport {
    pub competition_id: Uuid,
    /// Fixtures written by this run. Rows another writer created first are not listed.
    pub created: Vec<Fixture>,
    pub unresolved: Vec<UnresolvedSlot>,
    pub champion: Option<Uuid>,
}

impl ProgressReport {
    fn new(competition_id: Uuid) -> Self {
        Self {
            competition_id,
            created: Vec::new(),
            unresolved: Vec::new(),
            champion: None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BracketView {
    pub competition_id: Uuid,
    pub team_count: i32,
    pub total_rounds: i32,
    pub rounds: Vec<RoundSummary>,
    pub champion: Option<Uuid>,
}

fn unresolved_reason(verdict: &SlotVerdict) -> Option<String> {
    match verdict {
        SlotVerdict::RequiresManualResolution { aggregate } => Some(format!(
            "level on aggregate {}-{}, needs a manual decision",
            aggregate.aggregate_home, aggregate.aggregate_away
        )),
        SlotVerdict::Inconsistent { reason } => Some(reason.clone()),
        _ => None,
    }
}

/// Round-1 fixtures from a bracket slot assignment.
///
/// Positions are read in order, so positions `2k-1` and `2k` meet in slot `k`.
/// A position with no team leaves its slot out.
pub fn plan_opening_round(
    competition_id: Uuid,
    shape: &BracketShape,
    slots: &[BracketSlotAssignment],
    existing: &[Fixture],
    scheduled_for: DateTime<Utc>,
) -> Vec<NewFixture> {
    let entrants: Vec<Option<Uuid>> = (1..=shape.team_count())
        .map(|position| {
            slots
                .iter()
                .find(|s| s.position == position)
                .map(|s| s.team_id)
        })
        .collect();

    plan_round(
        competition_id,
        1,
        &entrants,
        shape.legs_in_round(1),
        existing,
        scheduled_for,
    )
}

/// Store-backed driver of the bracket.
///
/// Stateless between calls: every run reads the fixtures back from the store
/// and writes only what is missing, so it can be called after each approval,
/// from the sweep, or by hand without coordination.
#[derive(Clone)]
pub struct KnockoutEngine {
    fixtures: Arc<dyn FixtureStore>,
}

impl KnockoutEngine {
    pub fn new(fixtures: Arc<dyn FixtureStore>) -> Self {
        Self { fixtures }
    }

    /// Create the round-1 fixtures that do not exist yet.
    pub async fn seed(
        &self,
        competition_id: Uuid,
        shape: &BracketShape,
        slots: &[BracketSlotAssignment],
    ) -> StoreResult<Vec<Fixture>> {
        let existing = self.fixtures.list_fixtures(competition_id).await?;
        let planned = plan_opening_round(competition_id, shape, slots, &existing, UNSCHEDULED_AT);
        if planned.is_empty() {
            return Ok(Vec::new());
        }

        let created: Vec<Fixture> = self
            .fixtures
            .insert_fixtures(planned)
            .await?
            .into_iter()
            .filter_map(InsertOutcome::into_inserted)
            .collect();

        tracing::info!(
            "Seeded {} round-1 fixtures for competition {}",
            created.len(),
            competition_id
        );
        Ok(created)
    }

    /// Evaluate every round in order and create the fixtures of each round
    /// whose predecessor is complete.
    #[tracing::instrument(name = "Progress knockout bracket", skip(self))]
    pub async fn progress(
        &self,
        competition_id: Uuid,
        shape: &BracketShape,
    ) -> StoreResult<ProgressReport> {
        let mut fixtures = self.fixtures.list_fixtures(competition_id).await?;
        let resolutions = self.fixtures.list_tie_resolutions(competition_id).await?;
        let mut report = ProgressReport::new(competition_id);

        for round in 1..=shape.total_rounds() {
            let summary = evaluate_round(shape, round, &fixtures, &resolutions);

            for slot in summary.unresolved() {
                if let Some(reason) = unresolved_reason(&slot.verdict) {
                    tracing::warn!(
                        "Competition {} round {} slot {} unresolved: {}",
                        competition_id,
                        round,
                        slot.slot_number,
                        reason
                    );
                    report.unresolved.push(UnresolvedSlot {
                        round,
                        slot_number: slot.slot_number,
                        reason,
                    });
                }
            }

            if summary.is_final {
                report.champion = summary.slots.first().and_then(|s| s.verdict.winner());
                break;
            }

            // Later rounds cannot have started before this one is done
            if !summary.complete {
                break;
            }

            let planned = advance(
                competition_id,
                &summary.winners(),
                round,
                shape.is_final(round + 1),
                &fixtures,
                UNSCHEDULED_AT,
            );
            if planned.is_empty() {
                continue;
            }

            tracing::info!(
                "Round {} of competition {} complete, writing {} fixtures for round {}",
                round,
                competition_id,
                planned.len(),
                round + 1
            );

            for outcome in self.fixtures.insert_fixtures(planned).await? {
                match outcome {
                    InsertOutcome::Inserted(fixture) => {
                        report.created.push(fixture.clone());
                        fixtures.push(fixture);
                    }
                    InsertOutcome::AlreadyExists(fixture) => {
                        tracing::debug!("Fixture {} was created concurrently", fixture.key());
                        if !fixtures.iter().any(|f| f.id == fixture.id) {
                            fixtures.push(fixture);
                        }
                    }
                }
            }
        }

        Ok(report)
    }

    pub async fn bracket(&self, competition_id: Uuid, shape: &BracketShape) -> StoreResult<BracketView> {
        let fixtures = self.fixtures.list_fixtures(competition_id).await?;
        let resolutions = self.fixtures.list_tie_resolutions(competition_id).await?;

        let rounds: Vec<RoundSummary> = (1..=shape.total_rounds())
            .map(|round| evaluate_round(shape, round, &fixtures, &resolutions))
            .collect();
        let champion = rounds
            .last()
            .and_then(|final_round| final_round.slots.first())
            .and_then(|slot| slot.verdict.winner());

        Ok(BracketView {
            competition_id,
            team_count: shape.team_count(),
            total_rounds: shape.total_rounds(),
            rounds,
            champion,
        })
    }
}
