use std::collections::BTreeMap;

use serde::Serialize;
use uuid::Uuid;

use crate::knockout::aggregate::{score, SlotVerdict};
use crate::knockout::bracket::BracketShape;
use crate::models::fixture::{Fixture, TieResolution};

#[derive(Debug, Clone, Serialize)]
pub struct SlotSummary {
    pub round: i32,
    pub slot_number: i32,
    pub legs: Vec<Fixture>,
    pub verdict: SlotVerdict,
}

#[derive(Debug, Clone, Serialize)]
pub struct RoundSummary {
    pub round: i32,
    pub is_final: bool,
    pub expected_legs: i32,
    pub complete: bool,
    pub slots: Vec<SlotSummary>,
}

impl RoundSummary {
    /// Winner per slot in slot order; `None` for slots without a decision.
    pub fn winners(&self) -> Vec<Option<Uuid>> {
        self.slots.iter().map(|s| s.verdict.winner()).collect()
    }

    pub fn unresolved(&self) -> impl Iterator<Item = &SlotSummary> {
        self.slots.iter().filter(|s| s.verdict.is_unresolved())
    }
}

/// Fixtures of one round grouped by slot number.
pub fn fixtures_by_slot(fixtures: &[Fixture], round: i32) -> BTreeMap<i32, Vec<&Fixture>> {
    let mut grouped: BTreeMap<i32, Vec<&Fixture>> = BTreeMap::new();
    for fixture in fixtures.iter().filter(|f| f.round == round) {
        grouped.entry(fixture.slot_number).or_default().push(fixture);
    }
    grouped
}

/// Every slot expected in `round` has all of its legs present and approved.
pub fn is_round_complete(shape: &BracketShape, round: i32, fixtures: &[Fixture]) -> bool {
    let slot_count = shape.slots_in_round(round);
    if slot_count == 0 {
        return false;
    }
    let legs = shape.legs_in_round(round);
    let by_slot = fixtures_by_slot(fixtures, round);

    (1..=slot_count).all(|slot| {
        let slot_legs = by_slot.get(&slot).map(Vec::as_slice).unwrap_or(&[]);
        (1..=legs).all(|leg| slot_legs.iter().any(|f| f.leg == leg && f.approved))
    })
}

pub fn evaluate_round(
    shape: &BracketShape,
    round: i32,
    fixtures: &[Fixture],
    resolutions: &[TieResolution],
) -> RoundSummary {
    let slot_count = shape.slots_in_round(round);
    let expected_legs = shape.legs_in_round(round);
    let by_slot = fixtures_by_slot(fixtures, round);

    for stray in by_slot.keys().filter(|s| **s < 1 || **s > slot_count) {
        tracing::warn!("Ignoring fixtures in round {} for unknown slot {}", round, stray);
    }

    let slots = (1..=slot_count)
        .map(|slot_number| {
            let legs: &[&Fixture] = by_slot.get(&slot_number).map(Vec::as_slice).unwrap_or(&[]);
            let resolution = resolutions
                .iter()
                .find(|r| r.round == round && r.slot_number == slot_number)
                .map(|r| r.winner_team_id);

            SlotSummary {
                round,
                slot_number,
                legs: legs.iter().map(|f| (*f).clone()).collect(),
                verdict: score(legs, expected_legs, resolution),
            }
        })
        .collect();

    RoundSummary {
        round,
        is_final: shape.is_final(round),
        expected_legs,
        complete: is_round_complete(shape, round, fixtures),
        slots,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixture::UNSCHEDULED_AT;
    use chrono::Utc;

    fn fixture(round: i32, slot: i32, leg: i32, home: Uuid, away: Uuid, score: (i32, i32), approved: bool) -> Fixture {
        Fixture {
            id: Uuid::new_v4(),
            competition_id: Uuid::nil(),
            round,
            slot_number: slot,
            leg,
            home_team_id: home,
            away_team_id: away,
            home_score: Some(score.0),
            away_score: Some(score.1),
            approved,
            scheduled_for: UNSCHEDULED_AT,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn two_legged_slot(slot: i32, approved: bool) -> (Uuid, Vec<Fixture>) {
        let (home, away) = (Uuid::new_v4(), Uuid::new_v4());
        let legs = vec![
            fixture(1, slot, 1, home, away, (2, 0), true),
            fixture(1, slot, 2, away, home, (1, 1), approved),
        ];
        (home, legs)
    }

    #[test]
    fn test_round_complete_only_when_every_leg_approved() {
        let shape = BracketShape::new(4).unwrap();
        let (_, mut fixtures) = two_legged_slot(1, true);
        assert!(!is_round_complete(&shape, 1, &fixtures), "slot 2 has no legs yet");

        let (_, pending) = two_legged_slot(2, false);
        fixtures.extend(pending);
        assert!(!is_round_complete(&shape, 1, &fixtures));

        fixtures.last_mut().unwrap().approved = true;
        assert!(is_round_complete(&shape, 1, &fixtures));
    }

    #[test]
    fn test_round_outside_bracket_is_never_complete() {
        let shape = BracketShape::new(4).unwrap();
        assert!(!is_round_complete(&shape, 0, &[]));
        assert!(!is_round_complete(&shape, 3, &[]));
    }

    #[test]
    fn test_evaluate_round_reports_winners_in_slot_order() {
        let shape = BracketShape::new(4).unwrap();
        let (winner_one, mut fixtures) = two_legged_slot(1, true);
        let (winner_two, second) = two_legged_slot(2, true);
        fixtures.extend(second);

        let summary = evaluate_round(&shape, 1, &fixtures, &[]);
        assert!(summary.complete);
        assert!(!summary.is_final);
        assert_eq!(summary.slots.len(), 2);
        assert_eq!(summary.winners(), vec![Some(winner_one), Some(winner_two)]);
        assert_eq!(summary.unresolved().count(), 0);
    }

    #[test]
    fn test_evaluate_round_lists_empty_slots_as_awaiting() {
        let shape = BracketShape::new(8).unwrap();
        let summary = evaluate_round(&shape, 2, &[], &[]);
        assert_eq!(summary.slots.len(), 2);
        assert!(summary.slots.iter().all(|s| s.verdict == SlotVerdict::AwaitingLegs));
        assert!(!summary.complete);
    }
}
