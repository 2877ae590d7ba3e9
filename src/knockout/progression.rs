use std::collections::HashSet;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::fixture::{Fixture, NewFixture};

/// Plan the fixtures of `destination_round` from its entrants in slot order.
///
/// Entrants `2k-1` and `2k` meet in slot `k`, the first of them at home in
/// leg 1. A slot is skipped while either entrant is unknown. Legs already
/// present in `existing` are not planned again, so a pair left half-created
/// gets its missing leg on the next call.
pub fn plan_round(
    competition_id: Uuid,
    destination_round: i32,
    entrants: &[Option<Uuid>],
    legs: i32,
    existing: &[Fixture],
    scheduled_for: DateTime<Utc>,
) -> Vec<NewFixture> {
    let taken: HashSet<(i32, i32)> = existing
        .iter()
        .filter(|f| f.competition_id == competition_id && f.round == destination_round)
        .map(|f| (f.slot_number, f.leg))
        .collect();

    let mut planned = Vec::new();
    for (index, pair) in entrants.chunks(2).enumerate() {
        let slot_number = index as i32 + 1;
        let (home, away) = match pair {
            [Some(home), Some(away)] => (*home, *away),
            _ => continue,
        };

        for leg in 1..=legs {
            if taken.contains(&(slot_number, leg)) {
                continue;
            }
            let (home_team_id, away_team_id) = if leg % 2 == 1 { (home, away) } else { (away, home) };
            planned.push(NewFixture {
                competition_id,
                round: destination_round,
                slot_number,
                leg,
                home_team_id,
                away_team_id,
                scheduled_for,
            });
        }
    }
    planned
}

/// Fixtures for round `round + 1` from the winners of `round`.
///
/// The destination final is a single leg; every other round gets two legs with
/// home and away reversed. Winners are paired by position, without reseeding.
pub fn advance(
    competition_id: Uuid,
    completed_round_winners: &[Option<Uuid>],
    round: i32,
    destination_is_final: bool,
    existing: &[Fixture],
    scheduled_for: DateTime<Utc>,
) -> Vec<NewFixture> {
    let legs = if destination_is_final { 1 } else { 2 };
    plan_round(
        competition_id,
        round + 1,
        completed_round_winners,
        legs,
        existing,
        scheduled_for,
    )
}
