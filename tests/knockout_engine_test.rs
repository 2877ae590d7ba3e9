use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use cup_league_backend::db::{FixtureStore, MemoryStore};
use cup_league_backend::knockout::{BracketShape, KnockoutEngine};
use cup_league_backend::models::competition::BracketSlotAssignment;
use cup_league_backend::models::fixture::{Fixture, TieResolution};

struct Bracket {
    store: Arc<MemoryStore>,
    engine: KnockoutEngine,
    shape: BracketShape,
    competition_id: Uuid,
    teams: Vec<Uuid>,
}

async fn seeded_bracket(team_count: i32) -> Bracket {
    let store = Arc::new(MemoryStore::new());
    let engine = KnockoutEngine::new(store.clone());
    let shape = BracketShape::new(team_count).unwrap();
    let competition_id = Uuid::new_v4();
    let teams: Vec<Uuid> = (0..team_count).map(|_| Uuid::new_v4()).collect();
    let slots: Vec<BracketSlotAssignment> = teams
        .iter()
        .enumerate()
        .map(|(i, team_id)| BracketSlotAssignment {
            competition_id,
            position: i as i32 + 1,
            team_id: *team_id,
        })
        .collect();

    let created = engine.seed(competition_id, &shape, &slots).await.unwrap();
    assert_eq!(created.len() as i32, shape.slots_in_round(1) * shape.legs_in_round(1));

    Bracket {
        store,
        engine,
        shape,
        competition_id,
        teams,
    }
}

impl Bracket {
    async fn round(&self, round: i32) -> Vec<Fixture> {
        self.store
            .list_fixtures(self.competition_id)
            .await
            .unwrap()
            .into_iter()
            .filter(|f| f.round == round)
            .collect()
    }

    async fn approve(&self, fixture: &Fixture, home: i32, away: i32) {
        self.store
            .update_approval(fixture.id, home, away, true)
            .await
            .unwrap();
    }

    /// Leg-1 home side of every slot wins 2-0 and draws the return leg.
    async fn play_round(&self, round: i32) {
        for fixture in self.round(round).await {
            let (home, away) = if fixture.leg == 1 { (2, 0) } else { (1, 1) };
            self.approve(&fixture, home, away).await;
        }
    }
}

fn leg(fixtures: &[Fixture], slot_number: i32, leg: i32) -> &Fixture {
    fixtures
        .iter()
        .find(|f| f.slot_number == slot_number && f.leg == leg)
        .expect("fixture not found")
}

#[tokio::test]
async fn eight_team_round_two_pairs_winners_in_slot_order() {
    let bracket = seeded_bracket(8).await;
    bracket.play_round(1).await;

    let report = bracket.engine.progress(bracket.competition_id, &bracket.shape).await.unwrap();
    assert_eq!(report.created.len(), 4);
    assert!(report.unresolved.is_empty());
    assert!(report.champion.is_none());

    let round_two = bracket.round(2).await;
    let teams = &bracket.teams;
    let first = leg(&round_two, 1, 1);
    assert_eq!((first.home_team_id, first.away_team_id), (teams[0], teams[2]));
    let second = leg(&round_two, 1, 2);
    assert_eq!((second.home_team_id, second.away_team_id), (teams[2], teams[0]));
    let other = leg(&round_two, 2, 1);
    assert_eq!((other.home_team_id, other.away_team_id), (teams[4], teams[6]));
    assert!(round_two.iter().all(|f| f.is_unscheduled() && !f.approved));
}

#[tokio::test]
async fn final_is_a_single_leg_and_decides_the_champion() {
    let bracket = seeded_bracket(4).await;
    bracket.play_round(1).await;
    bracket.engine.progress(bracket.competition_id, &bracket.shape).await.unwrap();

    let final_round = bracket.round(2).await;
    assert_eq!(final_round.len(), 1);
    assert_eq!(final_round[0].leg, 1);
    assert_eq!(
        (final_round[0].home_team_id, final_round[0].away_team_id),
        (bracket.teams[0], bracket.teams[2])
    );

    bracket.approve(&final_round[0], 0, 1).await;
    let report = bracket.engine.progress(bracket.competition_id, &bracket.shape).await.unwrap();
    assert!(report.created.is_empty());
    assert_eq!(report.champion, Some(bracket.teams[2]));

    let view = bracket.engine.bracket(bracket.competition_id, &bracket.shape).await.unwrap();
    assert_eq!(view.total_rounds, 2);
    assert_eq!(view.champion, Some(bracket.teams[2]));
}

#[tokio::test]
async fn progress_is_idempotent() {
    let bracket = seeded_bracket(8).await;
    bracket.play_round(1).await;

    let first = bracket.engine.progress(bracket.competition_id, &bracket.shape).await.unwrap();
    let second = bracket.engine.progress(bracket.competition_id, &bracket.shape).await.unwrap();

    assert_eq!(first.created.len(), 4);
    assert!(second.created.is_empty());
    assert_eq!(bracket.round(2).await.len(), 4);
}

#[tokio::test]
async fn nothing_is_created_before_the_round_is_complete() {
    let bracket = seeded_bracket(8).await;
    let round_one = bracket.round(1).await;

    // Every leg but the last is approved; the last one is scored but pending
    for fixture in &round_one[..round_one.len() - 1] {
        bracket.approve(fixture, 2, 0).await;
    }
    let last = round_one.last().unwrap();
    bracket.store.update_approval(last.id, 2, 0, false).await.unwrap();

    let report = bracket.engine.progress(bracket.competition_id, &bracket.shape).await.unwrap();
    assert!(report.created.is_empty());
    assert!(bracket.round(2).await.is_empty());
}

#[tokio::test]
async fn aggregate_example_three_one_then_nil_two() {
    let bracket = seeded_bracket(4).await;
    let round_one = bracket.round(1).await;

    // Slot 1: A beats B 3-1 at home, then wins 2-0 away: 5-1 on aggregate
    bracket.approve(leg(&round_one, 1, 1), 3, 1).await;
    bracket.approve(leg(&round_one, 1, 2), 0, 2).await;
    // Slot 2: D goes through 2-1
    bracket.approve(leg(&round_one, 2, 1), 0, 1).await;
    bracket.approve(leg(&round_one, 2, 2), 1, 1).await;

    let view = bracket.engine.bracket(bracket.competition_id, &bracket.shape).await.unwrap();
    let slot_one = &view.rounds[0].slots[0];
    let aggregate = slot_one.verdict.aggregate().unwrap();
    assert_eq!((aggregate.aggregate_home, aggregate.aggregate_away), (5, 1));
    assert_eq!(slot_one.verdict.winner(), Some(bracket.teams[0]));
    assert_eq!(view.rounds[0].slots[1].verdict.winner(), Some(bracket.teams[3]));
}

#[tokio::test]
async fn unresolved_tie_blocks_only_its_destination_until_decided() {
    let bracket = seeded_bracket(8).await;
    let round_one = bracket.round(1).await;

    for fixture in &round_one {
        let score = match (fixture.slot_number, fixture.leg) {
            (1, _) => (1, 1),
            (_, 1) => (2, 0),
            _ => (0, 0),
        };
        bracket.approve(fixture, score.0, score.1).await;
    }

    let report = bracket.engine.progress(bracket.competition_id, &bracket.shape).await.unwrap();
    assert_eq!(report.unresolved.len(), 1);
    assert_eq!((report.unresolved[0].round, report.unresolved[0].slot_number), (1, 1));

    // Slots 3 and 4 feed round-2 slot 2, which is created; slot 1 blocks slot 1
    let round_two = bracket.round(2).await;
    assert_eq!(round_two.len(), 2);
    assert!(round_two.iter().all(|f| f.slot_number == 2));

    bracket
        .store
        .record_tie_resolution(TieResolution {
            competition_id: bracket.competition_id,
            round: 1,
            slot_number: 1,
            winner_team_id: bracket.teams[1],
            resolved_by: "referee".to_string(),
            created_at: Utc::now(),
        })
        .await
        .unwrap();

    let report = bracket.engine.progress(bracket.competition_id, &bracket.shape).await.unwrap();
    assert!(report.unresolved.is_empty());
    assert_eq!(report.created.len(), 2);

    let round_two = bracket.round(2).await;
    let decided = leg(&round_two, 1, 1);
    assert_eq!((decided.home_team_id, decided.away_team_id), (bracket.teams[1], bracket.teams[2]));
}

#[tokio::test]
async fn concurrent_progress_never_duplicates_fixtures() {
    let bracket = seeded_bracket(16).await;
    bracket.play_round(1).await;

    let runs = (0..8).map(|_| {
        let engine = bracket.engine.clone();
        let competition_id = bracket.competition_id;
        let shape = bracket.shape;
        tokio::spawn(async move { engine.progress(competition_id, &shape).await })
    });

    let mut created = 0;
    for run in runs.collect::<Vec<_>>() {
        created += run.await.unwrap().unwrap().created.len();
    }
    assert_eq!(created, 8, "each round-2 leg is reported by exactly one run");

    let round_two = bracket.round(2).await;
    assert_eq!(round_two.len(), 8);
    let keys: HashSet<(i32, i32)> = round_two.iter().map(|f| (f.slot_number, f.leg)).collect();
    assert_eq!(keys.len(), 8);
}

#[tokio::test]
async fn missing_leg_is_recreated_on_the_next_run() {
    let bracket = seeded_bracket(4).await;
    let round_one = bracket.round(1).await;
    bracket.store.delete_fixture(leg(&round_one, 2, 2).id).await.unwrap();

    let report = bracket.engine.progress(bracket.competition_id, &bracket.shape).await.unwrap();
    assert!(report.created.is_empty(), "round 1 is not complete, nothing to generate");

    let slots = vec![
        (1, bracket.teams[0]),
        (2, bracket.teams[1]),
        (3, bracket.teams[2]),
        (4, bracket.teams[3]),
    ]
    .into_iter()
    .map(|(position, team_id)| BracketSlotAssignment {
        competition_id: bracket.competition_id,
        position,
        team_id,
    })
    .collect::<Vec<_>>();
    let recreated = bracket.engine.seed(bracket.competition_id, &bracket.shape, &slots).await.unwrap();
    assert_eq!(recreated.len(), 1);
    assert_eq!((recreated[0].slot_number, recreated[0].leg), (2, 2));
    assert_eq!(recreated[0].home_team_id, bracket.teams[3]);
}

#[tokio::test]
async fn round_count_matches_field_size() {
    for (teams, rounds) in [(2, 1), (8, 3), (64, 6)] {
        let bracket = seeded_bracket(teams).await;
        let view = bracket.engine.bracket(bracket.competition_id, &bracket.shape).await.unwrap();
        assert_eq!(view.rounds.len(), rounds);
        assert_eq!(view.rounds.last().unwrap().slots.len(), 1);
        assert!(view.rounds.last().unwrap().is_final);
    }
}
