use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::fixture::Fixture;

/// Goals over all legs of a tie, seen from leg 1's home and away sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Aggregate {
    pub home_team_id: Uuid,
    pub away_team_id: Uuid,
    pub aggregate_home: i32,
    pub aggregate_away: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SlotVerdict {
    /// A leg is missing or still has no score.
    AwaitingLegs,
    /// Every leg is scored but at least one is not approved yet.
    AwaitingApproval,
    Decided {
        winner_team_id: Uuid,
        loser_team_id: Uuid,
        aggregate: Aggregate,
        manually_resolved: bool,
    },
    /// Level on aggregate with no admin decision recorded.
    RequiresManualResolution { aggregate: Aggregate },
    Inconsistent { reason: String },
}

impl SlotVerdict {
    pub fn winner(&self) -> Option<Uuid> {
        match self {
            SlotVerdict::Decided { winner_team_id, .. } => Some(*winner_team_id),
            _ => None,
        }
    }

    pub fn aggregate(&self) -> Option<&Aggregate> {
        match self {
            SlotVerdict::Decided { aggregate, .. }
            | SlotVerdict::RequiresManualResolution { aggregate } => Some(aggregate),
            _ => None,
        }
    }

    pub fn is_unresolved(&self) -> bool {
        matches!(
            self,
            SlotVerdict::RequiresManualResolution { .. } | SlotVerdict::Inconsistent { .. }
        )
    }

    fn inconsistent(reason: impl Into<String>) -> Self {
        SlotVerdict::Inconsistent { reason: reason.into() }
    }
}

/// Score one bracket slot from its legs.
///
/// `expected_legs` is 2 for ordinary rounds and 1 for the final. A level
/// aggregate is only decided when `tie_resolution` names one of the two teams.
pub fn score(legs: &[&Fixture], expected_legs: i32, tie_resolution: Option<Uuid>) -> SlotVerdict {
    if legs.len() as i32 > expected_legs {
        return SlotVerdict::inconsistent(format!(
            "slot has {} legs, expected {}",
            legs.len(),
            expected_legs
        ));
    }

    let mut ordered: Vec<&Fixture> = legs.to_vec();
    ordered.sort_by_key(|f| f.leg);

    for (i, fixture) in ordered.iter().enumerate() {
        if fixture.leg < 1 || fixture.leg > expected_legs {
            return SlotVerdict::inconsistent(format!(
                "leg {} outside 1..={}",
                fixture.leg, expected_legs
            ));
        }
        if i > 0 && ordered[i - 1].leg == fixture.leg {
            return SlotVerdict::inconsistent(format!("leg {} recorded twice", fixture.leg));
        }
        if fixture.home_team_id == fixture.away_team_id {
            return SlotVerdict::inconsistent(format!(
                "fixture {} has the same team on both sides",
                fixture.id
            ));
        }
        if fixture.approved && !fixture.is_scored() {
            return SlotVerdict::inconsistent(format!(
                "fixture {} is approved without a score",
                fixture.id
            ));
        }
    }

    if let [first, second] = ordered.as_slice() {
        if second.home_team_id != first.away_team_id || second.away_team_id != first.home_team_id {
            return SlotVerdict::inconsistent("leg 2 does not reverse the teams of leg 1");
        }
    }

    if (ordered.len() as i32) < expected_legs || ordered.iter().any(|f| !f.is_scored()) {
        return SlotVerdict::AwaitingLegs;
    }
    if ordered.iter().any(|f| !f.approved) {
        return SlotVerdict::AwaitingApproval;
    }

    let first = ordered[0];
    let mut aggregate = Aggregate {
        home_team_id: first.home_team_id,
        away_team_id: first.away_team_id,
        aggregate_home: first.home_score.unwrap_or(0),
        aggregate_away: first.away_score.unwrap_or(0),
    };
    if let Some(second) = ordered.get(1) {
        aggregate.aggregate_home += second.away_score.unwrap_or(0);
        aggregate.aggregate_away += second.home_score.unwrap_or(0);
    }

    let (home, away) = (aggregate.home_team_id, aggregate.away_team_id);
    if aggregate.aggregate_home > aggregate.aggregate_away {
        return SlotVerdict::Decided {
            winner_team_id: home,
            loser_team_id: away,
            aggregate,
            manually_resolved: false,
        };
    }
    if aggregate.aggregate_away > aggregate.aggregate_home {
        return SlotVerdict::Decided {
            winner_team_id: away,
            loser_team_id: home,
            aggregate,
            manually_resolved: false,
        };
    }

    match tie_resolution {
        Some(winner) if winner == home || winner == away => SlotVerdict::Decided {
            winner_team_id: winner,
            loser_team_id: if winner == home { away } else { home },
            aggregate,
            manually_resolved: true,
        },
        Some(winner) => SlotVerdict::inconsistent(format!(
            "tie resolution names team {} which does not play this slot",
            winner
        )),
        None => SlotVerdict::RequiresManualResolution { aggregate },
    }
}
