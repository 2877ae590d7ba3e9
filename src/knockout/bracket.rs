use thiserror::Error;

pub const MIN_BRACKET_TEAMS: i32 = 2;
pub const MAX_BRACKET_TEAMS: i32 = 64;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BracketError {
    #[error("Bracket team count must be a power of two between 2 and 64, got {0}")]
    InvalidTeamCount(i32),

    #[error("Round {round} does not exist in a bracket of {total_rounds} rounds")]
    RoundOutOfRange { round: i32, total_rounds: i32 },
}

/// Geometry of a single-elimination bracket with a power-of-two field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BracketShape {
    team_count: i32,
}

impl BracketShape {
    pub fn new(team_count: i32) -> Result<Self, BracketError> {
        if !(MIN_BRACKET_TEAMS..=MAX_BRACKET_TEAMS).contains(&team_count)
            || !(team_count as u32).is_power_of_two()
        {
            return Err(BracketError::InvalidTeamCount(team_count));
        }
        Ok(Self { team_count })
    }

    pub fn team_count(&self) -> i32 {
        self.team_count
    }

    /// `log2(team_count)`
    pub fn total_rounds(&self) -> i32 {
        (self.team_count as u32).trailing_zeros() as i32
    }

    pub fn contains_round(&self, round: i32) -> bool {
        (1..=self.total_rounds()).contains(&round)
    }

    pub fn check_round(&self, round: i32) -> Result<(), BracketError> {
        if self.contains_round(round) {
            Ok(())
        } else {
            Err(BracketError::RoundOutOfRange {
                round,
                total_rounds: self.total_rounds(),
            })
        }
    }

    /// `team_count / 2^round`, zero outside the bracket
    pub fn slots_in_round(&self, round: i32) -> i32 {
        if !self.contains_round(round) {
            return 0;
        }
        self.team_count >> round
    }

    pub fn is_final(&self, round: i32) -> bool {
        round == self.total_rounds()
    }

    /// The final is a single match, every other round is home and away.
    pub fn legs_in_round(&self, round: i32) -> i32 {
        if self.is_final(round) {
            1
        } else {
            2
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_non_power_of_two() {
        assert_eq!(BracketShape::new(6), Err(BracketError::InvalidTeamCount(6)));
        assert_eq!(BracketShape::new(0), Err(BracketError::InvalidTeamCount(0)));
        assert_eq!(BracketShape::new(1), Err(BracketError::InvalidTeamCount(1)));
        assert_eq!(BracketShape::new(-8), Err(BracketError::InvalidTeamCount(-8)));
        assert_eq!(BracketShape::new(128), Err(BracketError::InvalidTeamCount(128)));
    }

    #[test]
    fn test_round_count_is_log2() {
        for (teams, rounds) in [(2, 1), (4, 2), (8, 3), (16, 4), (32, 5), (64, 6)] {
            let shape = BracketShape::new(teams).unwrap();
            assert_eq!(shape.total_rounds(), rounds, "{} teams", teams);
            assert_eq!(shape.slots_in_round(rounds), 1);
            assert!(shape.is_final(rounds));
        }
    }

    #[test]
    fn test_slots_and_legs_per_round() {
        let shape = BracketShape::new(8).unwrap();
        assert_eq!(shape.slots_in_round(1), 4);
        assert_eq!(shape.slots_in_round(2), 2);
        assert_eq!(shape.slots_in_round(3), 1);
        assert_eq!(shape.slots_in_round(4), 0);
        assert_eq!(shape.legs_in_round(1), 2);
        assert_eq!(shape.legs_in_round(2), 2);
        assert_eq!(shape.legs_in_round(3), 1);
    }
}
