use std::{f32::consts::FRAC_PI_2, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{CubeError, FaceletLabel, IntegrityError, Result};

/// Turn direction as seen from outside the face being turned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Clockwise,
    CounterClockwise,
}

impl Direction {
    pub fn reversed(self) -> Self {
        match self {
            Self::Clockwise => Self::CounterClockwise,
            Self::CounterClockwise => Self::Clockwise,
        }
    }

    fn sign(self) -> f32 {
        match self {
            Self::Clockwise => 1.0,
            Self::CounterClockwise => -1.0,
        }
    }
}

/// A single face turn parsed from move notation (`R`, `U'`, `F2`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Move {
    pub face: FaceletLabel,
    pub quarter_turns: u8,
    pub direction: Direction,
}

impl Move {
    /// A turn of one or two quarters. Any other count is rejected.
    pub fn new(face: FaceletLabel, quarter_turns: u8, direction: Direction) -> Result<Self> {
        if !(1..=2).contains(&quarter_turns) {
            return Err(IntegrityError::QuarterTurns(quarter_turns).into());
        }
        Ok(Self {
            face,
            quarter_turns,
            direction,
        })
    }

    pub fn clockwise(face: FaceletLabel) -> Self {
        Self {
            face,
            quarter_turns: 1,
            direction: Direction::Clockwise,
        }
    }

    pub fn inverse(self) -> Self {
        Self {
            direction: self.direction.reversed(),
            ..self
        }
    }

    /// Rotation angle in radians about the face's outward normal.
    ///
    /// A clockwise turn seen from outside is a negative right-handed rotation
    /// about the outward normal.
    pub fn angle(&self) -> f32 {
        -FRAC_PI_2 * f32::from(self.quarter_turns) * self.direction.sign()
    }
}

impl FromStr for Move {
    type Err = IntegrityError;

    fn from_str(token: &str) -> std::result::Result<Self, Self::Err> {
        let unknown = || IntegrityError::UnknownMove(token.to_string());
        let mut chars = token.chars();
        let face = chars
            .next()
            .and_then(FaceletLabel::from_char)
            .ok_or_else(unknown)?;

        let mut prime = false;
        let mut double = false;
        for modifier in chars {
            match modifier {
                '\'' | '’' if !prime => prime = true,
                '2' if !double => double = true,
                _ => return Err(unknown()),
            }
        }

        let direction = if prime {
            Direction::CounterClockwise
        } else {
            Direction::Clockwise
        };
        Ok(Self {
            face,
            quarter_turns: if double { 2 } else { 1 },
            direction,
        })
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.face)?;
        if self.quarter_turns == 2 {
            f.write_str("2")?;
        }
        if self.direction == Direction::CounterClockwise {
            f.write_str("'")?;
        }
        Ok(())
    }
}

/// Parses a whitespace separated move list. Any bad token rejects the whole
/// list so nothing is ever partially applied.
pub fn parse_sequence(text: &str) -> Result<Vec<Move>> {
    text.split_whitespace()
        .map(|token| token.parse::<Move>().map_err(CubeError::from))
        .collect()
}
