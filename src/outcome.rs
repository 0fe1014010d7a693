//! Possession outcomes and the fixed outcome -> points mapping.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The result of one tagged possession. Only these five values can be recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    MadeTwo,
    MadeThree,
    MissedTwo,
    MissedThree,
    Foul,
}

impl Outcome {
    /// All outcomes in display order.
    pub const ALL: [Outcome; 5] = [
        Outcome::MadeTwo,
        Outcome::MadeThree,
        Outcome::MissedTwo,
        Outcome::MissedThree,
        Outcome::Foul,
    ];

    /// Points scored on this outcome.
    pub fn points(self) -> u32 {
        match self {
            Outcome::MadeTwo => 2,
            Outcome::MadeThree => 3,
            Outcome::MissedTwo | Outcome::MissedThree | Outcome::Foul => 0,
        }
    }

    pub fn is_made(self) -> bool {
        matches!(self, Outcome::MadeTwo | Outcome::MadeThree)
    }

    pub fn is_missed(self) -> bool {
        matches!(self, Outcome::MissedTwo | Outcome::MissedThree)
    }

    /// Label used in tables and CSV export (e.g. `Made 2`).
    pub fn label(self) -> &'static str {
        match self {
            Outcome::MadeTwo => "Made 2",
            Outcome::MadeThree => "Made 3",
            Outcome::MissedTwo => "Missed 2",
            Outcome::MissedThree => "Missed 3",
            Outcome::Foul => "Foul",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

impl FromStr for Outcome {
    type Err = ParseError;

    /// Accepts the display label (`Made 2`), the snake-case name (`made_two`),
    /// compact forms like `made2` and the shorthands `2`, `3`, `-2`, `-3`, `f`.
    /// Case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        let outcome = match normalized.as_str() {
            "made_2" | "made2" | "made_two" | "2" => Outcome::MadeTwo,
            "made_3" | "made3" | "made_three" | "3" => Outcome::MadeThree,
            "missed_2" | "missed2" | "missed_two" | "_2" => Outcome::MissedTwo,
            "missed_3" | "missed3" | "missed_three" | "_3" => Outcome::MissedThree,
            "foul" | "f" => Outcome::Foul,
            _ => return Err(ParseError::new("outcome", s)),
        };
        Ok(outcome)
    }
}

/// A value that could not be parsed from user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    kind: &'static str,
    input: String,
}

impl ParseError {
    pub fn new(kind: &'static str, input: &str) -> Self {
        Self {
            kind,
            input: input.to_string(),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unrecognized {}: '{}'", self.kind, self.input)
    }
}

impl std::error::Error for ParseError {}
