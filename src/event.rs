use crate::outcome::{Outcome, ParseError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Game period a play was tagged in. Carried for the log only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Quarter {
    #[default]
    Q1,
    Q2,
    Q3,
    Q4,
    #[serde(rename = "OT")]
    Overtime,
}

impl Quarter {
    pub fn label(self) -> &'static str {
        match self {
            Quarter::Q1 => "Q1",
            Quarter::Q2 => "Q2",
            Quarter::Q3 => "Q3",
            Quarter::Q4 => "Q4",
            Quarter::Overtime => "OT",
        }
    }
}

impl fmt::Display for Quarter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

impl FromStr for Quarter {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "Q1" | "1" => Ok(Quarter::Q1),
            "Q2" | "2" => Ok(Quarter::Q2),
            "Q3" | "3" => Ok(Quarter::Q3),
            "Q4" | "4" => Ok(Quarter::Q4),
            "OT" => Ok(Quarter::Overtime),
            _ => Err(ParseError::new("quarter", s)),
        }
    }
}

/// One tagging action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayEvent {
    pub quarter: Quarter,
    pub play: String,
    pub outcome: Outcome,
}

impl PlayEvent {
    pub fn new(quarter: Quarter, play: impl Into<String>, outcome: Outcome) -> Self {
        Self {
            quarter,
            play: play.into(),
            outcome,
        }
    }
}
