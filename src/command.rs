//! Explicit mutations applied synchronously to a [`TaggingSession`].

use crate::event::{PlayEvent, Quarter};
use crate::outcome::{Outcome, ParseError};
use crate::session::{SessionError, TaggingSession};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordEventCommand {
    pub play: String,
    pub outcome: Outcome,
}

impl RecordEventCommand {
    /// Record the event and return it as stored, quarter included.
    pub fn apply(&self, session: &mut TaggingSession) -> Result<PlayEvent, SessionError> {
        let event = session.record_event(&self.play, self.outcome)?;
        tracing::info!(
            quarter = %event.quarter,
            play = %event.play,
            outcome = %event.outcome,
            "recorded event"
        );
        Ok(event)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddPlayTypeCommand {
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetQuarterCommand {
    pub quarter: Quarter,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    RecordEvent(RecordEventCommand),
    AddPlayType(AddPlayTypeCommand),
    SetQuarter(SetQuarterCommand),
}

/// What an applied command did, for echoing back to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    Recorded {
        quarter: Quarter,
        play: String,
        outcome: Outcome,
    },
    PlayAdded {
        name: String,
    },
    QuarterSet {
        quarter: Quarter,
    },
}

impl fmt::Display for CommandOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandOutcome::Recorded {
                quarter,
                play,
                outcome,
            } => write!(f, "[{quarter}] {play} - {outcome}"),
            CommandOutcome::PlayAdded { name } => write!(f, "Added play '{name}'"),
            CommandOutcome::QuarterSet { quarter } => write!(f, "Quarter set to {quarter}"),
        }
    }
}

impl Command {
    pub fn record(play: impl Into<String>, outcome: Outcome) -> Self {
        Command::RecordEvent(RecordEventCommand {
            play: play.into(),
            outcome,
        })
    }

    pub fn add_play(name: impl Into<String>) -> Self {
        Command::AddPlayType(AddPlayTypeCommand { name: name.into() })
    }

    pub fn set_quarter(quarter: Quarter) -> Self {
        Command::SetQuarter(SetQuarterCommand { quarter })
    }

    /// Apply to the session. On error the session is unchanged.
    pub fn apply(&self, session: &mut TaggingSession) -> Result<CommandOutcome, SessionError> {
        match self {
            Command::RecordEvent(cmd) => {
                let event = cmd.apply(session)?;
                Ok(CommandOutcome::Recorded {
                    quarter: event.quarter,
                    play: event.play,
                    outcome: event.outcome,
                })
            }
            Command::AddPlayType(cmd) => match session.add_play_type(&cmd.name) {
                Ok(()) => {
                    let name = cmd.name.trim().to_string();
                    tracing::info!(play = %name, "added play type");
                    Ok(CommandOutcome::PlayAdded { name })
                }
                Err(e) => {
                    tracing::warn!(play = %cmd.name, error = %e, "play type declined");
                    Err(e)
                }
            },
            Command::SetQuarter(cmd) => {
                session.set_quarter(cmd.quarter);
                tracing::info!(quarter = %cmd.quarter, "quarter changed");
                Ok(CommandOutcome::QuarterSet {
                    quarter: cmd.quarter,
                })
            }
        }
    }
}

impl FromStr for Command {
    type Err = ParseError;

    /// Parse `tag <outcome> <play...>`, `add <play...>` or `quarter <Q>`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let line = s.trim();
        let (verb, rest) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (line, ""),
        };

        match verb.to_ascii_lowercase().as_str() {
            "tag" | "t" => {
                let (first, tail) = rest
                    .split_once(char::is_whitespace)
                    .ok_or_else(|| ParseError::new("tag command", s))?;
                let tail = tail.trim_start();
                // Two-word labels such as `Made 2`.
                if let Some((second, play)) = tail.split_once(char::is_whitespace) {
                    if let Ok(outcome) = format!("{first} {second}").parse::<Outcome>() {
                        return Ok(Command::record(play.trim(), outcome));
                    }
                }
                Ok(Command::record(tail.trim(), first.parse()?))
            }
            "add" => {
                if rest.is_empty() {
                    return Err(ParseError::new("add command", s));
                }
                Ok(Command::add_play(rest))
            }
            "quarter" | "q" => Ok(Command::set_quarter(rest.parse()?)),
            _ => Err(ParseError::new("command", s)),
        }
    }
}
