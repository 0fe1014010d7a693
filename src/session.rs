//! One game's tagging session: event log, play catalog and game context.
//!
//! The session is the only owner of mutable state. Callers pass it by
//! reference into commands; nothing here is global.

use crate::catalog::{clean_name, DuplicatePlayError, PlayCatalog};
use crate::config::PlaytagConfig;
use crate::event::{PlayEvent, Quarter};
use crate::metrics::{compute_metrics, FoulPolicy, PlayMetrics};
use crate::outcome::Outcome;
use chrono::NaiveDate;
use serde::Serialize;

/// Context for the game being tagged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GameInfo {
    pub opponent: Option<String>,
    pub date: Option<NaiveDate>,
    pub quarter: Quarter,
}

/// Errors from mutating a session. None of them change state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    DuplicatePlay(DuplicatePlayError),
    EmptyPlayName,
}

impl std::fmt::Display for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionError::DuplicatePlay(e) => write!(f, "{e}"),
            SessionError::EmptyPlayName => write!(f, "play name must not be empty"),
        }
    }
}

impl std::error::Error for SessionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SessionError::DuplicatePlay(e) => Some(e),
            SessionError::EmptyPlayName => None,
        }
    }
}

impl From<DuplicatePlayError> for SessionError {
    fn from(e: DuplicatePlayError) -> Self {
        SessionError::DuplicatePlay(e)
    }
}

#[derive(Debug, Clone)]
pub struct TaggingSession {
    game: GameInfo,
    catalog: PlayCatalog,
    events: Vec<PlayEvent>,
    foul_policy: FoulPolicy,
}

fn normalize_name(name: &str) -> Result<&str, SessionError> {
    clean_name(name).ok_or(SessionError::EmptyPlayName)
}

impl TaggingSession {
    pub fn new(game: GameInfo, catalog: PlayCatalog, foul_policy: FoulPolicy) -> Self {
        Self {
            game,
            catalog,
            events: Vec::new(),
            foul_policy,
        }
    }

    pub fn from_config(config: &PlaytagConfig) -> Self {
        let game = GameInfo {
            opponent: config.game.opponent.clone(),
            date: config.game.date,
            quarter: config.game.quarter,
        };
        let catalog = PlayCatalog::with_plays(&config.plays.catalog);
        Self::new(game, catalog, config.metrics.foul_policy)
    }

    /// Append one event tagged with the current quarter and return a copy of
    /// it. An unseen play is registered in the catalog as a side effect.
    pub fn record_event(
        &mut self,
        play: &str,
        outcome: Outcome,
    ) -> Result<PlayEvent, SessionError> {
        let play = normalize_name(play)?;
        if self.catalog.ensure(play) {
            tracing::debug!(play, "registered play from first event");
        }
        let event = PlayEvent::new(self.game.quarter, play, outcome);
        self.events.push(event.clone());
        Ok(event)
    }

    /// Register a play for selection. Metrics are unaffected.
    pub fn add_play_type(&mut self, name: &str) -> Result<(), SessionError> {
        let name = normalize_name(name)?;
        self.catalog.add(name)?;
        Ok(())
    }

    /// Recompute the metrics table from the event log.
    pub fn metrics(&self) -> Vec<PlayMetrics> {
        compute_metrics(&self.events, self.foul_policy)
    }

    pub fn set_quarter(&mut self, quarter: Quarter) {
        self.game.quarter = quarter;
    }

    pub fn events(&self) -> &[PlayEvent] {
        &self.events
    }

    pub fn catalog(&self) -> &PlayCatalog {
        &self.catalog
    }

    pub fn game(&self) -> &GameInfo {
        &self.game
    }

    pub fn foul_policy(&self) -> FoulPolicy {
        self.foul_policy
    }

    /// `Game vs {opponent} on {date}`, only when both are known.
    pub fn heading(&self) -> Option<String> {
        match (&self.game.opponent, &self.game.date) {
            (Some(opponent), Some(date)) if !opponent.trim().is_empty() => {
                Some(format!("Game vs {opponent} on {date}"))
            }
            _ => None,
        }
    }
}

impl Default for TaggingSession {
    fn default() -> Self {
        Self::from_config(&PlaytagConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::DEFAULT_PLAYS;

    #[test]
    fn record_event_appends_with_current_quarter() {
        let mut session = TaggingSession::default();
        session.record_event("Isolation", Outcome::MadeTwo).unwrap();
        session.set_quarter(Quarter::Q3);
        session.record_event("Isolation", Outcome::Foul).unwrap();

        let events = session.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].quarter, Quarter::Q1);
        assert_eq!(events[1].quarter, Quarter::Q3);
        assert_eq!(events[1].outcome, Outcome::Foul);
    }

    #[test]
    fn record_event_registers_unseen_play() {
        let mut session = TaggingSession::default();
        session.record_event("Horns", Outcome::MissedThree).unwrap();
        assert!(session.catalog().contains("Horns"));
        assert_eq!(session.catalog().len(), DEFAULT_PLAYS.len() + 1);
    }

    #[test]
    fn record_event_trims_and_rejects_empty_names() {
        let mut session = TaggingSession::default();
        session.record_event("  Post Up ", Outcome::MadeTwo).unwrap();
        assert_eq!(session.events()[0].play, "Post Up");

        let err = session.record_event("   ", Outcome::MadeTwo).unwrap_err();
        assert_eq!(err, SessionError::EmptyPlayName);
        assert_eq!(session.events().len(), 1);
    }

    #[test]
    fn config_seeds_are_normalized_like_added_plays() {
        let mut config = PlaytagConfig::default();
        config.plays.catalog = vec!["".to_string(), " Horns ".to_string()];
        let mut session = TaggingSession::from_config(&config);
        assert_eq!(session.catalog().iter().collect::<Vec<_>>(), vec!["Horns"]);

        session.record_event("Horns", Outcome::MadeTwo).unwrap();
        assert_eq!(session.catalog().len(), 1);
        assert!(matches!(
            session.add_play_type("Horns"),
            Err(SessionError::DuplicatePlay(_))
        ));
    }

    #[test]
    fn add_play_type_twice_keeps_one_entry() {
        let mut session = TaggingSession::new(
            GameInfo::default(),
            PlayCatalog::new(),
            FoulPolicy::Count,
        );
        session.add_play_type("Post Up").unwrap();
        let err = session.add_play_type("Post Up").unwrap_err();
        assert!(matches!(err, SessionError::DuplicatePlay(_)));
        assert_eq!(session.catalog().len(), 1);
    }

    #[test]
    fn add_play_type_does_not_affect_metrics() {
        let mut session = TaggingSession::default();
        session.add_play_type("Floppy").unwrap();
        assert!(session.metrics().is_empty());
    }

    #[test]
    fn metrics_use_session_policy() {
        let mut session =
            TaggingSession::new(GameInfo::default(), PlayCatalog::new(), FoulPolicy::Exclude);
        session.record_event("Post Up", Outcome::MadeTwo).unwrap();
        session.record_event("Post Up", Outcome::Foul).unwrap();
        let rows = session.metrics();
        assert_eq!(rows[0].attempts, 1);
        assert_eq!(rows[0].points_per_possession, Some(2.0));
    }

    #[test]
    fn heading_requires_opponent_and_date() {
        let mut config = PlaytagConfig::default();
        config.game.opponent = Some("Bulls".to_string());
        assert_eq!(TaggingSession::from_config(&config).heading(), None);

        config.game.date = NaiveDate::from_ymd_opt(2024, 1, 15);
        assert_eq!(
            TaggingSession::from_config(&config).heading().as_deref(),
            Some("Game vs Bulls on 2024-01-15")
        );
    }
}
