//! Per-play efficiency metrics derived from the event log.
//!
//! Metrics are never stored; every call recomputes them from the events so
//! repeated queries over the same log always agree.

use crate::event::PlayEvent;
use crate::outcome::ParseError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Whether a Foul event counts as an attempt (possession) for a play.
///
/// Success rate ignores fouls under either policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FoulPolicy {
    /// A foul ends a possession with zero points: it counts toward attempts,
    /// points per possession and frequency.
    #[default]
    Count,
    /// Fouls are invisible to attempts, points per possession and frequency.
    Exclude,
}

impl fmt::Display for FoulPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FoulPolicy::Count => f.pad("count"),
            FoulPolicy::Exclude => f.pad("exclude"),
        }
    }
}

impl FromStr for FoulPolicy {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "count" => Ok(FoulPolicy::Count),
            "exclude" => Ok(FoulPolicy::Exclude),
            _ => Err(ParseError::new("foul policy", s)),
        }
    }
}

/// One row of the metrics table.
///
/// Ratios with a zero denominator are `None` rather than NaN or a panic.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayMetrics {
    pub play: String,
    pub attempts: u32,
    pub points: u32,
    pub made: u32,
    pub missed: u32,
    pub fouls: u32,
    pub points_per_possession: Option<f64>,
    pub frequency: Option<f64>,
    pub success_rate: Option<f64>,
}

#[derive(Default)]
struct Tally {
    points: u32,
    made: u32,
    missed: u32,
    fouls: u32,
}

impl Tally {
    fn attempts(&self, policy: FoulPolicy) -> u32 {
        match policy {
            FoulPolicy::Count => self.made + self.missed + self.fouls,
            FoulPolicy::Exclude => self.made + self.missed,
        }
    }
}

fn ratio(numerator: u32, denominator: u32) -> Option<f64> {
    if denominator == 0 {
        None
    } else {
        Some(f64::from(numerator) / f64::from(denominator))
    }
}

/// Compute one row per distinct play, in first-seen order.
///
/// An empty log yields an empty table.
pub fn compute_metrics(events: &[PlayEvent], policy: FoulPolicy) -> Vec<PlayMetrics> {
    let mut order: Vec<(&str, Tally)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for event in events {
        let slot = *index.entry(event.play.as_str()).or_insert_with(|| {
            order.push((event.play.as_str(), Tally::default()));
            order.len() - 1
        });
        let tally = &mut order[slot].1;
        tally.points += event.outcome.points();
        if event.outcome.is_made() {
            tally.made += 1;
        } else if event.outcome.is_missed() {
            tally.missed += 1;
        } else {
            tally.fouls += 1;
        }
    }

    let total_attempts: u32 = order.iter().map(|(_, t)| t.attempts(policy)).sum();

    order
        .into_iter()
        .map(|(play, tally)| {
            let attempts = tally.attempts(policy);
            PlayMetrics {
                play: play.to_string(),
                attempts,
                points: tally.points,
                made: tally.made,
                missed: tally.missed,
                fouls: tally.fouls,
                points_per_possession: ratio(tally.points, attempts),
                frequency: ratio(attempts, total_attempts),
                success_rate: ratio(tally.made, tally.made + tally.missed),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Quarter;
    use crate::outcome::Outcome;

    fn ev(play: &str, outcome: Outcome) -> PlayEvent {
        PlayEvent::new(Quarter::Q1, play, outcome)
    }

    fn approx(actual: Option<f64>, expected: f64) {
        let actual = actual.expect("expected a value, got sentinel");
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn pick_and_roll_isolation_scenario() {
        let events = vec![
            ev("Pick & Roll", Outcome::MadeTwo),
            ev("Pick & Roll", Outcome::MissedTwo),
            ev("Isolation", Outcome::MadeThree),
        ];
        let rows = compute_metrics(&events, FoulPolicy::Count);
        assert_eq!(rows.len(), 2);

        let pnr = &rows[0];
        assert_eq!(pnr.play, "Pick & Roll");
        assert_eq!(pnr.attempts, 2);
        assert_eq!(pnr.points, 2);
        approx(pnr.points_per_possession, 1.0);
        approx(pnr.frequency, 2.0 / 3.0);
        approx(pnr.success_rate, 0.5);

        let iso = &rows[1];
        assert_eq!(iso.play, "Isolation");
        assert_eq!(iso.attempts, 1);
        assert_eq!(iso.points, 3);
        approx(iso.points_per_possession, 3.0);
        approx(iso.frequency, 1.0 / 3.0);
        approx(iso.success_rate, 1.0);
    }

    #[test]
    fn empty_log_gives_empty_table() {
        assert!(compute_metrics(&[], FoulPolicy::Count).is_empty());
        assert!(compute_metrics(&[], FoulPolicy::Exclude).is_empty());
    }

    #[test]
    fn rows_follow_first_seen_order() {
        let events = vec![
            ev("Transition", Outcome::MadeTwo),
            ev("Post Up", Outcome::MissedTwo),
            ev("Transition", Outcome::Foul),
            ev("Spot Up", Outcome::MadeThree),
            ev("Post Up", Outcome::MadeTwo),
        ];
        let plays: Vec<String> = compute_metrics(&events, FoulPolicy::Count)
            .into_iter()
            .map(|m| m.play)
            .collect();
        assert_eq!(plays, vec!["Transition", "Post Up", "Spot Up"]);
    }

    #[test]
    fn compute_is_idempotent() {
        let events = vec![
            ev("Isolation", Outcome::MadeThree),
            ev("Post Up", Outcome::Foul),
            ev("Isolation", Outcome::MissedThree),
        ];
        let first = compute_metrics(&events, FoulPolicy::Count);
        let second = compute_metrics(&events, FoulPolicy::Count);
        assert_eq!(first, second);
    }

    #[test]
    fn frequencies_sum_to_one() {
        let events = vec![
            ev("A", Outcome::MadeTwo),
            ev("B", Outcome::Foul),
            ev("C", Outcome::MissedThree),
            ev("A", Outcome::MissedTwo),
            ev("B", Outcome::MadeThree),
            ev("D", Outcome::MadeTwo),
            ev("A", Outcome::Foul),
        ];
        for policy in [FoulPolicy::Count, FoulPolicy::Exclude] {
            let sum: f64 = compute_metrics(&events, policy)
                .iter()
                .filter_map(|m| m.frequency)
                .sum();
            assert!((sum - 1.0).abs() < 1e-9, "{policy}: sum was {sum}");
        }
    }

    #[test]
    fn misses_only_gives_zero_ppp() {
        let events = vec![
            ev("Post Up", Outcome::MissedTwo),
            ev("Post Up", Outcome::MissedThree),
        ];
        let rows = compute_metrics(&events, FoulPolicy::Count);
        approx(rows[0].points_per_possession, 0.0);
        approx(rows[0].success_rate, 0.0);
    }

    #[test]
    fn fouls_only_success_rate_is_sentinel() {
        let events = vec![
            ev("Post Up", Outcome::Foul),
            ev("Post Up", Outcome::Foul),
            ev("Isolation", Outcome::MadeTwo),
        ];
        let rows = compute_metrics(&events, FoulPolicy::Count);
        assert_eq!(rows[0].success_rate, None);
        assert_eq!(rows[0].attempts, 2);
        approx(rows[0].points_per_possession, 0.0);
        // Other plays are still computed.
        approx(rows[1].success_rate, 1.0);
    }

    #[test]
    fn count_policy_includes_fouls_in_attempts() {
        let events = vec![
            ev("Pick & Roll", Outcome::MadeTwo),
            ev("Pick & Roll", Outcome::Foul),
            ev("Isolation", Outcome::MissedTwo),
        ];
        let rows = compute_metrics(&events, FoulPolicy::Count);
        assert_eq!(rows[0].attempts, 2);
        assert_eq!(rows[0].fouls, 1);
        approx(rows[0].points_per_possession, 1.0);
        approx(rows[0].frequency, 2.0 / 3.0);
        approx(rows[0].success_rate, 1.0);
    }

    #[test]
    fn exclude_policy_drops_fouls_from_attempts() {
        let events = vec![
            ev("Pick & Roll", Outcome::MadeTwo),
            ev("Pick & Roll", Outcome::Foul),
            ev("Isolation", Outcome::MissedTwo),
        ];
        let rows = compute_metrics(&events, FoulPolicy::Exclude);
        assert_eq!(rows[0].attempts, 1);
        assert_eq!(rows[0].fouls, 1);
        approx(rows[0].points_per_possession, 2.0);
        approx(rows[0].frequency, 0.5);
        approx(rows[0].success_rate, 1.0);
    }

    #[test]
    fn exclude_policy_keeps_foul_only_play_with_sentinels() {
        let events = vec![ev("Post Up", Outcome::Foul)];
        let rows = compute_metrics(&events, FoulPolicy::Exclude);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].attempts, 0);
        assert_eq!(rows[0].points_per_possession, None);
        assert_eq!(rows[0].frequency, None);
        assert_eq!(rows[0].success_rate, None);
    }

    #[test]
    fn foul_policy_parses() {
        assert_eq!("Count".parse::<FoulPolicy>().unwrap(), FoulPolicy::Count);
        assert_eq!(
            "exclude".parse::<FoulPolicy>().unwrap(),
            FoulPolicy::Exclude
        );
        assert!("sometimes".parse::<FoulPolicy>().is_err());
    }
}
