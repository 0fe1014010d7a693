//! CSV export of the play log and the metrics table.
//!
//! Rows keep the order the session returns them in. Ratios are written with
//! full precision; ratios without a denominator are written as empty fields.

use crate::event::PlayEvent;
use crate::metrics::PlayMetrics;
use crate::session::{GameInfo, TaggingSession};
use std::path::{Path, PathBuf};

pub const LOG_HEADER: [&str; 3] = ["Quarter", "Play", "Outcome"];
pub const METRICS_HEADER: [&str; 6] = [
    "Play",
    "Attempts",
    "Points",
    "Points per Possession",
    "Frequency",
    "Success Rate",
];

/// Errors from building or writing CSV exports.
#[derive(Debug)]
pub enum ExportError {
    Csv(csv::Error),
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl std::fmt::Display for ExportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportError::Csv(e) => write!(f, "failed to encode CSV: {e}"),
            ExportError::Io { path, source } => {
                write!(f, "failed to write {}: {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ExportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ExportError::Csv(e) => Some(e),
            ExportError::Io { source, .. } => Some(source),
        }
    }
}

impl From<csv::Error> for ExportError {
    fn from(e: csv::Error) -> Self {
        ExportError::Csv(e)
    }
}

/// Full precision, always with a fractional part (`1.0`, not `1`).
fn format_ratio(value: Option<f64>) -> String {
    value.map(|v| format!("{v:?}")).unwrap_or_default()
}

fn finish(writer: csv::Writer<Vec<u8>>) -> Result<Vec<u8>, ExportError> {
    writer
        .into_inner()
        .map_err(|e| ExportError::Csv(csv::Error::from(e.into_error())))
}

/// Encode the raw play log as `Quarter,Play,Outcome`.
pub fn log_csv(events: &[PlayEvent]) -> Result<Vec<u8>, ExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(LOG_HEADER)?;
    for event in events {
        writer.write_record([
            event.quarter.label(),
            event.play.as_str(),
            event.outcome.label(),
        ])?;
    }
    finish(writer)
}

/// Encode the metrics table with the fixed six-column header.
pub fn metrics_csv(rows: &[PlayMetrics]) -> Result<Vec<u8>, ExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(METRICS_HEADER)?;
    for row in rows {
        writer.write_record([
            row.play.clone(),
            row.attempts.to_string(),
            row.points.to_string(),
            format_ratio(row.points_per_possession),
            format_ratio(row.frequency),
            format_ratio(row.success_rate),
        ])?;
    }
    finish(writer)
}

/// Replace anything that is awkward in a file name with `_`.
fn file_token(value: &str) -> String {
    value
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

fn export_file_name(kind: &str, game: &GameInfo) -> String {
    let opponent = game.opponent.as_deref().map(file_token).unwrap_or_default();
    let date = game.date.map(|d| d.to_string()).unwrap_or_default();
    format!("play_{kind}_{opponent}_{date}.csv")
}

/// `play_log_{opponent}_{date}.csv`
pub fn log_file_name(game: &GameInfo) -> String {
    export_file_name("log", game)
}

/// `play_metrics_{opponent}_{date}.csv`
pub fn metrics_file_name(game: &GameInfo) -> String {
    export_file_name("metrics", game)
}

/// Paths written by [`export_session`]. A table with no rows is skipped.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ExportSummary {
    pub log: Option<PathBuf>,
    pub metrics: Option<PathBuf>,
}

fn write_file(path: &Path, bytes: &[u8]) -> Result<(), ExportError> {
    std::fs::write(path, bytes).map_err(|e| ExportError::Io {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Write both CSV files into `dir`, creating it if needed.
pub fn export_session(
    dir: &Path,
    session: &TaggingSession,
) -> Result<ExportSummary, ExportError> {
    let mut summary = ExportSummary::default();
    if session.events().is_empty() {
        tracing::debug!("nothing tagged yet, skipping export");
        return Ok(summary);
    }

    std::fs::create_dir_all(dir).map_err(|e| ExportError::Io {
        path: dir.to_path_buf(),
        source: e,
    })?;

    let log_path = dir.join(log_file_name(session.game()));
    write_file(&log_path, &log_csv(session.events())?)?;
    tracing::info!(
        path = %log_path.display(),
        rows = session.events().len(),
        "exported play log"
    );
    summary.log = Some(log_path);

    let rows = session.metrics();
    if !rows.is_empty() {
        let metrics_path = dir.join(metrics_file_name(session.game()));
        write_file(&metrics_path, &metrics_csv(&rows)?)?;
        tracing::info!(
            path = %metrics_path.display(),
            rows = rows.len(),
            "exported metrics"
        );
        summary.metrics = Some(metrics_path);
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::PlayCatalog;
    use crate::event::Quarter;
    use crate::metrics::{compute_metrics, FoulPolicy};
    use crate::outcome::Outcome;
    use chrono::NaiveDate;
    use tempfile::tempdir;

    fn text(bytes: Vec<u8>) -> String {
        String::from_utf8(bytes).unwrap()
    }

    fn scenario_events() -> Vec<PlayEvent> {
        vec![
            PlayEvent::new(Quarter::Q1, "Pick & Roll", Outcome::MadeTwo),
            PlayEvent::new(Quarter::Q1, "Pick & Roll", Outcome::MissedTwo),
            PlayEvent::new(Quarter::Q2, "Isolation", Outcome::MadeThree),
        ]
    }

    #[test]
    fn log_csv_has_fixed_header_and_rows_in_order() {
        let csv = text(log_csv(&scenario_events()).unwrap());
        assert_eq!(
            csv,
            "Quarter,Play,Outcome\n\
             Q1,Pick & Roll,Made 2\n\
             Q1,Pick & Roll,Missed 2\n\
             Q2,Isolation,Made 3\n"
        );
    }

    #[test]
    fn empty_log_csv_is_header_only() {
        assert_eq!(text(log_csv(&[]).unwrap()), "Quarter,Play,Outcome\n");
    }

    #[test]
    fn metrics_csv_writes_ratios() {
        let rows = compute_metrics(&scenario_events(), FoulPolicy::Count);
        let csv = text(metrics_csv(&rows).unwrap());
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(
            lines[0],
            "Play,Attempts,Points,Points per Possession,Frequency,Success Rate"
        );
        assert_eq!(lines[1], "Pick & Roll,2,2,1.0,0.6666666666666666,0.5");
        assert_eq!(lines[2], "Isolation,1,3,3.0,0.3333333333333333,1.0");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn metrics_csv_leaves_sentinels_empty() {
        let events = vec![PlayEvent::new(Quarter::Q4, "Post Up", Outcome::Foul)];
        let rows = compute_metrics(&events, FoulPolicy::Count);
        let csv = text(metrics_csv(&rows).unwrap());
        assert_eq!(csv.lines().nth(1), Some("Post Up,1,0,0.0,1.0,"));
    }

    #[test]
    fn play_names_with_commas_are_quoted() {
        let events = vec![PlayEvent::new(Quarter::Q1, "Horns, Flare", Outcome::Foul)];
        let csv = text(log_csv(&events).unwrap());
        assert_eq!(csv.lines().nth(1), Some("Q1,\"Horns, Flare\",Foul"));
    }

    #[test]
    fn file_names_follow_opponent_and_date() {
        let game = GameInfo {
            opponent: Some("St. Mary's".to_string()),
            date: NaiveDate::from_ymd_opt(2024, 2, 10),
            quarter: Quarter::Q1,
        };
        assert_eq!(log_file_name(&game), "play_log_St__Mary_s_2024-02-10.csv");
        assert_eq!(
            metrics_file_name(&game),
            "play_metrics_St__Mary_s_2024-02-10.csv"
        );
        assert_eq!(log_file_name(&GameInfo::default()), "play_log__.csv");
    }

    #[test]
    fn export_session_writes_both_files() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("exports");
        let mut session = TaggingSession::new(
            GameInfo {
                opponent: Some("Heat".to_string()),
                date: NaiveDate::from_ymd_opt(2024, 4, 2),
                quarter: Quarter::Q1,
            },
            PlayCatalog::new(),
            FoulPolicy::Count,
        );
        for event in scenario_events() {
            session.record_event(&event.play, event.outcome).unwrap();
        }

        let summary = export_session(&out, &session).unwrap();
        let log_path = summary.log.unwrap();
        let metrics_path = summary.metrics.unwrap();
        assert_eq!(log_path, out.join("play_log_Heat_2024-04-02.csv"));
        assert!(std::fs::read_to_string(&log_path)
            .unwrap()
            .starts_with("Quarter,Play,Outcome\n"));
        assert!(std::fs::read_to_string(&metrics_path)
            .unwrap()
            .contains("Isolation,1,3,3.0,"));
    }

    #[test]
    fn export_session_skips_empty_session() {
        let dir = tempdir().unwrap();
        let summary = export_session(dir.path(), &TaggingSession::default()).unwrap();
        assert_eq!(summary, ExportSummary::default());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
