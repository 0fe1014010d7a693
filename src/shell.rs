//! Line-oriented tagging shell.
//!
//! Each line is one user interaction: parse it, apply it to the session,
//! print what changed. Metrics are recomputed on every redraw.

use crate::command::{Command, CommandOutcome};
use crate::export;
use crate::outcome::{Outcome, ParseError};
use crate::session::TaggingSession;
use crate::table;
use std::io::{BufRead, Write};
use std::path::Path;

const HELP: &str = "\
Commands:
  tag <outcome> <play>   record a play (outcome: Made 2, Missed 3, Foul, 2, -3, f ...)
  add <play>             add a play type to the catalog
  quarter <Q1..Q4|OT>    set the quarter for subsequent tags
  plays                  list play types
  log                    show the play log
  metrics                show per-play metrics
  export                 write play log and metrics CSV files
  help                   show this help
  quit                   leave the session
";

#[derive(Debug, PartialEq, Eq)]
enum ShellInput {
    Apply(Command),
    Plays,
    Log,
    Metrics,
    Export,
    Help,
    Quit,
    Blank,
}

fn parse_line(line: &str) -> Result<ShellInput, ParseError> {
    let trimmed = line.trim();
    let input = match trimmed.to_ascii_lowercase().as_str() {
        "" => ShellInput::Blank,
        "plays" => ShellInput::Plays,
        "log" => ShellInput::Log,
        "metrics" | "m" => ShellInput::Metrics,
        "export" => ShellInput::Export,
        "help" | "?" => ShellInput::Help,
        "quit" | "exit" => ShellInput::Quit,
        _ => ShellInput::Apply(trimmed.parse()?),
    };
    Ok(input)
}

fn print_banner<W: Write>(session: &TaggingSession, out: &mut W) -> std::io::Result<()> {
    writeln!(out, "Basketball play tagging")?;
    if let Some(heading) = session.heading() {
        writeln!(out, "{heading}")?;
    }
    writeln!(
        out,
        "Quarter {} | foul policy: {} | type 'help' for commands",
        session.game().quarter,
        session.foul_policy()
    )?;
    let outcomes: Vec<&str> = Outcome::ALL.iter().map(|o| o.label()).collect();
    writeln!(out, "Outcomes: {}", outcomes.join(", "))?;
    write!(out, "{}", table::render_plays(session.catalog()))
}

/// Run the shell until `quit` or end of input.
pub fn run<R: BufRead, W: Write>(
    session: &mut TaggingSession,
    input: R,
    out: &mut W,
    export_dir: &Path,
) -> std::io::Result<()> {
    print_banner(session, out)?;

    for line in input.lines() {
        let line = line?;
        let parsed = match parse_line(&line) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::debug!(line = %line, "unparsable shell input");
                writeln!(out, "error: {e} (type 'help' for commands)")?;
                continue;
            }
        };

        match parsed {
            ShellInput::Blank => {}
            ShellInput::Quit => break,
            ShellInput::Help => write!(out, "{HELP}")?,
            ShellInput::Plays => write!(out, "{}", table::render_plays(session.catalog()))?,
            ShellInput::Log => write!(out, "{}", table::render_log(session.events()))?,
            ShellInput::Metrics => {
                write!(out, "{}", table::render_metrics(&session.metrics()))?
            }
            ShellInput::Export => match export::export_session(export_dir, session) {
                Ok(summary) => match (summary.log, summary.metrics) {
                    (None, None) => writeln!(out, "Nothing to export yet.")?,
                    (log, metrics) => {
                        for path in log.iter().chain(metrics.iter()) {
                            writeln!(out, "Wrote {}", path.display())?;
                        }
                    }
                },
                Err(e) => {
                    tracing::warn!(error = %e, "export failed");
                    writeln!(out, "error: {e}")?;
                }
            },
            ShellInput::Apply(command) => match command.apply(session) {
                Ok(outcome @ CommandOutcome::Recorded { .. }) => {
                    writeln!(out, "{outcome}")?;
                    write!(out, "{}", table::render_metrics(&session.metrics()))?;
                }
                Ok(outcome) => writeln!(out, "{outcome}")?,
                Err(e) => writeln!(out, "error: {e}")?,
            },
        }
        out.flush()?;
    }

    tracing::info!(events = session.events().len(), "tagging session ended");
    Ok(())
}
