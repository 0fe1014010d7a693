use crate::catalog::PlayCatalog;
use crate::event::PlayEvent;
use crate::metrics::PlayMetrics;

/// Points per possession to two decimals; `-` when undefined.
pub fn format_ppp(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v:.2}"),
        None => "-".to_string(),
    }
}

/// A ratio as a percentage with two decimals (`66.67%`); `-` when undefined.
pub fn format_percent(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.2}%", v * 100.0),
        None => "-".to_string(),
    }
}

/// Play log table, one row per event.
pub fn render_log(events: &[PlayEvent]) -> String {
    if events.is_empty() {
        return "No plays tagged yet.\n".to_string();
    }

    let mut out = format!("{:<4} {:<8} {:<24} OUTCOME\n", "#", "QUARTER", "PLAY");
    out.push_str(&"-".repeat(50));
    out.push('\n');
    for (i, event) in events.iter().enumerate() {
        out.push_str(&format!(
            "{:<4} {:<8} {:<24} {}\n",
            i + 1,
            event.quarter,
            event.play,
            event.outcome
        ));
    }
    out
}

/// Per-play metrics table.
pub fn render_metrics(rows: &[PlayMetrics]) -> String {
    if rows.is_empty() {
        return "No metrics yet.\n".to_string();
    }

    let mut out = format!(
        "{:<24} {:>8} {:>6} {:>6} {:>9} {:>8} FOULS\n",
        "PLAY", "ATTEMPTS", "POINTS", "PPP", "FREQUENCY", "SUCCESS"
    );
    out.push_str(&"-".repeat(80));
    out.push('\n');
    for row in rows {
        out.push_str(&format!(
            "{:<24} {:>8} {:>6} {:>6} {:>9} {:>8} {}\n",
            row.play,
            row.attempts,
            row.points,
            format_ppp(row.points_per_possession),
            format_percent(row.frequency),
            format_percent(row.success_rate),
            row.fouls
        ));
    }
    out
}

pub fn render_plays(catalog: &PlayCatalog) -> String {
    if catalog.is_empty() {
        return "No plays registered.\n".to_string();
    }

    let mut out = String::new();
    for (i, play) in catalog.iter().enumerate() {
        out.push_str(&format!("{:>3}. {play}\n", i + 1));
    }
    out
}
