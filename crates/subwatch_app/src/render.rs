use std::io::{self, Write};

use chrono::Local;
use subwatch_core::{AppViewModel, ItemRowView, PollPhase};
use subwatch_engine::ViewSink;
use subwatch_logging::watch_warn;

const BAR_WIDTH: usize = 30;

/// Redraws the whole job table on a terminal (stdout by default) after every
/// change.
pub struct TerminalView<W = io::Stdout> {
    out: W,
    write_failed: bool,
}

impl Default for TerminalView {
    fn default() -> Self {
        Self::with_writer(io::stdout())
    }
}

impl<W: Write> TerminalView<W> {
    pub fn with_writer(out: W) -> Self {
        Self {
            out,
            write_failed: false,
        }
    }

    fn write_frame(&mut self, view: &AppViewModel, clock: &str) -> io::Result<()> {
        // Clear screen and home the cursor before each frame.
        let mut frame = String::from("\x1b[2J\x1b[H");
        for line in render_lines(view, clock) {
            frame.push_str(&line);
            frame.push('\n');
        }
        self.out.write_all(frame.as_bytes())?;
        self.out.flush()
    }
}

impl<W: Write + Send> ViewSink for TerminalView<W> {
    fn render(&mut self, view: &AppViewModel) {
        let clock = Local::now().format("%H:%M:%S").to_string();
        match self.write_frame(view, &clock) {
            Ok(()) => self.write_failed = false,
            Err(err) => {
                // Reported once per run of failures, not once per frame.
                if !self.write_failed {
                    watch_warn!("terminal output failed: {}", err);
                }
                self.write_failed = true;
            }
        }
    }
}

pub fn render_lines(view: &AppViewModel, clock: &str) -> Vec<String> {
    let mut lines = Vec::new();

    lines.push(format!(
        "[{clock}] {} | {} videos | cycle {}",
        phase_label(view),
        view.rows.len(),
        view.cycles
    ));
    lines.push(format!(
        "{} {:>5.1}%  ({} / {} done)",
        progress_bar(view.progress.percent()),
        view.progress.percent(),
        view.progress.completed,
        view.progress.total
    ));
    if let Some(error) = &view.last_error {
        lines.push(format!("! {error}"));
    }
    lines.push(String::new());

    for row in &view.rows {
        lines.push(format_row(row));
        for log in &row.log {
            lines.push(format!("      {} {}", log.category.label(), log.text));
        }
    }

    lines
}

fn phase_label(view: &AppViewModel) -> &'static str {
    if view.scanning {
        return "Scanning";
    }
    match view.phase {
        PollPhase::Idle if view.download_enabled => "Ready",
        PollPhase::Idle => "Idle",
        PollPhase::Starting => "Starting download",
        PollPhase::Polling => "Downloading",
        PollPhase::Stopped => "Finished",
        PollPhase::Failed => "Failed",
        PollPhase::Cancelled => "Cancelled",
    }
}

fn format_row(row: &ItemRowView) -> String {
    let glyph = if row.glyph().is_empty() { "  " } else { row.glyph() };
    format!(
        "{glyph} #{index:<3} {code:<12} sub:{sub:<3} {file}",
        index = row.index,
        code = row.code.as_deref().unwrap_or("-"),
        sub = if row.has_subtitle { "Yes" } else { "No" },
        file = row.file
    )
}

/// Fixed-width bar whose filled part reflects `percent`.
fn progress_bar(percent: f64) -> String {
    let clamped = percent.clamp(0.0, 100.0);
    let filled = ((clamped / 100.0) * BAR_WIDTH as f64).round() as usize;
    format!("[{}{}]", "#".repeat(filled), ".".repeat(BAR_WIDTH - filled))
}
