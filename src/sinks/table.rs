use super::ResultSink;
use crate::requests::Candidate;
use crate::results::{Completion, Outcome, ProbeResult};
use crate::statistics::Statistics;

use std::io::{self, Stdout, Write};
use std::time::Duration;

use colored::Colorize;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use reqwest::StatusCode;
use tracing::warn;
use url::Url;

const ENDPOINT_WIDTH: usize = 32;
const STATUS_WIDTH: usize = 24;

/// live table output: a header panel, one row per [`ProbeResult`], and a
/// spinner footer showing progress through the wordlist
///
/// rows are written to `W` (stdout by default) while the footer is drawn on its
/// own target (stderr by default), so redirected output only ever contains the
/// table itself
pub struct TableSink<W>
where
    W: Write,
{
    writer: W,
    footer: ProgressBar,
}

impl TableSink<Stdout> {
    /// create a `TableSink` that writes rows to stdout and draws its footer on stderr
    #[must_use]
    pub fn stdout() -> Self {
        Self::new(io::stdout(), ProgressDrawTarget::stderr())
    }
}

impl<W> TableSink<W>
where
    W: Write,
{
    /// create a new `TableSink`; pass [`ProgressDrawTarget::hidden`] to suppress
    /// the footer entirely
    pub fn new(writer: W, footer_target: ProgressDrawTarget) -> Self {
        let footer = ProgressBar::with_draw_target(None, footer_target);

        let style = ProgressStyle::with_template(
            "{spinner:.cyan} [{elapsed_precise}] {pos}/{len} probed | {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_spinner());

        footer.set_style(style);

        Self { writer, footer }
    }

    /// consume the sink, returning the wrapped writer
    pub fn into_inner(self) -> W {
        self.footer.finish_and_clear();
        self.writer
    }

    fn write_lines(&mut self, lines: &[String]) {
        let writer = &mut self.writer;

        // hide the footer while writing so rows never tear through it
        let written = self.footer.suspend(|| -> io::Result<()> {
            for line in lines {
                writeln!(writer, "{line}")?;
            }
            writer.flush()
        });

        if let Err(error) = written {
            warn!(%error, "could not write table output");
        }
    }
}

/// render the header panel shown above the table
fn panel(target: &Url, total: usize) -> Vec<String> {
    let title = String::from("pathprobe :: sequential path audit");
    let detail = format!("target: {target} | candidates: {total}");

    let width = title.chars().count().max(detail.chars().count());
    let border = "─".repeat(width + 2);

    vec![
        format!("╭{border}╮").blue().to_string(),
        format!(
            "{} {} {}",
            "│".blue(),
            format!("{title:<width$}").cyan().bold(),
            "│".blue()
        ),
        format!("{} {detail:<width$} {}", "│".blue(), "│".blue()),
        format!("╰{border}╯").blue().to_string(),
    ]
}

fn column_header() -> Vec<String> {
    let header = format!(
        "{:<ENDPOINT_WIDTH$} | {:^STATUS_WIDTH$} | {}",
        "Endpoint", "Status", "Message"
    );
    let rule = "-".repeat(header.chars().count());

    vec![header.bold().to_string(), rule]
}

/// the observed status code with its reason phrase, or `ERROR` when no
/// response arrived
fn status_cell(status_code: Option<u16>) -> String {
    let Some(code) = status_code else {
        return String::from("ERROR");
    };

    match StatusCode::from_u16(code)
        .ok()
        .and_then(|status| status.canonical_reason())
    {
        Some(reason) => format!("{code} {reason}"),
        None => code.to_string(),
    }
}

/// render a single result as a table row: `Endpoint | Status | Message`
#[must_use]
pub fn format_row(result: &ProbeResult) -> String {
    let endpoint = format!("/{}", result.candidate().as_str().trim_start_matches('/'));

    let status = status_cell(result.status_code());
    let status = format!("{status:^STATUS_WIDTH$}");

    let status = match result.outcome() {
        Outcome::Exposed { .. } => status.green(),
        Outcome::Protected => status.yellow().bold(),
        Outcome::RateLimited => status.red().bold(),
        Outcome::Unclassified { .. } => status.normal(),
        Outcome::TransportError { .. } => status.yellow().bold(),
    };

    let message = match result.size() {
        Some(size) => format!("{} (Size: {size})", result.message()),
        None => result.message().into_owned(),
    };

    format!(
        "{} | {status} | {}",
        format!("{endpoint:<ENDPOINT_WIDTH$}").cyan(),
        message.dimmed()
    )
}

impl<W> ResultSink for TableSink<W>
where
    W: Write,
{
    fn start(&mut self, target: &Url, total: usize) {
        let mut lines = panel(target, total);
        lines.push(String::new());
        lines.extend(column_header());

        self.write_lines(&lines);

        self.footer.set_length(total as u64);
        self.footer.set_position(0);
        self.footer.enable_steady_tick(Duration::from_millis(120));
    }

    fn probing(&mut self, candidate: &Candidate) {
        self.footer.set_message(format!("probing /{candidate}"));
    }

    fn report(&mut self, result: &ProbeResult) {
        self.write_lines(&[format_row(result)]);
        self.footer.inc(1);
    }

    fn finish(&mut self, statistics: &Statistics, completion: &Completion) {
        self.footer.finish_and_clear();

        let headline = match completion {
            Completion::Exhausted => format!("✔ Audit complete: {completion}.").green().bold(),
            Completion::RateLimited { .. } => {
                format!("✖ Audit halted: {completion}.").yellow().bold()
            }
        };

        self.write_lines(&[String::new(), headline.to_string(), statistics.to_string()]);
    }
}
