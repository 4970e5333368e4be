use super::ResultSink;
use crate::results::{Completion, Outcome, ProbeResult};
use crate::statistics::Statistics;

use std::io::{self, Stdout, Write};

use colored::Colorize;
use tracing::warn;
use url::Url;

/// sequential text output, one line per [`ProbeResult`]
///
/// # Examples
///
/// ```
/// # use pathprobe::sinks::{LineSink, ResultSink};
/// # use pathprobe::results::Completion;
/// # use pathprobe::statistics::Statistics;
/// colored::control::set_override(false);
///
/// let mut sink = LineSink::new(Vec::new());
/// sink.finish(&Statistics::new(), &Completion::Exhausted);
///
/// let output = String::from_utf8(sink.into_inner()).unwrap();
///
/// assert!(output.starts_with("[*] Audit complete: all candidates probed."));
/// ```
#[derive(Debug)]
pub struct LineSink<W>
where
    W: Write,
{
    writer: W,
}

impl LineSink<Stdout> {
    /// create a `LineSink` that writes to stdout
    #[must_use]
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W> LineSink<W>
where
    W: Write,
{
    /// create a new `LineSink` around the given writer
    pub const fn new(writer: W) -> Self {
        Self { writer }
    }

    /// consume the sink, returning the wrapped writer
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_line(&mut self, line: &str) {
        if let Err(error) = writeln!(self.writer, "{line}").and_then(|()| self.writer.flush()) {
            warn!(%error, "could not write result line");
        }
    }
}

/// render a single result the way [`LineSink`] prints it
#[must_use]
pub fn format_line(result: &ProbeResult) -> String {
    let url = result.url();

    match result.outcome() {
        Outcome::Exposed { size } => format!(
            "{} Path found: {url} (Size: {size})",
            "[EXPOSED]".green().bold()
        ),
        Outcome::Protected => format!(
            "{} Path detected but forbidden: {url}",
            "[PROTECTED]".yellow().bold()
        ),
        Outcome::RateLimited => format!(
            "{} Rate limit reached at {url}. Halting audit to protect the server.",
            "[ALERT]".red().bold()
        ),
        Outcome::Unclassified { status_code } => format!(
            "{} {url} answered with status {status_code}",
            "[UNCLASSIFIED]".dimmed()
        ),
        Outcome::TransportError { message, .. } => format!(
            "{} Could not connect to {url}: {message}",
            "[ERROR]".red()
        ),
    }
}

impl<W> ResultSink for LineSink<W>
where
    W: Write,
{
    fn start(&mut self, target: &Url, total: usize) {
        let banner = format!("[*] Auditing {target} with {total} candidate path(s)");
        self.write_line(&banner.bold().to_string());
    }

    fn report(&mut self, result: &ProbeResult) {
        self.write_line(&format_line(result));
    }

    fn finish(&mut self, statistics: &Statistics, completion: &Completion) {
        let summary = format!("[*] Audit complete: {completion}. {statistics}");
        self.write_line(&summary.bold().to_string());
    }
}
