//! side-effects taken with each [`ProbeResult`], i.e. printing/collecting etc...
use crate::requests::Candidate;
use crate::results::{Completion, ProbeResult};
use crate::statistics::Statistics;

use url::Url;

mod line;
mod table;

pub use self::line::{format_line, LineSink};
pub use self::table::{format_row, TableSink};

/// consumer of the results produced by an [`AuditSession`]
///
/// expected order of operations:
/// - `sink.start(target, total)`
/// - for each candidate, in order:
///     - `sink.probing(candidate)`
///     - `sink.report(result)`
/// - `sink.finish(statistics, completion)`
///
/// [`AuditSession`]: crate::session::AuditSession
pub trait ResultSink {
    /// called once, before the first request is sent
    fn start(&mut self, _target: &Url, _total: usize) {}

    /// called right before the request for `candidate` is sent
    fn probing(&mut self, _candidate: &Candidate) {}

    /// called with the result of every candidate that was probed
    fn report(&mut self, result: &ProbeResult);

    /// called once, after the loop ended either by exhaustion or early stop
    fn finish(&mut self, _statistics: &Statistics, _completion: &Completion) {}
}

/// a `FnSink` hands each [`ProbeResult`] to the wrapped closure
///
/// # Examples
///
/// ```
/// # use pathprobe::sinks::{FnSink, ResultSink};
/// # use pathprobe::results::ProbeResult;
/// let mut seen = 0;
///
/// let sink = FnSink::new(|_result: &ProbeResult| seen += 1);
/// # drop(sink);
/// ```
pub struct FnSink<F>
where
    F: FnMut(&ProbeResult),
{
    callback: F,
}

impl<F> FnSink<F>
where
    F: FnMut(&ProbeResult),
{
    /// create a new `FnSink` that calls `callback` in its `report` method
    pub const fn new(callback: F) -> Self {
        Self { callback }
    }
}

impl<F> ResultSink for FnSink<F>
where
    F: FnMut(&ProbeResult),
{
    fn report(&mut self, result: &ProbeResult) {
        (self.callback)(result);
    }
}

/// collects every reported result, in order
impl ResultSink for Vec<ProbeResult> {
    fn report(&mut self, result: &ProbeResult) {
        self.push(result.clone());
    }
}

impl<S> ResultSink for Box<S>
where
    S: ResultSink + ?Sized,
{
    fn start(&mut self, target: &Url, total: usize) {
        (**self).start(target, total);
    }

    fn probing(&mut self, candidate: &Candidate) {
        (**self).probing(candidate);
    }

    fn report(&mut self, result: &ProbeResult) {
        (**self).report(result);
    }

    fn finish(&mut self, statistics: &Statistics, completion: &Completion) {
        (**self).finish(statistics, completion);
    }
}
