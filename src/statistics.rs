//! [`Statistics`] is the primary data container for per-session request,
//! outcome, and timing statistics
use std::collections::BTreeMap;
use std::fmt::{self, Display, Formatter};
use std::time::Duration;

use tokio::time::Instant;
use tracing::{instrument, warn};

use crate::error::RequestErrorKind;
use crate::results::{Outcome, ProbeResult};

/// session's tracked statistics
#[derive(Default, Debug, Clone, PartialEq)]
pub struct Statistics {
    /// tracker for total number of requests sent by the client
    requests: usize,

    /// tracker for total number of errors encountered by the client
    ///
    /// these errors are not related to status codes in the 400 or 500 range;
    /// they reflect things like refused connections, timeouts, etc...
    errors: usize,

    /// tracker for number of timeouts seen by the client
    timeouts: usize,

    /// tracker for number of errors related to connecting
    connection_errors: usize,

    /// tracker for number of errors related to the request or its body
    request_errors: usize,

    /// tracker for number of errors triggered by the [`reqwest::redirect::Policy`]
    redirection_errors: usize,

    /// tracker for number of paths that answered 200
    exposed: usize,

    /// tracker for number of paths that answered 403
    protected: usize,

    /// tracker for number of 429s; never more than one per session
    rate_limited: usize,

    /// tracker for number of responses without a dedicated classification
    unclassified: usize,

    /// tracker for overall number of 1xx status codes seen by the client
    informatives: usize,

    /// tracker for overall number of 2xx status codes seen by the client
    successes: usize,

    /// tracker for overall number of 3xx status codes seen by the client
    redirects: usize,

    /// tracker for overall number of 4xx status codes seen by the client
    client_errors: usize,

    /// tracker for overall number of 5xx status codes seen by the client
    server_errors: usize,

    /// tracker for overall number of any status code seen by the client
    statuses: BTreeMap<u16, usize>,

    /// tracker for when the session began
    start_time: Option<Instant>,

    /// total time the session has run
    ///
    /// this value is a snapshot in time from when `common_updates` or
    /// `stop_timer` was last called
    elapsed: Duration,

    /// average number of requests per second
    avg_reqs_per_sec: f64,
}

impl Statistics {
    /// create a new default instance of `Statistics`
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// get the number of requests sent
    #[inline]
    #[must_use]
    pub const fn requests(&self) -> usize {
        self.requests
    }

    /// get the number of transport errors
    #[inline]
    #[must_use]
    pub const fn errors(&self) -> usize {
        self.errors
    }

    /// get the number of request timeouts
    #[inline]
    #[must_use]
    pub const fn timeouts(&self) -> usize {
        self.timeouts
    }

    /// get the number of connection errors
    #[inline]
    #[must_use]
    pub const fn connection_errors(&self) -> usize {
        self.connection_errors
    }

    /// get the number of request/body errors
    #[inline]
    #[must_use]
    pub const fn request_errors(&self) -> usize {
        self.request_errors
    }

    /// get the number of redirection errors
    #[inline]
    #[must_use]
    pub const fn redirection_errors(&self) -> usize {
        self.redirection_errors
    }

    /// get the number of exposed paths
    #[inline]
    #[must_use]
    pub const fn exposed(&self) -> usize {
        self.exposed
    }

    /// get the number of protected paths
    #[inline]
    #[must_use]
    pub const fn protected(&self) -> usize {
        self.protected
    }

    /// get the number of rate-limited responses
    #[inline]
    #[must_use]
    pub const fn rate_limited(&self) -> usize {
        self.rate_limited
    }

    /// get the number of unclassified responses
    #[inline]
    #[must_use]
    pub const fn unclassified(&self) -> usize {
        self.unclassified
    }

    /// get the number of informative responses (status code 1XX)
    #[inline]
    #[must_use]
    pub const fn informatives(&self) -> usize {
        self.informatives
    }

    /// get the number of success responses (status code 2XX)
    #[inline]
    #[must_use]
    pub const fn successes(&self) -> usize {
        self.successes
    }

    /// get the number of redirect responses (status code 3XX)
    #[inline]
    #[must_use]
    pub const fn redirects(&self) -> usize {
        self.redirects
    }

    /// get the number of client error responses (status code 4XX)
    #[inline]
    #[must_use]
    pub const fn client_errors(&self) -> usize {
        self.client_errors
    }

    /// get the number of server error responses (status code 5XX)
    #[inline]
    #[must_use]
    pub const fn server_errors(&self) -> usize {
        self.server_errors
    }

    /// get the number of times the given status code was seen
    #[inline]
    #[must_use]
    pub fn status_code_count(&self, status_code: u16) -> Option<usize> {
        self.statuses.get(&status_code).copied()
    }

    /// get the full status code histogram, ordered by status code
    #[inline]
    #[must_use]
    pub const fn statuses(&self) -> &BTreeMap<u16, usize> {
        &self.statuses
    }

    /// get the session's start time, if the timer was started
    #[inline]
    #[must_use]
    pub const fn start_time(&self) -> Option<Instant> {
        self.start_time
    }

    /// get the current average number of requests per second
    #[inline]
    #[must_use]
    pub const fn requests_per_sec(&self) -> f64 {
        self.avg_reqs_per_sec
    }

    /// get the last snapshot of the time the session has been running
    #[inline]
    #[must_use]
    pub const fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// manually start the session's timer
    ///
    /// if never called, the timer starts with the first recorded result
    #[inline]
    pub fn start_timer(&mut self) {
        self.start_time = Some(Instant::now());
        self.elapsed = Duration::ZERO;
    }

    /// take a final snapshot of the elapsed time and request rate
    #[inline]
    pub fn stop_timer(&mut self) {
        self.refresh_elapsed();
    }

    /// Inspect the given status code and increment the appropriate fields
    #[instrument(skip(self), level = "trace")]
    fn add_status_code(&mut self, status: u16) {
        match status {
            100..=199 => self.informatives += 1,
            200..=299 => self.successes += 1,
            300..=399 => self.redirects += 1,
            400..=499 => self.client_errors += 1,
            500..=599 => self.server_errors += 1,
            _ => {
                // reqwest allows up to 999; keep it in the histogram only
                warn!(%status, "status code is outside of the standard ranges");
            }
        }

        *self.statuses.entry(status).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)]
    fn refresh_elapsed(&mut self) {
        self.elapsed = self
            .start_time
            .map_or(Duration::ZERO, |start| start.elapsed());

        let seconds = self.elapsed.as_secs_f64();

        self.avg_reqs_per_sec = if seconds == 0.0 {
            0.0
        } else {
            self.requests as f64 / seconds
        };
    }

    /// update total # of requests and average # of requests per second
    #[inline]
    fn common_updates(&mut self) {
        if self.start_time.is_none() {
            // first update and nobody started the timer; start it now
            self.start_time = Some(Instant::now());
        }

        self.requests += 1;

        self.refresh_elapsed();
    }

    /// update the internal trackers from the given result
    #[instrument(skip_all, level = "trace")]
    pub fn update(&mut self, result: &ProbeResult) {
        self.common_updates();

        if let Some(status) = result.status_code() {
            self.add_status_code(status);
        }

        match result.outcome() {
            Outcome::Exposed { .. } => self.exposed += 1,
            Outcome::Protected => self.protected += 1,
            Outcome::RateLimited => self.rate_limited += 1,
            Outcome::Unclassified { .. } => self.unclassified += 1,
            Outcome::TransportError { kind, .. } => self.update_from_error_kind(*kind),
        }
    }

    fn update_from_error_kind(&mut self, kind: Option<RequestErrorKind>) {
        // increment total # of errors, doesn't matter what kind it is
        self.errors += 1;

        match kind {
            Some(
                RequestErrorKind::Body(status)
                | RequestErrorKind::Decode(status)
                | RequestErrorKind::Request(status),
            ) => {
                if let Some(code) = status {
                    self.add_status_code(code);
                }

                self.request_errors += 1;
            }
            Some(RequestErrorKind::Connect(status)) => {
                if let Some(code) = status {
                    self.add_status_code(code);
                }

                self.connection_errors += 1;
            }
            Some(RequestErrorKind::Redirect(status)) => {
                if let Some(code) = status {
                    self.add_status_code(code);
                }

                self.redirection_errors += 1;
            }
            Some(RequestErrorKind::Timeout(_)) => {
                self.timeouts += 1;
            }
            _ => {
                warn!(?kind, "unknown transport error; only the total was updated");
            }
        }
    }
}

impl Display for Statistics {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} requests in {:.2}s ({:.2} req/s): {} exposed, {} protected, {} rate limited, {} unclassified, {} errors",
            self.requests,
            self.elapsed.as_secs_f64(),
            self.avg_reqs_per_sec,
            self.exposed,
            self.protected,
            self.rate_limited,
            self.unclassified,
            self.errors,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProbeError;
    use crate::requests::{Candidate, ProbeRequest, RequestId};
    use crate::responses::AsyncResponse;

    fn request(candidate: &str) -> ProbeRequest {
        ProbeRequest::from_url("http://localhost")
            .unwrap()
            .for_candidate(RequestId::new(0), &Candidate::from(candidate))
    }

    async fn answered(status: u16, outcome: Outcome) -> ProbeResult {
        let reqwest_response = http::response::Builder::new()
            .status(status)
            .body("")
            .unwrap();
        let response = AsyncResponse::try_from_reqwest_response(
            RequestId::new(0),
            reqwest_response.into(),
            Duration::from_millis(3),
        )
        .await
        .unwrap();

        ProbeResult::from_response(&request("x"), &response, outcome)
    }

    fn failed(kind: RequestErrorKind) -> ProbeResult {
        ProbeResult::from_error(
            &request("x"),
            &ProbeError::RequestError {
                kind,
                message: String::from("boom"),
            },
        )
    }

    /// each outcome lands in its own counter and the histogram tracks status codes
    #[tokio::test]
    async fn outcomes_and_status_codes_are_counted() {
        let mut stats = Statistics::new();

        stats.update(&answered(200, Outcome::Exposed { size: 0 }).await);
        stats.update(&answered(403, Outcome::Protected).await);
        stats.update(&answered(404, Outcome::Unclassified { status_code: 404 }).await);
        stats.update(&answered(404, Outcome::Unclassified { status_code: 404 }).await);
        stats.update(&answered(429, Outcome::RateLimited).await);

        assert_eq!(stats.requests(), 5);
        assert_eq!(stats.exposed(), 1);
        assert_eq!(stats.protected(), 1);
        assert_eq!(stats.unclassified(), 2);
        assert_eq!(stats.rate_limited(), 1);
        assert_eq!(stats.errors(), 0);
        assert_eq!(stats.successes(), 1);
        assert_eq!(stats.client_errors(), 4);
        assert_eq!(stats.status_code_count(404), Some(2));
        assert_eq!(stats.status_code_count(500), None);
        assert_eq!(
            stats.statuses().keys().copied().collect::<Vec<_>>(),
            [200, 403, 404, 429]
        );
    }

    /// transport errors are split by kind, and never touch the status histogram
    /// unless the error carries a status code
    #[test]
    fn transport_errors_are_split_by_kind() {
        let mut stats = Statistics::new();

        stats.update(&failed(RequestErrorKind::Connect(None)));
        stats.update(&failed(RequestErrorKind::Timeout(None)));
        stats.update(&failed(RequestErrorKind::Body(Some(200))));
        stats.update(&failed(RequestErrorKind::Redirect(None)));
        stats.update(&failed(RequestErrorKind::Unknown));

        assert_eq!(stats.requests(), 5);
        assert_eq!(stats.errors(), 5);
        assert_eq!(stats.connection_errors(), 1);
        assert_eq!(stats.timeouts(), 1);
        assert_eq!(stats.request_errors(), 1);
        assert_eq!(stats.redirection_errors(), 1);
        assert_eq!(stats.status_code_count(200), Some(1));
        assert_eq!(stats.exposed(), 0);
    }

    /// elapsed time and the request rate follow the session clock
    #[tokio::test(start_paused = true)]
    async fn elapsed_and_rate_follow_the_clock() {
        let mut stats = Statistics::new();
        stats.start_timer();

        tokio::time::advance(Duration::from_secs(2)).await;
        stats.update(&failed(RequestErrorKind::Connect(None)));
        stats.update(&failed(RequestErrorKind::Connect(None)));

        assert_eq!(stats.elapsed(), Duration::from_secs(2));
        assert!((stats.requests_per_sec() - 1.0).abs() < f64::EPSILON);

        tokio::time::advance(Duration::from_secs(2)).await;
        stats.stop_timer();

        assert_eq!(stats.elapsed(), Duration::from_secs(4));
        assert!((stats.requests_per_sec() - 0.5).abs() < f64::EPSILON);
    }

    /// an untouched tracker reports zeroes, and the summary names every counter
    #[test]
    fn summary_line() {
        let mut stats = Statistics::new();
        stats.stop_timer();

        assert_eq!(stats.start_time(), None);
        assert_eq!(
            stats.to_string(),
            "0 requests in 0.00s (0.00 req/s): 0 exposed, 0 protected, 0 rate limited, 0 unclassified, 0 errors"
        );
    }
}
