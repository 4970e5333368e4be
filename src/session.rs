//! the sequential probe-and-classify loop
use std::time::Duration;

use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::actions::FlowControl;
use crate::classifiers::{Classifier, StatusCodeClassifier};
use crate::client::AsyncRequests;
use crate::config::AuditConfig;
use crate::corpora::Wordlist;
use crate::error::ProbeError;
use crate::requests::{Candidate, ProbeRequest, RequestId};
use crate::responses::AsyncResponse;
use crate::results::{Completion, ProbeResult};
use crate::sinks::ResultSink;
use crate::statistics::Statistics;

/// probes every candidate of a [`Wordlist`] against a single target, one
/// request at a time, and stops early the first time the server signals rate
/// limiting
///
/// # Examples
///
/// ```no_run
/// # use pathprobe::client::AsyncClient;
/// # use pathprobe::config::AuditConfig;
/// # use pathprobe::error::ProbeError;
/// # use pathprobe::session::AuditSession;
/// # use pathprobe::sinks::LineSink;
/// # #[tokio::main]
/// # async fn main() -> Result<(), ProbeError> {
/// let config = AuditConfig::default();
///
/// let mut session = AuditSession::new(AsyncClient::new()?, &config)?;
///
/// let statistics = session.run(&mut LineSink::stdout()).await;
///
/// println!("{statistics}");
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct AuditSession<C, K = StatusCodeClassifier>
where
    C: AsyncRequests,
    K: Classifier<AsyncResponse>,
{
    client: C,
    template: ProbeRequest,
    wordlist: Wordlist,
    delay: Duration,
    classifier: K,
    request_id: usize,
    flow_control: FlowControl,
    statistics: Statistics,
}

impl<C> AuditSession<C>
where
    C: AsyncRequests,
{
    /// create a new session from a validated [`AuditConfig`]
    ///
    /// # Errors
    ///
    /// fails if the configuration doesn't pass [`AuditConfig::validate`], i.e.
    /// an unusable target or an empty path list
    pub fn new(client: C, config: &AuditConfig) -> Result<Self, ProbeError> {
        config.validate()?;

        Self::from_parts(
            client,
            config.request_template()?,
            config.wordlist(),
            config.delay,
        )
    }

    /// create a new session from its individual pieces
    ///
    /// # Errors
    ///
    /// fails if `wordlist` is empty
    pub fn from_parts(
        client: C,
        template: ProbeRequest,
        wordlist: Wordlist,
        delay: Duration,
    ) -> Result<Self, ProbeError> {
        if wordlist.is_empty() {
            warn!("refusing to build a session without candidates");
            return Err(ProbeError::EmptyWordlist);
        }

        Ok(Self {
            client,
            template,
            wordlist,
            delay,
            classifier: StatusCodeClassifier::new(),
            request_id: 0,
            flow_control: FlowControl::default(),
            statistics: Statistics::new(),
        })
    }
}

impl<C, K> AuditSession<C, K>
where
    C: AsyncRequests,
    K: Classifier<AsyncResponse>,
{
    /// replace the classifier that turns responses into outcomes
    pub fn with_classifier<T>(self, classifier: T) -> AuditSession<C, T>
    where
        T: Classifier<AsyncResponse>,
    {
        AuditSession {
            client: self.client,
            template: self.template,
            wordlist: self.wordlist,
            delay: self.delay,
            classifier,
            request_id: self.request_id,
            flow_control: self.flow_control,
            statistics: self.statistics,
        }
    }

    /// get the base url candidates are joined onto
    #[must_use]
    pub const fn target(&self) -> &Url {
        self.template.url()
    }

    /// get the candidates this session probes
    #[must_use]
    pub const fn wordlist(&self) -> &Wordlist {
        &self.wordlist
    }

    /// get the decision made after the most recent probe
    #[must_use]
    pub const fn flow_control(&self) -> FlowControl {
        self.flow_control
    }

    /// get the statistics gathered so far
    #[must_use]
    pub const fn statistics(&self) -> &Statistics {
        &self.statistics
    }

    /// probe every candidate in order, reporting each result to `sink`
    ///
    /// the configured delay is awaited between two consecutive requests only;
    /// a [`RateLimited`] outcome ends the loop immediately. Transport errors are
    /// reported and the loop moves on.
    ///
    /// calling `run` again starts over from the first candidate with fresh
    /// statistics
    ///
    /// [`RateLimited`]: crate::results::Outcome::RateLimited
    #[instrument(skip_all, fields(target = %self.template.url(), candidates = self.wordlist.len()), name = "audit-loop", level = "trace")]
    pub async fn run<S>(&mut self, sink: &mut S) -> Statistics
    where
        S: ResultSink + ?Sized,
    {
        let total = self.wordlist.len();

        self.flow_control = FlowControl::Continue;
        self.statistics = Statistics::new();
        self.statistics.start_timer();

        sink.start(self.template.url(), total);

        let mut completion = Completion::Exhausted;

        for index in 0..total {
            if index > 0 && !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }

            let candidate = self.wordlist[index].clone();

            sink.probing(&candidate);

            let result = self.probe_once(&candidate).await;

            sink.report(&result);

            if self.flow_control.is_stop() {
                let skipped = total - index - 1;

                info!(
                    "[ID: {}] stopping audit: {} answered with a rate limit, {} candidate(s) skipped",
                    result.id(),
                    result.url(),
                    skipped
                );

                completion = Completion::RateLimited { candidate, skipped };
                break;
            }
        }

        self.statistics.stop_timer();

        info!(%completion, statistics = %self.statistics, "audit finished");

        sink.finish(&self.statistics, &completion);

        self.statistics.clone()
    }

    /// send the request for a single candidate and classify the answer
    ///
    /// statistics and [`AuditSession::flow_control`] are updated with the result
    #[instrument(skip_all, fields(%candidate), level = "trace")]
    pub async fn probe_once(&mut self, candidate: &Candidate) -> ProbeResult {
        let request = self
            .template
            .for_candidate(RequestId::new(self.request_id), candidate);

        self.request_id += 1;

        debug!(id = %request.id(), url = %request.url(), "probing candidate");

        let result = match self.client.send(request.clone()).await {
            Ok(response) => {
                let outcome = self.classifier.classify(&response);
                ProbeResult::from_response(&request, &response, outcome)
            }
            Err(error) => {
                warn!(url = %request.url(), %error, "request failed; moving on");
                ProbeResult::from_error(&request, &error)
            }
        };

        debug!(id = %result.id(), outcome = %result.outcome(), "classified candidate");

        self.statistics.update(&result);
        self.flow_control = result.flow_control();

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::AsyncClient;
    use crate::error::RequestErrorKind;
    use crate::results::Outcome;
    use crate::responses::Response;
    use crate::sinks::FnSink;
    use async_trait::async_trait;
    use httpmock::Method::GET;
    use httpmock::MockServer;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use tokio::time::Instant;

    /// what the scripted client answers for one request
    enum Reply {
        Status(u16, &'static str),
        Fail(RequestErrorKind),
    }

    /// stand-in for the network: answers from a script and records what was asked
    #[derive(Default)]
    struct ScriptedClient {
        replies: Mutex<VecDeque<Reply>>,
        sent: Mutex<Vec<(String, Instant)>>,
    }

    impl ScriptedClient {
        fn new(replies: impl IntoIterator<Item = Reply>) -> Self {
            Self {
                replies: Mutex::new(replies.into_iter().collect()),
                sent: Mutex::default(),
            }
        }

        fn sent_urls(&self) -> Vec<String> {
            self.sent
                .lock()
                .unwrap()
                .iter()
                .map(|(url, _)| url.clone())
                .collect()
        }

        fn sent_at(&self) -> Vec<Instant> {
            self.sent.lock().unwrap().iter().map(|(_, at)| *at).collect()
        }
    }

    #[async_trait]
    impl AsyncRequests for ScriptedClient {
        async fn send(&self, request: ProbeRequest) -> Result<AsyncResponse, ProbeError> {
            self.sent
                .lock()
                .unwrap()
                .push((request.url().to_string(), Instant::now()));

            let reply = self
                .replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Reply::Status(404, ""));

            match reply {
                Reply::Status(status, body) => {
                    let reqwest_response = http::response::Builder::new()
                        .status(status)
                        .body(body)
                        .unwrap();

                    AsyncResponse::try_from_reqwest_response(
                        request.id(),
                        reqwest_response.into(),
                        Duration::from_millis(1),
                    )
                    .await
                }
                Reply::Fail(kind) => Err(ProbeError::RequestError {
                    kind,
                    message: String::from("connection refused"),
                }),
            }
        }
    }

    fn session(
        client: ScriptedClient,
        words: &[&str],
        delay: Duration,
    ) -> AuditSession<ScriptedClient> {
        let template = ProbeRequest::from_url("http://target.local:8000").unwrap();
        let wordlist = Wordlist::with_words(words.iter().copied());

        AuditSession::from_parts(client, template, wordlist, delay).unwrap()
    }

    /// with no rate limiting, every candidate is requested once, in order
    #[tokio::test]
    async fn every_candidate_in_order() {
        let client = ScriptedClient::new([
            Reply::Status(404, ""),
            Reply::Status(200, "ok"),
            Reply::Status(403, ""),
        ]);
        let mut session = session(client, &["a", "/b", "c/d"], Duration::ZERO);
        let mut results: Vec<ProbeResult> = Vec::new();

        let stats = session.run(&mut results).await;

        assert_eq!(
            session.client.sent_urls(),
            [
                "http://target.local:8000/a",
                "http://target.local:8000/b",
                "http://target.local:8000/c/d",
            ]
        );
        assert_eq!(results.len(), 3);
        assert_eq!(stats.requests(), 3);
        assert_eq!(session.flow_control(), FlowControl::Continue);
        assert_eq!(session.statistics(), &stats);
    }

    /// a 429 at index k means exactly k + 1 requests
    #[tokio::test]
    async fn rate_limit_stops_the_loop() {
        let client = ScriptedClient::new([
            Reply::Status(404, ""),
            Reply::Status(404, ""),
            Reply::Status(429, ""),
        ]);
        let mut session = session(client, &["a", "b", "c", "d", "e"], Duration::ZERO);

        let mut completion = None;
        let mut results: Vec<ProbeResult> = Vec::new();

        struct Recorder<'a> {
            results: &'a mut Vec<ProbeResult>,
            completion: &'a mut Option<Completion>,
        }

        impl ResultSink for Recorder<'_> {
            fn report(&mut self, result: &ProbeResult) {
                self.results.push(result.clone());
            }

            fn finish(&mut self, _statistics: &Statistics, completion: &Completion) {
                *self.completion = Some(completion.clone());
            }
        }

        let stats = session
            .run(&mut Recorder {
                results: &mut results,
                completion: &mut completion,
            })
            .await;

        assert_eq!(session.client.sent_urls().len(), 3);
        assert_eq!(results.len(), 3);
        assert_eq!(results[2].outcome(), &Outcome::RateLimited);
        assert_eq!(stats.rate_limited(), 1);
        assert!(session.flow_control().is_stop());
        assert_eq!(
            completion,
            Some(Completion::RateLimited {
                candidate: Candidate::from("c"),
                skipped: 2,
            })
        );
    }

    /// 200s carry the body size, 403s are protected, everything else keeps its status
    #[tokio::test]
    async fn outcomes_follow_status_codes() {
        let client = ScriptedClient::new([
            Reply::Status(200, "top secret"),
            Reply::Status(403, "nope"),
            Reply::Status(500, "oops"),
        ]);
        let mut session = session(client, &["a", "b", "c"], Duration::ZERO);
        let mut results: Vec<ProbeResult> = Vec::new();

        session.run(&mut results).await;

        assert_eq!(results[0].outcome(), &Outcome::Exposed { size: 10 });
        assert_eq!(results[0].size(), Some(10));
        assert_eq!(results[1].outcome(), &Outcome::Protected);
        assert_eq!(
            results[2].outcome(),
            &Outcome::Unclassified { status_code: 500 }
        );
    }

    /// a transport error is reported and the next candidate is still probed
    #[tokio::test]
    async fn transport_errors_do_not_stop_the_loop() {
        let client = ScriptedClient::new([
            Reply::Fail(RequestErrorKind::Connect(None)),
            Reply::Status(200, ""),
        ]);
        let mut session = session(client, &["a", "b"], Duration::ZERO);
        let mut results: Vec<ProbeResult> = Vec::new();

        let stats = session.run(&mut results).await;

        assert_eq!(results.len(), 2);
        assert!(matches!(
            results[0].outcome(),
            Outcome::TransportError { .. }
        ));
        assert_eq!(results[0].message(), "connection refused");
        assert_eq!(results[1].outcome(), &Outcome::Exposed { size: 0 });
        assert_eq!(stats.errors(), 1);
        assert_eq!(stats.connection_errors(), 1);
    }

    /// the delay sits between consecutive requests, never after the last one
    #[tokio::test(start_paused = true)]
    async fn delay_only_between_requests() {
        let delay = Duration::from_millis(500);
        let client = ScriptedClient::new([]);
        let mut session = session(client, &["a", "b", "c"], delay);

        let started = Instant::now();
        session.run(&mut Vec::<ProbeResult>::new()).await;
        let finished = Instant::now();

        let sent_at = session.client.sent_at();

        assert_eq!(sent_at.len(), 3);
        assert_eq!(sent_at[0] - started, Duration::ZERO);
        assert_eq!(sent_at[1] - sent_at[0], delay);
        assert_eq!(sent_at[2] - sent_at[1], delay);
        assert_eq!(finished - sent_at[2], Duration::ZERO);
    }

    /// no delay is awaited after a terminating 429
    #[tokio::test(start_paused = true)]
    async fn no_delay_after_rate_limit() {
        let delay = Duration::from_secs(2);
        let client = ScriptedClient::new([Reply::Status(200, ""), Reply::Status(429, "")]);
        let mut session = session(client, &["admin", "config", "metrics"], delay);

        session.run(&mut Vec::<ProbeResult>::new()).await;
        let finished = Instant::now();

        let sent_at = session.client.sent_at();

        assert_eq!(sent_at.len(), 2);
        assert_eq!(finished - sent_at[1], Duration::ZERO);
    }

    /// probing a single candidate updates statistics and the flow decision
    #[tokio::test]
    async fn probe_once_updates_state() {
        let client = ScriptedClient::new([Reply::Status(429, "")]);
        let mut session = session(client, &["a"], Duration::ZERO);

        let result = session.probe_once(&Candidate::from("admin")).await;

        assert_eq!(result.url().as_str(), "http://target.local:8000/admin");
        assert_eq!(result.status_code(), Some(429));
        assert!(session.flow_control().is_stop());
        assert_eq!(session.statistics().requests(), 1);
    }

    /// a custom classifier decides what stops the loop
    #[tokio::test]
    async fn custom_classifier() {
        let client = ScriptedClient::new([Reply::Status(503, ""), Reply::Status(200, "")]);
        let mut session = session(client, &["a", "b"], Duration::ZERO).with_classifier(
            |response: &AsyncResponse| match response.status_code() {
                503 => Outcome::RateLimited,
                status_code => Outcome::Unclassified { status_code },
            },
        );
        let mut results: Vec<ProbeResult> = Vec::new();

        session.run(&mut results).await;

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].outcome(), &Outcome::RateLimited);
    }

    /// sessions can't be built without candidates or from an invalid config
    #[test]
    fn construction_failures() {
        let template = ProbeRequest::from_url("http://target.local").unwrap();

        let empty = AuditSession::from_parts(
            ScriptedClient::default(),
            template,
            Wordlist::new(),
            Duration::ZERO,
        );
        assert!(matches!(empty, Err(ProbeError::EmptyWordlist)));

        let config = AuditConfig {
            target: String::from("not a url"),
            ..AuditConfig::default()
        };
        let invalid = AuditSession::new(ScriptedClient::default(), &config);
        assert!(matches!(invalid, Err(ProbeError::InvalidUrl { .. })));
    }

    /// admin answers 200, config answers 429, metrics is never requested
    #[tokio::test]
    async fn early_stop_against_a_live_server() {
        let srv = MockServer::start_async().await;

        let admin = srv
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/admin")
                    .header("user-agent", "audit-test/0.1");
                then.status(200).body("admin panel");
            })
            .await;
        let config_path = srv
            .mock_async(|when, then| {
                when.method(GET).path("/config");
                then.status(429);
            })
            .await;
        let metrics = srv
            .mock_async(|when, then| {
                when.method(GET).path("/metrics");
                then.status(200);
            })
            .await;

        let config = AuditConfig {
            target: srv.base_url(),
            paths: vec![
                String::from("admin"),
                String::from("config"),
                String::from("metrics"),
            ],
            delay: Duration::from_millis(10),
            user_agent: String::from("audit-test/0.1"),
            ..AuditConfig::default()
        };

        let mut session = AuditSession::new(AsyncClient::new().unwrap(), &config).unwrap();

        let mut seen = Vec::new();
        let stats = session
            .run(&mut FnSink::new(|result: &ProbeResult| {
                seen.push((result.candidate().to_string(), result.outcome().clone()));
            }))
            .await;

        admin.assert_hits_async(1).await;
        config_path.assert_hits_async(1).await;
        metrics.assert_hits_async(0).await;

        assert_eq!(
            seen,
            [
                (String::from("admin"), Outcome::Exposed { size: 11 }),
                (String::from("config"), Outcome::RateLimited),
            ]
        );
        assert_eq!(stats.requests(), 2);
        assert_eq!(stats.exposed(), 1);
        assert_eq!(stats.rate_limited(), 1);
    }

    /// a candidate redirecting to a login page is reported with its own 302,
    /// not as an exposed login page
    #[tokio::test]
    async fn redirecting_candidate_is_unclassified() {
        let srv = MockServer::start_async().await;

        srv.mock_async(|when, then| {
            when.method(GET).path("/admin");
            then.status(302).header("location", "/login");
        })
        .await;
        let login = srv
            .mock_async(|when, then| {
                when.method(GET).path("/login");
                then.status(200).body("login page");
            })
            .await;

        let config = AuditConfig {
            target: srv.base_url(),
            paths: vec![String::from("admin")],
            delay: Duration::ZERO,
            ..AuditConfig::default()
        };

        let mut session = AuditSession::new(AsyncClient::new().unwrap(), &config).unwrap();
        let mut results: Vec<ProbeResult> = Vec::new();

        let stats = session.run(&mut results).await;

        login.assert_hits_async(0).await;
        assert_eq!(
            results[0].outcome(),
            &Outcome::Unclassified { status_code: 302 }
        );
        assert_eq!(results[0].size(), None);
        assert_eq!(stats.redirects(), 1);
        assert_eq!(stats.exposed(), 0);
    }
}
