//! per-candidate outcomes produced by the probe loop
use std::borrow::Cow;
use std::fmt::{self, Display, Formatter};
use std::time::Duration;

use url::Url;

use crate::actions::FlowControl;
use crate::error::{ProbeError, RequestErrorKind};
use crate::requests::{Candidate, ProbeRequest, RequestId};
use crate::responses::{Response, Timed};

/// classification of a single probe
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
#[non_exhaustive]
pub enum Outcome {
    /// the path answered 200; `size` is the number of body bytes read
    Exposed {
        /// response body length
        size: usize,
    },

    /// the path answered 403: it exists, but access is denied
    Protected,

    /// the server answered 429; the session stops after this result
    RateLimited,

    /// any status without a dedicated classification
    Unclassified {
        /// the observed status code
        status_code: u16,
    },

    /// the request never produced a response
    TransportError {
        /// what went wrong on the wire, when known
        kind: Option<RequestErrorKind>,

        /// description of the underlying failure
        message: String,
    },
}

impl Outcome {
    /// the loop decision this outcome implies: only [`Outcome::RateLimited`] stops
    ///
    /// # Examples
    ///
    /// ```
    /// # use pathprobe::actions::FlowControl;
    /// # use pathprobe::results::Outcome;
    /// assert_eq!(Outcome::RateLimited.flow_control(), FlowControl::Stop);
    /// assert_eq!(Outcome::Protected.flow_control(), FlowControl::Continue);
    /// ```
    #[must_use]
    pub const fn flow_control(&self) -> FlowControl {
        match self {
            Self::RateLimited => FlowControl::Stop,
            _ => FlowControl::Continue,
        }
    }

    /// short, upper-case label used by the sinks
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Exposed { .. } => "EXPOSED",
            Self::Protected => "PROTECTED",
            Self::RateLimited => "RATE LIMITED",
            Self::Unclassified { .. } => "UNCLASSIFIED",
            Self::TransportError { .. } => "ERROR",
        }
    }
}

impl Display for Outcome {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exposed { size } => write!(f, "Exposed(size={size})"),
            Self::Protected => f.write_str("Protected"),
            Self::RateLimited => f.write_str("RateLimited"),
            Self::Unclassified { status_code } => write!(f, "Unclassified({status_code})"),
            Self::TransportError { message, .. } => write!(f, "TransportError({message})"),
        }
    }
}

/// everything the sinks need to know about one probed candidate
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ProbeResult {
    id: RequestId,
    candidate: Candidate,
    url: Url,
    outcome: Outcome,
    status_code: Option<u16>,
    elapsed: Option<Duration>,
}

impl ProbeResult {
    /// build a result from a received response and its classification
    #[must_use]
    pub fn from_response<R>(request: &ProbeRequest, response: &R, outcome: Outcome) -> Self
    where
        R: Response + Timed,
    {
        Self {
            id: request.id(),
            candidate: request.candidate().cloned().unwrap_or_default(),
            url: request.url().clone(),
            outcome,
            status_code: Some(response.status_code()),
            elapsed: Some(*response.elapsed()),
        }
    }

    /// build a result from a request that never produced a response
    #[must_use]
    pub fn from_error(request: &ProbeRequest, error: &ProbeError) -> Self {
        let message = match error {
            ProbeError::RequestError { message, .. } => message.clone(),
            other => other.to_string(),
        };

        Self {
            id: request.id(),
            candidate: request.candidate().cloned().unwrap_or_default(),
            url: request.url().clone(),
            outcome: Outcome::TransportError {
                kind: error.request_error_kind(),
                message,
            },
            status_code: None,
            elapsed: None,
        }
    }

    /// get the id of the request that produced this result
    #[must_use]
    pub const fn id(&self) -> RequestId {
        self.id
    }

    /// get the probed candidate
    #[must_use]
    pub const fn candidate(&self) -> &Candidate {
        &self.candidate
    }

    /// get the url that was requested
    #[must_use]
    pub const fn url(&self) -> &Url {
        &self.url
    }

    /// get the classification
    #[must_use]
    pub const fn outcome(&self) -> &Outcome {
        &self.outcome
    }

    /// get the status code, if a response arrived
    #[must_use]
    pub const fn status_code(&self) -> Option<u16> {
        self.status_code
    }

    /// get the time between sending the request and reading the full response
    #[must_use]
    pub const fn elapsed(&self) -> Option<Duration> {
        self.elapsed
    }

    /// response size; only exposed paths carry one
    #[must_use]
    pub const fn size(&self) -> Option<usize> {
        match self.outcome {
            Outcome::Exposed { size } => Some(size),
            _ => None,
        }
    }

    /// human-readable explanation of the outcome
    #[must_use]
    pub fn message(&self) -> Cow<'_, str> {
        match &self.outcome {
            Outcome::Exposed { .. } => Cow::Borrowed("Accessible; review its permissions"),
            Outcome::Protected => Cow::Borrowed("Present, but access is forbidden"),
            Outcome::RateLimited => {
                Cow::Borrowed("Rate limit reached; halting to protect the server")
            }
            Outcome::Unclassified { status_code } => {
                Cow::Owned(format!("Answered with status {status_code}"))
            }
            Outcome::TransportError { message, .. } => Cow::Borrowed(message),
        }
    }

    /// shortcut for `self.outcome().flow_control()`
    #[must_use]
    pub const fn flow_control(&self) -> FlowControl {
        self.outcome.flow_control()
    }
}

/// how a session ended
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Completion {
    /// every candidate was probed
    Exhausted,

    /// the server signaled rate limiting and the remaining candidates were skipped
    RateLimited {
        /// the candidate that drew the 429
        candidate: Candidate,

        /// number of candidates that were never requested
        skipped: usize,
    },
}

impl Display for Completion {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exhausted => f.write_str("all candidates probed"),
            Self::RateLimited { candidate, skipped } => write!(
                f,
                "stopped early: rate limited at `{candidate}`, {skipped} candidate(s) skipped"
            ),
        }
    }
}
