//! Request object built once per [`Candidate`]
use crate::error::ProbeError;

use tracing::{error, instrument};
use url::Url;

use std::fmt::{self, Display, Formatter};
use std::ops::AddAssign;
use std::time::Duration;

/// default per-request timeout, used until a caller supplies their own
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// request identifier: position of the candidate within the session
#[derive(Copy, Clone, Default, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(usize);

impl RequestId {
    /// create a new `RequestId`
    #[must_use]
    pub const fn new(id: usize) -> Self {
        Self(id)
    }
}

impl Display for RequestId {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "RequestId<{}>", self.0)
    }
}

impl From<RequestId> for usize {
    fn from(id: RequestId) -> Self {
        id.0
    }
}

impl<T> AddAssign<T> for RequestId
where
    T: Into<usize>,
{
    fn add_assign(&mut self, rhs: T) {
        self.0 += rhs.into();
    }
}

/// a single path segment to try against the target
///
/// # Examples
///
/// ```
/// # use pathprobe::requests::Candidate;
/// let candidate = Candidate::from("admin");
///
/// assert_eq!(candidate.as_str(), "admin");
/// assert_eq!(candidate.to_string(), "admin");
/// ```
#[derive(Clone, Default, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Candidate(String);

impl Candidate {
    /// create a new `Candidate` from anything string-like
    #[must_use]
    pub fn new(segment: impl Into<String>) -> Self {
        Self(segment.into())
    }

    /// get the candidate as a `&str`
    #[must_use]
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Candidate {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Candidate {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Candidate {
    fn from(segment: &str) -> Self {
        Self(segment.to_string())
    }
}

impl From<String> for Candidate {
    fn from(segment: String) -> Self {
        Self(segment)
    }
}

/// data container representing the pieces of a GET request the probe loop
/// controls: target url, timeout, and identifying headers
///
/// a `ProbeRequest` built with [`ProbeRequest::from_url`] acts as the session's
/// template; [`ProbeRequest::for_candidate`] stamps out the per-candidate
/// requests that are actually sent
#[derive(Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub struct ProbeRequest {
    pub(crate) id: RequestId,
    pub(crate) url: Url,
    pub(crate) candidate: Option<Candidate>,
    pub(crate) timeout: Duration,
    pub(crate) user_agent: Option<String>,
    pub(crate) headers: Vec<(String, String)>,
}

impl ProbeRequest {
    /// parse the given url into a template `ProbeRequest`
    ///
    /// # Errors
    ///
    /// fails if `url` can't be parsed, isn't http(s), or can't have path segments
    /// appended to it (i.e. `data:` or `mailto:` urls)
    ///
    /// # Examples
    ///
    /// ```
    /// # use pathprobe::requests::ProbeRequest;
    /// # use pathprobe::error::ProbeError;
    /// # fn main() -> Result<(), ProbeError> {
    /// let request = ProbeRequest::from_url("http://localhost:8000")?;
    ///
    /// assert_eq!(request.url().as_str(), "http://localhost:8000/");
    /// assert!(ProbeRequest::from_url("ftp://localhost").is_err());
    /// # Ok(())
    /// # }
    /// ```
    #[instrument(level = "trace")]
    pub fn from_url(url: &str) -> Result<Self, ProbeError> {
        let parsed = Url::parse(url).map_err(|source| {
            error!(%url, "Failed to parse URL: {}", source);
            ProbeError::InvalidUrl {
                source,
                url: url.to_string(),
            }
        })?;

        if !matches!(parsed.scheme(), "http" | "https") {
            error!(%url, "only http and https targets are supported");
            return Err(ProbeError::UnsupportedUrl {
                url: url.to_string(),
                reason: "scheme must be http or https",
            });
        }

        if parsed.cannot_be_a_base() {
            error!(%url, "url can't have path segments appended");
            return Err(ProbeError::UnsupportedUrl {
                url: url.to_string(),
                reason: "url cannot be used as a base",
            });
        }

        Ok(Self {
            id: RequestId::default(),
            url: parsed,
            candidate: None,
            timeout: DEFAULT_TIMEOUT,
            user_agent: None,
            headers: Vec::new(),
        })
    }

    /// build the request for `candidate` by joining it onto this request's url
    ///
    /// one trailing `/` of the base path and one leading `/` of the candidate are
    /// dropped before joining, so the result is always `base + "/" + candidate`
    /// without doubled slashes. Timeout and headers carry over unchanged.
    ///
    /// # Examples
    ///
    /// ```
    /// # use pathprobe::requests::{Candidate, ProbeRequest, RequestId};
    /// # use pathprobe::error::ProbeError;
    /// # fn main() -> Result<(), ProbeError> {
    /// let template = ProbeRequest::from_url("https://example.com/api/")?;
    ///
    /// let request = template.for_candidate(RequestId::new(3), &Candidate::from("v2"));
    ///
    /// assert_eq!(request.url().as_str(), "https://example.com/api/v2");
    /// assert_eq!(request.id(), RequestId::new(3));
    /// # Ok(())
    /// # }
    /// ```
    #[must_use]
    pub fn for_candidate(&self, id: RequestId, candidate: &Candidate) -> Self {
        let base_path = self.url.path();
        let base_path = base_path.strip_suffix('/').unwrap_or(base_path);

        let segment = candidate.as_str();
        let segment = segment.strip_prefix('/').unwrap_or(segment);

        let mut url = self.url.clone();
        url.set_path(&format!("{base_path}/{segment}"));

        Self {
            id,
            url,
            candidate: Some(candidate.clone()),
            timeout: self.timeout,
            user_agent: self.user_agent.clone(),
            headers: self.headers.clone(),
        }
    }

    /// get the id
    #[must_use]
    #[inline]
    pub const fn id(&self) -> RequestId {
        self.id
    }

    /// get a reference to the url
    #[must_use]
    #[inline]
    pub const fn url(&self) -> &Url {
        &self.url
    }

    /// get the candidate this request was built for; `None` for a template
    #[must_use]
    #[inline]
    pub const fn candidate(&self) -> Option<&Candidate> {
        self.candidate.as_ref()
    }

    /// get the per-request timeout
    #[must_use]
    #[inline]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// get the user-agent, if one was set
    #[must_use]
    #[inline]
    pub fn user_agent(&self) -> Option<&str> {
        self.user_agent.as_deref()
    }

    /// get the static headers sent with every request
    #[must_use]
    #[inline]
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// set the per-request timeout
    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }

    /// set the identifying user-agent
    pub fn set_user_agent(&mut self, user_agent: impl Into<String>) {
        self.user_agent = Some(user_agent.into());
    }

    /// add a static header that's sent with every request
    pub fn add_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.headers.push((name.into(), value.into()));
    }
}

/// split a `name: value` header line into its name and value
///
/// # Errors
///
/// fails when there's no `:` delimiter, or when the name is empty
///
/// # Examples
///
/// ```
/// # use pathprobe::requests::parse_header_line;
/// let (name, value) = parse_header_line("X-Audit-Id: 42").unwrap();
///
/// assert_eq!(name, "X-Audit-Id");
/// assert_eq!(value, "42");
/// ```
pub fn parse_header_line(line: &str) -> Result<(String, String), ProbeError> {
    let Some((name, value)) = line.split_once(':') else {
        error!(%line, "header is missing the ':' delimiter");
        return Err(ProbeError::InvalidHeader {
            header: line.to_string(),
            reason: String::from("expected `name: value`"),
        });
    };

    let name = name.trim();

    if name.is_empty() {
        error!(%line, "header name is empty");
        return Err(ProbeError::InvalidHeader {
            header: line.to_string(),
            reason: String::from("header name is empty"),
        });
    }

    Ok((name.to_string(), value.trim().to_string()))
}
