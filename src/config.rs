//! Layered session configuration: built-in defaults, an optional toml file,
//! then command-line/environment overrides
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::time::Duration;

use reqwest::header::{HeaderName, HeaderValue};
use serde::Deserialize;
use tracing::{debug, error, instrument};

use crate::corpora::Wordlist;
use crate::error::ProbeError;
use crate::requests::{parse_header_line, ProbeRequest};

/// target used when nothing else is configured
pub const DEFAULT_TARGET: &str = "http://127.0.0.1:8000";

/// paths probed when nothing else is configured
pub const DEFAULT_PATHS: [&str; 7] = [
    "admin", "v2", "backup", "config", "setup", "internal", "metrics",
];

/// pause between two consecutive requests
pub const DEFAULT_DELAY: Duration = Duration::from_millis(500);

/// per-request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// how results are rendered
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputStyle {
    /// one text line per result
    #[default]
    Plain,

    /// live table with a progress footer
    Table,
}

/// fully resolved configuration for an [`AuditSession`]
///
/// [`AuditSession`]: crate::session::AuditSession
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuditConfig {
    /// base url every candidate is joined onto
    pub target: String,

    /// candidate path segments, probed in order
    pub paths: Vec<String>,

    /// pause between two consecutive requests
    pub delay: Duration,

    /// per-request timeout
    pub timeout: Duration,

    /// identifying user-agent sent with every request
    pub user_agent: String,

    /// static headers sent with every request
    pub headers: BTreeMap<String, String>,

    /// how results are rendered by the binary
    pub output: OutputStyle,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            target: DEFAULT_TARGET.to_string(),
            paths: DEFAULT_PATHS.iter().map(ToString::to_string).collect(),
            delay: DEFAULT_DELAY,
            timeout: DEFAULT_TIMEOUT,
            user_agent: default_user_agent(),
            headers: BTreeMap::new(),
            output: OutputStyle::default(),
        }
    }
}

/// `pathprobe/<version> (sequential-audit)`
#[must_use]
pub fn default_user_agent() -> String {
    format!("pathprobe/{} (sequential-audit)", env!("CARGO_PKG_VERSION"))
}

/// on-disk layout of the config file; every key is optional
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    target: Option<String>,
    paths: Option<Vec<String>>,
    delay_ms: Option<u64>,
    timeout_ms: Option<u64>,
    user_agent: Option<String>,
    headers: Option<BTreeMap<String, String>>,
    output: Option<OutputStyle>,
}

/// highest-precedence layer, usually filled in from the command line
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    /// replaces the target
    pub target: Option<String>,

    /// replaces the path list, when non-empty
    pub paths: Vec<String>,

    /// replaces the delay, in milliseconds
    pub delay_ms: Option<u64>,

    /// replaces the timeout, in milliseconds
    pub timeout_ms: Option<u64>,

    /// replaces the user-agent
    pub user_agent: Option<String>,

    /// `name: value` lines added on top of configured headers; same-named
    /// headers are replaced
    pub headers: Vec<String>,

    /// replaces the output style
    pub output: Option<OutputStyle>,
}

impl AuditConfig {
    /// defaults, overlaid with the contents of the toml file at `path`
    ///
    /// # Errors
    ///
    /// fails if the file can't be read, or isn't valid toml of the expected shape
    pub fn from_file(path: &Path) -> Result<Self, ProbeError> {
        let mut config = Self::default();
        config.merge_file(path)?;
        Ok(config)
    }

    /// overlay the contents of the toml file at `path`
    ///
    /// # Errors
    ///
    /// fails if the file can't be read, or isn't valid toml of the expected shape
    #[instrument(skip(self), level = "debug")]
    pub fn merge_file(&mut self, path: &Path) -> Result<(), ProbeError> {
        let content = fs::read_to_string(path).map_err(|source| {
            error!(%source, path = %path.display(), "could not read config file");
            ProbeError::ConfigReadError {
                source,
                path: path.to_path_buf(),
            }
        })?;

        let file: ConfigFile = toml::from_str(&content).map_err(|source| {
            error!(%source, path = %path.display(), "could not parse config file");
            ProbeError::ConfigParseError {
                source,
                path: path.to_path_buf(),
            }
        })?;

        if let Some(target) = file.target {
            self.target = target;
        }
        if let Some(paths) = file.paths {
            self.paths = paths;
        }
        if let Some(delay_ms) = file.delay_ms {
            self.delay = Duration::from_millis(delay_ms);
        }
        if let Some(timeout_ms) = file.timeout_ms {
            self.timeout = Duration::from_millis(timeout_ms);
        }
        if let Some(user_agent) = file.user_agent {
            self.user_agent = user_agent;
        }
        if let Some(headers) = file.headers {
            self.headers = headers;
        }
        if let Some(output) = file.output {
            self.output = output;
        }

        debug!(path = %path.display(), "merged config file");

        Ok(())
    }

    /// overlay the given overrides
    ///
    /// # Errors
    ///
    /// fails if one of the header lines isn't in `name: value` form
    pub fn apply(&mut self, overrides: ConfigOverrides) -> Result<(), ProbeError> {
        if let Some(target) = overrides.target {
            self.target = target;
        }
        if !overrides.paths.is_empty() {
            self.paths = overrides.paths;
        }
        if let Some(delay_ms) = overrides.delay_ms {
            self.delay = Duration::from_millis(delay_ms);
        }
        if let Some(timeout_ms) = overrides.timeout_ms {
            self.timeout = Duration::from_millis(timeout_ms);
        }
        if let Some(user_agent) = overrides.user_agent {
            self.user_agent = user_agent;
        }
        for line in &overrides.headers {
            let (name, value) = parse_header_line(line)?;
            self.headers.insert(name, value);
        }
        if let Some(output) = overrides.output {
            self.output = output;
        }

        Ok(())
    }

    /// ensure the configuration can drive a session
    ///
    /// # Errors
    ///
    /// - the target isn't an absolute http(s) url
    /// - no non-blank paths remain
    /// - the timeout is zero
    /// - a header name/value or the user-agent can't be sent over the wire
    #[instrument(skip_all, level = "debug")]
    pub fn validate(&self) -> Result<(), ProbeError> {
        ProbeRequest::from_url(&self.target)?;

        if self.wordlist().is_empty() {
            error!("no candidate paths configured");
            return Err(ProbeError::EmptyWordlist);
        }

        if self.timeout.is_zero() {
            error!("request timeout must be greater than zero");
            return Err(ProbeError::InvalidParameter {
                param: String::from("timeout"),
                message: "the request timeout must be greater than zero",
            });
        }

        HeaderValue::from_str(&self.user_agent).map_err(|source| {
            error!(%source, "user-agent can't be used as a header value");
            ProbeError::InvalidHeader {
                header: format!("User-Agent: {}", self.user_agent),
                reason: source.to_string(),
            }
        })?;

        for (name, value) in &self.headers {
            HeaderName::from_bytes(name.as_bytes()).map_err(|source| {
                error!(%name, %source, "invalid header name");
                ProbeError::InvalidHeader {
                    header: format!("{name}: {value}"),
                    reason: source.to_string(),
                }
            })?;

            HeaderValue::from_str(value).map_err(|source| {
                error!(%name, %source, "invalid header value");
                ProbeError::InvalidHeader {
                    header: format!("{name}: {value}"),
                    reason: source.to_string(),
                }
            })?;
        }

        Ok(())
    }

    /// the configured paths as a [`Wordlist`]; entries are trimmed and blank
    /// entries are skipped
    #[must_use]
    pub fn wordlist(&self) -> Wordlist {
        self.paths
            .iter()
            .map(|path| path.trim())
            .filter(|path| !path.is_empty())
            .collect()
    }

    /// the request every candidate request is stamped from
    ///
    /// # Errors
    ///
    /// fails if the target isn't an absolute http(s) url
    pub fn request_template(&self) -> Result<ProbeRequest, ProbeError> {
        let mut template = ProbeRequest::from_url(&self.target)?;

        template.set_timeout(self.timeout);
        template.set_user_agent(self.user_agent.clone());

        for (name, value) in &self.headers {
            template.add_header(name.clone(), value.clone());
        }

        Ok(template)
    }
}
