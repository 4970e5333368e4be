//! Custom error-type definitions
use std::path::PathBuf;

use thiserror::Error;
use url::ParseError;

/// primary error-type for the pathprobe library
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ProbeError {
    /// Represents a failure to parse the given string into a [`url::Url`](https://docs.rs/url/latest/url/struct.Url.html).
    #[error("The url `{url}` is invalid and couldn't be parsed.")]
    InvalidUrl {
        /// underlying source error-type
        source: ParseError,

        /// the url that couldn't be parsed
        url: String,
    },

    /// Represents a url that parsed, but can't be used as a probe target
    /// (i.e. not http(s), or can't have path segments appended)
    #[error("The url `{url}` can't be used as a target: {reason}")]
    UnsupportedUrl {
        /// the offending url
        url: String,

        /// why the url was rejected
        reason: &'static str,
    },

    /// Represents a failure to read the body of a `reqwest::Response` object
    #[error("Could not read the response body")]
    ResponseReadError {
        /// underlying source error-type
        #[from]
        source: reqwest::Error,
    },

    /// Represents a header that isn't in `name: value` form, or that reqwest
    /// refuses to put on the wire
    #[error("Could not parse `{header}` as an http header: {reason}")]
    InvalidHeader {
        /// the header that couldn't be parsed
        header: String,

        /// underlying reason for the parsing error
        reason: String,
    },

    /// Represents an empty [`Wordlist`], which isn't allowed
    ///
    /// [`Wordlist`]: crate::corpora::Wordlist
    #[error("No candidates were found in the wordlist")]
    EmptyWordlist,

    /// Represents an invalid parameter passed to some function or constructor
    #[error("Invalid parameter provided, {message}: {param}")]
    InvalidParameter {
        /// the failing parameter
        param: String,

        /// the associated message to help the user
        message: &'static str,
    },

    /// Represents a failure to open or read a configuration file
    #[error("The config file `{}` couldn't be read.", path.display())]
    ConfigReadError {
        /// underlying source error-type
        source: std::io::Error,

        /// path to the file that couldn't be read
        path: PathBuf,
    },

    /// Represents a configuration file that isn't valid toml, or doesn't
    /// match the expected layout
    #[error("The config file `{}` couldn't be parsed: {source}", path.display())]
    ConfigParseError {
        /// underlying source error-type
        source: toml::de::Error,

        /// path to the file that couldn't be parsed
        path: PathBuf,
    },

    /// Represents a failure encountered during sending a request / receiving a response
    #[error("An error occurred while sending the request: {kind:?} {message}")]
    RequestError {
        /// what category of error occurred
        kind: RequestErrorKind,

        /// the underlying error message
        message: String,
    },
}

/// Used to differentiate between different types of errors that occur when making requests.
///
/// That differentiation is then used internally to update the proper error counts in [`Statistics`]
///
/// [`Statistics`]: crate::statistics::Statistics
#[derive(Copy, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[non_exhaustive]
pub enum RequestErrorKind {
    /// Represents a failure to read a response body
    Body(Option<u16>),

    /// Represents a failure during client connection to target
    Connect(Option<u16>),

    /// Represents a failure to decode a response body
    Decode(Option<u16>),

    /// Represents a failure to related to redirection, i.e. too many redirects
    Redirect(Option<u16>),

    /// Represents a failure related to the request
    Request(Option<u16>),

    /// Represents a timeout during the request
    Timeout(Option<u16>),

    /// Represents an unexpected error
    #[default]
    Unknown,
}

impl ProbeError {
    /// the [`RequestErrorKind`] behind this error, if it happened on the wire
    ///
    /// body read failures are reported as [`RequestErrorKind::Body`], anything that
    /// never reached the client is `None`
    #[must_use]
    pub fn request_error_kind(&self) -> Option<RequestErrorKind> {
        match self {
            Self::RequestError { kind, .. } => Some(*kind),
            Self::ResponseReadError { source } => Some(RequestErrorKind::Body(
                source.status().map(|status| status.as_u16()),
            )),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// only wire-level errors carry a request error kind
    #[test]
    fn request_error_kind_only_for_wire_errors() {
        let error = ProbeError::RequestError {
            kind: RequestErrorKind::Timeout(None),
            message: String::from("operation timed out"),
        };

        assert_eq!(
            error.request_error_kind(),
            Some(RequestErrorKind::Timeout(None))
        );

        assert_eq!(ProbeError::EmptyWordlist.request_error_kind(), None);
    }

    /// the display form of a request error includes the kind and message
    #[test]
    fn request_error_display_includes_kind() {
        let error = ProbeError::RequestError {
            kind: RequestErrorKind::Connect(None),
            message: String::from("connection refused"),
        };

        let shown = error.to_string();

        assert!(shown.contains("Connect(None)"));
        assert!(shown.contains("connection refused"));
    }
}
