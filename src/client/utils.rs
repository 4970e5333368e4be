use crate::error::{ProbeError, RequestErrorKind};
use tracing::{error, instrument};

/// internal helper to convert [`reqwest::Error`] to [`ProbeError`]
#[allow(clippy::needless_pass_by_value)]
#[instrument(skip_all, level = "trace")]
pub(super) fn reqwest_to_probe_error(source: reqwest::Error) -> ProbeError {
    let status = source.status().map(|status_code| status_code.as_u16());

    let kind = if source.is_body() {
        // Returns true if the error is related to the request or response body
        RequestErrorKind::Body(status)
    } else if source.is_timeout() {
        // timeout is more specific than connect/request, and reqwest reports a
        // connect timeout as both; check it first
        RequestErrorKind::Timeout(status)
    } else if source.is_connect() {
        // connect is a more specific error than a request error and both
        // can be true at the same time; don't change the order of the if statements
        // without thinking about the specificity of the error
        RequestErrorKind::Connect(status)
    } else if source.is_decode() {
        RequestErrorKind::Decode(status)
    } else if source.is_redirect() {
        // Returns true if the error is from a RedirectPolicy
        RequestErrorKind::Redirect(status)
    } else if source.is_request() {
        RequestErrorKind::Request(status)
    } else {
        RequestErrorKind::Unknown
    };

    error!(?kind, "error occurred while sending request: {}", source);

    ProbeError::RequestError {
        kind,
        message: describe(&source),
    }
}

/// reqwest's top-level message is usually just "error sending request for url";
/// the interesting part (connection refused, dns failure, ...) lives in the
/// source chain
fn describe(source: &reqwest::Error) -> String {
    let mut message = source.to_string();
    let mut cause = std::error::Error::source(source);

    while let Some(inner) = cause {
        let inner_message = inner.to_string();

        if !message.contains(&inner_message) {
            message.push_str(": ");
            message.push_str(&inner_message);
        }

        cause = inner.source();
    }

    message
}
