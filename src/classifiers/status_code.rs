use super::Classifier;
use crate::responses::Response;
use crate::results::Outcome;

use tracing::instrument;

/// Classify a response purely by its status code
///
/// | status | outcome                       |
/// |--------|-------------------------------|
/// | 200    | [`Outcome::Exposed`]          |
/// | 403    | [`Outcome::Protected`]        |
/// | 429    | [`Outcome::RateLimited`]      |
/// | other  | [`Outcome::Unclassified`]     |
///
/// # Examples
///
/// ```
/// # use pathprobe::responses::AsyncResponse;
/// # use pathprobe::requests::RequestId;
/// # use pathprobe::error::ProbeError;
/// # use pathprobe::classifiers::{Classifier, StatusCodeClassifier};
/// # use pathprobe::results::Outcome;
/// # use std::time::Duration;
/// # fn main() -> Result<(), ProbeError> {
/// # tokio_test::block_on(async {
/// // for testing; normally a Response comes as a result of a sent request
/// let reqwest_response = http::response::Builder::new().status(200).body("secret").unwrap();
/// let response = AsyncResponse::try_from_reqwest_response(
///     RequestId::new(0),
///     reqwest_response.into(),
///     Duration::from_millis(5),
/// )
/// .await?;
///
/// let outcome = StatusCodeClassifier::new().classify(&response);
///
/// assert_eq!(outcome, Outcome::Exposed { size: 6 });
/// # Result::<(), ProbeError>::Ok(())
/// # })
/// # }
/// ```
#[derive(Copy, Clone, Default, Debug, PartialEq, Eq, Hash)]
pub struct StatusCodeClassifier;

impl StatusCodeClassifier {
    /// create a new `StatusCodeClassifier`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl<R> Classifier<R> for StatusCodeClassifier
where
    R: Response,
{
    #[instrument(skip_all, level = "trace")]
    fn classify(&self, response: &R) -> Outcome {
        match response.status_code() {
            200 => Outcome::Exposed {
                size: response.content_length(),
            },
            403 => Outcome::Protected,
            429 => Outcome::RateLimited,
            status_code => Outcome::Unclassified { status_code },
        }
    }
}
