//! Turn a received [`Response`] into an [`Outcome`]
mod status_code;

use crate::responses::Response;
use crate::results::Outcome;

pub use self::status_code::StatusCodeClassifier;

/// A `Classifier` inspects a server's response to a single candidate and
/// decides what it says about that path
///
/// the probe loop derives its [`FlowControl`] from the returned [`Outcome`], so a
/// classifier can't stop the session on its own: only [`Outcome::RateLimited`]
/// does that
///
/// [`FlowControl`]: crate::actions::FlowControl
pub trait Classifier<R>
where
    R: Response,
{
    /// classify the given response
    fn classify(&self, response: &R) -> Outcome;
}

/// any `Fn(&R) -> Outcome` is a classifier
impl<R, F> Classifier<R> for F
where
    R: Response,
    F: Fn(&R) -> Outcome,
{
    fn classify(&self, response: &R) -> Outcome {
        (self)(response)
    }
}
