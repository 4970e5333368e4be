//! Asynchronous http response trait, with an implementation backed by [`reqwest`]
use crate::requests::RequestId;
use std::borrow::Cow;
use std::collections::HashMap;
use std::time::Duration;
use url::Url;

mod async_response;
pub use self::async_response::AsyncResponse;

/// an opinionated trait to represent a server's response
pub trait Response {
    /// get the id
    #[must_use]
    fn id(&self) -> RequestId;

    /// get a reference to the url
    #[must_use]
    fn url(&self) -> &Url;

    /// get the status code
    #[must_use]
    fn status_code(&self) -> u16;

    /// get a reference to the headers
    #[must_use]
    fn headers(&self) -> &HashMap<String, Vec<u8>>;

    /// get a reference to the body
    #[must_use]
    fn body(&self) -> &[u8];

    /// Get the content-length of this response, i.e. the number of bytes
    /// actually read from the body
    #[must_use]
    fn content_length(&self) -> usize;

    /// try to get the full response body, as bytes
    ///
    /// # Examples
    ///
    /// ```
    /// # use pathprobe::responses::{Response, AsyncResponse};
    /// # use pathprobe::requests::RequestId;
    /// # use pathprobe::error::ProbeError;
    /// # use tokio_test;
    /// # use std::time::Duration;
    /// # fn main() -> Result<(), ProbeError> {
    /// # tokio_test::block_on(async {
    /// // for testing, normal Response comes as a result of a sent request
    /// let reqwest_response = http::response::Response::new("");
    ///
    /// let response = AsyncResponse::try_from_reqwest_response(
    ///     RequestId::new(0),
    ///     reqwest_response.into(),
    ///     Duration::from_secs(1),
    /// )
    /// .await?;
    ///
    /// assert_eq!(response.content(), None);
    /// # Result::<(), ProbeError>::Ok(())
    /// # })
    /// # }
    /// ```
    #[must_use]
    fn content(&self) -> Option<&[u8]> {
        if self.content_length() > 0 {
            Some(self.body())
        } else {
            None
        }
    }

    /// try to get the full response body, as unicode
    ///
    /// # Note
    ///
    /// Conversion performed on call, cache results
    /// if you're into that sort of thing
    #[must_use]
    fn text(&self) -> Cow<str> {
        String::from_utf8_lossy(self.body())
    }
}

/// a trait to provide the amount of time taken to perform an action
pub trait Timed {
    /// amount of time elapsed between sending the request and the
    /// arrival of the response
    #[must_use]
    fn elapsed(&self) -> &Duration;
}
