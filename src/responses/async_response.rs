use super::{Response, Timed};

use crate::error::ProbeError;
use crate::requests::RequestId;
use std::collections::HashMap;
use std::time::Duration;
use url::Url;

use tracing::{error, instrument};

/// pathprobe implementation of [`Response`] that extends [`reqwest::Response`]
/// with the body already read into memory
#[derive(Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub struct AsyncResponse {
    id: RequestId,
    url: Url,
    status_code: u16,
    headers: HashMap<String, Vec<u8>>,
    elapsed: Duration,
    content_length: usize,
    body: Vec<u8>,
}

impl AsyncResponse {
    fn new() -> Self {
        Self::default()
    }

    /// Create a `Response` object from a [`RequestId`], [`reqwest::Response`], and [`Duration`]
    ///
    /// # Examples
    ///
    /// ```
    /// # use pathprobe::responses::{Response, AsyncResponse};
    /// # use pathprobe::requests::RequestId;
    /// # use pathprobe::error::ProbeError;
    /// # use std::borrow::Cow;
    /// # use tokio_test;
    /// # use std::time::Duration;
    /// # fn main() -> Result<(), ProbeError> {
    /// # tokio_test::block_on(async {
    /// // for testing, normal Response comes as a result of a sent request
    /// let reqwest_response = http::response::Response::new("hello world");
    ///
    /// // should come from the related Request
    /// let id = RequestId::new(0);
    ///
    /// // should come from timing during the client's send function
    /// let elapsed = Duration::from_secs(1);
    ///
    /// let response = AsyncResponse::try_from_reqwest_response(id, reqwest_response.into(), elapsed).await?;
    ///
    /// assert_eq!(response.id(), RequestId::new(0));
    /// assert_eq!(response.status_code(), 200);
    /// assert_eq!(response.content_length(), 11);
    /// assert_eq!(response.content(), Some(b"hello world".as_ref()));
    /// assert_eq!(response.text(), Cow::from("hello world"));
    /// # Result::<(), ProbeError>::Ok(())
    /// # })
    /// # }
    /// ```
    ///
    /// # Errors
    ///
    /// This function returns an error if there is a problem while reading the
    /// response body
    #[instrument(skip(resp, elapsed), level = "trace")]
    pub async fn try_from_reqwest_response(
        id: RequestId,
        resp: reqwest::Response,
        elapsed: Duration,
    ) -> Result<Self, ProbeError> {
        let mut response = Self::new();

        response.id = id;
        response.url = resp.url().clone();
        response.status_code = resp.status().as_u16();
        response.headers = resp
            .headers()
            .iter()
            .map(|(name, value)| (name.as_str().to_string(), value.as_bytes().to_vec()))
            .collect();

        let body = resp.bytes().await.map_err(|source| {
            error!(?source, "could not read response body");
            ProbeError::ResponseReadError { source }
        })?;

        response.content_length = body.len();
        response.body = body.to_vec();
        response.elapsed = elapsed;

        Ok(response)
    }
}

impl Response for AsyncResponse {
    fn id(&self) -> RequestId {
        self.id
    }

    fn url(&self) -> &Url {
        &self.url
    }

    fn status_code(&self) -> u16 {
        self.status_code
    }

    fn headers(&self) -> &HashMap<String, Vec<u8>> {
        &self.headers
    }

    fn body(&self) -> &[u8] {
        self.body.as_ref()
    }

    fn content_length(&self) -> usize {
        self.content_length
    }
}

impl Timed for AsyncResponse {
    fn elapsed(&self) -> &Duration {
        &self.elapsed
    }
}

impl Default for AsyncResponse {
    fn default() -> Self {
        Self {
            id: RequestId::default(),
            url: Url::parse("http://no.url.provided.local/").unwrap(),
            status_code: Default::default(),
            headers: Default::default(),
            body: Default::default(),
            elapsed: Default::default(),
            content_length: Default::default(),
        }
    }
}
