use super::utils::reqwest_to_probe_error;
use super::{AsyncRequests, HttpClient};
use crate::error::ProbeError;
use crate::requests::ProbeRequest;
use crate::responses::AsyncResponse;

use std::time::Instant;

use async_trait::async_trait;
use reqwest::header::{HeaderName, HeaderValue, USER_AGENT};
use reqwest::redirect::Policy;
use tracing::{error, instrument};

/// concrete implementation of an [`AsyncRequests`] client using an underlying [`reqwest::Client`]
#[derive(Clone, Debug)]
pub struct AsyncClient {
    client: reqwest::Client,
}

impl HttpClient for AsyncClient {
    type ClientType = reqwest::Client;

    /// create a new client, using [`reqwest::Client`] as the base
    ///
    /// # Examples
    ///
    /// ```
    /// # use reqwest;
    /// # use std::time::Duration;
    /// # use pathprobe::client::{AsyncClient, HttpClient};
    /// # use pathprobe::error::ProbeError;
    /// # fn main() -> Result<(), ProbeError> {
    /// let req_client = reqwest::Client::builder().timeout(Duration::from_secs(7)).build()?;
    ///
    /// let client = AsyncClient::with_client(req_client);
    ///
    /// # Ok(())
    /// # }
    /// ```
    fn with_client(client: Self::ClientType) -> Self {
        Self { client }
    }
}

#[async_trait]
impl AsyncRequests for AsyncClient {
    /// send a GET for the given [`ProbeRequest`] in order to receive its [`AsyncResponse`]
    ///
    /// # Errors
    ///
    /// This method fails if there was an error while sending the request, the
    /// request timed out, a redirect loop was detected, or the response body
    /// couldn't be read.
    #[instrument(skip_all, fields(url = %request.url()), level = "trace")]
    async fn send(&self, request: ProbeRequest) -> Result<AsyncResponse, ProbeError> {
        let request_id = request.id();

        let reqwest_request = self.build_request(request)?;

        // start timer for the request
        let now = Instant::now();

        let reqwest_response = self
            .client
            .execute(reqwest_request)
            .await
            .map_err(reqwest_to_probe_error)?;

        // the await is for reqwest's asynchronous read of the response body
        let response =
            AsyncResponse::try_from_reqwest_response(request_id, reqwest_response, now.elapsed())
                .await
                .map_err(|error| match error {
                    ProbeError::ResponseReadError { source } => reqwest_to_probe_error(source),
                    other => other,
                })?;

        Ok(response)
    }
}

impl AsyncClient {
    /// create a new client that reports redirects instead of following them
    ///
    /// a 301/302 is the answer for the candidate itself; following it would
    /// classify whatever page it points at (i.e. a login form) instead
    ///
    /// # Errors
    ///
    /// This method fails if the underlying [`reqwest::Client`] can't be built,
    /// i.e. no tls backend could be initialized
    pub fn new() -> Result<Self, ProbeError> {
        let client = reqwest::Client::builder()
            .redirect(Policy::none())
            .build()
            .map_err(reqwest_to_probe_error)?;

        Ok(Self::with_client(client))
    }

    /// get a reference to the wrapped [`reqwest::Client`]
    #[must_use]
    pub const fn inner(&self) -> &reqwest::Client {
        &self.client
    }

    /// restructure a [`ProbeRequest`] into one that can be sent over the wire
    #[instrument(skip_all, level = "trace")]
    fn build_request(&self, request: ProbeRequest) -> Result<reqwest::Request, ProbeError> {
        let mut builder = self.client.get(request.url.clone()).timeout(request.timeout);

        for (name, value) in &request.headers {
            let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|source| {
                error!(%name, %source, "could not use the given header name");
                ProbeError::InvalidHeader {
                    header: format!("{name}: {value}"),
                    reason: source.to_string(),
                }
            })?;

            let header_value = HeaderValue::from_str(value).map_err(|source| {
                error!(%name, %source, "could not use the given header value");
                ProbeError::InvalidHeader {
                    header: format!("{name}: {value}"),
                    reason: source.to_string(),
                }
            })?;

            builder = builder.header(header_name, header_value);
        }

        if let Some(user_agent) = request.user_agent {
            builder = builder.header(USER_AGENT, user_agent);
        }

        let reqwest_request = builder.build().map_err(reqwest_to_probe_error)?;

        Ok(reqwest_request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RequestErrorKind;
    use crate::requests::{Candidate, RequestId};
    use crate::responses::Response;
    use httpmock::Method::GET;
    use httpmock::MockServer;
    use std::time::Duration;

    /// the client sends a GET with the user-agent and static headers attached,
    /// and reports the body size it read
    #[tokio::test]
    async fn send_includes_identifying_headers() {
        let srv = MockServer::start_async().await;

        let mock = srv
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/admin")
                    .header("user-agent", "pathprobe-test/1.0")
                    .header("x-audit", "yes");
                then.status(200).body("welcome, admin");
            })
            .await;

        let mut template = ProbeRequest::from_url(&srv.base_url()).unwrap();
        template.set_user_agent("pathprobe-test/1.0");
        template.add_header("X-Audit", "yes");

        let request = template.for_candidate(RequestId::new(1), &Candidate::from("admin"));

        let response = AsyncClient::new().unwrap().send(request).await.unwrap();

        mock.assert_hits_async(1).await;
        assert_eq!(response.id(), RequestId::new(1));
        assert_eq!(response.status_code(), 200);
        assert_eq!(response.content_length(), 14);
    }

    /// a redirect is the candidate's own answer; the target page is never requested
    #[tokio::test]
    async fn redirects_are_not_followed() {
        let srv = MockServer::start_async().await;

        let admin = srv
            .mock_async(|when, then| {
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

        let template = ProbeRequest::from_url(&srv.base_url()).unwrap();
        let request = template.for_candidate(RequestId::new(0), &Candidate::from("admin"));

        let response = AsyncClient::new().unwrap().send(request).await.unwrap();

        admin.assert_hits_async(1).await;
        login.assert_hits_async(0).await;
        assert_eq!(response.status_code(), 302);
    }

    /// a response slower than the request timeout becomes a timeout error
    #[tokio::test]
    async fn slow_response_is_a_timeout() {
        let srv = MockServer::start_async().await;

        srv.mock_async(|when, then| {
            when.method(GET).path("/slow");
            then.status(200).delay(Duration::from_millis(800));
        })
        .await;

        let mut template = ProbeRequest::from_url(&srv.base_url()).unwrap();
        template.set_timeout(Duration::from_millis(100));

        let request = template.for_candidate(RequestId::new(0), &Candidate::from("slow"));

        let error = AsyncClient::new().unwrap().send(request).await.unwrap_err();

        assert_eq!(
            error.request_error_kind(),
            Some(RequestErrorKind::Timeout(None))
        );
    }

    /// header values reqwest can't put on the wire are rejected before sending
    #[tokio::test]
    async fn unusable_header_value_is_rejected() {
        let mut template = ProbeRequest::from_url("http://127.0.0.1:9").unwrap();
        template.add_header("X-Bad", "line\nbreak");

        let request = template.for_candidate(RequestId::new(0), &Candidate::from("x"));

        let error = AsyncClient::new().unwrap().send(request).await.unwrap_err();

        assert!(matches!(error, ProbeError::InvalidHeader { .. }));
    }
}
