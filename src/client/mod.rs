//! Asynchronous http client traits, with an implementation using [`reqwest`]
mod async_client;
mod utils; // maps reqwest errors to ProbeError

pub use self::async_client::AsyncClient;

use crate::error::ProbeError;
use crate::requests::ProbeRequest;
use crate::responses::AsyncResponse;

use async_trait::async_trait;

/// marker trait for all client types
pub trait HttpClient {
    /// which concrete client will be used
    ///
    /// see [`AsyncClient`] for an example
    type ClientType;

    /// create a new client, using [`HttpClient::ClientType`] as the base
    fn with_client(client: Self::ClientType) -> Self;
}

/// trait for asynchronous clients
#[async_trait]
pub trait AsyncRequests {
    /// send a GET for the given [`ProbeRequest`] in order to receive its
    /// [`AsyncResponse`]
    ///
    /// see [`AsyncClient`] for an example
    ///
    /// # Note
    ///
    /// This is the most likely place to populate the `elapsed` field resulting [`AsyncResponse`]
    ///
    /// # Errors
    ///
    /// Implementors should return [`ProbeError::RequestError`] for anything that
    /// goes wrong on the wire, so the probe loop can report it and move on
    async fn send(&self, request: ProbeRequest) -> Result<AsyncResponse, ProbeError>;
}
