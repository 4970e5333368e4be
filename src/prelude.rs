//! small collection of widely used core types and traits
//!
//! The goal in using the prelude is to reduce the number of imports
//! needed to (mostly) only those that have direct impact on running
//! an audit.
//!
//! # Traits
//!
//! - [`HttpClient`] - exposes the `with_client` constructor
//! - [`AsyncRequests`] - exposes the `send` method on clients such as [`AsyncClient`]
//! - [`Response`] - exposes a plethora of methods on an implementing type (i.e. [`AsyncResponse`])
//! - [`Timed`] - exposes the `elapsed` method on implementing `Response` types
//! - [`Classifier`] - exposes the `classify` method
//! - [`ResultSink`] - exposes the `start`, `probing`, `report`, and `finish` hooks
//!
//! # Structs & Enums
//!
//! - [`AuditSession`] - the probe loop
//! - [`AuditConfig`] - layered session configuration
//! - [`Wordlist`] - ordered candidate paths
//! - [`Outcome`] / [`ProbeResult`] / [`Completion`] - what the loop produces
//! - [`FlowControl`] - the loop's continue/stop decision
//!
//! [`HttpClient`]: crate::client::HttpClient
//! [`AsyncRequests`]: crate::client::AsyncRequests
//! [`Response`]: crate::responses::Response
//! [`Timed`]: crate::responses::Timed
//! [`Classifier`]: crate::classifiers::Classifier
//! [`ResultSink`]: crate::sinks::ResultSink

// traits that are likely to be used by anyone running an audit
pub use crate::classifiers::Classifier as _;
pub use crate::client::AsyncRequests as _;
pub use crate::client::HttpClient as _;
pub use crate::responses::Response as _;
pub use crate::responses::Timed as _;
pub use crate::sinks::ResultSink as _;

// core structs needed by everyone
pub use crate::actions::FlowControl;
pub use crate::client::AsyncClient;
pub use crate::config::AuditConfig;
pub use crate::corpora::Wordlist;
pub use crate::requests::{Candidate, ProbeRequest};
pub use crate::responses::AsyncResponse;
pub use crate::results::{Completion, Outcome, ProbeResult};
pub use crate::session::AuditSession;
pub use crate::sinks::{LineSink, TableSink};

// crate's error type
pub use crate::error::ProbeError;
