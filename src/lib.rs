//! Sequential, rate-limit aware HTTP path discovery
//!
//! An [`AuditSession`] joins each candidate of a [`Wordlist`] onto a target url,
//! sends one GET at a time, classifies the answer, and hands the resulting
//! [`ProbeResult`] to a [`ResultSink`]. The first `429 Too Many Requests` ends
//! the session early.
//!
//! [`AuditSession`]: crate::session::AuditSession
//! [`Wordlist`]: crate::corpora::Wordlist
//! [`ProbeResult`]: crate::results::ProbeResult
//! [`ResultSink`]: crate::sinks::ResultSink
#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::cargo,
    clippy::perf,
    rustdoc::broken_intra_doc_links,
    missing_docs,
    clippy::missing_const_for_fn
)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::multiple_crate_versions)] // appears to be a false positive; cargo tree doesn't show what clippy yells about

pub mod actions;
pub mod classifiers;
pub mod client;
pub mod config;
pub mod corpora;
pub mod error;
pub mod prelude;
pub mod requests;
pub mod responses;
pub mod results;
pub mod session;
pub mod sinks;
pub mod statistics;
