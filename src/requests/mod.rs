//! provides the [`ProbeRequest`] type sent by the probe loop, along with the
//! [`Candidate`] path segments it's built from
mod request;

pub use self::request::{parse_header_line, Candidate, ProbeRequest, RequestId};
