//! ordered collection of [`Candidate`]s the probe loop iterates over
//!
//! [`Candidate`]: crate::requests::Candidate
mod wordlist;

pub use self::wordlist::Wordlist;
