#![deny(missing_docs)]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]

//! Data model exchanged between the controlling process and the signing worker.
//!
//! The worker reads exactly one [`request::Request`] from standard input and writes exactly one
//! [`response::Envelope`] (on success) or [`response::ErrorResponse`] (on failure, to standard
//! error) before terminating. See [`request`] and [`response`].

pub mod request;
pub mod response;
