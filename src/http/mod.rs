//! HTTP protocol types and client construction

pub mod client;
mod method;

pub use client::{build_client, TlsOptions};
pub use method::*;
