//! flowpulse library interface
//!
//! Turns BPMN or sequence diagrams into ordered API calls and runs them
//! against a live service, validating each response.
//!
//! # Module Organization
//!
//! - [`process`] - Diagram parsing into a [`process::ProcessDefinition`]
//! - [`mapping`] - Logical to real endpoint paths
//! - [`auth`] - OAuth2 client-credentials tokens
//! - [`schema`] / [`validation`] - Endpoint descriptors and response checks
//! - [`testdata`] - Request body generation
//! - [`pipeline`] - The execution engine and its reports
//! - [`errors`] - Error types (FlowpulseError, Result)
//! - [`status`] - Exit status codes (ExitStatus)
//! - [`core`] - Command-line orchestration

pub mod auth;
pub mod cli;
pub mod config;
pub mod core;
pub mod errors;
pub mod http;
pub mod logging;
pub mod mapping;
pub mod output;
pub mod pipeline;
pub mod process;
pub mod schema;
pub mod status;
pub mod testdata;
pub mod validation;
