//! CLI argument parsing

pub mod args;

pub use args::{parse_var, Args, LogFormat, SecretString};
