//! Configuration: TOML file, `.env` and environment overrides

#[allow(clippy::module_inception)]
mod config;
mod dotenv;

pub use config::{
    ApiConfig, AuthConfig, Config, ExtractConfig, ENV_AUTH_URL, ENV_BASE_URL, ENV_CLIENT_ID,
    ENV_CLIENT_SECRET, ENV_GOST_BASE_URL,
};
pub use dotenv::EnvVars;
