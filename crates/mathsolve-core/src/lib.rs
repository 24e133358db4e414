//! Shared types for the mathsolve service: configuration and the JSON
//! shapes exchanged over `POST /solve`.

mod config;
mod problem;

pub use config::{
    CONFIG_ENV, Config, ConfigError, DEFAULT_CONFIG_FILE, ServerConfig, SolverConfig,
};
pub use problem::{ErrorBody, ProblemKind, ProblemRequest, SolutionResult, UnsupportedKind};
