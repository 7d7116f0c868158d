//! Logging setup.
//!
//! The engine only speaks the `log` facade; this module installs `env_logger`
//! as the backend for binaries built on top of it.

mod init;

pub use init::{init_logging, LoggingConfig, DEFAULT_FILTER};
