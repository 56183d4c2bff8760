//! Chime scan service
//!
//! Periodically reconciles one or more music root folders with the catalog
//! using the `chime-scanner` engine. The wire protocol server and its
//! request handlers live elsewhere; this service owns configuration, the
//! scan scheduler, and the operator CLI.

pub mod config;
pub mod error;
pub mod scheduler;

pub use config::ServerConfig;
pub use error::{Result, ServerError};
pub use scheduler::Scheduler;
