//! Core types and configuration for dockhand.
//!
//! This crate defines the `.docker-machine-deploy.json` schema
//! ([`DeployConfig`]) and the shared error types.

pub mod config;
pub mod error;

pub use config::{CONFIG_FILE, DeployConfig};
pub use error::{Error, Result};
