#![doc = include_str!("../README.md")]
#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]
// PracticeClient<B> is reached through DefaultPracticeClient and the core ports
#![allow(private_interfaces)]

mod client;
mod config;
mod error;
mod http;
mod models;
mod url;

// ============================================================================
// Public API
// ============================================================================

// Client
pub use client::DefaultPracticeClient;

// Configuration
pub use config::PracticeApiConfig;

// Errors
pub use error::{ApiError, ApiResult};

// Silence unused dev-dependency warnings
#[cfg(test)]
use tokio_test as _;
