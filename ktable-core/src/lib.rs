//! # ktable-core
//!
//! Shared building blocks for the knowledge table backend services:
//!
//! - **Models**: retrieval chunks, query rules and the table structure the
//!   extraction pipeline hands to the LLM layer.
//! - **Config**: process-wide [`Settings`], loadable from TOML and the
//!   environment.
//! - **Logging**: `tracing` subscriber initialisation.
//!
//! Nothing in this crate performs I/O at request time. Every model is
//! constructed, used and discarded within a single request.

#![deny(clippy::unwrap_used)]
#![deny(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod logging;
pub mod models;

pub use config::Settings;
pub use error::CoreError;
pub use models::*;
