//! Typed configuration schema and runner factory.
//!
//! The original `yamss` input format is XML with embedded scripting-language
//! load expressions; both are explicitly out of scope here (spec.md §1).
//! This crate instead defines a structured, `serde`-deserializable document
//! (JSON in practice) and a factory that builds a [`yamss_core::Runner`]
//! from it -- the "factory surface" contract the core's scope boundary
//! names.

pub mod error;
pub mod evaluators;
pub mod factory;
pub mod schema;

pub use error::{ConfigError, Result};
pub use factory::build_runner;
pub use schema::RunnerConfig;
