//! Core error types for autorag-agent
//!
//! Every crate in the workspace converts its own failures into [`Error`] at
//! the tool boundary, so the dispatcher only ever deals with one taxonomy.

pub mod error;

pub use error::{Error, Result};
