//! Quire - workspace panels without the UI
//!
//! The document list, PDF library, template instantiation and the formula
//! assistant of the Quire desktop suite, as plain state containers that a
//! rendering layer drives through method calls.

pub mod ai;
pub mod config;
pub mod error;
pub mod store;
pub mod templates;

pub use error::{Error, Result};
