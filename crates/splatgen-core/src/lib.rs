//! splatgen core - domain models, point-cloud formats, and configuration
//!
//! This crate contains the format decoder/encoders, the geometry builder,
//! and the shared domain types for the splatgen system.

pub mod config;
pub mod error;
pub mod formats;
pub mod geometry;
pub mod models;

pub use error::{Result, SplatError};
