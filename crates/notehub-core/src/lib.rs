//! # notehub-core
//!
//! Core crate for Notehub. Contains configuration schemas and the
//! unified error system shared by the hub and the client.
//!
//! This crate has **no** internal dependencies on other Notehub crates.

pub mod config;
pub mod error;
pub mod result;

pub use error::AppError;
pub use result::AppResult;
