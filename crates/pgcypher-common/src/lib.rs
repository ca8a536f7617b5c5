//! # pgcypher-common
//!
//! Foundation layer for pgcypher: scalar values and the shared error type.
//!
//! Every other pgcypher crate depends on this one. It has no internal
//! dependencies and should be kept minimal.
//!
//! ## Modules
//!
//! - [`types`] - Scalar values carried by literals and query parameters
//! - [`utils`] - Utility functions and helpers (errors)

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod types;
pub mod utils;

// Re-export commonly used types at crate root
pub use types::Value;
pub use utils::error::{Error, ErrorKind, Result};
