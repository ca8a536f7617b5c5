//! Core type definitions for pgcypher.
//!
//! - Scalar values ([`Value`]) used by literals on both sides of a translation
//!   and by the parameter map handed to the database driver.

mod value;

pub use value::Value;
