//! Query language parsers.

pub mod cypher;
