//! Translation configuration.

use serde::{Deserialize, Serialize};

/// Names of the tables and columns the generated SQL targets.
///
/// Missing fields fall back to their defaults when deserializing, so a
/// configuration file only needs the names that differ.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Relation holding nodes.
    pub node_table: String,
    /// Relation holding relationships.
    pub edge_table: String,
    /// JSON column that property lookups read from.
    pub properties_column: String,
    /// Node identity column.
    pub id_column: String,
    /// Relationship column referencing the start node.
    pub start_id_column: String,
    /// Relationship column referencing the end node.
    pub end_id_column: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            node_table: "node".to_string(),
            edge_table: "edge".to_string(),
            properties_column: "properties".to_string(),
            id_column: "id".to_string(),
            start_id_column: "start_id".to_string(),
            end_id_column: "end_id".to_string(),
        }
    }
}

impl Config {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the node table.
    pub fn with_node_table(mut self, name: impl Into<String>) -> Self {
        self.node_table = name.into();
        self
    }

    /// Sets the edge table.
    pub fn with_edge_table(mut self, name: impl Into<String>) -> Self {
        self.edge_table = name.into();
        self
    }

    /// Sets the properties column.
    pub fn with_properties_column(mut self, name: impl Into<String>) -> Self {
        self.properties_column = name.into();
        self
    }

    /// Sets the node identity column.
    pub fn with_id_column(mut self, name: impl Into<String>) -> Self {
        self.id_column = name.into();
        self
    }

    /// Sets the start and end columns of the edge table.
    pub fn with_edge_columns(
        mut self,
        start_id_column: impl Into<String>,
        end_id_column: impl Into<String>,
    ) -> Self {
        self.start_id_column = start_id_column.into();
        self.end_id_column = end_id_column.into();
        self
    }
}
