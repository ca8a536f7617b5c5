//! Cypher to PostgreSQL translator.
//!
//! Lowers a Cypher query into a chain of common table expressions, one per
//! bound node or relationship, in the order the bindings appear:
//!
//! ```text
//! match (s)-[r]->(e) where s.name = '123' return s, r, e
//!
//! with s as (select * from node s where s.properties -> 'name' = '123'),
//!      r as (select * from edge r, s where s.id = r.start_id),
//!      e as (select * from node e, r where e.id = r.end_id)
//! select * from s, r, e
//! ```
//!
//! Each `WHERE` predicate is split into fragments by the bindings it
//! references. A fragment is attached to the first CTE after which all of
//! its bindings exist, and the other bindings it names join that CTE's
//! `from` list, so no CTE refers to one declared after it.

use std::collections::BTreeSet;

use hashbrown::{HashMap, HashSet};
use pgcypher_adapters::query::cypher::{self, ast};
use pgcypher_common::utils::error::{Error, Result};
use pgcypher_core::format::{FormattedQuery, format_statement};
use pgcypher_core::model::{
    CommonTableExpression, Expression, FromClause, Operator, Query, Select, SetExpression,
    Statement, SyntaxNode, TableAlias, TableReference, With,
};

use super::expression::translate_to_tree;
use super::fold::{Fragment, FragmentMap, fragment_tree};
use crate::config::Config;

/// Translates a Cypher query string to formatted SQL with the default
/// configuration.
///
/// # Errors
///
/// Returns an error if the query cannot be parsed or translated.
pub fn translate(query: &str) -> Result<FormattedQuery> {
    Translator::default().translate(query)
}

/// Translates a parsed Cypher query to a relational statement with the
/// default configuration.
pub fn translate_query(query: &ast::Query) -> Result<Statement> {
    Translator::default().translate_query(query)
}

/// Translates a Cypher expression to a relational expression with the
/// default configuration.
pub fn translate_expression(expression: &ast::Expression) -> Result<Expression> {
    Translator::default().translate_expression(expression)
}

/// Translator from Cypher to PostgreSQL.
///
/// Holds only configuration; every call builds its own state, so one
/// translator can serve any number of queries.
#[derive(Debug, Clone, Default)]
pub struct Translator {
    config: Config,
}

impl Translator {
    /// Creates a translator with the given configuration.
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// The configuration in use.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Parses, translates and formats a Cypher query.
    pub fn translate(&self, query: &str) -> Result<FormattedQuery> {
        let parsed = cypher::parse(query)?;
        let statement = self.translate_query(&parsed)?;
        format_statement(&statement)
    }

    /// Translates a parsed Cypher query.
    pub fn translate_query(&self, query: &ast::Query) -> Result<Statement> {
        let mut assembly = Assembly::new(&self.config);
        for (index, clause) in query.match_clauses.iter().enumerate() {
            tracing::debug!(clause = index, patterns = clause.patterns.len(), "lowering match clause");
            let fragments = match &clause.where_clause {
                Some(where_clause) => self.where_fragments(where_clause)?,
                None => Vec::new(),
            };
            assembly.match_clause(clause, fragments)?;
        }
        assembly.finish(&query.return_clause)
    }

    /// Translates a single Cypher expression.
    pub fn translate_expression(&self, expression: &ast::Expression) -> Result<Expression> {
        let (tree, root) = translate_to_tree(expression, &self.config)?;
        tree.export(root)
    }

    /// Translates a Cypher predicate and splits it into fragments by the
    /// bindings each part references.
    pub fn fragment(&self, expression: &ast::Expression) -> Result<FragmentMap> {
        let (mut tree, root) = translate_to_tree(expression, &self.config)?;
        fragment_tree(&mut tree, root)
    }

    fn where_fragments(&self, where_clause: &ast::WhereClause) -> Result<Vec<Fragment>> {
        let map = match where_clause.expressions.as_slice() {
            [] => return Ok(Vec::new()),
            [expression] => self.fragment(expression)?,
            expressions => {
                self.fragment(&ast::Expression::Conjunction(expressions.to_vec()))?
            }
        };
        Ok(map.into_fragments())
    }
}

/// An equality between a node identity and an edge endpoint column.
struct JoinConstraint {
    node: String,
    edge: String,
    expression: Expression,
}

/// Statement assembly state for one query.
struct Assembly<'c> {
    config: &'c Config,
    bindings: HashSet<String>,
    /// Index into `ctes` of the CTE declaring each binding.
    positions: HashMap<String, usize>,
    ctes: Vec<CommonTableExpression>,
    /// Fragments of the current clause not yet attached.
    pending: Vec<Option<Fragment>>,
}

impl<'c> Assembly<'c> {
    fn new(config: &'c Config) -> Self {
        Self {
            config,
            bindings: HashSet::new(),
            positions: HashMap::new(),
            ctes: Vec::new(),
            pending: Vec::new(),
        }
    }

    fn match_clause(&mut self, clause: &ast::MatchClause, fragments: Vec<Fragment>) -> Result<()> {
        self.pending = fragments.into_iter().map(Some).collect();

        for part in &clause.patterns {
            self.pattern_part(part)?;
        }

        // Fragments over bindings declared by earlier clauses only.
        for fragment in std::mem::take(&mut self.pending).into_iter().flatten() {
            if let Some(unbound) = fragment
                .dependencies
                .iter()
                .find(|dependency| !self.bindings.contains(*dependency))
            {
                return Err(Error::missing_binding(format!(
                    "predicate over '{}' references '{unbound}', which is never declared",
                    fragment.key
                )));
            }
            tracing::trace!(key = %fragment.key, "attaching fragment to an earlier binding");
            self.attach(fragment.expression, fragment.dependencies.into_iter().collect())?;
        }
        Ok(())
    }

    fn pattern_part(&mut self, part: &ast::PatternPart) -> Result<()> {
        if part.binding.is_some() {
            return Err(Error::unsupported("pattern_part", "path bindings"));
        }

        let mut elements = part.elements.iter();
        let Some(ast::PatternElement::Node(first)) = elements.next() else {
            return Err(Error::invalid_shape("pattern must start with a node"));
        };

        let mut left = first;
        let mut hops = 0;
        while let Some(element) = elements.next() {
            let (ast::PatternElement::Relationship(relationship), Some(ast::PatternElement::Node(right))) =
                (element, elements.next())
            else {
                return Err(Error::invalid_shape(
                    "pattern must alternate between nodes and relationships",
                ));
            };
            self.hop(left, relationship, right)?;
            left = right;
            hops += 1;
        }

        if hops == 0 {
            let Some(binding) = &first.binding else {
                return Err(Error::missing_binding("expected node binding"));
            };
            if !self.bindings.contains(binding) {
                let config = self.config;
                self.emit(&config.node_table, binding, Vec::new());
            }
        }
        Ok(())
    }

    fn hop(
        &mut self,
        left: &ast::NodePattern,
        relationship: &ast::RelationshipPattern,
        right: &ast::NodePattern,
    ) -> Result<()> {
        if relationship.range.is_some() {
            return Err(Error::unsupported(
                "relationship_pattern",
                "variable-length relationships",
            ));
        }
        let (start, end) = match relationship.direction {
            ast::Direction::Outbound => (left, right),
            ast::Direction::Inbound => (right, left),
            ast::Direction::Both => {
                return Err(Error::unsupported(
                    "relationship_pattern",
                    "undirected relationships",
                ));
            }
        };
        let Some(edge) = &relationship.binding else {
            return Err(Error::missing_binding("expected relationship binding"));
        };

        let config = self.config;

        // An already declared relationship only adds constraints on its
        // endpoints.
        if self.bindings.contains(edge) {
            for (node, column) in [
                (start, &config.start_id_column),
                (end, &config.end_id_column),
            ] {
                let Some(node) = &node.binding else {
                    continue;
                };
                let constraint = self.join_constraint(node, edge, column);
                if self.bindings.contains(node) {
                    let references = BTreeSet::from([constraint.node, constraint.edge]);
                    self.attach(constraint.expression, references)?;
                } else {
                    self.emit(&config.node_table, node, vec![constraint]);
                }
            }
            return Ok(());
        }

        let mut edge_constraints = Vec::new();

        if let Some(start) = &start.binding {
            if !self.bindings.contains(start) {
                self.emit(&config.node_table, start, Vec::new());
            }
            edge_constraints.push(self.join_constraint(start, edge, &config.start_id_column));
        }

        let end_bound = end
            .binding
            .as_ref()
            .is_some_and(|end| self.bindings.contains(end));
        if let (Some(end), true) = (&end.binding, end_bound) {
            edge_constraints.push(self.join_constraint(end, edge, &config.end_id_column));
        }

        self.emit(&config.edge_table, edge, edge_constraints);

        if let (Some(end), false) = (&end.binding, end_bound) {
            let constraint = self.join_constraint(end, edge, &config.end_id_column);
            self.emit(&config.node_table, end, vec![constraint]);
        }
        Ok(())
    }

    /// `<node>.id = <edge>.<edge_column>`
    fn join_constraint(&self, node: &str, edge: &str, edge_column: &str) -> JoinConstraint {
        JoinConstraint {
            node: node.to_string(),
            edge: edge.to_string(),
            expression: Expression::binary(
                Expression::compound([node, self.config.id_column.as_str()]),
                Operator::Equals,
                Expression::compound([edge, edge_column]),
            ),
        }
    }

    /// Declares `binding` as a CTE over `table`, with the join constraints
    /// first and then every pending fragment whose bindings now all exist.
    fn emit(&mut self, table: &str, binding: &str, constraints: Vec<JoinConstraint>) {
        tracing::debug!(binding, table, "emitting common table expression");
        self.bindings.insert(binding.to_string());

        let mut references = BTreeSet::new();
        let mut predicates = Vec::with_capacity(constraints.len());
        for constraint in constraints {
            references.insert(constraint.node);
            references.insert(constraint.edge);
            predicates.push(constraint.expression);
        }

        for slot in &mut self.pending {
            let ready = slot.as_ref().is_some_and(|fragment| {
                fragment
                    .dependencies
                    .iter()
                    .all(|dependency| self.bindings.contains(dependency))
            });
            if let Some(fragment) = slot.take_if(|_| ready) {
                tracing::trace!(key = %fragment.key, binding, "attaching fragment");
                references.extend(fragment.dependencies);
                predicates.push(fragment.expression);
            }
        }
        references.remove(binding);

        let from = std::iter::once(TableReference::new(table).with_binding(binding))
            .chain(references.into_iter().map(TableReference::new))
            .map(FromClause::new)
            .collect();

        let select = Select {
            projection: vec![Expression::Wildcard],
            from,
            where_clause: Expression::conjoin(predicates),
            ..Select::default()
        };

        self.positions.insert(binding.to_string(), self.ctes.len());
        self.ctes.push(CommonTableExpression {
            alias: TableAlias::new(binding),
            materialized: None,
            query: Query::new(SetExpression::Select(Box::new(select))),
        });
    }

    /// Adds `predicate` to an already emitted CTE: the one declaring the
    /// latest of `references`, or the last CTE for a constant predicate.
    /// The other references join that CTE's `from` list.
    fn attach(&mut self, predicate: Expression, references: BTreeSet<String>) -> Result<()> {
        let index = match references
            .iter()
            .map(|reference| {
                self.positions.get(reference).copied().ok_or_else(|| {
                    Error::missing_binding(format!("'{reference}' is never declared"))
                })
            })
            .collect::<Result<Vec<_>>>()?
            .into_iter()
            .max()
        {
            Some(index) => index,
            None => self
                .ctes
                .len()
                .checked_sub(1)
                .ok_or_else(|| Error::missing_binding("no binding to attach a predicate to"))?,
        };

        let cte = &mut self.ctes[index];
        let SetExpression::Select(select) = &mut cte.query.body else {
            return Err(Error::Internal(format!(
                "common table expression '{}' is not a select",
                cte.alias.name
            )));
        };

        for reference in references {
            let listed = reference == cte.alias.name
                || select
                    .from
                    .iter()
                    .any(|entry| entry.relation.name.root() == Some(reference.as_str()));
            if !listed {
                select.from.push(FromClause::new(TableReference::new(reference)));
            }
        }

        select.where_clause =
            Expression::conjoin(select.where_clause.take().into_iter().chain([predicate]));
        Ok(())
    }

    fn finish(self, return_clause: &ast::ReturnClause) -> Result<Statement> {
        let mut from = Vec::with_capacity(return_clause.items.len());
        for item in &return_clause.items {
            if item.alias.is_some() {
                return Err(Error::unsupported("return_item", "aliases"));
            }
            let ast::Expression::Variable(name) = &item.expression else {
                return Err(Error::unsupported(
                    item.expression.node_type(),
                    "return item",
                ));
            };
            if !self.bindings.contains(name) {
                return Err(Error::missing_binding(format!(
                    "returned variable '{name}' is not bound"
                )));
            }
            from.push(FromClause::new(TableReference::new(name.as_str())));
        }

        let body = Select {
            distinct: return_clause.distinct,
            projection: vec![Expression::Wildcard],
            from,
            ..Select::default()
        };

        let common_table_expressions = (!self.ctes.is_empty()).then(|| With {
            recursive: false,
            expressions: self.ctes,
        });

        Ok(Statement::Query(Query {
            common_table_expressions,
            body: SetExpression::Select(Box::new(body)),
        }))
    }
}
