//! Property-based tests for fragmentation and statement assembly.

use std::collections::BTreeSet;

use pgcypher_common::utils::error::{Error, Slot};
use pgcypher_core::format::format_expression;
use pgcypher_core::model::{Literal, Operator, SetExpression, Statement};
use pgcypher_core::tree::{ExpressionTree, NodeKind};
use pgcypher_engine::{dependency_key, translate, translate_query};
use proptest::prelude::*;

const BINDINGS: [&str; 3] = ["a", "b", "c"];

/// One side of a comparison: a property of some binding, or an integer.
#[derive(Debug, Clone)]
enum Operand {
    Property(&'static str, String),
    Constant(i64),
}

impl Operand {
    fn binding(&self) -> Option<&'static str> {
        match self {
            Operand::Property(binding, _) => Some(*binding),
            Operand::Constant(_) => None,
        }
    }

    fn render(&self) -> String {
        match self {
            Operand::Property(binding, name) => format!("{binding}.{name}"),
            Operand::Constant(value) => value.to_string(),
        }
    }
}

fn arb_operand() -> impl Strategy<Value = Operand> {
    prop_oneof![
        3 => (prop::sample::select(BINDINGS.to_vec()), "p_[a-z]{1,5}")
            .prop_map(|(binding, name)| Operand::Property(binding, name)),
        1 => (0i64..1000).prop_map(Operand::Constant),
    ]
}

fn arb_comparisons() -> impl Strategy<Value = Vec<(Operand, Operand)>> {
    prop::collection::vec((arb_operand(), arb_operand()), 1..8)
}

fn where_text(comparisons: &[(Operand, Operand)]) -> String {
    comparisons
        .iter()
        .map(|(left, right)| format!("{} = {}", left.render(), right.render()))
        .collect::<Vec<_>>()
        .join(" and ")
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_filled_slot_rejects_second_write(extra in 1usize..4) {
        let mut tree = ExpressionTree::new();
        let target = tree.add(NodeKind::Binary { left: None, operator: None, right: None });
        let operator = tree.add_operator(Operator::Equals);
        tree.assign(target, operator).unwrap();

        for _ in 0..2 {
            let operand = tree.add(NodeKind::Literal(Literal::new(1i64.into())));
            tree.assign(target, operand).unwrap();
        }
        for _ in 0..extra {
            let operand = tree.add(NodeKind::Literal(Literal::new(2i64.into())));
            prop_assert!(matches!(
                tree.assign(target, operand),
                Err(Error::SlotAlreadyAssigned(Slot::Operand))
            ));
            let operator = tree.add_operator(Operator::And);
            prop_assert!(matches!(
                tree.assign(target, operator),
                Err(Error::SlotAlreadyAssigned(Slot::Operator))
            ));
        }
        prop_assert!(tree.export(target).is_ok());
    }

    #[test]
    fn prop_dependency_key_ignores_order(
        bindings in prop::collection::vec("[a-e]", 0..6).prop_shuffle(),
        shuffled_seed in any::<u64>(),
    ) {
        let mut reordered = bindings.clone();
        let rotation = usize::try_from(shuffled_seed).unwrap_or(0) % reordered.len().max(1);
        reordered.rotate_left(rotation);
        reordered.reverse();

        prop_assert_eq!(
            dependency_key(bindings.iter().map(String::as_str)),
            dependency_key(reordered.iter().map(String::as_str))
        );
    }

    #[test]
    fn prop_every_predicate_lands_in_exactly_one_cte(comparisons in arb_comparisons()) {
        let cypher = format!(
            "match (a), (b), (c) where {} return a",
            where_text(&comparisons)
        );
        let query = pgcypher_adapters::query::cypher::parse(&cypher).unwrap();
        let Statement::Query(statement) = translate_query(&query).unwrap() else {
            panic!("expected a query statement");
        };
        let ctes = statement.common_table_expressions.unwrap().expressions;
        prop_assert_eq!(ctes.len(), BINDINGS.len());

        let mut attached = 0;
        let mut declared = BTreeSet::new();
        for cte in &ctes {
            let SetExpression::Select(select) = &cte.query.body else {
                panic!("expected a select body");
            };
            let alias = cte.alias.name.as_str();

            // No CTE reads from one declared after it.
            for entry in select.from.iter().skip(1) {
                let name = entry.relation.name.root().unwrap_or_default();
                prop_assert!(declared.contains(name), "{} reads {} early", alias, name);
            }
            declared.insert(alias);

            if let Some(predicate) = &select.where_clause {
                let text = format_expression(predicate).unwrap().value;
                attached += text.matches(" and ").count() + 1;
            }
        }
        prop_assert_eq!(attached, comparisons.len());
    }

    #[test]
    fn prop_predicate_sits_with_its_last_binding(comparisons in arb_comparisons()) {
        let cypher = format!(
            "match (a), (b), (c) where {} return a",
            where_text(&comparisons)
        );
        let sql = translate(&cypher).unwrap().value;

        for (left, right) in &comparisons {
            let last = [left.binding(), right.binding()]
                .into_iter()
                .flatten()
                .max_by_key(|binding| BINDINGS.iter().position(|b| b == binding))
                .unwrap_or("a");
            let fragment = format!(
                "{} = {}",
                render_sql(left),
                render_sql(right)
            );
            let cte_start = sql.find(&format!("{last} as (")).unwrap();
            let cte_end = sql[cte_start..].find(')').map(|end| cte_start + end).unwrap();
            prop_assert!(
                sql[cte_start..cte_end].contains(&fragment),
                "{} missing from {} in {}", fragment, last, sql
            );
        }
    }

    #[test]
    fn prop_translation_is_deterministic(comparisons in arb_comparisons()) {
        let cypher = format!(
            "match (c), (a)-[r]->(b) where {} return a, r",
            where_text(&comparisons)
        );
        let first = translate(&cypher).unwrap();
        let second = translate(&cypher).unwrap();
        prop_assert_eq!(first, second);
    }
}

fn render_sql(operand: &Operand) -> String {
    match operand {
        Operand::Property(binding, name) => format!("{binding}.properties -> '{name}'"),
        Operand::Constant(value) => value.to_string(),
    }
}
