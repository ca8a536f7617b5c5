use pgcypher_adapters::query::cypher::{self, Lexer, TokenKind, ast};
use proptest::prelude::*;

fn arb_property() -> impl Strategy<Value = String> {
    ("[a-c]", "p_[a-z]{1,6}").prop_map(|(var, prop)| format!("{var}.{prop}"))
}

fn arb_literal() -> impl Strategy<Value = String> {
    prop_oneof![
        any::<i32>().prop_map(|i| i.to_string()),
        "[a-z0-9 ]{0,8}".prop_map(|s| format!("'{s}'")),
        Just("true".to_string()),
        Just("null".to_string()),
    ]
}

fn arb_comparison() -> impl Strategy<Value = String> {
    (
        arb_property(),
        prop::sample::select(vec!["=", "<>", "<", "<=", ">", ">="]),
        prop_oneof![arb_literal(), arb_property()],
    )
        .prop_map(|(left, op, right)| format!("{left} {op} {right}"))
}

proptest! {
    #[test]
    fn prop_lexer_always_reaches_eof(input in ".{0,64}") {
        let mut lexer = Lexer::new(&input);
        let mut steps = 0;
        loop {
            let token = lexer.next_token();
            if token.kind == TokenKind::Eof {
                break;
            }
            prop_assert!(token.span.end > token.span.start);
            steps += 1;
            prop_assert!(steps <= input.len());
        }
    }

    #[test]
    fn prop_parser_never_panics(input in "[a-z()\\[\\]<>=:,.' -]{0,48}") {
        let _ = cypher::parse(&input);
    }

    #[test]
    fn prop_conjunction_keeps_every_operand(
        comparisons in prop::collection::vec(arb_comparison(), 2..6)
    ) {
        let text = format!(
            "match (a), (b), (c) where {} return a",
            comparisons.join(" and ")
        );
        let query = cypher::parse(&text).unwrap();
        let where_clause = query.match_clauses[0].where_clause.as_ref().unwrap();
        match &where_clause.expressions[0] {
            ast::Expression::Conjunction(operands) => {
                prop_assert_eq!(operands.len(), comparisons.len());
                for operand in operands {
                    prop_assert!(matches!(operand, ast::Expression::Comparison(_)), "expected a comparison operand");
                }
            }
            other => prop_assert!(false, "expected conjunction, got {:?}", other),
        }
    }
}
