//! End-to-end translation scenarios.

use pgcypher_common::utils::error::ErrorKind;
use pgcypher_engine::{Config, Translator, translate};

fn assert_translates(cypher: &str, expected: &str) {
    let result = translate(cypher).unwrap_or_else(|e| panic!("{cypher}: {e}"));
    assert_eq!(result.value, expected, "{cypher}");
    assert!(result.parameters.is_empty());
}

#[test]
fn test_single_node() {
    assert_translates(
        "match (s) return s",
        "with s as (select * from node s) select * from s",
    );
}

#[test]
fn test_single_node_with_predicate() {
    assert_translates(
        "match (s) where s.name = '1234' return s",
        "with s as (select * from node s where s.properties -> 'name' = '1234') select * from s",
    );
}

#[test]
fn test_predicates_split_across_nodes() {
    assert_translates(
        "match (s), (e) where s.name = '1234' and e.other = 1234 return s",
        "with s as (select * from node s where s.properties -> 'name' = '1234'), \
         e as (select * from node e where e.properties -> 'other' = 1234) select * from s",
    );
}

#[test]
fn test_unconstrained_node_still_declared() {
    assert_translates(
        "match (s), (e) where s.name = '1234' return s",
        "with s as (select * from node s where s.properties -> 'name' = '1234'), \
         e as (select * from node e) select * from s",
    );
}

#[test]
fn test_cross_binding_predicate_waits_for_both() {
    assert_translates(
        "match (s:A), (e:B) where s.name = e.name return s, e",
        "with s as (select * from node s), \
         e as (select * from node e, s where s.properties -> 'name' = e.properties -> 'name') \
         select * from s, e",
    );
}

#[test]
fn test_bindings_persist_across_match_clauses() {
    assert_translates(
        "match (n), (k) where n.name = '1234' and k.name = '1234' \
         match (e) where e.name = n.name return k, e",
        "with n as (select * from node n where n.properties -> 'name' = '1234'), \
         k as (select * from node k where k.properties -> 'name' = '1234'), \
         e as (select * from node e, n where e.properties -> 'name' = n.properties -> 'name') \
         select * from k, e",
    );
}

#[test]
fn test_anonymous_endpoints() {
    assert_translates(
        "match ()-[r]->() return r",
        "with r as (select * from edge r) select * from r",
    );
}

#[test]
fn test_node_and_relationship_parts() {
    assert_translates(
        "match (n), ()-[r]->() return n, r",
        "with n as (select * from node n), r as (select * from edge r) select * from n, r",
    );
}

#[test]
fn test_two_relationship_parts() {
    assert_translates(
        "match ()-[r]->(), ()-[e]->() return r, e",
        "with r as (select * from edge r), e as (select * from edge e) select * from r, e",
    );
}

#[test]
fn test_relationship_predicate() {
    assert_translates(
        "match ()-[r]->() where r.value = 42 return r",
        "with r as (select * from edge r where r.properties -> 'value' = 42) select * from r",
    );
}

#[test]
fn test_start_node_join() {
    assert_translates(
        "match (n)-[r]->() where n.name = '123' return n, r",
        "with n as (select * from node n where n.properties -> 'name' = '123'), \
         r as (select * from edge r, n where n.id = r.start_id) select * from n, r",
    );
}

#[test]
fn test_full_hop() {
    assert_translates(
        "match (s)-[r]->(e) where s.name = '123' and e.name = '321' return s, r, e",
        "with s as (select * from node s where s.properties -> 'name' = '123'), \
         r as (select * from edge r, s where s.id = r.start_id), \
         e as (select * from node e, r where e.id = r.end_id and e.properties -> 'name' = '321') \
         select * from s, r, e",
    );
}

#[test]
fn test_negated_property_and_hop() {
    assert_translates(
        "match (f), (s)-[r]->(e) where not f.bool_field and s.name = '123' and e.name = '321' \
         return f, s, r, e",
        "with f as (select * from node f where not f.properties -> 'bool_field'), \
         s as (select * from node s where s.properties -> 'name' = '123'), \
         r as (select * from edge r, s where s.id = r.start_id), \
         e as (select * from node e, r where e.id = r.end_id and e.properties -> 'name' = '321') \
         select * from f, s, r, e",
    );
}

#[test]
fn test_inbound_hop() {
    assert_translates(
        "match (e)<-[r]-(s) return s, r, e",
        "with s as (select * from node s), \
         r as (select * from edge r, s where s.id = r.start_id), \
         e as (select * from node e, r where e.id = r.end_id) \
         select * from s, r, e",
    );
}

#[test]
fn test_disjunction_is_kept_whole() {
    assert_translates(
        "match (s), (e) where s.a = 1 or e.b = 2 return s",
        "with s as (select * from node s), \
         e as (select * from node e, s where s.properties -> 'a' = 1 or e.properties -> 'b' = 2) \
         select * from s",
    );
}

#[test]
fn test_config_override() {
    let translator = Translator::new(Config::default().with_node_table("vertex"));
    let result = translator
        .translate("match (s) where s.name = 'x' return s")
        .unwrap();
    assert_eq!(
        result.value,
        "with s as (select * from vertex s where s.properties -> 'name' = 'x') select * from s"
    );
}

#[test]
fn test_predicate_over_bindings_from_earlier_match() {
    assert_translates(
        "match (s) match (s) where s.name = 'x' return s",
        "with s as (select * from node s where s.properties -> 'name' = 'x') select * from s",
    );
}

#[test]
fn test_rebound_relationship_joins_new_endpoints() {
    assert_translates(
        "match (a)-[r]->(b) match (c)-[r]->(d) return c, d",
        "with a as (select * from node a), \
         r as (select * from edge r, a where a.id = r.start_id), \
         b as (select * from node b, r where b.id = r.end_id), \
         c as (select * from node c, r where c.id = r.start_id), \
         d as (select * from node d, r where d.id = r.end_id) select * from c, d",
    );
}

#[test]
fn test_long_arithmetic_chain() {
    let mut cypher = String::from("match (s) where s.a = 1");
    for _ in 0..100_000 {
        cypher.push_str(" + 1");
    }
    cypher.push_str(" return s");

    let result = translate(&cypher).unwrap_or_else(|e| panic!("{e}"));
    assert!(
        result
            .value
            .starts_with("with s as (select * from node s where s.properties -> 'a' = 1 + 1 + 1")
    );
    assert!(result.value.ends_with(" + 1) select * from s"));
}

#[test]
fn test_translation_errors() {
    let cases = [
        ("match ()-->() return 1", ErrorKind::MissingBinding),
        ("match (s) return x", ErrorKind::MissingBinding),
        ("match (a)-[r*]->(b) return a", ErrorKind::UnsupportedConstruct),
        ("match (s) where s.name = $name return s", ErrorKind::UnsupportedConstruct),
        ("match (s) where s.tags = [1, 2] return s", ErrorKind::UnsupportedConstruct),
        ("match (s) where size(s.name) = 1 return s", ErrorKind::UnsupportedConstruct),
        ("match (s) where return s", ErrorKind::Syntax),
        ("return s", ErrorKind::Syntax),
    ];
    let too_deep = format!("match (s) where {}s.a = 1 return s", "not ".repeat(10_000));

    assert_eq!(translate(&too_deep).unwrap_err().kind(), ErrorKind::Syntax);

    for (cypher, kind) in cases {
        match translate(cypher) {
            Ok(result) => panic!("{cypher}: expected {kind:?}, got {}", result.value),
            Err(err) => assert_eq!(err.kind(), kind, "{cypher}: {err}"),
        }
    }
}

#[test]
fn test_translation_is_deterministic() {
    let cypher = "match (f), (s)-[r]->(e) where f.x = s.y and e.z = 3 and s.w = 1 return f, e";
    let first = translate(cypher).unwrap();
    for _ in 0..8 {
        assert_eq!(translate(cypher).unwrap(), first);
    }
}
