//! Three-store joins on SQLite: inner joins, windows, counts, comparisons, self-joins.

mod common;

use std::sync::Arc;

use common::*;
use daojoin::prelude::*;

type ThreeWay = JoinChain<JoinResult<JoinResult<Option<NamedRecord>, KeyRecord>, NamedRecord>>;

/// dao1 = dao2 on JoinField, then dao3 = `third_on` on JoinField.
fn inner_chain(f: &Fixture, third_on: &ClassMapping) -> ThreeWay {
    JoinChain::begin(&f.dao1, None, None)
        .join(
            &f.dao2,
            JoinCriteria::inner().on(JoinExpression::equal(f.dao1.mapping(), "JoinField", "JoinField")),
        )
        .unwrap()
        .join(
            &f.dao3,
            JoinCriteria::inner().on(JoinExpression::equal(third_on, "JoinField", "JoinField")),
        )
        .unwrap()
}

fn by_first_id(f: &Fixture) -> Vec<JoinSortOrder> {
    vec![JoinSortOrder::asc(f.dao1.mapping(), "ID")]
}

fn by_all_ids(f: &Fixture) -> Vec<JoinSortOrder> {
    vec![
        JoinSortOrder::asc(f.dao1.mapping(), "ID"),
        JoinSortOrder::asc(f.dao2.mapping(), "ID"),
        JoinSortOrder::asc(f.dao3.mapping(), "ID"),
    ]
}

#[test]
fn test_inner_join_equals() {
    let f = fixture();
    let chain = inner_chain(&f, f.dao1.mapping());
    let rows = chain.get(&by_first_id(&f), Window::all()).unwrap();

    let expected = expect(&[Some("one"), Some("two"), Some("three")]);
    assert_eq!(join_fields(&rows), (expected.clone(), expected.clone(), expected));
    assert_eq!(chain.count().unwrap(), 3);
}

#[test]
fn test_records_are_fully_materialized() {
    let f = fixture();
    let rows = inner_chain(&f, f.dao1.mapping())
        .get(&by_first_id(&f), Window::all())
        .unwrap();

    let first = &rows[0];
    assert_eq!(
        first.left.left,
        Some(NamedRecord {
            id: 1,
            join_field: "one".into(),
            name: Some("Bob".into()),
        })
    );
    assert_eq!(
        first.left.right,
        Some(KeyRecord {
            id: 1,
            join_field: "one".into(),
        })
    );
    // dao3 has no names; the null column leaves the field at its default.
    assert_eq!(first.right.as_ref().map(|c| c.name.clone()), Some(None));
}

#[test]
fn test_join_start() {
    let f = fixture();
    let rows = inner_chain(&f, f.dao2.mapping())
        .get(&by_first_id(&f), Window::new(1, None))
        .unwrap();
    let expected = expect(&[Some("two"), Some("three")]);
    assert_eq!(join_fields(&rows), (expected.clone(), expected.clone(), expected));
}

#[test]
fn test_join_limit() {
    let f = fixture();
    let rows = inner_chain(&f, f.dao2.mapping())
        .get(&by_first_id(&f), Window::new(0, Some(2)))
        .unwrap();
    let expected = expect(&[Some("one"), Some("two")]);
    assert_eq!(join_fields(&rows), (expected.clone(), expected.clone(), expected));
}

#[test]
fn test_join_start_limit_is_second_row() {
    let f = fixture();
    let chain = inner_chain(&f, f.dao2.mapping());
    let all = chain.get(&by_first_id(&f), Window::all()).unwrap();
    let window = chain.get(&by_first_id(&f), Window::new(1, Some(1))).unwrap();

    assert_eq!(window.len(), 1);
    assert_eq!(window[0], all[1]);
    assert_eq!(join_fields(&window).0, expect(&[Some("two")]));
}

#[test]
fn test_zero_limit_reads_nothing() {
    let f = fixture();
    let rows = inner_chain(&f, f.dao2.mapping())
        .get(&by_first_id(&f), Window::new(0, Some(0)))
        .unwrap();
    assert!(rows.is_empty());
    // The pooled query went back after the execute.
    assert_eq!(f.source.pool().idle(), 1);
}

#[test]
fn test_sort_descending() {
    let f = fixture();
    let rows = inner_chain(&f, f.dao1.mapping())
        .get(&[JoinSortOrder::desc(f.dao1.mapping(), "ID")], Window::all())
        .unwrap();
    assert_eq!(
        join_fields(&rows).0,
        expect(&[Some("three"), Some("two"), Some("one")])
    );
}

#[test]
fn test_root_criteria_filters_rows() {
    let f = fixture();
    let criteria = DaoCriteria::with(Expression::in_list("JoinField", ["one", "three", "four"]));
    let chain = JoinChain::begin(&f.dao1, Some(criteria), None)
        .join(
            &f.dao2,
            JoinCriteria::inner().on(JoinExpression::equal(f.dao1.mapping(), "JoinField", "JoinField")),
        )
        .unwrap();

    let rows = chain.get(&by_first_id(&f), Window::all()).unwrap();
    let firsts: Vec<_> = rows
        .iter()
        .map(|r| r.left.as_ref().map(|a| a.join_field.as_str()))
        .collect();
    assert_eq!(firsts, [Some("one"), Some("three")]);
    assert_eq!(chain.count().unwrap(), 2);
}

#[test]
fn test_joined_store_criteria_filters_rows() {
    let f = fixture();
    let chain = JoinChain::begin(&f.dao1, None, None)
        .join(
            &f.dao2,
            JoinCriteria::inner()
                .on(JoinExpression::equal(f.dao1.mapping(), "JoinField", "JoinField"))
                .filter(Expression::greater("ID", 1)),
        )
        .unwrap();
    assert_eq!(chain.count().unwrap(), 2);
}

#[test]
fn test_inner_join_with_value_expression() {
    let f = fixture();
    let chain = JoinChain::begin(&f.dao1, None, None)
        .join(
            &f.dao2,
            JoinCriteria::inner()
                .on(JoinExpression::equal(f.dao1.mapping(), "JoinField", "JoinField"))
                .on(JoinExpression::value_equal(f.dao1.mapping(), "Name", "Bob")),
        )
        .unwrap()
        .join(
            &f.dao3,
            JoinCriteria::inner().on(JoinExpression::equal(f.dao2.mapping(), "JoinField", "JoinField")),
        )
        .unwrap();

    let rows = chain.get(&by_first_id(&f), Window::all()).unwrap();
    let expected = expect(&[Some("one")]);
    assert_eq!(join_fields(&rows), (expected.clone(), expected.clone(), expected));
    assert_eq!(chain.count().unwrap(), 1);
}

#[test]
fn test_inner_join_lesser() {
    let f = fixture();
    let chain = JoinChain::begin(&f.dao1, None, None)
        .join(
            &f.dao2,
            JoinCriteria::inner().on(JoinExpression::lesser(f.dao1.mapping(), "JoinField", "JoinField")),
        )
        .unwrap()
        .join(
            &f.dao3,
            JoinCriteria::left_outer().on(JoinExpression::equal(f.dao2.mapping(), "JoinField", "JoinField")),
        )
        .unwrap();

    let rows = chain.get(&by_all_ids(&f), Window::all()).unwrap();
    let seconds = expect(&[
        Some("two"),
        Some("three"),
        Some("two"),
        Some("one"),
        Some("two"),
        Some("three"),
        Some("one"),
        Some("two"),
        Some("three"),
    ]);
    assert_eq!(
        join_fields(&rows),
        (
            expect(&[
                Some("one"),
                Some("one"),
                Some("three"),
                Some("four"),
                Some("four"),
                Some("four"),
                Some("five"),
                Some("five"),
                Some("five"),
            ]),
            seconds.clone(),
            seconds,
        )
    );
}

#[test]
fn test_flipped_expression_matches_same_rows() {
    let f = fixture();
    let greater = JoinExpression::greater(f.dao1.mapping(), "JoinField", "JoinField");
    let count = |expr: JoinExpression| {
        JoinChain::begin(&f.dao1, None, None)
            .join(&f.dao2, JoinCriteria::inner().on(expr))
            .unwrap()
            .count()
            .unwrap()
    };
    assert_eq!(count(greater.clone()), count(greater.flip()));
    assert!(count(greater.clone()) > 0);
    // Inverting `>` must not match the pairs `>` matched.
    assert_eq!(count(greater.clone()) + count(greater.invert()), 25);
}

#[test]
fn test_self_join() {
    let f = fixture();
    let chain = JoinChain::begin(&f.dao1, None, Some("Person"))
        .join(
            &f.dao1,
            JoinCriteria::inner().alias("Doppleganger").on(
                JoinExpression::equal(f.dao1.mapping(), "Name", "JoinField").with_alias("Person"),
            ),
        )
        .unwrap()
        .join(
            &f.dao1,
            JoinCriteria::inner().alias("other person").on(
                JoinExpression::equal(f.dao1.mapping(), "JoinField", "JoinField")
                    .with_alias("Doppleganger"),
            ),
        )
        .unwrap();

    let orders = [JoinSortOrder::asc(f.dao1.mapping(), "ID").with_alias("Person")];
    let rows = chain.get(&orders, Window::all()).unwrap();
    assert_eq!(
        join_fields(&rows),
        (
            expect(&[Some("three")]),
            expect(&[Some("five")]),
            expect(&[Some("five")]),
        )
    );
    assert_eq!(
        chain.aliases().collect::<Vec<_>>(),
        ["Person", "Doppleganger", "other person"]
    );
}

#[test]
fn test_get_in_transaction() {
    let f = fixture();
    let chain = inner_chain(&f, f.dao1.mapping());
    {
        let tx = f.transport.transaction().unwrap();
        tx.execute_batch("DELETE FROM dao3 WHERE id = 2").unwrap();

        let rows = chain.get_in(&tx, &by_first_id(&f), Window::all()).unwrap();
        assert_eq!(join_fields(&rows).2, expect(&[Some("one"), Some("three")]));
        assert_eq!(chain.count_in(&tx).unwrap(), 2);
    }
    // Dropped without commit.
    assert_eq!(chain.count().unwrap(), 3);
}

#[test]
fn test_default_path_fails_fast_while_transaction_open() {
    let f = fixture();
    let chain = inner_chain(&f, f.dao1.mapping());
    let tx = f.transport.transaction().unwrap();

    let err = chain.count().unwrap_err();
    assert!(matches!(err, DaoError::Execution { .. }));
    assert!(err.to_string().contains("use get_in/count_in"), "{}", err);
    assert!(chain.get(&by_first_id(&f), Window::all()).is_err());

    assert_eq!(chain.count_in(&tx).unwrap(), 3);
    drop(tx);
    assert_eq!(chain.count().unwrap(), 3);
}

#[test]
fn test_self_join_matches_distinct_tables() {
    let f = fixture();
    f.transport
        .execute_batch(
            "CREATE TABLE dao1_twin AS SELECT * FROM dao1;
             CREATE TABLE dao1_triplet AS SELECT * FROM dao1;",
        )
        .unwrap();
    let twin = Store::new(Arc::clone(&f.source), named_records("dao1_twin")).unwrap();
    let triplet = Store::new(Arc::clone(&f.source), named_records("dao1_triplet")).unwrap();

    let self_joined = JoinChain::begin(&f.dao1, None, Some("Person"))
        .join(
            &f.dao1,
            JoinCriteria::inner().alias("Doppleganger").on(
                JoinExpression::equal(f.dao1.mapping(), "Name", "JoinField").with_alias("Person"),
            ),
        )
        .unwrap()
        .join(
            &f.dao1,
            JoinCriteria::inner().alias("other person").on(
                JoinExpression::equal(f.dao1.mapping(), "JoinField", "JoinField")
                    .with_alias("Doppleganger"),
            ),
        )
        .unwrap();
    let distinct = JoinChain::begin(&f.dao1, None, None)
        .join(
            &twin,
            JoinCriteria::inner().on(JoinExpression::equal(f.dao1.mapping(), "Name", "JoinField")),
        )
        .unwrap()
        .join(
            &triplet,
            JoinCriteria::inner().on(JoinExpression::equal(twin.mapping(), "JoinField", "JoinField")),
        )
        .unwrap();

    let self_rows = self_joined
        .get(&[JoinSortOrder::asc(f.dao1.mapping(), "ID").with_alias("Person")], Window::all())
        .unwrap();
    let distinct_rows = distinct.get(&by_first_id(&f), Window::all()).unwrap();
    assert!(!self_rows.is_empty());
    assert_eq!(self_rows, distinct_rows);
    assert_eq!(self_joined.count().unwrap(), distinct.count().unwrap());
}
