//! Outer joins on SQLite. SQLite sorts nulls first in ascending order.

mod common;

use std::sync::Arc;

use common::*;
use daojoin::prelude::*;

fn by_all_ids(f: &Fixture) -> Vec<JoinSortOrder> {
    vec![
        JoinSortOrder::asc(f.dao1.mapping(), "ID"),
        JoinSortOrder::asc(f.dao2.mapping(), "ID"),
        JoinSortOrder::asc(f.dao3.mapping(), "ID"),
    ]
}

fn on_join_field(other: &ClassMapping) -> JoinExpression {
    JoinExpression::equal(other, "JoinField", "JoinField")
}

#[test]
fn test_left_outer_left_outer_join_equals() {
    let f = fixture();
    let chain = JoinChain::begin(&f.dao1, None, None)
        .join(&f.dao2, JoinCriteria::left_outer().on(on_join_field(f.dao1.mapping())))
        .unwrap()
        .join(&f.dao3, JoinCriteria::left_outer().on(on_join_field(f.dao1.mapping())))
        .unwrap();

    let rows = chain
        .get(&[JoinSortOrder::asc(f.dao1.mapping(), "ID")], Window::all())
        .unwrap();
    assert_eq!(
        join_fields(&rows),
        (
            expect(&[Some("one"), Some("two"), Some("three"), Some("four"), Some("five")]),
            expect(&[Some("one"), Some("two"), Some("three"), None, None]),
            expect(&[Some("one"), Some("two"), Some("three"), Some("four"), None]),
        )
    );
    assert_eq!(chain.count().unwrap(), 5);
}

#[test]
fn test_left_outer_left_inner_join_equals() {
    let f = fixture();
    let chain = JoinChain::begin(&f.dao1, None, None)
        .join(&f.dao2, JoinCriteria::left_outer().on(on_join_field(f.dao1.mapping())))
        .unwrap()
        .join(&f.dao3, JoinCriteria::inner().on(on_join_field(f.dao1.mapping())))
        .unwrap();

    let rows = chain
        .get(&[JoinSortOrder::asc(f.dao1.mapping(), "ID")], Window::all())
        .unwrap();
    assert_eq!(
        join_fields(&rows),
        (
            expect(&[Some("one"), Some("two"), Some("three"), Some("four")]),
            expect(&[Some("one"), Some("two"), Some("three"), None]),
            expect(&[Some("one"), Some("two"), Some("three"), Some("four")]),
        )
    );
}

#[test]
fn test_right_outer_right_outer_join_equals() {
    let f = fixture();
    let chain = JoinChain::begin(&f.dao1, None, None)
        .join(&f.dao2, JoinCriteria::right_outer().on(on_join_field(f.dao1.mapping())))
        .unwrap()
        .join(&f.dao3, JoinCriteria::right_outer().on(on_join_field(f.dao2.mapping())))
        .unwrap();

    let rows = chain.get(&by_all_ids(&f), Window::all()).unwrap();
    assert_eq!(
        join_fields(&rows),
        (
            expect(&[None, None, Some("one"), Some("two"), Some("three")]),
            expect(&[None, Some("5"), Some("one"), Some("two"), Some("three")]),
            expect(&[Some("four"), Some("5"), Some("one"), Some("two"), Some("three")]),
        )
    );
    assert!(rows[0].left.left.is_none());
}

#[test]
fn test_full_outer_full_outer_join_equals() {
    let f = fixture();
    let chain = JoinChain::begin(&f.dao1, None, None)
        .join(&f.dao2, JoinCriteria::full_outer().on(on_join_field(f.dao1.mapping())))
        .unwrap()
        .join(&f.dao3, JoinCriteria::full_outer().on(on_join_field(f.dao1.mapping())))
        .unwrap();

    let rows = chain.get(&by_all_ids(&f), Window::all()).unwrap();
    assert_eq!(
        join_fields(&rows),
        (
            expect(&[
                None,
                None,
                None,
                Some("one"),
                Some("two"),
                Some("three"),
                Some("four"),
                Some("five"),
            ]),
            expect(&[
                None,
                Some("4"),
                Some("5"),
                Some("one"),
                Some("two"),
                Some("three"),
                None,
                None,
            ]),
            expect(&[
                Some("5"),
                None,
                None,
                Some("one"),
                Some("two"),
                Some("three"),
                Some("four"),
                None,
            ]),
        )
    );
    assert_eq!(chain.count().unwrap(), 8);
}

#[test]
fn test_property_value_left_outer_join() {
    let f = fixture();
    let bob = || JoinExpression::value_equal(f.dao1.mapping(), "Name", "Bob");
    let orders = [JoinSortOrder::asc(f.dao1.mapping(), "ID")];

    let base = JoinChain::begin(&f.dao1, None, None)
        .join(
            &f.dao2,
            JoinCriteria::left_outer()
                .on(on_join_field(f.dao1.mapping()))
                .on(bob()),
        )
        .unwrap();

    let b_filtered = base
        .join(&f.dao3, JoinCriteria::left_outer().on(on_join_field(f.dao1.mapping())))
        .unwrap();
    let rows = b_filtered.get(&orders, Window::all()).unwrap();
    assert_eq!(
        join_fields(&rows),
        (
            expect(&[Some("one"), Some("two"), Some("three"), Some("four"), Some("five")]),
            expect(&[Some("one"), None, None, None, None]),
            expect(&[Some("one"), Some("two"), Some("three"), Some("four"), None]),
        )
    );

    // The earlier chain is still a valid base.
    let both_filtered = base
        .join(
            &f.dao3,
            JoinCriteria::left_outer()
                .on(on_join_field(f.dao1.mapping()))
                .on(bob()),
        )
        .unwrap();
    let rows = both_filtered.get(&orders, Window::all()).unwrap();
    assert_eq!(
        join_fields(&rows),
        (
            expect(&[Some("one"), Some("two"), Some("three"), Some("four"), Some("five")]),
            expect(&[Some("one"), None, None, None, None]),
            expect(&[Some("one"), None, None, None, None]),
        )
    );
}

#[test]
fn test_right_outer_left_outer_join_greater() {
    let f = fixture();
    let chain = JoinChain::begin(&f.dao1, None, None)
        .join(
            &f.dao2,
            JoinCriteria::right_outer()
                .on(JoinExpression::greater(f.dao1.mapping(), "JoinField", "JoinField")),
        )
        .unwrap()
        .join(&f.dao3, JoinCriteria::left_outer().on(on_join_field(f.dao2.mapping())))
        .unwrap();

    let rows = chain.get(&by_all_ids(&f), Window::all()).unwrap();
    assert_eq!(
        join_fields(&rows),
        (
            expect(&[
                None,
                Some("one"),
                Some("one"),
                Some("two"),
                Some("two"),
                Some("two"),
                Some("two"),
                Some("three"),
                Some("three"),
                Some("three"),
                Some("four"),
                Some("four"),
                Some("five"),
                Some("five"),
            ]),
            expect(&[
                Some("two"),
                Some("4"),
                Some("5"),
                Some("one"),
                Some("three"),
                Some("4"),
                Some("5"),
                Some("one"),
                Some("4"),
                Some("5"),
                Some("4"),
                Some("5"),
                Some("4"),
                Some("5"),
            ]),
            expect(&[
                Some("two"),
                None,
                Some("5"),
                Some("one"),
                Some("three"),
                None,
                Some("5"),
                Some("one"),
                None,
                Some("5"),
                None,
                Some("5"),
                None,
                Some("5"),
            ]),
        )
    );
    assert_eq!(chain.count().unwrap(), 14);
}

#[test]
fn test_outer_join_window() {
    let f = fixture();
    let chain = JoinChain::begin(&f.dao1, None, None)
        .join(&f.dao2, JoinCriteria::left_outer().on(on_join_field(f.dao1.mapping())))
        .unwrap();

    let rows = chain
        .get(&[JoinSortOrder::asc(f.dao1.mapping(), "ID")], Window::new(3, Some(5)))
        .unwrap();
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|r| r.left.is_some() && r.right.is_none()));
}

#[derive(Debug, Default, Clone, PartialEq)]
struct Tag {
    key: String,
    label: Option<String>,
}

#[test]
fn test_store_without_identity_is_absent_only_when_all_null() {
    let f = fixture();
    f.transport
        .execute_batch(
            "CREATE TABLE tag (key TEXT, label TEXT);
             INSERT INTO tag (key, label) VALUES ('one', 'x'), ('two', NULL);",
        )
        .unwrap();
    let mapping = ClassMapping::builder("tag")
        .column("Key", "key", ColumnType::Text)
        .column("Label", "label", ColumnType::Text)
        .build()
        .unwrap();
    let tags = Store::new(
        Arc::clone(&f.source),
        RecordMapping::new(mapping)
            .bind("Key", |t: &mut Tag| &mut t.key)
            .bind("Label", |t: &mut Tag| &mut t.label),
    )
    .unwrap();

    let chain = JoinChain::begin(&f.dao1, None, None)
        .join(
            &tags,
            JoinCriteria::left_outer().on(JoinExpression::equal(f.dao1.mapping(), "JoinField", "Key")),
        )
        .unwrap();
    let rows = chain
        .get(&[JoinSortOrder::asc(f.dao1.mapping(), "ID")], Window::all())
        .unwrap();

    let tagged: Vec<Option<Tag>> = rows.into_iter().map(|r| r.right).collect();
    assert_eq!(
        tagged,
        [
            Some(Tag {
                key: "one".into(),
                label: Some("x".into()),
            }),
            Some(Tag {
                key: "two".into(),
                label: None,
            }),
            None,
            None,
            None,
        ]
    );
}
