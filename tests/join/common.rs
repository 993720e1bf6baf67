//! Shared fixtures: three keyed tables in one in-memory SQLite database.
//!
//! | id | dao1.join_field | dao1.name | dao2.join_field | dao3.join_field |
//! |----|-----------------|-----------|-----------------|-----------------|
//! | 1  | one             | Bob       | one             | one             |
//! | 2  | two             | Alice     | two             | two             |
//! | 3  | three           | five      | three           | three           |
//! | 4  | four            | Dave      | 4               | four            |
//! | 5  | five            | Edmund    | 5               | 5               |

#![allow(dead_code)]

use std::sync::Arc;

use daojoin::prelude::*;

#[derive(Debug, Default, Clone, PartialEq)]
pub struct NamedRecord {
    pub id: i64,
    pub join_field: String,
    pub name: Option<String>,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct KeyRecord {
    pub id: i64,
    pub join_field: String,
}

pub struct Fixture {
    pub transport: Arc<SqliteTransport>,
    pub source: Arc<DataSource>,
    pub dao1: Store<NamedRecord>,
    pub dao2: Store<KeyRecord>,
    pub dao3: Store<NamedRecord>,
}

const SCHEMA: &str = "
CREATE TABLE dao1 (id INTEGER PRIMARY KEY, join_field TEXT NOT NULL, name TEXT);
CREATE TABLE dao2 (id INTEGER PRIMARY KEY, join_field TEXT NOT NULL);
CREATE TABLE dao3 (id INTEGER PRIMARY KEY, join_field TEXT NOT NULL, name TEXT);

INSERT INTO dao1 (id, join_field, name) VALUES
    (1, 'one', 'Bob'), (2, 'two', 'Alice'), (3, 'three', 'five'), (4, 'four', 'Dave'), (5, 'five', 'Edmund');
INSERT INTO dao2 (id, join_field) VALUES
    (1, 'one'), (2, 'two'), (3, 'three'), (4, '4'), (5, '5');
INSERT INTO dao3 (id, join_field) VALUES
    (1, 'one'), (2, 'two'), (3, 'three'), (4, 'four'), (5, '5');
";

pub fn named_mapping(table: &str) -> ClassMapping {
    ClassMapping::builder(table)
        .identity("ID", "id", ColumnType::Integer)
        .column("JoinField", "join_field", ColumnType::Text)
        .column("Name", "name", ColumnType::Text)
        .build()
        .unwrap()
}

pub fn key_mapping(table: &str) -> ClassMapping {
    ClassMapping::builder(table)
        .identity("ID", "id", ColumnType::Integer)
        .column("JoinField", "join_field", ColumnType::Text)
        .build()
        .unwrap()
}

pub fn named_records(table: &str) -> RecordMapping<NamedRecord> {
    RecordMapping::new(named_mapping(table))
        .bind("ID", |r: &mut NamedRecord| &mut r.id)
        .bind("JoinField", |r: &mut NamedRecord| &mut r.join_field)
        .bind("Name", |r: &mut NamedRecord| &mut r.name)
}

pub fn key_records(table: &str) -> RecordMapping<KeyRecord> {
    RecordMapping::new(key_mapping(table))
        .bind("ID", |r: &mut KeyRecord| &mut r.id)
        .bind("JoinField", |r: &mut KeyRecord| &mut r.join_field)
}

pub fn fixture() -> Fixture {
    let transport = Arc::new(SqliteTransport::open_in_memory().unwrap());
    transport.execute_batch(SCHEMA).unwrap();

    let source = Arc::new(DataSource::new(
        ConnectionDescriptor::sqlite(":memory:"),
        transport.clone(),
    ));
    Fixture {
        dao1: Store::new(Arc::clone(&source), named_records("dao1")).unwrap(),
        dao2: Store::new(Arc::clone(&source), key_records("dao2")).unwrap(),
        dao3: Store::new(Arc::clone(&source), named_records("dao3")).unwrap(),
        transport,
        source,
    }
}

/// `JoinField` of each store per row, `None` where the store was absent.
pub type Columns = (Vec<Option<String>>, Vec<Option<String>>, Vec<Option<String>>);

pub fn join_fields<A, B, C>(rows: &[JoinResult<JoinResult<Option<A>, B>, C>]) -> Columns
where
    A: HasJoinField,
    B: HasJoinField,
    C: HasJoinField,
{
    (
        rows.iter().map(|r| field(r.left.left.as_ref())).collect(),
        rows.iter().map(|r| field(r.left.right.as_ref())).collect(),
        rows.iter().map(|r| field(r.right.as_ref())).collect(),
    )
}

fn field<T: HasJoinField>(record: Option<&T>) -> Option<String> {
    record.map(|r| r.join_field().to_string())
}

pub fn expect(values: &[Option<&str>]) -> Vec<Option<String>> {
    values.iter().map(|v| v.map(String::from)).collect()
}

pub trait HasJoinField {
    fn join_field(&self) -> &str;
}

impl HasJoinField for NamedRecord {
    fn join_field(&self) -> &str {
        &self.join_field
    }
}

impl HasJoinField for KeyRecord {
    fn join_field(&self) -> &str {
        &self.join_field
    }
}
