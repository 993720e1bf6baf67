use std::sync::Arc;

use daojoin::config::SettingsError;
use daojoin::prelude::*;

#[derive(Debug, Default)]
struct Person {
    id: i64,
    name: String,
}

#[derive(Debug, Default)]
struct Pet {
    id: i64,
    owner_id: i64,
    name: String,
}

const SETTINGS: &str = r#"
[connections.main]
driver = "sqlite"
connection_string = ":memory:"

[connections.warehouse]
driver = "mssql"
connection_string = "sqlserver://localhost?database=dw"

[query]
pool_capacity = 2

[mappings.person]
table = "person"
columns = [
  { property = "ID", column = "id", type = "integer", identity = true },
  { property = "Name", column = "name", type = "text" },
]

[mappings.pet]
table = "pet"
columns = [
  { property = "ID", column = "id", type = "integer", identity = true },
  { property = "OwnerID", column = "owner_id", type = "int" },
  { property = "Name", column = "name", type = "varchar" },
]
"#;

/// Run a statement through the source's own transport, stepping it to completion.
fn exec(source: &DataSource, sql: &str) {
    source
        .transport()
        .execute_query(sql, &[], &mut |cursor| {
            while cursor
                .next_row()
                .map_err(|e| DaoError::execution(sql, &[], e))?
                .is_some()
            {}
            Ok(())
        })
        .unwrap();
}

#[test]
fn test_data_source_from_settings() {
    let settings = Settings::parse(SETTINGS).unwrap();
    let source = Arc::new(DataSource::from_settings(&settings, "main").unwrap());
    assert_eq!(source.dialect(), Dialect::Sqlite);
    assert_eq!(source.pool().capacity(), 2);

    // Fixtures go through the transport so they land in the same in-memory database.
    let setup = [
        "CREATE TABLE person (id INTEGER PRIMARY KEY, name TEXT)",
        "CREATE TABLE pet (id INTEGER PRIMARY KEY, owner_id INTEGER, name TEXT)",
        "INSERT INTO person VALUES (1, 'Ann'), (2, 'Ben')",
        "INSERT INTO pet VALUES (1, 1, 'Rex'), (2, 1, 'Tom')",
    ];
    for statement in setup {
        exec(&source, statement);
    }

    let people = Store::new(
        Arc::clone(&source),
        RecordMapping::new(settings.mapping("person").unwrap())
            .bind("ID", |p: &mut Person| &mut p.id)
            .bind("Name", |p: &mut Person| &mut p.name),
    )
    .unwrap();
    let pets = Store::new(
        Arc::clone(&source),
        RecordMapping::new(settings.mapping("pet").unwrap())
            .bind("ID", |p: &mut Pet| &mut p.id)
            .bind("OwnerID", |p: &mut Pet| &mut p.owner_id)
            .bind("Name", |p: &mut Pet| &mut p.name),
    )
    .unwrap();

    let chain = JoinChain::begin(&people, None, None)
        .join(
            &pets,
            JoinCriteria::left_outer().on(JoinExpression::equal(people.mapping(), "ID", "OwnerID")),
        )
        .unwrap();
    let orders = [
        JoinSortOrder::asc(people.mapping(), "ID"),
        JoinSortOrder::asc(pets.mapping(), "ID"),
    ];
    let rows = chain.get(&orders, Window::all()).unwrap();

    let pairs: Vec<(String, Option<String>)> = rows
        .into_iter()
        .map(|r| (r.left.map(|p| p.name).unwrap_or_default(), r.right.map(|p| p.name)))
        .collect();
    assert_eq!(
        pairs,
        [
            ("Ann".to_string(), Some("Rex".to_string())),
            ("Ann".to_string(), Some("Tom".to_string())),
            ("Ben".to_string(), None),
        ]
    );
}

#[test]
fn test_non_sqlite_connection_needs_explicit_transport() {
    let settings = Settings::parse(SETTINGS).unwrap();
    let err = DataSource::from_settings(&settings, "warehouse").unwrap_err();
    assert!(err.is_configuration());
    assert!(err.to_string().contains("mssql"), "{}", err);
}

#[test]
fn test_unknown_connection() {
    let settings = Settings::parse(SETTINGS).unwrap();
    let err = DataSource::from_settings(&settings, "nowhere").unwrap_err();
    assert!(matches!(
        err,
        DaoError::Settings(SettingsError::ConnectionNotFound(ref name)) if name == "nowhere"
    ));
}

#[test]
fn test_settings_from_file() {
    let path = std::env::temp_dir().join(format!("daojoin-settings-{}.toml", std::process::id()));
    std::fs::write(&path, SETTINGS).unwrap();
    let settings = Settings::from_file(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(settings.connections.len(), 2);
    assert_eq!(settings.mappings.len(), 2);
    assert!(matches!(
        Settings::from_file(&path),
        Err(SettingsError::FileNotFound(_))
    ));
}
