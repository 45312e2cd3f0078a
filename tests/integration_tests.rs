//! Integration tests for the binding layer
//!
//! These tests verify that connections, statements and bridges work together:
//! - End-to-end insert and select
//! - Statement state transitions
//! - Index validation
//! - Null handling
//! - User blob types
//! - File-backed connections

use rust_sql_bridge::prelude::*;
use rust_sql_bridge::DecodeRow;

fn players(count: i64) -> Connection {
    let db = Connection::open_in_memory().expect("Failed to open database");
    db.execute_batch("CREATE TABLE players (id INTEGER PRIMARY KEY, name TEXT, cash REAL)")
        .expect("Failed to create table");

    let mut insert = db
        .prepare("INSERT INTO players (name, cash) VALUES (?, ?)")
        .expect("Failed to prepare insert");
    for i in 1..=count {
        insert
            .bind(1, format!("Player{}", i))
            .and_then(|stmt| stmt.bind(2, i as f64 * 1000.0))
            .expect("Failed to bind");
        insert.execute().expect("Failed to insert");
    }
    drop(insert);
    db
}

#[test]
fn test_players_end_to_end() {
    let db = players(10);
    assert_eq!(db.last_insert_rowid().unwrap(), 10);

    let mut select = db.prepare("SELECT id, name, cash FROM players").unwrap();
    let mut ids = Vec::new();
    let rows = select
        .execute_with(|row, ordinal| {
            let (id, name, cash) = row.results::<(i64, String, f64)>(0)?;
            let id = id.expect("id is not null");
            assert_eq!(id as u64, ordinal);
            assert_eq!(name, Some(format!("Player{}", id)));
            assert_eq!(cash, Some(id as f64 * 1000.0));
            ids.push(id);
            Ok(())
        })
        .unwrap();

    assert_eq!(rows, 10);
    assert_eq!(ids, (1..=10).collect::<Vec<_>>());
}

#[test]
fn test_state_machine_reproduces_rows() {
    let db = players(4);
    let mut select = db.prepare("SELECT name FROM players WHERE cash >= ?").unwrap();
    assert_eq!(select.state(), State::Unbound);

    select.bind(1, 2000).unwrap();
    assert_eq!(select.state(), State::Bound);

    let mut first = 0;
    while select.step().unwrap() {
        assert_eq!(select.state(), State::Row);
        first += 1;
    }
    assert_eq!(select.state(), State::Done);
    assert_eq!(first, 3);

    select.reset(false);
    assert_eq!(select.state(), State::Bound);
    let mut second = 0;
    while select.step().unwrap() {
        second += 1;
    }
    assert_eq!(second, first);

    // Cleared bindings read as NULL, and nothing compares >= NULL.
    select.reset(true);
    assert_eq!(select.state(), State::Unbound);
    assert_eq!(select.execute().unwrap(), 0);
}

#[test]
fn test_parameter_index_validation() {
    let db = players(1);
    let mut stmt = db.prepare("UPDATE players SET cash = ? WHERE id = ?").unwrap();
    assert_eq!(stmt.parameter_count().unwrap(), 2);

    for bad in [0usize, 3, 100] {
        let err = stmt.bind(bad, 1).unwrap_err();
        assert!(err.is_usage_error());
        assert!(matches!(err, DatabaseError::ParameterIndex { count: 2, .. }));
    }
    assert!(matches!(
        stmt.bind(":cash", 1).unwrap_err(),
        DatabaseError::ParameterName(name) if name == ":cash"
    ));
    assert_eq!(stmt.state(), State::Unbound);

    stmt.bind_many(1, (500.0, 1)).unwrap();
    assert_eq!(stmt.execute().unwrap(), 0);

    let mut check = db.prepare("SELECT cash FROM players WHERE id = 1").unwrap();
    assert!(check.step().unwrap());
    assert_eq!(check.result::<f64>(0).unwrap(), Some(500.0));
}

#[test]
fn test_column_index_validation() {
    let db = players(1);
    let mut select = db.prepare("SELECT id, name, cash FROM players").unwrap();
    assert_eq!(select.column_count().unwrap(), 3);
    assert!(select.step().unwrap());

    assert!(select.result::<i64>(2).is_ok());
    let err = select.result::<i64>(3).unwrap_err();
    assert!(matches!(err, DatabaseError::ColumnIndex { index: 3, count: 3 }));
    assert!(select.results::<(String, f64, i64)>(1).is_err());
}

#[test]
fn test_null_handling() {
    let db = Connection::open_in_memory().unwrap();
    db.execute_batch("CREATE TABLE t (v)").unwrap();

    let mut insert = db.prepare("INSERT INTO t VALUES (?)").unwrap();
    insert.bind(1, Null).unwrap();
    insert.execute().unwrap();
    insert.bind(1, None::<i32>).unwrap();
    insert.execute().unwrap();

    let mut select = db.prepare("SELECT v FROM t").unwrap();
    let rows = select
        .execute_with(|row, _| {
            assert_eq!(row.column_type(0)?, StorageClass::Null);
            assert_eq!(row.result::<Null>(0)?, Some(Null));
            assert_eq!(row.result::<Option<String>>(0)?, Some(None));
            assert_eq!(row.result::<i32>(0)?, None);
            assert_eq!(row.result::<f64>(0)?, None);
            assert_eq!(row.result::<String>(0)?, None);
            assert_eq!(row.result::<Vec<u8>>(0)?, None);
            assert_eq!(row.result::<bool>(0)?, None);
            assert_eq!(row.cell(0)?, Cell::Null);
            Ok(())
        })
        .unwrap();
    assert_eq!(rows, 2);
}

#[test]
fn test_storage_class_mismatch_is_absent() {
    let db = Connection::open_in_memory().unwrap();
    let mut stmt = db.prepare("SELECT 'text', x'00ff', 300, 2.5").unwrap();
    assert!(stmt.step().unwrap());

    assert_eq!(stmt.result::<Vec<u8>>(0).unwrap(), None);
    assert_eq!(stmt.result::<i64>(0).unwrap(), None);
    assert_eq!(stmt.result::<String>(1).unwrap(), None);
    assert_eq!(stmt.result::<u8>(2).unwrap(), None);
    assert_eq!(stmt.result::<u16>(2).unwrap(), Some(300));
    assert_eq!(stmt.result::<String>(3).unwrap().as_deref(), Some("2.5"));
    assert_eq!(stmt.result::<f32>(3).unwrap(), Some(2.5));
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Vector3 {
    x: f32,
    y: f32,
    z: f32,
}

impl BlobStorage for Vector3 {
    fn to_storage(&self) -> Vec<u8> {
        [self.x, self.y, self.z]
            .iter()
            .flat_map(|c| c.to_le_bytes())
            .collect()
    }

    fn from_storage(bytes: &[u8]) -> Option<Self> {
        if bytes.len() != 12 {
            return None;
        }
        let c = |i: usize| bytes[i * 4..i * 4 + 4].try_into().ok().map(f32::from_le_bytes);
        Some(Vector3 {
            x: c(0)?,
            y: c(1)?,
            z: c(2)?,
        })
    }
}

#[test]
fn test_user_blob_round_trip() {
    let db = Connection::open_in_memory().unwrap();
    db.execute_batch("CREATE TABLE positions (id INTEGER PRIMARY KEY, pos BLOB)").unwrap();

    let positions = [
        Vector3 { x: 1.0, y: 2.0, z: 3.0 },
        Vector3 { x: -0.5, y: f32::MAX, z: f32::MIN_POSITIVE },
    ];

    let mut insert = db.prepare("INSERT INTO positions (pos) VALUES (:pos)").unwrap();
    for pos in &positions {
        insert.bind(":pos", Blob::new(pos)).unwrap();
        insert.execute().unwrap();
    }

    let mut select = db.prepare("SELECT pos FROM positions ORDER BY id").unwrap();
    let read: Vec<Vector3> = select
        .collect::<(Blob<Vector3>,)>()
        .unwrap()
        .into_iter()
        .map(|(pos,)| pos.expect("blob decodes"))
        .collect();
    assert_eq!(read, positions);

    let mut raw = db.prepare("SELECT pos FROM positions WHERE id = 1").unwrap();
    assert!(raw.step().unwrap());
    assert_eq!(
        raw.result::<Vec<u8>>(0).unwrap(),
        Some(Blob::new(&positions[0]).into_bytes())
    );
}

#[test]
fn test_set_query_only_when_unbound() {
    let db = players(2);
    let mut stmt = db.prepare("SELECT count(*) FROM players").unwrap();
    assert!(stmt.step().unwrap());
    assert!(matches!(
        stmt.set_query("SELECT 1").unwrap_err(),
        DatabaseError::InvalidState { state: State::Row, .. }
    ));

    stmt.reset(false);
    assert!(stmt.set_query("SELECT 1").is_err());

    stmt.reset(true);
    stmt.set_query("SELECT name FROM players WHERE id = ?").unwrap();
    stmt.bind(1, 2).unwrap();
    assert!(stmt.step().unwrap());
    assert_eq!(stmt.result::<String>(0).unwrap().as_deref(), Some("Player2"));
}

#[test]
fn test_empty_query() {
    let db = players(1);
    let mut stmt = Statement::new(&db, "").unwrap();
    assert_eq!(stmt.query(), "");
    assert!(matches!(stmt.execute().unwrap_err(), DatabaseError::EmptyStatement));
    assert!(matches!(stmt.row().unwrap_err(), DatabaseError::NoRow { .. }));

    stmt.set_query("SELECT name FROM players").unwrap();
    assert_eq!(stmt.execute().unwrap(), 1);
}

#[test]
fn test_engine_errors_carry_code() {
    let db = players(1);
    let err = db.prepare("SELECT nope FROM players").unwrap_err();
    assert_eq!(err.code(), Some(rusqlite::ffi::SQLITE_ERROR));
    assert!(err.to_string().contains("nope"));

    db.execute_batch("CREATE UNIQUE INDEX players_name ON players (name)").unwrap();
    let mut insert = db.prepare("INSERT INTO players (name) VALUES (?)").unwrap();
    insert.bind(1, "Player1").unwrap();
    let err = insert.execute().unwrap_err();
    assert!(!err.is_usage_error());
    assert_eq!(err.code().map(|c| c & 0xff), Some(rusqlite::ffi::SQLITE_CONSTRAINT));
    assert_eq!(insert.state(), State::Done);
}

#[test]
fn test_unsigned_out_of_range() {
    let db = Connection::open_in_memory().unwrap();
    let mut stmt = db.prepare("SELECT ?").unwrap();

    let err = stmt.bind(1, u64::MAX).unwrap_err();
    assert!(matches!(err, DatabaseError::OutOfRange(_)));
    assert_eq!(stmt.state(), State::Unbound);

    stmt.bind(1, u32::MAX).unwrap();
    assert!(stmt.step().unwrap());
    assert_eq!(stmt.result::<u32>(0).unwrap(), Some(u32::MAX));
    assert_eq!(stmt.result::<i32>(0).unwrap(), None);
}

#[test]
fn test_reals_through_engine() {
    let db = Connection::open_in_memory().unwrap();
    let mut stmt = db.prepare("SELECT ?, ?").unwrap();

    let err = stmt.bind(1, f64::NAN).unwrap_err();
    assert!(matches!(err, DatabaseError::OutOfRange(_)));
    let err = stmt.bind_many(1, (1.5, f32::NAN)).unwrap_err();
    assert!(matches!(err, DatabaseError::OutOfRange(_)));
    assert_eq!(stmt.state(), State::Unbound);

    stmt.bind_many(1, (f64::INFINITY, 1e300)).unwrap();
    assert!(stmt.step().unwrap());
    assert_eq!(stmt.result::<f64>(0).unwrap(), Some(f64::INFINITY));
    assert_eq!(stmt.result::<f64>(1).unwrap(), Some(1e300));
    assert_eq!(stmt.result::<f32>(1).unwrap(), None);
}

#[test]
fn test_batch_syntax_error_carries_code() {
    let db = players(1);
    let err = db.execute_batch("SELEC name FROM players").unwrap_err();
    assert_eq!(err.code(), Some(rusqlite::ffi::SQLITE_ERROR));
    assert!(!err.is_usage_error());
}

#[test]
fn test_file_backed_connection() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("players.db");

    {
        let db = Connection::open(&path).unwrap();
        db.execute_batch("CREATE TABLE players (id INTEGER PRIMARY KEY, name TEXT)").unwrap();
        let mut insert = db.prepare_persistent("INSERT INTO players (name) VALUES (?)").unwrap();
        insert.bind(1, "Player1").unwrap().execute().unwrap();
    }

    let props = Properties::file(path.to_str().unwrap()).read_only(true);
    let mut db = Connection::new(props);
    db.connect().unwrap();
    {
        let mut select = db.prepare("SELECT name FROM players").unwrap();
        assert_eq!(
            select.collect::<(String,)>().unwrap(),
            vec![(Some("Player1".to_string()),)]
        );

        let err = db.execute_batch("INSERT INTO players (name) VALUES ('x')").unwrap_err();
        assert!(err.code().is_some());
    }

    db.disconnect();
    assert!(!db.is_connected());
    assert!(db.prepare("SELECT 1").unwrap_err().is_usage_error());
}

#[test]
fn test_properties_from_json() {
    let props: Properties = serde_json::from_str(r#"{"memory": true, "create": true}"#).unwrap();
    let mut db = Connection::new(props);
    db.connect().unwrap();
    let mut stmt = db.prepare("SELECT 1 + 1").unwrap();
    assert!(stmt.step().unwrap());
    assert_eq!(stmt.cell(0).unwrap(), Cell::Integer(2));
}

#[test]
fn test_row_width_constant() {
    assert_eq!(<(i64, String, f64) as DecodeRow>::LEN, 3);
    assert_eq!(<(Blob<Vector3>,) as DecodeRow>::LEN, 1);
}

#[cfg(feature = "chrono")]
#[test]
fn test_datetime_through_engine() {
    use chrono::{NaiveDate, TimeZone, Utc};

    let db = Connection::open_in_memory().unwrap();
    let when = Utc.with_ymd_and_hms(2024, 2, 29, 12, 30, 0).unwrap();
    let mut stmt = db.prepare("SELECT ?, date(?), unixepoch(?)").unwrap();
    stmt.bind_many(1, (when, when, when)).unwrap();
    assert!(stmt.step().unwrap());

    let (as_text, as_date, as_seconds) = stmt
        .results::<(chrono::DateTime<Utc>, NaiveDate, chrono::DateTime<Utc>)>(0)
        .unwrap();
    assert_eq!(as_text, Some(when));
    assert_eq!(as_date, NaiveDate::from_ymd_opt(2024, 2, 29));
    assert_eq!(as_seconds, Some(when));
}

#[cfg(feature = "json")]
#[test]
fn test_json_through_engine() {
    let db = Connection::open_in_memory().unwrap();
    let mut stmt = db.prepare("SELECT json_extract(?, '$.tags[1]'), ?").unwrap();
    let doc = Json(serde_json::json!({"tags": ["a", "b"]}));
    stmt.bind(1, &doc).unwrap().bind(2, &doc).unwrap();
    assert!(stmt.step().unwrap());
    assert_eq!(stmt.result::<String>(0).unwrap().as_deref(), Some("b"));
    assert_eq!(stmt.result::<Json<serde_json::Value>>(1).unwrap(), Some(doc));
}
