//! End-to-end decoding of result-set rows into derived entities.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{NaiveDate, NaiveDateTime};
use record_decode::{hook, Config, Record, Value};

#[derive(Debug, Default, PartialEq, record_decode::Record)]
struct UserInfo {
    #[record(tag(column = "id"))]
    id: u64,
    #[record(tag(column = "login_name"))]
    login_name: String,
    #[record(tag(column = "age"))]
    age: Option<i32>,
    #[record(tag(column = "amount"))]
    amount: Option<f64>,
    #[record(tag(column = "is_deleted"))]
    is_deleted: bool,
    #[record(tag(column = "birthday"))]
    birthday: Option<NaiveDateTime>,
    #[record(tag(column = "roles"))]
    roles: Vec<String>,
}

const COLUMNS: [&str; 7] = [
    "id",
    "login_name",
    "age",
    "amount",
    "is_deleted",
    "birthday",
    "roles",
];

fn row(cells: [Option<&str>; 7]) -> Record {
    Record::from_row(COLUMNS, cells.map(|c| c.map(str::as_bytes)))
}

fn row_config() -> Config {
    // Result-set cells arrive as text, so rows decode weakly typed with a
    // separator hook for list columns.
    Config::default().weak(true).hook(hook::string_to_seq(","))
}

#[test]
fn decodes_a_row_set_into_entities() {
    let rows = Value::Seq(vec![
        Value::Record(row([
            Some("1"),
            Some("ann"),
            Some("30"),
            Some("12.50"),
            Some("0"),
            Some("1990-04-02 10:00:00"),
            Some("admin,ops"),
        ])),
        Value::Record(row([
            Some("2"),
            Some("bob"),
            None,
            None,
            Some("1"),
            None,
            Some(""),
        ])),
    ]);

    let mut users: Vec<UserInfo> = Vec::new();
    row_config().decode(&rows, &mut users).unwrap();

    assert_eq!(users.len(), 2);
    assert_eq!(users[0].id, 1);
    assert_eq!(users[0].login_name, "ann");
    assert_eq!(users[0].age, Some(30));
    assert_eq!(users[0].amount, Some(12.5));
    assert!(!users[0].is_deleted);
    assert_eq!(
        users[0].birthday,
        NaiveDate::from_ymd_opt(1990, 4, 2).unwrap().and_hms_opt(10, 0, 0)
    );
    assert_eq!(users[0].roles, vec!["admin".to_string(), "ops".to_string()]);

    assert_eq!(users[1].age, None);
    assert_eq!(users[1].amount, None);
    assert!(users[1].is_deleted);
    assert_eq!(users[1].birthday, None);
    assert!(users[1].roles.is_empty());
}

#[test]
fn aggregate_names_every_failing_column_and_commits_the_rest() {
    let rows = Value::Seq(vec![Value::Record(row([
        Some("1"),
        Some("ann"),
        Some("abc"),
        Some("not-a-number"),
        Some("0"),
        Some("1990-04-02 10:00:00"),
        Some("admin"),
    ]))]);

    let mut users: Vec<UserInfo> = Vec::new();
    let err = row_config().decode(&rows, &mut users).unwrap_err();

    let text = err.to_string();
    assert!(text.starts_with("2 error(s) decoding into"), "{text}");
    assert!(text.contains("'[0].age'"), "{text}");
    assert!(text.contains("'[0].amount'"), "{text}");

    // Best effort: the row still decoded around the bad columns.
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].login_name, "ann");
    assert_eq!(users[0].age, None);
    assert_eq!(users[0].amount, None);
    assert_eq!(users[0].roles, vec!["admin".to_string()]);
}

#[test]
fn atomic_mode_discards_partial_row_sets() {
    let rows = Value::Seq(vec![Value::Record(row([
        Some("1"),
        Some("ann"),
        Some("abc"),
        None,
        Some("0"),
        None,
        Some(""),
    ]))]);

    let mut users: Vec<UserInfo> = Vec::new();
    let config = row_config().partial(false);
    assert!(config.decode(&rows, &mut users).is_err());
    assert!(users.is_empty());
}

#[derive(Debug, Default, PartialEq, record_decode::Record)]
struct Timestamps {
    #[record(tag(column = "created_time"))]
    created_time: Option<NaiveDateTime>,
    #[record(tag(column = "updated_time"))]
    updated_time: Option<NaiveDateTime>,
}

#[derive(Debug, Default, PartialEq, record_decode::Record)]
struct AuditedUser {
    #[record(tag(column = "login_name"))]
    login_name: String,
    #[record(flatten)]
    timestamps: Timestamps,
    #[record(remain)]
    extra: BTreeMap<String, Value>,
}

#[test]
fn flattened_fields_bind_at_the_parent_level() {
    let mut rec = Record::new();
    rec.push("login_name", Value::String("ann".into()));
    rec.push("created_time", Value::String("2020-01-01 00:00:00".into()));
    rec.push("updated_time", Value::Null);
    rec.push("region", Value::String("eu-1".into()));

    let mut user = AuditedUser::default();
    Config::default().decode(&Value::Record(rec), &mut user).unwrap();

    assert_eq!(user.login_name, "ann");
    assert_eq!(
        user.timestamps.created_time,
        NaiveDate::from_ymd_opt(2020, 1, 1).unwrap().and_hms_opt(0, 0, 0)
    );
    assert_eq!(user.timestamps.updated_time, None);
    assert_eq!(
        user.extra,
        BTreeMap::from([("region".to_string(), Value::String("eu-1".into()))])
    );
}

#[derive(Debug, Default, PartialEq, record_decode::Record)]
struct RetrySettings {
    #[record(tag(column = "interval"))]
    interval: Duration,
    #[record(tag(column = "deadline"))]
    deadline: Option<NaiveDateTime>,
}

#[test]
fn duration_and_layout_hooks_rewrite_text_columns() {
    let mut rec = Record::new();
    rec.push("interval", Value::String("1m30s".into()));
    rec.push("deadline", Value::String("02 Jan 2026".into()));

    let config = Config::default()
        .hook(hook::string_to_duration())
        .hook(hook::string_to_datetime("%d %b %Y"));

    let mut settings = RetrySettings::default();
    config.decode(&Value::Record(rec), &mut settings).unwrap();

    assert_eq!(settings.interval, Duration::from_secs(90));
    assert_eq!(
        settings.deadline,
        NaiveDate::from_ymd_opt(2026, 1, 2).unwrap().and_hms_opt(0, 0, 0)
    );
}

#[test]
fn hook_failure_aggregates_at_its_path() {
    let mut rec = Record::new();
    rec.push("interval", Value::String("90".into()));
    rec.push("deadline", Value::Null);

    let config = Config::default().hook(hook::string_to_duration());
    let mut settings = RetrySettings::default();
    let err = config.decode(&Value::Record(rec), &mut settings).unwrap_err();

    let text = err.to_string();
    assert!(text.contains("error decoding 'interval'"), "{text}");
    assert!(text.contains("invalid duration"), "{text}");
}

#[derive(Debug, Default, PartialEq, record_decode::Record)]
struct Totals {
    #[record(tag(column = "a"))]
    a: i64,
    #[record(tag(column = "b"))]
    b: i64,
}

#[test]
fn typed_sources_project_through_the_record_path() {
    let source = Totals { a: 1, b: 2 };
    let config = Config::default();

    // Struct into generic mapping.
    let mut map: BTreeMap<String, i64> = BTreeMap::new();
    config.decode_from(&source, &mut map).unwrap();
    assert_eq!(map, BTreeMap::from([("a".into(), 1), ("b".into(), 2)]));

    // Struct into struct.
    let mut copy = Totals::default();
    config.decode_from(&source, &mut copy).unwrap();
    assert_eq!(copy, source);
}

#[derive(Debug, Default, PartialEq, record_decode::Record)]
struct SparseUser {
    #[record(tag(column = "login_name"))]
    login_name: String,
    #[record(tag(column = "age,omitempty"))]
    age: i32,
}

#[test]
fn omitempty_applies_to_projection_not_decoding() {
    use record_decode::ToValue;

    let config = Config::default();
    let projected = SparseUser {
        login_name: "ann".into(),
        age: 0,
    }
    .to_value(&config);

    let Value::Record(rec) = projected else {
        panic!("expected a record projection");
    };
    assert!(rec.get("age").is_none());
    assert_eq!(rec.get("login_name"), Some(&Value::String("ann".into())));

    // Decoding still accepts an explicit zero.
    let mut rec = Record::new();
    rec.push("login_name", Value::String("ann".into()));
    rec.push("age", Value::Int(0));
    let mut user = SparseUser {
        login_name: String::new(),
        age: 7,
    };
    config.decode(&Value::Record(rec), &mut user).unwrap();
    assert_eq!(user.age, 0);
}
