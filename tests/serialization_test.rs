//! Wire round trips: builder -> serializer -> response decoding, and the
//! term compiler as the serializer's inverse

use chrono::{FixedOffset, TimeZone};
use photondb_reql::config::ClientConfig;
use photondb_reql::query::{serialize, to_bytes, Query, QueryCompiler};
use photondb_reql::reql::{Datum, InsertOptions, Conflict};
use photondb_reql::response::{Deserializer, FormatOptions};
use photondb_reql::{deserialize, r, Error};
use serde_json::{json, Value};

fn atom(value: Value) -> Value {
    json!({"t": 1, "r": [value]})
}

#[test]
fn test_scalars_round_trip() {
    let offset = FixedOffset::west_opt(7 * 3600).unwrap();
    let time = offset
        .with_ymd_and_hms(2024, 3, 10, 8, 30, 15)
        .unwrap()
        + chrono::Duration::milliseconds(250);

    let values = vec![
        Datum::Null,
        Datum::Boolean(true),
        Datum::Integer(-42),
        Datum::Integer(i64::MAX),
        Datum::Number(0.1),
        Datum::String("héllo \"world\"".into()),
        Datum::Binary(vec![0, 159, 146, 150, 255]),
        Datum::Time(time),
    ];

    for value in values {
        let wire = serialize(&r::expr(value.clone()).unwrap()).unwrap();
        let decoded = deserialize(&atom(wire)).unwrap().into_value();
        assert_eq!(decoded, value);
    }
}

#[test]
fn test_integers_and_floats_stay_apart() {
    assert_eq!(to_bytes(&r::expr(1).unwrap()).unwrap(), b"1".to_vec());
    assert_eq!(to_bytes(&r::expr(1.0).unwrap()).unwrap(), b"1.0".to_vec());
    assert_eq!(to_bytes(&r::expr(1.5).unwrap()).unwrap(), b"1.5".to_vec());

    let huge = serialize(&r::expr(u64::MAX).unwrap()).unwrap();
    assert_eq!(huge, json!(u64::MAX as f64));
    let huge = serialize(&r::expr(usize::MAX).unwrap()).unwrap();
    assert!(huge.as_f64().unwrap() > 0.0);
}

#[test]
fn test_serialization_is_deterministic() {
    let build = || {
        r::table(["users"])
            .unwrap()
            .insert_with(
                json_doc(),
                InsertOptions {
                    conflict: Some(Conflict::Update),
                    return_changes: Some(true),
                    ..Default::default()
                },
            )
            .unwrap()
    };

    let first = to_bytes(&build()).unwrap();
    for _ in 0..10 {
        assert_eq!(to_bytes(&build()).unwrap(), first);
    }
    assert_eq!(
        String::from_utf8(first).unwrap(),
        r#"[56,[[15,["users"]],{"a":1,"m":[2,[true,null]],"z":"last"}],{"conflict":"update","return_changes":true}]"#
    );
}

fn json_doc() -> Datum {
    Datum::from(json!({"z": "last", "a": 1, "m": [true, null]}))
}

#[test]
fn test_compiler_inverts_builder_output() {
    let term = r::db(["app"])
        .unwrap()
        .table("events")
        .unwrap()
        .between("2024-01-01", "2024-02-01")
        .unwrap()
        .pluck(["id", "at"])
        .unwrap()
        .limit(20)
        .unwrap();

    let wire = serialize(&term).unwrap();
    let compiled = QueryCompiler::compile(&wire).unwrap();
    assert_eq!(compiled, term);

    let bytes = to_bytes(&term).unwrap();
    assert_eq!(QueryCompiler::compile_slice(&bytes).unwrap(), term);
}

#[test]
fn test_compiler_rejects_unknown_tags() {
    let err = QueryCompiler::compile(&json!([39, [[15, ["t"]], [4242, []]]])).unwrap_err();
    assert_eq!(err, Error::UnknownTermType(4242));
    assert_eq!(err.class(), "unknown_term_type");
}

#[test]
fn test_configured_start_query() {
    let config = ClientConfig::from_toml_str(
        r#"
        default_db = "app"
        read_mode = "majority"
        array_limit = 1000
        "#,
    )
    .unwrap();

    let query = Query::start_with(r::table(["users"]).unwrap().count(), config.run_options());
    assert_eq!(
        query.to_json().unwrap(),
        json!([1, [43, [[15, ["users"]]]], {
            "array_limit": 1000,
            "db": [14, ["app"]],
            "read_mode": "majority"
        }])
    );
}

#[test]
fn test_configured_formats_reach_the_deserializer() {
    let config = ClientConfig::from_toml_str(r#"binary_format = "raw""#).unwrap();
    let deserializer = Deserializer::with_formats(config.format_options());
    assert_ne!(*deserializer.formats(), FormatOptions::default());

    let wire = serialize(&r::binary(b"hi")).unwrap();
    let value = deserializer.deserialize(&atom(wire)).unwrap().into_value();
    assert_eq!(value.as_object().unwrap().get("data"), Some(&Datum::from("aGk=")));
}
