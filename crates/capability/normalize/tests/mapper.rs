use bridge_normalize::{DecodeError, NormalizeError, decode_message, map_payload, parse_payload};
use domain::FieldValue;
use serde_json::{Value, json};

fn deviation_payload() -> Value {
    json!({
        "measurement": "temp",
        "device": "d1",
        "type": "thermo",
        "timestamp": "2024-01-01T00:00:00Z",
        "lastValue": 21.5,
        "filtered": {
            "deviationNominal": 20.0,
            "deviationPercent": 7.5,
            "runningAverage": 20.8
        }
    })
}

fn consensus_payload() -> Value {
    json!({
        "measurement": "motion",
        "device": "d1",
        "type": "pir",
        "timestamp": "2024-01-01T00:00:00Z",
        "lastValue": true,
        "filtered": { "truePercentage": 0.92 }
    })
}

#[test]
fn deviation_payload_maps_to_point() {
    let point = map_payload(&deviation_payload()).expect("point");

    assert_eq!(point.measurement(), "temp");
    assert_eq!(point.tags(), [("device", "d1"), ("type", "thermo")]);
    assert_eq!(point.timestamp().to_rfc3339(), "2024-01-01T00:00:00+00:00");
    assert_eq!(
        point.fields(),
        &[
            ("lastValue", FieldValue::Float(21.5)),
            ("deviationNominal", FieldValue::Float(20.0)),
            ("deviationPercent", FieldValue::Float(7.5)),
            ("runningAverage", FieldValue::Float(20.8)),
        ]
    );
    assert!(point.field("truePercentage").is_none());
}

#[test]
fn consensus_payload_maps_to_point() {
    let point = map_payload(&consensus_payload()).expect("point");

    assert_eq!(
        point.fields(),
        &[
            ("lastValue", FieldValue::Boolean(true)),
            ("truePercentage", FieldValue::Float(0.92)),
        ]
    );
    for name in ["deviationNominal", "deviationPercent", "runningAverage"] {
        assert!(point.field(name).is_none(), "{name} must not be present");
    }
}

#[test]
fn both_shapes_keep_deviation_fields_only() {
    let mut payload = deviation_payload();
    payload["filtered"]["truePercentage"] = json!(0.5);
    let point = map_payload(&payload).expect("point");
    assert_eq!(
        point.field_names(),
        vec![
            "lastValue",
            "deviationNominal",
            "deviationPercent",
            "runningAverage"
        ]
    );
}

#[test]
fn last_value_is_optional() {
    let mut payload = consensus_payload();
    payload.as_object_mut().expect("object").remove("lastValue");
    let point = map_payload(&payload).expect("point");
    assert_eq!(point.field_names(), vec!["truePercentage"]);

    payload["lastValue"] = Value::Null;
    let point = map_payload(&payload).expect("point");
    assert_eq!(point.field_names(), vec!["truePercentage"]);
}

#[test]
fn last_value_keeps_json_type() {
    let mut payload = deviation_payload();
    payload["lastValue"] = json!(false);
    let point = map_payload(&payload).expect("point");
    assert_eq!(point.field("lastValue"), Some(&FieldValue::Boolean(false)));

    payload["lastValue"] = json!(1);
    let point = map_payload(&payload).expect("point");
    assert_eq!(point.field("lastValue"), Some(&FieldValue::Float(1.0)));
}

#[test]
fn last_value_rejects_string_object_and_array() {
    for bad in [json!("21.5"), json!({ "v": 1 }), json!([1])] {
        let mut payload = deviation_payload();
        payload["lastValue"] = bad;
        let err = map_payload(&payload).expect_err("bad lastValue");
        assert!(
            matches!(err, DecodeError::InvalidField { field: "lastValue", .. }),
            "{err:?}"
        );
    }
}

#[test]
fn missing_filtered_is_rejected() {
    let mut payload = deviation_payload();
    payload.as_object_mut().expect("object").remove("filtered");
    let err = map_payload(&payload).expect_err("no filtered");
    assert_eq!(err, DecodeError::MissingField("filtered"));
}

#[test]
fn empty_filtered_is_unrecognized() {
    let mut payload = deviation_payload();
    payload["filtered"] = json!({});
    let err = map_payload(&payload).expect_err("empty filtered");
    assert_eq!(err, DecodeError::UnrecognizedFilteredShape);
    assert_eq!(err.to_string(), "unrecognized filtered shape");

    payload["filtered"] = json!({ "historyLength": 10 });
    let err = map_payload(&payload).expect_err("unknown filtered");
    assert_eq!(err, DecodeError::UnrecognizedFilteredShape);
}

#[test]
fn missing_required_fields_are_named() {
    for key in ["measurement", "device", "type", "timestamp"] {
        let mut payload = deviation_payload();
        payload.as_object_mut().expect("object").remove(key);
        let err = map_payload(&payload).expect_err("missing");
        assert_eq!(err.to_string(), format!("missing field: {key}"));
    }
}

#[test]
fn wrong_typed_tag_is_rejected() {
    let mut payload = deviation_payload();
    payload["device"] = json!(42);
    let err = map_payload(&payload).expect_err("numeric device");
    assert_eq!(
        err.to_string(),
        "invalid field device: expected string, got number"
    );
}

#[test]
fn empty_tag_is_rejected() {
    let mut payload = deviation_payload();
    payload["type"] = json!("");
    let err = map_payload(&payload).expect_err("empty type");
    assert!(matches!(err, DecodeError::Point(_)));
}

#[test]
fn unparseable_timestamp_is_rejected() {
    let mut payload = deviation_payload();
    payload["timestamp"] = json!("yesterday");
    let err = map_payload(&payload).expect_err("timestamp");
    assert!(matches!(err, DecodeError::InvalidTimestamp { .. }));
}

#[test]
fn timestamp_keeps_nanoseconds_and_offset() {
    let mut payload = deviation_payload();
    payload["timestamp"] = json!("2024-05-25T16:55:54.698123456+02:00");
    let point = map_payload(&payload).expect("point");
    assert_eq!(point.timestamp().offset().local_minus_utc(), 7200);
    assert_eq!(point.timestamp_ns(), 1_716_648_954_698_123_456);

    payload["timestamp"] = json!("2024-05-25T14:55:54.698Z");
    let point = map_payload(&payload).expect("point");
    assert_eq!(point.timestamp_ns(), 1_716_648_954_698_000_000);
}

#[test]
fn mapping_is_deterministic() {
    let payload = deviation_payload();
    let first = map_payload(&payload).expect("first");
    let second = map_payload(&payload).expect("second");
    assert_eq!(first, second);
}

#[test]
fn non_object_payload_is_rejected() {
    let err = map_payload(&json!([1, 2, 3])).expect_err("array");
    assert_eq!(err, DecodeError::NotAnObject);
}

#[test]
fn invalid_json_is_a_parse_error() {
    let err = parse_payload(b"{not json").expect_err("parse");
    assert!(matches!(err, NormalizeError::Parse(_)));

    let err = parse_payload(&[0xff, 0xfe]).expect_err("utf8");
    assert!(matches!(err, NormalizeError::Parse(_)));
}

#[test]
fn decode_message_runs_parse_and_map() {
    let bytes = serde_json::to_vec(&consensus_payload()).expect("encode");
    let point = decode_message(&bytes).expect("point");
    assert_eq!(point.measurement(), "motion");

    let err = decode_message(br#"{"measurement":"temp"}"#).expect_err("decode");
    assert!(matches!(
        err,
        NormalizeError::Decode(DecodeError::MissingField("device"))
    ));
}
