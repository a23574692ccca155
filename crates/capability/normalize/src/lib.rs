//! 统计报文 -> 时序点位映射。
//!
//! 纯函数，无 I/O：同样的输入总是得到同样的点位。

use chrono::DateTime;
use domain::{
    FIELD_DEVIATION_NOMINAL, FIELD_LAST_VALUE, FIELD_TRUE_PERCENTAGE, FieldValue, FilteredStats,
    Point, PointError, TAG_DEVICE, TAG_TYPE,
};
use serde::Deserialize;
use serde_json::{Map, Value};

const KEY_MEASUREMENT: &str = "measurement";
const KEY_TIMESTAMP: &str = "timestamp";
const KEY_FILTERED: &str = "filtered";

/// 报文结构校验错误。
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DecodeError {
    #[error("payload is not a JSON object")]
    NotAnObject,
    #[error("missing field: {0}")]
    MissingField(&'static str),
    #[error("invalid field {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },
    #[error("invalid timestamp {value:?}: {reason}")]
    InvalidTimestamp { value: String, reason: String },
    #[error("unrecognized filtered shape")]
    UnrecognizedFilteredShape,
    #[error("invalid point: {0}")]
    Point(#[from] PointError),
}

/// 报文处理错误：JSON 解析失败或结构校验失败。
#[derive(Debug, thiserror::Error)]
pub enum NormalizeError {
    #[error("invalid payload: {0}")]
    Parse(String),
    #[error(transparent)]
    Decode(#[from] DecodeError),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeviationShape {
    deviation_nominal: f64,
    deviation_percent: f64,
    running_average: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BooleanConsensusShape {
    true_percentage: f64,
}

/// 将 UTF-8 字节解析为 JSON。
pub fn parse_payload(payload: &[u8]) -> Result<Value, NormalizeError> {
    let text =
        std::str::from_utf8(payload).map_err(|err| NormalizeError::Parse(err.to_string()))?;
    serde_json::from_str(text).map_err(|err| NormalizeError::Parse(err.to_string()))
}

/// 解析并映射一条消息。
pub fn decode_message(payload: &[u8]) -> Result<Point, NormalizeError> {
    let value = parse_payload(payload)?;
    Ok(map_payload(&value)?)
}

/// JSON 报文 -> Point。
pub fn map_payload(payload: &Value) -> Result<Point, DecodeError> {
    let object = payload.as_object().ok_or(DecodeError::NotAnObject)?;

    let measurement = required_str(object, KEY_MEASUREMENT)?;
    let device = required_str(object, TAG_DEVICE)?;
    let sensor_type = required_str(object, TAG_TYPE)?;
    let raw_timestamp = required_str(object, KEY_TIMESTAMP)?;
    let timestamp = DateTime::parse_from_rfc3339(raw_timestamp).map_err(|err| {
        DecodeError::InvalidTimestamp {
            value: raw_timestamp.to_string(),
            reason: err.to_string(),
        }
    })?;
    let last_value = read_last_value(object)?;
    let filtered = object
        .get(KEY_FILTERED)
        .ok_or(DecodeError::MissingField(KEY_FILTERED))?;
    let stats = inspect_filtered(filtered)?;

    let mut point = Point::new(measurement, device, sensor_type, timestamp)?;
    if let Some(value) = last_value {
        point = point.with_field(FIELD_LAST_VALUE, value)?;
    }
    for (name, value) in stats.fields() {
        point = point.with_field(name, value)?;
    }
    Ok(point)
}

/// 判定 `filtered` 的形态。
///
/// `deviationNominal` 优先；同时出现 `truePercentage` 时后者被忽略。
pub fn inspect_filtered(filtered: &Value) -> Result<FilteredStats, DecodeError> {
    let object = filtered
        .as_object()
        .ok_or_else(|| DecodeError::InvalidField {
            field: KEY_FILTERED,
            reason: format!("expected object, got {}", json_kind(filtered)),
        })?;

    if object.contains_key(FIELD_DEVIATION_NOMINAL) {
        let shape = DeviationShape::deserialize(filtered).map_err(|err| invalid_filtered(&err))?;
        return Ok(FilteredStats::Deviation {
            deviation_nominal: shape.deviation_nominal,
            deviation_percent: shape.deviation_percent,
            running_average: shape.running_average,
        });
    }

    if object.contains_key(FIELD_TRUE_PERCENTAGE) {
        let shape =
            BooleanConsensusShape::deserialize(filtered).map_err(|err| invalid_filtered(&err))?;
        return Ok(FilteredStats::BooleanConsensus {
            true_percentage: shape.true_percentage,
        });
    }

    Err(DecodeError::UnrecognizedFilteredShape)
}

fn invalid_filtered(err: &serde_json::Error) -> DecodeError {
    DecodeError::InvalidField {
        field: KEY_FILTERED,
        reason: err.to_string(),
    }
}

fn required_str<'a>(
    object: &'a Map<String, Value>,
    key: &'static str,
) -> Result<&'a str, DecodeError> {
    match object.get(key) {
        None | Some(Value::Null) => Err(DecodeError::MissingField(key)),
        Some(Value::String(value)) => Ok(value.as_str()),
        Some(other) => Err(DecodeError::InvalidField {
            field: key,
            reason: format!("expected string, got {}", json_kind(other)),
        }),
    }
}

/// `lastValue`：数字 -> Float，布尔 -> Boolean，缺失/null -> 不写字段。
fn read_last_value(object: &Map<String, Value>) -> Result<Option<FieldValue>, DecodeError> {
    match object.get(FIELD_LAST_VALUE) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Bool(flag)) => Ok(Some(FieldValue::Boolean(*flag))),
        Some(Value::Number(number)) => number
            .as_f64()
            .map(|value| Some(FieldValue::Float(value)))
            .ok_or_else(|| DecodeError::InvalidField {
                field: FIELD_LAST_VALUE,
                reason: format!("number {} is not representable as f64", number),
            }),
        Some(other) => Err(DecodeError::InvalidField {
            field: FIELD_LAST_VALUE,
            reason: format!("expected number or boolean, got {}", json_kind(other)),
        }),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
