//! 时序点位。
//!
//! 点位只能通过 [`Point::new`] 构造：measurement 与两个标签必须非空，
//! 时间戳必须落在纳秒可表示范围内，否则构造失败。

use crate::data::{FieldValue, TAG_DEVICE, TAG_TYPE};
use chrono::{DateTime, FixedOffset};
use std::fmt;

/// 点位构造错误。
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PointError {
    #[error("empty measurement")]
    EmptyMeasurement,
    #[error("missing tag: {0}")]
    MissingTag(&'static str),
    #[error("duplicate field: {0}")]
    DuplicateField(&'static str),
    #[error("timestamp out of nanosecond range: {0}")]
    TimestampOutOfRange(String),
}

/// 单个时序点位（measurement + device/type 标签 + 纳秒时间戳 + 字段）。
#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    measurement: String,
    device: String,
    sensor_type: String,
    timestamp: DateTime<FixedOffset>,
    timestamp_ns: i64,
    fields: Vec<(&'static str, FieldValue)>,
}

impl Point {
    pub fn new(
        measurement: impl Into<String>,
        device: impl Into<String>,
        sensor_type: impl Into<String>,
        timestamp: DateTime<FixedOffset>,
    ) -> Result<Self, PointError> {
        let measurement = measurement.into();
        let device = device.into();
        let sensor_type = sensor_type.into();
        if measurement.is_empty() {
            return Err(PointError::EmptyMeasurement);
        }
        if device.is_empty() {
            return Err(PointError::MissingTag(TAG_DEVICE));
        }
        if sensor_type.is_empty() {
            return Err(PointError::MissingTag(TAG_TYPE));
        }
        let timestamp_ns = timestamp
            .timestamp_nanos_opt()
            .ok_or_else(|| PointError::TimestampOutOfRange(timestamp.to_rfc3339()))?;
        Ok(Self {
            measurement,
            device,
            sensor_type,
            timestamp,
            timestamp_ns,
            fields: Vec::new(),
        })
    }

    /// 追加字段；同名字段不允许重复。
    pub fn with_field(mut self, name: &'static str, value: FieldValue) -> Result<Self, PointError> {
        if self.field(name).is_some() {
            return Err(PointError::DuplicateField(name));
        }
        self.fields.push((name, value));
        Ok(self)
    }

    pub fn measurement(&self) -> &str {
        &self.measurement
    }

    pub fn device(&self) -> &str {
        &self.device
    }

    pub fn sensor_type(&self) -> &str {
        &self.sensor_type
    }

    /// 标签集合，按键排序。
    pub fn tags(&self) -> [(&'static str, &str); 2] {
        [(TAG_DEVICE, &self.device), (TAG_TYPE, &self.sensor_type)]
    }

    /// 原始时间戳（保留报文中的时区偏移）。
    pub fn timestamp(&self) -> DateTime<FixedOffset> {
        self.timestamp
    }

    /// Unix 纳秒时间戳。
    pub fn timestamp_ns(&self) -> i64 {
        self.timestamp_ns
    }

    pub fn fields(&self) -> &[(&'static str, FieldValue)] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value)
    }

    pub fn field_names(&self) -> Vec<&'static str> {
        self.fields.iter().map(|(key, _)| *key).collect()
    }
}

impl fmt::Display for Point {
    /// 日志用摘要，不做 line protocol 转义。
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{}={},{}={} ",
            self.measurement, TAG_DEVICE, self.device, TAG_TYPE, self.sensor_type
        )?;
        for (index, (key, value)) in self.fields.iter().enumerate() {
            if index > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}={}", key, value)?;
        }
        write!(f, " {}", self.timestamp.to_rfc3339())
    }
}
