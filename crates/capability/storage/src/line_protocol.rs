//! InfluxDB v2 Line Protocol 编码。
//!
//! ```text
//! measurement,device=<d>,type=<t> field1=v1,field2=v2 timestamp_ns
//! ```
//!
//! 参考：<https://docs.influxdata.com/influxdb/v2/reference/syntax/line-protocol/>

use domain::{FieldValue, Point};

/// 将点位编码为一行 line protocol（纳秒精度）。
pub fn encode_point(point: &Point) -> String {
    let mut line = escape_measurement(point.measurement());

    for (key, value) in point.tags() {
        line.push(',');
        line.push_str(&escape_key(key));
        line.push('=');
        line.push_str(&escape_key(value));
    }

    line.push(' ');
    for (index, (key, value)) in point.fields().iter().enumerate() {
        if index > 0 {
            line.push(',');
        }
        line.push_str(&escape_key(key));
        line.push('=');
        line.push_str(&encode_field_value(value));
    }

    line.push(' ');
    line.push_str(&point.timestamp_ns().to_string());
    line
}

/// 字段值编码：浮点原样输出，布尔输出 true/false。
pub fn encode_field_value(value: &FieldValue) -> String {
    match value {
        FieldValue::Float(v) => format!("{}", v),
        FieldValue::Boolean(v) => {
            if *v {
                "true".to_string()
            } else {
                "false".to_string()
            }
        }
    }
}

/// measurement：逗号与空格需转义。
fn escape_measurement(s: &str) -> String {
    escape(s, &[',', ' '])
}

/// 标签键、标签值、字段键：逗号、等号、空格需转义。
fn escape_key(s: &str) -> String {
    escape(s, &[',', '=', ' '])
}

/// 反斜杠先转义，避免末尾 `\` 吞掉后续分隔符；控制字符写成转义序列，保证单行。
fn escape(s: &str, specials: &[char]) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if specials.contains(&c) => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out
}
