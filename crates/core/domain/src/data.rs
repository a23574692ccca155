use std::fmt;

/// 总线输入的原始消息。
#[derive(Debug, Clone)]
pub struct RawMessage {
    pub subject: String,
    pub payload: Vec<u8>,
    pub received_at_ms: i64,
}

/// 标签键：设备。
pub const TAG_DEVICE: &str = "device";
/// 标签键：统计/传感器类型。
pub const TAG_TYPE: &str = "type";

pub const FIELD_LAST_VALUE: &str = "lastValue";
pub const FIELD_DEVIATION_NOMINAL: &str = "deviationNominal";
pub const FIELD_DEVIATION_PERCENT: &str = "deviationPercent";
pub const FIELD_RUNNING_AVERAGE: &str = "runningAverage";
pub const FIELD_TRUE_PERCENTAGE: &str = "truePercentage";

/// 点位字段值（类型与 JSON 原值保持一致，不做互转）。
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue {
    Float(f64),
    Boolean(bool),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Float(v) => write!(f, "{}", v),
            FieldValue::Boolean(v) => write!(f, "{}", v),
        }
    }
}

/// `filtered` 的两种统计形态。
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FilteredStats {
    /// 数值型：偏差统计。
    Deviation {
        deviation_nominal: f64,
        deviation_percent: f64,
        running_average: f64,
    },
    /// 布尔型：为真比例。
    BooleanConsensus { true_percentage: f64 },
}

impl FilteredStats {
    /// 该形态对应的字段集合（顺序固定）。
    pub fn fields(&self) -> Vec<(&'static str, FieldValue)> {
        match *self {
            FilteredStats::Deviation {
                deviation_nominal,
                deviation_percent,
                running_average,
            } => vec![
                (FIELD_DEVIATION_NOMINAL, FieldValue::Float(deviation_nominal)),
                (FIELD_DEVIATION_PERCENT, FieldValue::Float(deviation_percent)),
                (FIELD_RUNNING_AVERAGE, FieldValue::Float(running_average)),
            ],
            FilteredStats::BooleanConsensus { true_percentage } => {
                vec![(FIELD_TRUE_PERCENTAGE, FieldValue::Float(true_percentage))]
            }
        }
    }
}
