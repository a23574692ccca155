pub mod data;
pub mod point;

pub use data::{
    FIELD_DEVIATION_NOMINAL, FIELD_DEVIATION_PERCENT, FIELD_LAST_VALUE, FIELD_RUNNING_AVERAGE,
    FIELD_TRUE_PERCENTAGE, FieldValue, FilteredStats, RawMessage, TAG_DEVICE, TAG_TYPE,
};
pub use point::{Point, PointError};
