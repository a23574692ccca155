//! # Bridge Storage 模块
//!
//! 时序点位的写入层，只写不读。
//!
//! ## 模块说明
//!
//! - [`traits`]：`PointStore` 写入接口
//! - [`error`]：存储错误类型
//! - [`line_protocol`]：InfluxDB v2 line protocol 编码
//! - [`influx`]：基于 reqwest 的 InfluxDB v2 实现（生产环境）
//! - [`in_memory`]：内存实现（测试与演示）
//!
//! ## 使用示例
//!
//! ```rust,ignore
//! use bridge_storage::{InfluxPointStore, InfluxSettings, PointStore};
//!
//! let store = InfluxPointStore::connect(InfluxSettings {
//!     url: "http://localhost:8086".to_string(),
//!     org: "acme".to_string(),
//!     bucket: "sensors".to_string(),
//!     token: token.secret().to_string(),
//! })
//! .await?;
//! store.write_point(&point).await?;
//! ```

pub mod error;
pub mod in_memory;
pub mod influx;
pub mod line_protocol;
pub mod traits;

pub use error::*;
pub use in_memory::InMemoryPointStore;
pub use influx::{InfluxPointStore, InfluxSettings};
pub use line_protocol::encode_point;
pub use traits::*;
