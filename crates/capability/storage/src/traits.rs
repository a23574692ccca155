//! 存储接口 Trait 定义
//!
//! - PointStore：时序点位写入
//!
//! 设计原则：
//! - 只写不读
//! - 所有接口返回 StorageError
//! - 使用 async_trait 支持动态分发

use crate::error::StorageError;
use async_trait::async_trait;
use domain::Point;

/// 时序点位存储接口
#[async_trait]
pub trait PointStore: Send + Sync {
    /// 连通性检查
    async fn ping(&self) -> Result<(), StorageError>;

    /// 写入单个点位
    async fn write_point(&self, point: &Point) -> Result<(), StorageError>;
}
