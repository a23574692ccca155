//! 时序点位内存实现
//!
//! 仅用于本地测试和占位。

use crate::error::StorageError;
use crate::traits::PointStore;
use domain::Point;
use std::sync::RwLock;

/// 时序点位内存存储
#[derive(Default)]
pub struct InMemoryPointStore {
    points: RwLock<Vec<Point>>,
}

impl InMemoryPointStore {
    /// 创建新的内存存储
    pub fn new() -> Self {
        Self {
            points: RwLock::new(Vec::new()),
        }
    }

    /// 获取已写入的点位数量（用于测试）
    pub fn len(&self) -> usize {
        self.points.read().map(|v| v.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 已写入点位的副本，按写入顺序
    pub fn points(&self) -> Vec<Point> {
        self.points.read().map(|v| v.clone()).unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl PointStore for InMemoryPointStore {
    async fn ping(&self) -> Result<(), StorageError> {
        Ok(())
    }

    async fn write_point(&self, point: &Point) -> Result<(), StorageError> {
        let mut points = self
            .points
            .write()
            .map_err(|_| StorageError::Unavailable("lock failed".to_string()))?;
        points.push(point.clone());
        Ok(())
    }
}
