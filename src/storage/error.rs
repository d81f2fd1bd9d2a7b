//! Storage module error types
//!
//! Provides error types for database operations.

use thiserror::Error;

use crate::models::ValidationError;

/// Storage operation error type
#[derive(Error, Debug)]
pub enum StorageError {
    /// Database connection or query error
    #[error("数据库错误: {0}")]
    Database(#[from] rusqlite::Error),

    /// Database directory could not be created
    #[error("文件操作错误: {0}")]
    Io(#[from] std::io::Error),

    /// Record rejected before any write
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// Schedule not found
    #[error("日程不存在: {0}")]
    NotFound(String),

    /// Lock error when accessing database
    #[error("数据库锁错误")]
    LockError,

    /// Stored row that cannot be decoded
    #[error("数据记录损坏: {0}")]
    CorruptRecord(String),
}
