//! HTTP API 模块
//!
//! 提供日程 CRUD 与统计分析接口。
//! 分析请求在进入计算引擎之前完成参数校验，并且只读取一次当前时间。

mod handlers;
mod server;

pub use handlers::{AppState, Clock};
pub use server::{create_router, ApiServer, ServerHandle};
