// Schedule Board Library
// Schedule storage, HTTP API and analytics for appointment planning

pub mod analytics;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod server;
pub mod storage;

pub use config::AppConfig;
pub use error::AppError;
pub use server::{ApiServer, Clock, ServerHandle};
pub use storage::Database;
