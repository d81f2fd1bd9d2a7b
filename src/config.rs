//! 服务配置模块
//!
//! 管理监听地址、端口、数据库路径和日志级别，支持从配置文件读取和保存。

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// 默认端口号
pub const DEFAULT_PORT: u16 = 8000;

/// 默认监听地址
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// 配置文件名
const CONFIG_FILENAME: &str = "settings.yaml";

/// 默认数据库文件名
const DATABASE_FILENAME: &str = "schedules.db";

/// 应用配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// 监听地址
    #[serde(default = "default_host")]
    pub host: String,
    /// API 端口
    #[serde(default = "default_port")]
    pub port: u16,
    /// 数据库文件路径（相对路径基于配置目录）
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,
    /// 日志级别 (trace/debug/info/warn/error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_database_path() -> PathBuf {
    PathBuf::from(DATABASE_FILENAME)
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: DEFAULT_PORT,
            database_path: default_database_path(),
            log_level: default_log_level(),
        }
    }
}

impl AppConfig {
    /// 从配置目录加载配置
    ///
    /// # Arguments
    /// * `config_dir` - 配置目录路径
    ///
    /// # Returns
    /// 配置对象，如果文件不存在或无法解析则返回默认配置
    pub fn load(config_dir: &Path) -> Self {
        let config_path = config_dir.join(CONFIG_FILENAME);

        if !config_path.exists() {
            return Self::default();
        }

        match fs::read_to_string(&config_path) {
            Ok(content) => serde_yaml::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!(path = %config_path.display(), error = %e, "Invalid config file, using defaults");
                Self::default()
            }),
            Err(e) => {
                tracing::warn!(path = %config_path.display(), error = %e, "Unreadable config file, using defaults");
                Self::default()
            }
        }
    }

    /// 保存配置到配置目录
    ///
    /// # Arguments
    /// * `config_dir` - 配置目录路径
    pub fn save(&self, config_dir: &Path) -> Result<(), String> {
        let config_path = config_dir.join(CONFIG_FILENAME);

        // 确保目录存在
        if !config_dir.exists() {
            fs::create_dir_all(config_dir)
                .map_err(|e| format!("Failed to create config directory: {}", e))?;
        }

        let content = self.to_yaml()?;

        fs::write(&config_path, content)
            .map_err(|e| format!("Failed to write config file: {}", e))
    }

    /// 序列化为 YAML 文本
    pub fn to_yaml(&self) -> Result<String, String> {
        serde_yaml::to_string(self).map_err(|e| format!("Failed to serialize config: {}", e))
    }

    /// 验证端口是否有效
    ///
    /// 端口必须在 1024-65535 范围内
    pub fn validate_port(port: u16) -> Result<(), String> {
        if port < 1024 {
            return Err("Port must be >= 1024 (non-privileged ports)".to_string());
        }
        Ok(())
    }

    /// 解析数据库文件的实际路径
    ///
    /// 绝对路径保持不变，相对路径基于配置目录
    pub fn resolve_database_path(&self, config_dir: &Path) -> PathBuf {
        if self.database_path.is_absolute() {
            self.database_path.clone()
        } else {
            config_dir.join(&self.database_path)
        }
    }

    /// 获取配置文件的完整路径
    pub fn get_config_path(config_dir: &Path) -> PathBuf {
        config_dir.join(CONFIG_FILENAME)
    }

    /// 默认配置目录
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("schedule-board")
    }
}

#[cfg(test)]
mod config_tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.database_path, PathBuf::from("schedules.db"));
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_load_nonexistent_config() {
        let dir = tempdir().unwrap();
        let config = AppConfig::load(dir.path());
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_save_and_load_config() {
        let dir = tempdir().unwrap();
        let config = AppConfig {
            port: 12345,
            log_level: "debug".to_string(),
            ..Default::default()
        };

        config.save(dir.path()).unwrap();

        let loaded = AppConfig::load(dir.path());
        assert_eq!(loaded.port, 12345);
        assert_eq!(loaded.log_level, "debug");
        assert_eq!(loaded.host, DEFAULT_HOST);
    }

    #[test]
    fn test_save_creates_directory() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("a").join("b");

        AppConfig::default().save(&nested).unwrap();
        assert!(AppConfig::get_config_path(&nested).exists());
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("settings.yaml"), "port: 9100\n").unwrap();

        let config = AppConfig::load(dir.path());
        assert_eq!(config.port, 9100);
        assert_eq!(config.host, DEFAULT_HOST);
        assert_eq!(config.database_path, PathBuf::from("schedules.db"));
    }

    #[test]
    fn test_invalid_config_falls_back_to_default() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("settings.yaml"), "port: [not, a, port]\n").unwrap();

        let config = AppConfig::load(dir.path());
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_validate_port() {
        assert!(AppConfig::validate_port(1024).is_ok());
        assert!(AppConfig::validate_port(8000).is_ok());
        assert!(AppConfig::validate_port(65535).is_ok());
        assert!(AppConfig::validate_port(1023).is_err());
        assert!(AppConfig::validate_port(80).is_err());
    }

    #[test]
    fn test_resolve_database_path() {
        let dir = tempdir().unwrap();
        let config = AppConfig::default();
        assert_eq!(
            config.resolve_database_path(dir.path()),
            dir.path().join("schedules.db")
        );

        let absolute = dir.path().join("elsewhere.db");
        let config = AppConfig {
            database_path: absolute.clone(),
            ..Default::default()
        };
        assert_eq!(config.resolve_database_path(Path::new("/ignored")), absolute);
    }
}
