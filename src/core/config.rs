//! 配置管理模块
//!
//! 提供场景系统配置的加载、解析和管理功能。
//! 支持从 TOML 配置文件加载，也支持命令行参数覆盖。
//!
//! # 配置文件格式 (config.toml)
//!
//! ```toml
//! [logging]
//! level = "info"      # trace, debug, info, warn, error
//! file_output = false
//! log_file = "distscene.log"
//!
//! [assets]
//! search_paths = ["assets", "res"]
//!
//! [scene]
//! allow_duplicate_components = false
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use super::error::{ConfigError, Result};

/// 引擎配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// 日志配置
    #[serde(default)]
    pub logging: LoggingConfig,

    /// 资源配置
    #[serde(default)]
    pub assets: AssetsConfig,

    /// 场景图配置
    #[serde(default)]
    pub scene: SceneGraphConfig,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub level: LogLevel,

    /// 是否输出到文件
    #[serde(default = "default_file_output")]
    pub file_output: bool,

    /// 日志文件路径
    #[serde(default = "default_log_file")]
    pub log_file: String,
}

/// 日志级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

/// 资源配置
///
/// 纹理缓存按顺序在这些目录中解析资源键。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetsConfig {
    /// 资源搜索目录（按优先级排列）
    #[serde(default = "default_search_paths")]
    pub search_paths: Vec<String>,
}

/// 场景图配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneGraphConfig {
    /// 是否允许同一节点挂载多个同类型组件
    #[serde(default)]
    pub allow_duplicate_components: bool,
}

// 默认值函数
fn default_log_level() -> LogLevel { LogLevel::Info }
fn default_file_output() -> bool { false }
fn default_log_file() -> String { "distscene.log".to_string() }
fn default_search_paths() -> Vec<String> { vec!["assets".to_string()] }

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file_output: default_file_output(),
            log_file: default_log_file(),
        }
    }
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            search_paths: default_search_paths(),
        }
    }
}

impl Default for SceneGraphConfig {
    fn default() -> Self {
        Self {
            allow_duplicate_components: false,
        }
    }
}

impl LogLevel {
    /// 从字符串解析日志级别（不区分大小写）
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "trace" => Some(LogLevel::Trace),
            "debug" => Some(LogLevel::Debug),
            "info" => Some(LogLevel::Info),
            "warn" => Some(LogLevel::Warn),
            "error" => Some(LogLevel::Error),
            _ => None,
        }
    }

    /// EnvFilter 使用的指令字符串
    pub fn as_filter(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl Config {
    /// 从配置文件加载
    ///
    /// # 参数
    ///
    /// * `path` - 配置文件路径
    ///
    /// # 返回值
    ///
    /// 成功返回 `Config` 实例，失败返回错误
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_str = path.as_ref().to_string_lossy().to_string();

        let contents = std::fs::read_to_string(path)
            .map_err(|_| ConfigError::FileNotFound(path_str.clone()))?;

        Self::from_toml_str(&contents)
    }

    /// 从 TOML 字符串解析
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        toml::from_str(contents).map_err(|e| ConfigError::ParseError(e.to_string()).into())
    }

    /// 从配置文件加载，如果文件不存在则使用默认配置
    pub fn from_file_or_default<P: AsRef<Path>>(path: P) -> Self {
        Self::from_file(path).unwrap_or_default()
    }

    /// 保存配置到文件
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let contents = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;

        std::fs::write(path, contents)?;
        Ok(())
    }

    /// 从命令行参数覆盖配置
    ///
    /// 支持的参数：
    /// - `--asset-dir <dir>`: 在搜索路径最前面插入资源目录
    /// - `--log-level <level>`: 设置日志级别
    /// - `--allow-duplicates`: 允许同类型组件重复挂载
    pub fn apply_args<I>(&mut self, args: I)
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let args: Vec<String> = args.into_iter().map(|s| s.as_ref().to_string()).collect();

        if let Some(idx) = args.iter().position(|a| a == "--asset-dir") {
            if let Some(dir) = args.get(idx + 1) {
                self.assets.search_paths.insert(0, dir.clone());
            }
        }

        if let Some(idx) = args.iter().position(|a| a == "--log-level") {
            if let Some(level) = args.get(idx + 1).and_then(|s| LogLevel::parse(s)) {
                self.logging.level = level;
            }
        }

        if args.iter().any(|a| a == "--allow-duplicates") {
            self.scene.allow_duplicate_components = true;
        }
    }

    /// 验证配置的有效性
    pub fn validate(&self) -> Result<()> {
        if self.assets.search_paths.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "assets.search_paths".to_string(),
                reason: "At least one asset search path is required".to_string(),
            }.into());
        }

        if self.logging.file_output && self.logging.log_file.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "logging.log_file".to_string(),
                reason: "Log file path must not be empty when file output is enabled".to_string(),
            }.into());
        }

        Ok(())
    }
}
