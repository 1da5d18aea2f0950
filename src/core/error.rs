//! 错误处理模块
//!
//! 定义了场景图、组件系统和纹理缓存使用的统一错误类型。
//!
//! # 设计原则
//!
//! - 所有错误在引发它的调用处同步返回，本模块不做任何自动重试
//! - 失败的树操作和组件操作不会留下部分修改
//! - 为每种错误类型提供清晰的上下文信息

use std::fmt;

/// 场景系统统一的 Result 类型
pub type Result<T> = std::result::Result<T, DistSceneError>;

/// 场景系统的错误类型
#[derive(Debug)]
pub enum DistSceneError {
    /// 资源键无法解析到任何资源
    ResourceNotFound(String),

    /// 非法的树操作或参数（重复挂载、产生环、失效的节点句柄等）
    InvalidArgument(String),

    /// 节点上已经存在同类型组件，且策略禁止重复
    DuplicateComponent { node: String, component: String },

    /// 资源已解析，但像素数据加载失败
    AssetLoad { key: String, reason: String },

    /// 配置错误
    Config(ConfigError),

    /// IO 错误
    Io(std::io::Error),

    /// 日志系统错误
    Log(String),
}

/// 配置相关的错误
#[derive(Debug)]
pub enum ConfigError {
    /// 配置文件未找到
    FileNotFound(String),

    /// 配置文件解析失败
    ParseError(String),

    /// 配置值无效
    InvalidValue { field: String, reason: String },
}

impl DistSceneError {
    /// 快捷构造 `InvalidArgument`
    pub fn invalid(msg: impl Into<String>) -> Self {
        DistSceneError::InvalidArgument(msg.into())
    }

    pub fn is_resource_not_found(&self) -> bool {
        matches!(self, DistSceneError::ResourceNotFound(_))
    }

    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, DistSceneError::InvalidArgument(_))
    }

    pub fn is_duplicate_component(&self) -> bool {
        matches!(self, DistSceneError::DuplicateComponent { .. })
    }
}

impl fmt::Display for DistSceneError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DistSceneError::ResourceNotFound(key) => write!(f, "Resource not found: {}", key),
            DistSceneError::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
            DistSceneError::DuplicateComponent { node, component } => {
                write!(f, "Node '{}' already has a '{}' component", node, component)
            }
            DistSceneError::AssetLoad { key, reason } => {
                write!(f, "Failed to load asset '{}': {}", key, reason)
            }
            DistSceneError::Config(e) => write!(f, "Configuration error: {}", e),
            DistSceneError::Io(e) => write!(f, "IO error: {}", e),
            DistSceneError::Log(msg) => write!(f, "Log error: {}", msg),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::FileNotFound(path) => write!(f, "Config file not found: {}", path),
            ConfigError::ParseError(msg) => write!(f, "Failed to parse config: {}", msg),
            ConfigError::InvalidValue { field, reason } => {
                write!(f, "Invalid value for '{}': {}", field, reason)
            }
        }
    }
}

impl std::error::Error for DistSceneError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DistSceneError::Io(e) => Some(e),
            DistSceneError::Config(e) => Some(e),
            _ => None,
        }
    }
}

impl std::error::Error for ConfigError {}

// 实现 From trait 以便于错误转换
impl From<std::io::Error> for DistSceneError {
    fn from(err: std::io::Error) -> Self {
        DistSceneError::Io(err)
    }
}

impl From<ConfigError> for DistSceneError {
    fn from(err: ConfigError) -> Self {
        DistSceneError::Config(err)
    }
}
