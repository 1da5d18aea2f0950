//! 核心功能模块
//!
//! 本模块提供场景系统的基础功能，包括数学类型、日志系统、配置管理和错误处理。
//! 这些模块独立于具体的图形 API。
//!
//! # 模块组织
//!
//! - `math`：数学类型（向量、矩阵、颜色、矩形）
//! - `log`：日志系统，提供结构化的日志记录功能
//! - `config`：配置管理，支持从配置文件加载设置
//! - `error`：错误处理，定义统一的错误类型
//! - `scene`：场景描述文件（scene.toml）

pub mod math;
pub mod log;
pub mod config;
pub mod error;
pub mod scene;

// 重新导出常用类型，方便使用
pub use math::{Vector2, Vector3, Vector4, Matrix4, Quaternion, Color, Rect};
pub use error::{Result, DistSceneError};
pub use config::Config;
pub use scene::SceneConfig;
