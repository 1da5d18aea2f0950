//! 场景描述模块
//!
//! 定义场景描述文件（scene.toml）的结构：节点树、节点颜色、变换和精灵纹理。
//! 由 [`Director::load_scene`](crate::director::Director::load_scene) 实例化为场景。
//!
//! ```toml
//! name = "MainMenu"
//!
//! [[nodes]]
//! name = "Button"
//! color = [255, 0, 0, 255]
//! transform = { position = [10.0, 20.0, 0.0] }
//! sprite = { texture = "button.png" }
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::core::error::{ConfigError, DistSceneError, Result};
use crate::core::math::{Color, Rect};

/// 节点变换描述
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformConfig {
    /// 位置 (x, y, z)
    #[serde(default = "default_position")]
    pub position: [f32; 3],

    /// 绕 Z 轴旋转（度数）
    #[serde(default)]
    pub rotation: f32,

    /// 缩放 (x, y)
    #[serde(default = "default_scale")]
    pub scale: [f32; 2],
}

fn default_position() -> [f32; 3] {
    [0.0, 0.0, 0.0]
}

fn default_scale() -> [f32; 2] {
    [1.0, 1.0]
}

fn default_enabled() -> bool {
    true
}

fn default_scene_name() -> String {
    "Scene".to_string()
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            position: default_position(),
            rotation: 0.0,
            scale: default_scale(),
        }
    }
}

/// 精灵描述
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpriteConfig {
    /// 纹理资源键
    pub texture: String,

    /// 纹理子区域，缺省表示整张纹理
    #[serde(default)]
    pub rect: Option<Rect>,
}

/// 节点描述
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeConfig {
    pub name: String,

    #[serde(default)]
    pub color: Color,

    #[serde(default = "default_enabled")]
    pub enabled: bool,

    #[serde(default)]
    pub transform: TransformConfig,

    /// 精灵组件（可选）
    #[serde(default)]
    pub sprite: Option<SpriteConfig>,

    /// 通过组件注册表按名称挂载的额外组件
    #[serde(default)]
    pub components: Vec<String>,

    #[serde(default)]
    pub children: Vec<NodeConfig>,
}

impl NodeConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            color: Color::WHITE,
            enabled: true,
            transform: TransformConfig::default(),
            sprite: None,
            components: Vec::new(),
            children: Vec::new(),
        }
    }

    /// 子树中的节点总数（含自身）
    pub fn subtree_len(&self) -> usize {
        1 + self.children.iter().map(NodeConfig::subtree_len).sum::<usize>()
    }
}

/// 场景配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneConfig {
    /// 场景名称，同时作为根节点名称
    #[serde(default = "default_scene_name")]
    pub name: String,

    /// 根节点下的顶层节点
    #[serde(default)]
    pub nodes: Vec<NodeConfig>,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            name: default_scene_name(),
            nodes: Vec::new(),
        }
    }
}

impl SceneConfig {
    /// 从 TOML 字符串解析
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        toml::from_str(contents).map_err(|e| {
            DistSceneError::Config(ConfigError::ParseError(format!(
                "Failed to parse scene config: {}",
                e
            )))
        })
    }

    /// 从文件加载场景配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| {
            DistSceneError::Config(ConfigError::FileNotFound(format!(
                "Failed to read scene config file '{}': {}",
                path.display(),
                e
            )))
        })?;

        Self::from_toml_str(&contents)
    }

    /// 从文件加载，如果文件不存在或无法解析则返回默认配置
    pub fn from_file_or_default<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        if path.exists() {
            match Self::from_file(path) {
                Ok(config) => {
                    tracing::info!("Loaded scene config from: {}", path.display());
                    config
                }
                Err(e) => {
                    tracing::warn!("Failed to load scene config: {}, using defaults", e);
                    Self::default()
                }
            }
        } else {
            tracing::info!("Scene config not found, using defaults");
            Self::default()
        }
    }

    /// 保存配置到文件
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let contents = toml::to_string_pretty(self).map_err(|e| {
            DistSceneError::Config(ConfigError::ParseError(format!(
                "Failed to serialize scene config: {}",
                e
            )))
        })?;

        fs::write(path, contents)?;
        tracing::info!("Saved scene config to: {}", path.display());
        Ok(())
    }

    /// 描述中的节点总数（不含根节点）
    pub fn node_count(&self) -> usize {
        self.nodes.iter().map(NodeConfig::subtree_len).sum()
    }
}
