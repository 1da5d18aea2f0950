//! 纹理缓存
//!
//! 按解析后的唯一键对纹理去重，返回共享句柄。
//! 添加纹理只做键解析，像素数据由 [`TextureCache::load_pending`] 在帧循环中补齐。

use std::collections::HashMap;

use crate::core::config::AssetsConfig;
use crate::core::error::{DistSceneError, Result};
use crate::texture::{AssetSource, FileSystemSource, Texture, TextureState};

/// 待加载纹理被移出缓存时的失败原因
const EVICTED: &str = "evicted";

/// 纹理缓存
///
/// 缓存条目一直保留，直到显式调用 [`remove_texture`](Self::remove_texture) 或
/// [`clear`](Self::clear)。
pub struct TextureCache {
    source: Box<dyn AssetSource>,
    /// 唯一键 -> 纹理
    textures: HashMap<String, Texture>,
    /// 请求键 -> 唯一键
    aliases: HashMap<String, String>,
}

impl TextureCache {
    pub fn new(source: impl AssetSource + 'static) -> Self {
        Self {
            source: Box::new(source),
            textures: HashMap::new(),
            aliases: HashMap::new(),
        }
    }

    /// 使用配置中的搜索目录创建文件系统纹理缓存
    pub fn from_config(config: &AssetsConfig) -> Self {
        Self::new(FileSystemSource::new(config.search_paths.iter().cloned()))
    }

    /// 添加图片
    ///
    /// 已缓存的键直接返回同一个句柄。新键只做解析并插入一个 `Pending` 句柄，
    /// 不等待像素数据。无法解析时返回 `ResourceNotFound`，缓存保持不变。
    pub fn add_image(&mut self, key: &str) -> Result<Texture> {
        if let Some(texture) = self.get(key) {
            return Ok(texture);
        }

        let resolved = match self.source.resolve(key) {
            Some(resolved) => resolved,
            None => {
                crate::engine_warn!(key, "Texture key could not be resolved");
                return Err(DistSceneError::ResourceNotFound(key.to_string()));
            }
        };

        // 不同请求键可能解析到同一资源
        if let Some(texture) = self.textures.get(&resolved).cloned() {
            self.aliases.insert(key.to_string(), resolved);
            return Ok(texture);
        }

        let texture = Texture::pending(resolved.clone(), key);
        self.textures.insert(resolved.clone(), texture.clone());
        self.aliases.insert(key.to_string(), resolved.clone());
        tracing::debug!(key, resolved = %resolved, "Texture added to cache");

        Ok(texture)
    }

    /// 添加图片并立即加载像素数据
    pub fn add_image_sync(&mut self, key: &str) -> Result<Texture> {
        let texture = self.add_image(key)?;
        if texture.is_pending() {
            self.load_texture(&texture);
        }

        match texture.state() {
            TextureState::Failed(reason) => Err(DistSceneError::AssetLoad {
                key: texture.key().to_string(),
                reason,
            }),
            _ => Ok(texture),
        }
    }

    /// 为所有待加载纹理拉取像素数据
    ///
    /// 返回本次变为 `Ready` 的纹理数量。加载失败的纹理标记为 `Failed`，不会重试，也不会被移出缓存。
    pub fn load_pending(&mut self) -> usize {
        let pending: Vec<Texture> = self
            .textures
            .values()
            .filter(|t| t.is_pending())
            .cloned()
            .collect();

        pending.iter().filter(|t| self.load_texture(t)).count()
    }

    fn load_texture(&self, texture: &Texture) -> bool {
        match self.source.load(texture.key()) {
            Ok(data) => {
                crate::engine_info!(
                    key = texture.key(),
                    width = data.width,
                    height = data.height,
                    "Texture loaded"
                );
                texture.set_ready(data);
                true
            }
            Err(e) => {
                crate::engine_warn!(key = texture.key(), error = %e, "Texture load failed");
                texture.set_failed(e.to_string());
                false
            }
        }
    }

    /// 按请求键或唯一键查找
    pub fn get(&self, key: &str) -> Option<Texture> {
        let resolved = self.aliases.get(key).map(String::as_str).unwrap_or(key);
        self.textures.get(resolved).cloned()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// 待加载纹理数量
    pub fn pending_count(&self) -> usize {
        self.textures.values().filter(|t| t.is_pending()).count()
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }

    /// 显式移除纹理（连同指向它的所有请求键）
    ///
    /// 已发出的句柄仍然有效；精灵帧中的弱引用在最后一个句柄释放后失效。
    /// 仍处于 `Pending` 的纹理不会再被加载，标记为 `Failed`。
    pub fn remove_texture(&mut self, key: &str) -> Option<Texture> {
        let resolved = self
            .aliases
            .get(key)
            .cloned()
            .unwrap_or_else(|| key.to_string());

        let removed = self.textures.remove(&resolved)?;
        self.aliases.retain(|_, target| *target != resolved);
        fail_if_pending(&removed);
        tracing::debug!(key = %resolved, "Texture removed from cache");
        Some(removed)
    }

    /// 清空缓存
    pub fn clear(&mut self) {
        for texture in self.textures.values() {
            fail_if_pending(texture);
        }
        self.textures.clear();
        self.aliases.clear();
    }
}

fn fail_if_pending(texture: &Texture) {
    if texture.is_pending() {
        texture.set_failed(EVICTED);
        crate::engine_warn!(key = texture.key(), "Pending texture evicted before loading");
    }
}
