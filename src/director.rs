//! 导演（场景宿主上下文）
//!
//! `Director` 是每个进程一个的显式上下文对象：持有纹理缓存、组件注册表和当前激活的场景。
//! 需要解析资源的代码通过它拿到纹理缓存，而不是访问全局状态。
//! 启动时创建，宿主关闭时随之释放。

use std::mem;

use crate::component::{ComponentRegistry, Sprite};
use crate::core::config::Config;
use crate::core::error::Result;
use crate::core::math::Rect;
use crate::core::scene::{NodeConfig, SceneConfig};
use crate::scene::{NodeId, Scene, Transform};
use crate::texture::{SpriteFrame, TextureCache};

/// 单帧统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// 本帧编号（从 1 开始）
    pub frame: u64,
    /// 本帧完成加载的纹理数量
    pub textures_loaded: usize,
    /// 本帧渲染队列长度
    pub render_items: usize,
}

/// 导演
pub struct Director {
    config: Config,
    textures: TextureCache,
    registry: ComponentRegistry,
    scene: Scene,
    frame: u64,
}

impl Director {
    /// 使用配置中的资源目录创建
    pub fn new(config: Config) -> Self {
        let textures = TextureCache::from_config(&config.assets);
        Self::with_texture_cache(config, textures)
    }

    /// 使用外部提供的纹理缓存创建
    pub fn with_texture_cache(config: Config, textures: TextureCache) -> Self {
        let scene = Scene::with_config("Scene", &config.scene);
        Self {
            config,
            textures,
            registry: ComponentRegistry::with_builtin(),
            scene,
            frame: 0,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// 当前激活的场景
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    /// 按当前场景图配置创建一个新的空场景（不激活）
    pub fn new_scene(&self, name: impl Into<String>) -> Scene {
        Scene::with_config(name, &self.config.scene)
    }

    /// 整体替换当前场景，返回被替换的场景
    pub fn run_scene(&mut self, scene: Scene) -> Scene {
        crate::engine_info!(from = self.scene.name(), to = scene.name(), "Scene transition");
        mem::replace(&mut self.scene, scene)
    }

    pub fn texture_cache(&self) -> &TextureCache {
        &self.textures
    }

    pub fn texture_cache_mut(&mut self) -> &mut TextureCache {
        &mut self.textures
    }

    pub fn registry(&self) -> &ComponentRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut ComponentRegistry {
        &mut self.registry
    }

    /// 同时借出当前场景和纹理缓存
    pub fn scene_and_textures(&mut self) -> (&mut Scene, &mut TextureCache) {
        (&mut self.scene, &mut self.textures)
    }

    /// 已执行的帧数
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// 执行一帧：补齐待加载纹理，更新组件，统计渲染队列
    pub fn main_loop(&mut self, delta_time: f32) -> FrameStats {
        self.frame += 1;
        let textures_loaded = self.textures.load_pending();
        self.scene.tick(delta_time);
        let render_items = self.scene.render_queue().len();

        tracing::trace!(frame = self.frame, textures_loaded, render_items, "Frame finished");
        FrameStats {
            frame: self.frame,
            textures_loaded,
            render_items,
        }
    }

    /// 根据场景描述构建场景（不激活）
    ///
    /// 任一节点失败则整体失败，已经加入纹理缓存的纹理保留。
    pub fn load_scene(&mut self, config: &SceneConfig) -> Result<Scene> {
        let mut scene = self.new_scene(config.name.clone());
        let root = scene.root();
        for node in &config.nodes {
            build_node(&mut scene, &mut self.textures, &self.registry, root, node)?;
        }

        crate::engine_info!(scene = %config.name, nodes = config.node_count(), "Scene built");
        Ok(scene)
    }
}

fn build_node(
    scene: &mut Scene,
    textures: &mut TextureCache,
    registry: &ComponentRegistry,
    parent: NodeId,
    config: &NodeConfig,
) -> Result<NodeId> {
    let id = scene.create_node(config.name.clone());
    {
        let node = scene.node_mut(id)?;
        node.set_color(config.color);
        node.set_enabled(config.enabled);
        node.transform = Transform::from(&config.transform);
    }
    scene.add_child(parent, id)?;

    if let Some(sprite_config) = &config.sprite {
        let texture = textures.add_image(&sprite_config.texture)?;
        let frame = SpriteFrame::with_texture(&texture, sprite_config.rect.unwrap_or(Rect::ZERO));
        scene.add_component::<Sprite>(id)?.set_sprite_frame(Some(frame));
    }

    for name in &config.components {
        scene.add_component_by_name(id, registry, name)?;
    }

    for child in &config.children {
        build_node(scene, textures, registry, id, child)?;
    }

    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::math::Color;
    use crate::texture::{MemorySource, TextureData};

    fn director() -> Director {
        let source = MemorySource::new()
            .with("button.png", TextureData::solid(16, 8, [255, 255, 255, 255]))
            .with("panel.png", TextureData::solid(64, 64, [0, 0, 0, 255]));
        Director::with_texture_cache(Config::default(), TextureCache::new(source))
    }

    #[test]
    fn test_basic_sprite_scenario() {
        let mut director = director();

        let node = director.scene_mut().create_node("Node");
        let root = director.scene().root();
        director.scene_mut().add_child(root, node).unwrap();

        director.scene_mut().set_color(node, Color::RED).unwrap();
        let sprite = director.scene_mut().add_component::<Sprite>(node).unwrap();
        assert_eq!(sprite.render_node().color(), Color::RED);

        let mut frame = SpriteFrame::new();
        let texture = director.texture_cache_mut().add_image("button.png").unwrap();
        frame.set_texture(&texture);

        let sprite = director.scene_mut().get_component_mut::<Sprite>(node).unwrap();
        sprite.set_sprite_frame(Some(frame));
        assert_eq!(sprite.render_node().texture(), Some(&texture));
        assert_eq!(sprite.render_node().color(), Color::RED);
    }

    #[test]
    fn test_missing_texture() {
        let mut director = director();
        let err = director.texture_cache_mut().add_image("missing.png").unwrap_err();
        assert!(err.is_resource_not_found());
    }

    #[test]
    fn test_main_loop_loads_pending_textures() {
        let mut director = director();
        let (scene, textures) = director.scene_and_textures();
        let root = scene.root();
        let node = scene.create_node("Button");
        scene.add_child(root, node).unwrap();
        let texture = textures.add_image("button.png").unwrap();
        scene
            .add_component::<Sprite>(node)
            .unwrap()
            .set_sprite_frame(Some(SpriteFrame::with_texture(&texture, Rect::ZERO)));

        let sprite = director.scene().get_component::<Sprite>(node).unwrap();
        assert_eq!(sprite.render_node().effective_rect(), None);

        let stats = director.main_loop(1.0 / 60.0);
        assert_eq!(stats, FrameStats { frame: 1, textures_loaded: 1, render_items: 1 });

        let sprite = director.scene().get_component::<Sprite>(node).unwrap();
        assert_eq!(sprite.render_node().effective_rect(), Some(Rect::new(0.0, 0.0, 16.0, 8.0)));
        assert_eq!(director.main_loop(1.0 / 60.0).textures_loaded, 0);
    }

    #[test]
    fn test_run_scene_replaces_wholesale() {
        let mut director = director();
        let root = director.scene().root();
        let node = director.scene_mut().create_node("Old");
        director.scene_mut().add_child(root, node).unwrap();

        let next = director.new_scene("Next");
        let previous = director.run_scene(next);
        assert_eq!(previous.name(), "Scene");
        assert_eq!(previous.node_count(), 2);
        assert_eq!(director.scene().name(), "Next");
        assert_eq!(director.scene().node_count(), 1);
    }

    #[test]
    fn test_load_scene() {
        let mut director = director();
        let config = SceneConfig::from_toml_str(
            r#"
            name = "Menu"

            [[nodes]]
            name = "Panel"
            color = [0, 0, 255, 255]
            sprite = { texture = "panel.png" }

            [[nodes.children]]
            name = "Button"
            color = [255, 0, 0, 255]
            transform = { position = [4.0, 2.0, 0.0] }
            sprite = { texture = "button.png", rect = { x = 0.0, y = 0.0, width = 8.0, height = 8.0 } }

            [[nodes]]
            name = "Hidden"
            enabled = false
            components = ["Sprite"]
            "#,
        )
        .unwrap();

        let scene = director.load_scene(&config).unwrap();
        director.run_scene(scene);

        let scene = director.scene();
        let root = scene.root();
        let panel = scene.find_child(root, "Panel").unwrap();
        let button = scene.find_child(panel, "Button").unwrap();
        let hidden = scene.find_child(root, "Hidden").unwrap();

        let sprite = scene.get_component::<Sprite>(button).unwrap();
        assert_eq!(sprite.render_node().color(), Color::RED);
        assert_eq!(sprite.render_node().rect(), Rect::new(0.0, 0.0, 8.0, 8.0));
        assert!(!scene.is_active(hidden));
        assert!(scene.get_component::<Sprite>(hidden).is_some());
        assert_eq!(scene.node(button).unwrap().transform.position().x, 4.0);
        assert_eq!(director.texture_cache().len(), 2);

        let stats = director.main_loop(0.016);
        assert_eq!(stats.textures_loaded, 2);
        assert_eq!(stats.render_items, 2);
    }

    #[test]
    fn test_load_scene_missing_texture() {
        let mut director = director();
        let mut node = NodeConfig::new("Broken");
        node.sprite = Some(crate::core::scene::SpriteConfig {
            texture: "missing.png".to_string(),
            rect: None,
        });
        let config = SceneConfig { name: "Bad".to_string(), nodes: vec![node] };

        let err = director.load_scene(&config).unwrap_err();
        assert!(err.is_resource_not_found());
    }
}
