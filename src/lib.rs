//! DistScene - 场景图与精灵渲染状态同步
//!
//! DistRender 的场景层：节点树、组件组合、精灵渲染记录和纹理缓存。
//! GPU 提交、资源解码管线和帧循环宿主都是外部协作者。
//!
//! # 模块结构
//!
//! - `core`: 核心功能模块（数学、日志、配置、错误处理、场景描述）
//! - `texture`: 纹理句柄、资源源、纹理缓存、精灵帧
//! - `scene`: 节点池式场景树
//! - `component`: 组件 trait、Sprite 组件、组件注册表
//! - `director`: 持有当前场景和纹理缓存的上下文对象
//!
//! # 使用示例
//!
//! ```no_run
//! use dist_scene::component::Sprite;
//! use dist_scene::core::{Color, Config};
//! use dist_scene::director::Director;
//! use dist_scene::texture::SpriteFrame;
//!
//! let mut director = Director::new(Config::default());
//! let root = director.scene().root();
//! let node = director.scene_mut().create_node("Button");
//! director.scene_mut().add_child(root, node)?;
//! director.scene_mut().set_color(node, Color::RED)?;
//!
//! let texture = director.texture_cache_mut().add_image("button.png")?;
//! let mut frame = SpriteFrame::new();
//! frame.set_texture(&texture);
//!
//! let sprite = director.scene_mut().add_component::<Sprite>(node)?;
//! sprite.set_sprite_frame(Some(frame));
//! assert_eq!(sprite.render_node().color(), Color::RED);
//! # Ok::<(), dist_scene::core::DistSceneError>(())
//! ```

pub mod core;
pub mod texture;
pub mod scene;
pub mod component;
pub mod director;
