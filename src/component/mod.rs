//! 组件系统模块
//!
//! 组件挂载在节点上，由节点独占持有。提供 Component trait、Sprite 组件和按名称构造组件的注册表。

mod component;
mod sprite;
mod registry;

pub use component::Component;
pub use sprite::{Sprite, SpriteRenderNode};
pub use registry::{ComponentFactory, ComponentRegistry};
