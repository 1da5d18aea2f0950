//! 场景节点
//!
//! 节点是组件容器：持有颜色、本地变换、子节点句柄和挂载的组件。
//! 节点本身存放在 [`Scene`](super::Scene) 的节点池中，树结构操作由 `Scene` 完成。

use std::any::TypeId;

use super::{NodeId, Transform};
use crate::component::Component;
use crate::core::error::{DistSceneError, Result};
use crate::core::math::Color;

/// 组件存储包装器
struct ComponentBox {
    /// 组件类型 ID，用于按类型查询
    type_id: TypeId,
    component: Box<dyn Component>,
}

impl ComponentBox {
    fn downcast_ref<T: Component>(&self) -> Option<&T> {
        self.component.as_any().downcast_ref::<T>()
    }

    fn downcast_mut<T: Component>(&mut self) -> Option<&mut T> {
        self.component.as_any_mut().downcast_mut::<T>()
    }
}

/// 场景节点
pub struct Node {
    id: NodeId,

    name: String,

    /// 是否启用；禁用节点及其子树不参与渲染和更新
    enabled: bool,

    color: Color,

    pub transform: Transform,

    /// 父节点（非拥有的回指）
    pub(super) parent: Option<NodeId>,

    /// 子节点，按添加顺序
    pub(super) children: Vec<NodeId>,

    /// 挂载的组件，按挂载顺序
    components: Vec<ComponentBox>,
}

impl Node {
    pub(super) fn new(id: NodeId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            enabled: true,
            color: Color::WHITE,
            transform: Transform::default(),
            parent: None,
            children: Vec::new(),
            components: Vec::new(),
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn color(&self) -> Color {
        self.color
    }

    /// 设置颜色
    ///
    /// 在返回前同步通知所有已挂载组件。
    pub fn set_color(&mut self, color: Color) {
        self.color = color;
        for entry in &mut self.components {
            entry.component.on_color_changed(color);
        }
        tracing::trace!(node = %self.id, ?color, "Node color changed");
    }

    // ========== 组件管理 ==========

    /// 挂载组件
    ///
    /// `allow_duplicates` 为 `false` 时，同类型组件已存在则返回 `DuplicateComponent`，组件列表不变。
    pub(super) fn attach(
        &mut self,
        mut component: Box<dyn Component>,
        allow_duplicates: bool,
    ) -> Result<&mut (dyn Component + 'static)> {
        let type_id = component.as_any().type_id();

        if !allow_duplicates && self.components.iter().any(|c| c.type_id == type_id) {
            return Err(DistSceneError::DuplicateComponent {
                node: self.name.clone(),
                component: component.name().to_string(),
            });
        }

        component.on_attach(self.id, self.color);
        tracing::debug!(node = %self.id, component = component.name(), "Component attached");

        self.components.push(ComponentBox { type_id, component });
        let last = self.components.len() - 1;
        Ok(self.components[last].component.as_mut())
    }

    /// 移除第一个指定类型的组件
    pub fn remove_component<T: Component>(&mut self) -> Option<Box<dyn Component>> {
        let type_id = TypeId::of::<T>();
        let index = self.components.iter().position(|c| c.type_id == type_id)?;
        Some(self.components.remove(index).component)
    }

    /// 获取组件的不可变引用
    pub fn get_component<T: Component>(&self) -> Option<&T> {
        self.components.iter().find_map(ComponentBox::downcast_ref::<T>)
    }

    /// 获取组件的可变引用
    pub fn get_component_mut<T: Component>(&mut self) -> Option<&mut T> {
        self.components.iter_mut().find_map(ComponentBox::downcast_mut::<T>)
    }

    /// 获取所有指定类型的组件
    pub fn get_components<T: Component>(&self) -> Vec<&T> {
        self.components
            .iter()
            .filter_map(ComponentBox::downcast_ref::<T>)
            .collect()
    }

    /// 获取所有指定类型的组件的可变引用
    pub fn get_components_mut<T: Component>(&mut self) -> Vec<&mut T> {
        self.components
            .iter_mut()
            .filter_map(ComponentBox::downcast_mut::<T>)
            .collect()
    }

    /// 检查是否有指定类型的组件
    pub fn has_component<T: Component>(&self) -> bool {
        let type_id = TypeId::of::<T>();
        self.components.iter().any(|c| c.type_id == type_id)
    }

    /// 所有组件，按挂载顺序
    pub fn components(&self) -> impl Iterator<Item = &(dyn Component + 'static)> {
        self.components.iter().map(|c| c.component.as_ref())
    }

    /// 获取组件数量
    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    pub(super) fn tick(&mut self, delta_time: f32) {
        for entry in &mut self.components {
            entry.component.tick(delta_time);
        }
    }
}

impl std::fmt::Debug for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Node")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("enabled", &self.enabled)
            .field("color", &self.color)
            .field("parent", &self.parent)
            .field("children", &self.children)
            .field("components", &self.components().map(|c| c.name()).collect::<Vec<_>>())
            .finish()
    }
}
