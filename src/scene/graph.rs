//! 场景图
//!
//! 场景持有所有节点（节点池 + 代数句柄）。父节点通过子节点列表独占子节点，
//! 子节点只持有指向父节点的非拥有句柄。
//!
//! 节点状态：
//! - **Unattached**：没有父节点，或所在子树未挂到场景根节点下
//! - **Active**：从根节点可达，且自身和所有祖先都处于启用状态
//!
//! 组件在节点 Active 之前保持休眠，不出现在渲染队列中。

use std::fmt;

use super::Node;
use crate::component::{Component, ComponentRegistry, Sprite, SpriteRenderNode};
use crate::core::config::SceneGraphConfig;
use crate::core::error::{DistSceneError, Result};
use crate::core::math::{Color, Matrix4};

/// 节点句柄
///
/// 节点池下标 + 代数。节点销毁后其句柄失效，不会误指向复用该槽位的新节点。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

impl NodeId {
    pub(crate) const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}v{}", self.index, self.generation)
    }
}

struct Slot {
    generation: u32,
    node: Option<Node>,
}

/// 渲染队列中的一项
#[derive(Debug)]
pub struct RenderItem<'a> {
    pub node: NodeId,
    pub world_matrix: Matrix4,
    pub render_node: &'a SpriteRenderNode,
}

/// 场景
pub struct Scene {
    name: String,
    slots: Vec<Slot>,
    free: Vec<u32>,
    root: NodeId,
    allow_duplicate_components: bool,
}

impl Scene {
    /// 创建只有根节点的场景，根节点与场景同名
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let root = NodeId::new(0, 0);
        Self {
            slots: vec![Slot {
                generation: 0,
                node: Some(Node::new(root, name.clone())),
            }],
            name,
            free: Vec::new(),
            root,
            allow_duplicate_components: false,
        }
    }

    /// 按场景图配置创建场景
    pub fn with_config(name: impl Into<String>, config: &SceneGraphConfig) -> Self {
        let mut scene = Self::new(name);
        scene.allow_duplicate_components = config.allow_duplicate_components;
        scene
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// 根节点
    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn allows_duplicate_components(&self) -> bool {
        self.allow_duplicate_components
    }

    pub fn set_allow_duplicate_components(&mut self, allow: bool) {
        self.allow_duplicate_components = allow;
    }

    /// 存活节点数量（含根节点）
    pub fn node_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.node.is_some()).count()
    }

    // ========== 节点池 ==========

    /// 创建未挂载的节点
    pub fn create_node(&mut self, name: impl Into<String>) -> NodeId {
        let id = match self.free.pop() {
            Some(index) => NodeId::new(index, self.slots[index as usize].generation),
            None => {
                self.slots.push(Slot { generation: 0, node: None });
                NodeId::new(self.slots.len() as u32 - 1, 0)
            }
        };

        self.slots[id.index as usize].node = Some(Node::new(id, name));
        id
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.node(id).is_ok()
    }

    pub fn node(&self, id: NodeId) -> Result<&Node> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_ref())
            .ok_or_else(|| DistSceneError::invalid(format!("node {} does not exist", id)))
    }

    pub fn node_mut(&mut self, id: NodeId) -> Result<&mut Node> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_mut())
            .ok_or_else(|| DistSceneError::invalid(format!("node {} does not exist", id)))
    }

    // ========== 树结构 ==========

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).ok().and_then(Node::parent)
    }

    pub fn children(&self, id: NodeId) -> Result<&[NodeId]> {
        self.node(id).map(Node::children)
    }

    /// `ancestor` 是否是 `id` 的祖先（不含自身）
    pub fn is_ancestor(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut current = self.parent(id);
        while let Some(p) = current {
            if p == ancestor {
                return true;
            }
            current = self.parent(p);
        }
        false
    }

    /// 把 `child` 添加为 `parent` 的最后一个子节点
    ///
    /// 以下情况返回 `InvalidArgument` 且树保持不变：句柄失效、`child` 已有父节点、
    /// `child` 是根节点、`child` 与 `parent` 相同或是 `parent` 的祖先（会形成环）。
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.node(parent)?;
        let child_node = self.node(child)?;

        if child == self.root {
            return Err(DistSceneError::invalid("the scene root cannot be a child"));
        }
        if let Some(existing) = child_node.parent {
            return Err(DistSceneError::invalid(format!(
                "node {} already has parent {}; detach it first",
                child, existing
            )));
        }
        if child == parent || self.is_ancestor(child, parent) {
            return Err(DistSceneError::invalid(format!(
                "adding {} under {} would create a cycle",
                child, parent
            )));
        }

        self.node_mut(parent)?.children.push(child);
        self.node_mut(child)?.parent = Some(parent);
        tracing::debug!(%parent, %child, "Child added");
        Ok(())
    }

    /// 从父节点上摘下；返回节点之前是否有父节点
    pub fn remove_from_parent(&mut self, child: NodeId) -> Result<bool> {
        let Some(parent) = self.node_mut(child)?.parent.take() else {
            return Ok(false);
        };

        self.node_mut(parent)?.children.retain(|c| *c != child);
        tracing::debug!(%parent, %child, "Child removed");
        Ok(true)
    }

    /// 销毁节点及其整个子树
    ///
    /// 组件随节点一起释放，所有相关句柄失效。根节点不能销毁。
    pub fn destroy_node(&mut self, id: NodeId) -> Result<()> {
        if id == self.root {
            return Err(DistSceneError::invalid("the scene root cannot be destroyed"));
        }
        self.remove_from_parent(id)?;

        let subtree = self.subtree(id);
        for node in &subtree {
            let slot = &mut self.slots[node.index as usize];
            slot.node = None;
            // 代数耗尽的槽位不再复用，旧句柄永远不会指向新节点
            match slot.generation.checked_add(1) {
                Some(next) => {
                    slot.generation = next;
                    self.free.push(node.index);
                }
                None => tracing::debug!(index = node.index, "Node slot retired"),
            }
        }
        tracing::debug!(node = %id, count = subtree.len(), "Subtree destroyed");
        Ok(())
    }

    /// 子树中的所有节点，深度优先先序，子节点按添加顺序
    pub fn subtree(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let Ok(node) = self.node(current) else { continue };
            out.push(current);
            stack.extend(node.children.iter().rev().copied());
        }
        out
    }

    /// 在 `parent` 的直接子节点中按名称查找
    pub fn find_child(&self, parent: NodeId, name: &str) -> Option<NodeId> {
        self.node(parent)
            .ok()?
            .children
            .iter()
            .copied()
            .find(|c| self.node(*c).map(|n| n.name() == name).unwrap_or(false))
    }

    /// 节点是否处于 Active 状态
    pub fn is_active(&self, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node_id) = current {
            let Ok(node) = self.node(node_id) else { return false };
            if !node.is_enabled() {
                return false;
            }
            if node_id == self.root {
                return true;
            }
            current = node.parent;
        }
        false
    }

    /// 世界矩阵：从节点向上逐级组合本地矩阵
    pub fn world_matrix(&self, id: NodeId) -> Result<Matrix4> {
        let node = self.node(id)?;
        let mut world = node.transform.local_matrix();
        let mut current = node.parent;
        while let Some(p) = current {
            let parent = self.node(p)?;
            world = parent.transform.local_matrix() * world;
            current = parent.parent;
        }
        Ok(world)
    }

    // ========== 颜色 ==========

    pub fn color(&self, id: NodeId) -> Result<Color> {
        self.node(id).map(Node::color)
    }

    /// 设置节点颜色，返回前同步到所有组件的渲染记录
    pub fn set_color(&mut self, id: NodeId, color: Color) -> Result<()> {
        self.node_mut(id)?.set_color(color);
        Ok(())
    }

    // ========== 组件 ==========

    /// 构造并挂载一个新组件，返回新实例
    ///
    /// 场景策略禁止重复时，同类型组件已存在则返回 `DuplicateComponent`。
    pub fn add_component<T: Component + Default>(&mut self, id: NodeId) -> Result<&mut T> {
        let allow = self.allow_duplicate_components;
        self.node_mut(id)?
            .attach(Box::new(T::default()), allow)?
            .as_any_mut()
            .downcast_mut::<T>()
            .ok_or_else(|| DistSceneError::invalid("attached component has an unexpected type"))
    }

    /// 通过注册表按名称构造并挂载组件
    pub fn add_component_by_name(
        &mut self,
        id: NodeId,
        registry: &ComponentRegistry,
        name: &str,
    ) -> Result<&mut (dyn Component + 'static)> {
        self.node(id)?;
        let component = registry.create(name)?;
        let allow = self.allow_duplicate_components;
        self.node_mut(id)?.attach(component, allow)
    }

    pub fn get_component<T: Component>(&self, id: NodeId) -> Option<&T> {
        self.node(id).ok()?.get_component::<T>()
    }

    pub fn get_component_mut<T: Component>(&mut self, id: NodeId) -> Option<&mut T> {
        self.node_mut(id).ok()?.get_component_mut::<T>()
    }

    // ========== 帧 ==========

    /// Active 节点，深度优先先序；禁用节点的整棵子树被跳过
    pub fn active_nodes(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![self.root];
        while let Some(current) = stack.pop() {
            let Ok(node) = self.node(current) else { continue };
            if !node.is_enabled() {
                continue;
            }
            out.push(current);
            stack.extend(node.children.iter().rev().copied());
        }
        out
    }

    /// 渲染队列：按绘制顺序列出所有 Active 节点上可见的精灵
    pub fn render_queue(&self) -> Vec<RenderItem<'_>> {
        let mut queue = Vec::new();
        for id in self.active_nodes() {
            let Ok(node) = self.node(id) else { continue };
            let visible: Vec<&Sprite> = node
                .get_components::<Sprite>()
                .into_iter()
                .filter(|s| s.render_node().is_visible())
                .collect();
            if visible.is_empty() {
                continue;
            }

            let world_matrix = match self.world_matrix(id) {
                Ok(m) => m,
                Err(_) => continue,
            };
            queue.extend(visible.into_iter().map(|sprite| RenderItem {
                node: id,
                world_matrix,
                render_node: sprite.render_node(),
            }));
        }
        queue
    }

    /// 更新所有 Active 节点上的组件
    pub fn tick(&mut self, delta_time: f32) {
        for id in self.active_nodes() {
            if let Ok(node) = self.node_mut(id) {
                node.tick(delta_time);
            }
        }
    }
}

impl fmt::Debug for Scene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scene")
            .field("name", &self.name)
            .field("root", &self.root)
            .field("nodes", &self.node_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::texture::{SpriteFrame, Texture, TextureData};
    use crate::core::math::Rect;

    fn texture(key: &str) -> Texture {
        Texture::from_data(key, TextureData::solid(4, 4, [255; 4]))
    }

    #[test]
    fn test_new_scene_has_active_root() {
        let scene = Scene::new("Main");
        assert_eq!(scene.node(scene.root()).unwrap().name(), "Main");
        assert!(scene.is_active(scene.root()));
        assert_eq!(scene.node_count(), 1);
    }

    #[test]
    fn test_add_child_activates_node() {
        let mut scene = Scene::new("Main");
        let node = scene.create_node("Node");
        assert!(!scene.is_active(node));

        scene.add_child(scene.root(), node).unwrap();
        assert!(scene.is_active(node));
        assert_eq!(scene.parent(node), Some(scene.root()));
        assert_eq!(scene.children(scene.root()).unwrap(), &[node]);
    }

    #[test]
    fn test_children_keep_insertion_order() {
        let mut scene = Scene::new("Main");
        let root = scene.root();
        let a = scene.create_node("A");
        let b = scene.create_node("B");
        let c = scene.create_node("C");
        for n in [a, b, c] {
            scene.add_child(root, n).unwrap();
        }
        assert_eq!(scene.children(root).unwrap(), &[a, b, c]);
        assert_eq!(scene.find_child(root, "B"), Some(b));
        assert_eq!(scene.find_child(root, "D"), None);
    }

    #[test]
    fn test_cycle_is_rejected_and_tree_unchanged() {
        let mut scene = Scene::new("Main");
        let a = scene.create_node("A");
        let b = scene.create_node("B");

        scene.add_child(a, b).unwrap();
        let err = scene.add_child(b, a).unwrap_err();
        assert!(err.is_invalid_argument());

        assert_eq!(scene.parent(a), None);
        assert_eq!(scene.parent(b), Some(a));
        assert_eq!(scene.children(a).unwrap(), &[b]);
        assert!(scene.children(b).unwrap().is_empty());
    }

    #[test]
    fn test_deep_cycle_and_self_parenting_rejected() {
        let mut scene = Scene::new("Main");
        let a = scene.create_node("A");
        let b = scene.create_node("B");
        let c = scene.create_node("C");
        scene.add_child(a, b).unwrap();
        scene.add_child(b, c).unwrap();

        assert!(scene.add_child(c, a).unwrap_err().is_invalid_argument());
        assert!(scene.add_child(a, a).unwrap_err().is_invalid_argument());
        assert!(scene.children(c).unwrap().is_empty());
    }

    #[test]
    fn test_reparent_requires_detach() {
        let mut scene = Scene::new("Main");
        let root = scene.root();
        let a = scene.create_node("A");
        let b = scene.create_node("B");
        scene.add_child(root, a).unwrap();
        scene.add_child(root, b).unwrap();

        assert!(scene.add_child(a, b).unwrap_err().is_invalid_argument());
        assert_eq!(scene.parent(b), Some(root));

        assert!(scene.remove_from_parent(b).unwrap());
        assert!(!scene.remove_from_parent(b).unwrap());
        assert!(!scene.is_active(b));
        scene.add_child(a, b).unwrap();
        assert_eq!(scene.children(root).unwrap(), &[a]);
        assert!(scene.is_active(b));
    }

    #[test]
    fn test_root_cannot_be_child_or_destroyed() {
        let mut scene = Scene::new("Main");
        let root = scene.root();
        let orphan = scene.create_node("Orphan");

        assert!(scene.add_child(orphan, root).unwrap_err().is_invalid_argument());
        assert!(scene.destroy_node(root).unwrap_err().is_invalid_argument());
    }

    #[test]
    fn test_destroy_subtree_invalidates_ids() {
        let mut scene = Scene::new("Main");
        let root = scene.root();
        let a = scene.create_node("A");
        let b = scene.create_node("B");
        scene.add_child(root, a).unwrap();
        scene.add_child(a, b).unwrap();
        scene.add_component::<Sprite>(b).unwrap();

        scene.destroy_node(a).unwrap();
        assert!(!scene.contains(a));
        assert!(!scene.contains(b));
        assert!(scene.children(root).unwrap().is_empty());
        assert_eq!(scene.node_count(), 1);

        // 槽位复用后旧句柄仍然失效
        let c = scene.create_node("C");
        assert!(scene.contains(c));
        assert!(!scene.contains(a) && !scene.contains(b));
        assert!(scene.add_child(root, a).unwrap_err().is_invalid_argument());
    }

    #[test]
    fn test_exhausted_slot_is_retired() {
        let mut scene = Scene::new("Main");
        let old = scene.create_node("Old");
        scene.slots[old.index() as usize].generation = u32::MAX;
        let old = NodeId::new(old.index(), u32::MAX);
        assert!(scene.contains(old));

        scene.destroy_node(old).unwrap();
        assert!(!scene.contains(old));
        assert_eq!(scene.node_count(), 1);

        let fresh = scene.create_node("Fresh");
        assert_ne!(fresh.index(), old.index());
        assert!(!scene.contains(old));
        assert_eq!(scene.node_count(), 2);
    }

    #[test]
    fn test_disabled_ancestor_deactivates_subtree() {
        let mut scene = Scene::new("Main");
        let root = scene.root();
        let a = scene.create_node("A");
        let b = scene.create_node("B");
        scene.add_child(root, a).unwrap();
        scene.add_child(a, b).unwrap();

        scene.node_mut(a).unwrap().set_enabled(false);
        assert!(!scene.is_active(a));
        assert!(!scene.is_active(b));
        assert_eq!(scene.active_nodes(), vec![root]);
    }

    #[test]
    fn test_color_propagates_to_sprite() {
        let mut scene = Scene::new("Main");
        let node = scene.create_node("Node");
        scene.add_component::<Sprite>(node).unwrap();

        for color in [Color::RED, Color::GREEN, Color::new(1, 2, 3, 4)] {
            scene.set_color(node, color).unwrap();
            let sprite = scene.get_component::<Sprite>(node).unwrap();
            assert_eq!(sprite.render_node().color(), color);
        }
        assert_eq!(scene.color(node).unwrap(), Color::new(1, 2, 3, 4));
    }

    #[test]
    fn test_duplicate_policy() {
        let mut scene = Scene::new("Main");
        let node = scene.create_node("Node");
        scene.add_component::<Sprite>(node).unwrap();

        let err = scene.add_component::<Sprite>(node).err().unwrap();
        assert!(err.is_duplicate_component());
        assert_eq!(scene.node(node).unwrap().component_count(), 1);

        scene.set_allow_duplicate_components(true);
        scene.add_component::<Sprite>(node).unwrap();
        assert_eq!(scene.node(node).unwrap().get_components::<Sprite>().len(), 2);
    }

    #[test]
    fn test_add_component_by_name() {
        let registry = ComponentRegistry::with_builtin();
        let mut scene = Scene::new("Main");
        let node = scene.create_node("Node");

        let component = scene.add_component_by_name(node, &registry, "Sprite").unwrap();
        assert_eq!(component.owner(), Some(node));
        assert!(scene.get_component::<Sprite>(node).is_some());

        let err = scene.add_component_by_name(node, &registry, "Label").err().unwrap();
        assert!(err.is_invalid_argument());
        assert_eq!(scene.node(node).unwrap().component_count(), 1);
    }

    #[test]
    fn test_render_queue_skips_dormant_and_invisible_sprites() {
        let mut scene = Scene::new("Main");
        let root = scene.root();
        let tex = texture("button.png");

        let shown = scene.create_node("Shown");
        let hidden = scene.create_node("Hidden");
        let detached = scene.create_node("Detached");
        let blank = scene.create_node("Blank");
        scene.add_child(root, shown).unwrap();
        scene.add_child(root, hidden).unwrap();
        scene.add_child(root, blank).unwrap();

        for id in [shown, hidden, detached] {
            scene
                .add_component::<Sprite>(id)
                .unwrap()
                .set_sprite_frame(Some(SpriteFrame::with_texture(&tex, Rect::ZERO)));
        }
        scene.add_component::<Sprite>(blank).unwrap();
        scene.node_mut(hidden).unwrap().set_enabled(false);

        let queue = scene.render_queue();
        assert_eq!(queue.len(), 1);
        assert_eq!(queue[0].node, shown);
        assert_eq!(queue[0].render_node.texture(), Some(&tex));
    }

    #[test]
    fn test_world_matrix_composes_parents() {
        let mut scene = Scene::new("Main");
        let root = scene.root();
        let a = scene.create_node("A");
        let b = scene.create_node("B");
        scene.add_child(root, a).unwrap();
        scene.add_child(a, b).unwrap();

        scene.node_mut(a).unwrap().transform.set_position_xy(10.0, 0.0);
        scene.node_mut(b).unwrap().transform.set_position_xy(0.0, 5.0);

        let world = scene.world_matrix(b).unwrap();
        assert!((world[(0, 3)] - 10.0).abs() < 1e-6);
        assert!((world[(1, 3)] - 5.0).abs() < 1e-6);
    }
}
