//! 组件基类
//!
//! 组件挂载在且仅挂载在一个节点上，由节点独占持有。

use std::any::Any;

use crate::core::math::Color;
use crate::scene::NodeId;

/// 组件 trait
///
/// 所有节点组件的基础接口。`on_color_changed` 是渲染同步钩子：
/// 节点颜色改变时在 setter 返回前同步调用。
pub trait Component: Any {
    /// 获取组件名称
    fn name(&self) -> &str;

    /// 所属节点；挂载后永不为空，也不会再改变
    fn owner(&self) -> Option<NodeId>;

    /// 挂载到节点时调用一次，传入节点当前颜色
    fn on_attach(&mut self, owner: NodeId, node_color: Color);

    /// 节点颜色改变时调用（可选实现）
    fn on_color_changed(&mut self, _color: Color) {}

    /// 每帧更新（可选实现）
    fn tick(&mut self, _delta_time: f32) {}

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}
