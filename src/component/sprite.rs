//! Sprite 组件
//!
//! 读取节点颜色和精灵帧，维护一份供渲染器读取的渲染同步记录（[`SpriteRenderNode`]）。

use std::any::Any;

use super::Component;
use crate::core::math::{Color, Rect, Vector2};
use crate::scene::NodeId;
use crate::texture::{SpriteFrame, Texture};

/// 精灵渲染节点
///
/// 渲染器每帧读取的只读记录。颜色始终等于所属节点的当前颜色。
#[derive(Debug, Clone, PartialEq)]
pub struct SpriteRenderNode {
    color: Color,
    texture: Option<Texture>,
    rect: Rect,
    offset: Vector2,
    rotated: bool,
    flip_x: bool,
    flip_y: bool,
}

impl Default for SpriteRenderNode {
    fn default() -> Self {
        Self {
            color: Color::WHITE,
            texture: None,
            rect: Rect::ZERO,
            offset: Vector2::zeros(),
            rotated: false,
            flip_x: false,
            flip_y: false,
        }
    }
}

impl SpriteRenderNode {
    pub fn color(&self) -> Color {
        self.color
    }

    pub fn texture(&self) -> Option<&Texture> {
        self.texture.as_ref()
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn offset(&self) -> Vector2 {
        self.offset
    }

    pub fn is_rotated(&self) -> bool {
        self.rotated
    }

    pub fn flip_x(&self) -> bool {
        self.flip_x
    }

    pub fn flip_y(&self) -> bool {
        self.flip_y
    }

    /// 有纹理才会被绘制
    pub fn is_visible(&self) -> bool {
        self.texture.is_some()
    }

    /// 实际绘制的纹理区域
    ///
    /// 空矩形表示整张纹理；纹理像素尚未就绪时无法确定，返回 `None`。
    pub fn effective_rect(&self) -> Option<Rect> {
        if !self.rect.is_empty() {
            return Some(self.rect);
        }
        let (width, height) = self.texture.as_ref()?.size()?;
        Some(Rect::new(0.0, 0.0, width as f32, height as f32))
    }
}

/// Sprite 组件
#[derive(Debug, Clone)]
pub struct Sprite {
    name: String,
    owner: Option<NodeId>,
    sprite_frame: Option<SpriteFrame>,
    render_node: SpriteRenderNode,
}

impl Sprite {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            owner: None,
            sprite_frame: None,
            render_node: SpriteRenderNode::default(),
        }
    }

    pub fn sprite_frame(&self) -> Option<&SpriteFrame> {
        self.sprite_frame.as_ref()
    }

    /// 设置精灵帧
    ///
    /// 把帧的纹理引用和子区域复制进渲染节点，颜色保持为节点当前颜色。
    /// 传入 `None` 清空渲染表示（不绘制）。
    pub fn set_sprite_frame(&mut self, frame: Option<SpriteFrame>) {
        let node = &mut self.render_node;
        match &frame {
            Some(frame) => {
                node.texture = frame.texture();
                node.rect = frame.rect();
                node.offset = frame.offset();
                node.rotated = frame.is_rotated();
            }
            None => {
                node.texture = None;
                node.rect = Rect::ZERO;
                node.offset = Vector2::zeros();
                node.rotated = false;
            }
        }
        tracing::trace!(
            owner = ?self.owner,
            texture = node.texture.as_ref().map(Texture::key),
            "Sprite frame updated"
        );
        self.sprite_frame = frame;
    }

    /// 渲染同步记录的只读视图
    pub fn render_node(&self) -> &SpriteRenderNode {
        &self.render_node
    }

    pub fn set_flip_x(&mut self, flip: bool) {
        self.render_node.flip_x = flip;
    }

    pub fn set_flip_y(&mut self, flip: bool) {
        self.render_node.flip_y = flip;
    }
}

impl Default for Sprite {
    fn default() -> Self {
        Self::new("Sprite")
    }
}

impl Component for Sprite {
    fn name(&self) -> &str {
        &self.name
    }

    fn owner(&self) -> Option<NodeId> {
        self.owner
    }

    fn on_attach(&mut self, owner: NodeId, node_color: Color) {
        if self.owner.is_none() {
            self.owner = Some(owner);
        }
        self.render_node.color = node_color;
    }

    fn on_color_changed(&mut self, color: Color) {
        self.render_node.color = color;
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
