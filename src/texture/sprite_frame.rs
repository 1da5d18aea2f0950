//! 精灵帧
//!
//! 描述纹理中用于绘制的子区域。精灵帧只持有纹理的弱引用，不延长纹理生命周期。

use crate::core::math::{Rect, Vector2};
use crate::texture::{Texture, WeakTexture};

/// 精灵帧
///
/// 空矩形表示整张纹理，由渲染时决定；这里不校验矩形是否越界。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpriteFrame {
    texture: Option<WeakTexture>,
    rect: Rect,
    offset: Vector2,
    rotated: bool,
}

impl SpriteFrame {
    /// 创建空精灵帧
    pub fn new() -> Self {
        Self::default()
    }

    /// 创建绑定纹理和子区域的精灵帧
    pub fn with_texture(texture: &Texture, rect: Rect) -> Self {
        let mut frame = Self::new();
        frame.set_texture(texture);
        frame.set_rect(rect);
        frame
    }

    /// 绑定纹理（弱引用）
    pub fn set_texture(&mut self, texture: &Texture) {
        self.texture = Some(texture.downgrade());
    }

    /// 最近一次绑定的纹理；纹理已被释放时返回 `None`
    pub fn texture(&self) -> Option<Texture> {
        self.texture.as_ref().and_then(WeakTexture::upgrade)
    }

    pub fn set_rect(&mut self, rect: Rect) {
        self.rect = rect;
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn set_offset(&mut self, offset: Vector2) {
        self.offset = offset;
    }

    pub fn offset(&self) -> Vector2 {
        self.offset
    }

    /// 子区域在图集中是否顺时针旋转了 90 度
    pub fn set_rotated(&mut self, rotated: bool) {
        self.rotated = rotated;
    }

    pub fn is_rotated(&self) -> bool {
        self.rotated
    }
}
