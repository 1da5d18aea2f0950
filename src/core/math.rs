//! 数学类型模块
//!
//! 场景图使用的基础数学类型。向量和矩阵基于 `nalgebra`，
//! 颜色和矩形是场景图自己的轻量类型。
//!
//! # 模块组织
//!
//! - **基础类型**：Vector2/3/4, Matrix4, Quaternion
//! - **颜色**：[`Color`]，RGBA 每通道 0-255，节点颜色与精灵渲染颜色共用
//! - **矩形**：[`Rect`]，精灵帧在纹理中的子区域（像素）
//! - **矩阵辅助函数**：translation, rotation_z 等

pub use nalgebra::{
    Matrix4 as Mat4, UnitQuaternion, Vector2 as Vec2, Vector3 as Vec3, Vector4 as Vec4,
};
use serde::{Deserialize, Serialize};

// 类型别名，使用更简洁的名称
pub type Vector2 = Vec2<f32>;
pub type Vector3 = Vec3<f32>;
pub type Vector4 = Vec4<f32>;
pub type Matrix4 = Mat4<f32>;
pub type Quaternion = UnitQuaternion<f32>;

/// 颜色类型（RGBA，每通道 0-255）
///
/// 序列化为 `[r, g, b, a]` 数组，便于在 TOML 场景描述中书写。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "[u8; 4]", into = "[u8; 4]")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    /// 创建新的颜色
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// 创建 RGB 颜色（alpha = 255）
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    /// 从十六进制字符串解析颜色
    ///
    /// 支持 `#rrggbb` 和 `#rrggbbaa`，前导 `#` 可省略。
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();

        match hex.len() {
            6 => Some(Self::rgb(channel(0)?, channel(2)?, channel(4)?)),
            8 => Some(Self::new(channel(0)?, channel(2)?, channel(4)?, channel(6)?)),
            _ => None,
        }
    }

    /// 转换为归一化的 Vector4（0.0-1.0），供渲染器上传使用
    pub fn to_normalized(&self) -> Vector4 {
        Vector4::new(
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
            self.a as f32 / 255.0,
        )
    }

    // 预定义颜色
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const RED: Color = Color::rgb(255, 0, 0);
    pub const GREEN: Color = Color::rgb(0, 255, 0);
    pub const BLUE: Color = Color::rgb(0, 0, 255);
    pub const YELLOW: Color = Color::rgb(255, 255, 0);
    pub const CYAN: Color = Color::rgb(0, 255, 255);
    pub const MAGENTA: Color = Color::rgb(255, 0, 255);
    pub const TRANSPARENT: Color = Color::new(0, 0, 0, 0);
}

impl Default for Color {
    fn default() -> Self {
        Color::WHITE
    }
}

impl From<[u8; 4]> for Color {
    fn from(c: [u8; 4]) -> Self {
        Color::new(c[0], c[1], c[2], c[3])
    }
}

impl From<Color> for [u8; 4] {
    fn from(c: Color) -> Self {
        [c.r, c.g, c.b, c.a]
    }
}

/// 矩形（像素坐标，左上角为原点）
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const ZERO: Rect = Rect { x: 0.0, y: 0.0, width: 0.0, height: 0.0 };

    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    /// 宽或高不为正即视为空
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    pub fn size(&self) -> Vector2 {
        Vector2::new(self.width, self.height)
    }
}

/// 矩阵辅助函数
pub mod matrix {
    use super::*;

    /// 创建平移矩阵
    pub fn translation(x: f32, y: f32, z: f32) -> Matrix4 {
        Matrix4::new_translation(&Vector3::new(x, y, z))
    }

    /// 创建缩放矩阵
    pub fn scaling(x: f32, y: f32, z: f32) -> Matrix4 {
        Matrix4::new_nonuniform_scaling(&Vector3::new(x, y, z))
    }

    /// 创建绕 Z 轴旋转的矩阵（弧度）
    pub fn rotation_z(angle: f32) -> Matrix4 {
        Matrix4::from_axis_angle(&Vector3::z_axis(), angle)
    }
}
