//! 节点本地变换
//!
//! 管理节点相对父节点的位置、旋转和缩放。矩阵按需计算并缓存。

use std::cell::Cell;

use crate::core::math::{matrix, Matrix4, Vector2, Vector3};
use crate::core::scene::TransformConfig;

/// 本地变换
#[derive(Debug, Clone)]
pub struct Transform {
    position: Vector3,

    /// 绕 Z 轴旋转（度数）
    rotation: f32,

    scale: Vector2,

    /// 本地矩阵缓存，变换修改后失效
    cached: Cell<Option<Matrix4>>,
}

impl Transform {
    pub fn new() -> Self {
        Self {
            position: Vector3::zeros(),
            rotation: 0.0,
            scale: Vector2::new(1.0, 1.0),
            cached: Cell::new(None),
        }
    }

    pub fn position(&self) -> Vector3 {
        self.position
    }

    pub fn set_position(&mut self, position: Vector3) {
        self.position = position;
        self.cached.set(None);
    }

    pub fn set_position_xy(&mut self, x: f32, y: f32) {
        self.set_position(Vector3::new(x, y, self.position.z));
    }

    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    pub fn set_rotation(&mut self, degrees: f32) {
        self.rotation = degrees;
        self.cached.set(None);
    }

    pub fn scale(&self) -> Vector2 {
        self.scale
    }

    pub fn set_scale(&mut self, scale: Vector2) {
        self.scale = scale;
        self.cached.set(None);
    }

    /// 本地矩阵，组合顺序：T * R * S
    pub fn local_matrix(&self) -> Matrix4 {
        if let Some(cached) = self.cached.get() {
            return cached;
        }

        let translation = matrix::translation(self.position.x, self.position.y, self.position.z);
        let rotation = matrix::rotation_z(self.rotation.to_radians());
        let scale = matrix::scaling(self.scale.x, self.scale.y, 1.0);

        let local = translation * rotation * scale;
        self.cached.set(Some(local));
        local
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&TransformConfig> for Transform {
    fn from(config: &TransformConfig) -> Self {
        let [x, y, z] = config.position;
        let [sx, sy] = config.scale;

        let mut transform = Self::new();
        transform.set_position(Vector3::new(x, y, z));
        transform.set_rotation(config.rotation);
        transform.set_scale(Vector2::new(sx, sy));
        transform
    }
}
