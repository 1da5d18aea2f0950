//! 纹理句柄
//!
//! [`Texture`] 是共享的、不可变身份的纹理句柄。句柄在纹理缓存解析资源键后立即可用，
//! 像素数据可能稍后才由资源源提供（`Pending` -> `Ready` / `Failed`）。

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

/// 解码后的像素数据（RGBA8，行优先）
#[derive(Clone, PartialEq, Eq)]
pub struct TextureData {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl TextureData {
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        Self { width, height, pixels }
    }

    /// 纯色填充的纹理数据
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let pixels = rgba
            .iter()
            .copied()
            .cycle()
            .take(width as usize * height as usize * 4)
            .collect();
        Self::new(width, height, pixels)
    }
}

impl fmt::Debug for TextureData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextureData")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.pixels.len())
            .finish()
    }
}

/// 纹理加载状态
#[derive(Debug, Clone)]
pub enum TextureState {
    /// 资源键已解析，像素数据尚未到达
    Pending,
    /// 像素数据可用
    Ready(Rc<TextureData>),
    /// 加载失败（不会自动重试）
    Failed(String),
}

struct TextureInner {
    /// 解析后的唯一键
    key: String,
    /// 首次请求时使用的键
    request_key: String,
    state: RefCell<TextureState>,
}

/// 纹理句柄
///
/// 克隆只增加引用计数；两个句柄相等当且仅当它们指向同一份纹理。
#[derive(Clone)]
pub struct Texture(Rc<TextureInner>);

impl Texture {
    /// 创建待加载的纹理句柄
    pub(crate) fn pending(key: impl Into<String>, request_key: impl Into<String>) -> Self {
        Self(Rc::new(TextureInner {
            key: key.into(),
            request_key: request_key.into(),
            state: RefCell::new(TextureState::Pending),
        }))
    }

    /// 用已有像素数据直接创建纹理（不经过纹理缓存）
    pub fn from_data(key: impl Into<String>, data: TextureData) -> Self {
        let key = key.into();
        let texture = Self::pending(key.clone(), key);
        texture.set_ready(data);
        texture
    }

    pub fn key(&self) -> &str {
        &self.0.key
    }

    pub fn request_key(&self) -> &str {
        &self.0.request_key
    }

    pub fn state(&self) -> TextureState {
        self.0.state.borrow().clone()
    }

    pub fn is_pending(&self) -> bool {
        matches!(*self.0.state.borrow(), TextureState::Pending)
    }

    pub fn is_ready(&self) -> bool {
        matches!(*self.0.state.borrow(), TextureState::Ready(_))
    }

    /// 像素数据（仅在 `Ready` 状态下可用）
    pub fn data(&self) -> Option<Rc<TextureData>> {
        match &*self.0.state.borrow() {
            TextureState::Ready(data) => Some(Rc::clone(data)),
            _ => None,
        }
    }

    /// 像素尺寸 (width, height)
    pub fn size(&self) -> Option<(u32, u32)> {
        self.data().map(|d| (d.width, d.height))
    }

    pub(crate) fn set_ready(&self, data: TextureData) {
        *self.0.state.borrow_mut() = TextureState::Ready(Rc::new(data));
    }

    pub(crate) fn set_failed(&self, reason: impl Into<String>) {
        *self.0.state.borrow_mut() = TextureState::Failed(reason.into());
    }

    /// 创建不延长纹理生命周期的弱引用
    pub fn downgrade(&self) -> WeakTexture {
        WeakTexture(Rc::downgrade(&self.0))
    }

    /// 当前强引用数量
    pub fn ref_count(&self) -> usize {
        Rc::strong_count(&self.0)
    }
}

impl PartialEq for Texture {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Texture {}

impl fmt::Debug for Texture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match &*self.0.state.borrow() {
            TextureState::Pending => "pending".to_string(),
            TextureState::Ready(d) => format!("{}x{}", d.width, d.height),
            TextureState::Failed(reason) => format!("failed: {}", reason),
        };
        f.debug_struct("Texture")
            .field("key", &self.0.key)
            .field("state", &state)
            .finish()
    }
}

/// 纹理弱引用
#[derive(Clone, Default)]
pub struct WeakTexture(Weak<TextureInner>);

impl WeakTexture {
    pub fn upgrade(&self) -> Option<Texture> {
        self.0.upgrade().map(Texture)
    }

    /// 是否指向给定纹理
    pub fn points_to(&self, texture: &Texture) -> bool {
        Weak::ptr_eq(&self.0, &Rc::downgrade(&texture.0))
    }
}

impl PartialEq for WeakTexture {
    fn eq(&self, other: &Self) -> bool {
        Weak::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for WeakTexture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.upgrade() {
            Some(texture) => write!(f, "WeakTexture({})", texture.key()),
            None => write!(f, "WeakTexture(<dropped>)"),
        }
    }
}
