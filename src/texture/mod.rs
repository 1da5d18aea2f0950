//! 纹理模块
//!
//! 纹理句柄、资源源、纹理缓存和精灵帧。
//!
//! 数据流：资源源 -> 纹理缓存（去重） -> 纹理句柄 -> 精灵帧（弱引用）

mod handle;
mod source;
mod cache;
mod sprite_frame;

pub use handle::{Texture, TextureData, TextureState, WeakTexture};
pub use source::{AssetSource, FileSystemSource, MemorySource};
pub use cache::TextureCache;
pub use sprite_frame::SpriteFrame;
