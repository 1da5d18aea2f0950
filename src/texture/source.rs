//! 资源源
//!
//! 纹理缓存只负责句柄身份和去重，像素数据来自外部资源管线。
//! [`AssetSource`] 是这条边界：把请求键解析为唯一键，再按唯一键提供像素数据。

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::core::error::{DistSceneError, Result};
use crate::texture::TextureData;

/// 资源源 trait
pub trait AssetSource {
    /// 把请求键解析为唯一键；无法解析时返回 `None`
    fn resolve(&self, key: &str) -> Option<String>;

    /// 按唯一键加载像素数据
    fn load(&self, resolved: &str) -> Result<TextureData>;
}

/// 文件系统资源源
///
/// 按顺序在搜索目录中查找资源键，绝对路径直接使用。
/// 使用 `image` 解码为 RGBA8。
#[derive(Debug, Clone)]
pub struct FileSystemSource {
    search_paths: Vec<PathBuf>,
}

impl FileSystemSource {
    pub fn new<I, P>(search_paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            search_paths: search_paths.into_iter().map(Into::into).collect(),
        }
    }

    pub fn search_paths(&self) -> &[PathBuf] {
        &self.search_paths
    }
}

impl AssetSource for FileSystemSource {
    fn resolve(&self, key: &str) -> Option<String> {
        if key.is_empty() {
            return None;
        }

        let path = Path::new(key);
        if path.is_absolute() {
            return path.is_file().then(|| path.to_string_lossy().into_owned());
        }

        self.search_paths
            .iter()
            .map(|dir| dir.join(path))
            .find(|candidate| candidate.is_file())
            .map(|found| found.to_string_lossy().into_owned())
    }

    fn load(&self, resolved: &str) -> Result<TextureData> {
        let image = image::open(resolved).map_err(|e| DistSceneError::AssetLoad {
            key: resolved.to_string(),
            reason: e.to_string(),
        })?;

        let rgba = image.to_rgba8();
        let (width, height) = rgba.dimensions();
        Ok(TextureData::new(width, height, rgba.into_raw()))
    }
}

/// 内存资源源
///
/// 键即唯一键。用于内嵌资源和测试。
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    entries: HashMap<String, TextureData>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册已解码的像素数据
    pub fn insert(&mut self, key: impl Into<String>, data: TextureData) {
        self.entries.insert(key.into(), data);
    }

    /// 链式注册
    pub fn with(mut self, key: impl Into<String>, data: TextureData) -> Self {
        self.insert(key, data);
        self
    }

    /// 注册编码后的图片（PNG 等），立即解码
    pub fn insert_encoded(&mut self, key: impl Into<String>, bytes: &[u8]) -> Result<()> {
        let key = key.into();
        let image = image::load_from_memory(bytes).map_err(|e| DistSceneError::AssetLoad {
            key: key.clone(),
            reason: e.to_string(),
        })?;

        let rgba = image.to_rgba8();
        let (width, height) = rgba.dimensions();
        self.entries.insert(key, TextureData::new(width, height, rgba.into_raw()));
        Ok(())
    }
}

impl AssetSource for MemorySource {
    fn resolve(&self, key: &str) -> Option<String> {
        self.entries.contains_key(key).then(|| key.to_string())
    }

    fn load(&self, resolved: &str) -> Result<TextureData> {
        self.entries
            .get(resolved)
            .cloned()
            .ok_or_else(|| DistSceneError::ResourceNotFound(resolved.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    /// 测试用临时目录，离开作用域时删除
    struct ScratchDir(PathBuf);

    impl ScratchDir {
        fn new(name: &str) -> Self {
            let dir = std::env::temp_dir().join(format!("dist_scene_{}_{}", name, std::process::id()));
            std::fs::create_dir_all(&dir).unwrap();
            Self(dir)
        }

        fn path(&self) -> &Path {
            &self.0
        }
    }

    impl Drop for ScratchDir {
        fn drop(&mut self) {
            let _ = std::fs::remove_dir_all(&self.0);
        }
    }

    fn encode_png(image: image::RgbaImage) -> Vec<u8> {
        let mut bytes = Cursor::new(Vec::new());
        image::DynamicImage::ImageRgba8(image)
            .write_to(&mut bytes, image::ImageOutputFormat::Png)
            .unwrap();
        bytes.into_inner()
    }

    #[test]
    fn test_memory_source() {
        let source = MemorySource::new().with("button.png", TextureData::solid(2, 2, [255, 0, 0, 255]));

        assert_eq!(source.resolve("button.png").as_deref(), Some("button.png"));
        assert_eq!(source.resolve("missing.png"), None);
        assert_eq!(source.load("button.png").unwrap().width, 2);
        assert!(source.load("missing.png").unwrap_err().is_resource_not_found());
    }

    #[test]
    fn test_memory_source_decodes_png() {
        let mut image = image::RgbaImage::from_pixel(3, 2, image::Rgba([0, 0, 255, 255]));
        image.put_pixel(2, 1, image::Rgba([10, 20, 30, 40]));

        let mut source = MemorySource::new();
        source.insert_encoded("icon.png", &encode_png(image)).unwrap();

        let resolved = source.resolve("icon.png").unwrap();
        let data = source.load(&resolved).unwrap();
        assert_eq!((data.width, data.height), (3, 2));
        assert_eq!(data.pixels.len(), 3 * 2 * 4);
        assert_eq!(&data.pixels[0..4], &[0, 0, 255, 255]);
        assert_eq!(&data.pixels[20..24], &[10, 20, 30, 40]);
    }

    #[test]
    fn test_memory_source_rejects_garbage() {
        let mut source = MemorySource::new();
        let err = source.insert_encoded("broken.png", b"not a png").unwrap_err();

        assert!(matches!(err, DistSceneError::AssetLoad { ref key, .. } if key == "broken.png"));
        assert_eq!(source.resolve("broken.png"), None);
    }

    #[test]
    fn test_filesystem_source_resolves_in_order() {
        let first = ScratchDir::new("fs_first");
        let second = ScratchDir::new("fs_second");

        image::RgbaImage::from_pixel(3, 2, image::Rgba([0, 255, 0, 255]))
            .save(second.path().join("button.png"))
            .unwrap();

        let source = FileSystemSource::new([first.path(), second.path()]);
        let resolved = source.resolve("button.png").unwrap();
        assert_eq!(PathBuf::from(&resolved), second.path().join("button.png"));
        assert_eq!(source.resolve("missing.png"), None);
        assert_eq!(source.resolve(""), None);

        let data = source.load(&resolved).unwrap();
        assert_eq!((data.width, data.height), (3, 2));
        assert_eq!(&data.pixels[0..4], &[0, 255, 0, 255]);

        // 绝对路径直接解析
        assert_eq!(source.resolve(&resolved).as_deref(), Some(resolved.as_str()));
    }

    #[test]
    fn test_filesystem_decode_failure() {
        let dir = ScratchDir::new("fs_corrupt");
        std::fs::write(dir.path().join("broken.png"), b"not a png").unwrap();

        let source = FileSystemSource::new([dir.path()]);
        let resolved = source.resolve("broken.png").unwrap();
        let err = source.load(&resolved).unwrap_err();
        assert!(matches!(err, DistSceneError::AssetLoad { .. }));
    }

    #[test]
    fn test_scratch_dir_is_removed() {
        let path = {
            let dir = ScratchDir::new("cleanup");
            std::fs::write(dir.path().join("a.txt"), b"a").unwrap();
            dir.path().to_path_buf()
        };
        assert!(!path.exists());
    }
}
