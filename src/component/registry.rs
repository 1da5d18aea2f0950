//! 组件注册表
//!
//! 组件名称 -> 构造函数，用于按名称动态挂载组件（例如场景描述文件中的 `components = [...]`）。

use std::collections::BTreeMap;

use super::{Component, Sprite};
use crate::core::error::{DistSceneError, Result};

/// 组件构造函数
pub type ComponentFactory = fn() -> Box<dyn Component>;

fn construct<T: Component + Default>() -> Box<dyn Component> {
    Box::new(T::default())
}

/// 组件注册表
#[derive(Debug, Clone, Default)]
pub struct ComponentRegistry {
    factories: BTreeMap<String, ComponentFactory>,
}

impl ComponentRegistry {
    /// 创建空注册表
    pub fn new() -> Self {
        Self::default()
    }

    /// 创建注册了内置组件的注册表
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        registry.register_default::<Sprite>("Sprite");
        registry
    }

    /// 注册构造函数；同名注册会覆盖旧的
    pub fn register(&mut self, name: impl Into<String>, factory: ComponentFactory) {
        self.factories.insert(name.into(), factory);
    }

    /// 注册使用 `Default` 构造的组件类型
    pub fn register_default<T: Component + Default>(&mut self, name: impl Into<String>) {
        self.register(name, construct::<T>);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// 已注册的组件名称（按字典序）
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    /// 按名称构造组件
    pub fn create(&self, name: &str) -> Result<Box<dyn Component>> {
        self.factories
            .get(name)
            .map(|factory| factory())
            .ok_or_else(|| DistSceneError::invalid(format!("unknown component type '{}'", name)))
    }
}
