//! 序列化插件模块
//!
//! 每种格式实现 `Serializer` 并以格式名登记到 `SerializerRegistry`，
//! 实例与集合通过格式名选择编解码器，在嵌套字典形式和文本之间转换。

pub mod json;
pub mod xml;

use crate::config::GlobalConfig;
use crate::error::QuickModelResult;
use crate::i18n;
use crate::types::DataValue;
use dashmap::DashMap;
use once_cell::sync::Lazy;
use rat_logger::debug;
use std::sync::Arc;

pub use json::JsonSerializer;
pub use xml::XmlSerializer;

/// 序列化器
pub trait Serializer: Send + Sync {
    /// 格式名，作为注册表中的键
    fn format(&self) -> &str;

    /// 嵌套字典 → 文本
    fn serialize(&self, data: &DataValue) -> QuickModelResult<String>;

    /// 文本 → 嵌套字典
    fn deserialize(&self, text: &str) -> QuickModelResult<DataValue>;
}

/// 格式名到序列化器的映射
pub struct SerializerRegistry {
    serializers: DashMap<String, Arc<dyn Serializer>>,
}

impl Default for SerializerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SerializerRegistry {
    /// 创建空注册表
    pub fn new() -> Self {
        Self { serializers: DashMap::new() }
    }

    /// 预置 JSON 与 XML 的注册表
    pub fn with_defaults() -> Self {
        let registry = Self::new();
        registry.register(Arc::new(JsonSerializer::default()));
        registry.register(Arc::new(XmlSerializer::default()));
        registry
    }

    /// 登记序列化器，同名格式会被替换
    pub fn register(&self, serializer: Arc<dyn Serializer>) {
        let format = serializer.format().to_string();
        debug!("注册序列化器: {}", format);
        self.serializers.insert(format, serializer);
    }

    /// 按格式名取序列化器
    pub fn get(&self, format: &str) -> QuickModelResult<Arc<dyn Serializer>> {
        self.serializers
            .get(format)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| {
                crate::quick_error!(
                    format,
                    i18n::tf("error.format_not_implemented", &[("format", format)])
                )
            })
    }

    /// 已登记的格式名，按字母排序
    pub fn formats(&self) -> Vec<String> {
        let mut formats: Vec<String> = self.serializers.iter().map(|e| e.key().clone()).collect();
        formats.sort();
        formats
    }
}

static SERIALIZER_REGISTRY: Lazy<SerializerRegistry> = Lazy::new(SerializerRegistry::with_defaults);

/// 进程级序列化器注册表
pub fn serializer_registry() -> &'static SerializerRegistry {
    &SERIALIZER_REGISTRY
}

/// 按全局配置重新登记内置序列化器
pub fn configure_serializers(config: &GlobalConfig) {
    let registry = serializer_registry();
    registry.register(Arc::new(JsonSerializer::new(config.json_pretty)));
    registry.register(Arc::new(XmlSerializer::new(config.xml_declaration)));
}
