//! rat_quickmodel - 声明式模型映射库
//!
//! 以构建器声明模型的字段与关系，字段写入统一经过校验与类型转换，
//! 实例与集合通过嵌套字典中间形式与 JSON/XML 无损往返，
//! 字符串形式的关系目标通过模型注册表延迟解析。

// 导出所有公共模块
pub mod error;
pub mod types;
pub mod i18n;
pub mod config;
pub mod model;
pub mod registry;
pub mod serializer;
pub mod storage;

// 重新导出常用类型和函数
pub use error::{QuickModelError, QuickModelResult};
pub use types::*;
pub use config::{GlobalConfig, GlobalConfigBuilder};
pub use model::{
    AttrValue, AttributeSource, FieldDefinition, FieldType, HttpUrlChecker, MetaOptions, ModelDefinition,
    ModelInstance, ModelMeta, ModelRef, ModelSchema, ModelSet, ModelSetManager, RelationKind, Relationship,
    SchemaFile, SourceValue, UrlChecker, ValidationPolicy,
    boolean_field, char_field, date_field, datetime_field, decimal_field, email_field, float_field,
    foreign_key, integer_field, many_to_many, one_to_one, phone_number_field, text_field, time_field,
    url_field,
};
pub use registry::{global_registry, register_model, ModelRegistry, RegistryQuery};
pub use serializer::{
    configure_serializers, serializer_registry, JsonSerializer, Serializer, SerializerRegistry, XmlSerializer,
};
pub use storage::{FileSystemManager, MemoryManager, ObjectsManager};

// 条件编译调试宏 - 只有在 debug 模式下才输出调试信息
#[cfg(debug_assertions)]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {
        rat_logger::debug!($($arg)*);
    };
}

#[cfg(not(debug_assertions))]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {
        // 在 release 模式下不输出调试信息
    };
}

/// 初始化rat_quickmodel库
///
/// 注册多语言错误消息并按环境变量选择语言
///
/// 注意：日志系统由调用者自行初始化，本库不会初始化日志
pub fn init() {
    i18n::ErrorMessageI18n::init();
}

/// 按全局配置初始化
///
/// 在 `init()` 的基础上应用配置中的语言和序列化器输出风格
pub fn init_with_config(config: &GlobalConfig) {
    init();
    config.apply_language();
    configure_serializers(config);
}

/// 库版本信息
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// 库名称
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// 获取库信息
pub fn get_info() -> String {
    format!("{} v{}", NAME, VERSION)
}
