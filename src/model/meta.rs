//! 模型元数据
//!
//! 每个模型在声明时生成一份 `ModelMeta`，之后被该模型的所有实例共享

use serde::{Deserialize, Serialize};

/// 字段校验策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationPolicy {
    /// 校验所有字段（字段自身关闭内容校验的除外）
    ValidateAll,
    /// 不调用 `validate`，类型转换仍然执行
    ValidateNone,
}

impl Default for ValidationPolicy {
    fn default() -> Self {
        ValidationPolicy::ValidateAll
    }
}

/// 模型声明时可选的元数据参数
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetaOptions {
    pub verbose_name: Option<String>,
    pub verbose_name_plural: Option<String>,
    pub fields_validation_policy: Option<ValidationPolicy>,
}

/// 模型元数据
#[derive(Debug, Clone, PartialEq)]
pub struct ModelMeta {
    /// 类名
    pub class_name: String,
    /// 所属模块路径，如 `people.models`
    pub module: String,
    /// 模块路径最后一段
    pub app_label: String,
    /// 单数显示名，默认为类名
    pub verbose_name: String,
    /// 复数显示名，默认为类名加 `s`
    pub verbose_name_plural: String,
    /// 字段校验策略
    pub fields_validation_policy: ValidationPolicy,
    /// 是否至少有一个主键字段
    pub has_pk: bool,
}

impl ModelMeta {
    pub fn build(
        class_name: &str,
        module: &str,
        options: &MetaOptions,
        default_policy: ValidationPolicy,
        has_pk: bool,
    ) -> Self {
        Self {
            class_name: class_name.to_string(),
            module: module.to_string(),
            app_label: app_label_of(module),
            verbose_name: options
                .verbose_name
                .clone()
                .unwrap_or_else(|| class_name.to_string()),
            verbose_name_plural: options
                .verbose_name_plural
                .clone()
                .unwrap_or_else(|| format!("{}s", class_name)),
            fields_validation_policy: options.fields_validation_policy.unwrap_or(default_policy),
            has_pk,
        }
    }

    /// 是否对字段写入执行校验
    pub fn validates(&self) -> bool {
        self.fields_validation_policy == ValidationPolicy::ValidateAll
    }
}

/// 取模块路径最后一段作为 app_label
pub fn app_label_of(module: &str) -> String {
    module.rsplit('.').next().unwrap_or(module).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let meta = ModelMeta::build(
            "Person",
            "people.models",
            &MetaOptions::default(),
            ValidationPolicy::ValidateAll,
            false,
        );
        assert_eq!(meta.app_label, "models");
        assert_eq!(meta.verbose_name, "Person");
        assert_eq!(meta.verbose_name_plural, "Persons");
        assert!(meta.validates());
    }

    #[test]
    fn test_explicit_options() {
        let options = MetaOptions {
            verbose_name: None,
            verbose_name_plural: Some("People".to_string()),
            fields_validation_policy: Some(ValidationPolicy::ValidateNone),
        };
        let meta = ModelMeta::build("Person", "people", &options, ValidationPolicy::ValidateAll, true);
        assert_eq!(meta.app_label, "people");
        assert_eq!(meta.verbose_name_plural, "People");
        assert!(!meta.validates());
    }
}
