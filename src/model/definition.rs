//! 模型定义构建器
//!
//! 模型声明是一组静态的 (名称, 字段) 与 (名称, 关系) 对，由注册表统一构建为不可变的 `ModelSchema`。
//! 也可以从 TOML/JSON 声明文件加载。

use crate::error::QuickModelResult;
use crate::model::field_types::FieldDefinition;
use crate::model::meta::{MetaOptions, ValidationPolicy};
use crate::model::relationship::{
    many_to_many, foreign_key, one_to_one, ModelRef, RelationKind, RelationshipDefinition,
};
use serde::{Deserialize, Serialize};

/// 模型定义
#[derive(Debug, Clone)]
pub struct ModelDefinition {
    pub(crate) class_name: String,
    pub(crate) module: String,
    pub(crate) options: MetaOptions,
    pub(crate) fields: Vec<(String, FieldDefinition)>,
    pub(crate) relationships: Vec<(String, RelationshipDefinition)>,
}

impl ModelDefinition {
    /// 创建模型定义
    ///
    /// # 参数
    ///
    /// * `class_name` - 类名
    /// * `module` - 所属模块路径，最后一段作为 app_label
    pub fn new(class_name: &str, module: &str) -> Self {
        Self {
            class_name: class_name.to_string(),
            module: module.to_string(),
            options: MetaOptions::default(),
            fields: Vec::new(),
            relationships: Vec::new(),
        }
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn module(&self) -> &str {
        &self.module
    }

    pub fn verbose_name(mut self, name: &str) -> Self {
        self.options.verbose_name = Some(name.to_string());
        self
    }

    pub fn verbose_name_plural(mut self, name: &str) -> Self {
        self.options.verbose_name_plural = Some(name.to_string());
        self
    }

    pub fn validation_policy(mut self, policy: ValidationPolicy) -> Self {
        self.options.fields_validation_policy = Some(policy);
        self
    }

    pub fn options(mut self, options: MetaOptions) -> Self {
        self.options = options;
        self
    }

    /// 添加字段
    pub fn field(mut self, name: &str, field: FieldDefinition) -> Self {
        self.fields.push((name.to_string(), field));
        self
    }

    /// 添加关系
    pub fn relationship(mut self, name: &str, relationship: RelationshipDefinition) -> Self {
        self.relationships.push((name.to_string(), relationship));
        self
    }

    pub fn foreign_key(self, name: &str, target: impl Into<ModelRef>) -> Self {
        self.relationship(name, foreign_key(target))
    }

    pub fn one_to_one(self, name: &str, target: impl Into<ModelRef>) -> Self {
        self.relationship(name, one_to_one(target))
    }

    pub fn many_to_many(self, name: &str, target: impl Into<ModelRef>) -> Self {
        self.relationship(name, many_to_many(target))
    }
}

/// 声明文件
///
/// ```toml
/// [[models]]
/// name = "Person"
/// module = "people.models"
/// [[models.fields]]
/// name = "first_name"
/// type = "char"
/// params = { max_length = 40, primary_key = true }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchemaFile {
    #[serde(default)]
    pub models: Vec<ModelEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelEntry {
    pub name: String,
    pub module: String,
    #[serde(default)]
    pub verbose_name: Option<String>,
    #[serde(default)]
    pub verbose_name_plural: Option<String>,
    #[serde(default)]
    pub fields_validation_policy: Option<ValidationPolicy>,
    #[serde(default)]
    pub fields: Vec<FieldEntry>,
    #[serde(default)]
    pub relationships: Vec<RelationshipEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldEntry {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: String,
    #[serde(default)]
    pub params: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelationshipEntry {
    pub name: String,
    pub kind: RelationKind,
    pub to: String,
}

impl SchemaFile {
    /// 从 TOML 文本解析
    pub fn from_toml_str(content: &str) -> QuickModelResult<Self> {
        toml::from_str(content)
            .map_err(|e| crate::quick_error!(config, format!("解析TOML声明文件失败: {}", e)))
    }

    /// 从文件加载，`.toml` 按 TOML 解析，否则按 JSON 解析
    pub fn from_file<P: AsRef<std::path::Path>>(path: P) -> QuickModelResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        if path.as_ref().extension().and_then(|s| s.to_str()) == Some("toml") {
            Self::from_toml_str(&content)
        } else {
            serde_json::from_str(&content)
                .map_err(|e| crate::quick_error!(config, format!("解析JSON声明文件失败: {}", e)))
        }
    }

    /// 转换为模型定义，字段参数错误在此处以类型错误返回
    pub fn definitions(&self) -> QuickModelResult<Vec<ModelDefinition>> {
        self.models.iter().map(ModelEntry::to_definition).collect()
    }
}

impl ModelEntry {
    pub fn to_definition(&self) -> QuickModelResult<ModelDefinition> {
        let mut definition = ModelDefinition::new(&self.name, &self.module).options(MetaOptions {
            verbose_name: self.verbose_name.clone(),
            verbose_name_plural: self.verbose_name_plural.clone(),
            fields_validation_policy: self.fields_validation_policy,
        });
        for entry in &self.fields {
            definition = definition.field(
                &entry.name,
                FieldDefinition::from_params(&entry.field_type, &entry.params)?,
            );
        }
        for entry in &self.relationships {
            definition = definition.relationship(
                &entry.name,
                RelationshipDefinition { kind: entry.kind, target: ModelRef::parse(&entry.to) },
            );
        }
        Ok(definition)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::field_types::FieldType;

    #[test]
    fn test_parse_schema_file() {
        let content = r#"
[[models]]
name = "Person"
module = "people.models"
verbose_name_plural = "People"
fields_validation_policy = "validate_none"

[[models.fields]]
name = "first_name"
type = "char"
params = { max_length = 40, primary_key = true }

[[models.fields]]
name = "birthdate"
type = "date"

[[models.relationships]]
name = "live_in"
kind = "foreign_key"
to = "House"
"#;
        let file = SchemaFile::from_toml_str(content).unwrap();
        let definitions = file.definitions().unwrap();
        assert_eq!(definitions.len(), 1);

        let person = &definitions[0];
        assert_eq!(person.class_name(), "Person");
        assert_eq!(person.options.verbose_name_plural.as_deref(), Some("People"));
        assert_eq!(person.options.fields_validation_policy, Some(ValidationPolicy::ValidateNone));
        assert!(matches!(person.fields[0].1.field_type, FieldType::Char { max_length: 40 }));
        assert!(person.fields[0].1.primary_key);
        assert_eq!(person.relationships[0].1.kind, RelationKind::ForeignKey);
    }

    #[test]
    fn test_bad_params_surface_as_type_errors() {
        let content = r#"
[[models]]
name = "Person"
module = "people"

[[models.fields]]
name = "first_name"
type = "char"
params = { max_length = 40, blank = "no" }
"#;
        let file = SchemaFile::from_toml_str(content).unwrap();
        assert!(file.definitions().unwrap_err().is_type_error());
    }
}
