//! 模型结构
//!
//! `ModelSchema` 是模型的不可变描述：元数据、按声明顺序排列的字段和关系。
//! 实例持有它的 `Arc`，而不是把字段混入实例类型。

use crate::error::QuickModelResult;
use crate::model::field_types::FieldDefinition;
use crate::model::instance::{AttrValue, AttributeSource, ModelInstance};
use crate::model::meta::ModelMeta;
use crate::model::relationship::Relationship;
use crate::model::set::{ModelSet, ModelSetManager};
use crate::types::DataValue;
use std::collections::HashMap;
use std::sync::Arc;

pub struct ModelSchema {
    meta: ModelMeta,
    fields: Vec<FieldDefinition>,
    relationships: Vec<Relationship>,
}

impl ModelSchema {
    pub(crate) fn new(meta: ModelMeta, fields: Vec<FieldDefinition>, relationships: Vec<Relationship>) -> Self {
        Self { meta, fields, relationships }
    }

    /// 类名
    pub fn name(&self) -> &str {
        &self.meta.class_name
    }

    pub fn meta(&self) -> &ModelMeta {
        &self.meta
    }

    /// 按声明顺序排列的字段
    pub fn fields(&self) -> &[FieldDefinition] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldDefinition> {
        self.fields.iter().find(|f| f.name() == name)
    }

    pub fn relationships(&self) -> &[Relationship] {
        &self.relationships
    }

    pub fn relationship(&self, name: &str) -> Option<&Relationship> {
        self.relationships.iter().find(|r| r.name() == name)
    }

    pub fn has_pk(&self) -> bool {
        self.meta.has_pk
    }

    /// 主键字段
    pub fn primary_key_fields(&self) -> impl Iterator<Item = &FieldDefinition> {
        self.fields.iter().filter(|f| f.primary_key)
    }

    /// 已解析关系的目标复数显示名 → 关系名
    pub fn relationships_plural(&self) -> HashMap<String, String> {
        self.relationships
            .iter()
            .filter_map(|r| {
                r.to_model()
                    .ok()
                    .map(|target| (target.meta().verbose_name_plural.clone(), r.name().to_string()))
            })
            .collect()
    }

    /// 是否为同一个模型
    pub fn is_same(self: &Arc<Self>, other: &Arc<ModelSchema>) -> bool {
        Arc::ptr_eq(self, other)
    }

    /// 创建空实例
    pub fn instance(self: &Arc<Self>) -> ModelInstance {
        ModelInstance::new(self)
    }

    /// 按关键字创建实例
    pub fn create<I, K>(self: &Arc<Self>, values: I) -> QuickModelResult<ModelInstance>
    where
        I: IntoIterator<Item = (K, AttrValue)>,
        K: AsRef<str>,
    {
        ModelInstance::with_values(self, values)
    }

    pub fn from_dict(self: &Arc<Self>, data: &DataValue) -> QuickModelResult<ModelInstance> {
        ModelInstance::from_dict(self, data)
    }

    pub fn deserialize(self: &Arc<Self>, text: &str, format: &str) -> QuickModelResult<ModelInstance> {
        ModelInstance::deserialize(self, text, format)
    }

    pub fn fill_from_object(self: &Arc<Self>, source: &dyn AttributeSource) -> QuickModelResult<ModelInstance> {
        ModelInstance::fill_from_object(self, source)
    }

    /// 空集合
    pub fn set(self: &Arc<Self>) -> ModelSet {
        ModelSet::empty(self)
    }

    /// 由实例列表创建集合，逐个检查类型
    pub fn set_of(self: &Arc<Self>, items: Vec<ModelInstance>) -> QuickModelResult<ModelSet> {
        ModelSet::new(self, items)
    }

    /// 去重集合
    pub fn set_manager(self: &Arc<Self>) -> ModelSetManager {
        ModelSetManager::new(self)
    }
}

impl std::fmt::Display for ModelSchema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.meta.module, self.meta.class_name)
    }
}

impl std::fmt::Debug for ModelSchema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelSchema")
            .field("meta", &self.meta)
            .field("fields", &self.fields.iter().map(|f| f.name()).collect::<Vec<_>>())
            .field("relationships", &self.relationships)
            .finish()
    }
}
