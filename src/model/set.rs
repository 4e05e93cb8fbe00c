//! 模型集合
//!
//! - `ModelSet`：固定模型的有序实例序列，字典形式为 `{plural: [instance_dict, ...]}`
//! - `ModelSetManager`：按内容哈希去重的集合，作为多对多关系的运行时取值

use crate::error::QuickModelResult;
use crate::model::instance::{dict_key_missing, dict_required, not_in_collection, ModelInstance};
use crate::model::schema::ModelSchema;
use crate::serializer::serializer_registry;
use crate::types::DataValue;
use std::ops::Deref;
use std::sync::Arc;

fn check_instance(schema: &Arc<ModelSchema>, instance: &ModelInstance, operation: &str) -> QuickModelResult<()> {
    if Arc::ptr_eq(schema, instance.schema()) {
        Ok(())
    } else {
        Err(crate::quick_error!(
            type_error,
            format!(
                "{}() 只接受 {} 实例，收到 {}",
                operation,
                schema.name(),
                instance
            )
        ))
    }
}

/// 从 `{plural: [...]}` 中取出列表
fn plural_items<'a>(schema: &ModelSchema, data: &'a DataValue) -> QuickModelResult<&'a [DataValue]> {
    let plural = &schema.meta().verbose_name_plural;
    let model = format!("{}.Set", schema.name());
    let map = data.as_object().ok_or_else(|| dict_required(&model, data))?;
    map.get(plural)
        .and_then(|items| items.as_array())
        .ok_or_else(|| dict_key_missing(&model, plural, data))
}

/// 有序模型集合
#[derive(Clone)]
pub struct ModelSet {
    schema: Arc<ModelSchema>,
    items: Vec<ModelInstance>,
}

impl ModelSet {
    /// 创建集合，逐个检查实例类型
    pub fn new(schema: &Arc<ModelSchema>, items: Vec<ModelInstance>) -> QuickModelResult<Self> {
        for item in &items {
            check_instance(schema, item, "ModelSet")?;
        }
        Ok(Self { schema: Arc::clone(schema), items })
    }

    pub fn empty(schema: &Arc<ModelSchema>) -> Self {
        Self { schema: Arc::clone(schema), items: Vec::new() }
    }

    pub fn schema(&self) -> &Arc<ModelSchema> {
        &self.schema
    }

    /// 复数显示名
    pub fn plural(&self) -> &str {
        &self.schema.meta().verbose_name_plural
    }

    pub fn add(&mut self, instance: ModelInstance) -> QuickModelResult<()> {
        check_instance(&self.schema, &instance, "add")?;
        self.items.push(instance);
        Ok(())
    }

    /// 移除第一个相等的实例
    pub fn remove(&mut self, instance: &ModelInstance) -> QuickModelResult<()> {
        check_instance(&self.schema, instance, "remove")?;
        let position = self
            .items
            .iter()
            .position(|item| item == instance)
            .ok_or_else(|| not_in_collection(&self.schema, instance))?;
        self.items.remove(position);
        Ok(())
    }

    pub fn into_vec(self) -> Vec<ModelInstance> {
        self.items
    }

    pub fn to_dict(&self) -> QuickModelResult<DataValue> {
        let dicts = self
            .items
            .iter()
            .map(|item| item.to_dict())
            .collect::<QuickModelResult<Vec<_>>>()?;
        Ok(DataValue::single(self.plural().to_string(), DataValue::Array(dicts)))
    }

    pub fn from_dict(schema: &Arc<ModelSchema>, data: &DataValue) -> QuickModelResult<Self> {
        let items = plural_items(schema, data)?
            .iter()
            .map(|item| ModelInstance::from_dict(schema, item))
            .collect::<QuickModelResult<Vec<_>>>()?;
        Ok(Self { schema: Arc::clone(schema), items })
    }

    pub fn serialize(&self, format: &str) -> QuickModelResult<String> {
        serializer_registry().get(format)?.serialize(&self.to_dict()?)
    }

    pub fn deserialize(schema: &Arc<ModelSchema>, text: &str, format: &str) -> QuickModelResult<Self> {
        let data = serializer_registry().get(format)?.deserialize(text)?;
        Self::from_dict(schema, &data)
    }
}

impl Deref for ModelSet {
    type Target = [ModelInstance];

    fn deref(&self) -> &Self::Target {
        &self.items
    }
}

impl<'a> IntoIterator for &'a ModelSet {
    type Item = &'a ModelInstance;
    type IntoIter = std::slice::Iter<'a, ModelInstance>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl IntoIterator for ModelSet {
    type Item = ModelInstance;
    type IntoIter = std::vec::IntoIter<ModelInstance>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl PartialEq for ModelSet {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.schema, &other.schema) && self.items == other.items
    }
}

impl PartialEq<[ModelInstance]> for ModelSet {
    fn eq(&self, other: &[ModelInstance]) -> bool {
        self.items.as_slice() == other
    }
}

impl std::fmt::Display for ModelSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let items: Vec<String> = self.items.iter().map(|i| i.to_string()).collect();
        write!(f, "{}.Set([{}])", self.schema.name(), items.join(", "))
    }
}

impl std::fmt::Debug for ModelSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self)
    }
}

/// 去重集合
///
/// 按实例内容哈希去重：哈希相同的实例原位替换，否则追加；迭代保持插入顺序
#[derive(Clone)]
pub struct ModelSetManager {
    schema: Arc<ModelSchema>,
    hashes: Vec<u64>,
    objects: Vec<ModelInstance>,
}

impl ModelSetManager {
    pub fn new(schema: &Arc<ModelSchema>) -> Self {
        Self {
            schema: Arc::clone(schema),
            hashes: Vec::new(),
            objects: Vec::new(),
        }
    }

    pub fn schema(&self) -> &Arc<ModelSchema> {
        &self.schema
    }

    pub fn add(&mut self, instance: ModelInstance) -> QuickModelResult<()> {
        check_instance(&self.schema, &instance, "add")?;
        let hash = instance.identity_hash();
        match self.hashes.iter().position(|h| *h == hash) {
            Some(index) => self.objects[index] = instance,
            None => {
                self.hashes.push(hash);
                self.objects.push(instance);
            }
        }
        Ok(())
    }

    pub fn remove(&mut self, instance: &ModelInstance) -> QuickModelResult<()> {
        check_instance(&self.schema, instance, "remove")?;
        let hash = instance.identity_hash();
        let index = self
            .hashes
            .iter()
            .position(|h| *h == hash)
            .ok_or_else(|| not_in_collection(&self.schema, instance))?;
        self.hashes.remove(index);
        self.objects.remove(index);
        Ok(())
    }

    pub fn contains(&self, instance: &ModelInstance) -> bool {
        Arc::ptr_eq(&self.schema, instance.schema()) && self.hashes.contains(&instance.identity_hash())
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ModelInstance> {
        self.objects.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ModelInstance> {
        self.objects.iter()
    }

    /// 当前内容的快照
    pub fn as_modelset(&self) -> ModelSet {
        ModelSet {
            schema: Arc::clone(&self.schema),
            items: self.objects.clone(),
        }
    }

    pub fn to_dict(&self) -> QuickModelResult<DataValue> {
        self.as_modelset().to_dict()
    }

    pub fn from_dict(schema: &Arc<ModelSchema>, data: &DataValue) -> QuickModelResult<Self> {
        let mut manager = Self::new(schema);
        for item in plural_items(schema, data)? {
            manager.add(ModelInstance::from_dict(schema, item)?)?;
        }
        Ok(manager)
    }
}

impl<'a> IntoIterator for &'a ModelSetManager {
    type Item = &'a ModelInstance;
    type IntoIter = std::slice::Iter<'a, ModelInstance>;

    fn into_iter(self) -> Self::IntoIter {
        self.objects.iter()
    }
}

impl std::fmt::Debug for ModelSetManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<ModelSetManager for {} object: {} items>", self.schema.name(), self.objects.len())
    }
}
