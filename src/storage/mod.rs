//! 存储适配器模块
//!
//! 所有适配器实现统一的 `ObjectsManager` 接口，过滤为对已物化集合的线性扫描。

pub mod file_system;
pub mod memory;

use crate::error::QuickModelResult;
use crate::model::instance::{AttrValue, ModelInstance};
use crate::model::schema::ModelSchema;
use crate::model::set::ModelSet;
use crate::types::DataValue;
use async_trait::async_trait;
use std::sync::Arc;

pub use file_system::FileSystemManager;
pub use memory::MemoryManager;

/// 模型对象管理器
#[async_trait]
pub trait ObjectsManager: Send + Sync {
    /// 管理的模型
    fn schema(&self) -> &Arc<ModelSchema>;

    /// 保存实例，已存在相等实例时原位替换
    async fn add(&self, instance: ModelInstance) -> QuickModelResult<ModelInstance>;

    /// 全部实例
    async fn all(&self) -> QuickModelResult<ModelSet>;

    /// 删除实例，不存在时返回集合错误
    async fn delete(&self, instance: &ModelInstance) -> QuickModelResult<()>;

    /// 按关键字创建并保存实例
    async fn create(&self, values: Vec<(String, AttrValue)>) -> QuickModelResult<ModelInstance> {
        let instance = self.schema().create(values)?;
        self.add(instance).await
    }

    /// 按字段相等条件过滤
    async fn filter(&self, constraints: &[(&str, DataValue)]) -> QuickModelResult<ModelSet> {
        let all = self.all().await?;
        filter_set(all, constraints)
    }

    /// 第一个满足条件的实例
    async fn get(&self, constraints: &[(&str, DataValue)]) -> QuickModelResult<Option<ModelInstance>> {
        Ok(self.filter(constraints).await?.into_vec().into_iter().next())
    }

    /// 删除集合中的全部实例
    async fn delete_set(&self, set: &ModelSet) -> QuickModelResult<()> {
        for instance in set {
            self.delete(instance).await?;
        }
        Ok(())
    }
}

/// 按字段相等条件过滤集合
///
/// 条件值先经过字段的类型转换再比较；任何未知字段名都会在比较之前返回类型错误
pub fn filter_set(set: ModelSet, constraints: &[(&str, DataValue)]) -> QuickModelResult<ModelSet> {
    let schema = Arc::clone(set.schema());

    let mut expected = Vec::with_capacity(constraints.len());
    for (name, value) in constraints {
        let field = schema.field(name).ok_or_else(|| {
            crate::quick_error!(
                type_error,
                format!("{} 没有字段 {}，无法按该字段过滤", schema.name(), name)
            )
        })?;
        expected.push((*name, field.convert_type(value)?));
    }

    let items = set
        .into_vec()
        .into_iter()
        .filter(|instance| {
            expected
                .iter()
                .all(|(name, value)| instance.get(name) == Some(value))
        })
        .collect();
    ModelSet::new(&schema, items)
}

/// 在实例列表中写入实例：存在相等实例时原位替换，否则追加
pub(crate) fn upsert(items: &mut Vec<ModelInstance>, instance: ModelInstance) {
    match items.iter().position(|item| *item == instance) {
        Some(index) => items[index] = instance,
        None => items.push(instance),
    }
}

pub(crate) fn check_schema(schema: &Arc<ModelSchema>, instance: &ModelInstance) -> QuickModelResult<()> {
    if Arc::ptr_eq(schema, instance.schema()) {
        Ok(())
    } else {
        Err(crate::quick_error!(
            type_error,
            format!("{} 的管理器不接受 {}", schema.name(), instance)
        ))
    }
}
