//! 进程内存储

use super::{check_schema, upsert, ObjectsManager};
use crate::error::QuickModelResult;
use crate::model::instance::{not_in_collection, ModelInstance};
use crate::model::schema::ModelSchema;
use crate::model::set::ModelSet;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;

pub struct MemoryManager {
    schema: Arc<ModelSchema>,
    objects: Mutex<Vec<ModelInstance>>,
}

impl MemoryManager {
    pub fn new(schema: &Arc<ModelSchema>) -> Self {
        Self {
            schema: Arc::clone(schema),
            objects: Mutex::new(Vec::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.objects.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.lock().is_empty()
    }
}

#[async_trait]
impl ObjectsManager for MemoryManager {
    fn schema(&self) -> &Arc<ModelSchema> {
        &self.schema
    }

    async fn add(&self, instance: ModelInstance) -> QuickModelResult<ModelInstance> {
        check_schema(&self.schema, &instance)?;
        upsert(&mut self.objects.lock(), instance.clone());
        Ok(instance)
    }

    async fn all(&self) -> QuickModelResult<ModelSet> {
        let items = self.objects.lock().clone();
        ModelSet::new(&self.schema, items)
    }

    async fn delete(&self, instance: &ModelInstance) -> QuickModelResult<()> {
        check_schema(&self.schema, instance)?;
        let mut objects = self.objects.lock();
        let index = objects
            .iter()
            .position(|item| item == instance)
            .ok_or_else(|| not_in_collection(&self.schema, instance))?;
        objects.remove(index);
        Ok(())
    }
}
