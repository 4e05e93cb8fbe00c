//! 文件存储
//!
//! 每个模型对应 `<base_path>/<ClassName>.json`，内容为集合的嵌套字典形式。
//! 文件不存在时为空集合；内容无法解析时读取按空集合处理，写入则返回错误，
//! 不会覆盖已有文件。

use super::{check_schema, upsert, ObjectsManager};
use crate::config::GlobalConfig;
use crate::error::QuickModelResult;
use crate::i18n;
use crate::model::instance::{not_in_collection, ModelInstance};
use crate::model::schema::ModelSchema;
use crate::model::set::ModelSet;
use crate::serializer::{JsonSerializer, Serializer};
use async_trait::async_trait;
use rat_logger::{debug, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;

pub struct FileSystemManager {
    schema: Arc<ModelSchema>,
    base_path: PathBuf,
    serializer: JsonSerializer,
    // 串行化读改写
    lock: Mutex<()>,
}

impl FileSystemManager {
    /// 创建文件存储，`base_path` 必须是已存在的目录
    pub fn new<P: AsRef<Path>>(schema: &Arc<ModelSchema>, base_path: P) -> QuickModelResult<Self> {
        let base_path = base_path.as_ref().to_path_buf();
        if !base_path.is_dir() {
            let path = base_path.display().to_string();
            return Err(crate::quick_error!(
                config,
                i18n::tf("error.path_not_found", &[("path", path.as_str())])
            ));
        }
        Ok(Self {
            schema: Arc::clone(schema),
            base_path,
            serializer: JsonSerializer::new(true),
            lock: Mutex::new(()),
        })
    }

    /// 使用全局配置中的存储目录
    pub fn from_config(schema: &Arc<ModelSchema>, config: &GlobalConfig) -> QuickModelResult<Self> {
        let base_path = config
            .storage_base_path
            .as_ref()
            .ok_or_else(|| crate::quick_error!(config, "未配置 storage_base_path"))?;
        Self::new(schema, base_path)
    }

    /// 数据文件路径
    pub fn file_path(&self) -> PathBuf {
        self.base_path.join(format!("{}.json", self.schema.name()))
    }

    /// 读取数据文件，文件不存在时为空集合
    async fn load(&self) -> QuickModelResult<Vec<ModelInstance>> {
        let path = self.file_path();
        let text = match tokio::fs::read_to_string(&path).await {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let data = self.serializer.deserialize(&text)?;
        Ok(ModelSet::from_dict(&self.schema, &data)?.into_vec())
    }

    async fn save(&self, items: Vec<ModelInstance>) -> QuickModelResult<()> {
        let count = items.len();
        let set = ModelSet::new(&self.schema, items)?;
        let text = self.serializer.serialize(&set.to_dict()?)?;
        let path = self.file_path();
        tokio::fs::write(&path, text).await?;
        debug!("写入数据文件: {:?}, 数量={}", path, count);
        Ok(())
    }
}

#[async_trait]
impl ObjectsManager for FileSystemManager {
    fn schema(&self) -> &Arc<ModelSchema> {
        &self.schema
    }

    async fn add(&self, instance: ModelInstance) -> QuickModelResult<ModelInstance> {
        check_schema(&self.schema, &instance)?;
        let _guard = self.lock.lock().await;
        let mut items = self.load().await?;
        upsert(&mut items, instance.clone());
        self.save(items).await?;
        Ok(instance)
    }

    async fn all(&self) -> QuickModelResult<ModelSet> {
        let _guard = self.lock.lock().await;
        let items = match self.load().await {
            Ok(items) => items,
            Err(e) => {
                warn!("数据文件无法读取，按空集合处理: {:?}, {}", self.file_path(), e);
                Vec::new()
            }
        };
        ModelSet::new(&self.schema, items)
    }

    async fn delete(&self, instance: &ModelInstance) -> QuickModelResult<()> {
        check_schema(&self.schema, instance)?;
        let _guard = self.lock.lock().await;
        let mut items = self.load().await?;
        let index = items
            .iter()
            .position(|item| item == instance)
            .ok_or_else(|| not_in_collection(&self.schema, instance))?;
        items.remove(index);
        self.save(items).await
    }
}
