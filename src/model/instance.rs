//! 模型实例
//!
//! 实例只保存字段名到取值的映射和所属模型的 `Arc`。
//! 所有字段写入都经过 `set_field`，顺序固定为：校验（受模型校验策略控制）→ 类型转换 → 存储。

use crate::error::{QuickModelError, QuickModelResult};
use crate::i18n;
use crate::model::schema::ModelSchema;
use crate::model::set::ModelSetManager;
use crate::serializer::serializer_registry;
use crate::types::DataValue;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// 写入实例属性的取值
#[derive(Debug, Clone)]
pub enum AttrValue {
    /// 字段的原始取值
    Value(DataValue),
    /// 外键/一对一目标实例
    Instance(ModelInstance),
    /// 多对多目标实例列表，写入时转换为去重集合
    Instances(Vec<ModelInstance>),
    /// 多对多去重集合
    Set(ModelSetManager),
}

impl From<DataValue> for AttrValue {
    fn from(value: DataValue) -> Self {
        AttrValue::Value(value)
    }
}

impl From<ModelInstance> for AttrValue {
    fn from(value: ModelInstance) -> Self {
        AttrValue::Instance(value)
    }
}

impl From<Vec<ModelInstance>> for AttrValue {
    fn from(value: Vec<ModelInstance>) -> Self {
        AttrValue::Instances(value)
    }
}

impl From<ModelSetManager> for AttrValue {
    fn from(value: ModelSetManager) -> Self {
        AttrValue::Set(value)
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        AttrValue::Value(DataValue::from(value))
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        AttrValue::Value(DataValue::from(value))
    }
}

impl From<i32> for AttrValue {
    fn from(value: i32) -> Self {
        AttrValue::Value(DataValue::from(value))
    }
}

impl From<i64> for AttrValue {
    fn from(value: i64) -> Self {
        AttrValue::Value(DataValue::from(value))
    }
}

impl From<f64> for AttrValue {
    fn from(value: f64) -> Self {
        AttrValue::Value(DataValue::from(value))
    }
}

impl From<bool> for AttrValue {
    fn from(value: bool) -> Self {
        AttrValue::Value(DataValue::from(value))
    }
}

impl From<Decimal> for AttrValue {
    fn from(value: Decimal) -> Self {
        AttrValue::Value(DataValue::from(value))
    }
}

impl From<NaiveDate> for AttrValue {
    fn from(value: NaiveDate) -> Self {
        AttrValue::Value(DataValue::from(value))
    }
}

impl From<NaiveTime> for AttrValue {
    fn from(value: NaiveTime) -> Self {
        AttrValue::Value(DataValue::from(value))
    }
}

impl From<NaiveDateTime> for AttrValue {
    fn from(value: NaiveDateTime) -> Self {
        AttrValue::Value(DataValue::from(value))
    }
}

/// 外部对象上的一个属性
pub enum SourceValue {
    /// 普通属性
    Value(DataValue),
    /// 无参可调用属性
    Callable(Box<dyn Fn() -> anyhow::Result<DataValue>>),
}

/// 可调用属性因参数数量不符无法调用
#[derive(Debug, thiserror::Error)]
#[error("参数数量不匹配: {0}")]
pub struct ArityError(pub String);

/// `fill_from_object` 的数据来源
pub trait AttributeSource {
    /// 按名称取属性，不存在时返回 `None`
    fn attribute(&self, name: &str) -> Option<SourceValue>;
}

impl AttributeSource for HashMap<String, DataValue> {
    fn attribute(&self, name: &str) -> Option<SourceValue> {
        self.get(name).cloned().map(SourceValue::Value)
    }
}

#[derive(Debug, Clone)]
enum RelationValue {
    One(Box<ModelInstance>),
    Many(ModelSetManager),
}

/// 模型实例
#[derive(Clone)]
pub struct ModelInstance {
    schema: Arc<ModelSchema>,
    values: HashMap<String, DataValue>,
    relations: HashMap<String, RelationValue>,
}

impl ModelInstance {
    /// 创建空实例，多对多关系初始化为空集合
    pub fn new(schema: &Arc<ModelSchema>) -> Self {
        let mut relations = HashMap::new();
        for relationship in schema.relationships() {
            if relationship.kind().is_many() {
                if let Ok(target) = relationship.to_model() {
                    relations.insert(
                        relationship.name().to_string(),
                        RelationValue::Many(ModelSetManager::new(&target)),
                    );
                }
            }
        }
        Self {
            schema: Arc::clone(schema),
            values: HashMap::new(),
            relations,
        }
    }

    /// 按关键字创建实例，未知关键字返回属性错误
    pub fn with_values<I, K>(schema: &Arc<ModelSchema>, values: I) -> QuickModelResult<Self>
    where
        I: IntoIterator<Item = (K, AttrValue)>,
        K: AsRef<str>,
    {
        let mut instance = Self::new(schema);
        instance.update(values)?;
        Ok(instance)
    }

    /// 依次写入多个属性
    ///
    /// 出错时立即返回，已经写入的属性保持不变
    pub fn update<I, K>(&mut self, values: I) -> QuickModelResult<()>
    where
        I: IntoIterator<Item = (K, AttrValue)>,
        K: AsRef<str>,
    {
        for (name, value) in values {
            let name = name.as_ref();
            if let AttrValue::Instances(items) = &value {
                let is_many = self
                    .schema
                    .relationship(name)
                    .map(|r| r.kind().is_many())
                    .unwrap_or(false);
                if is_many && items.is_empty() {
                    continue;
                }
            }
            self.set(name, value)?;
        }
        Ok(())
    }

    pub fn schema(&self) -> &Arc<ModelSchema> {
        &self.schema
    }

    fn attribute_error(&self, name: &str) -> QuickModelError {
        crate::quick_error!(
            attribute,
            self.schema.name(),
            name
        )
    }

    /// 写入字段或关系
    pub fn set(&mut self, name: &str, value: impl Into<AttrValue>) -> QuickModelResult<()> {
        let value = value.into();
        if self.schema.field(name).is_some() {
            match value {
                AttrValue::Value(v) => self.set_field(name, v),
                other => Err(crate::quick_error!(
                    type_error,
                    format!("字段 {}.{} 只接受标量取值，收到 {:?}", self.schema.name(), name, other)
                )),
            }
        } else if self.schema.relationship(name).is_some() {
            self.set_relation(name, value)
        } else {
            Err(self.attribute_error(name))
        }
    }

    /// 写入字段：校验 → 类型转换 → 存储
    ///
    /// 模型策略为 `ValidateNone` 时跳过校验，类型转换仍然执行
    pub fn set_field(&mut self, name: &str, value: impl Into<DataValue>) -> QuickModelResult<()> {
        let value = value.into();
        let field = self
            .schema
            .field(name)
            .ok_or_else(|| self.attribute_error(name))?;

        if self.schema.meta().validates() {
            field.validate(&value)?;
        }
        let converted = field.convert_type(&value)?;
        crate::debug_log!("写入字段 {}.{}: {:?}", self.schema.name(), name, converted);
        self.values.insert(name.to_string(), converted);
        Ok(())
    }

    /// 写入关系
    pub fn set_relation(&mut self, name: &str, value: impl Into<AttrValue>) -> QuickModelResult<()> {
        let value = value.into();
        let relationship = self
            .schema
            .relationship(name)
            .ok_or_else(|| self.attribute_error(name))?;
        let target = relationship.to_model()?;

        let stored = if relationship.kind().is_many() {
            match value {
                AttrValue::Instances(items) => {
                    let mut manager = ModelSetManager::new(&target);
                    for item in items {
                        manager.add(item)?;
                    }
                    RelationValue::Many(manager)
                }
                AttrValue::Set(manager) if Arc::ptr_eq(manager.schema(), &target) => {
                    RelationValue::Many(manager)
                }
                other => {
                    return Err(crate::quick_error!(
                        type_error,
                        format!("{:?} 不是 {} 列表或去重集合", other, target.name())
                    ));
                }
            }
        } else {
            match value {
                AttrValue::Instance(instance) if Arc::ptr_eq(&instance.schema, &target) => {
                    RelationValue::One(Box::new(instance))
                }
                other => {
                    return Err(crate::quick_error!(
                        type_error,
                        format!("{:?} 不是 {} 实例", other, target.name())
                    ));
                }
            }
        };

        self.relations.insert(name.to_string(), stored);
        Ok(())
    }

    /// 字段的类型化取值
    pub fn get(&self, name: &str) -> Option<&DataValue> {
        self.values.get(name)
    }

    /// 外键/一对一关系的目标实例
    pub fn get_instance(&self, name: &str) -> Option<&ModelInstance> {
        match self.relations.get(name) {
            Some(RelationValue::One(instance)) => Some(instance),
            _ => None,
        }
    }

    /// 多对多关系的集合
    pub fn get_set(&self, name: &str) -> Option<&ModelSetManager> {
        match self.relations.get(name) {
            Some(RelationValue::Many(manager)) => Some(manager),
            _ => None,
        }
    }

    pub fn get_set_mut(&mut self, name: &str) -> Option<&mut ModelSetManager> {
        match self.relations.get_mut(name) {
            Some(RelationValue::Many(manager)) => Some(manager),
            _ => None,
        }
    }

    /// 所有已写入字段的类型化取值
    pub fn values(&self) -> &HashMap<String, DataValue> {
        &self.values
    }

    /// 所有非 `blank` 字段都已有非空取值
    pub fn is_valid(&self) -> bool {
        self.schema
            .fields()
            .iter()
            .filter(|f| !f.blank)
            .all(|f| self.values.get(f.name()).map(|v| !v.is_null()).unwrap_or(false))
    }

    /// 转换为嵌套字典：`{verbose_name: {field: value, relation: {...}}}`
    ///
    /// 未写入的字段不输出；多对多关系总是输出 `{TargetPlural: [...]}`
    pub fn to_dict(&self) -> QuickModelResult<DataValue> {
        let mut body = HashMap::new();

        for field in self.schema.fields() {
            if let Some(value) = self.values.get(field.name()) {
                body.insert(field.name().to_string(), field.serialize(value)?);
            }
        }

        for relationship in self.schema.relationships() {
            match self.relations.get(relationship.name()) {
                Some(RelationValue::One(instance)) => {
                    body.insert(relationship.name().to_string(), instance.to_dict()?);
                }
                Some(RelationValue::Many(manager)) => {
                    body.insert(relationship.name().to_string(), manager.to_dict()?);
                }
                None if relationship.kind().is_many() => {
                    let target = relationship.to_model()?;
                    body.insert(
                        relationship.name().to_string(),
                        ModelSetManager::new(&target).to_dict()?,
                    );
                }
                None => {}
            }
        }

        Ok(DataValue::single(
            self.schema.meta().verbose_name.clone(),
            DataValue::Object(body),
        ))
    }

    /// 从嵌套字典创建实例
    pub fn from_dict(schema: &Arc<ModelSchema>, data: &DataValue) -> QuickModelResult<Self> {
        let mut instance = Self::new(schema);
        instance.load_dict(data)?;
        Ok(instance)
    }

    /// 把嵌套字典写入当前实例
    ///
    /// 结构错误在写入任何字段之前返回；字段按声明顺序写入，
    /// 某个字段出错时之前写入的字段保持不变
    pub fn load_dict(&mut self, data: &DataValue) -> QuickModelResult<()> {
        let schema = Arc::clone(&self.schema);
        let verbose_name = &schema.meta().verbose_name;

        let map = data
            .as_object()
            .ok_or_else(|| dict_required(schema.name(), data))?;
        let body = map
            .get(verbose_name)
            .and_then(|body| body.as_object())
            .ok_or_else(|| dict_key_missing(schema.name(), verbose_name, data))?;

        for field in schema.fields() {
            if let Some(value) = body.get(field.name()) {
                self.set_field(field.name(), value.clone())?;
            }
        }

        for relationship in schema.relationships() {
            let Some(value) = body.get(relationship.name()) else {
                continue;
            };
            let target = relationship.to_model()?;
            let stored = if relationship.kind().is_many() {
                let manager = match value {
                    DataValue::Array(items) => {
                        let mut manager = ModelSetManager::new(&target);
                        for item in items {
                            manager.add(ModelInstance::from_dict(&target, item)?)?;
                        }
                        manager
                    }
                    DataValue::Object(_) => ModelSetManager::from_dict(&target, value)?,
                    other => {
                        return Err(crate::quick_error!(
                            type_error,
                            format!(
                                "{}.{} 需要 {} 列表或字典，收到 {}",
                                schema.name(),
                                relationship.name(),
                                target.name(),
                                other.type_name()
                            )
                        ));
                    }
                };
                RelationValue::Many(manager)
            } else {
                RelationValue::One(Box::new(ModelInstance::from_dict(&target, value)?))
            };
            self.relations.insert(relationship.name().to_string(), stored);
        }

        Ok(())
    }

    /// 序列化为指定格式
    pub fn serialize(&self, format: &str) -> QuickModelResult<String> {
        serializer_registry().get(format)?.serialize(&self.to_dict()?)
    }

    /// 从指定格式反序列化
    pub fn deserialize(schema: &Arc<ModelSchema>, text: &str, format: &str) -> QuickModelResult<Self> {
        let data = serializer_registry().get(format)?.deserialize(text)?;
        Self::from_dict(schema, &data)
    }

    /// 从外部对象抓取同名属性创建实例
    ///
    /// 可调用属性会被调用，参数数量不符时跳过；取值为空的属性不写入
    pub fn fill_from_object(schema: &Arc<ModelSchema>, source: &dyn AttributeSource) -> QuickModelResult<Self> {
        let mut values = Vec::new();
        for field in schema.fields() {
            let value = match source.attribute(field.name()) {
                None => continue,
                Some(SourceValue::Value(value)) => value,
                Some(SourceValue::Callable(call)) => match call() {
                    Ok(value) => value,
                    Err(e) if e.downcast_ref::<ArityError>().is_some() => continue,
                    Err(e) => return Err(QuickModelError::Other(e)),
                },
            };
            if !value.is_null() {
                values.push((field.name().to_string(), AttrValue::Value(value)));
            }
        }
        Self::with_values(schema, values)
    }

    /// 参与相等比较和哈希的取值：有主键时只取主键字段，否则按声明顺序取全部字段
    fn identity_values(&self) -> Vec<Option<&DataValue>> {
        let lookup = |name: &str| self.values.get(name).filter(|v| !v.is_null());
        if self.schema.has_pk() {
            self.schema.primary_key_fields().map(|f| lookup(f.name())).collect()
        } else {
            self.schema.fields().iter().map(|f| lookup(f.name())).collect()
        }
    }

    /// 与另一个实例比较，不同模型的实例无法比较
    pub fn try_eq(&self, other: &ModelInstance) -> QuickModelResult<bool> {
        if !Arc::ptr_eq(&self.schema, &other.schema) {
            return Err(crate::quick_error!(
                type_error,
                format!(
                    "{} 只能与 {} 实例比较，收到 {}",
                    self.schema.name(),
                    self.schema.name(),
                    other
                )
            ));
        }
        Ok(self.identity_values() == other.identity_values())
    }

    /// 与相等规则一致的内容哈希
    pub fn identity_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.schema.meta().module.hash(&mut hasher);
        self.schema.name().hash(&mut hasher);
        for value in self.identity_values() {
            match value {
                Some(value) => {
                    1u8.hash(&mut hasher);
                    hash_data_value(value, &mut hasher);
                }
                None => 0u8.hash(&mut hasher),
            }
        }
        hasher.finish()
    }
}

fn hash_data_value<H: Hasher>(value: &DataValue, state: &mut H) {
    value.type_name().hash(state);
    match value {
        DataValue::Null => {}
        DataValue::Bool(b) => b.hash(state),
        DataValue::Int(i) => i.hash(state),
        DataValue::Float(f) => {
            let normalized = if *f == 0.0 { 0.0f64 } else { *f };
            normalized.to_bits().hash(state);
        }
        DataValue::Decimal(d) => d.normalize().to_string().hash(state),
        DataValue::String(s) => s.hash(state),
        DataValue::Date(d) => d.hash(state),
        DataValue::Time(t) => t.hash(state),
        DataValue::DateTime(dt) => dt.hash(state),
        DataValue::Array(items) => {
            items.len().hash(state);
            for item in items {
                hash_data_value(item, state);
            }
        }
        DataValue::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            for key in keys {
                key.hash(state);
                if let Some(item) = map.get(key) {
                    hash_data_value(item, state);
                }
            }
        }
    }
}

impl PartialEq for ModelInstance {
    /// 不同模型的实例视为不相等，需要区分时使用 `try_eq`
    fn eq(&self, other: &Self) -> bool {
        self.try_eq(other).unwrap_or(false)
    }
}

impl Hash for ModelInstance {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.identity_hash());
    }
}

/// 参数不是字典
pub(crate) fn dict_required(model: &str, data: &DataValue) -> QuickModelError {
    crate::quick_error!(
        type_error,
        i18n::tf("error.dict_required", &[("model", model), ("value_type", data.type_name())])
    )
}

/// 字典缺少期望的单键
pub(crate) fn dict_key_missing(model: &str, key: &str, data: &DataValue) -> QuickModelError {
    crate::quick_error!(
        type_error,
        i18n::tf(
            "error.dict_key",
            &[("model", model), ("key", key), ("value", data.to_string().as_str())]
        )
    )
}

impl std::fmt::Display for ModelInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let pks: Vec<String> = self
            .schema
            .primary_key_fields()
            .map(|field| match self.values.get(field.name()) {
                Some(value) => format!("{}={}", field.name(), value),
                None => format!("{}=null", field.name()),
            })
            .collect();
        if pks.is_empty() {
            write!(f, "<{} object>", self.schema.name())
        } else {
            write!(f, "<{}({}) object>", self.schema.name(), pks.join(", "))
        }
    }
}

impl std::fmt::Debug for ModelInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct(self.schema.name())
            .field("values", &self.values)
            .field("relations", &self.relations.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// 供错误消息使用的集合描述
pub(crate) fn not_in_collection(schema: &ModelSchema, instance: &ModelInstance) -> QuickModelError {
    crate::quick_error!(
        not_in_collection,
        schema.name(),
        i18n::tf(
            "error.not_in_collection",
            &[("instance", instance.to_string().as_str()), ("model", schema.name())]
        )
    )
}
