//! 模型注册表
//!
//! 同时维护三个索引：(模块, app_label, 类名) 嵌套映射、按模块、按 app_label，
//! 用于按字符串解析关系目标。
//!
//! 支持两阶段构建：`declare` 只登记模型（能立即解析的关系当场解析），
//! `finalize` 在所有模型登记完成后解析剩余的前向引用。`register` 是单个模型的
//! 登记加解析。
//!
//! 注册表持有模型的强引用，按名称解析的关系目标只保留弱引用。

use crate::config::GlobalConfig;
use crate::error::QuickModelResult;
use crate::i18n;
use crate::model::definition::{ModelDefinition, SchemaFile};
use crate::model::meta::{ModelMeta, ValidationPolicy};
use crate::model::relationship::{ModelRef, RelationKind, RelationTarget, Relationship};
use crate::model::schema::ModelSchema;
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use rat_logger::{debug, info};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// 注册表查询条件
#[derive(Debug, Clone, Copy)]
pub enum RegistryQuery<'a> {
    /// 所有模块中同名的类
    ByClass(&'a str),
    /// 指定模块中的类
    ByModule(&'a str),
    /// 指定 app_label 中的类
    ByAppLabel(&'a str),
}

#[derive(Default)]
struct RegistryInner {
    by_key: HashMap<String, HashMap<String, HashMap<String, Arc<ModelSchema>>>>,
    by_module: HashMap<String, Vec<Arc<ModelSchema>>>,
    by_app_label: HashMap<String, Vec<Arc<ModelSchema>>>,
    order: Vec<Arc<ModelSchema>>,
}

impl RegistryInner {
    fn insert(&mut self, schema: Arc<ModelSchema>) {
        let meta = schema.meta();
        let same = |s: &Arc<ModelSchema>| s.meta().module == meta.module && s.name() == meta.class_name;

        if self.order.iter().any(|s| same(s)) {
            debug!("模型已存在，将替换: {}", schema);
            self.order.retain(|s| !same(s));
            for models in self.by_module.values_mut() {
                models.retain(|s| !same(s));
            }
            for models in self.by_app_label.values_mut() {
                models.retain(|s| !same(s));
            }
        }

        self.by_key
            .entry(meta.module.clone())
            .or_default()
            .entry(meta.app_label.clone())
            .or_default()
            .insert(meta.class_name.clone(), Arc::clone(&schema));
        self.by_module
            .entry(meta.module.clone())
            .or_default()
            .push(Arc::clone(&schema));
        self.by_app_label
            .entry(meta.app_label.clone())
            .or_default()
            .push(Arc::clone(&schema));
        self.order.push(schema);
    }
}

/// 构建过程中的关系目标
enum Seed {
    Resolved(Arc<ModelSchema>),
    SelfRef,
    Lazy(ModelRef),
}

/// 模型注册表
pub struct ModelRegistry {
    inner: RwLock<RegistryInner>,
    default_policy: ValidationPolicy,
}

impl Default for ModelRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ModelRegistry {
    /// 创建空注册表，默认校验策略为 `ValidateAll`
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(RegistryInner::default()),
            default_policy: ValidationPolicy::ValidateAll,
        }
    }

    /// 按全局配置创建注册表
    pub fn with_config(config: &GlobalConfig) -> Self {
        Self {
            inner: RwLock::new(RegistryInner::default()),
            default_policy: config.default_validation_policy,
        }
    }

    pub fn default_policy(&self) -> ValidationPolicy {
        self.default_policy
    }

    /// 登记并解析单个模型
    ///
    /// 关系目标无法解析或没有主键时返回错误，模型不会被登记
    pub fn register(&self, definition: ModelDefinition) -> QuickModelResult<Arc<ModelSchema>> {
        let schema = self.build_schema(definition, false)?;
        self.resolve_schema(&schema)?;
        self.inner.write().insert(Arc::clone(&schema));
        info!("注册模型: {}", schema);
        Ok(schema)
    }

    /// 只登记模型，前向引用留待 `finalize` 解析
    pub fn declare(&self, definition: ModelDefinition) -> QuickModelResult<Arc<ModelSchema>> {
        let schema = self.build_schema(definition, true)?;
        self.inner.write().insert(Arc::clone(&schema));
        info!("登记模型: {}", schema);
        Ok(schema)
    }

    /// 解析所有已登记模型中尚未解析的关系
    pub fn finalize(&self) -> QuickModelResult<()> {
        let models = self.inner.read().order.clone();
        for schema in &models {
            self.resolve_schema(schema)?;
        }
        debug!("注册表解析完成: 模型数量={}", models.len());
        Ok(())
    }

    /// 从声明文件登记全部模型并解析
    pub fn load_schema_file<P: AsRef<std::path::Path>>(&self, path: P) -> QuickModelResult<Vec<Arc<ModelSchema>>> {
        let file = SchemaFile::from_file(path.as_ref())?;
        let schemas = file
            .definitions()?
            .into_iter()
            .map(|definition| self.declare(definition))
            .collect::<QuickModelResult<Vec<_>>>()?;
        self.finalize()?;
        info!("从声明文件加载模型: {:?}, 数量={}", path.as_ref(), schemas.len());
        Ok(schemas)
    }

    /// 按 app_label 和类名查找模型
    ///
    /// app_label 未登记时返回解析错误；app_label 存在但类不存在时返回 `None`
    pub fn get_model(&self, app_label: &str, class_name: &str) -> QuickModelResult<Option<Arc<ModelSchema>>> {
        let inner = self.inner.read();
        let models = inner.by_app_label.get(app_label).filter(|m| !m.is_empty()).ok_or_else(|| {
            crate::quick_error!(
                resolution,
                app_label,
                format!("app_label {} 不在注册表中，是否忘记导入？", app_label)
            )
        })?;
        Ok(models.iter().rev().find(|s| s.name() == class_name).cloned())
    }

    /// 按条件列出模型，保持登记顺序
    pub fn get_all(&self, query: RegistryQuery<'_>) -> Vec<Arc<ModelSchema>> {
        let inner = self.inner.read();
        match query {
            RegistryQuery::ByClass(class_name) => inner
                .order
                .iter()
                .filter(|s| s.name() == class_name)
                .cloned()
                .collect(),
            RegistryQuery::ByModule(module) => inner.by_module.get(module).cloned().unwrap_or_default(),
            RegistryQuery::ByAppLabel(app_label) => {
                inner.by_app_label.get(app_label).cloned().unwrap_or_default()
            }
        }
    }

    /// 所有模型，按登记顺序
    pub fn models(&self) -> Vec<Arc<ModelSchema>> {
        self.inner.read().order.clone()
    }

    pub fn len(&self) -> usize {
        self.inner.read().order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().order.is_empty()
    }

    fn lookup_by_name(&self, class_name: &str) -> Option<Arc<ModelSchema>> {
        self.inner
            .read()
            .order
            .iter()
            .rev()
            .find(|s| s.name() == class_name)
            .cloned()
    }

    fn lookup_in_module(&self, module: &str, class_name: &str) -> Option<Arc<ModelSchema>> {
        self.inner
            .read()
            .by_key
            .get(module)
            .and_then(|apps| apps.values().find_map(|classes| classes.get(class_name)))
            .cloned()
    }

    /// 按声明形式查找目标：裸类名取最后登记的同名模型，点分形式限定 app_label 或模块
    fn lookup(&self, reference: &ModelRef) -> QuickModelResult<Option<Arc<ModelSchema>>> {
        match reference {
            ModelRef::Model(schema) => Ok(Some(Arc::clone(schema))),
            ModelRef::Name(class_name) => Ok(self.lookup_by_name(class_name)),
            ModelRef::AppLabel { app_label, class_name } => self.get_model(app_label, class_name),
            ModelRef::Module { module, class_name } => Ok(self.lookup_in_module(module, class_name)),
            ModelRef::SelfRef => Ok(None),
        }
    }

    fn resolution_error(reference: &ModelRef) -> crate::error::QuickModelError {
        crate::quick_error!(
            resolution,
            reference,
            i18n::tf("error.resolution", &[("model", reference.to_string().as_str())])
        )
    }

    fn check_has_pk(from: &str, target: &ModelSchema) -> QuickModelResult<()> {
        if target.has_pk() {
            return Ok(());
        }
        Err(crate::quick_error!(
            relationship,
            from,
            i18n::tf(
                "error.relationship_pk",
                &[("from_model", from), ("to_model", target.name())]
            )
        ))
    }

    /// 计算声明期能确定的关系目标
    ///
    /// `defer` 为真时（两阶段构建）点分形式的目标找不到也先留待解析
    fn seed(
        &self,
        definition: &ModelDefinition,
        app_label: &str,
        reference: &ModelRef,
        defer: bool,
    ) -> QuickModelResult<Seed> {
        let is_own = |module_or_label: Option<&str>, class_name: &str| {
            class_name == definition.class_name
                && module_or_label.map(|m| m == definition.module || m == app_label).unwrap_or(true)
        };

        match reference {
            ModelRef::Model(schema) => Ok(Seed::Resolved(Arc::clone(schema))),
            ModelRef::SelfRef => Ok(Seed::SelfRef),
            ModelRef::Name(class_name) => {
                if is_own(None, class_name) {
                    return Ok(Seed::SelfRef);
                }
                Ok(match self.lookup_by_name(class_name) {
                    Some(schema) => Seed::Resolved(schema),
                    None => Seed::Lazy(reference.clone()),
                })
            }
            ModelRef::AppLabel { app_label: label, class_name } => {
                if is_own(Some(label), class_name) && label == app_label {
                    return Ok(Seed::SelfRef);
                }
                let found = match self.get_model(label, class_name) {
                    Ok(found) => found,
                    Err(_) if defer => None,
                    Err(e) => return Err(e),
                };
                match found {
                    Some(schema) => Ok(Seed::Resolved(schema)),
                    None if defer => Ok(Seed::Lazy(reference.clone())),
                    None => Err(Self::resolution_error(reference)),
                }
            }
            ModelRef::Module { module, class_name } => {
                if is_own(Some(module), class_name) && module == &definition.module {
                    return Ok(Seed::SelfRef);
                }
                match self.lookup_in_module(module, class_name) {
                    Some(schema) => Ok(Seed::Resolved(schema)),
                    None if defer => Ok(Seed::Lazy(reference.clone())),
                    None => Err(Self::resolution_error(reference)),
                }
            }
        }
    }

    fn build_schema(&self, definition: ModelDefinition, defer: bool) -> QuickModelResult<Arc<ModelSchema>> {
        {
            let mut names = HashSet::new();
            for name in definition
                .fields
                .iter()
                .map(|(n, _)| n)
                .chain(definition.relationships.iter().map(|(n, _)| n))
            {
                if !names.insert(name.as_str()) {
                    return Err(crate::quick_error!(
                        type_error,
                        format!("模型 {} 的属性名重复: {}", definition.class_name, name)
                    ));
                }
            }
        }

        let has_pk = definition.fields.iter().any(|(_, f)| f.primary_key);
        let meta = ModelMeta::build(
            &definition.class_name,
            &definition.module,
            &definition.options,
            self.default_policy,
            has_pk,
        );

        let mut seeds: Vec<(String, RelationKind, ModelRef, Seed)> = Vec::new();
        for (name, relationship) in &definition.relationships {
            let seed = self.seed(&definition, &meta.app_label, &relationship.target, defer)?;
            match &seed {
                Seed::Resolved(target) => Self::check_has_pk(&definition.class_name, target)?,
                Seed::SelfRef if !has_pk => {
                    return Err(crate::quick_error!(
                        relationship,
                        &definition.class_name,
                        i18n::tf(
                            "error.relationship_pk",
                            &[
                                ("from_model", definition.class_name.as_str()),
                                ("to_model", definition.class_name.as_str()),
                            ]
                        )
                    ));
                }
                _ => {}
            }
            seeds.push((name.clone(), relationship.kind, relationship.target.clone(), seed));
        }

        let fields = definition
            .fields
            .into_iter()
            .map(|(name, mut field)| {
                field.stamp_name(&name);
                field
            })
            .collect::<Vec<_>>();

        let schema = Arc::new_cyclic(|weak| {
            let relationships = seeds
                .into_iter()
                .map(|(name, kind, declared, seed)| {
                    let target = match seed {
                        Seed::Resolved(schema) => RelationTarget::Resolved(Arc::downgrade(&schema)),
                        Seed::SelfRef => RelationTarget::SelfReferenced(weak.clone()),
                        Seed::Lazy(reference) => RelationTarget::Unresolved(reference),
                    };
                    Relationship::new(&name, kind, declared, target, weak.clone())
                })
                .collect();
            ModelSchema::new(meta, fields, relationships)
        });

        debug!(
            "构建模型结构: {}, 字段数量={}, 关系数量={}",
            schema,
            schema.fields().len(),
            schema.relationships().len()
        );
        Ok(schema)
    }

    /// 解析模型上仍待解析的关系
    fn resolve_schema(&self, schema: &Arc<ModelSchema>) -> QuickModelResult<()> {
        for relationship in schema.relationships() {
            let RelationTarget::Unresolved(reference) = relationship.target() else {
                continue;
            };
            let target = self
                .lookup(&reference)?
                .ok_or_else(|| Self::resolution_error(&reference))?;
            Self::check_has_pk(schema.name(), &target)?;

            if Arc::ptr_eq(&target, schema) {
                relationship.bind(RelationTarget::SelfReferenced(Arc::downgrade(schema)));
            } else {
                relationship.bind(RelationTarget::Resolved(Arc::downgrade(&target)));
            }
            debug!("解析关系: {}.{} -> {}", schema.name(), relationship.name(), reference);
        }
        Ok(())
    }
}

static GLOBAL_REGISTRY: Lazy<ModelRegistry> = Lazy::new(ModelRegistry::new);

/// 进程级注册表
pub fn global_registry() -> &'static ModelRegistry {
    &GLOBAL_REGISTRY
}

/// 便捷函数 - 在进程级注册表中登记并解析模型
pub fn register_model(definition: ModelDefinition) -> QuickModelResult<Arc<ModelSchema>> {
    global_registry().register(definition)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::convenience::*;

    fn house() -> ModelDefinition {
        ModelDefinition::new("House", "city.models").field("address", char_field(100).primary_key())
    }

    #[test]
    fn test_register_and_lookup() {
        let registry = ModelRegistry::new();
        let schema = registry.register(house()).unwrap();
        assert_eq!(schema.meta().app_label, "models");

        let found = registry.get_model("models", "House").unwrap().unwrap();
        assert!(Arc::ptr_eq(&found, &schema));
        assert!(registry.get_model("models", "Castle").unwrap().is_none());
        assert!(registry.get_model("nowhere", "House").unwrap_err().is_resolution_error());
    }

    #[test]
    fn test_get_all_by_class_across_modules() {
        let registry = ModelRegistry::new();
        registry.register(house()).unwrap();
        registry
            .register(ModelDefinition::new("House", "farm.buildings").field("code", integer_field().primary_key()))
            .unwrap();
        registry
            .register(ModelDefinition::new("Barn", "farm.buildings").field("code", integer_field()))
            .unwrap();

        let houses = registry.get_all(RegistryQuery::ByClass("House"));
        assert_eq!(houses.len(), 2);
        assert_eq!(houses[0].meta().module, "city.models");
        assert_eq!(houses[1].meta().module, "farm.buildings");
        assert_eq!(registry.get_all(RegistryQuery::ByModule("farm.buildings")).len(), 2);
        assert_eq!(registry.get_all(RegistryQuery::ByAppLabel("buildings")).len(), 2);
        assert!(registry.get_all(RegistryQuery::ByAppLabel("nothing")).is_empty());
    }

    #[test]
    fn test_reregistration_replaces() {
        let registry = ModelRegistry::new();
        let first = registry.register(house()).unwrap();
        let second = registry.register(house()).unwrap();
        assert_eq!(registry.len(), 1);
        assert!(!Arc::ptr_eq(&first, &second));
        let found = registry.get_model("models", "House").unwrap().unwrap();
        assert!(Arc::ptr_eq(&found, &second));
    }

    #[test]
    fn test_forward_dotted_references_wait_for_finalize() {
        let registry = ModelRegistry::new();
        let person = registry
            .declare(
                ModelDefinition::new("Person", "people.models")
                    .field("name", char_field(40).primary_key())
                    .foreign_key("live_in", "models.House")
                    .one_to_one("office", "work.models.Office"),
            )
            .unwrap();
        assert!(person.relationship("live_in").unwrap().is_lazy());
        assert!(person.relationship("office").unwrap().is_lazy());

        let house = registry.declare(house()).unwrap();
        let office = registry
            .declare(ModelDefinition::new("Office", "work.models").field("code", integer_field().primary_key()))
            .unwrap();
        registry.finalize().unwrap();

        let live_in = person.relationship("live_in").unwrap().to_model().unwrap();
        assert!(Arc::ptr_eq(&live_in, &house));
        let target = person.relationship("office").unwrap().to_model().unwrap();
        assert!(Arc::ptr_eq(&target, &office));
    }

    #[test]
    fn test_dotted_reference_keeps_its_qualifier() {
        let registry = ModelRegistry::new();
        let person = registry
            .declare(
                ModelDefinition::new("Person", "people.models")
                    .field("name", char_field(40).primary_key())
                    .foreign_key("home", "city.models.House"),
            )
            .unwrap();
        let city_house = registry.declare(house()).unwrap();
        // 裸类名会取到这个后登记的同名模型
        registry
            .declare(ModelDefinition::new("House", "farm.barns").field("code", integer_field().primary_key()))
            .unwrap();
        registry.finalize().unwrap();
        let home = person.relationship("home").unwrap().to_model().unwrap();
        assert!(Arc::ptr_eq(&home, &city_house));
    }

    #[test]
    fn test_finalize_reports_missing_dotted_target() {
        let registry = ModelRegistry::new();
        registry
            .declare(
                ModelDefinition::new("Person", "people.models")
                    .field("name", char_field(40).primary_key())
                    .foreign_key("live_in", "nowhere.House"),
            )
            .unwrap();
        assert!(registry.finalize().unwrap_err().is_resolution_error());
    }

    #[test]
    fn test_mutual_relationships_are_released() {
        let registry = ModelRegistry::new();
        let person = registry
            .declare(
                ModelDefinition::new("Person", "people.models")
                    .field("name", char_field(40).primary_key())
                    .foreign_key("live_in", "House"),
            )
            .unwrap();
        let house = registry
            .declare(house().foreign_key("owner", "Person"))
            .unwrap();
        registry.finalize().unwrap();

        let weak_person = Arc::downgrade(&person);
        let weak_house = Arc::downgrade(&house);
        drop(person);
        drop(house);
        drop(registry);
        assert!(weak_person.upgrade().is_none());
        assert!(weak_house.upgrade().is_none());
    }

    #[test]
    fn test_duplicate_attribute_name() {
        let registry = ModelRegistry::new();
        let err = registry
            .register(house().foreign_key("address", "House"))
            .unwrap_err();
        assert!(err.is_type_error());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_two_phase_resolution() {
        let registry = ModelRegistry::new();
        let person = registry
            .declare(
                ModelDefinition::new("Person", "people.models")
                    .field("name", char_field(40).primary_key())
                    .foreign_key("live_in", "House"),
            )
            .unwrap();
        assert!(person.relationship("live_in").unwrap().is_lazy());
        assert!(person.relationship("live_in").unwrap().to_model().unwrap_err().is_resolution_error());

        let house = registry.declare(house()).unwrap();
        registry.finalize().unwrap();

        let relationship = person.relationship("live_in").unwrap();
        assert!(!relationship.is_lazy());
        assert!(Arc::ptr_eq(&relationship.to_model().unwrap(), &house));
    }

    #[test]
    fn test_register_fails_on_unknown_target() {
        let registry = ModelRegistry::new();
        let err = registry
            .register(
                ModelDefinition::new("Person", "people.models")
                    .field("name", char_field(40))
                    .foreign_key("live_in", "Nowhere"),
            )
            .unwrap_err();
        assert!(err.is_resolution_error());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_finalize_reports_missing_target() {
        let registry = ModelRegistry::new();
        registry
            .declare(
                ModelDefinition::new("Person", "people.models")
                    .field("name", char_field(40))
                    .many_to_many("friends", "Ghost"),
            )
            .unwrap();
        assert!(registry.finalize().unwrap_err().is_resolution_error());
    }

    #[test]
    fn test_target_without_primary_key() {
        let registry = ModelRegistry::new();
        registry
            .register(ModelDefinition::new("Shed", "farm.buildings").field("code", integer_field()))
            .unwrap();
        let err = registry
            .register(
                ModelDefinition::new("Farmer", "farm.people")
                    .field("name", char_field(40).primary_key())
                    .foreign_key("shed", "Shed"),
            )
            .unwrap_err();
        assert!(matches!(err, crate::error::QuickModelError::RelationshipConfigError { .. }));

        let err = registry
            .register(
                ModelDefinition::new("Loner", "farm.people")
                    .field("name", char_field(40))
                    .foreign_key("me", "self"),
            )
            .unwrap_err();
        assert!(matches!(err, crate::error::QuickModelError::RelationshipConfigError { .. }));
    }

    #[test]
    fn test_default_policy_from_config() {
        let mut config = GlobalConfig::default_settings();
        config.default_validation_policy = ValidationPolicy::ValidateNone;
        let registry = ModelRegistry::with_config(&config);
        let schema = registry.register(house()).unwrap();
        assert!(!schema.meta().validates());

        let strict = registry
            .register(
                ModelDefinition::new("Tower", "city.models")
                    .validation_policy(ValidationPolicy::ValidateAll)
                    .field("name", char_field(3)),
            )
            .unwrap();
        assert!(strict.meta().validates());
    }
}
