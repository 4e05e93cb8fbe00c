//! 模型关系
//!
//! 关系目标可以是模型本身、裸类名、`app_label.ClassName`、完整模块路径加类名或字面量 `self`。
//! 目标状态用 `RelationTarget` 表示：未解析 → 已解析 / 自引用。
//!
//! 已解析的目标只持有弱引用，模型由注册表持有；直接以模型声明的目标
//! 通过 `ModelRef::Model` 持有强引用，这类目标总是先于当前模型存在，不会成环。

use crate::error::QuickModelResult;
use crate::i18n;
use crate::model::schema::ModelSchema;
use parking_lot::RwLock;
use std::sync::{Arc, Weak};

/// 关系种类
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationKind {
    /// 外键（一对一/一对多）
    ForeignKey,
    /// 一对一
    OneToOne,
    /// 多对多
    ManyToMany,
}

impl RelationKind {
    pub fn is_many(&self) -> bool {
        matches!(self, RelationKind::ManyToMany)
    }
}

/// 关系目标的声明方式
#[derive(Clone)]
pub enum ModelRef {
    /// 已存在的模型
    Model(Arc<ModelSchema>),
    /// 裸类名
    Name(String),
    /// `app_label.ClassName`
    AppLabel { app_label: String, class_name: String },
    /// `full.module.path.ClassName`
    Module { module: String, class_name: String },
    /// 字面量 `self`
    SelfRef,
}

impl ModelRef {
    /// 解析字符串形式的目标
    pub fn parse(reference: &str) -> Self {
        if reference == "self" {
            return ModelRef::SelfRef;
        }
        let parts: Vec<&str> = reference.split('.').collect();
        match parts.len() {
            1 => ModelRef::Name(reference.to_string()),
            2 => ModelRef::AppLabel {
                app_label: parts[0].to_string(),
                class_name: parts[1].to_string(),
            },
            n => ModelRef::Module {
                module: parts[..n - 1].join("."),
                class_name: parts[n - 1].to_string(),
            },
        }
    }

    /// 目标类名
    pub fn class_name(&self) -> Option<&str> {
        match self {
            ModelRef::Model(schema) => Some(schema.name()),
            ModelRef::Name(name) => Some(name),
            ModelRef::AppLabel { class_name, .. } | ModelRef::Module { class_name, .. } => Some(class_name),
            ModelRef::SelfRef => None,
        }
    }
}

impl std::fmt::Display for ModelRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelRef::Model(schema) => write!(f, "{}.{}", schema.meta().module, schema.name()),
            ModelRef::Name(name) => write!(f, "{}", name),
            ModelRef::AppLabel { app_label, class_name } => write!(f, "{}.{}", app_label, class_name),
            ModelRef::Module { module, class_name } => write!(f, "{}.{}", module, class_name),
            ModelRef::SelfRef => write!(f, "self"),
        }
    }
}

impl std::fmt::Debug for ModelRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ModelRef({})", self)
    }
}

impl From<&str> for ModelRef {
    fn from(value: &str) -> Self {
        ModelRef::parse(value)
    }
}

impl From<String> for ModelRef {
    fn from(value: String) -> Self {
        ModelRef::parse(&value)
    }
}

impl From<Arc<ModelSchema>> for ModelRef {
    fn from(value: Arc<ModelSchema>) -> Self {
        ModelRef::Model(value)
    }
}

impl From<&Arc<ModelSchema>> for ModelRef {
    fn from(value: &Arc<ModelSchema>) -> Self {
        ModelRef::Model(Arc::clone(value))
    }
}

/// 关系目标的解析状态
#[derive(Clone)]
pub enum RelationTarget {
    /// 等待注册表补齐后解析
    Unresolved(ModelRef),
    /// 已解析到其他模型
    Resolved(Weak<ModelSchema>),
    /// 指向所属模型自身
    SelfReferenced(Weak<ModelSchema>),
}

/// 关系声明，可作为 `ModelDefinition` 的输入
#[derive(Debug, Clone)]
pub struct RelationshipDefinition {
    pub kind: RelationKind,
    pub target: ModelRef,
}

/// 外键
pub fn foreign_key(target: impl Into<ModelRef>) -> RelationshipDefinition {
    RelationshipDefinition { kind: RelationKind::ForeignKey, target: target.into() }
}

/// 一对一
pub fn one_to_one(target: impl Into<ModelRef>) -> RelationshipDefinition {
    RelationshipDefinition { kind: RelationKind::OneToOne, target: target.into() }
}

/// 多对多
pub fn many_to_many(target: impl Into<ModelRef>) -> RelationshipDefinition {
    RelationshipDefinition { kind: RelationKind::ManyToMany, target: target.into() }
}

/// 模型上的关系
pub struct Relationship {
    name: String,
    kind: RelationKind,
    declared: ModelRef,
    target: RwLock<RelationTarget>,
    from_model: Weak<ModelSchema>,
}

impl Relationship {
    pub(crate) fn new(
        name: &str,
        kind: RelationKind,
        declared: ModelRef,
        target: RelationTarget,
        from_model: Weak<ModelSchema>,
    ) -> Self {
        Self {
            name: name.to_string(),
            kind,
            declared,
            target: RwLock::new(target),
            from_model,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> RelationKind {
        self.kind
    }

    /// 声明时给出的目标
    pub fn declared(&self) -> &ModelRef {
        &self.declared
    }

    /// 目标是否仍待解析
    pub fn is_lazy(&self) -> bool {
        matches!(*self.target.read(), RelationTarget::Unresolved(_))
    }

    /// 是否指向所属模型自身
    pub fn is_self_referenced(&self) -> bool {
        matches!(*self.target.read(), RelationTarget::SelfReferenced(_))
    }

    /// 所属模型
    pub fn from_model(&self) -> Option<Arc<ModelSchema>> {
        self.from_model.upgrade()
    }

    /// 当前解析状态的快照
    pub fn target(&self) -> RelationTarget {
        self.target.read().clone()
    }

    /// 目标模型，未解析时返回解析错误
    pub fn to_model(&self) -> QuickModelResult<Arc<ModelSchema>> {
        match &*self.target.read() {
            RelationTarget::Resolved(weak) => weak.upgrade().ok_or_else(|| {
                crate::quick_error!(resolution, &self.declared, "目标模型已被释放")
            }),
            RelationTarget::SelfReferenced(weak) => weak.upgrade().ok_or_else(|| {
                crate::quick_error!(resolution, &self.declared, "所属模型已被释放")
            }),
            RelationTarget::Unresolved(reference) => Err(crate::quick_error!(
                resolution,
                reference,
                i18n::tf("error.resolution", &[("model", reference.to_string().as_str())])
            )),
        }
    }

    pub(crate) fn bind(&self, target: RelationTarget) {
        *self.target.write() = target;
    }
}

impl std::fmt::Debug for Relationship {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = match &*self.target.read() {
            RelationTarget::Unresolved(reference) => format!("unresolved({})", reference),
            RelationTarget::Resolved(weak) => match weak.upgrade() {
                Some(schema) => format!("resolved({})", schema.name()),
                None => "released".to_string(),
            },
            RelationTarget::SelfReferenced(_) => "self".to_string(),
        };
        f.debug_struct("Relationship")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("target", &state)
            .finish()
    }
}
