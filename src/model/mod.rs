//! 模型定义系统模块
//!
//! 通过构建器声明模型：字段类型、校验与类型转换、关系、元数据，
//! 以及实例与集合在嵌套字典形式之间的往返

pub mod convenience;
pub mod definition;
pub mod field_types;
pub mod instance;
pub mod meta;
pub mod relationship;
pub mod schema;
pub mod set;
pub mod url_checker;

pub use convenience::*;
pub use definition::{FieldEntry, ModelDefinition, ModelEntry, RelationshipEntry, SchemaFile};
pub use field_types::{FieldDefinition, FieldType};
pub use instance::{ArityError, AttrValue, AttributeSource, ModelInstance, SourceValue};
pub use meta::{MetaOptions, ModelMeta, ValidationPolicy};
pub use relationship::{
    foreign_key, many_to_many, one_to_one, ModelRef, RelationKind, RelationTarget, Relationship,
    RelationshipDefinition,
};
pub use schema::ModelSchema;
pub use set::{ModelSet, ModelSetManager};
pub use url_checker::{HttpUrlChecker, UrlChecker};
