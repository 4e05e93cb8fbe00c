//! 错误类型定义模块
//!
//! 错误分为几个层次：
//! - 结构/前置条件错误（`TypeError`）：调用方传入了错误种类的值
//! - 内容校验错误（`ValidationError`）：值的种类正确，但内容不满足字段约束
//! - 关系解析错误（`ResolutionError`）：目标模型不在注册表中，通常是加载顺序问题
//! - 静态配置错误（`RelationshipConfigError`）：在声明期发现的模型配置问题

use thiserror::Error;

/// rat_quickmodel 统一错误类型
#[derive(Error, Debug)]
pub enum QuickModelError {
    /// 结构或前置条件错误
    #[error("类型错误: {message}")]
    TypeError { message: String },

    /// 字段内容校验失败
    #[error("字段验证失败: {field} - {message}")]
    ValidationError { field: String, message: String },

    /// 关系目标模型无法解析
    #[error("模型解析失败: {model} - {message}")]
    ResolutionError { model: String, message: String },

    /// 关系声明不合法（例如目标模型没有主键）
    #[error("关系配置错误: {model} - {message}")]
    RelationshipConfigError { model: String, message: String },

    /// 模型上不存在的属性
    #[error("{model} 没有属性 {attribute}")]
    AttributeError { model: String, attribute: String },

    /// 集合中不存在目标实例
    #[error("集合操作失败: {model} - {message}")]
    NotInCollection { model: String, message: String },

    /// 未注册的序列化格式
    #[error("序列化格式未实现: {format}")]
    FormatNotImplemented { format: String },

    /// 序列化/反序列化失败
    #[error("数据序列化失败: {message}")]
    SerializationError { message: String },

    /// 配置错误
    #[error("配置错误: {message}")]
    ConfigError { message: String },

    /// IO 错误
    #[error("IO错误: {0}")]
    IoError(#[from] std::io::Error),

    /// 外部对象抛出的其他错误
    #[error("其他错误: {0}")]
    Other(#[from] anyhow::Error),
}

/// rat_quickmodel 结果类型
pub type QuickModelResult<T> = Result<T, QuickModelError>;

impl QuickModelError {
    /// 是否为结构/前置条件错误（"修正你的代码"）
    pub fn is_type_error(&self) -> bool {
        matches!(self, QuickModelError::TypeError { .. } | QuickModelError::AttributeError { .. })
    }

    /// 是否为内容校验错误（"修正你的数据"）
    pub fn is_validation_error(&self) -> bool {
        matches!(self, QuickModelError::ValidationError { .. })
    }

    /// 是否为关系解析错误
    pub fn is_resolution_error(&self) -> bool {
        matches!(self, QuickModelError::ResolutionError { .. })
    }
}

impl From<serde_json::Error> for QuickModelError {
    fn from(err: serde_json::Error) -> Self {
        QuickModelError::SerializationError { message: err.to_string() }
    }
}

/// 快速构造错误的宏
///
/// ```ignore
/// quick_error!(type_error, "期望字符串");
/// quick_error!(validation, "first_name", "长度超过限制");
/// quick_error!(resolution, "House", "模型未注册");
/// ```
#[macro_export]
macro_rules! quick_error {
    (type_error, $msg:expr) => {
        $crate::error::QuickModelError::TypeError { message: ($msg).to_string() }
    };
    (validation, $field:expr, $msg:expr) => {
        $crate::error::QuickModelError::ValidationError {
            field: ($field).to_string(),
            message: ($msg).to_string(),
        }
    };
    (resolution, $model:expr, $msg:expr) => {
        $crate::error::QuickModelError::ResolutionError {
            model: ($model).to_string(),
            message: ($msg).to_string(),
        }
    };
    (relationship, $model:expr, $msg:expr) => {
        $crate::error::QuickModelError::RelationshipConfigError {
            model: ($model).to_string(),
            message: ($msg).to_string(),
        }
    };
    (attribute, $model:expr, $attr:expr) => {
        $crate::error::QuickModelError::AttributeError {
            model: ($model).to_string(),
            attribute: ($attr).to_string(),
        }
    };
    (not_in_collection, $model:expr, $msg:expr) => {
        $crate::error::QuickModelError::NotInCollection {
            model: ($model).to_string(),
            message: ($msg).to_string(),
        }
    };
    (format, $format:expr) => {
        $crate::error::QuickModelError::FormatNotImplemented { format: ($format).to_string() }
    };
    (serialization, $msg:expr) => {
        $crate::error::QuickModelError::SerializationError { message: ($msg).to_string() }
    };
    (config, $msg:expr) => {
        $crate::error::QuickModelError::ConfigError { message: ($msg).to_string() }
    };
}
