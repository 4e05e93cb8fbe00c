//! 通用数据类型定义
//!
//! 定义字段取值与嵌套字典中间形式共用的数据类型

pub mod data_value;

pub use data_value::{json_value_to_data_value, DataValue};
