use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use std::collections::HashMap;

/// 通用数据值类型
///
/// 既是字段在内存中的类型化取值，也是嵌套字典中间形式
/// `{display_name: {field: value, ...}}` 的节点类型。
#[derive(Clone, PartialEq)]
pub enum DataValue {
    /// 空值
    Null,
    /// 布尔值
    Bool(bool),
    /// 整数
    Int(i64),
    /// 浮点数
    Float(f64),
    /// 定点小数
    Decimal(Decimal),
    /// 字符串
    String(String),
    /// 日期
    Date(NaiveDate),
    /// 时间
    Time(NaiveTime),
    /// 日期时间
    DateTime(NaiveDateTime),
    /// 数组
    Array(Vec<DataValue>),
    /// 对象/嵌套字典
    Object(HashMap<String, DataValue>),
}

impl std::fmt::Display for DataValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataValue::Null => write!(f, "null"),
            DataValue::Bool(b) => write!(f, "{}", b),
            DataValue::Int(i) => write!(f, "{}", i),
            DataValue::Float(fl) => write!(f, "{}", fl),
            DataValue::Decimal(d) => write!(f, "{}", d),
            DataValue::String(s) => write!(f, "{}", s),
            DataValue::Date(d) => write!(f, "{}", d),
            DataValue::Time(t) => write!(f, "{}", t),
            DataValue::DateTime(dt) => write!(f, "{}", dt),
            DataValue::Array(_) | DataValue::Object(_) => {
                let json_str = serde_json::to_string(&self.to_json_value()).unwrap_or_default();
                write!(f, "{}", json_str)
            }
        }
    }
}

impl std::fmt::Debug for DataValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Debug 与 Display 保持一致，字符串额外加引号便于区分
        match self {
            DataValue::String(s) => write!(f, "{:?}", s),
            _ => write!(f, "{}", self),
        }
    }
}

impl DataValue {
    /// 获取数据类型名称
    pub fn type_name(&self) -> &'static str {
        match self {
            DataValue::Null => "null",
            DataValue::Bool(_) => "boolean",
            DataValue::Int(_) => "integer",
            DataValue::Float(_) => "float",
            DataValue::Decimal(_) => "decimal",
            DataValue::String(_) => "string",
            DataValue::Date(_) => "date",
            DataValue::Time(_) => "time",
            DataValue::DateTime(_) => "datetime",
            DataValue::Array(_) => "array",
            DataValue::Object(_) => "object",
        }
    }

    /// 判断是否为空值
    pub fn is_null(&self) -> bool {
        matches!(self, DataValue::Null)
    }

    /// 是否为标量（非数组、非对象）
    pub fn is_scalar(&self) -> bool {
        !matches!(self, DataValue::Array(_) | DataValue::Object(_))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            DataValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&HashMap<String, DataValue>> {
        match self {
            DataValue::Object(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[DataValue]> {
        match self {
            DataValue::Array(items) => Some(items),
            _ => None,
        }
    }

    /// 构造单键对象 `{key: value}`
    pub fn single(key: impl Into<String>, value: DataValue) -> Self {
        let mut map = HashMap::with_capacity(1);
        map.insert(key.into(), value);
        DataValue::Object(map)
    }

    /// 若为单键对象，返回该键值对
    pub fn as_single_entry(&self) -> Option<(&str, &DataValue)> {
        match self {
            DataValue::Object(map) if map.len() == 1 => {
                map.iter().next().map(|(k, v)| (k.as_str(), v))
            }
            _ => None,
        }
    }

    /// 转换为 JSON 字符串
    pub fn to_json_string(&self) -> crate::error::QuickModelResult<String> {
        serde_json::to_string(&self.to_json_value()).map_err(|e| {
            crate::quick_error!(serialization, format!("DataValue 转换为 JSON 失败: {}", e))
        })
    }

    /// 从 JSON 字符串解析
    pub fn from_json_string(json: &str) -> crate::error::QuickModelResult<Self> {
        let value: serde_json::Value = serde_json::from_str(json).map_err(|e| {
            crate::quick_error!(serialization, format!("JSON 解析为 DataValue 失败: {}", e))
        })?;
        Ok(json_value_to_data_value(value))
    }

    /// 转换为 JSON 值
    ///
    /// 定点小数与日期时间以字符串表示，与嵌套字典形式中字段序列化后的取值一致
    pub fn to_json_value(&self) -> serde_json::Value {
        match self {
            DataValue::Null => serde_json::Value::Null,
            DataValue::Bool(b) => serde_json::Value::Bool(*b),
            DataValue::Int(i) => serde_json::Value::Number(serde_json::Number::from(*i)),
            DataValue::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            DataValue::Decimal(d) => serde_json::Value::String(d.to_string()),
            DataValue::String(s) => serde_json::Value::String(s.clone()),
            DataValue::Date(d) => serde_json::Value::String(d.format("%Y-%m-%d").to_string()),
            DataValue::Time(t) => serde_json::Value::String(t.format("%H:%M:%S").to_string()),
            DataValue::DateTime(dt) => {
                serde_json::Value::String(dt.format("%Y-%m-%d %H:%M:%S").to_string())
            }
            DataValue::Array(arr) => {
                serde_json::Value::Array(arr.iter().map(|item| item.to_json_value()).collect())
            }
            DataValue::Object(obj) => {
                let json_object: serde_json::Map<String, serde_json::Value> = obj
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json_value()))
                    .collect();
                serde_json::Value::Object(json_object)
            }
        }
    }

    /// 期望Object类型，如果不是则返回类型错误
    pub fn expect_object(self) -> crate::error::QuickModelResult<HashMap<String, DataValue>> {
        match self {
            DataValue::Object(map) => Ok(map),
            other => Err(crate::quick_error!(
                type_error,
                format!("期望Object类型，但收到: {}", other.type_name())
            )),
        }
    }
}

impl From<bool> for DataValue {
    fn from(value: bool) -> Self {
        DataValue::Bool(value)
    }
}

impl From<i32> for DataValue {
    fn from(value: i32) -> Self {
        DataValue::Int(value as i64)
    }
}

impl From<i64> for DataValue {
    fn from(value: i64) -> Self {
        DataValue::Int(value)
    }
}

impl From<f32> for DataValue {
    fn from(value: f32) -> Self {
        DataValue::Float(value as f64)
    }
}

impl From<f64> for DataValue {
    fn from(value: f64) -> Self {
        DataValue::Float(value)
    }
}

impl From<Decimal> for DataValue {
    fn from(value: Decimal) -> Self {
        DataValue::Decimal(value)
    }
}

impl From<String> for DataValue {
    fn from(value: String) -> Self {
        DataValue::String(value)
    }
}

impl From<&str> for DataValue {
    fn from(value: &str) -> Self {
        DataValue::String(value.to_string())
    }
}

impl From<NaiveDate> for DataValue {
    fn from(value: NaiveDate) -> Self {
        DataValue::Date(value)
    }
}

impl From<NaiveTime> for DataValue {
    fn from(value: NaiveTime) -> Self {
        DataValue::Time(value)
    }
}

impl From<NaiveDateTime> for DataValue {
    fn from(value: NaiveDateTime) -> Self {
        DataValue::DateTime(value)
    }
}

impl From<Vec<DataValue>> for DataValue {
    fn from(value: Vec<DataValue>) -> Self {
        DataValue::Array(value)
    }
}

impl From<HashMap<String, DataValue>> for DataValue {
    fn from(value: HashMap<String, DataValue>) -> Self {
        DataValue::Object(value)
    }
}

impl From<serde_json::Value> for DataValue {
    fn from(value: serde_json::Value) -> Self {
        json_value_to_data_value(value)
    }
}

impl<T> From<Option<T>> for DataValue
where
    T: Into<DataValue>,
{
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => v.into(),
            None => DataValue::Null,
        }
    }
}

/// 将 serde_json::Value 转换为对应的 DataValue 类型
pub fn json_value_to_data_value(value: serde_json::Value) -> DataValue {
    match value {
        serde_json::Value::Null => DataValue::Null,
        serde_json::Value::Bool(b) => DataValue::Bool(b),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                DataValue::Int(i)
            } else {
                n.as_f64().map(DataValue::Float).unwrap_or(DataValue::Null)
            }
        }
        serde_json::Value::String(s) => DataValue::String(s),
        serde_json::Value::Array(arr) => {
            DataValue::Array(arr.into_iter().map(json_value_to_data_value).collect())
        }
        serde_json::Value::Object(obj) => DataValue::Object(
            obj.into_iter()
                .map(|(k, v)| (k, json_value_to_data_value(v)))
                .collect(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_conversion_keeps_nesting() {
        let json = r#"{"Person": {"name": "John", "age": 30, "tags": ["a", "b"]}}"#;
        let value = DataValue::from_json_string(json).unwrap();
        let (key, inner) = value.as_single_entry().unwrap();
        assert_eq!(key, "Person");
        let inner = inner.as_object().unwrap();
        assert_eq!(inner.get("name"), Some(&DataValue::from("John")));
        assert_eq!(inner.get("age"), Some(&DataValue::Int(30)));
        assert_eq!(inner.get("tags").and_then(|v| v.as_array()).map(|a| a.len()), Some(2));
    }

    #[test]
    fn test_decimal_and_dates_become_strings() {
        let d: Decimal = "4000.55".parse().unwrap();
        assert_eq!(DataValue::Decimal(d).to_json_value(), serde_json::json!("4000.55"));

        let date = NaiveDate::from_ymd_opt(2009, 11, 24).unwrap();
        assert_eq!(DataValue::Date(date).to_json_value(), serde_json::json!("2009-11-24"));
    }

    #[test]
    fn test_expect_object_rejects_scalars() {
        let err = DataValue::Int(1).expect_object().unwrap_err();
        assert!(err.is_type_error());
    }
}
