//! 模型便捷函数模块
//!
//! 提供创建各种字段类型的便捷函数，以及按名称和参数表动态创建字段

use crate::error::QuickModelResult;
use crate::i18n;
use crate::model::field_types::{
    FieldDefinition, FieldType, DEFAULT_DATETIME_FORMAT, DEFAULT_DATE_FORMAT,
    DEFAULT_EMAIL_MAX_LENGTH, DEFAULT_TIME_FORMAT, DEFAULT_URL_MAX_LENGTH,
};
use crate::types::{json_value_to_data_value, DataValue};

/// 便捷函数：创建定长字符串字段
pub fn char_field(max_length: usize) -> FieldDefinition {
    FieldDefinition::new(FieldType::Char { max_length })
}

/// 便捷函数：创建文本字段
pub fn text_field() -> FieldDefinition {
    FieldDefinition::new(FieldType::Text)
}

/// 便捷函数：创建整数字段
pub fn integer_field() -> FieldDefinition {
    FieldDefinition::new(FieldType::Integer)
}

/// 便捷函数：创建浮点数字段
pub fn float_field() -> FieldDefinition {
    FieldDefinition::new(FieldType::Float)
}

/// 便捷函数：创建定点小数字段
///
/// 存储与序列化时固定保留 `decimal_places` 位小数，总位数必须恰好为 `max_digits`
pub fn decimal_field(max_digits: u32, decimal_places: u32) -> FieldDefinition {
    FieldDefinition::new(FieldType::Decimal { max_digits, decimal_places })
}

/// 便捷函数：创建布尔字段
pub fn boolean_field(positives: Vec<DataValue>, negatives: Vec<DataValue>) -> FieldDefinition {
    FieldDefinition::new(FieldType::Boolean { positives, negatives })
}

/// 便捷函数：创建日期时间字段，默认格式 `%Y-%m-%d %H:%M:%S`
pub fn datetime_field(format: Option<&str>) -> FieldDefinition {
    FieldDefinition::new(FieldType::DateTime {
        format: format.unwrap_or(DEFAULT_DATETIME_FORMAT).to_string(),
    })
}

/// 便捷函数：创建日期字段，默认格式 `%Y-%m-%d`
pub fn date_field(format: Option<&str>) -> FieldDefinition {
    FieldDefinition::new(FieldType::Date {
        format: format.unwrap_or(DEFAULT_DATE_FORMAT).to_string(),
    })
}

/// 便捷函数：创建时间字段，默认格式 `%H:%M:%S`
pub fn time_field(format: Option<&str>) -> FieldDefinition {
    FieldDefinition::new(FieldType::Time {
        format: format.unwrap_or(DEFAULT_TIME_FORMAT).to_string(),
    })
}

/// 便捷函数：创建邮箱字段，默认最大长度 255
pub fn email_field(max_length: Option<usize>) -> FieldDefinition {
    FieldDefinition::new(FieldType::Email {
        max_length: max_length.unwrap_or(DEFAULT_EMAIL_MAX_LENGTH),
    })
}

/// 便捷函数：创建电话号码字段
///
/// `format` 如 `"(00) 0000-0000"`，最大长度默认取模板长度
pub fn phone_number_field(format: &str, max_length: Option<usize>) -> QuickModelResult<FieldDefinition> {
    Ok(FieldDefinition::new(FieldType::phone_number(format, max_length)?))
}

/// 便捷函数：创建 URL 字段，默认最大长度 255、不检查存在性
pub fn url_field(max_length: Option<usize>) -> FieldDefinition {
    FieldDefinition::new(FieldType::Url {
        max_length: max_length.unwrap_or(DEFAULT_URL_MAX_LENGTH),
        verify_exists: false,
    })
}

type Params = serde_json::Map<String, serde_json::Value>;

fn param_error(field_type: &str, param: &str, expected: &str, value: &serde_json::Value) -> crate::error::QuickModelError {
    crate::quick_error!(
        type_error,
        i18n::tf(
            "error.param",
            &[
                ("field_type", field_type),
                ("param", param),
                ("expected", expected),
                ("value", value.to_string().as_str()),
            ]
        )
    )
}

fn bool_param(params: &Params, field_type: &str, key: &str) -> QuickModelResult<Option<bool>> {
    match params.get(key) {
        None => Ok(None),
        Some(serde_json::Value::Bool(b)) => Ok(Some(*b)),
        Some(other) => Err(param_error(field_type, key, "bool", other)),
    }
}

fn uint_param(params: &Params, field_type: &str, key: &str) -> QuickModelResult<Option<u64>> {
    match params.get(key) {
        None => Ok(None),
        Some(value) => value
            .as_u64()
            .map(Some)
            .ok_or_else(|| param_error(field_type, key, "int", value)),
    }
}

fn string_param<'a>(params: &'a Params, field_type: &str, key: &str) -> QuickModelResult<Option<&'a str>> {
    match params.get(key) {
        None => Ok(None),
        Some(serde_json::Value::String(s)) => Ok(Some(s.as_str())),
        Some(other) => Err(param_error(field_type, key, "string", other)),
    }
}

fn list_param(params: &Params, field_type: &str, key: &str) -> QuickModelResult<Vec<DataValue>> {
    match params.get(key) {
        None => Ok(Vec::new()),
        Some(serde_json::Value::Array(items)) => {
            Ok(items.iter().cloned().map(json_value_to_data_value).collect())
        }
        Some(other) => Err(param_error(field_type, key, "list", other)),
    }
}

fn u32_param(params: &Params, field_type: &str, key: &str) -> QuickModelResult<u32> {
    let value = uint_param(params, field_type, key)?.unwrap_or(0);
    u32::try_from(value).map_err(|_| {
        param_error(field_type, key, "int", &serde_json::Value::from(value))
    })
}

impl FieldDefinition {
    /// 按字段类型名和参数表动态创建字段
    ///
    /// 类型名：`char`、`text`、`integer`、`float`、`decimal`、`boolean`、`datetime`、
    /// `date`、`time`、`email`、`phone_number`、`url`。
    /// 参数类型不对（例如 `blank` 不是布尔值、`max_length` 不是整数、日期格式不是字符串）
    /// 在构建时即返回类型错误。
    pub fn from_params(type_name: &str, params: &Params) -> QuickModelResult<Self> {
        let kind = type_name.to_ascii_lowercase();
        let max_length = uint_param(params, &kind, "max_length")?.map(|v| v as usize);

        let mut field = match kind.as_str() {
            "char" => {
                let max_length = max_length.ok_or_else(|| {
                    param_error("CharField", "max_length", "int", &serde_json::Value::Null)
                })?;
                char_field(max_length)
            }
            "text" => text_field(),
            "integer" => integer_field(),
            "float" => float_field(),
            "decimal" => decimal_field(
                u32_param(params, "DecimalField", "max_digits")?,
                u32_param(params, "DecimalField", "decimal_places")?,
            ),
            "boolean" => boolean_field(
                list_param(params, "BooleanField", "positives")?,
                list_param(params, "BooleanField", "negatives")?,
            ),
            "datetime" => datetime_field(string_param(params, "DateTimeField", "format")?),
            "date" => date_field(string_param(params, "DateField", "format")?),
            "time" => time_field(string_param(params, "TimeField", "format")?),
            "email" => email_field(max_length),
            "phone_number" => {
                let format = string_param(params, "PhoneNumberField", "format")?.ok_or_else(|| {
                    param_error("PhoneNumberField", "format", "string", &serde_json::Value::Null)
                })?;
                phone_number_field(format, max_length)?
            }
            "url" => {
                let field = url_field(max_length);
                match bool_param(params, "URLField", "verify_exists")? {
                    Some(verify) => field.verify_exists(verify),
                    None => field,
                }
            }
            other => {
                return Err(crate::quick_error!(type_error, format!("未知的字段类型: {}", other)));
            }
        };

        let kind_name = field.field_type.kind_name();
        if let Some(primary_key) = bool_param(params, kind_name, "primary_key")? {
            field.primary_key = primary_key;
        }
        if let Some(validate) = bool_param(params, kind_name, "validate")? {
            field.must_validate = validate;
        }
        if let Some(null) = bool_param(params, kind_name, "null")? {
            field.null = null;
        }
        if let Some(blank) = bool_param(params, kind_name, "blank")? {
            field.blank = blank;
        }
        Ok(field)
    }
}
