//! 字段类型定义模块
//!
//! 定义模型字段的类型、校验、类型转换与序列化。
//!
//! 每次字段写入都遵循 `validate → convert_type → 存储` 的顺序：
//! - `validate` 区分两类错误：取值种类不对是 `TypeError`，内容不满足约束是 `ValidationError`
//! - `convert_type` 把原始输入转换为字段的类型化取值
//! - `serialize` 按字段种类把类型化取值转换为嵌套字典中的线上形式

use crate::error::{QuickModelError, QuickModelResult};
use crate::i18n;
use crate::model::url_checker::{HttpUrlChecker, UrlChecker};
use crate::types::DataValue;
use chrono::format::{Item, StrftimeItems};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use std::fmt::Write;
use std::sync::Arc;

pub const DEFAULT_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d";
pub const DEFAULT_TIME_FORMAT: &str = "%H:%M:%S";
pub const DEFAULT_EMAIL_MAX_LENGTH: usize = 255;
pub const DEFAULT_URL_MAX_LENGTH: usize = 255;

static EMAIL_REGEX: Lazy<Option<Regex>> = Lazy::new(|| {
    Regex::new(r"(?i)^[a-z0-9_.-]{2,}@[\w_.-]{3,}[.][a-z]{2,}([.][a-z]{2,})*").ok()
});

/// 字段类型枚举
#[derive(Debug, Clone)]
pub enum FieldType {
    /// 定长字符串
    Char { max_length: usize },
    /// 不限长文本
    Text,
    /// 整数
    Integer,
    /// 浮点数
    Float,
    /// 定点小数
    Decimal { max_digits: u32, decimal_places: u32 },
    /// 布尔值，附带可配置的真/假词表
    Boolean {
        positives: Vec<DataValue>,
        negatives: Vec<DataValue>,
    },
    /// 日期时间
    DateTime { format: String },
    /// 日期
    Date { format: String },
    /// 时间
    Time { format: String },
    /// 邮箱
    Email { max_length: usize },
    /// 电话号码，`format` 中的 `0` 表示一位数字
    PhoneNumber {
        format: String,
        max_length: usize,
        regex: Regex,
    },
    /// URL
    Url { max_length: usize, verify_exists: bool },
}

impl FieldType {
    /// 字段种类名称
    pub fn kind_name(&self) -> &'static str {
        match self {
            FieldType::Char { .. } => "CharField",
            FieldType::Text => "TextField",
            FieldType::Integer => "IntegerField",
            FieldType::Float => "FloatField",
            FieldType::Decimal { .. } => "DecimalField",
            FieldType::Boolean { .. } => "BooleanField",
            FieldType::DateTime { .. } => "DateTimeField",
            FieldType::Date { .. } => "DateField",
            FieldType::Time { .. } => "TimeField",
            FieldType::Email { .. } => "EmailField",
            FieldType::PhoneNumber { .. } => "PhoneNumberField",
            FieldType::Url { .. } => "URLField",
        }
    }

    /// 由电话号码模板生成正则：转义后把 `0` 替换为 `\d`
    pub fn phone_number(format: &str, max_length: Option<usize>) -> QuickModelResult<Self> {
        let pattern = format!("({})", regex::escape(format).replace('0', r"\d"));
        let regex = Regex::new(&pattern).map_err(|e| {
            crate::quick_error!(type_error, format!("电话号码格式无效: {} ({})", format, e))
        })?;
        Ok(FieldType::PhoneNumber {
            format: format.to_string(),
            max_length: max_length.unwrap_or_else(|| format.chars().count()),
            regex,
        })
    }

    fn is_textual(&self) -> bool {
        matches!(
            self,
            FieldType::Char { .. }
                | FieldType::Text
                | FieldType::Email { .. }
                | FieldType::PhoneNumber { .. }
                | FieldType::Url { .. }
        )
    }
}

/// 字段定义
///
/// 字段名在所属模型构建时写入且只写入一次，之后整个定义不可变并被该模型的所有实例共享
#[derive(Clone)]
pub struct FieldDefinition {
    name: String,
    /// 字段类型
    pub field_type: FieldType,
    /// 是否执行内容校验（类型检查始终执行）
    pub must_validate: bool,
    /// 是否为主键
    pub primary_key: bool,
    /// 是否允许空值
    pub null: bool,
    /// 是否允许留空，`is_valid` 只检查 `blank == false` 的字段
    pub blank: bool,
    url_checker: Option<Arc<dyn UrlChecker>>,
}

impl std::fmt::Debug for FieldDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldDefinition")
            .field("name", &self.name)
            .field("field_type", &self.field_type)
            .field("must_validate", &self.must_validate)
            .field("primary_key", &self.primary_key)
            .field("null", &self.null)
            .field("blank", &self.blank)
            .field("url_checker", &self.url_checker.is_some())
            .finish()
    }
}

impl FieldDefinition {
    /// 创建新的字段定义
    pub fn new(field_type: FieldType) -> Self {
        Self {
            name: String::new(),
            field_type,
            must_validate: true,
            primary_key: false,
            null: true,
            blank: true,
            url_checker: None,
        }
    }

    /// 字段名，所属模型构建之前为空
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn stamp_name(&mut self, name: &str) {
        if self.name.is_empty() {
            self.name = name.to_string();
        }
    }

    /// 驼峰形式的字段名：`first_name` → `firstName`
    pub fn camel_name(&self) -> Option<String> {
        if self.name.is_empty() {
            return None;
        }
        Some(camelize(&self.name))
    }

    /// 设置为主键
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    /// 开关内容校验
    pub fn validate_content(mut self, must_validate: bool) -> Self {
        self.must_validate = must_validate;
        self
    }

    /// 设置是否允许空值
    pub fn null(mut self, null: bool) -> Self {
        self.null = null;
        self
    }

    /// 设置是否允许留空
    pub fn blank(mut self, blank: bool) -> Self {
        self.blank = blank;
        self
    }

    /// 设置 URL 字段是否检查存在性，非 URL 字段忽略
    pub fn verify_exists(mut self, verify: bool) -> Self {
        if let FieldType::Url { verify_exists, .. } = &mut self.field_type {
            *verify_exists = verify;
        }
        self
    }

    /// 注入 URL 检查器
    pub fn with_url_checker(mut self, checker: Arc<dyn UrlChecker>) -> Self {
        self.url_checker = Some(checker);
        self
    }

    fn display_name(&self) -> &str {
        if self.name.is_empty() { self.field_type.kind_name() } else { &self.name }
    }

    fn type_error(&self, value: &DataValue, expected: &str) -> QuickModelError {
        crate::quick_error!(
            type_error,
            i18n::tf(
                "error.type",
                &[
                    ("value", format!("{:?}", value).as_str()),
                    ("expected", expected),
                    ("field_type", self.field_type.kind_name()),
                ]
            )
        )
    }

    fn validation_error(&self, message: impl Into<String>) -> QuickModelError {
        crate::quick_error!(validation, self.display_name(), message.into())
    }

    /// 按多语言消息构造校验错误
    fn invalid(&self, key: &str, args: &[(&str, &str)]) -> QuickModelError {
        self.validation_error(i18n::tf(key, args))
    }

    fn not_a_number(&self, value: &str) -> QuickModelError {
        self.invalid(
            "error.not_a_number",
            &[("field_type", self.field_type.kind_name()), ("value", value)],
        )
    }

    fn invalid_decimal(&self, value: &str) -> QuickModelError {
        self.invalid("error.decimal", &[("value", value)])
    }

    fn invalid_temporal_format(&self, format: &str) -> QuickModelError {
        self.invalid("error.temporal_format", &[("format", format)])
    }

    fn check_length(&self, s: &str, max_length: usize) -> QuickModelResult<()> {
        let length = s.chars().count();
        if length > max_length {
            return Err(self.validation_error(i18n::tf(
                "error.max_length",
                &[
                    ("value", s),
                    ("length", length.to_string().as_str()),
                    ("field", self.display_name()),
                    ("max_length", max_length.to_string().as_str()),
                ],
            )));
        }
        Ok(())
    }

    /// 校验原始输入
    pub fn validate(&self, value: &DataValue) -> QuickModelResult<()> {
        match &self.field_type {
            FieldType::Char { max_length } => {
                let s = value.as_str().ok_or_else(|| self.type_error(value, "字符串"))?;
                if self.must_validate {
                    self.check_length(s, *max_length)?;
                }
                Ok(())
            }
            FieldType::Text => {
                value.as_str().ok_or_else(|| self.type_error(value, "字符串"))?;
                Ok(())
            }
            FieldType::Email { max_length } => {
                let s = value.as_str().ok_or_else(|| self.type_error(value, "字符串"))?;
                if self.must_validate {
                    self.check_length(s, *max_length)?;
                    let matched = EMAIL_REGEX.as_ref().map(|re| re.is_match(s)).unwrap_or(false);
                    if !matched {
                        return Err(self.invalid("error.email", &[("value", s)]));
                    }
                }
                Ok(())
            }
            FieldType::PhoneNumber { format, max_length, regex } => {
                let s = value.as_str().ok_or_else(|| self.type_error(value, "字符串"))?;
                if self.must_validate {
                    self.check_length(s, *max_length)?;
                    if !regex.is_match(s) {
                        return Err(self.invalid("error.phone_format", &[("format", format.as_str()), ("value", s)]));
                    }
                }
                Ok(())
            }
            FieldType::Url { max_length, verify_exists } => {
                let s = value.as_str().ok_or_else(|| self.type_error(value, "字符串"))?;
                if self.must_validate {
                    self.check_length(s, *max_length)?;
                    let default_checker;
                    let checker: &dyn UrlChecker = match &self.url_checker {
                        Some(checker) => checker.as_ref(),
                        None => {
                            default_checker = HttpUrlChecker::default();
                            &default_checker
                        }
                    };
                    if !checker.is_valid(s) {
                        return Err(self.invalid("error.url", &[("value", s)]));
                    }
                    if *verify_exists && !checker.exists(s) {
                        return Err(self.invalid("error.url_not_found", &[("value", s)]));
                    }
                }
                Ok(())
            }
            FieldType::Integer | FieldType::Float => match value {
                DataValue::Null => Err(self.not_a_number("null")),
                DataValue::Int(_) | DataValue::Float(_) | DataValue::Decimal(_) | DataValue::Bool(_) => Ok(()),
                DataValue::String(s) if s.trim().parse::<i64>().is_ok() => Ok(()),
                DataValue::String(s) => parse_number(s)
                    .map(|_| ())
                    .ok_or_else(|| self.not_a_number(&format!("\"{}\"", s))),
                other => Err(self.type_error(other, "数字")),
            },
            FieldType::Decimal { max_digits, decimal_places } => {
                let parsed = match value {
                    DataValue::String(s) => parse_decimal(s).ok_or_else(|| self.invalid_decimal(s))?,
                    DataValue::Decimal(d) => *d,
                    other => return Err(self.type_error(other, "字符串")),
                };
                if self.must_validate {
                    let digits = count_digits(&rescaled(parsed, *decimal_places));
                    if digits != *max_digits as usize {
                        return Err(self.invalid(
                            "error.decimal_precision",
                            &[
                                ("value", value.to_string().as_str()),
                                ("max_digits", max_digits.to_string().as_str()),
                                ("decimal_places", decimal_places.to_string().as_str()),
                            ],
                        ));
                    }
                }
                Ok(())
            }
            FieldType::Boolean { positives, negatives } => {
                if positives.contains(value) || negatives.contains(value) {
                    return Ok(());
                }
                match value {
                    DataValue::Bool(_) => Ok(()),
                    DataValue::String(s) if s == "True" || s == "False" => Ok(()),
                    other => Err(self.type_error(other, "布尔")),
                }
            }
            FieldType::DateTime { format } | FieldType::Date { format } | FieldType::Time { format } => {
                match value {
                    DataValue::String(s) => {
                        if self.must_validate && !is_valid_format(format) {
                            return Err(self.invalid_temporal_format(format));
                        }
                        if s.is_empty() {
                            return Ok(());
                        }
                        self.parse_temporal(s).map(|_| ())
                    }
                    DataValue::DateTime(_) if matches!(self.field_type, FieldType::DateTime { .. }) => Ok(()),
                    DataValue::Date(_) if matches!(self.field_type, FieldType::Date { .. }) => Ok(()),
                    DataValue::Time(_) if matches!(self.field_type, FieldType::Time { .. }) => Ok(()),
                    other => Err(self.type_error(other, "字符串或日期时间")),
                }
            }
        }
    }

    /// 把原始输入转换为类型化取值
    pub fn convert_type(&self, value: &DataValue) -> QuickModelResult<DataValue> {
        if self.field_type.is_textual() {
            return match value {
                DataValue::Null => Ok(DataValue::String(String::new())),
                DataValue::String(s) => Ok(DataValue::String(s.clone())),
                DataValue::Array(_) | DataValue::Object(_) => Err(self.type_error(value, "字符串")),
                other => Ok(DataValue::String(other.to_string())),
            };
        }

        match &self.field_type {
            FieldType::Integer => self.to_integer(value).map(DataValue::Int),
            FieldType::Float => self.to_number(value).map(DataValue::Float),
            FieldType::Decimal { decimal_places, .. } => {
                let parsed = match value {
                    DataValue::String(s) => parse_decimal(s).ok_or_else(|| self.invalid_decimal(s))?,
                    DataValue::Decimal(d) => *d,
                    DataValue::Int(i) => Decimal::from(*i),
                    DataValue::Float(f) => Decimal::try_from(*f).map_err(|_| self.invalid_decimal(&f.to_string()))?,
                    other => return Err(self.type_error(other, "字符串")),
                };
                Ok(DataValue::Decimal(rescaled(parsed, *decimal_places)))
            }
            FieldType::Boolean { positives, negatives } => {
                if positives.contains(value) {
                    return Ok(DataValue::Bool(true));
                }
                if negatives.contains(value) {
                    return Ok(DataValue::Bool(false));
                }
                match value {
                    DataValue::Bool(b) => Ok(DataValue::Bool(*b)),
                    DataValue::String(s) if s == "True" => Ok(DataValue::Bool(true)),
                    DataValue::String(s) if s == "False" => Ok(DataValue::Bool(false)),
                    other => Err(self.type_error(other, "布尔")),
                }
            }
            FieldType::DateTime { .. } | FieldType::Date { .. } | FieldType::Time { .. } => match value {
                DataValue::String(s) if s.is_empty() => Ok(DataValue::Null),
                DataValue::String(s) => self.parse_temporal(s),
                DataValue::DateTime(_) if matches!(self.field_type, FieldType::DateTime { .. }) => Ok(value.clone()),
                DataValue::Date(_) if matches!(self.field_type, FieldType::Date { .. }) => Ok(value.clone()),
                DataValue::Time(_) if matches!(self.field_type, FieldType::Time { .. }) => Ok(value.clone()),
                other => Err(self.type_error(other, "字符串或日期时间")),
            },
            // 文本类字段已在上方处理
            _ => Ok(value.clone()),
        }
    }

    /// 按字段种类把类型化取值转换为线上形式
    pub fn serialize(&self, value: &DataValue) -> QuickModelResult<DataValue> {
        match (&self.field_type, value) {
            (FieldType::Decimal { .. }, DataValue::Decimal(d)) => Ok(DataValue::String(d.to_string())),
            (FieldType::DateTime { format }, DataValue::DateTime(dt)) => {
                self.format_temporal(format, dt.format(format)).map(DataValue::String)
            }
            (FieldType::Date { format }, DataValue::Date(d)) => {
                self.format_temporal(format, d.format(format)).map(DataValue::String)
            }
            (FieldType::Time { format }, DataValue::Time(t)) => {
                self.format_temporal(format, t.format(format)).map(DataValue::String)
            }
            (FieldType::DateTime { .. } | FieldType::Date { .. } | FieldType::Time { .. }, DataValue::Null) => {
                Ok(DataValue::String(String::new()))
            }
            _ => Ok(value.clone()),
        }
    }

    fn to_number(&self, value: &DataValue) -> QuickModelResult<f64> {
        match value {
            DataValue::Null => Err(self.not_a_number("null")),
            DataValue::Int(i) => Ok(*i as f64),
            DataValue::Float(f) => Ok(*f),
            DataValue::Bool(b) => Ok(if *b { 1.0 } else { 0.0 }),
            DataValue::Decimal(d) => d.to_f64().ok_or_else(|| self.not_a_number(&d.to_string())),
            DataValue::String(s) => parse_number(s).ok_or_else(|| self.not_a_number(&format!("\"{}\"", s))),
            other => Err(self.type_error(other, "数字")),
        }
    }

    /// 整数取值不经过浮点数中转；小数向零截断，超出 i64 范围是校验错误
    fn to_integer(&self, value: &DataValue) -> QuickModelResult<i64> {
        let out_of_range = |text: String| self.invalid("error.integer_range", &[("value", text.as_str())]);
        match value {
            DataValue::Int(i) => Ok(*i),
            DataValue::Bool(b) => Ok(i64::from(*b)),
            DataValue::Decimal(d) => d.trunc().to_i64().ok_or_else(|| out_of_range(d.to_string())),
            DataValue::String(s) => match s.trim().parse::<i64>() {
                Ok(i) => Ok(i),
                Err(_) => float_to_i64(self.to_number(value)?).ok_or_else(|| out_of_range(s.clone())),
            },
            _ => float_to_i64(self.to_number(value)?).ok_or_else(|| out_of_range(value.to_string())),
        }
    }

    fn parse_temporal(&self, s: &str) -> QuickModelResult<DataValue> {
        let (parsed, format) = match &self.field_type {
            FieldType::DateTime { format } => {
                (NaiveDateTime::parse_from_str(s, format).map(DataValue::DateTime), format)
            }
            FieldType::Date { format } => (NaiveDate::parse_from_str(s, format).map(DataValue::Date), format),
            FieldType::Time { format } => (NaiveTime::parse_from_str(s, format).map(DataValue::Time), format),
            _ => return Err(self.type_error(&DataValue::from(s), "日期时间")),
        };
        parsed.map_err(|_| self.invalid("error.temporal_parse", &[("value", s), ("format", format.as_str())]))
    }

    fn format_temporal<'a>(
        &self,
        format: &str,
        delayed: chrono::format::DelayedFormat<StrftimeItems<'a>>,
    ) -> QuickModelResult<String> {
        let mut out = String::new();
        write!(out, "{}", delayed).map_err(|_| self.invalid_temporal_format(format))?;
        Ok(out)
    }
}

/// `first_name` → `firstName`
pub fn camelize(name: &str) -> String {
    let mut parts = name.split('_');
    let mut out = parts.next().unwrap_or_default().to_lowercase();
    for part in parts {
        let mut chars = part.chars();
        if let Some(first) = chars.next() {
            out.extend(first.to_uppercase());
            out.push_str(&chars.as_str().to_lowercase());
        }
    }
    out
}

/// 格式串至少包含一个有效指令且没有非法指令
pub fn is_valid_format(format: &str) -> bool {
    let mut has_directive = false;
    for item in StrftimeItems::new(format) {
        match item {
            Item::Error => return false,
            Item::Numeric(..) | Item::Fixed(..) => has_directive = true,
            _ => {}
        }
    }
    has_directive
}

fn parse_number(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|f| f.is_finite())
}

/// 截断小数部分；超出 i64 范围时返回 `None`
fn float_to_i64(value: f64) -> Option<i64> {
    let truncated = value.trunc();
    // i64::MAX 无法用 f64 精确表示，上界取 2^63 并排除
    if truncated >= -9_223_372_036_854_775_808.0 && truncated < 9_223_372_036_854_775_808.0 {
        Some(truncated as i64)
    } else {
        None
    }
}

fn parse_decimal(s: &str) -> Option<Decimal> {
    let trimmed = s.trim();
    trimmed
        .parse::<Decimal>()
        .ok()
        .or_else(|| Decimal::from_scientific(trimmed).ok())
}

fn rescaled(mut value: Decimal, decimal_places: u32) -> Decimal {
    value.rescale(decimal_places);
    value
}

/// 统计数字位数，不计小数点和符号
fn count_digits(value: &Decimal) -> usize {
    value.to_string().chars().filter(|c| c.is_ascii_digit()).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::convenience::*;

    #[test]
    fn test_char_field_length_and_types() {
        let mut field = char_field(10);
        field.stamp_name("first_name");

        assert!(field.validate(&DataValue::from("blah")).is_ok());
        assert!(field.validate(&DataValue::from("blahblahblah")).unwrap_err().is_validation_error());
        assert!(field.validate(&DataValue::Int(0)).unwrap_err().is_type_error());
        assert!(field.validate(&DataValue::Null).unwrap_err().is_type_error());
    }

    #[test]
    fn test_char_field_without_content_validation_still_checks_type() {
        let field = char_field(3).validate_content(false);
        assert!(field.validate(&DataValue::from("much longer")).is_ok());
        assert!(field.validate(&DataValue::Int(1)).unwrap_err().is_type_error());
    }

    #[test]
    fn test_text_convert_null_to_empty() {
        let field = text_field();
        assert_eq!(field.convert_type(&DataValue::Null).unwrap(), DataValue::from(""));
    }

    #[test]
    fn test_integer_and_float_null_is_validation_error() {
        for field in [integer_field(), float_field()] {
            assert!(field.validate(&DataValue::Null).unwrap_err().is_validation_error());
            assert!(field.convert_type(&DataValue::Null).unwrap_err().is_validation_error());
        }
    }

    #[test]
    fn test_integer_conversion() {
        let field = integer_field();
        assert_eq!(field.convert_type(&DataValue::from("42")).unwrap(), DataValue::Int(42));
        assert_eq!(field.convert_type(&DataValue::from("4.9")).unwrap(), DataValue::Int(4));
        assert_eq!(field.convert_type(&DataValue::Float(-3.7)).unwrap(), DataValue::Int(-3));
        assert!(field.validate(&DataValue::from("forty")).unwrap_err().is_validation_error());
        assert!(field.validate(&DataValue::Array(vec![])).unwrap_err().is_type_error());
    }

    #[test]
    fn test_integer_conversion_keeps_full_precision() {
        let field = integer_field();
        let big = 9_007_199_254_740_993_i64;
        assert_eq!(field.convert_type(&DataValue::Int(big)).unwrap(), DataValue::Int(big));
        assert_eq!(field.convert_type(&DataValue::from(" 9007199254740993 ")).unwrap(), DataValue::Int(big));
        assert_eq!(field.convert_type(&DataValue::Int(i64::MIN)).unwrap(), DataValue::Int(i64::MIN));
        assert_eq!(field.convert_type(&DataValue::from("1e3")).unwrap(), DataValue::Int(1000));
        assert_eq!(field.convert_type(&DataValue::Bool(true)).unwrap(), DataValue::Int(1));
    }

    #[test]
    fn test_integer_out_of_range_is_validation_error() {
        let field = integer_field();
        assert!(field.validate(&DataValue::from("1e30")).is_ok());
        assert!(field.convert_type(&DataValue::from("1e30")).unwrap_err().is_validation_error());
        assert!(field.convert_type(&DataValue::from("99999999999999999999")).unwrap_err().is_validation_error());
        assert!(field.convert_type(&DataValue::Float(-1e19)).unwrap_err().is_validation_error());
        assert!(field.convert_type(&DataValue::Float(9.223372036854775807e18)).unwrap_err().is_validation_error());
    }

    #[test]
    fn test_float_conversion() {
        let field = float_field();
        assert_eq!(field.convert_type(&DataValue::from("2.5")).unwrap(), DataValue::Float(2.5));
        assert_eq!(field.convert_type(&DataValue::Int(3)).unwrap(), DataValue::Float(3.0));
    }

    #[test]
    fn test_decimal_field() {
        let field = decimal_field(6, 2);
        let value = DataValue::from("4000.55");
        field.validate(&value).unwrap();
        let converted = field.convert_type(&value).unwrap();
        assert_eq!(converted, DataValue::Decimal("4000.55".parse().unwrap()));
        assert_eq!(field.serialize(&converted).unwrap(), DataValue::from("4000.55"));

        let narrow = decimal_field(2, 2);
        assert!(narrow.validate(&value).unwrap_err().is_validation_error());
    }

    #[test]
    fn test_decimal_field_errors() {
        let field = decimal_field(6, 2);
        assert!(field.validate(&DataValue::from("abc")).unwrap_err().is_validation_error());
        assert!(field.validate(&DataValue::Float(1.5)).unwrap_err().is_type_error());
        // 符号不计入位数
        field.validate(&DataValue::from("-4000.55")).unwrap();
    }

    #[test]
    fn test_decimal_fixed_point_output() {
        let field = decimal_field(5, 2);
        let converted = field.convert_type(&DataValue::from("100.5")).unwrap();
        assert_eq!(field.serialize(&converted).unwrap(), DataValue::from("100.50"));
    }

    #[test]
    fn test_boolean_vocabulary() {
        let field = boolean_field(
            vec![DataValue::from("true"), DataValue::from("yes"), DataValue::Int(1)],
            vec![DataValue::from("false"), DataValue::from("no"), DataValue::Int(0)],
        );

        for (raw, expected) in [
            (DataValue::from("True"), true),
            (DataValue::from("False"), false),
            (DataValue::from("yes"), true),
            (DataValue::from("no"), false),
            (DataValue::Int(1), true),
            (DataValue::Int(0), false),
            (DataValue::Bool(true), true),
        ] {
            field.validate(&raw).unwrap();
            assert_eq!(field.convert_type(&raw).unwrap(), DataValue::Bool(expected));
        }

        assert!(field.validate(&DataValue::Null).unwrap_err().is_type_error());
        assert!(field.validate(&DataValue::from("maybe")).unwrap_err().is_type_error());
    }

    #[test]
    fn test_date_time_fields() {
        let field = date_field(None);
        let raw = DataValue::from("2009-11-24");
        field.validate(&raw).unwrap();
        let converted = field.convert_type(&raw).unwrap();
        assert_eq!(converted, DataValue::Date(NaiveDate::from_ymd_opt(2009, 11, 24).unwrap()));
        assert_eq!(field.serialize(&converted).unwrap(), raw);

        assert!(field.validate(&DataValue::from("24/11/2009")).unwrap_err().is_validation_error());
        assert!(field.validate(&DataValue::Int(3)).unwrap_err().is_type_error());

        let custom = datetime_field(Some("%d/%m/%Y %H:%M"));
        let raw = DataValue::from("24/11/2009 10:30");
        let converted = custom.convert_type(&raw).unwrap();
        assert_eq!(custom.serialize(&converted).unwrap(), raw);

        let time = time_field(None);
        let converted = time.convert_type(&DataValue::from("23:59:01")).unwrap();
        assert_eq!(converted, DataValue::Time(NaiveTime::from_hms_opt(23, 59, 1).unwrap()));
    }

    #[test]
    fn test_format_without_directives_is_invalid() {
        assert!(is_valid_format("%Y-%m-%d"));
        assert!(!is_valid_format("plain text"));
        assert!(!is_valid_format("%Q"));

        let field = date_field(Some("no directives"));
        assert!(field.validate(&DataValue::from("no directives")).unwrap_err().is_validation_error());
    }

    #[test]
    fn test_email_field() {
        let field = email_field(None);
        field.validate(&DataValue::from("gabriel@nacaolivre.org")).unwrap();
        field.validate(&DataValue::from("Some.One@example.com.br")).unwrap();
        assert!(field.validate(&DataValue::from("g@x.y")).unwrap_err().is_validation_error());
        assert!(field.validate(&DataValue::Int(1)).unwrap_err().is_type_error());
    }

    #[test]
    fn test_phone_number_field() {
        let field = phone_number_field("(00) 0000-0000", None).unwrap();
        field.validate(&DataValue::from("(21) 2413-5566")).unwrap();
        assert!(field.validate(&DataValue::from("21 2413 5566")).unwrap_err().is_validation_error());
        assert!(field.validate(&DataValue::from("(21) 2413-5566-99")).unwrap_err().is_validation_error());
    }

    #[test]
    fn test_camel_name() {
        let mut field = char_field(10);
        assert_eq!(field.camel_name(), None);
        field.stamp_name("first_name_here");
        assert_eq!(field.camel_name().as_deref(), Some("firstNameHere"));
        field.stamp_name("other");
        assert_eq!(field.name(), "first_name_here");
    }
}
