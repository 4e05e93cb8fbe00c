//! 多语言错误消息模块
//!
//! 使用rat_embed_lang框架提供统一的错误消息多语言支持

use std::collections::HashMap;
use rat_embed_lang::register_translations;

/// 错误消息翻译注册器
pub struct ErrorMessageI18n;

impl ErrorMessageI18n {
    /// 注册所有错误消息翻译
    pub fn register_all_translations() {
        let mut translations = HashMap::new();

        // 类型错误
        let mut type_errors = HashMap::new();
        type_errors.insert("zh-CN".to_string(), "{value} 必须是{expected}类型，才能用于 {field_type}".to_string());
        type_errors.insert("en-US".to_string(), "{value} must be a {expected} for {field_type} compatibility".to_string());
        type_errors.insert("ja-JP".to_string(), "{value} は {field_type} と互換性を持つため{expected}型である必要があります".to_string());
        translations.insert("error.type".to_string(), type_errors);

        // 字段参数类型错误
        let mut param_errors = HashMap::new();
        param_errors.insert("zh-CN".to_string(), "{field_type}.{param} 参数必须是{expected}，收到 {value}".to_string());
        param_errors.insert("en-US".to_string(), "{field_type}.{param} param must be a {expected}, got {value}".to_string());
        param_errors.insert("ja-JP".to_string(), "{field_type}.{param} パラメータは{expected}である必要があります。受け取った値: {value}".to_string());
        translations.insert("error.param".to_string(), param_errors);


        // 字符串长度超限
        let mut max_length_errors = HashMap::new();
        max_length_errors.insert("zh-CN".to_string(), "{value} 有 {length} 个字符，但字段 {field} 最多支持 {max_length} 个字符".to_string());
        max_length_errors.insert("en-US".to_string(), "{value} have {length} characters, but the field {field} supports at maximum {max_length} characters".to_string());
        max_length_errors.insert("ja-JP".to_string(), "{value} は {length} 文字ですが、フィールド {field} は最大 {max_length} 文字までです".to_string());
        translations.insert("error.max_length".to_string(), max_length_errors);

        // 数字字段取值无效
        let mut not_a_number_errors = HashMap::new();
        not_a_number_errors.insert("zh-CN".to_string(), "{field_type} 的取值必须是数字（可以是数字字符串），收到 {value}".to_string());
        not_a_number_errors.insert("en-US".to_string(), "{field_type} value must be a number (or a numeric string), got {value}".to_string());
        not_a_number_errors.insert("ja-JP".to_string(), "{field_type} の値は数値（または数値文字列）である必要があります。受け取った値: {value}".to_string());
        translations.insert("error.not_a_number".to_string(), not_a_number_errors);

        // 整数超出范围
        let mut integer_range_errors = HashMap::new();
        integer_range_errors.insert("zh-CN".to_string(), "{value} 超出 64 位整数范围".to_string());
        integer_range_errors.insert("en-US".to_string(), "{value} is out of the 64-bit integer range".to_string());
        integer_range_errors.insert("ja-JP".to_string(), "{value} は 64 ビット整数の範囲外です".to_string());
        translations.insert("error.integer_range".to_string(), integer_range_errors);

        // 十进制数无效
        let mut decimal_errors = HashMap::new();
        decimal_errors.insert("zh-CN".to_string(), "{value} 不是合法的十进制数".to_string());
        decimal_errors.insert("en-US".to_string(), "{value} is not a valid decimal".to_string());
        decimal_errors.insert("ja-JP".to_string(), "{value} は有効な十進数ではありません".to_string());
        translations.insert("error.decimal".to_string(), decimal_errors);

        // 十进制精度不符
        let mut precision_errors = HashMap::new();
        precision_errors.insert("zh-CN".to_string(), "{value} 不满足 {max_digits} 位有效数字和 {decimal_places} 位小数".to_string());
        precision_errors.insert("en-US".to_string(), "{value} does not fit {max_digits} digits with {decimal_places} decimal places".to_string());
        precision_errors.insert("ja-JP".to_string(), "{value} は {max_digits} 桁・小数点以下 {decimal_places} 桁に合いません".to_string());
        translations.insert("error.decimal_precision".to_string(), precision_errors);

        // 邮箱无效
        let mut email_errors = HashMap::new();
        email_errors.insert("zh-CN".to_string(), "邮箱地址无效: \"{value}\"".to_string());
        email_errors.insert("en-US".to_string(), "Invalid email address: \"{value}\"".to_string());
        email_errors.insert("ja-JP".to_string(), "無効なメールアドレス: \"{value}\"".to_string());
        translations.insert("error.email".to_string(), email_errors);

        // 电话号码格式不匹配
        let mut phone_errors = HashMap::new();
        phone_errors.insert("zh-CN".to_string(), "取值与格式 '{format}' 不匹配，收到 {value}".to_string());
        phone_errors.insert("en-US".to_string(), "The value does not match the format '{format}', got {value}".to_string());
        phone_errors.insert("ja-JP".to_string(), "値がフォーマット '{format}' に一致しません。受け取った値: {value}".to_string());
        translations.insert("error.phone_format".to_string(), phone_errors);

        // URL 无效
        let mut url_errors = HashMap::new();
        url_errors.insert("zh-CN".to_string(), "URL无效: \"{value}\"".to_string());
        url_errors.insert("en-US".to_string(), "Invalid URL: \"{value}\"".to_string());
        url_errors.insert("ja-JP".to_string(), "無効なURL: \"{value}\"".to_string());
        translations.insert("error.url".to_string(), url_errors);

        // URL 不存在
        let mut url_not_found_errors = HashMap::new();
        url_not_found_errors.insert("zh-CN".to_string(), "URL不存在: \"{value}\"".to_string());
        url_not_found_errors.insert("en-US".to_string(), "The URL does not exist: \"{value}\"".to_string());
        url_not_found_errors.insert("ja-JP".to_string(), "URLが存在しません: \"{value}\"".to_string());
        translations.insert("error.url_not_found".to_string(), url_not_found_errors);

        // 日期时间格式无效
        let mut temporal_format_errors = HashMap::new();
        temporal_format_errors.insert("zh-CN".to_string(), "\"{format}\" 不是合法的日期时间格式".to_string());
        temporal_format_errors.insert("en-US".to_string(), "\"{format}\" is not a valid date/time format".to_string());
        temporal_format_errors.insert("ja-JP".to_string(), "\"{format}\" は有効な日時フォーマットではありません".to_string());
        translations.insert("error.temporal_format".to_string(), temporal_format_errors);

        // 日期时间解析失败
        let mut temporal_parse_errors = HashMap::new();
        temporal_parse_errors.insert("zh-CN".to_string(), "\"{value}\" 无法按格式 \"{format}\" 解析".to_string());
        temporal_parse_errors.insert("en-US".to_string(), "\"{value}\" does not match the format \"{format}\"".to_string());
        temporal_parse_errors.insert("ja-JP".to_string(), "\"{value}\" はフォーマット \"{format}\" で解析できません".to_string());
        translations.insert("error.temporal_parse".to_string(), temporal_parse_errors);

        // 模型解析失败
        let mut resolution_errors = HashMap::new();
        resolution_errors.insert("zh-CN".to_string(), "模型 {model} 不存在或未注册，是否忘记导入？".to_string());
        resolution_errors.insert("en-US".to_string(), "The model {model} does not exist or is not registered, did you import it ?".to_string());
        resolution_errors.insert("ja-JP".to_string(), "モデル {model} が存在しないか登録されていません。インポートしましたか？".to_string());
        translations.insert("error.resolution".to_string(), resolution_errors);

        // 关系目标没有主键
        let mut relationship_pk_errors = HashMap::new();
        relationship_pk_errors.insert("zh-CN".to_string(), "{from_model} 不能与 {to_model} 建立关系，因为 {to_model} 没有主键".to_string());
        relationship_pk_errors.insert("en-US".to_string(), "{from_model} can not have a relationship with {to_model} because {to_model} has no primary key".to_string());
        relationship_pk_errors.insert("ja-JP".to_string(), "{to_model} に主キーがないため、{from_model} は {to_model} とリレーションを持てません".to_string());
        translations.insert("error.relationship_pk".to_string(), relationship_pk_errors);


        // 序列化格式未实现
        let mut format_errors = HashMap::new();
        format_errors.insert("zh-CN".to_string(), "序列化格式 \"{format}\" 未实现".to_string());
        format_errors.insert("en-US".to_string(), "The format \"{format}\" is not implemented".to_string());
        format_errors.insert("ja-JP".to_string(), "シリアライズ形式 \"{format}\" は実装されていません".to_string());
        translations.insert("error.format_not_implemented".to_string(), format_errors);

        // 集合中不存在
        let mut not_in_collection_errors = HashMap::new();
        not_in_collection_errors.insert("zh-CN".to_string(), "{instance} 不在此 {model} 集合中".to_string());
        not_in_collection_errors.insert("en-US".to_string(), "{instance} is not in this {model} set".to_string());
        not_in_collection_errors.insert("ja-JP".to_string(), "{instance} はこの {model} セットに含まれていません".to_string());
        translations.insert("error.not_in_collection".to_string(), not_in_collection_errors);

        // 嵌套字典键不匹配
        let mut dict_key_errors = HashMap::new();
        dict_key_errors.insert("zh-CN".to_string(), "{model}.from_dict 的字典中找不到键 \"{key}\"，收到 {value}".to_string());
        dict_key_errors.insert("en-US".to_string(), "{model}.from_dict: the key \"{key}\" could not be found in the dict {value}".to_string());
        dict_key_errors.insert("ja-JP".to_string(), "{model}.from_dict: 辞書 {value} にキー \"{key}\" が見つかりません".to_string());
        translations.insert("error.dict_key".to_string(), dict_key_errors);

        // 需要字典参数
        let mut dict_required_errors = HashMap::new();
        dict_required_errors.insert("zh-CN".to_string(), "{model}.from_dict 需要字典参数，收到 {value_type}".to_string());
        dict_required_errors.insert("en-US".to_string(), "{model}.from_dict takes a dict as parameter, got {value_type}".to_string());
        dict_required_errors.insert("ja-JP".to_string(), "{model}.from_dict は辞書を引数に取ります。受け取った型: {value_type}".to_string());
        translations.insert("error.dict_required".to_string(), dict_required_errors);

        // 路径不存在
        let mut path_not_found_errors = HashMap::new();
        path_not_found_errors.insert("zh-CN".to_string(), "路径不存在: {path}".to_string());
        path_not_found_errors.insert("en-US".to_string(), "The path does not exist: {path}".to_string());
        path_not_found_errors.insert("ja-JP".to_string(), "パスが存在しません: {path}".to_string());
        translations.insert("error.path_not_found".to_string(), path_not_found_errors);



        // 注册所有翻译
        register_translations(translations);
    }

    /// 初始化错误消息多语言支持
    pub fn init() {
        Self::register_all_translations();

        // 从环境变量获取语言设置，默认为zh-CN
        let lang = std::env::var("RAT_LANG")
            .or_else(|_| std::env::var("LANG"))
            .unwrap_or_else(|_| "zh-CN".to_string());

        use rat_embed_lang::normalize_language_code;
        let normalized_lang = normalize_language_code(&lang);
        set_language(&normalized_lang);
    }
}

/// 重新导出rat_embed_lang的核心函数
pub use rat_embed_lang::{t, tf, set_language, current_language};
