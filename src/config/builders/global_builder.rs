//! # 全局配置构建器模块
//!
//! 提供全局配置的构建器实现，支持链式调用和严格验证

use crate::config::core::GlobalConfig;
use crate::error::QuickModelError;
use crate::model::meta::ValidationPolicy;
use rat_logger::info;
use std::path::PathBuf;

/// 全局配置构建器
///
/// 除存储目录外，所有配置项都必须显式设置
#[derive(Debug, Default)]
pub struct GlobalConfigBuilder {
    default_validation_policy: Option<ValidationPolicy>,
    url_check_timeout_secs: Option<u64>,
    json_pretty: Option<bool>,
    xml_declaration: Option<bool>,
    storage_base_path: Option<PathBuf>,
    language: Option<String>,
}

impl GlobalConfigBuilder {
    /// 创建新的构建器
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置默认校验策略
    pub fn default_validation_policy(mut self, policy: ValidationPolicy) -> Self {
        self.default_validation_policy = Some(policy);
        self
    }

    /// 设置 URL 存在性检查超时（秒）
    pub fn url_check_timeout_secs(mut self, secs: u64) -> Self {
        self.url_check_timeout_secs = Some(secs);
        self
    }

    /// 设置 JSON 是否美化输出
    pub fn json_pretty(mut self, pretty: bool) -> Self {
        self.json_pretty = Some(pretty);
        self
    }

    /// 设置 XML 是否输出声明头
    pub fn xml_declaration(mut self, declaration: bool) -> Self {
        self.xml_declaration = Some(declaration);
        self
    }

    /// 设置文件存储默认目录
    pub fn storage_base_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.storage_base_path = Some(path.into());
        self
    }

    /// 设置错误消息语言
    pub fn language<S: Into<String>>(mut self, language: S) -> Self {
        self.language = Some(language.into());
        self
    }

    /// 构建全局配置
    ///
    /// # 错误
    ///
    /// 如果任何必需的配置项未设置，将返回错误
    pub fn build(self) -> Result<GlobalConfig, QuickModelError> {
        let default_validation_policy = self
            .default_validation_policy
            .ok_or_else(|| crate::quick_error!(config, "默认校验策略必须设置"))?;

        let url_check_timeout_secs = self
            .url_check_timeout_secs
            .ok_or_else(|| crate::quick_error!(config, "URL检查超时必须设置"))?;

        let json_pretty = self
            .json_pretty
            .ok_or_else(|| crate::quick_error!(config, "JSON输出风格必须设置"))?;

        let xml_declaration = self
            .xml_declaration
            .ok_or_else(|| crate::quick_error!(config, "XML声明头开关必须设置"))?;

        let language = self
            .language
            .ok_or_else(|| crate::quick_error!(config, "语言必须设置"))?;

        let config = GlobalConfig {
            default_validation_policy,
            url_check_timeout_secs,
            json_pretty,
            xml_declaration,
            storage_base_path: self.storage_base_path,
            language,
        };
        config.check()?;

        info!(
            "创建全局配置: 校验策略={:?}, 语言={}, 存储目录={:?}",
            config.default_validation_policy, config.language, config.storage_base_path
        );

        Ok(config)
    }
}
