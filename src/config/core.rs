//! # 配置管理模块 - 核心配置类型
//!
//! 严格遵循项目规范：所有配置项必须显式设置，严禁使用默认值

use crate::error::QuickModelError;
use crate::model::meta::ValidationPolicy;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use rat_logger::info;

/// 全局配置
///
/// 决定注册表的默认校验策略、URL 检查超时、序列化器输出风格、
/// 文件存储默认目录和错误消息语言
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalConfig {
    /// 模型未声明校验策略时使用的默认值
    pub default_validation_policy: ValidationPolicy,
    /// URL 存在性检查超时（秒）
    pub url_check_timeout_secs: u64,
    /// JSON 是否美化输出
    pub json_pretty: bool,
    /// XML 是否输出声明头
    pub xml_declaration: bool,
    /// 文件存储默认目录
    pub storage_base_path: Option<PathBuf>,
    /// 错误消息语言
    pub language: String,
}

impl GlobalConfig {
    /// 创建全局配置构建器
    pub fn builder() -> super::builders::GlobalConfigBuilder {
        super::builders::GlobalConfigBuilder::new()
    }

    /// 基线配置
    ///
    /// 全量校验、10 秒超时、紧凑 JSON、无 XML 声明头、无存储目录、zh-CN
    pub fn default_settings() -> Self {
        Self {
            default_validation_policy: ValidationPolicy::ValidateAll,
            url_check_timeout_secs: 10,
            json_pretty: false,
            xml_declaration: false,
            storage_base_path: None,
            language: "zh-CN".to_string(),
        }
    }

    /// 从配置文件加载配置
    ///
    /// # 参数
    ///
    /// * `config_path` - 配置文件路径，扩展名为 `.toml` 时按 TOML 解析，否则按 JSON 解析
    pub fn from_file<P: AsRef<std::path::Path>>(config_path: P) -> Result<Self, QuickModelError> {
        let content = std::fs::read_to_string(config_path.as_ref())?;

        let config: GlobalConfig = if config_path.as_ref().extension().and_then(|s| s.to_str()) == Some("toml") {
            toml::from_str(&content)
                .map_err(|e| crate::quick_error!(config, format!("解析TOML配置文件失败: {}", e)))?
        } else {
            serde_json::from_str(&content)
                .map_err(|e| crate::quick_error!(config, format!("解析JSON配置文件失败: {}", e)))?
        };

        config.check()?;
        info!("从文件加载配置: {:?}", config_path.as_ref());
        Ok(config)
    }

    /// 保存配置到文件
    ///
    /// # 参数
    ///
    /// * `config_path` - 配置文件路径
    pub fn save_to_file<P: AsRef<std::path::Path>>(&self, config_path: P) -> Result<(), QuickModelError> {
        let content = if config_path.as_ref().extension().and_then(|s| s.to_str()) == Some("toml") {
            toml::to_string_pretty(self)
                .map_err(|e| crate::quick_error!(config, format!("序列化TOML配置失败: {}", e)))?
        } else {
            serde_json::to_string_pretty(self)
                .map_err(|e| crate::quick_error!(config, format!("序列化JSON配置失败: {}", e)))?
        };

        std::fs::write(config_path.as_ref(), content)?;

        info!("保存配置到文件: {:?}", config_path.as_ref());
        Ok(())
    }

    /// 应用语言设置
    pub fn apply_language(&self) {
        crate::i18n::set_language(&rat_embed_lang::normalize_language_code(&self.language));
    }

    pub(crate) fn check(&self) -> Result<(), QuickModelError> {
        if self.url_check_timeout_secs == 0 {
            return Err(crate::quick_error!(config, "URL检查超时必须大于0"));
        }
        if self.language.trim().is_empty() {
            return Err(crate::quick_error!(config, "语言代码不能为空"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toml_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quickmodel.toml");

        let mut config = GlobalConfig::default_settings();
        config.json_pretty = true;
        config.default_validation_policy = ValidationPolicy::ValidateNone;
        config.save_to_file(&path).unwrap();

        let loaded = GlobalConfig::from_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_json_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quickmodel.json");

        let mut config = GlobalConfig::default_settings();
        config.storage_base_path = Some(dir.path().to_path_buf());
        config.save_to_file(&path).unwrap();

        assert_eq!(GlobalConfig::from_file(&path).unwrap(), config);
    }

    #[test]
    fn test_zero_timeout_rejected_on_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        let mut config = GlobalConfig::default_settings();
        config.url_check_timeout_secs = 0;
        config.save_to_file(&path).unwrap();

        assert!(matches!(
            GlobalConfig::from_file(&path),
            Err(QuickModelError::ConfigError { .. })
        ));
    }
}
