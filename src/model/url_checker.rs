//! URL 检查器
//!
//! URL 字段通过可注入的检查器完成两项互相独立的检查：语法合法性与存在性

use once_cell::sync::Lazy;
use regex::Regex;
use rat_logger::debug;
use std::time::Duration;

static URL_REGEX: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"^https?:[/]{2}([\w_.-]+)+[.]\w{2,}([/]?.*)?").ok());

/// URL 检查器
pub trait UrlChecker: Send + Sync {
    /// 语法检查：http/https 协议、主机名、可选路径
    fn is_valid(&self, url: &str) -> bool;

    /// 存在性检查，任何访问失败都视为不存在
    fn exists(&self, url: &str) -> bool;
}

/// 检查 URL 语法是否合法
pub fn is_valid_url(url: &str) -> bool {
    URL_REGEX.as_ref().map(|re| re.is_match(url)).unwrap_or(false)
}

/// 基于 HTTP 请求的默认检查器
///
/// 存在性检查使用阻塞客户端；在异步运行时内调用时请求在独立线程上完成
#[derive(Debug, Clone)]
pub struct HttpUrlChecker {
    timeout: Duration,
}

impl HttpUrlChecker {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// 按全局配置的超时创建
    pub fn from_config(config: &crate::config::GlobalConfig) -> Self {
        Self::new(Duration::from_secs(config.url_check_timeout_secs))
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl Default for HttpUrlChecker {
    fn default() -> Self {
        Self::new(Duration::from_secs(10))
    }
}

impl UrlChecker for HttpUrlChecker {
    fn is_valid(&self, url: &str) -> bool {
        is_valid_url(url)
    }

    fn exists(&self, url: &str) -> bool {
        // 阻塞客户端不能在异步运行时线程上创建和销毁，改到独立线程执行
        if tokio::runtime::Handle::try_current().is_ok() {
            return std::thread::scope(|scope| scope.spawn(|| self.request(url)).join().unwrap_or(false));
        }
        self.request(url)
    }
}

impl HttpUrlChecker {
    fn request(&self, url: &str) -> bool {
        let client = match reqwest::blocking::Client::builder().timeout(self.timeout).build() {
            Ok(client) => client,
            Err(e) => {
                debug!("创建HTTP客户端失败: {}", e);
                return false;
            }
        };

        match client.get(url).send() {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                debug!("URL访问失败: {} - {}", url, e);
                false
            }
        }
    }
}
