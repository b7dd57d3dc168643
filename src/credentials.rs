//! 密钥管理模块
//!
//! 从进程环境变量读取各数据源/模型服务的密钥。
//! 启动时可从本地 `.env` 文件预加载，已存在的环境变量不会被覆盖。

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use crate::error::DataError;

/// Tushare Pro 的 Token
pub const TUSHARE_TOKEN: &str = "TUSHARE_TOKEN";
/// OpenAI API Key
pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";
/// Gemini API Key
pub const GOOGLE_API_KEY: &str = "GOOGLE_API_KEY";
/// 通义千问（DashScope）API Key
pub const DASHSCOPE_API_KEY: &str = "DASHSCOPE_API_KEY";

const ALL_KEYS: [&str; 4] = [TUSHARE_TOKEN, OPENAI_API_KEY, GOOGLE_API_KEY, DASHSCOPE_API_KEY];

static ENV_FILE: OnceLock<Option<PathBuf>> = OnceLock::new();

/// 加载当前目录（或上级目录）的 `.env` 文件到进程环境
///
/// 每个进程只真正加载一次，之后的调用直接返回首次的结果。
/// 返回实际加载的文件路径，未找到文件时返回 `None`。
pub fn load_env_file() -> Option<&'static Path> {
    ENV_FILE
        .get_or_init(|| match dotenvy::dotenv() {
            Ok(path) => {
                log::info!("从 {} 加载环境变量", path.display());
                Some(path)
            }
            Err(e) if e.not_found() => {
                log::debug!("未找到 .env 文件，仅使用进程环境变量");
                None
            }
            Err(e) => {
                log::warn!("加载 .env 文件失败: {}", e);
                None
            }
        })
        .as_deref()
}

/// 从指定路径加载环境变量文件，不覆盖已设置的变量
pub fn load_env_file_from<P: AsRef<Path>>(path: P) -> anyhow::Result<()> {
    dotenvy::from_path(path.as_ref())?;
    Ok(())
}

/// 密钥提供方
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Provider {
    /// A股行情（Tushare Pro）
    Tushare,
    OpenAi,
    Gemini,
    /// 通义千问
    Qwen,
    /// 未识别的名称，保留原始输入用于日志
    Unsupported(String),
}

impl Provider {
    /// 按名称解析，不区分大小写
    pub fn parse(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "tushare" => Provider::Tushare,
            "openai" => Provider::OpenAi,
            "gemini" => Provider::Gemini,
            "qwen" => Provider::Qwen,
            _ => Provider::Unsupported(name.to_string()),
        }
    }

    /// 提供方名称
    pub fn name(&self) -> &str {
        match self {
            Provider::Tushare => "tushare",
            Provider::OpenAi => "openai",
            Provider::Gemini => "gemini",
            Provider::Qwen => "qwen",
            Provider::Unsupported(name) => name,
        }
    }

    /// 对应的环境变量名
    pub fn env_key(&self) -> Option<&'static str> {
        match self {
            Provider::Tushare => Some(TUSHARE_TOKEN),
            Provider::OpenAi => Some(OPENAI_API_KEY),
            Provider::Gemini => Some(GOOGLE_API_KEY),
            Provider::Qwen => Some(DASHSCOPE_API_KEY),
            Provider::Unsupported(_) => None,
        }
    }
}

/// 已解析的密钥集合
///
/// 构造时从环境中取一次快照，之后的查询不再读取进程环境，
/// 测试时可通过 [`Credentials::from_pairs`] 注入。
#[derive(Clone, Default)]
pub struct Credentials {
    values: HashMap<&'static str, String>,
}

impl Credentials {
    /// 从进程环境构造（会先触发一次 `.env` 加载）
    pub fn from_env() -> Self {
        load_env_file();

        let values = ALL_KEYS
            .iter()
            .filter_map(|key| {
                std::env::var(key)
                    .ok()
                    .filter(|v| !v.trim().is_empty())
                    .map(|v| (*key, v))
            })
            .collect();

        Self { values }
    }

    /// 直接指定键值，未识别的键会被忽略
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut values = HashMap::new();
        for (key, value) in pairs {
            let value = value.into();
            if value.trim().is_empty() {
                continue;
            }
            if let Some(known) = ALL_KEYS.iter().find(|k| *k == &key.as_ref()) {
                values.insert(*known, value);
            }
        }
        Self { values }
    }

    /// 查询指定提供方的密钥
    ///
    /// 未配置返回 `Ok(None)`，不支持的提供方返回 `UnsupportedProvider`
    pub fn lookup(&self, provider: &Provider) -> Result<Option<&str>, DataError> {
        match provider.env_key() {
            Some(key) => Ok(self.values.get(key).map(String::as_str)),
            None => Err(DataError::UnsupportedProvider(provider.name().to_string())),
        }
    }

    /// 按名称获取密钥，不支持的名称记录警告并返回 `None`
    pub fn resolve(&self, name: &str) -> Option<String> {
        match self.lookup(&Provider::parse(name)) {
            Ok(value) => value.map(str::to_string),
            Err(e) => {
                log::warn!("{}", e);
                None
            }
        }
    }

    /// Tushare Token
    pub fn tushare_token(&self) -> Option<&str> {
        self.values.get(TUSHARE_TOKEN).map(String::as_str)
    }

    /// 输出各密钥的配置情况（只显示前几位）
    pub fn log_summary(&self) {
        match self.tushare_token() {
            Some(token) => log::info!("成功获取到Tushare Token: {}", masked(token, 8)),
            None => log::warn!("未在 .env 文件中找到 {}，无法获取A股数据", TUSHARE_TOKEN),
        }

        for key in [OPENAI_API_KEY, GOOGLE_API_KEY, DASHSCOPE_API_KEY] {
            match self.values.get(key) {
                Some(value) => log::info!("已配置 {}: {}", key, masked(value, 5)),
                None => log::debug!("未配置 {}", key),
            }
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut configured: Vec<&str> = self.values.keys().copied().collect();
        configured.sort_unstable();
        f.debug_struct("Credentials")
            .field("configured", &configured)
            .finish()
    }
}

/// 只保留前 `keep` 个字符
pub fn masked(value: &str, keep: usize) -> String {
    let prefix: String = value.chars().take(keep).collect();
    format!("{}...", prefix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn temp_env_file(name: &str, content: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "stock_fetcher_{}_{}.env",
            name,
            std::process::id()
        ));
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_provider_parse() {
        assert_eq!(Provider::parse("tushare"), Provider::Tushare);
        assert_eq!(Provider::parse("OpenAI"), Provider::OpenAi);
        assert_eq!(Provider::parse(" Gemini "), Provider::Gemini);
        assert_eq!(Provider::parse("QWEN"), Provider::Qwen);
        assert_eq!(
            Provider::parse("claude"),
            Provider::Unsupported("claude".to_string())
        );
    }

    #[test]
    fn test_resolve_qwen() {
        let credentials = Credentials::from_pairs([(DASHSCOPE_API_KEY, "sk-dashscope")]);
        assert_eq!(credentials.resolve("qwen").as_deref(), Some("sk-dashscope"));
        assert_eq!(credentials.resolve("Qwen").as_deref(), Some("sk-dashscope"));

        let empty = Credentials::default();
        assert_eq!(empty.resolve("qwen"), None);
    }

    #[test]
    fn test_resolve_each_provider() {
        let credentials = Credentials::from_pairs([
            (TUSHARE_TOKEN, "ts-token"),
            (OPENAI_API_KEY, "sk-openai"),
            (GOOGLE_API_KEY, "g-key"),
            (DASHSCOPE_API_KEY, "ds-key"),
        ]);

        assert_eq!(credentials.resolve("tushare").as_deref(), Some("ts-token"));
        assert_eq!(credentials.resolve("openai").as_deref(), Some("sk-openai"));
        assert_eq!(credentials.resolve("gemini").as_deref(), Some("g-key"));
        assert_eq!(credentials.resolve("qwen").as_deref(), Some("ds-key"));
        assert_eq!(credentials.tushare_token(), Some("ts-token"));
    }

    #[test]
    fn test_resolve_unknown_provider() {
        let credentials = Credentials::from_pairs([(OPENAI_API_KEY, "sk-openai")]);
        assert_eq!(credentials.resolve("unknown"), None);

        let err = credentials
            .lookup(&Provider::parse("unknown"))
            .unwrap_err();
        assert!(matches!(err, DataError::UnsupportedProvider(ref name) if name == "unknown"));
    }

    #[test]
    fn test_empty_value_is_absent() {
        let credentials = Credentials::from_pairs([(TUSHARE_TOKEN, "  "), ("NOT_A_KEY", "x")]);
        assert_eq!(credentials.tushare_token(), None);
        assert_eq!(credentials.lookup(&Provider::Tushare).unwrap(), None);
    }

    #[test]
    fn test_debug_hides_values() {
        let credentials = Credentials::from_pairs([(TUSHARE_TOKEN, "super-secret-token")]);
        let debug = format!("{:?}", credentials);
        assert!(debug.contains(TUSHARE_TOKEN));
        assert!(!debug.contains("super-secret-token"));
    }

    #[test]
    fn test_masked() {
        assert_eq!(masked("abcdefghijkl", 8), "abcdefgh...");
        assert_eq!(masked("abc", 5), "abc...");
    }

    #[test]
    fn test_load_env_file_twice_is_idempotent() {
        let path = temp_env_file(
            "idempotent",
            "STOCK_FETCHER_TEST_IDEMPOTENT=from-file\n",
        );

        load_env_file_from(&path).unwrap();
        let first = std::env::var("STOCK_FETCHER_TEST_IDEMPOTENT").ok();
        load_env_file_from(&path).unwrap();
        let second = std::env::var("STOCK_FETCHER_TEST_IDEMPOTENT").ok();

        assert_eq!(first.as_deref(), Some("from-file"));
        assert_eq!(first, second);

        let _ = fs::remove_file(path);
    }

    #[test]
    fn test_load_env_file_does_not_override() {
        std::env::set_var("STOCK_FETCHER_TEST_OVERRIDE", "from-process");
        let path = temp_env_file(
            "override",
            "STOCK_FETCHER_TEST_OVERRIDE=from-file\n",
        );

        load_env_file_from(&path).unwrap();
        assert_eq!(
            std::env::var("STOCK_FETCHER_TEST_OVERRIDE").unwrap(),
            "from-process"
        );

        let _ = fs::remove_file(path);
    }

    #[test]
    fn test_load_env_file_once_per_process() {
        let first = load_env_file();
        let second = load_env_file();
        assert_eq!(first, second);
    }
}
