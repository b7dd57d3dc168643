//! 错误类型定义
//!
//! 行情获取链路上的所有失败都收敛到 [`DataError`]，不向调用方抛出 panic

use thiserror::Error;

/// 数据获取错误
#[derive(Debug, Error)]
pub enum DataError {
    /// 必需的密钥未配置
    #[error("未配置 {0}，无法获取A股数据")]
    CredentialMissing(&'static str),

    /// 数据源可达，但没有返回任何行情
    #[error("未能获取到 '{0}' 的数据，可能是代码错误或区间内无交易")]
    NoDataFound(String),

    /// 网络请求失败或响应格式异常
    #[error("数据源请求失败: {0}")]
    ProviderError(String),

    /// 不支持的提供商名称
    #[error("不支持的提供商 '{0}'")]
    UnsupportedProvider(String),
}

impl DataError {
    /// 接口响应中的错误码
    pub fn code(&self) -> &'static str {
        match self {
            DataError::CredentialMissing(_) => "credential_missing",
            DataError::NoDataFound(_) => "no_data_found",
            DataError::ProviderError(_) => "provider_error",
            DataError::UnsupportedProvider(_) => "unsupported_provider",
        }
    }
}

impl From<reqwest::Error> for DataError {
    fn from(e: reqwest::Error) -> Self {
        DataError::ProviderError(e.to_string())
    }
}

impl From<serde_json::Error> for DataError {
    fn from(e: serde_json::Error) -> Self {
        DataError::ProviderError(format!("解析JSON失败: {}", e))
    }
}

impl From<url::ParseError> for DataError {
    fn from(e: url::ParseError) -> Self {
        DataError::ProviderError(format!("无效的URL: {}", e))
    }
}

/// 无法识别的时间范围参数
#[derive(Debug, Error, PartialEq, Eq)]
#[error("不支持的时间范围 '{0}'，可选值: 1d, 5d, 1mo, 3mo, 6mo, 1y, 2y, 5y, 10y, ytd, max")]
pub struct UnknownPeriod(pub String);
