//! 接口统一响应格式
//!
//! 成功时携带数据，失败时携带错误信息和错误码，时间戳统一为北京时间

use serde::Serialize;

use crate::error::{DataError, UnknownPeriod};
use crate::services::stock::common::get_beijing_time;

/// 统一 API 响应结构
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: String,
    /// 失败时的错误码，如 `no_data_found`、`credential_missing`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<&'static str>,
    /// 北京时间，RFC 3339
    pub timestamp: String,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: "Success".to_string(),
            error_code: None,
            timestamp: get_beijing_time(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: message.into(),
            error_code: None,
            timestamp: get_beijing_time(),
        }
    }

    /// 行情获取失败
    pub fn from_error(e: &DataError) -> Self {
        Self {
            error_code: Some(e.code()),
            ..Self::error(e.to_string())
        }
    }

    /// period 参数无法识别
    pub fn invalid_period(e: &UnknownPeriod) -> Self {
        Self {
            error_code: Some("invalid_period"),
            ..Self::error(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn test_success_omits_error_code() {
        let value = serde_json::to_value(ApiResponse::success(1)).unwrap();
        assert_eq!(value["success"], true);
        assert_eq!(value["data"], 1);
        assert!(value.get("error_code").is_none());
        assert!(value["timestamp"].as_str().unwrap().ends_with("+08:00"));
    }

    #[test]
    fn test_from_error() {
        let response = ApiResponse::<()>::from_error(&DataError::NoDataFound("ZZZZ".into()));
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["success"], false);
        assert_eq!(value["data"], Value::Null);
        assert_eq!(value["error_code"], "no_data_found");
        assert!(value["message"].as_str().unwrap().contains("ZZZZ"));
    }

    #[test]
    fn test_invalid_period() {
        let response = ApiResponse::<()>::invalid_period(&UnknownPeriod("3y".into()));
        assert_eq!(response.error_code, Some("invalid_period"));
        assert!(response.message.contains("3y"));
    }
}
