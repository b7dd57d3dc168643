//! 公共常量和辅助函数

use chrono::{NaiveDate, Utc};
use chrono_tz::Asia::Shanghai;

// ==================== 数据源 API 常量 ====================

/// Tushare Pro HTTP 接口
pub const TUSHARE_API_URL: &str = "http://api.tushare.pro";
/// Yahoo Finance 日K线接口
pub const YAHOO_CHART_API: &str = "https://query1.finance.yahoo.com/v8/finance/chart";
/// 请求使用的浏览器标识
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// 获取北京时间字符串（ISO 8601 格式，带+08:00时区）
pub fn get_beijing_time() -> String {
    Utc::now().with_timezone(&Shanghai).to_rfc3339()
}

/// 北京时间的当前日期
pub fn beijing_today() -> NaiveDate {
    Utc::now().with_timezone(&Shanghai).date_naive()
}

/// 保留两位小数
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
