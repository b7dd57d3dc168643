//! 股票代码识别
//!
//! 判断代码属于A股还是国际市场，并转换为 Tushare 所需的 `ts_code` 格式

/// 去掉 `.` 之后的交易所后缀
fn strip_suffix(ticker: &str) -> &str {
    ticker.split('.').next().unwrap_or(ticker)
}

/// 是否为A股代码
///
/// 满足任一条件即视为A股：
/// - 去掉后缀后是 6 位纯数字
/// - 以 `.SS` 或 `.SZ` 结尾（不区分大小写）
pub fn is_domestic(ticker: &str) -> bool {
    let code = strip_suffix(ticker);
    if code.len() == 6 && code.chars().all(|c| c.is_ascii_digit()) {
        return true;
    }

    let upper = ticker.to_uppercase();
    upper.ends_with(".SS") || upper.ends_with(".SZ")
}

/// 转换为 Tushare 代码格式，例如 `600519` -> `600519.SH`
///
/// 6 开头归上交所，其余一律归深交所（00、30、02 开头）
pub fn format_domestic_code(ticker: &str) -> String {
    let code = strip_suffix(ticker);
    if code.starts_with('6') {
        format!("{}.SH", code)
    } else {
        // TODO: 北交所（4/8/9 开头）目前也会落到 .SZ，需要单独的 .BJ 分支
        format!("{}.SZ", code)
    }
}
