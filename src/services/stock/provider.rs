//! 行情数据源抽象
//!
//! A股（Tushare）和国际市场（Yahoo）各有一个实现，测试时可替换为假数据源

use async_trait::async_trait;
use chrono::{Duration, NaiveDate};

use crate::error::DataError;
use crate::models::{Period, PriceRow};

/// 请求的时间窗口
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryWindow {
    /// 由数据源自行解释的时间范围
    Period(Period),
    /// 明确的起止日期（含两端）
    Range { start: NaiveDate, end: NaiveDate },
}

impl HistoryWindow {
    /// 按A股回溯天数把时间范围换算成起止日期
    pub fn date_range(&self, today: NaiveDate) -> (NaiveDate, NaiveDate) {
        match *self {
            HistoryWindow::Period(period) => {
                let start = today - Duration::days(period.domestic_lookback_days());
                (start, today)
            }
            HistoryWindow::Range { start, end } => (start, end),
        }
    }
}

/// 日K线数据源
#[async_trait]
pub trait PriceProvider: Send + Sync {
    /// 数据源名称，用于日志
    fn name(&self) -> &'static str;

    /// 获取日K线，返回顺序由数据源决定
    async fn daily_history(
        &self,
        symbol: &str,
        window: HistoryWindow,
    ) -> Result<Vec<PriceRow>, DataError>;
}
