//! 股票行情数据模型
//!
//! 定义统一的日K线（OHLCV）表结构，两个数据源的结果都归一化到这里

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::UnknownPeriod;

/// 行情表的数值列，顺序固定
pub const PRICE_COLUMNS: [&str; 5] = ["Open", "High", "Low", "Close", "Volume"];

/// 历史数据时间范围
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Period {
    #[serde(rename = "1d")]
    OneDay,
    #[serde(rename = "5d")]
    FiveDays,
    #[serde(rename = "1mo")]
    OneMonth,
    #[serde(rename = "3mo")]
    ThreeMonths,
    #[serde(rename = "6mo")]
    SixMonths,
    #[default]
    #[serde(rename = "1y")]
    OneYear,
    #[serde(rename = "2y")]
    TwoYears,
    #[serde(rename = "5y")]
    FiveYears,
    #[serde(rename = "10y")]
    TenYears,
    #[serde(rename = "ytd")]
    YearToDate,
    #[serde(rename = "max")]
    Max,
}

impl Period {
    pub const ALL: [Period; 11] = [
        Period::OneDay,
        Period::FiveDays,
        Period::OneMonth,
        Period::ThreeMonths,
        Period::SixMonths,
        Period::OneYear,
        Period::TwoYears,
        Period::FiveYears,
        Period::TenYears,
        Period::YearToDate,
        Period::Max,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Period::OneDay => "1d",
            Period::FiveDays => "5d",
            Period::OneMonth => "1mo",
            Period::ThreeMonths => "3mo",
            Period::SixMonths => "6mo",
            Period::OneYear => "1y",
            Period::TwoYears => "2y",
            Period::FiveYears => "5y",
            Period::TenYears => "10y",
            Period::YearToDate => "ytd",
            Period::Max => "max",
        }
    }

    /// A股数据回溯天数
    ///
    /// 只区分 1y/2y/5y/10y/max，其余（包括 1d、5d、ytd 等短周期）一律按 365 天
    pub fn domestic_lookback_days(&self) -> i64 {
        match self {
            Period::OneYear => 365,
            Period::TwoYears => 730,
            Period::FiveYears => 1825,
            Period::TenYears => 3650,
            Period::Max => 7300,
            _ => 365,
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Period {
    type Err = UnknownPeriod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        Period::ALL
            .iter()
            .copied()
            .find(|p| p.as_str() == lower)
            .ok_or_else(|| UnknownPeriod(s.to_string()))
    }
}

/// 单日K线
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRow {
    /// 交易日期
    #[serde(rename = "Date")]
    pub date: NaiveDate,
    /// 开盘价
    #[serde(rename = "Open")]
    pub open: f64,
    /// 最高价
    #[serde(rename = "High")]
    pub high: f64,
    /// 最低价
    #[serde(rename = "Low")]
    pub low: f64,
    /// 收盘价
    #[serde(rename = "Close")]
    pub close: f64,
    /// 成交量（A股单位为手，美股为股）
    #[serde(rename = "Volume")]
    pub volume: f64,
}

/// 单只股票的历史行情表
///
/// 构造时按日期升序排列，同一日期只保留最后一条
#[derive(Debug, Clone, Serialize)]
pub struct PriceTable {
    ticker: String,
    rows: Vec<PriceRow>,
}

impl PriceTable {
    pub fn new(ticker: impl Into<String>, mut rows: Vec<PriceRow>) -> Self {
        rows.sort_by_key(|r| r.date);
        rows.reverse();
        rows.dedup_by_key(|r| r.date);
        rows.reverse();

        Self {
            ticker: ticker.into(),
            rows,
        }
    }

    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    pub fn rows(&self) -> &[PriceRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.rows.first().map(|r| r.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.rows.last().map(|r| r.date)
    }

    /// 收盘价序列
    pub fn closes(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.close).collect()
    }

    pub fn into_rows(self) -> Vec<PriceRow> {
        self.rows
    }
}

/// 历史行情查询参数
#[derive(Debug, Deserialize)]
pub struct StockHistoryQuery {
    /// 时间范围，默认 1y
    pub period: Option<String>,
}

/// 代码识别结果
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct MarketInfo {
    /// 原始代码
    pub ticker: String,
    /// 是否A股
    pub domestic: bool,
    /// Tushare 格式代码（仅A股）
    pub ts_code: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(date: &str, close: f64) -> PriceRow {
        PriceRow {
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            open: close,
            high: close,
            low: close,
            close,
            volume: 100.0,
        }
    }

    #[test]
    fn test_period_parse() {
        for period in Period::ALL {
            assert_eq!(period.as_str().parse::<Period>().unwrap(), period);
        }
        assert_eq!("1Y".parse::<Period>().unwrap(), Period::OneYear);
        assert_eq!(
            "3y".parse::<Period>(),
            Err(UnknownPeriod("3y".to_string()))
        );
        assert_eq!(Period::default(), Period::OneYear);
    }

    #[test]
    fn test_domestic_lookback_days() {
        assert_eq!(Period::OneYear.domestic_lookback_days(), 365);
        assert_eq!(Period::TwoYears.domestic_lookback_days(), 730);
        assert_eq!(Period::FiveYears.domestic_lookback_days(), 1825);
        assert_eq!(Period::TenYears.domestic_lookback_days(), 3650);
        assert_eq!(Period::Max.domestic_lookback_days(), 7300);

        for short in [
            Period::OneDay,
            Period::FiveDays,
            Period::OneMonth,
            Period::ThreeMonths,
            Period::SixMonths,
            Period::YearToDate,
        ] {
            assert_eq!(short.domestic_lookback_days(), 365, "{}", short);
        }
    }

    #[test]
    fn test_table_sorted_ascending() {
        let table = PriceTable::new(
            "600519",
            vec![
                row("2024-01-04", 3.0),
                row("2024-01-03", 2.0),
                row("2024-01-02", 1.0),
            ],
        );

        let dates: Vec<_> = table.rows().iter().map(|r| r.date).collect();
        assert!(dates.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(table.closes(), vec![1.0, 2.0, 3.0]);
        assert_eq!(table.first_date(), Some(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()));
    }

    #[test]
    fn test_table_keeps_last_duplicate() {
        let table = PriceTable::new(
            "AAPL",
            vec![row("2024-01-02", 1.0), row("2024-01-03", 2.0), row("2024-01-03", 2.5)],
        );

        assert_eq!(table.len(), 2);
        assert_eq!(table.closes(), vec![1.0, 2.5]);
    }

    #[test]
    fn test_row_serializes_canonical_columns() {
        let value = serde_json::to_value(row("2024-01-02", 10.5)).unwrap();
        let obj = value.as_object().unwrap();

        assert_eq!(obj["Date"], "2024-01-02");
        for column in PRICE_COLUMNS {
            assert!(obj.contains_key(column), "缺少列 {}", column);
        }
        assert_eq!(obj.len(), PRICE_COLUMNS.len() + 1);
    }
}
