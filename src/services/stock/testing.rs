//! 测试用假数据源

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::NaiveDate;

use super::provider::{HistoryWindow, PriceProvider};
use crate::error::DataError;
use crate::models::PriceRow;

pub type Calls = Arc<Mutex<Vec<(String, HistoryWindow)>>>;

/// 返回固定数据的假数据源，记录每次调用
pub struct FakeProvider {
    rows: Vec<PriceRow>,
    error: Option<fn() -> DataError>,
    calls: Calls,
}

impl FakeProvider {
    pub fn with_rows(rows: Vec<PriceRow>) -> (Self, Calls) {
        let calls = Calls::default();
        (
            Self {
                rows,
                error: None,
                calls: calls.clone(),
            },
            calls,
        )
    }

    pub fn failing(error: fn() -> DataError) -> Self {
        Self {
            rows: Vec::new(),
            error: Some(error),
            calls: Calls::default(),
        }
    }

    pub fn boxed_empty() -> Box<dyn PriceProvider> {
        Box::new(Self::with_rows(Vec::new()).0)
    }
}

#[async_trait]
impl PriceProvider for FakeProvider {
    fn name(&self) -> &'static str {
        "fake"
    }

    async fn daily_history(&self, symbol: &str, window: HistoryWindow) -> Result<Vec<PriceRow>, DataError> {
        self.calls.lock().unwrap().push((symbol.to_string(), window));
        match self.error {
            Some(make) => Err(make()),
            None => Ok(self.rows.clone()),
        }
    }
}

pub fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn row(date: NaiveDate, close: f64) -> PriceRow {
    PriceRow {
        date,
        open: close - 1.0,
        high: close + 1.0,
        low: close - 2.0,
        close,
        volume: 1000.0,
    }
}

/// 与 Tushare 一样按日期降序排列
pub fn descending_rows() -> Vec<PriceRow> {
    vec![
        row(day(2024, 6, 28), 1690.0),
        row(day(2024, 6, 27), 1680.0),
        row(day(2024, 6, 26), 1670.0),
        row(day(2024, 6, 25), 1660.0),
    ]
}
