//! Yahoo Finance 国际市场日线接口实现
//!
//! 对接 https://query1.finance.yahoo.com/v8/finance/chart/<symbol>
//! 默认按复权收盘价调整 OHLC

use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate};
use reqwest::Client;
use serde::Deserialize;
use url::Url;

use super::common::{USER_AGENT, YAHOO_CHART_API};
use super::provider::{HistoryWindow, PriceProvider};
use crate::error::DataError;
use crate::models::PriceRow;

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartEnvelope,
}

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
    #[serde(default)]
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    meta: ChartMeta,
    #[serde(default)]
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Default, Deserialize)]
struct ChartMeta {
    /// 交易所相对 UTC 的偏移（秒）
    #[serde(default)]
    gmtoffset: i64,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<QuoteColumns>,
    #[serde(default)]
    adjclose: Option<Vec<AdjCloseColumn>>,
}

#[derive(Debug, Default, Deserialize)]
struct QuoteColumns {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct AdjCloseColumn {
    #[serde(default)]
    adjclose: Vec<Option<f64>>,
}

fn at(column: &[Option<f64>], idx: usize) -> Option<f64> {
    column.get(idx).copied().flatten()
}

/// Yahoo Finance 客户端
pub struct YahooClient {
    client: Client,
    base_url: String,
    auto_adjust: bool,
}

impl YahooClient {
    pub fn new() -> Self {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_default();
        Self::with_client(client, YAHOO_CHART_API, true)
    }

    pub fn with_client(client: Client, base_url: impl Into<String>, auto_adjust: bool) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            auto_adjust,
        }
    }

    fn chart_url(&self, symbol: &str) -> Result<Url, DataError> {
        let mut url = Url::parse(&self.base_url)?;
        url.path_segments_mut()
            .map_err(|_| DataError::ProviderError(format!("无效的接口地址: {}", self.base_url)))?
            .pop_if_empty()
            .push(symbol);
        Ok(url)
    }

    /// 获取日K线
    pub async fn chart(&self, symbol: &str, window: HistoryWindow) -> Result<Vec<PriceRow>, DataError> {
        let url = self.chart_url(symbol)?;

        let mut params: Vec<(&str, String)> = vec![
            ("interval", "1d".to_string()),
            ("includeAdjustedClose", "true".to_string()),
        ];
        match window {
            HistoryWindow::Period(period) => params.push(("range", period.as_str().to_string())),
            HistoryWindow::Range { start, end } => {
                params.push(("period1", day_start_timestamp(start).to_string()));
                params.push(("period2", day_start_timestamp(end + Duration::days(1)).to_string()));
            }
        }

        log::debug!("📡 请求 Yahoo 日K线 URL: {} 参数: {:?}", url, params);

        let response = self.client.get(url).query(&params).send().await?;
        let status = response.status();
        let text = response.text().await?;

        let parsed: ChartResponse = match serde_json::from_str(&text) {
            Ok(parsed) => parsed,
            Err(e) if status.is_success() => return Err(e.into()),
            Err(_) => return Err(DataError::ProviderError(format!("Yahoo 请求失败: {}", status))),
        };

        // 非 2xx 且没有 chart.error 时按请求失败处理，不能当作无数据
        if !status.is_success() && parsed.chart.error.is_none() {
            return Err(DataError::ProviderError(format!("Yahoo 请求失败: {}", status)));
        }

        parse_chart(parsed, symbol, self.auto_adjust)
    }
}

impl Default for YahooClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PriceProvider for YahooClient {
    fn name(&self) -> &'static str {
        "yahoo"
    }

    async fn daily_history(&self, symbol: &str, window: HistoryWindow) -> Result<Vec<PriceRow>, DataError> {
        self.chart(symbol, window).await
    }
}

fn day_start_timestamp(date: NaiveDate) -> i64 {
    date.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().timestamp())
        .unwrap_or_default()
}

fn parse_chart(parsed: ChartResponse, symbol: &str, auto_adjust: bool) -> Result<Vec<PriceRow>, DataError> {
    if let Some(error) = parsed.chart.error {
        if error.code == "Not Found" {
            return Err(DataError::NoDataFound(symbol.to_string()));
        }
        return Err(DataError::ProviderError(format!(
            "Yahoo 返回错误 [{}]: {}",
            error.code,
            error.description.unwrap_or_default()
        )));
    }

    let result = match parsed.chart.result.and_then(|r| r.into_iter().next()) {
        Some(result) => result,
        None => return Ok(Vec::new()),
    };

    let timestamps = result.timestamp.unwrap_or_default();
    let quote = result.indicators.quote.into_iter().next().unwrap_or_default();
    let adjclose = result
        .indicators
        .adjclose
        .and_then(|a| a.into_iter().next())
        .map(|a| a.adjclose)
        .unwrap_or_default();

    let mut rows = Vec::with_capacity(timestamps.len());
    for (idx, ts) in timestamps.iter().enumerate() {
        let (open, high, low, close) = match (
            at(&quote.open, idx),
            at(&quote.high, idx),
            at(&quote.low, idx),
            at(&quote.close, idx),
        ) {
            (Some(o), Some(h), Some(l), Some(c)) => (o, h, l, c),
            _ => continue,
        };

        let date = ts
            .checked_add(result.meta.gmtoffset)
            .and_then(|local| DateTime::from_timestamp(local, 0))
            .map(|dt| dt.date_naive())
            .ok_or_else(|| DataError::ProviderError(format!("无效的时间戳: {}", ts)))?;

        let ratio = match at(&adjclose, idx) {
            Some(adj) if auto_adjust && close != 0.0 => adj / close,
            _ => 1.0,
        };

        rows.push(PriceRow {
            date,
            open: open * ratio,
            high: high * ratio,
            low: low * ratio,
            close: close * ratio,
            volume: at(&quote.volume, idx).unwrap_or(0.0),
        });
    }

    Ok(rows)
}
