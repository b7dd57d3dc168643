//! Tushare Pro A股日线接口实现
//!
//! 对接 http://api.tushare.pro ，按 pro_bar 的方式组合 `daily` 和 `adj_factor`
//! 两个接口得到前复权（qfq）日K线

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};

use super::common::{round2, TUSHARE_API_URL};
use super::provider::{HistoryWindow, PriceProvider};
use super::ticker::format_domestic_code;
use crate::error::DataError;
use crate::models::PriceRow;

/// Tushare 日期格式
const TRADE_DATE_FORMAT: &str = "%Y%m%d";

/// Tushare 返回的原始日线，列名保持接口原样
#[derive(Debug, Clone, PartialEq)]
pub struct TushareBar {
    pub trade_date: String,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub vol: f64,
}

/// 接口响应外层结构
#[derive(Debug, Deserialize)]
struct TushareResponse {
    code: i64,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    data: Option<TushareFrame>,
}

/// 表格形式的数据：列名 + 行
#[derive(Debug, Default, Deserialize)]
struct TushareFrame {
    #[serde(default)]
    fields: Vec<String>,
    #[serde(default)]
    items: Vec<Vec<Value>>,
}

impl TushareFrame {
    fn column(&self, name: &str) -> Result<usize, DataError> {
        self.fields
            .iter()
            .position(|f| f == name)
            .ok_or_else(|| DataError::ProviderError(format!("Tushare 响应缺少列 '{}'", name)))
    }
}

fn cell_str(row: &[Value], idx: usize, column: &str) -> Result<String, DataError> {
    match row.get(idx) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        other => Err(DataError::ProviderError(format!(
            "列 '{}' 的值无效: {:?}",
            column, other
        ))),
    }
}

fn cell_f64(row: &[Value], idx: usize, column: &str) -> Result<f64, DataError> {
    cell_opt_f64(row, idx, column)?.ok_or_else(|| {
        DataError::ProviderError(format!("列 '{}' 的值无效: {:?}", column, row.get(idx)))
    })
}

/// `null` 视为缺失，其余无法解析的值仍然报错
fn cell_opt_f64(row: &[Value], idx: usize, column: &str) -> Result<Option<f64>, DataError> {
    let value = match row.get(idx) {
        Some(Value::Null) => return Ok(None),
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.parse::<f64>().ok(),
        _ => None,
    };
    value.map(Some).ok_or_else(|| {
        DataError::ProviderError(format!("列 '{}' 的值无效: {:?}", column, row.get(idx)))
    })
}

/// Tushare Pro 客户端
///
/// 进程内只创建一次，Token 缺失时不创建
pub struct TushareClient {
    client: Client,
    base_url: String,
    token: String,
}

impl TushareClient {
    pub fn new(token: impl Into<String>) -> Self {
        Self::with_client(Client::new(), TUSHARE_API_URL, token)
    }

    pub fn with_client(client: Client, base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            token: token.into(),
        }
    }

    /// 调用 Tushare HTTP 接口
    async fn query(&self, api_name: &str, params: Value, fields: &str) -> Result<TushareFrame, DataError> {
        log::debug!("📡 请求 Tushare 接口 {} 参数: {}", api_name, params);

        let body = json!({
            "api_name": api_name,
            "token": self.token,
            "params": params,
            "fields": fields,
        });

        let response = self.client.post(&self.base_url).json(&body).send().await?;

        if !response.status().is_success() {
            return Err(DataError::ProviderError(format!(
                "Tushare 接口 {} 请求失败: {}",
                api_name,
                response.status()
            )));
        }

        let text = response.text().await?;
        let parsed: TushareResponse = serde_json::from_str(&text)?;

        if parsed.code != 0 {
            return Err(DataError::ProviderError(format!(
                "Tushare 接口 {} 返回错误 {}: {}",
                api_name,
                parsed.code,
                parsed.msg.unwrap_or_default()
            )));
        }

        let frame = parsed.data.unwrap_or_default();
        log::debug!("📈 Tushare 接口 {} 返回 {} 行", api_name, frame.items.len());
        Ok(frame)
    }

    /// 未复权日线
    pub async fn daily(&self, ts_code: &str, start: NaiveDate, end: NaiveDate) -> Result<Vec<TushareBar>, DataError> {
        let frame = self
            .query(
                "daily",
                json!({
                    "ts_code": ts_code,
                    "start_date": start.format(TRADE_DATE_FORMAT).to_string(),
                    "end_date": end.format(TRADE_DATE_FORMAT).to_string(),
                }),
                "ts_code,trade_date,open,high,low,close,vol",
            )
            .await?;

        parse_daily_frame(&frame)
    }

    /// 复权因子，按交易日索引
    pub async fn adj_factor(
        &self,
        ts_code: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<BTreeMap<String, f64>, DataError> {
        let frame = self
            .query(
                "adj_factor",
                json!({
                    "ts_code": ts_code,
                    "start_date": start.format(TRADE_DATE_FORMAT).to_string(),
                    "end_date": end.format(TRADE_DATE_FORMAT).to_string(),
                }),
                "ts_code,trade_date,adj_factor",
            )
            .await?;

        let date_idx = frame.column("trade_date")?;
        let factor_idx = frame.column("adj_factor")?;

        frame
            .items
            .iter()
            .map(|row| {
                Ok((
                    cell_str(row, date_idx, "trade_date")?,
                    cell_f64(row, factor_idx, "adj_factor")?,
                ))
            })
            .collect()
    }

    /// 前复权日线
    pub async fn forward_adjusted(
        &self,
        ts_code: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<TushareBar>, DataError> {
        let bars = self.daily(ts_code, start, end).await?;
        if bars.is_empty() {
            return Ok(bars);
        }

        let factors = self.adj_factor(ts_code, start, end).await?;
        Ok(apply_forward_adjustment(bars, &factors))
    }
}

#[async_trait]
impl PriceProvider for TushareClient {
    fn name(&self) -> &'static str {
        "tushare"
    }

    async fn daily_history(&self, symbol: &str, window: HistoryWindow) -> Result<Vec<PriceRow>, DataError> {
        let ts_code = format_domestic_code(symbol);
        let (start, end) = window.date_range(super::common::beijing_today());
        let bars = self.forward_adjusted(&ts_code, start, end).await?;
        normalize_bars(bars)
    }
}

fn parse_daily_frame(frame: &TushareFrame) -> Result<Vec<TushareBar>, DataError> {
    let date_idx = frame.column("trade_date")?;
    let open_idx = frame.column("open")?;
    let high_idx = frame.column("high")?;
    let low_idx = frame.column("low")?;
    let close_idx = frame.column("close")?;
    let vol_idx = frame.column("vol")?;

    let mut bars = Vec::with_capacity(frame.items.len());
    for row in &frame.items {
        let trade_date = cell_str(row, date_idx, "trade_date")?;
        let prices = (
            cell_opt_f64(row, open_idx, "open")?,
            cell_opt_f64(row, high_idx, "high")?,
            cell_opt_f64(row, low_idx, "low")?,
            cell_opt_f64(row, close_idx, "close")?,
        );
        let (open, high, low, close) = match prices {
            (Some(o), Some(h), Some(l), Some(c)) => (o, h, l, c),
            _ => {
                log::warn!("⚠️ {} 价格缺失，跳过该行", trade_date);
                continue;
            }
        };

        bars.push(TushareBar {
            trade_date,
            open,
            high,
            low,
            close,
            vol: cell_opt_f64(row, vol_idx, "vol")?.unwrap_or(0.0),
        });
    }

    Ok(bars)
}

/// 前复权：价格 × 当日因子 / 最新因子，保留两位小数
///
/// 缺少因子的交易日沿用更早一天的因子，最早一段缺失时取之后最近的因子。
/// 成交量不复权。
pub fn apply_forward_adjustment(mut bars: Vec<TushareBar>, factors: &BTreeMap<String, f64>) -> Vec<TushareBar> {
    let latest = match factors.values().next_back() {
        Some(latest) if *latest != 0.0 => *latest,
        _ => {
            log::warn!("⚠️ 未获取到复权因子，返回未复权数据");
            return bars;
        }
    };

    for bar in bars.iter_mut() {
        let factor = factors
            .range(..=bar.trade_date.clone())
            .next_back()
            .or_else(|| factors.range(bar.trade_date.clone()..).next())
            .map(|(_, f)| *f)
            .unwrap_or(latest);

        let scale = factor / latest;
        bar.open = round2(bar.open * scale);
        bar.high = round2(bar.high * scale);
        bar.low = round2(bar.low * scale);
        bar.close = round2(bar.close * scale);
    }

    bars
}

/// 转换为统一列名，解析 YYYYMMDD 日期
pub fn normalize_bars(bars: Vec<TushareBar>) -> Result<Vec<PriceRow>, DataError> {
    bars.into_iter()
        .map(|bar| {
            let date = NaiveDate::parse_from_str(&bar.trade_date, TRADE_DATE_FORMAT).map_err(|e| {
                DataError::ProviderError(format!("无法解析交易日期 '{}': {}", bar.trade_date, e))
            })?;
            Ok(PriceRow {
                date,
                open: bar.open,
                high: bar.high,
                low: bar.low,
                close: bar.close,
                volume: bar.vol,
            })
        })
        .collect()
}
