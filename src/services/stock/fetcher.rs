//! 股票历史行情获取
//!
//! 自动识别A股/国际代码并分发到对应数据源，结果统一为升序的 OHLCV 表

use anyhow::Context;
use chrono::{Duration, NaiveDate};
use reqwest::Client;

use super::common::{beijing_today, USER_AGENT};
use super::provider::{HistoryWindow, PriceProvider};
use super::ticker::{format_domestic_code, is_domestic};
use super::tushare::TushareClient;
use super::yahoo::YahooClient;
use crate::config::DataSourceConfig;
use crate::credentials::{Credentials, TUSHARE_TOKEN};
use crate::error::DataError;
use crate::models::{MarketInfo, Period, PriceTable};

/// 行情获取服务
///
/// A股数据源只在启动时根据 Token 创建一次，未配置 Token 时所有A股请求直接失败
pub struct StockDataFetcher {
    domestic: Option<Box<dyn PriceProvider>>,
    international: Box<dyn PriceProvider>,
    today: fn() -> NaiveDate,
}

impl StockDataFetcher {
    pub fn new(domestic: Option<Box<dyn PriceProvider>>, international: Box<dyn PriceProvider>) -> Self {
        Self {
            domestic,
            international,
            today: beijing_today,
        }
    }

    /// 按配置和密钥创建 Tushare / Yahoo 客户端
    pub fn from_config(config: &DataSourceConfig, credentials: &Credentials) -> anyhow::Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .connect_timeout(std::time::Duration::from_secs(config.connect_timeout_secs))
            .gzip(true)
            .build()
            .context("创建 HTTP 客户端失败")?;

        let domestic: Option<Box<dyn PriceProvider>> = match credentials.tushare_token() {
            Some(token) => Some(Box::new(TushareClient::with_client(
                client.clone(),
                config.tushare_url.clone(),
                token,
            )) as Box<dyn PriceProvider>),
            None => {
                log::warn!("⚠️ 未配置 {}，无法获取A股数据", TUSHARE_TOKEN);
                None
            }
        };

        let international = Box::new(YahooClient::with_client(
            client,
            config.yahoo_url.clone(),
            config.auto_adjust,
        ));

        Ok(Self::new(domestic, international))
    }

    /// 替换“今天”的来源，A股时间窗口以此为结束日期
    pub fn with_today(mut self, today: fn() -> NaiveDate) -> Self {
        self.today = today;
        self
    }

    /// 是否可以获取A股数据
    pub fn has_domestic(&self) -> bool {
        self.domestic.is_some()
    }

    /// 代码识别结果
    pub fn market_info(&self, ticker: &str) -> MarketInfo {
        let domestic = is_domestic(ticker);
        MarketInfo {
            ticker: ticker.to_string(),
            domestic,
            ts_code: domestic.then(|| format_domestic_code(ticker)),
        }
    }

    /// 获取历史日K线
    ///
    /// - A股: 如 `600519`、`000001.SZ`，前复权
    /// - 国际: 如 `AAPL`、`GOOG`
    pub async fn fetch(&self, ticker: &str, period: Period) -> Result<PriceTable, DataError> {
        log::info!("正在为 '{}' 获取数据 (period={})...", ticker, period);

        let result = if is_domestic(ticker) {
            self.fetch_domestic(ticker, period).await
        } else {
            self.fetch_international(ticker, period).await
        };

        match &result {
            Ok(table) => log::info!("成功获取 '{}' 的数据，共 {} 条记录", ticker, table.len()),
            Err(e) => log::error!("获取 '{}' 数据失败: {}", ticker, e),
        }

        result
    }

    async fn fetch_domestic(&self, ticker: &str, period: Period) -> Result<PriceTable, DataError> {
        let provider = self
            .domestic
            .as_ref()
            .ok_or(DataError::CredentialMissing(TUSHARE_TOKEN))?;

        let end = (self.today)();
        let start = end - Duration::days(period.domestic_lookback_days());
        let window = HistoryWindow::Range { start, end };

        log::debug!(
            "📡 {} 请求 {} 前复权日线 {} ~ {}",
            provider.name(),
            format_domestic_code(ticker),
            start,
            end
        );

        let rows = provider.daily_history(ticker, window).await?;
        if rows.is_empty() {
            return Err(DataError::NoDataFound(ticker.to_string()));
        }

        // 数据源按日期降序返回，这里统一为升序
        Ok(PriceTable::new(ticker, rows))
    }

    async fn fetch_international(&self, ticker: &str, period: Period) -> Result<PriceTable, DataError> {
        log::debug!("📡 {} 请求 {} 日线 range={}", self.international.name(), ticker, period);

        let rows = self
            .international
            .daily_history(ticker, HistoryWindow::Period(period))
            .await?;
        if rows.is_empty() {
            return Err(DataError::NoDataFound(ticker.to_string()));
        }

        Ok(PriceTable::new(ticker, rows))
    }
}
