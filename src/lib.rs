//! 股票历史行情获取
//!
//! 自动识别A股 / 国际市场代码，分别从 Tushare Pro 和 Yahoo Finance 获取日K线，
//! 归一化为按日期升序的 OHLCV 表。
//!
//! ```rust,no_run
//! use stock_fetcher::config::AppConfig;
//! use stock_fetcher::credentials::Credentials;
//! use stock_fetcher::models::Period;
//! use stock_fetcher::services::stock::StockDataFetcher;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let config = AppConfig::load();
//! let fetcher = StockDataFetcher::from_config(&config.data, &Credentials::from_env())?;
//! let table = fetcher.fetch("600519", Period::OneYear).await?;
//! println!("{} 条记录", table.len());
//! # Ok(())
//! # }
//! ```

pub mod config;      // 配置
pub mod credentials; // 密钥管理
pub mod error;       // 错误类型
pub mod handlers;    // HTTP 请求处理器
pub mod models;      // 数据模型定义
pub mod services;    // 业务逻辑服务

pub use error::DataError;
