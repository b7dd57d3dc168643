//! 股票行情服务模块
//!
//! 提供A股（Tushare）和国际市场（Yahoo Finance）的历史日K线

pub mod common;
pub mod fetcher;
pub mod provider;
pub mod ticker;
pub mod tushare;
pub mod yahoo;

#[cfg(test)]
pub(crate) mod testing;

// 重新导出常用类型，保持对外接口一致
pub use fetcher::StockDataFetcher;
pub use provider::{HistoryWindow, PriceProvider};
pub use ticker::{format_domestic_code, is_domestic};
pub use tushare::TushareClient;
pub use yahoo::YahooClient;
