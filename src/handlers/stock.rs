//! 股票接口处理器
//!
//! ## API 列表
//! - GET /stocks/{ticker}/history?period=1y - 获取历史日K线（A股前复权）
//! - GET /stocks/{ticker}/market - 识别代码所属市场

use actix_web::{http::StatusCode, web, HttpResponse, Result};

use crate::error::DataError;
use crate::models::{ApiResponse, MarketInfo, Period, PriceTable, StockHistoryQuery};
use crate::services::stock::StockDataFetcher;

fn error_status(e: &DataError) -> StatusCode {
    match e {
        DataError::NoDataFound(_) => StatusCode::NOT_FOUND,
        DataError::CredentialMissing(_) => StatusCode::SERVICE_UNAVAILABLE,
        DataError::ProviderError(_) => StatusCode::BAD_GATEWAY,
        DataError::UnsupportedProvider(_) => StatusCode::BAD_REQUEST,
    }
}

/// 获取历史日K线
///
/// GET /api/v1/stocks/{ticker}/history
///
/// # 参数
/// - ticker: 股票代码（如 600519、000001.SZ、AAPL）
/// - period: 1d, 5d, 1mo, 3mo, 6mo, 1y, 2y, 5y, 10y, ytd, max（默认 1y）
pub async fn get_stock_history(
    fetcher: web::Data<StockDataFetcher>,
    path: web::Path<String>,
    query: web::Query<StockHistoryQuery>,
) -> Result<HttpResponse> {
    let ticker = path.into_inner();

    let period = match query.period.as_deref() {
        Some(raw) => match raw.parse::<Period>() {
            Ok(period) => period,
            Err(e) => {
                let response = ApiResponse::<PriceTable>::invalid_period(&e);
                return Ok(HttpResponse::BadRequest().json(response));
            }
        },
        None => Period::default(),
    };

    match fetcher.fetch(&ticker, period).await {
        Ok(table) => Ok(HttpResponse::Ok().json(ApiResponse::success(table))),
        Err(e) => {
            let response = ApiResponse::<PriceTable>::from_error(&e);
            Ok(HttpResponse::build(error_status(&e)).json(response))
        }
    }
}

/// 识别代码所属市场
///
/// GET /api/v1/stocks/{ticker}/market
pub async fn get_market_info(
    fetcher: web::Data<StockDataFetcher>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let info: MarketInfo = fetcher.market_info(&path.into_inner());
    Ok(HttpResponse::Ok().json(ApiResponse::success(info)))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/stocks")
            .route("/{ticker}/history", web::get().to(get_stock_history))
            .route("/{ticker}/market", web::get().to(get_market_info))
    );
}
