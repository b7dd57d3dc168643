use actix_web::{web, HttpResponse, Result};
use serde::Serialize;

use crate::models::ApiResponse;
use crate::services::stock::StockDataFetcher;

/// 服务状态
#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    /// 是否已配置 Tushare，可获取A股数据
    pub domestic_enabled: bool,
}

pub async fn health_check(fetcher: web::Data<StockDataFetcher>) -> Result<HttpResponse> {
    let response = ApiResponse::success(HealthStatus {
        status: "Service is healthy",
        domestic_enabled: fetcher.has_domestic(),
    });
    Ok(HttpResponse::Ok().json(response))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check));
}
