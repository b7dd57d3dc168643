//! 股票行情后端服务
//!
//! 提供A股和国际市场历史日K线的 RESTful API 服务
//! 数据来源：Tushare Pro、Yahoo Finance

use actix_web::{middleware::Logger, web, App, HttpServer};
use env_logger::Env;

use stock_fetcher::config::AppConfig;
use stock_fetcher::credentials::{load_env_file, Credentials};
use stock_fetcher::handlers;
use stock_fetcher::services::stock::StockDataFetcher;

/// 应用程序入口
#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // 先读取 .env，RUST_LOG 也可以写在里面
    let credentials = Credentials::from_env();

    let config = AppConfig::load();
    env_logger::init_from_env(Env::default().default_filter_or(config.log.level.as_str()));

    log::info!("启动股票行情服务");
    if let Some(path) = load_env_file() {
        log::info!("已从 {} 加载环境变量", path.display());
    }
    credentials.log_summary();

    // A股客户端在这里创建一次，所有 worker 共享
    let fetcher = web::Data::new(StockDataFetcher::from_config(&config.data, &credentials)?);

    let bind_addr = config.bind_addr();
    log::info!("监听 {}", bind_addr);

    let mut server = HttpServer::new(move || {
        App::new()
            .wrap(Logger::default()) // 添加请求日志中间件
            .app_data(fetcher.clone())
            .configure(handlers::config) // 配置路由
    });
    if config.server.workers > 0 {
        server = server.workers(config.server.workers);
    }

    server.bind(bind_addr)?.run().await?;
    Ok(())
}
