//! # 分层延迟加载示例
//!
//! 演示嵌套的服务容器作用域：根作用域注册仓库 DAO，页面作用域覆盖分页
//! 配置并为 DAO 注册别名。DAO 在第一次被使用时才构造，之后一直复用同一个实例。

mod github_dao;

use clap::Parser;
use di_abstractions::{Constructor, Provider, RawProvider};
use di_common::Token;
use di_composition::{ContainerBuilder, LoggingConfig};
use di_impl::{use_service_as, with_handle_async, with_services_async};
use github_dao::{GithubDao, API_BASE_URL, PAGE_SIZE};
use std::path::PathBuf;
use tracing::{error, info};

/// 命令行参数
#[derive(Parser, Debug)]
#[command(name = "hierarchical-lazy-loading")]
#[command(about = "服务容器分层延迟加载示例")]
struct Args {
    /// 根作用域的容器配置文件 (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// 日志级别
    #[arg(long, default_value = "info")]
    log_level: String,

    /// 使用 JSON 格式输出日志
    #[arg(long)]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut logging = if args.json_logs {
        LoggingConfig::production()
    } else {
        LoggingConfig::development()
    };
    logging.level = parse_log_level(&args.log_level);

    // 根作用域：应用级服务
    let mut builder = ContainerBuilder::new()
        .with_logging(logging)
        .scope_name("app")
        .provide_value(Token::named(API_BASE_URL), String::from("https://api.github.com"))
        .provide_value(Token::named(PAGE_SIZE), 3_usize)
        .provide_class(Constructor::of::<GithubDao>());
    if let Some(path) = &args.config {
        builder = builder.load_config_toml(path)?;
    }
    let root = builder.build_handle()?;
    info!("启动分层延迟加载示例");

    // 页面作用域：覆盖分页大小，并为 DAO 注册别名
    let dao_alias = Token::named("repos.dao");
    let page = ContainerBuilder::new()
        .scope_name("app.repos-page")
        .parent(root.clone())
        .provide_value(Token::named(PAGE_SIZE), 2_usize)
        .provide_existing(dao_alias.clone(), Token::of::<GithubDao>())
        .build_handle()?;
    info!("DAO 尚未构造，构造次数: {}", GithubDao::constructions());

    // 组件作用域：模拟页面中的组件连续两次加载仓库列表
    let widgets = vec![RawProvider::from(Provider::value(
        Token::named("repos.title"),
        "Load Repos",
    ))];
    let outcome = with_handle_async(
        page.clone(),
        with_services_async(&widgets, async {
            for attempt in 1..=2 {
                load_repos(attempt).await?;
            }
            anyhow::Ok(())
        }),
    )
    .await?;

    if let Err(e) = outcome {
        error!("加载仓库失败: {}", e);
        return Err(e);
    }

    // 页面作用域与根作用域共享同一个 DAO 实例
    let from_page = page.get_as::<GithubDao>(&dao_alias)?;
    let from_root = root.resolve::<GithubDao>()?;
    info!(
        "DAO 实例共享: {}，构造次数: {}",
        std::sync::Arc::ptr_eq(&from_page, &from_root),
        GithubDao::constructions()
    );

    info!("示例运行完成");
    Ok(())
}

/// 相当于页面中的 Repos 组件
async fn load_repos(attempt: usize) -> anyhow::Result<()> {
    let title = use_service_as::<&'static str>(&Token::named("repos.title"))?;
    let dao = use_service_as::<GithubDao>(&Token::named("repos.dao"))?;
    let page_size = use_service_as::<usize>(&Token::named(PAGE_SIZE))?;

    info!("[{}] 第 {} 次加载...", title, attempt);
    let repos = dao.list_repos(*page_size).await?;
    for repo in &repos {
        info!("  #{} {} ({})", repo.id, repo.name, repo.link);
    }
    Ok(())
}

/// 解析日志级别
fn parse_log_level(level: &str) -> tracing::Level {
    match level.to_lowercase().as_str() {
        "trace" => tracing::Level::TRACE,
        "debug" => tracing::Level::DEBUG,
        "warn" => tracing::Level::WARN,
        "error" => tracing::Level::ERROR,
        _ => tracing::Level::INFO,
    }
}
