//! # matagg - Materials Project 查询与报告工具
//!
//! 向 Materials Project summary API 发起参数化查询（元素集合、性质阈值、
//! 稳定性），把 JSON 响应整理为表格记录，并输出终端表格、文本报告、
//! CSV 文件和散点图。
//!
//! ## 子命令
//! - `search`  - 按元素集合检索，可过滤、排序、导出
//! - `stable`  - 稳定材料（energy above hull 阈值）
//! - `compare` - 多个材料并排对比
//! - `summary` - 单个材料分组摘要
//! - `trend`   - 两个性质的相关性与趋势线
//!
//! ## 依赖关系
//! ```text
//! main.rs
//!   ├── cli/        (命令行参数定义)
//!   ├── commands/   (命令执行逻辑)
//!   │     ├── client/    (外部数据源)
//!   │     ├── analysis/  (过滤、报告、相关性)
//!   │     ├── export/    (CSV 与绘图)
//!   │     └── models/    (数据模型)
//!   ├── config.rs   (配置与凭据)
//!   ├── utils/      (工具函数)
//!   └── error.rs    (错误处理)
//! ```

mod analysis;
mod cli;
mod client;
mod commands;
mod config;
mod error;
mod export;
mod models;
mod utils;

use clap::Parser;
use cli::Cli;
use tracing::Level;
use tracing_subscriber::EnvFilter;

fn main() {
    // Initialize colored output for Windows compatibility
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = commands::Context::load(cli.api_key, cli.config.as_deref())
        .and_then(|ctx| commands::run(cli.command, &ctx));

    if let Err(e) = result {
        tracing::debug!(kind = e.kind(), "Command failed");
        utils::output::print_error(&e.user_message());
        std::process::exit(1);
    }
}

/// 日志写到 stderr；默认 warn，`-v` 为 debug，`RUST_LOG` 优先
fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("matagg={}", level)));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .finish();

    // 已有全局 subscriber 时忽略
    let _ = tracing::subscriber::set_global_default(subscriber);
}
