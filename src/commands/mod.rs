//! # 命令执行模块
//!
//! 实现各子命令的业务逻辑。每个子命令先完成全部输入校验，
//! 再解析凭据，最后才发起（至多一次）网络查询。
//!
//! ## 依赖关系
//! - 被 `main.rs` 调用
//! - 使用 `cli/`, `config.rs`, `client/`, `analysis/`, `export/`, `utils/`
//! - 子模块: search, stable, compare, summary, trend

pub mod compare;
pub mod search;
pub mod stable;
pub mod summary;
pub mod trend;

use crate::analysis::report::ComparisonTable;
use crate::cli::Commands;
use crate::config::{discover_dotenv_key, Config, DefaultsConfig, Settings, FALLBACK_KEY_ENV};
use crate::error::Result;
use crate::export;
use crate::models::ResultSet;
use crate::utils::output;

use std::path::{Path, PathBuf};
use tracing::debug;

/// 命令执行上下文：各来源的凭据与已加载的配置
pub struct Context {
    api_key: Option<String>,
    fallback_key: Option<String>,
    dotenv_key: Option<String>,
    config: Config,
}

impl Context {
    /// 读取配置文件、备用凭据环境变量与 `.env`
    pub fn load(api_key: Option<String>, config_path: Option<&Path>) -> Result<Self> {
        let config = match Config::discover(config_path)? {
            Some((config, path)) => {
                debug!("Loaded config from {}", path.display());
                config
            }
            None => Config::default(),
        };

        let mut ctx = Self::new(api_key, std::env::var(FALLBACK_KEY_ENV).ok(), config);
        ctx.dotenv_key = discover_dotenv_key()?;
        Ok(ctx)
    }

    pub fn new(api_key: Option<String>, fallback_key: Option<String>, config: Config) -> Self {
        Context {
            api_key,
            fallback_key,
            dotenv_key: None,
            config,
        }
    }

    /// 子命令参数的默认值
    pub fn defaults(&self) -> &DefaultsConfig {
        &self.config.defaults
    }

    /// 解析凭据；只有需要联网的命令才调用
    pub fn settings(&self) -> Result<Settings> {
        Settings::resolve(
            self.api_key.as_deref(),
            self.fallback_key.as_deref(),
            Some(&self.config),
            self.dotenv_key.as_deref(),
        )
    }
}

/// 执行命令
pub fn run(cmd: Commands, ctx: &Context) -> Result<()> {
    match cmd {
        Commands::Search(args) => search::execute(args, ctx),
        Commands::Stable(args) => stable::execute(args, ctx),
        Commands::Compare(args) => compare::execute(args, ctx),
        Commands::Summary(args) => summary::execute(args, ctx),
        Commands::Trend(args) => trend::execute(args, ctx),
    }
}

/// 打印结果表格，并按需导出 CSV
fn show_results(results: &ResultSet, title: &str, csv_path: Option<&PathBuf>) -> Result<()> {
    if results.is_empty() {
        output::print_warning("No materials matched the query.");
    } else {
        output::print_header(&format!("{} ({} materials)", title, results.len()));
        println!("{}", ComparisonTable::from_results(results).to_table());
    }

    if let Some(path) = csv_path {
        export::export_csv(results, path)?;
        output::print_saved("CSV", &path.display().to_string());
    }
    Ok(())
}
