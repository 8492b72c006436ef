//! # CLI 模块
//!
//! 使用 `clap` 定义命令行参数和子命令。
//!
//! ## 命令结构
//! - `search`: 按元素集合检索材料
//! - `stable`: 检索热力学稳定材料
//! - `compare`: 多个材料并排对比
//! - `summary`: 单个材料分组摘要
//! - `trend`: 两个性质的相关性分析
//!
//! ## 依赖关系
//! - 被 `main.rs` 使用
//! - 子模块: query, material

pub mod material;
pub mod query;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// matagg - Materials Project 查询与报告工具
#[derive(Parser, Debug)]
#[command(name = "matagg")]
#[command(author = "Changjiang Wu")]
#[command(version)]
#[command(about = "Query, filter, compare and report on Materials Project data", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Materials Project API key
    #[arg(long, global = true, env = "MATERIALS_PROJECT_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Path to a TOML config file (default: ./.matagg.toml, then ~/.matagg.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging on stderr
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// 可用的子命令
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Search materials containing the given elements
    Search(query::SearchArgs),

    /// List thermodynamically stable materials
    Stable(query::StableArgs),

    /// Compare several materials side by side
    Compare(material::CompareArgs),

    /// Print a grouped summary of one material
    Summary(material::SummaryArgs),

    /// Correlate two numeric properties across a chemical system
    Trend(query::TrendArgs),
}
