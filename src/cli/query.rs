//! # 检索类子命令 CLI 定义
//!
//! `search`, `stable`, `trend` 三个子命令都以元素集合为输入。
//! 未给出的数值参数取配置文件 `[defaults]` 段的值。
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/search.rs`, `commands/stable.rs`, `commands/trend.rs`

use clap::Args;
use std::path::PathBuf;

/// search 子命令参数
#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Comma-separated element symbols (e.g., 'Li,Fe,O')
    pub elements: String,

    /// Maximum number of materials to return [default: 10]
    #[arg(short, long)]
    pub limit: Option<usize>,

    /// Comma-separated properties to fetch (e.g., 'band_gap,density')
    #[arg(short, long)]
    pub properties: Option<String>,

    /// Threshold filter such as 'band_gap>=1.5' (repeatable)
    #[arg(short = 'w', long = "where", value_name = "EXPR")]
    pub filters: Vec<String>,

    /// Sort results by a numeric property
    #[arg(long)]
    pub sort: Option<String>,

    /// Sort in descending order
    #[arg(long, default_value_t = false, requires = "sort")]
    pub desc: bool,

    /// Export results to a CSV file
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// stable 子命令参数
#[derive(Args, Debug)]
pub struct StableArgs {
    /// Comma-separated element symbols (e.g., 'Li,O')
    pub elements: String,

    /// Maximum energy above hull in eV/atom [default: 0.05]
    #[arg(long)]
    pub hull: Option<f64>,

    /// Minimum band gap in eV
    #[arg(long)]
    pub band_gap: Option<f64>,

    /// Maximum number of materials to return [default: all matches]
    #[arg(short, long)]
    pub limit: Option<usize>,

    /// Export results to a CSV file
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// trend 子命令参数
#[derive(Args, Debug)]
pub struct TrendArgs {
    /// Comma-separated element symbols (e.g., 'Li,Fe,O')
    pub elements: String,

    /// Property on the x axis
    #[arg(long)]
    pub x: String,

    /// Property on the y axis
    #[arg(long)]
    pub y: String,

    /// Maximum number of materials to query [default: 50]
    #[arg(short, long)]
    pub limit: Option<usize>,

    /// Read records from a CSV export instead of querying
    #[arg(long, value_name = "CSV")]
    pub from: Option<PathBuf>,

    /// Save a scatter plot (.png or .svg)
    #[arg(long)]
    pub plot: Option<PathBuf>,
}
