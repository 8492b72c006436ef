//! # 按 ID 查询的子命令 CLI 定义
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/compare.rs`, `commands/summary.rs`

use clap::Args;
use std::path::PathBuf;

/// compare 子命令参数
#[derive(Args, Debug)]
pub struct CompareArgs {
    /// Comma-separated material identifiers (e.g., 'mp-149,mp-13')
    pub ids: String,

    /// Export the comparison to a CSV file
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// summary 子命令参数
#[derive(Args, Debug)]
pub struct SummaryArgs {
    /// Material identifier (e.g., 'mp-149')
    pub id: String,
}
