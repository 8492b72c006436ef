//! # compare 子命令实现
//!
//! 获取多个材料并并排显示；可导出 CSV。任一 ID 不存在时不输出任何内容。
//!
//! ## 依赖关系
//! - 使用 `cli/material.rs` 定义的参数
//! - 使用 `analysis/report.rs`, `export/`

use super::Context;
use crate::analysis::report::ComparisonTable;
use crate::analysis::{summarize, Report};
use crate::cli::material::CompareArgs;
use crate::client::MaterialsProjectClient;
use crate::error::Result;
use crate::export;
use crate::models::parse_id_list;
use crate::models::property::COMPARE_PROPERTIES;
use crate::utils::{output, progress};

/// 执行对比
pub fn execute(args: CompareArgs, ctx: &Context) -> Result<()> {
    let ids = parse_id_list(&args.ids)?;
    let properties: Vec<String> = COMPARE_PROPERTIES.iter().map(|p| p.to_string()).collect();

    let settings = ctx.settings()?;
    let source = MaterialsProjectClient::new(&settings);

    let report = progress::with_spinner("Fetching materials...", || {
        summarize(&source, &ids, &properties)
    })?;

    let table = match report {
        Report::Comparison(table) => table,
        Report::Summary(summary) => ComparisonTable::new(vec![summary.record]),
    };

    output::print_header(&format!("Comparison of {} materials", table.rows.len()));
    println!("{}", table.to_table());

    if let Some(path) = &args.output {
        export::export_comparison_csv(&table, path)?;
        output::print_saved("CSV", &path.display().to_string());
    }
    Ok(())
}
