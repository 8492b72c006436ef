//! # summary 子命令实现
//!
//! 获取单个材料的全部已知性质，按组打印。
//!
//! ## 依赖关系
//! - 使用 `cli/material.rs` 定义的参数
//! - 使用 `analysis/report.rs`

use super::Context;
use crate::analysis::{summarize, Report};
use crate::cli::material::SummaryArgs;
use crate::client::MaterialsProjectClient;
use crate::error::Result;
use crate::models::property::all_property_names;
use crate::models::record::validate_material_id;
use crate::utils::progress;

/// 执行摘要
pub fn execute(args: SummaryArgs, ctx: &Context) -> Result<()> {
    let id = validate_material_id(&args.id)?;

    let settings = ctx.settings()?;
    let source = MaterialsProjectClient::new(&settings);

    let report = progress::with_spinner(&format!("Fetching {}...", id), || {
        summarize(&source, std::slice::from_ref(&id), &all_property_names())
    })?;

    match report {
        Report::Summary(summary) => println!("{}", summary),
        Report::Comparison(table) => println!("{}", table.to_table()),
    }
    Ok(())
}
