//! # 查询客户端适配层
//!
//! 将规范化的 `QueryRequest` 转换为外部数据源调用，并把响应规范化为
//! `MaterialRecord` 序列。外部 API 的调用签名只在本模块内出现，
//! 其余模块只依赖 `MaterialRecord` / `ResultSet`。
//!
//! ## 依赖关系
//! - 被 `commands/` 和 `analysis/report.rs` 使用
//! - 使用 `models/`, `analysis/filter.rs`
//! - 子模块: materials_project, fixture (仅测试)

pub mod materials_project;

#[cfg(test)]
pub mod fixture;

pub use materials_project::MaterialsProjectClient;

use crate::analysis::filter;
use crate::error::{MatAggError, Result};
use crate::models::{MaterialRecord, QueryRequest, ResultSet};

use std::collections::HashSet;
use tracing::{info, warn};

/// 外部材料数据源
///
/// 每次调用对应一次逻辑查询，不做重试。
pub trait MaterialsSource {
    /// 按元素集合与过滤条件查询，记录按数据源顺序返回
    fn query(&self, request: &QueryRequest, properties: &[String]) -> Result<Vec<MaterialRecord>>;

    /// 按 ID 列表获取记录；不存在的 ID 直接缺席，不报错
    fn fetch_by_ids(&self, ids: &[String], properties: &[String]) -> Result<Vec<MaterialRecord>>;
}

/// 执行一次检索
///
/// 保持数据源顺序；重复 ID 以首次出现为准并记录警告；
/// 超出 `limit` 的部分做稳定截断。
pub fn search(
    source: &dyn MaterialsSource,
    request: &QueryRequest,
    default_properties: &[&str],
) -> Result<ResultSet> {
    let properties = request.fetch_properties(default_properties);
    let raw = source.query(request, &properties)?;
    let records = dedupe(raw)?;

    info!(
        "Query for [{}] returned {} record(s)",
        request.element_symbols().join(","),
        records.len()
    );

    let results = ResultSet::new(request.clone(), records);
    Ok(match request.limit {
        Some(limit) if results.len() > limit => filter::rank_and_limit(&results, limit),
        _ => results,
    })
}

/// 按 ID 获取记录（一次逻辑查询）
pub fn fetch(
    source: &dyn MaterialsSource,
    ids: &[String],
    properties: &[String],
) -> Result<Vec<MaterialRecord>> {
    let mut unique: Vec<String> = Vec::new();
    for id in ids {
        if !unique.contains(id) {
            unique.push(id.clone());
        }
    }
    let raw = source.fetch_by_ids(&unique, properties)?;
    dedupe(raw)
}

/// 去除重复 ID（首次出现为准），并拒绝空 ID
fn dedupe(records: Vec<MaterialRecord>) -> Result<Vec<MaterialRecord>> {
    let mut seen: HashSet<String> = HashSet::with_capacity(records.len());
    let mut unique = Vec::with_capacity(records.len());

    for record in records {
        if record.id.trim().is_empty() {
            return Err(MatAggError::retrieval(
                "external source returned a record with an empty material_id",
            ));
        }
        if seen.insert(record.id.clone()) {
            unique.push(record);
        } else {
            warn!(
                "Duplicate material id '{}' in response; keeping first occurrence",
                record.id
            );
        }
    }

    Ok(unique)
}
