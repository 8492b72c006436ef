//! # 过滤与排序
//!
//! 对结果集应用阈值过滤（energy above hull、band gap、弹性模量等），
//! 稳定排序与稳定截断。
//!
//! ## 语义
//! - 任一条件不满足即丢弃；缺失值一律不满足（不视为 0）
//! - 保留记录的相对顺序不变
//! - `rank_and_limit(_, 0)` 返回空结果集
//!
//! ## 依赖关系
//! - 被 `client/mod.rs` 和 `commands/` 使用
//! - 使用 `models/`

use crate::models::{Constraint, MaterialRecord, ResultSet, SortKey};

use std::cmp::Ordering;
use tracing::debug;

/// 按条件过滤；空条件列表原样返回
pub fn filter(results: &ResultSet, constraints: &[Constraint]) -> ResultSet {
    if constraints.is_empty() {
        return results.clone();
    }

    let kept: Vec<MaterialRecord> = results
        .records
        .iter()
        .filter(|record| passes(record, constraints))
        .cloned()
        .collect();

    debug!(
        "Filter kept {}/{} record(s)",
        kept.len(),
        results.records.len()
    );

    results.with_records(kept)
}

/// 记录是否满足全部条件
pub fn passes(record: &MaterialRecord, constraints: &[Constraint]) -> bool {
    constraints
        .iter()
        .all(|c| c.accepts(record.get(&c.property)))
}

/// 稳定截断为前 `limit` 条
pub fn rank_and_limit(results: &ResultSet, limit: usize) -> ResultSet {
    results.with_records(results.records.iter().take(limit).cloned().collect())
}

/// 按数值性质稳定排序；缺失或非数值的记录始终排在最后
pub fn sort_by(results: &ResultSet, key: &SortKey) -> ResultSet {
    let mut records = results.records.clone();
    records.sort_by(|a, b| {
        match (a.number(&key.property), b.number(&key.property)) {
            (Some(x), Some(y)) => {
                let ord = x.partial_cmp(&y).unwrap_or(Ordering::Equal);
                if key.descending {
                    ord.reverse()
                } else {
                    ord
                }
            }
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    });
    results.with_records(records)
}
