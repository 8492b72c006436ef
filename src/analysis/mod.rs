//! # 分析模块
//!
//! 对查询结果进行过滤排序、相关性分析和报告生成。
//!
//! ## 子模块
//! - `filter`: 阈值过滤、稳定排序与截断
//! - `correlation`: 两个性质之间的相关性与趋势线
//! - `report`: 单材料摘要与多材料对比
//!
//! ## 依赖关系
//! - 被 `client/` 和 `commands/` 使用
//! - 使用 `models/`

pub mod correlation;
pub mod filter;
pub mod report;

pub use correlation::{analyze, CorrelationReport};
pub use filter::{filter, sort_by};
pub use report::{summarize, Report};
