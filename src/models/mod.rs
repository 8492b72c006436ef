//! # 数据模型模块
//!
//! 定义元素、性质、查询请求、材料记录与结果集。
//!
//! ## 依赖关系
//! - 被 `client/`, `analysis/`, `export/` 和 `commands/` 使用
//! - 子模块: element, property, query, record

pub mod element;
pub mod property;
pub mod query;
pub mod record;

pub use element::parse_element_list;
pub use property::PropertyValue;
pub use query::{Comparator, Constraint, QueryRequest, SortKey};
pub use record::{parse_id_list, MaterialRecord, ResultSet};
