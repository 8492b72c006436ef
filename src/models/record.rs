//! # 材料记录与结果集
//!
//! `MaterialRecord` 表示一条查询得到的材料；`ResultSet` 是一次查询产生的
//! 有序记录序列，并携带产生它的 `QueryRequest`。
//!
//! ## 依赖关系
//! - 被 `client/`, `analysis/`, `export/` 使用
//! - 使用 `indexmap` 保持性质插入顺序

use super::property::PropertyValue;
use super::query::QueryRequest;
use crate::error::{MatAggError, Result};

use indexmap::IndexMap;
use regex::Regex;
use std::sync::LazyLock;

/// 材料 ID：字母前缀 + 数字后缀（`mp-149`, `mvc-12`）
static MATERIAL_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z]+-[0-9]+$").unwrap());

/// 性质表：名称 → 值；`None` 表示缺失（键始终存在）
pub type PropertyMap = IndexMap<String, Option<PropertyValue>>;

/// 一条材料记录
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialRecord {
    /// 外部数据库 ID（如 `mp-149`）
    pub id: String,
    /// 化学式
    pub formula: String,
    pub properties: PropertyMap,
}

impl MaterialRecord {
    pub fn new(id: impl Into<String>, formula: impl Into<String>) -> Self {
        MaterialRecord {
            id: id.into(),
            formula: formula.into(),
            properties: PropertyMap::new(),
        }
    }

    /// 设置性质（`None` 记为缺失）
    #[cfg(test)]
    pub fn with_property(mut self, name: &str, value: Option<PropertyValue>) -> Self {
        self.properties.insert(name.to_string(), value);
        self
    }

    #[cfg(test)]
    pub fn with_number(self, name: &str, value: f64) -> Self {
        self.with_property(name, Some(PropertyValue::Number(value)))
    }

    /// 取性质值；键不存在与值缺失都返回 `None`
    pub fn get(&self, name: &str) -> Option<&PropertyValue> {
        self.properties.get(name).and_then(|v| v.as_ref())
    }

    /// 数值视图
    pub fn number(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(PropertyValue::as_number)
    }
}

/// 一次查询的有序结果
#[derive(Debug, Clone, PartialEq)]
pub struct ResultSet {
    /// 产生该结果的请求；从 CSV 读回的结果没有请求
    pub request: Option<QueryRequest>,
    pub records: Vec<MaterialRecord>,
}

impl ResultSet {
    pub fn new(request: QueryRequest, records: Vec<MaterialRecord>) -> Self {
        ResultSet {
            request: Some(request),
            records,
        }
    }

    pub fn detached(records: Vec<MaterialRecord>) -> Self {
        ResultSet {
            request: None,
            records,
        }
    }

    /// 保留请求标签，替换记录
    pub fn with_records(&self, records: Vec<MaterialRecord>) -> Self {
        ResultSet {
            request: self.request.clone(),
            records,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[cfg(test)]
    pub fn ids(&self) -> Vec<&str> {
        self.records.iter().map(|r| r.id.as_str()).collect()
    }

    /// 列顺序：请求中显式给出的性质列表，否则按首次出现顺序取并集
    pub fn columns(&self) -> Vec<String> {
        if let Some(props) = self.request.as_ref().and_then(|r| r.properties.as_ref()) {
            return props.clone();
        }
        discovered_columns(&self.records)
    }
}

/// 校验单个材料 ID
pub fn validate_material_id(id: &str) -> Result<String> {
    let id = id.trim();
    if MATERIAL_ID_RE.is_match(id) {
        Ok(id.to_string())
    } else {
        Err(MatAggError::validation(format!(
            "'{}' is not a material identifier (expected e.g. mp-149)",
            id
        )))
    }
}

/// 解析逗号分隔的 ID 列表；保留顺序与重复
pub fn parse_id_list(input: &str) -> Result<Vec<String>> {
    let ids = input
        .split(',')
        .filter(|t| !t.trim().is_empty())
        .map(validate_material_id)
        .collect::<Result<Vec<_>>>()?;
    if ids.is_empty() {
        return Err(MatAggError::validation(format!(
            "identifier list '{}' is empty",
            input
        )));
    }
    Ok(ids)
}

/// 所有记录性质名的并集（首次出现顺序）
pub fn discovered_columns(records: &[MaterialRecord]) -> Vec<String> {
    let mut columns: Vec<String> = Vec::new();
    for record in records {
        for name in record.properties.keys() {
            if !columns.contains(name) {
                columns.push(name.clone());
            }
        }
    }
    columns
}
