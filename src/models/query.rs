//! # 查询请求模型
//!
//! 描述一次检索意图：元素集合、数值过滤条件、结果数量上限和性质列表。
//!
//! ## 依赖关系
//! - 被 `client/` 和 `analysis/filter.rs` 使用
//! - 使用 `models/element.rs`, `models/property.rs`

use super::element::Element;
use super::property::{self, PropertyValue};
use crate::error::{MatAggError, Result};

use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

static CONSTRAINT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*([A-Za-z_][A-Za-z0-9_]*)\s*(<=|>=|==|=)\s*(\S+)\s*$").unwrap()
});

/// 比较运算符
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparator {
    /// `<=`
    Le,
    /// `>=`
    Ge,
    /// `==`
    Eq,
}

impl Comparator {
    pub fn parse(op: &str) -> Result<Self> {
        match op {
            "<=" => Ok(Comparator::Le),
            ">=" => Ok(Comparator::Ge),
            "==" | "=" => Ok(Comparator::Eq),
            other => Err(MatAggError::validation(format!(
                "unsupported comparator '{}' (use <=, >= or ==)",
                other
            ))),
        }
    }

    pub fn holds(&self, value: f64, threshold: f64) -> bool {
        match self {
            Comparator::Le => value <= threshold,
            Comparator::Ge => value >= threshold,
            Comparator::Eq => value == threshold,
        }
    }
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Comparator::Le => write!(f, "<="),
            Comparator::Ge => write!(f, ">="),
            Comparator::Eq => write!(f, "=="),
        }
    }
}

/// 数值过滤条件 `(property, comparator, threshold)`
#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    pub property: String,
    pub comparator: Comparator,
    pub threshold: f64,
}

impl Constraint {
    pub fn new(property: impl Into<String>, comparator: Comparator, threshold: f64) -> Self {
        Constraint {
            property: property.into(),
            comparator,
            threshold,
        }
    }

    /// 解析 `band_gap>=1.5` 形式的表达式
    pub fn parse(expr: &str) -> Result<Self> {
        let caps = CONSTRAINT_RE.captures(expr).ok_or_else(|| {
            MatAggError::validation(format!(
                "malformed filter '{}' (expected e.g. energy_above_hull<=0.05)",
                expr
            ))
        })?;

        let name = &caps[1];
        property::validate_numeric_property(name)?;
        let comparator = Comparator::parse(&caps[2])?;
        let threshold: f64 = caps[3].parse().map_err(|_| {
            MatAggError::validation(format!(
                "filter threshold '{}' in '{}' is not a number",
                &caps[3], expr
            ))
        })?;
        if !threshold.is_finite() {
            return Err(MatAggError::validation(format!(
                "filter threshold '{}' must be finite",
                &caps[3]
            )));
        }

        Ok(Constraint::new(name, comparator, threshold))
    }

    /// 缺失值或非数值一律不满足条件（不视为 0）
    pub fn accepts(&self, value: Option<&PropertyValue>) -> bool {
        value
            .and_then(PropertyValue::as_number)
            .map(|v| self.comparator.holds(v, self.threshold))
            .unwrap_or(false)
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.property, self.comparator, self.threshold)
    }
}

/// 排序键
#[derive(Debug, Clone, PartialEq)]
pub struct SortKey {
    pub property: String,
    pub descending: bool,
}

impl SortKey {
    pub fn ascending(property: impl Into<String>) -> Self {
        SortKey {
            property: property.into(),
            descending: false,
        }
    }

    pub fn descending(property: impl Into<String>) -> Self {
        SortKey {
            property: property.into(),
            descending: true,
        }
    }
}

/// 检索请求
#[derive(Debug, Clone, PartialEq)]
pub struct QueryRequest {
    pub elements: Vec<Element>,
    pub constraints: Vec<Constraint>,
    /// `None` 表示不限数量
    pub limit: Option<usize>,
    /// 显式指定的性质列表；`None` 时由调用方决定默认集合
    pub properties: Option<Vec<String>>,
}

impl QueryRequest {
    /// 创建请求；元素集合不能为空
    pub fn new(elements: Vec<Element>) -> Result<Self> {
        if elements.is_empty() {
            return Err(MatAggError::validation(
                "a query needs at least one element symbol",
            ));
        }
        Ok(QueryRequest {
            elements,
            constraints: Vec::new(),
            limit: None,
            properties: None,
        })
    }

    /// 设置结果上限；必须为正整数
    pub fn with_limit(mut self, limit: usize) -> Result<Self> {
        if limit == 0 {
            return Err(MatAggError::validation(
                "limit must be a positive integer, got 0",
            ));
        }
        self.limit = Some(limit);
        Ok(self)
    }

    pub fn with_constraint(mut self, constraint: Constraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    /// 设置性质列表；每个名称必须在性质目录中
    pub fn with_properties<S: AsRef<str>>(mut self, properties: &[S]) -> Result<Self> {
        let mut names = Vec::with_capacity(properties.len());
        for p in properties {
            let def = property::validate_property(p.as_ref())?;
            if !names.iter().any(|n: &String| n == def.name) {
                names.push(def.name.to_string());
            }
        }
        self.properties = Some(names);
        Ok(self)
    }

    /// 需要获取的性质：显式列表，否则为给定的默认集合。
    /// 过滤条件涉及的性质总会被追加，以便客户端复核。
    pub fn fetch_properties(&self, defaults: &[&str]) -> Vec<String> {
        let mut names: Vec<String> = match &self.properties {
            Some(p) => p.clone(),
            None => defaults.iter().map(|s| s.to_string()).collect(),
        };
        for c in &self.constraints {
            if !names.contains(&c.property) {
                names.push(c.property.clone());
            }
        }
        names
    }

    pub fn element_symbols(&self) -> Vec<&'static str> {
        self.elements.iter().map(|e| e.symbol()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::element::parse_element_list;

    #[test]
    fn test_constraint_parse() {
        let c = Constraint::parse("energy_above_hull<=0.05").unwrap();
        assert_eq!(c.property, "energy_above_hull");
        assert_eq!(c.comparator, Comparator::Le);
        assert!((c.threshold - 0.05).abs() < 1e-12);

        let c = Constraint::parse(" band_gap >= 1.5 ").unwrap();
        assert_eq!(c.comparator, Comparator::Ge);

        let c = Constraint::parse("nsites=4").unwrap();
        assert_eq!(c.comparator, Comparator::Eq);
    }

    #[test]
    fn test_constraint_parse_errors() {
        assert!(Constraint::parse("band_gap<1").is_err());
        assert!(Constraint::parse("band_gap>=abc").is_err());
        assert!(Constraint::parse("colour>=1").is_err());
        assert!(Constraint::parse("band_gap>=inf").is_err());
    }

    #[test]
    fn test_constraint_rejects_non_numeric_property() {
        for text in ["is_metal==0", "spacegroup>=1", "ordering<=2"] {
            let err = Constraint::parse(text).unwrap_err();
            assert!(matches!(err, MatAggError::Validation(_)), "{}", text);
        }
    }

    #[test]
    fn test_constraint_absent_fails() {
        let c = Constraint::new("band_gap", Comparator::Le, 1.0);
        assert!(!c.accepts(None));
        assert!(c.accepts(Some(&PropertyValue::Number(0.0))));
        assert!(!c.accepts(Some(&PropertyValue::Text("0".to_string()))));
    }

    #[test]
    fn test_request_limit_validation() {
        let elements = parse_element_list("Li,O").unwrap();
        let req = QueryRequest::new(elements).unwrap();
        assert!(req.clone().with_limit(0).is_err());
        assert_eq!(req.with_limit(5).unwrap().limit, Some(5));
    }

    #[test]
    fn test_request_requires_elements() {
        assert!(QueryRequest::new(Vec::new()).is_err());
    }

    #[test]
    fn test_fetch_properties_includes_constraints() {
        let elements = parse_element_list("Si").unwrap();
        let req = QueryRequest::new(elements)
            .unwrap()
            .with_properties(&["density"])
            .unwrap()
            .with_constraint(Constraint::new("band_gap", Comparator::Ge, 1.0));
        assert_eq!(req.fetch_properties(&[]), vec!["density", "band_gap"]);
    }
}
