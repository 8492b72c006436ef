//! # Materials Project 客户端
//!
//! 通过 `ureq`（同步 HTTP，无需异步运行时）调用
//! `GET {endpoint}/materials/summary/`，并把 JSON 响应规范化为 `MaterialRecord`。
//!
//! ## 响应格式
//! ```text
//! { "data": [ { "material_id": "mp-149", "formula_pretty": "Si",
//!               "band_gap": 0.61, "bulk_modulus": { "vrh": 88.0 }, ... } ],
//!   "meta": { ... } }
//! ```
//!
//! ## 依赖关系
//! - 被 `commands/` 使用
//! - 使用 `config.rs` 的 `Settings`, `models/property.rs` 的性质目录

use super::MaterialsSource;
use crate::config::Settings;
use crate::error::{MatAggError, Result};
use crate::models::property::{self, PropertyValue};
use crate::models::{Comparator, MaterialRecord, QueryRequest};

use serde_json::Value;
use std::collections::BTreeMap;
use tracing::debug;

const SUMMARY_PATH: &str = "/materials/summary/";

/// 不限数量时的分页大小（服务端单页上限）
const PAGE_SIZE: usize = 1000;

/// 错误信息中响应体的最大长度
const MAX_ERROR_BODY: usize = 300;

/// Materials Project summary API 客户端
pub struct MaterialsProjectClient<'a> {
    settings: &'a Settings,
    agent: ureq::Agent,
}

impl<'a> MaterialsProjectClient<'a> {
    pub fn new(settings: &'a Settings) -> Self {
        let agent = ureq::config::Config::builder()
            .http_status_as_error(false)
            .timeout_global(Some(settings.timeout))
            .build()
            .new_agent();

        Self { settings, agent }
    }

    fn summary_url(&self) -> String {
        format!("{}{}", self.settings.endpoint, SUMMARY_PATH)
    }

    /// 发送一次请求并解析 `data` 数组
    fn get_summary(
        &self,
        params: &[(String, String)],
        properties: &[String],
    ) -> Result<Vec<MaterialRecord>> {
        let url = self.summary_url();
        debug!("GET {} {:?}", url, params);

        let mut request = self
            .agent
            .get(url.as_str())
            .header("X-API-KEY", self.settings.api_key.expose())
            .header("Accept", "application/json");
        for (key, value) in params {
            request = request.query(key, value);
        }

        let response = request
            .call()
            .map_err(|e| MatAggError::retrieval(format!("request to {} failed: {}", url, e)))?;

        let status = response.status().as_u16();
        if status == 401 || status == 403 {
            return Err(MatAggError::Configuration(format!(
                "API key rejected by {} (HTTP {})",
                self.settings.endpoint, status
            )));
        }
        if status >= 400 {
            let text = response.into_body().read_to_string().unwrap_or_default();
            return Err(MatAggError::retrieval(format!(
                "HTTP {} from {}: {}",
                status,
                url,
                truncate(&text, MAX_ERROR_BODY)
            )));
        }

        let body: Value = response
            .into_body()
            .read_json()
            .map_err(|e| MatAggError::retrieval(format!("malformed response body: {}", e)))?;

        parse_summary_body(&body, properties)
    }
}

impl MaterialsProjectClient<'_> {
    /// 逐页读取直到某页不满
    fn get_all_pages(
        &self,
        params: &[(String, String)],
        properties: &[String],
    ) -> Result<Vec<MaterialRecord>> {
        let mut records = Vec::new();
        loop {
            let page = self.get_summary(&page_params(params, records.len()), properties)?;
            let fetched = page.len();
            records.extend(page);
            if fetched < PAGE_SIZE {
                break;
            }
        }
        debug!("Fetched {} record(s) across pages", records.len());
        Ok(records)
    }
}

impl MaterialsSource for MaterialsProjectClient<'_> {
    fn query(&self, request: &QueryRequest, properties: &[String]) -> Result<Vec<MaterialRecord>> {
        let mut params = vec![
            ("elements".to_string(), request.element_symbols().join(",")),
            ("_fields".to_string(), fields_param(properties)),
            ("_all_fields".to_string(), "false".to_string()),
        ];
        params.extend(range_params(request));

        match request.limit {
            Some(limit) => {
                params.push(("_limit".to_string(), limit.to_string()));
                self.get_summary(&params, properties)
            }
            None => self.get_all_pages(&params, properties),
        }
    }

    fn fetch_by_ids(&self, ids: &[String], properties: &[String]) -> Result<Vec<MaterialRecord>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let params = vec![
            ("material_ids".to_string(), ids.join(",")),
            ("_fields".to_string(), fields_param(properties)),
            ("_all_fields".to_string(), "false".to_string()),
            ("_limit".to_string(), ids.len().to_string()),
        ];

        self.get_summary(&params, properties)
    }
}

/// 分页参数：`_skip` 为已读取的记录数
fn page_params(params: &[(String, String)], skip: usize) -> Vec<(String, String)> {
    let mut page = params.to_vec();
    page.push(("_skip".to_string(), skip.to_string()));
    page.push(("_limit".to_string(), PAGE_SIZE.to_string()));
    page
}

/// `_fields` 参数：ID、化学式以及各性质的顶层字段
fn fields_param(properties: &[String]) -> String {
    let mut fields: Vec<&str> = vec!["material_id", "formula_pretty"];
    for name in properties {
        let field = property::lookup(name)
            .map(|def| def.api_field())
            .unwrap_or(name.as_str());
        if !fields.contains(&field) {
            fields.push(field);
        }
    }
    fields.join(",")
}

/// 将过滤条件翻译为服务端 `<name>_min` / `<name>_max` 参数。
///
/// 同一性质的多个条件取最紧的界；服务端不支持的性质只在客户端过滤。
fn range_params(request: &QueryRequest) -> Vec<(String, String)> {
    let mut bounds: BTreeMap<&str, (Option<f64>, Option<f64>)> = BTreeMap::new();

    for c in &request.constraints {
        let supported = property::lookup(&c.property)
            .map(|def| def.range_filter)
            .unwrap_or(false);
        if !supported {
            continue;
        }
        let entry = bounds.entry(c.property.as_str()).or_insert((None, None));
        if matches!(c.comparator, Comparator::Ge | Comparator::Eq) {
            entry.0 = Some(entry.0.map_or(c.threshold, |v: f64| v.max(c.threshold)));
        }
        if matches!(c.comparator, Comparator::Le | Comparator::Eq) {
            entry.1 = Some(entry.1.map_or(c.threshold, |v: f64| v.min(c.threshold)));
        }
    }

    let mut params = Vec::new();
    for (name, (min, max)) in bounds {
        if let Some(min) = min {
            params.push((format!("{}_min", name), min.to_string()));
        }
        if let Some(max) = max {
            params.push((format!("{}_max", name), max.to_string()));
        }
    }
    params
}

/// 解析 summary 响应体
///
/// 缺少 `data` 数组或记录缺少 `material_id` 时返回 `RetrievalError`。
/// 每个请求的性质都会出现在结果中，取不到值时记为缺失。
pub fn parse_summary_body(body: &Value, properties: &[String]) -> Result<Vec<MaterialRecord>> {
    let data = body
        .get("data")
        .and_then(Value::as_array)
        .ok_or_else(|| MatAggError::retrieval("response has no 'data' array"))?;

    data.iter()
        .enumerate()
        .map(|(i, doc)| parse_document(i, doc, properties))
        .collect()
}

fn parse_document(index: usize, doc: &Value, properties: &[String]) -> Result<MaterialRecord> {
    if !doc.is_object() {
        return Err(MatAggError::retrieval(format!(
            "record #{} is not a JSON object",
            index + 1
        )));
    }

    let id = doc
        .get("material_id")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| {
            MatAggError::retrieval(format!("record #{} is missing 'material_id'", index + 1))
        })?;

    let formula = doc
        .get("formula_pretty")
        .and_then(Value::as_str)
        .unwrap_or_default();

    let mut record = MaterialRecord::new(id, formula);
    for name in properties {
        let value = match property::lookup(name) {
            Some(def) => walk(doc, def.path),
            None => doc.get(name.as_str()),
        };
        record
            .properties
            .insert(name.clone(), value.and_then(scalar));
    }

    Ok(record)
}

/// 按路径取嵌套字段（`bulk_modulus.vrh`）
fn walk<'v>(doc: &'v Value, path: &[&str]) -> Option<&'v Value> {
    path.iter().try_fold(doc, |node, key| node.get(*key))
}

/// 标量转换；`null`、数组、对象均视为缺失
fn scalar(value: &Value) -> Option<PropertyValue> {
    match value {
        Value::Number(n) => n.as_f64().map(PropertyValue::Number),
        Value::String(s) => Some(PropertyValue::Text(s.clone())),
        Value::Bool(b) => Some(PropertyValue::Flag(*b)),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let head: String = text.chars().take(max).collect();
        format!("{}...", head)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{parse_element_list, Constraint};
    use serde_json::json;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_nested_and_absent_properties() {
        let body = json!({
            "data": [
                {
                    "material_id": "mp-149",
                    "formula_pretty": "Si",
                    "band_gap": 0.6105,
                    "bulk_modulus": { "voigt": 88.3, "reuss": 88.3, "vrh": 88.3 },
                    "symmetry": { "symbol": "Fd-3m", "crystal_system": "Cubic" },
                    "is_metal": false
                },
                {
                    "material_id": "mp-22862",
                    "formula_pretty": "NaCl",
                    "band_gap": null,
                    "bulk_modulus": null
                }
            ],
            "meta": { "total_doc": 2 }
        });
        let props = names(&["band_gap", "k_vrh", "spacegroup", "is_metal"]);
        let records = parse_summary_body(&body, &props).unwrap();

        assert_eq!(records.len(), 2);
        let si = &records[0];
        assert_eq!(si.id, "mp-149");
        assert_eq!(si.formula, "Si");
        assert_eq!(si.number("k_vrh"), Some(88.3));
        assert_eq!(
            si.get("spacegroup"),
            Some(&PropertyValue::Text("Fd-3m".to_string()))
        );
        assert_eq!(si.get("is_metal"), Some(&PropertyValue::Flag(false)));

        let nacl = &records[1];
        for p in &props {
            assert!(nacl.properties.contains_key(p), "{} key missing", p);
            assert_eq!(nacl.get(p), None);
        }
    }

    #[test]
    fn test_missing_material_id_is_retrieval_error() {
        let body = json!({ "data": [ { "formula_pretty": "Si" } ] });
        let err = parse_summary_body(&body, &[]).unwrap_err();
        assert!(matches!(err, MatAggError::Retrieval(_)));
        assert!(err.to_string().contains("material_id"));
    }

    #[test]
    fn test_missing_data_array_is_retrieval_error() {
        let body = json!({ "detail": "oops" });
        assert!(matches!(
            parse_summary_body(&body, &[]),
            Err(MatAggError::Retrieval(_))
        ));
    }

    #[test]
    fn test_fields_param_uses_top_level_fields() {
        let props = names(&["k_vrh", "spacegroup", "crystal_system", "band_gap"]);
        assert_eq!(
            fields_param(&props),
            "material_id,formula_pretty,bulk_modulus,symmetry,band_gap"
        );
    }

    #[test]
    fn test_range_params_tightest_bounds() {
        let request = QueryRequest::new(parse_element_list("Li,O").unwrap())
            .unwrap()
            .with_constraint(Constraint::new("energy_above_hull", Comparator::Le, 0.1))
            .with_constraint(Constraint::new("energy_above_hull", Comparator::Le, 0.05))
            .with_constraint(Constraint::new("band_gap", Comparator::Ge, 1.0))
            .with_constraint(Constraint::new("is_metal", Comparator::Eq, 0.0));

        let params = range_params(&request);
        assert_eq!(
            params,
            vec![
                ("band_gap_min".to_string(), "1".to_string()),
                ("energy_above_hull_max".to_string(), "0.05".to_string()),
            ]
        );
    }

    #[test]
    fn test_page_params_append_skip_and_limit() {
        let base = vec![("elements".to_string(), "Li,O".to_string())];
        let page = page_params(&base, 2000);
        assert_eq!(page[0], base[0]);
        assert_eq!(page[1], ("_skip".to_string(), "2000".to_string()));
        assert_eq!(page[2], ("_limit".to_string(), PAGE_SIZE.to_string()));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("abc", 5), "abc");
        assert_eq!(truncate("abcdef", 3), "abc...");
    }
}
