//! # search 子命令实现
//!
//! 按元素集合检索材料，可附加阈值过滤、排序与 CSV 导出。
//!
//! ## 依赖关系
//! - 使用 `cli/query.rs` 定义的参数
//! - 使用 `client/`, `analysis/filter.rs`, `export/`

use super::{show_results, Context};
use crate::analysis::{filter, sort_by};
use crate::cli::query::SearchArgs;
use crate::client::{self, MaterialsProjectClient};
use crate::error::Result;
use crate::models::property::{self, SEARCH_PROPERTIES};
use crate::models::{parse_element_list, Constraint, QueryRequest, SortKey};
use crate::utils::{output, progress};

/// 执行检索
pub fn execute(args: SearchArgs, ctx: &Context) -> Result<()> {
    let request = build_request(&args, ctx.defaults().limit)?;
    let sort_key = sort_key(&args)?;

    let settings = ctx.settings()?;
    let source = MaterialsProjectClient::new(&settings);

    output::print_info(&format!(
        "Searching materials containing {}",
        request.element_symbols().join("-")
    ));
    for constraint in &request.constraints {
        output::print_info(&format!("Filter: {}", constraint));
    }

    let results = progress::with_spinner("Querying Materials Project...", || {
        client::search(&source, &request, SEARCH_PROPERTIES)
    })?;

    let mut results = filter(&results, &request.constraints);
    if let Some(key) = &sort_key {
        results = sort_by(&results, key);
    }

    show_results(&results, "Search Results", args.output.as_ref())
}

/// 排序键只接受数值性质
fn sort_key(args: &SearchArgs) -> Result<Option<SortKey>> {
    let Some(name) = args.sort.as_deref() else {
        return Ok(None);
    };
    property::validate_numeric_property(name)?;
    Ok(Some(if args.desc {
        SortKey::descending(name)
    } else {
        SortKey::ascending(name)
    }))
}

/// 校验参数并构建请求
fn build_request(args: &SearchArgs, default_limit: usize) -> Result<QueryRequest> {
    let elements = parse_element_list(&args.elements)?;
    let mut request = QueryRequest::new(elements)?.with_limit(args.limit.unwrap_or(default_limit))?;

    for expr in &args.filters {
        request = request.with_constraint(Constraint::parse(expr)?);
    }
    if let Some(list) = &args.properties {
        request = request.with_properties(&property::parse_property_list(list)?)?;
    }
    Ok(request)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MatAggError;

    fn args(elements: &str) -> SearchArgs {
        SearchArgs {
            elements: elements.to_string(),
            limit: None,
            properties: None,
            filters: Vec::new(),
            sort: None,
            desc: false,
            output: None,
        }
    }

    #[test]
    fn test_build_request_defaults() {
        let request = build_request(&args("li,o"), 10).unwrap();
        assert_eq!(request.element_symbols(), vec!["Li", "O"]);
        assert_eq!(request.limit, Some(10));
        assert!(request.constraints.is_empty());
    }

    #[test]
    fn test_build_request_rejects_bad_input() {
        let err = build_request(&args("Li,Xx"), 10).unwrap_err();
        assert!(err.to_string().contains("Xx"));

        let mut zero = args("Li");
        zero.limit = Some(0);
        assert!(matches!(build_request(&zero, 10), Err(MatAggError::Validation(_))));

        let mut bad_filter = args("Li");
        bad_filter.filters = vec!["band_gap>>1".to_string()];
        assert!(build_request(&bad_filter, 10).is_err());
    }

    #[test]
    fn test_build_request_with_properties_and_filters() {
        let mut a = args("Fe,O");
        a.properties = Some("density,band_gap".to_string());
        a.filters = vec!["energy_above_hull<=0.1".to_string()];
        let request = build_request(&a, 10).unwrap();

        assert_eq!(
            request.properties,
            Some(vec!["density".to_string(), "band_gap".to_string()])
        );
        assert_eq!(request.constraints.len(), 1);
    }

    #[test]
    fn test_sort_key_must_be_numeric() {
        let mut a = args("Li,O");
        a.sort = Some("band_gap".to_string());
        a.desc = true;
        assert!(sort_key(&a).unwrap().is_some());

        a.sort = Some("crystal_system".to_string());
        assert!(matches!(sort_key(&a), Err(MatAggError::Validation(_))));

        a.sort = Some("is_stable".to_string());
        assert!(matches!(sort_key(&a), Err(MatAggError::Validation(_))));
    }
}
