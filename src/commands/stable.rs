//! # stable 子命令实现
//!
//! 检索 energy above hull 不超过阈值（可选 band gap 下限）的材料，
//! 按 energy above hull 升序列出。默认返回全部匹配，`--limit` 给出时才截断。
//!
//! ## 依赖关系
//! - 使用 `cli/query.rs` 定义的参数
//! - 使用 `client/`, `analysis/filter.rs`, `export/`

use super::{show_results, Context};
use crate::analysis::{filter, sort_by};
use crate::cli::query::StableArgs;
use crate::client::{self, MaterialsProjectClient};
use crate::error::{MatAggError, Result};
use crate::models::property::STABLE_PROPERTIES;
use crate::models::{parse_element_list, Comparator, Constraint, QueryRequest, SortKey};
use crate::utils::{output, progress};

const HULL: &str = "energy_above_hull";
const BAND_GAP: &str = "band_gap";

/// 执行稳定材料检索
pub fn execute(args: StableArgs, ctx: &Context) -> Result<()> {
    let request = build_request(&args, ctx)?;

    let settings = ctx.settings()?;
    let source = MaterialsProjectClient::new(&settings);

    output::print_info(&format!(
        "Searching stable materials in {}",
        request.element_symbols().join("-")
    ));
    for constraint in &request.constraints {
        output::print_info(&format!("Filter: {}", constraint));
    }

    let results = progress::with_spinner("Querying Materials Project...", || {
        client::search(&source, &request, STABLE_PROPERTIES)
    })?;

    let results = filter(&results, &request.constraints);
    let results = sort_by(&results, &SortKey::ascending(HULL));

    show_results(&results, "Stable Materials", args.output.as_ref())
}

/// 校验阈值并构建请求
fn build_request(args: &StableArgs, ctx: &Context) -> Result<QueryRequest> {
    let elements = parse_element_list(&args.elements)?;
    let hull = args.hull.unwrap_or(ctx.defaults().hull);

    let mut request = QueryRequest::new(elements)?
        .with_constraint(Constraint::new(HULL, Comparator::Le, non_negative("--hull", hull)?));
    if let Some(limit) = args.limit {
        request = request.with_limit(limit)?;
    }

    if let Some(gap) = args.band_gap {
        request = request.with_constraint(Constraint::new(
            BAND_GAP,
            Comparator::Ge,
            non_negative("--band-gap", gap)?,
        ));
    }
    Ok(request)
}

fn non_negative(flag: &str, value: f64) -> Result<f64> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(MatAggError::validation(format!(
            "{} must be a non-negative number, got {}",
            flag, value
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn ctx() -> Context {
        Context::new(None, None, Config::default())
    }

    fn args() -> StableArgs {
        StableArgs {
            elements: "Li,O".to_string(),
            hull: None,
            band_gap: None,
            limit: None,
            output: None,
        }
    }

    #[test]
    fn test_default_hull_constraint() {
        let request = build_request(&args(), &ctx()).unwrap();
        assert_eq!(request.constraints.len(), 1);
        let c = &request.constraints[0];
        assert_eq!(c.property, HULL);
        assert_eq!(c.comparator, Comparator::Le);
        assert!((c.threshold - 0.05).abs() < 1e-12);
        assert_eq!(request.limit, None);
    }

    #[test]
    fn test_band_gap_lower_bound() {
        let mut a = args();
        a.hull = Some(0.0);
        a.band_gap = Some(1.5);
        let request = build_request(&a, &ctx()).unwrap();
        assert_eq!(request.constraints[1], Constraint::new(BAND_GAP, Comparator::Ge, 1.5));
    }

    #[test]
    fn test_explicit_limit_applies() {
        let mut a = args();
        a.limit = Some(3);
        assert_eq!(build_request(&a, &ctx()).unwrap().limit, Some(3));

        a.limit = Some(0);
        assert!(matches!(build_request(&a, &ctx()), Err(MatAggError::Validation(_))));
    }

    #[test]
    fn test_negative_hull_rejected() {
        let mut a = args();
        a.hull = Some(-0.1);
        let err = build_request(&a, &ctx()).unwrap_err();
        assert!(err.to_string().contains("--hull"));
    }
}
