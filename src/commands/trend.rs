//! # trend 子命令实现
//!
//! 在一个化学体系内分析两个数值性质的相关性：
//! 查询（或从 CSV 读回）记录，计算 Pearson 系数与趋势线，
//! 打印数据点表格并可选输出散点图。
//!
//! ## 依赖关系
//! - 使用 `cli/query.rs` 定义的参数
//! - 使用 `client/`, `analysis/correlation.rs`, `export/`

use super::Context;
use crate::analysis::{analyze, CorrelationReport};
use crate::cli::query::TrendArgs;
use crate::client::{self, MaterialsProjectClient};
use crate::error::Result;
use crate::export::plot::{PlotFormat, DEFAULT_SIZE};
use crate::export::{read_csv, save_plot};
use crate::models::property::{self, humanize};
use crate::models::{parse_element_list, PropertyValue, QueryRequest, ResultSet};
use crate::utils::{output, progress};

use tabled::settings::Style;
use tabled::{Table, Tabled};

/// 数据点表格行
#[derive(Debug, Clone, Tabled)]
struct PointRow {
    #[tabled(rename = "Material")]
    id: String,
    #[tabled(rename = "X")]
    x: String,
    #[tabled(rename = "Y")]
    y: String,
}

/// 执行相关性分析
pub fn execute(args: TrendArgs, ctx: &Context) -> Result<()> {
    let request = build_request(&args, ctx.defaults().trend_limit)?;
    if let Some(path) = &args.plot {
        PlotFormat::from_path(path)?;
    }

    let results = match &args.from {
        Some(path) => {
            output::print_info(&format!("Reading records from '{}'", path.display()));
            read_csv(path)?
        }
        None => query(&request, ctx)?,
    };
    output::print_info(&format!("Loaded {} records", results.len()));

    let report = analyze(&results, &args.x, &args.y)?;
    print_report(&report);

    if let Some(path) = &args.plot {
        save_plot(&report.to_plot(), path, DEFAULT_SIZE.0, DEFAULT_SIZE.1)?;
        output::print_saved("Plot", &path.display().to_string());
    }
    Ok(())
}

/// 校验元素与两个性质名
fn build_request(args: &TrendArgs, default_limit: usize) -> Result<QueryRequest> {
    let elements = parse_element_list(&args.elements)?;
    property::validate_numeric_property(&args.x)?;
    property::validate_numeric_property(&args.y)?;

    QueryRequest::new(elements)?
        .with_limit(args.limit.unwrap_or(default_limit))?
        .with_properties(&[args.x.as_str(), args.y.as_str()])
}

fn query(request: &QueryRequest, ctx: &Context) -> Result<ResultSet> {
    let settings = ctx.settings()?;
    let source = MaterialsProjectClient::new(&settings);
    progress::with_spinner("Querying Materials Project...", || {
        client::search(&source, request, &[])
    })
}

fn print_report(report: &CorrelationReport) {
    let x_label = humanize(&report.prop_x);
    let y_label = humanize(&report.prop_y);

    output::print_header(&format!("{} vs {}", y_label, x_label));
    output::print_field("Usable records", &report.retained().to_string());
    output::print_field("Dropped (missing data)", &report.dropped.to_string());
    output::print_field(
        "Pearson r",
        &report
            .pearson
            .map(|r| format!("{:.4}", r))
            .unwrap_or_else(|| "undefined".to_string()),
    );
    if let Some(trend) = report.trend {
        output::print_field(
            "Trend line",
            &format!("y = {:.4}·x {:+.4}", trend.slope, trend.intercept),
        );
    }
    println!();

    let rows: Vec<PointRow> = report
        .points
        .iter()
        .map(|p| PointRow {
            id: p.id.clone(),
            x: property::display_value(&report.prop_x, Some(&PropertyValue::Number(p.x))),
            y: property::display_value(&report.prop_y, Some(&PropertyValue::Number(p.y))),
        })
        .collect();

    let mut table = Table::new(&rows);
    table.with(Style::psql());
    println!("{}", table);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::error::MatAggError;
    use crate::export::export_csv;
    use crate::models::MaterialRecord;

    fn args(x: &str, y: &str) -> TrendArgs {
        TrendArgs {
            elements: "Li,Fe,O".to_string(),
            x: x.to_string(),
            y: y.to_string(),
            limit: None,
            from: None,
            plot: None,
        }
    }

    #[test]
    fn test_request_fetches_both_axes() {
        let request = build_request(&args("formation_energy_per_atom", "band_gap"), 50).unwrap();
        assert_eq!(request.limit, Some(50));
        assert_eq!(
            request.properties,
            Some(vec![
                "formation_energy_per_atom".to_string(),
                "band_gap".to_string()
            ])
        );
    }

    #[test]
    fn test_unknown_axis_rejected() {
        let err = build_request(&args("band_gap", "colour"), 50).unwrap_err();
        assert!(err.to_string().contains("colour"));
    }

    #[test]
    fn test_text_axis_rejected() {
        let err = build_request(&args("spacegroup", "band_gap"), 50).unwrap_err();
        assert!(matches!(err, MatAggError::Validation(_)));
        assert!(err.to_string().contains("spacegroup"));
    }

    #[test]
    fn test_bad_plot_extension_fails_before_query() {
        let mut a = args("formation_energy_per_atom", "band_gap");
        a.plot = Some("trend.gif".into());
        // 没有凭据：若先发起查询会得到 Configuration 错误
        let ctx = Context::new(None, None, Config::default());
        assert!(matches!(execute(a, &ctx), Err(MatAggError::Validation(_))));
    }

    #[test]
    fn test_from_csv_needs_no_credentials() {
        let dir = tempfile::tempdir().unwrap();
        let csv_path = dir.path().join("records.csv");
        let rs = ResultSet::detached(vec![
            MaterialRecord::new("mp-1", "LiO")
                .with_number("formation_energy_per_atom", -1.0)
                .with_number("band_gap", 1.0),
            MaterialRecord::new("mp-2", "Li2O")
                .with_number("formation_energy_per_atom", -2.0)
                .with_number("band_gap", 2.1),
            MaterialRecord::new("mp-3", "FeO").with_number("formation_energy_per_atom", -1.5),
        ]);
        export_csv(&rs, &csv_path).unwrap();

        let mut a = args("formation_energy_per_atom", "band_gap");
        a.from = Some(csv_path);
        let ctx = Context::new(None, None, Config::default());
        execute(a, &ctx).unwrap();
    }
}
