//! # 材料摘要与对比报告
//!
//! - 单个 ID：按性质分组（结构、热力学、电子、磁性、力学）逐行列出
//! - 多个 ID：每个 ID 一行，列为所有记录性质的并集
//!
//! 缺失性质显示为 `N/A`，不会与 0 混淆。任一 ID 不存在时报 `NotFound`，
//! 不产生部分报告。
//!
//! ## 依赖关系
//! - 被 `commands/compare.rs`, `commands/summary.rs` 使用
//! - 使用 `client/` 获取记录，`tabled` 渲染对比表

use crate::client::{self, MaterialsSource};
use crate::error::{MatAggError, Result};
use crate::models::property::{self, PropertyGroup, NOT_AVAILABLE};
use crate::models::record::discovered_columns;
use crate::models::{MaterialRecord, PropertyValue, ResultSet};

use std::fmt;
use tabled::builder::Builder;
use tabled::settings::Style;
use tabled::Table;

const RULE_WIDTH: usize = 50;

/// 报告
#[derive(Debug, Clone, PartialEq)]
pub enum Report {
    Summary(MaterialSummary),
    Comparison(ComparisonTable),
}

/// 单个材料的分组摘要
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialSummary {
    pub record: MaterialRecord,
}

impl MaterialSummary {
    /// 按组收集 `(标签, 显示值)`；目录外的性质归入 `Other`
    pub fn sections(&self) -> Vec<(PropertyGroup, Vec<(String, String)>)> {
        PropertyGroup::ALL
            .iter()
            .filter_map(|&group| {
                let lines: Vec<(String, String)> = self
                    .record
                    .properties
                    .iter()
                    .filter(|(name, _)| {
                        property::lookup(name)
                            .map(|def| def.group)
                            .unwrap_or(PropertyGroup::Other)
                            == group
                    })
                    .map(|(name, value)| {
                        (
                            property::humanize(name),
                            render_cell(name, value.as_ref(), true),
                        )
                    })
                    .collect();
                (!lines.is_empty()).then_some((group, lines))
            })
            .collect()
    }
}

impl fmt::Display for MaterialSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let heavy = "=".repeat(RULE_WIDTH);
        let light = "-".repeat(RULE_WIDTH);
        let formula = if self.record.formula.is_empty() {
            NOT_AVAILABLE
        } else {
            self.record.formula.as_str()
        };

        writeln!(f, "{}", heavy)?;
        writeln!(f, "Material ID: {}", self.record.id)?;
        writeln!(f, "Formula: {}", formula)?;
        for (group, lines) in self.sections() {
            writeln!(f, "{}", light)?;
            writeln!(f, "{}:", group)?;
            for (label, value) in lines {
                writeln!(f, "  {}: {}", label, value)?;
            }
        }
        write!(f, "{}", heavy)
    }
}

/// 多材料对比表
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonTable {
    /// 性质列（不含 ID 与化学式）
    pub columns: Vec<String>,
    /// 按请求顺序排列，允许重复
    pub rows: Vec<MaterialRecord>,
}

impl ComparisonTable {
    pub fn new(rows: Vec<MaterialRecord>) -> Self {
        let columns = discovered_columns(&rows);
        ComparisonTable { columns, rows }
    }

    /// 以结果集的列顺序构建（检索结果的终端表格）
    pub fn from_results(results: &ResultSet) -> Self {
        ComparisonTable {
            columns: results.columns(),
            rows: results.records.clone(),
        }
    }

    /// 表头
    pub fn header(&self) -> Vec<String> {
        let mut header = vec!["material_id".to_string(), "formula".to_string()];
        header.extend(self.columns.iter().cloned());
        header
    }

    /// 按列名对齐的单元格文本
    pub fn cells(&self) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .map(|record| {
                let mut row = vec![record.id.clone(), record.formula.clone()];
                row.extend(
                    self.columns
                        .iter()
                        .map(|c| render_cell(c, record.get(c), false)),
                );
                row
            })
            .collect()
    }

    pub fn to_table(&self) -> Table {
        render_table(self.header(), self.cells())
    }
}

/// 以 psql 风格渲染表格
pub fn render_table(header: Vec<String>, rows: Vec<Vec<String>>) -> Table {
    let mut builder = Builder::default();
    builder.push_record(header);
    for row in rows {
        builder.push_record(row);
    }
    let mut table = builder.build();
    table.with(Style::psql());
    table
}

/// 单元格文本；`with_unit` 时附带单位
fn render_cell(name: &str, value: Option<&PropertyValue>, with_unit: bool) -> String {
    let text = property::display_value(name, value);
    match (value, with_unit, property::lookup(name).and_then(|d| d.unit)) {
        (Some(_), true, Some(unit)) => format!("{} {}", text, unit),
        _ => text,
    }
}

/// 获取并生成报告
///
/// 单个 ID 生成摘要，多个 ID 生成对比表。行顺序与 `ids` 一致，
/// 重复 ID 产生重复行。任一 ID 不存在时返回 `NotFound`。
pub fn summarize(
    source: &dyn MaterialsSource,
    ids: &[String],
    properties: &[String],
) -> Result<Report> {
    if ids.is_empty() {
        return Err(MatAggError::validation(
            "at least one material identifier is required",
        ));
    }

    let fetched = client::fetch(source, ids, properties)?;

    let mut rows = Vec::with_capacity(ids.len());
    for id in ids {
        let record = fetched
            .iter()
            .find(|r| &r.id == id)
            .ok_or_else(|| MatAggError::NotFound { id: id.clone() })?;
        rows.push(record.clone());
    }

    if ids.len() == 1 {
        let record = rows.remove(0);
        Ok(Report::Summary(MaterialSummary { record }))
    } else {
        Ok(Report::Comparison(ComparisonTable::new(rows)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::fixture::FixtureSource;

    fn fixture() -> FixtureSource {
        FixtureSource::new(vec![
            MaterialRecord::new("mp-149", "Si")
                .with_property("spacegroup", Some(PropertyValue::Text("Fd-3m".to_string())))
                .with_number("energy_above_hull", 0.0)
                .with_number("band_gap", 0.6105)
                .with_number("k_vrh", 88.3)
                .with_property("g_vrh", None),
            MaterialRecord::new("mp-13", "Fe")
                .with_number("energy_above_hull", 0.0)
                .with_number("band_gap", 0.0)
                .with_number("total_magnetization", 2.2),
        ])
    }

    fn ids(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_single_id_summary_groups() {
        let report = summarize(&fixture(), &ids(&["mp-149"]), &[]).unwrap();
        let Report::Summary(summary) = report else {
            panic!("expected summary");
        };

        let groups: Vec<_> = summary.sections().iter().map(|(g, _)| *g).collect();
        assert_eq!(
            groups,
            vec![
                PropertyGroup::Structure,
                PropertyGroup::Thermodynamics,
                PropertyGroup::Electronic,
                PropertyGroup::Mechanical
            ]
        );

        let text = summary.to_string();
        assert!(text.contains("Material ID: mp-149"));
        assert!(text.contains("Band Gap: 0.61 eV"));
        assert!(text.contains("Bulk Modulus (K_VRH): 88.3 GPa"));
        assert!(text.contains("Shear Modulus (G_VRH): N/A"));
    }

    #[test]
    fn test_zero_is_not_rendered_as_missing() {
        let report = summarize(&fixture(), &ids(&["mp-13"]), &[]).unwrap();
        let text = match report {
            Report::Summary(s) => s.to_string(),
            Report::Comparison(_) => panic!("expected summary"),
        };
        assert!(text.contains("Band Gap: 0.00 eV"));
        assert!(!text.contains("Band Gap: N/A"));
    }

    #[test]
    fn test_comparison_union_columns_and_order() {
        let report = summarize(&fixture(), &ids(&["mp-13", "mp-149", "mp-13"]), &[]).unwrap();
        let Report::Comparison(table) = report else {
            panic!("expected comparison");
        };

        assert_eq!(
            table.columns,
            vec![
                "energy_above_hull",
                "band_gap",
                "total_magnetization",
                "spacegroup",
                "k_vrh",
                "g_vrh"
            ]
        );
        let cells = table.cells();
        assert_eq!(cells.len(), 3);
        assert_eq!(cells[0][0], "mp-13");
        assert_eq!(cells[1][0], "mp-149");
        assert_eq!(cells[2][0], "mp-13");
        // mp-13 没有 spacegroup
        assert_eq!(cells[0][5], "N/A");
        // mp-149 没有 total_magnetization
        assert_eq!(cells[1][4], "N/A");

        let rendered = table.to_table().to_string();
        assert!(rendered.contains("material_id"));
        assert!(rendered.contains("Fd-3m"));
    }

    #[test]
    fn test_missing_id_is_not_found() {
        let err = summarize(&fixture(), &ids(&["mp-149", "mp-9999"]), &[]).unwrap_err();
        match err {
            MatAggError::NotFound { id } => assert_eq!(id, "mp-9999"),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_single_missing_id_is_not_found() {
        let err = summarize(&fixture(), &ids(&["mp-9999"]), &[]).unwrap_err();
        assert!(err.to_string().contains("mp-9999"));
    }

    #[test]
    fn test_table_from_results_keeps_column_order() {
        let rs = ResultSet::detached(vec![
            MaterialRecord::new("mp-1", "Li2O").with_number("density", 2.01),
            MaterialRecord::new("mp-2", "LiO2").with_number("band_gap", 1.5),
        ]);
        let table = ComparisonTable::from_results(&rs);
        assert_eq!(table.header(), vec!["material_id", "formula", "density", "band_gap"]);
        assert_eq!(table.cells()[0][3], "N/A");
    }

    #[test]
    fn test_empty_ids_rejected() {
        assert!(matches!(
            summarize(&fixture(), &[], &[]),
            Err(MatAggError::Validation(_))
        ));
    }
}
