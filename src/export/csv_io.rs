//! # CSV 导出与读回
//!
//! 表头为 `material_id,formula,<性质列...>`；缺失值写为空单元格，
//! 数值保留完整精度。列顺序由 `ResultSet::columns()` 决定。
//!
//! ## 依赖关系
//! - 被 `commands/` 调用
//! - 使用 `csv` 库读写，`export::write_atomically` 保证原子性

use super::write_atomically;
use crate::analysis::report::ComparisonTable;
use crate::error::{MatAggError, Result};
use crate::models::{MaterialRecord, PropertyValue, ResultSet};

use std::collections::HashSet;
use std::fs::File;
use std::path::Path;
use tracing::warn;

const ID_COLUMN: &str = "material_id";
const FORMULA_COLUMN: &str = "formula";

/// 导出结果集
pub fn export_csv(results: &ResultSet, output_path: &Path) -> Result<()> {
    write_records(&results.records, &results.columns(), output_path)
}

/// 导出对比表（行顺序与重复行原样保留）
pub fn export_comparison_csv(table: &ComparisonTable, output_path: &Path) -> Result<()> {
    write_records(&table.rows, &table.columns, output_path)
}

fn write_records(records: &[MaterialRecord], columns: &[String], output_path: &Path) -> Result<()> {
    write_atomically(output_path, |tmp| {
        let mut wtr = csv::Writer::from_path(tmp)?;

        let mut header = vec![ID_COLUMN.to_string(), FORMULA_COLUMN.to_string()];
        header.extend(columns.iter().cloned());
        wtr.write_record(&header)?;

        for record in records {
            let mut row = vec![record.id.clone(), record.formula.clone()];
            row.extend(columns.iter().map(|c| {
                record
                    .get(c)
                    .map(PropertyValue::to_csv_field)
                    .unwrap_or_default()
            }));
            wtr.write_record(&row)?;
        }

        wtr.flush().map_err(|e| MatAggError::FileWriteError {
            path: output_path.display().to_string(),
            source: e,
        })
    })
}

/// 读回 `export_csv` 写出的文件
///
/// 空单元格还原为缺失值；重复 ID 以首次出现为准。
pub fn read_csv(input_path: &Path) -> Result<ResultSet> {
    let file = File::open(input_path).map_err(|e| MatAggError::FileReadError {
        path: input_path.display().to_string(),
        source: e,
    })?;
    let mut rdr = csv::Reader::from_reader(file);

    let headers = rdr.headers()?.clone();
    if headers.get(0) != Some(ID_COLUMN) || headers.get(1) != Some(FORMULA_COLUMN) {
        return Err(MatAggError::validation(format!(
            "'{}' does not start with columns {},{}",
            input_path.display(),
            ID_COLUMN,
            FORMULA_COLUMN
        )));
    }
    let columns: Vec<String> = headers.iter().skip(2).map(str::to_string).collect();

    let mut seen: HashSet<String> = HashSet::new();
    let mut records = Vec::new();

    for (line, row) in rdr.records().enumerate() {
        let row = row?;
        let id = row.get(0).unwrap_or_default().trim();
        if id.is_empty() {
            return Err(MatAggError::validation(format!(
                "'{}' row {} has an empty material_id",
                input_path.display(),
                line + 1
            )));
        }
        if !seen.insert(id.to_string()) {
            warn!("Duplicate material id '{}' in {}; keeping first occurrence", id, input_path.display());
            continue;
        }

        let mut record = MaterialRecord::new(id, row.get(1).unwrap_or_default());
        for (i, name) in columns.iter().enumerate() {
            let value = row.get(i + 2).and_then(|f| PropertyValue::from_csv_field(name, f));
            record.properties.insert(name.clone(), value);
        }
        records.push(record);
    }

    Ok(ResultSet::detached(records))
}
