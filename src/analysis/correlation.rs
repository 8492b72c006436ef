//! # 性质相关性分析
//!
//! 计算两个数值性质之间的 Pearson 相关系数与最小二乘趋势线，
//! 并生成可直接绘图的坐标序列。
//!
//! ## 公式
//! r = Σ(x-x̄)(y-ȳ) / √(Σ(x-x̄)² · Σ(y-ȳ)²)
//! slope = Σ(x-x̄)(y-ȳ) / Σ(x-x̄)²
//!
//! ## 依赖关系
//! - 被 `commands/trend.rs` 调用
//! - 结果交给 `export/plot.rs` 绘图

use crate::error::{MatAggError, Result};
use crate::export::plot::PlotArtifact;
use crate::models::property::humanize;
use crate::models::ResultSet;

use tracing::debug;

/// 单个数据点（按材料 ID 配对）
#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    pub id: String,
    pub x: f64,
    pub y: f64,
}

/// 线性趋势 y = slope·x + intercept
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendLine {
    pub slope: f64,
    pub intercept: f64,
}

impl TrendLine {
    pub fn at(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

/// 相关性分析结果
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationReport {
    pub prop_x: String,
    pub prop_y: String,
    pub points: Vec<Point>,
    /// 缺少任一性质而被丢弃的记录数
    pub dropped: usize,
    /// 任一方差为 0 时无定义
    pub pearson: Option<f64>,
    /// x 方差为 0 时无定义
    pub trend: Option<TrendLine>,
}

impl CorrelationReport {
    pub fn retained(&self) -> usize {
        self.points.len()
    }

    /// 转换为散点图数据
    pub fn to_plot(&self) -> PlotArtifact {
        let title = match self.pearson {
            Some(r) => format!("Correlation: {:.2}", r),
            None => "Correlation: undefined".to_string(),
        };
        PlotArtifact {
            title,
            x_label: humanize(&self.prop_x),
            y_label: humanize(&self.prop_y),
            points: self.points.iter().map(|p| (p.x, p.y)).collect(),
            trend: self.trend,
        }
    }
}

/// 分析两个性质的相关性
///
/// 任一性质缺失的记录被丢弃（不插补）；可用记录少于 2 条时报错。
pub fn analyze(results: &ResultSet, prop_x: &str, prop_y: &str) -> Result<CorrelationReport> {
    let points: Vec<Point> = results
        .records
        .iter()
        .filter_map(|r| match (r.number(prop_x), r.number(prop_y)) {
            (Some(x), Some(y)) if x.is_finite() && y.is_finite() => Some(Point {
                id: r.id.clone(),
                x,
                y,
            }),
            _ => None,
        })
        .collect();

    let dropped = results.records.len() - points.len();
    if points.len() < 2 {
        return Err(MatAggError::InsufficientData {
            prop_x: prop_x.to_string(),
            prop_y: prop_y.to_string(),
            usable: points.len(),
        });
    }

    let n = points.len() as f64;
    let mean_x = points.iter().map(|p| p.x).sum::<f64>() / n;
    let mean_y = points.iter().map(|p| p.y).sum::<f64>() / n;

    let mut sxx = 0.0;
    let mut syy = 0.0;
    let mut sxy = 0.0;
    for p in &points {
        let dx = p.x - mean_x;
        let dy = p.y - mean_y;
        sxx += dx * dx;
        syy += dy * dy;
        sxy += dx * dy;
    }

    let pearson = if sxx > 0.0 && syy > 0.0 {
        Some((sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0))
    } else {
        None
    };

    let trend = (sxx > 0.0).then(|| {
        let slope = sxy / sxx;
        TrendLine {
            slope,
            intercept: mean_y - slope * mean_x,
        }
    });

    debug!(
        "Correlation {} vs {}: n={}, dropped={}, r={:?}",
        prop_x,
        prop_y,
        points.len(),
        dropped,
        pearson
    );

    Ok(CorrelationReport {
        prop_x: prop_x.to_string(),
        prop_y: prop_y.to_string(),
        points,
        dropped,
        pearson,
        trend,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MaterialRecord, PropertyValue};

    fn record(id: &str, fe: Option<f64>, gap: Option<f64>) -> MaterialRecord {
        MaterialRecord::new(id, "X")
            .with_property("formation_energy_per_atom", fe.map(PropertyValue::Number))
            .with_property("band_gap", gap.map(PropertyValue::Number))
    }

    #[test]
    fn test_drops_records_missing_a_property() {
        let rs = ResultSet::detached(vec![
            record("mp-1", Some(-1.0), Some(1.0)),
            record("mp-2", Some(-2.0), None),
            record("mp-3", Some(-3.0), Some(3.0)),
            record("mp-4", Some(-4.0), Some(4.5)),
        ]);
        let report = analyze(&rs, "formation_energy_per_atom", "band_gap").unwrap();
        assert_eq!(report.retained(), 3);
        assert_eq!(report.dropped, 1);
        let ids: Vec<_> = report.points.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["mp-1", "mp-3", "mp-4"]);
        assert!(report.pearson.unwrap() < -0.9);
    }

    #[test]
    fn test_perfect_linear_relation() {
        let rs = ResultSet::detached(vec![
            record("a", Some(1.0), Some(3.0)),
            record("b", Some(2.0), Some(5.0)),
            record("c", Some(3.0), Some(7.0)),
        ]);
        let report = analyze(&rs, "formation_energy_per_atom", "band_gap").unwrap();
        assert!((report.pearson.unwrap() - 1.0).abs() < 1e-12);
        let trend = report.trend.unwrap();
        assert!((trend.slope - 2.0).abs() < 1e-12);
        assert!((trend.intercept - 1.0).abs() < 1e-12);
        assert!((trend.at(4.0) - 9.0).abs() < 1e-12);
    }

    #[test]
    fn test_insufficient_data() {
        let rs = ResultSet::detached(vec![
            record("a", Some(1.0), Some(3.0)),
            record("b", None, Some(5.0)),
        ]);
        let err = analyze(&rs, "formation_energy_per_atom", "band_gap").unwrap_err();
        match err {
            MatAggError::InsufficientData { usable, .. } => assert_eq!(usable, 1),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_zero_variance_is_undefined() {
        let rs = ResultSet::detached(vec![
            record("a", Some(1.0), Some(3.0)),
            record("b", Some(1.0), Some(5.0)),
        ]);
        let report = analyze(&rs, "formation_energy_per_atom", "band_gap").unwrap();
        assert_eq!(report.pearson, None);
        assert_eq!(report.trend, None);
        assert_eq!(report.to_plot().title, "Correlation: undefined");
    }

    #[test]
    fn test_plot_labels() {
        let rs = ResultSet::detached(vec![
            record("a", Some(1.0), Some(3.0)),
            record("b", Some(2.0), Some(5.0)),
        ]);
        let plot = analyze(&rs, "formation_energy_per_atom", "band_gap")
            .unwrap()
            .to_plot();
        assert_eq!(plot.x_label, "Formation Energy per Atom");
        assert_eq!(plot.y_label, "Band Gap");
        assert_eq!(plot.title, "Correlation: 1.00");
        assert_eq!(plot.points.len(), 2);
    }
}
