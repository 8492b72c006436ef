//! # 散点图生成
//!
//! 使用 `plotters` 绘制两个性质的散点图，可叠加最小二乘趋势线。
//! 输出格式由文件扩展名决定：`.png` 或 `.svg`。
//!
//! ## 依赖关系
//! - 被 `commands/trend.rs` 调用
//! - 数据来自 `analysis/correlation.rs` 的 `CorrelationReport::to_plot`
//! - 使用 `plotters` 渲染图表

use super::write_atomically;
use crate::analysis::correlation::TrendLine;
use crate::error::{MatAggError, Result};

use plotters::prelude::*;
use std::ops::Range;
use std::path::Path;

/// 默认图像尺寸
pub const DEFAULT_SIZE: (u32, u32) = (1000, 700);

/// 可直接绘制的散点图数据
#[derive(Debug, Clone, PartialEq)]
pub struct PlotArtifact {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub points: Vec<(f64, f64)>,
    pub trend: Option<TrendLine>,
}

/// 图像格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlotFormat {
    Png,
    Svg,
}

impl PlotFormat {
    /// 按扩展名判断格式（不区分大小写）
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "png" => Ok(PlotFormat::Png),
            "svg" => Ok(PlotFormat::Svg),
            _ => Err(MatAggError::validation(format!(
                "unsupported plot format for '{}' (use .png or .svg)",
                path.display()
            ))),
        }
    }
}

/// 保存散点图
pub fn save_plot(artifact: &PlotArtifact, output_path: &Path, width: u32, height: u32) -> Result<()> {
    let format = PlotFormat::from_path(output_path)?;
    if artifact.points.is_empty() {
        return Err(MatAggError::PlotError("no points to plot".to_string()));
    }

    write_atomically(output_path, |tmp| match format {
        PlotFormat::Svg => {
            let root = SVGBackend::new(tmp, (width, height)).into_drawing_area();
            draw_scatter(&root, artifact)?;
            root.present()
                .map_err(|e| MatAggError::PlotError(e.to_string()))
        }
        PlotFormat::Png => {
            let root = BitMapBackend::new(tmp, (width, height)).into_drawing_area();
            draw_scatter(&root, artifact)?;
            root.present()
                .map_err(|e| MatAggError::PlotError(e.to_string()))
        }
    })
}

/// 绘制散点与趋势线
fn draw_scatter<DB: DrawingBackend>(
    root: &DrawingArea<DB, plotters::coord::Shift>,
    artifact: &PlotArtifact,
) -> Result<()>
where
    DB::ErrorType: 'static,
{
    root.fill(&WHITE)
        .map_err(|e| MatAggError::PlotError(format!("{:?}", e)))?;

    let x_range = axis_range(artifact.points.iter().map(|(x, _)| *x));
    let y_range = axis_range(artifact.points.iter().map(|(_, y)| *y));

    let mut chart = ChartBuilder::on(root)
        .caption(&artifact.title, ("sans-serif", 28).into_font())
        .margin(30)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d(x_range.clone(), y_range)
        .map_err(|e| MatAggError::PlotError(format!("{:?}", e)))?;

    chart
        .configure_mesh()
        .x_desc(artifact.x_label.as_str())
        .y_desc(artifact.y_label.as_str())
        .x_label_style(("sans-serif", 16))
        .y_label_style(("sans-serif", 16))
        .axis_desc_style(("sans-serif", 18))
        .draw()
        .map_err(|e| MatAggError::PlotError(format!("{:?}", e)))?;

    let point_color = RGBColor(0, 102, 204);
    chart
        .draw_series(
            artifact
                .points
                .iter()
                .map(|&(x, y)| Circle::new((x, y), 4, point_color.mix(0.7).filled())),
        )
        .map_err(|e| MatAggError::PlotError(format!("{:?}", e)))?;

    if let Some(trend) = artifact.trend {
        let line_color = RGBColor(204, 51, 0);
        chart
            .draw_series(LineSeries::new(
                [x_range.start, x_range.end]
                    .into_iter()
                    .map(|x| (x, trend.at(x))),
                line_color.stroke_width(2),
            ))
            .map_err(|e| MatAggError::PlotError(format!("{:?}", e)))?;
    }

    Ok(())
}

/// 坐标轴范围：数据范围两侧各留 5%；单值时取 ±1
fn axis_range(values: impl Iterator<Item = f64>) -> Range<f64> {
    let (min, max) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if !min.is_finite() || !max.is_finite() {
        return 0.0..1.0;
    }
    let span = max - min;
    if span == 0.0 {
        return (min - 1.0)..(max + 1.0);
    }
    let pad = span * 0.05;
    (min - pad)..(max + pad)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(PlotFormat::from_path(Path::new("a.png")).unwrap(), PlotFormat::Png);
        assert_eq!(PlotFormat::from_path(Path::new("out/b.SVG")).unwrap(), PlotFormat::Svg);
        assert!(matches!(
            PlotFormat::from_path(Path::new("c.jpg")),
            Err(MatAggError::Validation(_))
        ));
        assert!(PlotFormat::from_path(Path::new("noext")).is_err());
    }

    #[test]
    fn test_axis_range_padding() {
        let r = axis_range([0.0, 10.0, 5.0].into_iter());
        assert!((r.start + 0.5).abs() < 1e-12);
        assert!((r.end - 10.5).abs() < 1e-12);
    }

    #[test]
    fn test_axis_range_single_value() {
        let r = axis_range([2.0, 2.0].into_iter());
        assert_eq!(r, 1.0..3.0);
    }

    #[test]
    fn test_unsupported_format_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plot.pdf");
        let artifact = PlotArtifact {
            title: "Correlation: 1.00".to_string(),
            x_label: "X".to_string(),
            y_label: "Y".to_string(),
            points: vec![(0.0, 0.0), (1.0, 1.0)],
            trend: None,
        };
        assert!(save_plot(&artifact, &path, 400, 300).is_err());
        assert!(!path.exists());
    }
}
