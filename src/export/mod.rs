//! # 导出模块
//!
//! 将结果集写为 CSV，或将相关性分析结果绘制为散点图。
//!
//! 所有写入都先写到目标目录下的临时文件，成功后再重命名覆盖目标路径，
//! 中途失败不会留下看似完整的文件。已存在的目标文件会被直接覆盖。
//!
//! ## 子模块
//! - `csv_io`: CSV 导出与读回
//! - `plot`: 散点图 (PNG/SVG)
//!
//! ## 依赖关系
//! - 被 `commands/` 调用
//! - 使用 `tempfile` 实现原子写入

pub mod csv_io;
pub mod plot;

pub use csv_io::{export_comparison_csv, export_csv, read_csv};
pub use plot::save_plot;

use crate::error::{MatAggError, Result};

use std::path::Path;
use tracing::debug;

/// 原子写入：`write` 写入临时文件路径，成功后重命名为 `path`
///
/// 临时文件保留目标扩展名（绘图后端按扩展名工作）。
pub fn write_atomically<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&Path) -> Result<()>,
{
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let suffix = path
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default();

    let write_error = |source: std::io::Error| MatAggError::FileWriteError {
        path: path.display().to_string(),
        source,
    };

    let tmp = tempfile::Builder::new()
        .prefix(".matagg-")
        .suffix(&suffix)
        .tempfile_in(dir)
        .map_err(write_error)?;

    // 失败时 tmp 被 drop，临时文件随之删除
    write(tmp.path())?;

    tmp.persist(path).map_err(|e| write_error(e.error))?;
    debug!("Wrote {}", path.display());
    Ok(())
}
