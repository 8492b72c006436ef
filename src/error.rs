//! # 统一错误处理模块
//!
//! 定义 matagg 的所有错误类型，使用 `thiserror` 派生。
//!
//! ## 错误分类
//! - `Configuration`: 缺少或无效的 API 凭据
//! - `Retrieval`: 网络失败或外部数据源返回格式错误
//! - `NotFound`: 请求的材料 ID 不存在
//! - `Validation`: 元素列表、过滤条件或 limit 非法
//! - `InsufficientData`: 相关性分析可用数据点少于 2 个
//!
//! ## 依赖关系
//! - 被所有其他模块使用
//! - 无外部模块依赖

use thiserror::Error;

/// matagg 统一错误类型
#[derive(Error, Debug)]
pub enum MatAggError {
    // ─────────────────────────────────────────────────────────────
    // 配置与凭据
    // ─────────────────────────────────────────────────────────────
    #[error("Configuration error: {0}")]
    Configuration(String),

    // ─────────────────────────────────────────────────────────────
    // 外部数据源
    // ─────────────────────────────────────────────────────────────
    #[error("Retrieval error: {0}")]
    Retrieval(String),

    #[error("NotFound error: material '{id}' does not exist")]
    NotFound { id: String },

    // ─────────────────────────────────────────────────────────────
    // 输入校验
    // ─────────────────────────────────────────────────────────────
    #[error("Validation error: {0}")]
    Validation(String),

    // ─────────────────────────────────────────────────────────────
    // 统计分析
    // ─────────────────────────────────────────────────────────────
    #[error(
        "InsufficientData error: only {usable} record(s) have both '{prop_x}' and '{prop_y}', at least 2 are required"
    )]
    InsufficientData {
        prop_x: String,
        prop_y: String,
        usable: usize,
    },

    // ─────────────────────────────────────────────────────────────
    // I/O 错误
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to read file: {path}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file: {path}")]
    FileWriteError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Plot rendering failed: {0}")]
    PlotError(String),
}

impl MatAggError {
    /// 错误类别名称，用于终端提示
    pub fn kind(&self) -> &'static str {
        match self {
            MatAggError::Configuration(_) => "ConfigurationError",
            MatAggError::Retrieval(_) => "RetrievalError",
            MatAggError::NotFound { .. } => "NotFoundError",
            MatAggError::Validation(_) => "ValidationError",
            MatAggError::InsufficientData { .. } => "InsufficientDataError",
            MatAggError::FileReadError { .. } | MatAggError::FileWriteError { .. } => "IoError",
            MatAggError::CsvError(_) => "CsvError",
            MatAggError::PlotError(_) => "PlotError",
        }
    }

    /// 终端提示文本，总以类别名开头；I/O 错误附带底层原因
    pub fn user_message(&self) -> String {
        match self {
            MatAggError::FileReadError { source, .. } | MatAggError::FileWriteError { source, .. } => {
                format!("{}: {}: {}", self.kind(), self, source)
            }
            MatAggError::CsvError(_) | MatAggError::PlotError(_) => {
                format!("{}: {}", self.kind(), self)
            }
            _ => self.to_string(),
        }
    }

    pub(crate) fn validation(msg: impl Into<String>) -> Self {
        MatAggError::Validation(msg.into())
    }

    pub(crate) fn retrieval(msg: impl Into<String>) -> Self {
        MatAggError::Retrieval(msg.into())
    }
}

/// Result 类型别名
pub type Result<T> = std::result::Result<T, MatAggError>;
