//! 錯誤分類
//!
//! 命名永遠不會失敗，因此這裡沒有命名相關的錯誤。

use crate::component::release_namer::ReleaseMetadata;
use std::path::PathBuf;
use thiserror::Error;

/// 中繼資料取得失敗（已用盡重試次數）
#[derive(Debug, Error)]
#[error("中繼資料取得失敗: {identifier}（共嘗試 {attempts} 次）: {reason}")]
pub struct MetadataResolutionError {
    pub identifier: String,
    pub attempts: u32,
    pub reason: String,
    /// 最後一次取得的不完整資料
    pub last: Option<Box<ReleaseMetadata>>,
}

/// 無法從媒體檔案取得解析度或長度
#[derive(Debug, Error)]
pub enum MediaProbeError {
    #[error("無法執行 {tool}: {source}")]
    Spawn {
        tool: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error("{tool} 執行失敗: {stderr}")]
    Failed { tool: &'static str, stderr: String },
    #[error("無法解析 {tool} 輸出: {source}")]
    Parse {
        tool: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("找不到視訊串流: {}", .0.display())]
    NoVideoTrack(PathBuf),
    #[error("無法取得影片解析度: {}", .0.display())]
    MissingGeometry(PathBuf),
    #[error("無法取得影片長度: {}", .0.display())]
    MissingDuration(PathBuf),
}

/// 外部工具（ffmpeg、影像最佳化）呼叫失敗
#[derive(Debug, Error)]
#[error("{tool} 處理失敗 {}: {detail}", .target.display())]
pub struct ToolInvocationError {
    pub tool: &'static str,
    pub target: PathBuf,
    pub detail: String,
}

impl ToolInvocationError {
    pub fn new(tool: &'static str, target: impl Into<PathBuf>, detail: impl ToString) -> Self {
        Self {
            tool,
            target: target.into(),
            detail: detail.to_string(),
        }
    }
}

/// 截圖快取／產生失敗
#[derive(Debug, Error)]
pub enum ScreenshotError {
    #[error(transparent)]
    Probe(#[from] MediaProbeError),
    #[error(transparent)]
    Tool(#[from] ToolInvocationError),
    #[error("截圖目錄操作失敗 {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("截圖數量必須介於 1 到 99，收到 {0}")]
    UnsupportedCount(usize),
    #[error("截圖產生已中止")]
    Aborted,
}

impl ScreenshotError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// 流程層級的錯誤
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Metadata(#[from] MetadataResolutionError),
    #[error(transparent)]
    Screenshot(#[from] ScreenshotError),
    #[error("未在目標路徑找到檔案: {}", .0.display())]
    NoMainFile(PathBuf),
    #[error("無法定位主要檔案 {}: {reason}", .path.display())]
    Locate { path: PathBuf, reason: String },
    #[error("檔案操作失敗 {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PipelineError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
