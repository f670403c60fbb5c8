use crate::error::ToolInvocationError;
use crate::tools::FrameSize;
use log::debug;
use std::path::{Path, PathBuf};
use std::process::Command;

/// 單張截圖任務
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenshotTask {
    pub source: PathBuf,
    pub timestamp_ms: u64,
    pub output_path: PathBuf,
    /// 從 1 開始
    pub index: usize,
    pub frame_size: FrameSize,
}

/// 截圖檔名：`{主檔名}.thumb_{序號:02}.png`
#[must_use]
pub fn screenshot_file_name(stem: &str, index: usize) -> String {
    format!("{stem}.thumb_{index:02}.png")
}

/// 建立截圖任務列表
#[must_use]
pub fn create_screenshot_tasks(
    source: &Path,
    timestamps: &[u64],
    output_dir: &Path,
    frame_size: FrameSize,
) -> Vec<ScreenshotTask> {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    timestamps
        .iter()
        .enumerate()
        .map(|(i, &timestamp_ms)| ScreenshotTask {
            source: source.to_path_buf(),
            timestamp_ms,
            output_path: output_dir.join(screenshot_file_name(&stem, i + 1)),
            index: i + 1,
            frame_size,
        })
        .collect()
}

/// 擷取單一畫面的介面
pub trait FrameExtractor: Send + Sync {
    /// 成功時回傳輸出檔案路徑
    fn extract(&self, task: &ScreenshotTask) -> Result<PathBuf, ToolInvocationError>;
}

/// 透過 ffmpeg 擷取最接近時間點的關鍵幀
#[derive(Debug, Clone)]
pub struct FfmpegFrameExtractor {
    binary: String,
}

impl Default for FfmpegFrameExtractor {
    fn default() -> Self {
        Self {
            binary: "ffmpeg".to_string(),
        }
    }
}

impl FfmpegFrameExtractor {
    #[must_use]
    pub fn with_binary(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// `-ss` 置於 `-i` 之前並只解碼關鍵幀
    #[must_use]
    pub fn build_command(&self, task: &ScreenshotTask) -> Command {
        let mut command = Command::new(&self.binary);
        command
            .arg("-y")
            .arg("-ss")
            .arg(format!("{}ms", task.timestamp_ms))
            .args(["-skip_frame", "nokey"])
            .arg("-i")
            .arg(&task.source)
            .arg("-s")
            .arg(task.frame_size.to_string())
            .args(["-vsync", "0", "-vframes", "1", "-c:v", "png", "-v", "quiet"])
            .arg(&task.output_path);
        command
    }
}

impl FrameExtractor for FfmpegFrameExtractor {
    fn extract(&self, task: &ScreenshotTask) -> Result<PathBuf, ToolInvocationError> {
        debug!(
            "擷取截圖 {}: {}ms -> {}",
            task.index,
            task.timestamp_ms,
            task.output_path.display()
        );

        let output = self
            .build_command(task)
            .output()
            .map_err(|e| ToolInvocationError::new("ffmpeg", &task.source, e))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ToolInvocationError::new(
                "ffmpeg",
                &task.source,
                format!("結束代碼 {}: {}", output.status, stderr.trim()),
            ));
        }

        // ffmpeg 在時間點超出長度時可能成功結束卻沒有輸出
        if !task.output_path.exists() {
            return Err(ToolInvocationError::new(
                "ffmpeg",
                &task.source,
                format!("截圖檔案未建立: {}", task.output_path.display()),
            ));
        }

        Ok(task.output_path.clone())
    }
}
