use super::metadata_resolver::{JsonFileResolver, MetadataResolver, resolve_with_retry};
use super::name_output::{NameOutput, write_name};
use crate::component::release_namer::{NameOverrides, NameSynthesizer, ReleaseMetadata};
use crate::component::screenshot_generator::{ScreenshotEngine, ScreenshotSet};
use crate::config::UserSettings;
use crate::error::{PipelineError, ScreenshotError};
use crate::tools::{MainFile, MediaInfoProber, MediaProber, TrackInfo, locate_main_file};
use log::{info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

/// 執行模式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RunMode {
    /// 命名後繼續產生截圖
    #[default]
    Full,
    /// 只產生名稱並提早結束
    NameOnly(NameOutput),
}

/// 一次準備作業的輸入
#[derive(Debug, Clone, Default)]
pub struct ReleaseRequest {
    /// 發行內容的檔案或資料夾
    pub target: PathBuf,
    /// 交給中繼資料來源的識別碼
    pub identifier: String,
    pub overrides: NameOverrides,
    pub mode: RunMode,
}

/// 交給描述／上傳階段的成果
#[derive(Debug, Clone)]
pub struct PreparedRelease {
    pub name: String,
    pub metadata: ReleaseMetadata,
    /// 探測失敗時為 None
    pub track_info: Option<TrackInfo>,
    pub main_file: MainFile,
    /// 停用截圖或探測失敗時為 None
    pub screenshots: Option<ScreenshotSet>,
}

#[derive(Debug, Clone)]
pub enum PipelineOutcome {
    /// 只產生名稱：名稱與寫出（或改名後）的路徑
    NameOnly { name: String, written: PathBuf },
    Prepared(PreparedRelease),
}

/// 發行素材準備流程
///
/// 中繼資料（含重試）→ 定位主要檔案 → 命名 → 截圖
pub struct ReleasePipeline {
    resolver: Arc<dyn MetadataResolver>,
    prober: Arc<dyn MediaProber>,
    synthesizer: NameSynthesizer,
    screenshots: ScreenshotEngine,
    screenshot_count: usize,
    metadata_retry: u32,
}

impl ReleasePipeline {
    #[must_use]
    pub fn new(settings: &UserSettings, shutdown_signal: Arc<AtomicBool>) -> Self {
        Self {
            resolver: Arc::new(JsonFileResolver::default()),
            prober: Arc::new(MediaInfoProber::default()),
            synthesizer: NameSynthesizer::new(settings.naming.to_options()),
            screenshots: ScreenshotEngine::new(&settings.screenshot, shutdown_signal),
            screenshot_count: settings.screenshot.count,
            metadata_retry: settings.metadata.retry,
        }
    }

    #[must_use]
    pub fn with_resolver(mut self, resolver: Arc<dyn MetadataResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    #[must_use]
    pub fn with_prober(mut self, prober: Arc<dyn MediaProber>) -> Self {
        self.prober = prober;
        self
    }

    #[must_use]
    pub fn with_screenshot_engine(mut self, engine: ScreenshotEngine) -> Self {
        self.screenshots = engine;
        self
    }

    /// 截圖時顯示進度條
    #[must_use]
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.screenshots = self.screenshots.with_progress(show_progress);
        self
    }

    pub fn prepare_artifacts(&self, request: &ReleaseRequest) -> Result<PipelineOutcome, PipelineError> {
        let metadata = resolve_with_retry(
            self.resolver.as_ref(),
            &request.identifier,
            self.metadata_retry,
        )?;

        let main_file = locate_main_file(&request.target)
            .map_err(|e| PipelineError::Locate {
                path: request.target.clone(),
                reason: format!("{e:#}"),
            })?
            .ok_or_else(|| PipelineError::NoMainFile(request.target.clone()))?;
        info!(
            "主要檔案: {} ({} bytes)",
            main_file.path.display(),
            main_file.size
        );

        let track_info = match self.prober.probe(&main_file.path) {
            Ok(info) => Some(info),
            Err(e) => {
                warn!("無法取得媒體資訊，名稱將略過編碼資訊: {e}");
                None
            }
        };

        let name = self.synthesizer.synthesize(
            &metadata,
            track_info.as_ref().unwrap_or(&TrackInfo::default()),
            &request.overrides,
        );
        info!("發行名稱: {name}");

        if let RunMode::NameOnly(output) = request.mode {
            let written = write_name(output, &main_file.path, &name)?;
            return Ok(PipelineOutcome::NameOnly { name, written });
        }

        let screenshots = self.screenshots_for(&request.target, &main_file, track_info.as_ref())?;

        Ok(PipelineOutcome::Prepared(PreparedRelease {
            name,
            metadata,
            track_info,
            main_file,
            screenshots,
        }))
    }

    /// 媒體探測失敗只略過截圖，其他錯誤往上拋
    fn screenshots_for(
        &self,
        target: &Path,
        main_file: &MainFile,
        track_info: Option<&TrackInfo>,
    ) -> Result<Option<ScreenshotSet>, PipelineError> {
        if self.screenshot_count == 0 {
            info!("截圖已停用");
            return Ok(None);
        }
        let Some(track_info) = track_info else {
            warn!("略過截圖：沒有媒體資訊");
            return Ok(None);
        };

        // 單檔發行以檔案本身作為快取身分，同資料夾內的多個發行不共用截圖
        match self.screenshots.ensure_with_track_info(
            target,
            &main_file.path,
            track_info,
            self.screenshot_count,
        ) {
            Ok(set) => Ok(Some(set)),
            Err(ScreenshotError::Probe(e)) => {
                warn!("略過截圖: {e}");
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }
}
