use super::cache_index::{CacheIndex, CacheKey, ScreenshotSet, WriterLock};
use super::frame_extractor::{
    FfmpegFrameExtractor, FrameExtractor, ScreenshotTask, create_screenshot_tasks,
};
use super::image_optimizer::{ImageOptimizer, PngOptimizer};
use super::timestamp_planner::plan_timestamps;
use crate::config::{ImageHosting, ScreenshotSettings};
use crate::error::{MediaProbeError, ScreenshotError};
use crate::tools::{MediaInfoProber, MediaProber, TrackInfo};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, error, info};
use rayon::prelude::*;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

/// 單次可要求的截圖上限（檔名序號為兩位數）
pub const MAX_SCREENSHOTS: usize = 99;
/// 等待其他產生者時的查詢間隔
const LOCK_POLL_INTERVAL: Duration = Duration::from_millis(200);

/// 截圖快取或產生引擎
///
/// 流程：
/// 1. 探測影片長度與顯示尺寸
/// 2. 查詢快取，數量完全相符即直接使用
/// 3. 取得產生者鎖；已有其他程序在產生時等待其結果
/// 4. 在暫存目錄平行擷取截圖，必要時最佳化
/// 5. 原子性改名為最終快取目錄
pub struct ScreenshotEngine {
    prober: Arc<dyn MediaProber>,
    extractor: Arc<dyn FrameExtractor>,
    optimizer: Option<Arc<dyn ImageOptimizer>>,
    index: CacheIndex,
    hosting: ImageHosting,
    workers: usize,
    timeout: Option<Duration>,
    show_progress: bool,
    shutdown_signal: Arc<AtomicBool>,
}

impl ScreenshotEngine {
    #[must_use]
    pub fn new(settings: &ScreenshotSettings, shutdown_signal: Arc<AtomicBool>) -> Self {
        let optimizer: Option<Arc<dyn ImageOptimizer>> = if settings.optimize {
            Some(Arc::new(PngOptimizer))
        } else {
            None
        };

        Self {
            prober: Arc::new(MediaInfoProber::default()),
            extractor: Arc::new(FfmpegFrameExtractor::default()),
            optimizer,
            index: CacheIndex::new(settings.cache_root.as_deref(), settings.cache_match),
            hosting: settings.image_hosting,
            workers: settings.workers.max(1),
            timeout: settings.timeout(),
            show_progress: false,
            shutdown_signal,
        }
    }

    #[must_use]
    pub fn with_prober(mut self, prober: Arc<dyn MediaProber>) -> Self {
        self.prober = prober;
        self
    }

    #[must_use]
    pub fn with_extractor(mut self, extractor: Arc<dyn FrameExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    #[must_use]
    pub fn with_optimizer(mut self, optimizer: Option<Arc<dyn ImageOptimizer>>) -> Self {
        self.optimizer = optimizer;
        self
    }

    #[must_use]
    pub const fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    #[must_use]
    pub const fn index(&self) -> &CacheIndex {
        &self.index
    }

    /// 探測主檔案後取得截圖
    ///
    /// `source` 是快取身分：發行資料夾，或單檔發行的檔案本身。
    pub fn ensure_screenshots(
        &self,
        source: &Path,
        main_file: &Path,
        count: usize,
    ) -> Result<ScreenshotSet, ScreenshotError> {
        validate_count(count)?;
        let track_info = self.prober.probe(main_file)?;
        self.ensure_with_track_info(source, main_file, &track_info, count)
    }

    /// 使用已探測的軌道資訊取得截圖
    pub fn ensure_with_track_info(
        &self,
        source: &Path,
        main_file: &Path,
        track_info: &TrackInfo,
        count: usize,
    ) -> Result<ScreenshotSet, ScreenshotError> {
        validate_count(count)?;
        let deadline = self.timeout.map(|t| Instant::now() + t);

        let frame_size = track_info
            .frame_size()
            .ok_or_else(|| MediaProbeError::MissingGeometry(main_file.to_path_buf()))?;
        let duration_ms = track_info
            .duration_ms()
            .ok_or_else(|| MediaProbeError::MissingDuration(main_file.to_path_buf()))?;

        let key = CacheKey::for_source(source, count, self.hosting);
        let lock = match self.acquire_or_wait(&key, deadline)? {
            Acquired::Cached(set) => return Ok(set),
            Acquired::Writer(lock) => lock,
        };

        info!(
            "產生 {count} 張截圖 ({frame_size}, 長度 {duration_ms}ms): {}",
            main_file.display()
        );

        let staging = self.index.create_staging(&key)?;
        let timestamps = plan_timestamps(duration_ms, count);
        let tasks = create_screenshot_tasks(main_file, &timestamps, &staging, frame_size);

        match self.generate(&tasks, &staging, deadline, &lock) {
            Ok(images) => {
                debug!("完成 {} 張截圖", images.len());
                self.index.publish(&staging, &key).inspect_err(|_| {
                    self.index.discard_staging(&staging);
                })
            }
            Err(e) => {
                self.index.discard_staging(&staging);
                Err(e)
            }
        }
    }

    /// 鎖被其他程序持有時輪詢等待，直到對方發佈結果或鎖被釋放
    fn acquire_or_wait(
        &self,
        key: &CacheKey,
        deadline: Option<Instant>,
    ) -> Result<Acquired, ScreenshotError> {
        let mut waiting = false;
        loop {
            if let Some(set) = self.index.lookup(key)? {
                return Ok(Acquired::Cached(set));
            }
            if let Some(lock) = self.index.try_lock(key)? {
                // 前一個產生者可能剛發佈完才釋放鎖
                if let Some(set) = self.index.lookup(key)? {
                    return Ok(Acquired::Cached(set));
                }
                return Ok(Acquired::Writer(lock));
            }
            if !waiting {
                info!("其他程序正在產生相同截圖，等待中: {}", key.directory_name());
                waiting = true;
            }
            self.check_abort(deadline)?;
            thread::sleep(LOCK_POLL_INTERVAL);
        }
    }

    fn generate(
        &self,
        tasks: &[ScreenshotTask],
        staging: &Path,
        deadline: Option<Instant>,
        lock: &WriterLock,
    ) -> Result<Vec<PathBuf>, ScreenshotError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.workers)
            .build()
            .map_err(|e| ScreenshotError::io(staging, io::Error::other(e)))?;

        let progress_bar = self.progress_bar(tasks.len());

        let result = pool.install(|| {
            tasks
                .par_iter()
                .map(|task| {
                    let outcome = self.run_task(task, deadline);
                    lock.renew();
                    match &outcome {
                        Ok(_) => progress_bar.inc(1),
                        Err(ScreenshotError::Aborted) => {}
                        Err(e) => error!("截圖 {} 失敗: {e}", task.index),
                    }
                    outcome
                })
                .collect::<Result<Vec<_>, _>>()
        });

        match &result {
            Ok(_) => progress_bar.finish_and_clear(),
            Err(_) => progress_bar.abandon_with_message("截圖已中斷"),
        }
        result
    }

    fn run_task(
        &self,
        task: &ScreenshotTask,
        deadline: Option<Instant>,
    ) -> Result<PathBuf, ScreenshotError> {
        self.check_abort(deadline)?;
        let path = self.extractor.extract(task)?;

        if let Some(optimizer) = &self.optimizer {
            self.check_abort(deadline)?;
            optimizer.optimize(&path)?;
        }
        Ok(path)
    }

    fn check_abort(&self, deadline: Option<Instant>) -> Result<(), ScreenshotError> {
        if self.shutdown_signal.load(Ordering::SeqCst) {
            return Err(ScreenshotError::Aborted);
        }
        if deadline.is_some_and(|d| Instant::now() >= d) {
            return Err(ScreenshotError::Aborted);
        }
        Ok(())
    }

    fn progress_bar(&self, len: usize) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }

        let progress_bar = ProgressBar::new(len as u64);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")
        {
            progress_bar.set_style(style.progress_chars("#>-"));
        }
        progress_bar.set_message("擷取截圖中...");
        progress_bar
    }
}

enum Acquired {
    Cached(ScreenshotSet),
    Writer(WriterLock),
}

fn validate_count(count: usize) -> Result<(), ScreenshotError> {
    if count == 0 || count > MAX_SCREENSHOTS {
        return Err(ScreenshotError::UnsupportedCount(count));
    }
    Ok(())
}
