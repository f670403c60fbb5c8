//! 截圖快取或產生元件
//!
//! 以來源資料夾為鍵查詢快取，未命中時由單一產生者平行擷取截圖並原子性地寫入快取。

mod cache_index;
mod frame_extractor;
mod image_optimizer;
mod main;
mod timestamp_planner;

pub use cache_index::{
    CACHE_DIR_PREFIX, CacheIndex, CacheKey, STALE_LOCK_AGE, ScreenshotSet, WriterLock,
};
pub use frame_extractor::{
    FfmpegFrameExtractor, FrameExtractor, ScreenshotTask, create_screenshot_tasks,
    screenshot_file_name,
};
pub use image_optimizer::{ImageOptimizer, PngOptimizer};
pub use main::{MAX_SCREENSHOTS, ScreenshotEngine};
pub use timestamp_planner::plan_timestamps;
