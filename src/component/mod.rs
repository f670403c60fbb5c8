//! 功能元件模組
//!
//! 每個子模組實現一個獨立的功能，包含主要邏輯和專用工具

pub mod release_namer;
pub mod release_pipeline;
pub mod screenshot_generator;

pub use release_namer::NameSynthesizer;
pub use release_pipeline::ReleasePipeline;
pub use screenshot_generator::ScreenshotEngine;
