//! 發行素材準備流程
//!
//! 取得中繼資料、定位主要檔案、命名，最後取得截圖交給描述／上傳階段。

mod main;
mod metadata_resolver;
mod name_output;

pub use main::{PipelineOutcome, PreparedRelease, ReleasePipeline, ReleaseRequest, RunMode};
pub use metadata_resolver::{JsonFileResolver, MetadataResolver, resolve_with_retry};
pub use name_output::{NAME_FILE, NameOutput, write_name};
