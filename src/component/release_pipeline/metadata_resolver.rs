use crate::component::release_namer::ReleaseMetadata;
use crate::error::MetadataResolutionError;
use log::{info, warn};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// 中繼資料來源
///
/// 失敗以 `failed` 旗標表示，重試由呼叫端負責。
pub trait MetadataResolver: Send + Sync {
    fn fetch(&self, identifier: &str) -> ReleaseMetadata;
}

/// 從 PT-Gen 格式的 JSON 檔讀取中繼資料，識別碼即檔案路徑
#[derive(Debug, Clone, Default)]
pub struct JsonFileResolver {
    base_dir: Option<PathBuf>,
}

impl JsonFileResolver {
    /// 相對路徑以 `base_dir` 為基準
    #[must_use]
    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: Some(base_dir.into()),
        }
    }

    fn resolve_path(&self, identifier: &str) -> PathBuf {
        let path = Path::new(identifier.trim());
        match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }
}

impl MetadataResolver for JsonFileResolver {
    fn fetch(&self, identifier: &str) -> ReleaseMetadata {
        let path = self.resolve_path(identifier);

        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => return ReleaseMetadata::failed(format!("無法讀取 {}: {e}", path.display())),
        };

        let document: Value = match serde_json::from_str(&content) {
            Ok(document) => document,
            Err(e) => return ReleaseMetadata::failed(format!("JSON 格式錯誤: {e}")),
        };

        // PT-Gen 以 success=false 回報失敗
        if document.get("success").and_then(Value::as_bool) == Some(false) {
            let reason = document
                .get("error")
                .and_then(Value::as_str)
                .unwrap_or("Unknown error");
            return ReleaseMetadata::failed(reason);
        }

        serde_json::from_value(document)
            .unwrap_or_else(|e| ReleaseMetadata::failed(format!("欄位格式錯誤: {e}")))
    }
}

/// 取得中繼資料，失敗時依序重試，總嘗試次數為 1 + retry
pub fn resolve_with_retry(
    resolver: &dyn MetadataResolver,
    identifier: &str,
    retry: u32,
) -> Result<ReleaseMetadata, MetadataResolutionError> {
    let attempts = retry.saturating_add(1);
    let mut last = None;

    for attempt in 1..=attempts {
        info!("取得中繼資料 ({attempt}/{attempts}): {identifier}");
        let metadata = resolver.fetch(identifier);
        if !metadata.failed {
            return Ok(metadata);
        }

        warn!(
            "中繼資料取得失敗 ({attempt}/{attempts}): {}",
            metadata.error.as_deref().unwrap_or("Unknown error")
        );
        last = Some(metadata);
    }

    let reason = last
        .as_ref()
        .and_then(|m| m.error.clone())
        .unwrap_or_else(|| "Unknown error".to_string());

    Err(MetadataResolutionError {
        identifier: identifier.to_string(),
        attempts,
        reason,
        last: last.map(Box::new),
    })
}
