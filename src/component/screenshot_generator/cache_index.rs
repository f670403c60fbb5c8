use crate::config::{CacheMatch, ImageHosting};
use crate::error::ScreenshotError;
use crate::tools::{FINGERPRINT_LEN, source_fingerprint};
use log::{debug, info, warn};
use std::env;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use uuid::Uuid;
use walkdir::WalkDir;

/// 快取目錄名稱前綴
pub const CACHE_DIR_PREFIX: &str = "release-shots";
/// 暫存中的目錄標記，查詢時一律跳過
const PARTIAL_MARKER: &str = ".partial-";
const SCREENSHOT_EXTENSION: &str = "png";
/// 產生者鎖檔後綴，鎖檔與最終目錄同名
const LOCK_SUFFIX: &str = ".lock";
/// 超過此時間未續約的鎖視為已失效（持有者當機）
pub const STALE_LOCK_AGE: Duration = Duration::from_secs(600);

/// 快取查詢條件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheKey {
    pub folder_name: String,
    pub fingerprint: String,
    pub count: usize,
    pub hosting: ImageHosting,
}

impl CacheKey {
    /// 以來源（資料夾或單一檔案）的名稱與路徑指紋建立查詢條件
    #[must_use]
    pub fn for_source(source: &Path, count: usize, hosting: ImageHosting) -> Self {
        let folder_name = source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        Self {
            folder_name,
            fingerprint: source_fingerprint(source),
            count,
            hosting,
        }
    }

    /// `release-shots.<資料夾>.<指紋>.<數量>`
    #[must_use]
    pub fn directory_name(&self) -> String {
        format!(
            "{CACHE_DIR_PREFIX}.{}.{}.{}",
            self.folder_name, self.fingerprint, self.count
        )
    }
}

/// 一組截圖及其所在目錄
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenshotSet {
    pub directory: PathBuf,
    /// 依檔名排序
    pub images: Vec<PathBuf>,
}

impl ScreenshotSet {
    /// 讀取目錄中的所有 PNG
    pub fn load(directory: &Path) -> Result<Self, ScreenshotError> {
        let mut images = Vec::new();
        for entry in WalkDir::new(directory).min_depth(1).max_depth(1) {
            let entry = entry.map_err(|e| ScreenshotError::io(directory, e.into()))?;
            if entry.file_type().is_file() && is_screenshot(entry.path()) {
                images.push(entry.into_path());
            }
        }
        images.sort();

        Ok(Self {
            directory: directory.to_path_buf(),
            images,
        })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.images.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    #[must_use]
    pub fn is_complete(&self, count: usize) -> bool {
        self.images.len() == count
    }

    /// 已上傳網址的標記檔：`.{圖床}.{截圖主檔名}`
    #[must_use]
    pub fn upload_marker_path(&self, image: &Path, hosting: ImageHosting) -> PathBuf {
        let stem = image
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.directory.join(format!(".{hosting}.{stem}"))
    }

    /// 讀取已記錄的上傳網址
    #[must_use]
    pub fn uploaded_url(&self, image: &Path, hosting: ImageHosting) -> Option<String> {
        fs::read_to_string(self.upload_marker_path(image, hosting))
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }

    pub fn record_uploaded_url(
        &self,
        image: &Path,
        hosting: ImageHosting,
        url: &str,
    ) -> Result<(), ScreenshotError> {
        let marker = self.upload_marker_path(image, hosting);
        fs::write(&marker, url.trim()).map_err(|e| ScreenshotError::io(marker, e))
    }
}

fn is_screenshot(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(SCREENSHOT_EXTENSION))
}

/// 同一組截圖的產生者鎖
///
/// 持有期間其他程序只等待不產生；離開作用域時移除鎖檔。
#[derive(Debug)]
pub struct WriterLock {
    path: PathBuf,
    file: File,
}

impl WriterLock {
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 更新鎖檔時間，避免長時間產生時被誤判為失效
    pub fn renew(&self) {
        if let Err(e) = self.file.set_modified(SystemTime::now()) {
            debug!("無法更新鎖檔時間 {}: {e}", self.path.display());
        }
    }
}

impl Drop for WriterLock {
    fn drop(&mut self) {
        match fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!("無法移除鎖檔 {}: {e}", self.path.display()),
        }
    }
}

fn is_stale(path: &Path) -> bool {
    fs::metadata(path)
        .and_then(|m| m.modified())
        .ok()
        .and_then(|modified| modified.elapsed().ok())
        .is_some_and(|age| age >= STALE_LOCK_AGE)
}

/// 截圖快取索引
///
/// 快取目錄存在於 `root` 底下；完成的目錄才會出現最終名稱，
/// 產生中的目錄帶有 `.partial-<uuid>` 後綴。
#[derive(Debug, Clone)]
pub struct CacheIndex {
    root: PathBuf,
    /// 共用的系統暫存目錄只看本工具前綴的目錄
    prefix_only: bool,
    matching: CacheMatch,
}

impl CacheIndex {
    #[must_use]
    pub fn new(cache_root: Option<&Path>, matching: CacheMatch) -> Self {
        match cache_root {
            Some(root) => Self {
                root: root.to_path_buf(),
                prefix_only: false,
                matching,
            },
            None => Self {
                root: env::temp_dir(),
                prefix_only: true,
                matching,
            },
        }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn is_candidate(&self, name: &str, key: &CacheKey) -> bool {
        if name.contains(PARTIAL_MARKER) {
            return false;
        }
        if self.prefix_only && !name.starts_with(CACHE_DIR_PREFIX) {
            return false;
        }

        let fingerprint_tag = format!(".{}.", key.fingerprint);
        match self.matching {
            // 空資料夾名稱（例如根目錄）無法做子字串比對
            CacheMatch::FolderName if !key.folder_name.is_empty() => {
                name.contains(&key.folder_name)
            }
            _ => key.fingerprint.len() == FINGERPRINT_LEN && name.contains(&fingerprint_tag),
        }
    }

    /// 找出第一個截圖數量完全相符的快取目錄
    pub fn lookup(&self, key: &CacheKey) -> Result<Option<ScreenshotSet>, ScreenshotError> {
        if !self.root.is_dir() {
            return Ok(None);
        }

        let mut candidates: Vec<PathBuf> = WalkDir::new(&self.root)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|e| e.file_type().is_dir())
            .filter(|e| self.is_candidate(&e.file_name().to_string_lossy(), key))
            .map(walkdir::DirEntry::into_path)
            .collect();
        candidates.sort();

        for candidate in candidates {
            let set = match ScreenshotSet::load(&candidate) {
                Ok(set) => set,
                Err(e) => {
                    warn!("略過無法讀取的快取目錄: {e}");
                    continue;
                }
            };
            if set.is_complete(key.count) {
                info!("使用快取截圖: {}", candidate.display());
                return Ok(Some(set));
            }
            debug!(
                "快取目錄數量不符 ({} != {}): {}",
                set.len(),
                key.count,
                candidate.display()
            );
        }

        Ok(None)
    }

    #[must_use]
    pub fn final_dir(&self, key: &CacheKey) -> PathBuf {
        self.root.join(key.directory_name())
    }

    #[must_use]
    pub fn lock_path(&self, key: &CacheKey) -> PathBuf {
        self.root.join(format!("{}{LOCK_SUFFIX}", key.directory_name()))
    }

    /// 嘗試成為這組截圖唯一的產生者
    ///
    /// 鎖已被持有時回傳 `None`；失效的鎖會被移除後重新取得。
    pub fn try_lock(&self, key: &CacheKey) -> Result<Option<WriterLock>, ScreenshotError> {
        fs::create_dir_all(&self.root).map_err(|e| ScreenshotError::io(&self.root, e))?;
        let path = self.lock_path(key);

        for _ in 0..2 {
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(mut file) => {
                    // 內容僅供人工排查
                    let _ = writeln!(file, "{}", std::process::id());
                    debug!("取得產生者鎖: {}", path.display());
                    return Ok(Some(WriterLock { path, file }));
                }
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                    if !is_stale(&path) {
                        return Ok(None);
                    }
                    warn!("移除失效的鎖檔: {}", path.display());
                    match fs::remove_file(&path) {
                        Ok(()) => {}
                        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                        Err(e) => return Err(ScreenshotError::io(&path, e)),
                    }
                }
                Err(e) => return Err(ScreenshotError::io(&path, e)),
            }
        }
        Ok(None)
    }

    /// 建立本次產生專用的暫存目錄
    pub fn create_staging(&self, key: &CacheKey) -> Result<PathBuf, ScreenshotError> {
        fs::create_dir_all(&self.root).map_err(|e| ScreenshotError::io(&self.root, e))?;

        let staging = self.root.join(format!(
            "{}{PARTIAL_MARKER}{}",
            key.directory_name(),
            Uuid::new_v4().simple()
        ));
        fs::create_dir(&staging).map_err(|e| ScreenshotError::io(&staging, e))?;
        debug!("建立暫存目錄: {}", staging.display());
        Ok(staging)
    }

    /// 移除暫存目錄，失敗只記錄警告
    pub fn discard_staging(&self, staging: &Path) {
        if let Err(e) = fs::remove_dir_all(staging) {
            warn!("無法移除暫存目錄 {}: {e}", staging.display());
        }
    }

    /// 將暫存目錄原子性地改名為最終名稱
    ///
    /// 若其他程序已先完成同一組截圖，改用對方的結果；
    /// 若最終目錄是不完整的殘留物，則取而代之。
    pub fn publish(&self, staging: &Path, key: &CacheKey) -> Result<ScreenshotSet, ScreenshotError> {
        let target = self.final_dir(key);

        match fs::rename(staging, &target) {
            Ok(()) => ScreenshotSet::load(&target),
            Err(_) if target.exists() => {
                let existing = ScreenshotSet::load(&target)?;
                if existing.is_complete(key.count) {
                    info!("其他程序已建立相同截圖，改用既有結果: {}", target.display());
                    self.discard_staging(staging);
                    return Ok(existing);
                }

                warn!("取代不完整的快取目錄: {}", target.display());
                fs::remove_dir_all(&target).map_err(|e| ScreenshotError::io(&target, e))?;
                fs::rename(staging, &target).map_err(|e| ScreenshotError::io(&target, e))?;
                ScreenshotSet::load(&target)
            }
            Err(e) => Err(ScreenshotError::io(staging, e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn key(folder: &str, count: usize) -> CacheKey {
        CacheKey {
            folder_name: folder.to_string(),
            fingerprint: "0123456789ab".to_string(),
            count,
            hosting: ImageHosting::Ptpimg,
        }
    }

    fn make_set(dir: &Path, count: usize) {
        fs::create_dir_all(dir).unwrap();
        for i in 1..=count {
            fs::write(dir.join(format!("ep.thumb_{i:02}.png")), b"png").unwrap();
        }
    }

    #[test]
    fn test_directory_name() {
        assert_eq!(
            key("Show.S01", 6).directory_name(),
            "release-shots.Show.S01.0123456789ab.6"
        );
    }

    #[test]
    fn test_lookup_requires_exact_count() {
        let root = TempDir::new().unwrap();
        let index = CacheIndex::new(Some(root.path()), CacheMatch::FolderName);
        make_set(&root.path().join("release-shots.Show.0123456789ab.06"), 6);

        assert!(index.lookup(&key("Show", 6)).unwrap().is_some());
        assert!(index.lookup(&key("Show", 4)).unwrap().is_none());
        assert!(index.lookup(&key("Other", 6)).unwrap().is_none());
    }

    #[test]
    fn test_lookup_skips_partial_directories() {
        let root = TempDir::new().unwrap();
        let index = CacheIndex::new(Some(root.path()), CacheMatch::FolderName);
        make_set(
            &root
                .path()
                .join("release-shots.Show.0123456789ab.06.partial-abc"),
            6,
        );

        assert!(index.lookup(&key("Show", 6)).unwrap().is_none());
    }

    #[test]
    fn test_lookup_fingerprint_mode() {
        let root = TempDir::new().unwrap();
        let index = CacheIndex::new(Some(root.path()), CacheMatch::Fingerprint);
        make_set(&root.path().join("release-shots.Show.ffffffffffff.03"), 3);

        assert!(index.lookup(&key("Show", 3)).unwrap().is_none());

        make_set(&root.path().join("release-shots.Show.0123456789ab.03"), 3);
        let found = index.lookup(&key("Show", 3)).unwrap().unwrap();
        assert!(found.directory.ends_with("release-shots.Show.0123456789ab.03"));
    }

    #[test]
    fn test_lookup_ignores_counted_files_of_other_types() {
        let root = TempDir::new().unwrap();
        let index = CacheIndex::new(Some(root.path()), CacheMatch::FolderName);
        let dir = root.path().join("release-shots.Show.0123456789ab.02");
        make_set(&dir, 2);
        fs::write(dir.join(".ptpimg.ep.thumb_01"), "https://ptpimg.me/a.png").unwrap();
        fs::write(dir.join("notes.txt"), "x").unwrap();

        let set = index.lookup(&key("Show", 2)).unwrap().unwrap();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_staging_and_publish() {
        let root = TempDir::new().unwrap();
        let index = CacheIndex::new(Some(&root.path().join("cache")), CacheMatch::FolderName);
        let k = key("Show", 2);

        let staging = index.create_staging(&k).unwrap();
        make_set(&staging, 2);
        assert!(index.lookup(&k).unwrap().is_none());

        let set = index.publish(&staging, &k).unwrap();
        assert!(!staging.exists());
        assert_eq!(set.directory, index.final_dir(&k));
        assert!(set.is_complete(2));
        assert_eq!(index.lookup(&k).unwrap(), Some(set));
    }

    #[test]
    fn test_publish_loser_reuses_complete_winner() {
        let root = TempDir::new().unwrap();
        let index = CacheIndex::new(Some(root.path()), CacheMatch::FolderName);
        let k = key("Show", 2);

        make_set(&index.final_dir(&k), 2);
        let staging = index.create_staging(&k).unwrap();
        make_set(&staging, 2);
        fs::write(staging.join("ep.thumb_03.png"), b"png").unwrap();

        let set = index.publish(&staging, &k).unwrap();
        assert!(!staging.exists());
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_publish_replaces_incomplete_leftover() {
        let root = TempDir::new().unwrap();
        let index = CacheIndex::new(Some(root.path()), CacheMatch::FolderName);
        let k = key("Show", 3);

        make_set(&index.final_dir(&k), 1);
        let staging = index.create_staging(&k).unwrap();
        make_set(&staging, 3);

        let set = index.publish(&staging, &k).unwrap();
        assert!(set.is_complete(3));
    }

    #[test]
    fn test_try_lock_is_exclusive() {
        let root = TempDir::new().unwrap();
        let index = CacheIndex::new(Some(&root.path().join("cache")), CacheMatch::FolderName);
        let k = key("Show", 2);

        let lock = index.try_lock(&k).unwrap().unwrap();
        assert!(lock.path().ends_with("release-shots.Show.0123456789ab.2.lock"));
        assert!(index.try_lock(&k).unwrap().is_none());
        assert!(index.try_lock(&key("Show", 3)).unwrap().is_some());

        drop(lock);
        assert!(!index.lock_path(&k).exists());
        assert!(index.try_lock(&k).unwrap().is_some());
    }

    #[test]
    fn test_stale_lock_is_taken_over() {
        let root = TempDir::new().unwrap();
        let index = CacheIndex::new(Some(root.path()), CacheMatch::FolderName);
        let k = key("Show", 2);

        let leftover = File::create(index.lock_path(&k)).unwrap();
        leftover
            .set_modified(SystemTime::now() - STALE_LOCK_AGE - Duration::from_secs(1))
            .unwrap();
        drop(leftover);

        let lock = index.try_lock(&k).unwrap().unwrap();
        assert!(!is_stale(lock.path()));
    }

    #[test]
    fn test_lookup_ignores_lock_file() {
        let root = TempDir::new().unwrap();
        let index = CacheIndex::new(None, CacheMatch::FolderName);
        let index = CacheIndex {
            root: root.path().to_path_buf(),
            ..index
        };
        let k = key("Show", 0);

        let _lock = index.try_lock(&k).unwrap().unwrap();
        assert!(index.lookup(&k).unwrap().is_none());
    }

    #[test]
    fn test_uploaded_url_marker() {
        let root = TempDir::new().unwrap();
        let dir = root.path().join("set");
        make_set(&dir, 1);
        let set = ScreenshotSet::load(&dir).unwrap();
        let image = set.images[0].clone();

        assert_eq!(set.uploaded_url(&image, ImageHosting::Smms), None);
        set.record_uploaded_url(&image, ImageHosting::Smms, "https://sm.ms/x.png\n")
            .unwrap();

        assert!(dir.join(".smms.ep.thumb_01").exists());
        assert_eq!(
            set.uploaded_url(&image, ImageHosting::Smms).as_deref(),
            Some("https://sm.ms/x.png")
        );
        assert_eq!(set.uploaded_url(&image, ImageHosting::Ptpimg), None);
    }
}
