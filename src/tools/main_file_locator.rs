use anyhow::{Context, Result, bail};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// 發行內容的主要檔案
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MainFile {
    pub path: PathBuf,
    pub size: u64,
}

fn entry_size(entry: &DirEntry) -> Option<u64> {
    std::fs::symlink_metadata(entry.path())
        .ok()
        .map(|meta| meta.len())
}

fn pick_larger(acc: Option<MainFile>, other: Option<MainFile>) -> Option<MainFile> {
    match (acc, other) {
        (Some(a), Some(b)) => {
            // 大小相同時取路徑較小者，確保結果穩定
            if b.size > a.size || (b.size == a.size && b.path < a.path) {
                Some(b)
            } else {
                Some(a)
            }
        }
        (a, b) => a.or(b),
    }
}

/// 找出主要檔案：檔案本身，或資料夾內（遞迴）最大的檔案
pub fn locate_main_file(target: &Path) -> Result<Option<MainFile>> {
    if target.is_file() {
        let size = std::fs::metadata(target)
            .with_context(|| format!("無法讀取檔案資訊: {}", target.display()))?
            .len();
        return Ok(Some(MainFile {
            path: target.to_path_buf(),
            size,
        }));
    }

    if !target.is_dir() {
        bail!("路徑不存在: {}", target.display());
    }

    Ok(WalkDir::new(target)
        .follow_links(false)
        .into_iter()
        .filter_map(std::result::Result::ok)
        .filter(|e| e.file_type().is_file())
        .par_bridge()
        .map(|entry| {
            entry_size(&entry).map(|size| MainFile {
                path: entry.into_path(),
                size,
            })
        })
        .reduce(|| None, pick_larger))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_locate_largest_file_recursively() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("small.nfo"), b"tiny").unwrap();
        fs::write(dir.path().join("sub/episode.mkv"), vec![0u8; 4096]).unwrap();
        fs::write(dir.path().join("sample.mkv"), vec![0u8; 1024]).unwrap();

        let main = locate_main_file(dir.path()).unwrap().unwrap();
        assert_eq!(main.path, dir.path().join("sub/episode.mkv"));
        assert_eq!(main.size, 4096);
    }

    #[test]
    fn test_locate_file_target_is_itself() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("movie.mkv");
        fs::write(&file, b"data").unwrap();

        let main = locate_main_file(&file).unwrap().unwrap();
        assert_eq!(main.path, file);
    }

    #[test]
    fn test_locate_empty_directory() {
        let dir = TempDir::new().unwrap();
        assert!(locate_main_file(dir.path()).unwrap().is_none());
    }

    #[test]
    fn test_locate_missing_path() {
        assert!(locate_main_file(Path::new("/definitely/not/here")).is_err());
    }
}
