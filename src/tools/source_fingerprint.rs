use std::path::{Path, PathBuf};

/// 指紋取用的十六進位字元數
pub const FINGERPRINT_LEN: usize = 12;

/// 以來源的絕對路徑計算穩定指紋（BLAKE3 前 12 個十六進位字元）
///
/// 路徑無法正規化時（例如尚未存在）退回以目前工作目錄補成絕對路徑。
#[must_use]
pub fn source_fingerprint(source: &Path) -> String {
    let absolute = source.canonicalize().unwrap_or_else(|_| absolutize(source));
    let hash = blake3::hash(absolute.to_string_lossy().as_bytes());
    hash.to_hex()[..FINGERPRINT_LEN].to_string()
}

fn absolutize(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(path))
        .unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_fingerprint_is_stable() {
        let dir = TempDir::new().unwrap();
        let a = source_fingerprint(dir.path());
        let b = source_fingerprint(dir.path());
        assert_eq!(a, b);
        assert_eq!(a.len(), FINGERPRINT_LEN);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_fingerprint_differs_for_same_name_in_other_parent() {
        let root = TempDir::new().unwrap();
        let first = root.path().join("one/Show.S01");
        let second = root.path().join("two/Show.S01");
        std::fs::create_dir_all(&first).unwrap();
        std::fs::create_dir_all(&second).unwrap();

        assert_ne!(source_fingerprint(&first), source_fingerprint(&second));
    }
}
