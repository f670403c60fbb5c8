use crate::config::types::{Config, MAX_RECENT_PATHS, UserSettings};
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

pub fn save_settings(settings: &UserSettings, path: &Path) -> Result<()> {
    let content = serde_json::to_string_pretty(settings).context("Failed to serialize settings")?;

    fs::write(path, content)
        .with_context(|| format!("Failed to write settings to {}", path.display()))?;

    Ok(())
}

impl Config {
    /// 寫回載入時的設定檔路徑
    pub fn save(&self) -> Result<()> {
        save_settings(&self.settings, &self.settings_path)
    }
}

/// 更新最近使用的路徑
/// 將新路徑加入最前面，去重並限制數量
pub fn add_recent_path(settings: &mut UserSettings, path: &str) {
    settings.recent_paths.retain(|p| p != path);
    settings.recent_paths.insert(0, path.to_string());
    settings.recent_paths.truncate(MAX_RECENT_PATHS);
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");

        let mut settings = UserSettings::default();
        settings.screenshot.count = 4;
        settings.screenshot.optimize = false;
        save_settings(&settings, &path).unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.settings, settings);
    }

    #[test]
    fn test_add_recent_path_dedup_and_limit() {
        let mut settings = UserSettings::default();
        for i in 0..15 {
            add_recent_path(&mut settings, &format!("/media/{i}"));
        }
        add_recent_path(&mut settings, "/media/10");

        assert_eq!(settings.recent_paths.len(), MAX_RECENT_PATHS);
        assert_eq!(settings.recent_paths[0], "/media/10");
        assert_eq!(
            settings.recent_paths.iter().filter(|p| *p == "/media/10").count(),
            1
        );
    }
}
