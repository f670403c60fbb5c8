use crate::component::release_namer::NamingOptions;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub const MAX_RECENT_PATHS: usize = 10;
pub const SETTINGS_FILE: &str = "settings.json";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Language {
    #[default]
    #[serde(rename = "en-US")]
    EnUs,
    #[serde(rename = "zh-TW")]
    ZhTw,
}

impl Language {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::EnUs => "en-US",
            Self::ZhTw => "zh-TW",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EnUs => write!(f, "English"),
            Self::ZhTw => write!(f, "繁體中文"),
        }
    }
}

/// 截圖上傳的圖床，同時是快取鍵的一部分
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageHosting {
    #[default]
    Ptpimg,
    Imgurl,
    Chevereto,
    Smms,
}

impl ImageHosting {
    pub const ALL: [Self; 4] = [Self::Ptpimg, Self::Imgurl, Self::Chevereto, Self::Smms];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Ptpimg => "ptpimg",
            Self::Imgurl => "imgurl",
            Self::Chevereto => "chevereto",
            Self::Smms => "smms",
        }
    }
}

impl fmt::Display for ImageHosting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ImageHosting {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|h| h.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("不支援的圖床: {s}"))
    }
}

/// 快取目錄比對方式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheMatch {
    /// 目錄名稱包含來源資料夾名稱
    #[default]
    FolderName,
    /// 目錄名稱包含來源絕對路徑的指紋
    Fingerprint,
}

impl fmt::Display for CacheMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FolderName => write!(f, "folder_name"),
            Self::Fingerprint => write!(f, "fingerprint"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreenshotSettings {
    /// 0 表示不產生截圖
    pub count: usize,
    pub optimize: bool,
    /// 未設定時使用系統暫存目錄
    pub cache_root: Option<PathBuf>,
    pub cache_match: CacheMatch,
    pub workers: usize,
    pub timeout_secs: Option<u64>,
    pub image_hosting: ImageHosting,
}

impl Default for ScreenshotSettings {
    fn default() -> Self {
        Self {
            count: 6,
            optimize: true,
            cache_root: None,
            cache_match: CacheMatch::default(),
            workers: 2,
            timeout_secs: None,
            image_hosting: ImageHosting::default(),
        }
    }
}

impl ScreenshotSettings {
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NamingSettings {
    pub source_tag: String,
    pub release_group: String,
    pub channel_layout: bool,
}

impl Default for NamingSettings {
    fn default() -> Self {
        let options = NamingOptions::default();
        Self {
            source_tag: options.source_tag,
            release_group: options.release_group,
            channel_layout: options.channel_layout,
        }
    }
}

impl NamingSettings {
    #[must_use]
    pub fn to_options(&self) -> NamingOptions {
        NamingOptions {
            source_tag: self.source_tag.clone(),
            release_group: self.release_group.clone(),
            channel_layout: self.channel_layout,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetadataSettings {
    /// 第一次失敗後的重試次數
    pub retry: u32,
}

impl Default for MetadataSettings {
    fn default() -> Self {
        Self { retry: 3 }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserSettings {
    pub language: Language,
    pub screenshot: ScreenshotSettings,
    pub naming: NamingSettings,
    pub metadata: MetadataSettings,
    pub recent_paths: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub settings: UserSettings,
    pub settings_path: PathBuf,
}
