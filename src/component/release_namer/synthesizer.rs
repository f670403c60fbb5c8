//! 發行名稱合成
//!
//! 純函式：不碰檔案系統、不會失敗，缺少的資料直接略過對應標記。

use super::codec_map::{Quality, audio_token, video_token};
use super::metadata::ReleaseMetadata;
use super::name_sanitizer::{NameSanitizer, is_ascii_printable};
use super::romanize::romanize_title;
use super::season::{
    EPISODE_PLACEHOLDER, format_episodes, resolve_season, split_title_season,
    strip_english_season,
};
use crate::tools::TrackInfo;

/// 命名常數設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamingOptions {
    pub source_tag: String,
    pub release_group: String,
    pub channel_layout: bool,
}

impl Default for NamingOptions {
    fn default() -> Self {
        Self {
            source_tag: "WEB-DL".to_string(),
            release_group: "HDSWEB".to_string(),
            channel_layout: true,
        }
    }
}

/// 集數的產生方式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EpisodeMode {
    /// 只使用手動指定的集數
    #[default]
    Explicit,
    /// 批次下載範本：集數以佔位符代替
    BatchPlaceholder,
}

/// 使用者手動覆寫的欄位
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameOverrides {
    pub alternate_name: Option<String>,
    pub season: Option<String>,
    /// 單集 "3" 或多集 "1,2,3"
    pub episode: Option<String>,
    pub episode_mode: EpisodeMode,
}

/// 依序排列的名稱標記（皆已個別清理）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameComponents {
    pub title: Option<String>,
    pub alternate: Option<String>,
    pub season_episode: Option<String>,
    pub year: Option<String>,
    pub resolution: Option<String>,
    pub source: Option<String>,
    pub audio: Option<String>,
    pub quality: Option<String>,
    pub video: Option<String>,
    pub group: Option<String>,
}

impl NameComponents {
    /// 依固定順序列出非空標記（不含發行組）
    #[must_use]
    pub fn ordered_tokens(&self) -> Vec<&str> {
        [
            &self.title,
            &self.alternate,
            &self.season_episode,
            &self.year,
            &self.resolution,
            &self.source,
            &self.audio,
            &self.quality,
            &self.video,
        ]
        .into_iter()
        .filter_map(|token| token.as_deref())
        .filter(|token| !token.is_empty())
        .collect()
    }

    fn joined(&self) -> String {
        let mut name = self.ordered_tokens().join(".");
        if let Some(group) = self.group.as_deref().filter(|g| !g.is_empty()) {
            name.push('-');
            name.push_str(group);
        }
        name
    }
}

/// 發行名稱合成器
pub struct NameSynthesizer {
    options: NamingOptions,
    sanitizer: NameSanitizer,
}

impl Default for NameSynthesizer {
    fn default() -> Self {
        Self::new(NamingOptions::default())
    }
}

impl NameSynthesizer {
    #[must_use]
    pub fn new(options: NamingOptions) -> Self {
        Self {
            options,
            sanitizer: NameSanitizer::new(),
        }
    }

    #[must_use]
    pub const fn options(&self) -> &NamingOptions {
        &self.options
    }

    fn token(&self, raw: &str) -> Option<String> {
        let cleaned = self.sanitizer.sanitize_token(raw);
        (!cleaned.is_empty()).then_some(cleaned)
    }

    /// 產生完整發行名稱
    #[must_use]
    pub fn synthesize(
        &self,
        metadata: &ReleaseMetadata,
        track_info: &TrackInfo,
        overrides: &NameOverrides,
    ) -> String {
        let components = self.components(metadata, track_info, overrides);
        self.render(&components)
    }

    /// 組合名稱；批次範本的佔位符原樣保留，其餘部分照常清理
    #[must_use]
    pub fn render(&self, components: &NameComponents) -> String {
        components
            .joined()
            .split(EPISODE_PLACEHOLDER)
            .map(|part| self.sanitizer.sanitize_name(part))
            .collect::<Vec<_>>()
            .join(EPISODE_PLACEHOLDER)
    }

    /// 解析出各個名稱標記
    #[must_use]
    pub fn components(
        &self,
        metadata: &ReleaseMetadata,
        track_info: &TrackInfo,
        overrides: &NameOverrides,
    ) -> NameComponents {
        let (title, title_season) = metadata
            .chinese_title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map_or((None, None), |t| {
                let (stripped, season) = split_title_season(t);
                (Some(stripped), season)
            });

        let alternate = self
            .alternate_name(metadata, overrides, title_season)
            .or_else(|| {
                title
                    .as_deref()
                    .filter(|t| !t.is_empty())
                    .map(romanize_title)
            })
            .and_then(|a| self.token(&a));

        let title_season_text = title_season.map(|s| s.to_string());
        let season = resolve_season([
            overrides.season.as_deref(),
            title_season_text.as_deref(),
            metadata.current_season.as_deref(),
        ])
        .and_then(|s| self.token(&s));

        let episode = match overrides.episode_mode {
            EpisodeMode::BatchPlaceholder => Some(EPISODE_PLACEHOLDER.to_string()),
            EpisodeMode::Explicit => overrides
                .episode
                .as_deref()
                .and_then(format_episodes)
                .and_then(|e| self.token(&e)),
        };

        let season_episode = match (season, episode) {
            (None, None) => None,
            (season, episode) => Some(format!(
                "{}{}",
                season.unwrap_or_default(),
                episode.unwrap_or_default()
            )),
        };

        NameComponents {
            title: title.as_deref().and_then(|t| self.token(t)),
            alternate,
            season_episode,
            year: metadata.year.as_deref().and_then(|y| self.token(y)),
            resolution: self.token(&track_info.resolution),
            source: self.token(&self.options.source_tag),
            audio: audio_token(&track_info.audio_tracks, self.options.channel_layout)
                .and_then(|a| self.token(&a)),
            quality: Quality::from_tracks(&track_info.video_tracks)
                .token()
                .map(str::to_string),
            video: video_token(&track_info.video_tracks).and_then(|v| self.token(&v)),
            group: self.token(&self.options.release_group),
        }
    }

    /// 替代名稱：手動指定 > 英文外文名 > 第一個英文別名
    fn alternate_name(
        &self,
        metadata: &ReleaseMetadata,
        overrides: &NameOverrides,
        default_season: Option<u32>,
    ) -> Option<String> {
        let ascii = |name: &&String| !name.trim().is_empty() && is_ascii_printable(name);

        let chosen = overrides
            .alternate_name
            .as_ref()
            .filter(|name| !name.trim().is_empty())
            .or_else(|| metadata.foreign_title.as_ref().filter(ascii))
            .or_else(|| metadata.aka.iter().find(ascii))?;

        let dotted = self.sanitizer.dotted_alias(chosen);
        Some(strip_english_season(&dotted, default_season))
    }
}

/// 批次下載的目錄名與檔名樣式
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchLayout {
    pub directory: String,
    pub file_pattern: String,
}

/// 展開批次範本：目錄名去掉佔位符，檔名改為下載器的分集變數
#[must_use]
pub fn expand_batch_template(template: &str) -> BatchLayout {
    let sanitizer = NameSanitizer::new();
    BatchLayout {
        directory: sanitizer.sanitize_name(&template.replace(EPISODE_PLACEHOLDER, "")),
        file_pattern: template.replace(EPISODE_PLACEHOLDER, "E<pageNumberWithZero>"),
    }
}

/// 以實際集數取代佔位符
#[must_use]
pub fn substitute_episode(template: &str, episode: u32) -> String {
    let sanitizer = NameSanitizer::new();
    sanitizer.sanitize_name(&template.replace(EPISODE_PLACEHOLDER, &format!("E{episode:02}")))
}
