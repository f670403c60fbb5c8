//! 發行名稱元件
//!
//! 由中繼資料與軌道資訊推導出檔案系統安全的標準發行名稱：
//! 標題、替代名稱、季／集、年份、解析度、來源、音訊、HDR、視訊、發行組

mod codec_map;
mod metadata;
mod name_sanitizer;
mod romanize;
mod season;
mod synthesizer;

pub use codec_map::{AudioCodec, Quality, VideoCodec, audio_token, channel_layout, video_token};
pub use metadata::{Person, ReleaseMetadata};
pub use name_sanitizer::{FORBIDDEN_CHARS, NameSanitizer, is_ascii_printable};
pub use romanize::romanize_title;
pub use season::{
    EPISODE_PLACEHOLDER, chinese_numeral_to_u32, format_episodes, format_season, resolve_season,
    split_title_season, strip_english_season,
};
pub use synthesizer::{
    BatchLayout, EpisodeMode, NameComponents, NameOverrides, NameSynthesizer, NamingOptions,
    expand_batch_template, substitute_episode,
};
