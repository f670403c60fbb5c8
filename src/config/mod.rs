pub mod load;
pub mod save;
pub mod types;

pub use types::{
    CacheMatch, Config, ImageHosting, Language, MAX_RECENT_PATHS, MetadataSettings,
    NamingSettings, SETTINGS_FILE, ScreenshotSettings, UserSettings,
};
