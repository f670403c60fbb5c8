mod main_file_locator;
mod media_probe;
mod path_validator;
mod source_fingerprint;

pub use main_file_locator::{MainFile, locate_main_file};
pub use media_probe::{
    AudioTrack, FrameSize, MediaInfoProber, MediaProber, NORMAL_AUDIO_FORMATS, TrackInfo,
    VideoTrack, parse_mediainfo_json, resolution_token,
};
pub use path_validator::validate_path_exists;
pub use source_fingerprint::{FINGERPRINT_LEN, source_fingerprint};
