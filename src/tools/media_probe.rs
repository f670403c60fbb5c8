use crate::error::MediaProbeError;
use log::debug;
use serde::Deserialize;
use std::path::Path;
use std::process::Command;

/// MediaInfo 回報的「一般」音訊格式（非杜比系列）
pub const NORMAL_AUDIO_FORMATS: [&str; 4] =
    ["Audio Coding 3", "Free Lossless Audio Codec", "AAC", "HE-AAC"];

/// 音訊軌資訊
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AudioTrack {
    pub commercial_name: String,
    pub channels: Option<u32>,
    pub is_normal_format: bool,
}

/// 視訊軌資訊
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VideoTrack {
    pub encoded_library_name: Option<String>,
    pub commercial_name: String,
    pub hdr_format: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub pixel_aspect_ratio: Option<f64>,
    pub duration_ms: Option<u64>,
    pub interlaced: bool,
}

/// 從媒體檔案推導出的軌道資訊，每次執行重新取得，不落地
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackInfo {
    pub resolution: String,
    pub audio_tracks: Vec<AudioTrack>,
    pub video_tracks: Vec<VideoTrack>,
}

/// 截圖輸出尺寸（已套用像素長寬比）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameSize {
    pub width: u32,
    pub height: u32,
}

impl std::fmt::Display for FrameSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl TrackInfo {
    #[must_use]
    pub fn primary_video(&self) -> Option<&VideoTrack> {
        self.video_tracks.first()
    }

    /// 依像素長寬比換算的顯示尺寸
    ///
    /// PAR <= 1 時縮放高度，否則縮放寬度；縮放後的邊長補成偶數。
    #[must_use]
    pub fn frame_size(&self) -> Option<FrameSize> {
        let video = self.primary_video()?;
        let (width, height) = (video.width?, video.height?);
        let par = video.pixel_aspect_ratio.filter(|p| *p > 0.0).unwrap_or(1.0);

        let size = if par <= 1.0 {
            FrameSize {
                width,
                height: round_up_even((f64::from(height) * par) as u32),
            }
        } else {
            FrameSize {
                width: round_up_even((f64::from(width) * par) as u32),
                height,
            }
        };
        Some(size)
    }

    #[must_use]
    pub fn duration_ms(&self) -> Option<u64> {
        self.primary_video()?.duration_ms.filter(|d| *d > 0)
    }
}

fn round_up_even(value: u32) -> u32 {
    value.saturating_add(value % 2)
}

/// 依畫面高度決定解析度標記
#[must_use]
pub fn resolution_token(height: u32, interlaced: bool) -> &'static str {
    match height {
        0 => "",
        1..=480 => "480p",
        481..=576 => "576p",
        577..=720 => "720p",
        721..=1080 if interlaced => "1080i",
        721..=1080 => "1080p",
        1081..=2160 => "2160p",
        2161..=4320 => "4320p",
        _ => "",
    }
}

/// 媒體探測介面，方便測試時替換外部工具
pub trait MediaProber: Send + Sync {
    fn probe(&self, path: &Path) -> Result<TrackInfo, MediaProbeError>;
}

/// 透過 `mediainfo` CLI 取得軌道資訊
#[derive(Debug, Clone)]
pub struct MediaInfoProber {
    binary: String,
}

impl Default for MediaInfoProber {
    fn default() -> Self {
        Self {
            binary: "mediainfo".to_string(),
        }
    }
}

impl MediaInfoProber {
    #[must_use]
    pub fn with_binary(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

impl MediaProber for MediaInfoProber {
    fn probe(&self, path: &Path) -> Result<TrackInfo, MediaProbeError> {
        debug!("執行 mediainfo: {}", path.display());

        let output = Command::new(&self.binary)
            .args(["--Output=JSON", "--Full"])
            .arg(path)
            .output()
            .map_err(|source| MediaProbeError::Spawn {
                tool: "mediainfo",
                source,
            })?;

        if !output.status.success() {
            return Err(MediaProbeError::Failed {
                tool: "mediainfo",
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        parse_mediainfo_json(&stdout, path)
    }
}

#[derive(Deserialize)]
struct MediaInfoOutput {
    media: Option<MediaInfoMedia>,
}

#[derive(Deserialize)]
struct MediaInfoMedia {
    #[serde(default)]
    track: Vec<MediaInfoTrack>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct MediaInfoTrack {
    #[serde(rename = "@type")]
    kind: String,
    #[serde(rename = "Format")]
    format: Option<String>,
    #[serde(rename = "Format_Info")]
    format_info: Option<String>,
    #[serde(rename = "Format_Commercial_IfAny")]
    format_commercial_if_any: Option<String>,
    #[serde(rename = "Format_Commercial")]
    format_commercial: Option<String>,
    #[serde(rename = "Encoded_Library_Name")]
    encoded_library_name: Option<String>,
    #[serde(rename = "HDR_Format")]
    hdr_format: Option<String>,
    #[serde(rename = "HDR_Format_Compatibility")]
    hdr_format_compatibility: Option<String>,
    #[serde(rename = "Width")]
    width: Option<String>,
    #[serde(rename = "Height")]
    height: Option<String>,
    #[serde(rename = "PixelAspectRatio")]
    pixel_aspect_ratio: Option<String>,
    #[serde(rename = "Duration")]
    duration: Option<String>,
    #[serde(rename = "ScanType")]
    scan_type: Option<String>,
    #[serde(rename = "ScanType_StoreMethod")]
    scan_type_store_method: Option<String>,
    #[serde(rename = "Channels")]
    channels: Option<String>,
}

impl MediaInfoTrack {
    fn commercial_name(&self) -> String {
        self.format_commercial_if_any
            .as_ref()
            .or(self.format_commercial.as_ref())
            .or(self.format.as_ref())
            .cloned()
            .unwrap_or_default()
    }

    fn hdr(&self) -> Option<String> {
        let parts: Vec<&str> = [&self.hdr_format, &self.hdr_format_compatibility]
            .into_iter()
            .filter_map(|p| p.as_deref())
            .filter(|p| !p.trim().is_empty())
            .collect();
        (!parts.is_empty()).then(|| parts.join(" / "))
    }

    fn into_video(self) -> VideoTrack {
        let interlaced = self.scan_type.as_deref() == Some("Interlaced")
            || self.scan_type_store_method.as_deref() == Some("InterleavedFields");
        VideoTrack {
            commercial_name: self.commercial_name(),
            hdr_format: self.hdr(),
            encoded_library_name: self.encoded_library_name.filter(|n| !n.trim().is_empty()),
            width: self.width.as_deref().and_then(parse_leading_u32),
            height: self.height.as_deref().and_then(parse_leading_u32),
            pixel_aspect_ratio: self.pixel_aspect_ratio.as_deref().and_then(|p| p.parse().ok()),
            duration_ms: self.duration.as_deref().and_then(parse_seconds_to_ms),
            interlaced,
        }
    }

    fn into_audio(self) -> AudioTrack {
        let commercial_name = self.commercial_name();
        let is_normal_format = [Some(commercial_name.as_str()), self.format_info.as_deref()]
            .into_iter()
            .flatten()
            .any(|name| NORMAL_AUDIO_FORMATS.contains(&name.trim()));
        AudioTrack {
            commercial_name,
            // 多聲道配置可能是 "6 / 2"，取第一個值
            channels: self.channels.as_deref().and_then(parse_leading_u32),
            is_normal_format,
        }
    }
}

/// 解析 mediainfo JSON 輸出
pub fn parse_mediainfo_json(json: &str, path: &Path) -> Result<TrackInfo, MediaProbeError> {
    let parsed: MediaInfoOutput =
        serde_json::from_str(json).map_err(|source| MediaProbeError::Parse {
            tool: "mediainfo",
            source,
        })?;

    let mut info = TrackInfo::default();
    let mut container_duration = None;
    for track in parsed.media.map(|m| m.track).unwrap_or_default() {
        match track.kind.as_str() {
            "General" => {
                container_duration = track.duration.as_deref().and_then(parse_seconds_to_ms);
            }
            "Video" => info.video_tracks.push(track.into_video()),
            "Audio" => info.audio_tracks.push(track.into_audio()),
            _ => {}
        }
    }

    // Matroska 的視訊軌常沒有長度，改用容器長度
    for video in &mut info.video_tracks {
        video.duration_ms = video.duration_ms.or(container_duration);
    }

    if info.video_tracks.is_empty() {
        return Err(MediaProbeError::NoVideoTrack(path.to_path_buf()));
    }

    if let Some(video) = info.primary_video() {
        info.resolution =
            resolution_token(video.height.unwrap_or(0), video.interlaced).to_string();
    }

    Ok(info)
}

fn parse_leading_u32(raw: &str) -> Option<u32> {
    let digits: String = raw
        .trim()
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    digits.parse().ok()
}

fn parse_seconds_to_ms(raw: &str) -> Option<u64> {
    let seconds: f64 = raw.trim().parse().ok()?;
    (seconds.is_finite() && seconds > 0.0).then(|| (seconds * 1000.0).round() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "media": {
            "@ref": "/media/show.mkv",
            "track": [
                {"@type": "General", "Format": "Matroska"},
                {
                    "@type": "Video",
                    "Format": "HEVC",
                    "Width": "1920",
                    "Height": "1080",
                    "PixelAspectRatio": "1.000",
                    "Duration": "1420.500",
                    "ScanType": "Progressive",
                    "Encoded_Library_Name": "x265",
                    "HDR_Format": "SMPTE ST 2086",
                    "HDR_Format_Compatibility": "HDR10"
                },
                {
                    "@type": "Audio",
                    "Format": "E-AC-3",
                    "Format_Commercial_IfAny": "Dolby Digital Plus",
                    "Format_Info": "Enhanced AC-3",
                    "Channels": "6"
                },
                {
                    "@type": "Audio",
                    "Format": "AAC",
                    "Format_Info": "AAC",
                    "Channels": "2"
                }
            ]
        }
    }"#;

    #[test]
    fn test_parse_mediainfo_tracks() {
        let info = parse_mediainfo_json(SAMPLE, Path::new("/media/show.mkv")).unwrap();

        assert_eq!(info.resolution, "1080p");
        assert_eq!(info.video_tracks.len(), 1);
        assert_eq!(info.audio_tracks.len(), 2);

        let video = &info.video_tracks[0];
        assert_eq!(video.commercial_name, "HEVC");
        assert_eq!(video.encoded_library_name.as_deref(), Some("x265"));
        assert_eq!(video.hdr_format.as_deref(), Some("SMPTE ST 2086 / HDR10"));
        assert_eq!(video.duration_ms, Some(1_420_500));

        assert_eq!(info.audio_tracks[0].commercial_name, "Dolby Digital Plus");
        assert_eq!(info.audio_tracks[0].channels, Some(6));
        assert!(!info.audio_tracks[0].is_normal_format);
        assert!(info.audio_tracks[1].is_normal_format);
    }

    #[test]
    fn test_video_duration_falls_back_to_container() {
        let json = r#"{"media": {"track": [
            {"@type": "General", "Duration": "10.000"},
            {"@type": "Video", "Format": "AVC", "Width": "320", "Height": "240"}
        ]}}"#;
        let info = parse_mediainfo_json(json, Path::new("a.mkv")).unwrap();
        assert_eq!(info.duration_ms(), Some(10_000));
        assert_eq!(info.resolution, "480p");
    }

    #[test]
    fn test_parse_mediainfo_without_video() {
        let json = r#"{"media": {"track": [{"@type": "Audio", "Format": "FLAC"}]}}"#;
        let err = parse_mediainfo_json(json, Path::new("a.flac")).unwrap_err();
        assert!(matches!(err, MediaProbeError::NoVideoTrack(_)));
    }

    #[test]
    fn test_parse_mediainfo_invalid_json() {
        let err = parse_mediainfo_json("not json", Path::new("a.mkv")).unwrap_err();
        assert!(matches!(err, MediaProbeError::Parse { .. }));
    }

    #[test]
    fn test_resolution_token_buckets() {
        assert_eq!(resolution_token(480, false), "480p");
        assert_eq!(resolution_token(576, false), "576p");
        assert_eq!(resolution_token(720, false), "720p");
        assert_eq!(resolution_token(1080, false), "1080p");
        assert_eq!(resolution_token(1080, true), "1080i");
        assert_eq!(resolution_token(1600, false), "2160p");
        assert_eq!(resolution_token(4320, false), "4320p");
        assert_eq!(resolution_token(0, false), "");
    }

    #[test]
    fn test_frame_size_applies_pixel_aspect_ratio() {
        let mut info = TrackInfo {
            video_tracks: vec![VideoTrack {
                width: Some(720),
                height: Some(480),
                pixel_aspect_ratio: Some(0.889),
                ..VideoTrack::default()
            }],
            ..TrackInfo::default()
        };
        // 480 * 0.889 = 426.72 -> 426
        assert_eq!(
            info.frame_size(),
            Some(FrameSize {
                width: 720,
                height: 426
            })
        );

        info.video_tracks[0].pixel_aspect_ratio = Some(1.185);
        // 720 * 1.185 = 853.2 -> 853 -> 854
        assert_eq!(info.frame_size().unwrap().to_string(), "854x480");
    }

    #[test]
    fn test_frame_size_missing_geometry() {
        let info = TrackInfo {
            video_tracks: vec![VideoTrack::default()],
            ..TrackInfo::default()
        };
        assert!(info.frame_size().is_none());
        assert!(info.duration_ms().is_none());
    }

    #[test]
    fn test_frame_size_extreme_pixel_aspect_ratio() {
        let info = TrackInfo {
            video_tracks: vec![VideoTrack {
                width: Some(1921),
                height: Some(1080),
                pixel_aspect_ratio: Some(1e12),
                ..VideoTrack::default()
            }],
            ..TrackInfo::default()
        };
        assert_eq!(
            info.frame_size(),
            Some(FrameSize {
                width: u32::MAX,
                height: 1080
            })
        );
        assert_eq!(round_up_even(u32::MAX), u32::MAX);
    }

    #[test]
    fn test_aac_lc_is_normal_format() {
        let json = r#"{"media": {"track": [
            {"@type": "Video", "Format": "AVC", "Width": "1920", "Height": "1080", "Duration": "60.000"},
            {
                "@type": "Audio",
                "Format": "AAC",
                "Format_AdditionalFeatures": "LC",
                "Format_Info": "Advanced Audio Codec Low Complexity",
                "Channels": "2"
            }
        ]}}"#;
        let info = parse_mediainfo_json(json, Path::new("a.mp4")).unwrap();
        assert_eq!(info.audio_tracks[0].commercial_name, "AAC");
        assert!(info.audio_tracks[0].is_normal_format);
    }

    #[test]
    fn test_parse_leading_u32() {
        assert_eq!(parse_leading_u32("6 / 2"), Some(6));
        assert_eq!(parse_leading_u32("1920"), Some(1920));
        assert_eq!(parse_leading_u32("abc"), None);
    }
}
