//! 編解碼器商業名稱與發行名稱標記的對照表

use crate::tools::{AudioTrack, VideoTrack};

/// 音訊編碼
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioCodec {
    DolbyDigitalPlus,
    DolbyDigital,
    DtsHdMasterAudio,
    DolbyAtmos,
    DolbyTrueHd,
    Aac,
    Ac3,
    Flac,
    Unknown,
}

impl AudioCodec {
    #[must_use]
    pub fn from_commercial_name(name: &str) -> Self {
        match name.trim() {
            "Dolby Digital Plus" => Self::DolbyDigitalPlus,
            "Dolby Digital" => Self::DolbyDigital,
            "DTS-HD Master Audio" => Self::DtsHdMasterAudio,
            "Dolby Digital Plus with Dolby Atmos" => Self::DolbyAtmos,
            "Dolby TrueHD" | "Dolby TrueHD with Dolby Atmos" => Self::DolbyTrueHd,
            "AAC" | "HE-AAC" => Self::Aac,
            "Audio Coding 3" => Self::Ac3,
            "Free Lossless Audio Codec" | "FLAC" => Self::Flac,
            _ => Self::Unknown,
        }
    }

    /// 一般格式（非杜比系列），不附聲道配置
    #[must_use]
    pub const fn is_normal_format(self) -> bool {
        matches!(self, Self::Aac | Self::Ac3 | Self::Flac)
    }

    #[must_use]
    pub const fn token(self) -> Option<&'static str> {
        match self {
            Self::DolbyDigitalPlus => Some("DDP"),
            Self::DolbyDigital => Some("DD"),
            Self::DtsHdMasterAudio => Some("DTSHDMA"),
            Self::DolbyAtmos => Some("ATMOS"),
            Self::DolbyTrueHd => Some("TRUEHD"),
            Self::Aac => Some("AAC"),
            Self::Ac3 => Some("AC3"),
            Self::Flac => Some("FLAC"),
            Self::Unknown => None,
        }
    }
}

/// 視訊編碼
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VideoCodec {
    /// 編碼器函式庫名稱（例如 x265），優先於格式
    Library(String),
    Avc,
    Hevc,
    Unknown,
}

impl VideoCodec {
    #[must_use]
    pub fn from_track(track: &VideoTrack) -> Self {
        if let Some(library) = track
            .encoded_library_name
            .as_deref()
            .map(str::trim)
            .filter(|l| !l.is_empty())
        {
            return Self::Library(library.to_string());
        }
        match track.commercial_name.trim() {
            "AVC" => Self::Avc,
            "HEVC" => Self::Hevc,
            _ => Self::Unknown,
        }
    }

    #[must_use]
    pub fn token(&self) -> Option<String> {
        match self {
            Self::Library(name) => Some(name.to_uppercase()),
            Self::Avc => Some("H264".to_string()),
            Self::Hevc => Some("H265".to_string()),
            Self::Unknown => None,
        }
    }
}

/// HDR 等級
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quality {
    DolbyVision,
    Hdr10,
    Sdr,
}

impl Quality {
    #[must_use]
    pub fn from_tracks(tracks: &[VideoTrack]) -> Self {
        let formats: Vec<&str> = tracks.iter().filter_map(|t| t.hdr_format.as_deref()).collect();
        if formats.iter().any(|f| f.contains("Dolby Vision")) {
            Self::DolbyVision
        } else if formats.iter().any(|f| f.contains("HDR10")) {
            Self::Hdr10
        } else {
            Self::Sdr
        }
    }

    #[must_use]
    pub const fn token(self) -> Option<&'static str> {
        match self {
            Self::DolbyVision => Some("DV"),
            Self::Hdr10 => Some("HDR10"),
            Self::Sdr => None,
        }
    }
}

/// 聲道數對應的聲道配置
#[must_use]
pub const fn channel_layout(channels: u32) -> Option<&'static str> {
    match channels {
        1 => Some("1.0"),
        2 => Some("2.0"),
        3 => Some("2.1"),
        6 => Some("5.1"),
        8 => Some("7.1"),
        _ => None,
    }
}

/// 音訊標記：杜比系列（可附聲道配置）在前，一般格式在後，以 `.` 連接
///
/// 每一類都以最後出現的音軌為準。
#[must_use]
pub fn audio_token(tracks: &[AudioTrack], with_channel_layout: bool) -> Option<String> {
    let mut dolby: Option<String> = None;
    let mut normal: Option<&'static str> = None;

    for track in tracks {
        let codec = AudioCodec::from_commercial_name(&track.commercial_name);
        let Some(token) = codec.token() else {
            continue;
        };
        if codec.is_normal_format() {
            normal = Some(token);
        } else {
            let layout = track
                .channels
                .filter(|_| with_channel_layout)
                .and_then(channel_layout)
                .unwrap_or("");
            dolby = Some(format!("{token}{layout}"));
        }
    }

    match (dolby, normal) {
        (Some(d), Some(n)) => Some(format!("{d}.{n}")),
        (Some(d), None) => Some(d),
        (None, Some(n)) => Some(n.to_string()),
        (None, None) => None,
    }
}

/// 視訊標記：取第一個可辨識的視訊軌
#[must_use]
pub fn video_token(tracks: &[VideoTrack]) -> Option<String> {
    tracks
        .iter()
        .find_map(|track| VideoCodec::from_track(track).token())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn audio(name: &str, channels: Option<u32>, normal: bool) -> AudioTrack {
        AudioTrack {
            commercial_name: name.to_string(),
            channels,
            is_normal_format: normal,
        }
    }

    #[test]
    fn test_audio_codec_lookup() {
        assert_eq!(
            AudioCodec::from_commercial_name("Dolby Digital Plus").token(),
            Some("DDP")
        );
        assert_eq!(
            AudioCodec::from_commercial_name("Dolby TrueHD with Dolby Atmos").token(),
            Some("TRUEHD")
        );
        assert_eq!(AudioCodec::from_commercial_name("HE-AAC"), AudioCodec::Aac);
        assert_eq!(AudioCodec::from_commercial_name("Opus"), AudioCodec::Unknown);
        assert_eq!(AudioCodec::Unknown.token(), None);
    }

    #[test]
    fn test_audio_token_dolby_with_layout_and_fallback() {
        let tracks = vec![
            audio("Dolby Digital Plus", Some(6), false),
            audio("AAC", Some(2), true),
        ];
        assert_eq!(audio_token(&tracks, true).as_deref(), Some("DDP5.1.AAC"));
        assert_eq!(audio_token(&tracks, false).as_deref(), Some("DDP.AAC"));
    }

    #[test]
    fn test_audio_token_normal_only() {
        let tracks = vec![audio("AAC", Some(2), true)];
        assert_eq!(audio_token(&tracks, true).as_deref(), Some("AAC"));
    }

    #[test]
    fn test_audio_token_layout_only_on_dolby_family() {
        // 旗標與編碼不一致時以編碼為準
        let tracks = vec![audio("AAC", Some(2), false)];
        assert_eq!(audio_token(&tracks, true).as_deref(), Some("AAC"));

        let tracks = vec![audio("Dolby Digital", Some(6), true)];
        assert_eq!(audio_token(&tracks, true).as_deref(), Some("DD5.1"));
    }

    #[test]
    fn test_audio_token_unknown_is_omitted() {
        let tracks = vec![audio("Opus", Some(2), false)];
        assert_eq!(audio_token(&tracks, true), None);
        assert_eq!(audio_token(&[], true), None);
    }

    #[test]
    fn test_video_token_prefers_library() {
        let track = VideoTrack {
            encoded_library_name: Some("x265".to_string()),
            commercial_name: "HEVC".to_string(),
            ..VideoTrack::default()
        };
        assert_eq!(video_token(&[track]).as_deref(), Some("X265"));

        let avc = VideoTrack {
            commercial_name: "AVC".to_string(),
            ..VideoTrack::default()
        };
        assert_eq!(video_token(&[avc]).as_deref(), Some("H264"));

        let vp9 = VideoTrack {
            commercial_name: "VP9".to_string(),
            ..VideoTrack::default()
        };
        assert_eq!(video_token(&[vp9]), None);
    }

    #[test]
    fn test_quality_precedence() {
        let hdr10 = VideoTrack {
            hdr_format: Some("SMPTE ST 2086 / HDR10".to_string()),
            ..VideoTrack::default()
        };
        let dv = VideoTrack {
            hdr_format: Some("Dolby Vision".to_string()),
            ..VideoTrack::default()
        };
        assert_eq!(Quality::from_tracks(&[hdr10.clone()]).token(), Some("HDR10"));
        assert_eq!(Quality::from_tracks(&[hdr10, dv]).token(), Some("DV"));
        assert_eq!(Quality::from_tracks(&[VideoTrack::default()]).token(), None);
    }
}
