use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
pub use strum::IntoEnumIterator;
use strum_macros::EnumIter;

/// Supported source platforms
#[derive(EnumIter, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, Copy)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Youtube,
    Instagram,
    Whatsapp,
}

impl Platform {
    /// Check if the URL belongs to this platform (fixed substrings, case-sensitive)
    pub fn matches(&self, url: &str) -> bool {
        match self {
            Platform::Youtube => url.contains("youtube.com") || url.contains("youtu.be"),
            Platform::Instagram => url.contains("instagram.com"),
            Platform::Whatsapp => url.contains("wa.me") || url.contains("whatsapp.com"),
        }
    }

    /// Classify a raw URL, `None` when no platform matches
    pub fn detect(url: &str) -> Option<Platform> {
        Platform::iter().find(|p| p.matches(url))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Youtube => "youtube",
            Platform::Instagram => "instagram",
            Platform::Whatsapp => "whatsapp",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Platform::Youtube => "▶️",
            Platform::Instagram => "📸",
            Platform::Whatsapp => "🟢",
        }
    }
}

/// Glyph for an optional classification result
pub fn platform_icon(platform: Option<Platform>) -> &'static str {
    platform.map_or("❓", |p| p.icon())
}

static SUPPORTED_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(https?://)?(www\.)?(youtube\.com|youtu\.be|instagram\.com|wa\.me|whatsapp\.com)/.+",
    )
    .expect("Invalid supported-URL pattern")
});

/// Strict URL validation: a supported host followed by a non-empty path
pub fn is_supported_url(url: &str) -> bool {
    SUPPORTED_URL.is_match(url)
}

// Requested output kind for a download
#[derive(EnumIter, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, Copy, Default)]
#[serde(rename_all = "lowercase")]
pub enum DownloadMode {
    #[default]
    Video,
    Mp3,
}

impl DownloadMode {
    /// Wire tag sent in the download request body
    pub fn as_str(&self) -> &'static str {
        match self {
            DownloadMode::Video => "video",
            DownloadMode::Mp3 => "mp3",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            DownloadMode::Video => ".mp4",
            DownloadMode::Mp3 => ".mp3",
        }
    }

    /// Filename used when the service does not provide one
    pub fn default_filename(&self) -> String {
        format!("download{}", self.extension())
    }
}

/// Metadata about a remote media resource, as returned by the analyze service
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct MediaInfo {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub uploader: Option<String>,
    /// Duration in seconds
    #[serde(default)]
    pub duration: Option<u64>,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub platform: Option<Platform>,
}

impl MediaInfo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set title
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set uploader
    pub fn with_uploader(mut self, uploader: impl Into<String>) -> Self {
        self.uploader = Some(uploader.into());
        self
    }

    /// Set duration in seconds
    pub fn with_duration(mut self, duration: u64) -> Self {
        self.duration = Some(duration);
        self
    }

    /// Set thumbnail URL
    pub fn with_thumbnail(mut self, thumbnail: impl Into<String>) -> Self {
        self.thumbnail = Some(thumbnail.into());
        self
    }

    /// Human-readable duration, "N/A" when unknown
    pub fn duration_text(&self) -> String {
        self.duration
            .map_or_else(|| "N/A".to_string(), format_duration)
    }
}

pub fn format_duration(seconds: u64) -> String {
    format!("{}m {}s", seconds / 60, seconds % 60)
}

/// Reference to a file the delivery service has produced
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DownloadTicket {
    pub file_id: String,
    #[serde(default)]
    pub filename: String,
}
