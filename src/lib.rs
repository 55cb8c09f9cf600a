pub mod api;
pub mod core;
mod download;
pub mod error;
pub mod session;

pub use api::{ApiClient, DEFAULT_API_BASE, MediaService};
pub use core::{DownloadMode, DownloadTicket, MediaInfo, Platform, platform_icon};
use error::{MediaFreeError, Result};
pub use session::{Session, SessionState};

/// Fetch metadata for a URL (classify locally first, then ask the service)
pub async fn analyze(api_base: &str, url: &str) -> Result<MediaInfo> {
    if Platform::detect(url).is_none() {
        return Err(MediaFreeError::UnsupportedUrl(url.to_string()));
    }
    ApiClient::new(api_base)?.analyze(url).await
}
