use log::debug;

use crate::api::MediaService;
use crate::core::{DownloadMode, DownloadTicket, MediaInfo, Platform};
use crate::error::MediaFreeError;

pub const UNSUPPORTED_URL_MSG: &str = "Unsupported or invalid URL.";
pub const ANALYZE_FAILED_MSG: &str = "Failed to analyze URL.";
pub const DOWNLOAD_FAILED_MSG: &str = "Download failed.";

/// In-flight action; at most one action runs at a time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Analyzing,
    Downloading,
}

/// Everything a session holds: the raw input, the classification, the
/// in-flight phase and the outcome of the last action.
///
/// All mutation goes through the named transitions below; every action
/// ends back in [`Phase::Idle`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    pub url: String,
    pub mode: DownloadMode,
    pub platform: Option<Platform>,
    pub phase: Phase,
    pub info: Option<MediaInfo>,
    pub error: Option<String>,
    pub ticket: Option<DownloadTicket>,
}

impl SessionState {
    pub fn new(url: impl Into<String>, mode: DownloadMode) -> Self {
        Self {
            url: url.into(),
            mode,
            ..Self::default()
        }
    }

    pub fn is_idle(&self) -> bool {
        self.phase == Phase::Idle
    }

    pub fn is_analyzing(&self) -> bool {
        self.phase == Phase::Analyzing
    }

    pub fn is_downloading(&self) -> bool {
        self.phase == Phase::Downloading
    }

    /// Analyze is available whenever nothing is in flight and there is input
    pub fn can_analyze(&self) -> bool {
        self.is_idle() && !self.url.is_empty()
    }

    /// Download is only available once an analyze has produced metadata
    pub fn can_download(&self) -> bool {
        self.is_idle() && self.info.is_some()
    }

    /// Replace the input URL; the stale classification is dropped
    pub fn set_url(&mut self, url: impl Into<String>) {
        self.url = url.into();
        self.platform = None;
    }

    pub fn set_mode(&mut self, mode: DownloadMode) {
        self.mode = mode;
    }

    /// Start an analyze: clear the previous outcome and classify the URL.
    /// An unclassifiable URL records an error and never leaves idle.
    pub fn begin_analyze(&mut self) -> bool {
        if !self.can_analyze() {
            return false;
        }
        self.info = None;
        self.error = None;
        self.ticket = None;
        self.platform = Platform::detect(&self.url);
        if self.platform.is_none() {
            self.error = Some(UNSUPPORTED_URL_MSG.to_string());
            return false;
        }
        self.phase = Phase::Analyzing;
        true
    }

    pub fn analyze_succeeded(&mut self, info: MediaInfo) {
        self.phase = Phase::Idle;
        self.info = Some(info);
    }

    pub fn analyze_failed(&mut self, message: impl Into<String>) {
        self.phase = Phase::Idle;
        self.error = Some(message.into());
    }

    /// Start a download; refused until a successful analyze has run
    pub fn begin_download(&mut self) -> bool {
        if !self.can_download() {
            return false;
        }
        self.error = None;
        self.ticket = None;
        self.phase = Phase::Downloading;
        true
    }

    pub fn download_succeeded(&mut self, ticket: DownloadTicket) {
        self.phase = Phase::Idle;
        self.ticket = Some(ticket);
    }

    pub fn download_failed(&mut self, message: impl Into<String>) {
        self.phase = Phase::Idle;
        self.error = Some(message.into());
    }
}

/// Surfaced message: the service's detail when present, else the fallback
fn error_message(err: &MediaFreeError, fallback: &str) -> String {
    err.detail()
        .map_or_else(|| fallback.to_string(), str::to_string)
}

/// A session drives the two-phase analyze/download flow against a service,
/// keeping the state record consistent around each call.
pub struct Session<S: MediaService> {
    state: SessionState,
    service: S,
}

impl<S: MediaService> Session<S> {
    pub fn new(service: S, url: impl Into<String>, mode: DownloadMode) -> Self {
        Self {
            state: SessionState::new(url, mode),
            service,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    pub fn set_url(&mut self, url: impl Into<String>) {
        self.state.set_url(url);
    }

    pub fn set_mode(&mut self, mode: DownloadMode) {
        self.state.set_mode(mode);
    }

    /// Run the analyze action. Returns true when metadata was fetched;
    /// otherwise the state carries the error message.
    pub async fn analyze(&mut self) -> bool {
        if !self.state.begin_analyze() {
            return false;
        }
        debug!("analyze {}", self.state.url);
        match self.service.analyze(&self.state.url).await {
            Ok(info) => {
                self.state.analyze_succeeded(info);
                true
            }
            Err(e) => {
                debug!("analyze failed: {}", e);
                self.state
                    .analyze_failed(error_message(&e, ANALYZE_FAILED_MSG));
                false
            }
        }
    }

    /// Run the download action. Returns true when the service produced a
    /// file reference; otherwise the state carries the error message.
    pub async fn download(&mut self) -> bool {
        if !self.state.begin_download() {
            return false;
        }
        debug!("download {} as {}", self.state.url, self.state.mode.as_str());
        match self.service.download(&self.state.url, self.state.mode).await {
            Ok(ticket) => {
                self.state.download_succeeded(ticket);
                true
            }
            Err(e) => {
                debug!("download failed: {}", e);
                self.state
                    .download_failed(error_message(&e, DOWNLOAD_FAILED_MSG));
                false
            }
        }
    }
}
