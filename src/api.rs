use async_trait::async_trait;
use serde::Serialize;
use std::io::Write;
use url::Url;

use crate::core::{DownloadMode, DownloadTicket, MediaInfo};
use crate::download::{download_to_writer, get_http_client, post_json};
use crate::error::{MediaFreeError, Result};

/// Default service address, overridable via `--api-base` / `MEDIAFREE_API_BASE`
pub const DEFAULT_API_BASE: &str = "http://localhost:8000";

#[derive(Debug, Serialize)]
struct AnalyzeRequest<'a> {
    url: &'a str,
}

#[derive(Debug, Serialize)]
struct DownloadRequest<'a> {
    url: &'a str,
    mode: DownloadMode,
}

/// Trait for talking to the downloader service
#[async_trait]
pub trait MediaService: Send + Sync {
    /// Fetch metadata about the media behind a URL
    async fn analyze(&self, url: &str) -> Result<MediaInfo>;

    /// Request a download, returning a reference to the produced file
    async fn download(&self, url: &str, mode: DownloadMode) -> Result<DownloadTicket>;
}

/// HTTP client for a running downloader service
pub struct ApiClient {
    base: String,
    client: reqwest::Client,
}

impl ApiClient {
    pub fn new(base: &str) -> Result<Self> {
        Url::parse(base)
            .map_err(|e| MediaFreeError::InvalidUrl(format!("Bad API base '{}': {}", base, e)))?;
        Ok(Self {
            base: base.trim_end_matches('/').to_string(),
            client: get_http_client(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    /// Retrieval URL for a finished download
    pub fn file_url(&self, ticket: &DownloadTicket) -> String {
        format!(
            "{}/file/{}",
            self.base,
            urlencoding::encode(&ticket.file_id)
        )
    }

    /// Stream a finished download into a writer
    pub async fn fetch_file<W: Write>(
        &self,
        ticket: &DownloadTicket,
        writer: &mut W,
    ) -> Result<u64> {
        download_to_writer(&self.client, &self.file_url(ticket), writer).await
    }
}

#[async_trait]
impl MediaService for ApiClient {
    async fn analyze(&self, url: &str) -> Result<MediaInfo> {
        post_json(&self.client, &self.endpoint("/analyze"), &AnalyzeRequest { url }).await
    }

    async fn download(&self, url: &str, mode: DownloadMode) -> Result<DownloadTicket> {
        post_json(
            &self.client,
            &self.endpoint("/download"),
            &DownloadRequest { url, mode },
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Platform;
    use serde_json::json;
    use std::io::Read;

    #[test]
    fn test_rejects_bad_base() {
        assert!(ApiClient::new("not a base").is_err());
        assert!(ApiClient::new("http://localhost:8000").is_ok());
    }

    #[test]
    fn test_trailing_slash_normalized() {
        let client = ApiClient::new("http://localhost:8000/").unwrap();
        assert_eq!(client.endpoint("/analyze"), "http://localhost:8000/analyze");
    }

    #[test]
    fn test_file_url_encodes_id() {
        let client = ApiClient::new("http://localhost:8000").unwrap();
        let ticket = DownloadTicket {
            file_id: "ab/cd".to_string(),
            filename: "x.mp4".to_string(),
        };
        assert_eq!(client.file_url(&ticket), "http://localhost:8000/file/ab%2Fcd");
    }

    #[tokio::test]
    async fn test_analyze() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/analyze")
            .match_body(mockito::Matcher::Json(
                json!({"url": "https://youtu.be/abc123"}),
            ))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"title": "Song", "uploader": "Artist", "duration": 125,
                    "thumbnail": "http://x/y.jpg", "platform": "youtube"}"#,
            )
            .create_async()
            .await;

        let client = ApiClient::new(&server.url()).unwrap();
        let info = client.analyze("https://youtu.be/abc123").await.unwrap();

        mock.assert_async().await;
        assert_eq!(info.title.as_deref(), Some("Song"));
        assert_eq!(info.uploader.as_deref(), Some("Artist"));
        assert_eq!(info.duration, Some(125));
        assert_eq!(info.thumbnail.as_deref(), Some("http://x/y.jpg"));
        assert_eq!(info.platform, Some(Platform::Youtube));
        assert_eq!(info.duration_text(), "2m 5s");
    }

    #[tokio::test]
    async fn test_analyze_error_detail() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/analyze")
            .with_status(400)
            .with_header("content-type", "application/json")
            .with_body(r#"{"detail": "Unsupported platform."}"#)
            .create_async()
            .await;

        let client = ApiClient::new(&server.url()).unwrap();
        let err = client.analyze("https://youtu.be/abc123").await.unwrap_err();
        assert_eq!(err.detail(), Some("Unsupported platform."));
    }

    #[tokio::test]
    async fn test_download_request_body() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/download")
            .match_body(mockito::Matcher::Json(
                json!({"url": "https://youtu.be/abc123", "mode": "mp3"}),
            ))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"file_id": "f-1", "filename": "f-1.mp3"}"#)
            .create_async()
            .await;

        let client = ApiClient::new(&server.url()).unwrap();
        let ticket = client
            .download("https://youtu.be/abc123", DownloadMode::Mp3)
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(ticket.file_id, "f-1");
        assert_eq!(ticket.filename, "f-1.mp3");
    }

    #[tokio::test]
    async fn test_download_rejects_non_ticket_response() {
        // The service must answer with the ticket shape; a raw payload is an error
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/download")
            .with_status(200)
            .with_header("content-type", "application/octet-stream")
            .with_body(b"raw bytes".to_vec())
            .create_async()
            .await;

        let client = ApiClient::new(&server.url()).unwrap();
        let result = client
            .download("https://youtu.be/abc123", DownloadMode::Video)
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_fetch_file() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/file/f-1")
            .with_status(200)
            .with_body(b"media bytes".to_vec())
            .create_async()
            .await;

        let client = ApiClient::new(&server.url()).unwrap();
        let ticket = DownloadTicket {
            file_id: "f-1".to_string(),
            filename: "song.mp3".to_string(),
        };

        let mut file = tempfile::tempfile().unwrap();
        let written = client.fetch_file(&ticket, &mut file).await.unwrap();
        assert_eq!(written, 11);

        use std::io::Seek;
        file.rewind().unwrap();
        let mut contents = Vec::new();
        file.read_to_end(&mut contents).unwrap();
        assert_eq!(contents, b"media bytes");
    }
}
