use futures_util::StreamExt;
use log::debug;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::io::Write;

use crate::error::{MediaFreeError, Result};

const DEFAULT_USER_AGENT: &str = concat!("mediafree/", env!("CARGO_PKG_VERSION"));

/// Initialize HTTP client with default configuration.
/// No request timeout: an in-flight call runs to completion or failure.
pub fn get_http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .default_headers(get_default_headers())
        .build()
        .expect("Failed to create HTTP client")
}

/// Get default headers for requests
fn get_default_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(DEFAULT_USER_AGENT));
    headers
}

/// Error body convention of the service: `{"detail": "..."}`
#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: String,
}

/// Map a non-2xx response to an error, preferring the service's detail message
async fn error_from_response(url: &str, response: reqwest::Response) -> MediaFreeError {
    let status = response.status().as_u16();
    match response.json::<ErrorBody>().await {
        Ok(body) => MediaFreeError::ApiError {
            status,
            detail: body.detail,
        },
        Err(_) => MediaFreeError::HttpError {
            status,
            url: url.to_string(),
        },
    }
}

/// Execute POST request with JSON body and parse the JSON response
pub async fn post_json<T: DeserializeOwned, B: Serialize + ?Sized>(
    client: &reqwest::Client,
    url: &str,
    body: &B,
) -> Result<T> {
    debug!("POST {}", url);
    let response = client.post(url).json(body).send().await?;

    let status = response.status();
    if status.is_success() {
        response.json::<T>().await.map_err(MediaFreeError::from)
    } else {
        Err(error_from_response(url, response).await)
    }
}

/// Stream a binary response body into a writer, returning the bytes written
pub async fn download_to_writer<W: Write>(
    client: &reqwest::Client,
    url: &str,
    writer: &mut W,
) -> Result<u64> {
    debug!("GET {}", url);
    let response = client.get(url).send().await?;

    let status = response.status();
    if !status.is_success() {
        return Err(error_from_response(url, response).await);
    }

    let mut stream = response.bytes_stream();
    let mut written: u64 = 0;
    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        writer.write_all(&chunk)?;
        written += chunk.len() as u64;
    }

    debug!("Downloaded {} bytes from {}", written, url);
    Ok(written)
}
