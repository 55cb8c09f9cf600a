use anyhow::Result;
use clap::Parser;
use mediafree::core::{IntoEnumIterator, is_supported_url, platform_icon};
use mediafree::session::{
    ANALYZE_FAILED_MSG, DOWNLOAD_FAILED_MSG, Session, UNSUPPORTED_URL_MSG,
};
use mediafree::{ApiClient, DEFAULT_API_BASE, DownloadMode, MediaInfo, Platform};
use std::fs;
use std::path::Path;

#[derive(Parser)]
#[command(
    name = "mediafree",
    version,
    about = "Download media from social platforms via a downloader service",
    long_about = "Client for a universal media downloader service.\n\
    Classifies a YouTube, Instagram, or WhatsApp link, fetches metadata,\n\
    then requests a download and saves the produced file.\n\n\
    Examples:\n\
      mediafree https://youtu.be/abc123                  # Download as video\n\
      mediafree -m mp3 https://youtu.be/abc123           # Download as MP3\n\
      mediafree -i https://youtu.be/abc123               # Show info only\n\
      mediafree -d ./media https://youtu.be/abc123       # Download to directory\n\
      mediafree -o song https://youtu.be/abc123          # Custom filename"
)]
struct Args {
    /// URL to analyze and download (supports YouTube, Instagram, WhatsApp)
    #[arg(help = "URL to analyze and download (supports YouTube, Instagram, WhatsApp)")]
    url: String,

    /// Output kind: video or mp3
    #[arg(short = 'm', long = "mode", default_value = "video", help = "Output kind: video or mp3")]
    mode: String,

    /// Fetch and show metadata only, no download
    #[arg(
        short = 'i',
        long = "info-only",
        help = "Fetch and show metadata only, no download"
    )]
    info_only: bool,

    /// Save to specified directory
    #[arg(short = 'd', long = "dir", help = "Save to specified directory")]
    output_dir: Option<String>,

    /// Output filename (extension follows the mode)
    #[arg(
        short = 'o',
        long = "output",
        help = "Output filename (extension follows the mode)"
    )]
    output_name: Option<String>,

    /// Downloader service address
    #[arg(
        long = "api-base",
        env = "MEDIAFREE_API_BASE",
        default_value = DEFAULT_API_BASE,
        help = "Downloader service address"
    )]
    api_base: String,
}

fn parse_mode(mode_str: &str) -> DownloadMode {
    let lowered = mode_str.to_lowercase();
    match DownloadMode::iter().find(|m| m.as_str() == lowered) {
        Some(mode) => mode,
        None => {
            eprintln!("Warning: Unsupported mode '{}', using video", mode_str);
            DownloadMode::Video
        }
    }
}

fn display_info(info: &MediaInfo) {
    println!("Title: {}", info.title.as_deref().unwrap_or("Unknown"));
    println!("Uploader: {}", info.uploader.as_deref().unwrap_or("Unknown"));
    println!("Duration: {}", info.duration_text());
    if let Some(thumbnail) = &info.thumbnail {
        println!("Thumbnail: {}", thumbnail);
    }
    if let Some(platform) = info.platform {
        println!("Platform: {}", platform.as_str());
    }
}

fn get_filename(server_name: &str, mode: DownloadMode, output_name: &Option<String>) -> String {
    if let Some(name) = output_name {
        // If output name is provided, use its stem with the mode's extension
        let base_name = Path::new(name)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("download");
        format!("{}{}", base_name, mode.extension())
    } else if !server_name.is_empty() {
        sanitize_filename::sanitize(server_name)
    } else {
        mode.default_filename()
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();
    let mode = parse_mode(&args.mode);

    println!(
        "{} Analyzing: {}",
        platform_icon(Platform::detect(&args.url)),
        args.url
    );

    if !is_supported_url(&args.url) {
        eprintln!("Error: {}", UNSUPPORTED_URL_MSG);
        std::process::exit(1);
    }

    let client = ApiClient::new(&args.api_base)?;
    let mut session = Session::new(client, args.url.clone(), mode);

    // Phase 1: fetch and display metadata
    if !session.analyze().await {
        let message = session.state().error.as_deref().unwrap_or(ANALYZE_FAILED_MSG);
        eprintln!("Error: {}", message);
        std::process::exit(1);
    }
    if let Some(info) = session.state().info.as_ref() {
        display_info(info);
    }

    if args.info_only {
        println!("Information only mode - skipping download.");
        return Ok(());
    }

    // Phase 2: request the download and retrieve the file
    println!();
    println!("Requesting {} download...", mode.as_str());
    if !session.download().await {
        let message = session
            .state()
            .error
            .as_deref()
            .unwrap_or(DOWNLOAD_FAILED_MSG);
        eprintln!("Error: {}", message);
        std::process::exit(1);
    }

    let ticket = match session.state().ticket.clone() {
        Some(ticket) => ticket,
        None => {
            eprintln!("Error: {}", DOWNLOAD_FAILED_MSG);
            std::process::exit(1);
        }
    };

    let filename = get_filename(&ticket.filename, mode, &args.output_name);
    let base_path = if let Some(dir) = &args.output_dir {
        // Create directory if it doesn't exist
        fs::create_dir_all(dir)?;
        Path::new(dir).join(&filename)
    } else {
        Path::new(".").join(&filename)
    };

    let mut file = fs::File::create(&base_path)?;
    match session.service().fetch_file(&ticket, &mut file).await {
        Ok(bytes) => println!("✓ Saved to: {} ({} bytes)", base_path.display(), bytes),
        Err(e) => {
            eprintln!("✗ Error saving file: {}", e);
            std::process::exit(1);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let args = Args::try_parse_from(["mediafree", "https://youtu.be/abc123"]).unwrap();
        assert_eq!(args.url, "https://youtu.be/abc123");
        assert_eq!(args.mode, "video");
        assert!(!args.info_only);
        assert_eq!(args.output_dir, None);
    }

    #[test]
    fn test_cli_mode_and_output() {
        let args = Args::try_parse_from([
            "mediafree",
            "-m",
            "mp3",
            "-o",
            "song",
            "-d",
            "/tmp/media",
            "https://youtu.be/abc123",
        ])
        .unwrap();
        assert_eq!(args.mode, "mp3");
        assert_eq!(args.output_name.as_deref(), Some("song"));
        assert_eq!(args.output_dir.as_deref(), Some("/tmp/media"));
    }

    #[test]
    fn test_parse_mode() {
        assert_eq!(parse_mode("video"), DownloadMode::Video);
        assert_eq!(parse_mode("mp3"), DownloadMode::Mp3);
        assert_eq!(parse_mode("MP3"), DownloadMode::Mp3);
        assert_eq!(parse_mode("flac"), DownloadMode::Video);
    }

    #[test]
    fn test_get_filename() {
        // -o override: stem plus the mode's extension
        assert_eq!(
            get_filename("server.mp4", DownloadMode::Mp3, &Some("song.wav".to_string())),
            "song.mp3"
        );
        // Server-provided name, sanitized
        assert_eq!(
            get_filename("a/b.mp4", DownloadMode::Video, &None),
            "ab.mp4"
        );
        // Neither: derived fallback
        assert_eq!(get_filename("", DownloadMode::Mp3, &None), "download.mp3");
        assert_eq!(get_filename("", DownloadMode::Video, &None), "download.mp4");
    }
}
