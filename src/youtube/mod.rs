use std::fmt;
use std::path::Path;

use async_trait::async_trait;

use crate::config::AppConfig;

pub mod download;
pub mod sanitize;
pub mod search;

#[derive(Debug)]
pub struct YoutubeError;

impl fmt::Display for YoutubeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Youtube error")
    }
}

impl std::error::Error for YoutubeError {}

pub type YoutubeResult<T> = error_stack::Result<T, YoutubeError>;

/// A search candidate. Only lives until its audio has been downloaded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VideoMatch {
    pub id: String,
    pub title: String,
    pub watch_url: String,
}

impl VideoMatch {
    pub fn new(id: String, title: String) -> Self {
        let watch_url = format!("https://www.youtube.com/watch?v={}", id);
        Self {
            id,
            title,
            watch_url,
        }
    }
}

/// Search and audio download on the video platform.
#[async_trait]
pub trait VideoPlatform: Send + Sync {
    /// Candidates in the order the platform ranks them.
    async fn search(&self, query: &str) -> YoutubeResult<Vec<VideoMatch>>;

    /// Writes the audio only stream of `video` to `destination`, replacing any
    /// existing file.
    async fn download_audio(&self, video: &VideoMatch, destination: &Path) -> YoutubeResult<()>;
}

/// [`VideoPlatform`] backed by the `yt-dlp` executable.
pub struct YtDlp {
    program: String,
}

impl YtDlp {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            program: config.ytdlp_path.clone(),
        }
    }
}

#[async_trait]
impl VideoPlatform for YtDlp {
    async fn search(&self, query: &str) -> YoutubeResult<Vec<VideoMatch>> {
        self.search_videos(query).await
    }

    async fn download_audio(&self, video: &VideoMatch, destination: &Path) -> YoutubeResult<()> {
        self.download_stream(video, destination).await
    }
}
