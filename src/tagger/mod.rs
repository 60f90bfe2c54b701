use std::fmt;
use std::path::Path;

use async_trait::async_trait;
use colored::Colorize;
use error_stack::{IntoReport, Report, ResultExt};
use log::debug;

use crate::errors::failure_reason;
use crate::spotify::track::SpotifyTrack;

pub mod container;

#[derive(Debug)]
pub struct TaggerError;

impl fmt::Display for TaggerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Tagger error")
    }
}

impl std::error::Error for TaggerError {}

pub type TaggerResult<T> = error_stack::Result<T, TaggerError>;

/// What happened to the tags of a downloaded file. Never undoes the download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagOutcome {
    Tagged,
    /// The text tags were saved but the cover art could not be added.
    CoverFailed { reason: String },
    /// Nothing could be written, the file is left untagged.
    Failed { reason: String },
}

impl TagOutcome {
    pub fn is_tagged(&self) -> bool {
        matches!(self, TagOutcome::Tagged)
    }
}

/// Source of cover art bytes.
#[async_trait]
pub trait CoverArtSource: Send + Sync {
    async fn fetch_cover(&self, url: &str) -> TaggerResult<Vec<u8>>;
}

pub struct HttpCoverSource {
    client: reqwest::Client,
}

impl HttpCoverSource {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl CoverArtSource for HttpCoverSource {
    async fn fetch_cover(&self, url: &str) -> TaggerResult<Vec<u8>> {
        debug!("GET {}", url);
        let bytes = self
            .client
            .get(url)
            .send()
            .await
            .into_report()
            .change_context(TaggerError)?
            .error_for_status()
            .into_report()
            .change_context(TaggerError)
            .attach_printable(format!("Cover art request to {} failed", url))?
            .bytes()
            .await
            .into_report()
            .change_context(TaggerError)?;
        Ok(bytes.to_vec())
    }
}

/// Best effort post processing of a downloaded file.
#[async_trait]
pub trait TrackTagger: Send + Sync {
    async fn tag_file(
        &self,
        path: &Path,
        cover_url: Option<&str>,
        track: Option<&SpotifyTrack>,
    ) -> TagOutcome;
}

pub struct Tagger<C> {
    cover_source: C,
}

impl<C: CoverArtSource> Tagger<C> {
    pub fn new(cover_source: C) -> Self {
        Self { cover_source }
    }

    async fn embed_cover(&self, path: &Path, url: &str) -> TaggerResult<()> {
        let image = self.cover_source.fetch_cover(url).await?;
        if image.is_empty() {
            return Err(Report::new(TaggerError).attach_printable("Cover art response was empty"));
        }
        container::write_cover(path, image)
    }
}

#[async_trait]
impl<C: CoverArtSource> TrackTagger for Tagger<C> {
    /// Text tags go in first and are saved on their own, so a cover art
    /// failure afterwards leaves them in the file.
    async fn tag_file(
        &self,
        path: &Path,
        cover_url: Option<&str>,
        track: Option<&SpotifyTrack>,
    ) -> TagOutcome {
        if let Some(track) = track {
            if let Err(report) = container::write_text_tags(path, track) {
                let reason = failure_reason(&report);
                debug!("Tagging {} failed: {:?}", path.display(), report);
                println!("⚠️  Failed to embed metadata: {}", reason.yellow());
                return TagOutcome::Failed { reason };
            }
            println!("🎵 Metadata embedded.");
        }

        if let Some(url) = cover_url {
            if let Err(report) = self.embed_cover(path, url).await {
                let reason = failure_reason(&report);
                debug!("Cover art for {} failed: {:?}", path.display(), report);
                println!("⚠️  Failed to embed metadata: {}", reason.yellow());
                return if track.is_some() {
                    TagOutcome::CoverFailed { reason }
                } else {
                    TagOutcome::Failed { reason }
                };
            }
            println!("🖼️  Album art embedded.");
        }

        TagOutcome::Tagged
    }
}
