use std::time::Duration;

use async_trait::async_trait;
use colored::Colorize;
use error_stack::{Report, ResultExt};
use log::{debug, info};

use crate::config::AppConfig;
use crate::errors::failure_reason;
use crate::pipeline::outcome::{RunSummary, TrackOutcome};
use crate::pipeline::{PipelineError, PipelineResult};
use crate::spotify::api::CatalogClient;
use crate::spotify::playlist::SpotifyPlaylist;
use crate::spotify::track::SpotifyTrack;
use crate::tagger::TrackTagger;
use crate::youtube::download::{destination_path, fetch_audio};
use crate::youtube::search::find_match;
use crate::youtube::VideoPlatform;

/// Pause between two tracks.
#[async_trait]
pub trait Pacer: Send + Sync {
    async fn pause(&self, duration: Duration);
}

pub struct TokioPacer;

#[async_trait]
impl Pacer for TokioPacer {
    async fn pause(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Drives a playlist through search, download and tagging, one track at a
/// time, in playlist order.
pub struct Pipeline<'a> {
    config: &'a AppConfig,
    catalog: &'a dyn CatalogClient,
    platform: &'a dyn VideoPlatform,
    tagger: &'a dyn TrackTagger,
    pacer: &'a dyn Pacer,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        config: &'a AppConfig,
        catalog: &'a dyn CatalogClient,
        platform: &'a dyn VideoPlatform,
        tagger: &'a dyn TrackTagger,
        pacer: &'a dyn Pacer,
    ) -> Self {
        Self {
            config,
            catalog,
            platform,
            tagger,
            pacer,
        }
    }

    /// Only a failure to read the playlist itself is returned as an error.
    /// Anything that goes wrong with a single track is recorded in the summary.
    pub async fn run(&self, playlist_url: &str) -> PipelineResult<RunSummary> {
        let tracks = SpotifyPlaylist::get_playlist_tracks(self.catalog, playlist_url)
            .await
            .change_context(PipelineError)
            .attach_printable("Could not read the playlist")?;

        let mut summary = RunSummary::default();
        let total = tracks.len();
        for (index, track) in tracks.iter().enumerate() {
            if index > 0 {
                self.pacer.pause(self.config.track_delay).await;
            }
            let query = track.get_track_search_term();
            println!(
                "\n🎧 {}/{}: Searching for {}",
                index + 1,
                total,
                query.clone().cyan()
            );
            let outcome = match self.process_track(track, &query).await {
                Ok(outcome) => outcome,
                Err(report) => {
                    let reason = failure_reason(&report);
                    debug!("Track {} failed: {:?}", query, report);
                    println!("💥 Failed to process {}: {}", query.clone().red(), reason);
                    TrackOutcome::Failed { reason }
                }
            };
            summary.record(query, outcome);
        }
        info!("Processed {} tracks", summary.total());
        Ok(summary)
    }

    async fn process_track(
        &self,
        track: &SpotifyTrack,
        query: &str,
    ) -> PipelineResult<TrackOutcome> {
        let Some(video) = find_match(self.platform, query)
            .await
            .change_context(PipelineError)?
        else {
            return Ok(TrackOutcome::NoMatch);
        };

        let destination = destination_path(&self.config.music_dir, &video.title);
        if self.config.skip_existing && destination.exists() {
            println!(
                "⏭️  Already downloaded, skipping: {}",
                destination.display().to_string().yellow()
            );
            return Ok(TrackOutcome::Skipped { path: destination });
        }

        println!("⬇️  Downloading: {}", video.title.clone().cyan());
        let path = fetch_audio(self.platform, &video, &self.config.music_dir)
            .await
            .change_context(PipelineError)?;
        if path != destination {
            return Err(Report::new(PipelineError)
                .attach_printable(format!("Unexpected download path {}", path.display())));
        }

        let tags = self
            .tagger
            .tag_file(&path, track.album_art_url.as_deref(), Some(track))
            .await;
        Ok(TrackOutcome::Downloaded { path, tags })
    }
}
