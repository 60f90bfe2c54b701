use std::fs;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use colored::Colorize;
use error_stack::{IntoReport, Report, ResultExt};
use indicatif::{ProgressBar, ProgressStyle};
use log::debug;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::Command;

use crate::youtube::sanitize::sanitize_filename;
use crate::youtube::{VideoMatch, VideoPlatform, YoutubeError, YoutubeResult, YtDlp};

pub const AUDIO_EXTENSION: &str = "m4a";
const AUDIO_FORMAT: &str = "bestaudio[ext=m4a]/bestaudio";
const PROGRESS_TEMPLATE: &str =
    "download:%(progress.downloaded_bytes)s/%(progress.total_bytes,progress.total_bytes_estimate)s";

/// `<dir>/<sanitized title>.m4a`
pub fn destination_path(music_dir: &Path, title: &str) -> PathBuf {
    music_dir.join(format!("{}.{}", sanitize_filename(title), AUDIO_EXTENSION))
}

/// Downloads the audio of `video` into `music_dir`, creating the folder when it
/// is missing, and returns the path of the written file.
pub async fn fetch_audio(
    platform: &dyn VideoPlatform,
    video: &VideoMatch,
    music_dir: &Path,
) -> YoutubeResult<PathBuf> {
    fs::create_dir_all(music_dir)
        .into_report()
        .change_context(YoutubeError)
        .attach_printable(format!("Could not create {}", music_dir.display()))?;
    let file_path = destination_path(music_dir, &video.title);
    platform.download_audio(video, &file_path).await?;
    println!(
        "✅ Saved as: {}",
        file_path.display().to_string().green()
    );
    Ok(file_path)
}

/// Parses a `downloaded/total` progress line. The total may be missing (`NA`)
/// or a float when yt-dlp only has an estimate.
fn parse_progress_line(line: &str) -> Option<(u64, Option<u64>)> {
    let (downloaded, total) = line.trim().split_once('/')?;
    let downloaded = downloaded.parse::<f64>().ok()? as u64;
    let total = total.parse::<f64>().ok().map(|total| total as u64);
    Some((downloaded, total))
}

/// yt-dlp reads `-o` as an output template, a literal `%` has to be doubled.
fn output_template(path: &Path) -> String {
    path.to_string_lossy().replace('%', "%%")
}

fn progress_bar(video: &VideoMatch) -> YoutubeResult<ProgressBar> {
    let pb = ProgressBar::new(0);
    pb.set_style(ProgressStyle::default_bar()
        .template("{msg}\n{spinner:.green} [{elapsed_precise}] [{wide_bar:.white/blue}] {bytes}/{total_bytes} ({bytes_per_sec}, {eta})").into_report().change_context(YoutubeError)?
        .progress_chars("█  "));
    pb.set_message(format!("Downloading {}", video.title.clone().cyan()));
    Ok(pb)
}

impl YtDlp {
    pub(crate) async fn download_stream(
        &self,
        video: &VideoMatch,
        destination: &Path,
    ) -> YoutubeResult<()> {
        debug!(
            "{} -f {} -o {} {}",
            self.program,
            AUDIO_FORMAT,
            destination.display(),
            video.watch_url
        );
        let mut child = Command::new(&self.program)
            .args(["-f", AUDIO_FORMAT])
            .args(["--force-overwrites", "--no-playlist", "--no-warnings"])
            .args(["--quiet", "--progress", "--newline"])
            .args(["--progress-template", PROGRESS_TEMPLATE])
            .arg("-o")
            .arg(output_template(destination))
            .arg(&video.watch_url)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .into_report()
            .change_context(YoutubeError)
            .attach_printable(format!("Failed to run {}", self.program))?;

        let stdout = child
            .stdout
            .take()
            .ok_or(YoutubeError)
            .into_report()
            .attach_printable("yt-dlp stdout was not captured")?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or(YoutubeError)
            .into_report()
            .attach_printable("yt-dlp stderr was not captured")?;
        let stderr_task = tokio::spawn(async move {
            let mut buffer = Vec::new();
            if let Err(err) = stderr.read_to_end(&mut buffer).await {
                debug!("Reading yt-dlp stderr stopped early: {}", err);
            }
            String::from_utf8_lossy(&buffer).into_owned()
        });

        let pb = progress_bar(video)?;
        let mut lines = BufReader::new(stdout).lines();
        while let Some(line) = lines
            .next_line()
            .await
            .into_report()
            .change_context(YoutubeError)?
        {
            if let Some((downloaded, total)) = parse_progress_line(&line) {
                if let Some(total) = total {
                    pb.set_length(total);
                }
                pb.set_position(downloaded);
            }
        }

        let status = child
            .wait()
            .await
            .into_report()
            .change_context(YoutubeError)?;
        let stderr = stderr_task.await.unwrap_or_default();
        if !status.success() {
            pb.abandon_with_message(format!("Failed to download {}", video.title.clone().red()));
            return Err(Report::new(YoutubeError).attach_printable(format!(
                "yt-dlp download of {} failed: {}",
                video.watch_url,
                stderr.trim()
            )));
        }
        pb.finish_with_message(format!(
            "{} successfully downloaded",
            video.title.clone().green()
        ));
        Ok(())
    }
}
