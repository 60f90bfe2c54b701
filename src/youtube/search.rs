use colored::Colorize;
use error_stack::{IntoReport, Report, ResultExt};
use log::debug;
use tokio::process::Command;

use crate::youtube::{VideoMatch, VideoPlatform, YoutubeError, YoutubeResult, YtDlp};

const SEARCH_CANDIDATES: usize = 5;

impl YtDlp {
    pub(crate) async fn search_videos(&self, query: &str) -> YoutubeResult<Vec<VideoMatch>> {
        let search = format!("ytsearch{}:{}", SEARCH_CANDIDATES, query);
        debug!("{} --flat-playlist {}", self.program, search);
        let output = Command::new(&self.program)
            .args(["--flat-playlist", "--no-warnings"])
            .args(["--print", "%(id)s\t%(title)s"])
            .arg(&search)
            .kill_on_drop(true)
            .output()
            .await
            .into_report()
            .change_context(YoutubeError)
            .attach_printable(format!("Failed to run {}", self.program))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Report::new(YoutubeError)
                .attach_printable(format!("yt-dlp search failed: {}", stderr.trim())));
        }

        Ok(parse_search_output(&String::from_utf8_lossy(&output.stdout)))
    }
}

/// Parses the `id<TAB>title` lines printed by the search command.
fn parse_search_output(stdout: &str) -> Vec<VideoMatch> {
    stdout
        .lines()
        .filter_map(|line| {
            let (id, title) = line.split_once('\t')?;
            let id = id.trim();
            if id.is_empty() || id == "NA" {
                return None;
            }
            Some(VideoMatch::new(id.to_string(), title.trim().to_string()))
        })
        .collect()
}

/// Searches `query` and keeps the first candidate, as ranked by the platform.
/// No scoring is applied. `None` means the search came back empty.
pub async fn find_match(
    platform: &dyn VideoPlatform,
    query: &str,
) -> YoutubeResult<Option<VideoMatch>> {
    let results = platform.search(query).await?;
    let Some(video) = results.into_iter().next() else {
        println!("❌ No results found for: {}", query.red());
        return Ok(None);
    };
    Ok(Some(video))
}
