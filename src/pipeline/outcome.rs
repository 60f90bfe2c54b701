use std::path::PathBuf;

use colored::Colorize;

use crate::tagger::TagOutcome;

/// Where a single playlist track ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackOutcome {
    Downloaded { path: PathBuf, tags: TagOutcome },
    /// The file was already there and `--skip-existing` is on.
    Skipped { path: PathBuf },
    NoMatch,
    /// Search or download failed. The run moved on to the next track.
    Failed { reason: String },
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub outcomes: Vec<(String, TrackOutcome)>,
}

impl RunSummary {
    pub fn record(&mut self, query: String, outcome: TrackOutcome) {
        self.outcomes.push((query, outcome));
    }

    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn downloaded(&self) -> usize {
        self.count(|outcome| matches!(outcome, TrackOutcome::Downloaded { .. }))
    }

    pub fn untagged(&self) -> usize {
        self.count(|outcome| {
            matches!(outcome, TrackOutcome::Downloaded { tags, .. } if !tags.is_tagged())
        })
    }

    pub fn skipped(&self) -> usize {
        self.count(|outcome| matches!(outcome, TrackOutcome::Skipped { .. }))
    }

    pub fn no_match(&self) -> usize {
        self.count(|outcome| matches!(outcome, TrackOutcome::NoMatch))
    }

    pub fn failed(&self) -> usize {
        self.count(|outcome| matches!(outcome, TrackOutcome::Failed { .. }))
    }

    fn count(&self, predicate: impl Fn(&TrackOutcome) -> bool) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, outcome)| predicate(outcome))
            .count()
    }

    pub fn print(&self) {
        println!(
            "\n{}: {} of {} tracks downloaded ({} with incomplete tags), {} skipped, {} without results, {} failed",
            "Summary".green(),
            self.downloaded().to_string().cyan(),
            self.total().to_string().cyan(),
            self.untagged().to_string().yellow(),
            self.skipped().to_string().yellow(),
            self.no_match().to_string().yellow(),
            self.failed().to_string().red(),
        );
        for (query, outcome) in &self.outcomes {
            if let TrackOutcome::Failed { reason } = outcome {
                println!("  {} {}: {}", "✗".red(), query, reason);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_counts() {
        let mut summary = RunSummary::default();
        summary.record(
            "a".to_string(),
            TrackOutcome::Downloaded {
                path: PathBuf::from("a.m4a"),
                tags: TagOutcome::Tagged,
            },
        );
        summary.record(
            "b".to_string(),
            TrackOutcome::Downloaded {
                path: PathBuf::from("b.m4a"),
                tags: TagOutcome::CoverFailed {
                    reason: "404".to_string(),
                },
            },
        );
        summary.record("c".to_string(), TrackOutcome::NoMatch);
        summary.record(
            "d".to_string(),
            TrackOutcome::Failed {
                reason: "yt-dlp exited with 1".to_string(),
            },
        );
        summary.record(
            "e".to_string(),
            TrackOutcome::Skipped {
                path: PathBuf::from("e.m4a"),
            },
        );

        assert_eq!(summary.total(), 5);
        assert_eq!(summary.downloaded(), 2);
        assert_eq!(summary.untagged(), 1);
        assert_eq!(summary.no_match(), 1);
        assert_eq!(summary.failed(), 1);
        assert_eq!(summary.skipped(), 1);
    }
}
