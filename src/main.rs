use std::fmt;
use std::path::PathBuf;

use clap::Parser;
use colored::Colorize;
use error_stack::fmt::{Charset, ColorMode};
use error_stack::{Report, ResultExt};
use log::LevelFilter;

use crate::config::AppConfig;
use crate::dialoguer::Dialoguer;
use crate::pipeline::runner::{Pipeline, TokioPacer};
use crate::spotify::api::SpotifyClient;
use crate::tagger::{HttpCoverSource, Tagger};
use crate::youtube::YtDlp;

mod config;
mod dialoguer;
mod errors;
mod pipeline;
mod spotify;
mod tagger;
mod youtube;

#[derive(Debug)]
pub struct SoptifyError;
impl fmt::Display for SoptifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Soptify error")
    }
}
impl std::error::Error for SoptifyError {}

pub type SoptifyResult<T> = error_stack::Result<T, SoptifyError>;

/// Download every track of a Spotify playlist as a tagged m4a file
#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Spotify playlist downloader")]
struct Cli {
    /// Folder where the audio files are written
    #[clap(long, default_value = AppConfig::DEFAULT_MUSIC_DIR)]
    music_dir: PathBuf,
    /// Skip tracks whose file already exists instead of downloading them again
    #[clap(long, action)]
    skip_existing: bool,
    /// Print debug logs
    #[clap(long, short, action)]
    verbose: bool,
}

pub struct Suggestion(String);

impl Suggestion {
    pub fn set_report() {
        Report::set_charset(Charset::Utf8);
        Report::set_color_mode(ColorMode::Color);
        Report::install_debug_hook::<Self>(|Self(value), context| {
            context.push_body(format!("{}: {value}", "suggestion".yellow()))
        });
    }
}

fn init_logger(verbose: bool) {
    let mut clog = colog::default_builder();
    clog.filter(
        None,
        if verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        },
    );
    clog.init();
}

async fn run() -> SoptifyResult<()> {
    let cli = Cli::parse();

    Suggestion::set_report();
    init_logger(cli.verbose);

    let config =
        AppConfig::from_env(cli.music_dir, cli.skip_existing).change_context(SoptifyError)?;

    let playlist_url = Dialoguer::input("Enter Spotify playlist link: ".to_string())
        .change_context(SoptifyError)?;

    let catalog = SpotifyClient::new(&config);
    let platform = YtDlp::new(&config);
    let tagger = Tagger::new(HttpCoverSource::new());
    let pacer = TokioPacer;

    let pipeline = Pipeline::new(&config, &catalog, &platform, &tagger, &pacer);
    let summary = pipeline
        .run(&playlist_url)
        .await
        .change_context(SoptifyError)?;
    summary.print();

    Ok(())
}

#[tokio::main]
async fn main() -> SoptifyResult<()> {
    run().await
}
