use std::env;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use dotenvy::dotenv;
use error_stack::Report;

use crate::Suggestion;

#[derive(Debug)]
pub struct ConfigError;

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Config error")
    }
}

impl std::error::Error for ConfigError {}

pub type ConfigResult<T> = error_stack::Result<T, ConfigError>;

/// `AppConfig` holds everything the components need for a run. It is built
/// once at startup and handed out by reference.
#[derive(Clone)]
pub struct AppConfig {
    pub client_id: String,
    pub client_secret: String,
    pub music_dir: PathBuf,
    pub track_delay: Duration,
    pub skip_existing: bool,
    pub ytdlp_path: String,
}

impl AppConfig {
    pub const DEFAULT_MUSIC_DIR: &'static str = "./music/";
    pub const TRACK_DELAY: Duration = Duration::from_millis(1500);
    pub const DEFAULT_YTDLP_PATH: &'static str = "yt-dlp";

    /// Reads the Spotify credentials from the environment, loading a `.env`
    /// file first if there is one.
    pub fn from_env(music_dir: PathBuf, skip_existing: bool) -> ConfigResult<Self> {
        dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok(), music_dir, skip_existing)
    }

    /// Same as [`AppConfig::from_env`] with variables resolved by `lookup`.
    fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
        music_dir: PathBuf,
        skip_existing: bool,
    ) -> ConfigResult<Self> {
        let client_id = required_var(&lookup, "SPOTIFY_CLIENT_ID")?;
        let client_secret = required_var(&lookup, "SPOTIFY_CLIENT_SECRET")?;
        let ytdlp_path = lookup("YTDLP_PATH")
            .filter(|path| !path.trim().is_empty())
            .unwrap_or_else(|| Self::DEFAULT_YTDLP_PATH.to_string());

        Ok(Self {
            client_id,
            client_secret,
            music_dir,
            track_delay: Self::TRACK_DELAY,
            skip_existing,
            ytdlp_path,
        })
    }
}

fn required_var(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> ConfigResult<String> {
    let problem = match lookup(name) {
        Some(value) if !value.trim().is_empty() => return Ok(value),
        Some(_) => "is empty",
        None => "not set",
    };
    Err(Report::new(ConfigError)
        .attach_printable(format!("{name} environment variable {problem}"))
        .attach(Suggestion(format!(
            "create a .env file with {name}=<value> next to where you run soptify"
        ))))
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("music_dir", &self.music_dir)
            .field("track_delay", &self.track_delay)
            .field("skip_existing", &self.skip_existing)
            .field("ytdlp_path", &self.ytdlp_path)
            .finish()
    }
}

#[cfg(test)]
impl AppConfig {
    pub fn for_tests(music_dir: PathBuf) -> Self {
        Self {
            client_id: "client-id".to_string(),
            client_secret: "client-secret".to_string(),
            music_dir,
            track_delay: Self::TRACK_DELAY,
            skip_existing: false,
            ytdlp_path: Self::DEFAULT_YTDLP_PATH.to_string(),
        }
    }
}
