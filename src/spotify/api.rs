use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use error_stack::{IntoReport, ResultExt};
use log::debug;
use serde::{Deserialize, Serialize};
use tokio::sync::OnceCell;
use url::Url;

use crate::config::AppConfig;
use crate::spotify::{SpotifyError, SpotifyResult};

#[derive(Serialize, Deserialize, Debug)]
struct TokenResponse {
    access_token: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct ApiArtist {
    pub name: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct ApiImage {
    pub url: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct ApiAlbum {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub images: Vec<ApiImage>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct ApiTrack {
    pub name: String,
    #[serde(default)]
    pub artists: Vec<ApiArtist>,
    #[serde(default)]
    pub album: ApiAlbum,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct PlaylistItem {
    pub track: Option<ApiTrack>,
}

/// One page of the playlist items endpoint. `next` is the continuation url.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct PlaylistItemsPage {
    pub items: Vec<PlaylistItem>,
    pub next: Option<String>,
}

/// Read access to the music catalog, one page at a time.
#[async_trait]
pub trait CatalogClient: Send + Sync {
    async fn first_page(&self, playlist_id: &str) -> SpotifyResult<PlaylistItemsPage>;

    async fn next_page(&self, next_url: &str) -> SpotifyResult<PlaylistItemsPage>;
}

pub enum SpotifyAPI<'a> {
    Token,
    PlaylistItems { playlist_id: &'a str },
}

impl SpotifyAPI<'_> {
    const ACCOUNTS_URL: &'static str = "https://accounts.spotify.com/api/token";
    const API_URL: &'static str = "https://api.spotify.com/v1";
    const PAGE_LIMIT: &'static str = "100";

    pub fn url(&self) -> SpotifyResult<Url> {
        return match self {
            SpotifyAPI::Token => Url::parse(Self::ACCOUNTS_URL)
                .into_report()
                .change_context(SpotifyError),
            SpotifyAPI::PlaylistItems { playlist_id } => Url::parse_with_params(
                &format!("{}/playlists/{}/tracks", Self::API_URL, playlist_id),
                &[("limit", Self::PAGE_LIMIT)],
            )
            .into_report()
            .change_context(SpotifyError),
        };
    }
}

/// Catalog client backed by the Spotify Web API, authenticated with the
/// client credentials flow. The token is requested once per run.
pub struct SpotifyClient {
    client: reqwest::Client,
    client_id: String,
    client_secret: String,
    access_token: OnceCell<String>,
}

impl SpotifyClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            access_token: OnceCell::new(),
        }
    }

    async fn access_token(&self) -> SpotifyResult<&str> {
        let token = self
            .access_token
            .get_or_try_init(|| self.request_access_token())
            .await?;
        Ok(token.as_str())
    }

    async fn request_access_token(&self) -> SpotifyResult<String> {
        debug!("Requesting Spotify access token");
        let auth_string = format!("{}:{}", self.client_id, self.client_secret);
        let encoded_auth = general_purpose::STANDARD.encode(auth_string);

        let token_response = self
            .client
            .post(SpotifyAPI::Token.url()?)
            .header("Authorization", format!("Basic {}", encoded_auth))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .into_report()
            .change_context(SpotifyError)?
            .error_for_status()
            .into_report()
            .change_context(SpotifyError)
            .attach_printable("Spotify rejected the client credentials")?
            .json::<TokenResponse>()
            .await
            .into_report()
            .change_context(SpotifyError)?;
        Ok(token_response.access_token)
    }

    async fn get_page(&self, url: Url) -> SpotifyResult<PlaylistItemsPage> {
        let access_token = self.access_token().await?;
        debug!("GET {}", url);
        let page = self
            .client
            .get(url.clone())
            .bearer_auth(access_token)
            .send()
            .await
            .into_report()
            .change_context(SpotifyError)?
            .error_for_status()
            .into_report()
            .change_context(SpotifyError)
            .attach_printable(format!("Request to {} failed", url))?
            .json::<PlaylistItemsPage>()
            .await
            .into_report()
            .change_context(SpotifyError)?;
        Ok(page)
    }
}

#[async_trait]
impl CatalogClient for SpotifyClient {
    async fn first_page(&self, playlist_id: &str) -> SpotifyResult<PlaylistItemsPage> {
        let url = SpotifyAPI::PlaylistItems { playlist_id }.url()?;
        self.get_page(url).await
    }

    async fn next_page(&self, next_url: &str) -> SpotifyResult<PlaylistItemsPage> {
        let url = Url::parse(next_url)
            .into_report()
            .change_context(SpotifyError)?;
        self.get_page(url).await
    }
}

#[cfg(test)]
mod tests {
    use dotenvy::dotenv;
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn test_playlist_items_url() {
        let url = SpotifyAPI::PlaylistItems {
            playlist_id: "6YYCPN91F4xI1Z17Hzn7ir",
        }
        .url()
        .unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.spotify.com/v1/playlists/6YYCPN91F4xI1Z17Hzn7ir/tracks?limit=100"
        );
    }

    #[test]
    fn test_page_with_null_track_deserializes() {
        let json = r#"{
            "items": [
                {"track": {"name": "One More Time", "artists": [{"name": "Daft Punk"}],
                           "album": {"name": "Discovery", "images": [{"url": "https://i.scdn.co/image/big"}]}}},
                {"track": null}
            ],
            "next": "https://api.spotify.com/v1/playlists/abc/tracks?offset=100&limit=100"
        }"#;
        let page: PlaylistItemsPage = serde_json::from_str(json).unwrap();
        assert_eq!(page.items.len(), 2);
        assert!(page.items[1].track.is_none());
        assert_eq!(page.items[0].track.as_ref().unwrap().album.name, "Discovery");
        assert!(page.next.is_some());
    }

    #[tokio::test]
    #[ignore] // Requires .env credentials and network access. Run with `cargo test -- --ignored`
    async fn test_get_first_page() {
        dotenv().ok();
        let config = AppConfig::from_env(PathBuf::from("./music/"), false).unwrap();
        let client = SpotifyClient::new(&config);
        let page = client.first_page("6YYCPN91F4xI1Z17Hzn7ir").await.unwrap();
        assert!(!page.items.is_empty());
    }
}
