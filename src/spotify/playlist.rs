use colored::Colorize;
use lazy_regex::regex_captures;
use log::debug;

use crate::spotify::api::{ApiTrack, CatalogClient, PlaylistItem};
use crate::spotify::track::SpotifyTrack;
use crate::spotify::SpotifyResult;

pub struct SpotifyPlaylist;

impl SpotifyPlaylist {
    /// Pulls the playlist id out of a url shaped like `.../playlist/<id>`.
    pub fn extract_playlist_id(playlist_url: &str) -> Option<String> {
        let (_, playlist_id) = regex_captures!(r"playlist/([a-zA-Z0-9]+)", playlist_url)?;
        Some(playlist_id.to_string())
    }

    /// Fetches every track of the playlist, in playlist order, following the
    /// pagination until there is no next page.
    ///
    /// An url that is not a playlist url is not an error: it is reported on the
    /// console and an empty list is returned without calling the catalog.
    pub async fn get_playlist_tracks(
        client: &dyn CatalogClient,
        playlist_url: &str,
    ) -> SpotifyResult<Vec<SpotifyTrack>> {
        let Some(playlist_id) = Self::extract_playlist_id(playlist_url) else {
            println!("{}", "Invalid playlist URL".red());
            return Ok(vec![]);
        };
        println!("Getting playlist {} from Spotify...", playlist_id.cyan());

        let mut tracks = vec![];
        let mut page = client.first_page(&playlist_id).await?;
        loop {
            Self::process_track_items(page.items, &mut tracks);
            match page.next {
                Some(next_url) => {
                    debug!("Fetching next playlist page");
                    page = client.next_page(&next_url).await?;
                }
                None => break,
            }
        }

        println!(
            "Found {} tracks in the playlist",
            tracks.len().to_string().green()
        );
        Ok(tracks)
    }

    fn process_track_items(items: Vec<PlaylistItem>, tracks: &mut Vec<SpotifyTrack>) {
        for item in items {
            match item.track {
                Some(track) => tracks.push(Self::to_spotify_track(track)),
                None => debug!("Skipping playlist item without a track"),
            }
        }
    }

    fn to_spotify_track(track: ApiTrack) -> SpotifyTrack {
        let artists = track
            .artists
            .iter()
            .map(|artist| artist.name.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        let album_art_url = track.album.images.into_iter().next().map(|image| image.url);
        SpotifyTrack::new(
            track.name,
            artists.clone(),
            track.album.name,
            artists,
            album_art_url,
        )
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use error_stack::Report;
    use pretty_assertions::assert_eq;

    use crate::spotify::api::{ApiAlbum, ApiArtist, ApiImage, PlaylistItemsPage};
    use crate::spotify::SpotifyError;

    use super::*;

    /// Serves canned pages and records every call.
    #[derive(Default)]
    struct FakeCatalog {
        first: Option<PlaylistItemsPage>,
        next: HashMap<String, PlaylistItemsPage>,
        calls: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl CatalogClient for FakeCatalog {
        async fn first_page(&self, playlist_id: &str) -> SpotifyResult<PlaylistItemsPage> {
            self.calls.lock().unwrap().push(playlist_id.to_string());
            self.first
                .clone()
                .ok_or_else(|| Report::new(SpotifyError).attach_printable("no first page"))
        }

        async fn next_page(&self, next_url: &str) -> SpotifyResult<PlaylistItemsPage> {
            self.calls.lock().unwrap().push(next_url.to_string());
            self.next
                .get(next_url)
                .cloned()
                .ok_or_else(|| Report::new(SpotifyError).attach_printable("unknown page"))
        }
    }

    fn item(name: &str, artists: &[&str], images: &[&str]) -> PlaylistItem {
        PlaylistItem {
            track: Some(ApiTrack {
                name: name.to_string(),
                artists: artists
                    .iter()
                    .map(|name| ApiArtist {
                        name: name.to_string(),
                    })
                    .collect(),
                album: ApiAlbum {
                    name: format!("{name} album"),
                    images: images
                        .iter()
                        .map(|url| ApiImage {
                            url: url.to_string(),
                        })
                        .collect(),
                },
            }),
        }
    }

    fn null_item() -> PlaylistItem {
        PlaylistItem { track: None }
    }

    #[test]
    fn test_extract_playlist_id() {
        assert_eq!(
            SpotifyPlaylist::extract_playlist_id(
                "https://open.spotify.com/playlist/6YYCPN91F4xI1Z17Hzn7ir?si=abc123"
            ),
            Some("6YYCPN91F4xI1Z17Hzn7ir".to_string())
        );
        assert_eq!(
            SpotifyPlaylist::extract_playlist_id("https://open.spotify.com/album/6YYCPN91F4x"),
            None
        );
        assert_eq!(SpotifyPlaylist::extract_playlist_id("playlist/"), None);
    }

    #[tokio::test]
    async fn test_invalid_url_does_not_call_catalog() {
        let catalog = FakeCatalog::default();
        for url in ["", "https://open.spotify.com/track/4uLU6hMCjMI75M1A2tKUQC", "not a url"] {
            let tracks = SpotifyPlaylist::get_playlist_tracks(&catalog, url)
                .await
                .unwrap();
            assert!(tracks.is_empty());
        }
        assert!(catalog.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_pages_are_flattened_and_null_tracks_skipped() {
        let page_2_url = "https://api.spotify.com/v1/playlists/abc/tracks?offset=2".to_string();
        let page_3_url = "https://api.spotify.com/v1/playlists/abc/tracks?offset=4".to_string();
        let mut catalog = FakeCatalog {
            first: Some(PlaylistItemsPage {
                items: vec![item("One", &["A"], &[]), null_item()],
                next: Some(page_2_url.clone()),
            }),
            ..Default::default()
        };
        catalog.next.insert(
            page_2_url.clone(),
            PlaylistItemsPage {
                items: vec![item("Two", &["B", "C"], &["big", "small"]), null_item()],
                next: Some(page_3_url.clone()),
            },
        );
        catalog.next.insert(
            page_3_url.clone(),
            PlaylistItemsPage {
                items: vec![item("Three", &["D"], &["cover"])],
                next: None,
            },
        );

        let tracks = SpotifyPlaylist::get_playlist_tracks(
            &catalog,
            "https://open.spotify.com/playlist/abc",
        )
        .await
        .unwrap();

        let titles = tracks.iter().map(|t| t.title.as_str()).collect::<Vec<_>>();
        assert_eq!(titles, vec!["One", "Two", "Three"]);
        assert_eq!(
            *catalog.calls.lock().unwrap(),
            vec!["abc".to_string(), page_2_url, page_3_url]
        );
        assert_eq!(
            tracks[1],
            SpotifyTrack::new(
                "Two".to_string(),
                "B, C".to_string(),
                "Two album".to_string(),
                "B, C".to_string(),
                Some("big".to_string()),
            )
        );
        assert_eq!(tracks[0].album_art_url, None);
    }

    #[tokio::test]
    async fn test_catalog_failure_is_an_error() {
        let catalog = FakeCatalog::default();
        let result =
            SpotifyPlaylist::get_playlist_tracks(&catalog, "https://open.spotify.com/playlist/abc")
                .await;
        assert!(result.is_err());
    }
}
