
/// One playlist entry, normalized into the fields the rest of the run needs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpotifyTrack {
    pub title: String,
    /// Comma joined when the track has more than one artist.
    pub artist: String,
    pub album: String,
    pub album_artist: String,
    pub album_art_url: Option<String>,
}

impl SpotifyTrack {
    pub const QUERY_SUFFIX: &'static str = "Official Audio";

    pub fn new(
        title: String,
        artist: String,
        album: String,
        album_artist: String,
        album_art_url: Option<String>,
    ) -> Self {
        Self {
            title,
            artist,
            album,
            album_artist,
            album_art_url,
        }
    }

    pub fn get_track_search_term(&self) -> String {
        format!("{} by {} {}", self.title, self.artist, Self::QUERY_SUFFIX)
    }

    /// Album artist to write into the tags, falling back to the track artist.
    pub fn tag_album_artist(&self) -> &str {
        if self.album_artist.is_empty() {
            &self.artist
        } else {
            &self.album_artist
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(album_artist: &str) -> SpotifyTrack {
        SpotifyTrack::new(
            "Around the World".to_string(),
            "Daft Punk".to_string(),
            "Homework".to_string(),
            album_artist.to_string(),
            None,
        )
    }

    #[test]
    fn test_search_term() {
        assert_eq!(
            track("Daft Punk").get_track_search_term(),
            "Around the World by Daft Punk Official Audio"
        );
    }

    #[test]
    fn test_album_artist_falls_back_to_artist() {
        assert_eq!(track("").tag_album_artist(), "Daft Punk");
        assert_eq!(track("Various Artists").tag_album_artist(), "Various Artists");
    }
}
