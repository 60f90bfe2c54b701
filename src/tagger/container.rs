//! In place edits of the container metadata atoms, backed by `lofty`.

use std::path::Path;

use error_stack::{IntoReport, Report, ResultExt};
use lofty::config::{ParseOptions, WriteOptions};
use lofty::file::{AudioFile, TaggedFile, TaggedFileExt};
use lofty::picture::{MimeType, Picture, PictureType};
use lofty::prelude::Accessor;
use lofty::probe::Probe;
use lofty::tag::{ItemKey, Tag};

use crate::spotify::track::SpotifyTrack;
use crate::tagger::{TaggerError, TaggerResult};

fn open(path: &Path) -> TaggerResult<TaggedFile> {
    Probe::open(path)
        .into_report()
        .change_context(TaggerError)
        .attach_printable(format!("Could not open {}", path.display()))?
        .options(ParseOptions::new().read_properties(false))
        .read()
        .into_report()
        .change_context(TaggerError)
        .attach_printable(format!("Could not read the tags of {}", path.display()))
}

fn primary_tag_mut(tagged_file: &mut TaggedFile) -> TaggerResult<&mut Tag> {
    let tag_type = tagged_file.primary_tag_type();
    if tagged_file.tag(tag_type).is_none() {
        tagged_file.insert_tag(Tag::new(tag_type));
    }
    tagged_file
        .tag_mut(tag_type)
        .ok_or_else(|| {
            Report::new(TaggerError)
                .attach_printable(format!("No writable tag available for {:?}", tag_type))
        })
}

fn save(tagged_file: &TaggedFile, path: &Path) -> TaggerResult<()> {
    tagged_file
        .save_to_path(path, WriteOptions::default())
        .into_report()
        .change_context(TaggerError)
        .attach_printable(format!("Could not write the tags of {}", path.display()))
}

/// Sets title, artist, album artist and album, then saves.
pub fn write_text_tags(path: &Path, track: &SpotifyTrack) -> TaggerResult<()> {
    let mut tagged_file = open(path)?;
    let tag = primary_tag_mut(&mut tagged_file)?;
    tag.set_title(track.title.clone());
    tag.set_artist(track.artist.clone());
    tag.insert_text(ItemKey::AlbumArtist, track.tag_album_artist().to_string());
    tag.set_album(track.album.clone());
    save(&tagged_file, path)
}

/// Replaces the cover with `image`, stored as a JPEG, then saves.
pub fn write_cover(path: &Path, image: Vec<u8>) -> TaggerResult<()> {
    let mut tagged_file = open(path)?;
    let tag = primary_tag_mut(&mut tagged_file)?;
    // ilst keeps no picture type, a previous cover reads back as `Other`
    while !tag.pictures().is_empty() {
        tag.remove_picture(0);
    }
    tag.push_picture(
        Picture::unchecked(image)
            .pic_type(PictureType::CoverFront)
            .mime_type(MimeType::Jpeg)
            .build(),
    );
    save(&tagged_file, path)
}
