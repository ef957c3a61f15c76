//! Object paths inside the image bucket.

use chrono::Utc;
use rand::Rng;
use uuid::Uuid;

use crate::models::ImageKind;

const FILE_SUFFIX_LEN: usize = 9;
const FILE_SUFFIX_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// `{property}/imagem_{card|capa}.webp`
pub fn main_image_path(property_id: Uuid, kind: ImageKind) -> String {
    format!("{property_id}/imagem_{}.webp", kind.as_str())
}

/// `{property}/galerias/{gallery}/{file}`
pub fn gallery_image_path(property_id: Uuid, gallery: &str, file_name: &str) -> String {
    format!("{property_id}/galerias/{gallery}/{file_name}")
}

/// `foto_{unix millis}_{9 lowercase alphanumerics}.webp`
pub fn new_gallery_file_name() -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..FILE_SUFFIX_LEN)
        .map(|_| FILE_SUFFIX_ALPHABET[rng.gen_range(0..FILE_SUFFIX_ALPHABET.len())] as char)
        .collect();
    format!("foto_{}_{suffix}.webp", Utc::now().timestamp_millis())
}

/// Storage path behind a stored image URL. Gallery objects are located by
/// the last segment of their public URL; card and capa live at a fixed path.
pub fn storage_path_for_url(
    property_id: Uuid,
    url: &str,
    kind: ImageKind,
    gallery: Option<&str>,
) -> Option<String> {
    if kind.is_main() {
        return Some(main_image_path(property_id, kind));
    }

    let file_name = last_segment(url)?;
    let gallery = gallery.map(str::trim).filter(|g| !g.is_empty())?;
    Some(gallery_image_path(property_id, gallery, &file_name))
}

// Generated file names are plain ASCII, so the segment needs no decoding.
fn last_segment(url: &str) -> Option<String> {
    let segment = match url::Url::parse(url) {
        Ok(parsed) => parsed
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .map(str::to_string),
        Err(_) => url.rsplit('/').next().map(str::to_string),
    }?;

    (!segment.is_empty()).then_some(segment)
}

/// Gallery names become a path segment: they must be non-blank and free of
/// `/`.
pub fn is_valid_gallery_name(name: &str) -> bool {
    let trimmed = name.trim();
    !trimmed.is_empty() && !trimmed.contains('/') && trimmed != "." && trimmed != ".."
}
