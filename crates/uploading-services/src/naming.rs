//! Filenames for downloaded product images.
//!
//! The basename of the URL path keeps its stem and extension and gets a random
//! suffix: `http://x.com/photo.jpg` becomes `photo_1a2b3c4d.jpg`.

use percent_encoding::percent_decode_str;

const FALLBACK_STEM: &str = "image";

/// Last path segment of `url`, percent-decoded, without query or fragment.
pub fn url_basename(url: &str) -> String {
    let segment = match reqwest::Url::parse(url) {
        Ok(parsed) => parsed
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .unwrap_or_default()
            .to_string(),
        Err(_) => {
            let without_query = url.split(['?', '#']).next().unwrap_or_default();
            without_query
                .rsplit('/')
                .next()
                .unwrap_or_default()
                .to_string()
        }
    };
    percent_decode_str(&segment).decode_utf8_lossy().into_owned()
}

/// Split a basename into `(stem, extension)` where the extension keeps its dot.
///
/// Leading dots belong to the stem, so `.hidden` has no extension.
pub fn split_extension(basename: &str) -> (&str, &str) {
    match basename.rfind('.') {
        Some(idx) if !basename[..idx].trim_start_matches('.').is_empty() => {
            basename.split_at(idx)
        }
        _ => (basename, ""),
    }
}

/// Keep characters that are safe in a storage key.
fn sanitize(part: &str) -> String {
    let cleaned: String = part
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    cleaned.replace("..", "_")
}

/// 8 lowercase hex characters from 4 random bytes.
pub fn random_suffix() -> String {
    hex::encode(rand::random::<[u8; 4]>())
}

/// Build `stem_xxxxxxxx.ext` from the URL path basename.
pub fn unique_filename(url: &str) -> String {
    let basename = url_basename(url);
    let (stem, extension) = split_extension(&basename);
    let stem = sanitize(stem);
    let stem = if stem.trim_matches('_').is_empty() {
        FALLBACK_STEM.to_string()
    } else {
        stem
    };
    format!("{}_{}{}", stem, random_suffix(), sanitize(extension))
}

/// Media type guessed from the URL path's file extension.
pub fn guess_mime_from_url(url: &str) -> Option<mime_guess::Mime> {
    let basename = url_basename(url);
    let (_, extension) = split_extension(&basename);
    if extension.is_empty() {
        return None;
    }
    mime_guess::from_path(&basename).first()
}

/// Whether the URL's extension maps to an `image/*` media type.
pub fn has_image_extension(url: &str) -> bool {
    guess_mime_from_url(url)
        .map(|mime| mime.type_() == mime_guess::mime::IMAGE)
        .unwrap_or(false)
}
