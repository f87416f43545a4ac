//! URL classification: does a string look like a URL, and does it point at an image?
//!
//! Classification is purely syntactic. No request is made and content is never
//! inspected, so URLs without an extension (or with one only in the query
//! string) are not treated as images.

use url::Url;

/// Path extensions treated as images, lowercase and dot-prefixed
pub const IMAGE_EXTENSIONS: [&str; 7] = [".jpg", ".jpeg", ".png", ".gif", ".webp", ".svg", ".bmp"];

/// Returns true if `s` parses as an absolute URL
pub fn is_url(s: &str) -> bool {
    Url::parse(s).is_ok()
}

/// Returns true if `s` is a URL whose path ends with an image extension
///
/// # Examples
///
/// ```
/// use catalog_import::classifier::is_image_url;
///
/// assert!(is_image_url("https://cdn.example.com/products/42.png"));
/// assert!(is_image_url("HTTP://x/a.JPG"));
/// assert!(!is_image_url("https://example.com/image?format=png"));
/// assert!(!is_image_url("photo.png"));
/// ```
pub fn is_image_url(s: &str) -> bool {
    match Url::parse(s) {
        Ok(url) => has_image_extension(url.path()),
        Err(_) => false,
    }
}

fn has_image_extension(path: &str) -> bool {
    let path = path.to_ascii_lowercase();
    IMAGE_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_url() {
        assert!(is_url("https://example.com"));
        assert!(is_url("http://localhost:1337/api/upload"));
        assert!(is_url("ftp://files.example.com/a.png"));
        assert!(!is_url("example.com/a.png"));
        assert!(!is_url("/relative/path.png"));
        assert!(!is_url(""));
        assert!(!is_url("just some words"));
    }

    #[test]
    fn test_every_extension_is_recognized() {
        for ext in IMAGE_EXTENSIONS {
            let url = format!("https://ex.com/picture{ext}");
            assert!(is_image_url(&url), "{url} should be an image");
        }
    }

    #[test]
    fn test_extension_match_is_case_insensitive() {
        assert!(is_image_url("HTTP://x/a.JPG"));
        assert!(is_image_url("https://ex.com/A.WebP"));
        assert!(is_image_url("https://ex.com/dir/Logo.SVG"));
    }

    #[test]
    fn test_query_and_fragment_are_ignored() {
        assert!(is_image_url("https://ex.com/p.png?w=200&h=100"));
        assert!(is_image_url("https://ex.com/p.jpeg#top"));
        assert!(!is_image_url("https://ex.com/render?file=p.png"));
    }

    #[test]
    fn test_non_image_urls() {
        assert!(!is_image_url("https://ex.com/"));
        assert!(!is_image_url("https://ex.com/doc.pdf"));
        assert!(!is_image_url("https://ex.com/png"));
        assert!(!is_image_url("https://ex.com/archive.png.zip"));
        assert!(!is_image_url("https://ex.com/images/"));
    }

    #[test]
    fn test_non_urls_are_never_images() {
        assert!(!is_image_url("p.png"));
        assert!(!is_image_url("/uploads/p.png"));
        assert!(!is_image_url("not a url .jpg"));
    }

    #[test]
    fn test_classification_is_stable() {
        let inputs = ["https://ex.com/p.png", "nope", "https://ex.com/p.txt"];
        for input in inputs {
            assert_eq!(is_image_url(input), is_image_url(input));
        }
    }
}
