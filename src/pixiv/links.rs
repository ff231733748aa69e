use regex::Regex;
use std::sync::LazyLock;

static GALLERY_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"pixiv\S*?/artworks/(\d+)").expect("gallery link pattern is valid")
});

/// Gallery identifiers in the order they appear in `text`, duplicates kept
pub fn extract_gallery_ids(text: &str) -> Vec<String> {
    GALLERY_LINK
        .captures_iter(text)
        .filter_map(|captures| captures.get(1))
        .map(|id| id.as_str().to_string())
        .collect()
}
