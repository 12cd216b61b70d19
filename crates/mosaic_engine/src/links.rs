use mosaic_core::parse_page_offset;
use scraper::Selector;
use url::Url;

use crate::FetchedPage;

const DETAIL_LINK_SELECTOR: &str = "a.wall_img_container";
const LAST_PAGE_SELECTOR: &str = "#pagination > a:last-child";
const FULL_IMAGE_SELECTOR: &str = "a.wall_img_container_big > img";

/// Detail-page links on a list page, in document order.
///
/// Anchors without a usable `href` are skipped. Duplicates are kept.
pub fn extract_detail_links(page: &FetchedPage) -> Vec<String> {
    let Ok(selector) = Selector::parse(DETAIL_LINK_SELECTOR) else {
        return Vec::new();
    };
    let document = page.document();
    document
        .select(&selector)
        .filter_map(|anchor| anchor.value().attr("href"))
        .filter_map(|href| resolve_url(href, &page.url))
        .map(String::from)
        .collect()
}

/// Highest page offset advertised by the pagination control, or 0.
pub fn extract_last_page_offset(page: &FetchedPage) -> u32 {
    let Ok(selector) = Selector::parse(LAST_PAGE_SELECTOR) else {
        return 0;
    };
    let document = page.document();
    document
        .select(&selector)
        .last()
        .and_then(|anchor| anchor.value().attr("href"))
        .and_then(|href| parse_page_offset(href, Some(&page.url)))
        .unwrap_or(0)
}

/// URL of the full-resolution image on a detail page.
pub fn extract_image_url(page: &FetchedPage) -> Option<String> {
    let selector = Selector::parse(FULL_IMAGE_SELECTOR).ok()?;
    let document = page.document();
    let src = document.select(&selector).next()?.value().attr("src")?;
    resolve_url(src, &page.url).map(String::from)
}

fn resolve_url(reference: &str, base: &Url) -> Option<Url> {
    let trimmed = reference.trim();
    if trimmed.is_empty() {
        return None;
    }
    let lower = trimmed.to_ascii_lowercase();
    if lower.starts_with('#') || lower.starts_with("javascript:") {
        return None;
    }
    match Url::parse(trimmed) {
        Ok(url) => Some(url),
        Err(_) => base.join(trimmed).ok(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_skips_fragments_and_scripts() {
        let base = Url::parse("http://www.fotolog.com/alice/mosaic/").unwrap();
        assert_eq!(resolve_url("#top", &base), None);
        assert_eq!(resolve_url("JavaScript:void(0)", &base), None);
        assert_eq!(resolve_url("  ", &base), None);
    }

    #[test]
    fn resolve_joins_relative_references() {
        let base = Url::parse("http://www.fotolog.com/alice/mosaic/").unwrap();
        let url = resolve_url("/alice/12345/", &base).unwrap();
        assert_eq!(url.as_str(), "http://www.fotolog.com/alice/12345/");
    }
}
