use url::Url;

/// Thumbnails per list page; offsets advance in steps of this size.
pub const PAGE_SIZE: u32 = 30;

const MOSAIC_SEGMENT: &str = "mosaic";
// Observed href shape: http://host/user/mosaic/<offset>
const POSITIONAL_OFFSET_INDEX: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListPageRef {
    pub offset: u32,
    pub url: Url,
}

/// `<base>/<username>/mosaic/<offset>`, where offset 0 is the empty segment.
pub fn list_page_url(base: &Url, username: &str, offset: u32) -> Url {
    let mut url = base.clone();
    url.set_query(None);
    url.set_fragment(None);
    let offset_segment = if offset == 0 {
        String::new()
    } else {
        offset.to_string()
    };
    if let Ok(mut segments) = url.path_segments_mut() {
        segments
            .pop_if_empty()
            .push(username)
            .push(MOSAIC_SEGMENT)
            .push(&offset_segment);
    }
    url
}

/// Offsets of every list page up to and including `last_offset`: 0, P, 2P, ...
///
/// Lazy, so a huge advertised offset costs nothing until it is walked.
pub fn page_offsets(last_offset: u32, page_size: u32) -> impl Iterator<Item = u32> {
    let last = if page_size == 0 { 0 } else { last_offset };
    (0..=last).step_by(page_size.max(1) as usize)
}

/// Reads the page offset out of a pagination href.
///
/// A numeric segment right after a `mosaic` segment wins, so a profile that
/// is itself named `mosaic` still parses. Otherwise the sixth slash-delimited
/// component is tried. Anything unparsable is `None`.
pub fn parse_page_offset(href: &str, base: Option<&Url>) -> Option<u32> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }

    let resolved = Url::parse(href)
        .ok()
        .or_else(|| base.and_then(|base| base.join(href).ok()));
    let after_mosaic = resolved
        .as_ref()
        .and_then(Url::path_segments)
        .and_then(|segments| {
            let segments: Vec<&str> = segments.collect();
            segments
                .windows(2)
                .filter(|pair| pair[0] == MOSAIC_SEGMENT)
                .find_map(|pair| pair[1].parse().ok())
        });

    after_mosaic.or_else(|| {
        href.split('/')
            .nth(POSITIONAL_OFFSET_INDEX)
            .and_then(|segment| segment.trim().parse().ok())
    })
}
