use std::fmt;

/// Tally of one run, built by the coordinator from collected outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunSummary {
    pub pages_visited: usize,
    pub links_found: usize,
    pub images_saved: usize,
    pub images_failed: usize,
}

impl RunSummary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_page(&mut self, links_found: usize) {
        self.pages_visited += 1;
        self.links_found += links_found;
    }

    pub fn record_download(&mut self, succeeded: bool) {
        if succeeded {
            self.images_saved += 1;
        } else {
            self.images_failed += 1;
        }
    }

    pub fn attempted(&self) -> usize {
        self.images_saved + self.images_failed
    }

    /// True when every discovered link produced exactly one outcome.
    pub fn is_complete(&self) -> bool {
        self.attempted() == self.links_found
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "visited {} pages, saved {} images, {} failed",
            self.pages_visited, self.images_saved, self.images_failed
        )
    }
}
