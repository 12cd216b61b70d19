//! Mosaic core: pure configuration, pagination and bookkeeping types.
mod config;
mod pagination;
mod summary;

pub use config::{
    ConfigError, GrabConfig, DEFAULT_BASE_URL, DEFAULT_CONCURRENCY, DEFAULT_OUTPUT_DIR,
    MAX_CONCURRENCY,
};
pub use pagination::{list_page_url, page_offsets, parse_page_offset, ListPageRef, PAGE_SIZE};
pub use summary::RunSummary;
