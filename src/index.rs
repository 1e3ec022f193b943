use crate::console;
use crate::error::LoadError;
use crate::types::SearchIndex;

/// Parse the JSON index (array of {title, content, url}) into a corpus
pub fn parse_index(index_json: &str) -> Result<SearchIndex, LoadError> {
    let index: SearchIndex = serde_json::from_str(index_json)?;
    console::log(&format!("[index] loaded {} records", index.len()));
    Ok(index)
}

/// Fetch and parse the index over HTTP, bypassing caches
#[cfg(feature = "native")]
pub fn fetch_index(url: &str) -> Result<SearchIndex, LoadError> {
    use reqwest::header::{CACHE_CONTROL, PRAGMA};

    let response = reqwest::blocking::Client::new()
        .get(url)
        .header(CACHE_CONTROL, "no-cache")
        .header(PRAGMA, "no-cache")
        .send()
        .map_err(|e| LoadError::Fetch(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        return Err(LoadError::Status(status.as_u16()));
    }

    let body = response
        .text()
        .map_err(|e| LoadError::Fetch(e.to_string()))?;
    parse_index(&body)
}
