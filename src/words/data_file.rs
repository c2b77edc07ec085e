//! `.data` file format
//!
//! ```text
//! #link: https://example.com/where-the-words-came-from
//! [ { "term": "red" }, ... ]
//! ```
//!
//! The `#link:` line is optional. Without it the whole file is the JSON array.

use super::models::WordEntry;

const LINK_PREFIX: &str = "#link:";

/// Parsed contents of a `.data` file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataFile {
    pub origin_link: Option<String>,
    pub words: Vec<WordEntry>,
}

/// Parse `.data` content into its link header and word array
pub fn parse(content: &str) -> Result<DataFile, serde_json::Error> {
    let content = content.trim_start_matches('\u{feff}');

    let (origin_link, body) = match content.strip_prefix(LINK_PREFIX) {
        Some(rest) => {
            let (line, body) = rest.split_once('\n').unwrap_or((rest, ""));
            let link = line.trim();
            let link = (!link.is_empty()).then(|| link.to_string());
            (link, body)
        }
        None => (None, content),
    };

    let words: Vec<WordEntry> = serde_json::from_str(body)?;
    Ok(DataFile { origin_link, words })
}

/// Render words (and an optional link header) as `.data` content
pub fn render(words: &[WordEntry], origin_link: Option<&str>) -> Result<String, serde_json::Error> {
    let body = serde_json::to_string_pretty(words)?;
    Ok(match origin_link {
        Some(link) if !link.trim().is_empty() => {
            format!("{} {}\n{}\n", LINK_PREFIX, link.trim(), body)
        }
        _ => format!("{}\n", body),
    })
}
