//! Netscape/curl cookie-file parsing.
//!
//! Only the cookie name and value are used; domain, path, secure flag and
//! expiry fields are read past but ignored, since every preset cookie is
//! scoped to the target URL's origin.

use std::path::Path;

use crate::config::types::{ConfigError, CookieEntry};

/// Read a Netscape-format cookie file.
///
/// Comment lines (leading `#`) and empty lines are ignored. A data line
/// needs at least 7 whitespace-separated fields with the cookie name in
/// field 6 and the value in field 7; shorter lines are skipped silently.
pub fn load_cookies(path: &Path) -> Result<Vec<CookieEntry>, ConfigError> {
    let data = std::fs::read_to_string(path)?;
    Ok(parse_cookie_lines(&data))
}

fn parse_cookie_lines(data: &str) -> Vec<CookieEntry> {
    let mut cookies = Vec::new();
    for line in data.lines() {
        if line.starts_with('#') || line.is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 7 {
            continue;
        }
        cookies.push(CookieEntry {
            key: fields[5].to_string(),
            value: fields[6].to_string(),
        });
    }
    cookies
}
