//! Download filename derivation and `Content-Disposition` handling.

use url::Url;

/// Used when a URL has no usable path segment.
pub const DEFAULT_FILENAME: &str = "download";

/// Last non-empty path segment of `url`, percent-decoded and sanitized.
pub fn fallback_filename_from_url(url: &Url) -> String {
    url.path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).next_back())
        .map(|last| {
            urlencoding::decode(last)
                .map(|d| d.into_owned())
                .unwrap_or_else(|_| last.to_string())
        })
        .map(|name| sanitize_filename(&name))
        .filter(|name| !name.is_empty() && name != "." && name != "..")
        .unwrap_or_else(|| DEFAULT_FILENAME.to_string())
}

/// Filename announced by an upstream `Content-Disposition` header.
///
/// Accepts `filename="a.pdf"`, `filename=a.pdf` and the RFC 5987
/// `filename*=UTF-8''a%20b.pdf` form, preferring the latter.
pub fn parse_content_disposition(header: &str) -> Option<String> {
    if let Some(pos) = header.find("filename*=") {
        let value = header[pos + 10..].trim();
        if let Some(quote_pos) = value.find("''") {
            let encoded = &value[quote_pos + 2..];
            let end = encoded.find(';').unwrap_or(encoded.len());
            if let Ok(decoded) = urlencoding::decode(encoded[..end].trim()) {
                let name = sanitize_filename(&decoded);
                if !name.is_empty() {
                    return Some(name);
                }
            }
        }
    }

    if let Some(pos) = header.find("filename=") {
        let value = header[pos + 9..].trim();
        let raw = match value.strip_prefix('"') {
            Some(stripped) => stripped.find('"').map(|end| &stripped[..end]),
            None => Some(value[..value.find(';').unwrap_or(value.len())].trim()),
        };
        if let Some(name) = raw.map(sanitize_filename).filter(|n| !n.is_empty()) {
            return Some(name);
        }
    }

    None
}

/// Replace path separators and control characters.
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect::<String>()
        .trim()
        .to_string()
}

/// `attachment` header value for `name`.
///
/// Non-ASCII names get an ASCII fallback plus an RFC 5987 `filename*`.
pub fn content_disposition(name: &str) -> String {
    let ascii: String = name
        .chars()
        .map(|c| match c {
            '"' | '\\' => '_',
            c if c.is_ascii() && !c.is_ascii_control() => c,
            _ => '_',
        })
        .collect();

    if name.is_ascii() && !name.chars().any(|c| c.is_ascii_control()) {
        format!("attachment; filename=\"{ascii}\"")
    } else {
        format!(
            "attachment; filename=\"{ascii}\"; filename*=UTF-8''{}",
            urlencoding::encode(name)
        )
    }
}
