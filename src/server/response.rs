use dashmap::DashMap;
use http::header::{HeaderName, CONTENT_TYPE};
use http::{HeaderMap, StatusCode};
use may_minihttp::Response;
use std::sync::OnceLock;
use tracing::error;

/// Distinct header lines kept for the life of the process.
const MAX_INTERNED_HEADERS: usize = 4096;

static HEADER_LINES: OnceLock<HeaderLines> = OnceLock::new();

fn status_reason(status: StatusCode) -> &'static str {
    status.canonical_reason().unwrap_or("Unknown")
}

/// `may_minihttp` only accepts `&'static str` header lines. Common
/// content types are matched statically, everything else is leaked once
/// and reused, up to `limit` distinct lines.
struct HeaderLines {
    lines: DashMap<String, &'static str>,
    limit: usize,
}

impl HeaderLines {
    fn new(limit: usize) -> Self {
        Self {
            lines: DashMap::new(),
            limit,
        }
    }

    fn line(&self, name: &str, value: &str) -> Option<&'static str> {
        if name.eq_ignore_ascii_case(CONTENT_TYPE.as_str()) {
            match value {
                "text/plain" => return Some("Content-Type: text/plain"),
                "text/html" => return Some("Content-Type: text/html"),
                "application/json" => return Some("Content-Type: application/json"),
                "text/css" => return Some("Content-Type: text/css"),
                "application/javascript" => return Some("Content-Type: application/javascript"),
                _ => {}
            }
        }

        let line = format!("{name}: {value}");
        if let Some(interned) = self.lines.get(&line) {
            return Some(*interned);
        }
        if self.lines.len() >= self.limit {
            return None;
        }
        let leaked: &'static str = Box::leak(line.clone().into_boxed_str());
        self.lines.insert(line, leaked);
        Some(leaked)
    }

    /// Every header as a wire line, or the name of the first one that
    /// cannot be written.
    fn render(&self, headers: &HeaderMap) -> Result<Vec<&'static str>, HeaderName> {
        headers
            .iter()
            .map(|(name, value)| {
                let value = value.to_str().map_err(|_| name.clone())?;
                self.line(name.as_str(), value).ok_or_else(|| name.clone())
            })
            .collect()
    }
}

/// Copy a finalized response onto the wire.
///
/// A response carrying a header that cannot be written (non-ASCII value,
/// or a new line once the header cache is full) is replaced by a 500
/// rather than sent without it.
pub fn write_response(res: &mut Response, response: http::Response<Vec<u8>>) {
    let (parts, body) = response.into_parts();
    let lines = HEADER_LINES.get_or_init(|| HeaderLines::new(MAX_INTERNED_HEADERS));
    let rendered = match lines.render(&parts.headers) {
        Ok(rendered) => rendered,
        Err(name) => {
            error!(
                header = %name,
                status = parts.status.as_u16(),
                "Response header cannot be written, sending 500"
            );
            write_error(res, StatusCode::INTERNAL_SERVER_ERROR);
            return;
        }
    };
    res.status_code(usize::from(parts.status.as_u16()), status_reason(parts.status));
    for line in rendered {
        res.header(line);
    }
    res.body_vec(body);
}

/// Plain-text error response used when the application could not produce one
pub fn write_error(res: &mut Response, status: StatusCode) {
    res.status_code(usize::from(status.as_u16()), status_reason(status));
    res.header("Content-Type: text/plain");
    res.body_vec(status_reason(status).as_bytes().to_vec());
}
