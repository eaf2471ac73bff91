use crate::request::Request;
use http::header::{HeaderName, HeaderValue};
use http::method::InvalidMethod;
use http::{HeaderMap, Method};
use std::io::Read;
use tracing::{debug, warn};

/// Convert a `may_minihttp::Request` into the framework's [`Request`].
///
/// Headers that are not valid HTTP are skipped. A body that cannot be read is
/// treated as empty.
pub fn parse_request(req: may_minihttp::Request) -> Result<Request, InvalidMethod> {
    let method = Method::from_bytes(req.method().as_bytes())?;
    let target = req.path().to_string();

    let mut headers = HeaderMap::with_capacity(req.headers().len());
    for h in req.headers() {
        match (
            HeaderName::from_bytes(h.name.as_bytes()),
            HeaderValue::from_bytes(h.value),
        ) {
            (Ok(name), Ok(value)) => {
                headers.append(name, value);
            }
            _ => debug!(header = %h.name, "Skipping malformed request header"),
        }
    }

    let mut body = Vec::new();
    if let Err(e) = req.body().read_to_end(&mut body) {
        warn!(error = %e, path = %target, "Failed to read request body");
        body.clear();
    }

    Ok(Request::from_parts(method, &target, headers, body))
}
