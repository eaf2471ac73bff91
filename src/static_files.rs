use crate::dispatcher::Rejection;
use crate::request::Request;
use crate::response::Response;
use http::Method;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, warn};

/// Serves files from a directory for every path under a URL prefix.
///
/// Requests handled here never reach the middleware chain or the route table.
#[derive(Debug, Clone)]
pub struct StaticFiles {
    base_dir: PathBuf,
    prefix: String,
}

impl StaticFiles {
    /// `prefix` is the URL prefix the directory is mounted at (e.g. `/static`).
    /// A trailing slash is ignored.
    pub fn new<P: Into<PathBuf>>(base: P, prefix: &str) -> Self {
        let trimmed = prefix.trim_end_matches('/');
        let prefix = if trimmed.starts_with('/') {
            trimmed.to_string()
        } else {
            format!("/{trimmed}")
        };
        Self {
            base_dir: base.into(),
            prefix,
        }
    }

    #[must_use]
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Whether a request path is routed to this mount.
    ///
    /// This is a plain prefix test; [`StaticFiles::serve`] answers 404 for
    /// paths like `/staticfoo` that do not continue with a `/`.
    #[must_use]
    pub fn matches(&self, path: &str) -> bool {
        path.starts_with(&self.prefix)
    }

    fn map_path(&self, url_path: &str) -> Option<PathBuf> {
        let mut pb = self.base_dir.clone();
        let mut pushed = false;
        for comp in Path::new(url_path.trim_start_matches('/')).components() {
            match comp {
                Component::Normal(s) => {
                    pb.push(s);
                    pushed = true;
                }
                Component::CurDir => {}
                _ => return None,
            }
        }
        pushed.then_some(pb)
    }

    fn content_type(path: &Path) -> &'static str {
        match path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or("")
            .to_lowercase()
            .as_str()
        {
            "html" | "htm" => "text/html",
            "css" => "text/css",
            "js" | "mjs" => "application/javascript",
            "json" => "application/json",
            "txt" => "text/plain",
            "svg" => "image/svg+xml",
            "png" => "image/png",
            "jpg" | "jpeg" => "image/jpeg",
            "gif" => "image/gif",
            "ico" => "image/x-icon",
            "wasm" => "application/wasm",
            "woff2" => "font/woff2",
            _ => "application/octet-stream",
        }
    }

    /// Read a file relative to the base directory.
    ///
    /// Paths escaping the base directory, directories and missing files all
    /// come back as `NotFound`.
    pub fn load(&self, rel_path: &str) -> io::Result<(Vec<u8>, &'static str)> {
        let path = self
            .map_path(rel_path)
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "invalid path"))?;
        if !path.is_file() {
            return Err(io::Error::new(io::ErrorKind::NotFound, "file not found"));
        }
        let bytes = fs::read(&path)?;
        Ok((bytes, Self::content_type(&path)))
    }

    /// Answer a request whose path is under the prefix
    #[must_use]
    pub fn serve(&self, req: &Request) -> Response {
        let mut res = Response::new();
        let is_head = *req.method() == Method::HEAD;
        if *req.method() != Method::GET && !is_head {
            Rejection::MethodNotAllowed.apply(&mut res);
            res.set_header("allow", "GET, HEAD".to_string());
            return res;
        }

        // `/statictest.css` is under the prefix but not under the mount
        let rel_path = req
            .path()
            .strip_prefix(&self.prefix)
            .filter(|rest| rest.is_empty() || rest.starts_with('/'));
        let Some(rel_path) = rel_path else {
            Rejection::NotFound.apply(&mut res);
            return res;
        };
        match self.load(rel_path) {
            Ok((bytes, content_type)) => {
                debug!(
                    request_id = %req.request_id(),
                    path = %req.path(),
                    content_type = content_type,
                    size_bytes = bytes.len(),
                    "Static file served"
                );
                res.content_type = Some(content_type.to_string());
                if !is_head {
                    res.body = bytes;
                }
            }
            Err(e) => {
                if e.kind() != io::ErrorKind::NotFound {
                    warn!(path = %req.path(), error = %e, "Static file read failed");
                }
                Rejection::NotFound.apply(&mut res);
            }
        }
        res
    }
}
