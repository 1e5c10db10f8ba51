use crate::dispatcher::HeaderVec;
use may_minihttp::Request;
use std::sync::Arc;
use tracing::debug;

/// Parsed HTTP request data used by `AppService`.
#[derive(Debug, PartialEq)]
pub struct ParsedRequest {
    pub method: String,
    /// Request path with the query string stripped
    pub path: String,
    /// HTTP headers (lowercase names)
    pub headers: HeaderVec,
}

impl ParsedRequest {
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Drop everything from the first `?` on.
fn strip_query(raw_path: &str) -> &str {
    raw_path.split_once('?').map_or(raw_path, |(path, _)| path)
}

/// Extract method, path and headers from a raw request.
///
/// The body is never read: the only API route is a `GET`. The query string
/// is ignored.
#[must_use]
pub fn parse_request(req: &Request) -> ParsedRequest {
    let method = req.method().to_string();
    let path = strip_query(req.path()).to_string();

    let headers: HeaderVec = req
        .headers()
        .iter()
        .map(|h| {
            (
                Arc::from(h.name.to_ascii_lowercase().as_str()),
                String::from_utf8_lossy(h.value).into_owned(),
            )
        })
        .collect();

    debug!(
        method = %method,
        path = %path,
        header_count = headers.len(),
        "HTTP request parsed"
    );

    ParsedRequest {
        method,
        path,
        headers,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_query() {
        assert_eq!(strip_query("/api/pets/1?verbose=true"), "/api/pets/1");
        assert_eq!(strip_query("/api/pets/1"), "/api/pets/1");
        assert_eq!(strip_query("/health?"), "/health");
    }

    #[test]
    fn test_get_header_is_case_insensitive() {
        let mut headers = HeaderVec::new();
        headers.push((Arc::from("x-request-id"), "abc".to_string()));
        let parsed = ParsedRequest {
            method: "GET".to_string(),
            path: "/".to_string(),
            headers,
        };
        assert_eq!(parsed.get_header("X-Request-Id"), Some("abc"));
        assert_eq!(parsed.get_header("missing"), None);
    }
}
