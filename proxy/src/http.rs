//! Parsing a client's request line and headers, and rewriting them for
//! the upstream origin.

use crate::uri::RequestUri;
use std::collections::BTreeMap;
use std::io::{BufRead, Read};
use thiserror::Error;

const USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64; rv:10.0.3) Gecko/20120305 Firefox/10.0.3";
const ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";
const ACCEPT_ENCODING: &str = "gzip, deflate";

#[derive(Debug, Error)]
pub enum RequestError {
    #[error("connection closed before a request line was received")]
    ConnectionClosed,
    #[error("malformed request line")]
    MalformedRequestLine,
    #[error("method {0} is not supported")]
    UnsupportedMethod(String),
    #[error("I/O error reading request: {0}")]
    Io(#[from] std::io::Error),
}

/// A parsed `GET <absolute-URI> HTTP/<version>` request plus whatever
/// headers followed it, in the order received.
pub struct Request {
    /// The request-URI exactly as the client sent it, before parsing —
    /// this is the cache key.
    pub raw_uri: String,
    pub headers: BTreeMap<String, String>,
}

/// Read a request line and its headers from a buffered client stream.
/// Only `GET` is accepted; anything else is reported as
/// [`RequestError::UnsupportedMethod`] without consuming the rest of the
/// request.
///
/// # Errors
/// Returns [`RequestError::ConnectionClosed`] if the stream closes
/// before a request line arrives, [`RequestError::MalformedRequestLine`]
/// if the line isn't `<method> <uri> HTTP/1.x`, [`RequestError::UnsupportedMethod`]
/// for any method but `GET`, and [`RequestError::Io`] on a read failure.
pub fn read_request(reader: &mut impl BufRead) -> Result<Request, RequestError> {
    let mut line = String::new();
    let n = reader.read_line(&mut line)?;
    if n == 0 {
        return Err(RequestError::ConnectionClosed);
    }
    let line = line.trim_end_matches(['\r', '\n']);

    let mut parts = line.split_whitespace();
    let method = parts.next().ok_or(RequestError::MalformedRequestLine)?;
    let uri = parts.next().ok_or(RequestError::MalformedRequestLine)?;
    let version = parts.next().ok_or(RequestError::MalformedRequestLine)?;
    if !version.starts_with("HTTP/1.") {
        return Err(RequestError::MalformedRequestLine);
    }
    if method != "GET" {
        return Err(RequestError::UnsupportedMethod(method.to_string()));
    }

    let headers = read_headers(reader)?;
    Ok(Request {
        raw_uri: uri.to_string(),
        headers,
    })
}

fn read_headers(reader: &mut impl BufRead) -> Result<BTreeMap<String, String>, RequestError> {
    let mut headers = BTreeMap::new();
    loop {
        let mut line = String::new();
        let n = reader.read_line(&mut line)?;
        if n == 0 {
            break;
        }
        let trimmed = line.trim_end_matches(['\r', '\n']);
        if trimmed.is_empty() {
            break;
        }
        if let Some((name, value)) = trimmed.split_once(':') {
            headers.insert(name.trim().to_string(), value.trim().to_string());
        }
    }
    Ok(headers)
}

/// Rewrite a parsed request into the exact bytes sent upstream: an
/// HTTP/1.0 request line naming only the path, the fixed header set
/// (using the client's `Host`, if any, or the parsed URI's host as a
/// fallback), and the client's other headers passed through verbatim.
#[must_use]
pub fn build_upstream_request(uri: &RequestUri, request: &Request) -> Vec<u8> {
    let mut out = format!("GET {} HTTP/1.0\r\n", uri.path);

    let host_header = request
        .headers
        .get("Host")
        .cloned()
        .unwrap_or_else(|| uri.host.clone());
    out.push_str(&format!("Host: {host_header}\r\n"));
    out.push_str(&format!("User-Agent: {USER_AGENT}\r\n"));
    out.push_str(&format!("Accept: {ACCEPT}\r\n"));
    out.push_str(&format!("Accept-Encoding: {ACCEPT_ENCODING}\r\n"));
    out.push_str("Connection: close\r\n");
    out.push_str("Proxy-Connection: close\r\n");

    for (name, value) in &request.headers {
        if matches!(
            name.as_str(),
            "Host" | "User-Agent" | "Accept" | "Accept-Encoding" | "Connection"
                | "Proxy-Connection"
        ) {
            continue;
        }
        out.push_str(&format!("{name}: {value}\r\n"));
    }

    out.push_str("\r\n");
    out.into_bytes()
}

/// Drain and discard a request body declared by `Content-Length`, if any —
/// GET requests from well-behaved clients never have one, but reading it
/// keeps a pipelined connection's framing intact.
///
/// # Errors
/// Returns an error if the declared length can't be fully read from `reader`.
pub fn drain_declared_body(
    reader: &mut impl Read,
    headers: &BTreeMap<String, String>,
) -> std::io::Result<()> {
    if let Some(len) = headers.get("Content-Length").and_then(|v| v.parse().ok()) {
        let mut buf = vec![0u8; len];
        reader.read_exact(&mut buf)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::uri::parse_url;
    use std::io::Cursor;

    #[test]
    fn reads_a_get_request_with_headers() {
        let raw = "GET http://example.com/a HTTP/1.1\r\nHost: example.com\r\nX-Custom: yes\r\n\r\n";
        let mut cursor = Cursor::new(raw.as_bytes());
        let request = read_request(&mut cursor).unwrap();
        assert_eq!(request.raw_uri, "http://example.com/a");
        assert_eq!(request.headers.get("Host").unwrap(), "example.com");
        assert_eq!(request.headers.get("X-Custom").unwrap(), "yes");
    }

    #[test]
    fn rejects_non_get_methods() {
        let raw = "POST http://example.com/a HTTP/1.0\r\n\r\n";
        let mut cursor = Cursor::new(raw.as_bytes());
        let err = read_request(&mut cursor).unwrap_err();
        assert!(matches!(err, RequestError::UnsupportedMethod(m) if m == "POST"));
    }

    #[test]
    fn empty_stream_is_a_connection_closed_error() {
        let mut cursor = Cursor::new(b"".as_slice());
        assert!(matches!(
            read_request(&mut cursor),
            Err(RequestError::ConnectionClosed)
        ));
    }

    #[test]
    fn upstream_request_uses_fixed_headers_and_client_host() {
        let uri = parse_url("http://example.com/a").unwrap();
        let mut headers = BTreeMap::new();
        headers.insert("Host".to_string(), "example.com".to_string());
        headers.insert("X-Custom".to_string(), "yes".to_string());
        let request = Request {
            raw_uri: "http://example.com/a".to_string(),
            headers,
        };

        let rewritten = String::from_utf8(build_upstream_request(&uri, &request)).unwrap();
        assert!(rewritten.starts_with("GET /a HTTP/1.0\r\n"));
        assert!(rewritten.contains("Host: example.com\r\n"));
        assert!(rewritten.contains("User-Agent: Mozilla/5.0"));
        assert!(rewritten.contains("Connection: close\r\n"));
        assert!(rewritten.contains("Proxy-Connection: close\r\n"));
        assert!(rewritten.contains("X-Custom: yes\r\n"));
        assert!(rewritten.ends_with("\r\n\r\n"));
    }

    #[test]
    fn upstream_request_falls_back_to_uri_host_without_a_host_header() {
        let uri = parse_url("http://example.com/a").unwrap();
        let request = Request {
            raw_uri: "http://example.com/a".to_string(),
            headers: BTreeMap::new(),
        };
        let rewritten = String::from_utf8(build_upstream_request(&uri, &request)).unwrap();
        assert!(rewritten.contains("Host: example.com\r\n"));
    }
}
