//! Parsing of absolute request-URIs of the form `http://host[:port]/path`.

use thiserror::Error;

/// An absolute-URI split into the pieces a forward proxy needs to dial
/// upstream and rewrite the request line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestUri {
    pub host: String,
    pub port: u16,
    pub path: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum UriError {
    #[error("URI is missing the http:// scheme")]
    MissingScheme,
    #[error("URI has an empty host")]
    EmptyHost,
    #[error("port is not a valid decimal number")]
    InvalidPort,
}

const DEFAULT_PORT: u16 = 80;

/// Split an absolute-URI the way the original parser does: `host` runs up
/// to the first of `{space, ':', '/', CR, LF, NUL}`; an optional decimal
/// port follows a `:`; everything from the first `/` onward is the path,
/// defaulting to `/` when absent.
///
/// This preserves two quirks on purpose rather than silently correcting
/// them, since they describe documented behavior rather than bugs to fix
/// here:
/// - A port written after the path (`http://host/path:9999`) is not
///   recognized — the scan for `:` stops at the first `/`.
/// - When the path is absent, the returned path is the literal string
///   `/` with no trailing NUL of its own; callers that expect a
///   null-terminated buffer must add one themselves.
///
/// # Errors
/// Returns [`UriError::MissingScheme`] if `uri` doesn't start with
/// `http://`, [`UriError::EmptyHost`] if the host component is empty,
/// and [`UriError::InvalidPort`] if a `:`-delimited port isn't a valid
/// `u16`.
pub fn parse_url(uri: &str) -> Result<RequestUri, UriError> {
    let rest = uri.strip_prefix("http://").ok_or(UriError::MissingScheme)?;

    let host_end = rest
        .find(|c| matches!(c, ' ' | ':' | '/' | '\r' | '\n' | '\0'))
        .unwrap_or(rest.len());
    let host = &rest[..host_end];
    if host.is_empty() {
        return Err(UriError::EmptyHost);
    }

    let after_host = &rest[host_end..];

    let (port, after_port) = if let Some(port_str) = after_host.strip_prefix(':') {
        let port_end = port_str
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(port_str.len());
        let port: u16 = port_str[..port_end]
            .parse()
            .map_err(|_| UriError::InvalidPort)?;
        (port, &port_str[port_end..])
    } else {
        (DEFAULT_PORT, after_host)
    };

    let path = if after_port.starts_with('/') {
        after_port.to_string()
    } else {
        "/".to_string()
    };

    Ok(RequestUri {
        host: host.to_string(),
        port,
        path,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_host_port_and_path() {
        let got = parse_url("http://example.com:8080/a/b").unwrap();
        assert_eq!(
            got,
            RequestUri {
                host: "example.com".to_string(),
                port: 8080,
                path: "/a/b".to_string(),
            }
        );
    }

    #[test]
    fn defaults_port_to_80_when_absent() {
        let got = parse_url("http://example.com/a").unwrap();
        assert_eq!(got.port, 80);
    }

    #[test]
    fn defaults_path_to_slash_when_absent() {
        let got = parse_url("http://example.com").unwrap();
        assert_eq!(got.path, "/");
    }

    #[test]
    fn defaults_path_to_slash_when_only_port_given() {
        let got = parse_url("http://example.com:9000").unwrap();
        assert_eq!(got.path, "/");
        assert_eq!(got.port, 9000);
    }

    #[test]
    fn rejects_missing_scheme() {
        assert_eq!(parse_url("example.com/a"), Err(UriError::MissingScheme));
    }

    #[test]
    fn rejects_empty_host() {
        assert_eq!(parse_url("http:///a"), Err(UriError::EmptyHost));
    }

    #[test]
    fn rejects_non_numeric_port() {
        assert_eq!(
            parse_url("http://example.com:abc/a"),
            Err(UriError::InvalidPort)
        );
    }

    #[test]
    fn a_port_written_after_the_path_is_not_recognized() {
        // Documented quirk: the scan for ':' never runs past the first '/',
        // so this is parsed as path "/a:9999" on the default port, not as
        // path "/a" on port 9999.
        let got = parse_url("http://example.com/a:9999").unwrap();
        assert_eq!(got.port, 80);
        assert_eq!(got.path, "/a:9999");
    }
}
