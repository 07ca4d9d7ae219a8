//! Minimal HTML error pages sent to clients in place of a proxied response.

const PROXY_NAME: &str = "rustproxy";

/// A canned HTTP/1.0 error response: status line, a two-header preamble,
/// and a small HTML body naming the proxy.
pub struct ErrorPage {
    pub code: u16,
    pub short: &'static str,
    pub long: &'static str,
}

impl ErrorPage {
    pub const BAD_REQUEST: Self = Self {
        code: 400,
        short: "Bad Request",
        long: "The proxy could not parse the request URI.",
    };

    pub const NOT_IMPLEMENTED: Self = Self {
        code: 501,
        short: "Not Implemented",
        long: "The proxy only implements GET requests.",
    };

    /// Render the full response (status line, headers, body) as bytes
    /// ready to write to the client socket.
    #[must_use]
    pub fn render(&self) -> Vec<u8> {
        let body = format!(
            "<html><head><title>{code} {short}</title></head>\
             <body><h1>{code} {short}</h1><p>{long}</p>\
             <hr><em>{name}</em></body></html>",
            code = self.code,
            short = self.short,
            long = self.long,
            name = PROXY_NAME,
        );

        let mut out = format!(
            "HTTP/1.0 {} {}\r\nContent-type: text/html\r\nContent-length: {}\r\n\r\n",
            self.code,
            self.short,
            body.len(),
        )
        .into_bytes();
        out.extend_from_slice(body.as_bytes());
        out
    }
}
