//! A single client connection, start to finish: parse the request, serve
//! from cache or fetch from origin, and tear the connection down the way
//! an HTTP/1.0 proxy does — one request per connection.

use crate::error_page::ErrorPage;
use crate::http::{self, RequestError};
use crate::uri::parse_url;
use cache_core::{ConcurrentCache, MAX_OBJECT_SIZE};
use log::{info, warn};
use std::io::{self, BufReader, Read, Write};
use std::net::TcpStream;
use std::sync::Arc;
use std::time::Duration;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Handle one accepted connection end to end. Never panics on a
/// malformed or unsupported request — those are reported to the client
/// as an error page and the connection is closed, matching the
/// one-shot nature of HTTP/1.0.
pub fn handle_connection(mut client: TcpStream, cache: Arc<ConcurrentCache>, peer: String) {
    if let Err(err) = serve(&mut client, &cache, &peer) {
        warn!("{peer}: connection ended with an error: {err}");
    }
    let _ = client.shutdown(std::net::Shutdown::Both);
}

fn serve(client: &mut TcpStream, cache: &ConcurrentCache, peer: &str) -> io::Result<()> {
    let mut reader = BufReader::new(client.try_clone()?);

    let request = match http::read_request(&mut reader) {
        Ok(request) => request,
        Err(RequestError::ConnectionClosed) => return Ok(()),
        Err(RequestError::UnsupportedMethod(method)) => {
            info!("{peer}: rejecting unsupported method {method}");
            client.write_all(&ErrorPage::NOT_IMPLEMENTED.render())?;
            return Ok(());
        }
        Err(err @ RequestError::MalformedRequestLine) => {
            info!("{peer}: {err}");
            client.write_all(&ErrorPage::NOT_IMPLEMENTED.render())?;
            return Ok(());
        }
        Err(RequestError::Io(err)) => return Err(err),
    };

    if let Some(cached) = cache.lookup(&request.raw_uri) {
        info!("{peer}: cache hit for {}", request.raw_uri);
        client.write_all(&cached)?;
        return Ok(());
    }

    let uri = match parse_url(&request.raw_uri) {
        Ok(uri) => uri,
        Err(err) => {
            info!("{peer}: bad request URI {}: {err}", request.raw_uri);
            client.write_all(&ErrorPage::BAD_REQUEST.render())?;
            return Ok(());
        }
    };

    http::drain_declared_body(&mut reader, &request.headers)?;

    let upstream_request = http::build_upstream_request(&uri, &request);
    let mut origin = match connect_origin(&uri.host, uri.port) {
        Ok(origin) => origin,
        Err(err) => {
            warn!("{peer}: could not reach {}:{}: {err}", uri.host, uri.port);
            return Ok(());
        }
    };

    origin.write_all(&upstream_request)?;
    fetch_and_relay(&mut origin, client, cache, &request.raw_uri, peer)
}

fn connect_origin(host: &str, port: u16) -> io::Result<TcpStream> {
    use std::net::ToSocketAddrs;
    let addr = (host, port)
        .to_socket_addrs()?
        .next()
        .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "host resolved to no addresses"))?;
    TcpStream::connect_timeout(&addr, CONNECT_TIMEOUT)
}

/// Stream the origin's response to the client as it arrives, while
/// accumulating up to [`MAX_OBJECT_SIZE`] bytes. If the whole response
/// fit, cache it under the original request URI; if it ran over the
/// cap, it is simply not cached, not truncated to the client.
fn fetch_and_relay(
    origin: &mut TcpStream,
    client: &mut TcpStream,
    cache: &ConcurrentCache,
    url: &str,
    peer: &str,
) -> io::Result<()> {
    let mut buf = [0u8; 8192];
    let mut accumulated: Vec<u8> = Vec::new();
    let mut cacheable = true;

    loop {
        let n = origin.read(&mut buf)?;
        if n == 0 {
            break;
        }
        client.write_all(&buf[..n])?;

        if cacheable {
            if accumulated.len() + n <= MAX_OBJECT_SIZE {
                accumulated.extend_from_slice(&buf[..n]);
            } else {
                cacheable = false;
                accumulated.clear();
                accumulated.shrink_to_fit();
            }
        }
    }

    if cacheable && !accumulated.is_empty() {
        let size = accumulated.len();
        let response: Arc<[u8]> = Arc::from(accumulated.into_boxed_slice());
        if let Err(err) = cache.insert(url.to_string(), response, size) {
            warn!("{peer}: not caching {url}: {err}");
        } else {
            info!("{peer}: cached {size} bytes for {url}");
        }
    }

    Ok(())
}
