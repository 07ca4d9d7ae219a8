//! A caching HTTP/1.0 forward proxy.
//!
//! Accepts connections on a TCP port, parses one `GET <absolute-URI>
//! HTTP/1.x` request per connection, serves it from an in-process LRU
//! cache when possible, and otherwise fetches it from the origin named
//! in the URI, streaming the response back to the client while
//! opportunistically caching it.

mod error_page;
mod handler;
mod http;
mod uri;

use cache_core::ConcurrentCache;
use clap::Parser;
use log::{error, info};
use std::net::TcpListener;
use std::process::ExitCode;
use std::sync::Arc;
use std::thread;

#[derive(Debug, Parser)]
#[command(name = "proxy", about = "A caching HTTP/1.0 forward proxy")]
struct Args {
    /// TCP port to listen on.
    port: u16,
}

fn main() -> ExitCode {
    env_logger::init();

    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::FAILURE;
        }
    };

    ignore_sigpipe();

    let listener = match TcpListener::bind(("0.0.0.0", args.port)) {
        Ok(listener) => listener,
        Err(err) => {
            error!("could not bind port {}: {err}", args.port);
            return ExitCode::FAILURE;
        }
    };

    info!("listening on port {}", args.port);
    let cache = Arc::new(ConcurrentCache::new());

    for incoming in listener.incoming() {
        let stream = match incoming {
            Ok(stream) => stream,
            Err(err) => {
                error!("failed to accept a connection: {err}");
                continue;
            }
        };

        let peer = stream
            .peer_addr()
            .map(|addr| addr.to_string())
            .unwrap_or_else(|_| "<unknown>".to_string());
        let cache = Arc::clone(&cache);

        thread::spawn(move || handler::handle_connection(stream, cache, peer));
    }

    ExitCode::SUCCESS
}

/// Ignore `SIGPIPE` so that a client closing its end of the socket
/// surfaces as an `EPIPE` I/O error on the next write, not as the
/// default terminating signal.
fn ignore_sigpipe() {
    #[cfg(unix)]
    unsafe {
        libc::signal(libc::SIGPIPE, libc::SIG_IGN);
    }
}
