//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: access logging, route matching,
//! and dispatch to the echo, time and data handlers.

use crate::config::AppState;
use crate::handler::{data, echo, time};
use crate::http::ResponseBody;
use crate::logger::{self, AccessLogEntry, AccessLogFormat};
use hyper::body::Body;
use hyper::header::{HeaderValue, SERVER};
use hyper::{Method, Request, Response};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

pub const TIME_PATH: &str = "/time";
pub const DATA_PATH: &str = "/getdata";

/// Request context encapsulating information needed for request processing
pub struct RequestContext<'a> {
    pub method: &'a Method,
    pub path: &'a str,
    pub is_head: bool,
}

impl<'a> RequestContext<'a> {
    pub fn new(method: &'a Method, path: &'a str) -> Self {
        Self {
            method,
            path,
            is_head: *method == Method::HEAD,
        }
    }
}

/// Main entry point for HTTP request handling
///
/// The body is never read, so any body type is accepted.
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<Response<ResponseBody>, Infallible> {
    let started = Instant::now();
    let logging = &state.config.logging;

    let entry = logging
        .access_log
        .then(|| AccessLogEntry::from_request(&req, peer_addr));
    logger::log_headers_count(req.headers().len(), logging.show_headers);

    let ctx = RequestContext::new(req.method(), req.uri().path());
    let mut response = route_request(&ctx, &state).await;

    if let Ok(server) = HeaderValue::from_str(&state.config.http.server_name) {
        response.headers_mut().insert(SERVER, server);
    }

    if let Some(mut entry) = entry {
        let body_bytes = response
            .body()
            .size_hint()
            .exact()
            .and_then(|n| usize::try_from(n).ok())
            .unwrap_or(0);
        entry.finish(response.status().as_u16(), body_bytes, started.elapsed());
        logger::log_access(&entry, &AccessLogFormat::parse(&logging.access_log_format));
    }

    Ok(response)
}

/// Route request by exact path; everything unmatched is echoed
async fn route_request(ctx: &RequestContext<'_>, state: &AppState) -> Response<ResponseBody> {
    match ctx.path {
        TIME_PATH => time::serve(ctx),
        DATA_PATH => data::serve(ctx, state.store.as_ref()).await,
        _ => echo::serve(ctx),
    }
}
