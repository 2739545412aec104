//! Time handler: renders the current time as a small HTML page
//!
//! Answers 201 Created rather than 200. Clients of this endpoint check for
//! 201, so the status stays as it is.

use chrono::{DateTime, Utc};
use hyper::{Response, StatusCode};

use super::RequestContext;
use crate::http::{build_html_response, ResponseBody};

/// RFC 1123 layout, e.g. `Mon, 02 Jan 2006 15:04:05 GMT`
pub const RFC1123_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

pub fn render_time_page(now: DateTime<Utc>, path: &str) -> String {
    format!(
        "<h1 align=\"center\">The current time is:</h1><h2 align=\"center\">{}</h2>\nServing: {path}\n",
        now.format(RFC1123_FORMAT)
    )
}

/// Clock is read per request; nothing is cached
pub fn serve(ctx: &RequestContext<'_>) -> Response<ResponseBody> {
    let html = render_time_page(Utc::now(), ctx.path);
    build_html_response(StatusCode::CREATED, html, ctx.is_head)
}
