//! Echo handler: reports the request path back as plain text

use hyper::{Response, StatusCode};

use super::RequestContext;
use crate::http::{build_text_response, ResponseBody};

/// `Serving: {path}\n` with 200, whatever the method
pub fn serve(ctx: &RequestContext<'_>) -> Response<ResponseBody> {
    build_text_response(StatusCode::OK, format!("Serving: {}\n", ctx.path))
}
