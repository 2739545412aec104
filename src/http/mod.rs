//! HTTP protocol layer module
//!
//! Response builders shared by the request handlers, decoupled from any
//! particular route.

pub mod response;

// Re-export commonly used types
pub use response::{
    build_405_response, build_500_response, build_html_response, build_text_response,
    ResponseBody,
};
