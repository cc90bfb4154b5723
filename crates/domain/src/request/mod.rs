//! Request-side types: method, body and target URL.

mod base_url;
mod body;
mod method;

pub use base_url::BaseUrl;
pub use body::RequestBody;
pub use method::HttpMethod;
