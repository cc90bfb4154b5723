//! Response-side types: the normalized outcome of one request.

mod outcome;
mod transport;

pub use outcome::Outcome;
pub use transport::TransportError;
