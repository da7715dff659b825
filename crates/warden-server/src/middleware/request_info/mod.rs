//! Routing metadata for every request.

pub mod layer;
pub mod resolver;
pub mod types;

pub use layer::{RequestInfoLayer, RequestInfoMiddleware};
pub use resolver::RequestInfoResolver;
pub use types::{RequestInfo, RequestInfoError};
