//! Authentication middleware for the Warden API server.

pub mod header;
pub mod jwt;
pub mod layer;
pub mod types;

pub use header::RequestHeaderAuthenticator;
pub use jwt::{encode_token, TokenAuthenticator};
pub use layer::{AuthnLayer, AuthnMiddleware};
pub use types::{AuthnError, Claims, ANONYMOUS_USER, AUTHENTICATED_GROUP, UNAUTHENTICATED_GROUP};
