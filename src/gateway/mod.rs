//! Proxy gateway — forwards browser calls to Adyen with the caller's API key.
//!
//! Stateless per request: routing is a static prefix match, the upstream is
//! picked from an immutable table, and responses are relayed verbatim.

pub mod proxy;
pub mod routes;

pub use proxy::{GatewayState, MAX_BODY_BYTES};
pub use routes::{cors_layer, gateway_routes};
