//! Adyen integration — upstream endpoint table, request payloads, and the
//! API client used by the onboarding flow.

pub mod client;
pub mod endpoints;
pub mod requests;

pub use client::{AdyenApi, ApiConnector, ApiCredentials, ProxyClient, ProxyConnector};
pub use endpoints::{Environment, Service, UpstreamTable};
