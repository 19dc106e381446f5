//! Merchant onboarding — Adyen proxy gateway and onboarding orchestrator.

pub mod adyen;
pub mod config;
pub mod error;
pub mod gateway;
pub mod onboarding;
