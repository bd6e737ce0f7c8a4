//! Client code for waystation.
//!
//! This crate provides the gateway: request classification, caching
//! strategies, offline fallbacks, the install/activate lifecycle and the
//! HTTP network it fetches through.

pub mod background;
pub mod classify;
pub mod fallback;
pub mod fetch;
pub mod gateway;
pub mod request;
pub mod strategy;

#[cfg(test)]
mod mock;

pub use classify::{ClassifyRules, ExclusionReason, Policy};
pub use fetch::{FetchClient, FetchConfig, Network};
pub use gateway::{
    ActivateReport, Gateway, GatewayConfig, GatewayMessage, GatewayStatus, InstallReport, Interception,
    LifecycleState, MessageReply,
};
pub use request::{Destination, GatewayRequest};
pub use reqwest::Method;
