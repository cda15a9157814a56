//! # streamgate-core
//!
//! Configuration shared by every Streamgate crate.
//!
//! The gateway is configured once at process start from a YAML file
//! (`streamgate.yaml`). The resulting [`GatewayConfig`] is immutable for the
//! lifetime of the process and is passed explicitly to the router and each
//! handler.

pub mod config;

pub use config::{
    Allowlist, ConfigError, Finding, GatewayConfig, KvBackend, KvConfig, NamespaceConfig,
    ProviderConfig, ServerConfig, TokenConfig,
};
