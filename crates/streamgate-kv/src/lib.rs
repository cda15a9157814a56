//! # streamgate-kv
//!
//! Key-value namespaces for the Streamgate gateway.
//!
//! The gateway keeps two independent namespaces, one for wallet credentials
//! and one for video metadata. Each is reached through the [`KvStore`] trait,
//! which offers exactly the three operations the handlers use: `get`, `put`
//! and `list`.
//!
//! ## Backends
//!
//! | Backend | Type | Notes |
//! |---------|------|-------|
//! | `memory` | [`MemoryStore`] | Process-local, lost on restart |
//! | `sqlite` | [`SqliteStore`] | One table, partitioned by namespace |
//! | `cloudflare` | [`CloudflareKvStore`] | Workers KV over the REST API |
//!
//! None of the backends offers a conditional write; a caller that checks for
//! a key and then writes it races with concurrent writers.

pub mod cloudflare;
pub mod error;
pub mod sqlite;
pub mod storage;

pub use cloudflare::{CloudflareKvStore, KvAuth};
pub use error::KvError;
pub use sqlite::SqliteStore;
pub use storage::{KeyEntry, KvNamespaces, KvStore, MemoryStore, open_namespaces};
