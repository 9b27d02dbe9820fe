//! # memberpoint
//!
//! Data-access layer for MemberPoint records (a member id and its point
//! balance) on a Redis-compatible key-value store:
//! - One adapter per structure: scalar, hash, list, set, sorted set,
//!   HyperLogLog
//! - Pipelined batch reads
//! - Optimistic multi-key compare-and-set
//! - Atomic server-side scripts
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 MemberPointRepository                        │
//! │              (config + store handle)                         │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌──────────────────────┐
//!   │  Adapters   │          │ Batch / Transaction / │
//!   │ (6 kinds)   │          │       Script          │
//!   └──────┬──────┘          └──────────┬───────────┘
//!          │      KeySpace::derive       │
//!          └────────────┬────────────────┘
//!                       ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │        Store / Connection   (Command -> Reply)               │
//! │        MemoryStore  |  RedisStore (feature "redis")          │
//! └─────────────────────────────────────────────────────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod model;
pub mod keys;
pub mod protocol;
pub mod store;
pub mod adapters;
pub mod batch;
pub mod transaction;
pub mod script;
pub mod repository;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{Error, IntoPair, Result, Sentinel};
pub use config::Config;
pub use keys::{KeySpace, StoreKey, StructureKind};
pub use model::MemberPoint;
pub use protocol::{LexBound, SetOp, SortedSetOp};
pub use repository::MemberPointRepository;
pub use store::{Connection, MemoryStore, Store};

#[cfg(feature = "redis")]
pub use store::RedisStore;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of memberpoint
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
