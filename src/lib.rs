//! # cfkv
//!
//! A single-node key-value store with:
//! - Named column families sharing one ordered keyspace
//! - Atomic multi-key write batches
//! - Snapshot-isolated point reads and scans
//! - A raw Get/Put/Delete/Scan API
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Raw API (Server)                         │
//! │              Get / Put / Delete / Scan                       │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │   Reader    │          │   write()   │
//!   │ (snapshot)  │          │  (atomic)   │
//!   └──────┬──────┘          └──────┬──────┘
//!          │                        │
//!          └───────────┬────────────┘
//!                      ▼
//!              ┌───────────────┐
//!              │  CF Key Codec │
//!              └───────┬───────┘
//!                      ▼
//!              ┌───────────────┐
//!              │     redb      │
//!              └───────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod codec;
pub mod storage;
pub mod server;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{KvError, Result};
pub use config::Config;
pub use storage::{Context, Modify, StandaloneStorage, Storage, StorageReader};
pub use server::Server;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of cfkv
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
