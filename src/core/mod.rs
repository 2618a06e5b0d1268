//! Core business logic module
//!
//! This module contains the point mutation components:
//! - `traits` - Seams for the account store and the gate table
//! - `gate_table` - Per-account and striped gate tables
//! - `memory_store` - In-memory account store
//! - `engine` - Serialized charge/use orchestration

pub mod engine;
pub mod gate_table;
pub mod memory_store;
pub mod traits;

pub use engine::PointEngine;
pub use gate_table::{PerAccountGates, StripedGates};
pub use memory_store::{MemoryStore, StoreLatency};
pub use traits::{AccountStore, GateTable};
