//! Escrowed Order-Book Exchange
//!
//! This crate implements the custody and settlement layer of the
//! peer-to-peer asset exchange: makers escrow one leg of a trade, any
//! taker settles the order atomically, and a protocol commission is
//! skimmed from the quote leg into a governance-controlled pool.
//!
//! # Modules
//! - `errors`: Engine and token error taxonomy
//! - `events`: Events emitted by engine operations
//! - `security`: Reentrancy guard and role-based access control
//! - `token`: Fungible-asset ledgers, approval oracle, atomic settlement
//! - `index`: Active-order set with O(1) swap-remove
//! - `engine`: Order lifecycle, escrow orchestration, commission governance
//!
//! # Version
//! v0.1.0 — initial implementation

pub mod engine;
pub mod errors;
pub mod events;
pub mod index;
pub mod security;
pub mod token;

pub use engine::ExchangeEngine;
pub use errors::{EngineError, TokenError};
pub use index::ActiveOrderIndex;
pub use token::{ApprovalOracle, ApprovalRegistry, AssetBank, TokenLedger, TransferLeg};

/// Engine ABI version — frozen after release
pub const EXCHANGE_ABI_VERSION: &str = "1.0.0";
