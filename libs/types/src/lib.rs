//! Types library for the escrowed asset exchange
//!
//! This library provides the core type definitions shared between the
//! exchange engine and its collaborators, ensuring type safety and
//! deterministic integer arithmetic.
//!
//! # Modules
//! - `ids`: Unique identifiers (OrderId, AccountId, AssetId)
//! - `amount`: Integer asset amounts and basis-point commission rates
//! - `order`: Order record and status lifecycle

// Public modules
pub mod amount;
pub mod ids;
pub mod order;

// Library version constant
pub const LIB_VERSION: &str = "1.0.0";

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::amount::*;
    pub use crate::ids::*;
    pub use crate::order::*;
}
