// crates/accrue-core/src/lib.rs
//
// accrue-core: Core types, fixed-point math, and collaborator traits for the
// Accrue rebasing ledger.
//
// This is the leaf crate that the ledger and the CLI depend on. It defines
// account identities, the 18-decimal index math over 256-bit integers, the
// protocol-wide error type, and the access-control seam that external role
// administration plugs into.

pub mod account;
pub mod error;
pub mod fixed;
pub mod traits;

// Re-export key types for ergonomic access from downstream crates.
// Usage: `use accrue_core::AccountId;`

// Identity types
pub use account::{AccountId, ChainId};

// Fixed-point math
pub use fixed::{format_units, parse_units, U256, U512, INDEX_ONE};

// Error type
pub use error::AccrueError;

// Traits
pub use traits::AccessControl;
