//! # vigor-core: Pure Business Logic for Vigor POS
//!
//! The heart of the Vigor gym point-of-sale. Everything here is pure:
//! money arithmetic, domain types, request validation, and the shift
//! reconciliation calculator. No database, no network, no file system.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                     Vigor POS Architecture                          │
//! │                                                                     │
//! │  Terminal frontend / HTTP layer (separate repository)               │
//! │                           │                                         │
//! │  ┌────────────────────────▼──────────────────────────────────────┐  │
//! │  │                ★ vigor-core (THIS CRATE) ★                    │  │
//! │  │                                                               │  │
//! │  │  ┌─────────┐ ┌─────────┐ ┌──────────┐ ┌───────────┐          │  │
//! │  │  │  money  │ │  types  │ │ requests │ │ reconcile │          │  │
//! │  │  │  Money  │ │  Sale   │ │ validate │ │ diff calc │          │  │
//! │  │  └─────────┘ └─────────┘ └──────────┘ └───────────┘          │  │
//! │  │                                                               │  │
//! │  │  NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │  │
//! │  └────────────────────────┬──────────────────────────────────────┘  │
//! │                           │                                         │
//! │  ┌────────────────────────▼──────────────────────────────────────┐  │
//! │  │             vigor-db (SQLite repositories + engines)          │  │
//! │  └───────────────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//!
//! 1. **Pure functions**: deterministic, same input = same output
//! 2. **Integer money**: all monetary values are cents (i64), never floats
//! 3. **Explicit errors**: typed enums, never strings or panics
//! 4. **Injectable time**: engines receive a [`clock::Clock`], tests pin it

// =============================================================================
// Module Declarations
// =============================================================================

pub mod clock;
pub mod error;
pub mod money;
pub mod reconcile;
pub mod requests;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use reconcile::{reconcile, Reconciliation};
pub use requests::*;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Per-channel tolerance for closure discrepancies: one cent. A channel
/// counted within one cent of the recorded total is considered matched.
pub const DISCREPANCY_TOLERANCE: Money = Money::from_cents(1);

/// Maximum quantity of a single product line. Guards against fat-finger
/// quantities; actual stock is checked inside the sale transaction.
pub const MAX_LINE_QUANTITY: i64 = 999;

/// Discounts are basis points; 10000 bps = 100%.
pub const MAX_DISCOUNT_BPS: u32 = 10_000;

/// Closures may be submitted up to this many days back...
pub const CLOSURE_WINDOW_PAST_DAYS: i64 = 7;

/// ...and up to this many days forward (overnight shifts crossing the UTC
/// date boundary land on "tomorrow" from the server's point of view).
pub const CLOSURE_WINDOW_FUTURE_DAYS: i64 = 1;
