//! # Engine Module
//!
//! The transactional heart of Vigor POS. Repositories serve reads; these
//! engines own every multi-step write:
//!
//! - [`sale::SaleEngine`] - atomic sale creation and same-day reversal
//! - [`closure::ClosureEngine`] - cash closure upsert, review lifecycle,
//!   and shift aggregation queries
//!
//! Each engine operation opens one sqlx transaction. A failure at any step
//! rolls everything back: no partial stock decrement, no half-issued
//! membership, no closure with stale differences is ever observable.

pub mod closure;
pub mod sale;
pub mod shift;
