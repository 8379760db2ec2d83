//! # OS Primitive Layer
//!
//! The bottom of the stack. `parking_lot` provides the exclusive lock and
//! the wait queue; this module adds the pieces the primitives are built from:
//!
//! - [`HandleBudget`] / [`OsHandle`] - accounting for OS resources, so that
//!   running out of them is an observable construction failure
//! - [`Event`] - auto-reset and manual-reset signaling gates

mod event;
mod handle;

pub(crate) use event::{Event, EventReset};
pub(crate) use handle::{HandleBudget, OsHandle};
pub use handle::PrimitiveKind;
