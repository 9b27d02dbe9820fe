//! Protocol Module
//!
//! Typed store commands and replies shared by the adapters and the store
//! backends.
//!
//! ## Shape
//! ```text
//! ┌────────────┐  Command   ┌────────────┐
//! │  Adapter   │ ─────────► │ Connection │
//! │            │ ◄───────── │            │
//! └────────────┘   Reply    └────────────┘
//! ```
//!
//! ### Reply Kinds
//! - Nil:   absent value
//! - Ok:    status reply
//! - Int:   integer reply (counts, flags, lengths)
//! - Bulk:  binary-safe string (values, scores)
//! - Array: nested replies (ranges, scan pages)

mod command;
mod response;

pub use command::{Aggregate, Command, InsertPosition, LexBound, SetOp, SortedSetOp};
pub use response::Reply;
