//! # duopad-wire
//!
//! The frame codec and resend bookkeeping for duopad's reliable transport.
//! This crate does no I/O of its own — it turns bytes into [`Frame`]s and
//! back, and turns an inbound `Frame` plus a mutable reference to the
//! session state into state changes, the way `duopad-core`'s edit mapper
//! turns a keystroke into a store mutation. `duopad-net` supplies the
//! actual pipes.

#![warn(missing_docs)]

mod error;
mod frame;
mod resend;

pub mod dispatch;

pub use error::WireError;
pub use frame::{
    deserialize_insert, serialize_insert, Frame, ACK_TAG, ACKI_TAG, DATA_TAG, INIT_TAG, INRQ_TAG,
};
pub use resend::ResendQueue;
