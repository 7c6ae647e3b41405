//! # duopad-net
//!
//! The parts of duopad that touch the operating system: named-pipe (FIFO)
//! creation and opening, the per-tick transport loop that drives
//! `duopad-wire::dispatch` against real pipes, the resend timer, and saving
//! the full document to `pads/<name>`.
//!
//! Everything here is a thin shell around `duopad-core` (the data model)
//! and `duopad-wire` (the pure frame codec and dispatch function) — no CRDT
//! logic lives in this crate.

#![warn(missing_docs)]

mod error;
mod persist;
mod pipe;
mod session;

pub use error::NetError;
pub use persist::{load_document, pad_path, save_document};
pub use session::{Role, Session, CHANNEL_1, CHANNEL_2, RESEND_INTERVAL};
