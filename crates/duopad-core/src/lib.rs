//! # duopad-core
//!
//! The tree-structured sequence CRDT at the heart of duopad: a two-author
//! collaborative text pad. This crate owns the data model (insert records and
//! the insert store), the deterministic renderer that turns the store into a
//! flat character sequence, the edit-to-insert mapper, and ID-range
//! allocation. It does no I/O and knows nothing about pipes, sockets, or
//! frames — see `duopad-wire` and `duopad-net` for those.
//!
//! ## `no_std` Support
//!
//! This crate supports `no_std` environments via `alloc`. Disable the
//! default `std` feature in your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! duopad-core = { version = "0.1", default-features = false }
//! ```
//!
//! ## Quick Start
//!
//! ```
//! use duopad_core::prelude::*;
//!
//! let mut store = InsertStore::new();
//! let mut buffer = UiBuffer::new();
//! let mut ids = IdRange::new(1, 1024);
//!
//! let view = render(&store);
//! insert_letter(&mut store, &mut buffer, &view, &mut ids, /* author */ 1, 'h').unwrap();
//! let view = render(&store);
//! buffer.reanchor(&view, 0, 0);
//!
//! let view = render(&store);
//! insert_letter(&mut store, &mut buffer, &view, &mut ids, /* author */ 1, 'i').unwrap();
//!
//! let view = render(&store);
//! assert_eq!(view.text.iter().collect::<String>(), "hi");
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]

extern crate alloc;

mod buffer;
mod edit;
mod error;
mod id_range;
mod insert;
mod render;
mod store;

pub mod base85;
pub mod crc;
pub mod prelude;

pub use buffer::UiBuffer;
pub use edit::{delete_letter, insert_letter};
pub use error::CoreError;
pub use id_range::IdRange;
pub use insert::{InsertRecord, DEL};
pub use render::{render, RenderedView};
pub use store::InsertStore;
