//! Convenient re-exports for common usage.
//!
//! ```
//! use duopad_core::prelude::*;
//! ```

pub use crate::buffer::UiBuffer;
pub use crate::edit::{delete_letter, insert_letter};
pub use crate::error::CoreError;
pub use crate::id_range::IdRange;
pub use crate::insert::{InsertRecord, DEL};
pub use crate::render::{render, RenderedView};
pub use crate::store::InsertStore;
