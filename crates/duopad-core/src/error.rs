use core::fmt;

/// Errors produced by the core CRDT and editing operations.
///
/// None of these are wire/transport errors — see `duopad_wire::WireError` and
/// `duopad_net::NetError` for those. These are the purely local failure
/// modes: ID exhaustion and malformed edit requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoreError {
    /// The peer's allocated ID range `[id_start, id_end]` has no IDs left.
    /// Per spec this is fatal: the caller should abort rather than continue
    /// editing with no way to name new inserts.
    IdRangeExhausted,
    /// A cursor position was out of bounds for the current rendered text.
    CursorOutOfBounds {
        /// The cursor value that was rejected.
        cursor: usize,
        /// The length of the rendered text at the time.
        text_len: usize,
    },
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IdRangeExhausted => write!(f, "id range exhausted"),
            Self::CursorOutOfBounds { cursor, text_len } => {
                write!(f, "cursor {cursor} out of bounds for text of length {text_len}")
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for CoreError {}
