use core::fmt;

/// Errors that can occur decoding a frame or a persisted document.
///
/// Per the spec's error handling design, a malformed frame is never fatal:
/// callers (`duopad-net::Session`, which does depend on `tracing`) log it and
/// drop the frame without disturbing any session or document state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireError {
    /// Fewer than 5 bytes are available, so not even the length prefix can
    /// be read.
    TooShortForLength,
    /// The decoded length claims more bytes than are actually available.
    Truncated {
        /// Bytes the length prefix promised.
        expected: usize,
        /// Bytes actually available.
        available: usize,
    },
    /// The body is too short to contain even a 4-byte tag.
    MissingTag,
    /// The 4-byte tag didn't match any known frame type.
    UnknownTag([u8; 4]),
    /// The payload for a fixed-size tag (`Init`, `ack `) was the wrong size.
    BadPayloadLength {
        /// The tag whose payload didn't fit.
        tag: [u8; 4],
    },
    /// The CRC recomputed over tag+payload didn't match the CRC embedded in
    /// the frame.
    CrcMismatch {
        /// The CRC decoded from the frame's nibble bytes.
        expected: u8,
        /// The CRC this decoder computed over the frame's tag+payload.
        found: u8,
    },
}

impl fmt::Display for WireError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooShortForLength => write!(f, "fewer than 5 bytes available for length prefix"),
            Self::Truncated { expected, available } => {
                write!(f, "frame claims {expected} bytes but only {available} are available")
            }
            Self::MissingTag => write!(f, "frame body too short to contain a tag"),
            Self::UnknownTag(tag) => {
                write!(f, "unknown frame tag {:?}", core::str::from_utf8(tag).unwrap_or("<non-utf8>"))
            }
            Self::BadPayloadLength { tag } => {
                write!(f, "wrong payload length for tag {:?}", core::str::from_utf8(tag).unwrap_or("<non-utf8>"))
            }
            Self::CrcMismatch { expected, found } => {
                write!(f, "crc mismatch: frame says {expected:#04x}, computed {found:#04x}")
            }
        }
    }
}

impl std::error::Error for WireError {}
