use std::fmt;
use std::io;

/// Errors from the parts of duopad that touch the filesystem or OS pipes.
///
/// Per the spec's error handling design, channel-open failure at startup and
/// pad-file I/O failures are the fatal conditions here; everything else
/// (malformed frames) is handled inside `duopad-wire` by dropping the frame.
#[derive(Debug)]
pub enum NetError {
    /// Creating the named pipe at `path` failed for a reason other than it
    /// already existing (which is the normal "I'm the joiner" signal).
    FifoCreate { path: String, source: io::Error },
    /// Opening an already-created pipe for reading or writing failed.
    FifoOpen { path: String, source: io::Error },
    /// Reading from or writing to an open pipe failed.
    Io(io::Error),
    /// Saving or loading the persisted pad file failed.
    Persist { path: String, source: io::Error },
}

impl fmt::Display for NetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FifoCreate { path, source } => {
                write!(f, "failed to create fifo {path}: {source}")
            }
            Self::FifoOpen { path, source } => {
                write!(f, "failed to open fifo {path}: {source}")
            }
            Self::Io(source) => write!(f, "channel i/o error: {source}"),
            Self::Persist { path, source } => {
                write!(f, "failed to persist pad at {path}: {source}")
            }
        }
    }
}

impl std::error::Error for NetError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::FifoCreate { source, .. } => Some(source),
            Self::FifoOpen { source, .. } => Some(source),
            Self::Io(source) => Some(source),
            Self::Persist { source, .. } => Some(source),
        }
    }
}

impl From<io::Error> for NetError {
    fn from(source: io::Error) -> Self {
        NetError::Io(source)
    }
}
