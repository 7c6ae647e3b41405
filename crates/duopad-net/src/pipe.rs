//! Thin wrappers over `mkfifo(2)` and non-blocking FIFO opens.
//!
//! Per spec §4.8/§6 both peers' pipes are created mode `0777`. The only two
//! suspension points in the whole system live here: the blocking open of the
//! outbound pipe during join/init (`open_write`), and the non-blocking read
//! side that a tick merely polls (`open_read_nonblocking`).

use std::fs::{File, OpenOptions};
use std::io;
use std::os::unix::fs::OpenOptionsExt;
use std::path::Path;

use nix::fcntl::OFlag;
use nix::sys::stat::Mode;
use nix::unistd::mkfifo;

use crate::error::NetError;

/// Mode every duopad FIFO is created with, per spec §6.
pub const FIFO_MODE: u32 = 0o777;

/// Create the named pipe at `path`. `Ok(true)` means this call created it
/// (so the caller is the host); `Ok(false)` means it already existed (the
/// caller is the joiner); any other failure is fatal per spec §7.
pub fn create_fifo(path: &Path) -> Result<bool, NetError> {
    match mkfifo(path, Mode::from_bits_truncate(FIFO_MODE as _)) {
        Ok(()) => Ok(true),
        Err(nix::errno::Errno::EEXIST) => Ok(false),
        Err(errno) => Err(NetError::FifoCreate {
            path: path.display().to_string(),
            source: io::Error::from_raw_os_error(errno as i32),
        }),
    }
}

/// Open `path` for reading, non-blocking, as the transport loop's inbound
/// end. A partial/absent read is never an error — see [`read_available`].
pub fn open_read_nonblocking(path: &Path) -> Result<File, NetError> {
    OpenOptions::new()
        .read(true)
        .custom_flags(libc_o_nonblock())
        .open(path)
        .map_err(|source| NetError::FifoOpen {
            path: path.display().to_string(),
            source,
        })
}

/// Open `path` for writing. This blocks until a reader is present on the
/// other end — the only other suspension point besides the tick sleep, per
/// spec §5.
pub fn open_write(path: &Path) -> Result<File, NetError> {
    OpenOptions::new()
        .write(true)
        .open(path)
        .map_err(|source| NetError::FifoOpen {
            path: path.display().to_string(),
            source,
        })
}

/// Read whatever bytes are currently available from `file` without
/// blocking, appending them to `buf`. Returns the number of bytes read;
/// `0` (or a `WouldBlock` error swallowed to `0`) means "no frame this
/// tick", exactly as spec §5 describes.
pub fn read_available(file: &mut File, buf: &mut Vec<u8>) -> Result<usize, NetError> {
    use std::io::Read;
    let mut chunk = [0u8; 4096];
    match file.read(&mut chunk) {
        Ok(0) => Ok(0),
        Ok(n) => {
            buf.extend_from_slice(&chunk[..n]);
            Ok(n)
        }
        Err(e) if e.kind() == io::ErrorKind::WouldBlock => Ok(0),
        Err(e) => Err(NetError::Io(e)),
    }
}

/// Write `bytes` to `file` in full.
pub fn write_all(file: &mut File, bytes: &[u8]) -> Result<(), NetError> {
    use std::io::Write;
    file.write_all(bytes).map_err(NetError::from)
}

/// Remove the FIFO this peer created, on clean shutdown (spec §6).
pub fn remove_fifo(path: &Path) -> Result<(), NetError> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(NetError::Io(e)),
    }
}

fn libc_o_nonblock() -> i32 {
    OFlag::O_NONBLOCK.bits()
}
