//! Wires the pure pieces (`duopad_core::InsertStore`, `duopad_wire::dispatch`,
//! `duopad_wire::ResendQueue`) to real named pipes: role negotiation (spec
//! §4.8), the per-tick transport loop (spec §4.7), and the resend timer.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::Duration;

use duopad_core::{base85::decode_u32, base85::ENCODED_LEN, InsertStore};
use duopad_wire::dispatch::{dispatch, Effect, TransportState};
use duopad_wire::{Frame, WireError};

use crate::error::NetError;
use crate::pipe;

/// File name of the pipe the host creates (spec's `/tmp/deca_channel_1`,
/// relocated under `--channel-dir`).
///
/// Per `original_source/main.c`'s actual mkfifo/open sequence, this pipe is
/// opened `O_RDONLY` by the host and `O_WRONLY` by the joiner — so it
/// carries joiner-to-host traffic (`inrq`, then the joiner's `data`/`ack`
/// frames). This is the opposite of the direction spec.md §6's prose
/// assigns to "channel 1"; the mechanics in the original source are
/// authoritative here since spec.md's direction label has no bearing on
/// correctness (both pipes are just fixed, pre-agreed paths) and the
/// original's open-mode calls are unambiguous. See `DESIGN.md`.
pub const CHANNEL_1: &str = "duopad_channel_1";
/// File name of the pipe the joiner creates, read by the joiner and written
/// by the host once it has processed `inrq` — the host-to-joiner direction.
pub const CHANNEL_2: &str = "duopad_channel_2";

/// The resend timer's period (spec §4.7: "every ~10 seconds").
pub const RESEND_INTERVAL: Duration = Duration::from_secs(10);

/// Which role this process negotiated into at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Created the first pipe; owns the fixed `[1, 1024]` ID range.
    Host,
    /// Found the first pipe already present; receives its range from the
    /// host's `Init` frame.
    Joiner,
}

/// A live two-peer session: role, transport state, the insert store, the
/// resend queue, and the open pipe handles.
pub struct Session {
    role: Role,
    state: TransportState,
    store: InsertStore,
    resend: duopad_wire::ResendQueue,
    read_fifo: File,
    write_fifo: Option<File>,
    read_buf: Vec<u8>,
    /// Path to the pipe this process created, removed on clean shutdown.
    owned_path: PathBuf,
    /// Path to open for writing once the outbound channel effect fires.
    outbound_path: PathBuf,
    /// The range most recently sent to the joiner in an `Init` frame, kept
    /// so the resend timer can retransmit the identical values.
    sent_init_range: Option<(u32, u32)>,
    resend_accum: Duration,
}

impl Session {
    /// Negotiate a role against the pipes under `channel_dir` and return a
    /// ready-to-tick session. Mirrors spec §4.8 exactly, including the
    /// joiner's open-write-then-send-then-open-read ordering.
    pub fn establish(channel_dir: &Path) -> Result<Self, NetError> {
        std::fs::create_dir_all(channel_dir).map_err(NetError::from)?;
        let path1 = channel_dir.join(CHANNEL_1);
        let path2 = channel_dir.join(CHANNEL_2);

        if pipe::create_fifo(&path1)? {
            let read_fifo = pipe::open_read_nonblocking(&path1)?;
            Ok(Session {
                role: Role::Host,
                state: TransportState::host(),
                store: InsertStore::new(),
                resend: duopad_wire::ResendQueue::new(),
                read_fifo,
                write_fifo: None,
                read_buf: Vec::new(),
                owned_path: path1,
                outbound_path: path2,
                sent_init_range: None,
                resend_accum: Duration::ZERO,
            })
        } else {
            pipe::create_fifo(&path2)?;
            let mut write_fifo = pipe::open_write(&path1)?;
            pipe::write_all(&mut write_fifo, &Frame::InitRequest.encode())?;
            let read_fifo = pipe::open_read_nonblocking(&path2)?;
            Ok(Session {
                role: Role::Joiner,
                state: TransportState::joiner(),
                store: InsertStore::new(),
                resend: duopad_wire::ResendQueue::new(),
                read_fifo,
                write_fifo: Some(write_fifo),
                read_buf: Vec::new(),
                owned_path: path2,
                outbound_path: path1,
                sent_init_range: None,
                resend_accum: Duration::ZERO,
            })
        }
    }

    /// This process's negotiated role.
    pub fn role(&self) -> Role {
        self.role
    }

    /// This peer's author id. `0` for a joiner that hasn't yet received
    /// `Init`.
    pub fn author_id(&self) -> u32 {
        self.state.author_id
    }

    /// This peer's allocated `[id_start, id_end]`, or `(0, 0)` for a joiner
    /// still waiting on `Init`.
    pub fn id_range(&self) -> (u32, u32) {
        (self.state.id_start, self.state.id_end)
    }

    /// `true` once the other side has acknowledged our `Init`/our `Init`
    /// has arrived (see [`TransportState::init_acknowledged`]).
    pub fn init_acknowledged(&self) -> bool {
        self.state.init_acknowledged
    }

    /// The insert store backing this session.
    pub fn store(&self) -> &InsertStore {
        &self.store
    }

    /// Mutable access to the insert store, for applying local edits.
    pub fn store_mut(&mut self) -> &mut InsertStore {
        &mut self.store
    }

    /// Drain one inbound frame (if a complete one is buffered) and carry
    /// out whatever effects dispatching it produces. Safe to call every UI
    /// tick; a partial frame just waits for more bytes next time.
    pub fn tick(&mut self) -> Result<(), NetError> {
        pipe::read_available(&mut self.read_fifo, &mut self.read_buf)?;
        if let Some(result) = self.take_one_frame() {
            match result {
                Ok(frame) => {
                    let effects = dispatch(frame, &mut self.state, &mut self.store);
                    for effect in effects {
                        self.apply_effect(effect)?;
                    }
                }
                Err(err) => {
                    tracing::warn!(%err, "dropping malformed frame");
                }
            }
        }
        Ok(())
    }

    /// Serialize the insert named `self_id` and send it as a `data` frame,
    /// enqueueing it for resend until acknowledged. Called by the edit
    /// mapper's caller right after `insert_letter`/`delete_letter`.
    pub fn send_insert(&mut self, self_id: u32) -> Result<(), NetError> {
        let Some(record) = self.store.find(self_id).cloned() else {
            return Ok(());
        };
        self.resend.enqueue(self_id);
        self.send_frame(&Frame::Data(record))
    }

    /// Run the resend timer if at least [`RESEND_INTERVAL`] has elapsed
    /// since it last fired, retransmitting every still-unacknowledged
    /// insert (the current authoritative copy, not a stale snapshot) and,
    /// if we're the host and our `Init` hasn't been acknowledged yet,
    /// resending it too.
    pub fn tick_resend_timer(&mut self, elapsed: Duration) -> Result<(), NetError> {
        self.resend_accum += elapsed;
        if self.resend_accum < RESEND_INTERVAL {
            return Ok(());
        }
        self.resend_accum = Duration::ZERO;

        let pending: Vec<u32> = self.resend.pending().collect();
        for id in pending {
            if let Some(record) = self.store.find(id).cloned() {
                tracing::debug!(self_id = id, "resending unacknowledged insert");
                self.send_frame(&Frame::Data(record))?;
            }
        }

        if self.role == Role::Host && !self.state.init_acknowledged {
            if let Some((id_start, id_end)) = self.sent_init_range {
                tracing::debug!("resending unacknowledged init");
                self.send_frame(&Frame::Init { id_start, id_end })?;
            }
        }
        Ok(())
    }

    /// Remove the pipe this process created, for clean shutdown (spec §6).
    pub fn cleanup(&self) -> Result<(), NetError> {
        pipe::remove_fifo(&self.owned_path)
    }

    fn apply_effect(&mut self, effect: Effect) -> Result<(), NetError> {
        match effect {
            Effect::OpenOutboundChannel => {
                let file = pipe::open_write(&self.outbound_path)?;
                self.write_fifo = Some(file);
            }
            Effect::SendFrame(frame) => {
                if let Frame::Init { id_start, id_end } = frame {
                    self.sent_init_range = Some((id_start, id_end));
                }
                self.send_frame(&frame)?;
            }
            Effect::Acknowledge(self_id) => self.resend.acknowledge(self_id),
        }
        Ok(())
    }

    fn send_frame(&mut self, frame: &Frame) -> Result<(), NetError> {
        match self.write_fifo.as_mut() {
            Some(file) => pipe::write_all(file, &frame.encode()),
            None => {
                tracing::warn!("dropping outbound frame: outbound channel not open yet");
                Ok(())
            }
        }
    }

    /// Pull exactly one length-prefixed frame off the front of `read_buf`,
    /// if a complete one has arrived, per spec §4.7's "read 5 bytes of
    /// length prefix, decode, read that many more bytes."
    fn take_one_frame(&mut self) -> Option<Result<Frame, WireError>> {
        if self.read_buf.len() < ENCODED_LEN {
            return None;
        }
        let mut len_bytes = [0u8; ENCODED_LEN];
        len_bytes.copy_from_slice(&self.read_buf[..ENCODED_LEN]);
        let body_len = decode_u32(&len_bytes) as usize;
        let total = ENCODED_LEN + body_len;
        if self.read_buf.len() < total {
            return None;
        }
        let frame_bytes: Vec<u8> = self.read_buf.drain(..total).collect();
        Some(Frame::decode(&frame_bytes).map(|(frame, _)| frame))
    }
}
