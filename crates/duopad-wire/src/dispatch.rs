//! Pure transport dispatch: turning one inbound [`Frame`] into session state
//! changes and a list of [`Effect`]s for the caller to carry out.
//!
//! This mirrors the split the teacher crate draws between a pure planning
//! step (`crdt_migrate::MigrationEngine`, which decides *what* to do and is
//! unit-testable without touching a real database) and the I/O that
//! actually does it. Here, `duopad-wire::dispatch` decides what a frame
//! means; `duopad-net::Session` is the only thing that opens a pipe or
//! writes a byte.

use duopad_core::InsertStore;

use crate::frame::Frame;

/// Author ID the joiner is assigned. The host is always author `1` (its
/// own fixed range starts at 1); since exactly two peers are supported,
/// the joiner's author id is the fixed constant `2` rather than something
/// carried in the `Init` payload.
pub const JOINER_AUTHOR_ID: u32 = 2;

/// The host's fixed author id and ID range, per spec §4.8.
pub const HOST_AUTHOR_ID: u32 = 1;
/// Lower bound of the host's fixed ID range.
pub const HOST_ID_START: u32 = 1;
/// Upper bound of the host's fixed ID range.
pub const HOST_ID_END: u32 = 1024;
/// Reference upper bound handed to the joiner during `Init`.
pub const JOINER_ID_END_REFERENCE: u32 = 20_048;

/// The pure (non-I/O) parts of one peer's session state: its role-derived
/// identity and whether the other side has acknowledged `Init` yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransportState {
    /// This peer's author id. `0` until an `Init` (joiner) or startup
    /// (host) has assigned it.
    pub author_id: u32,
    /// Lower bound of this peer's allocated ID range.
    pub id_start: u32,
    /// Upper bound of this peer's allocated ID range.
    pub id_end: u32,
    /// `true` once the other peer has acknowledged our `Init` (host) or
    /// once we've learned our range from an `Init` (joiner, set
    /// immediately since there's nothing further for the joiner to wait
    /// on beyond having sent `acki`).
    pub init_acknowledged: bool,
}

impl TransportState {
    /// The host's state immediately at startup: fixed author/range, and
    /// `init_acknowledged = false` since no joiner has connected yet — it
    /// only becomes meaningful once a joiner sends `inrq` and we send them
    /// an `Init`.
    pub fn host() -> Self {
        TransportState {
            author_id: HOST_AUTHOR_ID,
            id_start: HOST_ID_START,
            id_end: HOST_ID_END,
            init_acknowledged: false,
        }
    }

    /// The joiner's state immediately at startup: nothing is known yet
    /// until `Init` arrives.
    pub fn joiner() -> Self {
        TransportState {
            author_id: 0,
            id_start: 0,
            id_end: 0,
            init_acknowledged: false,
        }
    }
}

/// Something the caller must do in response to dispatching a frame. None of
/// these are performed by [`dispatch`] itself — it only decides.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Open the outbound channel to the peer (host, on receiving `inrq`).
    OpenOutboundChannel,
    /// Send this frame to the peer.
    SendFrame(Frame),
    /// Remove this `self_id` from the outbound resend queue; it has been
    /// acknowledged.
    Acknowledge(u32),
}

/// Dispatch one inbound frame against `state` and `store`, per §4.7.
///
/// Store mutations (the `data` tag's upsert) are applied directly — they
/// are pure, in-memory, and need no caller involvement — while anything
/// that touches the outside world (opening a channel, sending a frame,
/// touching the resend queue) comes back as an [`Effect`] for
/// `duopad-net::Session` to carry out.
pub fn dispatch(frame: Frame, state: &mut TransportState, store: &mut InsertStore) -> Vec<Effect> {
    match frame {
        Frame::InitRequest => {
            state.init_acknowledged = false;
            vec![
                Effect::OpenOutboundChannel,
                Effect::SendFrame(Frame::Init {
                    id_start: state.id_end + 1,
                    id_end: JOINER_ID_END_REFERENCE,
                }),
            ]
        }
        Frame::Init { id_start, id_end } => {
            state.id_start = id_start;
            state.id_end = id_end;
            state.author_id = JOINER_AUTHOR_ID;
            vec![Effect::SendFrame(Frame::InitAck)]
        }
        Frame::InitAck => {
            state.init_acknowledged = true;
            Vec::new()
        }
        Frame::Data(record) => {
            let self_id = record.self_id;
            store.upsert(record);
            vec![Effect::SendFrame(Frame::Ack { self_id })]
        }
        Frame::Ack { self_id } => {
            vec![Effect::Acknowledge(self_id)]
        }
    }
}
