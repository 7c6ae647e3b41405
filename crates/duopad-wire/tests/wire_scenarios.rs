//! Integration tests covering the wire protocol's framing and dispatch as
//! a whole, including the concrete scenarios from spec §8.

use duopad_core::{InsertRecord, InsertStore};
use duopad_wire::dispatch::{dispatch, Effect, TransportState};
use duopad_wire::{Frame, WireError};

#[test]
fn host_joiner_handshake_produces_expected_effects_end_to_end() {
    let mut host_state = TransportState::host();
    let mut host_store = InsertStore::new();

    let effects = dispatch(Frame::InitRequest, &mut host_state, &mut host_store);
    let Effect::SendFrame(Frame::Init { id_start, id_end }) = &effects[1] else {
        panic!("expected an Init frame as the second effect");
    };
    assert_eq!(*id_start, 1025);
    assert_eq!(*id_end, 20_048);

    let mut joiner_state = TransportState::joiner();
    let mut joiner_store = InsertStore::new();
    let init_frame = Frame::Init { id_start: *id_start, id_end: *id_end };
    let effects = dispatch(init_frame, &mut joiner_state, &mut joiner_store);
    assert_eq!(effects, vec![Effect::SendFrame(Frame::InitAck)]);
    assert_eq!(joiner_state.author_id, 2);

    dispatch(Frame::InitAck, &mut host_state, &mut host_store);
    assert!(host_state.init_acknowledged);
}

#[test]
fn a_data_frame_round_trips_the_wire_and_dispatches_idempotently() {
    let record = InsertRecord::new_leaf(7, 0, 0, 1, 'h' as u32);
    let wire_bytes = Frame::Data(record.clone()).encode();

    let (decoded, consumed) = Frame::decode(&wire_bytes).unwrap();
    assert_eq!(consumed, wire_bytes.len());

    let mut state = TransportState::joiner();
    let mut store = InsertStore::new();
    dispatch(decoded.clone(), &mut state, &mut store);
    dispatch(decoded, &mut state, &mut store);

    assert_eq!(store.len(), 1);
    assert_eq!(store.find(7), Some(&record));
}

#[test]
fn a_frame_with_corrupted_crc_is_dropped_silently_without_disturbing_state() {
    // Spec §8 scenario 6: a frame with the wrong CRC is dropped; author_id
    // (and, by extension, every other piece of session state) is
    // unchanged.
    let mut bytes = Frame::Init { id_start: 1025, id_end: 20_048 }.encode();
    *bytes.last_mut().unwrap() ^= 0x01;

    let mut state = TransportState::joiner();
    match Frame::decode(&bytes) {
        Err(WireError::CrcMismatch { .. }) => {}
        other => panic!("expected CrcMismatch, got {other:?}"),
    }
    assert_eq!(state.author_id, 0, "corrupted frame must never be dispatched");
}

#[test]
fn ack_clears_the_resend_queue_entry_for_that_insert() {
    let mut state = TransportState::host();
    let mut store = InsertStore::new();
    let mut resend = duopad_wire::ResendQueue::new();

    resend.enqueue(42);
    let effects = dispatch(Frame::Ack { self_id: 42 }, &mut state, &mut store);
    for effect in effects {
        if let Effect::Acknowledge(id) = effect {
            resend.acknowledge(id);
        }
    }
    assert!(resend.is_empty());
}
