use duopad_core::base85::{decode_u32, encode_u32, ENCODED_LEN};
use duopad_core::crc::{crc8, decode_nibbles, encode_nibbles};
use duopad_core::InsertRecord;

use crate::error::WireError;

/// `inrq`: joiner→host, empty payload, no CRC. "Please send me my ID range."
pub const INRQ_TAG: [u8; 4] = *b"inrq";
/// `Init`: host→joiner, `id_start`(5B)·`id_end`(5B), CRC present.
pub const INIT_TAG: [u8; 4] = *b"Init";
/// `acki`: joiner→host, empty payload, no CRC. "Init received."
pub const ACKI_TAG: [u8; 4] = *b"acki";
/// `data`: either direction, a serialized insert, CRC present.
pub const DATA_TAG: [u8; 4] = *b"data";
/// `ack `: either direction, `self_id`(5B), no CRC.
pub const ACK_TAG: [u8; 4] = *b"ack ";

/// A decoded wire frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    /// `inrq` — request for an ID range.
    InitRequest,
    /// `Init` — here is your ID range.
    Init {
        /// Lower bound of the allocated range.
        id_start: u32,
        /// Upper bound of the allocated range.
        id_end: u32,
    },
    /// `acki` — the `Init` frame was received.
    InitAck,
    /// `data` — an insert record, to be upserted idempotently.
    Data(InsertRecord),
    /// `ack ` — acknowledgment of a previously sent insert.
    Ack {
        /// The `self_id` being acknowledged.
        self_id: u32,
    },
}

impl Frame {
    /// Encode this frame as a complete, length-prefixed wire message.
    pub fn encode(&self) -> Vec<u8> {
        let (tag, payload, with_crc) = match self {
            Frame::InitRequest => (INRQ_TAG, Vec::new(), false),
            Frame::Init { id_start, id_end } => {
                let mut p = Vec::with_capacity(10);
                p.extend_from_slice(&encode_u32(*id_start));
                p.extend_from_slice(&encode_u32(*id_end));
                (INIT_TAG, p, true)
            }
            Frame::InitAck => (ACKI_TAG, Vec::new(), false),
            Frame::Data(record) => (DATA_TAG, serialize_insert(record), true),
            Frame::Ack { self_id } => {
                let mut p = Vec::with_capacity(5);
                p.extend_from_slice(&encode_u32(*self_id));
                (ACK_TAG, p, false)
            }
        };

        let mut body = Vec::with_capacity(4 + payload.len() + 2);
        body.extend_from_slice(&tag);
        body.extend_from_slice(&payload);
        if with_crc {
            let crc = crc8(&body);
            body.extend_from_slice(&encode_nibbles(crc));
        }

        let mut out = Vec::with_capacity(5 + body.len());
        out.extend_from_slice(&encode_u32(body.len() as u32));
        out.extend_from_slice(&body);
        out
    }

    /// Decode one frame from the front of `bytes`.
    ///
    /// Returns the frame and the number of bytes it consumed. `bytes` may
    /// contain more than one frame (or a partial one); only the prefix
    /// named by the length field is consulted.
    pub fn decode(bytes: &[u8]) -> Result<(Frame, usize), WireError> {
        if bytes.len() < ENCODED_LEN {
            return Err(WireError::TooShortForLength);
        }
        let mut len_bytes = [0u8; ENCODED_LEN];
        len_bytes.copy_from_slice(&bytes[..ENCODED_LEN]);
        let body_len = decode_u32(&len_bytes) as usize;

        let total = ENCODED_LEN + body_len;
        if bytes.len() < total {
            return Err(WireError::Truncated {
                expected: total,
                available: bytes.len(),
            });
        }
        let body = &bytes[ENCODED_LEN..total];
        if body.len() < 4 {
            return Err(WireError::MissingTag);
        }
        let mut tag = [0u8; 4];
        tag.copy_from_slice(&body[..4]);
        let rest = &body[4..];

        let frame = match tag {
            INRQ_TAG => Frame::InitRequest,
            ACKI_TAG => Frame::InitAck,
            INIT_TAG => {
                let (payload, crc_bytes) = split_crc(rest, tag)?;
                verify_crc(tag, &body[..4 + payload.len()], crc_bytes)?;
                if payload.len() != 10 {
                    return Err(WireError::BadPayloadLength { tag });
                }
                let id_start = decode_u32(&slice5(payload, 0));
                let id_end = decode_u32(&slice5(payload, 5));
                Frame::Init { id_start, id_end }
            }
            DATA_TAG => {
                let (payload, crc_bytes) = split_crc(rest, tag)?;
                verify_crc(tag, &body[..4 + payload.len()], crc_bytes)?;
                let (record, consumed) = deserialize_insert(payload)
                    .ok_or(WireError::BadPayloadLength { tag })?;
                if consumed != payload.len() {
                    return Err(WireError::BadPayloadLength { tag });
                }
                Frame::Data(record)
            }
            ACK_TAG => {
                if rest.len() != 5 {
                    return Err(WireError::BadPayloadLength { tag });
                }
                Frame::Ack {
                    self_id: decode_u32(&slice5(rest, 0)),
                }
            }
            other => return Err(WireError::UnknownTag(other)),
        };

        Ok((frame, total))
    }
}

fn slice5(bytes: &[u8], at: usize) -> [u8; 5] {
    let mut out = [0u8; 5];
    out.copy_from_slice(&bytes[at..at + 5]);
    out
}

fn split_crc(rest: &[u8], tag: [u8; 4]) -> Result<(&[u8], [u8; 2]), WireError> {
    if rest.len() < 2 {
        return Err(WireError::BadPayloadLength { tag });
    }
    let (payload, crc_bytes) = rest.split_at(rest.len() - 2);
    let mut crc_arr = [0u8; 2];
    crc_arr.copy_from_slice(crc_bytes);
    Ok((payload, crc_arr))
}

fn verify_crc(tag: [u8; 4], tag_and_payload: &[u8], crc_bytes: [u8; 2]) -> Result<(), WireError> {
    let expected = decode_nibbles(crc_bytes);
    let found = crc8(tag_and_payload);
    let _ = tag;
    if expected != found {
        return Err(WireError::CrcMismatch { expected, found });
    }
    Ok(())
}

/// Serialize an insert record's payload, as used both inside a `data` frame
/// and (concatenated, headerless) for full-document persistence:
/// `self_id(5B)·parent_id(5B)·author(5B)·mix(5B)·content[length](5B each)`
/// where `mix = (char_pos << 16) | length | (lock << 31)`.
pub fn serialize_insert(record: &InsertRecord) -> Vec<u8> {
    let mut out = Vec::with_capacity(20 + record.content.len() * ENCODED_LEN);
    out.extend_from_slice(&encode_u32(record.self_id));
    out.extend_from_slice(&encode_u32(record.parent_id));
    out.extend_from_slice(&encode_u32(record.author));
    let mix = ((record.char_pos as u32) << 16)
        | (record.length as u32)
        | ((record.lock as u32) << 31);
    out.extend_from_slice(&encode_u32(mix));
    for &cp in &record.content {
        out.extend_from_slice(&encode_u32(cp));
    }
    out
}

/// Deserialize one insert payload from the front of `bytes`, returning the
/// record and the number of bytes consumed. Used for `data` frame payloads
/// and, repeatedly, to restore a full persisted document.
pub fn deserialize_insert(bytes: &[u8]) -> Option<(InsertRecord, usize)> {
    if bytes.len() < 20 {
        return None;
    }
    let self_id = decode_u32(&slice5(bytes, 0));
    let parent_id = decode_u32(&slice5(bytes, 5));
    let author = decode_u32(&slice5(bytes, 10));
    let mix = decode_u32(&slice5(bytes, 15));
    let char_pos = ((mix >> 16) & 0xFFFF) as u16;
    let length = (mix & 0xFFFF) as u16;
    let lock = ((mix >> 31) & 1) != 0;

    let content_bytes = length as usize * ENCODED_LEN;
    let total = 20 + content_bytes;
    if bytes.len() < total {
        return None;
    }
    let mut content = Vec::with_capacity(length as usize);
    for i in 0..length as usize {
        content.push(decode_u32(&slice5(bytes, 20 + i * ENCODED_LEN)));
    }

    Some((
        InsertRecord {
            self_id,
            parent_id,
            char_pos,
            author,
            lock,
            length,
            content,
        },
        total,
    ))
}
