//! Full-document persistence: saving and restoring `pads/<name>` (spec §6).
//!
//! The file format is the raw concatenation of per-insert payloads with no
//! frame headers and no CRC — the same layout `serialize_insert`/
//! `deserialize_insert` use inside a `data` frame, just without the tag or
//! checksum, exactly as `original_source/main.c`'s `save_document` writes
//! it.

use std::fs;
use std::path::{Path, PathBuf};

use duopad_core::InsertStore;
use duopad_wire::{deserialize_insert, serialize_insert};

use crate::error::NetError;

/// Build the path a pad named `pad_name` is saved to/restored from:
/// `<pads_dir>/<pad_name>`.
pub fn pad_path(pads_dir: &Path, pad_name: &str) -> PathBuf {
    pads_dir.join(pad_name)
}

/// Serialize every insert in `store` (in first-seen order) and write the
/// concatenation to `path`, creating parent directories as needed.
pub fn save_document(path: &Path, store: &InsertStore) -> Result<(), NetError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| NetError::Persist {
            path: path.display().to_string(),
            source,
        })?;
    }
    let mut bytes = Vec::new();
    for record in store.all() {
        bytes.extend_from_slice(&serialize_insert(record));
    }
    fs::write(path, &bytes).map_err(|source| NetError::Persist {
        path: path.display().to_string(),
        source,
    })
}

/// Load a previously saved pad file back into an [`InsertStore`]. Each
/// insert is upserted in file order, same as they'd arrive over the wire.
pub fn load_document(path: &Path) -> Result<InsertStore, NetError> {
    let bytes = fs::read(path).map_err(|source| NetError::Persist {
        path: path.display().to_string(),
        source,
    })?;
    let mut store = InsertStore::new();
    let mut offset = 0;
    while offset < bytes.len() {
        match deserialize_insert(&bytes[offset..]) {
            Some((record, consumed)) => {
                store.upsert(record);
                offset += consumed;
            }
            None => break,
        }
    }
    Ok(store)
}
