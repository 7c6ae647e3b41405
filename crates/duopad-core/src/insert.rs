use alloc::vec::Vec;

/// Sentinel code point marking a tombstoned (deleted) content position.
pub const DEL: u32 = 127;

/// The atomic CRDT operation: a contiguous run of code points anchored at a
/// `(parent_id, char_pos)` site.
///
/// `self_id` is immutable once allocated; every other field may be rewritten
/// by [`InsertRecord::merge`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InsertRecord {
    /// Globally unique, monotonically increasing within the owning peer's
    /// allocated ID range. `0` is reserved for the document root and never
    /// allocated to a real insert.
    pub self_id: u32,
    /// `0` denotes the document root; otherwise the `self_id` of the insert
    /// this one is anchored into.
    pub parent_id: u32,
    /// Index within the parent's content, in `[0, parent.length]`.
    pub char_pos: u16,
    /// Identifies the originating peer.
    pub author: u32,
    /// Reserved; currently always `false`.
    pub lock: bool,
    /// Number of code points in `content`. Never decreases for a given
    /// `self_id` once inserts have been merged (see [`InsertRecord::merge`]).
    pub length: u16,
    /// Code points, `length` in count. [`DEL`] marks a tombstoned position.
    pub content: Vec<u32>,
}

impl InsertRecord {
    /// Build a fresh single-character insert, as the edit mapper does when
    /// opening a new insert for a keystroke.
    pub fn new_leaf(self_id: u32, parent_id: u32, char_pos: u16, author: u32, letter: u32) -> Self {
        InsertRecord {
            self_id,
            parent_id,
            char_pos,
            author,
            lock: false,
            length: 1,
            content: alloc::vec![letter],
        }
    }

    /// `true` if `content[pos]` is tombstoned. Out-of-range positions are
    /// never tombstoned.
    pub fn is_deleted_at(&self, pos: usize) -> bool {
        self.content.get(pos).is_some_and(|&c| c == DEL)
    }

    /// Apply the spec's merge rule for two versions of the same `self_id`.
    ///
    /// If `new.length >= self.length`, `self` becomes `new` with every
    /// position tombstoned in the old version forced tombstoned in the new
    /// one. Otherwise `new` is a stale delta: `self` is kept, but any
    /// position tombstoned in `new` is fused into `self` (tombstones are
    /// sticky and must survive even when a shorter, older update arrives
    /// out of order). This is commutative and idempotent over repeated
    /// delivery of the same set of updates.
    pub fn merge(&mut self, new: InsertRecord) {
        if new.length >= self.length {
            let old_len = self.length as usize;
            let old_content = core::mem::take(&mut self.content);
            let mut merged = new;
            for i in 0..old_len {
                if old_content.get(i).copied() == Some(DEL) {
                    if let Some(slot) = merged.content.get_mut(i) {
                        *slot = DEL;
                    }
                }
            }
            *self = merged;
        } else {
            let new_len = new.length as usize;
            for i in 0..new_len {
                if new.content.get(i).copied() == Some(DEL) {
                    if let Some(slot) = self.content.get_mut(i) {
                        *slot = DEL;
                    }
                }
            }
        }
    }
}
