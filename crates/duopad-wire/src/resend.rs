/// Sentinel marking a blanked (acknowledged) slot in the resend queue.
const EMPTY_SLOT: u32 = 0;

/// The set of `self_id`s whose `data` frames have not yet been
/// acknowledged.
///
/// Mirrors the reference implementation's `send_queue`/
/// `send_queue_free_slots` pair: acknowledged slots are blanked to
/// `self_id == 0` and recycled via a free-list rather than shifting the
/// rest of the queue down, so acknowledging an insert is O(1) instead of
/// O(n).
#[derive(Debug, Clone, Default)]
pub struct ResendQueue {
    slots: Vec<u32>,
    free_slots: Vec<usize>,
}

impl ResendQueue {
    /// An empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueue `self_id` for resending, unless it's already present.
    pub fn enqueue(&mut self, self_id: u32) {
        debug_assert_ne!(self_id, EMPTY_SLOT, "self_id 0 is reserved for blanked slots");
        if self.slots.iter().any(|&s| s == self_id) {
            return;
        }
        if let Some(slot) = self.free_slots.pop() {
            self.slots[slot] = self_id;
        } else {
            self.slots.push(self_id);
        }
    }

    /// Acknowledge `self_id`: blank its slot and return it to the free
    /// list. A no-op if `self_id` wasn't enqueued.
    pub fn acknowledge(&mut self, self_id: u32) {
        if let Some(index) = self.slots.iter().position(|&s| s == self_id) {
            self.slots[index] = EMPTY_SLOT;
            self.free_slots.push(index);
        }
    }

    /// Iterate the `self_id`s still awaiting acknowledgment, skipping
    /// blanked slots.
    pub fn pending(&self) -> impl Iterator<Item = u32> + '_ {
        self.slots.iter().copied().filter(|&s| s != EMPTY_SLOT)
    }

    /// `true` if nothing is awaiting acknowledgment.
    pub fn is_empty(&self) -> bool {
        self.pending().next().is_none()
    }
}
