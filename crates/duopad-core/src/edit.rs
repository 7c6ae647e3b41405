use crate::buffer::UiBuffer;
use crate::error::CoreError;
use crate::id_range::IdRange;
use crate::insert::{InsertRecord, DEL};
use crate::render::RenderedView;
use crate::store::InsertStore;

const MAX_INSERT_LENGTH: u16 = 255;

/// Type an `letter` at `buffer.cursor` against `view` (the view rendered
/// before this edit), mutating `store` and `buffer` in place.
///
/// Returns the `self_id` of the insert that changed — either a freshly
/// allocated leaf or the active insert that was extended — so the caller
/// can serialize and send it as a `data` frame and enqueue it for resend.
///
/// This honors the active-insert optimization: consecutive keystrokes typed
/// at the tail of the same insert extend it in place rather than each
/// allocating a new one. That's purely a bandwidth optimization — emitting
/// a fresh insert per keystroke would still be correct — so it is only
/// taken when the active insert is still short enough and the cursor is
/// still sitting right after its last character.
pub fn insert_letter(
    store: &mut InsertStore,
    buffer: &mut UiBuffer,
    view: &RenderedView,
    ids: &mut IdRange,
    author: u32,
    letter: char,
) -> Result<u32, CoreError> {
    let c = buffer.cursor;
    let code_point = letter as u32;

    if buffer.active_insert_id != 0 {
        if let Some(active) = store.find(buffer.active_insert_id) {
            let at_tail = c > 0
                && view.id_table.get(c - 1) == Some(&active.self_id)
                && view.char_pos_table.get(c - 1) == Some(&(active.length - 1));
            if active.length < MAX_INSERT_LENGTH && at_tail {
                let id = active.self_id;
                let new_pos = active.length;
                let mut grown = active.clone();
                grown.content.push(code_point);
                grown.length += 1;
                store.upsert(grown);
                buffer.set_update_hint(id, new_pos);
                return Ok(id);
            }
        }
        buffer.clear_active_insert();
    }

    let (parent_id, char_pos) = if store.is_empty() || view.text.is_empty() {
        (0u32, 0u16)
    } else if c == 0 {
        (view.id_table[0], view.char_pos_table[0])
    } else if c == view.text.len() {
        (view.id_table[c - 1], view.char_pos_table[c - 1] + 1)
    } else {
        let left_id = view.id_table[c - 1];
        let right_id = view.id_table[c];
        if store.is_ancestor_id(left_id, right_id) {
            (right_id, view.char_pos_table[c])
        } else {
            (left_id, view.char_pos_table[c - 1] + 1)
        }
    };

    let self_id = ids.allocate()?;
    let record = InsertRecord::new_leaf(self_id, parent_id, char_pos, author, code_point);
    store.upsert(record);
    buffer.active_insert_id = self_id;
    buffer.set_update_hint(self_id, 0);
    Ok(self_id)
}

/// Delete the character rendered at `buffer.cursor` in `view`.
///
/// Returns the `self_id` of the insert that changed, or `None` if the
/// cursor is at the end of the document (nothing to delete). Like
/// [`insert_letter`], the caller is responsible for serializing and sending
/// the result as a `data` frame.
pub fn delete_letter(
    store: &mut InsertStore,
    buffer: &mut UiBuffer,
    view: &RenderedView,
    author: u32,
) -> Option<u32> {
    let _ = author; // deletion doesn't change the owning author of a cell.
    let c = buffer.cursor;
    if c >= view.text.len() {
        return None;
    }
    let id = view.id_table[c];
    let pos = view.char_pos_table[c] as usize;
    let mut record = store.find(id)?.clone();
    record.content[pos] = DEL;
    store.upsert(record);
    buffer.clear_active_insert();
    Some(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::render;

    fn setup() -> (InsertStore, UiBuffer, IdRange) {
        (InsertStore::new(), UiBuffer::new(), IdRange::new(1, 1024))
    }

    fn text_of(store: &InsertStore) -> alloc::string::String {
        render(store).text.iter().collect()
    }

    #[test]
    fn typing_hello_produces_one_insert() {
        let (mut store, mut buffer, mut ids) = setup();
        for ch in "hello".chars() {
            let view = render(&store);
            insert_letter(&mut store, &mut buffer, &view, &mut ids, 1, ch).unwrap();
            buffer.reanchor(&render(&store), 0, 0);
        }
        assert_eq!(store.len(), 1);
        assert_eq!(text_of(&store), "hello");
    }

    #[test]
    fn typing_then_deleting_first_l_produces_helo() {
        let (mut store, mut buffer, mut ids) = setup();
        for ch in "hello".chars() {
            let view = render(&store);
            insert_letter(&mut store, &mut buffer, &view, &mut ids, 1, ch).unwrap();
            let after = render(&store);
            buffer.reanchor(&after, 0, 0);
        }
        buffer.cursor = 2; // first 'l'
        let view = render(&store);
        delete_letter(&mut store, &mut buffer, &view, 1).unwrap();
        assert_eq!(text_of(&store), "helo");
    }

    #[test]
    fn typing_deleting_then_typing_again_does_not_panic_on_empty_view() {
        // The store holds a tombstoned insert (non-empty), but the rendered
        // view is empty, so the `c == 0` anchor branch must not index into
        // an empty `view.id_table`.
        let (mut store, mut buffer, mut ids) = setup();
        let view = RenderedView::default();
        insert_letter(&mut store, &mut buffer, &view, &mut ids, 1, 'a').unwrap();
        let after = render(&store);
        buffer.reanchor(&after, 0, 0);

        let view = render(&store);
        delete_letter(&mut store, &mut buffer, &view, 1).unwrap();
        let after = render(&store);
        buffer.reanchor(&after, 0, 0);
        assert!(store.len() == 1 && text_of(&store).is_empty());

        let view = render(&store);
        insert_letter(&mut store, &mut buffer, &view, &mut ids, 1, 'b').unwrap();
        assert_eq!(text_of(&store), "b");
    }

    #[test]
    fn typing_ab_then_inserting_x_between_produces_axb() {
        let (mut store, mut buffer, mut ids) = setup();
        let view = RenderedView::default();
        insert_letter(&mut store, &mut buffer, &view, &mut ids, 1, 'a').unwrap();
        let view = render(&store);
        buffer.reanchor(&view, 0, 0);
        let view = render(&store);
        insert_letter(&mut store, &mut buffer, &view, &mut ids, 1, 'b').unwrap();
        let view = render(&store);
        buffer.reanchor(&view, 0, 0);

        // simulate arrow-left: move cursor from 2 to 1, clear active insert
        buffer.cursor = 1;
        buffer.clear_active_insert();

        let view = render(&store);
        insert_letter(&mut store, &mut buffer, &view, &mut ids, 1, 'X').unwrap();

        assert_eq!(text_of(&store), "aXb");
    }

    #[test]
    fn two_peers_typing_at_cursor_zero_concurrently_converge() {
        let mut store_a = InsertStore::new();
        let mut buffer_a = UiBuffer::new();
        let mut ids_a = IdRange::new(1, 1024);
        let view_a = RenderedView::default();
        insert_letter(&mut store_a, &mut buffer_a, &view_a, &mut ids_a, 1, 'P').unwrap();

        let mut store_b = InsertStore::new();
        let mut buffer_b = UiBuffer::new();
        let mut ids_b = IdRange::new(1025, 20048);
        let view_b = RenderedView::default();
        insert_letter(&mut store_b, &mut buffer_b, &view_b, &mut ids_b, 2, 'Q').unwrap();

        // exchange: each peer learns the other's insert
        for rec in store_b.all() {
            store_a.upsert(rec.clone());
        }
        for rec in store_a.all() {
            store_b.upsert(rec.clone());
        }
        // re-merge so both sides have the union
        let union: alloc::vec::Vec<_> = store_a.all().cloned().collect();
        for rec in union {
            store_b.upsert(rec);
        }

        assert_eq!(text_of(&store_a), "PQ");
        assert_eq!(text_of(&store_b), "PQ");
    }

    #[test]
    fn active_insert_extends_on_consecutive_typing() {
        let (mut store, mut buffer, mut ids) = setup();
        let view = RenderedView::default();
        insert_letter(&mut store, &mut buffer, &view, &mut ids, 1, 'h').unwrap();
        let view = render(&store);
        buffer.reanchor(&view, 0, 0);

        let view = render(&store);
        insert_letter(&mut store, &mut buffer, &view, &mut ids, 1, 'i').unwrap();

        assert_eq!(store.len(), 1, "consecutive typing should extend one insert");
        assert_eq!(text_of(&store), "hi");
    }

    #[test]
    fn delete_beyond_text_length_is_a_no_op() {
        let (mut store, mut buffer, mut ids) = setup();
        let view = RenderedView::default();
        insert_letter(&mut store, &mut buffer, &view, &mut ids, 1, 'a').unwrap();
        buffer.cursor = 5;
        let view = render(&store);
        assert!(delete_letter(&mut store, &mut buffer, &view, 1).is_none());
    }
}
