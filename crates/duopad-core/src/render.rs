use alloc::vec::Vec;

use crate::insert::DEL;
use crate::store::InsertStore;

/// The derived, rebuilt-on-demand view of the document: a flat sequence of
/// rendered characters plus, for each one, the insert it came from.
///
/// `text`, `id_table`, `char_pos_table`, and `author_table` are always the
/// same length (invariant 3 of the testable properties).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderedView {
    /// The ordered sequence of non-tombstoned code points, as `char`s.
    pub text: Vec<char>,
    /// For each rendered character, the `self_id` of the owning insert.
    pub id_table: Vec<u32>,
    /// For each rendered character, its index within the owning insert's
    /// `content`.
    pub char_pos_table: Vec<u16>,
    /// For each rendered character, the author of the owning insert.
    pub author_table: Vec<u32>,
}

impl RenderedView {
    fn push(&mut self, code_point: u32, id: u32, pos: u16, author: u32) {
        let ch = char::from_u32(code_point).unwrap_or('\u{FFFD}');
        self.text.push(ch);
        self.id_table.push(id);
        self.char_pos_table.push(pos);
        self.author_table.push(author);
    }
}

/// Render the insert store into a deterministic, totally ordered character
/// sequence.
///
/// This is a depth-first, preorder traversal of the tree whose edges are
/// `(parent, position)` sites and whose children at a site are ordered by
/// `self_id`. Every peer that has observed the same set of inserts (with
/// the same highest-length version of each) produces byte-identical output,
/// regardless of delivery order — the convergence property.
pub fn render(store: &InsertStore) -> RenderedView {
    let mut view = RenderedView::default();
    render_site(store, 0, 0, &mut view);
    view
}

fn render_site(store: &InsertStore, parent_id: u32, char_pos: u16, view: &mut RenderedView) {
    for insert in store.children_at(parent_id, char_pos) {
        for pos in 0..insert.length {
            render_site(store, insert.self_id, pos, view);
            if let Some(&code_point) = insert.content.get(pos as usize) {
                if code_point != DEL {
                    view.push(code_point, insert.self_id, pos, insert.author);
                }
            }
        }
        render_site(store, insert.self_id, insert.length, view);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::insert::InsertRecord;

    fn leaf(id: u32, parent: u32, pos: u16, content: &str, author: u32) -> InsertRecord {
        InsertRecord {
            self_id: id,
            parent_id: parent,
            char_pos: pos,
            author,
            lock: false,
            length: content.chars().count() as u16,
            content: content.chars().map(|c| c as u32).collect(),
        }
    }

    #[test]
    fn empty_store_renders_empty() {
        let store = InsertStore::new();
        let view = render(&store);
        assert!(view.text.is_empty());
    }

    #[test]
    fn single_insert_renders_in_order() {
        let mut store = InsertStore::new();
        store.upsert(leaf(1, 0, 0, "hello", 1));
        let view = render(&store);
        assert_eq!(view.text.iter().collect::<alloc::string::String>(), "hello");
        assert_eq!(view.id_table, alloc::vec![1, 1, 1, 1, 1]);
        assert_eq!(view.char_pos_table, alloc::vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn tombstoned_position_is_omitted() {
        let mut store = InsertStore::new();
        let mut rec = leaf(1, 0, 0, "hello", 1);
        rec.content[2] = DEL; // delete the first 'l'
        store.upsert(rec);
        let view = render(&store);
        assert_eq!(view.text.iter().collect::<alloc::string::String>(), "helo");
    }

    #[test]
    fn insert_between_two_characters_nests_at_the_right_site() {
        let mut store = InsertStore::new();
        store.upsert(leaf(1, 0, 0, "ab", 1));
        // Inserted between 'a' and 'b': anchored at (1, 1).
        store.upsert(leaf(2, 1, 1, "X", 1));
        let view = render(&store);
        assert_eq!(view.text.iter().collect::<alloc::string::String>(), "aXb");
    }

    #[test]
    fn concurrent_inserts_at_same_site_order_by_self_id() {
        let mut store = InsertStore::new();
        store.upsert(leaf(2048, 0, 0, "Q", 2)); // peer 2's range, higher id
        store.upsert(leaf(1, 0, 0, "P", 1)); // peer 1's range, lower id
        let view = render(&store);
        assert_eq!(view.text.iter().collect::<alloc::string::String>(), "PQ");
    }

    #[test]
    fn dangling_parent_subtree_is_silently_omitted() {
        let mut store = InsertStore::new();
        store.upsert(leaf(1, 0, 0, "ab", 1));
        // Anchored into an insert (99) that never arrives.
        store.upsert(leaf(2, 99, 0, "X", 1));
        let view = render(&store);
        assert_eq!(view.text.iter().collect::<alloc::string::String>(), "ab");
    }

    #[test]
    fn insert_then_delete_converges_to_empty_regardless_of_order() {
        let insert = leaf(1, 0, 0, "a", 1);
        let mut deleted = insert.clone();
        deleted.content[0] = DEL;

        let mut forward = InsertStore::new();
        forward.upsert(insert.clone());
        forward.upsert(deleted.clone());

        let mut backward = InsertStore::new();
        backward.upsert(deleted);
        backward.upsert(insert);

        assert_eq!(render(&forward).text, render(&backward).text);
        assert!(render(&forward).text.is_empty());
    }
}
