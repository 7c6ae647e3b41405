//! Integration tests verifying the CRDT convergence property (spec §8):
//! for any interleaving of deliveries where two peers eventually observe
//! the same set of insert records, rendering them produces identical text.

use duopad_core::prelude::*;

fn text_of(store: &InsertStore) -> String {
    render(store).text.iter().collect()
}

fn exchange(a: &mut InsertStore, b: &mut InsertStore) {
    let from_b: Vec<_> = b.all().cloned().collect();
    for rec in from_b {
        a.upsert(rec);
    }
    let from_a: Vec<_> = a.all().cloned().collect();
    for rec in from_a {
        b.upsert(rec);
    }
}

#[test]
fn two_peers_converge_regardless_of_delivery_order() {
    let mut a = InsertStore::new();
    let mut ba = UiBuffer::new();
    let mut ids_a = IdRange::new(1, 1024);

    let mut b = InsertStore::new();
    let mut bb = UiBuffer::new();
    let mut ids_b = IdRange::new(1025, 20048);

    for ch in "abc".chars() {
        let view = render(&a);
        insert_letter(&mut a, &mut ba, &view, &mut ids_a, 1, ch).unwrap();
        ba.reanchor(&render(&a), 0, 0);
    }
    for ch in "xyz".chars() {
        let view = render(&b);
        insert_letter(&mut b, &mut bb, &view, &mut ids_b, 2, ch).unwrap();
        bb.reanchor(&render(&b), 0, 0);
    }

    exchange(&mut a, &mut b);
    exchange(&mut b, &mut a); // re-merge so both sides have the full union

    assert_eq!(text_of(&a), text_of(&b));
}

#[test]
fn insert_then_delete_converges_to_empty_under_any_delivery_order() {
    let insert = InsertRecord::new_leaf(1, 0, 0, 1, 'a' as u32);
    let mut deleted = insert.clone();
    deleted.content[0] = DEL;

    let mut forward = InsertStore::new();
    forward.upsert(insert.clone());
    forward.upsert(deleted.clone());

    let mut backward = InsertStore::new();
    backward.upsert(deleted.clone());
    backward.upsert(insert.clone());

    let mut interleaved_growth_first = InsertStore::new();
    interleaved_growth_first.upsert(deleted);
    interleaved_growth_first.upsert(insert);

    assert_eq!(text_of(&forward), "");
    assert_eq!(text_of(&backward), "");
    assert_eq!(text_of(&interleaved_growth_first), "");
}

#[test]
fn concurrent_typing_at_cursor_zero_orders_by_author_range() {
    let mut a = InsertStore::new();
    let mut ba = UiBuffer::new();
    let mut ids_a = IdRange::new(1, 1024);
    insert_letter(&mut a, &mut ba, &RenderedView::default(), &mut ids_a, 1, 'P').unwrap();

    let mut b = InsertStore::new();
    let mut bb = UiBuffer::new();
    let mut ids_b = IdRange::new(1025, 20048);
    insert_letter(&mut b, &mut bb, &RenderedView::default(), &mut ids_b, 2, 'Q').unwrap();

    exchange(&mut a, &mut b);

    assert_eq!(text_of(&a), "PQ");
    assert_eq!(text_of(&b), "PQ");
}

#[test]
fn out_of_order_merge_of_a_growing_insert_still_converges() {
    // Peer creates "h", then grows it to "hi", then "hi!" — simulate the
    // updates arriving at a second peer in a scrambled order.
    let v1 = InsertRecord::new_leaf(1, 0, 0, 1, 'h' as u32);
    let mut v2 = v1.clone();
    v2.length = 2;
    v2.content.push('i' as u32);
    let mut v3 = v2.clone();
    v3.length = 3;
    v3.content.push('!' as u32);

    let mut scrambled = InsertStore::new();
    scrambled.upsert(v2.clone());
    scrambled.upsert(v3.clone());
    scrambled.upsert(v1.clone());

    let mut ordered = InsertStore::new();
    ordered.upsert(v1);
    ordered.upsert(v2);
    ordered.upsert(v3);

    assert_eq!(text_of(&scrambled), text_of(&ordered));
    assert_eq!(text_of(&ordered), "hi!");
}
