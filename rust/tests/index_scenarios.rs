use bplustree_index::{BPlusTreeError, BPlusTreeIndex, NodeKind, RecordIndex, RecordRef};

fn record(key: i64) -> RecordRef {
    RecordRef::new(key as u64 * 10 + 1)
}

fn filled(capacity: usize, keys: impl IntoIterator<Item = i64>) -> RecordIndex {
    let mut index = RecordIndex::new(capacity).unwrap();
    for key in keys {
        index.insert(key, record(key)).unwrap();
    }
    index
}

fn assert_single_empty_leaf(index: &RecordIndex) {
    assert!(index.is_empty());
    assert!(index.is_leaf_root());
    assert_eq!(index.count_nodes_in_tree(), (1, 0));
    assert_eq!(index.allocated_node_count(), 1);
    assert_eq!(index.dump(), RecordIndex::new(index.capacity()).unwrap().dump());
}

fn ascending_insert(capacity: usize) {
    let mut index = RecordIndex::new(capacity).unwrap();
    let mut height = index.height();
    for key in 0..100 {
        index.insert(key, record(key)).unwrap();
        index.check_invariants_detailed().unwrap();
        assert!(index.height() >= height, "height shrank inserting {}", key);
        height = index.height();
    }

    let keys: Vec<i64> = index.keys().copied().collect();
    assert_eq!(keys, (0..100).collect::<Vec<_>>());
    let dumped: Vec<i64> = index.dump().leaf_keys().into_iter().copied().collect();
    assert_eq!(dumped, keys);
    for key in 0..100 {
        assert_eq!(index.get(&key), Some(&record(key)));
    }
}

fn descending_delete(capacity: usize) {
    let mut index = filled(capacity, 0..100);
    for key in (0..100).rev() {
        index.delete(&key, &record(key)).unwrap();
        index.check_invariants_detailed().unwrap();
        assert_eq!(index.len(), key as usize);
        assert!(!index.contains_key(&key));
    }
    assert_single_empty_leaf(&index);
}

fn ascending_delete(capacity: usize) {
    let mut index = filled(capacity, 0..100);
    for key in 0..100 {
        index.delete(&key, &record(key)).unwrap();
        index.check_invariants_detailed().unwrap();
        let remaining: Vec<i64> = index.keys().copied().collect();
        assert_eq!(remaining, (key + 1..100).collect::<Vec<_>>());
    }
    assert_single_empty_leaf(&index);
}

fn interleaved_delete_and_reinsert(capacity: usize) {
    let mut index = filled(capacity, 0..200);
    for key in (0..200).filter(|k| k % 2 == 1) {
        index.delete(&key, &record(key)).unwrap();
    }
    index.check_invariants_detailed().unwrap();
    assert_eq!(index.len(), 100);

    for key in (0..200).filter(|k| k % 2 == 1).rev() {
        index.insert(key, record(key)).unwrap();
    }
    index.check_invariants_detailed().unwrap();
    let keys: Vec<i64> = index.keys().copied().collect();
    assert_eq!(keys, (0..200).collect::<Vec<_>>());
}

fn lookup_is_idempotent(capacity: usize) {
    let index = filled(capacity, (0..100).map(|k| k * 3));
    for probe in -5..305 {
        let first = index.lookup_leaf(&probe);
        let second = index.lookup_leaf(&probe);
        assert_eq!(first.id(), second.id());
        assert_eq!(first.keys(), second.keys());
        assert_eq!(first.contains_key(&probe), probe % 3 == 0 && (0..300).contains(&probe));
    }
}

macro_rules! capacity_scenarios {
    ($($capacity:literal),* $(,)?) => {
        $(
            paste::paste! {
                #[test]
                fn [<ascending_insert_m $capacity>]() {
                    ascending_insert($capacity);
                }

                #[test]
                fn [<descending_delete_m $capacity>]() {
                    descending_delete($capacity);
                }

                #[test]
                fn [<ascending_delete_m $capacity>]() {
                    ascending_delete($capacity);
                }

                #[test]
                fn [<interleaved_delete_and_reinsert_m $capacity>]() {
                    interleaved_delete_and_reinsert($capacity);
                }

                #[test]
                fn [<lookup_is_idempotent_m $capacity>]() {
                    lookup_is_idempotent($capacity);
                }
            }
        )*
    };
}

capacity_scenarios!(3, 4, 5, 6, 7, 8, 16);

#[test]
fn two_entry_root_leaf_drains_without_siblings() {
    let mut index = filled(4, [10, 20]);
    index.delete(&20, &record(20)).unwrap();
    assert!(index.is_leaf_root());
    index.delete(&10, &record(10)).unwrap();
    assert_single_empty_leaf(&index);
}

#[test]
fn minimum_capacity_is_enforced() {
    for capacity in 0..3 {
        let err = RecordIndex::new(capacity).unwrap_err();
        assert!(err.is_capacity_error());
    }
    assert!(RecordIndex::new(3).is_ok());
}

#[test]
fn delete_of_absent_pair_reports_and_keeps_tree() {
    let mut index = filled(4, 0..50);
    let before = index.dump();

    assert!(matches!(
        index.delete(&50, &record(50)),
        Err(BPlusTreeError::ValueNotFound(_))
    ));
    assert!(matches!(
        index.delete(&10, &record(11)),
        Err(BPlusTreeError::ValueNotFound(_))
    ));
    assert_eq!(index.dump(), before);
    assert_eq!(index.len(), 50);
}

#[test]
fn duplicate_keys_are_deleted_individually() {
    let mut index = RecordIndex::new(4).unwrap();
    index.insert(5, RecordRef::new(1)).unwrap();
    index.insert(5, RecordRef::new(2)).unwrap();
    index.insert(1, RecordRef::new(3)).unwrap();

    assert_eq!(index.len(), 3);
    assert!(index.contains(&5, &RecordRef::new(1)));
    assert!(index.contains(&5, &RecordRef::new(2)));

    index.delete(&5, &RecordRef::new(1)).unwrap();
    assert!(!index.contains(&5, &RecordRef::new(1)));
    assert_eq!(index.get(&5), Some(&RecordRef::new(2)));

    index.delete(&5, &RecordRef::new(2)).unwrap();
    assert!(!index.contains_key(&5));
    assert_eq!(index.len(), 1);
}

#[test]
fn duplicates_split_across_leaves_hide_the_lower_copies() {
    let mut index = RecordIndex::new(4).unwrap();
    for value in 1..=5 {
        index.insert(7, RecordRef::new(value)).unwrap();
    }

    // Each copy lands in front of the earlier ones, so the split leaves the
    // newest two on the left of separator 7.
    let before = index.dump();
    assert_eq!(before.to_string(), "[7]\n[7 7] [7 7 7]");
    assert_eq!(index.len(), 5);
    let stored: Vec<Vec<u64>> = index
        .leaves()
        .map(|leaf| leaf.values().iter().map(|r| r.get()).collect())
        .collect();
    assert_eq!(stored, vec![vec![5, 4], vec![3, 2, 1]]);

    // Lookup routes an equal key right, past the lower leaf
    for value in 1..=3 {
        assert!(index.contains(&7, &RecordRef::new(value)));
    }
    for value in 4..=5 {
        assert!(!index.contains(&7, &RecordRef::new(value)));
    }
    assert!(!index.check_invariants());
    assert!(matches!(
        index.check_invariants_detailed(),
        Err(BPlusTreeError::DataIntegrityError(_))
    ));

    assert!(matches!(
        index.delete(&7, &RecordRef::new(4)),
        Err(BPlusTreeError::ValueNotFound(_))
    ));
    assert_eq!(index.dump(), before);
    assert_eq!(index.len(), 5);

    // Draining the right leaf merges both halves back into one root leaf
    index.delete(&7, &RecordRef::new(3)).unwrap();
    assert_eq!(index.leaf_count(), 2);
    index.delete(&7, &RecordRef::new(2)).unwrap();
    assert!(index.is_leaf_root());
    assert!(index.check_invariants());
    assert_eq!(index.dump().to_string(), "[7 7 7]");

    index.delete(&7, &RecordRef::new(4)).unwrap();
    index.delete(&7, &RecordRef::new(5)).unwrap();
    index.delete(&7, &RecordRef::new(1)).unwrap();
    assert_single_empty_leaf(&index);
}

#[test]
fn node_limit_blocks_growth_without_corruption() {
    let mut index: BPlusTreeIndex<i64, RecordRef> =
        BPlusTreeIndex::with_node_limit(4, 3).unwrap();

    let mut inserted = 0;
    let err = loop {
        match index.insert(inserted, record(inserted)) {
            Ok(()) => inserted += 1,
            Err(err) => break err,
        }
    };
    assert!(matches!(err, BPlusTreeError::AllocationError(_)));
    assert!(index.allocated_node_count() <= 3);
    assert_eq!(index.len(), inserted as usize);
    index.check_invariants_detailed().unwrap();

    // Freeing space by deleting lets inserts split again
    for key in 0..inserted {
        index.delete(&key, &record(key)).unwrap();
    }
    assert_single_empty_leaf(&index);
    index.insert(1000, record(1000)).unwrap();
}

#[test]
fn dump_shape_for_minimum_fanout() {
    let index = filled(3, 1..=8);
    let dump = index.dump();
    assert_eq!(dump.height(), 3);
    assert_eq!(dump.levels[0].len(), 1);
    assert_eq!(dump.levels[0][0].kind, NodeKind::Branch);
    assert_eq!(dump.levels[2].len(), index.leaf_count());
    assert_eq!(dump.to_string(), "[5]\n[3] [7]\n[1 2] [3 4] [5 6] [7 8]");
}

#[test]
fn render_tree_lists_every_record() {
    let index = filled(4, 0..20);
    let text = index.render_tree();
    for key in 0..20 {
        let line = format!("key: {}, record: {:?}", key, record(key));
        assert!(text.contains(&line), "missing {}", line);
    }
    assert!(text.starts_with("BEGIN TREE\nBEGIN BRANCH\n"));
}

#[test]
fn clear_resets_to_fresh_tree() {
    let mut index = filled(5, 0..500);
    index.clear();
    assert_single_empty_leaf(&index);
    index.insert(3, record(3)).unwrap();
    assert_eq!(index.len(), 1);
}
