//! Integration tests for long edit sequences.
//!
//! Drives a `TagEditor` through many planned operations and checks that undo,
//! redo and the tag index stay consistent with the records at every step.

use tagforge_core::{
    Batch, EditAction, EditHistory, InsertPosition, Record, TagEditor, TagError, TagIndex,
    TagOperation,
};

const VOCABULARY: &[&str] = &[
    "cat", "dog", "bird", "grass", "sky", "indoor", "outdoor", "night", "day", "smile",
];

/// Small deterministic generator so the sequences are reproducible.
struct Xorshift(u64);

impl Xorshift {
    fn next(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }

    fn below(&mut self, bound: usize) -> usize {
        (self.next() % bound as u64) as usize
    }

    fn tags(&mut self, max: usize) -> Vec<String> {
        (0..self.below(max + 1))
            .map(|_| VOCABULARY[self.below(VOCABULARY.len())].to_string())
            .collect()
    }
}

/// Records as they come off disk: every other one keeps duplicate tags, and
/// every third one carries an empty tag.
fn create_test_records(rng: &mut Xorshift, count: usize) -> Vec<Record> {
    (0..count)
        .map(|i| {
            let mut tags = rng.tags(5);
            if i % 2 == 1 {
                tags = tagforge_core::dedupe(&tags);
            }
            if i % 3 == 0 {
                tags.insert(rng.below(tags.len() + 1), String::new());
            }
            Record::new(
                100 + i as u64,
                format!("img{i}.png"),
                format!("/data/img{i}.png"),
                tags,
            )
        })
        .collect()
}

fn assert_batch_clean(batch: &Batch) {
    for action in batch {
        assert_eq!(
            tagforge_core::dedupe(&action.tags),
            action.tags,
            "record {} got an untidy tag list",
            action.key
        );
    }
}

fn random_operation(rng: &mut Xorshift) -> TagOperation {
    match rng.below(3) {
        0 => {
            let position = match rng.below(3) {
                0 => InsertPosition::Auto,
                _ => InsertPosition::Offset(rng.below(9) as isize - 4),
            };
            TagOperation::Insert {
                tags: rng.tags(3),
                position,
            }
        }
        1 => TagOperation::Delete { tags: rng.tags(3) },
        _ => TagOperation::Replace {
            from: rng.tags(2),
            to: rng.tags(3),
        },
    }
}

fn assert_index_consistent(editor: &TagEditor) {
    assert_eq!(editor.index(), &TagIndex::build(editor.records()));
    assert_eq!(editor.tags(), tagforge_core::collect_tags(editor.records()).as_slice());
}

// ============================================================================
// Round trips
// ============================================================================

#[test]
fn test_undo_all_restores_initial_state() {
    let mut rng = Xorshift(0x9E37_79B9_7F4A_7C15);
    let initial = create_test_records(&mut rng, 12);
    let mut editor = TagEditor::new(initial.clone()).unwrap();

    let mut applied = 0;
    for _ in 0..200 {
        if editor.execute(&random_operation(&mut rng)).unwrap().is_some() {
            applied += 1;
        }
        assert_index_consistent(&editor);
    }
    assert_eq!(editor.history().undo_depth(), applied);

    while editor.undo().is_some() {
        assert_index_consistent(&editor);
    }
    assert_eq!(editor.records(), initial.as_slice());
    assert_eq!(editor.history().redo_depth(), applied);
}

#[test]
fn test_redo_all_reaches_final_state() {
    let mut rng = Xorshift(42);
    let mut editor = TagEditor::new(create_test_records(&mut rng, 8)).unwrap();

    let mut states = vec![editor.snapshot()];
    for _ in 0..60 {
        if editor.execute(&random_operation(&mut rng)).unwrap().is_some() {
            states.push(editor.snapshot());
        }
    }

    // Walk all the way back, checking every intermediate state.
    for expected in states.iter().rev().skip(1) {
        assert_eq!(editor.undo().unwrap(), expected.as_slice());
    }
    assert!(editor.undo().is_none());

    for expected in states.iter().skip(1) {
        assert_eq!(editor.redo().unwrap(), expected.as_slice());
        assert_index_consistent(&editor);
    }
    assert!(editor.redo().is_none());
}

#[test]
fn test_interleaved_undo_redo_and_new_edits() {
    let mut rng = Xorshift(7);
    let mut editor = TagEditor::new(create_test_records(&mut rng, 6)).unwrap();

    for step in 0..300 {
        match rng.below(4) {
            0 => {
                let can_undo = editor.history().can_undo();
                assert_eq!(editor.undo().is_some(), can_undo);
            }
            1 => {
                let can_redo = editor.history().can_redo();
                assert_eq!(editor.redo().is_some(), can_redo);
            }
            _ => {
                let redo_before = editor.history().redo_depth();
                let changed = editor.execute(&random_operation(&mut rng)).unwrap().is_some();
                if changed {
                    assert!(!editor.history().can_redo(), "step {step}: redo survived an edit");
                } else {
                    assert_eq!(editor.history().redo_depth(), redo_before);
                }
            }
        }
        assert_index_consistent(&editor);
    }
}

// ============================================================================
// Batch contract
// ============================================================================

#[test]
fn test_planned_batches_address_each_record_once() {
    let mut rng = Xorshift(1234);
    let editor = TagEditor::new(create_test_records(&mut rng, 10)).unwrap();

    for _ in 0..100 {
        let batch = editor.plan(&random_operation(&mut rng));
        let mut keys: Vec<_> = batch.keys().collect();
        let planned = keys.len();
        keys.dedup();
        assert_eq!(keys.len(), planned);
        // Record order means keys come out ascending for these records.
        assert!(keys.windows(2).all(|pair| pair[0] < pair[1]));
    }
}

#[test]
fn test_planned_tag_lists_are_duplicate_free() {
    let mut rng = Xorshift(99);
    let initial = create_test_records(&mut rng, 10);
    assert!(initial
        .iter()
        .any(|record| tagforge_core::dedupe(&record.tags) != record.tags));
    let mut editor = TagEditor::new(initial).unwrap();

    for _ in 0..100 {
        let operation = random_operation(&mut rng);
        let batch = editor.plan(&operation);
        assert_batch_clean(&batch);

        editor.execute(&operation).unwrap();
        for key in batch.keys() {
            let record = editor.history().record(key).unwrap();
            assert_eq!(tagforge_core::dedupe(&record.tags), record.tags);
        }
    }
}

#[test]
fn test_untidy_records_get_clean_batches() {
    let records = vec![
        Record::new(1, "a.png", "/data/a.png", vec!["cat".into(), "cat".into(), "".into()]),
        Record::new(2, "b.png", "/data/b.png", vec!["cat".into(), "dog".into(), "dog".into()]),
    ];
    let editor = TagEditor::new(records).unwrap();

    let operations = [
        TagOperation::Insert {
            tags: vec!["dog".into()],
            position: InsertPosition::Auto,
        },
        TagOperation::Delete {
            tags: vec!["cat".into()],
        },
        TagOperation::Replace {
            from: vec!["cat".into()],
            to: vec!["feline".into()],
        },
    ];
    for operation in &operations {
        let batch = editor.plan(operation);
        assert!(!batch.is_empty(), "{} planned nothing", operation.name());
        assert_batch_clean(&batch);
    }
}

#[test]
fn test_rejected_batch_leaves_history_untouched() {
    let records = vec![
        Record::new(1, "a.png", "/data/a.png", vec!["x".to_string()]),
        Record::new(2, "b.png", "/data/b.png", vec![]),
    ];
    let mut history = EditHistory::new(records.clone()).unwrap();
    history
        .apply(vec![EditAction::new(2, vec!["y".to_string()])].into())
        .unwrap();
    history.undo();

    let err = history
        .apply(
            vec![
                EditAction::new(1, vec![]),
                EditAction::new(3, vec!["z".to_string()]),
            ]
            .into(),
        )
        .unwrap_err();

    assert!(matches!(err, TagError::UnknownRecord(_)));
    assert_eq!(history.records(), records.as_slice());
    assert_eq!(history.undo_depth(), 0);
    assert_eq!(history.redo_depth(), 1);
}
