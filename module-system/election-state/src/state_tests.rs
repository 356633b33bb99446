use super::*;
use crate::codec::JsonCodec;

enum Operation {
    Checkpoint,
    Commit,
}

impl Operation {
    fn execute<S: Storage>(&self, working_set: WorkingSet<S>) -> WorkingSet<S> {
        match self {
            Operation::Checkpoint => working_set.checkpoint().to_revertable(),
            Operation::Commit => {
                let storage = working_set.backing().clone();
                let mut checkpoint = working_set.checkpoint();
                let state = checkpoint.freeze();
                let accessory = checkpoint.freeze_accessory();
                storage
                    .commit(&state, &accessory)
                    .expect("In-memory commit succeeds");

                checkpoint.to_revertable()
            }
        }
    }
}

struct StorageOperation {
    operations: Vec<Operation>,
}

impl StorageOperation {
    fn execute<S: Storage>(&self, mut working_set: WorkingSet<S>) -> WorkingSet<S> {
        for op in self.operations.iter() {
            working_set = op.execute(working_set)
        }
        working_set
    }
}

fn create_storage_operations() -> Vec<(StorageOperation, StorageOperation)> {
    // Interleavings of checkpoints and commits between a write and a read.
    vec![
        (
            StorageOperation { operations: vec![] },
            StorageOperation { operations: vec![] },
        ),
        (
            StorageOperation {
                operations: vec![Operation::Checkpoint],
            },
            StorageOperation { operations: vec![] },
        ),
        (
            StorageOperation {
                operations: vec![Operation::Checkpoint, Operation::Commit],
            },
            StorageOperation { operations: vec![] },
        ),
        (
            StorageOperation {
                operations: vec![Operation::Checkpoint],
            },
            StorageOperation {
                operations: vec![Operation::Commit],
            },
        ),
        (
            StorageOperation { operations: vec![] },
            StorageOperation {
                operations: vec![Operation::Commit, Operation::Checkpoint],
            },
        ),
    ]
}

fn votes_map() -> StateMap<(String, String), String, JsonCodec> {
    StateMap::with_codec(Prefix::for_field("election", "votes"), JsonCodec)
}

#[test]
fn test_state_map_with_overwrite() {
    for (before_overwrite, after_overwrite) in create_storage_operations() {
        let map = votes_map();
        let mut working_set = WorkingSet::new(InMemoryStorage::new());

        map.set(&("E1", "alice"), &"A".to_owned(), &mut working_set)
            .unwrap();
        working_set = before_overwrite.execute(working_set);
        assert_eq!(
            map.get(&("E1", "alice"), &mut working_set).unwrap(),
            Some("A".to_owned())
        );

        map.set(&("E1", "alice"), &"B".to_owned(), &mut working_set)
            .unwrap();
        working_set = after_overwrite.execute(working_set);
        assert_eq!(
            map.get(&("E1", "alice"), &mut working_set).unwrap(),
            Some("B".to_owned())
        );

        let entries: Vec<_> = map
            .scan_prefix(&["E1"], &working_set)
            .unwrap()
            .map(|item| item.unwrap())
            .collect();
        assert_eq!(
            entries,
            vec![(vec!["E1".to_owned(), "alice".to_owned()], "B".to_owned())]
        );
    }
}

#[test]
fn test_state_value_survives_operations() {
    for (before, after) in create_storage_operations() {
        let flag = StateValue::<bool>::new(Prefix::for_field("election", "initialized"));
        let mut working_set = WorkingSet::new(InMemoryStorage::new());

        assert_eq!(flag.get(&mut working_set).unwrap(), None);
        flag.set(&true, &mut working_set).unwrap();
        working_set = before.execute(working_set);
        working_set = after.execute(working_set);
        assert_eq!(flag.get(&mut working_set).unwrap(), Some(true));
    }
}

#[test]
fn test_scan_across_layers() {
    for (first, second) in create_storage_operations() {
        let map = votes_map();
        let mut working_set = WorkingSet::new(InMemoryStorage::new());

        map.set(&("E1", "carol"), &"C".to_owned(), &mut working_set)
            .unwrap();
        working_set = first.execute(working_set);
        map.set(&("E1", "alice"), &"A".to_owned(), &mut working_set)
            .unwrap();
        map.set(&("E2", "bob"), &"B".to_owned(), &mut working_set)
            .unwrap();
        working_set = second.execute(working_set);
        map.set(&("E1", "carol"), &"CC".to_owned(), &mut working_set)
            .unwrap();

        let voters: Vec<_> = map
            .scan_prefix(&["E1"], &working_set)
            .unwrap()
            .map(|item| item.unwrap())
            .map(|(parts, choice)| (parts[1].clone(), choice))
            .collect();
        assert_eq!(
            voters,
            vec![
                ("alice".to_owned(), "A".to_owned()),
                ("carol".to_owned(), "CC".to_owned()),
            ]
        );
    }
}

#[test]
fn test_accessory_map_reverts_with_transaction() {
    let outcomes: AccessoryStateMap<String, String, JsonCodec> =
        AccessoryStateMap::with_codec(Prefix::for_field("election", "outcome"), JsonCodec);
    let mut working_set = WorkingSet::new(InMemoryStorage::new());

    outcomes
        .set("E1", &"DRAW".to_owned(), &mut working_set.accessory_state())
        .unwrap();
    let mut working_set = working_set.checkpoint().to_revertable();
    outcomes
        .set("E1", &"NO_VOTES".to_owned(), &mut working_set.accessory_state())
        .unwrap();
    let mut working_set = working_set.revert().to_revertable();

    assert_eq!(
        outcomes
            .get("E1", &mut working_set.accessory_state())
            .unwrap(),
        Some("DRAW".to_owned())
    );
    // Accessory writes never show up in the regular state.
    assert_eq!(working_set.scan_prefix(b"election/").count(), 0);
}
