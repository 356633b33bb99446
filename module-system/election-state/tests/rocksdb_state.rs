#![cfg(feature = "native")]

use election_state::codec::JsonCodec;
use election_state::config::StorageConfig;
use election_state::{Prefix, RocksDbStorage, StateMap, Storage, WorkingSet};

fn votes() -> StateMap<(String, String), String, JsonCodec> {
    StateMap::with_codec(Prefix::for_field("election", "votes"), JsonCodec)
}

fn commit(working_set: WorkingSet<RocksDbStorage>, storage: &RocksDbStorage) {
    let mut checkpoint = working_set.checkpoint();
    let state = checkpoint.freeze();
    let accessory = checkpoint.freeze_accessory();
    storage.commit(&state, &accessory).unwrap();
}

#[test]
fn test_votes_survive_reopen_and_scan_in_order() {
    let tmpdir = tempfile::tempdir().unwrap();
    let config = StorageConfig {
        path: tmpdir.path().to_path_buf(),
    };

    {
        let storage = RocksDbStorage::with_config(config.clone()).unwrap();
        let mut working_set = WorkingSet::new(storage.clone());
        let map = votes();
        map.set(&("E1", "dave"), &"A".to_owned(), &mut working_set)
            .unwrap();
        map.set(&("E1", "alice"), &"B".to_owned(), &mut working_set)
            .unwrap();
        map.set(&("E10", "bob"), &"A".to_owned(), &mut working_set)
            .unwrap();
        commit(working_set, &storage);
    }

    let storage = RocksDbStorage::with_config(config).unwrap();
    let working_set = WorkingSet::new(storage);
    let map = votes();
    let voters: Vec<String> = map
        .scan_prefix(&["E1"], &working_set)
        .unwrap()
        .map(|item| item.unwrap().0[1].clone())
        .collect();

    assert_eq!(voters, vec!["alice".to_owned(), "dave".to_owned()]);
}

#[test]
fn test_pending_writes_shadow_disk() {
    let tmpdir = tempfile::tempdir().unwrap();
    let storage = RocksDbStorage::with_path(tmpdir.path()).unwrap();
    let map = votes();

    let mut working_set = WorkingSet::new(storage.clone());
    map.set(&("E1", "alice"), &"A".to_owned(), &mut working_set)
        .unwrap();
    map.set(&("E1", "bob"), &"B".to_owned(), &mut working_set)
        .unwrap();
    commit(working_set, &storage);

    let mut working_set = WorkingSet::new(storage);
    map.set(&("E1", "bob"), &"C".to_owned(), &mut working_set)
        .unwrap();
    map.set(&("E1", "carol"), &"A".to_owned(), &mut working_set)
        .unwrap();

    let entries: Vec<_> = map
        .scan_prefix(&["E1"], &working_set)
        .unwrap()
        .map(|item| item.unwrap())
        .collect();
    assert_eq!(
        entries,
        vec![
            (vec!["E1".to_owned(), "alice".to_owned()], "A".to_owned()),
            (vec!["E1".to_owned(), "bob".to_owned()], "C".to_owned()),
            (vec!["E1".to_owned(), "carol".to_owned()], "A".to_owned()),
        ]
    );
}
